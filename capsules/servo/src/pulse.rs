// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Servo pulse generation by busy waiting.
//!
//! A pulse sets the channel high, waits the base time, waits one unit per
//! position step, and sets the channel low. Every wait is measured from the
//! rising edge: the deadline grows by one unit per step with a single
//! addition, so the overshoot of one wait is absorbed by the next instead of
//! adding up, and no division happens while the line is high.
//!
//! Usage
//! -----
//!
//! ```rust,ignore
//! let emitter = ServoPulseEmitter::new(&clock, &portc, &timing::SERVO_90_DEGREE);
//! emitter.configure_output(Channel::Servo1)?;
//! emitter.emit_pulse(Channel::Servo1, positions.get(Channel::Servo1))?;
//! ```
//!
//! The emitter holds its caller for up to the maximum pulse width. Calling it
//! from an interrupt handler delays every other interrupt by as much.

use core::cell::Cell;

use kernel::hil::gpio::Port;
use kernel::hil::servo::{Channel, ServoPulse};
use kernel::hil::time::{BusyWait, Frequency, Ticks, Time};
use kernel::ErrorCode;

use crate::timing::{PulseTiming, ServoConfig};

pub struct ServoPulseEmitter<'a, A: BusyWait, P: Port> {
    clock: &'a A,
    port: &'a P,
    timing: PulseTiming<A::Ticks>,
    max_pulse_us: u32,
    configured: Cell<u8>,
    busy: Cell<bool>,
}

impl<'a, A: BusyWait, P: Port> ServoPulseEmitter<'a, A, P> {
    pub fn new(clock: &'a A, port: &'a P, config: &ServoConfig) -> ServoPulseEmitter<'a, A, P> {
        let timing = PulseTiming::from_config(clock, config);
        ServoPulseEmitter {
            clock,
            port,
            timing,
            max_pulse_us: ticks_to_us_rounded_up::<A>(timing.max_high_time()),
            configured: Cell::new(0),
            busy: Cell::new(false),
        }
    }

    pub fn timing(&self) -> PulseTiming<A::Ticks> {
        self.timing
    }

    fn hold_high(&self, position: u8) {
        let reference = self.clock.now();
        let mut deadline = self.timing.base;
        self.clock.spin_until(reference, deadline);
        for _ in 0..position {
            deadline = deadline.wrapping_add(self.timing.unit);
            self.clock.spin_until(reference, deadline);
        }
    }
}

impl<A: BusyWait, P: Port> ServoPulse for ServoPulseEmitter<'_, A, P> {
    fn configure_output(&self, channel: Channel) -> Result<(), ErrorCode> {
        if self.busy.get() {
            return Err(ErrorCode::BUSY);
        }
        let mask = channel.mask();
        self.port.clear(mask);
        self.port.make_output(mask);
        self.configured.set(self.configured.get() | mask);
        Ok(())
    }

    fn is_configured(&self, channel: Channel) -> bool {
        self.configured.get() & channel.mask() != 0
    }

    fn emit_pulse(&self, channel: Channel, position: u8) -> Result<(), ErrorCode> {
        if !self.is_configured(channel) {
            return Err(ErrorCode::NODEVICE);
        }
        if self.busy.replace(true) {
            return Err(ErrorCode::BUSY);
        }
        let mask = channel.mask();
        self.port.set(mask);
        self.hold_high(position);
        self.port.clear(mask);
        self.busy.set(false);
        Ok(())
    }

    fn max_pulse_us(&self) -> u32 {
        self.max_pulse_us
    }
}

/// Microseconds spanned by `ticks`, rounded up so fit checks stay
/// conservative.
fn ticks_to_us_rounded_up<T: Time>(ticks: T::Ticks) -> u32 {
    let freq = <T::Frequency as Frequency>::frequency() as u64;
    let us = (ticks.into_u32() as u64 * 1_000_000).div_ceil(freq);
    u32::try_from(us).unwrap_or(u32::MAX)
}
