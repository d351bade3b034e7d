// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Servo timing configuration.
//!
//! A pulse is high for `base_high_us` plus `position` units of `unit_ns`.
//! A frame is `ticks_per_frame` periods of the time base, each
//! `tick_period_us` long.
//!
//! Boards check their configuration at compile time:
//!
//! ```rust,ignore
//! const _: () = assert!(SERVO_90_DEGREE.is_within_servo_limits());
//! ```

use kernel::hil::time::{ConvertTicks, Ticks};

/// Shortest frame period servos accept, in microseconds.
pub const MIN_FRAME_PERIOD_US: u32 = 15_000;
/// Longest frame period servos accept, in microseconds.
pub const MAX_FRAME_PERIOD_US: u32 = 20_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServoConfig {
    /// High time at position 0.
    pub base_high_us: u32,
    /// Extra high time per position step, in nanoseconds.
    pub unit_ns: u32,
    /// Time-base periods per frame.
    pub ticks_per_frame: u32,
    /// Period of the time base.
    pub tick_period_us: u32,
    /// Delay after the pulses of a polled frame.
    pub polled_frame_delay_ms: u32,
    /// Delay between foreground passes when frames come from the timer.
    pub input_poll_delay_ms: u32,
}

/// 1 ms to 2 ms pulses every 15 ms, for 90 degree servos.
pub const SERVO_90_DEGREE: ServoConfig = ServoConfig {
    base_high_us: 1000,
    unit_ns: 3922,
    ticks_per_frame: 3,
    tick_period_us: 5000,
    polled_frame_delay_ms: 15,
    input_poll_delay_ms: 4,
};

/// 544 us to 2.4 ms pulses every 15 ms, for wide range servos.
pub const SERVO_180_DEGREE: ServoConfig = ServoConfig {
    base_high_us: 544,
    unit_ns: 7278,
    ticks_per_frame: 3,
    tick_period_us: 5000,
    polled_frame_delay_ms: 15,
    input_poll_delay_ms: 4,
};

impl ServoConfig {
    pub const fn min_pulse_us(&self) -> u32 {
        self.base_high_us
    }

    /// High time at position 255, rounded up.
    pub const fn max_pulse_us(&self) -> u32 {
        self.base_high_us + (u8::MAX as u32 * self.unit_ns).div_ceil(1000)
    }

    pub const fn frame_period_us(&self) -> u32 {
        self.ticks_per_frame * self.tick_period_us
    }

    /// Whether the frame period is one servos accept and the longest pulse
    /// ends before the next time-base period starts.
    pub const fn is_within_servo_limits(&self) -> bool {
        frame_within_servo_limits(self.frame_period_us()) && self.max_pulse_us() < self.tick_period_us
    }
}

pub const fn frame_within_servo_limits(frame_us: u32) -> bool {
    frame_us >= MIN_FRAME_PERIOD_US && frame_us <= MAX_FRAME_PERIOD_US
}

/// Pulse timing in ticks of the clock that times the pulse.
///
/// Converting involves a division, so it is done once when the emitter is
/// built rather than on every pulse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PulseTiming<T: Ticks> {
    pub base: T,
    pub unit: T,
}

impl<T: Ticks> PulseTiming<T> {
    pub fn from_config<C: ConvertTicks<T>>(clock: &C, config: &ServoConfig) -> PulseTiming<T> {
        PulseTiming {
            base: clock.ticks_from_us(config.base_high_us),
            unit: clock.ticks_from_ns(config.unit_ns),
        }
    }

    pub fn high_time(&self, position: u8) -> T {
        let extra = self.unit.into_u32() * position as u32;
        self.base.wrapping_add(T::from(extra))
    }

    pub fn min_high_time(&self) -> T {
        self.base
    }

    pub fn max_high_time(&self) -> T {
        self.high_time(u8::MAX)
    }
}
