// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! TMR0, the 8-bit time base.
//!
//! TMR0 counts instruction cycles through a prescaler of 1 to 256 and raises
//! TMR0IF when it rolls over from 255 to 0. A period is programmed by
//! preloading the counter: the timer overflows every
//! `(256 - preload) * prescaler` cycles. Each overflow reloads the preload,
//! so consecutive overflows stay exactly one period apart no matter when the
//! handler runs.

use std::cell::Cell;

use kernel::hil::time::{Ticks, Ticks32, Timer, TimerClient};
use kernel::utilities::cells::OptionalCell;
use kernel::utilities::registers::interfaces::{Readable, Writeable};
use kernel::utilities::registers::{register_bitfields, InMemoryRegister};
use kernel::ErrorCode;

use crate::chip::VirtualMcu;
use crate::interrupts::Source;

register_bitfields![u8,
    OPTION_REG [
        /// Clock source
        TMR0CS OFFSET(5) NUMBITS(1) [
            InstructionClock = 0,
            T0CKIPin = 1
        ],
        /// Prescaler assignment
        PSA OFFSET(3) NUMBITS(1) [
            Assigned = 0,
            Bypassed = 1
        ],
        /// Prescaler rate, 1:2 to 1:256
        PS OFFSET(0) NUMBITS(3) []
    ]
];

/// Prescaler and preload producing a requested period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reload {
    /// `None` bypasses the prescaler; `Some(ps)` divides by `2 << ps`.
    pub prescale: Option<u8>,
    pub preload: u8,
}

impl Reload {
    /// The shortest reload whose period is not shorter than `interval`
    /// cycles, using the smallest prescaler that can reach it. Returns `None`
    /// for a zero interval or one longer than the counter can span.
    pub fn for_interval(interval: u32) -> Option<Reload> {
        if interval == 0 {
            return None;
        }
        let rates = core::iter::once(None).chain((0..8u8).map(Some));
        for prescale in rates {
            let counts = interval.div_ceil(Reload::rate(prescale));
            if counts <= 256 {
                return Some(Reload {
                    prescale,
                    preload: (256 - counts) as u8,
                });
            }
        }
        None
    }

    fn rate(prescale: Option<u8>) -> u32 {
        prescale.map_or(1, |ps| 2 << ps)
    }

    /// Cycles between overflows.
    pub fn period(&self) -> u32 {
        (256 - self.preload as u32) * Reload::rate(self.prescale)
    }
}

pub(crate) struct Tmr0<'a> {
    option: InMemoryRegister<u8, OPTION_REG::Register>,
    preload: Cell<u8>,
    running: Cell<bool>,
    next_overflow: Cell<u64>,
    client: OptionalCell<&'a dyn TimerClient>,
}

impl<'a> Tmr0<'a> {
    pub(crate) const fn new() -> Tmr0<'a> {
        Tmr0 {
            // Reset value: external clock, prescaler bypassed.
            option: InMemoryRegister::new(0xFF),
            preload: Cell::new(0),
            running: Cell::new(false),
            next_overflow: Cell::new(0),
            client: OptionalCell::empty(),
        }
    }

    fn reload(&self) -> Reload {
        let prescale = if self.option.matches_all(OPTION_REG::PSA::Assigned) {
            Some(self.option.read(OPTION_REG::PS))
        } else {
            None
        };
        Reload {
            prescale,
            preload: self.preload.get(),
        }
    }

    fn program(&self, reload: Reload, now: u64) {
        match reload.prescale {
            Some(ps) => self.option.write(
                OPTION_REG::TMR0CS::InstructionClock
                    + OPTION_REG::PSA::Assigned
                    + OPTION_REG::PS.val(ps),
            ),
            None => self
                .option
                .write(OPTION_REG::TMR0CS::InstructionClock + OPTION_REG::PSA::Bypassed),
        }
        self.preload.set(reload.preload);
        self.next_overflow.set(now + reload.period() as u64);
        self.running.set(true);
    }

    /// Cycle of the next overflow, if the timer runs.
    pub(crate) fn next_overflow(&self) -> Option<u64> {
        if self.running.get() {
            Some(self.next_overflow.get())
        } else {
            None
        }
    }

    /// Account for the overflow returned by `next_overflow`.
    pub(crate) fn overflow(&self) {
        let period = self.reload().period() as u64;
        self.next_overflow.set(self.next_overflow.get() + period);
    }

    pub(crate) fn handle_interrupt(&self) {
        self.client.map(|client| client.timer());
    }
}

impl<'a> Timer<'a> for VirtualMcu<'a> {
    fn set_timer_client(&self, client: &'a dyn TimerClient) {
        self.tmr0.client.set(client);
    }

    fn repeat(&self, interval: Ticks32) -> Result<(), ErrorCode> {
        let reload = Reload::for_interval(interval.into_u32()).ok_or(ErrorCode::INVAL)?;
        self.tmr0.program(reload, self.cycles());
        self.intcon.clear(Source::Timer0);
        self.intcon.set_enabled(Source::Timer0, true);
        Ok(())
    }

    fn interval(&self) -> Option<Ticks32> {
        if self.tmr0.running.get() {
            Some(Ticks32::from(self.tmr0.reload().period()))
        } else {
            None
        }
    }

    fn cancel(&self) -> Result<(), ErrorCode> {
        if !self.tmr0.running.get() {
            return Err(ErrorCode::OFF);
        }
        self.tmr0.running.set(false);
        self.intcon.set_enabled(Source::Timer0, false);
        self.intcon.clear(Source::Timer0);
        Ok(())
    }
}
