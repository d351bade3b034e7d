// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! INTCON, the interrupt control register.

use kernel::utilities::registers::interfaces::{ReadWriteable, Readable};
use kernel::utilities::registers::{register_bitfields, Field, InMemoryRegister};

register_bitfields![u8,
    INTCON [
        /// Global interrupt enable
        GIE OFFSET(7) NUMBITS(1) [],
        /// TMR0 overflow interrupt enable
        TMR0IE OFFSET(5) NUMBITS(1) [],
        /// Interrupt-on-change enable
        IOCIE OFFSET(3) NUMBITS(1) [],
        /// TMR0 overflow flag
        TMR0IF OFFSET(2) NUMBITS(1) [],
        /// Interrupt-on-change flag
        IOCIF OFFSET(0) NUMBITS(1) []
    ]
];

/// Interrupt sources, in the order the handler checks them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    Timer0,
    PortBChange,
}

impl Source {
    const PRIORITY: [Source; 2] = [Source::Timer0, Source::PortBChange];

    fn flag(self) -> Field<u8, INTCON::Register> {
        match self {
            Source::Timer0 => INTCON::TMR0IF,
            Source::PortBChange => INTCON::IOCIF,
        }
    }

    fn enable(self) -> Field<u8, INTCON::Register> {
        match self {
            Source::Timer0 => INTCON::TMR0IE,
            Source::PortBChange => INTCON::IOCIE,
        }
    }
}

pub(crate) struct InterruptControl {
    intcon: InMemoryRegister<u8, INTCON::Register>,
}

impl InterruptControl {
    pub(crate) const fn new() -> InterruptControl {
        InterruptControl {
            intcon: InMemoryRegister::new(0),
        }
    }

    /// Latch a trigger from `source`.
    ///
    /// Returns `false` if the flag was already set, in which case the trigger
    /// is lost.
    pub(crate) fn raise(&self, source: Source) -> bool {
        if self.intcon.is_set(source.flag()) {
            return false;
        }
        self.intcon.modify(source.flag().val(1));
        true
    }

    pub(crate) fn clear(&self, source: Source) {
        self.intcon.modify(source.flag().val(0));
    }

    pub(crate) fn set_enabled(&self, source: Source, enabled: bool) {
        self.intcon.modify(source.enable().val(enabled as u8));
    }

    pub(crate) fn set_global(&self, enabled: bool) {
        self.intcon.modify(INTCON::GIE.val(enabled as u8));
    }

    pub(crate) fn global(&self) -> bool {
        self.intcon.is_set(INTCON::GIE)
    }

    /// The highest priority source that is both flagged and enabled. GIE is
    /// not considered.
    pub(crate) fn next_pending(&self) -> Option<Source> {
        Source::PRIORITY
            .into_iter()
            .find(|source| self.intcon.is_set(source.flag()) && self.intcon.is_set(source.enable()))
    }
}
