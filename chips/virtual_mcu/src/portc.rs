// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! PORTC, the servo output port.
//!
//! `LATC` holds the output latch and `TRISC` the tristate control, where a
//! set bit leaves the line as a high-impedance input. A line is driven with
//! its latch bit only while its `TRISC` bit is clear; undriven lines read
//! low through the servo's input load.

use kernel::hil::gpio::Port;
use kernel::utilities::registers::interfaces::{Readable, Writeable};
use kernel::utilities::registers::InMemoryRegister;

use crate::chip::VirtualMcu;

pub(crate) struct PortC {
    latc: InMemoryRegister<u8>,
    trisc: InMemoryRegister<u8>,
}

impl PortC {
    /// The latch powers up with arbitrary contents; every line starts as an
    /// input.
    pub(crate) const fn new(latch_at_reset: u8) -> PortC {
        PortC {
            latc: InMemoryRegister::new(latch_at_reset),
            trisc: InMemoryRegister::new(0xFF),
        }
    }

    /// Levels currently driven onto the pins.
    pub(crate) fn driven(&self) -> u8 {
        self.latc.get() & !self.trisc.get()
    }
}

impl Port for VirtualMcu<'_> {
    fn set(&self, mask: u8) {
        self.portc.latc.set(self.portc.latc.get() | mask);
        self.record_outputs();
    }

    fn clear(&self, mask: u8) {
        self.portc.latc.set(self.portc.latc.get() & !mask);
        self.record_outputs();
    }

    fn make_output(&self, mask: u8) {
        self.portc.trisc.set(self.portc.trisc.get() & !mask);
        self.record_outputs();
    }

    fn outputs(&self) -> u8 {
        !self.portc.trisc.get()
    }

    fn latch(&self) -> u8 {
        self.portc.latc.get()
    }
}
