// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! PORTB, the pushbutton inputs.
//!
//! Only RB4 to RB7 exist on the part. Weak pull-ups hold every line high
//! until a button grounds it. Interrupt-on-change latches a per-pin flag in
//! `IOCBF` on the rising edges enabled in `IOCBP` and the falling edges
//! enabled in `IOCBN`; any set `IOCBF` bit raises IOCIF.

use kernel::hil::gpio::{Client, Input, Interrupt, InterruptEdge};
use kernel::utilities::cells::OptionalCell;
use kernel::utilities::registers::interfaces::{Readable, Writeable};
use kernel::utilities::registers::InMemoryRegister;

use crate::chip::VirtualMcu;
use crate::interrupts::Source;

/// A PORTB line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinId {
    RB4 = 4,
    RB5 = 5,
    RB6 = 6,
    RB7 = 7,
}

impl PinId {
    pub const fn mask(self) -> u8 {
        1 << (self as u8)
    }

    const fn slot(self) -> usize {
        self as usize - 4
    }
}

/// What an input change did to the interrupt-on-change logic.
pub(crate) enum Change {
    /// The edge is not enabled, or the level did not change.
    Ignored,
    /// The pin's flag was set.
    Latched,
    /// The pin's flag was already set and the edge was lost.
    Lost,
}

pub(crate) struct PortB<'a> {
    port: InMemoryRegister<u8>,
    iocbp: InMemoryRegister<u8>,
    iocbn: InMemoryRegister<u8>,
    iocbf: InMemoryRegister<u8>,
    clients: [OptionalCell<&'a dyn Client>; 4],
}

impl<'a> PortB<'a> {
    pub(crate) const fn new() -> PortB<'a> {
        PortB {
            port: InMemoryRegister::new(0xF0),
            iocbp: InMemoryRegister::new(0),
            iocbn: InMemoryRegister::new(0),
            iocbf: InMemoryRegister::new(0),
            clients: [
                OptionalCell::empty(),
                OptionalCell::empty(),
                OptionalCell::empty(),
                OptionalCell::empty(),
            ],
        }
    }

    /// Move `pin` to `high`: released (pulled up) or grounded.
    pub(crate) fn drive(&self, pin: PinId, high: bool) -> Change {
        let mask = pin.mask();
        let old = self.port.get();
        let new = if high { old | mask } else { old & !mask };
        self.port.set(new);

        let rising = !old & new & self.iocbp.get();
        let falling = old & !new & self.iocbn.get();
        if (rising | falling) & mask == 0 {
            return Change::Ignored;
        }
        let flags = self.iocbf.get();
        if flags & mask != 0 {
            return Change::Lost;
        }
        self.iocbf.set(flags | mask);
        Change::Latched
    }

    /// Clear every latched pin flag and notify the clients of those pins.
    pub(crate) fn handle_interrupt(&self) {
        let flags = self.iocbf.get();
        self.iocbf.set(0);
        for pin in [PinId::RB4, PinId::RB5, PinId::RB6, PinId::RB7] {
            if flags & pin.mask() != 0 {
                self.clients[pin.slot()].map(|client| client.fired());
            }
        }
    }
}

/// Handle to one PORTB line, implementing the GPIO input interfaces.
pub struct PortBPin<'a> {
    mcu: &'a VirtualMcu<'a>,
    pin: PinId,
}

impl<'a> PortBPin<'a> {
    pub(crate) fn new(mcu: &'a VirtualMcu<'a>, pin: PinId) -> PortBPin<'a> {
        PortBPin { mcu, pin }
    }
}

impl Input for PortBPin<'_> {
    fn read(&self) -> bool {
        self.mcu.portb.port.get() & self.pin.mask() != 0
    }
}

impl<'a> Interrupt<'a> for PortBPin<'a> {
    fn set_client(&self, client: &'a dyn Client) {
        self.mcu.portb.clients[self.pin.slot()].set(client);
    }

    fn enable_interrupts(&self, mode: InterruptEdge) {
        let portb = &self.mcu.portb;
        let mask = self.pin.mask();
        let (rising, falling) = match mode {
            InterruptEdge::RisingEdge => (true, false),
            InterruptEdge::FallingEdge => (false, true),
            InterruptEdge::EitherEdge => (true, true),
        };
        let update = |reg: &InMemoryRegister<u8>, on: bool| {
            reg.set(if on { reg.get() | mask } else { reg.get() & !mask });
        };
        update(&portb.iocbp, rising);
        update(&portb.iocbn, falling);
        self.mcu.intcon.set_enabled(Source::PortBChange, true);
    }

    fn disable_interrupts(&self) {
        let portb = &self.mcu.portb;
        let mask = !self.pin.mask();
        portb.iocbp.set(portb.iocbp.get() & mask);
        portb.iocbn.set(portb.iocbn.get() & mask);
        portb.iocbf.set(portb.iocbf.get() & mask);
    }

    fn is_pending(&self) -> bool {
        self.mcu.portb.iocbf.get() & self.pin.mask() != 0
    }
}
