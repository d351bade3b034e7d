// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Pushbutton position sources.
//!
//! Buttons are active low: a pressed button pulls its input to ground.
//!
//! - [`PositionButtons`] is sampled by the foreground loop. Each pass moves
//!   the position one step for every held button, so holding a button sweeps
//!   the servo at the foreground loop's rate.
//! - [`PositionPreset`] is an interrupt client. A press sets the position to
//!   a fixed value at once, without waiting for the foreground loop. The new
//!   value is used from the next pulse on; a pulse already in flight keeps
//!   its width.
//!
//! Debouncing is left to the input hardware.

use core::cell::Cell;

use kernel::hil::gpio::{Client, Input, Interrupt, InterruptEdge};
use kernel::hil::servo::Channel;

use crate::position::ServoPositions;

pub struct PositionButtons<'a, I: Input> {
    positions: &'a ServoPositions,
    channel: Channel,
    decrement: &'a I,
    increment: &'a I,
}

impl<'a, I: Input> PositionButtons<'a, I> {
    pub fn new(
        positions: &'a ServoPositions,
        channel: Channel,
        decrement: &'a I,
        increment: &'a I,
    ) -> PositionButtons<'a, I> {
        PositionButtons {
            positions,
            channel,
            decrement,
            increment,
        }
    }

    /// Step the position for each held button. Returns the position.
    pub fn sample(&self) -> u8 {
        if !self.decrement.read() {
            self.positions.step_down(self.channel);
        }
        if !self.increment.read() {
            self.positions.step_up(self.channel);
        }
        self.positions.get(self.channel)
    }
}

pub struct PositionPreset<'a, P: Interrupt<'a>> {
    pin: &'a P,
    positions: &'a ServoPositions,
    channel: Channel,
    position: u8,
    presses: Cell<usize>,
}

impl<'a, P: Interrupt<'a>> PositionPreset<'a, P> {
    pub fn new(
        pin: &'a P,
        positions: &'a ServoPositions,
        channel: Channel,
        position: u8,
    ) -> PositionPreset<'a, P> {
        PositionPreset {
            pin,
            positions,
            channel,
            position,
            presses: Cell::new(0),
        }
    }

    /// Listen for presses. The board must have made this the pin's client.
    pub fn enable(&self) {
        self.pin.enable_interrupts(InterruptEdge::FallingEdge);
    }

    pub fn disable(&self) {
        self.pin.disable_interrupts();
    }

    /// Presses handled so far.
    pub fn presses(&self) -> usize {
        self.presses.get()
    }
}

impl<'a, P: Interrupt<'a>> Client for PositionPreset<'a, P> {
    fn fired(&self) {
        self.positions.set(self.channel, self.position);
        self.presses.set(self.presses.get() + 1);
    }
}
