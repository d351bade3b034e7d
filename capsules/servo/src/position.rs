// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Commanded position of every servo channel.
//!
//! Positions are written by the foreground loop and by input interrupt
//! handlers, and read by whichever context emits pulses, possibly the
//! time-base interrupt. Each position is a single byte accessed with
//! acquire/release ordering, so a reader sees either the old or the new
//! value and never needs a lock.
//!
//! Stepping is a load followed by a store rather than a read-modify-write,
//! which keeps it available on cores without atomic RMW instructions. It
//! assumes one stepping writer per channel. A direct `set` racing a step may
//! be overwritten by the step's store.

use core::sync::atomic::{AtomicU8, Ordering};

use kernel::hil::servo::{Channel, CENTER_POSITION};

pub struct ServoPositions {
    positions: [AtomicU8; 8],
}

impl ServoPositions {
    /// Every channel at [`CENTER_POSITION`].
    pub const fn new() -> ServoPositions {
        ServoPositions {
            positions: [
                AtomicU8::new(CENTER_POSITION),
                AtomicU8::new(CENTER_POSITION),
                AtomicU8::new(CENTER_POSITION),
                AtomicU8::new(CENTER_POSITION),
                AtomicU8::new(CENTER_POSITION),
                AtomicU8::new(CENTER_POSITION),
                AtomicU8::new(CENTER_POSITION),
                AtomicU8::new(CENTER_POSITION),
            ],
        }
    }

    pub fn get(&self, channel: Channel) -> u8 {
        self.positions[channel.index()].load(Ordering::Acquire)
    }

    pub fn set(&self, channel: Channel, position: u8) {
        self.positions[channel.index()].store(position, Ordering::Release);
    }

    /// Move one step up, stopping at 255. Returns the new position.
    pub fn step_up(&self, channel: Channel) -> u8 {
        let position = self.get(channel).saturating_add(1);
        self.set(channel, position);
        position
    }

    /// Move one step down, stopping at 0. Returns the new position.
    pub fn step_down(&self, channel: Channel) -> u8 {
        let position = self.get(channel).saturating_sub(1);
        self.set(channel, position);
        position
    }
}
