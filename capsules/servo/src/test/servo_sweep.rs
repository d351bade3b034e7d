// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Test that a frame driver follows a moving position. Sweeps one channel
//! from one end of its range to the other and back, one step per frame, and
//! reports each turnaround through `debug!`. On a scope the pulse should
//! widen and narrow smoothly with one frame per step; with a servo attached
//! the horn swings end to end about every four seconds.

use core::cell::Cell;

use kernel::debug;
use kernel::hil::servo::{Channel, FrameDriver};

use crate::position::ServoPositions;

pub struct ServoSweep<'a> {
    driver: &'a dyn FrameDriver,
    positions: &'a ServoPositions,
    channel: Channel,
    rising: Cell<bool>,
    seen_frames: Cell<usize>,
    turnarounds: Cell<usize>,
}

impl<'a> ServoSweep<'a> {
    pub fn new(
        driver: &'a dyn FrameDriver,
        positions: &'a ServoPositions,
        channel: Channel,
    ) -> ServoSweep<'a> {
        ServoSweep {
            driver,
            positions,
            channel,
            rising: Cell::new(true),
            seen_frames: Cell::new(0),
            turnarounds: Cell::new(0),
        }
    }

    /// Move the channel to position 0 and sweep from there.
    pub fn run(&self) {
        debug!("Starting servo sweep on {:?}.", self.channel);
        self.positions.set(self.channel, 0);
        self.rising.set(true);
        self.seen_frames.set(self.driver.frames());
    }

    /// Take one step for every frame completed since the last call. Call
    /// from the foreground loop.
    pub fn step(&self) {
        let frames = self.driver.frames();
        while self.seen_frames.get() < frames {
            self.seen_frames.set(self.seen_frames.get() + 1);
            self.advance();
        }
    }

    pub fn turnarounds(&self) -> usize {
        self.turnarounds.get()
    }

    fn advance(&self) {
        if self.rising.get() {
            if self.positions.step_up(self.channel) == u8::MAX {
                self.turn("top");
            }
        } else if self.positions.step_down(self.channel) == 0 {
            self.turn("bottom");
        }
    }

    fn turn(&self, end: &str) {
        self.rising.set(!self.rising.get());
        self.turnarounds.set(self.turnarounds.get() + 1);
        debug!(
            "Servo sweep reached the {} after {} frames.",
            end,
            self.seen_frames.get()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::ErrorCode;

    /// Completes one frame per foreground pass.
    struct CountingDriver {
        frames: Cell<usize>,
    }

    impl FrameDriver for CountingDriver {
        fn start(&self) -> Result<(), ErrorCode> {
            Ok(())
        }

        fn foreground(&self) {
            self.frames.set(self.frames.get() + 1);
        }

        fn frames(&self) -> usize {
            self.frames.get()
        }
    }

    #[test]
    fn sweep_turns_at_both_ends() {
        let driver = CountingDriver {
            frames: Cell::new(40),
        };
        let positions = ServoPositions::new();
        let sweep = ServoSweep::new(&driver, &positions, Channel::Servo1);
        sweep.run();
        assert_eq!(positions.get(Channel::Servo1), 0);

        for _ in 0..255 {
            driver.foreground();
            sweep.step();
        }
        assert_eq!(positions.get(Channel::Servo1), 255);
        assert_eq!(sweep.turnarounds(), 1);

        driver.foreground();
        sweep.step();
        assert_eq!(positions.get(Channel::Servo1), 254);

        // Frames missed between calls are caught up.
        driver.frames.set(driver.frames.get() + 254);
        sweep.step();
        assert_eq!(positions.get(Channel::Servo1), 0);
        assert_eq!(sweep.turnarounds(), 2);
    }
}
