// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Servo frames produced by the foreground loop.
//!
//! Each foreground pass emits one pulse per channel and then busy waits a
//! fixed delay. No interrupt is involved, but the frame period is the pulse
//! widths plus the delay, so it moves with the positions, and any other work
//! the foreground loop does between passes makes the frame longer still.
//!
//! `start` admits a channel list only if every channel at full scale plus the
//! delay still fits in the longest frame servos accept.

use core::cell::Cell;

use kernel::config::CONFIG;
use kernel::debug;
use kernel::hil::servo::{Channel, FrameDriver, ServoPulse};
use kernel::hil::time::{BusyWait, ConvertTicks};
use kernel::ErrorCode;

use crate::position::ServoPositions;
use crate::timing::{ServoConfig, MAX_FRAME_PERIOD_US};

pub struct PolledFrames<'a, A: BusyWait, S: ServoPulse> {
    clock: &'a A,
    emitter: &'a S,
    positions: &'a ServoPositions,
    channels: &'a [Channel],
    frame_delay: A::Ticks,
    frame_delay_us: u32,
    started: Cell<bool>,
    frames: Cell<usize>,
}

impl<'a, A: BusyWait, S: ServoPulse> PolledFrames<'a, A, S> {
    pub fn new(
        clock: &'a A,
        emitter: &'a S,
        positions: &'a ServoPositions,
        channels: &'a [Channel],
        config: &ServoConfig,
    ) -> PolledFrames<'a, A, S> {
        PolledFrames {
            clock,
            emitter,
            positions,
            channels,
            frame_delay: clock.ticks_from_ms(config.polled_frame_delay_ms),
            frame_delay_us: config.polled_frame_delay_ms.saturating_mul(1000),
            started: Cell::new(false),
            frames: Cell::new(0),
        }
    }
}

impl<A: BusyWait, S: ServoPulse> FrameDriver for PolledFrames<'_, A, S> {
    fn start(&self) -> Result<(), ErrorCode> {
        if self.started.get() {
            return Err(ErrorCode::ALREADY);
        }
        if self.channels.is_empty() {
            return Err(ErrorCode::INVAL);
        }
        if let Some(channel) = self
            .channels
            .iter()
            .find(|channel| !self.emitter.is_configured(**channel))
        {
            debug!("servo: {:?} is not configured", channel);
            return Err(ErrorCode::NODEVICE);
        }
        let frame_us = (self.channels.len() as u32)
            .saturating_mul(self.emitter.max_pulse_us())
            .saturating_add(self.frame_delay_us);
        if frame_us > MAX_FRAME_PERIOD_US {
            debug!(
                "servo: {} channels stretch the frame to {}us",
                self.channels.len(),
                frame_us
            );
            return Err(ErrorCode::SIZE);
        }
        debug!(
            "servo: {} channel(s), polled, delay {}us",
            self.channels.len(),
            self.clock.ticks_to_us(self.frame_delay)
        );
        self.frames.set(0);
        self.started.set(true);
        Ok(())
    }

    fn foreground(&self) {
        if !self.started.get() {
            return;
        }
        for &channel in self.channels {
            // Channels were verified by start(); a failed pulse is superseded
            // by the next frame.
            let _ = self.emitter.emit_pulse(channel, self.positions.get(channel));
        }
        self.clock.spin_until(self.clock.now(), self.frame_delay);
        self.frames.set(self.frames.get() + 1);
        if CONFIG.trace_frames {
            debug!("servo: frame {}", self.frames.get());
        }
    }

    fn frames(&self) -> usize {
        self.frames.get()
    }
}
