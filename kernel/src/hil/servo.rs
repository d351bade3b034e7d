// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interfaces for generating analog hobby servo signals.
//!
//! A servo signal is one pulse per frame. The high time of the pulse encodes
//! the commanded position; the frame repeats every 15 to 20 ms.

use crate::ErrorCode;

/// Position every channel starts at: the middle of the pulse range.
pub const CENTER_POSITION: u8 = 128;

/// One servo output line.
///
/// Each channel owns exactly one bit of the 8-bit servo output port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    Servo1,
    Servo2,
    Servo3,
    Servo4,
    Servo5,
    Servo6,
    Servo7,
    Servo8,
}

impl Channel {
    /// Every channel, in port bit order.
    pub const ALL: [Channel; 8] = [
        Channel::Servo1,
        Channel::Servo2,
        Channel::Servo3,
        Channel::Servo4,
        Channel::Servo5,
        Channel::Servo6,
        Channel::Servo7,
        Channel::Servo8,
    ];

    /// Bit position of the channel on the output port.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Port mask with only this channel's bit set.
    pub const fn mask(self) -> u8 {
        1 << (self as u8)
    }

    pub const fn from_index(index: usize) -> Option<Channel> {
        if index < Channel::ALL.len() {
            Some(Channel::ALL[index])
        } else {
            None
        }
    }
}

/// Precision pulse generation on servo channels.
pub trait ServoPulse {
    /// Prepare `channel` as an output, driven low before its driver is
    /// enabled. Calling it again on a configured channel has no effect.
    ///
    /// Return values:
    ///
    /// - `Ok(())`: The channel is an output driving low.
    /// - `BUSY`: A pulse is being emitted.
    fn configure_output(&self, channel: Channel) -> Result<(), ErrorCode>;

    /// Returns whether `configure_output` has been called for `channel`.
    fn is_configured(&self, channel: Channel) -> bool;

    /// Emit one pulse whose high time grows with `position`.
    ///
    /// Blocks the caller for the whole pulse and returns after the falling
    /// edge. Never yields and must not be called again before it returns.
    ///
    /// Return values:
    ///
    /// - `Ok(())`: One pulse was emitted.
    /// - `NODEVICE`: The channel was never configured. No line was touched.
    /// - `BUSY`: Another pulse is being emitted.
    fn emit_pulse(&self, channel: Channel, position: u8) -> Result<(), ErrorCode>;

    /// Longest high time any position produces, in microseconds, rounded up.
    fn max_pulse_us(&self) -> u32;
}

/// A strategy producing one pulse per configured channel per frame.
pub trait FrameDriver {
    /// Begin producing frames.
    ///
    /// Return values:
    ///
    /// - `Ok(())`: Frames are being produced.
    /// - `ALREADY`: The driver was already started.
    /// - `INVAL`: No channels, zero ticks per frame, or the time base cannot
    ///   produce a frame period servos accept.
    /// - `NODEVICE`: A channel has not been configured.
    /// - `SIZE`: The pulses of one frame do not fit in the time available
    ///   to emit them.
    fn start(&self) -> Result<(), ErrorCode>;

    /// Run one pass of the foreground loop's share of frame timing.
    ///
    /// Returns after the driver's foreground delay. Position sources run
    /// between calls.
    fn foreground(&self);

    /// Number of frames completed since `start`.
    fn frames(&self) -> usize;
}
