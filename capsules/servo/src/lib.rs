// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Hardware-independent servo signal generation.
//!
//! [`pulse::ServoPulseEmitter`] turns a position into one precisely timed
//! pulse. A frame driver calls it once per channel per frame:
//! [`polled_frames::PolledFrames`] from the foreground loop, or
//! [`frame_scheduler::FrameScheduler`] from a periodic timer interrupt.
//! Positions live in [`position::ServoPositions`] and are changed by the
//! sources in [`position_buttons`].

#![forbid(unsafe_code)]
#![no_std]

pub mod frame_scheduler;
pub mod polled_frames;
pub mod position;
pub mod position_buttons;
pub mod pulse;
pub mod test;
pub mod timing;
