// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Data structure for storing compile-time configuration options.
//!
//! Configuration lives in a typed `const` object rather than in `#[cfg]`
//! attributes spread across crates. Every code path stays type-checked by the
//! compiler, even the ones a given board disables, and after type-checking
//! the compiler folds the constants so a disabled branch costs nothing in the
//! resulting binary.
//!
//! Cargo features on the kernel crate only choose the values below.

/// Data structure holding compile-time configuration options.
///
/// To change the configuration, enable the matching kernel cargo feature from
/// the board crate.
pub struct Config {
    /// Whether frames are produced by the foreground loop (cooperative
    /// polling) instead of from the periodic time-base interrupt.
    ///
    /// The polled design needs no interrupts at all, but its frame period
    /// stretches with the pulse width and with any other foreground work.
    /// The interrupt-driven design keeps the frame period exact.
    pub polled_frames: bool,

    /// Whether frame drivers should report every completed frame through the
    /// debug output.
    ///
    /// Reports are always written from the foreground side, never from the
    /// time-base interrupt, so enabling this does not move pulse edges under
    /// the interrupt-driven design. Under the polled design the write time
    /// adds to the frame.
    pub trace_frames: bool,
}

/// A unique instance of `Config` where compile-time configuration options are
/// defined. This is the only location in the tree where `cfg!(feature = ..)`
/// is used to configure code.
pub const CONFIG: Config = Config {
    polled_frames: cfg!(feature = "polled_frames"),
    trace_frames: cfg!(feature = "trace_frames"),
};
