// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Core servo kernel.
//!
//! The kernel crate holds the code shared by chips, capsules, and boards: the
//! Hardware Interface Layer (HIL) traits that servo capsules are written
//! against, the common [`ErrorCode`], the `debug!` output path, and the
//! compile-time configuration object.
//!
//! Most `unsafe` code is in this kernel crate.

#![warn(unreachable_pub)]
#![no_std]

pub mod config;
#[macro_use]
pub mod debug;
pub mod hil;
pub mod utilities;

mod errorcode;

pub use crate::errorcode::ErrorCode;
