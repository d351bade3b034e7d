// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Utility types provided by the kernel crate.

pub mod static_init;

/// The Tock Register Interface.
///
/// This is a re-export of the `tock-registers` crate provided for
/// convenience, so chip crates describe their peripherals without depending
/// on it directly.
pub mod registers {
    pub use tock_registers::fields::{Field, FieldValue};
    pub use tock_registers::interfaces;
    pub use tock_registers::register_bitfields;
    pub use tock_registers::registers::InMemoryRegister;
    pub use tock_registers::{LocalRegisterCopy, RegisterLongName};
}

/// The Tock `Cell` types.
///
/// This is a re-export of the `tock-cells` crate provided for convenience.
///
/// To use `OptionalCell`, for example, users should use:
///
///     use kernel::utilities::cells::OptionalCell;
pub mod cells {
    pub use tock_cells::optional_cell::OptionalCell;
}
