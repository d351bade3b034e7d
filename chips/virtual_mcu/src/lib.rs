// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Host-side model of the 8-bit servo controller MCU.
//!
//! The model counts instruction cycles instead of running in real time. A
//! busy wait jumps the cycle counter to its deadline and on the way delivers
//! every timer overflow and input edge that falls inside the wait, in
//! order, with the interrupt rules of the real part: one pending flag per
//! source, a non-reentrant handler, and triggers that are lost when their
//! flag is still set.
//!
//! Peripherals modelled:
//!
//! - TMR0, an 8-bit timer with prescaler, used as the frame time base.
//! - PORTC, the servo output port, with an edge trace of the driven lines.
//! - PORTB RB4 to RB7, pushbutton inputs with interrupt-on-change.

pub mod chip;
pub mod interrupts;
pub mod portb;
pub mod portc;
pub mod tmr0;
pub mod trace;

pub use crate::chip::VirtualMcu;
pub use crate::portb::{PinId, PortBPin};
pub use crate::trace::{Edge, Pulse};
