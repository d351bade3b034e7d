// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interfaces for digital outputs and inputs.
//!
//! Outputs are addressed a whole 8-bit port at a time through a bit mask, the
//! way the servo headers share one port and one latch register. Inputs are
//! single pins that can be read and can source edge interrupts.

/// Enum for selecting which edge to trigger interrupts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterruptEdge {
    RisingEdge,
    FallingEdge,
    EitherEdge,
}

/// An 8-bit output port with a latch and a per-line output driver.
///
/// The latch holds the level each line drives once its output driver is
/// enabled. Lines whose driver is disabled float regardless of the latch.
pub trait Port {
    /// Drive every line in `mask` high. Lines outside `mask` are unchanged.
    fn set(&self, mask: u8);

    /// Drive every line in `mask` low. Lines outside `mask` are unchanged.
    fn clear(&self, mask: u8);

    /// Enable the output driver of every line in `mask`. The line starts
    /// driving the current latch value immediately, so callers wanting a
    /// clean start write the latch first.
    fn make_output(&self, mask: u8);

    /// Returns the mask of lines whose output driver is enabled.
    fn outputs(&self) -> u8;

    /// Returns the latch contents.
    fn latch(&self) -> u8;
}

pub trait Input {
    /// Get the current level of the input pin.
    fn read(&self) -> bool;
}

pub trait Interrupt<'a>: Input {
    /// Set the client for interrupt events.
    fn set_client(&self, client: &'a dyn Client);

    /// Enable an interrupt on the pin. This does not configure the pin except
    /// to enable an interrupt: it should be separately configured as an
    /// input.
    fn enable_interrupts(&self, mode: InterruptEdge);

    /// Disable interrupts for the pin.
    fn disable_interrupts(&self);

    /// Return whether this interrupt is pending.
    fn is_pending(&self) -> bool;
}

/// Interface for users of synchronous GPIO interrupts. In order to receive
/// interrupts, the user must implement this `Client` interface.
pub trait Client {
    /// Called when an interrupt occurs, in interrupt context.
    fn fired(&self);
}
