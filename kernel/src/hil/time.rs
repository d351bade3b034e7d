// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Hardware agnostic interfaces for time and timers.
//!
//! Three capabilities are separated here:
//!
//! - [`Time`]: a free-running counter that can be read.
//! - [`BusyWait`]: holding the calling context until a deadline on that
//!   counter has passed. This is the calibrated spin that servo pulses are
//!   built from.
//! - [`Timer`]: a periodic time base that raises one interrupt per period and
//!   notifies a [`TimerClient`].

use core::fmt;

use crate::ErrorCode;

/// An integer type defining the width of a time value, which allows clients
/// to know when wraparound will occur.
pub trait Ticks: Clone + Copy + From<u32> + fmt::Debug + Ord + PartialOrd + Eq {
    /// Converts the type into a `u32`, truncating if necessary.
    fn into_u32(self) -> u32;

    /// Add two values, wrapping around on overflow using standard unsigned
    /// arithmetic.
    fn wrapping_add(self, other: Self) -> Self;

    /// Subtract two values, wrapping around on underflow using standard
    /// unsigned arithmetic.
    fn wrapping_sub(self, other: Self) -> Self;
}

/// 32-bit `Ticks`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticks32(u32);

impl From<u32> for Ticks32 {
    fn from(val: u32) -> Self {
        Ticks32(val)
    }
}

impl Ticks for Ticks32 {
    fn into_u32(self) -> u32 {
        self.0
    }

    fn wrapping_add(self, other: Self) -> Self {
        Ticks32(self.0.wrapping_add(other.0))
    }

    fn wrapping_sub(self, other: Self) -> Self {
        Ticks32(self.0.wrapping_sub(other.0))
    }
}

/// Trait to represent clock frequency in Hz
///
/// This trait is used as an associated type for `Time` so clients can
/// portably convert native ticks to real-time values.
pub trait Frequency {
    /// Returns frequency in Hz.
    fn frequency() -> u32;
}

/// 12MHz `Frequency`, the instruction clock of a 48MHz core executing one
/// instruction every four oscillator cycles.
#[derive(Debug)]
pub struct Freq12MHz;
impl Frequency for Freq12MHz {
    fn frequency() -> u32 {
        12_000_000
    }
}

/// An abstraction of a free-running counter.
pub trait Time {
    /// The number of ticks per second.
    type Frequency: Frequency;
    /// The width of a time value.
    type Ticks: Ticks;

    /// Returns the current value of the counter.
    fn now(&self) -> Self::Ticks;
}

/// Converts between real-time values and the ticks of a [`Time`].
///
/// All conversions round to the nearest tick and saturate at the largest
/// `u32`. They involve a division, so callers on a timing-critical path
/// convert once up front and keep the tick values.
pub trait ConvertTicks<T: Ticks> {
    /// Returns the number of ticks in the provided number of nanoseconds.
    fn ticks_from_ns(&self, ns: u32) -> T;

    /// Returns the number of ticks in the provided number of microseconds.
    fn ticks_from_us(&self, us: u32) -> T;

    /// Returns the number of ticks in the provided number of milliseconds.
    fn ticks_from_ms(&self, ms: u32) -> T;

    /// Returns the number of microseconds in the provided number of ticks.
    fn ticks_to_us(&self, tick: T) -> u32;
}

fn scale_rounded(value: u64, numerator: u64, denominator: u64) -> u32 {
    let scaled = (value * numerator + denominator / 2) / denominator;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

impl<T: Time + ?Sized> ConvertTicks<<T as Time>::Ticks> for T {
    fn ticks_from_ns(&self, ns: u32) -> <T as Time>::Ticks {
        let freq = <T::Frequency>::frequency() as u64;
        scale_rounded(ns as u64, freq, 1_000_000_000).into()
    }

    fn ticks_from_us(&self, us: u32) -> <T as Time>::Ticks {
        let freq = <T::Frequency>::frequency() as u64;
        scale_rounded(us as u64, freq, 1_000_000).into()
    }

    fn ticks_from_ms(&self, ms: u32) -> <T as Time>::Ticks {
        let freq = <T::Frequency>::frequency() as u64;
        scale_rounded(ms as u64, freq, 1_000).into()
    }

    fn ticks_to_us(&self, tick: <T as Time>::Ticks) -> u32 {
        let freq = <T::Frequency>::frequency() as u64;
        scale_rounded(tick.into_u32() as u64, 1_000_000, freq)
    }
}

/// A [`Time`] that can hold the calling context until a deadline passes.
///
/// Implementations must never yield or sleep: a spin runs to completion in
/// the context that called it. A spin in the foreground may still be
/// preempted by interrupts, which lengthens it only if the handler runs past
/// the deadline. A spin inside an interrupt handler keeps the handler's
/// priority, so other interrupts stay pending until the handler returns.
pub trait BusyWait: Time {
    /// Spin until `dt` ticks have elapsed since `reference`.
    ///
    /// Waiting against a fixed `reference` with a growing `dt` lets callers
    /// chain several waits without accumulating the overshoot of each one.
    /// `dt` must be below half the counter range.
    fn spin_until(&self, reference: Self::Ticks, dt: Self::Ticks) {
        while self.now().wrapping_sub(reference) < dt {
            core::hint::spin_loop();
        }
    }
}

/// A periodic time base that raises one interrupt per period.
///
/// Each period sets a single hardware pending flag. If a period ends while
/// the flag from the previous one is still set, that trigger is lost: at most
/// one trigger is ever held pending.
pub trait Timer<'a>: Time {
    /// Set the client for period events.
    fn set_timer_client(&self, client: &'a dyn TimerClient);

    /// Start firing every `interval` ticks, replacing any running period.
    ///
    /// Hardware with a coarse reload mechanism programs the shortest period it
    /// can express that is not shorter than `interval`; [`Timer::interval`]
    /// returns that period. Returns `INVAL` if no such period exists.
    fn repeat(&self, interval: Self::Ticks) -> Result<(), ErrorCode>;

    /// Returns the programmed period, or `None` if the timer is stopped.
    fn interval(&self) -> Option<Self::Ticks>;

    /// Returns whether the timer is running.
    fn is_running(&self) -> bool {
        self.interval().is_some()
    }

    /// Stop the timer and discard a pending trigger.
    ///
    /// Returns `OFF` if the timer was not running.
    fn cancel(&self) -> Result<(), ErrorCode>;
}

/// A client of an implementer of the [`Timer`] trait.
pub trait TimerClient {
    /// Callback signaled once per timer period, in interrupt context.
    fn timer(&self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct Freq1MHz;
    impl Frequency for Freq1MHz {
        fn frequency() -> u32 {
            1_000_000
        }
    }

    struct StepClock<F: Frequency> {
        now: Cell<u32>,
        step: u32,
        reads: Cell<u32>,
        _freq: core::marker::PhantomData<F>,
    }

    impl<F: Frequency> StepClock<F> {
        fn new(start: u32, step: u32) -> Self {
            StepClock {
                now: Cell::new(start),
                step,
                reads: Cell::new(0),
                _freq: core::marker::PhantomData,
            }
        }
    }

    impl<F: Frequency> Time for StepClock<F> {
        type Frequency = F;
        type Ticks = Ticks32;

        fn now(&self) -> Ticks32 {
            let now = self.now.get();
            self.now.set(now.wrapping_add(self.step));
            self.reads.set(self.reads.get() + 1);
            Ticks32::from(now)
        }
    }

    impl<F: Frequency> BusyWait for StepClock<F> {}

    #[test]
    fn arithmetic_wraps_around() {
        let start = Ticks32::from(u32::MAX - 10);
        let end = start.wrapping_add(Ticks32::from(20));
        assert_eq!(end.into_u32(), 9);
        assert_eq!(end.wrapping_sub(start).into_u32(), 20);
    }

    #[test]
    fn conversions_round_to_nearest_tick() {
        let clock: StepClock<Freq12MHz> = StepClock::new(0, 0);
        assert_eq!(clock.ticks_from_us(1000).into_u32(), 12_000);
        assert_eq!(clock.ticks_from_ns(3922).into_u32(), 47);
        assert_eq!(clock.ticks_from_ms(15).into_u32(), 180_000);
        assert_eq!(clock.ticks_to_us(Ticks32::from(23_985)), 1999);

        let slow: StepClock<Freq1MHz> = StepClock::new(0, 0);
        assert_eq!(slow.ticks_from_ns(3922).into_u32(), 4);
        assert_eq!(slow.ticks_from_ns(400).into_u32(), 0);
    }

    #[test]
    fn conversions_saturate() {
        let clock: StepClock<Freq12MHz> = StepClock::new(0, 0);
        assert_eq!(clock.ticks_from_ms(u32::MAX).into_u32(), u32::MAX);
    }

    #[test]
    fn default_spin_reads_counter_until_deadline() {
        let clock: StepClock<Freq1MHz> = StepClock::new(100, 3);
        let reference = Ticks32::from(100);
        clock.spin_until(reference, Ticks32::from(10));
        // Reads at 100, 103, 106, 109 are short of the deadline; 112 is not.
        assert_eq!(clock.reads.get(), 5);
        assert_eq!(clock.now.get(), 115);
    }

    #[test]
    fn default_spin_survives_counter_wrap() {
        let clock: StepClock<Freq1MHz> = StepClock::new(u32::MAX - 4, 2);
        clock.spin_until(Ticks32::from(u32::MAX - 4), Ticks32::from(8));
        assert_eq!(clock.reads.get(), 5);
    }
}
