// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! The MCU core: instruction clock, interrupt dispatch and scheduled input
//! changes.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use kernel::hil::time::{BusyWait, Freq12MHz, Ticks, Ticks32, Time};

use crate::interrupts::{InterruptControl, Source};
use crate::portb::{Change, PinId, PortB, PortBPin};
use crate::portc::PortC;
use crate::tmr0::Tmr0;
use crate::trace::{Edge, EdgeTrace, Pulse};

/// Instruction clock: the 48 MHz oscillator divided by four.
pub const INSTRUCTION_CLOCK_HZ: u64 = 12_000_000;

/// Instruction cycles in `us` microseconds.
pub const fn cycles_from_us(us: u64) -> u64 {
    us * (INSTRUCTION_CLOCK_HZ / 1_000_000)
}

struct InputEvent {
    cycle: u64,
    pin: PinId,
    high: bool,
}

enum Due {
    Overflow(u64),
    Input(u64),
}

pub struct VirtualMcu<'a> {
    cycles: Cell<u64>,
    in_handler: Cell<bool>,
    serviced: Cell<usize>,
    missed: Cell<usize>,
    inputs: RefCell<VecDeque<InputEvent>>,
    trace: RefCell<EdgeTrace>,
    pub(crate) intcon: InterruptControl,
    pub(crate) tmr0: Tmr0<'a>,
    pub(crate) portc: PortC,
    pub(crate) portb: PortB<'a>,
}

impl<'a> VirtualMcu<'a> {
    /// A part fresh out of reset. Interrupts are globally disabled and every
    /// PORTC line is an input; `latch_at_reset` is the undefined power-up
    /// content of the PORTC latch.
    pub fn new(latch_at_reset: u8) -> VirtualMcu<'a> {
        let portc = PortC::new(latch_at_reset);
        let trace = EdgeTrace::new(portc.driven());
        VirtualMcu {
            cycles: Cell::new(0),
            in_handler: Cell::new(false),
            serviced: Cell::new(0),
            missed: Cell::new(0),
            inputs: RefCell::new(VecDeque::new()),
            trace: RefCell::new(trace),
            intcon: InterruptControl::new(),
            tmr0: Tmr0::new(),
            portc,
            portb: PortB::new(),
        }
    }

    /// Instruction cycles since reset.
    pub fn cycles(&self) -> u64 {
        self.cycles.get()
    }

    pub fn portb_pin(&'a self, pin: PinId) -> PortBPin<'a> {
        PortBPin::new(self, pin)
    }

    /// Set GIE and service anything already pending.
    pub fn enable_interrupts(&self) {
        self.intcon.set_global(true);
        self.service_pending_interrupts();
    }

    pub fn disable_interrupts(&self) {
        self.intcon.set_global(false);
    }

    /// Run `f` with interrupts globally disabled. Triggers arriving meanwhile
    /// stay latched and are serviced when `f` returns.
    pub fn atomic<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let enabled = self.intcon.global();
        self.intcon.set_global(false);
        let result = f();
        if enabled {
            self.enable_interrupts();
        }
        result
    }

    /// Whether the foreground is currently preempted by a handler.
    pub fn in_interrupt(&self) -> bool {
        self.in_handler.get()
    }

    /// Number of handler invocations.
    pub fn serviced_interrupts(&self) -> usize {
        self.serviced.get()
    }

    /// Number of triggers lost because their pending flag was still set.
    pub fn missed_interrupts(&self) -> usize {
        self.missed.get()
    }

    /// Change the level of `pin` at `cycle`. Changes scheduled for the same
    /// cycle are applied in the order they were scheduled.
    pub fn schedule_input(&self, cycle: u64, pin: PinId, high: bool) {
        let mut inputs = self.inputs.borrow_mut();
        let at = inputs.partition_point(|event| event.cycle <= cycle);
        inputs.insert(at, InputEvent { cycle, pin, high });
    }

    /// Hold the button on `pin` down from `at` for `duration` cycles.
    pub fn schedule_press(&self, pin: PinId, at: u64, duration: u64) {
        self.schedule_input(at, pin, false);
        self.schedule_input(at + duration, pin, true);
    }

    /// Every edge on the driven PORTC lines since reset or `clear_trace`.
    pub fn edges(&self) -> Vec<Edge> {
        self.trace.borrow().edges().to_vec()
    }

    /// Complete pulses on the PORTC lines in `mask`.
    pub fn pulses(&self, mask: u8) -> Vec<Pulse> {
        self.trace.borrow().pulses(mask)
    }

    pub fn clear_trace(&self) {
        self.trace.borrow_mut().clear();
    }

    /// Let time pass until `cycle`. Used for foreground waits; interrupts
    /// preempt it as they fall due.
    pub fn run_until(&self, cycle: u64) {
        self.advance_to(cycle);
    }

    pub(crate) fn record_outputs(&self) {
        self.trace
            .borrow_mut()
            .record(self.cycles.get(), self.portc.driven());
    }

    fn next_due(&self, target: u64) -> Option<Due> {
        let overflow = self.tmr0.next_overflow().filter(|&at| at <= target);
        let input = self
            .inputs
            .borrow()
            .front()
            .map(|event| event.cycle)
            .filter(|&at| at <= target);
        match (overflow, input) {
            (Some(o), Some(i)) if i < o => Some(Due::Input(i)),
            (Some(o), _) => Some(Due::Overflow(o)),
            (None, Some(i)) => Some(Due::Input(i)),
            (None, None) => None,
        }
    }

    /// Move the clock to `target`, delivering every trigger that falls due on
    /// the way in cycle order. Handlers run at the cycle their trigger
    /// arrived and may carry the clock past `target`.
    fn advance_to(&self, target: u64) {
        while let Some(due) = self.next_due(target) {
            match due {
                Due::Overflow(at) => {
                    self.cycles.set(self.cycles.get().max(at));
                    self.tmr0.overflow();
                    if !self.intcon.raise(Source::Timer0) {
                        self.missed.set(self.missed.get() + 1);
                    }
                }
                Due::Input(at) => {
                    self.cycles.set(self.cycles.get().max(at));
                    let event = self.inputs.borrow_mut().pop_front();
                    if let Some(event) = event {
                        match self.portb.drive(event.pin, event.high) {
                            Change::Latched => {
                                self.intcon.raise(Source::PortBChange);
                            }
                            Change::Lost => self.missed.set(self.missed.get() + 1),
                            Change::Ignored => {}
                        }
                    }
                }
            }
            self.service_pending_interrupts();
        }
        if self.cycles.get() < target {
            self.cycles.set(target);
        }
    }

    /// Run the handler for every pending, enabled source. Does nothing while
    /// GIE is clear or a handler is already running: the flags stay set
    /// until the current handler returns.
    fn service_pending_interrupts(&self) {
        if self.in_handler.get() || !self.intcon.global() {
            return;
        }
        while let Some(source) = self.intcon.next_pending() {
            self.in_handler.set(true);
            self.intcon.clear(source);
            match source {
                Source::Timer0 => self.tmr0.handle_interrupt(),
                Source::PortBChange => self.portb.handle_interrupt(),
            }
            self.in_handler.set(false);
            self.serviced.set(self.serviced.get() + 1);
        }
    }
}

impl Time for VirtualMcu<'_> {
    type Frequency = Freq12MHz;
    type Ticks = Ticks32;

    fn now(&self) -> Ticks32 {
        Ticks32::from(self.cycles.get() as u32)
    }
}

impl BusyWait for VirtualMcu<'_> {
    fn spin_until(&self, reference: Ticks32, dt: Ticks32) {
        let elapsed = self.now().wrapping_sub(reference);
        if elapsed < dt {
            let remaining = dt.wrapping_sub(elapsed).into_u32() as u64;
            self.advance_to(self.cycles.get() + remaining);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::hil::gpio::{Client, Input, Interrupt, InterruptEdge, Port};
    use kernel::hil::time::{Timer, TimerClient};
    use kernel::ErrorCode;

    fn leak<T>(value: T) -> &'static T {
        Box::leak(Box::new(value))
    }

    /// Records when it runs; optionally spins inside the handler.
    struct Recorder {
        mcu: &'static VirtualMcu<'static>,
        spins: RefCell<VecDeque<u32>>,
        calls: RefCell<Vec<u64>>,
    }

    impl Recorder {
        fn new(mcu: &'static VirtualMcu<'static>, spins: &[u32]) -> &'static Recorder {
            leak(Recorder {
                mcu,
                spins: RefCell::new(spins.iter().copied().collect()),
                calls: RefCell::new(Vec::new()),
            })
        }

        fn run(&self) {
            self.calls.borrow_mut().push(self.mcu.cycles());
            let spin = self.spins.borrow_mut().pop_front();
            if let Some(spin) = spin {
                self.mcu.spin_until(self.mcu.now(), Ticks32::from(spin));
            }
        }
    }

    impl TimerClient for Recorder {
        fn timer(&self) {
            self.run();
        }
    }

    impl Client for Recorder {
        fn fired(&self) {
            self.run();
        }
    }

    fn timer_with(spins: &[u32]) -> (&'static VirtualMcu<'static>, &'static Recorder) {
        let mcu = leak(VirtualMcu::new(0));
        let recorder = Recorder::new(mcu, spins);
        mcu.set_timer_client(recorder);
        mcu.enable_interrupts();
        (mcu, recorder)
    }

    #[test]
    fn overflows_are_one_period_apart() {
        let (mcu, recorder) = timer_with(&[]);
        mcu.repeat(Ticks32::from(60_000)).unwrap();
        assert_eq!(mcu.interval(), Some(Ticks32::from(60_160)));

        mcu.run_until(10 * 60_160);
        let calls = recorder.calls.borrow();
        assert_eq!(calls.len(), 10);
        for (i, at) in calls.iter().enumerate() {
            assert_eq!(*at, (i as u64 + 1) * 60_160);
        }
    }

    #[test]
    fn trigger_during_handler_is_held_and_a_second_is_lost() {
        // 1000 cycles per period. The first handler runs from 1000 to 3500,
        // across the overflows at 2000 and 3000.
        let (mcu, recorder) = timer_with(&[2500]);
        mcu.repeat(Ticks32::from(1000)).unwrap();
        assert_eq!(mcu.interval(), Some(Ticks32::from(1000)));

        mcu.run_until(4500);
        assert_eq!(*recorder.calls.borrow(), vec![1000, 3500, 4000]);
        assert_eq!(mcu.missed_interrupts(), 1);
        assert_eq!(mcu.serviced_interrupts(), 3);
    }

    #[test]
    fn foreground_wait_is_preempted() {
        let (mcu, recorder) = timer_with(&[300]);
        mcu.repeat(Ticks32::from(1000)).unwrap();

        // The handler ends inside the wait, which keeps its deadline.
        mcu.spin_until(Ticks32::from(0), Ticks32::from(900));
        assert_eq!(mcu.cycles(), 900);
        mcu.spin_until(Ticks32::from(900), Ticks32::from(200));
        assert_eq!(*recorder.calls.borrow(), vec![1000]);
        // The handler ran past the deadline of 1100.
        assert_eq!(mcu.cycles(), 1300);
    }

    #[test]
    fn pending_flags_wait_for_global_enable() {
        let mcu = leak(VirtualMcu::new(0));
        let recorder = Recorder::new(mcu, &[]);
        mcu.set_timer_client(recorder);
        mcu.repeat(Ticks32::from(1000)).unwrap();

        mcu.run_until(3500);
        assert!(recorder.calls.borrow().is_empty());
        assert_eq!(mcu.missed_interrupts(), 2);

        mcu.enable_interrupts();
        assert_eq!(*recorder.calls.borrow(), vec![3500]);
    }

    #[test]
    fn atomic_defers_handlers_to_the_end() {
        let (mcu, recorder) = timer_with(&[]);
        mcu.repeat(Ticks32::from(1000)).unwrap();

        let inside = mcu.atomic(|| {
            mcu.run_until(1500);
            recorder.calls.borrow().len()
        });
        assert_eq!(inside, 0);
        assert_eq!(*recorder.calls.borrow(), vec![1500]);
    }

    #[test]
    fn timer_rejects_unreachable_intervals_and_double_cancel() {
        let mcu = VirtualMcu::new(0);
        assert_eq!(mcu.repeat(Ticks32::from(0)), Err(ErrorCode::INVAL));
        assert_eq!(mcu.repeat(Ticks32::from(1_000_000)), Err(ErrorCode::INVAL));
        assert!(!mcu.is_running());
        assert_eq!(mcu.cancel(), Err(ErrorCode::OFF));

        mcu.repeat(Ticks32::from(1000)).unwrap();
        assert!(mcu.is_running());
        assert_eq!(mcu.cancel(), Ok(()));
        assert_eq!(mcu.interval(), None);
        mcu.run_until(5000);
        assert_eq!(mcu.missed_interrupts(), 0);
    }

    #[test]
    fn enabling_a_line_drives_the_latch() {
        let mcu = VirtualMcu::new(0xFF);
        assert!(mcu.edges().is_empty());

        // Clearing the latch first keeps the line low.
        mcu.clear(0x01);
        mcu.make_output(0x01);
        assert!(mcu.edges().is_empty());
        assert_eq!(mcu.outputs(), 0x01);

        // Without it the power-up latch content appears on the pin.
        mcu.make_output(0x02);
        assert_eq!(mcu.edges(), vec![Edge { cycle: 0, value: 0x02 }]);
    }

    #[test]
    fn undriven_lines_leave_no_trace() {
        let mcu = VirtualMcu::new(0);
        mcu.set(0x04);
        assert_eq!(mcu.latch(), 0x04);
        assert!(mcu.edges().is_empty());
    }

    #[test]
    fn falling_edge_fires_the_pin_client() {
        let mcu = leak(VirtualMcu::new(0));
        let recorder = Recorder::new(mcu, &[]);
        let pin = leak(mcu.portb_pin(PinId::RB5));
        pin.set_client(recorder);
        pin.enable_interrupts(InterruptEdge::FallingEdge);
        mcu.enable_interrupts();
        assert!(pin.read());

        mcu.schedule_press(PinId::RB5, 100, 50);
        mcu.run_until(120);
        assert!(!pin.read());
        mcu.run_until(1000);
        assert!(pin.read());
        assert_eq!(*recorder.calls.borrow(), vec![100]);
    }

    #[test]
    fn second_edge_on_a_flagged_pin_is_lost() {
        let mcu = leak(VirtualMcu::new(0));
        let recorder = Recorder::new(mcu, &[]);
        let pin = leak(mcu.portb_pin(PinId::RB4));
        pin.set_client(recorder);
        pin.enable_interrupts(InterruptEdge::EitherEdge);

        mcu.schedule_press(PinId::RB4, 10, 10);
        mcu.run_until(100);
        assert!(pin.is_pending());
        assert_eq!(mcu.missed_interrupts(), 1);

        mcu.enable_interrupts();
        assert!(!pin.is_pending());
        assert_eq!(recorder.calls.borrow().len(), 1);
    }

    #[test]
    fn inputs_and_overflows_arrive_in_order() {
        let (mcu, recorder) = timer_with(&[]);
        let pin = leak(mcu.portb_pin(PinId::RB7));
        pin.set_client(recorder);
        pin.enable_interrupts(InterruptEdge::FallingEdge);
        mcu.repeat(Ticks32::from(1000)).unwrap();

        mcu.schedule_input(1500, PinId::RB7, false);
        mcu.run_until(2000);
        assert_eq!(*recorder.calls.borrow(), vec![1000, 1500, 2000]);
    }
}
