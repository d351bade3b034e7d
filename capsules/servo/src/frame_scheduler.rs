// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Servo frames driven by a periodic timer interrupt.
//!
//! The time base ticks every `tick_period_us`. The scheduler counts ticks
//! down from `ticks_per_frame - 1`; on the tick that finds the count at zero
//! it emits one pulse per channel, from inside the interrupt handler, and
//! reloads the count. A frame is therefore exactly `ticks_per_frame` ticks
//! long whatever the pulse widths and whatever the foreground loop does.
//!
//! ```text
//! WAITING(n) --tick--> WAITING(n - 1)                 n > 0
//! WAITING(0) --tick--> emit all channels; WAITING(N - 1)
//! ```
//!
//! The pulses of one frame may run past the next tick. That tick stays
//! pending and is serviced when they end, which only decrements the count.
//! They must end before the tick after it, whose trigger would otherwise be
//! lost. With one tick per frame the next tick starts the next frame, so the
//! pulses must fit in a single tick. `start` enforces both limits.
//!
//! The time base stops in sleep, so a board using this scheduler must not
//! put the core to sleep.

use core::cell::Cell;

use kernel::config::CONFIG;
use kernel::debug;
use kernel::hil::servo::{Channel, FrameDriver, ServoPulse};
use kernel::hil::time::{BusyWait, ConvertTicks, Time, Timer, TimerClient};
use kernel::ErrorCode;

use crate::position::ServoPositions;
use crate::timing::{self, ServoConfig};

pub struct FrameScheduler<'a, T: Timer<'a> + BusyWait, S: ServoPulse> {
    timer: &'a T,
    emitter: &'a S,
    positions: &'a ServoPositions,
    channels: &'a [Channel],
    ticks_per_frame: u32,
    tick_period: <T as Time>::Ticks,
    input_poll_delay: <T as Time>::Ticks,
    countdown: Cell<u32>,
    started: Cell<bool>,
    frames: Cell<usize>,
    reported: Cell<usize>,
}

impl<'a, T: Timer<'a> + BusyWait, S: ServoPulse> FrameScheduler<'a, T, S> {
    pub fn new(
        timer: &'a T,
        emitter: &'a S,
        positions: &'a ServoPositions,
        channels: &'a [Channel],
        config: &ServoConfig,
    ) -> FrameScheduler<'a, T, S> {
        FrameScheduler {
            timer,
            emitter,
            positions,
            channels,
            ticks_per_frame: config.ticks_per_frame,
            tick_period: timer.ticks_from_us(config.tick_period_us),
            input_poll_delay: timer.ticks_from_ms(config.input_poll_delay_ms),
            countdown: Cell::new(config.ticks_per_frame.saturating_sub(1)),
            started: Cell::new(false),
            frames: Cell::new(0),
            reported: Cell::new(0),
        }
    }

    /// Ticks left before the next frame's pulses.
    pub fn countdown(&self) -> u32 {
        self.countdown.get()
    }

    /// Stop the time base. Pulses in progress complete; no frame follows.
    pub fn stop(&self) -> Result<(), ErrorCode> {
        if !self.started.get() {
            return Err(ErrorCode::OFF);
        }
        self.started.set(false);
        self.timer.cancel()
    }

    /// Check the period the time base achieved against the frame's needs.
    fn check_achieved_period(&self) -> Result<(), ErrorCode> {
        let tick_us = self
            .timer
            .interval()
            .map_or(0, |interval| self.timer.ticks_to_us(interval));
        let frame_us = tick_us.saturating_mul(self.ticks_per_frame);
        if !timing::frame_within_servo_limits(frame_us) {
            debug!("servo: frame period {}us outside servo range", frame_us);
            return Err(ErrorCode::INVAL);
        }
        let pulses_us = (self.channels.len() as u32).saturating_mul(self.emitter.max_pulse_us());
        let window_us = tick_us.saturating_mul(self.ticks_per_frame.min(2));
        if pulses_us >= window_us {
            debug!(
                "servo: {} channels need {}us, window is {}us",
                self.channels.len(),
                pulses_us,
                window_us
            );
            return Err(ErrorCode::SIZE);
        }
        debug!(
            "servo: {} channel(s), tick {}us, frame {}us",
            self.channels.len(),
            tick_us,
            frame_us
        );
        Ok(())
    }

    fn report_frames(&self) {
        let frames = self.frames.get();
        if frames != self.reported.get() {
            self.reported.set(frames);
            debug!("servo: frame {} countdown {}", frames, self.countdown.get());
        }
    }
}

impl<'a, T: Timer<'a> + BusyWait, S: ServoPulse> FrameDriver for FrameScheduler<'a, T, S> {
    fn start(&self) -> Result<(), ErrorCode> {
        if self.started.get() {
            return Err(ErrorCode::ALREADY);
        }
        if self.channels.is_empty() || self.ticks_per_frame == 0 {
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

        self.countdown.set(self.ticks_per_frame - 1);
        self.frames.set(0);
        self.reported.set(0);
        self.timer.repeat(self.tick_period)?;
        if let Err(e) = self.check_achieved_period() {
            let _ = self.timer.cancel();
            return Err(e);
        }
        self.started.set(true);
        Ok(())
    }

    fn foreground(&self) {
        self.timer.spin_until(self.timer.now(), self.input_poll_delay);
        if CONFIG.trace_frames {
            self.report_frames();
        }
    }

    fn frames(&self) -> usize {
        self.frames.get()
    }
}

impl<'a, T: Timer<'a> + BusyWait, S: ServoPulse> TimerClient for FrameScheduler<'a, T, S> {
    fn timer(&self) {
        let remaining = self.countdown.get();
        if remaining > 0 {
            self.countdown.set(remaining - 1);
            return;
        }
        self.countdown.set(self.ticks_per_frame.saturating_sub(1));
        for &channel in self.channels {
            // start() verified every channel; a failed pulse is superseded by
            // the next frame.
            let _ = self.emitter.emit_pulse(channel, self.positions.get(channel));
        }
        self.frames.set(self.frames.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::pulse::ServoPulseEmitter;
    use crate::timing::SERVO_90_DEGREE;
    use kernel::hil::time::Ticks;
    use std::boxed::Box;
    use std::vec::Vec;
    use virtual_mcu::VirtualMcu;

    type Emitter = ServoPulseEmitter<'static, VirtualMcu<'static>, VirtualMcu<'static>>;
    type Scheduler = FrameScheduler<'static, VirtualMcu<'static>, Emitter>;

    fn leak<V>(value: V) -> &'static V {
        Box::leak(Box::new(value))
    }

    fn scheduler(channels: &'static [Channel]) -> (&'static VirtualMcu<'static>, &'static Scheduler) {
        let mcu = leak(VirtualMcu::new(0));
        let emitter = leak(ServoPulseEmitter::new(mcu, mcu, &SERVO_90_DEGREE));
        let positions = leak(ServoPositions::new());
        for channel in channels {
            emitter.configure_output(*channel).unwrap();
        }
        let scheduler = leak(FrameScheduler::new(
            mcu,
            emitter,
            positions,
            channels,
            &SERVO_90_DEGREE,
        ));
        mcu.set_timer_client(scheduler);
        mcu.enable_interrupts();
        (mcu, scheduler)
    }

    #[test]
    fn countdown_emits_on_every_third_tick() {
        let (mcu, scheduler) = scheduler(&[Channel::Servo1]);
        let mut countdowns = Vec::new();
        let mut frames = Vec::new();
        for _ in 0..7 {
            scheduler.timer();
            countdowns.push(scheduler.countdown());
            frames.push(scheduler.frames());
        }
        assert_eq!(countdowns, [1, 0, 2, 1, 0, 2, 1]);
        assert_eq!(frames, [0, 0, 1, 1, 1, 2, 2]);
        assert_eq!(mcu.pulses(Channel::Servo1.mask()).len(), 2);
    }

    #[test]
    fn start_programs_the_time_base() {
        let (mcu, scheduler) = scheduler(&[Channel::Servo1]);
        assert_eq!(scheduler.start(), Ok(()));
        assert_eq!(scheduler.countdown(), 2);
        assert_eq!(mcu.interval().map(|i| i.into_u32()), Some(60_160));
        assert_eq!(scheduler.start(), Err(ErrorCode::ALREADY));
    }

    #[test]
    fn start_rejects_bad_channel_lists() {
        let (_, empty) = scheduler(&[]);
        assert_eq!(empty.start(), Err(ErrorCode::INVAL));

        let (mcu, _) = scheduler(&[Channel::Servo1]);
        let emitter = leak(ServoPulseEmitter::new(mcu, mcu, &SERVO_90_DEGREE));
        let unconfigured = FrameScheduler::new(
            mcu,
            emitter,
            leak(ServoPositions::new()),
            &[Channel::Servo1],
            &SERVO_90_DEGREE,
        );
        assert_eq!(unconfigured.start(), Err(ErrorCode::NODEVICE));
        assert!(!mcu.is_running());
    }

    #[test]
    fn pulses_may_overrun_one_tick_but_not_two() {
        static ALL: [Channel; 8] = Channel::ALL;
        // Two ticks are 10026us; a full-scale pulse is 1999us.
        let (mcu, six) = scheduler(&ALL[..6]);
        assert_eq!(six.start(), Err(ErrorCode::SIZE));
        assert!(!mcu.is_running());

        let (mcu, five) = scheduler(&ALL[..5]);
        assert_eq!(five.start(), Ok(()));
        assert!(mcu.is_running());
    }

    #[test]
    fn stop_cancels_the_time_base() {
        let (mcu, scheduler) = scheduler(&[Channel::Servo1]);
        assert_eq!(scheduler.stop(), Err(ErrorCode::OFF));
        scheduler.start().unwrap();
        while scheduler.frames() < 2 {
            scheduler.foreground();
        }
        assert_eq!(scheduler.stop(), Ok(()));
        let pulses = mcu.pulses(Channel::Servo1.mask()).len();
        for _ in 0..10 {
            scheduler.foreground();
        }
        assert_eq!(mcu.pulses(Channel::Servo1.mask()).len(), pulses);
        assert_eq!(scheduler.frames(), 2);
    }
}
