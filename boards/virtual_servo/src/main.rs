// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Board file for the servo controller, running on the virtual MCU.
//!
//! Two servos hang off the SERVO1 and SERVO2 headers on PORTC. SERVO1
//! follows the pushbuttons: SW3 and SW4 step it down and up while held, SW2
//! and SW5 send it straight to either end. SERVO2 runs the sweep self test.
//!
//! Frames come from the TMR0 interrupt, or from the main loop when the
//! kernel is built with `polled_frames`. The board plays a fixed script of
//! button presses, then reports what a logic analyzer on the headers would
//! have measured.

use std::process::ExitCode;

use capsules_servo::frame_scheduler::FrameScheduler;
use capsules_servo::polled_frames::PolledFrames;
use capsules_servo::position::ServoPositions;
use capsules_servo::position_buttons::{PositionButtons, PositionPreset};
use capsules_servo::pulse::ServoPulseEmitter;
use capsules_servo::test::servo_sweep::ServoSweep;
use capsules_servo::timing::{ServoConfig, SERVO_90_DEGREE};
use kernel::config::CONFIG;
use kernel::debug;
use kernel::debug::DebugWriter;
use kernel::hil::gpio::Interrupt;
use kernel::hil::servo::{Channel, FrameDriver, ServoPulse};
use kernel::hil::time::{ConvertTicks, Ticks32, Timer};
use kernel::static_init;
use virtual_mcu::chip::cycles_from_us;
use virtual_mcu::trace::intervals;
use virtual_mcu::{PinId, PortBPin, VirtualMcu};

mod io;

const SERVO_CONFIG: ServoConfig = SERVO_90_DEGREE;
const _: () = assert!(SERVO_CONFIG.is_within_servo_limits());

static SERVO_CHANNELS: [Channel; 2] = [Channel::Servo1, Channel::Servo2];

const SW2: PinId = PinId::RB4;
const SW3: PinId = PinId::RB5;
const SW4: PinId = PinId::RB6;
const SW5: PinId = PinId::RB7;

/// Length of the scripted session.
const SESSION_US: u64 = 6_000_000;

/// Power-up content of the PORTC latch. Any value works; a high one shows
/// that configuring the outputs does not glitch them.
const LATCH_AT_RESET: u8 = 0xFF;

type Mcu = VirtualMcu<'static>;
type Emitter = ServoPulseEmitter<'static, Mcu, Mcu>;
type Button = PortBPin<'static>;
type Preset = PositionPreset<'static, Button>;
type Scheduler = FrameScheduler<'static, Mcu, Emitter>;
type Polled = PolledFrames<'static, Mcu, Emitter>;

/// Button presses as (button, start, duration) in microseconds.
const SCRIPT: [(PinId, u64, u64); 4] = [
    (SW4, 100_000, 400_000),
    (SW3, 700_000, 300_000),
    (SW2, 1_200_000, 80_000),
    (SW5, 1_600_000, 80_000),
];

fn main() -> ExitCode {
    // Safety: `start` runs exactly once.
    unsafe { start() }
}

/// Set up the board and run the session.
///
/// # Safety
///
/// Must be called at most once: every object is placed with `static_init!`.
unsafe fn start() -> ExitCode {
    let writer: &'static DebugWriter = static_init!(DebugWriter, DebugWriter::new(&io::WRITER));
    kernel::debug::set_debug_writer(writer);

    let mcu: &'static Mcu = static_init!(Mcu, VirtualMcu::new(LATCH_AT_RESET));
    let emitter: &'static Emitter = static_init!(
        Emitter,
        ServoPulseEmitter::new(mcu, mcu, &SERVO_CONFIG)
    );
    for &channel in SERVO_CHANNELS.iter() {
        if let Err(e) = emitter.configure_output(channel) {
            debug!("Could not configure {:?}: {:?}", channel, e);
            return ExitCode::FAILURE;
        }
    }
    let positions: &'static ServoPositions =
        static_init!(ServoPositions, ServoPositions::new());

    let sw3: &'static Button = static_init!(Button, mcu.portb_pin(SW3));
    let sw4: &'static Button = static_init!(Button, mcu.portb_pin(SW4));
    let buttons = PositionButtons::new(positions, Channel::Servo1, sw3, sw4);

    let sw2: &'static Button = static_init!(Button, mcu.portb_pin(SW2));
    let to_low: &'static Preset = static_init!(
        Preset,
        PositionPreset::new(sw2, positions, Channel::Servo1, 0)
    );
    sw2.set_client(to_low);
    to_low.enable();
    let sw5: &'static Button = static_init!(Button, mcu.portb_pin(SW5));
    let to_high: &'static Preset = static_init!(
        Preset,
        PositionPreset::new(sw5, positions, Channel::Servo1, u8::MAX)
    );
    sw5.set_client(to_high);
    to_high.enable();

    let scheduler: &'static Scheduler = static_init!(
        Scheduler,
        FrameScheduler::new(mcu, emitter, positions, &SERVO_CHANNELS, &SERVO_CONFIG)
    );
    mcu.set_timer_client(scheduler);
    let polled: &'static Polled = static_init!(
        Polled,
        PolledFrames::new(mcu, emitter, positions, &SERVO_CHANNELS, &SERVO_CONFIG)
    );
    let driver: &dyn FrameDriver = if CONFIG.polled_frames {
        polled
    } else {
        scheduler
    };
    let sweep = ServoSweep::new(driver, positions, Channel::Servo2);

    for (button, start_us, duration_us) in SCRIPT {
        mcu.schedule_press(button, cycles_from_us(start_us), cycles_from_us(duration_us));
    }

    mcu.enable_interrupts();
    if let Err(e) = driver.start() {
        debug!("Could not start servo frames: {:?}", e);
        return ExitCode::FAILURE;
    }
    sweep.run();

    debug!(
        "Servo pulses {}..{} us, frames from {}.",
        SERVO_CONFIG.min_pulse_us(),
        SERVO_CONFIG.max_pulse_us(),
        if CONFIG.polled_frames {
            "the main loop"
        } else {
            "TMR0"
        }
    );
    debug!("Initialization complete. Entering main loop.");

    let end = cycles_from_us(SESSION_US);
    while mcu.cycles() < end {
        driver.foreground();
        buttons.sample();
        sweep.step();
    }

    report(mcu, driver);
    debug!(
        "SERVO1 presets: {} to low, {} to high. Sweep turnarounds: {}.",
        to_low.presses(),
        to_high.presses(),
        sweep.turnarounds()
    );
    ExitCode::SUCCESS
}

fn report(mcu: &VirtualMcu, driver: &dyn FrameDriver) {
    let us = |cycles: u64| mcu.ticks_to_us(Ticks32::from(cycles as u32));

    debug!("Session finished after {} frames.", driver.frames());
    for &channel in SERVO_CHANNELS.iter() {
        let pulses = mcu.pulses(channel.mask());
        let widths = pulses.iter().map(|pulse| pulse.high_cycles());
        let frames = intervals(&pulses);
        debug!(
            "{:?}: {} pulses, high {}..{} us, frame {}..{} us",
            channel,
            pulses.len(),
            us(widths.clone().min().unwrap_or(0)),
            us(widths.max().unwrap_or(0)),
            us(frames.iter().copied().min().unwrap_or(0)),
            us(frames.iter().copied().max().unwrap_or(0)),
        );
    }
    debug!(
        "Interrupts: {} serviced, {} dropped.",
        mcu.serviced_interrupts(),
        mcu.missed_interrupts()
    );
}
