// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Shared wiring for the integration tests: capsules on a virtual MCU.

#![allow(dead_code)]

use capsules_servo::frame_scheduler::FrameScheduler;
use capsules_servo::polled_frames::PolledFrames;
use capsules_servo::position::ServoPositions;
use capsules_servo::position_buttons::PositionPreset;
use capsules_servo::pulse::ServoPulseEmitter;
use capsules_servo::timing::ServoConfig;
use kernel::hil::gpio::Interrupt;
use kernel::hil::servo::{Channel, FrameDriver, ServoPulse};
use kernel::hil::time::Timer;
use virtual_mcu::{PinId, PortBPin, VirtualMcu};

pub type Mcu = VirtualMcu<'static>;
pub type Emitter = ServoPulseEmitter<'static, Mcu, Mcu>;
pub type Scheduler = FrameScheduler<'static, Mcu, Emitter>;
pub type Polled = PolledFrames<'static, Mcu, Emitter>;
pub type Preset = PositionPreset<'static, PortBPin<'static>>;

/// Instruction cycles per TMR0 period for a 5 ms tick.
pub const TICK_CYCLES: u64 = 60_160;

pub fn leak<T>(value: T) -> &'static T {
    Box::leak(Box::new(value))
}

pub struct Rig {
    pub mcu: &'static Mcu,
    pub emitter: &'static Emitter,
    pub positions: &'static ServoPositions,
}

/// An MCU with interrupts enabled and `channels` configured.
pub fn rig(config: &ServoConfig, channels: &[Channel]) -> Rig {
    let mcu = leak(VirtualMcu::new(0));
    let emitter = leak(ServoPulseEmitter::new(mcu, mcu, config));
    for channel in channels {
        emitter.configure_output(*channel).unwrap();
    }
    mcu.enable_interrupts();
    Rig {
        mcu,
        emitter,
        positions: leak(ServoPositions::new()),
    }
}

impl Rig {
    pub fn scheduler(&self, channels: &'static [Channel], config: &ServoConfig) -> &'static Scheduler {
        let scheduler = leak(FrameScheduler::new(
            self.mcu,
            self.emitter,
            self.positions,
            channels,
            config,
        ));
        self.mcu.set_timer_client(scheduler);
        scheduler
    }

    pub fn polled(&self, channels: &'static [Channel], config: &ServoConfig) -> &'static Polled {
        leak(PolledFrames::new(
            self.mcu,
            self.emitter,
            self.positions,
            channels,
            config,
        ))
    }

    /// A button on `pin` that sets `channel` to `position` when pressed.
    pub fn preset(&self, pin: PinId, channel: Channel, position: u8) -> &'static Preset {
        let pin = leak(self.mcu.portb_pin(pin));
        let preset = leak(PositionPreset::new(pin, self.positions, channel, position));
        pin.set_client(preset);
        preset.enable();
        preset
    }
}

/// Run foreground passes until `frames` frames are complete.
pub fn run_frames(driver: &dyn FrameDriver, frames: usize) {
    while driver.frames() < frames {
        driver.foreground();
    }
}
