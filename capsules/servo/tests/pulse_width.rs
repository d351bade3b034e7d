// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Width of emitted pulses across the position range.

mod common;

use capsules_servo::timing::{SERVO_180_DEGREE, SERVO_90_DEGREE};
use common::rig;
use kernel::hil::servo::{Channel, ServoPulse};
use kernel::hil::time::Ticks;
use virtual_mcu::chip::cycles_from_us;
use virtual_mcu::PinId;

const CYCLES_PER_US: f64 = 12.0;

fn width_us(cycles: u64) -> f64 {
    cycles as f64 / CYCLES_PER_US
}

#[test]
fn width_is_monotonic_and_bounded_over_every_position() {
    let rig = rig(&SERVO_90_DEGREE, &[Channel::Servo1]);
    for position in 0..=u8::MAX {
        rig.emitter.emit_pulse(Channel::Servo1, position).unwrap();
    }

    let widths: Vec<u64> = rig
        .mcu
        .pulses(Channel::Servo1.mask())
        .iter()
        .map(|pulse| pulse.high_cycles())
        .collect();
    assert_eq!(widths.len(), 256);

    let timing = rig.emitter.timing();
    let min = timing.min_high_time().into_u32() as u64;
    let max = timing.max_high_time().into_u32() as u64;
    for pair in widths.windows(2) {
        assert!(pair[0] <= pair[1], "width fell from {} to {}", pair[0], pair[1]);
    }
    assert!(widths.iter().all(|w| (min..=max).contains(w)));
    assert_eq!(widths[0], min);
    assert_eq!(widths[255], max);
    for (position, width) in widths.iter().enumerate() {
        assert_eq!(*width, timing.high_time(position as u8).into_u32() as u64);
    }
}

#[test]
fn boundary_positions_give_one_and_two_milliseconds() {
    let rig = rig(&SERVO_90_DEGREE, &[Channel::Servo1]);
    rig.emitter.emit_pulse(Channel::Servo1, 0).unwrap();
    rig.emitter.emit_pulse(Channel::Servo1, 255).unwrap();

    let pulses = rig.mcu.pulses(Channel::Servo1.mask());
    assert!((width_us(pulses[0].high_cycles()) - 1000.0).abs() < 1.0);
    assert!((width_us(pulses[1].high_cycles()) - 2000.0).abs() < 5.0);
}

#[test]
fn wide_range_preset_spans_544us_to_2400us() {
    let rig = rig(&SERVO_180_DEGREE, &[Channel::Servo1]);
    rig.emitter.emit_pulse(Channel::Servo1, 0).unwrap();
    rig.emitter.emit_pulse(Channel::Servo1, 255).unwrap();

    let pulses = rig.mcu.pulses(Channel::Servo1.mask());
    assert!((width_us(pulses[0].high_cycles()) - 544.0).abs() < 1.0);
    assert!((width_us(pulses[1].high_cycles()) - 2400.0).abs() < 10.0);
}

#[test]
fn interrupt_inside_a_pulse_does_not_stretch_it() {
    let rig = rig(&SERVO_90_DEGREE, &[Channel::Servo1]);
    let preset = rig.preset(PinId::RB4, Channel::Servo2, 0);
    rig.mcu
        .schedule_press(PinId::RB4, cycles_from_us(500), cycles_from_us(100));

    rig.emitter.emit_pulse(Channel::Servo1, 200).unwrap();

    assert_eq!(preset.presses(), 1);
    let pulses = rig.mcu.pulses(Channel::Servo1.mask());
    assert_eq!(
        pulses[0].high_cycles(),
        rig.emitter.timing().high_time(200).into_u32() as u64
    );
}
