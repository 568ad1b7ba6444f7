//! # Gait Tick Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use comms_if::tc::{MotionInput, MotionMode};
use quad_lib::{
    gait_ctrl::{ClockType, GaitCtrl, InputData, Params},
    input_map::map_input,
    kin::{BodyPose, KinConfig},
};
use util::module::State;

fn gait_tick_benchmark(c: &mut Criterion) {
    // ---- Build a walking controller ----

    let kin = KinConfig::default();

    let input = MotionInput {
        lx: 0.2,
        ly: 0.8,
        rx: 0.1,
        h: 0.5,
        ..Default::default()
    };
    let (gait, pose) = map_input(&kin, MotionMode::Walk, &input);

    let gait_input = InputData {
        dt_s: 0.01,
        gait: Some(gait),
        pose,
        ..Default::default()
    };

    for clock in [ClockType::Touchdown, ClockType::Cyclic].iter() {
        let params = Params {
            clock: *clock,
            ..Default::default()
        };
        let mut gait_ctrl = GaitCtrl::new(kin.clone(), params).unwrap();

        // Get into the stepping part of the cycle
        for _ in 0..100 {
            gait_ctrl.proc(&gait_input).unwrap();
        }

        c.bench_function(&format!("GaitCtrl::proc::{:?}", clock), |b| {
            b.iter(|| gait_ctrl.proc(black_box(&gait_input)).unwrap())
        });
    }

    // Leg solve alone
    let standing = BodyPose::standing(&kin);
    c.bench_function("KinConfig::inverse", |b| {
        b.iter(|| kin.inverse(black_box(&standing)))
    });
}

criterion_group!(benches, gait_tick_benchmark);
criterion_main!(benches);
