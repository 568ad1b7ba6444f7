//! # Input mapping
//!
//! Converts the operator's motion input into gait and body pose demands for
//! `GaitCtrl`, according to the current motion mode.
//!
//! | Mode                   | Gait targets        | Body pose                            |
//! |------------------------|---------------------|--------------------------------------|
//! | `Walk`                 | from the sticks     | height and pitch                     |
//! | `Stand`                | zero                | height, shift and tilt               |
//! | `Rest`                 | zero                | level, at half the default height    |
//! | `Idle`, `Deactivated`  | zero                | untouched                            |

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::tc::{motion::RAW_CHANNEL_RANGE, MotionInput, MotionMode};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use util::maths::lin_map;

use crate::gait_ctrl::{GaitDemand, PoseDemand};
use crate::kin::KinConfig;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Step velocity used when the operator leaves the speed channel at zero.
pub const NOMINAL_STEP_VELOCITY: f64 = 1.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Unscaled controller channels, each within `RAW_CHANNEL_RANGE`.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawMotionInput {
    pub lx: f64,
    pub ly: f64,
    pub rx: f64,
    pub ry: f64,
    pub h: f64,
    pub s: f64,
    pub s1: f64,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Construction from raw controller channels.
pub trait FromRaw {
    fn from_raw(raw: &RawMotionInput) -> Self;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FromRaw for MotionInput {
    /// Sticks map to `[-1, 1]` and levels to `[0, 1]`.
    fn from_raw(raw: &RawMotionInput) -> Self {
        let stick = |v: f64| lin_map(RAW_CHANNEL_RANGE, (-1.0, 1.0), v);
        let level = |v: f64| lin_map(RAW_CHANNEL_RANGE, (0.0, 1.0), v);

        Self {
            lx: stick(raw.lx),
            ly: stick(raw.ly),
            rx: stick(raw.rx),
            ry: stick(raw.ry),
            h: level(raw.h),
            s: level(raw.s),
            s1: level(raw.s1),
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Map the operator's input into demands for the given motion mode.
///
/// The gait demand is always produced. The pose demand is `None` when the
/// mode leaves the body where it is.
pub fn map_input(
    kin: &KinConfig,
    mode: MotionMode,
    input: &MotionInput,
) -> (GaitDemand, Option<PoseDemand>) {
    match mode {
        MotionMode::Walk => (walk_demand(kin, input), Some(walk_pose(kin, input))),
        MotionMode::Stand => (
            stop_demand(kin),
            Some(PoseDemand {
                omega: None,
                phi: Some(input.rx * kin.max_roll),
                psi: Some(input.ry * kin.max_pitch),
                xm: Some(input.ly * kin.max_body_shift_x),
                ym: Some(body_height(kin, input.h)),
                zm: Some(input.lx * kin.max_body_shift_z),
            }),
        ),
        MotionMode::Rest => (
            stop_demand(kin),
            Some(PoseDemand {
                omega: Some(0.0),
                phi: Some(0.0),
                psi: Some(0.0),
                xm: Some(0.0),
                ym: Some(kin.default_body_height * 0.5),
                zm: Some(0.0),
            }),
        ),
        MotionMode::Idle | MotionMode::Deactivated => (stop_demand(kin), None),
    }
}

/// Direction of travel from a single raw lateral channel.
///
/// Units: radians, in `[-pi/2, pi/2]`
pub fn raw_lateral_fraction(lx: f64) -> f64 {
    lin_map(RAW_CHANNEL_RANGE, (-FRAC_PI_2, FRAC_PI_2), lx)
}

/// Step length from a single raw lateral channel.
pub fn raw_step_length(lx: f64) -> f64 {
    lx.abs() / 255.0
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn body_height(kin: &KinConfig, h: f64) -> f64 {
    kin.min_body_height + h * kin.body_height_range
}

fn walk_demand(kin: &KinConfig, input: &MotionInput) -> GaitDemand {
    let step_x = input.ly * kin.max_step_length;
    let step_z = -input.lx * kin.max_step_length;

    let mut step_length = step_x.hypot(step_z);
    if step_x < 0.0 {
        step_length = -step_length;
    }

    // Keep the direction in the forward half plane, the sign of the length
    // already encodes going backwards.
    let lateral_fraction = (step_z * step_x.signum()).atan2(step_x.abs());

    GaitDemand {
        step_length,
        lateral_fraction,
        yaw_rate: input.rx,
        step_velocity: if input.s == 0.0 {
            NOMINAL_STEP_VELOCITY
        } else {
            input.s
        },
        clearance_height: if input.s1 == 0.0 {
            kin.default_step_height
        } else {
            input.s1 * kin.max_step_height
        },
        penetration_depth: kin.default_step_depth,
    }
}

fn walk_pose(kin: &KinConfig, input: &MotionInput) -> PoseDemand {
    PoseDemand {
        ym: Some(body_height(kin, input.h)),
        psi: Some(input.ry * kin.max_pitch),
        ..Default::default()
    }
}

/// Zero gait targets, keeping the nominal timing so the live values decay
/// while stepping.
fn stop_demand(kin: &KinConfig) -> GaitDemand {
    GaitDemand {
        step_velocity: NOMINAL_STEP_VELOCITY,
        clearance_height: kin.default_step_height,
        penetration_depth: kin.default_step_depth,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn input(lx: f64, ly: f64) -> MotionInput {
        MotionInput {
            lx,
            ly,
            ..Default::default()
        }
    }

    #[test]
    fn test_walk_forward_backward() {
        let kin = KinConfig::default();

        let (fwd, _) = map_input(&kin, MotionMode::Walk, &input(0.0, 0.5));
        let (bwd, _) = map_input(&kin, MotionMode::Walk, &input(0.0, -0.5));

        assert!((fwd.step_length - 0.5 * kin.max_step_length).abs() < 1e-12);
        assert!((bwd.step_length + 0.5 * kin.max_step_length).abs() < 1e-12);
        assert_eq!(fwd.lateral_fraction, 0.0);
        assert_eq!(bwd.lateral_fraction, 0.0);

        // The stride direction of a backward command is reversed
        let fwd_x = fwd.step_length * fwd.lateral_fraction.cos();
        let bwd_x = bwd.step_length * bwd.lateral_fraction.cos();
        assert!(fwd_x > 0.0);
        assert!(bwd_x < 0.0);
    }

    #[test]
    fn test_walk_lateral() {
        let kin = KinConfig::default();

        // Pure sideways to the right
        let (d, _) = map_input(&kin, MotionMode::Walk, &input(1.0, 0.0));
        assert!((d.step_length - kin.max_step_length).abs() < 1e-12);
        assert!((d.lateral_fraction + FRAC_PI_2).abs() < 1e-12);

        // Diagonal backwards-right mirrors forwards-right
        let (f, _) = map_input(&kin, MotionMode::Walk, &input(0.5, 0.5));
        let (b, _) = map_input(&kin, MotionMode::Walk, &input(0.5, -0.5));
        assert!((f.lateral_fraction + b.lateral_fraction).abs() < 1e-12);
        assert!(f.lateral_fraction.abs() <= FRAC_PI_2);

        // The lateral displacement keeps its sign either way
        let f_z = f.step_length * f.lateral_fraction.sin();
        let b_z = b.step_length * b.lateral_fraction.sin();
        assert!((f_z - b_z).abs() < 1e-12);
    }

    #[test]
    fn test_walk_defaults() {
        let kin = KinConfig::default();
        let (d, pose) = map_input(&kin, MotionMode::Walk, &MotionInput::default());

        assert_eq!(d.step_velocity, NOMINAL_STEP_VELOCITY);
        assert_eq!(d.clearance_height, kin.default_step_height);
        assert_eq!(d.penetration_depth, kin.default_step_depth);

        let pose = pose.unwrap();
        assert_eq!(pose.ym, Some(kin.min_body_height));
        assert_eq!(pose.xm, None);

        let full = MotionInput {
            s: 0.5,
            s1: 1.0,
            h: 1.0,
            rx: -0.3,
            ..Default::default()
        };
        let (d, pose) = map_input(&kin, MotionMode::Walk, &full);
        assert_eq!(d.step_velocity, 0.5);
        assert_eq!(d.clearance_height, kin.max_step_height);
        assert_eq!(d.yaw_rate, -0.3);
        assert!((pose.unwrap().ym.unwrap() - kin.max_body_height).abs() < 1e-12);
    }

    #[test]
    fn test_stand_and_rest() {
        let kin = KinConfig::default();
        let cmd = MotionInput {
            lx: 1.0,
            ly: -1.0,
            rx: 0.5,
            ry: -0.5,
            ..Default::default()
        };

        let (d, pose) = map_input(&kin, MotionMode::Stand, &cmd);
        let pose = pose.unwrap();
        assert_eq!(d.step_length, 0.0);
        assert_eq!(d.yaw_rate, 0.0);
        assert_eq!(pose.zm, Some(kin.max_body_shift_z));
        assert_eq!(pose.xm, Some(-kin.max_body_shift_x));
        assert_eq!(pose.phi, Some(0.5 * kin.max_roll));
        assert_eq!(pose.psi, Some(-0.5 * kin.max_pitch));

        let (d, pose) = map_input(&kin, MotionMode::Rest, &cmd);
        let pose = pose.unwrap();
        assert_eq!(d.step_length, 0.0);
        assert_eq!(pose.ym, Some(kin.default_body_height * 0.5));
        assert_eq!(pose.phi, Some(0.0));

        for mode in [MotionMode::Idle, MotionMode::Deactivated].iter() {
            let (d, pose) = map_input(&kin, *mode, &cmd);
            assert!(pose.is_none());
            assert_eq!(d.step_length, 0.0);
            assert_eq!(d.lateral_fraction, 0.0);
            assert_eq!(d.yaw_rate, 0.0);
        }
    }

    #[test]
    fn test_from_raw() {
        let raw = RawMotionInput {
            lx: -127.0,
            ly: 128.0,
            rx: 0.5,
            ry: 0.0,
            h: 128.0,
            s: -127.0,
            s1: 0.5,
        };
        let input = MotionInput::from_raw(&raw);

        assert!((input.lx + 1.0).abs() < 1e-12);
        assert!((input.ly - 1.0).abs() < 1e-12);
        assert!(input.rx.abs() < 1e-12);
        assert!((input.h - 1.0).abs() < 1e-12);
        assert!(input.s.abs() < 1e-12);
        assert!((input.s1 - 0.5).abs() < 1e-12);
        assert!(input.is_valid());
    }

    #[test]
    fn test_raw_single_stick() {
        assert!((raw_lateral_fraction(-127.0) + FRAC_PI_2).abs() < 1e-12);
        assert!((raw_lateral_fraction(128.0) - FRAC_PI_2).abs() < 1e-12);
        assert!(raw_lateral_fraction(0.5).abs() < 1e-12);

        assert_eq!(raw_step_length(-255.0), 1.0);
        assert!((raw_step_length(127.5) - 0.5).abs() < 1e-12);
    }
}
