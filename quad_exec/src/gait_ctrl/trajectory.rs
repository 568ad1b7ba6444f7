//! Foot trajectory generation
//!
//! Feet follow a sinusoidal arc during stance and a Bezier arc during swing.
//! Each leg's trajectory is the sum of a linear component, along the
//! commanded step direction, and a yaw component, tangent to the circle
//! around the body centre through the foot.
//!
//! Gaits with static stability keep their stance feet flat, and the body is
//! shifted over the centroid of the stance feet.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::mech::{LegId, NUM_LEGS};
use nalgebra::Vector3;
use std::f64::consts::{FRAC_PI_2, PI};
use util::maths::binomial;

use super::{GaitCommand, LegMode, LegPhase, Params};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of control points of the swing curve.
pub const NUM_BEZIER_POINTS: usize = 12;

/// Horizontal swing control points, as multiples of the amplitude.
pub const BEZIER_STEPS: [f64; NUM_BEZIER_POINTS] = [
    -1.4, -1.0, -1.5, -1.5, -1.5, 0.0, 0.0, 0.0, 1.5, 1.5, 1.4, 1.0,
];

/// Vertical swing control points, as multiples of the clearance height.
pub const BEZIER_HEIGHTS: [f64; NUM_BEZIER_POINTS] = [
    0.0, 0.0, 0.9, 0.9, 0.9, 0.9, 0.9, 1.1, 1.1, 1.1, 0.0, 0.0,
];

const ORDER: u64 = NUM_BEZIER_POINTS as u64 - 1;

const BINOMIALS: [f64; NUM_BEZIER_POINTS] = [
    binomial(ORDER, 0) as f64,
    binomial(ORDER, 1) as f64,
    binomial(ORDER, 2) as f64,
    binomial(ORDER, 3) as f64,
    binomial(ORDER, 4) as f64,
    binomial(ORDER, 5) as f64,
    binomial(ORDER, 6) as f64,
    binomial(ORDER, 7) as f64,
    binomial(ORDER, 8) as f64,
    binomial(ORDER, 9) as f64,
    binomial(ORDER, 10) as f64,
    binomial(ORDER, 11) as f64,
];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Generates foot positions from leg phases.
///
/// Keeps the last position of every foot, which bends the yaw component into
/// an arc.
#[derive(Debug, Clone)]
pub struct TrajectoryGenerator {
    prev_feet: [Vector3<f64>; NUM_LEGS],
    yaw_step_gain: f64,
    yaw_delta_weight: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryGenerator {
    pub fn new(default_feet: &[Vector3<f64>; NUM_LEGS], params: &Params) -> Self {
        Self {
            prev_feet: *default_feet,
            yaw_step_gain: params.yaw_step_gain,
            yaw_delta_weight: params.yaw_delta_weight,
        }
    }

    /// Forget the previous foot positions.
    pub fn reset(&mut self, default_feet: &[Vector3<f64>; NUM_LEGS]) {
        self.prev_feet = *default_feet;
    }

    pub fn prev_foot(&self, leg: LegId) -> Vector3<f64> {
        self.prev_feet[leg.index()]
    }

    /// Position of a foot for the given leg phase.
    ///
    /// The foot is lifted away from the default height only while the body is
    /// translating or turning.
    pub fn foot_step(
        &mut self,
        leg: LegId,
        leg_phase: LegPhase,
        cmd: &GaitCommand,
        default_foot: &Vector3<f64>,
    ) -> Vector3<f64> {
        let amplitude = cmd.step_length / 2.0;
        let yaw_amplitude = cmd.yaw_rate * self.yaw_step_gain;
        let yaw_direction = yaw_arc(leg, default_foot, &self.prev_feet[leg.index()]);

        let penetration = if cmd.pattern.static_stability {
            0.0
        } else {
            cmd.penetration_depth
        };

        let (lin, rot) = match leg_phase.mode {
            LegMode::Stance => (
                stance_curve(amplitude, cmd.lateral_fraction, penetration, leg_phase.phase),
                stance_curve(yaw_amplitude, yaw_direction, penetration, leg_phase.phase),
            ),
            LegMode::Swing => (
                swing_curve(
                    amplitude,
                    cmd.lateral_fraction,
                    cmd.clearance_height,
                    leg_phase.phase,
                ),
                swing_curve(
                    yaw_amplitude,
                    yaw_direction,
                    cmd.clearance_height,
                    leg_phase.phase,
                ),
            ),
        };

        let mut foot = default_foot + lin + rot * self.yaw_delta_weight;
        if !cmd.is_lifting() {
            foot.y = default_foot.y;
        }

        self.prev_feet[leg.index()] = foot;

        foot
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Stance displacement, sweeping from `+amplitude` to `-amplitude` along
/// `direction` while dipping `penetration` into the ground at mid stance.
pub fn stance_curve(amplitude: f64, direction: f64, penetration: f64, phase: f64) -> Vector3<f64> {
    let step = amplitude * (1.0 - 2.0 * phase);
    let x = step * direction.cos();
    let z = step * direction.sin();

    let y = if amplitude != 0.0 {
        -penetration * (PI * (x + z) / (2.0 * amplitude)).cos()
    } else {
        0.0
    };

    Vector3::new(x, y, z)
}

/// Swing displacement along the 11th order Bezier curve through the swing
/// control points.
pub fn swing_curve(amplitude: f64, direction: f64, clearance: f64, phase: f64) -> Vector3<f64> {
    let (sin_dir, cos_dir) = direction.sin_cos();
    let mut point = Vector3::zeros();

    for i in 0..NUM_BEZIER_POINTS {
        let b = BINOMIALS[i] * phase.powi(i as i32) * (1.0 - phase).powi((ORDER as usize - i) as i32);

        let step = b * BEZIER_STEPS[i] * amplitude;
        point.x += step * cos_dir;
        point.y += b * BEZIER_HEIGHTS[i] * clearance;
        point.z += step * sin_dir;
    }

    point
}

/// Direction of the yaw component for a foot, tangent to the circle around
/// the body centre through the foot's default position, bent by how far the
/// foot has moved from it.
///
/// The bend is positive for left legs and negative for right legs, so the
/// arcs of a left and right leg mirror each other.
pub fn yaw_arc(leg: LegId, default_foot: &Vector3<f64>, prev_foot: &Vector3<f64>) -> f64 {
    let default_mag = default_foot.x.hypot(default_foot.z);
    let default_dir = default_foot.z.atan2(default_foot.x);

    let offset = prev_foot - default_foot;
    let offset_mag = offset.x.hypot(offset.z);

    let side = if leg.is_right() { -1.0 } else { 1.0 };

    FRAC_PI_2 + default_dir + side * offset_mag.atan2(default_mag)
}

/// Centroid of the default positions of the feet in stance, or `None` if no
/// foot is in stance.
pub fn stance_centroid(
    leg_phases: &[LegPhase; NUM_LEGS],
    default_feet: &[Vector3<f64>; NUM_LEGS],
) -> Option<Vector3<f64>> {
    let mut sum: Vector3<f64> = Vector3::zeros();
    let mut num_stance = 0;

    for (phase, foot) in leg_phases.iter().zip(default_feet.iter()) {
        if phase.mode == LegMode::Stance {
            sum += foot;
            num_stance += 1;
        }
    }

    if num_stance == 0 {
        None
    } else {
        Some(sum / num_stance as f64)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::gait_ctrl::GaitPattern;
    use crate::kin::KinConfig;

    fn phases() -> impl Iterator<Item = f64> {
        (0..=100).map(|i| i as f64 / 100.0)
    }

    #[test]
    fn test_binomials() {
        assert_eq!(BINOMIALS[0], 1.0);
        assert_eq!(BINOMIALS[5], 462.0);
        assert_eq!(BINOMIALS.iter().sum::<f64>(), 2048.0);
    }

    #[test]
    fn test_swing_lift() {
        for phase in phases() {
            let p = swing_curve(0.05, 0.3, 0.04, phase);
            assert!(p.y >= 0.0, "phase {}: {}", phase, p.y);
        }

        assert_eq!(swing_curve(0.05, 0.3, 0.04, 0.0).y, 0.0);
        assert_eq!(swing_curve(0.05, 0.3, 0.04, 1.0).y, 0.0);
        assert!(swing_curve(0.05, 0.3, 0.04, 0.5).y > 0.03);
    }

    #[test]
    fn test_swing_end_points() {
        let p = swing_curve(0.05, 0.0, 0.04, 0.0);
        assert!((p.x + 1.4 * 0.05).abs() < 1e-12);
        assert_eq!(p.z, 0.0);

        let p = swing_curve(0.05, FRAC_PI_2, 0.04, 1.0);
        assert!(p.x.abs() < 1e-12);
        assert!((p.z - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_stance_is_linear() {
        let amplitude = 0.05;
        let direction = 0.4;

        let start = stance_curve(amplitude, direction, 0.0, 0.0);
        let end = stance_curve(amplitude, direction, 0.0, 1.0);
        assert!((start.x.hypot(start.z) - amplitude).abs() < 1e-12);
        assert!((start.x - amplitude * direction.cos()).abs() < 1e-12);
        assert!((end.x + amplitude * direction.cos()).abs() < 1e-12);

        let mut prev = f64::INFINITY;
        for phase in phases() {
            let p = stance_curve(amplitude, 0.0, 0.0, phase);
            assert!((p.x - amplitude * (1.0 - 2.0 * phase)).abs() < 1e-12);
            assert!(p.x < prev);
            prev = p.x;
        }
    }

    #[test]
    fn test_stance_penetration() {
        let mid = stance_curve(0.05, 0.0, 0.002, 0.5);
        assert!((mid.y + 0.002).abs() < 1e-12);

        let start = stance_curve(0.05, 0.0, 0.002, 0.0);
        assert!(start.y.abs() < 1e-12);

        assert_eq!(stance_curve(0.0, 0.0, 0.002, 0.5), Vector3::zeros());
    }

    #[test]
    fn test_yaw_arc() {
        let foot = Vector3::new(0.1, 0.0, 0.1);
        let arc = yaw_arc(LegId::FrontLeft, &foot, &foot);
        assert!((arc - (FRAC_PI_2 + PI / 4.0)).abs() < 1e-12);

        // Moving the foot away bends the arc
        let moved = Vector3::new(0.12, 0.0, 0.1);
        assert!(yaw_arc(LegId::FrontLeft, &foot, &moved) > arc);
    }

    #[test]
    fn test_yaw_arc_mirrored_by_side() {
        let default_feet = KinConfig::default().default_feet();
        let shift = Vector3::new(0.015, 0.0, 0.0);

        for &(left, right) in [
            (LegId::FrontLeft, LegId::FrontRight),
            (LegId::BackLeft, LegId::BackRight),
        ]
        .iter()
        {
            let (dl, dr) = (default_feet[left.index()], default_feet[right.index()]);
            let l = yaw_arc(left, &dl, &(dl + shift));
            let r = yaw_arc(right, &dr, &(dr + shift));

            // Mirror images across the lateral axis
            assert!((l + r - PI).abs() < 1e-12, "{:?}: {} {}", left, l, r);

            // Bent in opposite directions
            assert!(l > yaw_arc(left, &dl, &dl));
            assert!(r < yaw_arc(right, &dr, &dr));
        }
    }

    #[test]
    fn test_stance_centroid() {
        let default_feet = KinConfig::default().default_feet();

        let all = [LegPhase::stance(0.5); NUM_LEGS];
        assert!(stance_centroid(&all, &default_feet).unwrap().norm() < 1e-12);

        // Front left lifted, the centroid moves back and to the right
        let mut phases = all;
        phases[LegId::FrontLeft.index()] = LegPhase::swing(0.5);
        let c = stance_centroid(&phases, &default_feet).unwrap();
        let fl = default_feet[LegId::FrontLeft.index()];
        assert!((c.x + fl.x / 3.0).abs() < 1e-12);
        assert!((c.z + fl.z / 3.0).abs() < 1e-12);

        assert_eq!(stance_centroid(&[LegPhase::swing(0.5); NUM_LEGS], &default_feet), None);
    }

    #[test]
    fn test_crawl_stance_is_flat() {
        let kin = KinConfig::default();
        let default_feet = kin.default_feet();
        let mut gen = TrajectoryGenerator::new(&default_feet, &Params::default());

        let mut cmd = GaitCommand::new(GaitPattern::crawl());
        cmd.step_length = 0.1;
        cmd.yaw_rate = 0.3;
        cmd.clearance_height = 0.05;
        cmd.penetration_depth = 0.003;

        let default = default_feet[LegId::BackLeft.index()];
        for phase in phases() {
            let foot = gen.foot_step(LegId::BackLeft, LegPhase::stance(phase), &cmd, &default);
            assert_eq!(foot.y, default.y);
        }

        // The trot presses in at mid stance
        cmd.pattern = GaitPattern::trot();
        let foot = gen.foot_step(LegId::BackLeft, LegPhase::stance(0.5), &cmd, &default);
        assert!(foot.y < default.y);
    }

    #[test]
    fn test_no_lift_without_motion() {
        let kin = KinConfig::default();
        let default_feet = kin.default_feet();
        let mut gen = TrajectoryGenerator::new(&default_feet, &Params::default());

        let mut cmd = GaitCommand::new(GaitPattern::trot());
        cmd.clearance_height = 0.05;
        cmd.penetration_depth = 0.002;

        for leg in LegId::ALL.iter() {
            for phase in phases() {
                let foot = gen.foot_step(*leg, LegPhase::swing(phase), &cmd, &default_feet[leg.index()]);
                assert_eq!(foot.y, default_feet[leg.index()].y);
            }
        }
    }

    #[test]
    fn test_foot_step_records_previous() {
        let kin = KinConfig::default();
        let default_feet = kin.default_feet();
        let mut gen = TrajectoryGenerator::new(&default_feet, &Params::default());

        let mut cmd = GaitCommand::new(GaitPattern::trot());
        cmd.step_length = 0.1;
        cmd.clearance_height = 0.05;

        let foot = gen.foot_step(
            LegId::BackRight,
            LegPhase::stance(0.0),
            &cmd,
            &default_feet[LegId::BackRight.index()],
        );

        // Start of stance is half a stride forward
        assert!((foot.x - default_feet[3].x - 0.05).abs() < 1e-12);
        assert_eq!(gen.prev_foot(LegId::BackRight), foot);
        assert_eq!(gen.prev_foot(LegId::FrontLeft), default_feet[0]);

        let foot = gen.foot_step(
            LegId::BackRight,
            LegPhase::swing(0.5),
            &cmd,
            &default_feet[LegId::BackRight.index()],
        );
        assert!(foot.y > default_feet[3].y);

        gen.reset(&default_feet);
        assert_eq!(gen.prev_foot(LegId::BackRight), default_feet[3]);
    }
}
