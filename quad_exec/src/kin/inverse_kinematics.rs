//! Leg inverse kinematics calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::mech::JointDems;
use log::trace;
use nalgebra::Vector3;
use serde::Serialize;

use super::{body_transform, world_to_leg, BodyPose, KinConfig, LegId, NUM_LEGS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Joint angles of a single leg.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LegSolution {
    /// Abduction, hip and knee angles.
    ///
    /// Units: radians
    pub theta: [f64; 3],

    /// True if the target was out of reach and the knee angle was saturated
    /// at full extension or flexion.
    pub saturated: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl KinConfig {
    /// Solve the joint angles which place a foot at the given position in the
    /// leg frame.
    ///
    /// The solve is closed form. The abduction angle aligns the leg plane
    /// with the target, after which the hip and knee solve the triangle formed
    /// by the femur, tibia and the target. A target outside the reachable
    /// annulus saturates the knee rather than failing.
    pub fn leg_ik(&self, local: &Vector3<f64>) -> LegSolution {
        let (x, y, z) = (local.x, local.y, local.z);

        let f = (x.powi(2) + y.powi(2) - self.l1.powi(2)).max(0.0).sqrt();
        let g = f - self.l2;
        let h = (g.powi(2) + z.powi(2)).sqrt();

        let theta_1 = -y.atan2(x) - f.atan2(-self.l1);

        let d_raw = (h.powi(2) - self.l3.powi(2) - self.l4.powi(2)) / (2.0 * self.l3 * self.l4);
        let d = d_raw.max(-1.0).min(1.0);
        let theta_3 = d.acos();

        let theta_2 =
            z.atan2(g) - (self.l4 * theta_3.sin()).atan2(self.l3 + self.l4 * theta_3.cos());

        LegSolution {
            theta: [theta_1, theta_2, theta_3],
            saturated: d != d_raw,
        }
    }

    /// Solve the joint angles of every leg for the feet of the given pose.
    ///
    /// Returns the demands along with a per-leg saturation flag.
    pub fn inverse(&self, pose: &BodyPose) -> (JointDems, [bool; NUM_LEGS]) {
        let body_to_world = body_transform(pose);

        let mut dems = JointDems::default();
        let mut saturated = [false; NUM_LEGS];

        for leg in LegId::ALL.iter() {
            let i = leg.index();
            let local = world_to_leg(self, &body_to_world, *leg, &pose.feet[i]);
            let sol = self.leg_ik(&local);

            if sol.saturated {
                trace!("{:?} target {:?} is out of reach, IK saturated", leg, local);
            }

            dems.pos_rad[i] = sol.theta;
            saturated[i] = sol.saturated;
        }

        (dems, saturated)
    }
}
