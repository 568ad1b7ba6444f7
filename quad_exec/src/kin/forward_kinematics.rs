//! Leg forward kinematics calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::mech::JointDems;
use nalgebra::Vector3;

use super::{body_transform, leg_to_world, BodyPose, KinConfig, LegId, NUM_LEGS};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl KinConfig {
    /// Position of the foot in the leg frame for the given joint angles.
    ///
    /// Exact inverse of `leg_ik` within the reachable envelope.
    pub fn leg_fk(&self, theta: &[f64; 3]) -> Vector3<f64> {
        let [theta_1, theta_2, theta_3] = *theta;

        // Leg plane
        let g = self.l3 * theta_2.cos() + self.l4 * (theta_2 + theta_3).cos();
        let z = self.l3 * theta_2.sin() + self.l4 * (theta_2 + theta_3).sin();

        // Rotate the leg plane about the abduction axis
        let f = g + self.l2;
        let r = f.hypot(self.l1);
        let alpha = -theta_1 - f.atan2(-self.l1);

        Vector3::new(r * alpha.cos(), r * alpha.sin(), z)
    }

    /// World frame foot positions produced by the given joint demands with the
    /// body at the given pose.
    ///
    /// The feet of `pose` are ignored.
    pub fn forward(&self, pose: &BodyPose, dems: &JointDems) -> [Vector3<f64>; NUM_LEGS] {
        let body_to_world = body_transform(pose);
        let mut feet = [Vector3::zeros(); NUM_LEGS];

        for leg in LegId::ALL.iter() {
            let local = self.leg_fk(&dems.pos_rad[leg.index()]);
            feet[leg.index()] = leg_to_world(self, &body_to_world, *leg, &local);
        }

        feet
    }
}
