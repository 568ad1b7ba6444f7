//! Body pose and foot targets

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::Serialize;

use super::{KinConfig, KinError, NUM_LEGS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Pose of the body and the positions of the feet in the world frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyPose {
    /// Roll, about the `x` axis.
    ///
    /// Units: radians
    pub omega: f64,

    /// Rotation about the `y` axis.
    ///
    /// Units: radians
    pub phi: f64,

    /// Rotation about the `z` axis.
    ///
    /// Units: radians
    pub psi: f64,

    /// Body translation.
    ///
    /// Units: meters
    pub xm: f64,
    pub ym: f64,
    pub zm: f64,

    /// Point about which the body rotates, in the body frame.
    ///
    /// Units: meters
    pub pivot: Vector3<f64>,

    /// Current foot targets, in leg order.
    ///
    /// Units: meters
    pub feet: [Vector3<f64>; NUM_LEGS],

    /// Standby foot layout, in leg order.
    ///
    /// Units: meters
    pub default_feet: [Vector3<f64>; NUM_LEGS],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BodyPose {
    /// Standing at the default body height with the feet at the standby
    /// layout.
    pub fn standing(kin: &KinConfig) -> Self {
        let default_feet = kin.default_feet();

        Self {
            omega: 0.0,
            phi: 0.0,
            psi: 0.0,
            xm: 0.0,
            ym: kin.default_body_height,
            zm: 0.0,
            pivot: Vector3::zeros(),
            feet: default_feet,
            default_feet,
        }
    }

    /// Build a pose from foot layouts of unknown length, rejecting any layout
    /// which does not have exactly one entry per leg.
    pub fn from_layouts(
        ym: f64,
        feet: &[Vector3<f64>],
        default_feet: &[Vector3<f64>],
    ) -> Result<Self, KinError> {
        if feet.len() != NUM_LEGS || default_feet.len() != NUM_LEGS {
            return Err(KinError::LegCountMismatch {
                expected: NUM_LEGS,
                feet: feet.len(),
                default_feet: default_feet.len(),
            });
        }

        let mut pose = Self {
            omega: 0.0,
            phi: 0.0,
            psi: 0.0,
            xm: 0.0,
            ym,
            zm: 0.0,
            pivot: Vector3::zeros(),
            feet: [Vector3::zeros(); NUM_LEGS],
            default_feet: [Vector3::zeros(); NUM_LEGS],
        };
        pose.feet.copy_from_slice(feet);
        pose.default_feet.copy_from_slice(default_feet);

        Ok(pose)
    }

    /// Move every foot towards its standby position by the fraction `rate_dt`.
    pub fn relax_feet(&mut self, rate_dt: f64) {
        for (foot, default) in self.feet.iter_mut().zip(self.default_feet.iter()) {
            *foot += (default - *foot) * rate_dt;
        }
    }

    /// Put every foot at its standby position.
    pub fn reset_feet(&mut self) {
        self.feet = self.default_feet;
    }

    /// Largest distance between a foot and its standby position.
    pub fn max_foot_error(&self) -> f64 {
        self.feet
            .iter()
            .zip(self.default_feet.iter())
            .map(|(f, d)| (f - d).norm())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_layouts() {
        let kin = KinConfig::default();
        let feet = kin.default_feet();

        let pose = BodyPose::from_layouts(0.1, &feet, &feet).unwrap();
        assert_eq!(pose.feet, feet);
        assert_eq!(pose.ym, 0.1);

        match BodyPose::from_layouts(0.1, &feet[..3], &feet) {
            Err(KinError::LegCountMismatch { feet, .. }) => assert_eq!(feet, 3),
            r => panic!("Expected a leg count mismatch, got {:?}", r),
        }
    }

    #[test]
    fn test_relax_feet() {
        let mut pose = BodyPose::standing(&KinConfig::default());
        pose.feet[0].x += 0.05;
        pose.feet[3].y += 0.02;

        for _ in 0..200 {
            pose.relax_feet(0.1);
        }
        assert!(pose.max_foot_error() < 1e-9);

        pose.feet[1].z += 1.0;
        pose.reset_feet();
        assert_eq!(pose.max_foot_error(), 0.0);
    }
}
