//! Kinematic configuration of the robot

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::{KinError, LegId, NUM_LEGS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters describing the geometry of the robot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KinParams {
    // ---- LINKS ----
    /// Coxa length, the offset between the abduction axis and the leg plane.
    ///
    /// Units: meters
    pub coxa_m: f64,

    /// Additional offset along the leg plane between the hip axis and the
    /// abduction axis.
    ///
    /// Units: meters
    pub coxa_offset_m: f64,

    /// Femur (upper leg) length.
    ///
    /// Units: meters
    pub femur_m: f64,

    /// Tibia (lower leg) length.
    ///
    /// Units: meters
    pub tibia_m: f64,

    // ---- BODY ----
    /// Distance between the front and back leg mounts.
    ///
    /// Units: meters
    pub body_length_m: f64,

    /// Distance between the left and right leg mounts.
    ///
    /// Units: meters
    pub body_width_m: f64,

    // ---- LIMITS ----
    /// Maximum body roll.
    ///
    /// Units: degrees
    pub max_roll_deg: f64,

    /// Maximum body pitch.
    ///
    /// Units: degrees
    pub max_pitch_deg: f64,

    /// Default depth the feet are pushed into the ground during stance.
    ///
    /// Units: meters
    pub default_step_depth_m: f64,
}

/// The kinematic configuration, the parameters plus all derived limits.
///
/// Built once at startup and never modified.
#[derive(Debug, Clone, Serialize)]
pub struct KinConfig {
    /// Link lengths, `l1` (coxa), `l2` (coxa offset), `l3` (femur) and `l4`
    /// (tibia).
    ///
    /// Units: meters
    pub l1: f64,
    pub l2: f64,
    pub l3: f64,
    pub l4: f64,

    /// Body length and width.
    ///
    /// Units: meters
    pub body_length: f64,
    pub body_width: f64,

    /// Mount point of each leg in the body frame.
    ///
    /// Units: meters
    pub mount_offsets: [Vector3<f64>; NUM_LEGS],

    /// Units: meters
    pub max_leg_reach: f64,
    pub min_body_height: f64,
    pub max_body_height: f64,
    pub body_height_range: f64,
    pub default_body_height: f64,
    pub max_step_length: f64,
    pub max_step_height: f64,
    pub default_step_height: f64,
    pub default_step_depth: f64,
    pub max_body_shift_x: f64,
    pub max_body_shift_z: f64,

    /// Units: radians
    pub max_roll: f64,
    pub max_pitch: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for KinParams {
    fn default() -> Self {
        Self {
            coxa_m: 0.0605,
            coxa_offset_m: 0.010,
            femur_m: 0.1112,
            tibia_m: 0.1185,
            body_length_m: 0.2075,
            body_width_m: 0.078,
            max_roll_deg: 20.0,
            max_pitch_deg: 15.0,
            default_step_depth_m: 0.002,
        }
    }
}

impl Default for KinConfig {
    fn default() -> Self {
        Self::derive(&KinParams::default())
    }
}

impl KinConfig {
    /// Validate the parameters and build the configuration.
    pub fn new(params: &KinParams) -> Result<Self, KinError> {
        let lengths = [
            ("coxa_m", params.coxa_m),
            ("coxa_offset_m", params.coxa_offset_m),
            ("femur_m", params.femur_m),
            ("tibia_m", params.tibia_m),
            ("body_length_m", params.body_length_m),
            ("body_width_m", params.body_width_m),
        ];
        for (name, val) in lengths.iter() {
            // Also rejects NaN
            if !(*val > 0.0) {
                return Err(KinError::NonPositiveLength(*name, *val));
            }
        }

        let limits = [
            ("max_roll_deg", params.max_roll_deg),
            ("max_pitch_deg", params.max_pitch_deg),
            ("default_step_depth_m", params.default_step_depth_m),
        ];
        for (name, val) in limits.iter() {
            if !(*val >= 0.0) {
                return Err(KinError::NegativeLimit(*name, *val));
            }
        }

        let config = Self::derive(params);

        info!(
            "Kinematic config: reach {:.4} m, body height [{:.4}, {:.4}] m, max step {:.4} m",
            config.max_leg_reach,
            config.min_body_height,
            config.max_body_height,
            config.max_step_length
        );

        Ok(config)
    }

    fn derive(params: &KinParams) -> Self {
        let half_l = params.body_length_m / 2.0;
        let half_w = params.body_width_m / 2.0;

        let max_leg_reach = params.femur_m + params.tibia_m - params.coxa_offset_m;
        let min_body_height = max_leg_reach * 0.45;
        let max_body_height = max_leg_reach * 0.9;
        let default_body_height = min_body_height + (max_body_height - min_body_height) / 2.0;

        Self {
            l1: params.coxa_m,
            l2: params.coxa_offset_m,
            l3: params.femur_m,
            l4: params.tibia_m,
            body_length: params.body_length_m,
            body_width: params.body_width_m,
            mount_offsets: [
                Vector3::new(half_l, 0.0, half_w),
                Vector3::new(half_l, 0.0, -half_w),
                Vector3::new(-half_l, 0.0, half_w),
                Vector3::new(-half_l, 0.0, -half_w),
            ],
            max_leg_reach,
            min_body_height,
            max_body_height,
            body_height_range: max_body_height - min_body_height,
            default_body_height,
            max_step_length: max_leg_reach * 0.8,
            max_step_height: max_leg_reach / 2.0,
            default_step_height: default_body_height / 2.0,
            default_step_depth: params.default_step_depth_m,
            max_body_shift_x: params.body_width_m / 3.0,
            max_body_shift_z: params.body_width_m / 3.0,
            max_roll: params.max_roll_deg.to_radians(),
            max_pitch: params.max_pitch_deg.to_radians(),
        }
    }

    /// Mount offset of the given leg.
    pub fn mount_offset(&self, leg: LegId) -> Vector3<f64> {
        self.mount_offsets[leg.index()]
    }

    /// The standby foot layout, the IK reference pose and the idle target.
    ///
    /// Each foot is directly below its mount point, pushed out by the coxa
    /// length.
    pub fn default_feet(&self) -> [Vector3<f64>; NUM_LEGS] {
        let mut feet = self.mount_offsets;

        for (leg, foot) in LegId::ALL.iter().zip(feet.iter_mut()) {
            foot.y = 0.0;
            foot.z += if leg.is_right() { -self.l1 } else { self.l1 };
        }

        feet
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_derived_limits() {
        let kin = KinConfig::new(&KinParams::default()).unwrap();

        assert!((kin.max_leg_reach - 0.2197).abs() < 1e-9);
        assert!((kin.min_body_height - 0.2197 * 0.45).abs() < 1e-9);
        assert!((kin.max_body_height - 0.2197 * 0.9).abs() < 1e-9);
        assert!((kin.default_body_height - 0.2197 * 0.675).abs() < 1e-9);
        assert!((kin.max_roll - 20f64.to_radians()).abs() < 1e-12);
        assert!((kin.max_body_shift_z - 0.026).abs() < 1e-9);
    }

    #[test]
    fn test_default_feet() {
        let kin = KinConfig::default();
        let feet = kin.default_feet();

        assert_eq!(feet[LegId::FrontLeft.index()], Vector3::new(0.10375, 0.0, 0.039 + 0.0605));
        assert_eq!(feet[LegId::FrontRight.index()], Vector3::new(0.10375, 0.0, -0.039 - 0.0605));
        assert_eq!(feet[LegId::BackLeft.index()], Vector3::new(-0.10375, 0.0, 0.039 + 0.0605));
        assert_eq!(feet[LegId::BackRight.index()], Vector3::new(-0.10375, 0.0, -0.039 - 0.0605));
    }

    #[test]
    fn test_rejects_bad_lengths() {
        let mut params = KinParams::default();
        params.femur_m = 0.0;
        assert!(matches!(
            KinConfig::new(&params),
            Err(KinError::NonPositiveLength("femur_m", _))
        ));

        let mut params = KinParams::default();
        params.body_width_m = -0.1;
        assert!(KinConfig::new(&params).is_err());

        let mut params = KinParams::default();
        params.max_pitch_deg = -1.0;
        assert!(matches!(
            KinConfig::new(&params),
            Err(KinError::NegativeLimit("max_pitch_deg", _))
        ));
    }
}
