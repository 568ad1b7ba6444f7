//! Gait command and demand definitions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::{eqpt::mech::NUM_LEGS, tc::GaitType};
use serde::Serialize;

use super::GaitCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Per-leg phase offsets and the fraction of the cycle spent in stance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaitPattern {
    /// Phase lag of each leg as a fraction of the stride, in `[0, 1)`.
    pub offsets: [f64; NUM_LEGS],

    /// Fraction of the cycle spent in stance, in `(0, 1)`.
    pub stand_frac: f64,

    /// Keep the body over the feet in stance: the body is shifted towards
    /// their centroid and stance feet stay flat on the ground.
    pub static_stability: bool,
}

/// New targets for the gait command, produced by the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GaitDemand {
    /// Signed length of one stride, negative when walking backwards.
    ///
    /// Units: meters
    pub step_length: f64,

    /// Direction of the stride relative to straight ahead, positive to the
    /// left.
    ///
    /// Units: radians
    pub lateral_fraction: f64,

    /// Turn demand, positive to the left.
    pub yaw_rate: f64,

    /// Speed of the stance sweep. Zero halts the clock.
    ///
    /// Units: meters/second
    pub step_velocity: f64,

    /// Height the feet are lifted to during swing.
    ///
    /// Units: meters
    pub clearance_height: f64,

    /// Depth the feet are pressed into the ground during stance.
    ///
    /// Units: meters
    pub penetration_depth: f64,
}

/// New body pose values, produced by the input layer.
///
/// Only the fields which are `Some` are applied.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PoseDemand {
    pub omega: Option<f64>,
    pub phi: Option<f64>,
    pub psi: Option<f64>,
    pub xm: Option<f64>,
    pub ym: Option<f64>,
    pub zm: Option<f64>,
}

/// The smoothed gait command the trajectories are generated from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaitCommand {
    // ---- LIVE ----
    /// Units: meters
    pub step_length: f64,
    /// Units: radians
    pub lateral_fraction: f64,
    pub yaw_rate: f64,

    // ---- TARGETS ----
    pub target_step_length: f64,
    pub target_lateral_fraction: f64,
    pub target_yaw_rate: f64,

    // ---- UNSMOOTHED ----
    /// Units: meters/second
    pub step_velocity: f64,
    /// Units: meters
    pub clearance_height: f64,
    /// Units: meters
    pub penetration_depth: f64,

    pub pattern: GaitPattern,

    /// Ground contact flag of each leg.
    pub contacts: [bool; NUM_LEGS],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GaitPattern {
    /// Create a new pattern, checking the offsets and stand fraction are in
    /// range.
    pub fn new(offsets: [f64; NUM_LEGS], stand_frac: f64) -> Result<Self, GaitCtrlError> {
        let pattern = Self {
            offsets,
            stand_frac,
            static_stability: false,
        };
        pattern.validate()?;
        Ok(pattern)
    }

    /// Diagonal pairs in phase, pairs half a cycle apart.
    pub fn trot() -> Self {
        Self {
            offsets: [0.0, 0.5, 0.5, 0.0],
            stand_frac: 0.75,
            static_stability: false,
        }
    }

    /// One leg lifted at a time. Front left, back right, front right and back
    /// left lag by successive quarter cycles.
    pub fn crawl() -> Self {
        Self {
            offsets: [0.0, 0.5, 0.75, 0.25],
            stand_frac: 0.75,
            static_stability: true,
        }
    }

    /// The pattern for a gait type with the given stand fraction.
    pub fn from_gait(gait: GaitType, stand_frac: f64) -> Result<Self, GaitCtrlError> {
        let base = match gait {
            GaitType::Trot => Self::trot(),
            GaitType::Crawl => Self::crawl(),
        };
        let mut pattern = Self::new(base.offsets, stand_frac)?;
        pattern.static_stability = base.static_stability;
        Ok(pattern)
    }

    pub fn validate(&self) -> Result<(), GaitCtrlError> {
        if !(self.stand_frac > 0.0 && self.stand_frac < 1.0) {
            return Err(GaitCtrlError::InvalidGaitPattern(format!(
                "stand fraction must be in (0, 1), found {}",
                self.stand_frac
            )));
        }

        if let Some(o) = self.offsets.iter().find(|o| !(**o >= 0.0 && **o < 1.0)) {
            return Err(GaitCtrlError::InvalidGaitPattern(format!(
                "phase offsets must be in [0, 1), found {}",
                o
            )));
        }

        Ok(())
    }
}

impl GaitCommand {
    pub fn new(pattern: GaitPattern) -> Self {
        Self {
            step_length: 0.0,
            lateral_fraction: 0.0,
            yaw_rate: 0.0,
            target_step_length: 0.0,
            target_lateral_fraction: 0.0,
            target_yaw_rate: 0.0,
            step_velocity: 0.0,
            clearance_height: 0.0,
            penetration_depth: 0.0,
            pattern,
            contacts: [false; NUM_LEGS],
        }
    }

    /// Set the targets and the unsmoothed values from a demand.
    pub fn apply_demand(&mut self, demand: &GaitDemand) {
        self.target_step_length = demand.step_length;
        self.target_lateral_fraction = demand.lateral_fraction;
        self.target_yaw_rate = demand.yaw_rate;
        self.step_velocity = demand.step_velocity;
        self.clearance_height = demand.clearance_height;
        self.penetration_depth = demand.penetration_depth;
    }

    /// Move the live values towards their targets by `v = v(1 - dt) + target dt`.
    ///
    /// A live value whose target is zero snaps to zero once its magnitude
    /// falls below `epsilon`, so that a released command becomes idle.
    pub fn smooth(&mut self, dt: f64, epsilon: f64) {
        smooth_value(&mut self.step_length, self.target_step_length, dt, epsilon);
        smooth_value(
            &mut self.lateral_fraction,
            self.target_lateral_fraction,
            dt,
            epsilon,
        );
        smooth_value(&mut self.yaw_rate, self.target_yaw_rate, dt, epsilon);
    }

    /// True if there is no translation or rotation being commanded.
    pub fn is_idle(&self) -> bool {
        self.step_length == 0.0
            && self.lateral_fraction == 0.0
            && self.yaw_rate == 0.0
            && self.target_step_length == 0.0
            && self.target_lateral_fraction == 0.0
            && self.target_yaw_rate == 0.0
    }

    /// True if the feet should be lifted during swing.
    pub fn is_lifting(&self) -> bool {
        self.step_length != 0.0 || self.yaw_rate != 0.0
    }

    /// Stop all motion immediately.
    pub fn halt(&mut self) {
        self.step_length = 0.0;
        self.lateral_fraction = 0.0;
        self.yaw_rate = 0.0;
        self.target_step_length = 0.0;
        self.target_lateral_fraction = 0.0;
        self.target_yaw_rate = 0.0;
        self.step_velocity = 0.0;
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn smooth_value(value: &mut f64, target: f64, dt: f64, epsilon: f64) {
    *value = *value * (1.0 - dt) + target * dt;

    if target == 0.0 && value.abs() < epsilon {
        *value = 0.0;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pattern_validation() {
        assert!(GaitPattern::new([0.0, 0.5, 0.5, 0.0], 0.75).is_ok());
        assert!(GaitPattern::new([0.0, 0.5, 0.5, 0.0], 0.0).is_err());
        assert!(GaitPattern::new([0.0, 0.5, 0.5, 0.0], 1.0).is_err());
        assert!(GaitPattern::new([0.0, 0.5, 0.5, 0.0], f64::NAN).is_err());
        assert!(GaitPattern::new([0.0, 1.0, 0.5, 0.0], 0.5).is_err());
        assert!(GaitPattern::new([-0.1, 0.5, 0.5, 0.0], 0.5).is_err());

        let crawl = GaitPattern::from_gait(GaitType::Crawl, 0.8).unwrap();
        assert_eq!(crawl.offsets, GaitPattern::crawl().offsets);
        assert_eq!(crawl.stand_frac, 0.8);
        assert!(crawl.static_stability);
        assert!(!GaitPattern::from_gait(GaitType::Trot, 0.8).unwrap().static_stability);
    }

    #[test]
    fn test_smoothing() {
        let mut cmd = GaitCommand::new(GaitPattern::trot());
        cmd.apply_demand(&GaitDemand {
            step_length: 0.1,
            yaw_rate: -0.5,
            step_velocity: 1.0,
            ..Default::default()
        });

        cmd.smooth(0.1, 1e-3);
        assert!((cmd.step_length - 0.01).abs() < 1e-12);
        assert!((cmd.yaw_rate + 0.05).abs() < 1e-12);
        assert!(!cmd.is_idle());

        // Converges on the targets
        for _ in 0..500 {
            cmd.smooth(0.1, 1e-3);
        }
        assert!((cmd.step_length - 0.1).abs() < 1e-9);

        // And decays to exactly zero once released
        cmd.apply_demand(&GaitDemand::default());
        for _ in 0..500 {
            cmd.smooth(0.1, 1e-3);
        }
        assert_eq!(cmd.step_length, 0.0);
        assert_eq!(cmd.yaw_rate, 0.0);
        assert!(cmd.is_idle());
    }

    #[test]
    fn test_lift_gating() {
        let mut cmd = GaitCommand::new(GaitPattern::trot());
        assert!(!cmd.is_lifting());
        cmd.yaw_rate = 0.1;
        assert!(cmd.is_lifting());
        cmd.halt();
        assert!(!cmd.is_lifting());
        assert!(cmd.is_idle());
    }
}
