//! Parameters structure for GaitCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::{eqpt::mech::LegId, tc::GaitType};
use serde::{Deserialize, Serialize};

use super::GaitCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for gait control.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    // ---- CLOCK ----
    /// Which phase clock formulation drives the legs.
    pub clock: ClockType,

    /// Duration of the swing phase of a leg.
    ///
    /// Units: seconds
    pub swing_period_s: f64,

    /// Largest allowed ratio between the stance and swing durations.
    pub max_stance_swing_ratio: f64,

    /// Index of the leg whose touchdown anchors the clock.
    pub ref_leg_index: usize,

    /// Index of the leg whose ground contact arms the touchdown.
    pub touchdown_arm_leg_index: usize,

    /// Reference leg swing progress after which a pending touchdown is
    /// recorded.
    pub touchdown_swing_progress: f64,

    /// Reference leg swing progress at which the swing is complete.
    pub swing_complete_progress: f64,

    // ---- GAIT ----
    /// Gait used until a different one is commanded.
    pub default_gait: GaitType,

    /// Fraction of the cycle each leg spends in stance.
    ///
    /// Only the cyclic clock uses this. The touchdown clock times the stance
    /// from the step length and velocity.
    pub stand_frac: f64,

    /// Gain between the yaw rate and the amplitude of the yaw trajectory.
    pub yaw_step_gain: f64,

    /// Weight of the yaw trajectory when summed with the linear one.
    pub yaw_delta_weight: f64,

    /// Rate at which gaits with static stability shift the body over the
    /// stance feet.
    ///
    /// Units: 1/seconds
    pub stability_shift_rate: f64,

    // ---- IDLE ----
    /// Rate at which the feet return to the standby layout when idle.
    ///
    /// Units: 1/seconds
    pub idle_relax_rate: f64,

    /// Live command values smaller than this are snapped to zero once their
    /// target is zero.
    pub idle_epsilon: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Phase clock formulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockType {
    /// Time indexed from the reference leg's touchdown.
    Touchdown,

    /// Single wrapping phase advanced by the step velocity.
    Cyclic,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            clock: ClockType::Touchdown,
            swing_period_s: 0.2,
            max_stance_swing_ratio: 1.3,
            ref_leg_index: 0,
            touchdown_arm_leg_index: 0,
            touchdown_swing_progress: 0.9,
            swing_complete_progress: 0.999,
            default_gait: GaitType::Trot,
            stand_frac: 0.75,
            yaw_step_gain: 2.0,
            yaw_delta_weight: 0.2,
            stability_shift_rate: 16.0,
            idle_relax_rate: 10.0,
            idle_epsilon: 1e-3,
        }
    }
}

impl Params {
    /// Check the parameters can drive either clock.
    pub fn validate(&self) -> Result<(), GaitCtrlError> {
        for &index in [self.ref_leg_index, self.touchdown_arm_leg_index].iter() {
            if LegId::from_index(index).is_none() {
                return Err(GaitCtrlError::InvalidLegIndex(index));
            }
        }

        let positive = [
            ("swing_period_s", self.swing_period_s),
            ("max_stance_swing_ratio", self.max_stance_swing_ratio),
        ];
        for &(name, value) in positive.iter() {
            if !(value > 0.0) {
                return Err(GaitCtrlError::InvalidParam(name, value));
            }
        }

        let non_negative = [
            ("idle_relax_rate", self.idle_relax_rate),
            ("stability_shift_rate", self.stability_shift_rate),
        ];
        for &(name, value) in non_negative.iter() {
            if !(value >= 0.0) {
                return Err(GaitCtrlError::InvalidParam(name, value));
            }
        }

        Ok(())
    }
}
