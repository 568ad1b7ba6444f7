//! # Motion telecommands
//!
//! Operator controls and the modes which determine how they drive the robot.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Range of a raw controller channel.
pub const RAW_CHANNEL_RANGE: (f64, f64) = (-127.0, 128.0);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A snapshot of the operator's controls.
///
/// Stick axes are normalised to `[-1, 1]`, the remaining channels to `[0, 1]`.
/// Missing fields deserialise to zero.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionInput {
    /// Left stick, lateral axis. Positive to the right.
    pub lx: f64,

    /// Left stick, longitudinal axis. Positive forwards.
    pub ly: f64,

    /// Right stick, lateral axis. Positive to the right.
    pub rx: f64,

    /// Right stick, longitudinal axis. Positive forwards.
    pub ry: f64,

    /// Body height demand.
    pub h: f64,

    /// Step velocity demand. Zero selects the nominal velocity.
    pub s: f64,

    /// Step clearance demand. Zero selects the default clearance.
    pub s1: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The way the operator's controls are interpreted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionMode {
    /// Outputs are held and no command is accepted.
    Deactivated,

    /// Standing still, controls ignored.
    Idle,

    /// Body lowered to rest height.
    Rest,

    /// Standing in place, the sticks shift and tilt the body.
    Stand,

    /// Stepping, the sticks drive the gait.
    Walk,
}

/// Footfall pattern used when walking.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GaitType {
    /// Diagonal leg pairs step together.
    Trot,

    /// One leg steps at a time.
    Crawl,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for MotionMode {
    fn default() -> Self {
        MotionMode::Idle
    }
}

impl Default for GaitType {
    fn default() -> Self {
        GaitType::Trot
    }
}

impl MotionInput {
    /// Returns true if every channel is within its normalised range.
    pub fn is_valid(&self) -> bool {
        let sticks = [self.lx, self.ly, self.rx, self.ry];
        let levels = [self.h, self.s, self.s1];

        sticks.iter().all(|v| (-1.0..=1.0).contains(v))
            && levels.iter().all(|v| (0.0..=1.0).contains(v))
    }
}
