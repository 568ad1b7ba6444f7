//! # Kinematics module
//!
//! Geometry of the robot and the analytic kinematics of its legs.
//!
//! ## Frames
//!
//! All positions use the body convention: `x` forwards, `y` upwards and `z`
//! to the left. The world frame is the body frame with the body pose
//! (`BodyPose`) removed. Each leg has a local frame at its mount point in
//! which the single leg solve is performed, mirrored for right hand legs so
//! that all four legs share the same solution.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod body_pose;
mod forward_kinematics;
mod inverse_kinematics;
mod kin_config;
mod transform;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use body_pose::*;
pub use forward_kinematics::*;
pub use inverse_kinematics::*;
pub use kin_config::*;
pub use transform::*;

pub use comms_if::eqpt::mech::{LegId, NUM_LEGS};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors in the kinematic configuration. These are only raised during
/// construction, the solvers themselves never fail.
#[derive(Debug, thiserror::Error)]
pub enum KinError {
    #[error("{0} must be positive, found {1}")]
    NonPositiveLength(&'static str, f64),

    #[error("{0} must not be negative, found {1}")]
    NegativeLimit(&'static str, f64),

    #[error("Expected {expected} feet and default feet, found {feet} and {default_feet}")]
    LegCountMismatch {
        expected: usize,
        feet: usize,
        default_feet: usize,
    },
}
