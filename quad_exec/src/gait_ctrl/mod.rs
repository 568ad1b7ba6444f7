//! # Gait control module
//!
//! Converts the operator's gait demands into joint demands for every leg,
//! once per control cycle:
//!
//! 1. Smooth the gait command towards its targets.
//! 2. Advance the leg phase clock.
//! 3. Generate the stance or swing trajectory of each foot.
//! 4. Solve the inverse kinematics of the legs.
//!
//! The cycle never fails on numeric edge cases. Infeasible timing falls back
//! to standing still and unreachable feet saturate the leg solve.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod params;
mod phase_clock;
mod state;
mod trajectory;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use cmd::*;
pub use params::*;
pub use phase_clock::*;
pub use state::*;
pub use trajectory::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during GaitCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum GaitCtrlError {
    #[error("Could not load the parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Invalid kinematic configuration: {0}")]
    KinError(#[from] crate::kin::KinError),

    #[error("Invalid gait pattern: {0}")]
    InvalidGaitPattern(String),

    #[error("{0} is not a valid leg index")]
    InvalidLegIndex(usize),

    #[error("Invalid parameter {0}: {1}")]
    InvalidParam(&'static str, f64),

    #[error("Could not create the archives: {0}")]
    ArchiveError(String),
}
