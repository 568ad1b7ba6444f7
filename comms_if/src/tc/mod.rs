//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications
//! interface. Telecommands are exchanged as JSON objects of the form
//! `{"type": <variant>, "payload": <data>}`, where `payload` is omitted for
//! commands which carry no data.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod motion;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal
pub use motion::{GaitType, MotionInput, MotionMode};

use crate::eqpt::mech::ContactData;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the robot by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Tc {
    /// Put the robot into safe mode, stopping all stepping.
    MakeSafe,

    /// Remove the safe mode, if it was set by a `MakeSafe` command.
    MakeUnsafe,

    /// A new snapshot of the operator's controls.
    MotionInput(MotionInput),

    /// Switch the way operator controls are interpreted.
    MotionMode(MotionMode),

    /// Select the gait used when walking.
    WalkGait(GaitType),

    /// Foot contact flags, normally provided by a simulation harness.
    Contacts(ContactData),
}

/// Response to a telecommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TcResponse {
    /// Telecommand was accepted.
    Ok,

    /// Telecommand cannot be executed now, for instance because the robot is
    /// in safe mode.
    CannotExecute,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }

    /// Serialise the TC into a JSON packet
    pub fn to_json(&self) -> Result<String, TcParseError> {
        serde_json::to_string(self).map_err(TcParseError::InvalidJson)
    }
}
