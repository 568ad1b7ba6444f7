//! # Communications interface crate.
//!
//! Provides the interface types exchanged between the gait executable and its
//! external collaborators: operator telecommands and the actuation layer.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod tc;

/// Demand and sensor definitions for equipment (like the leg mechanisms)
pub mod eqpt;
