//! # Quadruped library.
//!
//! This library allows other crates in the workspace (and the benchmarks) to access items defined
//! inside the quadruped executable crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command cell - the latest operator inputs, shared between the TC source and the main loop
pub mod cmd_cell;

/// Global data store for the executable
pub mod data_store;

/// Gait control module - converts gait demands into joint demands for every leg
pub mod gait_ctrl;

/// Input mapping - converts operator inputs into gait and pose demands
pub mod input_map;

/// Kinematics - leg geometry, body transforms and the leg solvers
pub mod kin;

/// Parameters for the executable
pub mod params;

/// Telecommand processor - applies TCs to the operator inputs
pub mod tc_processor;
