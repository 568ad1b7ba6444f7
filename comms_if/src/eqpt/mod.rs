//! # Equipment Interface
//!
//! This module defines the interface structures exchanged with the actuation layer.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod mech;
