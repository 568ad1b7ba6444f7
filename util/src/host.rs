//! Host platform utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::env;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the environment variable pointing at the root of the software
/// checkout. Parameter files and session directories are resolved against it.
pub const SW_ROOT_ENV_VAR: &str = "QUAD_SW_ROOT";

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the root directory of the software from the `QUAD_SW_ROOT` environment
/// variable.
pub fn get_quad_sw_root() -> Result<PathBuf, env::VarError> {
    env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}

/// Get a short description of the host this executable is running on.
pub fn get_host_desc() -> String {
    format!("{} ({})", env::consts::OS, env::consts::ARCH)
}
