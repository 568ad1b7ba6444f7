//! # Quadruped Executable Parameters
//!
//! This module provide parameters for the quadruped executable.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadExecParams {
    /// Target period of one cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Number of consecutive cycle overruns after which safe mode is entered.
    pub max_consec_overruns: u64,

    /// Write the module archives every cycle.
    pub archive_enabled: bool,

    /// Period at which the script feeder checks for due TCs.
    ///
    /// Units: seconds
    pub script_poll_period_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl Default for QuadExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.01,
            max_consec_overruns: 50,
            archive_enabled: true,
            script_poll_period_s: 0.005,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_file() {
        let p: QuadExecParams = util::params::from_toml_str("cycle_period_s = 0.02").unwrap();

        assert_eq!(p.cycle_period_s, 0.02);
        assert_eq!(p.max_consec_overruns, 50);
        assert!(p.archive_enabled);
    }
}
