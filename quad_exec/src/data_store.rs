//! # Data Store

use comms_if::eqpt::mech::JointDems;
use log::{info, warn};

use crate::{cmd_cell::InputSnapshot, gait_ctrl};

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the robot has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    MakeSafeTc,
    CycleOverruns,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time at the start of the cycle
    pub cycle_start_s: f64,

    /// Duration of the previous cycle, used as the step of the gait
    ///
    /// Units: seconds
    pub dt_s: f64,

    // Safe mode variables
    /// Determines if the robot is in safe mode.
    pub safe: bool,

    /// Gives the reason for the robot being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // Operator input
    pub input: InputSnapshot,

    // GaitCtrl
    pub gait_ctrl: gait_ctrl::GaitCtrl,
    pub gait_ctrl_input: gait_ctrl::InputData,
    pub gait_ctrl_output: JointDems,
    pub gait_ctrl_status_rpt: gait_ctrl::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Puts the robot into safe mode with the given cause.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);

            // Make gait_ctrl safe
            self.gait_ctrl.make_safe();
        }
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// Returns `Ok(())` if this cause was cleared and safe mode was disabled, or `Err(())`
    /// otherwise. To remove safe mode the provided cause must match the initial reason for safe
    /// mode being enabled.
    ///
    /// If safe mode was not enabled `Ok(())` is returned
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), ()> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(root_cause) => {
                if cause == root_cause {
                    self.safe = false;
                    self.safe_cause = None;
                    warn!("Make unsafe requested, root cause match, safe mode disabled");
                    Ok(())
                } else {
                    Err(())
                }
            }
            None => Ok(()),
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        let freq = (cycle_frequency_hz.round() as u128).max(1);
        self.is_1_hz_cycle = self.num_cycles % freq == 0;

        self.gait_ctrl_input = gait_ctrl::InputData::default();
        self.gait_ctrl_status_rpt = gait_ctrl::StatusReport::default();

        let now_s = util::session::get_elapsed_seconds();
        if self.num_cycles > 0 {
            self.dt_s = now_s - self.cycle_start_s;
        }
        self.cycle_start_s = now_s;
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        if self.is_1_hz_cycle {
            info!(
                "Cycle {}: mode {:?}, safe {}",
                self.num_cycles, self.input.mode, self.safe
            );
        }

        self.num_cycles += 1;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
