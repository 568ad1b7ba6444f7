//! Cyclic module interface
//!
//! `quad_exec` drives its control modules through the `State` trait: `init`
//! once with the module's parameter files and the session, then `proc` once
//! per control cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::session::Session;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A control module stepped once per cycle by the executable.
pub trait State {
    /// Parameter file paths and options needed to set the module up.
    type InitData;
    type InitError;

    /// Demands and feedback for one cycle.
    type InputData;
    /// Demands produced for the actuators or the next module.
    type OutputData;
    /// Per cycle diagnostics, archived alongside the output.
    type StatusReport;
    type ProcError;

    /// Load parameters and open the module's archives in the session
    /// directory.
    ///
    /// After an error the module must not be processed.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Process one control cycle.
    ///
    /// An error leaves the previous output in place, so the caller may log
    /// it and continue with the next cycle.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
