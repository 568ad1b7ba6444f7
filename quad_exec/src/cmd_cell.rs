//! # Command cell
//!
//! A "latest state" cell holding the operator's inputs. One producer (the
//! `ScriptFeeder`, or any other TC source) writes into it, and the main loop
//! takes a complete snapshot at the start of every cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread::{self, JoinHandle},
    time::Duration,
};
use thiserror::Error;

// Internal
use crate::tc_processor;
use comms_if::{
    eqpt::mech::NUM_LEGS,
    tc::{GaitType, MotionInput, MotionMode, TcResponse},
};
use util::{
    raise_error,
    script_interpreter::{PendingTcs, ScriptInterpreter},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Everything the operator has commanded so far.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSnapshot {
    pub mode: MotionMode,

    pub input: MotionInput,

    pub gait_type: GaitType,

    /// Foot contact flags in leg order.
    pub contacts: [bool; NUM_LEGS],

    /// Safe mode has been requested by a `MakeSafe` TC.
    pub safe: bool,

    /// The producer has finished, no further inputs will arrive.
    pub ended: bool,
}

/// Shared handle to the latest input snapshot.
#[derive(Debug, Clone, Default)]
pub struct CmdCell {
    inner: Arc<Mutex<InputSnapshot>>,
}

/// Background thread replaying a TC script into a `CmdCell`.
pub struct ScriptFeeder {
    jh: Option<JoinHandle<()>>,
    run: Arc<AtomicBool>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CmdCellError {
    #[error("Could not start the script feeder thread: {0}")]
    SpawnError(std::io::Error),

    #[error("The script feeder thread panicked")]
    FeederPanicked,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CmdCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy out the current snapshot.
    pub fn snapshot(&self) -> InputSnapshot {
        match self.inner.lock() {
            Ok(s) => *s,
            Err(_) => raise_error!("CmdCell mutex poisoned"),
        }
    }

    /// Modify the snapshot in place, returning the result of `f`.
    pub fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut InputSnapshot) -> R,
    {
        match self.inner.lock() {
            Ok(mut s) => f(&mut *s),
            Err(_) => raise_error!("CmdCell mutex poisoned"),
        }
    }

    /// Mark the producer as finished.
    pub fn finish(&self) {
        self.update(|s| s.ended = true);
    }
}

impl ScriptFeeder {
    /// Start replaying the script into the cell, polling it every
    /// `poll_period`.
    ///
    /// TCs become due according to the session clock. Once the script ends
    /// the cell is marked as finished and the thread exits.
    pub fn spawn(
        si: ScriptInterpreter,
        cell: CmdCell,
        poll_period: Duration,
    ) -> Result<Self, CmdCellError> {
        let run = Arc::new(AtomicBool::new(true));
        let run_clone = run.clone();

        let jh = thread::Builder::new()
            .name("script_feeder".into())
            .spawn(move || feeder_thread(si, cell, run_clone, poll_period))
            .map_err(CmdCellError::SpawnError)?;

        Ok(Self { jh: Some(jh), run })
    }

    /// Stop the thread and wait for it to exit.
    pub fn stop(mut self) -> Result<(), CmdCellError> {
        self.run.store(false, Ordering::Relaxed);
        self.join_inner()
    }

    /// Wait for the thread to reach the end of the script.
    pub fn join(mut self) -> Result<(), CmdCellError> {
        self.join_inner()
    }

    fn join_inner(&mut self) -> Result<(), CmdCellError> {
        match self.jh.take() {
            Some(jh) => jh.join().map_err(|_| CmdCellError::FeederPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for ScriptFeeder {
    fn drop(&mut self) {
        self.run.store(false, Ordering::Relaxed);
        self.join_inner().ok();
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn feeder_thread(
    mut si: ScriptInterpreter,
    cell: CmdCell,
    run: Arc<AtomicBool>,
    poll_period: Duration,
) {
    while run.load(Ordering::Relaxed) {
        match si.get_pending_tcs() {
            PendingTcs::None => (),
            PendingTcs::Some(tcs) => {
                for tc in tcs.iter() {
                    match cell.update(|s| tc_processor::apply(s, tc)) {
                        TcResponse::Ok => (),
                        TcResponse::CannotExecute => warn!("Could not execute {:?}", tc),
                    }
                }
            }
            PendingTcs::EndOfScript => {
                info!("End of TC script reached");
                cell.finish();
                return;
            }
        }

        thread::sleep(poll_period);
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
