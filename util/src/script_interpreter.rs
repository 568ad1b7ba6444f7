//! # Script interpreter module
//!
//! This module provides an interpreter for timed telecommand scripts, allowing
//! telecommands to be replayed into the executable without an operator.
//!
//! A script is a text file where each command is written as
//!
//! ```text
//! <exec_time_s>: <tc_json>;
//! ```
//!
//! Lines which do not match this pattern (such as comments) are ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use thiserror::Error;

// Internal
use crate::session::get_elapsed_seconds;
use comms_if::tc::{Tc, TcParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
#[derive(Debug)]
pub struct Command {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The Telecommand to run
    tc: Tc,
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use
/// `.get_pending_tcs` to acquire a list of telecommands that need executing.
#[derive(Debug)]
pub struct ScriptInterpreter {
    cmds: VecDeque<Command>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error("Could not build the script pattern: {0}")]
    PatternError(regex::Error),

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)"
    )]
    InvalidTimestamp(String),

    #[error("Script contains an invalid TC at {0} s: {1}")]
    InvalidTc(f64, TcParseError),
}

/// The result of polling the interpreter for commands.
#[derive(Debug)]
pub enum PendingTcs {
    None,
    Some(Vec<Tc>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = script_path.as_ref();

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(
                path.to_string_lossy().to_string(),
            ));
        }

        let script = fs::read_to_string(path).map_err(ScriptError::ScriptLoadError)?;

        Self::from_script_str(&script)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_script_str(script: &str) -> Result<Self, ScriptError> {
        let mut tc_queue: VecDeque<Command> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .map_err(ScriptError::PatternError)?;

        for cap in re.captures_iter(script) {
            let time_str = cap.get(1).map(|m| m.as_str()).unwrap_or("");
            let payload = cap.get(3).map(|m| m.as_str()).unwrap_or("");

            let exec_time_s: f64 = time_str
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            // Parse the TC from the payload. The scripts contain JSON only.
            let tc = Tc::from_json(payload).map_err(|e| ScriptError::InvalidTc(exec_time_s, e))?;

            tc_queue.push_back(Command { exec_time_s, tc });
        }

        if tc_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter { cmds: tc_queue })
    }

    /// Return the TCs which are due at the current session time.
    pub fn get_pending_tcs(&mut self) -> PendingTcs {
        self.get_pending_tcs_at(get_elapsed_seconds())
    }

    /// Return the TCs which are due at the given time, in script order.
    pub fn get_pending_tcs_at(&mut self, current_time_s: f64) -> PendingTcs {
        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.cmds.is_empty() {
            return PendingTcs::EndOfScript;
        }

        let mut tc_vec: Vec<Tc> = vec![];

        // Keep popping while the head of the queue is due
        while let Some(cmd) = self.cmds.front() {
            if cmd.exec_time_s > current_time_s {
                break;
            }
            if let Some(cmd) = self.cmds.pop_front() {
                tc_vec.push(cmd.tc);
            }
        }

        if tc_vec.is_empty() {
            PendingTcs::None
        } else {
            PendingTcs::Some(tc_vec)
        }
    }

    /// Get the number of TCs in the script
    pub fn get_num_tcs(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SCRIPT: &str = r#"
        # Stand up, walk forwards, then stop
        0.0: {"type": "MotionMode", "payload": "Stand"};
        0.5: {"type": "MotionMode", "payload": "Walk"};
        0.5: {"type": "MotionInput", "payload": {"lx": 0.0, "ly": 0.5, "rx": 0.0, "ry": 0.0, "h": 0.5, "s": 1.0, "s1": 0.0}};
        2.0: {"type": "MakeSafe"};
    "#;

    #[test]
    fn test_parse_and_poll() {
        let mut si = ScriptInterpreter::from_script_str(SCRIPT).unwrap();

        assert_eq!(si.get_num_tcs(), 4);
        assert_eq!(si.get_duration(), 2.0);

        match si.get_pending_tcs_at(0.1) {
            PendingTcs::Some(tcs) => assert_eq!(tcs.len(), 1),
            p => panic!("Expected one TC, got {:?}", p),
        }
        assert!(matches!(si.get_pending_tcs_at(0.2), PendingTcs::None));
        match si.get_pending_tcs_at(1.0) {
            PendingTcs::Some(tcs) => {
                assert_eq!(tcs.len(), 2);
                assert!(matches!(tcs[1], Tc::MotionInput(_)));
            }
            p => panic!("Expected two TCs, got {:?}", p),
        }
        match si.get_pending_tcs_at(2.5) {
            PendingTcs::Some(tcs) => assert!(matches!(tcs[0], Tc::MakeSafe)),
            p => panic!("Expected MakeSafe, got {:?}", p),
        }
        assert!(matches!(si.get_pending_tcs_at(3.0), PendingTcs::EndOfScript));
    }

    #[test]
    fn test_empty_script() {
        assert!(matches!(
            ScriptInterpreter::from_script_str("# nothing here"),
            Err(ScriptError::ScriptEmpty)
        ));
    }

    #[test]
    fn test_invalid_tc() {
        assert!(matches!(
            ScriptInterpreter::from_script_str("1.0: {\"type\": \"Fly\"};"),
            Err(ScriptError::InvalidTc(_, _))
        ));
    }
}
