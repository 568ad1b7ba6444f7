//! # Telecommand processor module
//!
//! The telecommand processor handles various TCs coming from any source,
//! applying them to the latest input snapshot.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use crate::cmd_cell::InputSnapshot;
use comms_if::tc::{MotionMode, Tc, TcResponse};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// While the snapshot is safe only `MakeUnsafe` is executed. While the motion
/// mode is `Deactivated` operator inputs are refused.
pub fn apply(snapshot: &mut InputSnapshot, tc: &Tc) -> TcResponse {
    if snapshot.safe {
        return match tc {
            Tc::MakeUnsafe => {
                debug!("Recieved MakeUnsafe command");
                snapshot.safe = false;
                TcResponse::Ok
            }
            _ => TcResponse::CannotExecute,
        };
    }

    // Handle different Tcs
    match tc {
        Tc::MakeSafe => {
            debug!("Recieved MakeSafe command");
            snapshot.safe = true;
        }
        Tc::MakeUnsafe => {
            debug!("Recieved MakeUnsafe command while not safe");
        }
        Tc::MotionMode(m) => {
            debug!("Motion mode changed to {:?}", m);
            snapshot.mode = *m;
        }
        Tc::MotionInput(i) => {
            if snapshot.mode == MotionMode::Deactivated {
                return TcResponse::CannotExecute;
            }
            if !i.is_valid() {
                warn!("Rejected out of range motion input: {:?}", i);
                return TcResponse::CannotExecute;
            }
            snapshot.input = *i;
        }
        Tc::WalkGait(g) => {
            debug!("Walk gait changed to {:?}", g);
            snapshot.gait_type = *g;
        }
        Tc::Contacts(c) => snapshot.contacts = c.in_contact,
    }

    TcResponse::Ok
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
