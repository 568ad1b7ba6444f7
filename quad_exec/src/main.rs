//! Main quadruped executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Start the TC source (a script feeder) on its own thread
//!     - Main loop:
//!         - Take a snapshot of the operator's inputs
//!         - Safe mode handling
//!         - Input mapping into gait and pose demands
//!         - Gait control processing
//!         - Archiving
//!         - Cycle management
//!
//! # Modules
//!
//! All modules (e.g. `gait_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use comms_if::tc::MotionMode;
use quad_lib::{
    cmd_cell::{CmdCell, ScriptFeeder},
    data_store::{DataStore, SafeModeCause},
    gait_ctrl::{self, GaitPattern},
    input_map::map_input,
    params::QuadExecParams,
};
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::ScriptInterpreter,
    session::Session,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "quad_exec", about = "Quadruped gait executable")]
struct Opt {
    /// TC script to replay. Without a script the robot holds its standing
    /// pose until stopped.
    #[structopt(parse(from_os_str))]
    script: Option<PathBuf>,

    /// Minimum level of the log records, at least `info`.
    #[structopt(short, long, default_value = "debug")]
    log_level: LevelFilter,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("quad_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opt.log_level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Quadruped Executable\n");
    info!("Running on: {}", host::get_host_desc());
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let exec_params: QuadExecParams =
        util::params::load("quad_exec.toml").wrap_err("Could not load exec params")?;

    info!(
        "Exec parameters loaded: {}",
        serde_json::to_string(&exec_params).wrap_err("Could not echo exec params")?
    );

    let cycle_frequency_hz = 1.0 / exec_params.cycle_period_s;

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.gait_ctrl
        .init(
            gait_ctrl::InitData {
                archive: exec_params.archive_enabled,
                ..Default::default()
            },
            &session,
        )
        .wrap_err("Failed to initialise GaitCtrl")?;
    info!("GaitCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE TC SOURCE ----

    let cell = CmdCell::new();

    let feeder = match opt.script {
        Some(ref path) => {
            info!("Loading script from {:?}", path);

            let si = ScriptInterpreter::new(path).wrap_err("Failed to load script")?;

            info!(
                "Loaded script lasts {:.02} s and contains {} TCs\n",
                si.get_duration(),
                si.get_num_tcs()
            );

            Some(
                ScriptFeeder::spawn(
                    si,
                    cell.clone(),
                    Duration::from_secs_f64(exec_params.script_poll_period_s),
                )
                .wrap_err("Failed to start the script feeder")?,
            )
        }
        None => {
            info!("No script provided, holding the standing pose\n");
            None
        }
    };

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(cycle_frequency_hz);

        // ---- INPUT ACQUISITION ----

        ds.input = cell.snapshot();

        if ds.input.ended {
            info!("TC source finished, stopping");
            break;
        }

        if ds.input.safe {
            ds.make_safe(SafeModeCause::MakeSafeTc);
        } else {
            ds.make_unsafe(SafeModeCause::MakeSafeTc).ok();
        }

        // ---- INPUT MAPPING ----

        // In safe mode nothing new is demanded, so GaitCtrl relaxes to
        // the standby pose.
        if !ds.safe {
            let (gait, pose) = map_input(ds.gait_ctrl.kin(), ds.input.mode, &ds.input.input);
            ds.gait_ctrl_input.gait = Some(gait);
            ds.gait_ctrl_input.pose = pose;

            if ds.input.mode == MotionMode::Walk {
                ds.gait_ctrl_input.pattern =
                    GaitPattern::from_gait(ds.input.gait_type, ds.gait_ctrl.params().stand_frac)
                        .ok();
            }
        }

        ds.gait_ctrl_input.contacts = ds.input.contacts;
        ds.gait_ctrl_input.dt_s = if ds.dt_s > 0.0 {
            ds.dt_s
        } else {
            exec_params.cycle_period_s
        };

        // ---- CONTROL ALGORITHM PROCESSING ----

        // Deactivated holds the last output
        if ds.input.mode != MotionMode::Deactivated {
            match ds.gait_ctrl.proc(&ds.gait_ctrl_input) {
                Ok((o, r)) => {
                    ds.gait_ctrl_output = o;
                    ds.gait_ctrl_status_rpt = r;
                }
                Err(e) => {
                    // GaitCtrl errors usually just mean a bad TC was sent, so just issue the
                    // warning and continue.
                    warn!("Error during GaitCtrl processing: {}", e)
                }
            };
        }

        // ---- WRITE ARCHIVES ----

        if exec_params.archive_enabled {
            if let Err(e) = ds.gait_ctrl.write() {
                warn!("Could not write GaitCtrl archives: {}", e);
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(exec_params.cycle_period_s).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                ds.make_unsafe(SafeModeCause::CycleOverruns).ok();
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - exec_params.cycle_period_s
                );
                ds.num_consec_cycle_overruns += 1;

                if ds.num_consec_cycle_overruns > exec_params.max_consec_overruns {
                    if !ds.safe {
                        error!(
                            "More than {} consecutive cycle overruns",
                            exec_params.max_consec_overruns
                        );
                    }
                    ds.make_safe(SafeModeCause::CycleOverruns);
                }
            }
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    if let Some(f) = feeder {
        f.stop().wrap_err("Script feeder did not stop cleanly")?;
    }

    info!("End of execution");

    Ok(())
}
