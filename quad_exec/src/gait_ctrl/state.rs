//! Implementations for the GaitCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::eqpt::mech::{JointDems, LegId, NUM_LEGS};
use log::{debug, info, trace};
use serde::Serialize;

// Internal
use super::{
    stance_centroid, ClockStatus, ClockType, CyclicClock, GaitCommand, GaitCtrlError, GaitDemand,
    GaitPattern, LegMode, LegPhase, Params, PhaseClock, PoseDemand, TouchdownClock,
    TrajectoryGenerator,
};
use crate::kin::{BodyPose, KinConfig, KinParams};
use util::{
    archive::{Archived, Archiver},
    module::State,
    params,
    session::{get_elapsed_seconds, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gait control module state
pub struct GaitCtrl {
    pub(crate) params: Params,

    kin: KinConfig,

    pub(crate) pose: BodyPose,

    pub(crate) cmd: GaitCommand,

    clock: Box<dyn PhaseClock>,

    traj: TrajectoryGenerator,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) output: JointDems,
    arch_output: Archiver,
}

/// Parameter files used to initialise GaitCtrl.
#[derive(Debug, Clone, Copy)]
pub struct InitData {
    /// Path to the kinematic parameters, relative to the parameters
    /// directory.
    pub kin_params: &'static str,

    /// Path to the gait parameters, relative to the parameters directory.
    pub gait_params: &'static str,

    /// If false no archives are written.
    pub archive: bool,
}

/// Input data to Gait Control.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    /// Time since the last cycle.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// New gait targets, or `None` to keep the current ones.
    pub gait: Option<GaitDemand>,

    /// New body pose demand, or `None` to keep the current pose.
    pub pose: Option<PoseDemand>,

    /// New gait pattern, or `None` to keep the current one.
    pub pattern: Option<GaitPattern>,

    /// Ground contact flags in leg order.
    pub contacts: [bool; NUM_LEGS],
}

/// Status report for GaitCtrl processing.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusReport {
    /// Phase of each leg after this cycle.
    pub leg_phases: [LegPhase; NUM_LEGS],

    /// No motion was commanded, the feet are relaxing to the standby layout.
    pub idle: bool,

    /// The legs followed their trajectories this cycle.
    pub stepping: bool,

    /// The leg solve saturated for these legs.
    pub ik_saturated: [bool; NUM_LEGS],

    pub clock: ClockStatus,
}

/// Flat archive record of the joint demands.
#[derive(Serialize)]
struct JointDemsRecord {
    time_s: f64,
    fl_abd_rad: f64,
    fl_hip_rad: f64,
    fl_knee_rad: f64,
    fr_abd_rad: f64,
    fr_hip_rad: f64,
    fr_knee_rad: f64,
    bl_abd_rad: f64,
    bl_hip_rad: f64,
    bl_knee_rad: f64,
    br_abd_rad: f64,
    br_hip_rad: f64,
    br_knee_rad: f64,
}

/// Flat archive record of the status report.
#[derive(Serialize)]
struct StatusRecord {
    time_s: f64,
    idle: bool,
    stepping: bool,
    resync: bool,
    touchdown: bool,
    fl_swing: bool,
    fl_phase: f64,
    fl_ik_saturated: bool,
    fr_swing: bool,
    fr_phase: f64,
    fr_ik_saturated: bool,
    bl_swing: bool,
    bl_phase: f64,
    bl_ik_saturated: bool,
    br_swing: bool,
    br_phase: f64,
    br_ik_saturated: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for StatusReport {
    fn default() -> Self {
        Self {
            leg_phases: [LegPhase::stance(0.0); NUM_LEGS],
            idle: false,
            stepping: false,
            ik_saturated: [false; NUM_LEGS],
            clock: ClockStatus::default(),
        }
    }
}

impl Default for InitData {
    fn default() -> Self {
        Self {
            kin_params: "kin_config.toml",
            gait_params: "gait_ctrl.toml",
            archive: true,
        }
    }
}

impl Default for GaitCtrl {
    /// Default kinematics and parameters, without archives.
    fn default() -> Self {
        let kin = KinConfig::default();
        let params = Params::default();

        Self::build(
            kin,
            params,
            Box::new(TouchdownClock::default()),
            GaitPattern::trot(),
        )
    }
}

impl GaitCtrl {
    /// Create a new gait controller without loading any files or archiving.
    pub fn new(kin: KinConfig, params: Params) -> Result<Self, GaitCtrlError> {
        params.validate()?;

        let pattern = GaitPattern::from_gait(params.default_gait, params.stand_frac)?;

        let clock: Box<dyn PhaseClock> = match params.clock {
            ClockType::Touchdown => Box::new(TouchdownClock::new(&params, &pattern)?),
            ClockType::Cyclic => Box::new(CyclicClock::new(&pattern)),
        };

        Ok(Self::build(kin, params, clock, pattern))
    }

    fn build(
        kin: KinConfig,
        params: Params,
        clock: Box<dyn PhaseClock>,
        pattern: GaitPattern,
    ) -> Self {
        let pose = BodyPose::standing(&kin);
        let traj = TrajectoryGenerator::new(&pose.default_feet, &params);

        let mut gait_ctrl = Self {
            params,
            kin,
            pose,
            cmd: GaitCommand::new(pattern),
            clock,
            traj,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
            output: JointDems::default(),
            arch_output: Archiver::default(),
        };

        gait_ctrl.output = gait_ctrl.kin.inverse(&gait_ctrl.pose).0;

        gait_ctrl
    }

    /// The current body pose and foot targets.
    pub fn pose(&self) -> &BodyPose {
        &self.pose
    }

    /// The current (smoothed) gait command.
    pub fn cmd(&self) -> &GaitCommand {
        &self.cmd
    }

    pub fn kin(&self) -> &KinConfig {
        &self.kin
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Stop all motion, subsequent cycles relax the feet to the standby
    /// layout.
    pub fn make_safe(&mut self) {
        self.cmd.halt();
        info!("GaitCtrl made safe");
    }

    fn apply_pose_demand(&mut self, demand: &PoseDemand) {
        let pose = &mut self.pose;

        if let Some(omega) = demand.omega {
            pose.omega = omega;
        }
        if let Some(phi) = demand.phi {
            pose.phi = phi;
        }
        if let Some(psi) = demand.psi {
            pose.psi = psi;
        }
        if let Some(xm) = demand.xm {
            pose.xm = xm;
        }
        if let Some(ym) = demand.ym {
            pose.ym = ym;
        }
        if let Some(zm) = demand.zm {
            pose.zm = zm;
        }
    }

    /// Move the feet for this cycle, either relaxing them while idle or
    /// following the trajectories of the legs.
    fn step_feet(&mut self, dt: f64) {
        if self.cmd.is_idle() {
            self.pose.relax_feet((self.params.idle_relax_rate * dt).min(1.0));
            self.clock.reset();
            self.traj.reset(&self.pose.default_feet);
            self.report.idle = true;
            return;
        }

        self.report.clock = self.clock.advance(&mut self.cmd, dt);

        if self.clock.is_stepping() {
            let mut leg_phases = [LegPhase::stance(0.0); NUM_LEGS];

            for leg in LegId::ALL.iter() {
                let i = leg.index();
                leg_phases[i] = self.clock.leg_phase(*leg);
                self.pose.feet[i] =
                    self.traj
                        .foot_step(*leg, leg_phases[i], &self.cmd, &self.pose.default_feet[i]);
            }
            self.report.stepping = true;

            if self.cmd.pattern.static_stability && self.cmd.is_lifting() {
                self.shift_body(&leg_phases, dt);
            }
        } else {
            self.pose.reset_feet();
        }
    }

    /// Move the body towards the centroid of the feet in stance.
    fn shift_body(&mut self, leg_phases: &[LegPhase; NUM_LEGS], dt: f64) {
        if let Some(centroid) = stance_centroid(leg_phases, &self.pose.default_feet) {
            let blend = 1.0 - (-self.params.stability_shift_rate * dt).exp();
            self.pose.xm += (centroid.x - self.pose.xm) * blend;
            self.pose.zm += (centroid.z - self.pose.zm) * blend;
        }
    }
}

impl State for GaitCtrl {
    type InitData = InitData;
    type InitError = GaitCtrlError;

    type InputData = InputData;
    type OutputData = JointDems;
    type StatusReport = StatusReport;
    type ProcError = GaitCtrlError;

    /// Initialise the GaitCtrl module.
    ///
    /// Expected init data is the paths to the kinematic and gait parameter
    /// files.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let kin_params: KinParams = params::load(init_data.kin_params)?;
        let gait_params: Params = params::load(init_data.gait_params)?;

        *self = Self::new(KinConfig::new(&kin_params)?, gait_params)?;

        if init_data.archive {
            self.arch_report = Archiver::from_path(session, "gait_ctrl/status_report.csv")
                .map_err(|e| GaitCtrlError::ArchiveError(e.to_string()))?;
            self.arch_output = Archiver::from_path(session, "gait_ctrl/joint_dems.csv")
                .map_err(|e| GaitCtrlError::ArchiveError(e.to_string()))?;
        }

        info!(
            "GaitCtrl initialised with the {:?} clock and a {:?} gait",
            self.params.clock, self.params.default_gait
        );

        Ok(())
    }

    /// Perform cyclic processing of Gait Control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        // A rejected pattern leaves the whole command untouched
        if let Some(pattern) = input_data.pattern {
            pattern.validate()?;

            if pattern != self.cmd.pattern {
                debug!("New gait pattern: {:?}", pattern);
                self.cmd.pattern = pattern;
                self.clock.set_pattern(&pattern);
            }
        }

        if let Some(ref demand) = input_data.gait {
            self.cmd.apply_demand(demand);
        }
        if let Some(ref demand) = input_data.pose {
            self.apply_pose_demand(demand);
        }
        self.cmd.contacts = input_data.contacts;

        self.cmd.smooth(input_data.dt_s, self.params.idle_epsilon);

        self.step_feet(input_data.dt_s);

        for leg in LegId::ALL.iter() {
            self.report.leg_phases[leg.index()] = self.clock.leg_phase(*leg);
        }

        let (dems, saturated) = self.kin.inverse(&self.pose);
        self.report.ik_saturated = saturated;

        if saturated.iter().any(|s| *s) {
            trace!("Leg solve saturated: {:?}", saturated);
        }

        trace!("GaitCtrl output: {:?}", dems);

        self.output = dems;

        Ok((self.output, self.report))
    }
}

impl Archived for GaitCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let time_s = get_elapsed_seconds();

        let p = &self.output.pos_rad;
        self.arch_output.serialise(JointDemsRecord {
            time_s,
            fl_abd_rad: p[0][0],
            fl_hip_rad: p[0][1],
            fl_knee_rad: p[0][2],
            fr_abd_rad: p[1][0],
            fr_hip_rad: p[1][1],
            fr_knee_rad: p[1][2],
            bl_abd_rad: p[2][0],
            bl_hip_rad: p[2][1],
            bl_knee_rad: p[2][2],
            br_abd_rad: p[3][0],
            br_hip_rad: p[3][1],
            br_knee_rad: p[3][2],
        })?;

        let r = &self.report;
        let swing = |i: usize| r.leg_phases[i].mode == LegMode::Swing;
        self.arch_report.serialise(StatusRecord {
            time_s,
            idle: r.idle,
            stepping: r.stepping,
            resync: r.clock.resync,
            touchdown: r.clock.touchdown,
            fl_swing: swing(0),
            fl_phase: r.leg_phases[0].phase,
            fl_ik_saturated: r.ik_saturated[0],
            fr_swing: swing(1),
            fr_phase: r.leg_phases[1].phase,
            fr_ik_saturated: r.ik_saturated[1],
            bl_swing: swing(2),
            bl_phase: r.leg_phases[2].phase,
            bl_ik_saturated: r.ik_saturated[2],
            br_swing: swing(3),
            br_phase: r.leg_phases[3].phase,
            br_ik_saturated: r.ik_saturated[3],
        })?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
