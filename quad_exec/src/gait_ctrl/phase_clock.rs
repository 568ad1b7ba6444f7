//! Leg phase clocks
//!
//! A phase clock decides, for every leg, whether it is in stance or swing and
//! how far through that phase it is. Two formulations are provided:
//!
//! - `TouchdownClock` indexes time from the last touchdown of a reference leg
//!   and derives the stance duration from the step length and velocity. The
//!   stand fraction of the pattern is not used.
//! - `CyclicClock` advances a single wrapping phase by the step velocity and
//!   splits each leg's cycle by the stand fraction.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::mech::{LegId, NUM_LEGS};
use log::debug;
use serde::Serialize;
use util::maths::{clamp, rem_euclid};

use super::{GaitCommand, GaitCtrlError, GaitPattern, Params};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Per-leg phase state machine.
pub trait PhaseClock: Send {
    /// Advance the clock by one tick.
    ///
    /// A zero step velocity halts the command by zeroing its step length.
    fn advance(&mut self, cmd: &mut GaitCommand, dt: f64) -> ClockStatus;

    /// Current phase of the given leg. Never modifies the clock.
    fn leg_phase(&self, leg: LegId) -> LegPhase;

    /// True if the legs are stepping, false if they should hold the standby
    /// layout.
    fn is_stepping(&self) -> bool;

    /// Change the phase offsets of the legs.
    fn set_pattern(&mut self, pattern: &GaitPattern);

    /// Return the clock to time zero.
    fn reset(&mut self);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Phase of a single leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LegPhase {
    /// Progress through the current mode, in `[0, 1]`.
    pub phase: f64,

    pub mode: LegMode,
}

/// Events which occured during a clock advance.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ClockStatus {
    /// The stride was too short for the tick and the clock was forced back
    /// to zero.
    pub resync: bool,

    /// A reference leg touchdown was recorded.
    pub touchdown: bool,
}

/// Clock timed from reference leg touchdowns.
#[derive(Debug, Clone)]
pub struct TouchdownClock {
    /// Leg whose touchdown defines time zero. Its lag is always zero.
    ref_leg: LegId,

    /// Leg whose contact flag arms the touchdown.
    arm_leg: LegId,

    /// Phase lag of each leg as a fraction of the stride.
    lags: [f64; NUM_LEGS],

    /// Units: seconds
    t_swing: f64,
    t_stance: f64,
    t_stride: f64,

    max_stance_swing_ratio: f64,
    touchdown_swing_progress: f64,
    swing_complete_progress: f64,

    /// Units: seconds
    time: f64,
    touchdown_time: f64,
    last_touchdown_time: f64,

    touchdown_pending: bool,

    /// Swing progress of the reference leg.
    ref_swing_progress: f64,
}

/// Clock with one wrapping phase shared by all legs.
#[derive(Debug, Clone)]
pub struct CyclicClock {
    phase: f64,
    velocity: f64,
    pattern: GaitPattern,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LegMode {
    /// Foot planted, the body moves over it.
    Stance,

    /// Foot in the air, moving to the next stance position.
    Swing,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LegPhase {
    pub fn stance(phase: f64) -> Self {
        Self {
            phase,
            mode: LegMode::Stance,
        }
    }

    pub fn swing(phase: f64) -> Self {
        Self {
            phase,
            mode: LegMode::Swing,
        }
    }
}

impl TouchdownClock {
    /// Create a new clock, resolving the reference and arming legs from the
    /// parameters.
    pub fn new(params: &Params, pattern: &GaitPattern) -> Result<Self, GaitCtrlError> {
        let ref_leg = LegId::from_index(params.ref_leg_index)
            .ok_or(GaitCtrlError::InvalidLegIndex(params.ref_leg_index))?;
        let arm_leg = LegId::from_index(params.touchdown_arm_leg_index)
            .ok_or(GaitCtrlError::InvalidLegIndex(params.touchdown_arm_leg_index))?;

        if !(params.swing_period_s > 0.0) {
            return Err(GaitCtrlError::InvalidParam(
                "swing_period_s",
                params.swing_period_s,
            ));
        }
        if !(params.max_stance_swing_ratio > 0.0) {
            return Err(GaitCtrlError::InvalidParam(
                "max_stance_swing_ratio",
                params.max_stance_swing_ratio,
            ));
        }

        Ok(Self::build(ref_leg, arm_leg, params, pattern))
    }

    fn build(ref_leg: LegId, arm_leg: LegId, params: &Params, pattern: &GaitPattern) -> Self {
        let mut clock = Self {
            ref_leg,
            arm_leg,
            lags: [0.0; NUM_LEGS],
            t_swing: params.swing_period_s,
            t_stance: 0.0,
            t_stride: params.swing_period_s,
            max_stance_swing_ratio: params.max_stance_swing_ratio,
            touchdown_swing_progress: params.touchdown_swing_progress,
            swing_complete_progress: params.swing_complete_progress,
            time: 0.0,
            touchdown_time: 0.0,
            last_touchdown_time: 0.0,
            touchdown_pending: false,
            ref_swing_progress: 0.0,
        };
        clock.set_pattern(pattern);

        clock
    }

    /// Duration of the stance phase.
    ///
    /// Units: seconds
    pub fn t_stance(&self) -> f64 {
        self.t_stance
    }

    /// Duration of one full stride.
    ///
    /// Units: seconds
    pub fn t_stride(&self) -> f64 {
        self.t_stride
    }

    pub fn touchdown_pending(&self) -> bool {
        self.touchdown_pending
    }

    /// Clear the clock when the commanded step cannot be executed.
    fn halt(&mut self) {
        self.t_stance = 0.0;
        self.touchdown_pending = false;
        self.time = 0.0;
        self.last_touchdown_time = 0.0;
    }

    fn update_clock(&mut self, dt: f64, status: &mut ClockStatus) {
        self.t_stride = self.t_stance + self.t_swing;

        if self.ref_swing_progress >= self.touchdown_swing_progress && self.touchdown_pending {
            self.touchdown_time = self.time;
            self.touchdown_pending = false;
            self.ref_swing_progress = 0.0;
            status.touchdown = true;
        }

        self.last_touchdown_time = clamp(self.time - self.touchdown_time, 0.0, self.t_stride);
        self.time += dt;

        if self.t_stride < self.t_swing + dt {
            if self.time > dt {
                debug!("Stride of {:.4} s too short, resynchronising clock", self.t_stride);
            }
            self.time = 0.0;
            self.last_touchdown_time = 0.0;
            self.touchdown_time = 0.0;
            self.ref_swing_progress = 0.0;
            status.resync = true;
        }
    }
}

impl Default for TouchdownClock {
    /// Clock referenced to the front left leg with the default parameters
    /// and a trot.
    fn default() -> Self {
        Self::build(
            LegId::FrontLeft,
            LegId::FrontLeft,
            &Params::default(),
            &GaitPattern::trot(),
        )
    }
}

impl PhaseClock for TouchdownClock {
    fn advance(&mut self, cmd: &mut GaitCommand, dt: f64) -> ClockStatus {
        let mut status = ClockStatus::default();

        if cmd.step_velocity == 0.0 {
            cmd.step_length = 0.0;
            self.halt();
        } else {
            self.t_stance = 2.0 * cmd.step_length.abs() / cmd.step_velocity.abs();
        }

        // No time to complete a stance in a tick. The command is left alone so
        // that a step growing from rest gets past this.
        if self.t_stance < dt {
            self.halt();
        }

        self.t_stance = self.t_stance.min(self.max_stance_swing_ratio * self.t_swing);

        if cmd.contacts[self.arm_leg.index()] && self.t_stance > dt {
            self.touchdown_pending = true;
        }

        self.update_clock(dt, &mut status);

        // Track the reference leg's swing to detect its touchdown
        let ref_phase = self.leg_phase(self.ref_leg);
        if ref_phase.mode == LegMode::Swing {
            self.ref_swing_progress = ref_phase.phase;
            if ref_phase.phase >= self.swing_complete_progress {
                self.touchdown_pending = true;
            }
        }

        status
    }

    fn leg_phase(&self, leg: LegId) -> LegPhase {
        let mut ti = self.last_touchdown_time - self.lags[leg.index()] * self.t_stride;

        // Avoid a discontinuity when stance is longer than swing
        if ti < -self.t_swing {
            ti += self.t_stride;
        }

        if ti >= 0.0 && ti <= self.t_stance {
            if self.t_stance == 0.0 {
                LegPhase::stance(0.0)
            } else {
                LegPhase::stance(ti / self.t_stance)
            }
        } else {
            let phase = if ti >= -self.t_swing && ti < 0.0 {
                (ti + self.t_swing) / self.t_swing
            } else if ti > self.t_stance && ti <= self.t_stride {
                (ti - self.t_stance) / self.t_swing
            } else {
                0.0
            };

            LegPhase::swing(phase.min(1.0))
        }
    }

    fn is_stepping(&self) -> bool {
        self.t_stance > 0.0
    }

    fn set_pattern(&mut self, pattern: &GaitPattern) {
        self.lags = pattern.offsets;
        self.lags[self.ref_leg.index()] = 0.0;
    }

    fn reset(&mut self) {
        self.t_stance = 0.0;
        self.t_stride = self.t_swing;
        self.time = 0.0;
        self.touchdown_time = 0.0;
        self.last_touchdown_time = 0.0;
        self.touchdown_pending = false;
        self.ref_swing_progress = 0.0;
    }
}

impl CyclicClock {
    pub fn new(pattern: &GaitPattern) -> Self {
        Self {
            phase: 0.0,
            velocity: 0.0,
            pattern: *pattern,
        }
    }

    /// The shared cycle phase, in `[0, 1)`.
    pub fn phase(&self) -> f64 {
        self.phase
    }
}

impl PhaseClock for CyclicClock {
    fn advance(&mut self, cmd: &mut GaitCommand, dt: f64) -> ClockStatus {
        self.velocity = cmd.step_velocity;

        if self.velocity == 0.0 {
            cmd.step_length = 0.0;
        }

        self.phase = rem_euclid(self.phase + dt * self.velocity, 1.0);

        // Round off can leave the phase at exactly 1
        if self.phase >= 1.0 {
            self.phase = 0.0;
        }

        ClockStatus::default()
    }

    fn leg_phase(&self, leg: LegId) -> LegPhase {
        let stand_frac = self.pattern.stand_frac;
        let p = rem_euclid(self.phase + self.pattern.offsets[leg.index()], 1.0);

        if p < stand_frac {
            LegPhase::stance(p / stand_frac)
        } else {
            LegPhase::swing(((p - stand_frac) / (1.0 - stand_frac)).min(1.0))
        }
    }

    fn is_stepping(&self) -> bool {
        self.velocity != 0.0
    }

    fn set_pattern(&mut self, pattern: &GaitPattern) {
        self.pattern = *pattern;
    }

    fn reset(&mut self) {
        self.phase = 0.0;
        self.velocity = 0.0;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const DT: f64 = 0.01;

    fn walking_cmd(step_length: f64, step_velocity: f64) -> GaitCommand {
        let mut cmd = GaitCommand::new(GaitPattern::trot());
        cmd.step_length = step_length;
        cmd.target_step_length = step_length;
        cmd.step_velocity = step_velocity;
        cmd
    }

    fn modes(clock: &dyn PhaseClock) -> [LegMode; NUM_LEGS] {
        let mut modes = [LegMode::Stance; NUM_LEGS];
        for leg in LegId::ALL.iter() {
            modes[leg.index()] = clock.leg_phase(*leg).mode;
        }
        modes
    }

    #[test]
    fn test_ref_leg_lag_is_zero() {
        let params = Params {
            ref_leg_index: 1,
            ..Default::default()
        };
        let clock = TouchdownClock::new(&params, &GaitPattern::trot()).unwrap();
        assert_eq!(clock.lags, [0.0, 0.0, 0.5, 0.0]);
    }

    #[test]
    fn test_invalid_params() {
        let params = Params {
            ref_leg_index: 4,
            ..Default::default()
        };
        assert!(matches!(
            TouchdownClock::new(&params, &GaitPattern::trot()),
            Err(GaitCtrlError::InvalidLegIndex(4))
        ));

        let params = Params {
            swing_period_s: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            TouchdownClock::new(&params, &GaitPattern::trot()),
            Err(GaitCtrlError::InvalidParam("swing_period_s", _))
        ));
    }

    #[test]
    fn test_zero_velocity_halts() {
        let mut clock = TouchdownClock::new(&Params::default(), &GaitPattern::trot()).unwrap();
        let mut cmd = walking_cmd(0.1, 1.0);
        cmd.contacts = [true; NUM_LEGS];

        for _ in 0..10 {
            clock.advance(&mut cmd, DT);
        }
        assert!(clock.is_stepping());
        assert!(clock.touchdown_pending());

        cmd.step_velocity = 0.0;
        cmd.contacts = [false; NUM_LEGS];
        for _ in 0..10 {
            let status = clock.advance(&mut cmd, DT);
            assert!(status.resync);
            assert_eq!(clock.t_stance(), 0.0);
            assert_eq!(cmd.step_length, 0.0);
            assert!(!clock.touchdown_pending());
            assert!(!clock.is_stepping());
            assert_eq!(clock.time, 0.0);
            assert_eq!(clock.last_touchdown_time, 0.0);
        }
    }

    #[test]
    fn test_infeasible_stance_keeps_command() {
        let mut clock = TouchdownClock::new(&Params::default(), &GaitPattern::trot()).unwrap();

        // Stance of 2 * 0.001 / 1 = 2 ms is shorter than a tick
        let mut cmd = walking_cmd(0.001, 1.0);
        cmd.yaw_rate = 0.5;

        let status = clock.advance(&mut cmd, DT);
        assert!(status.resync);
        assert_eq!(clock.t_stance(), 0.0);
        assert_eq!(cmd.step_length, 0.001);
        assert_eq!(cmd.yaw_rate, 0.5);
        assert!(!clock.is_stepping());
    }

    #[test]
    fn test_starts_from_rest() {
        // Smoothed from zero, the step length only reaches half a tick of
        // stance after a few ticks at full velocity
        let dt = 1.0 / 240.0;
        let mut clock = TouchdownClock::new(&Params::default(), &GaitPattern::trot()).unwrap();
        let mut cmd = GaitCommand::new(GaitPattern::trot());
        cmd.target_step_length = 0.1;
        cmd.step_velocity = 1.0;

        let mut first_step = None;
        for tick in 0..240 {
            cmd.smooth(dt, 1e-3);
            clock.advance(&mut cmd, dt);

            if clock.is_stepping() && first_step.is_none() {
                first_step = Some(tick);
            }
            if first_step.is_some() {
                assert!(clock.is_stepping(), "stopped at tick {}", tick);
            }
        }

        assert!(first_step.unwrap() < 10, "{:?}", first_step);
        assert!(cmd.step_length > 0.05);
    }

    #[test]
    fn test_stand_frac_unused() {
        let slow = GaitPattern::new([0.0, 0.5, 0.5, 0.0], 0.3).unwrap();
        let mut a = TouchdownClock::new(&Params::default(), &slow).unwrap();
        let mut b = TouchdownClock::new(&Params::default(), &GaitPattern::trot()).unwrap();
        let mut cmd = walking_cmd(0.1, 1.0);

        for _ in 0..50 {
            a.advance(&mut cmd, DT);
            b.advance(&mut cmd, DT);
            assert_eq!(a.t_stance(), b.t_stance());
            assert_eq!(modes(&a), modes(&b));
        }
    }

    #[test]
    fn test_stance_clamped_to_swing_ratio() {
        let mut clock = TouchdownClock::new(&Params::default(), &GaitPattern::trot()).unwrap();
        let mut cmd = walking_cmd(0.2, 0.5);

        clock.advance(&mut cmd, DT);
        assert!((clock.t_stance() - 1.3 * 0.2).abs() < 1e-12);
        assert!((clock.t_stride() - 2.3 * 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_trot_alternates_pairs() {
        // Stance and swing both last 0.2 s, a 0.4 s stride
        let mut clock = TouchdownClock::new(&Params::default(), &GaitPattern::trot()).unwrap();
        let mut cmd = walking_cmd(0.1, 1.0);

        use LegMode::*;

        for tick in 0..41 {
            clock.advance(&mut cmd, DT);

            // Away from the mode boundaries
            if (1..=18).contains(&tick) {
                assert_eq!(modes(&clock), [Stance, Swing, Swing, Stance], "tick {}", tick);
                let p = clock.leg_phase(LegId::FrontLeft).phase;
                assert!((p - tick as f64 * 0.05).abs() < 1e-9);
                let p = clock.leg_phase(LegId::FrontRight).phase;
                assert!((p - tick as f64 * 0.05).abs() < 1e-9);
            }
            if (22..=38).contains(&tick) {
                assert_eq!(modes(&clock), [Swing, Stance, Stance, Swing], "tick {}", tick);
            }
        }
    }

    #[test]
    fn test_touchdown_resets_time_index() {
        let mut clock = TouchdownClock::new(&Params::default(), &GaitPattern::trot()).unwrap();
        let mut cmd = walking_cmd(0.1, 1.0);

        let mut touchdowns = 0;
        for _ in 0..200 {
            let status = clock.advance(&mut cmd, DT);
            if status.touchdown {
                touchdowns += 1;
                assert_eq!(clock.last_touchdown_time, 0.0);
            }
            assert!(clock.last_touchdown_time <= clock.t_stride());
        }

        assert!(touchdowns >= 4, "only {} touchdowns", touchdowns);
    }

    #[test]
    fn test_contact_arms_touchdown() {
        let params = Params {
            touchdown_arm_leg_index: 2,
            ..Default::default()
        };
        let mut clock = TouchdownClock::new(&params, &GaitPattern::trot()).unwrap();
        let mut cmd = walking_cmd(0.1, 1.0);

        cmd.contacts = [true, false, false, false];
        clock.advance(&mut cmd, DT);
        assert!(!clock.touchdown_pending());

        cmd.contacts = [false, false, true, false];
        clock.advance(&mut cmd, DT);
        assert!(clock.touchdown_pending());
    }

    #[test]
    fn test_cyclic_trot_pairs() {
        let mut clock = CyclicClock::new(&GaitPattern::trot());
        let mut cmd = walking_cmd(0.1, 1.0);

        let mut swing_starts = [None; NUM_LEGS];
        let mut prev = modes(&clock);

        for tick in 1..=200 {
            clock.advance(&mut cmd, 0.005);
            let m = modes(&clock);

            assert_eq!(m[0], m[3]);
            assert_eq!(m[1], m[2]);
            assert!(!(m[0] == LegMode::Swing && m[1] == LegMode::Swing));

            for i in 0..NUM_LEGS {
                if m[i] == LegMode::Swing && prev[i] == LegMode::Stance && swing_starts[i].is_none() {
                    swing_starts[i] = Some(tick);
                }
            }
            prev = m;
        }

        // Legs 1 and 2 lift at phase 0.25, legs 0 and 3 half a cycle later
        let (a, b) = (swing_starts[1].unwrap(), swing_starts[0].unwrap());
        assert!((a as i64 - 50).abs() <= 1, "{}", a);
        assert!((b as i64 - 150).abs() <= 1, "{}", b);
        assert_eq!(swing_starts[0], swing_starts[3]);
        assert_eq!(swing_starts[1], swing_starts[2]);
    }

    #[test]
    fn test_cyclic_phase_normalisation() {
        let pattern = GaitPattern::new([0.0, 0.25, 0.5, 0.75], 0.75).unwrap();
        let mut clock = CyclicClock::new(&pattern);
        let mut cmd = walking_cmd(0.1, 1.0);
        cmd.pattern = pattern;

        clock.advance(&mut cmd, 0.6);

        // 0.6 in stance of 0.75
        let p = clock.leg_phase(LegId::FrontLeft);
        assert_eq!(p.mode, LegMode::Stance);
        assert!((p.phase - 0.8).abs() < 1e-12);

        // 0.6 + 0.25 = 0.85, 0.1 into a swing of 0.25
        let p = clock.leg_phase(LegId::FrontRight);
        assert_eq!(p.mode, LegMode::Swing);
        assert!((p.phase - 0.4).abs() < 1e-9);

        // Wraps
        clock.advance(&mut cmd, 0.6);
        assert!((clock.phase() - 0.2).abs() < 1e-12);

        cmd.step_velocity = 0.0;
        clock.advance(&mut cmd, 0.6);
        assert!(!clock.is_stepping());
        assert_eq!(cmd.step_length, 0.0);
    }
}
