//! Round state and the events the core pushes outward.
//!
//! `GameState` is the single owned context for a run: every mutation goes
//! through `tick`, and everything the outside world needs to hear or show
//! comes back out as `GameEvent`s. Nothing in here touches the DOM or the
//! audio backend.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::MAX_ARROWS;
use crate::tuning::Tuning;

use super::sweep::SweepOsc;

/// Current phase of gameplay. Exactly one is active; `tick` transitions
/// are the only way to change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Waiting for the player to start a game
    Idle,
    /// Target rise cue sequence is playing
    TargetRising,
    /// Angle sweep is live
    SettingAngle,
    /// Power sweep is live
    SettingPower,
    /// Arrow is in the air, resolution pending
    Flight,
    /// Hit confirmed, next round pending
    RoundEnd,
    /// Out of arrows
    GameOver,
}

/// The two aim values for one shot. Unset until a sweep writes them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Shot {
    pub angle_norm: Option<f32>,
    pub power_norm: Option<f32>,
}

/// Where the target hangs this round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    /// Horizontal position, always in [0.5, 1].
    pub distance_norm: f32,
    /// Vertical position in [0, 1], 0 = ground.
    pub height_norm: f32,
}

/// Everything the core reports outward: status text, screen-reader
/// announcements, and audio triggers. Drained by the embedding layer once
/// per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Status line for the visible HUD
    StateLabel(String),
    /// One-shot live-region announcement
    Announce(String),
    /// Play the chain-rise sequence for this target
    TargetRise(Target),
    /// Rise finished - place the locator bell at the target
    TargetLocated(Target),
    /// Repeating locator ping while aiming
    TargetPing(Target),
    /// Angle sweep entered scale step `0..ANGLE_STEPS`
    AngleStep(u32),
    /// Sweep crossed the previous shot's locked value
    LastShotPing { pan: f32 },
    /// Lock/confirm blip
    Confirm,
    /// Power sweep became live - start its pad tone
    PowerToneStarted,
    /// Power sweep ended - release its pad tone immediately
    PowerToneStopped,
    /// Shot released; render the bow twang and flight envelope
    ArrowFired { angle_norm: f32, power_norm: f32 },
    /// Shot landed on the target
    TargetHit(Target),
    /// Shot landed short/low of the target, panned at the landing point
    MissedLow { pan: f32 },
    /// Shot sailed high or long
    MissedHigh,
    /// Run ended with a non-zero score - hand off to the leaderboard
    SubmitScore(u32),
}

/// Complete game state for one run.
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Strictly increases on hits, resets to 1 on restart.
    pub round: u32,
    pub score: u32,
    /// Never increases except via the round-start reset.
    pub arrows_left: u32,
    /// Shot being aimed this turn.
    pub current_shot: Shot,
    /// Previous turn's locked values, echoed by the sweeps.
    pub last_shot: Shot,
    pub target: Target,
    /// Live while `SettingAngle` (and past any re-aim delay).
    pub angle_sweep: Option<SweepOsc>,
    /// Live while `SettingPower`; drives the pad tone.
    pub power_sweep: Option<SweepOsc>,
    /// Sweep duration multiplier from accessibility settings.
    pub sweep_scale: f32,

    pub(super) rng: Pcg32,
    /// Countdown owned by the current phase. Reset on every transition, so
    /// a timer can never outlive the phase that armed it.
    pub(super) phase_timer: f32,
    /// Post-miss delay before the angle sweep restarts.
    pub(super) aim_delay: f32,
    pub(super) ping_timer: f32,
    pub(super) round_announced: bool,
    /// Arrows remaining at the moment of release, for the hit bonus.
    pub(super) arrows_at_fire: u32,

    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a fresh run with default tuning.
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self {
            tuning,
            phase: GamePhase::Idle,
            round: 1,
            score: 0,
            arrows_left: MAX_ARROWS,
            current_shot: Shot::default(),
            last_shot: Shot::default(),
            target: Target {
                distance_norm: 0.8,
                height_norm: 0.4,
            },
            angle_sweep: None,
            power_sweep: None,
            sweep_scale: 1.0,
            rng: Pcg32::seed_from_u64(seed),
            phase_timer: 0.0,
            aim_delay: 0.0,
            ping_timer: 0.0,
            round_announced: false,
            arrows_at_fire: 0,
            events: Vec::new(),
        }
    }

    pub(super) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand the accumulated events to the embedding layer. Call once per
    /// frame after `tick`.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
