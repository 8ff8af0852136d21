//! Deterministic game core.
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame-delta driven, with all deferred work as state-owned countdowns
//! - Seeded RNG only
//! - No audio, rendering, or platform dependencies - the outside world is
//!   reached exclusively through `GameEvent`s

pub mod ballistics;
pub mod difficulty;
pub mod flight;
pub mod state;
pub mod sweep;
pub mod tick;

pub use ballistics::{Trajectory, simulate};
pub use difficulty::{Tolerances, hit_thresholds, place_target};
pub use flight::{FlightKeyframe, FlightPlan, plan_flight};
pub use state::{GameEvent, GamePhase, GameState, Shot, Target};
pub use sweep::{SweepFrame, SweepOsc};
pub use tick::{TickInput, tick};
