//! Round-based difficulty scaling.
//!
//! Two independent pure curves: target placement bands widen over rounds
//! 1-6, hit-box tolerances tighten over rounds 5-10. No internal state;
//! everything is a function of the round number (plus the sim RNG for the
//! actual draw).

use rand::Rng;

use crate::tuning::DifficultyTuning;

use super::state::Target;

/// Hit-test tolerances for one round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Maximum |shot range - target distance| that still counts as a hit.
    pub distance: f32,
    /// Maximum |shot height - target height| that still counts as a hit.
    pub height: f32,
}

#[inline]
fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start + (end - start) * t
}

/// Placement band for one axis in a given round.
fn band(round: u32, min_start: f32, min_end: f32, max_start: f32, max_end: f32) -> (f32, f32) {
    let progress = (round as f32 / 6.0).min(1.0);
    (
        lerp(min_start, min_end, progress),
        lerp(max_start, max_end, progress),
    )
}

/// Draw a target position for the round, uniformly within the round's
/// placement bands.
pub fn place_target(round: u32, tuning: &DifficultyTuning, rng: &mut impl Rng) -> Target {
    let (h_min, h_max) = band(
        round,
        tuning.horiz_min_start,
        tuning.horiz_min_end,
        tuning.horiz_max_start,
        tuning.horiz_max_end,
    );
    let (v_min, v_max) = band(
        round,
        tuning.vert_min_start,
        tuning.vert_min_end,
        tuning.vert_max_start,
        tuning.vert_max_end,
    );

    Target {
        distance_norm: rng.random_range(h_min..=h_max),
        height_norm: rng.random_range(v_min..=v_max),
    }
}

/// Hit-box tolerances for the round. Widest before round 5, tightest from
/// round 10 onward.
pub fn hit_thresholds(round: u32, tuning: &DifficultyTuning) -> Tolerances {
    let progress = ((round as f32 - 5.0) / 5.0).clamp(0.0, 1.0);
    Tolerances {
        distance: lerp(tuning.hit_dist_start, tuning.hit_dist_end, progress),
        height: lerp(tuning.hit_height_start, tuning.hit_height_end, progress),
    }
}
