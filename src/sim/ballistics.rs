//! Analytic projectile model for the arrow.
//!
//! Pure functions of the two normalized aim inputs. No RNG, no state - the
//! same inputs always produce the same trajectory, which is what makes the
//! hit test and the flight audio agree with each other.

use glam::Vec2;

use crate::tuning::BallisticsTuning;

/// Derived flight descriptors for one shot.
#[derive(Debug, Clone, Copy)]
pub struct Trajectory {
    /// Horizontal launch velocity, field units per second.
    pub vx: f32,
    /// Vertical launch velocity, field units per second.
    pub vy: f32,
    /// Analytic time until the arrow meets the landing plane, seconds.
    pub flight_secs: f32,
    /// Landing distance as a fraction of the field, clamped to [0, 1].
    pub range_norm: f32,
    /// Mid-flight height estimate, biased upward and clamped to [0, 1].
    pub height_norm: f32,
}

/// Compute the trajectory for a shot.
///
/// Inputs outside [0, 1] are clamped; outputs are always finite.
pub fn simulate(angle_norm: f32, power_norm: f32, tuning: &BallisticsTuning) -> Trajectory {
    let angle_norm = angle_norm.clamp(0.0, 1.0);
    let power_norm = power_norm.clamp(0.0, 1.0);
    let g = tuning.gravity;

    let angle_deg =
        tuning.min_angle_deg + angle_norm * (tuning.max_angle_deg - tuning.min_angle_deg);
    let rad = angle_deg.to_radians();

    let power = tuning.min_power + power_norm * (tuning.max_power - tuning.min_power);

    let vx = rad.cos() * power;
    let vy = rad.sin() * power;

    // Positive root of the vertical displacement equation for landing a
    // little below the launch plane. The clamp keeps the radicand
    // non-negative for boundary inputs.
    let radicand = (vy * vy + 2.0 * g * tuning.ground_offset).max(0.0);
    let flight_secs = (vy + radicand.sqrt()) / g;

    let range_norm = (vx * flight_secs / tuning.field_length).min(1.0);

    let half = flight_secs * 0.5;
    let mid_height = vy * half - 0.5 * g * half * half;
    let height_norm = (mid_height + tuning.apex_bias).clamp(0.0, 1.0);

    Trajectory {
        vx,
        vy,
        flight_secs,
        range_norm,
        height_norm,
    }
}

impl Trajectory {
    /// Arrow position at `t` seconds after release, in field units.
    #[inline]
    pub fn position_at(&self, t: f32, gravity: f32) -> Vec2 {
        Vec2::new(self.vx * t, self.vy * t - 0.5 * gravity * t * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tuning() -> BallisticsTuning {
        BallisticsTuning::default()
    }

    #[test]
    fn test_center_shot_reference() {
        // Regression-fix the default constants: a dead-center shot must
        // keep producing this exact trajectory.
        let t = simulate(0.5, 0.5, &tuning());
        assert!((t.flight_secs - 1.087678).abs() < 1e-3);
        assert!((t.range_norm - 0.416605).abs() < 1e-3);
        assert!((t.height_norm - 0.409851).abs() < 1e-3);
    }

    #[test]
    fn test_boundary_shots_are_finite() {
        for (a, p) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
            let t = simulate(a, p, &tuning());
            assert!(t.flight_secs.is_finite() && t.flight_secs > 0.0);
            assert!((0.0..=1.0).contains(&t.range_norm));
            assert!((0.0..=1.0).contains(&t.height_norm));
        }
    }

    #[test]
    fn test_more_power_flies_farther() {
        let weak = simulate(0.5, 0.1, &tuning());
        let strong = simulate(0.5, 0.9, &tuning());
        assert!(strong.range_norm > weak.range_norm);
        assert!(strong.flight_secs > weak.flight_secs);
    }

    #[test]
    fn test_steeper_angle_flies_higher() {
        let flat = simulate(0.1, 0.8, &tuning());
        let steep = simulate(0.9, 0.8, &tuning());
        assert!(steep.height_norm > flat.height_norm);
    }

    #[test]
    fn test_position_at_launch_and_landing() {
        let t = simulate(0.5, 0.5, &tuning());
        let start = t.position_at(0.0, tuning().gravity);
        assert_eq!(start, Vec2::ZERO);

        // At the analytic flight time the arrow is at the landing plane
        let end = t.position_at(t.flight_secs, tuning().gravity);
        assert!((end.y - (-tuning().ground_offset)).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_simulate_outputs_in_range(a in 0.0f32..=1.0, p in 0.0f32..=1.0) {
            let t = simulate(a, p, &tuning());
            prop_assert!(t.vx.is_finite());
            prop_assert!(t.vy.is_finite());
            prop_assert!(t.flight_secs.is_finite());
            prop_assert!(t.flight_secs > 0.0);
            prop_assert!((0.0..=1.0).contains(&t.range_norm));
            prop_assert!((0.0..=1.0).contains(&t.height_norm));
        }
    }
}
