//! Flight audio keyframe planning.
//!
//! The arrow's audible flight is a fixed-length window for pacing, while
//! the physical trajectory can be shorter or longer; the plan resamples the
//! trajectory into that window. Keeping the math here (instead of in the
//! audio backend) makes the envelope testable without an audio context -
//! the backend only stamps the frames onto the audio clock.

use crate::tuning::{BallisticsTuning, FlightTuning};

use super::ballistics::simulate;

/// One scheduled point of the flight envelope.
#[derive(Debug, Clone, Copy)]
pub struct FlightKeyframe {
    /// Offset from flight start on the audio clock, seconds.
    pub at_secs: f32,
    /// Stereo position, -1 (left) to 1 (right).
    pub pan: f32,
    /// Noise-bed gain before master volume.
    pub gain: f32,
    /// Bandpass center frequency, Hz.
    pub filter_hz: f32,
}

/// Full envelope for one arrow flight.
#[derive(Debug, Clone)]
pub struct FlightPlan {
    /// Audible duration; the noise bed stops here.
    pub duration_secs: f32,
    /// Bandpass resonance for the noise bed.
    pub filter_q: f32,
    pub keyframes: Vec<FlightKeyframe>,
}

/// Build the envelope for a shot.
///
/// Pan follows the arrow's horizontal position, gain rises as the arrow
/// nears the ground, and the filter center lifts sinusoidally toward the
/// apex before dropping off linearly into the landing.
pub fn plan_flight(
    angle_norm: f32,
    power_norm: f32,
    ballistics: &BallisticsTuning,
    tuning: &FlightTuning,
) -> FlightPlan {
    let traj = simulate(angle_norm, power_norm, ballistics);
    let total_flight = traj.flight_secs.max(tuning.min_flight_secs);

    let segments = tuning.segments.max(1);
    let mut keyframes = Vec::with_capacity(segments as usize + 1);

    for i in 0..=segments {
        let n = i as f32 / segments as f32;
        let pos = traj.position_at(n * total_flight, ballistics.gravity);

        let x_norm = (pos.x / ballistics.field_length).clamp(0.0, 1.0);
        let height_norm = (pos.y + ballistics.ground_offset).clamp(0.0, 1.0);

        let mid_lift = (n * std::f32::consts::PI).sin();
        keyframes.push(FlightKeyframe {
            at_secs: n * tuning.audible_secs,
            pan: (-1.0 + 2.0 * x_norm) * tuning.pan_strength,
            gain: tuning.volume_base + (1.0 - height_norm) * tuning.volume_arc_boost,
            filter_hz: tuning.start_freq + tuning.apex_freq_boost * mid_lift
                - tuning.end_freq_drop * n,
        });
    }

    FlightPlan {
        duration_secs: tuning.audible_secs,
        filter_q: tuning.filter_q,
        keyframes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(angle: f32, power: f32) -> FlightPlan {
        plan_flight(
            angle,
            power,
            &BallisticsTuning::default(),
            &FlightTuning::default(),
        )
    }

    #[test]
    fn test_frame_count_and_window() {
        let p = plan(0.5, 0.5);
        assert_eq!(p.keyframes.len(), 73);
        assert_eq!(p.duration_secs, 1.5);
        assert_eq!(p.keyframes[0].at_secs, 0.0);
        assert!((p.keyframes.last().unwrap().at_secs - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_pan_tracks_arrow_left_to_right() {
        let p = plan(0.5, 0.5);
        assert!((p.keyframes[0].pan - (-1.0)).abs() < 1e-5);
        for pair in p.keyframes.windows(2) {
            assert!(pair[1].pan >= pair[0].pan - 1e-5);
        }
    }

    #[test]
    fn test_gain_peaks_near_landing() {
        let p = plan(0.5, 0.5);
        let t = FlightTuning::default();
        let apex = p.keyframes[p.keyframes.len() / 2].gain;
        let landing = p.keyframes.last().unwrap().gain;
        // The arrow is highest mid-flight and on the ground at the end
        assert!(landing > apex);
        for kf in &p.keyframes {
            assert!(kf.gain >= t.volume_base - 1e-5);
            assert!(kf.gain <= t.volume_base + t.volume_arc_boost + 1e-5);
        }
    }

    #[test]
    fn test_filter_lifts_then_falls() {
        let p = plan(0.5, 0.5);
        let t = FlightTuning::default();
        let first = p.keyframes.first().unwrap().filter_hz;
        let last = p.keyframes.last().unwrap().filter_hz;
        let peak = p
            .keyframes
            .iter()
            .map(|kf| kf.filter_hz)
            .fold(f32::MIN, f32::max);
        assert!((first - t.start_freq).abs() < 1.0);
        // The sinusoidal lift wins early in the flight, the linear drop by
        // the end
        assert!(peak > first);
        assert!((last - (t.start_freq - t.end_freq_drop)).abs() < 1.0);
        assert!(last < first);
        for kf in &p.keyframes {
            assert!(kf.filter_hz.is_finite() && kf.filter_hz > 0.0);
        }
    }

    #[test]
    fn test_short_flights_stretch_to_minimum() {
        // Weakest flattest shot still produces a full-window envelope
        let p = plan(0.0, 0.0);
        assert_eq!(p.keyframes.len(), 73);
        assert!((p.keyframes.last().unwrap().at_secs - 1.5).abs() < 1e-5);
    }
}
