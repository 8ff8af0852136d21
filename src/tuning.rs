//! Data-driven game balance and audio voice tables.
//!
//! Keep gameplay feel separate from engine code: everything a designer would
//! want to retune lives here, in plain structs with `Default` baselines.

/// Launch physics for the arrow.
#[derive(Debug, Clone, Copy)]
pub struct BallisticsTuning {
    /// Downward acceleration in field units per second squared.
    pub gravity: f32,
    /// Horizontal extent of the playfield in field units.
    pub field_length: f32,
    /// Launch angle at `angle_norm = 0`, degrees.
    pub min_angle_deg: f32,
    /// Launch angle at `angle_norm = 1`, degrees.
    pub max_angle_deg: f32,
    /// Launch speed at `power_norm = 0`.
    pub min_power: f32,
    /// Launch speed at `power_norm = 1`.
    pub max_power: f32,
    /// Landing plane sits this far below the launch point, so even flat
    /// shots get a non-degenerate flight time.
    pub ground_offset: f32,
    /// Upward bias added to the mid-flight height sample so typical shots
    /// read as mid-range rather than hugging the ground.
    pub apex_bias: f32,
}

impl Default for BallisticsTuning {
    fn default() -> Self {
        Self {
            gravity: 1.25,
            field_length: 1.4,
            min_angle_deg: 18.0,
            max_angle_deg: 62.0,
            min_power: 0.25,
            max_power: 1.15,
            ground_offset: 0.25,
            apex_bias: 0.35,
        }
    }
}

/// Target placement bands and hit-box tolerances.
///
/// Placement bands widen linearly from round 1 to 6; hit boxes tighten
/// linearly from round 5 to 10. Outside those windows the values hold.
#[derive(Debug, Clone, Copy)]
pub struct DifficultyTuning {
    pub horiz_min_start: f32,
    pub horiz_min_end: f32,
    pub horiz_max_start: f32,
    pub horiz_max_end: f32,

    pub vert_min_start: f32,
    pub vert_min_end: f32,
    pub vert_max_start: f32,
    pub vert_max_end: f32,

    pub hit_dist_start: f32,
    pub hit_dist_end: f32,
    pub hit_height_start: f32,
    pub hit_height_end: f32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            // Horizontal: round 1 -> 6 expands from near-center to far right
            horiz_min_start: 0.7,
            horiz_min_end: 0.5,
            horiz_max_start: 0.73,
            horiz_max_end: 1.0,

            // Vertical: round 1 -> 6 expands low -> high but always hittable
            vert_min_start: 0.15,
            vert_min_end: 0.10,
            vert_max_start: 0.55,
            vert_max_end: 0.90,

            // Hit box tightening from round 5 -> 10
            hit_dist_start: 0.18,
            hit_dist_end: 0.10,
            hit_height_start: 0.22,
            hit_height_end: 0.12,
        }
    }
}

/// Timing for one aim sweep (the oscillating value the player locks).
#[derive(Debug, Clone, Copy)]
pub struct SweepTuning {
    /// Seconds for one end-to-end traversal of [0, 1].
    pub sweep_secs: f32,
    /// Plateau at the end of each traversal where the value holds.
    pub pause_secs: f32,
}

impl SweepTuning {
    /// Full cycle length (traversal plus plateau).
    #[inline]
    pub fn cycle_secs(&self) -> f32 {
        self.sweep_secs + self.pause_secs
    }
}

/// Angle sweep baseline: slower, so the 7 scale steps are distinguishable.
pub fn angle_sweep() -> SweepTuning {
    SweepTuning {
        sweep_secs: 1.6,
        pause_secs: 0.12,
    }
}

/// Power sweep baseline: slightly quicker than the angle sweep.
pub fn power_sweep() -> SweepTuning {
    SweepTuning {
        sweep_secs: 1.4,
        pause_secs: 0.12,
    }
}

/// Target rise cue sequence played at the start of every round.
#[derive(Debug, Clone, Copy)]
pub struct TargetRiseTuning {
    /// Number of chain-clank steps in the rise.
    pub steps: u32,
    /// Spacing between steps, seconds.
    pub step_interval_secs: f32,
    /// Frequency of the first step, Hz.
    pub base_frequency: f32,
    /// Frequency added per step, Hz.
    pub step_frequency_delta: f32,
    /// Settle time after the last step before aiming begins.
    pub settle_secs: f32,
}

impl TargetRiseTuning {
    /// Total audible duration of the rise sequence.
    pub fn total_secs(&self) -> f32 {
        self.steps as f32 * self.step_interval_secs + self.settle_secs
    }
}

impl Default for TargetRiseTuning {
    fn default() -> Self {
        Self {
            steps: 8,
            step_interval_secs: 0.09,
            base_frequency: 420.0,
            step_frequency_delta: 40.0,
            settle_secs: 0.2,
        }
    }
}

/// Arrow flight noise-bed rendering.
#[derive(Debug, Clone, Copy)]
pub struct FlightTuning {
    /// Fixed audible window the physical flight is warped into, seconds.
    pub audible_secs: f32,
    /// Envelope keyframes spread across the audible window (inclusive of
    /// both endpoints, so `segments + 1` frames are emitted).
    pub segments: u32,
    /// Flights shorter than this are stretched up to it before warping.
    pub min_flight_secs: f32,
    /// Gain floor for the noise bed.
    pub volume_base: f32,
    /// Extra gain as the arrow nears the ground.
    pub volume_arc_boost: f32,
    /// Stereo width multiplier for the flight pan.
    pub pan_strength: f32,
    /// Bandpass center at launch, Hz.
    pub start_freq: f32,
    /// Extra center frequency at the apex, Hz.
    pub apex_freq_boost: f32,
    /// Linear center frequency drop toward landing, Hz.
    pub end_freq_drop: f32,
    /// Bandpass resonance.
    pub filter_q: f32,
}

impl Default for FlightTuning {
    fn default() -> Self {
        Self {
            audible_secs: 1.5,
            segments: 72,
            min_flight_secs: 0.6,
            volume_base: 0.12,
            volume_arc_boost: 0.26,
            pan_strength: 1.0,
            start_freq: 1500.0,
            apex_freq_boost: 320.0,
            end_freq_drop: 750.0,
            filter_q: 3.2,
        }
    }
}

/// One fire-and-forget beep voice.
#[derive(Debug, Clone, Copy)]
pub struct BeepVoice {
    pub frequency: f32,
    pub duration_secs: f32,
    pub gain: f32,
}

/// Every frequency and level the audio backend plays, in one table.
#[derive(Debug, Clone)]
pub struct AudioTuning {
    /// Overall output level before user settings apply.
    pub master_gain: f32,
    /// Discrete scale for the angle sweep, low to high. Length must equal
    /// `consts::ANGLE_STEPS`.
    pub angle_scale: [f32; 7],
    /// Pan position for angle sweep bubbles.
    pub angle_pan: f32,
    /// Ping played when a sweep crosses the previous shot's value.
    pub last_shot_ping: BeepVoice,
    /// Continuous pad driven by the power sweep.
    pub power_min_pitch: f32,
    pub power_max_pitch: f32,
    pub power_base_gain: f32,
    pub power_extra_gain: f32,
    pub power_pan_left: f32,
    /// Bell placed at the target's pan once the rise completes.
    pub locate_bell: BeepVoice,
    /// Repeating locator ping while aiming.
    pub idle_ping: BeepVoice,
    /// Lock/confirm blip for button presses.
    pub confirm: BeepVoice,
    /// Bow release twang, start and end frequency.
    pub bow_start_freq: f32,
    pub bow_end_freq: f32,
    pub bow_gain: f32,
}

impl Default for AudioTuning {
    fn default() -> Self {
        Self {
            master_gain: 0.8,
            angle_scale: [260.0, 310.0, 370.0, 440.0, 520.0, 620.0, 740.0],
            angle_pan: -0.8,
            last_shot_ping: BeepVoice {
                frequency: 1300.0,
                duration_secs: 0.07,
                gain: 0.5,
            },
            power_min_pitch: 240.0,
            power_max_pitch: 420.0,
            power_base_gain: 0.06,
            power_extra_gain: 0.08,
            power_pan_left: -1.0,
            locate_bell: BeepVoice {
                frequency: 1350.0,
                duration_secs: 0.18,
                gain: 0.5,
            },
            idle_ping: BeepVoice {
                frequency: 900.0,
                duration_secs: 0.08,
                gain: 0.18,
            },
            confirm: BeepVoice {
                frequency: 650.0,
                duration_secs: 0.12,
                gain: 0.4,
            },
            bow_start_freq: 1000.0,
            bow_end_freq: 400.0,
            bow_gain: 0.7,
        }
    }
}

/// Aggregate of everything the simulation core reads.
#[derive(Debug, Clone, Copy)]
pub struct Tuning {
    pub ballistics: BallisticsTuning,
    pub difficulty: DifficultyTuning,
    pub angle_sweep: SweepTuning,
    pub power_sweep: SweepTuning,
    pub rise: TargetRiseTuning,
    pub flight: FlightTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ballistics: BallisticsTuning::default(),
            difficulty: DifficultyTuning::default(),
            angle_sweep: angle_sweep(),
            power_sweep: power_sweep(),
            rise: TargetRiseTuning::default(),
            flight: FlightTuning::default(),
        }
    }
}
