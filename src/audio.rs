//! Audio system using Web Audio API
//!
//! Every sound in the game is synthesized on the fly - no external files.
//! All scheduling is done against the audio clock (`current_time`), never
//! UI timers, so multi-part cues and the flight envelope cannot drift.
//!
//! The context is created lazily on the first user gesture (autoplay
//! policy); until then every play call is a silent no-op and the game
//! itself keeps running.

use rand::Rng;
use web_sys::{
    AudioContext, AudioContextState, BiquadFilterType, GainNode, OscillatorNode, OscillatorType,
    StereoPannerNode,
};

use crate::sim::{FlightPlan, Target};
use crate::target_pan;
use crate::tuning::{AudioTuning, TargetRiseTuning};

/// The continuously modulated pad that voices the power sweep.
struct PowerTone {
    osc: OscillatorNode,
    gain: GainNode,
    pan: StereoPannerNode,
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    tuning: AudioTuning,
    rise: TargetRiseTuning,
    master_volume: f32,
    muted: bool,
    power_tone: Option<PowerTone>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            ctx: None,
            tuning: AudioTuning::default(),
            rise: TargetRiseTuning::default(),
            master_volume: 1.0,
            muted: false,
            power_tone: None,
        }
    }

    /// Create/resume the audio context. Must be called from a user gesture
    /// the first time, per browser autoplay policy.
    pub fn unlock(&mut self) {
        if self.ctx.is_none() {
            match AudioContext::new() {
                Ok(ctx) => {
                    log::info!("AudioContext created");
                    self.ctx = Some(ctx);
                }
                Err(_) => {
                    log::warn!("Failed to create AudioContext - audio disabled");
                    return;
                }
            }
        }
        if let Some(ctx) = &self.ctx {
            if ctx.state() == AudioContextState::Suspended {
                let _ = ctx.resume();
            }
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.ctx.is_some()
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.tuning.master_gain
        }
    }

    /// Context plus effective volume, or `None` when nothing should play.
    fn ready(&self) -> Option<(&AudioContext, f32)> {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return None;
        }
        let ctx = self.ctx.as_ref()?;
        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        Some((ctx, vol))
    }

    /// Create an oscillator routed through a panner and gain stage
    fn osc_chain(
        &self,
        ctx: &AudioContext,
        freq: f32,
        pan: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let panner = ctx.create_stereo_panner().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        panner.pan().set_value(pan);

        osc.connect_with_audio_node(&panner).ok()?;
        panner.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Schedule a decaying beep at an absolute audio-clock time
    #[allow(clippy::too_many_arguments)]
    fn beep_at(
        &self,
        ctx: &AudioContext,
        vol: f32,
        freq: f32,
        dur_secs: f64,
        gain_level: f32,
        pan: f32,
        osc_type: OscillatorType,
        at: f64,
    ) {
        let Some((osc, gain)) = self.osc_chain(ctx, freq, pan, osc_type) else {
            return;
        };
        gain.gain().set_value_at_time(gain_level * vol, at).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.0001, at + dur_secs)
            .ok();
        osc.start_with_when(at).ok();
        osc.stop_with_when(at + dur_secs + 0.05).ok();
    }

    /// Lock/confirm blip
    pub fn confirm(&self) {
        let Some((ctx, vol)) = self.ready() else { return };
        let voice = self.tuning.confirm;
        self.beep_at(
            ctx,
            vol,
            voice.frequency,
            voice.duration_secs as f64,
            voice.gain,
            0.0,
            OscillatorType::Sine,
            ctx.current_time(),
        );
    }

    /// "Same as last shot" marker ping
    pub fn last_shot_ping(&self, pan: f32) {
        let Some((ctx, vol)) = self.ready() else { return };
        let voice = self.tuning.last_shot_ping;
        self.beep_at(
            ctx,
            vol,
            voice.frequency,
            voice.duration_secs as f64,
            voice.gain,
            pan,
            OscillatorType::Sine,
            ctx.current_time(),
        );
    }

    /// One bubble of the angle scale
    pub fn angle_step(&self, step: u32) {
        let Some((ctx, vol)) = self.ready() else { return };
        let freq = self.tuning.angle_scale[step as usize % self.tuning.angle_scale.len()];
        let Some((osc, gain)) = self.osc_chain(ctx, freq, self.tuning.angle_pan, OscillatorType::Sine)
        else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.0, t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(0.12 * vol, t + 0.03)
            .ok();
        gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.15).ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.18).ok();
    }

    /// Chain-clank rise sequence, panned at the target's position and
    /// fading with its climbing height
    pub fn target_rise(&self, target: &Target) {
        let Some((ctx, vol)) = self.ready() else { return };
        let rise = self.rise;
        let pan = target_pan(target.distance_norm);
        let now = ctx.current_time();

        for i in 0..=rise.steps {
            let freq = rise.base_frequency + rise.step_frequency_delta * i as f32;
            let height = target.height_norm * i as f32 / rise.steps as f32;
            let step_gain = 0.45 * (1.0 - height);
            self.beep_at(
                ctx,
                vol,
                freq,
                (rise.step_interval_secs * 0.7) as f64,
                step_gain,
                pan,
                OscillatorType::Square,
                now + i as f64 * rise.step_interval_secs as f64,
            );
        }
    }

    /// Bell marking where the target settled
    pub fn target_located(&self, target: &Target) {
        let Some((ctx, vol)) = self.ready() else { return };
        let voice = self.tuning.locate_bell;
        self.beep_at(
            ctx,
            vol,
            voice.frequency,
            voice.duration_secs as f64,
            voice.gain,
            target_pan(target.distance_norm),
            OscillatorType::Sine,
            ctx.current_time(),
        );
    }

    /// Repeating locator ping; lower targets ping louder
    pub fn target_ping(&self, target: &Target) {
        let Some((ctx, vol)) = self.ready() else { return };
        let voice = self.tuning.idle_ping;
        let proximity = 0.2 + 0.7 * (1.0 - target.height_norm.clamp(0.0, 1.0));
        self.beep_at(
            ctx,
            vol,
            voice.frequency,
            voice.duration_secs as f64,
            voice.gain * proximity,
            target_pan(target.distance_norm),
            OscillatorType::Sine,
            ctx.current_time(),
        );
    }

    /// Bring up the power sweep's pad tone
    pub fn start_power_tone(&mut self) {
        self.stop_power_tone();
        let Some((ctx, _)) = self.ready() else { return };

        let Ok(osc) = ctx.create_oscillator() else {
            return;
        };
        let Ok(pan) = ctx.create_stereo_panner() else {
            return;
        };
        let Ok(gain) = ctx.create_gain() else { return };

        osc.set_type(OscillatorType::Sine);
        osc.frequency().set_value(self.tuning.power_min_pitch);
        gain.gain().set_value(0.001);
        pan.pan().set_value(self.tuning.power_pan_left);

        if osc.connect_with_audio_node(&pan).is_err()
            || pan.connect_with_audio_node(&gain).is_err()
            || gain.connect_with_audio_node(&ctx.destination()).is_err()
        {
            return;
        }
        if osc.start().is_err() {
            return;
        }

        self.power_tone = Some(PowerTone { osc, gain, pan });
    }

    /// Drive the pad from the live sweep value. During the sweep plateau
    /// the pad ducks to near-silence.
    pub fn update_power_tone(&self, value: f32, sweeping: bool) {
        let vol = self.effective_volume();
        let Some(ctx) = self.ctx.as_ref() else { return };
        let Some(tone) = self.power_tone.as_ref() else {
            return;
        };
        let t = ctx.current_time();

        if !sweeping {
            tone.gain.gain().set_value_at_time(0.001 * vol, t).ok();
            return;
        }

        let tuning = &self.tuning;
        let pitch =
            tuning.power_min_pitch + (tuning.power_max_pitch - tuning.power_min_pitch) * value;
        tone.osc.frequency().set_value_at_time(pitch, t).ok();

        let level = (tuning.power_base_gain + tuning.power_extra_gain * value) * vol;
        tone.gain.gain().set_value_at_time(level, t).ok();

        let pan = tuning.power_pan_left + (0.0 - tuning.power_pan_left) * value;
        tone.pan.pan().set_value_at_time(pan, t).ok();
    }

    /// Release the pad immediately (no decay - the lock must feel instant)
    pub fn stop_power_tone(&mut self) {
        if let Some(tone) = self.power_tone.take() {
            let _ = tone.osc.stop();
        }
    }

    /// Bow release twang plus string tick
    pub fn bow_twang(&self) {
        let Some((ctx, vol)) = self.ready() else { return };
        let tuning = &self.tuning;
        let Some((osc, gain)) = self.osc_chain(
            ctx,
            tuning.bow_start_freq,
            -0.8,
            OscillatorType::Sawtooth,
        ) else {
            return;
        };
        let t = ctx.current_time();

        osc.frequency().set_value_at_time(tuning.bow_start_freq, t).ok();
        osc.frequency()
            .linear_ramp_to_value_at_time(tuning.bow_end_freq, t + 0.12)
            .ok();
        gain.gain().set_value_at_time(tuning.bow_gain * vol, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.0001, t + 0.15)
            .ok();
        osc.start().ok();
        osc.stop_with_when(t + 0.16).ok();

        self.beep_at(ctx, vol, 1600.0, 0.04, 0.3, -0.8, OscillatorType::Sine, t);
    }

    /// Whistling noise bed following the arrow, stamped keyframe by
    /// keyframe onto the audio clock
    pub fn play_flight(&self, plan: &FlightPlan) {
        let Some((ctx, vol)) = self.ready() else { return };
        self.bow_twang();

        let now = ctx.current_time();
        let dur = plan.duration_secs as f64;
        let sample_rate = ctx.sample_rate();

        let len = (sample_rate * (plan.duration_secs + 0.1)) as u32;
        let Ok(buffer) = ctx.create_buffer(1, len, sample_rate) else {
            return;
        };
        let mut rng = rand::rng();
        let mut data: Vec<f32> = (0..len)
            .map(|_| (rng.random::<f32>() * 2.0 - 1.0) * 0.4)
            .collect();
        if buffer.copy_to_channel(&mut data, 0).is_err() {
            return;
        }

        let Ok(noise) = ctx.create_buffer_source() else {
            return;
        };
        noise.set_buffer(Some(&buffer));

        let Ok(filter) = ctx.create_biquad_filter() else {
            return;
        };
        filter.set_type(BiquadFilterType::Bandpass);
        filter.q().set_value(plan.filter_q);

        let Ok(pan) = ctx.create_stereo_panner() else {
            return;
        };
        let Ok(gain) = ctx.create_gain() else { return };
        gain.gain().set_value(0.0001);

        if noise.connect_with_audio_node(&filter).is_err()
            || filter.connect_with_audio_node(&pan).is_err()
            || pan.connect_with_audio_node(&gain).is_err()
            || gain.connect_with_audio_node(&ctx.destination()).is_err()
        {
            return;
        }

        for kf in &plan.keyframes {
            let at = now + kf.at_secs as f64;
            filter.frequency().set_value_at_time(kf.filter_hz, at).ok();
            pan.pan().set_value_at_time(kf.pan, at).ok();
            gain.gain().set_value_at_time(kf.gain * vol, at).ok();
        }
        gain.gain()
            .linear_ramp_to_value_at_time(0.0001, now + dur)
            .ok();

        noise.start().ok();
        noise.stop_with_when(now + dur).ok();
    }

    /// Arrow striking the target - thunk sequence at the target's pan,
    /// louder for low-hanging targets
    pub fn target_hit(&self, target: &Target) {
        let Some((ctx, vol)) = self.ready() else { return };
        let pan = target_pan(target.distance_norm);
        let height_gain = 0.6 + 0.4 * (1.0 - target.height_norm.clamp(0.0, 1.0));
        let now = ctx.current_time();

        self.beep_at(
            ctx,
            vol,
            180.0,
            0.14,
            0.9 * height_gain,
            pan,
            OscillatorType::Sine,
            now,
        );
        self.beep_at(
            ctx,
            vol,
            240.0,
            0.2,
            0.5 * height_gain,
            pan,
            OscillatorType::Sine,
            now + 0.04,
        );
        self.beep_at(
            ctx,
            vol,
            120.0,
            0.12,
            0.6 * height_gain,
            pan,
            OscillatorType::Square,
            now + 0.09,
        );
    }

    /// Short shot thudding into the ground at the landing pan
    pub fn miss_low(&self, pan: f32) {
        let Some((ctx, vol)) = self.ready() else { return };
        let now = ctx.current_time();

        // Deep thud
        self.beep_at(ctx, vol, 110.0, 0.09, 0.75, pan, OscillatorType::Sine, now);

        // Gravel burst: brown noise through a low-pass
        let sample_rate = ctx.sample_rate();
        let len = (sample_rate * 0.18) as u32;
        let Ok(buffer) = ctx.create_buffer(1, len, sample_rate) else {
            return;
        };
        let mut rng = rand::rng();
        let mut last = 0.0f32;
        let mut data: Vec<f32> = (0..len)
            .map(|_| {
                let val = (rng.random::<f32>() * 2.0 - 1.0) * 0.28;
                last = (last + 0.028 * val) / 1.028;
                last
            })
            .collect();
        if buffer.copy_to_channel(&mut data, 0).is_err() {
            return;
        }

        let Ok(noise) = ctx.create_buffer_source() else {
            return;
        };
        noise.set_buffer(Some(&buffer));

        let Ok(filter) = ctx.create_biquad_filter() else {
            return;
        };
        filter.set_type(BiquadFilterType::Lowpass);
        filter.frequency().set_value(420.0);

        let Ok(panner) = ctx.create_stereo_panner() else {
            return;
        };
        panner.pan().set_value(pan);
        let Ok(gain) = ctx.create_gain() else { return };
        gain.gain().set_value_at_time(0.001, now).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(0.33 * vol, now + 0.03)
            .ok();
        gain.gain()
            .linear_ramp_to_value_at_time(0.0001, now + 0.18)
            .ok();

        if noise.connect_with_audio_node(&filter).is_err()
            || filter.connect_with_audio_node(&panner).is_err()
            || panner.connect_with_audio_node(&gain).is_err()
            || gain.connect_with_audio_node(&ctx.destination()).is_err()
        {
            return;
        }

        noise.start_with_when(now + 0.02).ok();
        noise.stop_with_when(now + 0.22).ok();
    }

    /// Long shot sailing past - fading sine triplet far right
    pub fn miss_high(&self) {
        let Some((ctx, vol)) = self.ready() else { return };
        let now = ctx.current_time();

        self.beep_at(ctx, vol, 760.0, 0.12, 0.45, 0.95, OscillatorType::Sine, now);
        self.beep_at(
            ctx,
            vol,
            540.0,
            0.15,
            0.25,
            0.95,
            OscillatorType::Sine,
            now + 0.14,
        );
        self.beep_at(
            ctx,
            vol,
            420.0,
            0.18,
            0.15,
            0.92,
            OscillatorType::Sine,
            now + 0.26,
        );
    }
}
