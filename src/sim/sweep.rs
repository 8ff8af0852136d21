//! Aim sweep oscillators.
//!
//! A sweep drives a normalized value back and forth in [0, 1] as a triangle
//! wave of elapsed time, with a short plateau at the end of each traversal.
//! The player "aims" by locking whatever the sweep holds at the moment of
//! the button press, so this is the whole input model of the game.
//!
//! A sweep only exists while its aim phase is active: the round machine
//! creates one on phase entry and drops it on lock or phase exit, which is
//! what stops the cues - there is no separate running flag to forget.

use crate::consts::ECHO_TOLERANCE;
use crate::tuning::SweepTuning;

/// One oscillating aim value plus its cue bookkeeping.
#[derive(Debug, Clone)]
pub struct SweepOsc {
    sweep_secs: f32,
    pause_secs: f32,
    /// Discrete tone buckets; `None` for continuous sweeps.
    steps: Option<u32>,
    /// Previous shot's locked value, for the echo cue.
    last_norm: Option<f32>,

    elapsed: f32,
    /// Most recent in-sweep value. `None` until the first sweeping tick.
    value: Option<f32>,
    last_step: Option<u32>,
    /// Sign of the last echo crossing, 0.0 before the first one.
    echo_dir: f32,
}

/// What one tick of a sweep produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepFrame {
    /// Live value after this tick, if the sweep has ever produced one.
    pub value: Option<f32>,
    /// False while the sweep holds its plateau between traversals.
    pub sweeping: bool,
    /// Set when the value entered a new tone bucket this tick.
    pub new_step: Option<u32>,
    /// Set when the value crossed the previous shot's locked value.
    pub echo: bool,
}

impl SweepOsc {
    pub fn new(tuning: SweepTuning, steps: Option<u32>, last_norm: Option<f32>) -> Self {
        Self {
            sweep_secs: tuning.sweep_secs,
            pause_secs: tuning.pause_secs,
            steps,
            last_norm,
            elapsed: 0.0,
            value: None,
            last_step: None,
            echo_dir: 0.0,
        }
    }

    /// Advance the sweep by `dt` seconds and report any cues.
    pub fn advance(&mut self, dt: f32) -> SweepFrame {
        self.elapsed += dt;
        let cycle = self.sweep_secs + self.pause_secs;
        let phase = self.elapsed % cycle;

        if phase > self.sweep_secs {
            // Plateau: hold the last value, fire nothing.
            return SweepFrame {
                value: self.value,
                sweeping: false,
                new_step: None,
                echo: false,
            };
        }

        let mut n = phase / self.sweep_secs;
        // Reverse every other traversal for back-and-forth motion
        if (self.elapsed / cycle) as u64 % 2 == 1 {
            n = 1.0 - n;
        }
        self.value = Some(n);

        let new_step = self.steps.and_then(|steps| {
            let idx = (n * (steps as f32 - 0.001)).floor() as u32;
            let idx = idx.min(steps - 1);
            if Some(idx) != self.last_step {
                self.last_step = Some(idx);
                Some(idx)
            } else {
                None
            }
        });

        // Echo the previous shot: ping when passing near its value from a
        // new direction. The direction latch stops the ping re-firing on
        // every tick spent inside the tolerance window.
        let mut echo = false;
        if let Some(last) = self.last_norm {
            let diff = n - last;
            let dir = if diff >= 0.0 { 1.0 } else { -1.0 };
            if diff.abs() < ECHO_TOLERANCE && dir != self.echo_dir {
                self.echo_dir = dir;
                echo = true;
            }
        }

        SweepFrame {
            value: Some(n),
            sweeping: true,
            new_step,
            echo,
        }
    }

    /// Live value, if the sweep has ticked at least once.
    #[inline]
    pub fn value(&self) -> Option<f32> {
        self.value
    }

    /// Value captured on lock. A sweep that never got a usable tick locks
    /// to the midpoint.
    #[inline]
    pub fn locked_value(&self) -> f32 {
        self.value.unwrap_or(0.5)
    }

    /// Whether the sweep is currently traversing (vs holding its plateau).
    #[inline]
    pub fn in_sweep_window(&self) -> bool {
        let cycle = self.sweep_secs + self.pause_secs;
        self.elapsed % cycle <= self.sweep_secs
    }
}
