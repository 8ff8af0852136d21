//! Player preferences
//!
//! Persisted to LocalStorage, separately from any round state (which is
//! deliberately not persisted at all).

use serde::{Deserialize, Serialize};

/// How fast the aim sweeps traverse their range.
///
/// Slower sweeps trade score pace for reaction time - the accessibility
/// lever for players who need a wider timing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SweepSpeed {
    Relaxed,
    #[default]
    Standard,
    Quick,
}

impl SweepSpeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            SweepSpeed::Relaxed => "Relaxed",
            SweepSpeed::Standard => "Standard",
            SweepSpeed::Quick => "Quick",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "slow" => Some(SweepSpeed::Relaxed),
            "standard" | "normal" => Some(SweepSpeed::Standard),
            "quick" | "fast" => Some(SweepSpeed::Quick),
            _ => None,
        }
    }

    /// Multiplier applied to sweep traversal time.
    pub fn multiplier(&self) -> f32 {
        match self {
            SweepSpeed::Relaxed => 1.4,
            SweepSpeed::Standard => 1.0,
            SweepSpeed::Quick => 0.75,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Mute all audio
    pub muted: bool,
    /// Aim sweep pacing
    pub sweep_speed: SweepSpeed,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            muted: false,
            sweep_speed: SweepSpeed::Standard,
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "arcane_archer_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_speed_round_trip() {
        for speed in [SweepSpeed::Relaxed, SweepSpeed::Standard, SweepSpeed::Quick] {
            assert_eq!(SweepSpeed::from_str(speed.as_str()), Some(speed));
        }
        assert_eq!(SweepSpeed::from_str("warp"), None);
    }

    #[test]
    fn test_relaxed_is_slower_than_quick() {
        assert!(SweepSpeed::Relaxed.multiplier() > SweepSpeed::Standard.multiplier());
        assert!(SweepSpeed::Quick.multiplier() < SweepSpeed::Standard.multiplier());
    }
}
