//! Player preferences
//!
//! Persisted separately from score records in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::platform::storage;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Background music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Start the music track on the first interaction
    pub music_enabled: bool,

    // === Visual Effects ===
    /// Neon glow around sprites
    pub glow_effects: bool,
    /// Background grid
    pub show_grid: bool,

    // === Accessibility ===
    /// Reduced motion (drops glow)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.3,
            music_enabled: true,

            glow_effects: true,
            show_grid: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "gas_dodger_settings";

    /// Effective glow (respects reduced_motion)
    pub fn effective_glow(&self) -> bool {
        self.glow_effects && !self.reduced_motion
    }

    /// Volume for sound effects after the master fader
    pub fn effective_sfx_volume(&self) -> f32 {
        clamp_unit(self.master_volume) * clamp_unit(self.sfx_volume)
    }

    /// Volume for the music track after the master fader
    pub fn effective_music_volume(&self) -> f32 {
        clamp_unit(self.master_volume) * clamp_unit(self.music_volume)
    }

    /// Parse stored JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from LocalStorage, defaults when absent or unreadable
    pub fn load() -> Self {
        let Some(json) = storage::get_item(Self::STORAGE_KEY) else {
            log::info!("Using default settings");
            return Self::default();
        };
        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from LocalStorage");
                settings
            }
            Err(err) => {
                log::warn!("Ignoring stored settings: {err}");
                Self::default()
            }
        }
    }

    /// Save settings to LocalStorage
    pub fn save(&self) {
        match serde_json::to_string(self) {
            Ok(json) => match storage::set_item(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(err) => log::warn!("Settings not saved: {err}"),
            },
            Err(err) => log::warn!("Settings not serializable: {err}"),
        }
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}
