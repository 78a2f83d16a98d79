//! Data-driven game balance
//!
//! Every number the simulation uses comes from a [`Tuning`]. The defaults
//! reproduce the classic balance; a JSON override can be loaded from
//! LocalStorage on the web build.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Why a tuning document was rejected
#[derive(Debug)]
pub enum TuningError {
    /// The JSON could not be parsed
    Parse(serde_json::Error),
    /// A field holds a value the simulation cannot work with
    Invalid { field: &'static str, reason: &'static str },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "tuning parse error: {err}"),
            Self::Invalid { field, reason } => write!(f, "invalid tuning `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// Gameplay constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub playfield_width: f32,
    pub playfield_height: f32,
    pub cull_margin: f32,

    pub player_size: f32,
    pub player_start_x: f32,
    pub player_y: f32,
    pub player_speed: f32,
    pub starting_lives: u8,

    pub bomb_size: f32,
    pub bomb_base_speed: f32,
    pub bomb_speed_jitter: f32,
    pub bomb_spawn_base: f64,
    pub bomb_spawn_per_level: f64,

    pub token_size: f32,
    pub token_speed: f32,
    pub token_spawn_chance: f64,
    pub token_reward: u64,

    pub passive_points_per_tick: u64,
    pub points_per_level: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,
            cull_margin: CULL_MARGIN,

            player_size: PLAYER_SIZE,
            player_start_x: PLAYER_START_X,
            player_y: PLAYER_Y,
            player_speed: PLAYER_SPEED,
            starting_lives: STARTING_LIVES,

            bomb_size: BOMB_SIZE,
            bomb_base_speed: BOMB_BASE_SPEED,
            bomb_speed_jitter: BOMB_SPEED_JITTER,
            bomb_spawn_base: BOMB_SPAWN_BASE,
            bomb_spawn_per_level: BOMB_SPAWN_PER_LEVEL,

            token_size: TOKEN_SIZE,
            token_speed: TOKEN_SPEED,
            token_spawn_chance: TOKEN_SPAWN_CHANCE,
            token_reward: TOKEN_REWARD,

            passive_points_per_tick: PASSIVE_POINTS_PER_TICK,
            points_per_level: POINTS_PER_LEVEL,
        }
    }
}

impl Tuning {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "gas_dodger_tuning";

    /// Parse and validate a JSON tuning document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would break clamping, spawning or level math
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("playfield_width", self.playfield_width),
            ("playfield_height", self.playfield_height),
            ("player_size", self.player_size),
            ("bomb_size", self.bomb_size),
            ("token_size", self.token_size),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TuningError::Invalid {
                    field,
                    reason: "must be a positive number",
                });
            }
        }

        let widest = self.player_size.max(self.bomb_size).max(self.token_size);
        if widest > self.playfield_width {
            return Err(TuningError::Invalid {
                field: "playfield_width",
                reason: "narrower than an entity",
            });
        }
        if self.cull_margin < 0.0 || self.player_speed < 0.0 || self.bomb_speed_jitter < 0.0 {
            return Err(TuningError::Invalid {
                field: "cull_margin/player_speed/bomb_speed_jitter",
                reason: "must not be negative",
            });
        }
        if self.bomb_base_speed <= 0.0 || self.token_speed <= 0.0 {
            return Err(TuningError::Invalid {
                field: "bomb_base_speed/token_speed",
                reason: "falling entities must move down",
            });
        }
        if self.starting_lives == 0 {
            return Err(TuningError::Invalid {
                field: "starting_lives",
                reason: "a run needs at least one life",
            });
        }
        if self.points_per_level == 0 {
            return Err(TuningError::Invalid {
                field: "points_per_level",
                reason: "must be at least 1",
            });
        }
        let chances = [
            self.bomb_spawn_base,
            self.bomb_spawn_per_level,
            self.token_spawn_chance,
        ];
        if chances.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err(TuningError::Invalid {
                field: "spawn chances",
                reason: "probabilities must lie in [0, 1]",
            });
        }
        Ok(())
    }

    /// Per-tick gas bomb spawn probability at a level (grows with difficulty)
    pub fn bomb_spawn_chance(&self, level: u32) -> f64 {
        self.bomb_spawn_base + level as f64 * self.bomb_spawn_per_level
    }

    /// Largest x the player's left edge may take
    pub fn player_max_x(&self) -> f32 {
        (self.playfield_width - self.player_size).max(0.0)
    }

    /// Entities whose top edge reaches this y are culled
    pub fn cull_y(&self) -> f32 {
        self.playfield_height + self.cull_margin
    }

    /// Load the tuning override from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        match crate::platform::storage::get_item(Self::STORAGE_KEY) {
            Some(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning override");
                    tuning
                }
                Err(err) => {
                    log::warn!("Ignoring stored tuning: {err}");
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
