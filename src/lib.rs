//! Gas Dodger - dodge falling gas bombs, collect MON tokens
//!
//! Core modules:
//! - `sim`: Per-tick simulation (entities, collisions, spawning, game state)
//! - `engine`: Engine instance owning the state and the spawn RNG
//! - `input`: Keyboard/touch intent resolution
//! - `renderer`: Immediate-mode 2D canvas rendering
//! - `platform`: Browser scheduling, DOM input bindings and storage
//! - `tuning`: Data-driven game balance
//! - `narrator`: Flavor lines for game events
//! - `leaderboard`, `wallet`, `session`, `audio`: external collaborators

pub mod app;
pub mod audio;
pub mod engine;
pub mod input;
pub mod leaderboard;
pub mod narrator;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod wallet;

pub use app::GameApp;
pub use engine::Engine;
pub use input::InputAdapter;
pub use leaderboard::{LocalScoreStore, ScoreRecord, ScoreStore};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Playfield dimensions
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;
    /// Entities are culled once they are this far below the bottom edge
    pub const CULL_MARGIN: f32 = 50.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 30.0;
    pub const PLAYER_START_X: f32 = 400.0;
    pub const PLAYER_Y: f32 = 550.0;
    /// Horizontal displacement per tick while a direction is held
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const STARTING_LIVES: u8 = 3;

    /// Gas bomb defaults
    pub const BOMB_SIZE: f32 = 40.0;
    pub const BOMB_BASE_SPEED: f32 = 2.0;
    /// Extra random fall speed in [0, jitter)
    pub const BOMB_SPEED_JITTER: f32 = 2.0;
    pub const BOMB_SPAWN_BASE: f64 = 0.02;
    pub const BOMB_SPAWN_PER_LEVEL: f64 = 0.005;

    /// MON token defaults
    pub const TOKEN_SIZE: f32 = 25.0;
    pub const TOKEN_SPEED: f32 = 1.6;
    pub const TOKEN_SPAWN_CHANCE: f64 = 0.008;
    pub const TOKEN_REWARD: u64 = 50;

    /// Scoring
    pub const PASSIVE_POINTS_PER_TICK: u64 = 1;
    pub const POINTS_PER_LEVEL: u64 = 1000;
}
