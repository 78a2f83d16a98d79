//! Simulation module
//!
//! All gameplay logic lives here. This module stays free of rendering and
//! platform dependencies:
//! - One update per display refresh, speeds in pixels per tick
//! - Randomness only through the caller's RNG
//! - Events instead of side effects

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{Rect, overlapping_indices};
pub use state::{Entity, EntityKind, GameEvent, GamePhase, GameState};
pub use tick::{MoveIntent, TickInput, tick};
