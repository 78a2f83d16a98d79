//! 2D canvas rendering module
//!
//! Immediate mode: every refresh redraws the whole playfield from the state.

pub mod scene;
pub mod surface;

pub use scene::{RenderStyle, draw_frame};
pub use surface::{Surface, TextAlign};
