//! Keyboard and touch intent resolution
//!
//! Device handlers only record raw state here. Once per tick the host asks
//! for the resolved intent, so event handlers never touch game state.

use std::collections::HashSet;

use crate::sim::{MoveIntent, TickInput};

/// Direction a held key pushes the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

/// Map a `KeyboardEvent.key` value to a direction
pub fn direction_for_key(key: &str) -> Option<Direction> {
    match key {
        "ArrowLeft" | "a" | "A" => Some(Direction::Left),
        "ArrowRight" | "d" | "D" => Some(Direction::Right),
        _ => None,
    }
}

/// Pause/resume while playing, restart after game over
pub const TOGGLE_KEY: &str = " ";

/// An in-progress touch drag
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragSession {
    start_x: f32,
    player_start_x: f32,
    /// Latest touch position; `None` when the last move had no touch point
    current_x: Option<f32>,
}

/// Raw input state owned by the input layer
#[derive(Debug, Clone, Default)]
pub struct InputAdapter {
    held: HashSet<Direction>,
    drag: Option<DragSession>,
    toggle_pending: bool,
}

impl InputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. Returns true when the key belongs to the game
    /// (the host should then suppress the browser default, e.g. Space scrolling).
    pub fn key_down(&mut self, key: &str, repeat: bool) -> bool {
        if key == TOGGLE_KEY {
            if !repeat {
                self.toggle_pending = true;
            }
            return true;
        }
        match direction_for_key(key) {
            Some(dir) => {
                self.held.insert(dir);
                true
            }
            None => false,
        }
    }

    /// Record a key release
    pub fn key_up(&mut self, key: &str) {
        if let Some(dir) = direction_for_key(key) {
            self.held.remove(&dir);
        }
    }

    /// Begin a drag. `touch_x` is relative to the playfield; `None` means the
    /// event carried no usable touch point and no drag starts.
    pub fn touch_start(&mut self, touch_x: Option<f32>, player_x: f32) {
        self.drag = touch_x.filter(|x| x.is_finite()).map(|x| DragSession {
            start_x: x,
            player_start_x: player_x,
            current_x: Some(x),
        });
    }

    /// Update the drag position
    pub fn touch_move(&mut self, touch_x: Option<f32>) {
        if let Some(drag) = self.drag.as_mut() {
            drag.current_x = touch_x.filter(|x| x.is_finite());
        }
    }

    /// End (or cancel) the drag
    pub fn touch_end(&mut self) {
        self.drag = None;
    }

    /// Latch a toggle as if the toggle key had just been pressed
    pub fn request_toggle(&mut self) {
        self.toggle_pending = true;
    }

    /// Drop all held state, e.g. when the window loses focus. A toggle
    /// press that has not reached a tick yet is dropped too.
    pub fn release_all(&mut self) {
        self.held.clear();
        self.drag = None;
        self.toggle_pending = false;
    }

    pub fn is_held(&self, dir: Direction) -> bool {
        self.held.contains(&dir)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Movement intent for this tick. A drag with a resolved touch point
    /// supersedes the keyboard.
    pub fn resolve(&self) -> MoveIntent {
        if let Some(DragSession {
            start_x,
            player_start_x,
            current_x: Some(x),
        }) = self.drag
        {
            return MoveIntent::Drag {
                target_x: player_start_x + (x - start_x),
            };
        }

        let left = self.is_held(Direction::Left);
        let right = self.is_held(Direction::Right);
        if left || right {
            MoveIntent::Keys { left, right }
        } else {
            MoveIntent::Idle
        }
    }

    /// Consume the latched toggle press
    pub fn take_toggle(&mut self) -> bool {
        std::mem::take(&mut self.toggle_pending)
    }

    /// Resolve movement and consume the toggle in one step
    pub fn take_tick_input(&mut self) -> TickInput {
        TickInput {
            movement: self.resolve(),
            pause: self.take_toggle(),
        }
    }
}
