//! Game state and core simulation types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::leaderboard::ScoreSubmission;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Game is paused
    Paused,
    /// Run ended, waiting for restart
    GameOver,
}

/// Entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    /// Costs a life on contact
    GasBomb,
    /// Worth points on contact
    MonToken,
    /// Reserved, never spawned
    Powerup,
    /// Reserved, never spawned
    Obstacle,
}

/// A rectangular body on the playfield. `pos` is the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub pos: Vec2,
    pub size: Vec2,
    /// Pixels per tick, downward
    pub vy: f32,
}

impl Entity {
    pub fn new(kind: EntityKind, pos: Vec2, size: Vec2, vy: f32) -> Self {
        Self { kind, pos, size, vy }
    }

    /// The player at its spawn point
    pub fn player(tuning: &Tuning) -> Self {
        Self::new(
            EntityKind::Player,
            Vec2::new(tuning.player_start_x.clamp(0.0, tuning.player_max_x()), tuning.player_y),
            Vec2::splat(tuning.player_size),
            0.0,
        )
    }

    /// A gas bomb entering from above the playfield
    pub fn gas_bomb(tuning: &Tuning, x: f32, vy: f32) -> Self {
        Self::new(
            EntityKind::GasBomb,
            Vec2::new(x, -tuning.bomb_size),
            Vec2::splat(tuning.bomb_size),
            vy,
        )
    }

    /// A MON token entering from above the playfield
    pub fn mon_token(tuning: &Tuning, x: f32) -> Self {
        Self::new(
            EntityKind::MonToken,
            Vec2::new(x, -tuning.token_size),
            Vec2::splat(tuning.token_size),
            tuning.token_speed,
        )
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }
}

/// Something the host should react to (toast, sound, persistence)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A gas bomb hit the player and lives remain
    BombHit { lives_remaining: u8 },
    /// A MON token was collected
    TokenCollected { reward: u64, total: u32 },
    /// The derived level went up
    LevelUp { level: u32 },
    /// The last life was lost
    GameOver { score: u64, mon_tokens: u32, level: u32 },
    Paused,
    Resumed,
    /// A fresh run started
    Restarted,
    /// A finished run should be saved (fire-and-forget)
    ScoreRecorded(ScoreSubmission),
}

impl GameEvent {
    /// Short player-facing notification, if this event has one
    pub fn message(&self) -> Option<String> {
        match self {
            GameEvent::BombHit { lives_remaining } => {
                Some(format!("Gas hit! Lives remaining: {lives_remaining}"))
            }
            GameEvent::TokenCollected { reward, .. } => {
                Some(format!("MON token collected! +{reward} points"))
            }
            GameEvent::LevelUp { level } => Some(format!("Level {level}! Gas fees are rising...")),
            GameEvent::GameOver { .. } => Some("Game Over! Press SPACE to restart".to_string()),
            GameEvent::Restarted => {
                Some("New game started! Use arrow keys to dodge gas fees!".to_string())
            }
            GameEvent::Paused | GameEvent::Resumed | GameEvent::ScoreRecorded(_) => None,
        }
    }
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub score: u64,
    pub lives: u8,
    pub mon_tokens: u32,
    pub phase: GamePhase,
    pub player: Entity,
    /// Falling entities (bombs and tokens), in spawn order
    pub entities: Vec<Entity>,
    /// Ticks simulated while running
    pub time_ticks: u64,
    points_per_level: u64,
}

impl GameState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            score: 0,
            lives: tuning.starting_lives,
            mon_tokens: 0,
            phase: GamePhase::Running,
            player: Entity::player(tuning),
            entities: Vec::new(),
            time_ticks: 0,
            points_per_level: tuning.points_per_level.max(1),
        }
    }

    /// Level derived from score, never stored
    pub fn level(&self) -> u32 {
        (self.score / self.points_per_level) as u32 + 1
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Count live entities of a kind
    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = GameState::new(&Tuning::default());
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, 3);
        assert_eq!(state.level(), 1);
        assert_eq!(state.mon_tokens, 0);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.entities.is_empty());
        assert_eq!(state.player.pos, Vec2::new(400.0, 550.0));
        assert_eq!(state.player.size, Vec2::splat(30.0));
    }

    #[test]
    fn test_level_tracks_score() {
        let mut state = GameState::new(&Tuning::default());
        state.score = 2999;
        assert_eq!(state.level(), 3);
        state.score = 3000;
        assert_eq!(state.level(), 4);
        for (score, level) in [(0, 1), (999, 1), (1000, 2), (12_345, 13)] {
            state.score = score;
            assert_eq!(state.level(), level, "score {score}");
        }
    }

    #[test]
    fn test_level_uses_tuned_step() {
        let tuning = Tuning {
            points_per_level: 250,
            ..Tuning::default()
        };
        let mut state = GameState::new(&tuning);
        state.score = 500;
        assert_eq!(state.level(), 3);

        // A zero step would divide by zero; it behaves as 1
        let mut state = GameState::new(&Tuning {
            points_per_level: 0,
            ..Tuning::default()
        });
        state.score = 7;
        assert_eq!(state.level(), 8);
    }

    #[test]
    fn test_event_messages() {
        assert_eq!(
            GameEvent::BombHit { lives_remaining: 2 }.message().as_deref(),
            Some("Gas hit! Lives remaining: 2")
        );
        assert_eq!(
            GameEvent::TokenCollected { reward: 50, total: 1 }.message().as_deref(),
            Some("MON token collected! +50 points")
        );
        assert!(GameEvent::Paused.message().is_none());
    }
}
