//! Per-refresh simulation tick
//!
//! Advances the game state by one display refresh. Speeds are expressed in
//! pixels per tick, so refresh-rate jitter shows up as speed jitter.

use rand::Rng;

use super::collision::overlapping_indices;
use super::state::{Entity, EntityKind, GameEvent, GamePhase, GameState};
use crate::tuning::Tuning;

/// Resolved horizontal movement for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MoveIntent {
    #[default]
    Idle,
    /// Held direction keys; holding both cancels out
    Keys { left: bool, right: bool },
    /// Touch drag wants the player's left edge at `target_x`
    Drag { target_x: f32 },
}

impl MoveIntent {
    /// Sign of the horizontal intent: -1, 0 or 1 (drag reports 0)
    pub fn direction(&self) -> i8 {
        match *self {
            MoveIntent::Keys { left, right } => right as i8 - left as i8,
            MoveIntent::Idle | MoveIntent::Drag { .. } => 0,
        }
    }
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub movement: MoveIntent,
    /// Pause toggle (restart while game over is handled by the engine)
    pub pause: bool,
}

/// Advance the game state by one tick, appending anything notable to `events`
pub fn tick<R: Rng + ?Sized>(
    state: &mut GameState,
    input: &TickInput,
    tuning: &Tuning,
    rng: &mut R,
    events: &mut Vec<GameEvent>,
) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Running => {
                state.phase = GamePhase::Paused;
                events.push(GameEvent::Paused);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Running;
                events.push(GameEvent::Resumed);
            }
            GamePhase::GameOver => {}
        }
    }

    // Don't tick if paused or game over
    if state.phase != GamePhase::Running {
        return;
    }

    state.time_ticks += 1;
    let level_before = state.level();

    update_player(state, input.movement, tuning);
    advance_entities(state, tuning);
    resolve_collisions(state, tuning, events);

    // The run may have just ended; a finished run neither spawns nor scores
    if !state.is_running() {
        return;
    }

    spawn_entities(state, tuning, rng);

    state.score += tuning.passive_points_per_tick;
    let level = state.level();
    if level > level_before {
        log::debug!("Level up: {}", level);
        events.push(GameEvent::LevelUp { level });
    }
}

/// Apply the movement intent and clamp the player to the playfield
pub fn update_player(state: &mut GameState, movement: MoveIntent, tuning: &Tuning) {
    let current = state.player.pos.x;
    let wanted = match movement {
        MoveIntent::Idle => current,
        MoveIntent::Keys { .. } => current + movement.direction() as f32 * tuning.player_speed,
        MoveIntent::Drag { target_x } => target_x,
    };
    let x = if wanted.is_finite() { wanted } else { current };
    state.player.pos.x = x.clamp(0.0, tuning.player_max_x());
}

/// Move falling entities down and silently drop the ones past the cull line
pub fn advance_entities(state: &mut GameState, tuning: &Tuning) {
    let cull_y = tuning.cull_y();
    for entity in &mut state.entities {
        entity.pos.y += entity.vy;
    }
    state.entities.retain(|e| e.pos.y < cull_y);
}

/// Resolve every entity touching the player. Each entity resolves once and is removed.
pub fn resolve_collisions(state: &mut GameState, tuning: &Tuning, events: &mut Vec<GameEvent>) {
    let player = state.player.rect();
    let hits = overlapping_indices(&player, state.entities.iter().map(Entity::rect));
    if hits.is_empty() {
        return;
    }

    let mut resolved = vec![false; state.entities.len()];
    let mut lost_last_life = false;

    for idx in hits {
        match state.entities[idx].kind {
            EntityKind::GasBomb => {
                resolved[idx] = true;
                if state.lives == 0 {
                    continue;
                }
                state.lives -= 1;
                if state.lives == 0 {
                    state.phase = GamePhase::GameOver;
                    lost_last_life = true;
                } else {
                    events.push(GameEvent::BombHit {
                        lives_remaining: state.lives,
                    });
                }
            }
            EntityKind::MonToken => {
                resolved[idx] = true;
                state.score += tuning.token_reward;
                state.mon_tokens += 1;
                events.push(GameEvent::TokenCollected {
                    reward: tuning.token_reward,
                    total: state.mon_tokens,
                });
            }
            // Reserved kinds have no contact behaviour yet
            EntityKind::Player | EntityKind::Powerup | EntityKind::Obstacle => {}
        }
    }

    let mut flags = resolved.into_iter();
    state
        .entities
        .retain(|_| !flags.next().unwrap_or(false));

    if lost_last_life {
        log::info!(
            "Game over: score {} with {} MON at level {}",
            state.score,
            state.mon_tokens,
            state.level()
        );
        events.push(GameEvent::GameOver {
            score: state.score,
            mon_tokens: state.mon_tokens,
            level: state.level(),
        });
    }
}

/// Independent spawn rolls for a gas bomb and a MON token
pub fn spawn_entities<R: Rng + ?Sized>(state: &mut GameState, tuning: &Tuning, rng: &mut R) {
    let level = state.level();

    if rng.random::<f64>() < tuning.bomb_spawn_chance(level) {
        let max_x = (tuning.playfield_width - tuning.bomb_size).max(0.0);
        let x = rng.random::<f32>() * max_x;
        let vy = tuning.bomb_base_speed + rng.random::<f32>() * tuning.bomb_speed_jitter;
        state.entities.push(Entity::gas_bomb(tuning, x, vy));
    }

    if rng.random::<f64>() < tuning.token_spawn_chance {
        let max_x = (tuning.playfield_width - tuning.token_size).max(0.0);
        let x = rng.random::<f32>() * max_x;
        state.entities.push(Entity::mon_token(tuning, x));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Balance with spawning switched off so tests control every entity
    fn quiet_tuning() -> Tuning {
        Tuning {
            bomb_spawn_base: 0.0,
            bomb_spawn_per_level: 0.0,
            token_spawn_chance: 0.0,
            ..Tuning::default()
        }
    }

    fn run(state: &mut GameState, input: &TickInput, tuning: &Tuning) -> Vec<GameEvent> {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut events = Vec::new();
        tick(state, input, tuning, &mut rng, &mut events);
        events
    }

    /// Place an entity so it overlaps the player after one advance step
    fn on_player(state: &GameState, mut entity: Entity) -> Entity {
        entity.pos = state.player.pos - Vec2::new(0.0, entity.vy);
        entity
    }

    #[test]
    fn test_passive_score_per_tick() {
        let tuning = quiet_tuning();
        let mut state = GameState::new(&tuning);
        for _ in 0..10 {
            run(&mut state, &TickInput::default(), &tuning);
        }
        assert_eq!(state.score, 10);
        assert_eq!(state.time_ticks, 10);
    }

    #[test]
    fn test_keys_move_and_cancel() {
        let tuning = quiet_tuning();
        let mut state = GameState::new(&tuning);

        let left = TickInput {
            movement: MoveIntent::Keys { left: true, right: false },
            ..Default::default()
        };
        run(&mut state, &left, &tuning);
        assert_eq!(state.player.pos.x, 395.0);

        let both = TickInput {
            movement: MoveIntent::Keys { left: true, right: true },
            ..Default::default()
        };
        run(&mut state, &both, &tuning);
        assert_eq!(state.player.pos.x, 395.0);
    }

    #[test]
    fn test_player_clamped_at_edges() {
        let tuning = quiet_tuning();
        let mut state = GameState::new(&tuning);
        let right = TickInput {
            movement: MoveIntent::Keys { left: false, right: true },
            ..Default::default()
        };
        for _ in 0..200 {
            run(&mut state, &right, &tuning);
        }
        assert_eq!(state.player.pos.x, 770.0);

        let drag = TickInput {
            movement: MoveIntent::Drag { target_x: -500.0 },
            ..Default::default()
        };
        run(&mut state, &drag, &tuning);
        assert_eq!(state.player.pos.x, 0.0);
    }

    #[test]
    fn test_token_collection() {
        let tuning = quiet_tuning();
        let mut state = GameState::new(&tuning);
        let token = on_player(&state, Entity::mon_token(&tuning, 0.0));
        state.entities.push(token);

        let events = run(&mut state, &TickInput::default(), &tuning);

        // 50 reward plus the passive point for the tick
        assert_eq!(state.score, 51);
        assert_eq!(state.mon_tokens, 1);
        assert!(state.entities.is_empty());
        assert!(events.contains(&GameEvent::TokenCollected { reward: 50, total: 1 }));
    }

    #[test]
    fn test_bomb_hit_costs_a_life() {
        let tuning = quiet_tuning();
        let mut state = GameState::new(&tuning);
        let bomb = on_player(&state, Entity::gas_bomb(&tuning, 0.0, 3.0));
        state.entities.push(bomb);

        let events = run(&mut state, &TickInput::default(), &tuning);

        assert_eq!(state.lives, 2);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.entities.is_empty());
        assert_eq!(events, vec![GameEvent::BombHit { lives_remaining: 2 }]);
    }

    #[test]
    fn test_last_life_ends_the_run() {
        let tuning = quiet_tuning();
        let mut state = GameState::new(&tuning);
        state.lives = 1;
        let bomb = on_player(&state, Entity::gas_bomb(&tuning, 0.0, 2.0));
        state.entities.push(bomb);

        let events = run(&mut state, &TickInput::default(), &tuning);

        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        // No passive point once the run is over
        assert_eq!(state.score, 0);
        assert!(matches!(events.last(), Some(GameEvent::GameOver { .. })));
    }

    #[test]
    fn test_multiple_bombs_clamp_lives_at_zero() {
        let tuning = quiet_tuning();
        let mut state = GameState::new(&tuning);
        state.lives = 2;
        for _ in 0..4 {
            let bomb = on_player(&state, Entity::gas_bomb(&tuning, 0.0, 2.0));
            state.entities.push(bomb);
        }

        let events = run(&mut state, &TickInput::default(), &tuning);

        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.entities.is_empty());
        let game_overs = events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn test_cull_has_no_side_effects() {
        let tuning = quiet_tuning();
        let mut state = GameState::new(&tuning);
        let mut bomb = Entity::gas_bomb(&tuning, 0.0, 2.0);
        bomb.pos.y = tuning.playfield_height + tuning.cull_margin + 1.0;
        state.entities.push(bomb);

        let events = run(&mut state, &TickInput::default(), &tuning);

        assert!(state.entities.is_empty());
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 1);
        assert!(events.is_empty());
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let tuning = quiet_tuning();
        let mut state = GameState::new(&tuning);
        state.entities.push(Entity::gas_bomb(&tuning, 100.0, 2.0));

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        assert_eq!(run(&mut state, &pause, &tuning), vec![GameEvent::Paused]);
        assert_eq!(state.phase, GamePhase::Paused);

        let y = state.entities[0].pos.y;
        let left = TickInput {
            movement: MoveIntent::Keys { left: true, right: false },
            ..Default::default()
        };
        run(&mut state, &left, &tuning);
        assert_eq!(state.score, 0);
        assert_eq!(state.entities[0].pos.y, y);
        assert_eq!(state.player.pos.x, 400.0);

        assert_eq!(run(&mut state, &pause, &tuning), vec![GameEvent::Resumed]);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_game_over_ignores_pause() {
        let tuning = quiet_tuning();
        let mut state = GameState::new(&tuning);
        state.lives = 0;
        state.phase = GamePhase::GameOver;
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        assert!(run(&mut state, &pause, &tuning).is_empty());
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_spawn_positions_and_speeds() {
        let tuning = Tuning {
            bomb_spawn_base: 1.0,
            bomb_spawn_per_level: 0.0,
            token_spawn_chance: 1.0,
            ..Tuning::default()
        };
        let mut state = GameState::new(&tuning);
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..50 {
            spawn_entities(&mut state, &tuning, &mut rng);
        }

        assert_eq!(state.count(EntityKind::GasBomb), 50);
        assert_eq!(state.count(EntityKind::MonToken), 50);
        for e in &state.entities {
            match e.kind {
                EntityKind::GasBomb => {
                    assert_eq!(e.pos.y, -40.0);
                    assert!(e.pos.x >= 0.0 && e.pos.x <= 760.0);
                    assert!(e.vy >= 2.0 && e.vy < 4.0);
                }
                EntityKind::MonToken => {
                    assert_eq!(e.pos.y, -25.0);
                    assert!(e.pos.x >= 0.0 && e.pos.x <= 775.0);
                    assert_eq!(e.vy, 1.6);
                }
                other => panic!("unexpected spawn {other:?}"),
            }
        }
    }

    #[test]
    fn test_level_up_event() {
        let tuning = quiet_tuning();
        let mut state = GameState::new(&tuning);
        state.score = 999;
        let events = run(&mut state, &TickInput::default(), &tuning);
        assert_eq!(state.level(), 2);
        assert_eq!(events, vec![GameEvent::LevelUp { level: 2 }]);
    }
}
