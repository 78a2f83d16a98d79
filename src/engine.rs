//! Game engine instance
//!
//! One [`Engine`] per game session. It is the only writer of the game state;
//! renderers get `&GameState` through [`Engine::state`]. All I/O is expressed
//! as returned [`GameEvent`]s.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::leaderboard::ScoreSubmission;
use crate::session::UserId;
use crate::sim::{self, GameEvent, GameState, TickInput};
use crate::tuning::Tuning;

pub struct Engine {
    state: GameState,
    tuning: Tuning,
    rng: Pcg32,
    user: Option<UserId>,
}

impl Engine {
    /// Create an engine with the given balance and spawn seed
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            state: GameState::new(&tuning),
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            user: None,
        }
    }

    /// Read-only snapshot for rendering
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Who finished runs are attributed to
    pub fn set_user(&mut self, user: Option<UserId>) {
        self.user = user;
    }

    pub fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    /// Advance one display refresh. The toggle restarts a finished run,
    /// otherwise it pauses or resumes.
    pub fn tick(&mut self, input: &TickInput) -> Vec<GameEvent> {
        if input.pause && self.state.is_game_over() {
            return self.restart();
        }

        let mut events = Vec::new();
        sim::tick(
            &mut self.state,
            input,
            &self.tuning,
            &mut self.rng,
            &mut events,
        );
        events
    }

    /// Reset to a fresh run. A scored run with a known user is submitted first.
    pub fn restart(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();

        if self.state.score > 0 {
            match &self.user {
                Some(user) => events.push(GameEvent::ScoreRecorded(ScoreSubmission {
                    user_id: user.clone(),
                    score: self.state.score,
                    mon_tokens: self.state.mon_tokens,
                    level_reached: self.state.level(),
                })),
                None => log::debug!("Run not saved: no signed-in user"),
            }
        }

        self.state = GameState::new(&self.tuning);
        log::info!("New run started");
        events.push(GameEvent::Restarted);
        events
    }
}
