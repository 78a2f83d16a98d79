//! Application shell
//!
//! [`GameApp`] wires the engine to its collaborators: input feeds the tick,
//! events fan out to audio, persistence and the toast line, then the frame
//! is drawn. The browser entry point and the headless runner both drive it
//! one [`GameApp::frame`] per refresh.

use crate::audio::{AudioSink, sound_for};
use crate::engine::Engine;
use crate::input::InputAdapter;
use crate::leaderboard::{
    DEFAULT_BOARD_SIZE, Leaderboard, MAX_STORED_RECORDS, PlayerStats, ScoreStore, StoreError,
};
use crate::narrator::Narrator;
use crate::platform;
use crate::renderer::{RenderStyle, Surface, draw_frame};
use crate::session::{IdentityProvider, Session, UserId};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState};
use crate::tuning::Tuning;

pub struct GameApp {
    engine: Engine,
    input: InputAdapter,
    store: Box<dyn ScoreStore>,
    audio: Box<dyn AudioSink>,
    session: Session,
    settings: Settings,
    style: RenderStyle,
    /// Latest player-facing notification
    toast: Option<String>,
    narrator: Narrator,
}

impl GameApp {
    pub fn new(
        tuning: Tuning,
        settings: Settings,
        store: Box<dyn ScoreStore>,
        mut audio: Box<dyn AudioSink>,
        seed: u64,
    ) -> Self {
        audio.set_volume(settings.effective_sfx_volume());
        let style = RenderStyle::from(&settings);
        Self {
            engine: Engine::new(tuning, seed),
            input: InputAdapter::new(),
            store,
            audio,
            session: Session::new(),
            settings,
            style,
            toast: None,
            narrator: Narrator::new(seed.wrapping_add(1)),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn state(&self) -> &GameState {
        self.engine.state()
    }

    pub fn tuning(&self) -> &Tuning {
        self.engine.tuning()
    }

    /// Device handlers record raw input here
    pub fn input_mut(&mut self) -> &mut InputAdapter {
        &mut self.input
    }

    pub fn input(&self) -> &InputAdapter {
        &self.input
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn sign_in(&mut self, user: UserId) {
        self.session.sign_in(user);
    }

    pub fn sign_out(&mut self) {
        self.session.sign_out();
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace and persist the settings
    pub fn apply_settings(&mut self, settings: Settings) {
        self.audio.set_volume(settings.effective_sfx_volume());
        self.style = RenderStyle::from(&settings);
        settings.save();
        self.settings = settings;
    }

    /// Latest toast text, if any event produced one
    pub fn toast(&self) -> Option<&str> {
        self.toast.as_deref()
    }

    /// What the narrator is currently saying
    pub fn narration(&self) -> &'static str {
        self.narrator.line()
    }

    /// Have the narrator share a random fact
    pub fn crypto_fact(&mut self) -> &'static str {
        self.narrator.fact()
    }

    /// The page lost focus or was hidden: drop held input and pause a
    /// running game. Returns true when a pause was requested.
    pub fn suspend(&mut self) -> bool {
        self.input.release_all();
        if !self.engine.state().is_running() {
            return false;
        }
        self.input.request_toggle();
        true
    }

    /// Resolve input, run one tick and dispatch its events
    pub fn step(&mut self) -> Vec<GameEvent> {
        self.engine.set_user(self.session.current_user());
        let input = self.input.take_tick_input();
        let events = self.engine.tick(&input);
        self.dispatch(&events);
        events
    }

    /// One display refresh: step, then draw
    pub fn frame(&mut self, surface: &mut dyn Surface) -> Vec<GameEvent> {
        let events = self.step();
        self.render(surface);
        events
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        draw_frame(surface, self.engine.state(), self.engine.tuning(), &self.style);
    }

    /// Start over immediately, saving the current run if it counts
    pub fn restart(&mut self) -> Vec<GameEvent> {
        self.engine.set_user(self.session.current_user());
        let events = self.engine.restart();
        self.dispatch(&events);
        events
    }

    fn dispatch(&mut self, events: &[GameEvent]) {
        for event in events {
            if let Some(effect) = sound_for(event) {
                self.audio.play(effect);
            }
            if let GameEvent::ScoreRecorded(submission) = event {
                match self.store.record_score(submission.clone()) {
                    Ok(record) => log::info!(
                        "Score {} saved for {}",
                        record.score,
                        record.user_id.display_name()
                    ),
                    Err(err @ StoreError::NotRetained { .. }) => {
                        log::info!("Score not saved: {err}")
                    }
                    Err(err) => log::warn!("Failed to save score: {err}"),
                }
            }
            if let Some(message) = event.message() {
                log::debug!("{message}");
                self.toast = Some(message);
            }
            if let Some(line) = self.narrator.observe(event) {
                log::debug!("Narrator: {line}");
            }
        }
    }

    /// Top of the board, placeholder rows if the store fails
    pub fn leaderboard(&self) -> Leaderboard {
        Leaderboard::fetch(self.store.as_ref(), DEFAULT_BOARD_SIZE, platform::now_ms())
    }

    /// Aggregates for the signed-in player
    pub fn player_stats(&self) -> Option<PlayerStats> {
        let user = self.session.current_user()?;
        match self.store.top_scores(MAX_STORED_RECORDS) {
            Ok(records) => Some(PlayerStats::for_user(&records, &user)),
            Err(err) => {
                log::warn!("Player stats unavailable: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::audio::SoundEffect;
    use crate::leaderboard::{LocalScoreStore, ScoreRecord, ScoreSubmission};
    use crate::renderer::TextAlign;
    use crate::sim::{Entity, GamePhase};

    #[derive(Clone, Default)]
    struct RecordingAudio(Rc<RefCell<Vec<SoundEffect>>>);

    impl AudioSink for RecordingAudio {
        fn play(&mut self, effect: SoundEffect) {
            self.0.borrow_mut().push(effect);
        }
    }

    struct BrokenStore;

    impl ScoreStore for BrokenStore {
        fn record_score(&mut self, _: ScoreSubmission) -> Result<ScoreRecord, StoreError> {
            Err(StoreError::Unavailable("offline".into()))
        }

        fn top_scores(&self, _: usize) -> Result<Vec<ScoreRecord>, StoreError> {
            Err(StoreError::Unavailable("offline".into()))
        }
    }

    #[derive(Default)]
    struct CountingSurface {
        calls: usize,
    }

    impl Surface for CountingSurface {
        fn fill_vertical_gradient(&mut self, _: f64, _: f64, _: f64, _: f64, _: &[(f32, &str)]) {
            self.calls += 1;
        }
        fn fill_rect(&mut self, _: f64, _: f64, _: f64, _: f64, _: &str) {
            self.calls += 1;
        }
        fn fill_circle(&mut self, _: f64, _: f64, _: f64, _: &str) {
            self.calls += 1;
        }
        fn fill_triangle(&mut self, _: [(f64, f64); 3], _: &str) {
            self.calls += 1;
        }
        fn stroke_line(&mut self, _: (f64, f64), _: (f64, f64), _: &str, _: f64) {
            self.calls += 1;
        }
        fn fill_text(&mut self, _: &str, _: f64, _: f64, _: &str, _: &str, _: TextAlign) {
            self.calls += 1;
        }
        fn set_glow(&mut self, _: &str, _: f64) {}
    }

    fn fixed_clock() -> f64 {
        1_700_000_000_000.0
    }

    fn quiet_tuning() -> Tuning {
        Tuning {
            bomb_spawn_base: 0.0,
            bomb_spawn_per_level: 0.0,
            token_spawn_chance: 0.0,
            ..Tuning::default()
        }
    }

    fn app_with(store: Box<dyn ScoreStore>) -> (GameApp, RecordingAudio) {
        let audio = RecordingAudio::default();
        let app = GameApp::new(
            quiet_tuning(),
            Settings::default(),
            store,
            Box::new(audio.clone()),
            7,
        );
        (app, audio)
    }

    /// Place an entity where the player will be after this tick's fall
    fn drop_on_player(app: &mut GameApp, mut entity: Entity) {
        entity.pos = app.engine.state().player.pos;
        entity.pos.y -= entity.vy;
        app.engine.state_mut().entities.push(entity);
    }

    fn lose_all_lives(app: &mut GameApp) {
        while !app.state().is_game_over() {
            let bomb = Entity::gas_bomb(app.tuning(), 0.0, 2.0);
            drop_on_player(app, bomb);
            app.step();
        }
    }

    #[test]
    fn test_frame_ticks_and_draws() {
        let (mut app, _) = app_with(Box::new(LocalScoreStore::with_clock(fixed_clock)));
        let mut surface = CountingSurface::default();

        let events = app.frame(&mut surface);

        assert!(events.is_empty());
        assert_eq!(app.state().score, 1);
        assert!(surface.calls > 0);
    }

    #[test]
    fn test_events_drive_audio_and_toast() {
        let (mut app, audio) = app_with(Box::new(LocalScoreStore::with_clock(fixed_clock)));
        let greeting = app.narration();
        let token = Entity::mon_token(app.tuning(), 0.0);
        drop_on_player(&mut app, token);

        app.step();

        assert_eq!(*audio.0.borrow(), vec![SoundEffect::Collect]);
        assert_eq!(app.toast(), Some("MON token collected! +50 points"));
        assert_ne!(app.narration(), greeting);
    }

    #[test]
    fn test_input_reaches_engine() {
        let (mut app, _) = app_with(Box::new(LocalScoreStore::with_clock(fixed_clock)));
        app.input_mut().key_down("ArrowLeft", false);
        app.step();
        assert_eq!(app.state().player.pos.x, 395.0);

        app.input_mut().key_down(" ", false);
        app.step();
        assert_eq!(app.state().phase, GamePhase::Paused);
    }

    #[test]
    fn test_suspend_pauses_running_game() {
        let (mut app, _) = app_with(Box::new(LocalScoreStore::with_clock(fixed_clock)));
        app.input_mut().key_down("ArrowRight", false);

        assert!(app.suspend());
        let events = app.step();

        assert_eq!(events, vec![GameEvent::Paused]);
        assert_eq!(app.state().player.pos.x, 400.0);
    }

    #[test]
    fn test_suspend_keeps_paused_game_paused() {
        let (mut app, _) = app_with(Box::new(LocalScoreStore::with_clock(fixed_clock)));
        app.input_mut().key_down(" ", false);
        app.step();
        assert_eq!(app.state().phase, GamePhase::Paused);

        // Space to resume lands just before the tab is hidden
        app.input_mut().key_down(" ", false);
        assert!(!app.suspend());
        app.step();

        assert_eq!(app.state().phase, GamePhase::Paused);
    }

    #[test]
    fn test_restart_saves_signed_in_run() {
        let (mut app, audio) = app_with(Box::new(LocalScoreStore::with_clock(fixed_clock)));
        app.sign_in(UserId::new("abcdef123456"));
        for _ in 0..10 {
            app.step();
        }
        lose_all_lives(&mut app);
        assert_eq!(audio.0.borrow().last(), Some(&SoundEffect::GameOver));
        let score = app.state().score;

        app.input_mut().key_down(" ", false);
        app.step();

        assert_eq!(app.state().score, 0);
        assert_eq!(
            app.toast(),
            Some("New game started! Use arrow keys to dodge gas fees!")
        );
        let board = app.leaderboard();
        assert!(!board.is_placeholder);
        assert_eq!(board.entries.len(), 1);
        assert_eq!(board.entries[0].name, "Player_abcdef12");
        assert_eq!(board.entries[0].score, score);

        let stats = app.player_stats().unwrap();
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.high_score, score);
    }

    #[test]
    fn test_anonymous_run_not_saved() {
        let (mut app, _) = app_with(Box::new(LocalScoreStore::with_clock(fixed_clock)));
        app.step();
        app.restart();
        assert!(app.leaderboard().is_empty());
        assert_eq!(app.player_stats(), None);
    }

    #[test]
    fn test_store_failure_is_not_fatal() {
        let (mut app, _) = app_with(Box::new(BrokenStore));
        app.sign_in(UserId::new("player"));
        app.step();
        lose_all_lives(&mut app);

        let events = app.restart();

        assert!(matches!(events[0], GameEvent::ScoreRecorded(_)));
        assert_eq!(app.state().phase, GamePhase::Running);
        assert!(app.leaderboard().is_placeholder);
        assert_eq!(app.player_stats(), None);
    }

    #[test]
    fn test_apply_settings_updates_style() {
        let (mut app, _) = app_with(Box::new(LocalScoreStore::with_clock(fixed_clock)));
        let settings = Settings {
            show_grid: false,
            ..Settings::default()
        };
        app.apply_settings(settings.clone());
        assert_eq!(app.settings(), &settings);
        assert!(!app.style.grid);
    }
}
