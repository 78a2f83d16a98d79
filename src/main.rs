//! Gas Dodger entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlInputElement};

    use gas_dodger::audio::{AudioManager, MusicTrack};
    use gas_dodger::leaderboard::{Leaderboard, format_date, format_score};
    use gas_dodger::platform::dom::{DomListeners, InputBindings};
    use gas_dodger::platform::{FrameScheduler, PageExit, scheduler::AnimationFrameScheduler};
    use gas_dodger::session::{IdentityProvider, UserId};
    use gas_dodger::sim::GameEvent;
    use gas_dodger::wallet::{
        AccountsSubscription, EthereumProvider, WalletProvider, WalletSession,
    };
    use gas_dodger::{GameApp, LocalScoreStore, Settings, Tuning};

    /// Everything that must be released when the page goes away
    struct Runtime {
        scheduler: AnimationFrameScheduler,
        _bindings: InputBindings,
        _controls: DomListeners,
        _wallet: Option<AccountsSubscription>,
    }

    thread_local! {
        static RUNTIME: RefCell<Option<Runtime>> = const { RefCell::new(None) };
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Gas Dodger starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let tuning = Tuning::load();
        let settings = Settings::load();

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        // Backing store matches the playfield; CSS handles display scaling
        canvas.set_width(tuning.playfield_width as u32);
        canvas.set_height(tuning.playfield_height as u32);

        let mut ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let seed = js_sys::Date::now() as u64;
        let music_enabled = settings.music_enabled;
        let music_volume = settings.effective_music_volume();
        let app = Rc::new(RefCell::new(GameApp::new(
            tuning,
            settings,
            Box::new(LocalScoreStore::load()),
            Box::new(AudioManager::new()),
            seed,
        )));
        log::info!("Game initialized with seed: {}", seed);

        let bindings = match InputBindings::attach(&canvas, app.clone()) {
            Ok(bindings) => bindings,
            Err(err) => {
                log::error!("Failed to attach input handlers: {:?}", err);
                return;
            }
        };

        let music = Rc::new(RefCell::new(MusicTrack::new()));
        music.borrow_mut().set_volume(music_volume);
        if music_enabled {
            music.borrow_mut().play();
        }

        let wallet = Rc::new(RefCell::new(WalletSession::new()));
        let mut controls = setup_music_controls(&document, music);
        let subscription = setup_wallet(&document, app.clone(), wallet, &mut controls);
        setup_fact_button(&document, app.clone(), &mut controls);

        update_leaderboard(&document, &app.borrow());
        show_toast(&document, "New game started! Use arrow keys to dodge gas fees!");
        show_narration(&document, app.borrow().narration());

        // Game loop
        let mut scheduler = AnimationFrameScheduler::new();
        {
            let app = app.clone();
            let document = document.clone();
            scheduler.start(Box::new(move |_time: f64| {
                let events = app.borrow_mut().frame(&mut ctx);
                if events.is_empty() {
                    return;
                }
                let app = app.borrow();
                for event in &events {
                    if let Some(message) = event.message() {
                        show_toast(&document, &message);
                    }
                }
                show_narration(&document, app.narration());
                if events
                    .iter()
                    .any(|e| matches!(e, GameEvent::ScoreRecorded(_)))
                {
                    update_leaderboard(&document, &app);
                }
            }));
        }

        RUNTIME.with(|rt| {
            *rt.borrow_mut() = Some(Runtime {
                scheduler,
                _bindings: bindings,
                _controls: controls,
                _wallet: subscription,
            })
        });
        setup_teardown(&window);

        log::info!("Gas Dodger running!");
    }

    fn show_toast(document: &Document, message: &str) {
        if let Some(el) = document.get_element_by_id("toast") {
            el.set_text_content(Some(message));
        }
    }

    fn show_narration(document: &Document, line: &str) {
        if let Some(el) = document.get_element_by_id("narrator") {
            el.set_text_content(Some(line));
        }
    }

    fn setup_fact_button(document: &Document, app: Rc<RefCell<GameApp>>, controls: &mut DomListeners) {
        let Some(btn) = document.get_element_by_id("fact-btn") else {
            return;
        };
        let document = document.clone();
        let result = controls.listen(&btn, "click", move |_event| {
            let fact = app.borrow_mut().crypto_fact();
            show_narration(&document, fact);
        });
        if let Err(err) = result {
            log::warn!("Fact button unavailable: {:?}", err);
        }
    }

    fn update_leaderboard(document: &Document, app: &GameApp) {
        let Some(list) = document.get_element_by_id("leaderboard") else {
            return;
        };
        let board: Leaderboard = app.leaderboard();
        list.set_text_content(None);
        if board.is_empty() {
            list.set_text_content(Some("No scores yet. Be the first!"));
        }
        for entry in &board.entries {
            let Ok(row) = document.create_element("li") else {
                continue;
            };
            row.set_text_content(Some(&format!(
                "{} {}  {}  Lv {}  {} MON  {}",
                entry.badge().label(),
                entry.name,
                format_score(entry.score),
                entry.level,
                entry.mon_collected,
                format_date(entry.timestamp),
            )));
            let _ = list.append_child(&row);
        }

        if let Some(el) = document.get_element_by_id("player-stats") {
            let rank = app
                .session()
                .current_user()
                .and_then(|user| board.rank_of(&user));
            let text = app.player_stats().map(|s| {
                let mut text = format!(
                    "Best {} | Games {} | MON {} | Level {}",
                    format_score(s.high_score),
                    s.games_played,
                    s.total_mon_collected,
                    s.best_level
                );
                if let Some(rank) = rank {
                    text.push_str(&format!(" | Rank #{rank}"));
                }
                text
            });
            el.set_text_content(text.as_deref());
        }
    }

    fn setup_music_controls(
        document: &Document,
        music: Rc<RefCell<MusicTrack>>,
    ) -> DomListeners {
        let mut controls = DomListeners::new();

        if let Some(btn) = document.get_element_by_id("music-toggle") {
            let music = music.clone();
            let btn_clone = btn.clone();
            let result = controls.listen(&btn, "click", move |_event| {
                let playing = music.borrow_mut().toggle();
                let label = if playing { "🎵 Pause Music" } else { "🎵 Play Music" };
                btn_clone.set_text_content(Some(label));
            });
            if let Err(err) = result {
                log::warn!("Music toggle unavailable: {:?}", err);
            }
        }

        if let Some(slider) = document
            .get_element_by_id("music-volume")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            slider.set_value(&music.borrow().volume().to_string());
            let slider_clone = slider.clone();
            let result = controls.listen(&slider, "input", move |_event| {
                match slider_clone.value().parse::<f32>() {
                    Ok(vol) => music.borrow_mut().set_volume(vol),
                    Err(_) => log::warn!("Ignoring volume value {:?}", slider_clone.value()),
                }
            });
            if let Err(err) = result {
                log::warn!("Music volume slider unavailable: {:?}", err);
            }
        }

        controls
    }

    /// Wallet button, silent restore on load and account change tracking.
    /// The connected address doubles as the identity scores are saved under.
    fn setup_wallet(
        document: &Document,
        app: Rc<RefCell<GameApp>>,
        wallet: Rc<RefCell<WalletSession>>,
        controls: &mut DomListeners,
    ) -> Option<AccountsSubscription> {
        let provider = match EthereumProvider::detect() {
            Ok(provider) => provider,
            Err(err) => {
                log::info!("{err}");
                return None;
            }
        };

        // Connect button
        if let Some(btn) = document.get_element_by_id("wallet-btn") {
            let provider = provider.clone();
            let app = app.clone();
            let wallet = wallet.clone();
            let document = document.clone();
            let result = controls.listen(&btn, "click", move |_event| {
                if !wallet.borrow_mut().begin_connect() {
                    return;
                }
                refresh_wallet(&document, &wallet.borrow());
                let provider = provider.clone();
                let app = app.clone();
                let wallet = wallet.clone();
                let document = document.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let result = provider.connect().await;
                    if let Err(err) = wallet.borrow_mut().finish_connect(result) {
                        log::warn!("Failed to connect wallet: {err}");
                        show_toast(&document, &err.to_string());
                    }
                    sync_identity(&app, &wallet.borrow());
                    refresh_wallet(&document, &wallet.borrow());
                    update_leaderboard(&document, &app.borrow());
                });
            });
            if let Err(err) = result {
                log::warn!("Wallet button unavailable: {:?}", err);
            }
        }

        // Already authorized?
        {
            let provider = provider.clone();
            let app = app.clone();
            let wallet = wallet.clone();
            let document = document.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = provider.restore().await;
                if let Err(err) = wallet.borrow_mut().finish_connect(result) {
                    log::warn!("Failed to check wallet connection: {err}");
                }
                sync_identity(&app, &wallet.borrow());
                refresh_wallet(&document, &wallet.borrow());
                update_leaderboard(&document, &app.borrow());
            });
        }

        let document = document.clone();
        match provider.on_accounts_changed(move |accounts| {
            if wallet.borrow_mut().accounts_changed(&accounts) {
                sync_identity(&app, &wallet.borrow());
                refresh_wallet(&document, &wallet.borrow());
                update_leaderboard(&document, &app.borrow());
            }
        }) {
            Ok(subscription) => Some(subscription),
            Err(err) => {
                log::warn!("Not tracking wallet account changes: {err}");
                None
            }
        }
    }

    fn sync_identity(app: &Rc<RefCell<GameApp>>, wallet: &WalletSession) {
        let mut app = app.borrow_mut();
        match wallet.account() {
            Some(account) => app.sign_in(UserId::new(account)),
            None => app.sign_out(),
        }
    }

    fn refresh_wallet(document: &Document, wallet: &WalletSession) {
        if let Some(btn) = document.get_element_by_id("wallet-btn") {
            btn.set_text_content(Some(&wallet.label()));
        }
    }

    /// Stop the loop and unregister every listener when the page unloads.
    /// A page entering the back/forward cache keeps its runtime so it resumes
    /// intact when shown again.
    fn setup_teardown(window: &web_sys::Window) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            let exit = event
                .dyn_ref::<web_sys::PageTransitionEvent>()
                .map(|e| PageExit::from_persisted(e.persisted()))
                .unwrap_or(PageExit::Unloaded);
            if !exit.releases_runtime() {
                log::info!("Page cached, keeping the game loop");
                return;
            }
            RUNTIME.with(|rt| {
                if let Some(mut runtime) = rt.borrow_mut().take() {
                    runtime.scheduler.stop();
                    log::info!("Gas Dodger stopped");
                }
            });
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::rc::Rc;

    use gas_dodger::audio::NullAudio;
    use gas_dodger::input::Direction;
    use gas_dodger::leaderboard::format_score;
    use gas_dodger::platform::{FrameScheduler, ManualScheduler};
    use gas_dodger::session::UserId;
    use gas_dodger::sim::{EntityKind, GameState};
    use gas_dodger::{GameApp, LocalScoreStore, Settings, Tuning};

    /// Two minutes at 60 Hz
    const MAX_FRAMES: u32 = 60 * 120;

    /// How far above the player a falling bomb counts as a threat
    const LOOKAHEAD: f32 = 160.0;

    /// Steer away from the closest bomb overhead, otherwise toward the
    /// nearest token
    pub fn autopilot(state: &GameState, tuning: &Tuning) -> Option<Direction> {
        let player = &state.player;
        let center = player.pos.x + player.size.x / 2.0;
        let margin = player.size.x / 2.0;

        let threat = state
            .entities
            .iter()
            .filter(|e| e.kind == EntityKind::GasBomb)
            .filter(|e| {
                e.pos.y + e.size.y > player.pos.y - LOOKAHEAD
                    && e.pos.y < player.pos.y + player.size.y
            })
            .filter(|e| {
                e.pos.x < player.pos.x + player.size.x + margin
                    && e.pos.x + e.size.x > player.pos.x - margin
            })
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

        if let Some(bomb) = threat {
            let bomb_center = bomb.pos.x + bomb.size.x / 2.0;
            let dodge = if bomb_center > center {
                Direction::Left
            } else {
                Direction::Right
            };
            // Pinned against a wall: go the other way
            return Some(match dodge {
                Direction::Left if player.pos.x <= 0.0 => Direction::Right,
                Direction::Right if player.pos.x >= tuning.player_max_x() => Direction::Left,
                d => d,
            });
        }

        let token = state
            .entities
            .iter()
            .filter(|e| e.kind == EntityKind::MonToken && e.pos.y < player.pos.y)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))?;
        let dx = token.pos.x + token.size.x / 2.0 - center;
        if dx.abs() <= tuning.player_speed {
            None
        } else if dx < 0.0 {
            Some(Direction::Left)
        } else {
            Some(Direction::Right)
        }
    }

    fn key_for(dir: Direction) -> &'static str {
        match dir {
            Direction::Left => "ArrowLeft",
            Direction::Right => "ArrowRight",
        }
    }

    pub fn run(seed: u64) {
        let app = Rc::new(RefCell::new(GameApp::new(
            Tuning::default(),
            Settings::default(),
            Box::new(LocalScoreStore::new()),
            Box::new(NullAudio),
            seed,
        )));
        app.borrow_mut().sign_in(UserId::new("autopilot"));

        let mut scheduler = ManualScheduler::default();
        {
            let app = app.clone();
            let mut held: Option<Direction> = None;
            scheduler.start(Box::new(move |_time| {
                let mut a = app.borrow_mut();
                let wanted = autopilot(a.state(), a.tuning());
                if wanted != held {
                    if let Some(dir) = held {
                        a.input_mut().key_up(key_for(dir));
                    }
                    if let Some(dir) = wanted {
                        a.input_mut().key_down(key_for(dir), false);
                    }
                    held = wanted;
                }
                for event in a.step() {
                    if let Some(message) = event.message() {
                        log::info!("{message}");
                    }
                }
            }));
        }

        let mut frames = 0;
        while frames < MAX_FRAMES && !app.borrow().state().is_game_over() {
            frames += scheduler.advance(1);
        }
        scheduler.stop();

        let mut a = app.borrow_mut();
        let state = a.state();
        log::info!(
            "Run finished after {} frames ({:.1}s): score {}, {} MON, level {}, {} lives left",
            frames,
            scheduler.time_ms() / 1000.0,
            format_score(state.score),
            state.mon_tokens,
            state.level(),
            state.lives
        );

        a.restart();
        for entry in &a.leaderboard().entries {
            log::info!(
                "{} {} {} (level {}, {} MON)",
                entry.badge().label(),
                entry.name,
                format_score(entry.score),
                entry.level,
                entry.mon_collected
            );
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Gas Dodger (native) starting...");
    log::info!("Native mode runs a headless autopilot - run with `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    headless::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
