//! Alien Hunter entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use alien_hunter::consts::FIRST_FRAME_MS;
    use alien_hunter::persistence::LocalStorage;
    use alien_hunter::platform::{InputState, MouseButton};
    use alien_hunter::sim::{GameEvent, GamePhase, UpgradeKind};
    use alien_hunter::{FrameOutcome, GameSession, Settings, Tuning};

    /// Game instance holding all state
    struct Game {
        session: GameSession<LocalStorage>,
        input: InputState,
        last_time: f64,
        /// A frame callback is scheduled
        running: bool,
        /// HUD elements already reported missing
        missing: HashSet<&'static str>,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            Self {
                session: GameSession::new(LocalStorage, Tuning::default(), seed),
                input: InputState::new(),
                last_time: 0.0,
                running: false,
                missing: HashSet::new(),
            }
        }

        /// Set text on an element; a missing element is logged once and skipped
        fn set_text(&mut self, document: &Document, id: &'static str, text: &str) {
            match document.get_element_by_id(id) {
                Some(el) => el.set_text_content(Some(text)),
                None => {
                    if self.missing.insert(id) {
                        log::warn!("HUD element #{} not found", id);
                    }
                }
            }
        }

        fn set_visible(&mut self, document: &Document, id: &'static str, visible: bool) {
            match document.get_element_by_id(id) {
                Some(el) => {
                    let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                }
                None => {
                    if self.missing.insert(id) {
                        log::warn!("Element #{} not found", id);
                    }
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self, document: &Document) {
            let hud = self.session.hud();
            self.set_text(document, "hud-score", &hud.score.to_string());
            self.set_text(document, "hud-currency", &hud.currency.to_string());
            self.set_text(document, "hud-level", &hud.level.to_string());
            self.set_text(document, "hud-stage", &hud.stage.to_string());
            self.set_text(
                document,
                "hud-progress",
                &format!("{}/{}", hud.defeated, hud.required),
            );
            self.set_text(
                document,
                "hud-health",
                &format!("{:.0}%", hud.health_fraction() * 100.0),
            );
            self.set_text(
                document,
                "hud-energy",
                &format!("{:.0}%", hud.energy_fraction() * 100.0),
            );
        }

        fn update_quality_label(&mut self, document: &Document) {
            let quality = self.session.settings().quality;
            self.set_text(
                document,
                "quality-btn",
                &format!("Quality: {}", quality.as_str()),
            );
        }

        /// Step to the next quality preset and persist it
        fn cycle_quality(&mut self, document: &Document) {
            let settings = Settings {
                quality: self.session.settings().quality.next(),
                ..self.session.settings().clone()
            };
            log::info!("Quality set to {}", settings.quality.as_str());
            self.session.set_settings(settings);
            self.update_quality_label(document);
        }

        fn update_armory(&mut self, document: &Document) {
            for kind in UpgradeKind::ALL {
                let level = self.session.upgrades().level(kind);
                let cost = match self.session.upgrade_cost(kind) {
                    Some(cost) => cost.to_string(),
                    None => "MAX".to_string(),
                };
                if let Some(el) = document.get_element_by_id(&format!("upgrade-{}", kind.id())) {
                    el.set_text_content(Some(&format!(
                        "{} Lv {} ({})",
                        kind.def().name,
                        level,
                        cost
                    )));
                }
            }
        }

        fn handle_events(&mut self, document: &Document) {
            for event in self.session.drain_events() {
                match event {
                    GameEvent::StageStarted { level, stage } => {
                        log::info!("Stage {}-{} started", level, stage);
                    }
                    GameEvent::LevelStarted { level } => log::info!("Level {} started", level),
                    GameEvent::GameOver { score } | GameEvent::Victory { score } => {
                        self.set_text(document, "final-score", &score.to_string());
                    }
                    _ => {}
                }
            }
        }

        fn show_end_screen(&mut self, document: &Document) {
            let phase = self.session.phase();
            self.set_visible(document, "game-over", phase == GamePhase::GameOver);
            self.set_visible(document, "victory", phase == GamePhase::Victory);
            if let Some(notice) = self.session.take_notice() {
                self.set_text(document, "error-notice", &notice);
                self.set_visible(document, "error-notice", true);
            }
            self.set_visible(document, "armory", phase != GamePhase::Halted);
            self.update_armory(document);
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Alien Hunter starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document; cannot start");
            return;
        };

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));

        match document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        {
            Some(canvas) => {
                let (w, h) = (canvas.client_width(), canvas.client_height());
                if w > 0 && h > 0 {
                    canvas.set_width(w as u32);
                    canvas.set_height(h as u32);
                    game.borrow_mut().session.resize(w as f32, h as f32);
                }
                setup_pointer(&canvas, game.clone());
            }
            None => log::warn!("No #canvas element; using default viewport"),
        }

        setup_keyboard(game.clone());
        setup_buttons(&document, game.clone());

        {
            let mut g = game.borrow_mut();
            g.update_armory(&document);
            g.update_hud(&document);
            g.update_quality_label(&document);
        }

        log::info!("Alien Hunter ready (seed {})", seed);
    }

    fn setup_pointer(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse move - absolute position in canvas space
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                game.borrow_mut().input.pointer_moved(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for (name, down) in [("mousedown", true), ("mouseup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut()
                    .input
                    .button(MouseButton::from_dom(event.button()), down);
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Right button fires missiles, not the context menu
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                event.prevent_default();
            });
            let _ = canvas
                .add_event_listener_with_callback("contextmenu", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        for (name, down) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                if code == "Space" {
                    event.prevent_default();
                }
                let mut g = game.borrow_mut();
                if down {
                    g.input.key_down(&code);
                } else {
                    g.input.key_up(&code);
                }
            });
            let _ = window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur (click outside) - drop held keys
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().input.release_all();
            });
            let _ = window
                .add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        for id in ["start-btn", "restart-btn"] {
            let Some(btn) = document.get_element_by_id(id) else {
                log::warn!("Button #{} not found", id);
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                start_run(game.clone());
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        match document.get_element_by_id("quality-btn") {
            Some(btn) => {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                        game.borrow_mut().cycle_quality(&document);
                    }
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
            None => log::warn!("Button #quality-btn not found"),
        }

        for kind in UpgradeKind::ALL {
            let Some(btn) = document.get_element_by_id(&format!("upgrade-{}", kind.id())) else {
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.session.buy_upgrade(kind)
                    && let Some(document) = web_sys::window().and_then(|w| w.document())
                {
                    g.update_armory(&document);
                    g.update_hud(&document);
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn start_run(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            if g.session.phase() == GamePhase::Playing {
                return;
            }
            let seed = js_sys::Date::now() as u64;
            let started = if g.session.phase() == GamePhase::Ready {
                g.session.start(seed)
            } else {
                g.session.restart(seed)
            };
            if !started {
                return;
            }
            g.last_time = 0.0;
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                for id in ["game-over", "victory", "armory"] {
                    g.set_visible(&document, id, false);
                }
            }
            if g.running {
                return;
            }
            g.running = true;
        }
        request_animation_frame(game);
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let outcome = {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt_ms = if g.last_time > 0.0 {
                (time - g.last_time) as f32
            } else {
                FIRST_FRAME_MS
            };
            g.last_time = time;

            let input = g.input.frame_input();
            let outcome = g.session.frame(dt_ms, &input);
            g.handle_events(&document);
            g.update_hud(&document);
            outcome
        };

        match outcome {
            FrameOutcome::Continue => request_animation_frame(game),
            FrameOutcome::Stop(summary) => {
                let mut g = game.borrow_mut();
                g.running = false;
                log::info!(
                    "Stopped: {:?} at level {} stage {} with score {}",
                    summary.phase,
                    summary.level,
                    summary.stage,
                    summary.score
                );
                g.show_end_screen(&document);
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use alien_hunter::persistence::MemoryStorage;
    use alien_hunter::platform::autopilot;
    use alien_hunter::sim::{GameEvent, UpgradeKind};
    use alien_hunter::{FrameOutcome, GameSession, QualityPreset, Settings, Tuning};

    env_logger::init();
    log::info!("Alien Hunter (native) starting...");
    log::info!("Native mode runs a headless autopilot demo - build for wasm32 to play");

    // Optional balance overrides: path to a (partial) JSON tuning document
    let tuning = match std::env::var("ALIEN_HUNTER_TUNING") {
        Ok(path) => match std::fs::read_to_string(&path) {
            Ok(json) => match Tuning::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path);
                    tuning
                }
                Err(e) => {
                    log::warn!("Ignoring tuning file {}: {}", path, e);
                    Tuning::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read tuning file {}: {}", path, e);
                Tuning::default()
            }
        },
        Err(_) => Tuning::default(),
    };

    const FRAME_MS: f32 = 1000.0 / 60.0;
    // Ten minutes of simulated play per run
    const MAX_FRAMES: u32 = 60 * 60 * 10;

    let mut session = GameSession::new(MemoryStorage::new(), tuning, 0);

    if let Ok(name) = std::env::var("ALIEN_HUNTER_QUALITY") {
        match QualityPreset::parse(&name) {
            Some(preset) => {
                log::info!("Quality preset: {}", preset.as_str());
                session.set_settings(Settings::from_preset(preset));
            }
            None => log::warn!("Unknown quality preset '{}'", name),
        }
    }

    for run in 1..=3u64 {
        session.start(run);
        let mut kills = 0;
        let mut outcome = FrameOutcome::Continue;
        for _ in 0..MAX_FRAMES {
            let input = autopilot(session.state());
            outcome = session.frame(FRAME_MS, &input);
            kills += session
                .drain_events()
                .iter()
                .filter(|e| matches!(e, GameEvent::EnemyDestroyed { .. }))
                .count();
            if matches!(outcome, FrameOutcome::Stop(_)) {
                break;
            }
        }

        let summary = session.summary();
        println!(
            "Run {}: {:?} - score {}, {} kills, level {} stage {}, currency {}{}",
            run,
            summary.phase,
            summary.score,
            kills,
            summary.level,
            summary.stage,
            summary.currency,
            if outcome == FrameOutcome::Continue { " (time limit)" } else { "" }
        );

        // Spend everything on the cheapest upgrades before the next run
        while let Some(kind) = UpgradeKind::ALL
            .into_iter()
            .filter_map(|k| session.upgrade_cost(k).map(|c| (k, c)))
            .filter(|&(_, cost)| cost <= session.currency())
            .min_by_key(|&(_, cost)| cost)
            .map(|(k, _)| k)
        {
            session.buy_upgrade(kind);
            println!("  bought {}", kind.def().name);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
