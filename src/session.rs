//! Run lifecycle
//!
//! A [`GameSession`] owns one [`GameState`] plus everything that outlives a
//! run: the upgrade ledger, the currency balance, settings and the storage
//! they persist to. The driver calls [`GameSession::frame`] once per display
//! frame until it returns [`FrameOutcome::Stop`].

use glam::Vec2;

use crate::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH, MAX_FRAME_MS};
use crate::persistence::{ProgressStore, Storage};
use crate::settings::Settings;
use crate::sim::{
    FrameInput, GameEvent, GamePhase, GameState, HudSnapshot, SimError, UpgradeKind,
    UpgradeManager, tick,
};
use crate::tuning::Tuning;

/// Final numbers shown when a run stops
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub phase: GamePhase,
    pub score: u64,
    pub currency: u64,
    pub level: u32,
    pub stage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    Continue,
    /// The run is over (or halted); stop scheduling frames
    Stop(RunSummary),
}

pub struct GameSession<S: Storage> {
    state: GameState,
    upgrades: UpgradeManager,
    store: ProgressStore<S>,
    settings: Settings,
    tuning: Tuning,
    /// One-shot message for the player after a failure
    notice: Option<String>,
}

impl<S: Storage> GameSession<S> {
    /// Load progress and settings; nothing is simulated until [`start`](Self::start)
    pub fn new(storage: S, tuning: Tuning, seed: u64) -> Self {
        let store = ProgressStore::new(storage);
        let currency = store.load_currency();
        let upgrades = store.load_upgrades();
        let settings = Settings::load(store.storage());

        let mut state = GameState::new(
            seed,
            Vec2::new(DEFAULT_WIDTH, DEFAULT_HEIGHT),
            upgrades.loadout(),
            currency,
            tuning.clone(),
            &settings,
        );
        state.phase = GamePhase::Ready;
        log::info!("Session ready with {} currency", currency);

        Self {
            state,
            upgrades,
            store,
            settings,
            tuning,
            notice: None,
        }
    }

    /// Begin a run with the current upgrades. Refused once halted.
    pub fn start(&mut self, seed: u64) -> bool {
        if self.state.phase == GamePhase::Halted {
            log::warn!("Session halted; reload to play again");
            return false;
        }
        let bounds = self.state.bounds;
        self.state = GameState::new(
            seed,
            bounds,
            self.upgrades.loadout(),
            self.state.currency,
            self.tuning.clone(),
            &self.settings,
        );
        log::info!("Run started with seed {}", seed);
        true
    }

    /// Start over after game over or victory
    pub fn restart(&mut self, seed: u64) -> bool {
        log::info!("Restarting after {:?}", self.state.phase);
        self.start(seed)
    }

    /// Advance one display frame
    pub fn frame(&mut self, dt_ms: f32, input: &FrameInput) -> FrameOutcome {
        match self.state.phase {
            GamePhase::Ready => return FrameOutcome::Continue,
            GamePhase::Playing => {}
            GamePhase::GameOver | GamePhase::Victory | GamePhase::Halted => {
                return FrameOutcome::Stop(self.summary());
            }
        }

        // Long gaps (tab switches) are clamped; bad values go through to be rejected
        let dt_ms = if dt_ms.is_finite() {
            dt_ms.min(MAX_FRAME_MS)
        } else {
            dt_ms
        };

        if let Err(e) = tick(&mut self.state, input, dt_ms) {
            self.halt(e);
            return FrameOutcome::Stop(self.summary());
        }
        self.persist_currency();

        if self.state.phase.is_terminal() {
            log::info!(
                "Run ended: {:?}, score {}",
                self.state.phase,
                self.state.score
            );
            FrameOutcome::Stop(self.summary())
        } else {
            FrameOutcome::Continue
        }
    }

    fn halt(&mut self, error: SimError) {
        log::error!("Frame update failed: {}", error);
        self.state.phase = GamePhase::Halted;
        self.notice = Some(format!(
            "The game stopped because of an internal error ({}). Reload the page to play again.",
            error
        ));
        self.persist_currency();
    }

    fn persist_currency(&mut self) {
        if self.state.currency_dirty {
            self.store.save_currency(self.state.currency);
            self.state.currency_dirty = false;
        }
    }

    /// User-visible failure message; returned once
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Spend currency on an upgrade. Applies from the next run.
    pub fn buy_upgrade(&mut self, kind: UpgradeKind) -> bool {
        if !self.upgrades.buy(kind, &mut self.state.currency) {
            return false;
        }
        self.store.save_upgrades(&self.upgrades);
        self.store.save_currency(self.state.currency);
        self.state.currency_dirty = false;
        self.state.emit(GameEvent::CurrencyChanged {
            currency: self.state.currency,
        });
        true
    }

    pub fn upgrade_cost(&self, kind: UpgradeKind) -> Option<u64> {
        self.upgrades.cost(kind)
    }

    pub fn upgrades(&self) -> &UpgradeManager {
        &self.upgrades
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace, persist and apply settings
    pub fn set_settings(&mut self, settings: Settings) {
        settings.save(self.store.storage_mut());
        self.state.apply_settings(&settings);
        self.settings = settings;
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.resize(width, height);
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn currency(&self) -> u64 {
        self.state.currency
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn storage(&self) -> &S {
        self.store.storage()
    }

    pub fn hud(&self) -> HudSnapshot {
        self.state.hud()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            phase: self.state.phase,
            score: self.state.score,
            currency: self.state.currency,
            level: self.state.level.level(),
            stage: self.state.level.stage(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use crate::persistence::progress::{CURRENCY_KEY, UPGRADES_KEY};

    fn session_with(currency: u64) -> GameSession<MemoryStorage> {
        let mut storage = MemoryStorage::new();
        storage
            .set_item(CURRENCY_KEY, &currency.to_string())
            .expect("memory storage");
        GameSession::new(storage, Tuning::default(), 1)
    }

    #[test]
    fn test_ready_does_not_simulate() {
        let mut session = session_with(0);
        assert_eq!(session.phase(), GamePhase::Ready);
        assert_eq!(
            session.frame(16.0, &FrameInput::default()),
            FrameOutcome::Continue
        );
        assert_eq!(session.state().elapsed_ms, 0.0);
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let mut session = session_with(0);
        session.start(2);
        session.frame(5_000.0, &FrameInput::default());
        assert_eq!(session.state().elapsed_ms, MAX_FRAME_MS as f64);
    }

    #[test]
    fn test_purchase_persists_and_applies_next_run() {
        let mut session = session_with(150);
        session.start(3);
        assert!(session.buy_upgrade(UpgradeKind::Hull));
        assert_eq!(session.currency(), 50);
        // Current run keeps its snapshot
        assert_eq!(session.state().ship.max_health, 100.0);

        let stored = session.storage();
        assert_eq!(stored.get_item(CURRENCY_KEY).expect("get"), Some("50".into()));
        let ledger = stored.get_item(UPGRADES_KEY).expect("get").expect("ledger");
        assert!(ledger.contains("\"hull\":2"));

        session.restart(4);
        assert_eq!(session.state().ship.max_health, 120.0);
        assert_eq!(session.currency(), 50);
        assert!(!session.buy_upgrade(UpgradeKind::Hull));
    }

    #[test]
    fn test_halts_on_bad_frame() {
        let mut session = session_with(0);
        session.start(5);
        let outcome = session.frame(f32::NAN, &FrameInput::default());
        assert!(matches!(outcome, FrameOutcome::Stop(RunSummary { phase: GamePhase::Halted, .. })));
        assert!(session.take_notice().is_some());
        assert!(session.take_notice().is_none());

        assert!(matches!(
            session.frame(16.0, &FrameInput::default()),
            FrameOutcome::Stop(_)
        ));
        assert!(!session.start(6));
        assert_eq!(session.phase(), GamePhase::Halted);
    }

    #[test]
    fn test_settings_round_trip() {
        let mut session = session_with(0);
        let mut settings = Settings::default();
        settings.screen_shake = false;
        session.set_settings(settings.clone());
        assert_eq!(Settings::load(session.storage()), settings);
    }
}
