//! Game state and core simulation types
//!
//! Everything one run needs lives in [`GameState`]; the tick and collision
//! passes mutate it in place.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arena::{Arena, Handle};
use super::background::Starfield;
use super::effects::{Effects, ScreenShake};
use super::enemy::{Enemy, EnemyVariant};
use super::error::InvariantRule;
use super::level::LevelSystem;
use super::loot::{Loot, LootKind};
use super::projectile::{Behavior, Projectile, ProjectileKind};
use super::ship::{Ship, Shot};
use super::upgrades::Loadout;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// PCG stream selector for the cosmetic generator
const FX_STREAM: u64 = 0xcafe;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Menu / armory, nothing simulated
    Ready,
    Playing,
    GameOver,
    Victory,
    /// A frame failed; no further frames are processed
    Halted,
}

impl GamePhase {
    /// Game over, victory and halt all stop the frame loop
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Victory | GamePhase::Halted)
    }
}

/// Things that happened during a frame, for the driver to present
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// Whole damage dealt, as shown to the player
    DamageNumber { pos: Vec2, amount: u32, crit: bool },
    EnemyDestroyed { variant: EnemyVariant, pos: Vec2 },
    ShipHit { damage: f32 },
    StageStarted { level: u32, stage: u32 },
    LevelStarted { level: u32 },
    CurrencyChanged { currency: u64 },
    LootCollected { kind: LootKind },
    GameOver { score: u64 },
    Victory { score: u64 },
}

/// Read-only view for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub score: u64,
    pub currency: u64,
    pub health: f32,
    pub max_health: f32,
    pub energy: f32,
    pub max_energy: f32,
    pub level: u32,
    pub stage: u32,
    pub defeated: u32,
    pub required: u32,
    pub phase: GamePhase,
    pub shake_offset: Vec2,
}

impl HudSnapshot {
    pub fn health_fraction(&self) -> f32 {
        fraction(self.health, self.max_health)
    }

    pub fn energy_fraction(&self) -> f32 {
        fraction(self.energy, self.max_energy)
    }
}

fn fraction(value: f32, max: f32) -> f32 {
    if max <= 0.0 {
        0.0
    } else {
        (value / max).clamp(0.0, 1.0)
    }
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Gameplay draws: spawns, elite rolls, crits, loot
    pub rng: Pcg32,
    /// Cosmetic draws: sparks, shake, stars. Never read by gameplay.
    pub fx_rng: Pcg32,
    pub tuning: Tuning,
    /// Viewport size in px
    pub bounds: Vec2,
    pub phase: GamePhase,
    pub score: u64,
    pub currency: u64,
    /// Set when currency changed and has not been persisted yet
    pub currency_dirty: bool,
    /// Simulated time since the run started
    pub elapsed_ms: f64,
    pub ship: Ship,
    pub enemies: Arena<Enemy>,
    pub projectiles: Arena<Projectile>,
    pub loot: Arena<Loot>,
    pub level: LevelSystem,
    /// Time since the last enemy spawn
    pub spawn_timer_ms: f32,
    pub effects: Effects,
    pub shake: ScreenShake,
    pub starfield: Starfield,
    /// Emit `DamageNumber` events
    pub damage_numbers: bool,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh run: ship entering from below, level 1 stage 1
    pub fn new(
        seed: u64,
        bounds: Vec2,
        loadout: Loadout,
        currency: u64,
        tuning: Tuning,
        settings: &Settings,
    ) -> Self {
        let rng = Pcg32::seed_from_u64(seed);
        let mut fx_rng = Pcg32::new(seed, FX_STREAM);
        let starfield = Starfield::new(bounds, &mut fx_rng);
        let ship = Ship::new(loadout, bounds, &tuning.ship);
        let level = LevelSystem::new(tuning.level.clone());

        Self {
            seed,
            rng,
            fx_rng,
            bounds,
            phase: GamePhase::Playing,
            score: 0,
            currency,
            currency_dirty: false,
            elapsed_ms: 0.0,
            ship,
            enemies: Arena::new(),
            projectiles: Arena::new(),
            loot: Arena::new(),
            level,
            spawn_timer_ms: 0.0,
            effects: Effects::new(settings.max_effects(), settings.trails()),
            shake: ScreenShake::new(settings.effective_screen_shake()),
            starfield,
            damage_numbers: settings.damage_numbers,
            events: Vec::new(),
            tuning,
        }
    }

    /// Apply presentation preferences mid-run
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.effects
            .configure(settings.max_effects(), settings.trails());
        self.shake.set_enabled(settings.effective_screen_shake());
        self.damage_numbers = settings.damage_numbers;
    }

    /// Viewport changed. The ship keeps its x but re-anchors to the new bottom.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.bounds = Vec2::new(width, height);
        self.ship.rest_y = height - self.tuning.ship.rest_offset;
        self.ship.pos.x = self
            .ship
            .pos
            .x
            .clamp(self.ship.radius, (width - self.ship.radius).max(self.ship.radius));
        if self.ship.motion == super::ship::ShipMotion::Flying {
            self.ship.pos.y = self.ship.rest_y;
        }
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn add_currency(&mut self, amount: u64) {
        if amount == 0 {
            return;
        }
        self.currency += amount;
        self.currency_dirty = true;
        self.emit(GameEvent::CurrencyChanged {
            currency: self.currency,
        });
    }

    pub fn spawn_shot(&mut self, shot: Shot) -> Handle {
        let mut projectile = Projectile::new(
            shot.kind,
            shot.behavior,
            shot.pos,
            shot.angle,
            shot.damage,
            &self.tuning.projectile,
        );
        projectile.crit = shot.crit;
        self.projectiles.insert(projectile)
    }

    pub fn spawn_enemy_laser(&mut self, pos: Vec2, angle: f32) -> Handle {
        let projectile = Projectile::new(
            ProjectileKind::EnemyLaser,
            Behavior::Normal,
            pos,
            angle,
            self.tuning.enemy.laser_damage,
            &self.tuning.projectile,
        );
        self.projectiles.insert(projectile)
    }

    /// Spawn an enemy scaled to the current stage
    pub fn spawn_enemy(&mut self, variant: EnemyVariant, pos: Vec2) -> Handle {
        let enemy = Enemy::spawn(variant, pos, self.level.config(), &self.tuning.enemy);
        if variant == EnemyVariant::Boss {
            log::info!("Boss spawned at level {}", self.level.level());
        }
        self.enemies.insert(enemy)
    }

    pub fn spawn_loot(&mut self, kind: LootKind, pos: Vec2) -> Handle {
        self.loot.insert(Loot::new(kind, pos, &self.tuning.loot))
    }

    /// Random loot drop at `pos`, if the drop roll succeeds
    pub fn roll_loot(&mut self, pos: Vec2) -> Option<Handle> {
        let chance = self.tuning.loot.drop_chance;
        if chance <= 0.0 || self.rng.random::<f32>() >= chance {
            return None;
        }
        let kind = LootKind::ALL[self.rng.random_range(0..LootKind::ALL.len())];
        Some(self.spawn_loot(kind, pos))
    }

    /// Enter game over. Only the first call has any effect.
    pub fn trigger_game_over(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        self.phase = GamePhase::GameOver;
        log::info!("Game over with score {}", self.score);
        self.emit(GameEvent::GameOver { score: self.score });
        true
    }

    pub fn trigger_victory(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        self.phase = GamePhase::Victory;
        log::info!("Victory with score {}", self.score);
        self.emit(GameEvent::Victory { score: self.score });
        true
    }

    pub fn hud(&self) -> HudSnapshot {
        let progress = self.level.progress();
        HudSnapshot {
            score: self.score,
            currency: self.currency,
            health: self.ship.health,
            max_health: self.ship.max_health,
            energy: self.ship.energy,
            max_energy: self.ship.max_energy,
            level: progress.level,
            stage: progress.stage,
            defeated: progress.defeated,
            required: progress.required,
            phase: self.phase,
            shake_offset: self.shake.offset(),
        }
    }

    /// End-of-frame consistency checks
    pub fn validate_invariants(&self) -> Result<(), InvariantRule> {
        if !self.ship.pos.is_finite() {
            return Err(InvariantRule::NonFinitePosition { entity: "ship" });
        }
        if !self.ship.health.is_finite() || self.ship.health > self.ship.max_health {
            return Err(InvariantRule::HealthAboveMax {
                health: self.ship.health,
                max: self.ship.max_health,
            });
        }
        if self.enemies.iter_active().any(|(_, e)| !e.pos.is_finite()) {
            return Err(InvariantRule::NonFinitePosition { entity: "enemy" });
        }
        if self.projectiles.iter_active().any(|(_, p)| !p.pos.is_finite()) {
            return Err(InvariantRule::NonFinitePosition { entity: "projectile" });
        }
        if self.loot.iter_active().any(|(_, l)| !l.pos.is_finite()) {
            return Err(InvariantRule::NonFinitePosition { entity: "loot" });
        }

        for (entity, count) in [
            ("enemy", self.enemies.pending_len()),
            ("projectile", self.projectiles.pending_len()),
            ("loot", self.loot.pending_len()),
        ] {
            if count > 0 {
                return Err(InvariantRule::StaleRemoval { entity, count });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::upgrades::UpgradeManager;

    fn state() -> GameState {
        GameState::new(
            1,
            Vec2::new(1280.0, 720.0),
            UpgradeManager::new().loadout(),
            0,
            Tuning::default(),
            &Settings::default(),
        )
    }

    #[test]
    fn test_new_run() {
        let state = state();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.ship.health, 100.0);
        assert!(state.enemies.is_empty());
        assert_eq!(state.hud().level, 1);
        assert_eq!(state.hud().required, 10);
        assert!(state.validate_invariants().is_ok());
    }

    #[test]
    fn test_game_over_once() {
        let mut state = state();
        state.score = 40;
        assert!(state.trigger_game_over());
        assert!(!state.trigger_game_over());
        assert!(!state.trigger_victory());
        assert_eq!(state.drain_events(), vec![GameEvent::GameOver { score: 40 }]);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_currency_marks_dirty() {
        let mut state = state();
        state.add_currency(0);
        assert!(!state.currency_dirty);
        state.add_currency(5);
        assert!(state.currency_dirty);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::CurrencyChanged { currency: 5 }]
        );
    }

    #[test]
    fn test_hud_fractions_clamp() {
        let mut state = state();
        state.ship.health = -20.0;
        assert_eq!(state.hud().health_fraction(), 0.0);
        state.ship.energy = 50.0;
        assert_eq!(state.hud().energy_fraction(), 0.5);
    }

    #[test]
    fn test_resize_reanchors_ship() {
        let mut state = state();
        state.ship.motion = crate::sim::ship::ShipMotion::Flying;
        state.ship.pos.x = 1200.0;
        state.resize(800.0, 600.0);
        assert_eq!(state.ship.rest_y, 450.0);
        assert_eq!(state.ship.pos, Vec2::new(780.0, 450.0));
    }

    #[test]
    fn test_loot_disabled_by_default() {
        let mut state = state();
        assert!(state.roll_loot(Vec2::ZERO).is_none());
        state.tuning.loot.drop_chance = 1.0;
        assert!(state.roll_loot(Vec2::ZERO).is_some());
        assert_eq!(state.loot.active_len(), 1);
    }

    #[test]
    fn test_invariants_catch_stale_and_bad_state() {
        let mut state = state();
        let h = state.spawn_enemy(EnemyVariant::Normal, Vec2::new(100.0, -50.0));
        state.enemies.mark_for_removal(h);
        assert_eq!(
            state.validate_invariants(),
            Err(InvariantRule::StaleRemoval {
                entity: "enemy",
                count: 1
            })
        );
        state.enemies.sweep();

        state.ship.health = 500.0;
        assert!(matches!(
            state.validate_invariants(),
            Err(InvariantRule::HealthAboveMax { .. })
        ));
        state.ship.health = 100.0;

        state.ship.pos.x = f32::NAN;
        assert_eq!(
            state.validate_invariants(),
            Err(InvariantRule::NonFinitePosition { entity: "ship" })
        );
    }
}
