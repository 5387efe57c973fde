//! Level/stage progression and difficulty curve
//!
//! Each level has `max_stages` stages. Clearing a stage takes
//! `enemies_required` kills; clearing the last stage advances the level, and
//! clearing the last level wins the game.

use rand::Rng;

use super::enemy::EnemyVariant;
use crate::tuning::LevelTuning;

/// Derived per-stage difficulty. A pure function of (level, stage).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageConfig {
    pub enemies_required: u32,
    pub spawn_interval_ms: u32,
    pub enemy_health: f32,
    pub enemy_speed: f32,
    pub enemy_score: u32,
    pub is_boss_stage: bool,
}

impl StageConfig {
    pub fn compute(tuning: &LevelTuning, level: u32, stage: u32) -> Self {
        let l = level.saturating_sub(1);
        let s = stage.saturating_sub(1);

        let is_boss_stage = stage == tuning.max_stages
            && tuning.boss_level_every > 0
            && level % tuning.boss_level_every == 0;

        let mut config = Self {
            enemies_required: 10 + 5 * l + 2 * s,
            spawn_interval_ms: 2000u32.saturating_sub(200 * l + 100 * s).max(500),
            enemy_health: 30.0 + 10.0 * l as f32 + 5.0 * s as f32,
            enemy_speed: 100.0 + 10.0 * l as f32 + 5.0 * s as f32,
            enemy_score: 10 + 5 * l,
            is_boss_stage,
        };

        if is_boss_stage {
            config.enemies_required = 1;
            config.spawn_interval_ms = tuning.boss_spawn_interval_ms;
        }
        config
    }
}

/// Result of recording a kill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Still inside the current stage
    Continue,
    StageStarted { level: u32, stage: u32 },
    LevelStarted { level: u32 },
    /// Last stage of the last level cleared
    Victory,
}

/// Read-only progress counters for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressCounts {
    pub level: u32,
    pub stage: u32,
    pub defeated: u32,
    pub required: u32,
}

#[derive(Debug, Clone)]
pub struct LevelSystem {
    tuning: LevelTuning,
    level: u32,
    stage: u32,
    enemies_defeated: u32,
    config: StageConfig,
    complete: bool,
}

impl LevelSystem {
    pub fn new(tuning: LevelTuning) -> Self {
        let config = StageConfig::compute(&tuning, 1, 1);
        Self {
            tuning,
            level: 1,
            stage: 1,
            enemies_defeated: 0,
            config,
            complete: false,
        }
    }

    /// Start over from level 1, stage 1
    pub fn reset(&mut self) {
        self.level = 1;
        self.stage = 1;
        self.complete = false;
        self.update_stage_config();
    }

    /// Recompute the stage config and clear the kill counter
    pub fn update_stage_config(&mut self) {
        self.config = StageConfig::compute(&self.tuning, self.level, self.stage);
        self.enemies_defeated = 0;
        log::info!(
            "Level {} Stage {} config: {} kills, spawn every {}ms{}",
            self.level,
            self.stage,
            self.config.enemies_required,
            self.config.spawn_interval_ms,
            if self.config.is_boss_stage { " (BOSS)" } else { "" }
        );
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn stage(&self) -> u32 {
        self.stage
    }

    pub fn enemies_defeated(&self) -> u32 {
        self.enemies_defeated
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    pub fn progress(&self) -> ProgressCounts {
        ProgressCounts {
            level: self.level,
            stage: self.stage,
            defeated: self.enemies_defeated,
            required: self.config.enemies_required,
        }
    }

    /// Record a kill and advance the stage/level when the quota is met
    pub fn enemy_defeated(&mut self) -> Progress {
        if self.complete {
            return Progress::Victory;
        }
        self.enemies_defeated += 1;
        if self.enemies_defeated >= self.config.enemies_required {
            self.complete_stage()
        } else {
            Progress::Continue
        }
    }

    fn complete_stage(&mut self) -> Progress {
        log::info!("Stage {} complete", self.stage);
        self.stage += 1;
        self.enemies_defeated = 0;

        if self.stage > self.tuning.max_stages {
            self.complete_level()
        } else {
            self.update_stage_config();
            Progress::StageStarted {
                level: self.level,
                stage: self.stage,
            }
        }
    }

    fn complete_level(&mut self) -> Progress {
        log::info!("Level {} complete", self.level);
        self.level += 1;
        self.stage = 1;

        if self.level > self.tuning.max_levels {
            self.complete = true;
            Progress::Victory
        } else {
            self.update_stage_config();
            Progress::LevelStarted { level: self.level }
        }
    }

    /// Variant for the next spawn
    pub fn next_enemy_type(&self, rng: &mut impl Rng) -> EnemyVariant {
        if self.config.is_boss_stage && self.enemies_defeated == 0 {
            return EnemyVariant::Boss;
        }

        let elite_chance =
            self.tuning.elite_base_chance + self.level as f32 * self.tuning.elite_chance_per_level;
        if rng.random::<f32>() < elite_chance {
            EnemyVariant::Elite
        } else {
            EnemyVariant::Normal
        }
    }

    #[cfg(test)]
    pub(crate) fn jump_to(&mut self, level: u32, stage: u32) {
        self.level = level;
        self.stage = stage;
        self.update_stage_config();
    }
}
