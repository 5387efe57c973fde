//! Enemy ships

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::StageConfig;
use crate::tuning::EnemyTuning;
use crate::vec_angle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyVariant {
    Normal,
    Elite,
    Boss,
}

impl EnemyVariant {
    /// Explosion tint
    pub fn color(&self) -> u32 {
        match self {
            EnemyVariant::Normal => 0xff0000,
            EnemyVariant::Elite => 0xffaa00,
            EnemyVariant::Boss => 0xff00ff,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub variant: EnemyVariant,
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub health: f32,
    pub score_value: u32,
    /// Heading toward the ship (radians)
    pub facing: f32,
    pub fire_interval_ms: f32,
    /// Time since the last shot
    pub since_shot_ms: f32,
    /// Remaining hit tint
    pub flash_ms: f32,
}

impl Enemy {
    /// Build an enemy from the current stage scaling
    pub fn spawn(
        variant: EnemyVariant,
        pos: Vec2,
        stage: &StageConfig,
        tuning: &EnemyTuning,
    ) -> Self {
        let v = tuning.variant(variant);
        Self {
            variant,
            pos,
            radius: v.radius,
            speed: stage.enemy_speed * v.speed_mult,
            health: stage.enemy_health * v.health_mult,
            score_value: stage.enemy_score * v.score_mult,
            facing: std::f32::consts::FRAC_PI_2,
            fire_interval_ms: v.fire_interval_ms,
            since_shot_ms: 0.0,
            flash_ms: 0.0,
        }
    }

    /// Chase the ship, hold at stop distance, and decide whether to fire.
    /// Returns the firing heading when a shot is due.
    pub fn update(
        &mut self,
        dt_ms: f32,
        ship_pos: Vec2,
        screen_height: f32,
        tuning: &EnemyTuning,
    ) -> Option<f32> {
        let dt = dt_ms / 1000.0;
        let to_ship = ship_pos - self.pos;
        let dist = to_ship.length();
        self.facing = vec_angle(to_ship);

        if dist > tuning.stop_distance {
            self.pos += to_ship / dist * self.speed * dt;
        }

        self.since_shot_ms += dt_ms;
        let on_screen =
            self.pos.y > -tuning.fire_margin && self.pos.y < screen_height + tuning.fire_margin;
        let shot = if on_screen && self.since_shot_ms > self.fire_interval_ms {
            self.since_shot_ms = 0.0;
            Some(self.facing)
        } else {
            None
        };

        if self.flash_ms > 0.0 {
            self.flash_ms = (self.flash_ms - dt_ms).max(0.0);
        }

        shot
    }

    /// Register a hit: tint and subtract damage. Returns true if this hit killed it.
    pub fn take_hit(&mut self, damage: f32, flash_ms: f32) -> bool {
        self.health -= damage;
        self.flash_ms = flash_ms;
        self.health <= 0.0
    }

    pub fn is_flashing(&self) -> bool {
        self.flash_ms > 0.0
    }

    /// Whether the enemy has strayed `margin` beyond the screen
    pub fn is_far_off_screen(&self, width: f32, height: f32, margin: f32) -> bool {
        self.pos.x < -margin
            || self.pos.x > width + margin
            || self.pos.y < -margin
            || self.pos.y > height + margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::LevelTuning;

    fn stage() -> StageConfig {
        StageConfig::compute(&LevelTuning::default(), 1, 1)
    }

    #[test]
    fn test_variant_scaling() {
        let tuning = EnemyTuning::default();
        let normal = Enemy::spawn(EnemyVariant::Normal, Vec2::ZERO, &stage(), &tuning);
        let elite = Enemy::spawn(EnemyVariant::Elite, Vec2::ZERO, &stage(), &tuning);
        let boss = Enemy::spawn(EnemyVariant::Boss, Vec2::ZERO, &stage(), &tuning);

        assert_eq!((normal.radius, normal.health, normal.score_value), (25.0, 30.0, 10));
        assert_eq!((elite.radius, elite.health, elite.score_value), (35.0, 90.0, 50));
        assert!((elite.speed - 120.0).abs() < 1e-4);
        assert_eq!((boss.radius, boss.health, boss.score_value), (60.0, 600.0, 500));
        assert_eq!(boss.fire_interval_ms, 500.0);
    }

    #[test]
    fn test_chases_until_stop_distance() {
        let tuning = EnemyTuning::default();
        let start = Vec2::new(100.0, 0.0);
        let mut enemy = Enemy::spawn(EnemyVariant::Normal, start, &stage(), &tuning);
        enemy.update(100.0, Vec2::new(100.0, 500.0), 720.0, &tuning);
        // 100 px/s for 0.1 s straight down
        assert!((enemy.pos.y - 10.0).abs() < 1e-3);
        assert!((enemy.facing - std::f32::consts::FRAC_PI_2).abs() < 1e-5);

        enemy.pos = Vec2::new(100.0, 350.0);
        enemy.update(100.0, Vec2::new(100.0, 500.0), 720.0, &tuning);
        assert_eq!(enemy.pos, Vec2::new(100.0, 350.0));
    }

    #[test]
    fn test_fires_on_interval_only_when_visible() {
        let tuning = EnemyTuning::default();
        let start = Vec2::new(0.0, -80.0);
        let mut enemy = Enemy::spawn(EnemyVariant::Normal, start, &stage(), &tuning);
        enemy.speed = 0.0;
        assert_eq!(enemy.update(2500.0, Vec2::new(0.0, 600.0), 720.0, &tuning), None);

        enemy.pos.y = 100.0;
        let shot = enemy.update(10.0, Vec2::new(0.0, 600.0), 720.0, &tuning);
        assert!(shot.is_some());
        assert_eq!(enemy.since_shot_ms, 0.0);
        assert_eq!(enemy.update(1000.0, Vec2::new(0.0, 600.0), 720.0, &tuning), None);
    }

    #[test]
    fn test_hit_flash_decays() {
        let tuning = EnemyTuning::default();
        let mut enemy = Enemy::spawn(EnemyVariant::Normal, Vec2::ZERO, &stage(), &tuning);
        assert!(!enemy.take_hit(10.0, 100.0));
        assert!(enemy.is_flashing());
        enemy.update(60.0, Vec2::new(0.0, 100.0), 720.0, &tuning);
        assert!(enemy.is_flashing());
        enemy.update(60.0, Vec2::new(0.0, 100.0), 720.0, &tuning);
        assert!(!enemy.is_flashing());
        assert!(enemy.take_hit(20.0, 100.0));
    }
}
