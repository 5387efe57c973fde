//! Collectible drops

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::LootTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LootKind {
    Shield,
    Speed,
    Weapon,
    Currency,
}

impl LootKind {
    pub const ALL: [LootKind; 4] = [
        LootKind::Shield,
        LootKind::Speed,
        LootKind::Weapon,
        LootKind::Currency,
    ];

    pub fn color(&self) -> u32 {
        match self {
            LootKind::Shield => 0x00ffff,
            LootKind::Speed => 0xffff00,
            LootKind::Weapon => 0xff00ff,
            LootKind::Currency => 0xffd700,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Loot {
    pub kind: LootKind,
    pub pos: Vec2,
    pub radius: f32,
    pub life_ms: f32,
}

impl Loot {
    pub fn new(kind: LootKind, pos: Vec2, tuning: &LootTuning) -> Self {
        Self {
            kind,
            pos,
            radius: tuning.radius,
            life_ms: tuning.life_ms,
        }
    }

    /// Fall, get pulled toward the ship inside the magnet radius, and age.
    /// Returns true once the lifetime has run out.
    pub fn update(&mut self, dt_ms: f32, ship_pos: Vec2, tuning: &LootTuning) -> bool {
        let dt = dt_ms / 1000.0;
        self.life_ms -= dt_ms;

        self.pos.y += tuning.fall_speed * dt;

        let to_ship = ship_pos - self.pos;
        let dist = to_ship.length();
        if dist < tuning.magnet_radius && dist > f32::EPSILON {
            self.pos += to_ship / dist * tuning.magnet_speed * dt;
        }

        self.life_ms <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falls_when_ship_is_far() {
        let tuning = LootTuning::default();
        let mut loot = Loot::new(LootKind::Currency, Vec2::new(100.0, 100.0), &tuning);
        assert!(!loot.update(1000.0, Vec2::new(1000.0, 1000.0), &tuning));
        assert_eq!(loot.pos, Vec2::new(100.0, 150.0));
    }

    #[test]
    fn test_magnet_pulls_toward_ship() {
        let tuning = LootTuning::default();
        let mut loot = Loot::new(LootKind::Shield, Vec2::new(100.0, 100.0), &tuning);
        loot.update(100.0, Vec2::new(300.0, 105.0), &tuning);
        // 5 px of fall then 50 px straight along +x
        assert!((loot.pos.x - 150.0).abs() < 1e-3);
        assert!((loot.pos.y - 105.0).abs() < 1e-3);
    }

    #[test]
    fn test_expires() {
        let tuning = LootTuning::default();
        let mut loot = Loot::new(LootKind::Weapon, Vec2::ZERO, &tuning);
        assert!(!loot.update(9_000.0, Vec2::new(5000.0, 0.0), &tuning));
        assert!(loot.update(1_000.0, Vec2::new(5000.0, 0.0), &tuning));
    }
}
