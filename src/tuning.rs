//! Data-driven game balance
//!
//! Every number here can be overridden from a JSON document; fields that are
//! left out keep their defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sim::{EnemyVariant, ProjectileKind};

/// Player ship tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipTuning {
    pub radius: f32,
    /// Distance above the bottom edge where the entry animation stops
    pub rest_offset: f32,
    /// Spawn distance below the bottom edge
    pub spawn_offset: f32,
    /// Entry animation climb speed (px/s)
    pub entry_speed: f32,
    pub max_energy: f32,
    /// Energy regenerated per second
    pub energy_regen: f32,
    pub dash_cost: f32,
    pub dash_duration_ms: f32,
    pub dash_speed_multiplier: f32,
    pub missile_cooldown_ms: f32,
    /// Angle between neighbouring multishot projectiles (radians)
    pub multishot_spread: f32,
    /// Damage taken when ramming an enemy
    pub ram_damage: f32,
    pub shield_duration_ms: f32,
    pub shield_charge: f32,
    pub speed_boost_duration_ms: f32,
    pub speed_boost_multiplier: f32,
}

impl Default for ShipTuning {
    fn default() -> Self {
        Self {
            radius: 20.0,
            rest_offset: 150.0,
            spawn_offset: 100.0,
            entry_speed: 100.0,
            max_energy: 100.0,
            energy_regen: 15.0,
            dash_cost: 30.0,
            dash_duration_ms: 200.0,
            dash_speed_multiplier: 3.0,
            missile_cooldown_ms: 1000.0,
            multishot_spread: 0.1,
            ram_damage: 20.0,
            shield_duration_ms: 5000.0,
            shield_charge: 100.0,
            speed_boost_duration_ms: 5000.0,
            speed_boost_multiplier: 2.0,
        }
    }
}

/// Per-variant enemy multipliers and fixed stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantTuning {
    pub radius: f32,
    pub speed_mult: f32,
    pub health_mult: f32,
    pub score_mult: u32,
    pub fire_interval_ms: f32,
}

/// Enemy tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub normal: VariantTuning,
    pub elite: VariantTuning,
    pub boss: VariantTuning,
    /// Enemies hold position once this close to the ship
    pub stop_distance: f32,
    /// Enemies only fire while within this margin of the visible area
    pub fire_margin: f32,
    pub laser_damage: f32,
    pub flash_ms: f32,
    /// Spawn height (negative = above the visible area)
    pub spawn_y: f32,
    /// Remove enemies that stray this far outside the screen (None = never)
    pub despawn_margin: Option<f32>,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            normal: VariantTuning {
                radius: 25.0,
                speed_mult: 1.0,
                health_mult: 1.0,
                score_mult: 1,
                fire_interval_ms: 2000.0,
            },
            elite: VariantTuning {
                radius: 35.0,
                speed_mult: 1.2,
                health_mult: 3.0,
                score_mult: 5,
                fire_interval_ms: 1000.0,
            },
            boss: VariantTuning {
                radius: 60.0,
                speed_mult: 1.0,
                health_mult: 20.0,
                score_mult: 50,
                fire_interval_ms: 500.0,
            },
            stop_distance: 200.0,
            fire_margin: 50.0,
            laser_damage: 10.0,
            flash_ms: 100.0,
            spawn_y: -50.0,
            despawn_margin: None,
        }
    }
}

impl EnemyTuning {
    pub fn variant(&self, variant: EnemyVariant) -> &VariantTuning {
        match variant {
            EnemyVariant::Normal => &self.normal,
            EnemyVariant::Elite => &self.elite,
            EnemyVariant::Boss => &self.boss,
        }
    }
}

/// Per-kind projectile stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindTuning {
    pub speed: f32,
    pub radius: f32,
    pub life_ms: f32,
}

/// Projectile tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub cannon: KindTuning,
    pub missile: KindTuning,
    pub enemy_laser: KindTuning,
    /// Tracking projectiles only steer toward enemies inside this radius
    pub tracking_radius: f32,
    /// Max steering rate (radians/s)
    pub turn_rate: f32,
    /// Projectiles are dropped this far outside the screen
    pub bounds_margin: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            cannon: KindTuning {
                speed: 600.0,
                radius: 3.0,
                life_ms: 2000.0,
            },
            missile: KindTuning {
                speed: 400.0,
                radius: 5.0,
                life_ms: 3000.0,
            },
            enemy_laser: KindTuning {
                speed: 300.0,
                radius: 3.0,
                life_ms: 3000.0,
            },
            tracking_radius: 500.0,
            turn_rate: 5.0,
            bounds_margin: 50.0,
        }
    }
}

impl ProjectileTuning {
    pub fn kind(&self, kind: ProjectileKind) -> &KindTuning {
        match kind {
            ProjectileKind::Cannon => &self.cannon,
            ProjectileKind::Missile => &self.missile,
            ProjectileKind::EnemyLaser => &self.enemy_laser,
        }
    }
}

/// Loot tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LootTuning {
    pub radius: f32,
    pub life_ms: f32,
    /// Constant fall speed (px/s)
    pub fall_speed: f32,
    pub magnet_radius: f32,
    pub magnet_speed: f32,
    pub currency_value: u64,
    /// Chance an enemy kill drops loot (0 = drops disabled)
    pub drop_chance: f32,
}

impl Default for LootTuning {
    fn default() -> Self {
        Self {
            radius: 10.0,
            life_ms: 10_000.0,
            fall_speed: 50.0,
            magnet_radius: 300.0,
            magnet_speed: 500.0,
            currency_value: 10,
            drop_chance: 0.0,
        }
    }
}

/// Level/stage progression tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelTuning {
    pub max_levels: u32,
    pub max_stages: u32,
    /// Boss stages occur on the last stage of every Nth level
    pub boss_level_every: u32,
    /// Spawn interval while a boss stage is active (ms)
    pub boss_spawn_interval_ms: u32,
    pub elite_base_chance: f32,
    pub elite_chance_per_level: f32,
}

impl Default for LevelTuning {
    fn default() -> Self {
        Self {
            max_levels: 5,
            max_stages: 5,
            boss_level_every: 5,
            boss_spawn_interval_ms: 100_000,
            elite_base_chance: 0.10,
            elite_chance_per_level: 0.02,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub ship: ShipTuning,
    pub enemy: EnemyTuning,
    pub projectile: ProjectileTuning,
    pub loot: LootTuning,
    pub level: LevelTuning,
}

impl Tuning {
    /// Parse a (possibly partial) tuning document. Fields at any depth that
    /// the document leaves out keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let overrides: Value = serde_json::from_str(json)?;
        let mut merged = serde_json::to_value(Self::default())?;
        merge(&mut merged, overrides);
        serde_json::from_value(merged)
    }
}

/// Overlay `patch` onto `base`, recursing into objects
fn merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let json = r#"{ "ship": { "dash_cost": 50.0 }, "level": { "max_levels": 3 } }"#;
        let tuning = Tuning::from_json(json).unwrap();
        assert_eq!(tuning.ship.dash_cost, 50.0);
        assert_eq!(tuning.ship.radius, 20.0);
        assert_eq!(tuning.level.max_levels, 3);
        assert_eq!(tuning.level.max_stages, 5);
        assert_eq!(tuning.enemy.boss.score_mult, 50);
    }

    #[test]
    fn test_single_nested_field_override() {
        let json = r#"{ "enemy": { "boss": { "health_mult": 40.0 } } }"#;
        let tuning = Tuning::from_json(json).unwrap();
        assert_eq!(tuning.enemy.boss.health_mult, 40.0);
        assert_eq!(tuning.enemy.boss.radius, 60.0);
        assert_eq!(tuning.enemy.boss.score_mult, 50);
        assert_eq!(tuning.enemy.elite.radius, 35.0);

        let tuning =
            Tuning::from_json(r#"{ "projectile": { "missile": { "speed": 450.0 } } }"#).unwrap();
        assert_eq!(tuning.projectile.missile.speed, 450.0);
        assert_eq!(tuning.projectile.missile.life_ms, 3000.0);
    }

    #[test]
    fn test_override_can_enable_optional_fields() {
        let tuning = Tuning::from_json(r#"{ "enemy": { "despawn_margin": 300.0 } }"#).unwrap();
        assert_eq!(tuning.enemy.despawn_margin, Some(300.0));
        assert_eq!(tuning.enemy.stop_distance, 200.0);
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        assert!(Tuning::from_json(r#"{ "enemy": { "boss": { "radius": "big" } } }"#).is_err());
    }

    #[test]
    fn test_malformed_document_is_rejected() {
        assert!(Tuning::from_json("{ ship: nope }").is_err());
    }

    #[test]
    fn test_variant_lookup() {
        let tuning = Tuning::default();
        assert_eq!(tuning.enemy.variant(EnemyVariant::Elite).radius, 35.0);
        assert_eq!(tuning.projectile.kind(ProjectileKind::Missile).speed, 400.0);
        assert!(tuning.enemy.despawn_margin.is_none());
        assert_eq!(tuning.loot.drop_chance, 0.0);
    }
}
