//! Persistent upgrade economy
//!
//! Upgrade levels survive between runs. Costs grow geometrically per level and
//! each upgrade maps its level to a ship stat through its own formula.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Upgrade identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UpgradeKind {
    Hull,
    Engine,
    Cannon,
    Cooldown,
    Ricochet,
    Multishot,
    CritChance,
    AllDamage,
}

/// Static definition of one upgrade track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpgradeDef {
    pub name: &'static str,
    /// Level every new save starts at (stat upgrades 1, abilities 0)
    pub start_level: u32,
    pub max_level: u32,
    pub base_cost: u64,
    pub cost_mult: f64,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 8] = [
        UpgradeKind::Hull,
        UpgradeKind::Engine,
        UpgradeKind::Cannon,
        UpgradeKind::Cooldown,
        UpgradeKind::Ricochet,
        UpgradeKind::Multishot,
        UpgradeKind::CritChance,
        UpgradeKind::AllDamage,
    ];

    /// Storage/UI identifier
    pub fn id(&self) -> &'static str {
        match self {
            Self::Hull => "hull",
            Self::Engine => "engine",
            Self::Cannon => "cannon",
            Self::Cooldown => "cooldown",
            Self::Ricochet => "ricochet",
            Self::Multishot => "multishot",
            Self::CritChance => "critChance",
            Self::AllDamage => "allDamage",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }

    pub fn def(&self) -> UpgradeDef {
        let (name, start_level, max_level, base_cost, cost_mult) = match self {
            Self::Hull => ("Hull Plating", 1, 10, 100, 1.5),
            Self::Engine => ("Ion Thrusters", 1, 10, 150, 1.5),
            Self::Cannon => ("Plasma Cannon", 1, 10, 200, 1.5),
            Self::Cooldown => ("Cooling System", 1, 10, 250, 1.5),
            Self::Ricochet => ("Ricochet", 0, 5, 500, 2.0),
            Self::Multishot => ("Multishot", 0, 5, 1000, 2.0),
            Self::CritChance => ("Crit Chance", 0, 10, 300, 1.5),
            Self::AllDamage => ("Amplifier", 0, 10, 800, 1.5),
        };
        UpgradeDef {
            name,
            start_level,
            max_level,
            base_cost,
            cost_mult,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Ship stats derived from upgrade levels at the start of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Loadout {
    pub max_health: f32,
    pub speed: f32,
    pub damage: f32,
    pub fire_interval_ms: f32,
    pub ricochet_bounces: u32,
    pub multishot: u32,
    pub crit_chance: f32,
    pub damage_amp: f32,
}

/// Owns upgrade levels and the cost/value formulas
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeManager {
    levels: [u32; UpgradeKind::ALL.len()],
}

impl Default for UpgradeManager {
    fn default() -> Self {
        let mut levels = [0; UpgradeKind::ALL.len()];
        for kind in UpgradeKind::ALL {
            levels[kind.index()] = kind.def().start_level;
        }
        Self { levels }
    }
}

impl UpgradeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, kind: UpgradeKind) -> u32 {
        self.levels[kind.index()]
    }

    pub fn is_maxed(&self, kind: UpgradeKind) -> bool {
        self.level(kind) >= kind.def().max_level
    }

    /// Price of the next level, or None once the track is maxed
    pub fn cost(&self, kind: UpgradeKind) -> Option<u64> {
        if self.is_maxed(kind) {
            return None;
        }
        let def = kind.def();
        let exponent = self.level(kind).saturating_sub(def.start_level);
        Some((def.base_cost as f64 * def.cost_mult.powi(exponent as i32)).floor() as u64)
    }

    /// Spend `currency` on the next level. Leaves both untouched on failure.
    pub fn buy(&mut self, kind: UpgradeKind, currency: &mut u64) -> bool {
        match self.cost(kind) {
            Some(cost) if *currency >= cost => {
                *currency -= cost;
                self.levels[kind.index()] += 1;
                log::info!(
                    "Bought {} level {} for {}",
                    kind.id(),
                    self.level(kind),
                    cost
                );
                true
            }
            _ => {
                log::debug!("Cannot buy {} (have {})", kind.id(), currency);
                false
            }
        }
    }

    /// Stat value for the current level
    pub fn value(&self, kind: UpgradeKind) -> f32 {
        let level = self.level(kind) as f32;
        match kind {
            UpgradeKind::Hull => 100.0 + (level - 1.0) * 20.0,
            UpgradeKind::Engine => 400.0 + (level - 1.0) * 50.0,
            UpgradeKind::Cannon => 10.0 + (level - 1.0) * 5.0,
            UpgradeKind::Cooldown => (500.0 - (level - 1.0) * 40.0).max(100.0),
            UpgradeKind::Ricochet | UpgradeKind::Multishot => level,
            UpgradeKind::CritChance => level * 0.05,
            UpgradeKind::AllDamage => 1.0 + level * 0.1,
        }
    }

    pub fn loadout(&self) -> Loadout {
        Loadout {
            max_health: self.value(UpgradeKind::Hull),
            speed: self.value(UpgradeKind::Engine),
            damage: self.value(UpgradeKind::Cannon),
            fire_interval_ms: self.value(UpgradeKind::Cooldown),
            ricochet_bounces: self.level(UpgradeKind::Ricochet),
            multishot: self.level(UpgradeKind::Multishot),
            crit_chance: self.value(UpgradeKind::CritChance),
            damage_amp: self.value(UpgradeKind::AllDamage),
        }
    }

    /// id -> level map as persisted
    pub fn ledger(&self) -> BTreeMap<&'static str, u32> {
        UpgradeKind::ALL
            .into_iter()
            .map(|k| (k.id(), self.level(k)))
            .collect()
    }

    pub fn ledger_json(&self) -> String {
        serde_json::to_string(&self.ledger()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Apply a persisted ledger. Bad entries are skipped one by one; returns
    /// how many entries were applied.
    pub fn apply_ledger_json(&mut self, json: &str) -> usize {
        let value: serde_json::Value = match serde_json::from_str(json) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Ignoring unreadable upgrade ledger: {}", e);
                return 0;
            }
        };
        let Some(entries) = value.as_object() else {
            log::warn!("Ignoring upgrade ledger that is not an object");
            return 0;
        };

        let mut applied = 0;
        for (id, level) in entries {
            let Some(kind) = UpgradeKind::from_id(id) else {
                log::debug!("Skipping unknown upgrade '{}'", id);
                continue;
            };
            let def = kind.def();
            match level.as_u64() {
                Some(l) if l >= def.start_level as u64 && l <= def.max_level as u64 => {
                    self.levels[kind.index()] = l as u32;
                    applied += 1;
                }
                _ => log::warn!("Skipping invalid level {} for '{}'", level, id),
            }
        }
        applied
    }
}
