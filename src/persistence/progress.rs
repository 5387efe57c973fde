//! Currency and upgrade ledger persistence

use super::Storage;
use crate::sim::UpgradeManager;

/// Integer currency balance
pub const CURRENCY_KEY: &str = "alien_hunter_currency";
/// JSON object mapping upgrade id -> level
pub const UPGRADES_KEY: &str = "alien_hunter_upgrades";

/// Reads and writes player progress through an injected [`Storage`]
#[derive(Debug, Clone, Default)]
pub struct ProgressStore<S: Storage> {
    storage: S,
}

impl<S: Storage> ProgressStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Saved currency, or 0 when missing or unreadable
    pub fn load_currency(&self) -> u64 {
        match self.storage.get_item(CURRENCY_KEY) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Unreadable currency '{}', starting from 0", raw);
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                log::warn!("Could not read currency: {}", e);
                0
            }
        }
    }

    /// Saved upgrade levels applied over the defaults
    pub fn load_upgrades(&self) -> UpgradeManager {
        let mut upgrades = UpgradeManager::new();
        match self.storage.get_item(UPGRADES_KEY) {
            Ok(Some(json)) => {
                let applied = upgrades.apply_ledger_json(&json);
                log::info!("Loaded {} upgrade levels", applied);
            }
            Ok(None) => log::info!("No saved upgrades, starting fresh"),
            Err(e) => log::warn!("Could not read upgrades: {}", e),
        }
        upgrades
    }

    pub fn save_currency(&mut self, currency: u64) {
        if let Err(e) = self.storage.set_item(CURRENCY_KEY, &currency.to_string()) {
            log::warn!("Failed to save currency: {}", e);
        }
    }

    pub fn save_upgrades(&mut self, upgrades: &UpgradeManager) {
        if let Err(e) = self.storage.set_item(UPGRADES_KEY, &upgrades.ledger_json()) {
            log::warn!("Failed to save upgrades: {}", e);
        } else {
            log::debug!("Upgrades saved");
        }
    }
}
