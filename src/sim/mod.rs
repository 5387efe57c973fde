//! Simulation module
//!
//! All gameplay logic lives here:
//! - Variable frame delta in milliseconds, validated before use
//! - Seeded RNG only
//! - Entities live in generational arenas and are removed in one sweep per frame
//! - No rendering or platform dependencies

pub mod arena;
pub mod background;
pub mod collision;
pub mod effects;
pub mod enemy;
pub mod error;
pub mod level;
pub mod loot;
pub mod projectile;
pub mod ship;
pub mod state;
pub mod tick;
pub mod upgrades;

pub use arena::{Arena, Handle, Lifecycle};
pub use collision::{circles_overlap, reflect};
pub use effects::{Effect, Effects, ScreenShake};
pub use enemy::{Enemy, EnemyVariant};
pub use error::{InvariantRule, SimError};
pub use level::{LevelSystem, Progress, ProgressCounts, StageConfig};
pub use loot::{Loot, LootKind};
pub use projectile::{Behavior, Projectile, ProjectileKind};
pub use ship::{FrameInput, Ship, ShipMotion};
pub use state::{GameEvent, GamePhase, GameState, HudSnapshot};
pub use tick::tick;
pub use upgrades::{Loadout, UpgradeKind, UpgradeManager};
