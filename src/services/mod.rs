//! External collaborators the mine engine talks to.
//!
//! The engine never reaches for a global: everything it needs from the
//! host (money, region protection, online players, veto hooks) arrives
//! through these traits, bundled in [`Services`].

pub mod hooks;
pub mod memory;

pub use hooks::{AllowAll, LifecycleEvent, LifecycleHooks, Verdict};
pub use memory::{MemoryEconomy, MemoryPlayers, MemoryProtection};

use std::sync::Arc;

use crate::core::types::{IVec3, PlayerId};
use crate::core::Result;
use crate::math::Region;

/// Player balances
pub trait Economy: Send + Sync {
    fn balance(&self, player: PlayerId) -> f64;

    /// Debit `amount`; fails without side effects when funds are short
    fn withdraw(&self, player: PlayerId, amount: f64) -> Result<()>;
}

/// Named protected regions with allow/deny flags
pub trait ProtectionRegions: Send + Sync {
    /// Create or replace a region
    fn add_region(&self, name: &str, region: Region) -> Result<()>;

    /// Remove a region; removing an unknown region is not an error
    fn remove_region(&self, name: &str) -> Result<()>;

    fn set_flag(&self, region: &str, flag: &str, allow: bool) -> Result<()>;
}

/// An online player and where they stand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnlinePlayer {
    pub id: PlayerId,
    pub position: IVec3,
}

/// Online players
pub trait PlayerDirectory: Send + Sync {
    fn online_players(&self) -> Vec<OnlinePlayer>;

    fn teleport(&self, player: PlayerId, to: IVec3);

    /// Deliver a chat message; offline players silently miss it
    fn send_message(&self, player: PlayerId, message: &str);
}

/// Bundle of host services handed to the mine context
#[derive(Clone)]
pub struct Services {
    pub economy: Arc<dyn Economy>,
    pub protection: Arc<dyn ProtectionRegions>,
    pub players: Arc<dyn PlayerDirectory>,
    pub hooks: Arc<dyn LifecycleHooks>,
}

impl Services {
    /// In-memory services with no vetoes
    pub fn in_memory() -> Self {
        Self {
            economy: Arc::new(MemoryEconomy::new()),
            protection: Arc::new(MemoryProtection::new()),
            players: Arc::new(MemoryPlayers::new()),
            hooks: Arc::new(AllowAll),
        }
    }
}
