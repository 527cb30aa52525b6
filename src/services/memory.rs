//! In-memory service implementations for the headless server and tests

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::core::types::{IVec3, PlayerId};
use crate::core::{Error, Result};
use crate::math::Region;
use crate::services::{Economy, OnlinePlayer, PlayerDirectory, ProtectionRegions};

/// Balances kept in a map; unknown players have zero
#[derive(Debug, Default)]
pub struct MemoryEconomy {
    balances: Mutex<HashMap<PlayerId, f64>>,
}

impl MemoryEconomy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deposit(&self, player: PlayerId, amount: f64) {
        *self.balances.lock().unwrap().entry(player).or_insert(0.0) += amount;
    }
}

impl Economy for MemoryEconomy {
    fn balance(&self, player: PlayerId) -> f64 {
        self.balances.lock().unwrap().get(&player).copied().unwrap_or(0.0)
    }

    fn withdraw(&self, player: PlayerId, amount: f64) -> Result<()> {
        let mut balances = self.balances.lock().unwrap();
        let balance = balances.entry(player).or_insert(0.0);
        if *balance < amount {
            return Err(Error::Service(format!(
                "balance {:.2} below withdrawal of {:.2}",
                balance, amount
            )));
        }
        *balance -= amount;
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct ProtectedRegion {
    region: Region,
    flags: BTreeMap<String, bool>,
}

/// Protected regions kept in a map
#[derive(Debug, Default)]
pub struct MemoryProtection {
    regions: Mutex<HashMap<String, ProtectedRegion>>,
}

impl MemoryProtection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(&self, name: &str) -> Option<Region> {
        self.regions.lock().unwrap().get(name).map(|r| r.region)
    }

    pub fn flag(&self, name: &str, flag: &str) -> Option<bool> {
        self.regions.lock().unwrap().get(name)?.flags.get(flag).copied()
    }

    pub fn len(&self) -> usize {
        self.regions.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProtectionRegions for MemoryProtection {
    fn add_region(&self, name: &str, region: Region) -> Result<()> {
        self.regions.lock().unwrap().insert(
            name.to_string(),
            ProtectedRegion { region, flags: BTreeMap::new() },
        );
        Ok(())
    }

    fn remove_region(&self, name: &str) -> Result<()> {
        self.regions.lock().unwrap().remove(name);
        Ok(())
    }

    fn set_flag(&self, region: &str, flag: &str, allow: bool) -> Result<()> {
        let mut regions = self.regions.lock().unwrap();
        let entry = regions
            .get_mut(region)
            .ok_or_else(|| Error::Service(format!("no protected region named {}", region)))?;
        entry.flags.insert(flag.to_string(), allow);
        Ok(())
    }
}

/// Online players and their inbox
#[derive(Debug, Default)]
pub struct MemoryPlayers {
    positions: Mutex<HashMap<PlayerId, IVec3>>,
    messages: Mutex<Vec<(PlayerId, String)>>,
}

impl MemoryPlayers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, player: PlayerId, position: IVec3) {
        self.positions.lock().unwrap().insert(player, position);
    }

    pub fn leave(&self, player: PlayerId) {
        self.positions.lock().unwrap().remove(&player);
    }

    pub fn position(&self, player: PlayerId) -> Option<IVec3> {
        self.positions.lock().unwrap().get(&player).copied()
    }

    /// Messages delivered to `player`, oldest first
    pub fn messages_for(&self, player: PlayerId) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| *to == player)
            .map(|(_, msg)| msg.clone())
            .collect()
    }
}

impl PlayerDirectory for MemoryPlayers {
    fn online_players(&self) -> Vec<OnlinePlayer> {
        self.positions
            .lock()
            .unwrap()
            .iter()
            .map(|(id, position)| OnlinePlayer { id: *id, position: *position })
            .collect()
    }

    fn teleport(&self, player: PlayerId, to: IVec3) {
        if let Some(position) = self.positions.lock().unwrap().get_mut(&player) {
            *position = to;
        }
    }

    fn send_message(&self, player: PlayerId, message: &str) {
        if self.positions.lock().unwrap().contains_key(&player) {
            self.messages.lock().unwrap().push((player, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_withdraw_checks_balance() {
        let economy = MemoryEconomy::new();
        let player = PlayerId::new_v4();
        economy.deposit(player, 100.0);
        assert!(economy.withdraw(player, 150.0).is_err());
        assert_eq!(economy.balance(player), 100.0);
        economy.withdraw(player, 40.0).expect("withdraw");
        assert_eq!(economy.balance(player), 60.0);
    }

    #[test]
    fn test_flags_need_region() {
        let protection = MemoryProtection::new();
        assert!(protection.set_flag("mine-a", "pvp", false).is_err());
        protection.add_region("mine-a", Region::point(IVec3::ZERO)).expect("add");
        protection.set_flag("mine-a", "pvp", false).expect("flag");
        assert_eq!(protection.flag("mine-a", "pvp"), Some(false));

        // Replacing a region drops its flags
        protection.add_region("mine-a", Region::point(IVec3::ONE)).expect("replace");
        assert_eq!(protection.flag("mine-a", "pvp"), None);
        protection.remove_region("mine-a").expect("remove");
        assert!(protection.is_empty());
    }

    #[test]
    fn test_teleport_and_messages() {
        let players = MemoryPlayers::new();
        let online = PlayerId::new_v4();
        let offline = PlayerId::new_v4();
        players.join(online, IVec3::ZERO);

        players.teleport(online, IVec3::new(0, 50, 1));
        players.teleport(offline, IVec3::ONE);
        assert_eq!(players.position(online), Some(IVec3::new(0, 50, 1)));
        assert_eq!(players.position(offline), None);

        players.send_message(online, "hello");
        players.send_message(offline, "lost");
        assert_eq!(players.messages_for(online), vec!["hello".to_string()]);
        assert!(players.messages_for(offline).is_empty());
    }
}
