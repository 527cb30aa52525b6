//! Owner → mine map

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::core::types::PlayerId;
use crate::core::{Error, Result};
use crate::mine::instance::Mine;

/// Active mines, at most one per owner
#[derive(Default)]
pub struct MineRegistry {
    mines: RwLock<HashMap<PlayerId, Arc<Mine>>>,
}

impl MineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mine; an owner with a mine already is a state violation
    pub fn insert(&self, mine: Arc<Mine>) -> Result<()> {
        let owner = mine.owner();
        let mut mines = self.mines.write().unwrap();
        if mines.contains_key(&owner) {
            return Err(Error::state(format!("{} already owns a mine", owner)));
        }
        mines.insert(owner, mine);
        Ok(())
    }

    pub fn get(&self, owner: PlayerId) -> Option<Arc<Mine>> {
        self.mines.read().unwrap().get(&owner).cloned()
    }

    pub fn remove(&self, owner: PlayerId) -> Option<Arc<Mine>> {
        self.mines.write().unwrap().remove(&owner)
    }

    pub fn contains(&self, owner: PlayerId) -> bool {
        self.mines.read().unwrap().contains_key(&owner)
    }

    /// Every active mine, in no particular order
    pub fn all(&self) -> Vec<Arc<Mine>> {
        self.mines.read().unwrap().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.mines.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
