//! Runtime object for one active mine

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use crate::context::MineContext;
use crate::core::types::{IVec3, PlayerId};
use crate::core::{Error, Result};
use crate::math::Region;
use crate::mine::data::MineData;
use crate::mine::outcome::ResetOutcome;
use crate::mine::tasks::MineTasks;
use crate::services::{LifecycleEvent, Verdict};
use crate::storage::MineStore;
use crate::template::Template;
use crate::tier::Tier;
use crate::world::{Material, MaterialWeights, WeightedPattern, WorldContext};

/// Holds the reset flag for as long as it lives
pub(crate) struct ResetGuard<'a>(&'a AtomicBool);

impl<'a> ResetGuard<'a> {
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ResetGuard(flag))
    }
}

impl Drop for ResetGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Name of the protected region covering the mining area
pub fn mining_region_name(owner: PlayerId) -> String {
    format!("mine-{}", owner)
}

/// Name of the protected region covering the whole plot
pub fn full_region_name(owner: PlayerId) -> String {
    format!("full-mine-{}", owner)
}

/// One player's mine.
///
/// The tier and template are fixed for the life of the instance; an
/// upgrade replaces the whole instance.
#[derive(Debug)]
pub struct Mine {
    pub(crate) data: RwLock<MineData>,
    tier: Arc<Tier>,
    template: Arc<Template>,
    pub(crate) tasks: Mutex<MineTasks>,
    resetting: AtomicBool,
}

impl Mine {
    pub fn new(data: MineData, tier: Arc<Tier>, template: Arc<Template>) -> Self {
        Self {
            data: RwLock::new(data),
            tier,
            template,
            tasks: Mutex::new(MineTasks::default()),
            resetting: AtomicBool::new(false),
        }
    }

    pub fn owner(&self) -> PlayerId {
        self.data.read().unwrap().owner
    }

    pub fn tier(&self) -> &Arc<Tier> {
        &self.tier
    }

    pub fn template(&self) -> &Arc<Template> {
        &self.template
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> MineData {
        self.data.read().unwrap().clone()
    }

    pub fn location(&self) -> IVec3 {
        self.data.read().unwrap().location
    }

    pub fn mining_region(&self) -> Region {
        self.data.read().unwrap().mining
    }

    pub fn full_region(&self) -> Region {
        self.data.read().unwrap().full
    }

    pub fn spawn(&self) -> IVec3 {
        self.data.read().unwrap().spawn
    }

    pub fn is_resetting(&self) -> bool {
        self.resetting.load(Ordering::Acquire)
    }

    /// Share (0-100) of the mining region that is still solid.
    /// An empty region counts as full.
    pub fn remaining_percentage(&self, world: &WorldContext) -> f64 {
        let region = self.mining_region();
        let volume = region.volume();
        if volume == 0 {
            return 100.0;
        }
        let solid = world.with_world(|w| w.count_solid(region));
        solid as f64 * 100.0 / volume as f64
    }

    /// Share (0-100) of the mining region that has been mined out
    pub fn mined_percentage(&self, world: &WorldContext) -> f64 {
        100.0 - self.remaining_percentage(world)
    }

    /// Refill table: mine override, then tier, then template
    pub fn refill_weights(&self) -> MaterialWeights {
        let data = self.data.read().unwrap();
        [&data.materials, &self.tier.materials, &self.template.materials]
            .into_iter()
            .find(|w| !w.is_empty())
            .cloned()
            .unwrap_or_default()
    }

    /// Refill the mining region.
    ///
    /// Players standing in the mining region are moved to spawn first.
    pub fn reset(&self, ctx: &MineContext) -> Result<ResetOutcome> {
        let Some(_guard) = ResetGuard::acquire(&self.resetting) else {
            log::debug!("Reset of {}'s mine already running", self.owner());
            return Ok(ResetOutcome::AlreadyRunning);
        };

        let owner = self.owner();
        if ctx.services().hooks.evaluate(&LifecycleEvent::Reset { owner }) == Verdict::Veto {
            return Ok(ResetOutcome::Vetoed);
        }

        let weights = self.refill_weights();
        if weights.is_empty() {
            return Err(Error::config(format!(
                "no refill materials for tier {} (mine, tier and template tables are empty)",
                self.tier.name
            )));
        }
        let pattern = WeightedPattern::new(&weights)?;

        self.relocate_occupants(ctx);

        let region = self.mining_region();
        let start = Instant::now();
        let written = ctx.world().with_world(|world| {
            let mut rng = rand::thread_rng();
            world.fill_with(region, |_| pattern.sample(&mut rng))
        });
        log::debug!(
            "Reset {}'s mine: {} voxels in {:.1}ms",
            owner,
            written,
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(ResetOutcome::Completed)
    }

    /// Reset when enough of the mine has been dug out.
    /// Returns `None` when the threshold was not reached.
    pub fn check_depletion(&self, ctx: &MineContext) -> Result<Option<ResetOutcome>> {
        let mined = self.mined_percentage(ctx.world());
        if mined < self.tier.reset_threshold {
            return Ok(None);
        }
        log::debug!(
            "{}'s mine is {:.1}% mined (threshold {:.1}%)",
            self.owner(),
            mined,
            self.tier.reset_threshold
        );
        self.reset(ctx).map(Some)
    }

    /// Move every online player inside the mining region to spawn.
    /// Returns how many were moved.
    pub fn relocate_occupants(&self, ctx: &MineContext) -> usize {
        let (region, spawn) = {
            let data = self.data.read().unwrap();
            (data.mining, data.spawn)
        };
        let players = &ctx.services().players;
        let occupants: Vec<_> = players
            .online_players()
            .into_iter()
            .filter(|p| region.contains(p.position))
            .collect();
        if occupants.is_empty() {
            return 0;
        }

        clear_spawn(ctx, spawn);
        for player in &occupants {
            players.teleport(player.id, spawn);
        }
        occupants.len()
    }

    /// Send a player to this mine's spawn point
    pub fn teleport_to_spawn(&self, ctx: &MineContext, player: PlayerId) {
        let spawn = self.spawn();
        clear_spawn(ctx, spawn);
        ctx.services().players.teleport(player, spawn);
    }

    /// Owner and friends always; banned players never; others when open
    pub fn can_enter(&self, player: PlayerId) -> bool {
        let data = self.data.read().unwrap();
        if player == data.owner || data.friends.contains(&player) {
            return true;
        }
        !data.banned.contains(&player) && data.open
    }

    /// Ban a player. Returns false if they are the owner or already banned.
    pub fn ban(&self, ctx: &MineContext, player: PlayerId) -> Result<bool> {
        {
            let mut data = self.data.write().unwrap();
            if player == data.owner || !data.banned.insert(player) {
                return Ok(false);
            }
        }
        ctx.services()
            .players
            .send_message(player, "You've been banned from this private mine!");
        self.save(ctx.store())?;
        Ok(true)
    }

    /// Lift a ban. Returns false if the player was not banned.
    pub fn unban(&self, ctx: &MineContext, player: PlayerId) -> Result<bool> {
        if !self.data.write().unwrap().banned.remove(&player) {
            return Ok(false);
        }
        ctx.services()
            .players
            .send_message(player, "You've been unbanned from this private mine!");
        self.save(ctx.store())?;
        Ok(true)
    }

    pub fn add_friend(&self, ctx: &MineContext, player: PlayerId) -> Result<bool> {
        {
            let mut data = self.data.write().unwrap();
            if player == data.owner || !data.friends.insert(player) {
                return Ok(false);
            }
        }
        self.save(ctx.store())?;
        Ok(true)
    }

    pub fn remove_friend(&self, ctx: &MineContext, player: PlayerId) -> Result<bool> {
        if !self.data.write().unwrap().friends.remove(&player) {
            return Ok(false);
        }
        self.save(ctx.store())?;
        Ok(true)
    }

    pub fn set_open(&self, ctx: &MineContext, open: bool) -> Result<()> {
        self.data.write().unwrap().open = open;
        self.save(ctx.store())
    }

    /// Set the sell tax (0-100). Refused when taxes are disabled.
    pub fn set_tax(&self, ctx: &MineContext, tax: f64) -> Result<()> {
        if !ctx.settings().tax_enabled {
            return Err(Error::state("mine taxes are disabled"));
        }
        if !(0.0..=100.0).contains(&tax) {
            return Err(Error::config(format!("tax {} outside 0-100", tax)));
        }
        self.data.write().unwrap().tax = tax;
        self.save(ctx.store())
    }

    pub fn set_max_players(&self, ctx: &MineContext, max_players: u32) -> Result<()> {
        self.data.write().unwrap().max_players = max_players;
        self.save(ctx.store())
    }

    /// Override the refill table; an empty table restores the tier's
    pub fn set_materials(&self, ctx: &MineContext, materials: MaterialWeights) -> Result<()> {
        if !materials.is_empty() {
            WeightedPattern::new(&materials)?;
        }
        self.data.write().unwrap().materials = materials;
        self.save(ctx.store())
    }

    /// Register both protected regions and apply the tier's flags
    pub fn protect(&self, ctx: &MineContext) -> Result<()> {
        let (owner, mining, full) = {
            let data = self.data.read().unwrap();
            (data.owner, data.mining, data.full)
        };
        let protection = &ctx.services().protection;

        let name = mining_region_name(owner);
        protection.add_region(&name, mining)?;
        for (flag, allow) in &self.tier.flags {
            protection.set_flag(&name, flag, *allow)?;
        }

        let name = full_region_name(owner);
        protection.add_region(&name, full)?;
        for (flag, allow) in &self.tier.full_flags {
            protection.set_flag(&name, flag, *allow)?;
        }
        Ok(())
    }

    /// Remove both protected regions
    pub fn unprotect(&self, ctx: &MineContext) -> Result<()> {
        let owner = self.owner();
        let protection = &ctx.services().protection;
        protection.remove_region(&mining_region_name(owner))?;
        protection.remove_region(&full_region_name(owner))?;
        Ok(())
    }

    /// Persist the current state
    pub fn save(&self, store: &MineStore) -> Result<()> {
        let data = self.snapshot();
        store.save_mine(&data)
    }
}

fn clear_spawn(ctx: &MineContext, spawn: IVec3) {
    ctx.world().with_world(|world| world.set(spawn, Material::air()));
}
