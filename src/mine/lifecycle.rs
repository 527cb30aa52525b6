//! Expand, upgrade and delete

use std::sync::Arc;

use crate::context::MineContext;
use crate::core::types::IVec3;
use crate::core::{Error, Result};
use crate::mine::factory;
use crate::mine::instance::Mine;
use crate::mine::outcome::{DeleteOutcome, ExpandOutcome, UpgradeOutcome};
use crate::services::{LifecycleEvent, Verdict};
use crate::world::Material;

/// Voxels added on each side per expansion
const EXPAND_STEP: i32 = 1;

impl Mine {
    /// Grow the mining region by one voxel on each horizontal side (and
    /// downward when vertical expansion is enabled).
    ///
    /// The blocking material next to the region stops the expansion; with
    /// border upgrades enabled it triggers a single upgrade instead.
    pub fn expand(self: &Arc<Self>, ctx: &Arc<MineContext>) -> Result<ExpandOutcome> {
        let owner = self.owner();
        let lock = ctx.owner_lock(owner);
        let held = lock.lock().unwrap();
        self.ensure_live(ctx)?;

        let event = LifecycleEvent::Expand { owner, amount: EXPAND_STEP };
        if ctx.services().hooks.evaluate(&event) == Verdict::Veto {
            return Ok(ExpandOutcome::Vetoed);
        }

        let settings = ctx.settings();
        let (mining, full) = {
            let data = self.data.read().unwrap();
            (data.mining, data.full)
        };

        let size = mining.size();
        let grown_width = size.x.max(size.z) + 2 * EXPAND_STEP;
        if grown_width > self.tier().max_size as i32 {
            log::info!(
                "{}'s mine is at its maximum size ({} on tier {})",
                owner,
                self.tier().max_size,
                self.tier().name
            );
            return Ok(ExpandOutcome::AtMaxSize);
        }

        let probe = mining.grown(EXPAND_STEP + 1);
        let blocked = ctx
            .world()
            .with_world(|world| world.find_material(probe.shell(mining), &settings.blocking_material));
        if let Some(at) = blocked {
            log::info!("Expansion of {}'s mine blocked by {} at {}", owner, settings.blocking_material, at);
            // Upgrade takes the owner lock itself
            drop(held);
            let upgraded = if settings.border_upgrade {
                matches!(self.upgrade(ctx)?, UpgradeOutcome::Upgraded { .. })
            } else {
                false
            };
            return Ok(ExpandOutcome::Blocked { upgraded });
        }

        let down = if settings.expand_vertically { EXPAND_STEP } else { 0 };
        let neg = IVec3::new(EXPAND_STEP, down, EXPAND_STEP);
        let pos = IVec3::new(EXPAND_STEP, 0, EXPAND_STEP);
        let new_mining = mining.grown_sides(neg, pos);
        // Walls always include the floor under the mining region
        let walls = new_mining.grown_sides(IVec3::ONE, IVec3::new(1, 0, 1));
        let new_full = full.grown_sides(neg, pos).union(&walls);

        ctx.world().with_world(|world| {
            for p in new_mining.shell(mining) {
                world.set(p, Material::air());
            }
            if let Some(wall) = &settings.wall_material {
                for p in walls.shell(new_mining) {
                    world.set(p, wall.clone());
                }
            }
        });

        {
            let mut data = self.data.write().unwrap();
            data.mining = new_mining;
            data.full = new_full;
        }
        self.protect(ctx)?;
        self.save(ctx.store())?;
        self.reset(ctx)?;

        log::info!("Expanded {}'s mine to {}", owner, new_mining.size());
        Ok(ExpandOutcome::Expanded)
    }

    /// Move the mine to the next tier, charging its upgrade cost.
    ///
    /// The instance is torn down and a fresh one is stamped at the same
    /// plot; the old `Arc<Mine>` is dead afterwards.
    pub fn upgrade(self: &Arc<Self>, ctx: &Arc<MineContext>) -> Result<UpgradeOutcome> {
        let owner = self.owner();
        let lock = ctx.owner_lock(owner);
        let _held = lock.lock().unwrap();
        self.ensure_live(ctx)?;

        let current = Arc::clone(self.tier());
        let next = ctx.tiers().next(&current);
        let event = LifecycleEvent::Upgrade {
            owner,
            from: current.name.clone(),
            to: next.name.clone(),
        };
        if ctx.services().hooks.evaluate(&event) == Verdict::Veto {
            return Ok(UpgradeOutcome::Vetoed);
        }

        if ctx.tiers().is_last(&current) {
            log::info!("{}'s mine is already on the final tier {}", owner, current.name);
            return Ok(UpgradeOutcome::FinalTier);
        }

        let cost = next.upgrade_cost;
        if cost > 0.0 {
            let balance = ctx.services().economy.balance(owner);
            if balance < cost {
                ctx.services().players.send_message(
                    owner,
                    &format!("You need {:.2} to upgrade your mine, you have {:.2}", cost, balance),
                );
                return Ok(UpgradeOutcome::InsufficientFunds { balance, cost });
            }
        }

        let previous = self.snapshot();
        let same_structure = next.template == current.template;
        self.teardown(ctx, !same_structure)?;
        factory::rebuild(ctx, previous, Arc::clone(&next), !same_structure)?;

        if cost > 0.0 {
            ctx.services().economy.withdraw(owner, cost)?;
        }

        log::info!("Upgraded {}'s mine from {} to {}", owner, current.name, next.name);
        Ok(UpgradeOutcome::Upgraded { from: current.name.clone(), to: next.name.clone() })
    }

    /// Remove the mine, optionally erasing its structure from the world
    pub fn delete(self: &Arc<Self>, ctx: &MineContext, remove_structure: bool) -> Result<DeleteOutcome> {
        let owner = self.owner();
        let lock = ctx.owner_lock(owner);
        let _held = lock.lock().unwrap();
        self.ensure_live(ctx)?;

        if ctx.services().hooks.evaluate(&LifecycleEvent::Delete { owner }) == Verdict::Veto {
            return Ok(DeleteOutcome::Vetoed);
        }

        self.teardown(ctx, remove_structure)?;
        ctx.store().delete_mine(owner)?;
        log::info!("Deleted {}'s mine", owner);
        Ok(DeleteOutcome::Deleted)
    }

    /// A handle left over from before an upgrade or delete must not act
    /// on the owner's current mine. Call with the owner lock held.
    fn ensure_live(self: &Arc<Self>, ctx: &MineContext) -> Result<()> {
        match ctx.mines().get(self.owner()) {
            Some(live) if Arc::ptr_eq(&live, self) => Ok(()),
            _ => Err(Error::state(format!("{}'s mine was replaced or deleted", self.owner()))),
        }
    }

    /// Stop tasks, drop protection, optionally erase, unregister.
    /// Leaves the persisted record alone.
    pub(crate) fn teardown(&self, ctx: &MineContext, erase: bool) -> Result<()> {
        self.stop_tasks();
        self.unprotect(ctx)?;
        if erase {
            let full = self.full_region();
            let cleared = ctx.world().with_world(|world| world.clear(full));
            log::debug!("Erased {} voxels of {}'s mine", cleared, self.owner());
        }
        ctx.mines().remove(self.owner());
        Ok(())
    }
}
