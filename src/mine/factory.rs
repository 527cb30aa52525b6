//! Building mine instances: from the pregenerated queue, a fresh plot,
//! or an existing plot on upgrade.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::context::MineContext;
use crate::core::types::{IVec3, PlayerId};
use crate::core::{Error, Result};
use crate::math::Placement;
use crate::mine::data::MineData;
use crate::mine::instance::Mine;
use crate::placement::PlotLayout;
use crate::tier::Tier;
use crate::world::MaterialWeights;

/// Create a mine for `owner` on `tier` (the default tier when `None`).
///
/// Default-tier mines take a pregenerated plot when one is queued;
/// everything else gets a freshly allocated and stamped plot.
pub fn create(ctx: &Arc<MineContext>, owner: PlayerId, tier: Option<Arc<Tier>>) -> Result<Arc<Mine>> {
    let lock = ctx.owner_lock(owner);
    let _held = lock.lock().unwrap();

    if ctx.mines().contains(owner) {
        return Err(Error::state(format!("{} already owns a mine", owner)));
    }
    let tier = match tier {
        Some(tier) => tier,
        None => ctx
            .tiers()
            .default_tier()
            .ok_or_else(|| Error::config("no tiers are configured"))?,
    };

    let is_default = ctx.tiers().default_tier().is_some_and(|d| d.order == tier.order);
    if is_default {
        if let Some(record) = ctx.pregen_queue().claim()? {
            log::info!("Claimed pregenerated plot {} for {}", record.location, owner);
            return create_at(ctx, owner, record.location, tier, false);
        }
    }

    let plot = ctx.allocator().next_plot()?;
    create_at(ctx, owner, plot, tier, true)
}

/// Build a mine at a known plot, stamping the tier's template when
/// `paste` is set.
pub fn create_at(
    ctx: &Arc<MineContext>,
    owner: PlayerId,
    plot: IVec3,
    tier: Arc<Tier>,
    paste: bool,
) -> Result<Arc<Mine>> {
    build(ctx, owner, plot, tier, paste, None)
}

/// Build the successor of a torn-down mine on `tier`, keeping the
/// owner's settings, bans and friends.
pub(crate) fn rebuild(
    ctx: &Arc<MineContext>,
    previous: MineData,
    tier: Arc<Tier>,
    paste: bool,
) -> Result<Arc<Mine>> {
    build(ctx, previous.owner, previous.location, tier, paste, Some(previous))
}

fn build(
    ctx: &Arc<MineContext>,
    owner: PlayerId,
    plot: IVec3,
    tier: Arc<Tier>,
    paste: bool,
    previous: Option<MineData>,
) -> Result<Arc<Mine>> {
    if ctx.mines().contains(owner) {
        return Err(Error::state(format!("{} already owns a mine", owner)));
    }

    let settings = ctx.settings();
    let template = ctx.templates().get(&tier.template)?;
    let placement = Placement::new(plot, settings.rotation);
    let layout = PlotLayout::compute(&template, placement, settings.clearance);

    if paste {
        let written = ctx.world().with_world(|world| world.paste(&placement, &template.blocks));
        log::debug!("Stamped {} voxels of {} at {}", written, template.source.display(), plot);
    }

    let data = match previous {
        // Same structure: an expanded mine keeps its size
        Some(prev) if !paste => MineData {
            tier: tier.name.clone(),
            max_size: tier.max_size,
            ..prev
        },
        Some(prev) => MineData {
            tier: tier.name.clone(),
            mining: layout.mining,
            full: layout.full,
            spawn: layout.spawn,
            max_size: tier.max_size,
            ..prev
        },
        None => MineData {
            owner,
            tier: tier.name.clone(),
            location: plot,
            mining: layout.mining,
            full: layout.full,
            spawn: layout.spawn,
            open: false,
            tax: settings.default_tax,
            max_players: settings.default_max_players,
            max_size: tier.max_size,
            materials: MaterialWeights::new(),
            banned: BTreeSet::new(),
            friends: BTreeSet::new(),
        },
    };

    let mine = Arc::new(Mine::new(data, tier, template));
    mine.protect(ctx)?;
    ctx.mines().insert(Arc::clone(&mine))?;
    mine.save(ctx.store())?;
    mine.start_tasks(ctx);
    mine.reset(ctx)?;

    log::info!("Created {}'s mine on tier {} at {}", owner, mine.tier().name, plot);
    Ok(mine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::fixture;

    #[test]
    fn test_create_allocates_fresh_plots() {
        let fx = fixture();
        let a = create(&fx.ctx, PlayerId::new_v4(), None).expect("first");
        let b = create(&fx.ctx, PlayerId::new_v4(), None).expect("second");
        assert_eq!(a.location(), IVec3::new(0, 50, 0));
        assert_eq!(b.location(), IVec3::new(150, 50, 0));
        assert_eq!(a.spawn(), IVec3::new(0, 50, 1));
        assert!(a.snapshot().is_consistent());
    }

    #[test]
    fn test_create_claims_pregenerated_plot() {
        let fx = fixture();
        let reserved = fx.ctx.pregenerate(2).expect("pregenerate");
        fx.ctx.world().tick();
        assert_eq!(fx.ctx.pregen_queue().len(), 2);

        let mine = create(&fx.ctx, PlayerId::new_v4(), None).expect("create");
        assert_eq!(mine.location(), reserved[0]);
        assert_eq!(fx.ctx.pregen_queue().len(), 1);
        assert_eq!(fx.ctx.store().load_pregen().expect("queue").len(), 1);
    }

    #[test]
    fn test_non_default_tier_skips_queue() {
        let fx = fixture();
        fx.ctx.pregenerate(1).expect("pregenerate");
        fx.ctx.world().tick();

        let tier = fx.ctx.tiers().require("Gold").expect("tier");
        let mine = create(&fx.ctx, PlayerId::new_v4(), Some(tier)).expect("create");
        assert_eq!(fx.ctx.pregen_queue().len(), 1);
        assert_ne!(mine.location(), fx.ctx.pregen_queue().snapshot()[0].location);
    }

    #[test]
    fn test_second_mine_is_state_violation() {
        let fx = fixture();
        let owner = PlayerId::new_v4();
        create(&fx.ctx, owner, None).expect("create");
        let cursor = fx.ctx.allocator().cursor();
        assert!(matches!(create(&fx.ctx, owner, None), Err(Error::State(_))));
        // Nothing was allocated for the refused request
        assert_eq!(fx.ctx.allocator().cursor(), cursor);
    }

    #[test]
    fn test_unknown_template_leaves_no_mine() {
        let fx = fixture();
        let tier = fx.ctx.tiers().require("Stone").expect("tier");
        let broken = Arc::new(Tier { template: "absent.json".into(), ..(*tier).clone() });
        let owner = PlayerId::new_v4();
        let err = create_at(&fx.ctx, owner, IVec3::ZERO, broken, true).unwrap_err();
        assert!(err.is_transient());
        assert!(!fx.ctx.mines().contains(owner));
    }
}
