//! The mine context: every shared component of the engine, wired once.
//!
//! Command handlers hold an `Arc<MineContext>` and call its entry points.
//! Nothing in the crate reaches for global state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::{MinesConfig, Settings};
use crate::core::types::{IVec3, PlayerId};
use crate::core::{Error, Result};
use crate::mine::{
    DeleteOutcome, ExpandOutcome, Mine, MineRegistry, ResetOutcome, UpgradeOutcome, factory,
};
use crate::placement::{self, PlotAllocator, PregenQueue};
use crate::services::Services;
use crate::storage::MineStore;
use crate::template::TemplateCache;
use crate::tier::TierCatalog;
use crate::world::WorldContext;

pub struct MineContext {
    settings: Settings,
    tiers: TierCatalog,
    templates: TemplateCache,
    store: Arc<MineStore>,
    allocator: PlotAllocator,
    pregen: Arc<PregenQueue>,
    mines: MineRegistry,
    world: Arc<WorldContext>,
    services: Services,
    owner_locks: Mutex<HashMap<PlayerId, Arc<Mutex<()>>>>,
}

impl MineContext {
    /// Validate the configuration, register tiers, open the store and
    /// resume the allocator.
    ///
    /// A tier whose definition or template is broken is logged and
    /// skipped; the remaining tiers keep their relative order.
    pub fn new(config: MinesConfig, world: Arc<WorldContext>, services: Services) -> Result<Arc<Self>> {
        let MinesConfig { settings, tiers: tier_configs } = config;
        settings.validate()?;

        let store = Arc::new(MineStore::open(&settings.data_dir)?);
        let templates = TemplateCache::new(&settings.template_dir, settings.markers.clone());

        let mut tiers = TierCatalog::new();
        for tier in tier_configs {
            let name = tier.name.clone();
            if let Err(e) = templates.get(&tier.template) {
                log::error!("Skipping tier {}: template {} unusable: {}", name, tier.template, e);
                continue;
            }
            if let Err(e) = tiers.register(tier, settings.default_reset_minutes) {
                log::error!("Skipping tier {}: {}", name, e);
            }
        }
        if tiers.is_empty() {
            log::warn!("No usable tiers configured; mines cannot be created");
        } else {
            log::info!("Registered {} tiers", tiers.len());
        }

        let allocator = PlotAllocator::open(settings.spacing, settings.y_level, Arc::clone(&store))?;
        let pregen = Arc::new(PregenQueue::open(Arc::clone(&store))?);

        Ok(Arc::new(Self {
            settings,
            tiers,
            templates,
            store,
            allocator,
            pregen,
            mines: MineRegistry::new(),
            world,
            services,
            owner_locks: Mutex::new(HashMap::new()),
        }))
    }

    /// Load persisted mines, protect them and start their tasks.
    /// Returns how many were restored.
    pub fn restore(self: &Arc<Self>) -> Result<usize> {
        let mut restored = 0;
        for data in self.store.load_mines()? {
            let owner = data.owner;
            let tier = match self.tiers.require(&data.tier) {
                Ok(tier) => tier,
                Err(e) => {
                    log::warn!("Not restoring {}'s mine: {}", owner, e);
                    continue;
                }
            };
            let template = match self.templates.get(&tier.template) {
                Ok(template) => template,
                Err(e) => {
                    log::warn!("Not restoring {}'s mine: {}", owner, e);
                    continue;
                }
            };

            let mine = Arc::new(Mine::new(data, tier, template));
            mine.protect(self)?;
            self.mines.insert(Arc::clone(&mine))?;
            mine.start_tasks(self);
            restored += 1;
        }
        log::info!(
            "Restored {} mines, {} pregenerated plots waiting",
            restored,
            self.pregen.len()
        );
        Ok(restored)
    }

    /// Persist every mine, the pregenerated queue and the cursor
    pub fn save_all(&self) -> Result<()> {
        let mines = self.mines.all();
        for mine in &mines {
            mine.save(&self.store)?;
        }
        self.pregen.save()?;
        self.store.save_cursor(self.allocator.cursor())?;
        log::info!("Saved {} mines", mines.len());
        Ok(())
    }

    /// Cancel every mine's scheduled tasks
    pub fn stop_all_tasks(&self) {
        for mine in self.mines.all() {
            mine.stop_tasks();
        }
    }

    /// Lock serialising check-then-act sequences for one owner
    pub fn owner_lock(&self, owner: PlayerId) -> Arc<Mutex<()>> {
        let mut locks = self.owner_locks.lock().unwrap();
        Arc::clone(locks.entry(owner).or_default())
    }

    /// The owner's mine, or a state violation when they have none
    pub fn mine(&self, owner: PlayerId) -> Result<Arc<Mine>> {
        self.mines
            .get(owner)
            .ok_or_else(|| Error::state(format!("{} has no mine", owner)))
    }

    pub fn create_mine(self: &Arc<Self>, owner: PlayerId) -> Result<Arc<Mine>> {
        factory::create(self, owner, None)
    }

    pub fn create_mine_with_tier(self: &Arc<Self>, owner: PlayerId, tier: &str) -> Result<Arc<Mine>> {
        let tier = self.tiers.require(tier)?;
        factory::create(self, owner, Some(tier))
    }

    pub fn reset_mine(&self, owner: PlayerId) -> Result<ResetOutcome> {
        self.mine(owner)?.reset(self)
    }

    pub fn expand_mine(self: &Arc<Self>, owner: PlayerId) -> Result<ExpandOutcome> {
        self.mine(owner)?.expand(self)
    }

    pub fn upgrade_mine(self: &Arc<Self>, owner: PlayerId) -> Result<UpgradeOutcome> {
        self.mine(owner)?.upgrade(self)
    }

    pub fn delete_mine(&self, owner: PlayerId, remove_structure: bool) -> Result<DeleteOutcome> {
        self.mine(owner)?.delete(self, remove_structure)
    }

    pub fn ban(&self, owner: PlayerId, player: PlayerId) -> Result<bool> {
        self.mine(owner)?.ban(self, player)
    }

    pub fn unban(&self, owner: PlayerId, player: PlayerId) -> Result<bool> {
        self.mine(owner)?.unban(self, player)
    }

    /// Reserve `count` plots for the default tier and queue their stamping.
    /// Records become claimable as the world context applies the jobs.
    pub fn pregenerate(&self, count: usize) -> Result<Vec<IVec3>> {
        let tier = self
            .tiers
            .default_tier()
            .ok_or_else(|| Error::config("no tiers are configured"))?;
        let template = self.templates.get(&tier.template)?;
        placement::generate(
            count,
            &template,
            &self.allocator,
            self.settings.rotation,
            self.settings.clearance,
            &self.world,
            &self.pregen,
        )
    }

    /// Drop every pregenerated record, returning how many were dropped
    pub fn purge_pregen(&self) -> Result<usize> {
        let dropped = self.pregen.purge()?;
        log::info!("Purged {} pregenerated plots", dropped);
        Ok(dropped)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tiers(&self) -> &TierCatalog {
        &self.tiers
    }

    pub fn templates(&self) -> &TemplateCache {
        &self.templates
    }

    pub fn store(&self) -> &Arc<MineStore> {
        &self.store
    }

    pub fn allocator(&self) -> &PlotAllocator {
        &self.allocator
    }

    pub fn pregen_queue(&self) -> &Arc<PregenQueue> {
        &self.pregen
    }

    pub fn mines(&self) -> &MineRegistry {
        &self.mines
    }

    pub fn world(&self) -> &Arc<WorldContext> {
        &self.world
    }

    pub fn services(&self) -> &Services {
        &self.services
    }
}
