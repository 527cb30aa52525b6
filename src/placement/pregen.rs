//! Pregeneration: stamping plots ahead of demand.
//!
//! Plots are reserved serially, their geometry is computed on rayon
//! workers, and the stamping itself is marshalled onto the world context.
//! A record only enters the queue once its template is in the world.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::types::IVec3;
use crate::core::Result;
use crate::math::{Placement, Region, Rotation};
use crate::placement::allocator::PlotAllocator;
use crate::placement::layout::PlotLayout;
use crate::storage::MineStore;
use crate::template::Template;
use crate::world::{VoxelWorld, WorldContext};

/// A stamped plot waiting for an owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PregenMine {
    pub location: IVec3,
    pub spawn: IVec3,
    pub lower_rails: IVec3,
    pub upper_rails: IVec3,
    pub full: Region,
}

impl From<&PlotLayout> for PregenMine {
    fn from(layout: &PlotLayout) -> Self {
        Self {
            location: layout.plot,
            spawn: layout.spawn,
            lower_rails: layout.lower_rails,
            upper_rails: layout.upper_rails,
            full: layout.full,
        }
    }
}

/// FIFO of pregenerated plots, persisted on every change
#[derive(Debug, Default)]
pub struct PregenQueue {
    records: Mutex<VecDeque<PregenMine>>,
    store: Option<Arc<MineStore>>,
}

impl PregenQueue {
    /// In-memory queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue restored from the store
    pub fn open(store: Arc<MineStore>) -> Result<Self> {
        let records = store.load_pregen()?;
        if !records.is_empty() {
            log::info!("Loaded {} pregenerated plots", records.len());
        }
        Ok(Self {
            records: Mutex::new(records.into()),
            store: Some(store),
        })
    }

    fn persist(&self, records: &VecDeque<PregenMine>) -> Result<()> {
        if let Some(store) = &self.store {
            let records: Vec<_> = records.iter().cloned().collect();
            store.save_pregen(&records)?;
        }
        Ok(())
    }

    pub fn push(&self, record: PregenMine) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        records.push_back(record);
        self.persist(&records)
    }

    /// Take the oldest record
    pub fn claim(&self) -> Result<Option<PregenMine>> {
        let mut records = self.records.lock().unwrap();
        let Some(record) = records.pop_front() else {
            return Ok(None);
        };
        self.persist(&records)?;
        Ok(Some(record))
    }

    /// Drop every record, returning how many there were
    pub fn purge(&self) -> Result<usize> {
        let mut records = self.records.lock().unwrap();
        let dropped = records.len();
        records.clear();
        self.persist(&records)?;
        Ok(dropped)
    }

    /// Save the current contents
    pub fn save(&self) -> Result<()> {
        let records = self.records.lock().unwrap();
        self.persist(&records)
    }

    pub fn snapshot(&self) -> Vec<PregenMine> {
        self.records.lock().unwrap().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reserve `count` plots and queue a stamp job for each.
///
/// Returns the reserved plots. Records appear in `queue` as the world
/// context applies the jobs.
pub fn generate(
    count: usize,
    template: &Arc<Template>,
    allocator: &PlotAllocator,
    rotation: Rotation,
    clearance: i32,
    world: &WorldContext,
    queue: &Arc<PregenQueue>,
) -> Result<Vec<IVec3>> {
    let plots = (0..count)
        .map(|_| allocator.next_plot())
        .collect::<Result<Vec<_>>>()?;

    let layouts: Vec<PlotLayout> = plots
        .par_iter()
        .map(|plot| PlotLayout::compute(template, Placement::new(*plot, rotation), clearance))
        .collect();

    for layout in layouts {
        let template = Arc::clone(template);
        let queue = Arc::clone(queue);
        world.submit(Box::new(move |world: &mut VoxelWorld| {
            world.paste(&Placement::new(layout.plot, rotation), &template.blocks);
            if let Err(e) = queue.push(PregenMine::from(&layout)) {
                log::error!("Failed to queue pregenerated plot {}: {}", layout.plot, e);
            }
        }));
    }

    log::info!("Reserved {} plots for pregeneration", plots.len());
    Ok(plots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SentinelMarkers;
    use crate::core::types::IVec2;
    use crate::template::indexer::{index_file, tests::sample_file};
    use std::path::Path;
    use tempfile::TempDir;

    fn template() -> Arc<Template> {
        Arc::new(
            index_file(Path::new("mine.json"), &sample_file(), &SentinelMarkers::default())
                .expect("index"),
        )
    }

    fn record(x: i32) -> PregenMine {
        PregenMine {
            location: IVec3::new(x, 50, 0),
            spawn: IVec3::new(x, 50, 1),
            lower_rails: IVec3::ZERO,
            upper_rails: IVec3::ZERO,
            full: Region::point(IVec3::new(x, 50, 0)),
        }
    }

    #[test]
    fn test_queue_is_fifo_and_persisted() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let store = Arc::new(MineStore::open(temp_dir.path()).expect("open"));
        let queue = PregenQueue::open(Arc::clone(&store)).expect("open queue");
        queue.push(record(0)).expect("push");
        queue.push(record(150)).expect("push");

        assert_eq!(queue.claim().expect("claim"), Some(record(0)));
        let reopened = PregenQueue::open(store).expect("reopen queue");
        assert_eq!(reopened.snapshot(), vec![record(150)]);
    }

    #[test]
    fn test_purge_reports_count() {
        let queue = PregenQueue::new();
        queue.push(record(0)).expect("push");
        queue.push(record(150)).expect("push");
        assert_eq!(queue.purge().expect("purge"), 2);
        assert!(queue.is_empty());
        assert_eq!(queue.claim().expect("claim"), None);
    }

    #[test]
    fn test_generate_stamps_on_tick() {
        let template = template();
        let allocator = PlotAllocator::new(150, 50, IVec2::ZERO);
        let world = WorldContext::default();
        let queue = Arc::new(PregenQueue::new());

        let plots = generate(3, &template, &allocator, Rotation::None, 0, &world, &queue)
            .expect("generate");
        assert_eq!(plots.len(), 3);
        assert!(queue.is_empty());
        assert_eq!(world.pending_jobs(), 3);

        world.tick();
        assert_eq!(queue.len(), 3);
        assert_eq!(world.with_world(|w| w.solid_count()), 3 * template.block_count());
        let locations: Vec<_> = queue.snapshot().iter().map(|r| r.location).collect();
        assert_eq!(locations, plots);
        assert_eq!(queue.snapshot()[0].spawn, IVec3::new(0, 50, 1));
    }

    #[test]
    fn test_concurrent_generate_keeps_spacing() {
        let template = template();
        let allocator = Arc::new(PlotAllocator::new(150, 50, IVec2::ZERO));
        let world = Arc::new(WorldContext::default());
        let queue = Arc::new(PregenQueue::new());

        let workers: Vec<_> = (0..3)
            .map(|_| {
                let (template, allocator, world, queue) = (
                    Arc::clone(&template),
                    Arc::clone(&allocator),
                    Arc::clone(&world),
                    Arc::clone(&queue),
                );
                std::thread::spawn(move || {
                    generate(4, &template, &allocator, Rotation::None, 0, &world, &queue)
                        .expect("generate")
                })
            })
            .collect();
        for w in workers {
            w.join().expect("worker panicked");
        }
        world.tick();

        let plots: Vec<_> = queue.snapshot().iter().map(|r| r.location).collect();
        assert_eq!(plots.len(), 12);
        for (i, a) in plots.iter().enumerate() {
            for b in &plots[i + 1..] {
                let d = (*a - *b).abs();
                assert!(d.x.max(d.z) >= 150);
            }
        }
    }
}
