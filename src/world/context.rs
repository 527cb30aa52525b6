//! The single world-mutation execution context

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

use crate::world::scheduler::{Scheduler, TaskFn, TaskHandle, Tick};
use crate::world::voxel_world::VoxelWorld;

/// A voxel mutation marshalled onto the world context
pub type WorldJob = Box<dyn FnOnce(&mut VoxelWorld) + Send>;

/// What a single `tick()` did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub tick: Tick,
    pub jobs_run: usize,
    pub tasks_run: usize,
}

/// Owns the voxel world, a queue of marshalled mutations and the
/// repeating-task scheduler.
///
/// Background workers never touch voxels directly: they `submit` a job,
/// and the thread driving `tick()` applies it.
pub struct WorldContext {
    world: Mutex<VoxelWorld>,
    scheduler: Mutex<Scheduler>,
    job_tx: mpsc::UnboundedSender<WorldJob>,
    job_rx: Mutex<mpsc::UnboundedReceiver<WorldJob>>,
    queued: AtomicU64,
}

impl WorldContext {
    pub fn new(world: VoxelWorld) -> Self {
        let (job_tx, job_rx) = mpsc::unbounded_channel();
        Self {
            world: Mutex::new(world),
            scheduler: Mutex::new(Scheduler::new()),
            job_tx,
            job_rx: Mutex::new(job_rx),
            queued: AtomicU64::new(0),
        }
    }

    /// Run `f` with exclusive access to the world
    pub fn with_world<R>(&self, f: impl FnOnce(&mut VoxelWorld) -> R) -> R {
        let mut world = self.world.lock().unwrap();
        f(&mut *world)
    }

    /// Queue a mutation for the next tick. Safe to call from any thread.
    pub fn submit(&self, job: WorldJob) {
        self.queued.fetch_add(1, Ordering::AcqRel);
        if self.job_tx.send(job).is_err() {
            // Receiver lives as long as self, so this only happens mid-drop.
            self.queued.fetch_sub(1, Ordering::AcqRel);
            log::warn!("World context is shutting down; dropped a queued mutation");
        }
    }

    /// Number of submitted jobs not yet applied
    pub fn pending_jobs(&self) -> u64 {
        self.queued.load(Ordering::Acquire)
    }

    /// Schedule a repeating callback on this context
    pub fn run_repeating(&self, delay: Tick, period: Tick, task: TaskFn) -> TaskHandle {
        self.scheduler.lock().unwrap().run_repeating(delay, period, task)
    }

    pub fn current_tick(&self) -> Tick {
        self.scheduler.lock().unwrap().now()
    }

    /// Live repeating tasks
    pub fn active_tasks(&self) -> usize {
        self.scheduler.lock().unwrap().active_count()
    }

    /// Apply queued jobs, then run every repeating task that is due.
    pub fn tick(&self) -> TickReport {
        let jobs_run = self.drain_jobs();

        let (tick, due) = {
            let mut scheduler = self.scheduler.lock().unwrap();
            let due = scheduler.advance();
            (scheduler.now(), due)
        };

        let tasks_run = due.len();
        for task in due {
            task();
        }

        TickReport { tick, jobs_run, tasks_run }
    }

    /// Advance `ticks` ticks, returning the summed report
    pub fn tick_n(&self, ticks: u64) -> TickReport {
        let mut total = TickReport::default();
        for _ in 0..ticks {
            let report = self.tick();
            total.tick = report.tick;
            total.jobs_run += report.jobs_run;
            total.tasks_run += report.tasks_run;
        }
        total
    }

    fn drain_jobs(&self) -> usize {
        let mut run = 0;
        loop {
            // Take one job at a time so a job may submit follow-up work.
            let job = match self.job_rx.lock().unwrap().try_recv() {
                Ok(job) => job,
                Err(_) => break,
            };
            self.with_world(job);
            self.queued.fetch_sub(1, Ordering::AcqRel);
            run += 1;
        }
        run
    }
}

impl Default for WorldContext {
    fn default() -> Self {
        Self::new(VoxelWorld::new())
    }
}
