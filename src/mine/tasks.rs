//! The two repeating checks every mine runs on the world context

use std::sync::{Arc, Weak};

use crate::context::MineContext;
use crate::core::types::minutes_to_ticks;
use crate::mine::instance::Mine;
use crate::world::TaskHandle;

/// Handles of a mine's scheduled tasks
#[derive(Debug, Default)]
pub struct MineTasks {
    pub(crate) reset: Option<TaskHandle>,
    pub(crate) percentage: Option<TaskHandle>,
}

impl Mine {
    /// Start (or restart) both repeating tasks
    pub fn start_tasks(self: &Arc<Self>, ctx: &Arc<MineContext>) {
        self.start_reset_task(ctx);
        self.start_percentage_task(ctx);
    }

    /// Reset on the tier's fixed interval
    pub fn start_reset_task(self: &Arc<Self>, ctx: &Arc<MineContext>) {
        let period = minutes_to_ticks(self.tier().reset_minutes).max(1);
        let (mine, context) = (Arc::downgrade(self), Arc::downgrade(ctx));
        let handle = ctx.world().run_repeating(
            period,
            period,
            Arc::new(move || {
                let Some((mine, ctx)) = upgrade_pair(&mine, &context) else {
                    return;
                };
                if let Err(e) = mine.reset(&ctx) {
                    log::error!("Scheduled reset of {}'s mine failed: {}", mine.owner(), e);
                }
            }),
        );
        if let Some(old) = self.tasks.lock().unwrap().reset.replace(handle) {
            old.cancel();
        }
    }

    /// Reset once the mined share reaches the tier's threshold
    pub fn start_percentage_task(self: &Arc<Self>, ctx: &Arc<MineContext>) {
        let period = ctx.settings().percentage_check_ticks.max(1);
        let (mine, context) = (Arc::downgrade(self), Arc::downgrade(ctx));
        let handle = ctx.world().run_repeating(
            period,
            period,
            Arc::new(move || {
                let Some((mine, ctx)) = upgrade_pair(&mine, &context) else {
                    return;
                };
                if let Err(e) = mine.check_depletion(&ctx) {
                    log::error!("Depletion check of {}'s mine failed: {}", mine.owner(), e);
                }
            }),
        );
        if let Some(old) = self.tasks.lock().unwrap().percentage.replace(handle) {
            old.cancel();
        }
    }

    /// Cancel both tasks. Each handle is cancelled on its own, whatever
    /// state the other is in.
    pub fn stop_tasks(&self) {
        let mut tasks = self.tasks.lock().unwrap();
        if let Some(handle) = tasks.reset.take() {
            handle.cancel();
        }
        if let Some(handle) = tasks.percentage.take() {
            handle.cancel();
        }
    }

    /// Whether the (reset, percentage) tasks are scheduled
    pub fn tasks_running(&self) -> (bool, bool) {
        let tasks = self.tasks.lock().unwrap();
        let live = |h: &Option<TaskHandle>| h.as_ref().is_some_and(|h| !h.is_cancelled());
        (live(&tasks.reset), live(&tasks.percentage))
    }
}

fn upgrade_pair(mine: &Weak<Mine>, ctx: &Weak<MineContext>) -> Option<(Arc<Mine>, Arc<MineContext>)> {
    Some((mine.upgrade()?, ctx.upgrade()?))
}
