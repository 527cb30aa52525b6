//! Tick-driven repeating task scheduler

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Scheduler time unit (one world tick)
pub type Tick = u64;

/// Callback run on the world-mutation context
pub type TaskFn = Arc<dyn Fn() + Send + Sync>;

/// Handle to a scheduled repeating task.
///
/// Cancelling is idempotent and takes effect before the task's next run,
/// regardless of whether it is currently executing.
#[derive(Clone, Debug)]
pub struct TaskHandle {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

struct ScheduledTask {
    id: u64,
    next_run: Tick,
    period: Tick,
    cancelled: Arc<AtomicBool>,
    run: TaskFn,
}

/// Repeating tasks keyed on the world tick counter
pub struct Scheduler {
    now: Tick,
    next_id: u64,
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_id: 1,
            tasks: Vec::new(),
        }
    }

    /// Current tick
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Run `task` after `delay` ticks and then every `period` ticks.
    /// A zero period is treated as one tick.
    pub fn run_repeating(&mut self, delay: Tick, period: Tick, task: TaskFn) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;
        let cancelled = Arc::new(AtomicBool::new(false));

        self.tasks.push(ScheduledTask {
            id,
            next_run: self.now + delay,
            period: period.max(1),
            cancelled: Arc::clone(&cancelled),
            run: task,
        });

        TaskHandle { id, cancelled }
    }

    /// Advance one tick and collect the callbacks that are due.
    ///
    /// Cancelled tasks are dropped here; the caller runs the returned
    /// callbacks without holding the scheduler.
    pub fn advance(&mut self) -> Vec<TaskFn> {
        self.now += 1;
        self.tasks.retain(|t| !t.cancelled.load(Ordering::Acquire));

        let now = self.now;
        let mut due = Vec::new();
        for task in self.tasks.iter_mut().filter(|t| t.next_run <= now) {
            due.push((task.id, Arc::clone(&task.run)));
            task.next_run = now + task.period;
        }
        due.sort_by_key(|(id, _)| *id);
        due.into_iter().map(|(_, run)| run).collect()
    }

    /// Number of live (not cancelled) tasks
    pub fn active_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| !t.cancelled.load(Ordering::Acquire))
            .count()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, TaskFn) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, Arc::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }))
    }

    fn run(scheduler: &mut Scheduler, ticks: u64) {
        for _ in 0..ticks {
            for task in scheduler.advance() {
                task();
            }
        }
    }

    #[test]
    fn test_repeating_period() {
        let mut scheduler = Scheduler::new();
        let (count, task) = counter();
        scheduler.run_repeating(5, 5, task);
        run(&mut scheduler, 4);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        run(&mut scheduler, 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        run(&mut scheduler, 10);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_cancel_stops_future_runs() {
        let mut scheduler = Scheduler::new();
        let (count, task) = counter();
        let handle = scheduler.run_repeating(1, 1, task);
        run(&mut scheduler, 3);
        handle.cancel();
        handle.cancel();
        run(&mut scheduler, 3);
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_handles_cancel_independently() {
        let mut scheduler = Scheduler::new();
        let (a_count, a) = counter();
        let (b_count, b) = counter();
        let a_handle = scheduler.run_repeating(1, 1, a);
        let _b_handle = scheduler.run_repeating(1, 1, b);
        a_handle.cancel();
        run(&mut scheduler, 2);
        assert_eq!(a_count.load(Ordering::SeqCst), 0);
        assert_eq!(b_count.load(Ordering::SeqCst), 2);
    }
}
