//! Cooperative tick-driven task scheduler
//!
//! A fixed roster of tagged task records, each with a period in base-tick
//! units. The base-tick interrupt advances every record's elapsed counter;
//! a record whose counter reaches its period is marked ready and reset.
//! The dispatch side consumes at most one ready task per scan pass, always
//! scanning from the top, which yields strict priority by registration
//! order: an earlier-registered ready task is always dispatched before a
//! later one, and a task cannot re-trigger until its full period elapses
//! again regardless of how long its last run took.
//!
//! Tasks are identified by a caller-supplied tag rather than a stored
//! callback; the owner matches on the returned tag to run the work. This
//! keeps the roster a plain data table.

use heapless::Vec;

/// One roster entry.
#[derive(Debug, Clone, Copy)]
struct Task<T> {
    id: T,
    period: u32,
    elapsed: u32,
    ready: bool,
}

/// Fixed-capacity cooperative scheduler.
///
/// The roster is fixed at startup: tasks are registered once and never
/// removed.
#[derive(Debug, Default)]
pub struct Scheduler<T, const N: usize> {
    tasks: Vec<Task<T>, N>,
}

impl<T: Copy, const N: usize> Scheduler<T, N> {
    pub const fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Add a task to the roster. Registration order is priority order.
    pub fn register(&mut self, id: T, period: u32) -> Result<(), &'static str> {
        if period == 0 {
            return Err("task period must be positive");
        }
        self.tasks
            .push(Task {
                id,
                period,
                elapsed: 0,
                ready: false,
            })
            .map_err(|_| "task roster full")
    }

    /// Base-tick entry point: advance every elapsed counter, marking any
    /// task that completed its period ready and resetting its counter.
    pub fn tick(&mut self) {
        for task in &mut self.tasks {
            task.elapsed += 1;
            if task.elapsed >= task.period {
                task.elapsed = 0;
                task.ready = true;
            }
        }
    }

    /// Consume the highest-priority ready task, if any.
    ///
    /// At most one task is returned per call; the caller restarts the
    /// scan from the top by calling again.
    pub fn next_ready(&mut self) -> Option<T> {
        for task in &mut self.tasks {
            if task.ready {
                task.ready = false;
                return Some(task.id);
            }
        }
        None
    }

    /// Clear all counters and ready flags, keeping the roster.
    pub fn restart(&mut self) {
        for task in &mut self.tasks {
            task.elapsed = 0;
            task.ready = false;
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
