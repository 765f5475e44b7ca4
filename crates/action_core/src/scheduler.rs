//! Deferred work for one editor instance.
//!
//! Time is virtual: the owner advances the clock (from a UI timer, or by
//! hand in tests) and runs whatever came due. Closing the scheduler cancels
//! every pending task and refuses new ones, so nothing scheduled before an
//! editor was torn down can run afterwards.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Scheduled<T> {
    handle: TaskHandle,
    due: Duration,
    task: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_handle: u64,
    queue: Vec<Scheduled<T>>,
    closed: bool,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_handle: 0,
            queue: Vec::new(),
            closed: false,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Queues `task` to run `delay` from now. Returns `None` once closed.
    pub fn schedule(&mut self, delay: Duration, task: T) -> Option<TaskHandle> {
        if self.closed {
            return None;
        }
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.queue.push(Scheduled {
            handle,
            due: self.now + delay,
            task,
        });
        Some(handle)
    }

    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.queue.len();
        self.queue.retain(|scheduled| scheduled.handle != handle);
        self.queue.len() != before
    }

    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.queue.len();
        self.queue.clear();
        cancelled
    }

    pub fn close(&mut self) -> usize {
        self.closed = true;
        self.cancel_all()
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.queue.iter().any(|scheduled| scheduled.handle == handle)
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// Time until the earliest pending task, if any.
    pub fn next_delay(&self) -> Option<Duration> {
        self.queue
            .iter()
            .map(|scheduled| scheduled.due.saturating_sub(self.now))
            .min()
    }

    /// Pops the earliest task due at or before `deadline`, moving the clock to
    /// its due time. Ties run in scheduling order.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<(TaskHandle, T)> {
        let ix = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, scheduled)| scheduled.due <= deadline)
            .min_by_key(|(_, scheduled)| (scheduled.due, scheduled.handle))
            .map(|(ix, _)| ix)?;
        let scheduled = self.queue.remove(ix);
        self.now = self.now.max(scheduled.due);
        Some((scheduled.handle, scheduled.task))
    }

    pub fn advance_to(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }

    /// Moves the clock forward and returns every task that came due, in order.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<T> {
        let deadline = self.now + elapsed;
        let mut due = Vec::new();
        while let Some((_, task)) = self.pop_due(deadline) {
            due.push(task);
        }
        self.advance_to(deadline);
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn tasks_run_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(MS * 100, "blur");
        scheduler.schedule(MS * 16, "sync");
        scheduler.schedule(MS * 16, "sync-2");
        assert_eq!(scheduler.advance(MS * 10), Vec::<&str>::new());
        assert_eq!(scheduler.advance(MS * 10), vec!["sync", "sync-2"]);
        assert_eq!(scheduler.next_delay(), Some(MS * 80));
        assert_eq!(scheduler.advance(MS * 200), vec!["blur"]);
        assert_eq!(scheduler.now(), MS * 220);
    }

    #[test]
    fn cancelled_and_closed_tasks_never_run() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(MS, 1).unwrap();
        scheduler.schedule(MS, 2);
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.is_pending(handle));
        assert_eq!(scheduler.close(), 1);
        assert_eq!(scheduler.schedule(MS, 3), None);
        assert!(scheduler.advance(MS * 10).is_empty());
    }
}
