//! Tick sources for the timer engine.
//!
//! The engine never schedules anything itself. A [`TickScheduler`] hands out
//! one [`TickHandle`] per armed tick; when the tick fires, the handle is fed
//! back to [`TimerEngine::tick_from`](super::TimerEngine::tick_from), which
//! ignores handles it no longer considers pending.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

/// Identifies one scheduled tick. Handles are never reused by a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

pub trait TickScheduler {
    /// Arrange for `handle` to be delivered once after `delay`.
    fn schedule_tick(&mut self, delay: Duration) -> TickHandle;

    /// Withdraw a scheduled tick. Unknown or already-fired handles are ignored.
    fn cancel(&mut self, handle: TickHandle);
}

/// Deterministic virtual clock.
///
/// Time only moves when [`advance`](Self::advance) is called, which returns
/// the handles that came due, in order.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    due: BTreeMap<(Duration, u64), TickHandle>,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of ticks currently scheduled.
    pub fn pending(&self) -> usize {
        self.due.len()
    }

    /// Number of successful `cancel` calls so far.
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }

    /// Move the clock forward and drain every tick due at or before the new time.
    pub fn advance(&mut self, by: Duration) -> Vec<TickHandle> {
        self.now += by;
        let mut fired = Vec::new();
        while let Some((&(at, id), _)) = self.due.iter().next() {
            if at > self.now {
                break;
            }
            if let Some(handle) = self.due.remove(&(at, id)) {
                fired.push(handle);
            }
        }
        fired
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule_tick(&mut self, delay: Duration) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        self.due.insert((self.now + delay, handle.0), handle);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        let before = self.due.len();
        self.due.retain(|_, h| *h != handle);
        if self.due.len() < before {
            self.cancelled += 1;
        }
    }
}

/// Tick source backed by tokio timers.
///
/// Each scheduled tick is a task sleeping for `delay`, after which the
/// handle is sent on the channel returned by [`TokioScheduler::new`].
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct TokioScheduler {
    next_id: u64,
    tx: mpsc::UnboundedSender<TickHandle>,
    tasks: HashMap<TickHandle, AbortHandle>,
}

impl TokioScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TickHandle>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            next_id: 0,
            tx,
            tasks: HashMap::new(),
        };
        (scheduler, rx)
    }
}

impl TickScheduler for TokioScheduler {
    fn schedule_tick(&mut self, delay: Duration) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(handle);
        });
        // Finished tasks are dropped lazily so the map stays small.
        self.tasks.retain(|_, t| !t.is_finished());
        self.tasks.insert(handle, task.abort_handle());
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
        }
    }
}
