//! Real-time [`Scheduler`] backed by tokio sleep tasks.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use combat_core::{Scheduler, TimerId, Wakeup};

/// Fired timers, delivered back to the arena worker.
pub type FiredTimer = (TimerId, Wakeup);

/// Arms one sleep task per timer. A fired task sends its wakeup over a
/// channel instead of touching the arena, so every mutation stays on the
/// worker.
///
/// A timer cancelled after its task already sent is still known to be dead:
/// [`TokioScheduler::take_fired`] only accepts ids that are still armed.
pub struct TokioScheduler {
    next_id: u64,
    armed: HashMap<TimerId, JoinHandle<()>>,
    fired_tx: mpsc::UnboundedSender<FiredTimer>,
}

impl TokioScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FiredTimer>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            next_id: 0,
            armed: HashMap::new(),
            fired_tx,
        };
        (scheduler, fired_rx)
    }

    /// Claims a delivered timer. Returns false if it was cancelled meanwhile.
    pub fn take_fired(&mut self, timer: TimerId) -> bool {
        self.armed.remove(&timer).is_some()
    }

    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_after(&mut self, delay: Duration, wakeup: Wakeup) -> TimerId {
        let timer = TimerId(self.next_id);
        self.next_id += 1;

        let fired_tx = self.fired_tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The worker is gone when this fails; nothing left to wake.
            let _ = fired_tx.send((timer, wakeup));
        });
        self.armed.insert(timer, task);
        tracing::trace!(timer = timer.0, ?delay, ?wakeup, "timer armed");
        timer
    }

    fn cancel(&mut self, timer: TimerId) {
        if let Some(task) = self.armed.remove(&timer) {
            task.abort();
            tracing::trace!(timer = timer.0, "timer cancelled");
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for task in self.armed.values() {
            task.abort();
        }
    }
}
