//! Single-slot cancelable deferred task.

use std::{future::Future, time::Duration};

use tokio::task::JoinHandle;

/// Holds at most one pending delayed task. Scheduling a new one aborts the
/// previous one; dropping the slot aborts whatever is pending.
#[derive(Debug, Default)]
pub struct DeferredTask {
    generation: u64,
    pending: Option<(u64, JoinHandle<()>)>,
}

impl DeferredTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the future built by `work` after `delay`, replacing anything
    /// already scheduled. `work` receives the ticket the task should pass to
    /// [`DeferredTask::release`] once it fires.
    pub fn schedule<W, F>(&mut self, delay: Duration, work: W) -> u64
    where
        W: FnOnce(u64) -> F,
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.generation += 1;
        let work = work(self.generation);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            work.await;
        });

        self.pending = Some((self.generation, handle));
        self.generation
    }

    /// Aborts the pending task, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some((_, handle)) => {
                let was_pending = !handle.is_finished();
                handle.abort();
                was_pending
            }
            None => false,
        }
    }

    /// Forgets the task with `ticket` without aborting it. Called by the task
    /// itself when it fires, so that the work it starts is not torn down by a
    /// subsequent `cancel`.
    pub fn release(&mut self, ticket: u64) -> bool {
        if matches!(self.pending, Some((current, _)) if current == ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|(_, h)| !h.is_finished())
    }
}

impl Drop for DeferredTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    fn counter_task(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut slot = DeferredTask::new();

        slot.schedule(Duration::from_secs(5), |_| counter_task(&fired));
        assert!(slot.is_pending());

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!slot.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_replaces_previous_task() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut slot = DeferredTask::new();

        slot.schedule(Duration::from_secs(5), |_| counter_task(&first));
        slot.schedule(Duration::from_secs(10), |_| counter_task(&second));

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_firing() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut slot = DeferredTask::new();

        slot.schedule(Duration::from_secs(1), |_| counter_task(&fired));
        assert!(slot.cancel());
        assert!(!slot.cancel());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending_task() {
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let mut slot = DeferredTask::new();
            slot.schedule(Duration::from_secs(1), |_| counter_task(&fired));
        }

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn release_only_matches_current_ticket() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut slot = DeferredTask::new();

        let old = slot.schedule(Duration::from_secs(60), |_| counter_task(&fired));
        let current = slot.schedule(Duration::from_secs(60), |_| counter_task(&fired));

        assert!(!slot.release(old));
        assert!(slot.is_pending());
        assert!(slot.release(current));
        assert!(!slot.is_pending());
    }
}
