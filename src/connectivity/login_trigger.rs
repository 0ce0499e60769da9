//! Deferred call into the node's login trigger.
//!
//! Calling `login()` from inside a state notification would re-enter the
//! node's dispatch, so the call is posted back to the workspace after a
//! debounce. Repeated schedules coalesce into one call.

use crate::workspace::WorkspaceEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug)]
pub struct LoginTrigger {
    delay: Duration,
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl LoginTrigger {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    /// Schedule the trigger, replacing any earlier schedule. Must be called
    /// from within a tokio runtime.
    pub fn schedule(&mut self, tx: &mpsc::UnboundedSender<WorkspaceEvent>) -> u64 {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let delay = self.delay;
        let tx = tx.clone();
        self.pending = Some(tokio::spawn(async move {
            if delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(delay).await;
            }
            let _ = tx.send(WorkspaceEvent::LoginTriggerDue { generation });
        }));
        log::debug!("Login trigger scheduled (generation {})", generation);
        generation
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
            log::debug!("Login trigger cancelled (generation {})", self.generation);
        }
    }

    /// Consume a due notification. `false` for a cancelled or superseded one.
    pub fn take_due(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.pending.is_none() {
            return false;
        }
        self.pending = None;
        true
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Drop for LoginTrigger {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn next_due(rx: &mut mpsc::UnboundedReceiver<WorkspaceEvent>) -> u64 {
        match rx.recv().await {
            Some(WorkspaceEvent::LoginTriggerDue { generation }) => generation,
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn repeated_schedules_coalesce() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut trigger = LoginTrigger::new(Duration::from_millis(20));

        trigger.schedule(&tx);
        trigger.schedule(&tx);
        let last = trigger.schedule(&tx);

        let due = next_due(&mut rx).await;
        assert_eq!(due, last);
        assert!(trigger.take_due(due));
        assert!(!trigger.is_pending());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn cancelled_trigger_is_not_taken() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut trigger = LoginTrigger::new(Duration::ZERO);

        let generation = trigger.schedule(&tx);
        let due = next_due(&mut rx).await;
        trigger.cancel();
        assert_eq!(due, generation);
        assert!(!trigger.take_due(due));
    }
}
