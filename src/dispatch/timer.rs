//! Completion timers: one-shot delayed tasks keyed by assignment.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use super::scheduler::Assignment;

/// Outstanding completion timers, one per live (bot, order) binding.
#[derive(Debug, Default)]
pub struct CompletionTimers {
    handles: HashMap<Assignment, JoinHandle<()>>,
}

impl CompletionTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `action` to run once after `delay`.
    ///
    /// An existing timer under the same key is aborted and replaced. Must be
    /// called from within a tokio runtime.
    pub fn arm<F>(&mut self, key: Assignment, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        });

        if let Some(previous) = self.handles.insert(key, handle) {
            previous.abort();
        }
        debug!(
            bot_id = %key.bot,
            order_id = %key.order,
            delay_ms = delay.as_millis() as u64,
            "Completion timer armed"
        );
    }

    /// Abort the timer for `key`. Returns false if none was armed.
    pub fn cancel(&mut self, key: &Assignment) -> bool {
        match self.handles.remove(key) {
            Some(handle) => {
                handle.abort();
                debug!(bot_id = %key.bot, order_id = %key.order, "Completion timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Forget the timer for `key` without aborting it. Called by the timer's
    /// own action when it fires.
    pub fn disarm(&mut self, key: &Assignment) {
        self.handles.remove(key);
    }

    /// Abort every outstanding timer. Returns how many were armed.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.handles.len();
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
        count
    }

    pub fn is_armed(&self, key: &Assignment) -> bool {
        self.handles.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl Drop for CompletionTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
