use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::oneshot;
use uuid::Uuid;

type Handles = HashMap<Uuid, oneshot::Sender<()>>;

/// In-flight streaming calls, each with its own cancellation handle.
#[derive(Debug, Default)]
pub struct StreamRegistry {
    active: Mutex<Handles>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn active(&self) -> MutexGuard<'_, Handles> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Allocates a stream id. The returned receiver resolves when the stream
    /// is cancelled.
    pub fn register(&self) -> (Uuid, oneshot::Receiver<()>) {
        let id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        self.active().insert(id, tx);
        (id, rx)
    }

    /// Signals one stream. Returns false when it already finished or never existed.
    pub fn cancel(&self, id: Uuid) -> bool {
        match self.active().remove(&id) {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    /// Signals every in-flight stream and returns how many were signalled.
    pub fn cancel_all(&self) -> usize {
        let handles: Vec<_> = self.active().drain().collect();
        handles
            .into_iter()
            .filter(|(_, tx)| !tx.is_closed())
            .map(|(_, tx)| tx.send(()))
            .filter(Result::is_ok)
            .count()
    }

    /// Forgets a stream that ran to completion.
    pub fn finish(&self, id: Uuid) {
        self.active().remove(&id);
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.active().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.active().len()
    }

    pub fn is_empty(&self) -> bool {
        self.active().is_empty()
    }
}
