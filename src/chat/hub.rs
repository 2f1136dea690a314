use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

type Subscribers = HashMap<Uuid, mpsc::UnboundedSender<String>>;

/// Fan-out of streamed tokens to every connected event subscriber.
///
/// Each subscriber owns an unbounded queue, so a slow reader never holds up
/// the producer. There is no replay: a subscriber only sees what is broadcast
/// after it subscribed.
#[derive(Debug, Default)]
pub struct EventHub {
    subscribers: Mutex<Subscribers>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn subscribers(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers().insert(id, tx);
        debug!("Event subscriber {} connected", id);

        Subscription {
            id,
            rx,
            hub: Arc::clone(self),
        }
    }

    pub fn unsubscribe(&self, id: Uuid) -> bool {
        let removed = self.subscribers().remove(&id).is_some();
        if removed {
            debug!("Event subscriber {} disconnected", id);
        }
        removed
    }

    /// Delivers `payload` to every live subscriber and returns how many got it.
    /// Subscribers whose receiving end is gone are dropped.
    pub fn broadcast(&self, payload: &str) -> usize {
        let mut subscribers = self.subscribers();
        subscribers.retain(|_, tx| tx.send(payload.to_string()).is_ok());
        subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers().len()
    }
}

/// A live registration in the [`EventHub`]. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    id: Uuid,
    rx: mpsc::UnboundedReceiver<String>,
    hub: Arc<EventHub>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.id);
    }
}
