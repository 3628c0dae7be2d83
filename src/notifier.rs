use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};

use crate::storage::ContextId;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    /// `None` when the key was removed.
    pub new_value: Option<String>,
    pub source: ContextId,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<StorageEvent>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Notifier {
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: StorageEvent) {
        // no receivers is the common case
        let _ = self.sender.send(event);
    }

    pub fn listen(&self, context: ContextId) -> StorageListener {
        StorageListener {
            receiver: self.sender.subscribe(),
            context,
        }
    }
}

pub struct StorageListener {
    receiver: broadcast::Receiver<StorageEvent>,
    context: ContextId,
}

impl StorageListener {
    pub fn try_next(&mut self) -> Option<StorageEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if event.source == self.context => continue,
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "storage listener lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    pub async fn next(&mut self) -> Option<StorageEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.source == self.context => continue,
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "storage listener lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Pending foreign events touching `key`, draining everything queued.
    pub fn drain_for(&mut self, key: &str) -> Vec<StorageEvent> {
        let mut out = Vec::new();
        while let Some(event) = self.try_next() {
            if event.key == key {
                out.push(event);
            }
        }
        out
    }
}
