use std::{fmt::Debug, sync::Arc};

use thiserror::Error;
use uuid::Uuid;

use crate::notifier::{Notifier, StorageEvent, StorageListener};

mod file;
pub mod keys;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("quota exceeded writing {key} ({limit} bytes)")]
    QuotaExceeded { key: String, limit: usize },

    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file is not a JSON object: {0}")]
    Format(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

pub trait KeyValueStore: Send + Sync + Debug {
    /// Returns `Ok(None)` when the key does not exist.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(Uuid);

impl ContextId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Cloning keeps the context; `fork_context` opens a sibling one.
#[derive(Debug, Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueStore>,
    notifier: Notifier,
    context: ContextId,
}

impl Storage {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            notifier: Notifier::default(),
            context: ContextId::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn fork_context(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            notifier: self.notifier.clone(),
            context: ContextId::new(),
        }
    }

    pub fn context(&self) -> ContextId {
        self.context
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.backend.get(key)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.backend.set(key, value)?;
        self.notifier.publish(StorageEvent {
            key: key.to_string(),
            new_value: Some(value.to_string()),
            source: self.context,
        });
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.backend.remove(key)?;
        self.notifier.publish(StorageEvent {
            key: key.to_string(),
            new_value: None,
            source: self.context,
        });
        Ok(())
    }

    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.backend.keys()
    }

    /// Subscribes to writes made by other contexts on the same backend.
    pub fn listen(&self) -> StorageListener {
        self.notifier.listen(self.context)
    }
}
