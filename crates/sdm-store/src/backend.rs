//! Ordered key-value backend capability
//!
//! The store owns its index layout; a backend only has to keep bytes in key
//! order, apply batches atomically, and scan by prefix. [`MemoryBackend`] is
//! the bundled implementation, used by tests and the CLI.

use crate::error::BackendError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};

/// Single write inside an atomic batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    /// Insert or overwrite a key
    Put {
        /// Key bytes
        key: Vec<u8>,
        /// Value bytes
        value: Vec<u8>,
    },
    /// Remove a key (no-op if absent)
    Delete {
        /// Key bytes
        key: Vec<u8>,
    },
}

/// Ordered key-value medium the quad store persists into
///
/// Implement this trait to add a new storage medium.
#[async_trait]
pub trait KvBackend: Send + Sync + Debug + 'static {
    /// Read one key
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, BackendError>;

    /// Write one key
    async fn put(&self, key: Vec<u8>, value: Vec<u8>) -> Result<(), BackendError>;

    /// Remove one key
    async fn delete(&self, key: &[u8]) -> Result<(), BackendError>;

    /// Apply every operation or none
    async fn batch(&self, ops: Vec<BatchOp>) -> Result<(), BackendError>;

    /// All entries whose key starts with `prefix`, in key order
    async fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, BackendError>;

    /// Remove every entry
    async fn clear(&self) -> Result<(), BackendError>;

    /// Release the medium; later calls fail with `BackendError::Closed`
    async fn close(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// In-memory ordered backend
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    closed: AtomicBool,
}

impl MemoryBackend {
    /// Create empty backend
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of raw entries (all indexes)
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.read().len()
    }

    fn ensure_open(&self) -> Result<(), BackendError> {
        if self.closed.load(Ordering::Acquire) {
            Err(BackendError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, BackendError> {
        self.ensure_open()?;
        Ok(self.entries.read().get(key).cloned())
    }

    async fn put(&self, key: Vec<u8>, value: Vec<u8>) -> Result<(), BackendError> {
        self.ensure_open()?;
        self.entries.write().insert(key, value);
        Ok(())
    }

    async fn delete(&self, key: &[u8]) -> Result<(), BackendError> {
        self.ensure_open()?;
        self.entries.write().remove(key);
        Ok(())
    }

    async fn batch(&self, ops: Vec<BatchOp>) -> Result<(), BackendError> {
        self.ensure_open()?;
        // One write guard for the whole batch: readers see all of it or none
        let mut entries = self.entries.write();
        for op in ops {
            match op {
                BatchOp::Put { key, value } => {
                    entries.insert(key, value);
                }
                BatchOp::Delete { key } => {
                    entries.remove(&key);
                }
            }
        }
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, BackendError> {
        self.ensure_open()?;
        let entries = self.entries.read();
        Ok(entries
            .range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    async fn clear(&self) -> Result<(), BackendError> {
        self.ensure_open()?;
        self.entries.write().clear();
        Ok(())
    }

    async fn close(&self) -> Result<(), BackendError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
