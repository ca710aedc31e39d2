//! Quad store
//!
//! [`QuadStore`] is the sole owner of its backend. Every mutation is one
//! backend batch covering all four indexes, so a reader observes all quads of
//! a call or none. Mutations are serialized by a write lock; reads are not.

use crate::backend::{BatchOp, KvBackend, MemoryBackend};
use crate::codec::{self, IndexKind};
use crate::dataset::Dataset;
use crate::error::StoreError;
use crate::events::{ListenerRegistry, StoreEvent, Subscription};
use crate::format;
use crate::pattern::QuadPattern;
use oxrdf::Quad;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Pattern-queryable quad store with change notification
#[derive(Debug)]
pub struct QuadStore {
    /// Injected key-value medium
    backend: Arc<dyn KvBackend>,
    /// Change listeners
    listeners: ListenerRegistry,
    /// Serializes mutations so events arrive in call order
    write_lock: Mutex<()>,
}

impl QuadStore {
    /// Create store over a backend
    #[inline]
    #[must_use]
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            backend,
            listeners: ListenerRegistry::default(),
            write_lock: Mutex::new(()),
        }
    }

    /// Create store over a fresh in-memory backend
    #[inline]
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Insert quads
    ///
    /// No-op on empty input. Otherwise the quads are written in one batch and
    /// subscribers receive `StoreEvent::Put` with the deduplicated list.
    ///
    /// # Errors
    /// - `StoreError::Backend` if the batch fails (nothing is written)
    #[tracing::instrument(level = "debug", skip_all, fields(count = quads.len()))]
    pub async fn put(&self, quads: Vec<Quad>) -> Result<(), StoreError> {
        self.replace(Vec::new(), quads).await
    }

    /// Remove quads
    ///
    /// No-op on empty input. Subscribers receive `StoreEvent::Delete`.
    ///
    /// # Errors
    /// - `StoreError::Backend` if the batch fails (nothing is removed)
    #[tracing::instrument(level = "debug", skip_all, fields(count = quads.len()))]
    pub async fn delete(&self, quads: Vec<Quad>) -> Result<(), StoreError> {
        self.replace(quads, Vec::new()).await
    }

    /// Remove and insert quads in one atomic batch
    ///
    /// A quad present in both lists ends up stored. Subscribers receive a
    /// `Delete` event then a `Put` event, each only when its list is non-empty.
    ///
    /// # Errors
    /// - `StoreError::Backend` if the batch fails (nothing changes)
    pub async fn replace(&self, removed: Vec<Quad>, added: Vec<Quad>) -> Result<(), StoreError> {
        let added = dedup(added);
        let removed: Vec<Quad> = {
            let added_set: HashSet<&Quad> = added.iter().collect();
            dedup(removed)
                .into_iter()
                .filter(|quad| !added_set.contains(quad))
                .collect()
        };

        if removed.is_empty() && added.is_empty() {
            return Ok(());
        }

        let ops = batch_ops(&removed, &added);
        let _guard = self.write_lock.lock().await;
        self.backend.batch(ops).await?;
        tracing::debug!(removed = removed.len(), added = added.len(), "Batch committed");

        if !removed.is_empty() {
            self.listeners.emit(&StoreEvent::Delete(removed.into()));
        }
        if !added.is_empty() {
            self.listeners.emit(&StoreEvent::Put(added.into()));
        }
        Ok(())
    }

    /// Swap the statement set `previous` for `next` in one atomic batch
    ///
    /// Only the difference is written, but subscribers see the whole swap:
    /// a `Delete` event carrying all of `previous`, then a `Put` event
    /// carrying all of `next`. Nothing is written and no event fires when the
    /// two sets are equal.
    ///
    /// # Errors
    /// - `StoreError::Backend` if the batch fails (nothing changes)
    #[tracing::instrument(level = "debug", skip_all, fields(previous = previous.len(), next = next.len()))]
    pub async fn rewrite(&self, previous: Vec<Quad>, next: Vec<Quad>) -> Result<(), StoreError> {
        let previous = dedup(previous);
        let next = dedup(next);
        let ops = {
            let previous_set: HashSet<&Quad> = previous.iter().collect();
            let next_set: HashSet<&Quad> = next.iter().collect();
            let removed: Vec<Quad> = previous
                .iter()
                .filter(|quad| !next_set.contains(quad))
                .cloned()
                .collect();
            let added: Vec<Quad> = next
                .iter()
                .filter(|quad| !previous_set.contains(quad))
                .cloned()
                .collect();
            if removed.is_empty() && added.is_empty() {
                return Ok(());
            }
            batch_ops(&removed, &added)
        };

        let _guard = self.write_lock.lock().await;
        self.backend.batch(ops).await?;
        tracing::debug!(previous = previous.len(), next = next.len(), "Rewrite committed");

        if !previous.is_empty() {
            self.listeners.emit(&StoreEvent::Delete(previous.into()));
        }
        if !next.is_empty() {
            self.listeners.emit(&StoreEvent::Put(next.into()));
        }
        Ok(())
    }

    /// All quads matching a pattern (unordered)
    ///
    /// An undecodable record is treated as storage-format corruption: the
    /// store is cleared and an empty result returned instead of an error.
    ///
    /// # Errors
    /// - `StoreError::Backend` if the scan (or the recovery clear) fails
    pub async fn get(&self, pattern: &QuadPattern) -> Result<Vec<Quad>, StoreError> {
        let plan = codec::plan(pattern);
        let entries = self.backend.scan_prefix(&plan.prefix).await?;

        let mut quads = Vec::with_capacity(entries.len());
        for (key, _) in entries {
            match codec::decode_key(&key) {
                Ok(quad) => {
                    if plan.exact || pattern.matches(&quad) {
                        quads.push(quad);
                    }
                }
                Err(e) => {
                    tracing::error!(
                        index = ?plan.index,
                        error = %e,
                        "Undecodable record, clearing store"
                    );
                    self.clear().await?;
                    return Ok(Vec::new());
                }
            }
        }
        Ok(quads)
    }

    /// Same as [`get`](Self::get), materialized into a [`Dataset`]
    ///
    /// # Errors
    /// - `StoreError::Backend` if the scan fails
    pub async fn get_dataset(&self, pattern: &QuadPattern) -> Result<Dataset, StoreError> {
        Ok(self.get(pattern).await?.into_iter().collect())
    }

    /// Check whether a quad is stored
    ///
    /// # Errors
    /// - `StoreError::Backend` if the lookup fails
    pub async fn contains(&self, quad: &Quad) -> Result<bool, StoreError> {
        let key = codec::encode_key(IndexKind::Spog, quad);
        Ok(self.backend.get(&key).await?.is_some())
    }

    /// Number of stored quads
    ///
    /// # Errors
    /// - `StoreError::Backend` if the scan fails
    pub async fn len(&self) -> Result<usize, StoreError> {
        let entries = self.backend.scan_prefix(&[IndexKind::Spog.tag()]).await?;
        Ok(entries.len())
    }

    /// Whether the store holds no quads
    ///
    /// # Errors
    /// - `StoreError::Backend` if the scan fails
    pub async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len().await? == 0)
    }

    /// Remove every quad and emit `StoreEvent::Clear`
    ///
    /// # Errors
    /// - `StoreError::Backend` if the backend cannot be cleared
    pub async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.backend.clear().await?;
        tracing::info!("Store cleared");
        self.listeners.emit(&StoreEvent::Clear);
        Ok(())
    }

    /// Register a change listener
    ///
    /// The listener runs synchronously inside the mutating call, after the
    /// batch is durable. Keep the returned handle alive for as long as
    /// events are wanted.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.listeners.subscribe(Arc::new(listener))
    }

    /// Number of registered listeners
    #[inline]
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Serialize every stored quad as N-Quads
    ///
    /// # Errors
    /// - `StoreError::Backend` if the scan fails
    /// - `StoreError::Format` if serialization fails
    pub async fn export_nquads(&self) -> Result<String, StoreError> {
        let quads = self.get(&QuadPattern::any()).await?;
        Ok(format::to_nquads(&quads)?)
    }

    /// Parse N-Quads text and insert every quad in one batch
    ///
    /// Returns the number of distinct quads read.
    ///
    /// # Errors
    /// - `StoreError::Format` if the text is not valid N-Quads (nothing is written)
    /// - `StoreError::Backend` if the batch fails
    pub async fn import_nquads(&self, text: &str) -> Result<usize, StoreError> {
        let quads = dedup(format::parse_nquads(text)?);
        let count = quads.len();
        self.put(quads).await?;
        Ok(count)
    }

    /// Close the backend
    ///
    /// # Errors
    /// - `StoreError::Backend` if the backend fails to close
    pub async fn close(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.backend.close().await?;
        Ok(())
    }
}

/// Drop duplicate quads, keeping first-seen order
fn batch_ops(removed: &[Quad], added: &[Quad]) -> Vec<BatchOp> {
    let mut ops = Vec::with_capacity((removed.len() + added.len()) * IndexKind::ALL.len());
    for quad in removed {
        ops.extend(codec::encode_all(quad).into_iter().map(|key| BatchOp::Delete { key }));
    }
    for quad in added {
        ops.extend(
            codec::encode_all(quad)
                .into_iter()
                .map(|key| BatchOp::Put { key, value: Vec::new() }),
        );
    }
    ops
}

fn dedup(quads: Vec<Quad>) -> Vec<Quad> {
    let mut seen = HashSet::with_capacity(quads.len());
    quads
        .into_iter()
        .filter(|quad| seen.insert(quad.clone()))
        .collect()
}
