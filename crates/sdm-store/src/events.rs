//! Change notification
//!
//! Listeners are plain callbacks invoked synchronously, in subscription
//! order, after a mutation is durable and before the mutating call returns.

use oxrdf::Quad;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Kind of store mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Quads were inserted
    Put,
    /// Quads were removed
    Delete,
    /// The store was emptied
    Clear,
}

/// Event delivered to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Quads asserted by one `put` (or the insert half of a `replace`)
    Put(Arc<[Quad]>),
    /// Quads retracted by one `delete` (or the delete half of a `replace`)
    Delete(Arc<[Quad]>),
    /// Every quad was removed
    Clear,
}

impl StoreEvent {
    /// Kind of this event
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Put(_) => ChangeKind::Put,
            Self::Delete(_) => ChangeKind::Delete,
            Self::Clear => ChangeKind::Clear,
        }
    }

    /// Affected quads (empty for `Clear`)
    #[inline]
    #[must_use]
    pub fn quads(&self) -> &[Quad] {
        match self {
            Self::Put(quads) | Self::Delete(quads) => quads,
            Self::Clear => &[],
        }
    }
}

type Listener = Arc<dyn Fn(&StoreEvent) + Send + Sync>;
type Slots = RwLock<Vec<(u64, Listener)>>;

/// Ordered set of listeners
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    slots: Arc<Slots>,
    next_id: AtomicU64,
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listener_count", &self.len())
            .finish()
    }
}

impl ListenerRegistry {
    pub(crate) fn subscribe(&self, listener: Listener) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.slots.write().push((id, listener));
        Subscription {
            id,
            slots: Arc::downgrade(&self.slots),
            active: AtomicBool::new(true),
        }
    }

    pub(crate) fn emit(&self, event: &StoreEvent) {
        // Snapshot so a listener may unsubscribe from inside its callback
        let listeners: Vec<Listener> = self
            .slots
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.read().len()
    }
}

/// Handle returned by `QuadStore::subscribe`
///
/// Dropping the handle unsubscribes.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    slots: Weak<Slots>,
    active: AtomicBool,
}

impl Subscription {
    /// Stop receiving future events; calling again is a no-op
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(slots) = self.slots.upgrade() {
            slots.write().retain(|(id, _)| *id != self.id);
        }
    }

    /// Whether the listener is still registered
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire) && self.slots.strong_count() > 0
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
