//! Instance snapshots with per-type caching

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use sdm_store::oxrdf::{GraphName, NamedNode, Quad, Subject, Term};
use sdm_store::vocab::{rdf, rdfs, skos};
use sdm_store::{format, QuadPattern, QuadStore, StoreError, StoreEvent, Subscription};
use tracing::{debug, warn};

/// Capability handed to form elements that render instance pickers
#[async_trait]
pub trait InstanceProvider: Send + Sync + Debug {
    /// N-Triples snapshot of the instances of `class`; empty when none are
    /// known or the lookup failed
    async fn instances_of(&self, class: &NamedNode) -> Arc<str>;
}

type Pending = Shared<BoxFuture<'static, Arc<str>>>;

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstanceCacheStats {
    /// Types with a cached snapshot
    pub cached_types: usize,
    /// Types with a computation underway
    pub in_flight: usize,
    /// Snapshots computed so far
    pub computations: usize,
    /// Per-type invalidations applied
    pub invalidations: usize,
}

struct Inner {
    store: Arc<QuadStore>,
    capacity: usize,
    attached: AtomicBool,
    completed: DashMap<NamedNode, Arc<str>>,
    in_flight: DashMap<NamedNode, (u64, Pending)>,
    /// Bumped per type on invalidation; a computation that straddles a bump
    /// is not cached
    generations: DashMap<NamedNode, u64>,
    /// Bumped on clear
    epoch: AtomicU64,
    next_token: AtomicU64,
    computations: AtomicUsize,
    invalidations: AtomicUsize,
}

impl Inner {
    fn generation(&self, class: &NamedNode) -> (u64, u64) {
        let per_type = self.generations.get(class).map_or(0, |g| *g);
        (self.epoch.load(Ordering::Acquire), per_type)
    }

    fn invalidate(&self, class: &NamedNode) {
        *self.generations.entry(class.clone()).or_insert(0) += 1;
        self.completed.remove(class);
        self.in_flight.remove(class);
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    fn invalidate_all(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.completed.clear();
        self.in_flight.clear();
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    fn on_event(&self, event: &StoreEvent) {
        match event {
            StoreEvent::Clear => {
                debug!("Store cleared; dropping every instance snapshot");
                self.invalidate_all();
            }
            StoreEvent::Put(quads) | StoreEvent::Delete(quads) => {
                let mut touched: Vec<&NamedNode> = quads
                    .iter()
                    .filter(|q| q.predicate.as_str() == rdf::TYPE.as_str())
                    .filter_map(|q| match &q.object {
                        Term::NamedNode(class) => Some(class),
                        _ => None,
                    })
                    .collect();
                touched.sort_by(|a, b| a.as_str().cmp(b.as_str()));
                touched.dedup();
                for class in touched {
                    debug!(class = %class, "Instance snapshot invalidated");
                    self.invalidate(class);
                }
            }
        }
    }

    fn remember(&self, class: &NamedNode, snapshot: Arc<str>) {
        if self.capacity == 0 {
            return;
        }
        if self.completed.len() >= self.capacity && !self.completed.contains_key(class) {
            let victim = self.completed.iter().next().map(|e| e.key().clone());
            if let Some(victim) = victim {
                self.completed.remove(&victim);
            }
        }
        self.completed.insert(class.clone(), snapshot);
    }

    async fn compute(&self, class: &NamedNode) -> Result<String, StoreError> {
        self.computations.fetch_add(1, Ordering::Relaxed);
        let typed = self
            .store
            .get(
                &QuadPattern::any()
                    .predicate(rdf::TYPE.into_owned())
                    .object(class.clone()),
            )
            .await?;

        let mut triples = Vec::with_capacity(typed.len() * 2);
        for quad in typed {
            let label = self.label_triple(&quad.subject).await?;
            triples.push(Quad::new(
                quad.subject,
                quad.predicate,
                quad.object,
                GraphName::DefaultGraph,
            ));
            triples.extend(label);
        }
        Ok(format::to_ntriples(&triples)?)
    }

    /// `skos:prefLabel`, else `rdfs:label`, else nothing
    async fn label_triple(&self, subject: &Subject) -> Result<Option<Quad>, StoreError> {
        let quads = self
            .store
            .get(&QuadPattern::any().subject(subject.clone()))
            .await?;
        let label = [skos::PREF_LABEL, rdfs::LABEL].iter().find_map(|predicate| {
            quads
                .iter()
                .filter(|q| q.predicate.as_str() == predicate.as_str())
                .filter(|q| matches!(q.object, Term::Literal(_)))
                .min_by(|a, b| a.object.to_string().cmp(&b.object.to_string()))
        });
        Ok(label.map(|q| {
            Quad::new(
                q.subject.clone(),
                q.predicate.clone(),
                q.object.clone(),
                GraphName::DefaultGraph,
            )
        }))
    }
}

/// Store-backed [`InstanceProvider`] with per-type caching
///
/// Subscribes to the store on construction; [`detach`](Self::detach) (or
/// dropping the provider) unsubscribes.
pub struct ClassInstanceProvider {
    inner: Arc<Inner>,
    subscription: Mutex<Option<Subscription>>,
}

impl ClassInstanceProvider {
    /// Default number of cached types
    pub const DEFAULT_CAPACITY: usize = 512;

    /// Create provider over `store`
    #[must_use]
    pub fn new(store: Arc<QuadStore>) -> Self {
        Self::with_capacity(store, Self::DEFAULT_CAPACITY)
    }

    /// Create provider caching at most `capacity` types
    #[must_use]
    pub fn with_capacity(store: Arc<QuadStore>, capacity: usize) -> Self {
        let inner = Arc::new(Inner {
            store,
            capacity,
            attached: AtomicBool::new(true),
            completed: DashMap::new(),
            in_flight: DashMap::new(),
            generations: DashMap::new(),
            epoch: AtomicU64::new(0),
            next_token: AtomicU64::new(0),
            computations: AtomicUsize::new(0),
            invalidations: AtomicUsize::new(0),
        });
        let weak: Weak<Inner> = Arc::downgrade(&inner);
        let subscription = inner.store.subscribe(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.on_event(event);
            }
        });
        Self {
            inner,
            subscription: Mutex::new(Some(subscription)),
        }
    }

    /// Stop listening for store changes; cached snapshots are dropped since
    /// they can no longer be kept coherent
    pub fn detach(&self) {
        if let Some(subscription) = self.subscription.lock().take() {
            subscription.unsubscribe();
            self.inner.attached.store(false, Ordering::Release);
            self.inner.invalidate_all();
        }
    }

    /// Whether the provider still receives store events
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.subscription
            .lock()
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    /// Snapshot of `class`, computing it at most once for concurrent callers
    pub async fn snapshot(&self, class: &NamedNode) -> Arc<str> {
        if let Some(hit) = self.inner.completed.get(class).map(|e| Arc::clone(e.value())) {
            return hit;
        }

        let pending = self.pending(class);
        pending.await
    }

    fn pending(&self, class: &NamedNode) -> Pending {
        if let Some(existing) = self.inner.in_flight.get(class).map(|e| e.value().1.clone()) {
            return existing;
        }

        let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);
        let weak = Arc::downgrade(&self.inner);
        let key = class.clone();
        let future: BoxFuture<'static, Arc<str>> = async move {
            let Some(inner) = weak.upgrade() else {
                return Arc::from("");
            };
            let started = inner.generation(&key);
            let result = inner.compute(&key).await;
            let fresh = inner.generation(&key) == started;
            let snapshot: Arc<str> = match result {
                Ok(text) => {
                    let snapshot: Arc<str> = Arc::from(text);
                    if fresh && inner.attached.load(Ordering::Acquire) {
                        inner.remember(&key, Arc::clone(&snapshot));
                    }
                    snapshot
                }
                Err(e) => {
                    warn!(class = %key, error = %e, "Instance lookup failed");
                    Arc::from("")
                }
            };
            inner.in_flight.remove_if(&key, |_, (t, _)| *t == token);
            snapshot
        }
        .boxed();

        let shared = future.shared();
        self.inner
            .in_flight
            .insert(class.clone(), (token, shared.clone()));
        shared
    }

    /// Drop the snapshot of `class`
    pub fn invalidate(&self, class: &NamedNode) {
        self.inner.invalidate(class);
    }

    /// Drop every snapshot
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Whether a completed snapshot of `class` is cached
    #[must_use]
    pub fn is_cached(&self, class: &NamedNode) -> bool {
        self.inner.completed.contains_key(class)
    }

    /// Number of snapshot computations run so far
    #[must_use]
    pub fn computations(&self) -> usize {
        self.inner.computations.load(Ordering::Relaxed)
    }

    /// Current counters
    #[must_use]
    pub fn stats(&self) -> InstanceCacheStats {
        InstanceCacheStats {
            cached_types: self.inner.completed.len(),
            in_flight: self.inner.in_flight.len(),
            computations: self.computations(),
            invalidations: self.inner.invalidations.load(Ordering::Relaxed),
        }
    }
}

impl Debug for ClassInstanceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInstanceProvider")
            .field("stats", &self.stats())
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[async_trait]
impl InstanceProvider for ClassInstanceProvider {
    async fn instances_of(&self, class: &NamedNode) -> Arc<str> {
        self.snapshot(class).await
    }
}
