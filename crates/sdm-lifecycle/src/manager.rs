//! Resource lifecycle manager
//!
//! Each resource lives in its own named graph. A save rewrites that graph as
//! a single store transaction: only the difference between the stored and
//! the submitted statement sets is written, while listeners see one removal
//! batch with the old graph contents and one insertion batch with the new.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sdm_shapes::ShapeDescriptor;
use sdm_store::oxrdf::{GraphName, NamedNode, Quad, Subject, Term};
use sdm_store::vocab::{rdf, rdfs, skos};
use sdm_store::{format, QuadPattern, QuadStore};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::audit::{self, Clock, SystemClock};
use crate::error::LifecycleError;
use crate::types::{
    default_graph_for, ExportFormat, Identifiers, ListOptions, RemovalOutcome, ResourceRecord,
    ResourceState, SaveOptions, SaveOutcome, StatementFormat,
};
use crate::validity::{is_validity_node, ValidityIris, ValidityWindow};

/// CRUD over shape-described resources
#[derive(Debug, Clone)]
pub struct ResourceManager {
    pub(crate) store: Arc<QuadStore>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl ResourceManager {
    /// Create manager over `store` using the wall clock
    #[must_use]
    pub fn new(store: Arc<QuadStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Create manager with an explicit clock
    #[must_use]
    pub fn with_clock(store: Arc<QuadStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Underlying store
    #[must_use]
    pub fn store(&self) -> &Arc<QuadStore> {
        &self.store
    }

    /// Current instant according to the manager's clock, truncated to the
    /// millisecond precision stamps are stored with
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        audit::stamp_precision(self.clock.now())
    }

    /// List non-retired instances of each descriptor's target type
    pub async fn list_resources(&self, descriptors: &[ShapeDescriptor]) -> Vec<ResourceRecord> {
        self.list_resources_with(descriptors, ListOptions::default())
            .await
    }

    /// List instances of each descriptor's target type, sorted by label
    ///
    /// A descriptor whose lookup fails is logged and skipped; the others are
    /// still listed.
    #[instrument(skip(self, descriptors), fields(descriptors = descriptors.len()))]
    pub async fn list_resources_with(
        &self,
        descriptors: &[ShapeDescriptor],
        options: ListOptions,
    ) -> Vec<ResourceRecord> {
        let now = self.now();
        let mut records = Vec::new();
        let mut seen = HashSet::new();

        for descriptor in descriptors {
            let pattern = QuadPattern::any()
                .predicate(rdf::TYPE.into_owned())
                .object(descriptor.target_type.clone());
            let typed = match self.store.get(&pattern).await {
                Ok(quads) => quads,
                Err(e) => {
                    warn!(target_type = %descriptor.target_type, error = %e, "Listing failed for descriptor");
                    continue;
                }
            };

            for quad in typed {
                let Subject::NamedNode(subject) = quad.subject else {
                    continue;
                };
                if is_validity_node(subject.as_str())
                    || !seen.insert((subject.clone(), descriptor.target_type.clone()))
                {
                    continue;
                }
                let graph = match quad.graph_name {
                    GraphName::NamedNode(graph) => graph,
                    _ => default_graph_for(&subject),
                };

                let graph_quads = self.read_or_empty(QuadPattern::any().graph(graph.clone())).await;
                let expired = ValidityWindow::read(&graph_quads, &subject)
                    .is_some_and(|w| w.is_expired_at(now));
                if expired && !options.include_expired {
                    continue;
                }

                let label = self.label_of(&subject).await;
                records.push(ResourceRecord {
                    subject,
                    graph,
                    label,
                    expired,
                    descriptor: descriptor.clone(),
                });
            }
        }

        records.sort_by(|a, b| {
            a.label
                .to_lowercase()
                .cmp(&b.label.to_lowercase())
                .then_with(|| a.subject.as_str().cmp(b.subject.as_str()))
        });
        debug!(count = records.len(), "Listed resources");
        records
    }

    /// Display label of `subject`: `skos:prefLabel`, then `rdfs:label`, then
    /// the IRI itself
    pub async fn label_of(&self, subject: &NamedNode) -> String {
        let quads = self
            .read_or_empty(QuadPattern::any().subject(subject.clone()))
            .await;
        [skos::PREF_LABEL, rdfs::LABEL]
            .iter()
            .find_map(|predicate| {
                quads
                    .iter()
                    .filter(|q| q.predicate.as_str() == predicate.as_str())
                    .filter_map(|q| match &q.object {
                        Term::Literal(l) => Some(l.value().to_string()),
                        _ => None,
                    })
                    .min()
            })
            .unwrap_or_else(|| subject.as_str().to_string())
    }

    /// Serialize a listed resource's graph as N-Quads
    pub async fn read_as_text(&self, resource: &ResourceRecord) -> String {
        self.read_graph_as_text(&resource.graph).await
    }

    /// Serialize a graph as N-Quads; empty text when the graph is empty or
    /// cannot be read
    pub async fn read_graph_as_text(&self, graph: &NamedNode) -> String {
        let quads = self.read_or_empty(QuadPattern::any().graph(graph.clone())).await;
        if quads.is_empty() {
            return String::new();
        }
        format::to_nquads(&quads).unwrap_or_else(|e| {
            warn!(graph = %graph, error = %e, "Graph serialization failed");
            String::new()
        })
    }

    /// Save N-Quads text as the full statement set of `subject`
    pub async fn save(
        &self,
        submitted: &str,
        subject: &NamedNode,
        graph: &NamedNode,
        target_type: &NamedNode,
    ) -> Result<SaveOutcome, LifecycleError> {
        self.save_text(submitted, subject, graph, target_type, SaveOptions::default())
            .await
    }

    /// Save `submitted` as the full statement set of `subject` in `graph`
    ///
    /// Submitted graphs are overridden by `graph`, the type statement is
    /// injected, and audit stamps are managed here: submitted
    /// `dcterms:created` / `dcterms:modified` statements about the subject
    /// are discarded. An existing validity interval is carried over
    /// unchanged.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Parse`] when `submitted` is not valid in the chosen
    /// syntax (nothing is written), [`LifecycleError::Store`] when the graph
    /// cannot be read or written.
    #[instrument(skip(self, submitted, options), fields(subject = %subject, graph = %graph))]
    pub async fn save_text(
        &self,
        submitted: &str,
        subject: &NamedNode,
        graph: &NamedNode,
        target_type: &NamedNode,
        options: SaveOptions,
    ) -> Result<SaveOutcome, LifecycleError> {
        let parsed = match options.format {
            StatementFormat::NQuads => format::parse_nquads(submitted),
            StatementFormat::Turtle => format::parse_turtle(submitted, Some(subject.as_str())),
        }
        .map_err(LifecycleError::Parse)?;

        let existing = self
            .store
            .get(&QuadPattern::any().graph(graph.clone()))
            .await?;
        let first_save = existing.is_empty();
        let now = self.now();
        let graph_name = GraphName::NamedNode(graph.clone());
        let iris = ValidityIris::for_subject(subject);
        let existing_has_validity = existing.iter().any(|q| iris.covers(q));

        let mut next = QuadSet::default();
        for quad in parsed {
            let about_subject = matches!(&quad.subject, Subject::NamedNode(s) if s == subject);
            if about_subject && audit::is_audit_predicate(&quad.predicate) {
                continue;
            }
            if existing_has_validity && iris.covers(&quad) {
                continue;
            }
            next.push(Quad::new(quad.subject, quad.predicate, quad.object, graph_name.clone()));
        }
        next.push(Quad::new(
            subject.clone(),
            rdf::TYPE.into_owned(),
            target_type.clone(),
            graph_name.clone(),
        ));

        let auxiliary = is_validity_node(subject.as_str());
        let (created, modified) = if first_save {
            (now, None)
        } else {
            let created = audit::created_at(&existing, subject).unwrap_or(now);
            let modified =
                audit::next_modification(now, audit::modified_at(&existing, subject));
            (created, Some(modified))
        };
        if !auxiliary {
            next.push(audit::creation_quad(subject, graph, created));
            if let Some(modified) = modified {
                next.push(audit::modification_quad(subject, graph, modified));
            }
        }

        if existing_has_validity {
            for quad in existing.iter().filter(|q| iris.covers(q)) {
                next.push(quad.clone());
            }
        } else if options.attach_validity && !next.quads.iter().any(|q| iris.covers(q)) {
            for quad in iris.interval_quads(graph, created) {
                next.push(quad);
            }
        }

        let (removed, added) = diff(&existing, &next.quads);
        let outcome = SaveOutcome {
            first_save,
            created,
            modified,
            removed: removed.len(),
            added: added.len(),
        };
        self.store.rewrite(existing, next.quads).await?;
        info!(
            first_save,
            removed = outcome.removed,
            added = outcome.added,
            "Saved resource"
        );
        Ok(outcome)
    }

    /// Retire a resource by ending its validity interval
    ///
    /// Attaches an interval first when the resource has none (beginning at
    /// its creation stamp, or now). Any previous end is replaced. The
    /// resource's statements are kept.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::NotFound`] when the graph is empty,
    /// [`LifecycleError::Store`] when the graph cannot be read or written.
    #[instrument(skip(self, resource), fields(subject = %resource.subject))]
    pub async fn remove(&self, resource: &ResourceRecord) -> Result<RemovalOutcome, LifecycleError> {
        self.retire(&resource.subject, &resource.graph).await
    }

    /// Retire `subject` stored in `graph`
    ///
    /// # Errors
    ///
    /// See [`ResourceManager::remove`].
    pub async fn retire(
        &self,
        subject: &NamedNode,
        graph: &NamedNode,
    ) -> Result<RemovalOutcome, LifecycleError> {
        let existing = self
            .store
            .get(&QuadPattern::any().graph(graph.clone()))
            .await?;
        if existing.is_empty() {
            return Err(LifecycleError::NotFound(subject.as_str().to_string()));
        }

        let now = self.now();
        let iris = ValidityIris::for_subject(subject);
        let mut added = Vec::new();
        let beginning = match ValidityWindow::read(&existing, subject) {
            Some(ValidityWindow {
                beginning: Some(beginning),
                ..
            }) => beginning,
            _ => {
                let beginning = audit::created_at(&existing, subject).unwrap_or(now);
                added.extend(iris.interval_quads(graph, beginning));
                beginning
            }
        };
        added.extend(iris.end_quads(graph, now));

        let stale: Vec<Quad> = existing
            .iter()
            .filter(|q| iris.is_end_marker(q))
            .cloned()
            .collect();
        let (removed, added) = diff(&stale, &added);
        let present: HashSet<&Quad> = existing.iter().collect();
        let added = added.into_iter().filter(|q| !present.contains(q)).collect();
        self.store.replace(removed, added).await?;
        info!(ended_at = %audit::format_timestamp(now), "Retired resource");
        Ok(RemovalOutcome {
            beginning,
            ended_at: now,
        })
    }

    /// Reopen a retired resource by dropping its end instant
    ///
    /// Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Store`] when the graph cannot be read or written.
    #[instrument(skip(self, resource), fields(subject = %resource.subject))]
    pub async fn restore(&self, resource: &ResourceRecord) -> Result<bool, LifecycleError> {
        let existing = self
            .store
            .get(&QuadPattern::any().graph(resource.graph.clone()))
            .await?;
        let iris = ValidityIris::for_subject(&resource.subject);
        let ends: Vec<Quad> = existing
            .into_iter()
            .filter(|q| iris.is_end_marker(q))
            .collect();
        if ends.is_empty() {
            return Ok(false);
        }
        self.store.delete(ends).await?;
        info!("Restored resource");
        Ok(true)
    }

    /// Fresh identifiers under the descriptor's namespace
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidIri`] when the namespace does not yield a
    /// valid IRI.
    pub fn mint_identifiers(
        &self,
        descriptor: &ShapeDescriptor,
    ) -> Result<Identifiers, LifecycleError> {
        let candidate = format!("{}{}", descriptor.values_namespace, Uuid::new_v4());
        let subject = NamedNode::new(&candidate)
            .map_err(|e| LifecycleError::invalid_iri(candidate, e.to_string()))?;
        Ok(Identifiers::for_subject(subject))
    }

    /// Audit stamps and validity of a resource
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Store`] when the graph cannot be read.
    pub async fn resource_state(
        &self,
        subject: &NamedNode,
        graph: &NamedNode,
    ) -> Result<ResourceState, LifecycleError> {
        let quads = self
            .store
            .get(&QuadPattern::any().graph(graph.clone()))
            .await?;
        Ok(ResourceState {
            created: audit::created_at(&quads, subject),
            modified: audit::modified_at(&quads, subject),
            validity: ValidityWindow::read(&quads, subject),
            statement_count: quads.len(),
        })
    }

    /// Dump the whole store
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Store`] on read failure,
    /// [`LifecycleError::Serialize`] when serialization fails.
    pub async fn export(&self, syntax: ExportFormat) -> Result<String, LifecycleError> {
        let quads = self.store.get(&QuadPattern::any()).await?;
        match syntax {
            ExportFormat::NQuads => format::to_nquads(&quads),
            ExportFormat::NTriples => format::to_ntriples(&quads),
        }
        .map_err(LifecycleError::Serialize)
    }

    /// Dump the whole store as N-Quads
    ///
    /// # Errors
    ///
    /// See [`ResourceManager::export`].
    pub async fn export_nquads(&self) -> Result<String, LifecycleError> {
        self.export(ExportFormat::NQuads).await
    }

    /// Dump the whole store as N-Triples, graphs dropped
    ///
    /// # Errors
    ///
    /// See [`ResourceManager::export`].
    pub async fn export_ntriples(&self) -> Result<String, LifecycleError> {
        self.export(ExportFormat::NTriples).await
    }

    pub(crate) async fn read_or_empty(&self, pattern: QuadPattern) -> Vec<Quad> {
        match self.store.get(&pattern).await {
            Ok(quads) => quads,
            Err(e) => {
                warn!(error = %e, "Store read failed; treating as empty");
                Vec::new()
            }
        }
    }
}

/// Insertion-ordered quad set
#[derive(Default)]
struct QuadSet {
    seen: HashSet<Quad>,
    quads: Vec<Quad>,
}

impl QuadSet {
    fn push(&mut self, quad: Quad) {
        if self.seen.insert(quad.clone()) {
            self.quads.push(quad);
        }
    }
}

/// Split into (stored but not wanted, wanted but not stored)
pub(crate) fn diff(existing: &[Quad], wanted: &[Quad]) -> (Vec<Quad>, Vec<Quad>) {
    let existing_set: HashSet<&Quad> = existing.iter().collect();
    let wanted_set: HashSet<&Quad> = wanted.iter().collect();
    let removed = existing
        .iter()
        .filter(|q| !wanted_set.contains(q))
        .cloned()
        .collect();
    let added = wanted
        .iter()
        .filter(|q| !existing_set.contains(q))
        .cloned()
        .collect();
    (removed, added)
}
