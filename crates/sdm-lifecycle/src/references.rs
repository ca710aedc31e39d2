//! Incoming and dangling references
//!
//! Retirement is advisory: statements elsewhere that point at a retired
//! resource are left in place. The scan here finds them and the repair
//! removes them graph by graph, restamping the owning resource.

use std::collections::{BTreeMap, HashSet};

use sdm_shapes::ShapeDescriptor;
use sdm_store::oxrdf::{GraphName, NamedNode, Quad, Subject};
use sdm_store::QuadPattern;
use tracing::{info, instrument, warn};

use crate::audit;
use crate::error::LifecycleError;
use crate::manager::ResourceManager;
use crate::types::{subject_of_graph, ListOptions};

/// A statement pointing at a retired resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// The retired resource
    pub target: NamedNode,
    /// The referring statement
    pub statement: Quad,
}

/// Outcome of a repair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Statements removed
    pub removed: usize,
    /// Graphs rewritten
    pub graphs: Vec<NamedNode>,
    /// Graphs whose rewrite failed
    pub failed: Vec<NamedNode>,
}

impl ResourceManager {
    /// Distinct subjects with a statement pointing at `subject`, sorted
    /// case-insensitively
    ///
    /// The subject's own statements are not counted. Read failures yield an
    /// empty list.
    pub async fn list_incoming_references(&self, subject: &NamedNode) -> Vec<NamedNode> {
        let quads = self
            .read_or_empty(QuadPattern::any().object(subject.clone()))
            .await;
        let mut referrers: Vec<NamedNode> = quads
            .into_iter()
            .filter_map(|q| match q.subject {
                Subject::NamedNode(s) if s != *subject => Some(s),
                _ => None,
            })
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        referrers.sort_by(|a, b| {
            a.as_str()
                .to_lowercase()
                .cmp(&b.as_str().to_lowercase())
                .then_with(|| a.as_str().cmp(b.as_str()))
        });
        referrers
    }

    /// Statements outside a retired resource's own graph that point at it
    #[instrument(skip(self, descriptors))]
    pub async fn find_dangling_references(
        &self,
        descriptors: &[ShapeDescriptor],
    ) -> Vec<DanglingReference> {
        let retired = self
            .list_resources_with(descriptors, ListOptions::all())
            .await
            .into_iter()
            .filter(|r| r.expired);

        let mut found = Vec::new();
        for resource in retired {
            let own_graph = GraphName::NamedNode(resource.graph.clone());
            let quads = self
                .read_or_empty(QuadPattern::any().object(resource.subject.clone()))
                .await;
            found.extend(
                quads
                    .into_iter()
                    .filter(|q| q.graph_name != own_graph)
                    .filter(|q| !matches!(&q.subject, Subject::NamedNode(s) if *s == resource.subject))
                    .map(|statement| DanglingReference {
                        target: resource.subject.clone(),
                        statement,
                    }),
            );
        }
        if !found.is_empty() {
            info!(count = found.len(), "Dangling references found");
        }
        found
    }

    /// Remove dangling statements, one transaction per graph
    ///
    /// When a graph follows the `<subject>#graph` convention and its subject
    /// carries a creation stamp, its modification stamp is refreshed in the same
    /// transaction. A failing graph is logged and reported; the others are
    /// still repaired.
    pub async fn repair_dangling_references(
        &self,
        references: &[DanglingReference],
    ) -> RepairReport {
        let mut by_graph: BTreeMap<String, (GraphName, Vec<Quad>)> = BTreeMap::new();
        for reference in references {
            let graph = &reference.statement.graph_name;
            by_graph
                .entry(graph.to_string())
                .or_insert_with(|| (graph.clone(), Vec::new()))
                .1
                .push(reference.statement.clone());
        }

        let mut report = RepairReport::default();
        for (_, (graph, mut removed)) in by_graph {
            let count = removed.len();
            let mut added = Vec::new();
            if let GraphName::NamedNode(graph_iri) = &graph {
                if let Some(owner) = subject_of_graph(graph_iri) {
                    match self.restamp(&owner, graph_iri).await {
                        Ok((stale, fresh)) => {
                            removed.extend(stale);
                            added.extend(fresh);
                        }
                        Err(e) => warn!(graph = %graph_iri, error = %e, "Could not read stamps"),
                    }
                }
            }

            match self.store.replace(removed, added).await {
                Ok(()) => {
                    if let GraphName::NamedNode(g) = graph {
                        report.graphs.push(g);
                    }
                    report.removed += count;
                }
                Err(e) => {
                    warn!(graph = %graph, error = %e, "Repair failed for graph");
                    if let GraphName::NamedNode(g) = graph {
                        report.failed.push(g);
                    }
                }
            }
        }
        report
    }

    /// Stale and fresh modification stamps for `owner`
    async fn restamp(
        &self,
        owner: &NamedNode,
        graph: &NamedNode,
    ) -> Result<(Vec<Quad>, Vec<Quad>), LifecycleError> {
        let quads = self
            .store
            .get(
                &QuadPattern::any()
                    .subject(owner.clone())
                    .graph(graph.clone()),
            )
            .await?;
        let previous = audit::modified_at(&quads, owner);
        if audit::created_at(&quads, owner).is_none() {
            return Ok((Vec::new(), Vec::new()));
        }
        let stale: Vec<Quad> = audit::stamps(&quads, owner, sdm_store::vocab::dcterms::MODIFIED)
            .into_iter()
            .map(|(q, _)| q.clone())
            .collect();
        let modified = audit::next_modification(self.now(), previous);
        Ok((stale, vec![audit::modification_quad(owner, graph, modified)]))
    }
}
