//! Records and options exchanged with the lifecycle manager

use chrono::{DateTime, Utc};
use sdm_shapes::ShapeDescriptor;
use sdm_store::oxrdf::NamedNode;

use crate::validity::ValidityWindow;

const GRAPH_SUFFIX: &str = "#graph";

/// One listed resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    /// Resource IRI
    pub subject: NamedNode,
    /// Named graph holding the resource's statements
    pub graph: NamedNode,
    /// Display label (`skos:prefLabel`, then `rdfs:label`, then the IRI)
    pub label: String,
    /// Whether the validity interval has ended
    pub expired: bool,
    /// Descriptor the resource was listed under
    pub descriptor: ShapeDescriptor,
}

/// Subject and graph IRIs of a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifiers {
    /// Resource IRI
    pub subject: NamedNode,
    /// Graph IRI
    pub graph: NamedNode,
}

impl Identifiers {
    /// Identifiers using the conventional `<subject>#graph` graph
    #[must_use]
    pub fn for_subject(subject: NamedNode) -> Self {
        let graph = default_graph_for(&subject);
        Self { subject, graph }
    }
}

/// Conventional graph IRI of `subject`
#[must_use]
pub fn default_graph_for(subject: &NamedNode) -> NamedNode {
    NamedNode::new_unchecked(format!("{}{GRAPH_SUFFIX}", subject.as_str()))
}

/// Owning subject of a conventional graph IRI
#[must_use]
pub fn subject_of_graph(graph: &NamedNode) -> Option<NamedNode> {
    graph
        .as_str()
        .strip_suffix(GRAPH_SUFFIX)
        .filter(|s| !s.is_empty())
        .map(NamedNode::new_unchecked)
}

/// Listing options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Also list retired resources
    pub include_expired: bool,
}

impl ListOptions {
    /// List everything, retired included
    #[must_use]
    pub fn all() -> Self {
        Self {
            include_expired: true,
        }
    }
}

/// Syntax of submitted statement text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatementFormat {
    /// N-Quads (also accepts N-Triples)
    #[default]
    NQuads,
    /// Turtle, relative IRIs resolved against the subject
    Turtle,
}

/// Save options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Submitted text syntax
    pub format: StatementFormat,
    /// Attach a validity interval when the resource has none
    pub attach_validity: bool,
}

impl SaveOptions {
    /// Set the submitted text syntax
    #[must_use]
    pub fn with_format(mut self, format: StatementFormat) -> Self {
        self.format = format;
        self
    }

    /// Attach a validity interval on save
    #[must_use]
    pub fn with_validity(mut self) -> Self {
        self.attach_validity = true;
        self
    }
}

/// Result of a save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Whether the graph was empty before the save
    pub first_save: bool,
    /// Creation instant (new or preserved)
    pub created: DateTime<Utc>,
    /// Modification instant, absent on first save
    pub modified: Option<DateTime<Utc>>,
    /// Statements removed from the graph
    pub removed: usize,
    /// Statements added to the graph
    pub added: usize,
}

/// Result of a retirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalOutcome {
    /// Start of the (possibly newly attached) interval
    pub beginning: DateTime<Utc>,
    /// End instant written
    pub ended_at: DateTime<Utc>,
}

/// Audit view of one resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceState {
    /// Creation stamp
    pub created: Option<DateTime<Utc>>,
    /// Latest modification stamp
    pub modified: Option<DateTime<Utc>>,
    /// Validity interval, when attached
    pub validity: Option<ValidityWindow>,
    /// Statements in the resource graph
    pub statement_count: usize,
}

impl ResourceState {
    /// Whether the resource graph holds anything
    #[must_use]
    pub fn exists(&self) -> bool {
        self.statement_count > 0
    }

    /// Whether the resource is retired at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.validity.is_some_and(|w| w.is_expired_at(now))
    }
}

/// Dump syntax
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// N-Quads, graphs kept
    #[default]
    NQuads,
    /// N-Triples, graphs dropped
    NTriples,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_iri_convention() {
        let ids = Identifiers::for_subject(NamedNode::new_unchecked("https://x/org/1"));
        assert_eq!(ids.graph.as_str(), "https://x/org/1#graph");
        assert_eq!(subject_of_graph(&ids.graph), Some(ids.subject));
        assert_eq!(subject_of_graph(&NamedNode::new_unchecked("https://x/g")), None);
    }

    #[test]
    fn save_options_builders() {
        let opts = SaveOptions::default()
            .with_format(StatementFormat::Turtle)
            .with_validity();
        assert_eq!(opts.format, StatementFormat::Turtle);
        assert!(opts.attach_validity);
        assert!(!SaveOptions::default().attach_validity);
    }
}
