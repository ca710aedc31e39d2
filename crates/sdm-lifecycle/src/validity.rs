//! Validity intervals
//!
//! A resource's lifetime is an OWL-Time interval hanging off the subject:
//!
//! ```text
//! <s> time:hasTime <s#validity> .
//! <s#validity> a time:Interval ;
//!     time:hasBeginning <s#validity-beginning> ;
//!     time:hasEnd <s#validity-end> .
//! <s#validity-beginning> a time:Instant ; time:inXSDDateTimeStamp "..." .
//! <s#validity-end> a time:Instant ; time:inXSDDateTimeStamp "..." .
//! ```
//!
//! A resource with an end instant at or before "now" is expired.

use crate::audit::{parse_timestamp, timestamp_literal};
use chrono::{DateTime, Utc};
use sdm_store::oxrdf::{GraphName, NamedNode, NamedNodeRef, Quad, Subject, Term};
use sdm_store::vocab::{rdf, time, xsd};

const INTERVAL_SUFFIX: &str = "#validity";
const BEGINNING_SUFFIX: &str = "#validity-beginning";
const END_SUFFIX: &str = "#validity-end";

/// Deterministic IRIs of a subject's validity nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityIris {
    /// Owning subject
    pub subject: NamedNode,
    /// `<s#validity>`
    pub interval: NamedNode,
    /// `<s#validity-beginning>`
    pub beginning: NamedNode,
    /// `<s#validity-end>`
    pub end: NamedNode,
}

impl ValidityIris {
    /// Derive the validity IRIs of `subject`
    #[must_use]
    pub fn for_subject(subject: &NamedNode) -> Self {
        let derive =
            |suffix: &str| NamedNode::new_unchecked(format!("{}{suffix}", subject.as_str()));
        Self {
            subject: subject.clone(),
            interval: derive(INTERVAL_SUFFIX),
            beginning: derive(BEGINNING_SUFFIX),
            end: derive(END_SUFFIX),
        }
    }

    /// Whether `quad` belongs to the interval structure
    #[must_use]
    pub fn covers(&self, quad: &Quad) -> bool {
        match &quad.subject {
            Subject::NamedNode(s) if *s == self.subject => {
                quad.predicate.as_str() == time::HAS_TIME.as_str()
            }
            Subject::NamedNode(s) => *s == self.interval || *s == self.beginning || *s == self.end,
            _ => false,
        }
    }

    /// Whether `quad` marks the end of the interval
    #[must_use]
    pub fn is_end_marker(&self, quad: &Quad) -> bool {
        match &quad.subject {
            Subject::NamedNode(s) if *s == self.end => true,
            Subject::NamedNode(s) if *s == self.interval => {
                quad.predicate.as_str() == time::HAS_END.as_str()
            }
            _ => false,
        }
    }

    /// Interval and beginning instant
    #[must_use]
    pub fn interval_quads(&self, graph: &NamedNode, beginning: DateTime<Utc>) -> Vec<Quad> {
        let g = GraphName::NamedNode(graph.clone());
        vec![
            link(&self.subject, time::HAS_TIME, &self.interval, &g),
            link(&self.interval, rdf::TYPE, &time::INTERVAL.into_owned(), &g),
            link(&self.interval, time::HAS_BEGINNING, &self.beginning, &g),
            link(&self.beginning, rdf::TYPE, &time::INSTANT.into_owned(), &g),
            instant(&self.beginning, beginning, &g),
        ]
    }

    /// End instant and its link from the interval
    #[must_use]
    pub fn end_quads(&self, graph: &NamedNode, end: DateTime<Utc>) -> Vec<Quad> {
        let g = GraphName::NamedNode(graph.clone());
        vec![
            link(&self.interval, time::HAS_END, &self.end, &g),
            link(&self.end, rdf::TYPE, &time::INSTANT.into_owned(), &g),
            instant(&self.end, end, &g),
        ]
    }
}

fn link(
    subject: &NamedNode,
    predicate: NamedNodeRef<'_>,
    object: &NamedNode,
    graph: &GraphName,
) -> Quad {
    Quad::new(
        subject.clone(),
        predicate.into_owned(),
        object.clone(),
        graph.clone(),
    )
}

fn instant(node: &NamedNode, at: DateTime<Utc>, graph: &GraphName) -> Quad {
    Quad::new(
        node.clone(),
        time::IN_XSD_DATE_TIME_STAMP.into_owned(),
        timestamp_literal(at, xsd::DATE_TIME_STAMP),
        graph.clone(),
    )
}

/// Whether `iri` names one of the auxiliary validity nodes
#[must_use]
pub fn is_validity_node(iri: &str) -> bool {
    [INTERVAL_SUFFIX, BEGINNING_SUFFIX, END_SUFFIX]
        .iter()
        .any(|suffix| iri.ends_with(suffix))
}

/// Lifetime of a resource as read from its statements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidityWindow {
    /// Start of validity
    pub beginning: Option<DateTime<Utc>>,
    /// End of validity, once retired
    pub end: Option<DateTime<Utc>>,
}

impl ValidityWindow {
    /// Read the window of `subject`, following `hasTime` links; `None` when
    /// no interval is attached
    #[must_use]
    pub fn read(quads: &[Quad], subject: &NamedNode) -> Option<Self> {
        let intervals: Vec<&NamedNode> = objects(quads, subject, time::HAS_TIME).collect();
        if intervals.is_empty() {
            return None;
        }
        let instant_of = |predicate: NamedNodeRef<'_>| -> Vec<DateTime<Utc>> {
            intervals
                .iter()
                .copied()
                .flat_map(|interval| objects(quads, interval, predicate))
                .flat_map(|node| {
                    quads
                        .iter()
                        .filter(move |q| matches!(&q.subject, Subject::NamedNode(s) if s == node))
                        .filter(|q| q.predicate.as_str() == time::IN_XSD_DATE_TIME_STAMP.as_str())
                        .filter_map(|q| parse_timestamp(&q.object))
                })
                .collect()
        };
        Some(Self {
            beginning: instant_of(time::HAS_BEGINNING).into_iter().min(),
            end: instant_of(time::HAS_END).into_iter().min(),
        })
    }

    /// Whether the window has closed by `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.end.is_some_and(|end| end <= now)
    }
}

fn objects<'a>(
    quads: &'a [Quad],
    subject: &'a NamedNode,
    predicate: NamedNodeRef<'a>,
) -> impl Iterator<Item = &'a NamedNode> + 'a {
    quads
        .iter()
        .filter(move |q| matches!(&q.subject, Subject::NamedNode(s) if s == subject))
        .filter(move |q| q.predicate.as_str() == predicate.as_str())
        .filter_map(|q| match &q.object {
            Term::NamedNode(node) => Some(node),
            _ => None,
        })
}
