//! Creation and modification stamps
//!
//! Stamps are `xsd:dateTime` literals in UTC with millisecond precision.
//! The current time comes from a [`Clock`] so callers (and tests) can pin it.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use parking_lot::Mutex;
use sdm_store::oxrdf::{GraphName, Literal, NamedNode, NamedNodeRef, Quad, Subject, Term};
use sdm_store::vocab::{dcterms, xsd};
use std::fmt::Debug;

/// Source of the current time
pub trait Clock: Send + Sync + Debug {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create clock frozen at `start`
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    /// Jump to an absolute instant
    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock() = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Render an instant in the stored lexical form
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Typed literal for `at`
#[must_use]
pub fn timestamp_literal(at: DateTime<Utc>, datatype: NamedNodeRef<'_>) -> Literal {
    Literal::new_typed_literal(format_timestamp(at), datatype)
}

/// Read an instant back from a literal term, ignoring its datatype
#[must_use]
pub fn parse_timestamp(term: &Term) -> Option<DateTime<Utc>> {
    match term {
        Term::Literal(literal) => DateTime::parse_from_rfc3339(literal.value())
            .ok()
            .map(|at| at.with_timezone(&Utc)),
        _ => None,
    }
}

/// Whether `predicate` is one of the managed audit predicates
#[must_use]
pub fn is_audit_predicate(predicate: &NamedNode) -> bool {
    predicate.as_str() == dcterms::CREATED.as_str()
        || predicate.as_str() == dcterms::MODIFIED.as_str()
}

/// `subject dcterms:created at`
#[must_use]
pub fn creation_quad(subject: &NamedNode, graph: &NamedNode, at: DateTime<Utc>) -> Quad {
    stamp(subject, dcterms::CREATED, graph, at)
}

/// `subject dcterms:modified at`
#[must_use]
pub fn modification_quad(subject: &NamedNode, graph: &NamedNode, at: DateTime<Utc>) -> Quad {
    stamp(subject, dcterms::MODIFIED, graph, at)
}

fn stamp(
    subject: &NamedNode,
    predicate: NamedNodeRef<'static>,
    graph: &NamedNode,
    at: DateTime<Utc>,
) -> Quad {
    Quad::new(
        subject.clone(),
        predicate.into_owned(),
        timestamp_literal(at, xsd::DATE_TIME),
        GraphName::NamedNode(graph.clone()),
    )
}

/// Audit quads for `subject` with the given predicate, earliest value first
#[must_use]
pub fn stamps<'a>(
    quads: &'a [Quad],
    subject: &NamedNode,
    predicate: NamedNodeRef<'_>,
) -> Vec<(&'a Quad, DateTime<Utc>)> {
    let mut found: Vec<_> = quads
        .iter()
        .filter(|q| matches!(&q.subject, Subject::NamedNode(s) if s == subject))
        .filter(|q| q.predicate.as_str() == predicate.as_str())
        .filter_map(|q| parse_timestamp(&q.object).map(|at| (q, at)))
        .collect();
    found.sort_by_key(|(_, at)| *at);
    found
}

/// Earliest creation stamp of `subject`
#[must_use]
pub fn created_at(quads: &[Quad], subject: &NamedNode) -> Option<DateTime<Utc>> {
    stamps(quads, subject, dcterms::CREATED)
        .first()
        .map(|(_, at)| *at)
}

/// Latest modification stamp of `subject`
#[must_use]
pub fn modified_at(quads: &[Quad], subject: &NamedNode) -> Option<DateTime<Utc>> {
    stamps(quads, subject, dcterms::MODIFIED)
        .last()
        .map(|(_, at)| *at)
}

/// `at` cut down to the millisecond, the precision stamps are written with
#[inline]
#[must_use]
pub fn stamp_precision(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(3)
}

/// Next modification instant: `now`, pushed past `previous` when the clock
/// has not advanced
#[must_use]
pub fn next_modification(now: DateTime<Utc>, previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = stamp_precision(now);
    match previous {
        Some(prev) if now <= prev => prev + chrono::Duration::milliseconds(1),
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).single().unwrap()
    }

    #[test]
    fn timestamps_use_millisecond_utc_form() {
        let text = format_timestamp(at(0));
        assert_eq!(text, "2023-11-14T22:13:20.000Z");
        let literal = timestamp_literal(at(0), xsd::DATE_TIME);
        assert_eq!(parse_timestamp(&literal.into()), Some(at(0)));
    }

    #[test]
    fn non_literals_are_not_timestamps() {
        let node = NamedNode::new_unchecked("https://x/a");
        assert_eq!(parse_timestamp(&node.into()), None);
    }

    #[test]
    fn created_and_modified_pick_extremes() {
        let s = NamedNode::new_unchecked("https://x/a");
        let g = NamedNode::new_unchecked("https://x/a#graph");
        let quads = vec![
            creation_quad(&s, &g, at(5)),
            creation_quad(&s, &g, at(1)),
            modification_quad(&s, &g, at(3)),
            modification_quad(&s, &g, at(9)),
        ];
        assert_eq!(created_at(&quads, &s), Some(at(1)));
        assert_eq!(modified_at(&quads, &s), Some(at(9)));
    }

    #[test]
    fn modification_is_strictly_increasing() {
        assert_eq!(next_modification(at(10), Some(at(2))), at(10));
        let bumped = next_modification(at(2), Some(at(2)));
        assert!(bumped > at(2));
        assert_eq!(next_modification(at(4), None), at(4));
    }

    #[test]
    fn sub_millisecond_clock_still_moves_the_stamp_forward() {
        let now = at(2) + chrono::Duration::microseconds(600);
        let next = next_modification(now, Some(at(2)));
        assert_eq!(next, at(2) + chrono::Duration::milliseconds(1));
        assert_ne!(format_timestamp(next), format_timestamp(at(2)));
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(at(0));
        clock.advance(chrono::Duration::seconds(30));
        assert_eq!(clock.now(), at(30));
        clock.set(at(2));
        assert_eq!(clock.now(), at(2));
    }

    #[test]
    fn audit_predicates() {
        assert!(is_audit_predicate(&dcterms::CREATED.into_owned()));
        assert!(is_audit_predicate(&dcterms::MODIFIED.into_owned()));
        assert!(!is_audit_predicate(&dcterms::TITLE.into_owned()));
    }
}
