//! Partial quad patterns
//!
//! A [`QuadPattern`] binds any subset of subject / predicate / object / graph.
//! Unbound positions match everything.

use oxrdf::{GraphName, NamedNode, Quad, Subject, Term};

/// Quad position within a pattern or an index permutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    /// Subject
    Subject,
    /// Predicate
    Predicate,
    /// Object
    Object,
    /// Graph name
    Graph,
}

/// Partial quad used to query the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuadPattern {
    /// Bound subject
    pub subject: Option<Subject>,
    /// Bound predicate
    pub predicate: Option<NamedNode>,
    /// Bound object
    pub object: Option<Term>,
    /// Bound graph (`GraphName::DefaultGraph` matches the default graph only)
    pub graph: Option<GraphName>,
}

impl QuadPattern {
    /// Pattern matching every quad
    #[inline]
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// With bound subject
    #[inline]
    #[must_use]
    pub fn subject(mut self, subject: impl Into<Subject>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// With bound predicate
    #[inline]
    #[must_use]
    pub fn predicate(mut self, predicate: impl Into<NamedNode>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    /// With bound object
    #[inline]
    #[must_use]
    pub fn object(mut self, object: impl Into<Term>) -> Self {
        self.object = Some(object.into());
        self
    }

    /// With bound graph
    #[inline]
    #[must_use]
    pub fn graph(mut self, graph: impl Into<GraphName>) -> Self {
        self.graph = Some(graph.into());
        self
    }

    /// Whether the given position is bound
    #[must_use]
    pub fn is_bound(&self, position: Position) -> bool {
        match position {
            Position::Subject => self.subject.is_some(),
            Position::Predicate => self.predicate.is_some(),
            Position::Object => self.object.is_some(),
            Position::Graph => self.graph.is_some(),
        }
    }

    /// Number of bound positions
    #[must_use]
    pub fn bound_count(&self) -> usize {
        [
            Position::Subject,
            Position::Predicate,
            Position::Object,
            Position::Graph,
        ]
        .into_iter()
        .filter(|p| self.is_bound(*p))
        .count()
    }

    /// Check whether a quad satisfies every bound position
    #[must_use]
    pub fn matches(&self, quad: &Quad) -> bool {
        self.subject.as_ref().map_or(true, |s| *s == quad.subject)
            && self.predicate.as_ref().map_or(true, |p| *p == quad.predicate)
            && self.object.as_ref().map_or(true, |o| *o == quad.object)
            && self.graph.as_ref().map_or(true, |g| *g == quad.graph_name)
    }
}

impl From<&Quad> for QuadPattern {
    fn from(quad: &Quad) -> Self {
        Self {
            subject: Some(quad.subject.clone()),
            predicate: Some(quad.predicate.clone()),
            object: Some(quad.object.clone()),
            graph: Some(quad.graph_name.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::Literal;

    fn quad(s: &str, p: &str, o: &str, g: &str) -> Quad {
        Quad::new(
            NamedNode::new_unchecked(s),
            NamedNode::new_unchecked(p),
            Literal::new_simple_literal(o),
            NamedNode::new_unchecked(g),
        )
    }

    #[test]
    fn empty_pattern_matches_everything() {
        let q = quad("http://x/s", "http://x/p", "o", "http://x/g");
        assert!(QuadPattern::any().matches(&q));
        assert_eq!(QuadPattern::any().bound_count(), 0);
    }

    #[test]
    fn bound_positions_filter() {
        let q = quad("http://x/s", "http://x/p", "o", "http://x/g");
        let hit = QuadPattern::any()
            .subject(NamedNode::new_unchecked("http://x/s"))
            .graph(NamedNode::new_unchecked("http://x/g"));
        let miss = QuadPattern::any().predicate(NamedNode::new_unchecked("http://x/other"));

        assert!(hit.matches(&q));
        assert_eq!(hit.bound_count(), 2);
        assert!(!miss.matches(&q));
    }

    #[test]
    fn default_graph_is_distinct_from_named() {
        let q = quad("http://x/s", "http://x/p", "o", "http://x/g");
        assert!(!QuadPattern::any().graph(GraphName::DefaultGraph).matches(&q));
    }

    #[test]
    fn fully_bound_pattern_from_quad() {
        let q = quad("http://x/s", "http://x/p", "o", "http://x/g");
        let pattern = QuadPattern::from(&q);
        assert_eq!(pattern.bound_count(), 4);
        assert!(pattern.matches(&q));
    }
}
