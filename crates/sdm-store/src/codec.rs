//! Index layout and key encoding
//!
//! Every quad is written once per index permutation. A key is the index tag
//! followed by the four components in the index's order, each component
//! being a big-endian `u32` length and the term's N-Triples rendering. The
//! default graph renders as the empty string.
//!
//! Because components are length-prefixed, the encoding of a bound leading
//! component is an exact key prefix, which is what the planner scans.

use crate::error::CodecError;
use crate::pattern::{Position, QuadPattern};
use oxrdf::{GraphName, NamedNode, Quad, Subject, Term};
use std::str::FromStr;

/// Term permutation indexes kept by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// subject, predicate, object, graph
    Spog,
    /// predicate, object, graph, subject
    Pogs,
    /// object, graph, subject, predicate
    Ogsp,
    /// graph, subject, predicate, object
    Gspo,
}

impl IndexKind {
    /// All indexes, in planner preference order
    pub const ALL: [IndexKind; 4] = [Self::Spog, Self::Pogs, Self::Ogsp, Self::Gspo];

    /// Leading key byte
    #[inline]
    #[must_use]
    pub fn tag(self) -> u8 {
        match self {
            Self::Spog => 0x01,
            Self::Pogs => 0x02,
            Self::Ogsp => 0x03,
            Self::Gspo => 0x04,
        }
    }

    /// Index for a leading key byte
    pub fn from_tag(tag: u8) -> Result<Self, CodecError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or(CodecError::UnknownIndex(tag))
    }

    /// Component order of this permutation
    #[must_use]
    pub fn order(self) -> [Position; 4] {
        use Position::{Graph as G, Object as O, Predicate as P, Subject as S};
        match self {
            Self::Spog => [S, P, O, G],
            Self::Pogs => [P, O, G, S],
            Self::Ogsp => [O, G, S, P],
            Self::Gspo => [G, S, P, O],
        }
    }

    /// Number of leading components the pattern binds for this index
    #[must_use]
    pub fn bound_prefix_len(self, pattern: &QuadPattern) -> usize {
        self.order()
            .into_iter()
            .take_while(|position| pattern.is_bound(*position))
            .count()
    }
}

/// Chosen index and key prefix for a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPlan {
    /// Index to scan
    pub index: IndexKind,
    /// Key prefix covering the bound leading components
    pub prefix: Vec<u8>,
    /// Whether every bound position is covered by the prefix
    pub exact: bool,
}

/// Pick the index with the longest bound prefix for a pattern
#[must_use]
pub fn plan(pattern: &QuadPattern) -> ScanPlan {
    let mut best = IndexKind::Spog;
    let mut best_len = 0;
    for kind in IndexKind::ALL {
        let len = kind.bound_prefix_len(pattern);
        if len > best_len {
            best = kind;
            best_len = len;
        }
    }

    let mut prefix = vec![best.tag()];
    for position in best.order().into_iter().take(best_len) {
        if let Some(rendered) = render_bound(pattern, position) {
            push_component(&mut prefix, &rendered);
        }
    }

    ScanPlan {
        index: best,
        prefix,
        exact: best_len == pattern.bound_count(),
    }
}

/// Encode a quad for one index
#[must_use]
pub fn encode_key(index: IndexKind, quad: &Quad) -> Vec<u8> {
    let mut key = vec![index.tag()];
    for position in index.order() {
        push_component(&mut key, &render_position(quad, position));
    }
    key
}

/// Encode a quad for every index
#[must_use]
pub fn encode_all(quad: &Quad) -> Vec<Vec<u8>> {
    IndexKind::ALL
        .into_iter()
        .map(|index| encode_key(index, quad))
        .collect()
}

/// Decode a key of any index back into a quad
pub fn decode_key(key: &[u8]) -> Result<Quad, CodecError> {
    let (&tag, mut rest) = key.split_first().ok_or(CodecError::Truncated { component: 0 })?;
    let index = IndexKind::from_tag(tag)?;

    let mut subject = None;
    let mut predicate = None;
    let mut object = None;
    let mut graph = None;

    for (component, position) in index.order().into_iter().enumerate() {
        let (text, remaining) = read_component(rest, component)?;
        rest = remaining;
        match position {
            Position::Subject => subject = Some(parse_subject(text)?),
            Position::Predicate => predicate = Some(parse_predicate(text)?),
            Position::Object => object = Some(parse_object(text)?),
            Position::Graph => graph = Some(parse_graph(text)?),
        }
    }

    if !rest.is_empty() {
        return Err(CodecError::TrailingBytes(rest.len()));
    }

    match (subject, predicate, object, graph) {
        (Some(s), Some(p), Some(o), Some(g)) => Ok(Quad::new(s, p, o, g)),
        _ => Err(CodecError::Truncated { component: 4 }),
    }
}

fn push_component(key: &mut Vec<u8>, rendered: &str) {
    let len = u32::try_from(rendered.len()).unwrap_or(u32::MAX);
    key.extend_from_slice(&len.to_be_bytes());
    key.extend_from_slice(rendered.as_bytes());
}

fn read_component(bytes: &[u8], component: usize) -> Result<(&str, &[u8]), CodecError> {
    if bytes.len() < 4 {
        return Err(CodecError::Truncated { component });
    }
    let (len_bytes, rest) = bytes.split_at(4);
    let len = u32::from_be_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]) as usize;
    if rest.len() < len {
        return Err(CodecError::Truncated { component });
    }
    let (text, rest) = rest.split_at(len);
    let text = std::str::from_utf8(text).map_err(|_| CodecError::InvalidUtf8 { component })?;
    Ok((text, rest))
}

fn render_position(quad: &Quad, position: Position) -> String {
    match position {
        Position::Subject => quad.subject.to_string(),
        Position::Predicate => quad.predicate.to_string(),
        Position::Object => quad.object.to_string(),
        Position::Graph => render_graph(&quad.graph_name),
    }
}

fn render_bound(pattern: &QuadPattern, position: Position) -> Option<String> {
    match position {
        Position::Subject => pattern.subject.as_ref().map(ToString::to_string),
        Position::Predicate => pattern.predicate.as_ref().map(ToString::to_string),
        Position::Object => pattern.object.as_ref().map(ToString::to_string),
        Position::Graph => pattern.graph.as_ref().map(render_graph),
    }
}

fn render_graph(graph: &GraphName) -> String {
    match graph {
        GraphName::DefaultGraph => String::new(),
        named => named.to_string(),
    }
}

fn parse_term(text: &str, position: &'static str) -> Result<Term, CodecError> {
    Term::from_str(text).map_err(|e| CodecError::InvalidTerm {
        position,
        message: e.to_string(),
    })
}

fn parse_subject(text: &str) -> Result<Subject, CodecError> {
    match parse_term(text, "subject")? {
        Term::NamedNode(node) => Ok(node.into()),
        Term::BlankNode(node) => Ok(node.into()),
        other => Err(CodecError::InvalidTerm {
            position: "subject",
            message: format!("{other} cannot be a subject"),
        }),
    }
}

fn parse_predicate(text: &str) -> Result<NamedNode, CodecError> {
    match parse_term(text, "predicate")? {
        Term::NamedNode(node) => Ok(node),
        other => Err(CodecError::InvalidTerm {
            position: "predicate",
            message: format!("{other} cannot be a predicate"),
        }),
    }
}

fn parse_object(text: &str) -> Result<Term, CodecError> {
    parse_term(text, "object")
}

fn parse_graph(text: &str) -> Result<GraphName, CodecError> {
    if text.is_empty() {
        return Ok(GraphName::DefaultGraph);
    }
    match parse_term(text, "graph")? {
        Term::NamedNode(node) => Ok(node.into()),
        Term::BlankNode(node) => Ok(node.into()),
        other => Err(CodecError::InvalidTerm {
            position: "graph",
            message: format!("{other} cannot name a graph"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{BlankNode, Literal};

    fn sample() -> Quad {
        Quad::new(
            NamedNode::new_unchecked("http://x/s"),
            NamedNode::new_unchecked("http://x/p"),
            Literal::new_language_tagged_literal_unchecked("hallo \"welt\"", "de"),
            NamedNode::new_unchecked("http://x/g"),
        )
    }

    #[test]
    fn every_index_decodes_to_the_same_quad() {
        let quad = sample();
        for key in encode_all(&quad) {
            assert_eq!(decode_key(&key).unwrap(), quad);
        }
    }

    #[test]
    fn default_graph_and_blank_nodes_survive() {
        let quad = Quad::new(
            BlankNode::new_unchecked("b0"),
            NamedNode::new_unchecked("http://x/p"),
            Literal::new_typed_literal("42", NamedNode::new_unchecked("http://www.w3.org/2001/XMLSchema#integer")),
            GraphName::DefaultGraph,
        );
        let key = encode_key(IndexKind::Gspo, &quad);
        assert_eq!(decode_key(&key).unwrap(), quad);
    }

    #[test]
    fn planner_prefers_longest_bound_prefix() {
        let by_object = QuadPattern::any().object(NamedNode::new_unchecked("http://x/o"));
        assert_eq!(plan(&by_object).index, IndexKind::Ogsp);

        let by_graph = QuadPattern::any().graph(NamedNode::new_unchecked("http://x/g"));
        assert_eq!(plan(&by_graph).index, IndexKind::Gspo);

        let type_query = QuadPattern::any()
            .predicate(NamedNode::new_unchecked("http://x/p"))
            .object(NamedNode::new_unchecked("http://x/o"));
        let plan = plan(&type_query);
        assert_eq!(plan.index, IndexKind::Pogs);
        assert!(plan.exact);
    }

    #[test]
    fn full_scan_uses_bare_tag() {
        let plan = plan(&QuadPattern::any());
        assert_eq!(plan.prefix, vec![IndexKind::Spog.tag()]);
        assert!(plan.exact);
    }

    #[test]
    fn encoded_key_starts_with_planned_prefix() {
        let quad = sample();
        let pattern = QuadPattern::any().subject(NamedNode::new_unchecked("http://x/s"));
        let plan = plan(&pattern);
        assert!(encode_key(plan.index, &quad).starts_with(&plan.prefix));
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(decode_key(&[0x09]), Err(CodecError::UnknownIndex(0x09)));
        assert!(matches!(
            decode_key(&[0x01, 0, 0, 0, 9, b'<']),
            Err(CodecError::Truncated { component: 0 })
        ));
        let mut key = encode_key(IndexKind::Spog, &sample());
        key.push(0xff);
        assert_eq!(decode_key(&key), Err(CodecError::TrailingBytes(1)));
    }
}
