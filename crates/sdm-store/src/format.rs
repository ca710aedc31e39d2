//! Textual RDF syntaxes
//!
//! - N-Quads: persistence round-trips, hand-off to the form renderer, export
//! - N-Triples: flat export without graph partitioning
//! - Turtle: shape documents and hand-written statement sets
//!
//! Serializers sort their output so the same set always yields the same text.

use crate::error::FormatError;
use oxrdf::{GraphName, Quad, TripleRef};
use oxttl::{NQuadsParser, NQuadsSerializer, NTriplesParser, NTriplesSerializer, TurtleParser};

/// Serialize quads as N-Quads
///
/// # Errors
/// - `FormatError::Io` / `FormatError::Utf8` if the serializer fails
pub fn to_nquads(quads: &[Quad]) -> Result<String, FormatError> {
    let mut writer = NQuadsSerializer::new().for_writer(Vec::new());
    for quad in sorted(quads) {
        writer.serialize_quad(quad)?;
    }
    Ok(String::from_utf8(writer.finish())?)
}

/// Serialize quads as N-Triples, dropping graph names
///
/// Quads that differ only by graph collapse into one line.
///
/// # Errors
/// - `FormatError::Io` / `FormatError::Utf8` if the serializer fails
pub fn to_ntriples(quads: &[Quad]) -> Result<String, FormatError> {
    let mut writer = NTriplesSerializer::new().for_writer(Vec::new());
    let mut previous: Option<TripleRef<'_>> = None;
    for quad in sorted(quads) {
        let triple = TripleRef::new(quad.subject.as_ref(), quad.predicate.as_ref(), quad.object.as_ref());
        if previous == Some(triple) {
            continue;
        }
        writer.serialize_triple(triple)?;
        previous = Some(triple);
    }
    Ok(String::from_utf8(writer.finish())?)
}

/// Parse N-Quads text
///
/// # Errors
/// - `FormatError::Syntax` on the first invalid statement
pub fn parse_nquads(text: &str) -> Result<Vec<Quad>, FormatError> {
    NQuadsParser::new()
        .for_slice(text.as_bytes())
        .map(|quad| quad.map_err(|e| FormatError::Syntax(e.to_string())))
        .collect()
}

/// Parse N-Triples text into default-graph quads
///
/// # Errors
/// - `FormatError::Syntax` on the first invalid statement
pub fn parse_ntriples(text: &str) -> Result<Vec<Quad>, FormatError> {
    NTriplesParser::new()
        .for_slice(text.as_bytes())
        .map(|triple| {
            triple
                .map(|t| t.in_graph(GraphName::DefaultGraph))
                .map_err(|e| FormatError::Syntax(e.to_string()))
        })
        .collect()
}

/// Parse Turtle text into default-graph quads
///
/// # Errors
/// - `FormatError::InvalidBase` if `base` is not an absolute IRI
/// - `FormatError::Syntax` on the first invalid statement
pub fn parse_turtle(text: &str, base: Option<&str>) -> Result<Vec<Quad>, FormatError> {
    let mut parser = TurtleParser::new();
    if let Some(base) = base {
        parser = parser
            .with_base_iri(base)
            .map_err(|e| FormatError::InvalidBase {
                iri: base.to_string(),
                message: e.to_string(),
            })?;
    }
    parser
        .for_slice(text.as_bytes())
        .map(|triple| {
            triple
                .map(|t| t.in_graph(GraphName::DefaultGraph))
                .map_err(|e| FormatError::Syntax(e.to_string()))
        })
        .collect()
}

fn sorted(quads: &[Quad]) -> Vec<&Quad> {
    let mut ordered: Vec<&Quad> = quads.iter().collect();
    ordered.sort_by_cached_key(|quad| quad.to_string());
    ordered
}
