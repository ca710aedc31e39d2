//! Descriptor discovery over a shape graph
//!
//! Candidates missing a label, description, namespace stem or target type
//! are excluded with a warning; none of these is an error.

use crate::descriptor::{DescriptorSet, ShapeDescriptor};
use sdm_store::oxrdf::{NamedNode, NamedNodeRef, Quad, Subject, Term};
use sdm_store::vocab::{dcterms, owl, rdf, rdfs, sh, skos, vann, xsd};
use std::collections::{BTreeSet, HashMap};

/// Label predicates, most preferred first
const LABEL_PREDICATES: [NamedNodeRef<'static>; 4] =
    [sh::NAME, rdfs::LABEL, skos::PREF_LABEL, dcterms::TITLE];

/// Description predicates, most preferred first
const DESCRIPTION_PREDICATES: [NamedNodeRef<'static>; 4] = [
    sh::DESCRIPTION,
    rdfs::COMMENT,
    skos::DEFINITION,
    dcterms::DESCRIPTION,
];

/// Per-subject lookup over the shape statements
struct ShapeGraph<'a> {
    by_subject: HashMap<Subject, Vec<(&'a NamedNode, &'a Term)>>,
}

impl<'a> ShapeGraph<'a> {
    fn new(quads: &'a [Quad]) -> Self {
        let mut by_subject: HashMap<Subject, Vec<_>> = HashMap::new();
        for quad in quads {
            by_subject
                .entry(quad.subject.clone())
                .or_default()
                .push((&quad.predicate, &quad.object));
        }
        Self { by_subject }
    }

    fn objects(
        &self,
        subject: &Subject,
        predicate: NamedNodeRef<'static>,
    ) -> impl Iterator<Item = &'a Term> + '_ {
        self.by_subject
            .get(subject)
            .into_iter()
            .flat_map(|pairs| pairs.iter())
            .filter(move |(p, _)| p.as_str() == predicate.as_str())
            .map(|(_, o)| *o)
    }

    fn has_type(&self, subject: &Subject, class: NamedNodeRef<'static>) -> bool {
        self.objects(subject, rdf::TYPE)
            .any(|o| matches!(o, Term::NamedNode(n) if n.as_str() == class.as_str()))
    }

    /// Smallest literal value of the first predicate that has one
    fn first_literal(&self, subject: &Subject, predicates: &[NamedNodeRef<'static>]) -> Option<String> {
        predicates.iter().find_map(|predicate| {
            self.objects(subject, *predicate)
                .filter_map(|o| match o {
                    Term::Literal(l) if !l.value().trim().is_empty() => Some(l.value().to_string()),
                    _ => None,
                })
                .collect::<BTreeSet<_>>()
                .into_iter()
                .next()
        })
    }

    fn first_iri(&self, subject: &Subject, predicate: NamedNodeRef<'static>) -> Option<NamedNode> {
        self.objects(subject, predicate)
            .filter_map(|o| match o {
                Term::NamedNode(n) => Some(n.clone()),
                _ => None,
            })
            .min_by(|a, b| a.as_str().cmp(b.as_str()))
    }

    /// Namespace stem: an IRI, or a plain / `xsd:anyURI` literal
    fn namespace_stem(&self, subject: &Subject) -> Option<String> {
        self.objects(subject, vann::PREFERRED_NAMESPACE_URI)
            .filter_map(|o| match o {
                Term::NamedNode(n) => Some(n.as_str().to_string()),
                Term::Literal(l)
                    if l.language().is_none()
                        && (l.datatype().as_str() == xsd::STRING.as_str()
                            || l.datatype().as_str() == xsd::ANY_URI.as_str()) =>
                {
                    Some(l.value().trim().to_string())
                }
                _ => None,
            })
            .filter(|stem| !stem.is_empty())
            .min()
    }
}

/// Derive every valid descriptor from a set of shape statements
///
/// Graph names are ignored; the statements may come from several documents.
#[must_use]
pub fn discover(quads: &[Quad]) -> DescriptorSet {
    let graph = ShapeGraph::new(quads);

    let mut shapes: Vec<&NamedNode> = quads
        .iter()
        .filter(|q| q.predicate.as_str() == rdf::TYPE.as_str())
        .filter(|q| matches!(&q.object, Term::NamedNode(n) if n.as_str() == sh::NODE_SHAPE.as_str()))
        .filter_map(|q| match &q.subject {
            Subject::NamedNode(n) => Some(n),
            _ => {
                tracing::debug!(subject = %q.subject, "Skipping anonymous shape");
                None
            }
        })
        .collect();
    shapes.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    shapes.dedup();

    let descriptors = shapes
        .into_iter()
        .filter_map(|shape| describe(&graph, shape))
        .collect();

    let set = DescriptorSet::new(descriptors);
    tracing::debug!(count = set.len(), "Discovered shape descriptors");
    set
}

fn describe(graph: &ShapeGraph<'_>, shape: &NamedNode) -> Option<ShapeDescriptor> {
    let subject = Subject::NamedNode(shape.clone());

    let target_type = graph.first_iri(&subject, sh::TARGET_CLASS).or_else(|| {
        // Implicit class target: a shape that is itself a class governs itself
        (graph.has_type(&subject, rdfs::CLASS) || graph.has_type(&subject, owl::CLASS))
            .then(|| shape.clone())
    });

    let Some(target_type) = target_type else {
        tracing::warn!(shape = %shape, "Excluding shape without target class");
        return None;
    };
    let Some(label) = graph.first_literal(&subject, &LABEL_PREDICATES) else {
        tracing::warn!(shape = %shape, "Excluding shape without label");
        return None;
    };
    let Some(description) = graph.first_literal(&subject, &DESCRIPTION_PREDICATES) else {
        tracing::warn!(shape = %shape, "Excluding shape without description");
        return None;
    };
    let Some(namespace) = graph.namespace_stem(&subject) else {
        tracing::warn!(shape = %shape, "Excluding shape without namespace stem");
        return None;
    };

    Some(ShapeDescriptor::new(
        shape.clone(),
        target_type,
        label,
        description,
        namespace,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdm_store::format::parse_turtle;

    const SHAPES: &str = r#"
        @prefix sh: <http://www.w3.org/ns/shacl#> .
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
        @prefix vann: <http://purl.org/vocab/vann/> .
        @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
        @prefix ex: <https://x/> .

        ex:OrgShape a sh:NodeShape ;
            sh:targetClass ex:Organisation ;
            rdfs:label "Organisation" ;
            sh:name "organisation" ;
            rdfs:comment "A legal entity" ;
            vann:preferredNamespaceUri "https://x/org/"^^xsd:anyURI .

        ex:Certificate a sh:NodeShape, rdfs:Class ;
            rdfs:label "certificate" ;
            rdfs:comment "Proof of conformity" ;
            vann:preferredNamespaceUri <https://x/cert/> .

        ex:NoStem a sh:NodeShape ;
            sh:targetClass ex:Thing ;
            rdfs:label "Thing" ;
            rdfs:comment "No namespace" .

        ex:NoDescription a sh:NodeShape ;
            sh:targetClass ex:Other ;
            rdfs:label "Other" ;
            vann:preferredNamespaceUri "https://x/other/" .

        ex:NoTarget a sh:NodeShape ;
            rdfs:label "Floating" ;
            rdfs:comment "No target" ;
            vann:preferredNamespaceUri "https://x/floating/" .
    "#;

    #[test]
    fn discovers_valid_shapes_sorted_by_label() {
        let quads = parse_turtle(SHAPES, None).unwrap();
        let set = discover(&quads);

        let labels: Vec<_> = set.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["certificate", "organisation"]);

        let org = set.by_slug("organisation").unwrap();
        assert_eq!(org.target_type.as_str(), "https://x/Organisation");
        assert_eq!(org.values_namespace, "https://x/org/");
        assert_eq!(org.description, "A legal entity");
        assert_eq!(org.plural_label, "organisations");

        let cert = set.by_slug("certificate").unwrap();
        assert_eq!(cert.target_type.as_str(), "https://x/Certificate");
        assert_eq!(cert.values_namespace, "https://x/cert/");
    }

    #[test]
    fn empty_graph_yields_no_descriptors() {
        assert!(discover(&[]).is_empty());
    }
}
