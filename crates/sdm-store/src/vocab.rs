//! IRIs of the vocabularies the engine reads and writes

/// RDF core vocabulary
pub mod rdf {
    pub use oxrdf::vocab::rdf::TYPE;
}

/// RDF Schema
pub mod rdfs {
    pub use oxrdf::vocab::rdfs::{CLASS, COMMENT, LABEL};
}

/// XML Schema datatypes
pub mod xsd {
    pub use oxrdf::vocab::xsd::{ANY_URI, DATE_TIME, DATE_TIME_STAMP, STRING};
}

/// OWL
pub mod owl {
    use oxrdf::NamedNodeRef;

    /// `owl:Class`
    pub const CLASS: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Class");
}

/// SKOS
pub mod skos {
    use oxrdf::NamedNodeRef;

    /// `skos:prefLabel`
    pub const PREF_LABEL: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2004/02/skos/core#prefLabel");
    /// `skos:definition`
    pub const DEFINITION: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2004/02/skos/core#definition");
}

/// Dublin Core terms
pub mod dcterms {
    use oxrdf::NamedNodeRef;

    /// `dcterms:created`
    pub const CREATED: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/terms/created");
    /// `dcterms:modified`
    pub const MODIFIED: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/terms/modified");
    /// `dcterms:title`
    pub const TITLE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/terms/title");
    /// `dcterms:description`
    pub const DESCRIPTION: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/terms/description");
}

/// OWL-Time
pub mod time {
    use oxrdf::NamedNodeRef;

    /// `time:Interval`
    pub const INTERVAL: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2006/time#Interval");
    /// `time:Instant`
    pub const INSTANT: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2006/time#Instant");
    /// `time:hasTime`
    pub const HAS_TIME: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2006/time#hasTime");
    /// `time:hasBeginning`
    pub const HAS_BEGINNING: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2006/time#hasBeginning");
    /// `time:hasEnd`
    pub const HAS_END: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2006/time#hasEnd");
    /// `time:inXSDDateTimeStamp`
    pub const IN_XSD_DATE_TIME_STAMP: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2006/time#inXSDDateTimeStamp");
}

/// SHACL
pub mod sh {
    use oxrdf::NamedNodeRef;

    /// `sh:NodeShape`
    pub const NODE_SHAPE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#NodeShape");
    /// `sh:targetClass`
    pub const TARGET_CLASS: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#targetClass");
    /// `sh:name`
    pub const NAME: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#name");
    /// `sh:description`
    pub const DESCRIPTION: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#description");
}

/// VANN (vocabulary annotation)
pub mod vann {
    use oxrdf::NamedNodeRef;

    /// `vann:preferredNamespaceUri`, the IRI stem new instances are minted under
    pub const PREFERRED_NAMESPACE_URI: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://purl.org/vocab/vann/preferredNamespaceUri");
}
