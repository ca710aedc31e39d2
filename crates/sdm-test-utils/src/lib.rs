//! Testing utilities for SDM workspace
//!
//! Shared fixtures: shape documents, an in-memory fetcher that counts calls,
//! and helpers to build stores and simulate storage corruption.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use sdm_shapes::{FetchError, ShapeDescriptor, ShapeFetcher};
use sdm_store::codec::IndexKind;
use sdm_store::oxrdf::NamedNode;
use sdm_store::{KvBackend, MemoryBackend, QuadStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const SHAPES_URL: &str = "https://shapes.example/registry.ttl";

/// Two valid shapes (organisation, certificate) and one missing its stem
pub const REGISTRY_SHAPES: &str = r#"
@prefix sh: <http://www.w3.org/ns/shacl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix vann: <http://purl.org/vocab/vann/> .
@prefix ex: <https://example.org/ns#> .

ex:OrganisationShape a sh:NodeShape ;
    sh:targetClass ex:Organisation ;
    sh:name "Organisation" ;
    sh:description "A company, association or public body" ;
    vann:preferredNamespaceUri "https://x/org/" .

ex:CertificateShape a sh:NodeShape ;
    sh:targetClass ex:Certificate ;
    rdfs:label "Certificate" ;
    rdfs:comment "Proof that a product meets a standard" ;
    vann:preferredNamespaceUri <https://x/cert/> .

ex:DraftShape a sh:NodeShape ;
    sh:targetClass ex:Draft ;
    rdfs:label "Draft" ;
    rdfs:comment "Lacks a namespace stem" .
"#;

pub fn iri(value: &str) -> NamedNode {
    NamedNode::new_unchecked(value)
}

pub fn organisation_type() -> NamedNode {
    iri("https://example.org/ns#Organisation")
}

pub fn certificate_type() -> NamedNode {
    iri("https://example.org/ns#Certificate")
}

pub fn organisation_descriptor() -> ShapeDescriptor {
    ShapeDescriptor::new(
        iri("https://example.org/ns#OrganisationShape"),
        organisation_type(),
        "Organisation",
        "A company, association or public body",
        "https://x/org/",
    )
}

pub fn certificate_descriptor() -> ShapeDescriptor {
    ShapeDescriptor::new(
        iri("https://example.org/ns#CertificateShape"),
        certificate_type(),
        "Certificate",
        "Proof that a product meets a standard",
        "https://x/cert/",
    )
}

pub fn memory_store() -> Arc<QuadStore> {
    Arc::new(QuadStore::in_memory())
}

/// Store plus direct handle on its backend, for corruption scenarios
pub fn store_with_backend() -> (Arc<QuadStore>, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let store = Arc::new(QuadStore::new(backend.clone()));
    (store, backend)
}

/// Write an undecodable record into the primary index
pub async fn corrupt(backend: &MemoryBackend) {
    let key = vec![IndexKind::Spog.tag(), 0, 0, 0, 64, b'<'];
    backend
        .put(key, Vec::new())
        .await
        .unwrap_or_else(|e| panic!("corrupting backend failed: {e}"));
}

/// In-memory fetcher with per-URL documents and a call counter
#[derive(Debug, Default)]
pub struct StaticFetcher {
    documents: Mutex<HashMap<String, String>>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, url: &str, text: &str) -> Self {
        self.set_document(url, text);
        self
    }

    pub fn set_document(&self, url: &str, text: &str) {
        self.documents.lock().insert(url.to_string(), text.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ShapeFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.documents
            .lock()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_string()))
    }
}

pub fn registry_fetcher() -> Arc<StaticFetcher> {
    Arc::new(StaticFetcher::new().with_document(SHAPES_URL, REGISTRY_SHAPES))
}
