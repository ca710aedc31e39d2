//! Integration tests for the resource lifecycle

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use sdm_lifecycle::audit::parse_timestamp;
use sdm_lifecycle::{
    Clock, Identifiers, LifecycleError, ListOptions, ManualClock, ResourceManager, SaveOptions,
    StatementFormat, ValidityIris,
};
use sdm_store::oxrdf::{GraphName, Literal, NamedNode, Quad, Subject};
use sdm_store::vocab::{dcterms, rdf, rdfs, skos, time};
use sdm_store::{ChangeKind, QuadPattern, QuadStore};
use sdm_test_utils::{
    certificate_descriptor, certificate_type, iri, memory_store, organisation_descriptor,
    organisation_type, store_with_backend,
};

const PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap()
}

fn setup() -> (ResourceManager, Arc<QuadStore>, Arc<ManualClock>) {
    let store = memory_store();
    let clock = Arc::new(ManualClock::new(start()));
    let manager = ResourceManager::with_clock(store.clone(), clock.clone());
    (manager, store, clock)
}

fn labelled(subject: &NamedNode, label: &str) -> String {
    format!("<{}> <{PREF_LABEL}> \"{label}\" .\n", subject.as_str())
}

fn org_ids(local: &str) -> Identifiers {
    Identifiers::for_subject(iri(&format!("https://x/org/{local}")))
}

async fn graph_quads(store: &QuadStore, graph: &NamedNode) -> Vec<Quad> {
    store
        .get(&QuadPattern::any().graph(graph.clone()))
        .await
        .unwrap()
}

fn count(quads: &[Quad], subject: &NamedNode, predicate: &str) -> usize {
    quads
        .iter()
        .filter(|q| matches!(&q.subject, Subject::NamedNode(s) if s == subject))
        .filter(|q| q.predicate.as_str() == predicate)
        .count()
}

#[tokio::test]
async fn end_to_end_create_list_and_retire() {
    let (manager, store, clock) = setup();
    let descriptor = organisation_descriptor();
    let ids = manager.mint_identifiers(&descriptor).unwrap();
    assert!(ids.subject.as_str().starts_with("https://x/org/"));

    let text = format!(
        "<{s}> <{}> <{}> .\n<{s}> <{PREF_LABEL}> \"Acme\" .\n",
        rdf::TYPE.as_str(),
        organisation_type().as_str(),
        s = ids.subject.as_str(),
    );
    manager
        .save(&text, &ids.subject, &ids.graph, &descriptor.target_type)
        .await
        .unwrap();

    let listed = manager.list_resources(std::slice::from_ref(&descriptor)).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].label, "Acme");
    assert!(!listed[0].expired);
    assert_eq!(listed[0].graph, ids.graph);
    assert_eq!(listed[0].descriptor, descriptor);

    clock.advance(Duration::seconds(10));
    manager.remove(&listed[0]).await.unwrap();

    assert!(manager
        .list_resources(std::slice::from_ref(&descriptor))
        .await
        .is_empty());
    let all = manager
        .list_resources_with(std::slice::from_ref(&descriptor), ListOptions::all())
        .await;
    assert_eq!(all.len(), 1);
    assert!(all[0].expired);

    let quads = graph_quads(&store, &ids.graph).await;
    let g = GraphName::NamedNode(ids.graph.clone());
    assert!(quads.contains(&Quad::new(
        ids.subject.clone(),
        rdf::TYPE.into_owned(),
        organisation_type(),
        g.clone(),
    )));
    assert!(quads.contains(&Quad::new(
        ids.subject.clone(),
        skos::PREF_LABEL.into_owned(),
        Literal::new_simple_literal("Acme"),
        g,
    )));
    let end = ValidityIris::for_subject(&ids.subject).end;
    let ends: Vec<_> = quads
        .iter()
        .filter(|q| matches!(&q.subject, Subject::NamedNode(s) if *s == end))
        .filter_map(|q| parse_timestamp(&q.object))
        .collect();
    assert_eq!(ends.len(), 1);
    assert!(ends[0] <= clock.now());
}

#[tokio::test]
async fn saving_twice_keeps_one_type_statement() {
    let (manager, store, _clock) = setup();
    let ids = org_ids("twice");
    let text = format!(
        "<{s}> <{}> <{}> <https://elsewhere/g> .\n{}",
        rdf::TYPE.as_str(),
        organisation_type().as_str(),
        labelled(&ids.subject, "Twice"),
        s = ids.subject.as_str(),
    );

    for _ in 0..2 {
        manager
            .save(&text, &ids.subject, &ids.graph, &organisation_type())
            .await
            .unwrap();
    }

    let quads = graph_quads(&store, &ids.graph).await;
    assert_eq!(count(&quads, &ids.subject, rdf::TYPE.as_str()), 1);
    let elsewhere = store
        .get(&QuadPattern::any().graph(iri("https://elsewhere/g")))
        .await
        .unwrap();
    assert!(elsewhere.is_empty());
}

#[tokio::test]
async fn creation_is_kept_and_modification_moves_forward() {
    let (manager, store, clock) = setup();
    let ids = org_ids("stamps");

    let first = manager
        .save(&labelled(&ids.subject, "v1"), &ids.subject, &ids.graph, &organisation_type())
        .await
        .unwrap();
    assert!(first.first_save);
    assert_eq!(first.modified, None);
    let state = manager.resource_state(&ids.subject, &ids.graph).await.unwrap();
    assert_eq!(state.created, Some(start()));
    assert_eq!(state.modified, None);

    clock.advance(Duration::seconds(5));
    let second = manager
        .save(&labelled(&ids.subject, "v2"), &ids.subject, &ids.graph, &organisation_type())
        .await
        .unwrap();
    assert!(!second.first_save);
    let state = manager.resource_state(&ids.subject, &ids.graph).await.unwrap();
    assert_eq!(state.created, Some(start()));
    assert_eq!(state.modified, Some(start() + Duration::seconds(5)));

    // Clock has not moved: the stamp still advances.
    manager
        .save(&labelled(&ids.subject, "v3"), &ids.subject, &ids.graph, &organisation_type())
        .await
        .unwrap();
    let later = manager.resource_state(&ids.subject, &ids.graph).await.unwrap();
    assert!(later.modified > state.modified);

    let quads = graph_quads(&store, &ids.graph).await;
    assert_eq!(count(&quads, &ids.subject, dcterms::CREATED.as_str()), 1);
    assert_eq!(count(&quads, &ids.subject, dcterms::MODIFIED.as_str()), 1);
    assert_eq!(count(&quads, &ids.subject, skos::PREF_LABEL.as_str()), 1);
}

#[tokio::test]
async fn updates_within_one_millisecond_get_distinct_stamps() {
    let (manager, _store, clock) = setup();
    let ids = org_ids("quick");
    manager
        .save(&labelled(&ids.subject, "v1"), &ids.subject, &ids.graph, &organisation_type())
        .await
        .unwrap();

    clock.advance(Duration::microseconds(300));
    let second = manager
        .save(&labelled(&ids.subject, "v2"), &ids.subject, &ids.graph, &organisation_type())
        .await
        .unwrap();
    let m1 = manager.resource_state(&ids.subject, &ids.graph).await.unwrap().modified;
    assert_eq!(second.modified, m1);

    clock.advance(Duration::microseconds(300));
    let third = manager
        .save(&labelled(&ids.subject, "v3"), &ids.subject, &ids.graph, &organisation_type())
        .await
        .unwrap();
    let m2 = manager.resource_state(&ids.subject, &ids.graph).await.unwrap().modified;
    assert_eq!(third.modified, m2);
    assert!(m2 > m1, "{m2:?} should be after {m1:?}");
    assert_eq!(second.created, start());
    assert_eq!(third.created, start());
}

#[tokio::test]
async fn submitted_audit_stamps_are_ignored() {
    let (manager, _store, _clock) = setup();
    let ids = org_ids("forged");
    let text = format!(
        "{}<{}> <{}> \"1999-01-01T00:00:00.000Z\"^^<http://www.w3.org/2001/XMLSchema#dateTime> .\n",
        labelled(&ids.subject, "Forged"),
        ids.subject.as_str(),
        dcterms::CREATED.as_str(),
    );
    manager
        .save(&text, &ids.subject, &ids.graph, &organisation_type())
        .await
        .unwrap();

    let state = manager.resource_state(&ids.subject, &ids.graph).await.unwrap();
    assert_eq!(state.created, Some(start()));
}

#[tokio::test]
async fn malformed_text_is_a_parse_error_and_writes_nothing() {
    let (manager, store, _clock) = setup();
    let ids = org_ids("broken");

    let err = manager
        .save("<unterminated", &ids.subject, &ids.graph, &organisation_type())
        .await
        .unwrap_err();

    assert!(matches!(err, LifecycleError::Parse(_)));
    assert!(err.requires_user_correction());
    assert!(store.is_empty().await.unwrap());
}

#[tokio::test]
async fn turtle_resolves_relative_iris_against_the_subject() {
    let (manager, store, _clock) = setup();
    let ids = org_ids("turtle");
    let text = format!("<> <{PREF_LABEL}> \"Turtle Co\" ; <{}> \"note\" .", rdfs::COMMENT.as_str());

    manager
        .save_text(
            &text,
            &ids.subject,
            &ids.graph,
            &organisation_type(),
            SaveOptions::default().with_format(StatementFormat::Turtle),
        )
        .await
        .unwrap();

    let quads = graph_quads(&store, &ids.graph).await;
    assert_eq!(count(&quads, &ids.subject, skos::PREF_LABEL.as_str()), 1);
    assert_eq!(manager.label_of(&ids.subject).await, "Turtle Co");
}

#[tokio::test]
async fn update_is_one_delete_then_one_put() {
    let (manager, store, clock) = setup();
    let ids = org_ids("events");
    manager
        .save(&labelled(&ids.subject, "Before"), &ids.subject, &ids.graph, &organisation_type())
        .await
        .unwrap();

    let kinds = Arc::new(Mutex::new(Vec::new()));
    let sink = kinds.clone();
    let _subscription = store.subscribe(move |event| sink.lock().push(event.kind()));

    clock.advance(Duration::seconds(1));
    manager
        .save(&labelled(&ids.subject, "After"), &ids.subject, &ids.graph, &organisation_type())
        .await
        .unwrap();

    assert_eq!(*kinds.lock(), vec![ChangeKind::Delete, ChangeKind::Put]);
}

#[tokio::test]
async fn existing_validity_survives_later_saves() {
    let (manager, store, clock) = setup();
    let ids = org_ids("valid");
    manager
        .save_text(
            &labelled(&ids.subject, "Valid"),
            &ids.subject,
            &ids.graph,
            &organisation_type(),
            SaveOptions::default().with_validity(),
        )
        .await
        .unwrap();

    clock.advance(Duration::minutes(3));
    manager
        .save(&labelled(&ids.subject, "Still valid"), &ids.subject, &ids.graph, &organisation_type())
        .await
        .unwrap();

    let state = manager.resource_state(&ids.subject, &ids.graph).await.unwrap();
    let window = state.validity.unwrap();
    assert_eq!(window.beginning, Some(start()));
    assert_eq!(window.end, None);

    let quads = graph_quads(&store, &ids.graph).await;
    assert_eq!(count(&quads, &ids.subject, time::HAS_TIME.as_str()), 1);
}

#[tokio::test]
async fn retiring_again_leaves_a_single_end() {
    let (manager, store, clock) = setup();
    let descriptor = organisation_descriptor();
    let ids = org_ids("again");
    manager
        .save(&labelled(&ids.subject, "Again"), &ids.subject, &ids.graph, &organisation_type())
        .await
        .unwrap();
    let record = manager
        .list_resources(std::slice::from_ref(&descriptor))
        .await
        .remove(0);

    clock.advance(Duration::seconds(1));
    let first = manager.remove(&record).await.unwrap();
    assert_eq!(first.beginning, start());
    clock.advance(Duration::seconds(1));
    let second = manager.remove(&record).await.unwrap();

    let end = ValidityIris::for_subject(&ids.subject).end;
    let quads = graph_quads(&store, &ids.graph).await;
    assert_eq!(count(&quads, &end, time::IN_XSD_DATE_TIME_STAMP.as_str()), 1);
    let state = manager.resource_state(&ids.subject, &ids.graph).await.unwrap();
    assert_eq!(state.validity.unwrap().end, Some(second.ended_at));
    assert!(state.is_expired_at(clock.now()));
}

#[tokio::test]
async fn retiring_an_unknown_resource_is_reported() {
    let (manager, _store, _clock) = setup();
    let ids = org_ids("ghost");
    let err = manager.retire(&ids.subject, &ids.graph).await.unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound(_)));
}

#[tokio::test]
async fn restore_reopens_a_retired_resource() {
    let (manager, _store, clock) = setup();
    let descriptor = organisation_descriptor();
    let ids = org_ids("phoenix");
    manager
        .save(&labelled(&ids.subject, "Phoenix"), &ids.subject, &ids.graph, &organisation_type())
        .await
        .unwrap();
    let record = manager
        .list_resources(std::slice::from_ref(&descriptor))
        .await
        .remove(0);
    manager.remove(&record).await.unwrap();
    clock.advance(Duration::seconds(1));

    assert!(manager.restore(&record).await.unwrap());
    assert!(!manager.restore(&record).await.unwrap());
    let listed = manager.list_resources(std::slice::from_ref(&descriptor)).await;
    assert_eq!(listed.len(), 1);
    assert!(!listed[0].expired);
}

#[tokio::test]
async fn incoming_references_are_distinct_and_sorted() {
    let (manager, store, _clock) = setup();
    let target = iri("https://x/target");
    let p = iri("https://x/rel");
    let g = GraphName::DefaultGraph;
    store
        .put(vec![
            Quad::new(iri("https://x/Beta"), p.clone(), target.clone(), g.clone()),
            Quad::new(iri("https://x/gamma"), p.clone(), iri("https://x/other"), g.clone()),
            Quad::new(iri("https://x/alpha"), p.clone(), target.clone(), g.clone()),
            Quad::new(iri("https://x/Beta"), iri("https://x/rel2"), target.clone(), g.clone()),
            Quad::new(target.clone(), p, target.clone(), g),
        ])
        .await
        .unwrap();

    let referrers = manager.list_incoming_references(&target).await;
    assert_eq!(referrers, vec![iri("https://x/alpha"), iri("https://x/Beta")]);
}

#[tokio::test]
async fn labels_fall_back_and_sort_case_insensitively() {
    let (manager, store, _clock) = setup();
    let descriptor = organisation_descriptor();
    let g = |s: &str| GraphName::NamedNode(iri(&format!("{s}#graph")));
    let a = "https://x/org/a";
    let b = "https://x/org/b";
    let c = "https://x/org/c";
    store
        .put(vec![
            Quad::new(iri(a), rdf::TYPE.into_owned(), organisation_type(), g(a)),
            Quad::new(iri(a), rdfs::LABEL.into_owned(), Literal::new_simple_literal("zeta"), g(a)),
            Quad::new(iri(b), rdf::TYPE.into_owned(), organisation_type(), g(b)),
            Quad::new(iri(b), rdfs::LABEL.into_owned(), Literal::new_simple_literal("ignored"), g(b)),
            Quad::new(iri(b), skos::PREF_LABEL.into_owned(), Literal::new_simple_literal("Alpha"), g(b)),
            Quad::new(iri(c), rdf::TYPE.into_owned(), organisation_type(), g(c)),
        ])
        .await
        .unwrap();

    let labels: Vec<String> = manager
        .list_resources(std::slice::from_ref(&descriptor))
        .await
        .into_iter()
        .map(|r| r.label)
        .collect();
    assert_eq!(labels, vec!["Alpha", c, "zeta"]);
}

#[tokio::test]
async fn corrupted_store_exports_empty_and_lists_nothing() {
    let (store, backend) = store_with_backend();
    let manager = ResourceManager::new(store.clone());
    store
        .put(vec![Quad::new(
            iri("https://x/org/1"),
            rdf::TYPE.into_owned(),
            organisation_type(),
            GraphName::NamedNode(iri("https://x/org/1#graph")),
        )])
        .await
        .unwrap();
    sdm_test_utils::corrupt(&backend).await;

    assert_eq!(manager.export_nquads().await.unwrap(), "");
    assert!(manager.list_resources(&[organisation_descriptor()]).await.is_empty());
    assert!(store.is_empty().await.unwrap());
}

#[tokio::test]
async fn dangling_references_are_found_and_repaired() {
    let (manager, _store, clock) = setup();
    let org = organisation_descriptor();
    let cert = certificate_descriptor();
    let issuer = org_ids("issuer");
    let certificate = Identifiers::for_subject(iri("https://x/cert/c1"));

    manager
        .save(&labelled(&issuer.subject, "Issuer"), &issuer.subject, &issuer.graph, &organisation_type())
        .await
        .unwrap();
    let reference = format!(
        "<{}> <https://example.org/ns#issuedBy> <{}> .\n",
        certificate.subject.as_str(),
        issuer.subject.as_str()
    );
    manager
        .save(&reference, &certificate.subject, &certificate.graph, &certificate_type())
        .await
        .unwrap();

    let descriptors = vec![org, cert];
    assert!(manager.find_dangling_references(&descriptors).await.is_empty());
    assert_eq!(
        manager.list_incoming_references(&issuer.subject).await,
        vec![certificate.subject.clone()]
    );

    clock.advance(Duration::seconds(1));
    manager.retire(&issuer.subject, &issuer.graph).await.unwrap();
    clock.advance(Duration::seconds(1));

    let dangling = manager.find_dangling_references(&descriptors).await;
    assert_eq!(dangling.len(), 1);
    assert_eq!(dangling[0].target, issuer.subject);
    assert_eq!(
        dangling[0].statement.graph_name,
        GraphName::NamedNode(certificate.graph.clone())
    );

    let report = manager.repair_dangling_references(&dangling).await;
    assert_eq!(report.removed, 1);
    assert_eq!(report.graphs, vec![certificate.graph.clone()]);
    assert!(report.failed.is_empty());

    assert!(manager.find_dangling_references(&descriptors).await.is_empty());
    let state = manager
        .resource_state(&certificate.subject, &certificate.graph)
        .await
        .unwrap();
    assert_eq!(state.modified, Some(clock.now()));
}

#[tokio::test]
async fn minted_identifiers_are_fresh_and_validated() {
    let (manager, _store, _clock) = setup();
    let descriptor = certificate_descriptor();
    let a = manager.mint_identifiers(&descriptor).unwrap();
    let b = manager.mint_identifiers(&descriptor).unwrap();
    assert_ne!(a, b);
    assert_eq!(a.graph.as_str(), format!("{}#graph", a.subject.as_str()));

    let mut broken = descriptor;
    broken.values_namespace = "not a namespace ".into();
    let err = manager.mint_identifiers(&broken).unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidIri { .. }));
}

#[tokio::test]
async fn exports_keep_or_drop_graphs() {
    let (manager, _store, _clock) = setup();
    let ids = org_ids("export");
    manager
        .save(&labelled(&ids.subject, "Export"), &ids.subject, &ids.graph, &organisation_type())
        .await
        .unwrap();

    let quads = manager.export_nquads().await.unwrap();
    let triples = manager.export_ntriples().await.unwrap();
    assert!(quads.contains(ids.graph.as_str()));
    assert!(!triples.contains(ids.graph.as_str()));
    assert_eq!(quads.lines().count(), triples.lines().count());

    let record = manager
        .list_resources(&[organisation_descriptor()])
        .await
        .remove(0);
    let text = manager.read_as_text(&record).await;
    assert_eq!(text.lines().count(), 3);
    assert_eq!(manager.read_graph_as_text(&iri("https://x/none#graph")).await, "");
}
