use super::*;
use crate::{
    config::MetricsConfig,
    entity::{ExportFormat, GapMode},
    model::FieldMapping,
    source::{MemorySource, SourceError},
    test_support::{Author, Book, Shelf, author_record, book_record, registry},
};
use std::sync::atomic::{AtomicUsize, Ordering};

// Self-referencing model; typed `entity!` declarations cannot name
// themselves as a relation target.
static NODE: EntityModel = EntityModel {
    entity_name: "Node",
    identity_key: "id",
    fields: &[FieldMapping::same("id"), FieldMapping::same("parent")],
    relations: &[RelationModel::single("Node", "parent").via("parent_id")],
};

fn authors() -> MemorySource {
    MemorySource::new("Author")
        .with(101, author_record())
        .expect("author id is keyable")
}

fn books() -> MemorySource {
    MemorySource::new("Book")
        .with(201, book_record())
        .expect("book id is keyable")
        .with(
            202,
            RawRecord::new()
                .with("id", 202)
                .with("title", "Three Men on the Bummel")
                .with("author", 101),
        )
        .expect("book id is keyable")
}

fn session() -> Session {
    Session::new(registry(), Config::default())
        .expect("default config is valid")
        .bind::<Author>(authors())
        .expect("Author is registered")
        .bind::<Book>(books())
        .expect("Book is registered")
}

#[test]
fn load_resolves_single_relation() {
    let session = session();
    let book = session.load_kind::<Book>(201).expect("book should load");

    let author = book
        .get_entity("authorData")
        .expect("author relation should be injected");
    assert_eq!(
        author.get_value("firstName"),
        Some(&Value::Text("Jerome".into()))
    );
    assert_eq!(book.get_value("author"), Some(&Value::Text("101".into())));
}

#[test]
fn related_instances_are_shared_through_the_cache() {
    let session = session();
    let first = session.load_kind::<Book>(201).expect("book should load");
    let second = session.load_kind::<Book>(202).expect("book should load");
    let author = session.load_kind::<Author>("101").expect("author should load");

    let a = first.get_entity("authorData").expect("author injected");
    let b = second.get_entity("authorData").expect("author injected");
    assert!(EntityRef::ptr_eq(a, b));
    assert!(EntityRef::ptr_eq(a, &author));
    assert_eq!(session.cache().len(), 3);
}

#[test]
fn cached_entities_skip_relation_resolution() {
    let fetches = Arc::new(AtomicUsize::new(0));
    let counter = fetches.clone();

    let session = Session::new(registry(), Config::default())
        .expect("default config is valid")
        .bind::<Book>(books())
        .expect("Book is registered")
        .bind::<Author>(move |id: &Value| {
            counter.fetch_add(1, Ordering::SeqCst);
            authors().fetch_by_id(id)
        })
        .expect("Author is registered");

    let first = session.load_kind::<Book>(201).expect("book should load");
    let second = session.load_kind::<Book>(201).expect("book should hit");

    assert!(EntityRef::ptr_eq(&first, &second));
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[test]
fn multiple_relation_loads_each_id_in_order() {
    let shelves = MemorySource::new("Shelf")
        .with(
            1,
            RawRecord::new()
                .with("id", 1)
                .with("label", "Jerome")
                .with(
                    "book_ids",
                    Value::List(vec![Value::Int(202), Value::Null, Value::Int(201)]),
                ),
        )
        .expect("shelf id is keyable");
    let session = session().bind::<Shelf>(shelves).expect("Shelf is registered");

    let shelf = session.load_kind::<Shelf>(1).expect("shelf should load");
    let titles: Vec<_> = shelf
        .get_entities("books")
        .expect("books injected")
        .iter()
        .map(|book| book.get_value("title").cloned())
        .collect();

    assert_eq!(
        titles,
        vec![
            Some(Value::Text("Three Men on the Bummel".into())),
            Some(Value::Text("Three Men In A Boat".into())),
        ]
    );
}

#[test]
fn absent_foreign_key_skips_relation() {
    let books = MemorySource::new("Book")
        .with(300, RawRecord::new().with("id", 300).with("title", "Anonymous"))
        .expect("book id is keyable");
    let session = Session::new(registry(), Config::default())
        .expect("default config is valid")
        .bind::<Book>(books)
        .expect("Book is registered");

    let book = session.load_kind::<Book>(300).expect("book should load");
    assert!(!book.has_field("authorData"));
}

#[test]
fn missing_source_is_reported() {
    let session = Session::new(registry(), Config::default())
        .expect("default config is valid")
        .bind::<Book>(books())
        .expect("Book is registered");

    let err = session
        .load_kind::<Book>(201)
        .expect_err("no author source is bound");
    assert_eq!(err.kind, ErrorKind::MissingSource);
    assert!(session.cache().is_empty());
}

#[test]
fn source_failures_propagate_and_cache_nothing() {
    let session = session();

    let err = session
        .load_kind::<Book>(999)
        .expect_err("book 999 does not exist");
    assert_eq!(err.kind, ErrorKind::RecordNotFound);

    let failing = Session::new(registry(), Config::default())
        .expect("default config is valid")
        .bind::<Author>(|_: &Value| -> Result<RawRecord, SourceError> {
            Err(SourceError::unavailable("Author", "connection refused"))
        })
        .expect("Author is registered");
    let err = failing
        .load_kind::<Author>(101)
        .expect_err("source is down");
    assert_eq!(err.kind, ErrorKind::SourceUnavailable);
    assert!(failing.cache().is_empty());

    let report = failing.metrics_report().expect("metrics are enabled");
    assert_eq!(report.ops.source_fetches, 1);
    assert_eq!(report.ops.source_failures, 1);
}

#[test]
fn binding_requires_registered_type() {
    let mut session = Session::new(registry(), Config::default()).expect("default config is valid");

    let err = session
        .bind_source("Publisher", MemorySource::new("Publisher"))
        .expect_err("Publisher is not registered");
    assert_eq!(err.kind, ErrorKind::UnknownEntityType);
}

#[test]
fn relation_depth_is_bounded() {
    let mut registry = EntityRegistry::new();
    registry.register(&NODE).expect("Node should register");

    let nodes = MemorySource::new("Node")
        .with(1, RawRecord::new().with("id", 1).with("parent_id", 2))
        .expect("node id is keyable")
        .with(2, RawRecord::new().with("id", 2).with("parent_id", 1))
        .expect("node id is keyable");

    let mut config = Config::default();
    config.relations.max_depth = 3;
    let mut session = Session::new(registry, config).expect("config is valid");
    session.bind_source("Node", nodes).expect("Node is registered");

    let err = session
        .load("Node", &Value::Int(1))
        .expect_err("cyclic parents never bottom out");
    assert_eq!(err.kind, ErrorKind::RelationDepthExceeded);
    assert!(session.cache().is_empty());
}

#[test]
fn shallow_depth_allows_direct_relations_only() {
    let mut config = Config::default();
    config.relations.max_depth = 1;

    let shelves = MemorySource::new("Shelf")
        .with(
            1,
            RawRecord::new()
                .with("id", 1)
                .with("book_ids", Value::List(vec![Value::Int(201)])),
        )
        .expect("shelf id is keyable");
    let session = Session::new(registry(), config)
        .expect("config is valid")
        .bind::<Author>(authors())
        .expect("Author is registered")
        .bind::<Book>(books())
        .expect("Book is registered")
        .bind::<Shelf>(shelves)
        .expect("Shelf is registered");

    let err = session
        .load_kind::<Shelf>(1)
        .expect_err("shelf -> book -> author is two levels");
    assert_eq!(err.kind, ErrorKind::RelationDepthExceeded);
    assert!(session.cache().is_empty());

    session.load_kind::<Book>(201).expect("one level is allowed");
}

#[test]
fn export_uses_configured_defaults() {
    let mut config = Config::default();
    config.export.default_format = ExportFormat::OrderedPairs;
    config.export.gap_mode = GapMode::SkipGaps;

    let session = Session::new(registry(), config)
        .expect("config is valid")
        .bind::<Author>(authors())
        .expect("Author is registered")
        .bind::<Book>(books())
        .expect("Book is registered");

    // book 202 has no description, publisher, topic or price
    let book = session.load_kind::<Book>(202).expect("book should load");
    let exported = session.export(&book);

    assert_eq!(exported.format(), ExportFormat::OrderedPairs);
    assert_eq!(
        exported.keys().collect::<Vec<_>>(),
        vec!["id", "title", "author", "authorData"]
    );
}

#[test]
fn disabled_metrics_report_nothing() {
    let config = Config {
        metrics: MetricsConfig { enabled: false },
        ..Config::default()
    };
    let session = Session::new(registry(), config).expect("config is valid");

    assert!(session.metrics_report().is_none());
}

#[test]
fn sessions_can_share_a_cache() {
    let first = session();
    let second = Session::with_cache(first.cache().clone(), Config::default())
        .expect("default config is valid")
        .bind::<Author>(authors())
        .expect("Author is registered");

    let a = first.load_kind::<Author>(101).expect("author should load");
    let b = second.load_kind::<Author>(101).expect("author should hit");

    assert!(EntityRef::ptr_eq(&a, &b));
    assert!(second.metrics_report().is_none());
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = Config::default();
    config.relations.max_depth = 0;

    let err = Session::new(registry(), config).expect_err("zero depth is invalid");
    assert_eq!(err.kind, ErrorKind::InvalidConfig);
}
