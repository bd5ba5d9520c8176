//! End-to-end behavior of the index through its public API.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{sync::Arc, time::Duration};

use scavenger_index::{
    Clock, DEFAULT_RECENCY_WINDOW, DocumentRecord, ErrorKind, HighlightEngine, IndexField,
    IndexStore, ManualClock, QueryEngine, RecencyGate, SearchRequest, SearchService,
    StoreOptions, SystemClock,
};
use tempfile::TempDir;

fn record(key: &str, description: &str, data: &str) -> DocumentRecord {
    DocumentRecord {
        key: key.to_string(),
        name: String::new(),
        description: description.to_string(),
        data: data.to_string(),
        file_extension: key.rsplit('.').next().unwrap_or_default().to_string(),
        data_source: "disk".to_string(),
    }
}

fn on_disk(dir: &TempDir) -> IndexStore {
    IndexStore::open(&dir.path().join("index"), &StoreOptions::default()).unwrap()
}

fn data_hits(store: &IndexStore, query: &str) -> Vec<String> {
    let engine = QueryEngine::new(store);
    let snapshot = store.snapshot().unwrap();
    engine
        .search(&snapshot, query, &[IndexField::Data], 20, false)
        .unwrap()
        .hits
        .iter()
        .map(|hit| snapshot.get(hit.id).unwrap().unwrap().record.key)
        .collect()
}

#[test]
fn scenario_upsert_search_delete() {
    let dir = TempDir::new().unwrap();
    let store = on_disk(&dir);

    store
        .upsert(&record("/a.py", "", "def dijkstra(): pass"))
        .unwrap();
    store.commit().unwrap();
    assert_eq!(data_hits(&store, "dijkstra"), vec!["/a.py"]);

    store.delete("/a.py").unwrap();
    store.commit().unwrap();
    assert!(data_hits(&store, "dijkstra").is_empty());
}

#[test]
fn round_trip_preserves_every_field() {
    let dir = TempDir::new().unwrap();
    let store = on_disk(&dir);
    let before = SystemClock.now_epoch_secs();
    let original = DocumentRecord {
        key: "/src/graph.rs".to_string(),
        name: "Graph".to_string(),
        description: "Shortest paths".to_string(),
        data: "pub fn dijkstra() {}\n// ünïcödé".to_string(),
        file_extension: "rs".to_string(),
        data_source: "github_repo".to_string(),
    };
    store.upsert(&original).unwrap();
    store.commit().unwrap();

    let stored = store.get_by_key("/src/graph.rs").unwrap().unwrap();
    assert_eq!(stored.record, original);
    assert!(stored.modified_epoch_time >= before);
}

#[test]
fn upsert_is_idempotent_by_key() {
    let store = IndexStore::create_in_ram(&StoreOptions::default()).unwrap();
    store.upsert(&record("/a.py", "", "first version")).unwrap();
    store.upsert(&record("/a.py", "", "second version")).unwrap();
    store.commit().unwrap();

    assert_eq!(store.count().unwrap(), 1);
    let stored = store.get_by_key("/a.py").unwrap().unwrap();
    assert_eq!(stored.record.data, "second version");
    assert!(data_hits(&store, "first").is_empty());
}

#[test]
fn committed_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = on_disk(&dir);
        store.upsert(&record("/a.py", "", "def dijkstra(): pass")).unwrap();
        store.commit().unwrap();
        store.upsert(&record("/b.py", "", "never committed")).unwrap();
    }
    let store = on_disk(&dir);
    assert_eq!(store.count().unwrap(), 1);
    assert!(store.get_by_key("/b.py").unwrap().is_none());
}

#[test]
fn field_count_asymmetry() {
    let store = IndexStore::create_in_ram(&StoreOptions::default()).unwrap();
    store
        .upsert(&record("/q.py", "priority queue", "class Heap: pass"))
        .unwrap();
    store.commit().unwrap();

    let engine = QueryEngine::new(&store);
    let snapshot = store.snapshot().unwrap();
    let data_only = engine
        .search(&snapshot, "priority", &[IndexField::Data], 20, false)
        .unwrap();
    assert_eq!(data_only.total_hits, 0);
    let both = engine
        .search(
            &snapshot,
            "priority",
            &[IndexField::Description, IndexField::Data],
            20,
            false,
        )
        .unwrap();
    assert!(both.total_hits >= 1);
}

#[test]
fn literal_escaping_versus_wildcards() {
    let store = IndexStore::create_in_ram(&StoreOptions::default()).unwrap();
    store.upsert(&record("/c.rs", "", "foobar baz")).unwrap();
    store.upsert(&record("/d.rs", "", "foo qux")).unwrap();
    store.commit().unwrap();

    let engine = QueryEngine::new(&store);
    let snapshot = store.snapshot().unwrap();
    let literal = engine
        .search(&snapshot, "foo*", &[IndexField::Data], 20, true)
        .unwrap();
    assert_eq!(literal.total_hits, 1);
    let key = snapshot.get(literal.hits[0].id).unwrap().unwrap().record.key;
    assert_eq!(key, "/d.rs");

    let wildcard = engine
        .search(&snapshot, "foo*", &[IndexField::Data], 20, false)
        .unwrap();
    assert_eq!(wildcard.total_hits, 2);
}

#[test]
fn unbalanced_quote_is_a_syntax_error() {
    let store = IndexStore::create_in_ram(&StoreOptions::default()).unwrap();
    let engine = QueryEngine::new(&store);
    let snapshot = store.snapshot().unwrap();
    let err = engine
        .search(&snapshot, "\"shortest path", &[], 20, false)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::QuerySyntax);
    assert!(!err.is_retryable());
}

#[test]
fn fuzzy_search_tolerates_typos() {
    let store = IndexStore::create_in_ram(&StoreOptions::default()).unwrap();
    store
        .upsert(&record("/a.py", "", "def dijkstra(): pass"))
        .unwrap();
    store.commit().unwrap();
    assert_eq!(data_hits(&store, "djikstra~"), vec!["/a.py"]);
    assert!(data_hits(&store, "djikstra").is_empty());
}

#[test]
fn highlights_never_fabricate_text() {
    let data = "Dijkstra's algorithm finds shortest paths. It keeps a heap of \
                tentative distances; each pop settles one vertex. The heap \
                makes Dijkstra run in O((V + E) log V). Bellman-Ford handles \
                negative edges where Dijkstra cannot.";
    let store = IndexStore::create_in_ram(&StoreOptions::default()).unwrap();
    store.upsert(&record("/notes.txt", "", data)).unwrap();
    store.commit().unwrap();

    let snapshot = store.snapshot().unwrap();
    let id = snapshot.get_by_key("/notes.txt").unwrap().unwrap().id;
    let engine = HighlightEngine::new(&store);

    for (query, literal) in [
        ("dijkstra heap", false),
        ("\"shortest paths\"", false),
        ("negativ~", false),
        ("vert*", false),
        ("O((V + E)", true),
    ] {
        for length in [10, 25, 60, 500] {
            let fragments = engine
                .highlight(&snapshot, query, &[id], 4, length, literal)
                .unwrap();
            for fragment in &fragments[&id] {
                let plain = fragment.replace("<b>", "").replace("</b>", "");
                assert!(data.contains(&plain), "{query}/{length}: {plain}");
                assert!(plain.chars().count() <= length);
            }
        }
    }
}

#[test]
fn recency_window_with_simulated_clock() {
    let start = 1_700_000_000;
    let clock = Arc::new(ManualClock::new(start));
    let store = Arc::new(
        IndexStore::create_in_ram(&StoreOptions::default())
            .unwrap()
            .with_clock(clock.clone()),
    );
    store.upsert(&record("/repo/k.py", "", "x = 1")).unwrap();
    store.commit().unwrap();
    let gate = RecencyGate::new(Arc::clone(&store));

    clock.set(start + 3600);
    assert!(gate.is_recently_indexed("/repo/k.py", DEFAULT_RECENCY_WINDOW).unwrap());
    clock.set(start + 25 * 3600);
    assert!(!gate.is_recently_indexed("/repo/k.py", DEFAULT_RECENCY_WINDOW).unwrap());
    assert!(gate.is_recently_indexed("/repo/k.py", Duration::from_secs(26 * 3600)).unwrap());
}

#[test]
fn service_search_matches_engine() {
    let store = Arc::new(IndexStore::create_in_ram(&StoreOptions::default()).unwrap());
    let service = SearchService::new(Arc::clone(&store)).with_tags("[", "]");
    for (key, data) in [("/a.py", "heap push"), ("/b.py", "heap pop"), ("/c.py", "stack")] {
        store.upsert(&record(key, "", data)).unwrap();
    }
    service.commit().unwrap();

    let response = service
        .search(&SearchRequest {
            limit: 1,
            ..SearchRequest::new("heap")
        })
        .unwrap();
    assert_eq!(response.total_hits, 2);
    assert_eq!(response.total_documents, 3);
    assert_eq!(response.documents.len(), 1);
    let highlights = response.documents[0].highlights.as_ref().unwrap();
    assert!(highlights[0].starts_with("[heap]"));
}
