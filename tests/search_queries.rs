//! Search and Filtered Read Tests
//!
//! Filters evaluated through the document service:
//! - Existential wildcards and condition intersection
//! - Paging, streaming and projection
//! - Filtered reads of subdocuments

mod common;

use common::{subject, table, Harness};
use docgate::path::DocPath;
use docgate::service::{GetRequest, SearchRequest};
use docgate::store::WriteOptions;
use futures_util::TryStreamExt;
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

async fn seeded(docs: &[(&str, Value)]) -> Harness {
    let h = Harness::new();
    for (id, doc) in docs {
        h.tick();
        h.service
            .put(
                &subject(),
                &table(),
                id,
                &DocPath::root(),
                &doc.to_string(),
                WriteOptions::default(),
            )
            .await
            .unwrap();
    }
    h.store.clear_log();
    h
}

async fn search_ids(h: &Harness, filter: &str) -> Vec<String> {
    h.service
        .search(&subject(), &table(), SearchRequest::new().with_filter(filter))
        .await
        .unwrap()
        .documents
        .into_iter()
        .map(|(id, _)| id)
        .collect()
}

fn orders() -> Vec<(&'static str, Value)> {
    vec![
        (
            "o1",
            json!({"status": "open", "lines": [{"sku": "a", "qty": 1}, {"sku": "b", "qty": 9}]}),
        ),
        (
            "o2",
            json!({"status": "closed", "lines": [{"sku": "a", "qty": 3}]}),
        ),
        ("o3", json!({"status": "open", "lines": []})),
        ("o4", json!({"status": "open", "flag": true, "lines": [{"sku": "c", "qty": 5}]})),
    ]
}

// =============================================================================
// Filter Semantics
// =============================================================================

#[tokio::test]
async fn test_wildcard_is_existential() {
    let h = seeded(&orders()).await;
    assert_eq!(search_ids(&h, r#"{"lines.*.qty": {"$gt": 4}}"#).await, vec!["o1", "o4"]);
    assert_eq!(search_ids(&h, r#"{"lines.*.sku": {"$eq": "a"}}"#).await, vec!["o1", "o2"]);

    // one element satisfying both operators is required
    assert_eq!(
        search_ids(&h, r#"{"lines.*.qty": {"$gt": 2, "$lt": 4}}"#).await,
        vec!["o2"]
    );
}

#[tokio::test]
async fn test_conditions_intersect() {
    let h = seeded(&orders()).await;
    assert_eq!(
        search_ids(&h, r#"{"status": {"$eq": "open"}, "lines.*.sku": {"$eq": "a"}}"#).await,
        vec!["o1"]
    );
    assert!(search_ids(&h, r#"{"status": {"$eq": "closed"}, "flag": {"$eq": true}}"#)
        .await
        .is_empty());
}

#[tokio::test]
async fn test_in_memory_operators() {
    let h = seeded(&orders()).await;
    assert_eq!(search_ids(&h, r#"{"status": {"$ne": "open"}}"#).await, vec!["o2"]);
    assert_eq!(
        search_ids(&h, r#"{"lines.*.sku": {"$in": ["b", "c"]}}"#).await,
        vec!["o1", "o4"]
    );
    assert_eq!(
        search_ids(&h, r#"{"lines.*.sku": {"$nin": ["a"]}}"#).await,
        vec!["o1", "o4"]
    );
}

#[tokio::test]
async fn test_empty_containers_never_match() {
    let h = seeded(&orders()).await;
    // o3 has an empty `lines` array and no element to test
    assert!(!search_ids(&h, r#"{"lines.*.qty": {"$gte": 0}}"#)
        .await
        .contains(&"o3".to_string()));
    assert!(search_ids(&h, r#"{"lines": {"$eq": null}}"#).await.is_empty());
}

#[tokio::test]
async fn test_empty_filter_returns_everything() {
    let h = seeded(&orders()).await;
    assert_eq!(search_ids(&h, "{}").await, vec!["o1", "o2", "o3", "o4"]);
}

// =============================================================================
// Paging and Projection
// =============================================================================

#[tokio::test]
async fn test_pages_cover_every_match_once() {
    let docs: Vec<(String, Value)> = (0..7).map(|i| (format!("k{}", i), json!({"n": i}))).collect();
    let refs: Vec<(&str, Value)> = docs.iter().map(|(id, v)| (id.as_str(), v.clone())).collect();
    let h = seeded(&refs).await;

    let mut seen = Vec::new();
    let mut state = None;
    loop {
        let request = SearchRequest::new()
            .with_filter(r#"{"n": {"$gte": 2}}"#)
            .with_page(2, state);
        let response = h.service.search(&subject(), &table(), request).await.unwrap();
        assert!(response.documents.len() <= 2);
        seen.extend(response.documents.into_iter().map(|(id, _)| id));
        state = response.page_state;
        if state.is_none() {
            break;
        }
    }
    assert_eq!(seen, vec!["k2", "k3", "k4", "k5", "k6"]);
}

#[tokio::test]
async fn test_search_stream_follows_page_states() {
    let h = seeded(&orders()).await;
    let request = SearchRequest::new()
        .with_filter(r#"{"status": {"$eq": "open"}}"#)
        .with_page(1, None);
    let documents: Vec<(String, Value)> = h
        .service
        .search_stream(&subject(), &table(), request)
        .try_collect()
        .await
        .unwrap();

    let ids: Vec<&str> = documents.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["o1", "o3", "o4"]);
    assert_eq!(documents[1].1, orders()[2].1);
}

#[tokio::test]
async fn test_search_projection() {
    let h = seeded(&orders()).await;
    let request = SearchRequest::new()
        .with_filter(r#"{"flag": {"$eq": true}}"#)
        .with_fields(r#"["status", "lines.[0].sku"]"#);
    let response = h.service.search(&subject(), &table(), request).await.unwrap();
    assert_eq!(
        response.render(true),
        json!({"o4": {"status": "open", "lines": [{"sku": "c"}]}})
    );
}

// =============================================================================
// Filtered Reads
// =============================================================================

#[tokio::test]
async fn test_filtered_get_returns_matching_subdocuments() {
    let h = seeded(&orders()).await;
    let request = GetRequest::new().with_filter(r#"{"lines.*.qty": {"$gt": 0}}"#);
    let response = h
        .service
        .get(&subject(), &table(), "o1", request)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        response.data,
        json!([
            {"lines": [{"qty": 1}]},
            {"lines": [null, {"qty": 9}]}
        ])
    );
    assert!(response.page_state.is_none());
}

#[tokio::test]
async fn test_filtered_get_under_sub_path_with_fields() {
    let h = seeded(&orders()).await;
    let request = GetRequest::at(DocPath::parse_dotted("lines").unwrap())
        .with_filter(r#"{"*.qty": {"$gt": 2}}"#)
        .with_fields(r#"["sku"]"#);
    let response = h
        .service
        .get(&subject(), &table(), "o1", request)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response.data, json!([[null, {"sku": "b"}]]));
}

#[tokio::test]
async fn test_filtered_get_without_match_is_none() {
    let h = seeded(&orders()).await;
    let request = GetRequest::new().with_filter(r#"{"lines.*.qty": {"$gt": 100}}"#);
    let response = h.service.get(&subject(), &table(), "o1", request).await.unwrap();
    assert!(response.is_none());
}

// =============================================================================
// Explain
// =============================================================================

#[tokio::test]
async fn test_explain_names_strategies() {
    let h = Harness::new();
    let plan = h
        .service
        .explain(r#"{"a": {"$eq": 1}, "b.*.c": {"$gt": 2}, "d": {"$ne": 3}}"#)
        .unwrap();
    assert_eq!(plan.scan_type, "CANDIDATE_QUERIES");
    assert_eq!(plan.candidate_queries, 2);

    let strategies: Vec<(&str, &str)> = plan
        .conditions
        .iter()
        .map(|c| (c.path.as_str(), c.strategy.as_str()))
        .collect();
    assert!(strategies.contains(&("a", "PUSHDOWN")));
    assert!(strategies.contains(&("b.*.c", "SUPERSET")));
    assert!(strategies.contains(&("d", "IN_MEMORY")));
    assert!(plan.to_string().starts_with("=== EXPLAIN PLAN ==="));
}
