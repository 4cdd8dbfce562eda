//! Integration tests against a live FalkorDB.
//!
//! All tests are ignored by default; run them with a local engine:
//!
//! ```sh
//! docker run -p 6379:6379 falkordb/falkordb
//! cargo test -- --ignored
//! ```

use repograph::graph::{CallEdge, FileNode, ImportEdge, NodeLabel, SymbolKind, SymbolNode};
use repograph::{GraphClient, GraphConfig};

fn test_url() -> String {
    std::env::var("REPOGRAPH_TEST_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

async fn fresh_client(graph: &str) -> GraphClient {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let config = GraphConfig::new(test_url(), format!("repograph_test_{}", graph));
    let mut client = GraphClient::new(config);
    client.connect().await.expect("engine not reachable");
    client.clear().await.expect("clear failed");
    client
}

fn file(path: &str) -> FileNode {
    FileNode {
        path: path.to_string(),
        language: "typescript".to_string(),
        last_modified: 1_700_000_000_000,
        size: 1024,
        hash: "h0".to_string(),
        loc: 100,
        complexity: 2.0,
    }
}

fn symbol(qualified_name: &str, name: &str) -> SymbolNode {
    SymbolNode {
        qualified_name: qualified_name.to_string(),
        name: name.to_string(),
        kind: SymbolKind::Function,
        file_path: "/src/a.ts".to_string(),
        line_start: 1,
        line_end: 10,
        signature: format!("{}()", name),
        docstring: String::new(),
        return_type: "void".to_string(),
        visibility: "public".to_string(),
        is_async: false,
        is_static: false,
        complexity: 1.0,
        embedding_id: None,
    }
}

#[tokio::test]
#[ignore = "requires a running FalkorDB"]
async fn upsert_is_idempotent() {
    let mut client = fresh_client("idempotent").await;

    let mut f = file("/src/a.ts");
    client.upsert_file(&f).await.unwrap();
    f.loc = 222;
    f.hash = "h1".to_string();
    client.upsert_file(&f).await.unwrap();

    let rows = client
        .query(
            "MATCH (f:File {path: $path}) RETURN f.loc AS loc, f.hash AS hash",
            &[("path", "/src/a.ts".into())],
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1, "duplicate node after second upsert");
    assert_eq!(rows[0].get("loc"), Some(&serde_json::json!(222)));
    assert_eq!(rows[0].get("hash"), Some(&serde_json::json!("h1")));

    let node = client
        .get_node(NodeLabel::File, "/src/a.ts")
        .await
        .unwrap()
        .expect("file node missing");
    assert_eq!(node.get("loc"), Some(&serde_json::json!(222)));

    client.close();
}

#[tokio::test]
#[ignore = "requires a running FalkorDB"]
async fn callers_and_callees_round_trip() {
    let mut client = fresh_client("calls").await;

    client.upsert_symbol(&symbol("m.a", "a")).await.unwrap();
    client.upsert_symbol(&symbol("m.b", "b")).await.unwrap();
    let affected = client
        .link_call("m.a", "m.b", &CallEdge::default())
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let callers = client.get_callers("b").await.unwrap();
    assert!(callers
        .iter()
        .any(|row| row.get("qualified_name") == Some(&serde_json::json!("m.a"))));

    let callees = client.get_callees("a").await.unwrap();
    assert!(callees
        .iter()
        .any(|row| row.get("qualified_name") == Some(&serde_json::json!("m.b"))));
}

#[tokio::test]
#[ignore = "requires a running FalkorDB"]
async fn edge_upsert_with_missing_endpoint_affects_nothing() {
    let mut client = fresh_client("missing_endpoint").await;

    client.upsert_file(&file("/src/a.ts")).await.unwrap();
    let affected = client
        .link_import("/src/a.ts", "/src/never_created.ts", &ImportEdge::default())
        .await
        .unwrap();
    assert_eq!(affected, 0);
}

#[tokio::test]
#[ignore = "requires a running FalkorDB"]
async fn cycles_start_and_end_at_the_same_function() {
    let mut client = fresh_client("cycles").await;

    client.upsert_symbol(&symbol("m.a", "a")).await.unwrap();
    client.upsert_symbol(&symbol("m.b", "b")).await.unwrap();
    client.link_call("m.a", "m.b", &CallEdge::default()).await.unwrap();
    client.link_call("m.b", "m.a", &CallEdge::default()).await.unwrap();

    let cycles = client.find_circular_dependencies(5).await.unwrap();
    assert!(!cycles.is_empty());
    for cycle in &cycles {
        assert_eq!(cycle.first(), cycle.last());
    }
}

#[tokio::test]
#[ignore = "requires a running FalkorDB"]
async fn search_falls_back_to_substring_matching() {
    let mut client = fresh_client("search_fallback").await;

    client
        .upsert_symbol(&symbol("m.handleRequest", "handleRequest"))
        .await
        .unwrap();

    // Drop the full-text index so the first query path fails.
    let _ = client
        .query("CALL db.idx.fulltext.drop('Searchable')", &[])
        .await;

    let hits = client.search_entities("handleReq", 10).await.unwrap();
    assert!(
        hits.iter().any(|h| h.name == "handleRequest"),
        "substring fallback did not find the symbol"
    );
}

#[tokio::test]
#[ignore = "requires a running FalkorDB"]
async fn dead_code_excludes_entry_points_and_called_functions() {
    let mut client = fresh_client("dead_code").await;

    client.upsert_symbol(&symbol("m.main", "main")).await.unwrap();
    client.upsert_symbol(&symbol("m.used", "used")).await.unwrap();
    client.upsert_symbol(&symbol("m.orphan", "orphan")).await.unwrap();
    client.link_call("m.main", "m.used", &CallEdge::default()).await.unwrap();

    let dead = client.find_dead_code().await.unwrap();
    let names: Vec<_> = dead
        .iter()
        .filter_map(|row| row.get("name").and_then(|v| v.as_str()))
        .collect();
    assert!(names.contains(&"orphan"));
    assert!(!names.contains(&"main"));
    assert!(!names.contains(&"used"));
}

#[tokio::test]
#[ignore = "requires a running FalkorDB"]
async fn stats_count_nodes_and_edges() {
    let mut client = fresh_client("stats").await;

    client.upsert_file(&file("/src/a.ts")).await.unwrap();
    client.upsert_symbol(&symbol("m.a", "a")).await.unwrap();

    let stats = client.stats().await.unwrap();
    assert_eq!(stats.node_counts.get("File"), Some(&1));
    assert_eq!(stats.node_counts.get("Symbol"), Some(&1));
    assert_eq!(stats.node_counts.get("Function"), Some(&1));
    assert_eq!(stats.edge_counts.get("CALLS"), Some(&0));
}
