//! Code-intelligence queries layered on the query engine.
//!
//! Everything here is read-only. Results come back as the decoder's named
//! records or as typed shapes extracted from them.

use std::collections::HashMap;
use tracing::debug;

use super::{queries, GraphClient, GraphResult, NodeLabel, Param, QueryResult};

/// One entity search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub qualified_name: String,
    pub name: String,
    pub kind: String,
    pub file_path: String,
    pub score: f64,
}

/// Aggregate graph counts for observability.
#[derive(Debug, Clone, Default)]
pub struct GraphStats {
    /// Node count per label, including the specialized symbol labels.
    pub node_counts: HashMap<String, i64>,
    /// Edge count per relationship type.
    pub edge_counts: HashMap<String, i64>,
}

/// Node labels counted by [`GraphClient::stats`]: the four node types plus
/// every specialized label the upsert layer can attach.
const COUNTED_LABELS: &[&str] = &[
    "File",
    "Symbol",
    "Module",
    "Commit",
    "Function",
    "Method",
    "Class",
    "Interface",
    "TypeAlias",
    "Struct",
    "Enum",
    "Constant",
    "Var",
    "Entity",
];

/// Relationship types counted by [`GraphClient::stats`].
const COUNTED_EDGES: &[&str] = &["IMPORTS", "DEFINES", "CALLS", "INHERITS", "MODIFIES", "TOUCHES"];

impl GraphClient {
    /// Look up a node by its natural key. Returns the first (only) record,
    /// or `None` when no node carries that key.
    pub async fn get_node(
        &mut self,
        label: NodeLabel,
        key: &str,
    ) -> GraphResult<Option<HashMap<String, serde_json::Value>>> {
        let template = match label {
            NodeLabel::File => queries::GET_FILE,
            NodeLabel::Symbol => queries::GET_SYMBOL,
            NodeLabel::Module => queries::GET_MODULE,
            NodeLabel::Commit => queries::GET_COMMIT,
        };
        let rows = self.query(template, &[("key", key.into())]).await?;
        Ok(rows.into_iter().next())
    }

    /// All symbols defined in a file.
    pub async fn get_file_symbols(&mut self, path: &str) -> GraphResult<QueryResult> {
        self.query(queries::GET_FILE_SYMBOLS, &[("path", path.into())])
            .await
    }

    /// Direct callers of a symbol, matched by name or qualified name.
    pub async fn get_callers(&mut self, name: &str) -> GraphResult<QueryResult> {
        self.query(queries::GET_CALLERS, &[("name", name.into())])
            .await
    }

    /// Direct callees of a symbol, matched by name or qualified name.
    pub async fn get_callees(&mut self, name: &str) -> GraphResult<QueryResult> {
        self.query(queries::GET_CALLEES, &[("name", name.into())])
            .await
    }

    /// Files a file imports directly.
    pub async fn get_file_dependencies(&mut self, path: &str) -> GraphResult<QueryResult> {
        self.query(queries::GET_FILE_DEPENDENCIES, &[("path", path.into())])
            .await
    }

    /// Files that import a file directly.
    pub async fn get_file_dependents(&mut self, path: &str) -> GraphResult<QueryResult> {
        self.query(queries::GET_FILE_DEPENDENTS, &[("path", path.into())])
            .await
    }

    /// Call paths from one function to another, each as an ordered name
    /// sequence, capped at [`queries::MAX_CALL_PATHS`]. The depth bound is
    /// clamped to `1..=`[`queries::MAX_TRAVERSAL_DEPTH`].
    pub async fn find_call_paths(
        &mut self,
        from: &str,
        to: &str,
        max_depth: usize,
    ) -> GraphResult<Vec<Vec<String>>> {
        let template = queries::call_paths_query(max_depth);
        let rows = self
            .query(&template, &[("from", from.into()), ("to", to.into())])
            .await?;
        Ok(extract_chains(rows, "chain"))
    }

    /// Functions nothing calls, excluding conventional entry points.
    pub async fn find_dead_code(&mut self) -> GraphResult<QueryResult> {
        let entry_points: Vec<String> = queries::ENTRY_POINT_NAMES
            .iter()
            .map(|s| s.to_string())
            .collect();
        self.query(
            queries::FIND_DEAD_CODE,
            &[("entry_points", entry_points.into())],
        )
        .await
    }

    /// Functions ranked by distinct direct callers, descending.
    pub async fn find_hotspots(&mut self, limit: usize) -> GraphResult<QueryResult> {
        self.query(queries::FIND_HOTSPOTS, &[("limit", limit.into())])
            .await
    }

    /// Call chains that return to their starting function, capped at
    /// [`queries::MAX_CYCLES`]. Every returned chain begins and ends with
    /// the same function name.
    pub async fn find_circular_dependencies(
        &mut self,
        max_depth: usize,
    ) -> GraphResult<Vec<Vec<String>>> {
        let template = queries::cycles_query(max_depth);
        let rows = self.query(&template, &[]).await?;
        Ok(extract_chains(rows, "cycle"))
    }

    /// Full-text entity search with a substring fallback.
    ///
    /// The indexed query is attempted first; if it fails for any reason
    /// (index absent, engine limitation) the search silently degrades to a
    /// case-sensitive substring match over searchable nodes. Callers only
    /// see the final result list.
    pub async fn search_entities(
        &mut self,
        text: &str,
        limit: usize,
    ) -> GraphResult<Vec<SearchHit>> {
        let params: [(&str, Param); 2] = [("text", text.into()), ("limit", limit.into())];

        match self.query(queries::SEARCH_FULLTEXT, &params).await {
            Ok(rows) => Ok(rows.into_iter().map(search_hit_from_row).collect()),
            Err(e) => {
                debug!(error = %e, "full-text search unavailable, using substring fallback");
                let rows = self.query(queries::SEARCH_SUBSTRING, &params).await?;
                Ok(rows.into_iter().map(search_hit_from_row).collect())
            }
        }
    }

    /// Per-label node counts and per-type edge counts.
    pub async fn stats(&mut self) -> GraphResult<GraphStats> {
        let mut stats = GraphStats::default();

        for label in COUNTED_LABELS {
            let template = format!("MATCH (n:{}) RETURN count(n) AS cnt", label);
            let rows = self.query(&template, &[]).await?;
            stats
                .node_counts
                .insert(label.to_string(), first_count(&rows));
        }

        for edge in COUNTED_EDGES {
            let template = format!("MATCH ()-[r:{}]->() RETURN count(r) AS cnt", edge);
            let rows = self.query(&template, &[]).await?;
            stats.edge_counts.insert(edge.to_string(), first_count(&rows));
        }

        Ok(stats)
    }
}

fn first_count(rows: &QueryResult) -> i64 {
    rows.first()
        .and_then(|row| row.get("cnt"))
        .and_then(|v| v.as_i64())
        .unwrap_or(0)
}

fn extract_chains(rows: QueryResult, column: &str) -> Vec<Vec<String>> {
    rows.into_iter()
        .filter_map(|row| {
            row.get(column).and_then(|v| v.as_array()).map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(|s| s.to_string()))
                    .collect()
            })
        })
        .collect()
}

fn search_hit_from_row(row: HashMap<String, serde_json::Value>) -> SearchHit {
    let text = |key: &str| {
        row.get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };
    SearchHit {
        qualified_name: text("qualified_name"),
        name: text("name"),
        kind: text("kind"),
        file_path: text("file_path"),
        score: row.get("score").and_then(|v| v.as_f64()).unwrap_or(0.0),
    }
}
