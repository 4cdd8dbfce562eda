//! Graph engine client: connection lifecycle and query execution.
//!
//! One client owns at most one connection. All operations are async and
//! run over that single connection; callers wanting concurrent access must
//! serialize externally or use separate clients. Two clients must never
//! share a connection.

use redis::aio::MultiplexedConnection;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{decode_reply, schema, substitute, GraphError, GraphResult, Param, QueryResult};
use crate::config::GraphConfig;

/// Maximum automatic reconnect attempts before the connection is considered
/// dead until `connect()` is called again.
const MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Base delay between reconnect attempts; the actual delay is
/// attempt × this value.
const RECONNECT_DELAY_STEP: Duration = Duration::from_millis(100);

/// Query text is truncated to this many characters in errors unless
/// verbose diagnostics are enabled.
const QUERY_ERROR_TRUNCATE: usize = 200;

/// Connection health, driven by explicit transitions rather than
/// independent flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Failed,
}

/// Client for a FalkorDB code graph.
pub struct GraphClient {
    config: GraphConfig,
    conn: Option<MultiplexedConnection>,
    state: ConnectionState,
}

impl GraphClient {
    /// Create a disconnected client. Call [`GraphClient::connect`] before
    /// issuing queries.
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            conn: None,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected && self.conn.is_some()
    }

    /// Establish the connection, verify liveness and declare the schema.
    ///
    /// Schema setup is best-effort and never blocks the client from
    /// becoming usable.
    pub async fn connect(&mut self) -> GraphResult<()> {
        self.state = ConnectionState::Connecting;

        let result = self.open_connection().await;
        let mut conn = match result {
            Ok(conn) => conn,
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                return Err(e);
            }
        };

        match Self::probe(&mut conn).await {
            Ok(()) => {}
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                return Err(e);
            }
        }

        self.conn = Some(conn);
        self.state = ConnectionState::Connected;
        info!(graph = %self.config.graph, "connected to graph engine");

        self.init_schema().await;
        Ok(())
    }

    /// Liveness probe. Fails with `NotConnected` before `connect()`.
    pub async fn ping(&mut self) -> GraphResult<()> {
        let mut conn = self.conn.clone().ok_or(GraphError::NotConnected)?;
        Self::probe(&mut conn).await
    }

    /// Drop the connection. Safe to call twice; a no-op when already
    /// disconnected.
    pub fn close(&mut self) {
        if self.conn.is_some() {
            debug!(graph = %self.config.graph, "closing graph connection");
        }
        self.conn = None;
        self.state = ConnectionState::Disconnected;
    }

    /// Run a query template with named parameters and decode the reply.
    ///
    /// Substitution is textual: each `$name` is replaced with the encoded
    /// literal for the matching parameter. There is no retry at this layer;
    /// a connection-level failure triggers the reconnect schedule but the
    /// failing query still returns its error.
    pub async fn query(
        &mut self,
        template: &str,
        params: &[(&str, Param)],
    ) -> GraphResult<QueryResult> {
        let composed = substitute(template, params);
        let raw = self.run_graph_query(&composed).await?;
        Ok(decode_reply(&raw))
    }

    /// Remove every node and edge from the graph. The only destruction
    /// path; there is no per-node delete.
    pub async fn clear(&mut self) -> GraphResult<()> {
        self.query("MATCH (n) DETACH DELETE n", &[]).await?;
        info!(graph = %self.config.graph, "graph cleared");
        Ok(())
    }

    pub(crate) async fn run_graph_query(&mut self, composed: &str) -> GraphResult<redis::Value> {
        if self.state != ConnectionState::Connected {
            return Err(GraphError::NotConnected);
        }
        let mut conn = self.conn.clone().ok_or(GraphError::NotConnected)?;

        let result: Result<redis::Value, redis::RedisError> = redis::cmd("GRAPH.QUERY")
            .arg(&self.config.graph)
            .arg(composed)
            .arg("--compact")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(value) => Ok(value),
            Err(e) => {
                if e.is_connection_dropped() || e.is_io_error() {
                    self.reconnect().await;
                }
                Err(self.query_error(composed, e))
            }
        }
    }

    async fn open_connection(&self) -> GraphResult<MultiplexedConnection> {
        let client =
            redis::Client::open(self.config.url.as_str()).map_err(GraphError::Connection)?;
        client
            .get_multiplexed_async_connection()
            .await
            .map_err(GraphError::Connection)
    }

    async fn probe(conn: &mut MultiplexedConnection) -> GraphResult<()> {
        let reply: String = redis::cmd("PING")
            .query_async(conn)
            .await
            .map_err(GraphError::Connection)?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(GraphError::Ping { reply })
        }
    }

    /// Re-establish the transport after a dropped connection: up to
    /// [`MAX_RECONNECT_ATTEMPTS`] tries with a delay of attempt × 100 ms.
    /// Exhausting the schedule leaves the client in `Failed` until
    /// `connect()` is called again.
    async fn reconnect(&mut self) {
        self.state = ConnectionState::Reconnecting;
        self.conn = None;

        for attempt in 1..=MAX_RECONNECT_ATTEMPTS {
            tokio::time::sleep(RECONNECT_DELAY_STEP * attempt).await;
            match self.open_connection().await {
                Ok(mut conn) => {
                    if Self::probe(&mut conn).await.is_ok() {
                        self.conn = Some(conn);
                        self.state = ConnectionState::Connected;
                        info!(attempt, "graph connection re-established");
                        return;
                    }
                }
                Err(e) => {
                    debug!(attempt, error = %e, "reconnect attempt failed");
                }
            }
        }

        self.state = ConnectionState::Failed;
        warn!(
            attempts = MAX_RECONNECT_ATTEMPTS,
            "graph connection lost and reconnection exhausted"
        );
    }

    /// Declare indexes after connect. Each statement is individually
    /// idempotent; "already indexed" replies are expected and swallowed,
    /// anything else is logged and skipped.
    async fn init_schema(&mut self) {
        for stmt in schema::index_statements() {
            match self.run_graph_query(stmt).await {
                Ok(_) => debug!(statement = stmt, "index declared"),
                Err(e) => {
                    let msg = e.to_string();
                    if !msg.contains("already indexed") && !msg.contains("already exists") {
                        warn!(statement = stmt, error = %msg, "index declaration failed");
                    }
                }
            }
        }
    }

    fn query_error(&self, composed: &str, source: redis::RedisError) -> GraphError {
        let query = if self.config.verbose_diagnostics {
            debug!(
                state = ?self.state,
                graph = %self.config.graph,
                url = %self.config.url,
                query = composed,
                "query failed"
            );
            composed.to_string()
        } else {
            truncate(composed, QUERY_ERROR_TRUNCATE)
        };
        GraphError::Query { query, source }
    }
}

/// Shorten to at most `max_chars` characters, ellipsis included.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GraphClient {
        GraphClient::new(GraphConfig::default())
    }

    #[tokio::test]
    async fn test_ping_before_connect_is_not_connected() {
        let mut c = client();
        assert!(matches!(c.ping().await, Err(GraphError::NotConnected)));
    }

    #[tokio::test]
    async fn test_query_before_connect_is_not_connected() {
        let mut c = client();
        let result = c.query("MATCH (n) RETURN n", &[]).await;
        assert!(matches!(result, Err(GraphError::NotConnected)));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut c = client();
        c.close();
        c.close();
        assert!(!c.is_connected());
        assert_eq!(c.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_new_client_starts_disconnected() {
        let c = client();
        assert_eq!(c.state(), ConnectionState::Disconnected);
        assert!(!c.is_connected());
    }

    #[test]
    fn test_truncate_stays_within_limit() {
        assert_eq!(truncate("short", 200), "short");
        let long = "x".repeat(300);
        let cut = truncate(&long, 200);
        assert_eq!(cut.chars().count(), 200);
        assert!(cut.ends_with("..."));
    }
}
