//! Configuration for the graph manager.

use serde::{Deserialize, Serialize};

/// Connection settings for a [`crate::graph::GraphClient`].
///
/// Read once at construction; there is no process-global debug switch.
/// `verbose_diagnostics` widens query-failure reporting to include the full
/// composed query text and a connection-state snapshot instead of a
/// truncated query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Engine endpoint, e.g. `redis://127.0.0.1:6379`.
    pub url: String,
    /// Name of the graph key queries run against.
    pub graph: String,
    /// Include full query text and state snapshots in error logs.
    pub verbose_diagnostics: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            graph: "code_graph".to_string(),
            verbose_diagnostics: false,
        }
    }
}

impl GraphConfig {
    pub fn new(url: impl Into<String>, graph: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            graph: graph.into(),
            verbose_diagnostics: false,
        }
    }

    pub fn with_verbose_diagnostics(mut self, verbose: bool) -> Self {
        self.verbose_diagnostics = verbose;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GraphConfig::default();
        assert_eq!(config.url, "redis://127.0.0.1:6379");
        assert_eq!(config.graph, "code_graph");
        assert!(!config.verbose_diagnostics);
    }

    #[test]
    fn test_builder() {
        let config = GraphConfig::new("redis://graph:6379", "my_repo").with_verbose_diagnostics(true);
        assert_eq!(config.graph, "my_repo");
        assert!(config.verbose_diagnostics);
    }
}
