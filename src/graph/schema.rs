//! Graph index declarations.
//!
//! Property indexes cover the natural keys and commonly filtered
//! attributes; one full-text index covers every node carrying the
//! `Searchable` marker label. Declarations are idempotent by contract —
//! the client swallows "already indexed" replies.

/// All index statements to run after a successful connect.
pub fn index_statements() -> Vec<&'static str> {
    let mut statements = Vec::new();
    statements.extend(PROPERTY_INDEXES.iter().copied());
    statements.push(FULLTEXT_INDEX);
    statements
}

/// Property indexes on natural keys and common filters.
const PROPERTY_INDEXES: &[&str] = &[
    "CREATE INDEX ON :File(path)",
    "CREATE INDEX ON :File(language)",
    "CREATE INDEX ON :Symbol(qualified_name)",
    "CREATE INDEX ON :Symbol(name)",
    "CREATE INDEX ON :Symbol(kind)",
    "CREATE INDEX ON :Symbol(file_path)",
    "CREATE INDEX ON :Module(path)",
    "CREATE INDEX ON :Commit(sha)",
    "CREATE INDEX ON :Commit(author)",
    "CREATE INDEX ON :Commit(timestamp)",
];

/// Full-text index over searchable nodes, used by entity search before it
/// falls back to substring matching.
const FULLTEXT_INDEX: &str =
    "CALL db.idx.fulltext.createNodeIndex('Searchable', 'name', 'qualified_name', 'docstring')";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_statements() {
        let statements = index_statements();
        assert!(!statements.is_empty());

        let fulltext: Vec<_> = statements
            .iter()
            .filter(|s| s.contains("fulltext"))
            .collect();
        assert_eq!(fulltext.len(), 1);
        assert!(fulltext[0].contains("Searchable"));

        for stmt in statements.iter().filter(|s| !s.contains("fulltext")) {
            assert!(stmt.starts_with("CREATE INDEX ON :"), "bad statement: {}", stmt);
        }
    }

    #[test]
    fn test_natural_keys_are_indexed() {
        let statements = index_statements();
        for key in [":File(path)", ":Symbol(qualified_name)", ":Module(path)", ":Commit(sha)"] {
            assert!(statements.iter().any(|s| s.contains(key)), "missing {}", key);
        }
    }
}
