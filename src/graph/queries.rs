//! Cypher templates for the code-intelligence queries.
//!
//! Templates use `$name` placeholders filled in by the value encoder.
//! Variable-length traversal bounds cannot be parameterised in Cypher, so
//! the depth-bounded queries are built by functions that clamp and inline
//! the bound as an integer literal.

/// Upper bound on call-path results.
pub const MAX_CALL_PATHS: usize = 100;

/// Upper bound on reported call cycles.
pub const MAX_CYCLES: usize = 50;

/// Deepest traversal the path queries will accept.
pub const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Function names that count as entry points and are excluded from
/// dead-code results.
pub const ENTRY_POINT_NAMES: &[&str] = &[
    "main", "index", "init", "setup", "start", "run", "handler", "constructor",
];

/// Get all symbols defined in a file.
pub const GET_FILE_SYMBOLS: &str = "\
MATCH (f:File {path: $path})-[:DEFINES]->(s:Symbol) \
RETURN s.qualified_name AS qualified_name, s.name AS name, s.kind AS kind, \
       s.line_start AS line_start, s.line_end AS line_end, s.signature AS signature";

/// Get direct callers of a symbol, matched by name or qualified name.
pub const GET_CALLERS: &str = "\
MATCH (caller:Symbol)-[r:CALLS]->(s:Symbol) \
WHERE s.name = $name OR s.qualified_name = $name \
RETURN caller.qualified_name AS qualified_name, caller.name AS name, \
       caller.file_path AS file_path, r.line AS line";

/// Get direct callees of a symbol, matched by name or qualified name.
pub const GET_CALLEES: &str = "\
MATCH (s:Symbol)-[r:CALLS]->(callee:Symbol) \
WHERE s.name = $name OR s.qualified_name = $name \
RETURN callee.qualified_name AS qualified_name, callee.name AS name, \
       callee.file_path AS file_path, r.line AS line";

/// Files a given file imports.
pub const GET_FILE_DEPENDENCIES: &str = "\
MATCH (f:File {path: $path})-[r:IMPORTS]->(dep:File) \
RETURN dep.path AS path, dep.language AS language, r.line AS line";

/// Files that import a given file.
pub const GET_FILE_DEPENDENTS: &str = "\
MATCH (dep:File)-[r:IMPORTS]->(f:File {path: $path}) \
RETURN dep.path AS path, dep.language AS language, r.line AS line";

/// Functions with no incoming CALLS edge, excluding entry points.
pub const FIND_DEAD_CODE: &str = "\
MATCH (f:Function) \
WHERE NOT ( ()-[:CALLS]->(f) ) AND NOT f.name IN $entry_points \
RETURN f.qualified_name AS qualified_name, f.name AS name, \
       f.file_path AS file_path, f.line_start AS line_start";

/// Functions ranked by number of distinct direct callers.
pub const FIND_HOTSPOTS: &str = "\
MATCH (caller:Symbol)-[:CALLS]->(f:Function) \
WITH f, count(DISTINCT caller) AS callers \
RETURN f.qualified_name AS qualified_name, f.name AS name, \
       f.file_path AS file_path, callers \
ORDER BY callers DESC \
LIMIT $limit";

/// Full-text search over searchable nodes.
pub const SEARCH_FULLTEXT: &str = "\
CALL db.idx.fulltext.queryNodes('Searchable', $text) YIELD node, score \
RETURN node.qualified_name AS qualified_name, node.name AS name, \
       node.kind AS kind, node.file_path AS file_path, score \
LIMIT $limit";

/// Substring fallback when the full-text index is unavailable.
/// Case-sensitive by design of the fallback contract.
pub const SEARCH_SUBSTRING: &str = "\
MATCH (n:Searchable) \
WHERE n.name CONTAINS $text OR n.qualified_name CONTAINS $text \
RETURN n.qualified_name AS qualified_name, n.name AS name, \
       n.kind AS kind, n.file_path AS file_path, 0.0 AS score \
LIMIT $limit";

/// Look up a file by path.
pub const GET_FILE: &str = "\
MATCH (f:File {path: $key}) \
RETURN f.path AS path, f.language AS language, f.last_modified AS last_modified, \
       f.size AS size, f.hash AS hash, f.loc AS loc, f.complexity AS complexity, \
       f.updated_at AS updated_at \
LIMIT 1";

/// Look up a symbol by qualified name.
pub const GET_SYMBOL: &str = "\
MATCH (s:Symbol {qualified_name: $key}) \
RETURN s.qualified_name AS qualified_name, s.name AS name, s.kind AS kind, \
       s.file_path AS file_path, s.line_start AS line_start, s.line_end AS line_end, \
       s.signature AS signature, s.docstring AS docstring, s.return_type AS return_type, \
       s.visibility AS visibility, s.is_async AS is_async, s.is_static AS is_static, \
       s.complexity AS complexity, s.embedding_id AS embedding_id, s.updated_at AS updated_at \
LIMIT 1";

/// Look up a module by path.
pub const GET_MODULE: &str = "\
MATCH (m:Module {path: $key}) \
RETURN m.path AS path, m.name AS name, m.module_type AS module_type, \
       m.language AS language, m.description AS description, m.version AS version, \
       m.file_count AS file_count, m.symbol_count AS symbol_count, m.updated_at AS updated_at \
LIMIT 1";

/// Look up a commit by sha.
pub const GET_COMMIT: &str = "\
MATCH (c:Commit {sha: $key}) \
RETURN c.sha AS sha, c.message AS message, c.author AS author, \
       c.author_email AS author_email, c.committer AS committer, c.timestamp AS timestamp, \
       c.branch AS branch, c.files_changed AS files_changed, c.insertions AS insertions, \
       c.deletions AS deletions, c.embedding_id AS embedding_id, c.updated_at AS updated_at \
LIMIT 1";

/// Call-path search between two named functions.
///
/// The source's OR/AND mix was ambiguous; here both endpoints use the same
/// explicit precedence: name-or-qualified-name on each side, sides joined
/// by AND.
pub fn call_paths_query(max_depth: usize) -> String {
    let depth = clamp_depth(max_depth, 1);
    format!(
        "MATCH p = (src:Symbol)-[:CALLS*1..{depth}]->(dst:Symbol) \
         WHERE (src.name = $from OR src.qualified_name = $from) \
           AND (dst.name = $to OR dst.qualified_name = $to) \
         RETURN [n IN nodes(p) | n.name] AS chain \
         LIMIT {limit}",
        depth = depth,
        limit = MAX_CALL_PATHS,
    )
}

/// Call chains that return to their starting function.
pub fn cycles_query(max_depth: usize) -> String {
    let depth = clamp_depth(max_depth, 2);
    format!(
        "MATCH p = (f:Function)-[:CALLS*2..{depth}]->(f) \
         RETURN [n IN nodes(p) | n.name] AS cycle \
         LIMIT {limit}",
        depth = depth,
        limit = MAX_CYCLES,
    )
}

fn clamp_depth(depth: usize, floor: usize) -> usize {
    depth.clamp(floor, MAX_TRAVERSAL_DEPTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_have_placeholders() {
        assert!(GET_FILE_SYMBOLS.contains("$path"));
        assert!(GET_CALLERS.contains("$name"));
        assert!(FIND_HOTSPOTS.contains("$limit"));
        assert!(SEARCH_FULLTEXT.contains("$text"));
        assert!(SEARCH_SUBSTRING.contains("$text"));
    }

    #[test]
    fn test_call_paths_query_clamps_depth() {
        let q = call_paths_query(0);
        assert!(q.contains("*1..1"));
        let q = call_paths_query(500);
        assert!(q.contains(&format!("*1..{}", MAX_TRAVERSAL_DEPTH)));
        assert!(q.contains(&format!("LIMIT {}", MAX_CALL_PATHS)));
    }

    #[test]
    fn test_call_paths_query_parenthesizes_both_sides() {
        let q = call_paths_query(5);
        assert!(q.contains("(src.name = $from OR src.qualified_name = $from)"));
        assert!(q.contains("(dst.name = $to OR dst.qualified_name = $to)"));
    }

    #[test]
    fn test_cycles_query_anchors_on_one_node() {
        let q = cycles_query(4);
        // Pattern starts and ends at the same variable, so returned chains
        // always begin and end with the same function.
        assert!(q.contains("(f:Function)-[:CALLS*2..4]->(f)"));
        assert!(q.contains(&format!("LIMIT {}", MAX_CYCLES)));
    }

    #[test]
    fn test_cycles_query_floor_is_two() {
        let q = cycles_query(1);
        assert!(q.contains("*2..2"));
    }

    #[test]
    fn test_dead_code_excludes_entry_points() {
        assert!(FIND_DEAD_CODE.contains("NOT f.name IN $entry_points"));
        assert!(ENTRY_POINT_NAMES.contains(&"main"));
    }
}
