//! Entity and relationship upserts.
//!
//! Each operation issues one atomic MERGE-then-SET query: match-or-create
//! by natural key, overwrite every non-key attribute, stamp `updated_at`.
//! Edge upserts MATCH both endpoints first; if either is missing the query
//! affects zero rows — create-then-link ordering is the caller's job, and a
//! missing endpoint is not an error.

use super::{
    substitute, CallEdge, CommitNode, DefinesEdge, FileNode, GraphClient, GraphResult, ImportEdge,
    InheritsEdge, ModifiesEdge, ModuleNode, SymbolNode, TouchesEdge,
};

impl GraphClient {
    pub async fn upsert_file(&mut self, file: &FileNode) -> GraphResult<()> {
        let composed = file_upsert_query(file);
        self.run_graph_query(&composed).await?;
        Ok(())
    }

    /// Upsert a symbol. The node carries the generic `Symbol` label, the
    /// specialized label derived from its kind and the `Searchable` marker,
    /// so it answers generic, kind-scoped and full-text queries alike.
    pub async fn upsert_symbol(&mut self, symbol: &SymbolNode) -> GraphResult<()> {
        let composed = symbol_upsert_query(symbol);
        self.run_graph_query(&composed).await?;
        Ok(())
    }

    pub async fn upsert_module(&mut self, module: &ModuleNode) -> GraphResult<()> {
        let composed = module_upsert_query(module);
        self.run_graph_query(&composed).await?;
        Ok(())
    }

    pub async fn upsert_commit(&mut self, commit: &CommitNode) -> GraphResult<()> {
        let composed = commit_upsert_query(commit);
        self.run_graph_query(&composed).await?;
        Ok(())
    }

    /// IMPORTS edge between two files. Returns the number of affected
    /// edges: zero when either endpoint is missing.
    pub async fn link_import(
        &mut self,
        from_path: &str,
        to_path: &str,
        edge: &ImportEdge,
    ) -> GraphResult<u64> {
        let composed = import_edge_query(from_path, to_path, edge);
        self.affected(&composed).await
    }

    /// DEFINES edge from a file to a symbol it defines.
    pub async fn link_defines(
        &mut self,
        file_path: &str,
        qualified_name: &str,
        edge: &DefinesEdge,
    ) -> GraphResult<u64> {
        let composed = defines_edge_query(file_path, qualified_name, edge);
        self.affected(&composed).await
    }

    /// CALLS edge between two symbols.
    pub async fn link_call(
        &mut self,
        caller: &str,
        callee: &str,
        edge: &CallEdge,
    ) -> GraphResult<u64> {
        let composed = call_edge_query(caller, callee, edge);
        self.affected(&composed).await
    }

    /// INHERITS edge between two symbols.
    pub async fn link_inherits(
        &mut self,
        child: &str,
        parent: &str,
        edge: &InheritsEdge,
    ) -> GraphResult<u64> {
        let composed = inherits_edge_query(child, parent, edge);
        self.affected(&composed).await
    }

    /// MODIFIES edge from a commit to a file it changed.
    pub async fn link_modifies(
        &mut self,
        sha: &str,
        file_path: &str,
        edge: &ModifiesEdge,
    ) -> GraphResult<u64> {
        let composed = modifies_edge_query(sha, file_path, edge);
        self.affected(&composed).await
    }

    /// TOUCHES edge from a commit to a symbol it changed.
    pub async fn link_touches(
        &mut self,
        sha: &str,
        qualified_name: &str,
        edge: &TouchesEdge,
    ) -> GraphResult<u64> {
        let composed = touches_edge_query(sha, qualified_name, edge);
        self.affected(&composed).await
    }

    async fn affected(&mut self, composed: &str) -> GraphResult<u64> {
        let raw = self.run_graph_query(composed).await?;
        let rows = super::decode_reply(&raw);
        Ok(rows
            .first()
            .and_then(|row| row.get("affected"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0))
    }
}

pub(crate) fn file_upsert_query(file: &FileNode) -> String {
    substitute(
        "MERGE (f:File {path: $path}) \
         SET f.language = $language, f.last_modified = $last_modified, f.size = $size, \
             f.hash = $hash, f.loc = $loc, f.complexity = $complexity, \
             f.updated_at = timestamp()",
        &[
            ("path", file.path.as_str().into()),
            ("language", file.language.as_str().into()),
            ("last_modified", file.last_modified.into()),
            ("size", file.size.into()),
            ("hash", file.hash.as_str().into()),
            ("loc", file.loc.into()),
            ("complexity", file.complexity.into()),
        ],
    )
}

pub(crate) fn symbol_upsert_query(symbol: &SymbolNode) -> String {
    // The specialized label comes from a fixed table keyed by kind, never
    // from caller input, so inlining it into the pattern is safe.
    let template = format!(
        "MERGE (s:Symbol:{}:Searchable {{qualified_name: $qualified_name}}) \
         SET s.name = $name, s.kind = $kind, s.file_path = $file_path, \
             s.line_start = $line_start, s.line_end = $line_end, \
             s.signature = $signature, s.docstring = $docstring, \
             s.return_type = $return_type, s.visibility = $visibility, \
             s.is_async = $is_async, s.is_static = $is_static, \
             s.complexity = $complexity, s.embedding_id = $embedding_id, \
             s.updated_at = timestamp()",
        symbol.kind.specialized_label(),
    );
    substitute(
        &template,
        &[
            ("qualified_name", symbol.qualified_name.as_str().into()),
            ("name", symbol.name.as_str().into()),
            ("kind", symbol.kind.as_str().into()),
            ("file_path", symbol.file_path.as_str().into()),
            ("line_start", symbol.line_start.into()),
            ("line_end", symbol.line_end.into()),
            ("signature", symbol.signature.as_str().into()),
            ("docstring", symbol.docstring.as_str().into()),
            ("return_type", symbol.return_type.as_str().into()),
            ("visibility", symbol.visibility.as_str().into()),
            ("is_async", symbol.is_async.into()),
            ("is_static", symbol.is_static.into()),
            ("complexity", symbol.complexity.into()),
            ("embedding_id", symbol.embedding_id.as_deref().into()),
        ],
    )
}

pub(crate) fn module_upsert_query(module: &ModuleNode) -> String {
    substitute(
        "MERGE (m:Module {path: $path}) \
         SET m.name = $name, m.module_type = $module_type, m.language = $language, \
             m.description = $description, m.version = $version, \
             m.file_count = $file_count, m.symbol_count = $symbol_count, \
             m.updated_at = timestamp()",
        &[
            ("path", module.path.as_str().into()),
            ("name", module.name.as_str().into()),
            ("module_type", module.module_type.as_str().into()),
            ("language", module.language.as_str().into()),
            ("description", module.description.as_str().into()),
            ("version", module.version.as_str().into()),
            ("file_count", module.file_count.into()),
            ("symbol_count", module.symbol_count.into()),
        ],
    )
}

pub(crate) fn commit_upsert_query(commit: &CommitNode) -> String {
    substitute(
        "MERGE (c:Commit {sha: $sha}) \
         SET c.message = $message, c.author = $author, c.author_email = $author_email, \
             c.committer = $committer, c.timestamp = $timestamp, c.branch = $branch, \
             c.files_changed = $files_changed, c.insertions = $insertions, \
             c.deletions = $deletions, c.embedding_id = $embedding_id, \
             c.updated_at = timestamp()",
        &[
            ("sha", commit.sha.as_str().into()),
            ("message", commit.message.as_str().into()),
            ("author", commit.author.as_str().into()),
            ("author_email", commit.author_email.as_str().into()),
            ("committer", commit.committer.as_str().into()),
            ("timestamp", commit.timestamp.into()),
            ("branch", commit.branch.as_str().into()),
            ("files_changed", commit.files_changed.into()),
            ("insertions", commit.insertions.into()),
            ("deletions", commit.deletions.into()),
            ("embedding_id", commit.embedding_id.as_deref().into()),
        ],
    )
}

pub(crate) fn import_edge_query(from_path: &str, to_path: &str, edge: &ImportEdge) -> String {
    substitute(
        "MATCH (a:File {path: $from}), (b:File {path: $to}) \
         MERGE (a)-[r:IMPORTS]->(b) \
         SET r.line = $line, r.symbols = $symbols, r.alias = $alias \
         RETURN count(r) AS affected",
        &[
            ("from", from_path.into()),
            ("to", to_path.into()),
            ("line", edge.line.into()),
            ("symbols", edge.symbols.clone().into()),
            ("alias", edge.alias.as_deref().into()),
        ],
    )
}

pub(crate) fn defines_edge_query(file_path: &str, qualified_name: &str, edge: &DefinesEdge) -> String {
    substitute(
        "MATCH (f:File {path: $path}), (s:Symbol {qualified_name: $qualified_name}) \
         MERGE (f)-[r:DEFINES]->(s) \
         SET r.line = $line \
         RETURN count(r) AS affected",
        &[
            ("path", file_path.into()),
            ("qualified_name", qualified_name.into()),
            ("line", edge.line.into()),
        ],
    )
}

pub(crate) fn call_edge_query(caller: &str, callee: &str, edge: &CallEdge) -> String {
    substitute(
        "MATCH (a:Symbol {qualified_name: $caller}), (b:Symbol {qualified_name: $callee}) \
         MERGE (a)-[r:CALLS]->(b) \
         SET r.line = $line, r.count = $count, r.conditional = $conditional \
         RETURN count(r) AS affected",
        &[
            ("caller", caller.into()),
            ("callee", callee.into()),
            ("line", edge.line.into()),
            ("count", edge.count.into()),
            ("conditional", edge.conditional.into()),
        ],
    )
}

pub(crate) fn inherits_edge_query(child: &str, parent: &str, edge: &InheritsEdge) -> String {
    substitute(
        "MATCH (a:Symbol {qualified_name: $child}), (b:Symbol {qualified_name: $parent}) \
         MERGE (a)-[r:INHERITS]->(b) \
         SET r.kind = $kind \
         RETURN count(r) AS affected",
        &[
            ("child", child.into()),
            ("parent", parent.into()),
            ("kind", edge.kind.as_str().into()),
        ],
    )
}

pub(crate) fn modifies_edge_query(sha: &str, file_path: &str, edge: &ModifiesEdge) -> String {
    substitute(
        "MATCH (c:Commit {sha: $sha}), (f:File {path: $path}) \
         MERGE (c)-[r:MODIFIES]->(f) \
         SET r.change_type = $change_type, r.insertions = $insertions, r.deletions = $deletions \
         RETURN count(r) AS affected",
        &[
            ("sha", sha.into()),
            ("path", file_path.into()),
            ("change_type", edge.change_type.as_str().into()),
            ("insertions", edge.insertions.into()),
            ("deletions", edge.deletions.into()),
        ],
    )
}

pub(crate) fn touches_edge_query(sha: &str, qualified_name: &str, edge: &TouchesEdge) -> String {
    substitute(
        "MATCH (c:Commit {sha: $sha}), (s:Symbol {qualified_name: $qualified_name}) \
         MERGE (c)-[r:TOUCHES]->(s) \
         SET r.change_type = $change_type, r.line_delta = $line_delta \
         RETURN count(r) AS affected",
        &[
            ("sha", sha.into()),
            ("qualified_name", qualified_name.into()),
            ("change_type", edge.change_type.as_str().into()),
            ("line_delta", edge.line_delta.into()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SymbolKind;

    fn sample_symbol() -> SymbolNode {
        SymbolNode {
            qualified_name: "pkg.mod.O'Brien".to_string(),
            name: "O'Brien".to_string(),
            kind: SymbolKind::Function,
            file_path: "/src/mod.ts".to_string(),
            line_start: 10,
            line_end: 20,
            signature: "O'Brien(x: number): void".to_string(),
            docstring: "line1\nline2".to_string(),
            return_type: "void".to_string(),
            visibility: "public".to_string(),
            is_async: true,
            is_static: false,
            complexity: 3.0,
            embedding_id: None,
        }
    }

    #[test]
    fn test_symbol_query_attaches_all_labels() {
        let q = symbol_upsert_query(&sample_symbol());
        assert!(q.starts_with("MERGE (s:Symbol:Function:Searchable"));
        assert!(q.contains("s.updated_at = timestamp()"));
    }

    #[test]
    fn test_symbol_query_escapes_values() {
        let q = symbol_upsert_query(&sample_symbol());
        assert!(q.contains("'pkg.mod.O\\'Brien'"));
        assert!(q.contains("'line1\\nline2'"));
        assert!(q.contains("s.embedding_id = null"));
    }

    #[test]
    fn test_variable_symbol_uses_noncolliding_label() {
        let mut symbol = sample_symbol();
        symbol.kind = SymbolKind::Variable;
        let q = symbol_upsert_query(&symbol);
        assert!(q.contains(":Symbol:Var:Searchable"));
    }

    #[test]
    fn test_file_query_merges_on_path_only() {
        let file = FileNode {
            path: "/src/a.rs".to_string(),
            language: "rust".to_string(),
            last_modified: 1_700_000_000_000,
            size: 2048,
            hash: "abc123".to_string(),
            loc: 80,
            complexity: 4.5,
        };
        let q = file_upsert_query(&file);
        assert!(q.starts_with("MERGE (f:File {path: '/src/a.rs'})"));
        assert!(q.contains("f.hash = 'abc123'"));
        assert!(q.contains("f.complexity = 4.5"));
    }

    #[test]
    fn test_import_edge_query_matches_endpoints_first() {
        let edge = ImportEdge {
            line: 1,
            symbols: vec!["readFile".to_string()],
            alias: Some("fs".to_string()),
        };
        let q = import_edge_query("/a.ts", "/b.ts", &edge);
        assert!(q.starts_with("MATCH (a:File {path: '/a.ts'}), (b:File {path: '/b.ts'})"));
        assert!(q.contains("r.symbols = ['readFile']"));
        assert!(q.contains("r.alias = 'fs'"));
        assert!(q.ends_with("RETURN count(r) AS affected"));
    }

    #[test]
    fn test_call_edge_query() {
        let edge = CallEdge {
            line: 42,
            count: 3,
            conditional: true,
        };
        let q = call_edge_query("a.f", "b.g", &edge);
        assert!(q.contains("MERGE (a)-[r:CALLS]->(b)"));
        assert!(q.contains("r.conditional = true"));
    }

    #[test]
    fn test_commit_query_merges_on_sha() {
        let commit = CommitNode {
            sha: "deadbeef".to_string(),
            message: "fix: don't crash".to_string(),
            author: "ada".to_string(),
            author_email: "ada@example.com".to_string(),
            committer: "ada".to_string(),
            timestamp: 1_700_000_000,
            branch: "main".to_string(),
            files_changed: 2,
            insertions: 10,
            deletions: 4,
            embedding_id: Some("vec:123".to_string()),
        };
        let q = commit_upsert_query(&commit);
        assert!(q.starts_with("MERGE (c:Commit {sha: 'deadbeef'})"));
        assert!(q.contains("'fix: don\\'t crash'"));
        assert!(q.contains("c.embedding_id = 'vec:123'"));
    }
}
