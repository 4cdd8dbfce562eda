//! Domain model for graph nodes and edges.
//!
//! Every node type carries a natural key used for upsert matching: files
//! and modules by path, symbols by qualified name, commits by sha.

use serde::{Deserialize, Serialize};

/// Node labels with a natural key, for key-based lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeLabel {
    File,
    Symbol,
    Module,
    Commit,
}

impl NodeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeLabel::File => "File",
            NodeLabel::Symbol => "Symbol",
            NodeLabel::Module => "Module",
            NodeLabel::Commit => "Commit",
        }
    }

    /// Property holding the natural key for this label.
    pub fn key_property(&self) -> &'static str {
        match self {
            NodeLabel::File | NodeLabel::Module => "path",
            NodeLabel::Symbol => "qualified_name",
            NodeLabel::Commit => "sha",
        }
    }
}

/// Symbol kinds recognised by the ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Interface,
    Type,
    Struct,
    Enum,
    Constant,
    Variable,
    Other,
}

impl SymbolKind {
    /// Parse a kind string from the ingestion side. Unknown kinds map to
    /// [`SymbolKind::Other`].
    pub fn parse(kind: &str) -> Self {
        match kind {
            "function" => SymbolKind::Function,
            "method" => SymbolKind::Method,
            "class" => SymbolKind::Class,
            "interface" => SymbolKind::Interface,
            "type" => SymbolKind::Type,
            "struct" => SymbolKind::Struct,
            "enum" => SymbolKind::Enum,
            "constant" => SymbolKind::Constant,
            "variable" => SymbolKind::Variable,
            _ => SymbolKind::Other,
        }
    }

    /// The specialized label attached alongside `Symbol` and `Searchable`.
    ///
    /// Label names stay clear of Cypher reserved words, hence `Var` for the
    /// variable kind and `TypeAlias` for type.
    pub fn specialized_label(&self) -> &'static str {
        match self {
            SymbolKind::Function => "Function",
            SymbolKind::Method => "Method",
            SymbolKind::Class => "Class",
            SymbolKind::Interface => "Interface",
            SymbolKind::Type => "TypeAlias",
            SymbolKind::Struct => "Struct",
            SymbolKind::Enum => "Enum",
            SymbolKind::Constant => "Constant",
            SymbolKind::Variable => "Var",
            SymbolKind::Other => "Entity",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Type => "type",
            SymbolKind::Struct => "struct",
            SymbolKind::Enum => "enum",
            SymbolKind::Constant => "constant",
            SymbolKind::Variable => "variable",
            SymbolKind::Other => "other",
        }
    }
}

/// A source file node. Natural key: `path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNode {
    pub path: String,
    pub language: String,
    /// Last-modified time, epoch milliseconds.
    pub last_modified: i64,
    pub size: i64,
    pub hash: String,
    pub loc: i64,
    pub complexity: f64,
}

/// A symbol node. Natural key: `qualified_name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolNode {
    pub qualified_name: String,
    pub name: String,
    pub kind: SymbolKind,
    pub file_path: String,
    pub line_start: i64,
    pub line_end: i64,
    pub signature: String,
    pub docstring: String,
    pub return_type: String,
    pub visibility: String,
    pub is_async: bool,
    pub is_static: bool,
    pub complexity: f64,
    /// Identifier of an embedding vector stored elsewhere, if any.
    pub embedding_id: Option<String>,
}

/// A module node. Natural key: `path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleNode {
    pub path: String,
    pub name: String,
    pub module_type: String,
    pub language: String,
    pub description: String,
    pub version: String,
    pub file_count: i64,
    pub symbol_count: i64,
}

/// A commit node. Natural key: `sha`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitNode {
    pub sha: String,
    pub message: String,
    pub author: String,
    pub author_email: String,
    pub committer: String,
    /// Author timestamp, epoch seconds.
    pub timestamp: i64,
    pub branch: String,
    pub files_changed: i64,
    pub insertions: i64,
    pub deletions: i64,
    pub embedding_id: Option<String>,
}

/// IMPORTS edge attributes (File → File).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportEdge {
    pub line: i64,
    pub symbols: Vec<String>,
    pub alias: Option<String>,
}

/// DEFINES edge attributes (File → Symbol).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefinesEdge {
    pub line: i64,
}

/// CALLS edge attributes (Symbol → Symbol).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallEdge {
    pub line: i64,
    pub count: i64,
    pub conditional: bool,
}

/// INHERITS edge attributes (Symbol → Symbol).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InheritsEdge {
    /// Inheritance kind, e.g. extends or implements.
    pub kind: String,
}

/// MODIFIES edge attributes (Commit → File).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModifiesEdge {
    pub change_type: String,
    pub insertions: i64,
    pub deletions: i64,
}

/// TOUCHES edge attributes (Commit → Symbol).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TouchesEdge {
    pub change_type: String,
    pub line_delta: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!(SymbolKind::parse("function"), SymbolKind::Function);
        assert_eq!(SymbolKind::parse("struct"), SymbolKind::Struct);
        assert_eq!(SymbolKind::parse("macro"), SymbolKind::Other);
    }

    #[test]
    fn test_specialized_labels_avoid_reserved_words() {
        assert_eq!(SymbolKind::Variable.specialized_label(), "Var");
        assert_eq!(SymbolKind::Type.specialized_label(), "TypeAlias");
        assert_eq!(SymbolKind::Other.specialized_label(), "Entity");
    }

    #[test]
    fn test_natural_key_properties() {
        assert_eq!(NodeLabel::File.key_property(), "path");
        assert_eq!(NodeLabel::Symbol.key_property(), "qualified_name");
        assert_eq!(NodeLabel::Commit.key_property(), "sha");
    }
}
