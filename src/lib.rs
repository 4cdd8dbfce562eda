//! repograph — code knowledge graph manager backed by FalkorDB.
//!
//! Maintains a persistent, queryable graph of a codebase: files, symbols,
//! modules and commits as nodes; imports, definitions, calls, inheritance
//! and commit touches as edges. The [`graph`] module owns the engine
//! connection, builds injection-safe Cypher, decodes the engine's compact
//! reply format and layers code-intelligence analyses (call paths, dead
//! code, hotspots, cycles, search) on top.
//!
//! The [`ai`] and [`requirements`] modules are thin clients for the
//! collaborating services; they carry no graph logic.

pub mod ai;
pub mod config;
pub mod graph;
pub mod requirements;

pub use config::GraphConfig;
pub use graph::{GraphClient, GraphError, GraphResult, Param, QueryResult};
