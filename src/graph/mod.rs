//! Code knowledge graph backed by FalkorDB.
//!
//! FalkorDB executes Cypher over the Redis command protocol. The client
//! here owns one connection per instance, composes queries through a single
//! injection-safe encoder, decodes the engine's compact reply format and
//! exposes typed upsert and analysis operations.

mod analysis;
mod client;
mod decode;
mod entities;
pub mod queries;
pub mod schema;
mod upsert;
mod value;

pub use analysis::{GraphStats, SearchHit};
pub use client::{ConnectionState, GraphClient};
pub use decode::{decode_reply, QueryResult};
pub use entities::{
    CallEdge, CommitNode, DefinesEdge, FileNode, ImportEdge, InheritsEdge, ModifiesEdge,
    ModuleNode, NodeLabel, SymbolKind, SymbolNode, TouchesEdge,
};
pub use value::{substitute, Param};

use thiserror::Error;

/// Errors produced by the graph manager.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Connect-phase failure, wrapping the transport cause.
    #[error("graph connection failed: {0}")]
    Connection(#[source] redis::RedisError),

    /// An operation was attempted with no live connection.
    #[error("not connected to graph engine")]
    NotConnected,

    /// The liveness probe returned something other than PONG.
    #[error("liveness probe returned unexpected reply: {reply:?}")]
    Ping { reply: String },

    /// Query send or decode failure. `query` is truncated to 200 chars
    /// unless verbose diagnostics are enabled on the client.
    #[error("query failed: {source} (query: {query})")]
    Query {
        query: String,
        #[source]
        source: redis::RedisError,
    },
}

pub type GraphResult<T> = Result<T, GraphError>;
