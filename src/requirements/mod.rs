//! Requirements-management HTTP client.
//!
//! Data source/sink for PRDs and requirement chunks, consumed by the
//! ingestion side. Bearer-token auth, bounded request timeout, typed
//! records. No graph logic lives here.

mod client;

pub use client::{
    ChunkDependency, DependencyGraph, Prd, RequirementChunk, RequirementsClient, SearchResult,
};

use thiserror::Error;

/// Errors from the requirements API client.
#[derive(Error, Debug)]
pub enum RequirementsError {
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),
}

pub type RequirementsResult<T> = Result<T, RequirementsError>;
