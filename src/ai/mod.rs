//! AI-completion client.
//!
//! Thin request/response capability over cloud or local language-model
//! backends. BYOK (bring your own key) — keys come from environment
//! variables. The graph manager never depends on this module; consumers
//! compose the two.

mod client;

pub use client::{AiClient, AiConfig, LlmBackend, Message, Role};

use thiserror::Error;

/// Errors from the AI completion client.
#[derive(Error, Debug)]
pub enum AiError {
    #[error("Missing API key: {env_var} not set")]
    MissingApiKey { env_var: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type AiResult<T> = Result<T, AiError>;
