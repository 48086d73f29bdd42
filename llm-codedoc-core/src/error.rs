//! Error taxonomy for the documentation pipeline.
//!
//! Only [`ConfigurationError`] and [`LoadError`] ever reach the caller as errors. The
//! assembler catches [`ServiceError`] and [`EncodingError`] and renders them inline in the
//! generated Markdown.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ProviderKind;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("{provider} API Key is required.")]
    MissingApiKey { provider: ProviderKind },

    #[error("Unsupported provider: {0}")]
    UnknownProvider(String),

    #[error("Token budget must be at least 3, got {0}")]
    InvalidTokenBudget(usize),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File not found at path: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error fetching the file from URL: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Error fetching the file from URL {url}: server returned {status}")]
    Status { url: String, status: u16 },

    #[error("Uploaded file {filename} is not valid UTF-8: {source}")]
    InvalidUtf8 {
        filename: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("No source code provided")]
    Empty,
}

/// Failure of a single completion call. Never aborts a run.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("authentication rejected by provider")]
    Auth,

    #[error("rate limited by provider")]
    RateLimited,

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider response contained no completion")]
    EmptyResponse,
}

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("no tokenizer encoding known for model '{model}': {reason}")]
    UnknownModel { model: String, reason: String },

    #[error("failed to load tokenizer encoding {encoding}: {reason}")]
    Encoding { encoding: String, reason: String },
}
