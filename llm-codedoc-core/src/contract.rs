//! # contract: collaborator interfaces for the documentation pipeline
//!
//! The core never talks to an LLM vendor, a tokenizer library or the network directly.
//! It depends on the three traits below, which the CLI crate implements for real use and
//! `mockall` implements for tests.
//!
//! ## Mocking & Testing
//! - Each trait is annotated with `automock`. The mocks are exported when the
//!   `test-export-mocks` feature is enabled (on by default), so integration tests in
//!   dependent crates can use `MockCompletionProvider`, `MockTokenCounter` and
//!   `MockSourceLoader`.
//!
//! ## Adding New Providers
//! - Implement [`CompletionProvider`] for the destination.
//! - Convert every transport, auth and quota failure into a [`ServiceError`]. The assembler
//!   relies on errors, not panics, to isolate failing chunks.

use async_trait::async_trait;
use mockall::automock;

use crate::error::{EncodingError, LoadError, ServiceError};
use crate::load::{SourceInput, SourceText};

/// A single chat-completion request: one system instruction and one user payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    /// Sampling temperature. `None` leaves the provider default.
    pub temperature: Option<f32>,
}

/// Turns a prompt into generated text.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Issue exactly one completion call. No retries.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ServiceError>;
}

/// Counts tokens of a text as seen by a given model.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait TokenCounter: Send + Sync {
    fn count_tokens(&self, text: &str, model: &str) -> Result<usize, EncodingError>;
}

/// Obtains the raw source text from any of the supported input modes.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SourceLoader: Send + Sync {
    async fn load(&self, input: SourceInput) -> Result<SourceText, LoadError>;
}
