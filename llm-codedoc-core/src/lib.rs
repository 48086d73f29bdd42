#![doc = "llm-codedoc-core: chunking and documentation assembly for llm-codedoc."]

//! This crate holds the provider-agnostic pipeline: loading source text, deciding between
//! single-shot and chunked documentation, and assembling the final Markdown.
//! LLM vendors and tokenizers are reached only through the traits in [`contract`].
//!
//! # Usage
//! Build a [`config::DocumentationConfig`], pick implementations of
//! [`contract::CompletionProvider`] and [`contract::TokenCounter`], and call
//! [`assemble::generate_documentation`].

pub mod assemble;
pub mod chunker;
pub mod config;
pub mod contract;
pub mod error;
pub mod load;

pub use assemble::{generate_documentation, AssembledDocument, Documenter, GenerationMode};
pub use chunker::{chunk_source, Chunk};
pub use config::{DocumentationConfig, ProviderKind, DEFAULT_TOKEN_BUDGET};
pub use error::{ConfigurationError, EncodingError, LoadError, ServiceError};
pub use load::{rewrite_github_url, DefaultLoader, SourceInput, SourceText};
