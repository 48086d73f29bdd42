//! Documentation assembly: token-budget routing, per-chunk requests and Markdown output.
//!
//! The pipeline is a left-to-right transformation `SourceText -> AssembledDocument`:
//!   - count tokens and pick the single-shot or chunked path
//!   - single-shot: one completion for the whole source
//!   - chunked: one completion per [`Chunk`], issued sequentially
//!   - render everything into one Markdown document
//!
//! # Error Handling
//! Apart from the missing API key check, which short-circuits before any work, no failure
//! escapes this module. Tokenizer and provider errors are rendered inline at the position
//! their output would have occupied, so a caller always gets a Markdown string back.

use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::chunker::{chunk_source, Chunk};
use crate::config::DocumentationConfig;
use crate::contract::{CompletionProvider, CompletionRequest, TokenCounter};
use crate::error::ServiceError;
use crate::load::SourceText;

pub const DOCUMENT_HEADER: &str = "## Enhanced Code Documentation\n\n";

/// Default file name for the generated document.
pub const OUTPUT_FILENAME: &str = "enhanced_code_documentation.md";

pub const SINGLE_SHOT_SYSTEM_PROMPT: &str = "You are a code documentation expert. Analyze the provided code and generate comprehensive and informative documentation.";

pub const CHUNK_SYSTEM_PROMPT: &str = "Generate comprehensive documentation for the following code chunk. Make it a self-contained section that can be concatenated with others.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SingleShot,
    Chunked,
}

/// The budget is inclusive: a source of exactly `token_budget` tokens goes single-shot.
pub fn select_route(token_count: usize, token_budget: usize) -> Route {
    if token_count <= token_budget {
        Route::SingleShot
    } else {
        Route::Chunked
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    SingleShot,
    Chunked { chunks: usize },
    /// No documentation was requested: configuration or tokenizer failure.
    Aborted,
}

#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub markdown: String,
    pub mode: GenerationMode,
    /// Completion calls that failed and were rendered as inline diagnostics.
    pub failed_requests: usize,
}

/// Outcome of documenting one chunk, tagged with the chunk it belongs to.
#[derive(Debug)]
pub struct ChunkDocumentation {
    pub chunk_index: usize,
    pub outcome: Result<String, ServiceError>,
}

impl ChunkDocumentation {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn render(&self) -> String {
        match &self.outcome {
            Ok(text) => text.clone(),
            Err(e) => format!("Documentation Error: {e}"),
        }
    }
}

fn generation_failed(reason: impl std::fmt::Display) -> String {
    format!("{DOCUMENT_HEADER}**LLM Documentation Generation Failed:** {reason}\n\n")
}

/// Request one standalone documentation section per chunk, in order.
///
/// A failing chunk never stops the loop: its error is kept in the returned entry and the
/// next chunk is requested.
pub async fn document_chunks<P>(
    provider: &P,
    config: &DocumentationConfig,
    chunks: &[Chunk],
) -> Vec<ChunkDocumentation>
where
    P: CompletionProvider + ?Sized,
{
    let mut docs = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        debug!(
            chunk = chunk.index,
            first_line = chunk.first_line,
            last_line = chunk.last_line(),
            "[DOCS] Requesting chunk documentation"
        );
        let request = CompletionRequest {
            model: config.model.clone(),
            system_prompt: CHUNK_SYSTEM_PROMPT.to_string(),
            user_prompt: chunk.text.clone(),
            temperature: config.temperature,
        };
        let outcome = provider
            .complete(request)
            .await
            .map(|text| text.trim().to_string());
        if let Err(e) = &outcome {
            warn!(chunk = chunk.index, error = %e, "[DOCS] Chunk documentation failed");
        }
        docs.push(ChunkDocumentation {
            chunk_index: chunk.index,
            outcome,
        });
    }
    docs
}

/// Render chunk documentation followed by the chunks themselves as fenced code blocks.
pub fn assemble_chunked(docs: &[ChunkDocumentation], chunks: &[Chunk], language: &str) -> String {
    let sections: Vec<String> = docs.iter().map(ChunkDocumentation::render).collect();

    let mut markdown = String::from(DOCUMENT_HEADER);
    markdown.push_str(&sections.join("\n\n"));
    markdown.push_str("\n\n### Original Code (Chunks):\n");
    for chunk in chunks {
        markdown.push_str(&format!("```{language}\n{}\n```\n\n", chunk.code()));
    }
    markdown
}

pub fn assemble_single(documentation: &str, source: &str, language: &str) -> String {
    format!("{DOCUMENT_HEADER}{documentation}\n\n### Original Code:\n```{language}\n{source}\n```\n")
}

async fn single_shot<P>(
    provider: &P,
    config: &DocumentationConfig,
    source: &str,
    language: &str,
) -> AssembledDocument
where
    P: CompletionProvider + ?Sized,
{
    let request = CompletionRequest {
        model: config.model.clone(),
        system_prompt: SINGLE_SHOT_SYSTEM_PROMPT.to_string(),
        user_prompt: format!("Analyze this code and generate documentation:\n\n{source}"),
        temperature: config.temperature,
    };

    match provider.complete(request).await {
        Ok(text) => AssembledDocument {
            markdown: assemble_single(text.trim(), source, language),
            mode: GenerationMode::SingleShot,
            failed_requests: 0,
        },
        Err(e) => {
            error!(error = %e, "[DOCS] Single-shot documentation failed");
            AssembledDocument {
                markdown: generation_failed(&e),
                mode: GenerationMode::SingleShot,
                failed_requests: 1,
            }
        }
    }
}

async fn chunked<P>(
    provider: &P,
    config: &DocumentationConfig,
    source: &str,
    language: &str,
) -> AssembledDocument
where
    P: CompletionProvider + ?Sized,
{
    let chunks = chunk_source(source, config.chunk_limit());
    info!(
        chunks = chunks.len(),
        limit = config.chunk_limit(),
        "[DOCS] Documenting source in chunks"
    );

    let docs = document_chunks(provider, config, &chunks).await;
    let failed_requests = docs.iter().filter(|d| !d.is_success()).count();

    AssembledDocument {
        markdown: assemble_chunked(&docs, &chunks, language),
        mode: GenerationMode::Chunked {
            chunks: chunks.len(),
        },
        failed_requests,
    }
}

/// Produce the documentation for `source`. Always returns a Markdown document.
pub async fn generate_documentation<P, T>(
    config: &DocumentationConfig,
    provider: &P,
    tokenizer: &T,
    source: &SourceText,
) -> AssembledDocument
where
    P: CompletionProvider + ?Sized,
    T: TokenCounter + ?Sized,
{
    let span = info_span!("generate", run_id = %Uuid::new_v4(), origin = %source.origin);
    async move {
        if let Err(e) = config.require_api_key() {
            error!(error = %e, "[DOCS] Missing API key, skipping generation");
            return AssembledDocument {
                markdown: format!("**Error: {e}**"),
                mode: GenerationMode::Aborted,
                failed_requests: 0,
            };
        }

        let language = source.language_hint().unwrap_or(config.language.as_str());

        let token_count = match tokenizer.count_tokens(&source.content, &config.model) {
            Ok(count) => count,
            Err(e) => {
                error!(error = %e, model = %config.model, "[DOCS] Token counting failed");
                return AssembledDocument {
                    markdown: generation_failed(&e),
                    mode: GenerationMode::Aborted,
                    failed_requests: 0,
                };
            }
        };

        let route = select_route(token_count, config.token_budget);
        info!(
            token_count,
            token_budget = config.token_budget,
            route = ?route,
            model = %config.model,
            "[DOCS] Selected documentation route"
        );

        let document = match route {
            Route::SingleShot => single_shot(provider, config, &source.content, language).await,
            Route::Chunked => chunked(provider, config, &source.content, language).await,
        };

        info!(
            mode = ?document.mode,
            failed_requests = document.failed_requests,
            markdown_bytes = document.markdown.len(),
            "[DOCS] Documentation assembled"
        );
        document
    }
    .instrument(span)
    .await
}

/// Bundles a configuration with its collaborators.
pub struct Documenter<P, T> {
    config: DocumentationConfig,
    provider: P,
    tokenizer: T,
}

impl<P, T> Documenter<P, T>
where
    P: CompletionProvider,
    T: TokenCounter,
{
    pub fn new(config: DocumentationConfig, provider: P, tokenizer: T) -> Self {
        Self {
            config,
            provider,
            tokenizer,
        }
    }

    pub fn config(&self) -> &DocumentationConfig {
        &self.config
    }

    pub async fn generate(&self, source: &SourceText) -> AssembledDocument {
        generate_documentation(&self.config, &self.provider, &self.tokenizer, source).await
    }
}
