#![doc = "Completion provider integration: bridges the core `CompletionProvider` trait to OpenAI-compatible chat-completions endpoints."]
//
//! # Provider Integration (CLI <-> Core)
//!
//! OpenAI and Groq expose the same `/chat/completions` wire format, so one client serves
//! both. The [`ProviderKind`] only decides defaults: base URL, model and temperature.
//!
//! - Construct [`ChatCompletionsClient`] from loaded [`Settings`].
//! - Every failure is mapped to a [`ServiceError`]; the assembler embeds it in the output.

use std::time::Duration;

use async_trait::async_trait;
use llm_codedoc_core::config::ProviderKind;
use llm_codedoc_core::contract::{CompletionProvider, CompletionRequest};
use llm_codedoc_core::error::ServiceError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::load_config::Settings;

pub struct ChatCompletionsClient {
    http: Client,
    kind: ProviderKind,
    base_url: String,
    api_key: String,
}

impl ChatCompletionsClient {
    pub fn new(
        kind: ProviderKind,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            http,
            kind,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// The key may be absent: the assembler reports that before any request is made.
    pub fn from_settings(settings: &Settings) -> Result<Self, reqwest::Error> {
        let doc = &settings.documentation;
        info!(
            provider = %doc.provider,
            base_url = %settings.base_url,
            timeout_secs = settings.timeout.as_secs(),
            "Initialized chat-completions client"
        );
        Self::new(
            doc.provider,
            doc.api_key.as_deref().map(str::trim).unwrap_or_default(),
            settings.base_url.clone(),
            settings.timeout,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionProvider for ChatCompletionsClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ServiceError> {
        let body = ChatRequest {
            model: &request.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user_prompt.clone(),
                },
            ],
            temperature: request.temperature,
        };

        debug!(
            provider = %self.kind,
            model = %request.model,
            prompt_bytes = request.user_prompt.len(),
            "Sending chat completion request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, provider = %self.kind, "Chat completion request failed");
                ServiceError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, provider = %self.kind, body = %body, "Provider returned error status");
            return Err(match status.as_u16() {
                401 | 403 => ServiceError::Auth,
                429 => ServiceError::RateLimited,
                code => ServiceError::Status { status: code, body },
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Transport(format!("invalid response body: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or(ServiceError::EmptyResponse)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
