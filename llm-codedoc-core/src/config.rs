use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::ConfigurationError;

/// Token count above which the source is documented in chunks.
pub const DEFAULT_TOKEN_BUDGET: usize = 15_000;

/// Fence language used when none can be inferred from the source.
pub const DEFAULT_LANGUAGE: &str = "python";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Which chat-completion backend documents the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Groq,
}

impl ProviderKind {
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-3.5-turbo",
            ProviderKind::Groq => "llama3-70b-8192",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Groq => "https://api.groq.com/openai/v1",
        }
    }

    pub fn default_temperature(&self) -> Option<f32> {
        match self {
            ProviderKind::OpenAi => Some(0.5),
            ProviderKind::Groq => None,
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Groq => "GROQ_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "OpenAI"),
            ProviderKind::Groq => write!(f, "Groq"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" | "open_ai" | "open-ai" => Ok(ProviderKind::OpenAi),
            "groq" => Ok(ProviderKind::Groq),
            other => Err(ConfigurationError::UnknownProvider(other.to_string())),
        }
    }
}

/// Everything the assembler needs to know about a run. Passed explicitly, never global.
#[derive(Debug, Clone)]
pub struct DocumentationConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub api_key: Option<String>,
    pub token_budget: usize,
    pub language: String,
    pub temperature: Option<f32>,
}

impl DocumentationConfig {
    /// Provider defaults, no API key.
    pub fn for_provider(provider: ProviderKind) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
            api_key: None,
            token_budget: DEFAULT_TOKEN_BUDGET,
            language: DEFAULT_LANGUAGE.to_string(),
            temperature: provider.default_temperature(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigurationError> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ConfigurationError::MissingApiKey {
                provider: self.provider,
            }),
        }
    }

    /// Character limit per chunk: a third of the token budget.
    pub fn chunk_limit(&self) -> usize {
        self.token_budget / 3
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.chunk_limit() == 0 {
            return Err(ConfigurationError::InvalidTokenBudget(self.token_budget));
        }
        Ok(())
    }

    pub fn trace_loaded(&self) {
        info!(
            provider = %self.provider,
            model = %self.model,
            token_budget = self.token_budget,
            api_key_set = self.api_key.is_some(),
            "Loaded DocumentationConfig"
        );
        debug!(
            language = %self.language,
            temperature = ?self.temperature,
            "DocumentationConfig details"
        );
    }
}

impl Default for DocumentationConfig {
    fn default() -> Self {
        Self::for_provider(ProviderKind::default())
    }
}
