//! Token counting backed by tiktoken-rs.

use llm_codedoc_core::config::ProviderKind;
use llm_codedoc_core::contract::TokenCounter;
use llm_codedoc_core::error::EncodingError;
use tiktoken_rs::{cl100k_base, get_bpe_from_model};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingStrategy {
    /// Look the encoding up from the model name. Unknown models are an error.
    PerModel,
    /// Always `cl100k_base`, for providers whose models tiktoken does not know.
    Cl100kBase,
}

pub struct TiktokenCounter {
    strategy: EncodingStrategy,
}

impl TiktokenCounter {
    pub fn new(strategy: EncodingStrategy) -> Self {
        Self { strategy }
    }

    pub fn for_provider(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::OpenAi => Self::new(EncodingStrategy::PerModel),
            ProviderKind::Groq => Self::new(EncodingStrategy::Cl100kBase),
        }
    }

    pub fn strategy(&self) -> EncodingStrategy {
        self.strategy
    }
}

impl TokenCounter for TiktokenCounter {
    fn count_tokens(&self, text: &str, model: &str) -> Result<usize, EncodingError> {
        let bpe = match self.strategy {
            EncodingStrategy::PerModel => {
                get_bpe_from_model(model).map_err(|e| EncodingError::UnknownModel {
                    model: model.to_string(),
                    reason: e.to_string(),
                })?
            }
            EncodingStrategy::Cl100kBase => cl100k_base().map_err(|e| EncodingError::Encoding {
                encoding: "cl100k_base".to_string(),
                reason: e.to_string(),
            })?,
        };
        let count = bpe.encode_with_special_tokens(text).len();
        debug!(model, strategy = ?self.strategy, tokens = count, "Counted tokens");
        Ok(count)
    }
}
