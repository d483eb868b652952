//! Token counting for assembled documents
//!
//! Maps model names to their BPE encodings so the final document can be
//! sized against a context window before it is pasted anywhere.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumProperty};
use thiserror::Error;
use tiktoken_rs::CoreBPE;

/// Result type for tokenizer operations
pub type TokenizerResult<T> = Result<T, TokenizerError>;

/// Errors that can occur during tokenization
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// Encoding for the model could not be loaded
    #[error("Tokenizer error: {0}")]
    Encoding(String),
}

/// Supported LLM models for tokenization
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    Display,
    ValueEnum,
    Serialize,
    Deserialize,
    EnumProperty,
)]
pub enum Model {
    #[strum(props(model_id = "gpt-4o", context_window = 128000))]
    Gpt4o,

    #[strum(props(model_id = "gpt-4", context_window = 8192))]
    Gpt4,

    #[strum(props(model_id = "gpt-4-0125-preview", context_window = 128000))]
    Gpt4Turbo,

    #[strum(props(model_id = "gpt-3.5-turbo", context_window = 16385))]
    Gpt35Turbo,
}

impl Model {
    /// Get the model identifier as used by the tokenizer library
    pub fn model_id(&self) -> &'static str {
        self.get_str("model_id").unwrap_or("unknown")
    }

    /// Get the context window size for this model
    pub fn context_window(&self) -> usize {
        self.get_int("context_window").unwrap_or(0) as usize
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::Gpt4o
    }
}

/// Tokenizer wrapping the BPE encoding of a specific model
pub struct Tokenizer {
    model: Model,
    encoding: CoreBPE,
}

impl Tokenizer {
    /// Create a tokenizer for the specified model
    pub fn new(model: Model) -> TokenizerResult<Self> {
        let encoding = tiktoken_rs::get_bpe_from_model(model.model_id())
            .map_err(|e| TokenizerError::Encoding(e.to_string()))?;

        Ok(Self { model, encoding })
    }

    /// Count tokens in the given text
    pub fn count_tokens(&self, text: &str) -> usize {
        self.encoding.encode_ordinary(text).len()
    }

    /// The model this tokenizer was built for
    pub fn model(&self) -> Model {
        self.model
    }

    /// Context window of the underlying model
    pub fn context_window(&self) -> usize {
        self.model.context_window()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_model_registry_complete() {
        for model in Model::iter() {
            assert_ne!(model.model_id(), "unknown");
            assert!(model.context_window() > 0);
        }
    }

    #[test]
    fn test_count_tokens() {
        let tokenizer = Tokenizer::new(Model::Gpt4o).unwrap();
        assert_eq!(tokenizer.count_tokens(""), 0);

        let count = tokenizer.count_tokens("Hello, world!");
        assert!(count > 0);
        assert!(count < 10);
    }

    #[test]
    fn test_context_window_passthrough() {
        let tokenizer = Tokenizer::new(Model::Gpt4).unwrap();
        assert_eq!(tokenizer.context_window(), 8192);
        assert_eq!(tokenizer.model(), Model::Gpt4);
    }
}
