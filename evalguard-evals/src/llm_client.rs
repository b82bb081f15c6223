// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Client abstractions for the model-backed collaborators
//!
//! Transport lives outside this crate: provider SDKs implement these traits and
//! hand them to the guardrail pipeline or the embedding distance evaluator.

use async_trait::async_trait;
use thiserror::Error;

/// Trait for chat models that produce a text completion for a prompt
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send a prompt and get the generated text
    async fn generate_text(&self, prompt: &str) -> Result<String, ChatError>;

    /// Get model name
    fn model_name(&self) -> &str {
        "unknown"
    }
}

/// Errors from chat clients
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors from embedding clients
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

/// Trait for embedding clients used in evaluations
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Embed a single text string
    async fn embed(&self, text: &str) -> Result<Vec<f64>, EmbedError>;

    /// Embed a batch of texts
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, EmbedError> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }
}
