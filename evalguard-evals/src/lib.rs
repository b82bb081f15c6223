// Copyright 2025 AgentReplay (https://github.com/agentreplay)
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

//! # Evalguard Evaluation Framework
//!
//! Deterministic scoring for LLM output plus a guardrail pipeline built on top of it.
//!
//! ## Features
//!
//! - **Trait-based evaluator system**: every evaluator scores a text, a message list
//!   or a whole chat session and returns [`EvaluationResults`]
//! - **String metrics**: BLEU, ROUGE and METEOR against a reference
//! - **Output validators**: JSON/XML validity, regex, token and word limits, fallback phrases
//! - **Trajectory scoring**: weighted multi-step scoring of prompt/response sequences
//! - **Guardrails**: ordered block / retry / callback policies around a chat client
//!
//! ## Example
//!
//! ```rust,ignore
//! use evalguard_evals::guardrails::{Guardrails, StrategyKind};
//! use evalguard_evals::evaluators::JsonFormatEvaluator;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut guardrails = Guardrails::new(chat_client);
//!     guardrails.add_strategy(Arc::new(JsonFormatEvaluator::new()), StrategyKind::Retry);
//!
//!     let answer = guardrails.generate_text("Reply with a JSON object").await.unwrap();
//! }
//! ```

use async_trait::async_trait;
use evalguard_core::{ChatRole, ChatSession, Message};
use thiserror::Error;

pub mod evaluators;
pub mod guardrails;
pub mod llm_client;
pub mod metrics;
pub mod tokenizer;

pub use evalguard_core::{EvaluationResults, MetricValue};
pub use guardrails::{GuardrailStrategy, Guardrails, StrategyKind};
pub use llm_client::{ChatClient, ChatError, EmbedError, EmbeddingClient};

/// Core trait that all evaluators must implement
///
/// `n` is the n-gram order for metrics that support it; evaluators that score a
/// single output reject anything but `1`.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Unique identifier for this evaluator (e.g., "json_format_v1")
    fn id(&self) -> &str;

    /// Score one candidate text against an optional reference
    async fn evaluate_text(
        &self,
        candidate: &str,
        reference: &str,
        n: usize,
    ) -> Result<EvaluationResults, EvalError>;

    /// Score a conversation against per-message references
    async fn evaluate_messages(
        &self,
        messages: &[Message],
        references: &[String],
        n: usize,
    ) -> Result<EvaluationResults, EvalError>;

    /// Score the history of a chat session
    async fn evaluate_chat_session(
        &self,
        session: &dyn ChatSession,
        references: &[String],
        n: usize,
    ) -> Result<EvaluationResults, EvalError> {
        self.evaluate_messages(session.history(), references, n)
            .await
    }
}

/// Contents of assistant messages, in order
pub fn filter_assistant_messages(messages: &[Message]) -> Vec<String> {
    filter_role(messages, ChatRole::Assistant)
}

/// Contents of user messages, in order
pub fn filter_user_messages(messages: &[Message]) -> Vec<String> {
    filter_role(messages, ChatRole::User)
}

fn filter_role(messages: &[Message], role: ChatRole) -> Vec<String> {
    messages
        .iter()
        .filter(|m| m.role == role)
        .map(|m| m.content.clone())
        .collect()
}

/// Errors that can occur during evaluation
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{what}: expected {expected}, got {actual}")]
    CountMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Trajectory ID '{0}' not found")]
    TrajectoryNotFound(String),

    #[error("No guardrail strategies registered")]
    EmptyStrategyChain,

    #[error("Missing callback function for callback strategy")]
    MissingCallback,

    #[error("Chat client error: {0}")]
    Chat(#[from] ChatError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbedError),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EvalError {
    pub(crate) fn count_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        EvalError::CountMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }

    /// Whether the error points at a call-site or setup defect rather than a
    /// failing collaborator
    pub fn is_usage_error(&self) -> bool {
        !matches!(
            self,
            EvalError::Chat(_) | EvalError::Embedding(_) | EvalError::Tokenizer(_)
        )
    }
}
