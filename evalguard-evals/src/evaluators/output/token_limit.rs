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

use super::{collect_scores, ensure_no_references, ensure_single_output, verdict};
use crate::tokenizer::{encoder_for_vocabulary, TokenEncoder};
use crate::{EvalError, Evaluator};
use async_trait::async_trait;
use evalguard_core::{EvaluationResults, Message, TokenLimitSettings, DEFAULT_VOCABULARY};
use parking_lot::RwLock;
use std::sync::Arc;

const LABEL: &str = "Token limit evaluator";
const METRIC_NAME: &str = "Token limit evaluator";

/// Passes when the candidate encodes to fewer tokens than the limit
///
/// The encoder for the configured vocabulary is built on first use and cached.
pub struct TokenLimitEvaluator {
    vocabulary: String,
    encoder: RwLock<Option<Arc<dyn TokenEncoder>>>,
    token_limit: usize,
}

impl TokenLimitEvaluator {
    pub fn new() -> Self {
        Self::for_vocabulary(DEFAULT_VOCABULARY)
    }

    /// Count tokens with a named tiktoken vocabulary
    pub fn for_vocabulary(vocabulary: impl Into<String>) -> Self {
        Self {
            vocabulary: vocabulary.into(),
            encoder: RwLock::new(None),
            token_limit: 0,
        }
    }

    pub fn from_config(settings: &TokenLimitSettings) -> Self {
        Self::for_vocabulary(settings.vocabulary.clone())
    }

    /// Count tokens with a caller-supplied encoder
    pub fn with_encoder(mut self, encoder: Arc<dyn TokenEncoder>) -> Self {
        self.encoder = RwLock::new(Some(encoder));
        self
    }

    pub fn with_token_limit(mut self, token_limit: usize) -> Self {
        self.token_limit = token_limit;
        self
    }

    pub fn set_token_limit(&mut self, token_limit: usize) -> &mut Self {
        self.token_limit = token_limit;
        self
    }

    pub fn token_limit(&self) -> usize {
        self.token_limit
    }

    pub fn vocabulary(&self) -> &str {
        &self.vocabulary
    }

    fn encoder(&self) -> Result<Arc<dyn TokenEncoder>, EvalError> {
        if let Some(encoder) = self.encoder.read().as_ref() {
            return Ok(Arc::clone(encoder));
        }

        let mut slot = self.encoder.write();
        if let Some(encoder) = slot.as_ref() {
            return Ok(Arc::clone(encoder));
        }
        tracing::debug!(vocabulary = %self.vocabulary, "building token encoder");
        let encoder = encoder_for_vocabulary(&self.vocabulary)?;
        *slot = Some(Arc::clone(&encoder));
        Ok(encoder)
    }

    pub fn check(&self, candidate: &str) -> Result<EvaluationResults, EvalError> {
        if self.token_limit == 0 {
            return Err(EvalError::MissingConfiguration(
                "use TokenLimitEvaluator::set_token_limit to specify token limit".to_string(),
            ));
        }

        let num_tokens = self.encoder()?.count_tokens(candidate);
        let passed = num_tokens < self.token_limit;
        let error = if passed {
            String::new()
        } else {
            format!(
                "Generated {} tokens is grater than limit of {}",
                num_tokens, self.token_limit
            )
        };
        Ok(verdict(METRIC_NAME, passed, "error", error))
    }
}

impl Default for TokenLimitEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Evaluator for TokenLimitEvaluator {
    fn id(&self) -> &str {
        "token_limit_v1"
    }

    async fn evaluate_text(
        &self,
        candidate: &str,
        reference: &str,
        n: usize,
    ) -> Result<EvaluationResults, EvalError> {
        ensure_single_output(LABEL, reference, n)?;
        self.check(candidate)
    }

    async fn evaluate_messages(
        &self,
        messages: &[Message],
        references: &[String],
        n: usize,
    ) -> Result<EvaluationResults, EvalError> {
        ensure_no_references(LABEL, references, n)?;
        collect_scores(METRIC_NAME, messages, |c| self.check(c))
    }
}
