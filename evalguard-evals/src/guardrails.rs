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

//! Guardrail pipeline around a chat client
//!
//! A generated response is checked against an ordered chain of strategies.
//! Each strategy pairs an evaluator with a policy for a failing check:
//!
//! - **Block**: give up and return the strategy's default message
//! - **Retry**: regenerate and check again with the same strategy, bounded
//!   by a retry budget that resets whenever a check passes
//! - **Callback**: replace the response with `callback(response, prompt)`
//!
//! A check passes when the primary score of the evaluator's result is 1.

use crate::llm_client::ChatClient;
use crate::{EvalError, Evaluator};
use evalguard_core::{GuardrailSettings, Message};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Rewrites a failing response; receives `(response, prompt)`
pub type GuardrailCallback = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

/// What to do when a strategy's check fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Block,
    Retry,
    Callback,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Block => "block",
            StrategyKind::Retry => "retry",
            StrategyKind::Callback => "callback",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "block" => Ok(StrategyKind::Block),
            "retry" => Ok(StrategyKind::Retry),
            "callback" => Ok(StrategyKind::Callback),
            other => Err(EvalError::InvalidInput(format!(
                "Unknown strategy: {}",
                other
            ))),
        }
    }
}

/// One entry of the strategy chain
#[derive(Clone)]
pub struct GuardrailStrategy {
    evaluator: Arc<dyn Evaluator>,
    kind: StrategyKind,
    callback: Option<GuardrailCallback>,
    default_message: String,
}

impl GuardrailStrategy {
    pub fn new(
        evaluator: Arc<dyn Evaluator>,
        kind: StrategyKind,
        default_message: impl Into<String>,
    ) -> Self {
        Self {
            evaluator,
            kind,
            callback: None,
            default_message: default_message.into(),
        }
    }

    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    pub fn evaluator(&self) -> &Arc<dyn Evaluator> {
        &self.evaluator
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn callback(&self) -> Option<&GuardrailCallback> {
        self.callback.as_ref()
    }

    pub fn default_message(&self) -> &str {
        &self.default_message
    }
}

impl fmt::Debug for GuardrailStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardrailStrategy")
            .field("evaluator", &self.evaluator.id())
            .field("kind", &self.kind)
            .field("has_callback", &self.callback.is_some())
            .field("default_message", &self.default_message)
            .finish()
    }
}

/// Generates text through a chat client and enforces the strategy chain
pub struct Guardrails {
    client: Arc<dyn ChatClient>,
    strategies: Vec<GuardrailStrategy>,
    settings: GuardrailSettings,
}

impl Guardrails {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self::from_config(client, &GuardrailSettings::default())
    }

    pub fn from_config(client: Arc<dyn ChatClient>, settings: &GuardrailSettings) -> Self {
        Self {
            client,
            strategies: Vec::new(),
            settings: settings.clone(),
        }
    }

    /// Register a strategy using the configured default message
    pub fn add_strategy(&mut self, evaluator: Arc<dyn Evaluator>, kind: StrategyKind) -> &mut Self {
        let strategy = GuardrailStrategy::new(evaluator, kind, self.settings.default_message.clone());
        self.push_strategy(strategy)
    }

    /// Register a callback strategy
    pub fn add_callback_strategy<F>(&mut self, evaluator: Arc<dyn Evaluator>, callback: F) -> &mut Self
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        let strategy = GuardrailStrategy::new(
            evaluator,
            StrategyKind::Callback,
            self.settings.default_message.clone(),
        )
        .with_callback(callback);
        self.push_strategy(strategy)
    }

    pub fn push_strategy(&mut self, strategy: GuardrailStrategy) -> &mut Self {
        self.strategies.push(strategy);
        self
    }

    pub fn strategies(&self) -> &[GuardrailStrategy] {
        &self.strategies
    }

    pub fn settings(&self) -> &GuardrailSettings {
        &self.settings
    }

    /// Generate with the configured retry ceiling and callback behaviour
    pub async fn generate_text(&self, prompt: &str) -> Result<String, EvalError> {
        self.generate_text_with(
            prompt,
            self.settings.max_retry,
            self.settings.return_after_callback,
        )
        .await
    }

    /// Generate a response and run it through the strategy chain
    ///
    /// `max_retry` bounds consecutive failed checks of retry strategies.
    /// With `return_after_callback` the first callback result is returned
    /// as is; otherwise it continues through the remaining strategies.
    pub async fn generate_text_with(
        &self,
        prompt: &str,
        max_retry: u32,
        return_after_callback: bool,
    ) -> Result<String, EvalError> {
        if self.strategies.is_empty() {
            return Err(EvalError::EmptyStrategyChain);
        }

        let mut queue: VecDeque<usize> = (0..self.strategies.len()).collect();
        let mut retries_left = max_retry;
        let mut response = self.client.generate_text(prompt).await?;

        while let Some(idx) = queue.pop_front() {
            let strategy = &self.strategies[idx];
            if self.passes(strategy, prompt, &response).await? {
                retries_left = max_retry;
                continue;
            }

            match strategy.kind {
                StrategyKind::Block => {
                    info!(evaluator = strategy.evaluator.id(), "guardrail blocked response");
                    return Ok(strategy.default_message.clone());
                }
                StrategyKind::Retry => {
                    retries_left = retries_left.saturating_sub(1);
                    if retries_left == 0 {
                        info!(
                            evaluator = strategy.evaluator.id(),
                            max_retry, "guardrail retry budget exhausted"
                        );
                        return Ok(strategy.default_message.clone());
                    }
                    info!(
                        evaluator = strategy.evaluator.id(),
                        retries_left, "guardrail regenerating response"
                    );
                    queue.push_front(idx);
                    response = self.client.generate_text(prompt).await?;
                }
                StrategyKind::Callback => {
                    let callback = strategy.callback.as_ref().ok_or(EvalError::MissingCallback)?;
                    response = callback(&response, prompt);
                    info!(
                        evaluator = strategy.evaluator.id(),
                        "guardrail callback replaced response"
                    );
                    if return_after_callback || queue.is_empty() {
                        return Ok(response);
                    }
                }
            }
        }

        Ok(response)
    }

    async fn passes(
        &self,
        strategy: &GuardrailStrategy,
        prompt: &str,
        response: &str,
    ) -> Result<bool, EvalError> {
        let conversation = [Message::user(prompt), Message::assistant(response)];
        let results = strategy
            .evaluator
            .evaluate_messages(&conversation, &[], 1)
            .await?;

        let score = results.primary_score().and_then(|(_, value)| value.as_i64());
        debug!(
            evaluator = strategy.evaluator.id(),
            kind = %strategy.kind,
            ?score,
            "guardrail check"
        );
        Ok(score == Some(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluators::{JsonFormatEvaluator, WordLimitEvaluator};
    use crate::llm_client::ChatError;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct ScriptedChat {
        answers: Mutex<VecDeque<String>>,
        calls: Mutex<usize>,
    }

    impl ScriptedChat {
        fn new(answers: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
                calls: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedChat {
        async fn generate_text(&self, _prompt: &str) -> Result<String, ChatError> {
            *self.calls.lock() += 1;
            self.answers
                .lock()
                .pop_front()
                .ok_or_else(|| ChatError::InvalidResponse("script exhausted".to_string()))
        }
    }

    #[test]
    fn test_strategy_kind_parsing() {
        assert_eq!("retry".parse::<StrategyKind>().unwrap(), StrategyKind::Retry);
        assert_eq!(StrategyKind::Callback.to_string(), "callback");

        let err = "ignore".parse::<StrategyKind>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: Unknown strategy: ignore");
    }

    #[tokio::test]
    async fn test_empty_chain() {
        let guardrails = Guardrails::new(ScriptedChat::new(&["x"]));
        let err = guardrails.generate_text("prompt").await.unwrap_err();
        assert!(matches!(err, EvalError::EmptyStrategyChain));
    }

    #[tokio::test]
    async fn test_passing_response_is_returned() {
        let mut guardrails = Guardrails::new(ScriptedChat::new(&["{\"ok\":true}"]));
        guardrails.add_strategy(Arc::new(JsonFormatEvaluator::new()), StrategyKind::Block);

        assert_eq!(
            guardrails.generate_text("prompt").await.unwrap(),
            "{\"ok\":true}"
        );
    }

    #[tokio::test]
    async fn test_retry_budget_exhausted() {
        let chat = ScriptedChat::new(&["nope", "still no", "never", "unused"]);
        let mut guardrails = Guardrails::new(chat.clone());
        guardrails.add_strategy(Arc::new(JsonFormatEvaluator::new()), StrategyKind::Retry);

        let response = guardrails.generate_text_with("prompt", 3, true).await.unwrap();
        assert_eq!(response, evalguard_core::DEFAULT_GUARDRAIL_MESSAGE);
        assert_eq!(*chat.calls.lock(), 3);
    }

    #[tokio::test]
    async fn test_missing_callback() {
        let mut guardrails = Guardrails::new(ScriptedChat::new(&["not json"]));
        guardrails.add_strategy(Arc::new(JsonFormatEvaluator::new()), StrategyKind::Callback);

        let err = guardrails.generate_text("prompt").await.unwrap_err();
        assert!(matches!(err, EvalError::MissingCallback));
    }

    #[tokio::test]
    async fn test_custom_default_message() {
        let mut guardrails = Guardrails::new(ScriptedChat::new(&["far too many words"]));
        guardrails.push_strategy(GuardrailStrategy::new(
            Arc::new(WordLimitEvaluator::new().with_word_limit(2)),
            StrategyKind::Block,
            "Too long.",
        ));

        assert_eq!(guardrails.generate_text("prompt").await.unwrap(), "Too long.");
    }

    #[tokio::test]
    async fn test_evaluator_error_propagates() {
        let mut guardrails = Guardrails::new(ScriptedChat::new(&["text"]));
        guardrails.add_strategy(Arc::new(WordLimitEvaluator::new()), StrategyKind::Block);

        let err = guardrails.generate_text("prompt").await.unwrap_err();
        assert!(matches!(err, EvalError::MissingConfiguration(_)));
    }

    #[tokio::test]
    async fn test_chat_error_propagates() {
        let mut guardrails = Guardrails::new(ScriptedChat::new(&[]));
        guardrails.add_strategy(Arc::new(JsonFormatEvaluator::new()), StrategyKind::Block);

        let err = guardrails.generate_text("prompt").await.unwrap_err();
        assert!(matches!(err, EvalError::Chat(_)));
    }
}
