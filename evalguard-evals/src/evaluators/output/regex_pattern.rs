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
use crate::{EvalError, Evaluator};
use async_trait::async_trait;
use evalguard_core::{EvaluationResults, Message};
use regex::Regex;

const LABEL: &str = "Regex pattern evaluator";
const AGGREGATE_NAME: &str = "Regex pattern evaluator";

fn compile(pattern: &str) -> Result<Regex, EvalError> {
    Regex::new(pattern).map_err(|source| EvalError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn require_pattern(pattern: Option<&Regex>) -> Result<&Regex, EvalError> {
    pattern.ok_or_else(|| {
        EvalError::MissingConfiguration(
            "specify regex pattern with set_pattern or with_pattern".to_string(),
        )
    })
}

/// Passes when the configured pattern matches the candidate
#[derive(Debug, Clone, Default)]
pub struct ShouldMatchRegexPatternEvaluator {
    pattern: Option<Regex>,
}

impl ShouldMatchRegexPatternEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Self::set_pattern`]
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, EvalError> {
        self.set_pattern(pattern)?;
        Ok(self)
    }

    pub fn set_pattern(&mut self, pattern: &str) -> Result<&mut Self, EvalError> {
        self.pattern = Some(compile(pattern)?);
        Ok(self)
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(Regex::as_str)
    }

    pub fn check(&self, candidate: &str) -> Result<EvaluationResults, EvalError> {
        let pattern = require_pattern(self.pattern.as_ref())?;
        let matched = pattern.is_match(candidate);
        let error = if matched {
            String::new()
        } else {
            format!(
                "Regex pattern {} doesn't match text: {}.",
                pattern.as_str(),
                candidate
            )
        };
        Ok(verdict(
            "Regex pattern should match evaluator",
            matched,
            "error",
            error,
        ))
    }
}

#[async_trait]
impl Evaluator for ShouldMatchRegexPatternEvaluator {
    fn id(&self) -> &str {
        "regex_should_match_v1"
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
        collect_scores(AGGREGATE_NAME, messages, |c| self.check(c))
    }
}

/// Passes when the configured pattern does not match the candidate
#[derive(Debug, Clone, Default)]
pub struct ShouldNotMatchRegexPatternEvaluator {
    pattern: Option<Regex>,
}

impl ShouldNotMatchRegexPatternEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, EvalError> {
        self.set_pattern(pattern)?;
        Ok(self)
    }

    pub fn set_pattern(&mut self, pattern: &str) -> Result<&mut Self, EvalError> {
        self.pattern = Some(compile(pattern)?);
        Ok(self)
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(Regex::as_str)
    }

    pub fn check(&self, candidate: &str) -> Result<EvaluationResults, EvalError> {
        let pattern = require_pattern(self.pattern.as_ref())?;
        let matched = pattern.is_match(candidate);
        let error = if matched {
            format!(
                "Regex pattern {} matches text: {}.",
                pattern.as_str(),
                candidate
            )
        } else {
            String::new()
        };
        Ok(verdict(
            "Regex pattern should not match evaluator",
            !matched,
            "error",
            error,
        ))
    }
}

#[async_trait]
impl Evaluator for ShouldNotMatchRegexPatternEvaluator {
    fn id(&self) -> &str {
        "regex_should_not_match_v1"
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
        collect_scores(AGGREGATE_NAME, messages, |c| self.check(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalguard_core::MetricValue;

    const OUTPUT: &str = "once upon a time pink elephant jumped over a table";

    #[tokio::test]
    async fn test_should_match() {
        let evaluator = ShouldMatchRegexPatternEvaluator::new()
            .with_pattern("pink elephant")
            .unwrap();
        let results = evaluator.evaluate_text(OUTPUT, "", 1).await.unwrap();

        assert_eq!(results.metric_name(), "Regex pattern should match evaluator");
        assert_eq!(results.get("score"), Some(&MetricValue::Int(1)));
        assert_eq!(results.get("error"), Some(&MetricValue::from("")));
    }

    #[tokio::test]
    async fn test_should_match_fails() {
        let evaluator = ShouldMatchRegexPatternEvaluator::new()
            .with_pattern("pink giraffe")
            .unwrap();
        let results = evaluator.evaluate_text(OUTPUT, "", 1).await.unwrap();

        assert_eq!(results.get("score"), Some(&MetricValue::Int(0)));
        assert_eq!(
            results.get("error"),
            Some(&MetricValue::from(
                "Regex pattern pink giraffe doesn't match text: once upon a time pink elephant jumped over a table."
            ))
        );
    }

    #[tokio::test]
    async fn test_should_not_match() {
        let mut evaluator = ShouldNotMatchRegexPatternEvaluator::new();
        evaluator.set_pattern("pink elephant").unwrap();
        let results = evaluator.evaluate_text(OUTPUT, "", 1).await.unwrap();

        assert_eq!(results.metric_name(), "Regex pattern should not match evaluator");
        assert_eq!(results.get("score"), Some(&MetricValue::Int(0)));
        assert_eq!(
            results.get("error"),
            Some(&MetricValue::from(
                "Regex pattern pink elephant matches text: once upon a time pink elephant jumped over a table."
            ))
        );

        evaluator.set_pattern("pink giraffe").unwrap();
        let results = evaluator.evaluate_text(OUTPUT, "", 1).await.unwrap();
        assert_eq!(results.get("score"), Some(&MetricValue::Int(1)));
        assert_eq!(results.get("error"), Some(&MetricValue::from("")));
    }

    #[tokio::test]
    async fn test_missing_pattern() {
        let err = ShouldMatchRegexPatternEvaluator::new()
            .evaluate_text(OUTPUT, "", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, EvalError::MissingConfiguration(_)));

        let err = ShouldNotMatchRegexPatternEvaluator::new()
            .evaluate_text(OUTPUT, "", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, EvalError::MissingConfiguration(_)));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = ShouldMatchRegexPatternEvaluator::new()
            .with_pattern("(unclosed")
            .unwrap_err();
        assert!(matches!(err, EvalError::InvalidPattern { .. }));
    }

    #[tokio::test]
    async fn test_messages_aggregate() {
        let evaluator = ShouldNotMatchRegexPatternEvaluator::new()
            .with_pattern(r"[A-Z]")
            .unwrap();
        let messages = vec![Message::assistant("lower"), Message::assistant("Upper")];
        let results = evaluator.evaluate_messages(&messages, &[], 1).await.unwrap();

        assert_eq!(results.metric_name(), AGGREGATE_NAME);
        assert_eq!(results.get("0"), Some(&MetricValue::Int(1)));
        assert_eq!(results.get("1"), Some(&MetricValue::Int(0)));
    }
}
