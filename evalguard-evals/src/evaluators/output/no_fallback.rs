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

const LABEL: &str = "Fallback evaluator";

/// Refusal and clarification phrases, checked in order
pub const FALLBACK_INDICATORS: [&str; 10] = [
    "I'm sorry",
    "I cannot help",
    "I have no information",
    "please provide more details",
    "I need more information",
    "can you clarify",
    "answer some additional questions",
    "as an AI language model",
    "unfortunately, I",
    "unable to assist",
];

/// Fails when the candidate contains a fallback phrase
///
/// Matching is a case-insensitive substring search; the first phrase found
/// in list order is reported as `detectedIndicator`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFallbackAnswerEvaluator;

impl NoFallbackAnswerEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn detect(candidate: &str) -> Option<&'static str> {
        let lowered = candidate.to_lowercase();
        FALLBACK_INDICATORS
            .iter()
            .copied()
            .find(|indicator| lowered.contains(&indicator.to_lowercase()))
    }

    pub fn check(&self, candidate: &str) -> EvaluationResults {
        let detected = Self::detect(candidate);
        verdict(
            "No fallback response evaluator",
            detected.is_none(),
            "detectedIndicator",
            detected.unwrap_or_default().to_string(),
        )
    }
}

#[async_trait]
impl Evaluator for NoFallbackAnswerEvaluator {
    fn id(&self) -> &str {
        "no_fallback_v1"
    }

    async fn evaluate_text(
        &self,
        candidate: &str,
        reference: &str,
        n: usize,
    ) -> Result<EvaluationResults, EvalError> {
        ensure_single_output(LABEL, reference, n)?;
        Ok(self.check(candidate))
    }

    async fn evaluate_messages(
        &self,
        messages: &[Message],
        references: &[String],
        n: usize,
    ) -> Result<EvaluationResults, EvalError> {
        ensure_no_references(LABEL, references, n)?;
        collect_scores("Fallback response evaluator", messages, |c| {
            Ok(self.check(c))
        })
    }
}
