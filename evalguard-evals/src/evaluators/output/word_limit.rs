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
use std::sync::LazyLock;

const LABEL: &str = "Word limit evaluator";
const METRIC_NAME: &str = "Word limit evaluator";

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{L}+").expect("Invalid word regex"));

/// Number of Unicode letter runs in `text`
pub fn count_words(text: &str) -> usize {
    WORD_RE.find_iter(text).count()
}

/// Passes when the candidate has fewer words than the limit
#[derive(Debug, Clone, Default)]
pub struct WordLimitEvaluator {
    word_limit: usize,
}

impl WordLimitEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_word_limit(mut self, word_limit: usize) -> Self {
        self.word_limit = word_limit;
        self
    }

    pub fn set_word_limit(&mut self, word_limit: usize) -> &mut Self {
        self.word_limit = word_limit;
        self
    }

    pub fn word_limit(&self) -> usize {
        self.word_limit
    }

    pub fn check(&self, candidate: &str) -> Result<EvaluationResults, EvalError> {
        if self.word_limit == 0 {
            return Err(EvalError::MissingConfiguration(
                "use WordLimitEvaluator::set_word_limit to specify word limit".to_string(),
            ));
        }

        let num_words = count_words(candidate);
        let passed = num_words < self.word_limit;
        let error = if passed {
            String::new()
        } else {
            format!(
                "Generated {} words is grater than limit of {}",
                num_words, self.word_limit
            )
        };
        Ok(verdict(METRIC_NAME, passed, "error", error))
    }
}

#[async_trait]
impl Evaluator for WordLimitEvaluator {
    fn id(&self) -> &str {
        "word_limit_v1"
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
