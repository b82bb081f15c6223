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

//! Output format and constraint evaluators
//!
//! Predicate-style scorers over a single candidate. Each result carries an
//! integer `score` (1 = pass, 0 = fail) as its primary entry plus a
//! diagnostic string. None of them take a reference or an n-gram order.
//!
//! Scoring a message list keeps only assistant messages and returns their
//! scores keyed `"0"`, `"1"`, ... in order.

pub mod json_format;
pub mod no_fallback;
pub mod regex_pattern;
pub mod token_limit;
pub mod word_limit;
pub mod xml_format;

pub use json_format::JsonFormatEvaluator;
pub use no_fallback::{NoFallbackAnswerEvaluator, FALLBACK_INDICATORS};
pub use regex_pattern::{ShouldMatchRegexPatternEvaluator, ShouldNotMatchRegexPatternEvaluator};
pub use token_limit::TokenLimitEvaluator;
pub use word_limit::WordLimitEvaluator;
pub use xml_format::XmlFormatEvaluator;

use crate::{filter_assistant_messages, EvalError};
use evalguard_core::{EvaluationResults, Message, MetricValue};

/// Primary key of every output evaluator result
pub const SCORE_KEY: &str = "score";

pub(crate) fn ensure_single_output(label: &str, reference: &str, n: usize) -> Result<(), EvalError> {
    if !reference.is_empty() {
        return Err(EvalError::InvalidInput(format!(
            "{} takes only output text as argument",
            label
        )));
    }
    ensure_unigram(label, n)
}

pub(crate) fn ensure_no_references(
    label: &str,
    references: &[String],
    n: usize,
) -> Result<(), EvalError> {
    if !references.is_empty() {
        return Err(EvalError::InvalidInput(format!(
            "{} takes only output texts as argument",
            label
        )));
    }
    ensure_unigram(label, n)
}

fn ensure_unigram(label: &str, n: usize) -> Result<(), EvalError> {
    if n != 1 {
        return Err(EvalError::InvalidInput(format!(
            "{} doesn't support N-grams",
            label
        )));
    }
    Ok(())
}

/// Pass/fail result with a diagnostic entry
pub(crate) fn verdict(
    metric_name: &str,
    passed: bool,
    detail_key: &str,
    detail: String,
) -> EvaluationResults {
    EvaluationResults::from_entries(
        metric_name,
        [
            (SCORE_KEY, MetricValue::Int(i64::from(passed))),
            (detail_key, MetricValue::String(detail)),
        ],
    )
    .with_primary(SCORE_KEY)
}

/// Score each assistant message with `check` and index the scores
pub(crate) fn collect_scores<F>(
    metric_name: &str,
    messages: &[Message],
    mut check: F,
) -> Result<EvaluationResults, EvalError>
where
    F: FnMut(&str) -> Result<EvaluationResults, EvalError>,
{
    let mut scores = Vec::new();
    for (idx, content) in filter_assistant_messages(messages).iter().enumerate() {
        let single = check(content)?;
        let score = single
            .get(SCORE_KEY)
            .cloned()
            .unwrap_or(MetricValue::Int(0));
        scores.push((idx.to_string(), score));
    }
    Ok(EvaluationResults::from_entries(metric_name, scores))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guards() {
        assert!(ensure_single_output("X", "", 1).is_ok());
        assert!(ensure_single_output("X", "ref", 1).is_err());
        assert!(ensure_single_output("X", "", 2).is_err());
        assert!(ensure_no_references("X", &["r".to_string()], 1).is_err());
        assert!(ensure_no_references("X", &[], 0).is_err());
    }

    #[test]
    fn test_collect_scores_only_assistant() {
        let messages = vec![
            Message::user("ignored"),
            Message::assistant("ok"),
            Message::assistant(""),
        ];
        let results = collect_scores("len", &messages, |c| {
            Ok(verdict("len", !c.is_empty(), "error", String::new()))
        })
        .unwrap();

        let keys: Vec<_> = results.results().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["0", "1"]);
        assert_eq!(results.get("0"), Some(&MetricValue::Int(1)));
        assert_eq!(results.get("1"), Some(&MetricValue::Int(0)));
    }
}
