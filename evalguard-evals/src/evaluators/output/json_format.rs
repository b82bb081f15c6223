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
use serde_json::error::Category;

const LABEL: &str = "JSON format evaluator";
const METRIC_NAME: &str = "JSON valid format evaluator";

pub const DEPTH_EXCEEDED: &str = "Maximum stack depth exceeded";
pub const STATE_MISMATCH: &str = "Underflow or the modes mismatch";
pub const CONTROL_CHARACTER: &str = "Unexpected control character found";
pub const SYNTAX_ERROR: &str = "Syntax error, malformed JSON";
pub const MALFORMED_ENCODING: &str = "Malformed UTF-8 characters, possibly incorrectly encoded";

/// Checks that a candidate is a single well-formed JSON document
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatEvaluator;

impl JsonFormatEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, candidate: &str) -> EvaluationResults {
        let error = match serde_json::from_str::<serde_json::Value>(candidate) {
            Ok(_) => String::new(),
            Err(e) => classify(candidate, &e).to_string(),
        };
        verdict(METRIC_NAME, error.is_empty(), "error", error)
    }
}

/// Map a parser error onto a stable, human-readable category
fn classify(candidate: &str, err: &serde_json::Error) -> &'static str {
    let message = err.to_string();

    if message.contains("recursion limit exceeded") {
        return DEPTH_EXCEEDED;
    }
    if message.contains("control character") {
        return CONTROL_CHARACTER;
    }
    if message.contains("unicode") || message.contains("surrogate") {
        return MALFORMED_ENCODING;
    }

    match err.classify() {
        // Input ended inside a string literal
        Category::Eof if message.contains("parsing a string") => CONTROL_CHARACTER,
        Category::Syntax if message.contains("expected `,` or") => {
            if closes_wrong_bracket(candidate, err.line(), err.column(), &message) {
                STATE_MISMATCH
            } else {
                SYNTAX_ERROR
            }
        }
        _ => SYNTAX_ERROR,
    }
}

/// Whether the byte at the error position is the other kind of closing bracket
fn closes_wrong_bracket(candidate: &str, line: usize, column: usize, message: &str) -> bool {
    let expected_close = if message.contains("`]`") { b']' } else { b'}' };
    let found = candidate
        .lines()
        .nth(line.saturating_sub(1))
        .and_then(|l| l.as_bytes().get(column.saturating_sub(1)).copied());

    matches!(found, Some(b']') | Some(b'}')) && found != Some(expected_close)
}

#[async_trait]
impl Evaluator for JsonFormatEvaluator {
    fn id(&self) -> &str {
        "json_format_v1"
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
        collect_scores(METRIC_NAME, messages, |c| Ok(self.check(c)))
    }
}
