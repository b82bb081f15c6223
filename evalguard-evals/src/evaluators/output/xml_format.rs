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
use serde::{Deserialize, Serialize};

const LABEL: &str = "XML format evaluator";
const METRIC_NAME: &str = "XML valid format evaluator";

/// Severity reported for well-formedness errors
pub const FATAL_LEVEL: u8 = 3;

/// One parser diagnostic, serialized into the `error` entry
///
/// `code` is always 0 and `file` is empty for in-memory input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XmlDiagnostic {
    pub level: u8,
    pub code: u32,
    pub column: u32,
    pub message: String,
    pub file: String,
    pub line: u32,
}

/// Checks that a candidate is a well-formed XML document
///
/// DTDs are rejected, so no entity expansion or external resolution happens.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlFormatEvaluator;

impl XmlFormatEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, candidate: &str) -> Result<EvaluationResults, EvalError> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: false,
            ..roxmltree::ParsingOptions::default()
        };

        match roxmltree::Document::parse_with_options(candidate, options) {
            Ok(_) => Ok(verdict(METRIC_NAME, true, "error", String::new())),
            Err(e) => {
                let pos = e.pos();
                let diagnostics = vec![XmlDiagnostic {
                    level: FATAL_LEVEL,
                    code: 0,
                    column: pos.col,
                    message: e.to_string(),
                    file: String::new(),
                    line: pos.row,
                }];
                let error = serde_json::to_string(&diagnostics)?;
                Ok(verdict(METRIC_NAME, false, "error", error))
            }
        }
    }
}

#[async_trait]
impl Evaluator for XmlFormatEvaluator {
    fn id(&self) -> &str {
        "xml_format_v1"
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

#[cfg(test)]
mod tests {
    use super::*;
    use evalguard_core::MetricValue;

    fn diagnostics(results: &EvaluationResults) -> Vec<XmlDiagnostic> {
        let raw = results.get("error").and_then(MetricValue::as_str).unwrap();
        serde_json::from_str(raw).unwrap()
    }

    #[tokio::test]
    async fn test_valid_xml() {
        let results = XmlFormatEvaluator::new()
            .evaluate_text("<sometag>some content</sometag>", "", 1)
            .await
            .unwrap();

        assert_eq!(results.metric_name(), METRIC_NAME);
        assert_eq!(results.get("score"), Some(&MetricValue::Int(1)));
        assert_eq!(results.get("error"), Some(&MetricValue::from("")));
    }

    #[tokio::test]
    async fn test_missing_closing_tag() {
        let results = XmlFormatEvaluator::new()
            .evaluate_text("<sometag>some content and missing closing tag", "", 1)
            .await
            .unwrap();

        assert_eq!(results.get("score"), Some(&MetricValue::Int(0)));
        let diags = diagnostics(&results);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].level, FATAL_LEVEL);
        assert_eq!(diags[0].line, 1);
        assert!(!diags[0].message.is_empty());
    }

    #[test]
    fn test_diagnostic_json_shape() {
        let results = XmlFormatEvaluator::new().check("<a><b></a>").unwrap();
        let raw = results.get("error").and_then(MetricValue::as_str).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(raw).unwrap();

        let entry = parsed[0].as_object().unwrap();
        let mut keys: Vec<_> = entry.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["code", "column", "file", "level", "line", "message"]);
        assert_eq!(entry["code"], serde_json::json!(0));
        assert_eq!(entry["file"], serde_json::json!(""));
        assert_eq!(entry["level"], serde_json::json!(3));
    }

    #[tokio::test]
    async fn test_leading_prose() {
        let results = XmlFormatEvaluator::new()
            .evaluate_text("Here is XML output: <sometag>some content</sometag>", "", 1)
            .await
            .unwrap();

        assert_eq!(results.get("score"), Some(&MetricValue::Int(0)));
        assert_eq!(diagnostics(&results)[0].line, 1);
    }

    #[test]
    fn test_dtd_rejected() {
        let doc = r#"<?xml version="1.0"?><!DOCTYPE x [<!ENTITY e "boom">]><x>&e;</x>"#;
        let results = XmlFormatEvaluator::new().check(doc).unwrap();
        assert_eq!(results.get("score"), Some(&MetricValue::Int(0)));
    }

    #[tokio::test]
    async fn test_messages() {
        let messages = vec![Message::assistant("<a/>"), Message::assistant("<a>")];
        let results = XmlFormatEvaluator::new()
            .evaluate_messages(&messages, &[], 1)
            .await
            .unwrap();
        assert_eq!(results.get("0"), Some(&MetricValue::Int(1)));
        assert_eq!(results.get("1"), Some(&MetricValue::Int(0)));
    }
}
