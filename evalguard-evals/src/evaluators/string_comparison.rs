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

//! Reference-based evaluator combining ROUGE, BLEU and METEOR

use crate::metrics::{Bleu, Meteor, Rouge, StringMetric};
use crate::{filter_assistant_messages, EvalError, Evaluator};
use async_trait::async_trait;
use evalguard_core::{EvaluationResults, MeteorSettings, Message, MetricValue};

const METRIC_NAME: &str = "String Comparison Evaluation: ROUGE, BLEU, METEOR";
const PRIMARY_KEY: &str = "ROUGE_recall";

/// Runs ROUGE, BLEU and METEOR against a reference
///
/// Keys are prefixed with the metric name (`ROUGE_recall`, `BLEU_score`,
/// `METEOR_fMean`, ...). ROUGE recall is the primary score.
#[derive(Debug, Clone, Default)]
pub struct StringComparisonEvaluator {
    bleu: Bleu,
    rouge: Rouge,
    meteor: Meteor,
}

impl StringComparisonEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(settings: &MeteorSettings) -> Self {
        Self {
            meteor: Meteor::from_settings(settings),
            ..Self::default()
        }
    }

    pub fn calculate_bleu(
        &self,
        reference: &str,
        candidate: &str,
        n: usize,
    ) -> Result<EvaluationResults, EvalError> {
        self.bleu.calculate(reference, candidate, n)
    }

    pub fn calculate_rouge(
        &self,
        reference: &str,
        candidate: &str,
        n: usize,
    ) -> Result<EvaluationResults, EvalError> {
        self.rouge.calculate(reference, candidate, n)
    }

    pub fn calculate_meteor(
        &self,
        reference: &str,
        candidate: &str,
        n: usize,
    ) -> Result<EvaluationResults, EvalError> {
        self.meteor.calculate(reference, candidate, n)
    }

    /// All three metrics with metric-prefixed keys
    pub fn compare(
        &self,
        candidate: &str,
        reference: &str,
        n: usize,
    ) -> Result<EvaluationResults, EvalError> {
        let metrics: [&dyn StringMetric; 3] = [&self.rouge, &self.bleu, &self.meteor];

        let mut entries: Vec<(String, MetricValue)> = Vec::new();
        for metric in metrics {
            let results = metric.calculate(reference, candidate, n)?;
            entries.extend(results.prefixed(results.metric_name()));
        }

        Ok(EvaluationResults::from_entries(METRIC_NAME, entries).with_primary(PRIMARY_KEY))
    }
}

#[async_trait]
impl Evaluator for StringComparisonEvaluator {
    fn id(&self) -> &str {
        "string_comparison_v1"
    }

    async fn evaluate_text(
        &self,
        candidate: &str,
        reference: &str,
        n: usize,
    ) -> Result<EvaluationResults, EvalError> {
        self.compare(candidate, reference, n)
    }

    async fn evaluate_messages(
        &self,
        messages: &[Message],
        references: &[String],
        n: usize,
    ) -> Result<EvaluationResults, EvalError> {
        let candidates = filter_assistant_messages(messages);
        if candidates.len() != references.len() {
            return Err(EvalError::count_mismatch(
                "assistant messages and references",
                candidates.len(),
                references.len(),
            ));
        }

        let mut entries: Vec<(String, MetricValue)> = Vec::new();
        for (idx, (candidate, reference)) in candidates.iter().zip(references).enumerate() {
            let results = self.compare(candidate, reference, n)?;
            entries.extend(results.prefixed(&idx.to_string()));
        }

        Ok(EvaluationResults::from_entries(METRIC_NAME, entries)
            .with_primary(format!("0_{}", PRIMARY_KEY)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &str = "The quick brown fox jumps over the lazy dog";
    const CANDIDATE: &str = "The quick brown dog jumps over the lazy fox";

    #[tokio::test]
    async fn test_evaluate_text_combines_metrics() {
        let results = StringComparisonEvaluator::new()
            .evaluate_text(CANDIDATE, REFERENCE, 1)
            .await
            .unwrap();

        assert_eq!(results.metric_name(), METRIC_NAME);
        let keys: Vec<_> = results.results().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "ROUGE_recall",
                "ROUGE_precision",
                "ROUGE_f1",
                "BLEU_score",
                "METEOR_score",
                "METEOR_precision",
                "METEOR_recall",
                "METEOR_chunks",
                "METEOR_penalty",
                "METEOR_fMean",
            ]
        );
        assert_eq!(results.get("ROUGE_f1"), Some(&MetricValue::Float(1.0)));
        assert_eq!(results.get("BLEU_score"), Some(&MetricValue::Float(1.0)));
        assert_eq!(results.get("METEOR_score"), Some(&MetricValue::Float(0.96)));
        assert_eq!(results.get("METEOR_chunks"), Some(&MetricValue::Int(4)));
        assert_eq!(
            results.primary_score(),
            Some(("ROUGE_recall", &MetricValue::Float(1.0)))
        );
    }

    #[tokio::test]
    async fn test_evaluate_messages_prefixes_index() {
        let messages = vec![Message::user("repeat"), Message::assistant(CANDIDATE)];
        let results = StringComparisonEvaluator::new()
            .evaluate_messages(&messages, &[REFERENCE.to_string()], 1)
            .await
            .unwrap();

        assert_eq!(results.len(), 10);
        assert_eq!(results.get("0_ROUGE_recall"), Some(&MetricValue::Float(1.0)));
        assert_eq!(results.get("0_METEOR_score"), Some(&MetricValue::Float(0.96)));
    }

    #[tokio::test]
    async fn test_evaluate_messages_count_mismatch() {
        let err = StringComparisonEvaluator::new()
            .evaluate_messages(&[Message::assistant("a")], &[], 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EvalError::CountMismatch {
                expected: 1,
                actual: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_individual_metrics() {
        let evaluator = StringComparisonEvaluator::new();
        let rouge = evaluator
            .calculate_rouge(
                "that's the way cookie crumbles",
                "this is the way cookie is crashed",
                1,
            )
            .unwrap();
        assert_eq!(rouge.get("precision"), Some(&MetricValue::Float(0.43)));

        let bleu = evaluator
            .calculate_bleu(
                "that's the way cookie crumbles",
                "this is the way bla bla bla",
                1,
            )
            .unwrap();
        assert_eq!(bleu.get("score"), Some(&MetricValue::Float(0.29)));

        let meteor = evaluator.calculate_meteor(REFERENCE, CANDIDATE, 1).unwrap();
        assert_eq!(meteor.get("score"), Some(&MetricValue::Float(0.96)));
    }

    #[test]
    fn test_zero_order_propagates() {
        assert!(StringComparisonEvaluator::new().compare("a", "a", 0).is_err());
    }
}
