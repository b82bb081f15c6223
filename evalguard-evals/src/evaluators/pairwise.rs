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

//! Pairwise comparison of two candidates against one reference

use crate::{EvalError, Evaluator};
use evalguard_core::{EvaluationResults, Message, MetricValue};
use std::cmp::Ordering;
use std::sync::Arc;

const METRIC_NAME: &str = "Pairwise String Evaluation";
const PRIMARY_KEY: &str = "candidate_with_higher_score";

/// Scores two candidates with a wrapped evaluator and reports the winner
///
/// The winner is decided on the primary score of each result. Scores that
/// cannot be ordered against each other count as a tie.
pub struct PairwiseStringEvaluator {
    evaluator: Arc<dyn Evaluator>,
}

impl PairwiseStringEvaluator {
    pub fn new(evaluator: Arc<dyn Evaluator>) -> Self {
        Self { evaluator }
    }

    pub async fn evaluate_text(
        &self,
        candidate_a: &str,
        candidate_b: &str,
        reference: &str,
    ) -> Result<EvaluationResults, EvalError> {
        let results_a = self.evaluator.evaluate_text(candidate_a, reference, 1).await?;
        let results_b = self.evaluator.evaluate_text(candidate_b, reference, 1).await?;

        let (score_name, score_a) = primary(&results_a)?;
        let score_b = match results_b.get(score_name) {
            Some(value) => value.clone(),
            None => primary(&results_b)?.1,
        };

        let (winner, text) = match score_a.compare(&score_b) {
            Some(Ordering::Greater) => ("A", candidate_a),
            Some(Ordering::Less) => ("B", candidate_b),
            _ => ("equal", ""),
        };
        tracing::debug!(
            evaluator = self.evaluator.id(),
            winner,
            %score_a,
            %score_b,
            "pairwise comparison"
        );

        Ok(EvaluationResults::from_entries(
            METRIC_NAME,
            [
                (PRIMARY_KEY, MetricValue::from(winner)),
                ("text_candidate_with_higher_score", MetricValue::from(text)),
                ("metric_name", MetricValue::from(results_a.metric_name())),
                ("score_name", MetricValue::from(score_name)),
                ("score_A", score_a),
                ("score_B", score_b),
            ],
        )
        .with_primary(PRIMARY_KEY))
    }

    /// Compare message contents position by position
    pub async fn evaluate_messages(
        &self,
        messages_a: &[Message],
        messages_b: &[Message],
        references: &[String],
    ) -> Result<EvaluationResults, EvalError> {
        if messages_a.len() != messages_b.len() {
            return Err(EvalError::count_mismatch(
                "candidate B messages",
                messages_a.len(),
                messages_b.len(),
            ));
        }
        if messages_a.len() != references.len() {
            return Err(EvalError::count_mismatch(
                "references",
                messages_a.len(),
                references.len(),
            ));
        }

        let mut entries: Vec<(String, MetricValue)> = Vec::new();
        for (idx, ((a, b), reference)) in messages_a
            .iter()
            .zip(messages_b)
            .zip(references)
            .enumerate()
        {
            let results = self.evaluate_text(&a.content, &b.content, reference).await?;
            entries.extend(results.prefixed(&idx.to_string()));
        }

        Ok(EvaluationResults::from_entries(METRIC_NAME, entries)
            .with_primary(format!("0_{}", PRIMARY_KEY)))
    }
}

fn primary(results: &EvaluationResults) -> Result<(&str, MetricValue), EvalError> {
    results
        .primary_score()
        .map(|(key, value)| (key, value.clone()))
        .ok_or_else(|| {
            EvalError::InvalidInput(format!(
                "'{}' produced no primary score to compare",
                results.metric_name()
            ))
        })
}
