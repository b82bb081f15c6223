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

use super::{count_matches, ensure_order, ngrams, split_on_spaces, StringMetric, SCORE_DECIMALS};
use crate::EvalError;
use evalguard_core::{round_to, EvaluationResults};

/// ROUGE score components (precision, recall, F1)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RougeScore {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// ROUGE-N
///
/// recall = overlap / count(ref_ngrams), precision = overlap / count(cand_ngrams)
#[derive(Debug, Clone, Copy, Default)]
pub struct Rouge;

impl Rouge {
    pub fn new() -> Self {
        Self
    }

    /// Unrounded components
    pub fn rouge_n(&self, reference: &str, candidate: &str, n: usize) -> RougeScore {
        let cand_ngrams = ngrams(&split_on_spaces(candidate), n);
        let ref_ngrams = ngrams(&split_on_spaces(reference), n);

        let overlap = count_matches(&cand_ngrams, &ref_ngrams) as f64;
        let recall = overlap / ref_ngrams.len().max(1) as f64;
        let precision = overlap / cand_ngrams.len().max(1) as f64;
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        RougeScore {
            precision,
            recall,
            f1,
        }
    }
}

impl StringMetric for Rouge {
    fn name(&self) -> &'static str {
        "ROUGE"
    }

    fn calculate(
        &self,
        reference: &str,
        candidate: &str,
        n: usize,
    ) -> Result<EvaluationResults, EvalError> {
        ensure_order(self.name(), n)?;
        let score = self.rouge_n(reference, candidate, n);

        Ok(EvaluationResults::from_entries(
            self.name(),
            [
                ("recall", round_to(score.recall, SCORE_DECIMALS)),
                ("precision", round_to(score.precision, SCORE_DECIMALS)),
                ("f1", round_to(score.f1, SCORE_DECIMALS)),
            ],
        )
        .with_primary("f1"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalguard_core::MetricValue;

    #[test]
    fn test_rouge_1_partial_overlap() {
        let results = Rouge::new()
            .calculate(
                "that's the way cookie crumbles",
                "this is the way cookie is crashed",
                1,
            )
            .unwrap();

        assert_eq!(results.metric_name(), "ROUGE");
        let values: Vec<_> = results.results().iter().collect();
        assert_eq!(values[0], (&"recall".to_string(), &MetricValue::Float(0.6)));
        assert_eq!(values[1], (&"precision".to_string(), &MetricValue::Float(0.43)));
        assert_eq!(values[2], (&"f1".to_string(), &MetricValue::Float(0.5)));
    }

    #[test]
    fn test_rouge_1_identical() {
        let text = "The quick brown fox jumps over the lazy dog";
        let score = Rouge::new().rouge_n(text, text, 1);
        assert!((score.precision - 1.0).abs() < 0.001);
        assert!((score.recall - 1.0).abs() < 0.001);
        assert!((score.f1 - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_rouge_no_overlap() {
        let score = Rouge::new().rouge_n("alpha beta", "gamma delta", 2);
        assert_eq!(score, RougeScore::default());
    }

    #[test]
    fn test_rouge_bigrams() {
        let score = Rouge::new().rouge_n("the cat sat on the mat", "the cat is on the mat", 2);
        // "the cat", "on the", "the mat" of 5 bigrams each
        assert!((score.recall - 0.6).abs() < 1e-9);
        assert!((score.precision - 0.6).abs() < 1e-9);
    }
}
