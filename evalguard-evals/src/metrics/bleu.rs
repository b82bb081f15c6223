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

/// BLEU with brevity penalty
///
/// BLEU = BP × (∏ pₙ)^(1/N)
/// BP = 1 if c > r, else exp(1 - r/c)
#[derive(Debug, Clone, Copy, Default)]
pub struct Bleu;

impl Bleu {
    pub fn new() -> Self {
        Self
    }

    /// Unrounded score
    pub fn score(&self, reference: &str, candidate: &str, max_n: usize) -> f64 {
        let cand_tokens = split_on_spaces(candidate);
        let ref_tokens = split_on_spaces(reference);

        let precision: f64 = (1..=max_n)
            .map(|n| {
                let cand_ngrams = ngrams(&cand_tokens, n);
                let ref_ngrams = ngrams(&ref_tokens, n);
                count_matches(&cand_ngrams, &ref_ngrams) as f64 / cand_ngrams.len().max(1) as f64
            })
            .product();

        let bp = if cand_tokens.len() > ref_tokens.len() {
            1.0
        } else {
            (1.0 - ref_tokens.len() as f64 / cand_tokens.len().max(1) as f64).exp()
        };

        bp * precision.powf(1.0 / max_n as f64)
    }
}

impl StringMetric for Bleu {
    fn name(&self) -> &'static str {
        "BLEU"
    }

    fn calculate(
        &self,
        reference: &str,
        candidate: &str,
        n: usize,
    ) -> Result<EvaluationResults, EvalError> {
        ensure_order(self.name(), n)?;
        let score = round_to(self.score(reference, candidate, n), SCORE_DECIMALS);

        Ok(EvaluationResults::from_entries(self.name(), [("score", score)]).with_primary("score"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalguard_core::MetricValue;

    fn bleu(reference: &str, candidate: &str, n: usize) -> f64 {
        Bleu::new()
            .calculate(reference, candidate, n)
            .unwrap()
            .get("score")
            .and_then(MetricValue::as_f64)
            .unwrap()
    }

    #[test]
    fn test_bleu_unigram() {
        let score = bleu("that's the way cookie crumbles", "this is the way bla bla bla", 1);
        assert_eq!(score, 0.29);
    }

    #[test]
    fn test_bleu_disjoint_bigrams() {
        let results = Bleu::new()
            .calculate("that's the way cookie crumbles", "this is the way...", 2)
            .unwrap();
        assert_eq!(results.metric_name(), "BLEU");
        assert_eq!(results.get("score"), Some(&MetricValue::Float(0.0)));
    }

    #[test]
    fn test_bleu_identical() {
        let text = "The quick brown fox jumps over the lazy dog";
        for n in 1..=4 {
            assert_eq!(bleu(text, text, n), 1.0);
        }
    }

    #[test]
    fn test_bleu_longer_candidate_has_no_penalty() {
        let score = bleu(
            "short sentence",
            "short sentence with extra tokens making it definitely longer than the reference itself",
            1,
        );
        assert!(score > 0.0 && score <= 1.0);
    }

    #[test]
    fn test_bleu_short_candidate_is_penalised() {
        // Full precision, but 2 tokens against 4: BP = exp(1 - 4/2)
        let score = bleu("the cat sat down", "the cat", 1);
        assert_eq!(score, 0.37);
    }

    #[test]
    fn test_bleu_order_larger_than_candidate() {
        assert_eq!(bleu("a b c", "a b", 3), 0.0);
    }

    #[test]
    fn test_bleu_rejects_zero_order() {
        assert!(Bleu::new().calculate("a", "a", 0).is_err());
    }
}
