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

use super::{ensure_order, StringMetric, SCORE_DECIMALS};
use crate::EvalError;
use evalguard_core::{round_to, EvaluationResults, MeteorSettings, MetricValue};
use std::collections::{HashMap, VecDeque};

/// METEOR over exact unigram matches
///
/// F = P·R / (α·P + (1-α)·R)
/// penalty = γ · (chunks / matches)^β
/// score = F · (1 - penalty)
///
/// Tokens are lowercased and split on whitespace. `n` is accepted for
/// interface symmetry and otherwise ignored.
#[derive(Debug, Clone)]
pub struct Meteor {
    alpha: f64,
    beta: f64,
    gamma: f64,
}

impl Meteor {
    pub fn new() -> Self {
        Self::from_settings(&MeteorSettings::default())
    }

    pub fn from_settings(settings: &MeteorSettings) -> Self {
        Self {
            alpha: settings.alpha,
            beta: settings.beta,
            gamma: settings.gamma,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// Multiset intersection size
    fn count_matches(reference: &[String], candidate: &[String]) -> usize {
        let mut remaining: HashMap<&str, usize> = HashMap::new();
        for token in reference {
            *remaining.entry(token.as_str()).or_insert(0) += 1;
        }

        candidate
            .iter()
            .filter(|token| match remaining.get_mut(token.as_str()) {
                Some(left) if *left > 0 => {
                    *left -= 1;
                    true
                }
                _ => false,
            })
            .count()
    }

    /// Contiguous runs in the candidate-to-reference alignment. Each candidate
    /// token takes the earliest unused reference position of the same token.
    fn count_chunks(reference: &[String], candidate: &[String]) -> usize {
        let mut positions: HashMap<&str, VecDeque<usize>> = HashMap::new();
        for (idx, token) in reference.iter().enumerate() {
            positions.entry(token.as_str()).or_default().push_back(idx);
        }

        let mut chunks = 0;
        let mut prev: Option<usize> = None;
        for token in candidate {
            let Some(pos) = positions
                .get_mut(token.as_str())
                .and_then(VecDeque::pop_front)
            else {
                continue;
            };
            if prev.map_or(true, |p| pos != p + 1) {
                chunks += 1;
            }
            prev = Some(pos);
        }
        chunks
    }

    fn f_mean(&self, precision: f64, recall: f64) -> f64 {
        if precision == 0.0 || recall == 0.0 {
            return 0.0;
        }
        precision * recall / (self.alpha * precision + (1.0 - self.alpha) * recall)
    }
}

impl Default for Meteor {
    fn default() -> Self {
        Self::new()
    }
}

impl StringMetric for Meteor {
    fn name(&self) -> &'static str {
        "METEOR"
    }

    fn calculate(
        &self,
        reference: &str,
        candidate: &str,
        n: usize,
    ) -> Result<EvaluationResults, EvalError> {
        ensure_order(self.name(), n)?;

        let ref_tokens = Self::tokenize(reference);
        let cand_tokens = Self::tokenize(candidate);
        let matches = Self::count_matches(&ref_tokens, &cand_tokens);

        if matches == 0 {
            return Ok(EvaluationResults::from_entries(
                self.name(),
                [
                    ("score", MetricValue::Float(0.0)),
                    ("precision", MetricValue::Float(0.0)),
                    ("recall", MetricValue::Float(0.0)),
                    ("chunks", MetricValue::Int(0)),
                ],
            )
            .with_primary("score"));
        }

        let precision = matches as f64 / cand_tokens.len() as f64;
        let recall = matches as f64 / ref_tokens.len() as f64;
        let f_mean = self.f_mean(precision, recall);

        let chunks = Self::count_chunks(&ref_tokens, &cand_tokens);
        let penalty = self.gamma * (chunks as f64 / matches as f64).powf(self.beta);
        let score = round_to(f_mean * (1.0 - penalty), SCORE_DECIMALS);

        Ok(EvaluationResults::from_entries(
            self.name(),
            [
                ("score", MetricValue::Float(score)),
                ("precision", MetricValue::Float(precision)),
                ("recall", MetricValue::Float(recall)),
                ("chunks", MetricValue::from(chunks)),
                ("penalty", MetricValue::Float(penalty)),
                ("fMean", MetricValue::Float(f_mean)),
            ],
        )
        .with_primary("score"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &str = "The quick brown fox jumps over the lazy dog";
    const SWAPPED: &str = "The quick brown dog jumps over the lazy fox";

    #[test]
    fn test_meteor_swapped_words() {
        let results = Meteor::new().calculate(REFERENCE, SWAPPED, 1).unwrap();
        assert_eq!(results.metric_name(), "METEOR");

        let keys: Vec<_> = results.results().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["score", "precision", "recall", "chunks", "penalty", "fMean"]
        );
        assert_eq!(results.get("score"), Some(&MetricValue::Float(0.96)));
        assert_eq!(results.get("precision"), Some(&MetricValue::Float(1.0)));
        assert_eq!(results.get("recall"), Some(&MetricValue::Float(1.0)));
        assert_eq!(results.get("chunks"), Some(&MetricValue::Int(4)));
        assert_eq!(results.get("fMean"), Some(&MetricValue::Float(1.0)));

        let penalty = results.get("penalty").and_then(MetricValue::as_f64).unwrap();
        assert!((penalty - 0.04389574759945129).abs() < 1e-12);
    }

    #[test]
    fn test_meteor_no_matches() {
        let results = Meteor::new().calculate("alpha beta", "gamma delta", 1).unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results.get("score"), Some(&MetricValue::Float(0.0)));
        assert_eq!(results.get("chunks"), Some(&MetricValue::Int(0)));
        assert!(results.get("penalty").is_none());
    }

    #[test]
    fn test_meteor_case_insensitive() {
        let results = Meteor::new()
            .calculate("Hello World", "hello   WORLD\n", 1)
            .unwrap();
        assert_eq!(results.get("chunks"), Some(&MetricValue::Int(1)));
        // One chunk over two matches: penalty 0.5 * 0.5^3
        assert_eq!(results.get("score"), Some(&MetricValue::Float(0.94)));
    }

    #[test]
    fn test_meteor_repeated_tokens_are_clipped() {
        let results = Meteor::new().calculate("the cat", "the the the", 1).unwrap();
        let precision = results.get("precision").and_then(MetricValue::as_f64).unwrap();
        assert!((precision - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(results.get("recall"), Some(&MetricValue::Float(0.5)));
    }

    #[test]
    fn test_meteor_custom_parameters() {
        let meteor = Meteor::new().with_gamma(0.0);
        let results = meteor.calculate(REFERENCE, SWAPPED, 1).unwrap();
        assert_eq!(results.get("score"), Some(&MetricValue::Float(1.0)));
    }
}
