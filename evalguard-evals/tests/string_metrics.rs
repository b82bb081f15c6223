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

//! Property tests for the reference-based string metrics

use evalguard_evals::metrics::{Bleu, Meteor, Rouge, StringMetric};
use evalguard_evals::MetricValue;
use proptest::prelude::*;

fn sentence() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,6}", 1..10).prop_map(|words| words.join(" "))
}

/// A sentence together with an n-gram order it can support
fn sentence_with_order() -> impl Strategy<Value = (String, usize)> {
    prop::collection::vec("[a-z]{1,6}", 1..10).prop_flat_map(|words| {
        let len = words.len();
        (Just(words.join(" ")), 1..=len)
    })
}

fn primary(results: &evalguard_evals::EvaluationResults) -> f64 {
    results
        .primary_score()
        .and_then(|(_, value)| value.as_f64())
        .unwrap()
}

proptest! {
    #[test]
    fn bleu_of_identical_text_is_one((text, n) in sentence_with_order()) {
        let score = Bleu::new().score(&text, &text, n);
        prop_assert!((score - 1.0).abs() < 1e-9, "BLEU = {}", score);
    }

    #[test]
    fn rouge_of_identical_text_is_one((text, n) in sentence_with_order()) {
        let score = Rouge::new().rouge_n(&text, &text, n);
        prop_assert!((score.precision - 1.0).abs() < 1e-9);
        prop_assert!((score.recall - 1.0).abs() < 1e-9);
        prop_assert!((score.f1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rouge_precision_is_bounded(reference in sentence(), candidate in sentence(), n in 1usize..4) {
        let score = Rouge::new().rouge_n(&reference, &candidate, n);
        prop_assert!((0.0..=1.0).contains(&score.precision));
        prop_assert!(score.recall >= 0.0);
        if score.precision + score.recall == 0.0 {
            prop_assert_eq!(score.f1, 0.0);
        }
    }

    #[test]
    fn meteor_score_is_bounded(reference in sentence(), candidate in sentence()) {
        let results = Meteor::new().calculate(&reference, &candidate, 1).unwrap();
        let score = primary(&results);
        prop_assert!((0.0..=1.0).contains(&score), "METEOR = {}", score);
    }

    #[test]
    fn metrics_are_deterministic(reference in sentence(), candidate in sentence()) {
        let metrics: [&dyn StringMetric; 3] = [&Bleu, &Rouge, &Meteor::new()];
        for metric in metrics {
            let first = metric.calculate(&reference, &candidate, 1).unwrap();
            let second = metric.calculate(&reference, &candidate, 1).unwrap();
            prop_assert_eq!(first.results(), second.results());
        }
    }
}

#[test]
fn disjoint_texts_score_zero() {
    let bleu = Bleu::new().calculate("alpha beta", "gamma delta", 1).unwrap();
    assert_eq!(bleu.get("score"), Some(&MetricValue::Float(0.0)));

    let rouge = Rouge::new().calculate("alpha beta", "gamma delta", 1).unwrap();
    assert_eq!(rouge.get("f1"), Some(&MetricValue::Float(0.0)));
}
