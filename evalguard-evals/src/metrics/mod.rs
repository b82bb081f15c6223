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

//! Reference-Based String Metrics
//!
//! Deterministic metrics comparing a candidate string against a reference:
//!
//! - **BLEU**: n-gram precision product with brevity penalty
//! - **ROUGE-N**: n-gram recall / precision / F1
//! - **METEOR**: unigram alignment with a fragmentation penalty
//!
//! BLEU and ROUGE split on single spaces without normalisation, so casing and
//! punctuation are significant. Scores are rounded to two decimals when the
//! result is built.

pub mod bleu;
pub mod meteor;
pub mod rouge;

pub use bleu::Bleu;
pub use meteor::Meteor;
pub use rouge::Rouge;

use crate::EvalError;
use evalguard_core::EvaluationResults;

/// Decimal places kept for probability-like scores
pub const SCORE_DECIMALS: i32 = 2;

/// A metric comparing a candidate against a reference
pub trait StringMetric: Send + Sync {
    /// Metric name used in results (e.g., "BLEU")
    fn name(&self) -> &'static str;

    /// Score `candidate` against `reference` using n-grams of order `n`
    fn calculate(
        &self,
        reference: &str,
        candidate: &str,
        n: usize,
    ) -> Result<EvaluationResults, EvalError>;
}

/// Split on single spaces, keeping empty tokens
pub(crate) fn split_on_spaces(text: &str) -> Vec<&str> {
    text.split(' ').collect()
}

/// Space-joined windows of `n` consecutive tokens
pub(crate) fn ngrams(tokens: &[&str], n: usize) -> Vec<String> {
    if n == 0 || tokens.len() < n {
        return Vec::new();
    }
    tokens.windows(n).map(|window| window.join(" ")).collect()
}

/// Candidate n-grams that also occur in the reference, without clipping
pub(crate) fn count_matches(candidate: &[String], reference: &[String]) -> usize {
    candidate.iter().filter(|ng| reference.contains(ng)).count()
}

pub(crate) fn ensure_order(metric: &str, n: usize) -> Result<(), EvalError> {
    if n == 0 {
        return Err(EvalError::InvalidInput(format!(
            "{} requires an n-gram order of at least 1",
            metric
        )));
    }
    Ok(())
}
