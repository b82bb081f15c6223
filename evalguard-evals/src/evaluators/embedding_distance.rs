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

//! Semantic distance between a candidate and a reference
//!
//! Both texts are embedded with an [`EmbeddingClient`] and compared with a
//! [`Distance`]. Lower is closer.

use crate::llm_client::EmbeddingClient;
use crate::{filter_assistant_messages, EvalError, Evaluator};
use async_trait::async_trait;
use evalguard_core::{round_to, EvaluationResults, Message, MetricValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Vector distance measures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distance {
    /// 1 - cosine similarity
    #[default]
    Cosine,
    /// L2 distance
    Euclidean,
}

impl Distance {
    pub fn measure(&self, a: &[f64], b: &[f64]) -> Result<f64, EvalError> {
        if a.len() != b.len() {
            return Err(EvalError::InvalidInput(format!(
                "embedding dimensions differ: {} vs {}",
                a.len(),
                b.len()
            )));
        }

        Ok(match self {
            Distance::Cosine => 1.0 - cosine_similarity(a, b),
            Distance::Euclidean => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y).powi(2))
                .sum::<f64>()
                .sqrt(),
        })
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Cosine => f.write_str("cosine"),
            Distance::Euclidean => f.write_str("euclidean"),
        }
    }
}

fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a < 1e-10 || norm_b < 1e-10 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

pub struct EmbeddingDistanceEvaluator {
    client: Arc<dyn EmbeddingClient>,
    distance: Distance,
}

impl EmbeddingDistanceEvaluator {
    pub fn new(client: Arc<dyn EmbeddingClient>, distance: Distance) -> Self {
        Self { client, distance }
    }

    pub fn distance(&self) -> Distance {
        self.distance
    }

    async fn measure(&self, candidate: &str, reference: &str) -> Result<f64, EvalError> {
        if reference.is_empty() {
            return Err(EvalError::InvalidInput(
                "embedding distance needs a non-empty reference".to_string(),
            ));
        }

        let candidate_vector = self.client.embed(candidate).await?;
        let reference_vector = self.client.embed(reference).await?;
        let distance = self.distance.measure(&candidate_vector, &reference_vector)?;
        Ok(round_to(distance, 3))
    }
}

#[async_trait]
impl Evaluator for EmbeddingDistanceEvaluator {
    fn id(&self) -> &str {
        "embedding_distance_v1"
    }

    async fn evaluate_text(
        &self,
        candidate: &str,
        reference: &str,
        _n: usize,
    ) -> Result<EvaluationResults, EvalError> {
        let distance = self.measure(candidate, reference).await?;
        Ok(EvaluationResults::from_entries(
            format!("Embedding Distance Evaluation with {}", self.distance),
            [("distance", distance)],
        )
        .with_primary("distance"))
    }

    async fn evaluate_messages(
        &self,
        messages: &[Message],
        references: &[String],
        _n: usize,
    ) -> Result<EvaluationResults, EvalError> {
        let candidates = filter_assistant_messages(messages);
        if candidates.len() != references.len() {
            return Err(EvalError::count_mismatch(
                "assistant messages and references",
                candidates.len(),
                references.len(),
            ));
        }

        let mut entries: Vec<(String, MetricValue)> = Vec::with_capacity(candidates.len());
        for (idx, (candidate, reference)) in candidates.iter().zip(references).enumerate() {
            let distance = self.measure(candidate, reference).await?;
            entries.push((idx.to_string(), MetricValue::Float(distance)));
        }

        Ok(EvaluationResults::from_entries(
            "Embedding Distance Evaluation",
            entries,
        ))
    }
}
