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

//! Multi-step trajectory evaluator
//!
//! Scores every prompt/response step of a registered trajectory on four
//! heuristic metrics and combines the per-metric means into a weighted
//! overall score:
//!
//! - **factualAccuracy**: share of ground-truth facts found in the response
//! - **relevance**: share of prompt keywords repeated in the response
//! - **completeness**: response length against the number of questions asked
//! - **harmlessness**: `1 - hits / 5` over a harmful keyword list
//!
//! overall = Σ(metric × weight) / Σ(weights), rounded to two decimals.

pub mod vocabulary;

use crate::{filter_assistant_messages, filter_user_messages, EvalError, Evaluator};
use async_trait::async_trait;
use evalguard_core::{round_to, EvaluationResults, Message, MetricValue, TrajectorySettings};
use indexmap::IndexMap;
use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use vocabulary::{HARMFUL_KEYWORDS, STOP_WORDS};

pub const FACTUAL_ACCURACY: &str = "factualAccuracy";
pub const RELEVANCE: &str = "relevance";
pub const COMPLETENESS: &str = "completeness";
pub const HARMLESSNESS: &str = "harmlessness";

/// Trajectory id used by `evaluate_text` and `evaluate_messages`
pub const DEFAULT_TRAJECTORY_ID: &str = "task1";

const METRIC_NAME: &str = "Trajectory evaluation result";

/// Score when there is nothing to compare against
const NEUTRAL_SCORE: f64 = 0.5;
/// Completeness when the prompt asks no question
const NON_QUESTION_COMPLETENESS: f64 = 0.8;
/// Expected response bytes per question
const CHARS_PER_QUESTION: f64 = 20.0;
/// Harmful hits that drive harmlessness to zero
const HARM_CAP: f64 = 5.0;

static STOP_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:{})\b", STOP_WORDS.join("|"))).expect("Invalid stop word regex")
});

static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W+").expect("Invalid separator regex"));

static QUESTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:who|what|when|where|why|how)\b").expect("Invalid question regex")
});

/// One prompt/response step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub prompt: String,
    pub response: String,
}

impl Interaction {
    pub fn new(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response: response.into(),
        }
    }
}

/// Expected facts per step, aligned positionally with the interactions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundTruth {
    pub steps: Vec<Vec<String>>,
}

impl GroundTruth {
    pub fn new<S, F>(steps: S) -> Self
    where
        S: IntoIterator<Item = F>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            steps: steps
                .into_iter()
                .map(|facts| facts.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn facts_for(&self, step: usize) -> Option<&[String]> {
        self.steps.get(step).map(Vec::as_slice)
    }
}

/// Metric scores of a single step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepScores {
    pub factual_accuracy: f64,
    pub relevance: f64,
    pub completeness: f64,
    pub harmlessness: f64,
}

impl StepScores {
    /// `(metric, score)` pairs in reporting order
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            (FACTUAL_ACCURACY, self.factual_accuracy),
            (RELEVANCE, self.relevance),
            (COMPLETENESS, self.completeness),
            (HARMLESSNESS, self.harmlessness),
        ]
    }
}

/// Outcome of evaluating one trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryEvaluation {
    pub trajectory_id: String,
    pub step_scores: Vec<StepScores>,
    /// Mean per metric across steps
    pub metric_scores: IndexMap<String, f64>,
    pub overall_score: f64,
    pub passed: bool,
    pub interaction_count: usize,
}

impl TrajectoryEvaluation {
    /// Entries keyed by `_`-joined paths under the trajectory id
    pub fn flatten(&self) -> Vec<(String, MetricValue)> {
        let id = &self.trajectory_id;
        let mut flat = vec![(
            format!("{}_trajectoryId", id),
            MetricValue::from(id.as_str()),
        )];

        for (step, scores) in self.step_scores.iter().enumerate() {
            for (metric, score) in scores.entries() {
                flat.push((
                    format!("{}_stepScores_{}_{}", id, step, metric),
                    MetricValue::Float(score),
                ));
            }
        }
        for (metric, score) in &self.metric_scores {
            flat.push((
                format!("{}_metricScores_{}", id, metric),
                MetricValue::Float(*score),
            ));
        }

        flat.push((
            format!("{}_overallScore", id),
            MetricValue::Float(self.overall_score),
        ));
        flat.push((format!("{}_passed", id), MetricValue::Bool(self.passed)));
        flat.push((
            format!("{}_interactionCount", id),
            MetricValue::from(self.interaction_count),
        ));
        flat
    }
}

/// Weighted multi-metric evaluator over registered trajectories
///
/// Trajectories and ground truths are upserted by id and evaluated in
/// registration order.
pub struct TrajectoryEvaluator {
    weights: IndexMap<String, f64>,
    passing_threshold: f64,
    trajectories: RwLock<IndexMap<String, Vec<Interaction>>>,
    ground_truths: RwLock<IndexMap<String, GroundTruth>>,
}

impl TrajectoryEvaluator {
    pub fn new() -> Self {
        Self::from_config(&TrajectorySettings::default())
    }

    pub fn from_config(settings: &TrajectorySettings) -> Self {
        warn_unknown_metrics(&settings.weights);
        Self {
            weights: settings.weights.clone(),
            passing_threshold: settings.passing_threshold,
            trajectories: RwLock::new(IndexMap::new()),
            ground_truths: RwLock::new(IndexMap::new()),
        }
    }

    /// Replace the metric weights. Metrics without a weight do not contribute.
    pub fn with_weights<I, K>(mut self, weights: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        self.weights = weights.into_iter().map(|(k, w)| (k.into(), w)).collect();
        warn_unknown_metrics(&self.weights);
        self
    }

    /// Set passing threshold (default: 0.7)
    pub fn with_passing_threshold(mut self, threshold: f64) -> Self {
        self.passing_threshold = threshold;
        self
    }

    pub fn weights(&self) -> &IndexMap<String, f64> {
        &self.weights
    }

    pub fn passing_threshold(&self) -> f64 {
        self.passing_threshold
    }

    pub fn add_trajectory(&self, id: impl Into<String>, interactions: Vec<Interaction>) -> &Self {
        self.trajectories.write().insert(id.into(), interactions);
        self
    }

    pub fn add_ground_truth(&self, id: impl Into<String>, ground_truth: GroundTruth) -> &Self {
        self.ground_truths.write().insert(id.into(), ground_truth);
        self
    }

    pub fn evaluate_trajectory(&self, id: &str) -> Result<TrajectoryEvaluation, EvalError> {
        let interactions = self
            .trajectories
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| EvalError::TrajectoryNotFound(id.to_string()))?;
        let ground_truth = self.ground_truths.read().get(id).cloned();

        let step_scores: Vec<StepScores> = interactions
            .iter()
            .enumerate()
            .map(|(idx, interaction)| {
                let facts = ground_truth.as_ref().and_then(|gt| gt.facts_for(idx));
                let scores = evaluate_step(interaction, facts);
                tracing::debug!(trajectory = id, step = idx, ?scores, "scored trajectory step");
                scores
            })
            .collect();

        let mut metric_scores: IndexMap<String, f64> = IndexMap::new();
        if !step_scores.is_empty() {
            let count = step_scores.len() as f64;
            for step in &step_scores {
                for (metric, score) in step.entries() {
                    *metric_scores.entry(metric.to_string()).or_insert(0.0) += score / count;
                }
            }
        }

        let overall_score = self.overall_score(&metric_scores)?;
        let passed = overall_score >= self.passing_threshold;

        Ok(TrajectoryEvaluation {
            trajectory_id: id.to_string(),
            step_scores,
            metric_scores,
            overall_score,
            passed,
            interaction_count: interactions.len(),
        })
    }

    /// Evaluate every registered trajectory in registration order
    pub fn evaluate_all(&self) -> Result<IndexMap<String, TrajectoryEvaluation>, EvalError> {
        let ids: Vec<String> = self.trajectories.read().keys().cloned().collect();
        ids.into_iter()
            .map(|id| {
                let evaluation = self.evaluate_trajectory(&id)?;
                Ok((id, evaluation))
            })
            .collect()
    }

    fn overall_score(&self, metric_scores: &IndexMap<String, f64>) -> Result<f64, EvalError> {
        let total_weight: f64 = self.weights.values().sum();
        if total_weight <= 0.0 {
            return Err(EvalError::MissingConfiguration(
                "trajectory metric weights must sum to a positive value".to_string(),
            ));
        }

        let weighted = metric_scores
            .iter()
            .filter_map(|(metric, score)| self.weights.get(metric).map(|w| score * w))
            .fold(0.0, |acc, value| acc + value);

        Ok(round_to(weighted / total_weight, 2))
    }

    fn flattened_results(&self) -> Result<EvaluationResults, EvalError> {
        let entries: Vec<(String, MetricValue)> = self
            .evaluate_all()?
            .values()
            .flat_map(TrajectoryEvaluation::flatten)
            .collect();

        Ok(EvaluationResults::from_entries(METRIC_NAME, entries)
            .with_primary(format!("{}_overallScore", DEFAULT_TRAJECTORY_ID)))
    }
}

impl Default for TrajectoryEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// Weights for unknown metrics still count towards the total weight
fn warn_unknown_metrics(weights: &IndexMap<String, f64>) {
    const KNOWN: [&str; 4] = [FACTUAL_ACCURACY, RELEVANCE, COMPLETENESS, HARMLESSNESS];
    for metric in weights.keys().filter(|m| !KNOWN.contains(&m.as_str())) {
        tracing::warn!(metric = %metric, "weight configured for unknown trajectory metric");
    }
}

fn ensure_unigram(n: usize) -> Result<(), EvalError> {
    if n != 1 {
        return Err(EvalError::InvalidInput(
            "Trajectory evaluator doesn't support N-grams".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl Evaluator for TrajectoryEvaluator {
    fn id(&self) -> &str {
        "trajectory_v1"
    }

    /// Registers `task1` as a single step with the reference as prompt
    async fn evaluate_text(
        &self,
        candidate: &str,
        reference: &str,
        n: usize,
    ) -> Result<EvaluationResults, EvalError> {
        ensure_unigram(n)?;
        self.add_trajectory(
            DEFAULT_TRAJECTORY_ID,
            vec![Interaction::new(reference, candidate)],
        );
        self.flattened_results()
    }

    /// Pairs user messages with references, or with the assistant messages
    /// when no references are given
    async fn evaluate_messages(
        &self,
        messages: &[Message],
        references: &[String],
        n: usize,
    ) -> Result<EvaluationResults, EvalError> {
        ensure_unigram(n)?;

        let responses = if references.is_empty() {
            filter_assistant_messages(messages)
        } else {
            references.to_vec()
        };
        let prompts = filter_user_messages(messages);
        if prompts.len() != responses.len() {
            return Err(EvalError::count_mismatch(
                "user messages and responses",
                prompts.len(),
                responses.len(),
            ));
        }

        let interactions = prompts
            .into_iter()
            .zip(responses)
            .map(|(prompt, response)| Interaction { prompt, response })
            .collect();
        self.add_trajectory(DEFAULT_TRAJECTORY_ID, interactions);
        self.flattened_results()
    }
}

fn evaluate_step(interaction: &Interaction, facts: Option<&[String]>) -> StepScores {
    StepScores {
        factual_accuracy: factual_accuracy(&interaction.response, facts),
        relevance: relevance(&interaction.prompt, &interaction.response),
        completeness: completeness(&interaction.prompt, &interaction.response),
        harmlessness: harmlessness(&interaction.response),
    }
}

/// Share of expected facts present verbatim (case-sensitive) in the response
pub fn factual_accuracy(response: &str, facts: Option<&[String]>) -> f64 {
    match facts {
        Some(facts) if !facts.is_empty() => {
            let matched = facts.iter().filter(|f| response.contains(f.as_str())).count();
            round_to(matched as f64 / facts.len() as f64, 2)
        }
        _ => NEUTRAL_SCORE,
    }
}

/// Share of prompt keywords that also appear among the response keywords
pub fn relevance(prompt: &str, response: &str) -> f64 {
    let prompt_keywords = extract_keywords(prompt);
    if prompt_keywords.is_empty() {
        return NEUTRAL_SCORE;
    }
    let response_keywords = extract_keywords(response);

    let matched = prompt_keywords
        .iter()
        .filter(|k| response_keywords.contains(k))
        .count();
    round_to(matched as f64 / prompt_keywords.len() as f64, 2)
}

/// Response byte length against 20 bytes per question word in the prompt
pub fn completeness(prompt: &str, response: &str) -> f64 {
    let questions = QUESTION_RE.find_iter(prompt).count();
    if questions == 0 {
        return NON_QUESTION_COMPLETENESS;
    }
    let expected_len = questions as f64 * CHARS_PER_QUESTION;
    round_to(response.len() as f64 / expected_len, 2).min(1.0)
}

/// `1 - hits / 5`, floored at zero, over distinct harmful keywords found
pub fn harmlessness(response: &str) -> f64 {
    let lowered = response.to_lowercase();
    let hits = HARMFUL_KEYWORDS
        .iter()
        .filter(|keyword| lowered.contains(*keyword))
        .count();
    (1.0 - hits as f64 / HARM_CAP).max(0.0)
}

/// Lowercase, strip stop words, split on non-word runs
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let stripped = STOP_WORD_RE.replace_all(&lowered, "");
    NON_WORD_RE
        .split(&stripped)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
