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

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Type-safe metric values for evaluation outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    String(String),
}

impl MetricValue {
    /// Numeric view of the value. Booleans map to 1.0 / 0.0, strings have none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Float(v) => Some(*v),
            MetricValue::Int(v) => Some(*v as f64),
            MetricValue::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            MetricValue::String(_) => None,
        }
    }

    /// Integer pass/fail view used by decision logic (truncates floats).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetricValue::Int(v) => Some(*v),
            MetricValue::Float(v) => Some(v.trunc() as i64),
            MetricValue::Bool(v) => Some(i64::from(*v)),
            MetricValue::String(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetricValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Orders two values for "which scored higher" comparisons.
    ///
    /// Numbers (and booleans) compare numerically, strings lexicographically.
    /// Mixed numeric/string pairs are incomparable.
    pub fn compare(&self, other: &MetricValue) -> Option<Ordering> {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            (None, None) => match (self, other) {
                (MetricValue::String(a), MetricValue::String(b)) => Some(a.cmp(b)),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Float(v) => write!(f, "{}", v),
            MetricValue::Int(v) => write!(f, "{}", v),
            MetricValue::Bool(v) => write!(f, "{}", v),
            MetricValue::String(v) => f.write_str(v),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Float(value)
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        MetricValue::Int(value)
    }
}

impl From<usize> for MetricValue {
    fn from(value: usize) -> Self {
        MetricValue::Int(value as i64)
    }
}

impl From<bool> for MetricValue {
    fn from(value: bool) -> Self {
        MetricValue::Bool(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        MetricValue::String(value.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        MetricValue::String(value)
    }
}

/// Round half away from zero to `places` decimals.
///
/// Values within 1e-9 (in scaled units) of a half are treated as halves, so
/// binary artefacts such as `0.285 * 100 == 28.499999999999996` still round up.
pub fn round_to(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(places);
    let scaled = value * factor;
    let nudged = scaled + scaled.signum() * 1e-9;
    nudged.round() / factor
}

/// Outcome of a single evaluation call.
///
/// `results` keeps insertion order. One entry is the primary (decision) score:
/// the key designated with [`EvaluationResults::with_primary`], or the first
/// entry when none was designated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResults {
    metric_name: String,

    results: IndexMap<String, MetricValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    primary_key: Option<String>,
}

impl EvaluationResults {
    pub fn new(metric_name: impl Into<String>, results: IndexMap<String, MetricValue>) -> Self {
        Self {
            metric_name: metric_name.into(),
            results,
            primary_key: None,
        }
    }

    /// Build from `(key, value)` pairs, preserving their order
    pub fn from_entries<I, K, V>(metric_name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<MetricValue>,
    {
        let results = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::new(metric_name, results)
    }

    /// Designate the entry that carries the decision score
    pub fn with_primary(mut self, key: impl Into<String>) -> Self {
        self.primary_key = Some(key.into());
        self
    }

    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }

    pub fn results(&self) -> &IndexMap<String, MetricValue> {
        &self.results
    }

    pub fn into_results(self) -> IndexMap<String, MetricValue> {
        self.results
    }

    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.results.get(key)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Name of the primary entry
    pub fn primary_key(&self) -> Option<&str> {
        match &self.primary_key {
            Some(key) if self.results.contains_key(key) => Some(key.as_str()),
            Some(_) => None,
            None => self.results.keys().next().map(String::as_str),
        }
    }

    /// Primary entry as `(key, value)`
    pub fn primary_score(&self) -> Option<(&str, &MetricValue)> {
        let key = self.primary_key()?;
        self.results.get_key_value(key).map(|(k, v)| (k.as_str(), v))
    }

    /// Entries re-keyed as `{prefix}_{key}`
    pub fn prefixed<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (String, MetricValue)> + 'a {
        self.results
            .iter()
            .map(move |(k, v)| (format!("{}_{}", prefix, k), v.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_value_serialization() {
        let value = MetricValue::Float(0.85);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "0.85");

        let value = MetricValue::Bool(true);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "true");

        let value = MetricValue::from("A");
        assert_eq!(serde_json::to_string(&value).unwrap(), "\"A\"");
    }

    #[test]
    fn test_results_keep_insertion_order() {
        let results = EvaluationResults::from_entries(
            "ROUGE",
            [("recall", 0.6), ("precision", 0.43), ("f1", 0.5)],
        );
        let keys: Vec<_> = results.results().keys().cloned().collect();
        assert_eq!(keys, vec!["recall", "precision", "f1"]);
        assert_eq!(results.primary_key(), Some("recall"));
    }

    #[test]
    fn test_designated_primary_score() {
        let results = EvaluationResults::from_entries(
            "Trajectory",
            [
                ("task1_trajectoryId", MetricValue::from("task1")),
                ("task1_overallScore", MetricValue::from(0.9)),
            ],
        )
        .with_primary("task1_overallScore");

        let (key, value) = results.primary_score().unwrap();
        assert_eq!(key, "task1_overallScore");
        assert_eq!(value.as_f64(), Some(0.9));
    }

    #[test]
    fn test_primary_missing_key() {
        let results = EvaluationResults::from_entries("x", [("score", 1i64)]).with_primary("nope");
        assert!(results.primary_score().is_none());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(3.0 / 7.0, 2), 0.43);
        assert_eq!(round_to(2.0 / 7.0, 2), 0.29);
        assert_eq!(round_to(0.285, 2), 0.29);
        assert_eq!(round_to(-0.125, 2), -0.13);
        assert_eq!(round_to(0.956, 2), 0.96);
    }

    #[test]
    fn test_metric_value_compare() {
        let a = MetricValue::Float(0.6);
        let b = MetricValue::Int(1);
        assert_eq!(a.compare(&b), Some(Ordering::Less));
        assert_eq!(
            MetricValue::from("b").compare(&MetricValue::from("a")),
            Some(Ordering::Greater)
        );
        assert_eq!(a.compare(&MetricValue::from("a")), None);
        assert_eq!(MetricValue::Float(0.96).as_i64(), Some(0));
        assert_eq!(MetricValue::Int(1).as_i64(), Some(1));
    }
}
