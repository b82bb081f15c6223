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

//! Configuration for evaluator defaults
//!
//! Every section has a `Default` matching the built-in behaviour, so a TOML
//! file only needs to name the values it overrides:
//!
//! ```toml
//! [trajectory]
//! passing_threshold = 0.8
//!
//! [trajectory.weights]
//! factualAccuracy = 2.0
//! relevance = 1.0
//!
//! [guardrails]
//! max_retry = 5
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default passing threshold for trajectory evaluation
pub const DEFAULT_PASSING_THRESHOLD: f64 = 0.7;

/// Default retry ceiling for the guardrail pipeline
pub const DEFAULT_MAX_RETRY: u32 = 3;

/// Message returned when a guardrail blocks a response
pub const DEFAULT_GUARDRAIL_MESSAGE: &str = "I'm unable to answer your question right now.";

/// Default tokenizer vocabulary for token limits
pub const DEFAULT_VOCABULARY: &str = "cl100k_base";

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Weights and threshold for trajectory scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectorySettings {
    /// Metric name -> weight. Metrics missing here do not count towards the overall score.
    pub weights: IndexMap<String, f64>,

    /// Minimum overall score to consider a trajectory successful
    pub passing_threshold: f64,
}

impl Default for TrajectorySettings {
    fn default() -> Self {
        let weights = ["factualAccuracy", "relevance", "completeness", "harmlessness"]
            .into_iter()
            .map(|m| (m.to_string(), 1.0))
            .collect();
        Self {
            weights,
            passing_threshold: DEFAULT_PASSING_THRESHOLD,
        }
    }
}

/// Defaults for the guardrail pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardrailSettings {
    pub max_retry: u32,
    pub return_after_callback: bool,
    pub default_message: String,
}

impl Default for GuardrailSettings {
    fn default() -> Self {
        Self {
            max_retry: DEFAULT_MAX_RETRY,
            return_after_callback: true,
            default_message: DEFAULT_GUARDRAIL_MESSAGE.to_string(),
        }
    }
}

/// METEOR parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeteorSettings {
    /// Weight of precision in the harmonic mean
    pub alpha: f64,
    /// Exponent of the fragmentation penalty
    pub beta: f64,
    /// Scaling factor of the fragmentation penalty
    pub gamma: f64,
}

impl Default for MeteorSettings {
    fn default() -> Self {
        Self {
            alpha: 0.9,
            beta: 3.0,
            gamma: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenLimitSettings {
    /// Tokenizer vocabulary name (e.g. "cl100k_base")
    pub vocabulary: String,
}

impl Default for TokenLimitSettings {
    fn default() -> Self {
        Self {
            vocabulary: DEFAULT_VOCABULARY.to_string(),
        }
    }
}

/// All evaluator settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalSettings {
    pub trajectory: TrajectorySettings,
    pub guardrails: GuardrailSettings,
    pub meteor: MeteorSettings,
    pub token_limit: TokenLimitSettings,
}

impl EvalSettings {
    /// Parse settings from a TOML document and validate them
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let settings: EvalSettings = toml::from_str(input)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading evaluation settings");
        Self::from_toml_str(&contents)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.trajectory.passing_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Invalid(format!(
                "trajectory.passing_threshold must be within [0, 1], got {}",
                threshold
            )));
        }

        if let Some((metric, weight)) = self.trajectory.weights.iter().find(|(_, w)| **w < 0.0) {
            return Err(ConfigError::Invalid(format!(
                "trajectory weight for '{}' must not be negative, got {}",
                metric, weight
            )));
        }
        if self.trajectory.weights.values().sum::<f64>() <= 0.0 {
            return Err(ConfigError::Invalid(
                "trajectory weights must sum to a positive value".to_string(),
            ));
        }

        if self.guardrails.max_retry == 0 {
            return Err(ConfigError::Invalid(
                "guardrails.max_retry must be at least 1".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.meteor.alpha) {
            return Err(ConfigError::Invalid(format!(
                "meteor.alpha must be within [0, 1], got {}",
                self.meteor.alpha
            )));
        }

        if self.token_limit.vocabulary.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "token_limit.vocabulary must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = EvalSettings::default();
        assert_eq!(settings.trajectory.weights.len(), 4);
        assert_eq!(settings.trajectory.passing_threshold, DEFAULT_PASSING_THRESHOLD);
        assert_eq!(settings.guardrails.max_retry, 3);
        assert!(settings.guardrails.return_after_callback);
        assert_eq!(settings.token_limit.vocabulary, "cl100k_base");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_override() {
        let settings = EvalSettings::from_toml_str(
            r#"
            [trajectory]
            passing_threshold = 0.8

            [trajectory.weights]
            factualAccuracy = 2.0
            harmlessness = 1.5

            [guardrails]
            max_retry = 5
            "#,
        )
        .unwrap();

        assert_eq!(settings.trajectory.passing_threshold, 0.8);
        assert_eq!(settings.trajectory.weights.len(), 2);
        assert_eq!(settings.trajectory.weights["factualAccuracy"], 2.0);
        assert_eq!(settings.guardrails.max_retry, 5);
        assert_eq!(settings.guardrails.default_message, DEFAULT_GUARDRAIL_MESSAGE);
        assert_eq!(settings.meteor, MeteorSettings::default());
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let err = EvalSettings::from_toml_str("[trajectory]\npassing_threshold = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_zero_weights_rejected() {
        let err = EvalSettings::from_toml_str("[trajectory.weights]\nrelevance = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[meteor]\nalpha = 0.5").unwrap();

        let settings = EvalSettings::load(file.path()).unwrap();
        assert_eq!(settings.meteor.alpha, 0.5);
        assert_eq!(settings.meteor.beta, 3.0);
    }

    #[test]
    fn test_missing_file() {
        let err = EvalSettings::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
