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

//! # Evalguard Core
//!
//! Contracts shared by every evalguard evaluator:
//!
//! - [`EvaluationResults`] / [`MetricValue`]: the uniform, ordered output of an evaluation
//! - [`Message`] / [`ChatRole`] / [`ChatSession`]: the conversation shapes evaluators consume
//! - [`EvalSettings`]: TOML-loadable defaults for trajectory weights, guardrails and metrics

pub mod config;
pub mod eval_result;
pub mod message;

pub use config::{
    ConfigError, EvalSettings, GuardrailSettings, MeteorSettings, TokenLimitSettings,
    TrajectorySettings, DEFAULT_GUARDRAIL_MESSAGE, DEFAULT_MAX_RETRY, DEFAULT_PASSING_THRESHOLD,
    DEFAULT_VOCABULARY,
};
pub use eval_result::{round_to, EvaluationResults, MetricValue};
pub use message::{ChatRole, ChatSession, InMemoryChatSession, Message};
