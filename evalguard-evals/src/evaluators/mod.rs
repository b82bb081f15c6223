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

//! Built-in evaluators

pub mod embedding_distance;
pub mod output;
pub mod pairwise;
pub mod string_comparison;
pub mod trajectory;

pub use embedding_distance::{Distance, EmbeddingDistanceEvaluator};
pub use output::{
    JsonFormatEvaluator, NoFallbackAnswerEvaluator, ShouldMatchRegexPatternEvaluator,
    ShouldNotMatchRegexPatternEvaluator, TokenLimitEvaluator, WordLimitEvaluator,
    XmlFormatEvaluator,
};
pub use pairwise::PairwiseStringEvaluator;
pub use string_comparison::StringComparisonEvaluator;
pub use trajectory::{GroundTruth, Interaction, TrajectoryEvaluation, TrajectoryEvaluator};
