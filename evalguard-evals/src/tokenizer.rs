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

//! Token counting backends

use crate::EvalError;
use std::sync::Arc;

/// Converts text into a token count for one vocabulary
pub trait TokenEncoder: Send + Sync {
    fn count_tokens(&self, text: &str) -> usize;
}

impl TokenEncoder for tiktoken_rs::CoreBPE {
    fn count_tokens(&self, text: &str) -> usize {
        self.encode_with_special_tokens(text).len()
    }
}

/// Vocabularies that [`encoder_for_vocabulary`] can resolve
pub const SUPPORTED_VOCABULARIES: [&str; 5] = [
    "cl100k_base",
    "o200k_base",
    "p50k_base",
    "p50k_edit",
    "r50k_base",
];

/// Build the BPE encoder for a named vocabulary
pub fn encoder_for_vocabulary(name: &str) -> Result<Arc<dyn TokenEncoder>, EvalError> {
    let bpe = match name {
        "cl100k_base" => tiktoken_rs::cl100k_base(),
        "o200k_base" => tiktoken_rs::o200k_base(),
        "p50k_base" => tiktoken_rs::p50k_base(),
        "p50k_edit" => tiktoken_rs::p50k_edit(),
        "r50k_base" => tiktoken_rs::r50k_base(),
        other => {
            return Err(EvalError::InvalidInput(format!(
                "Unknown tokenizer vocabulary '{}', expected one of {:?}",
                other, SUPPORTED_VOCABULARIES
            )))
        }
    }
    .map_err(|e| EvalError::Tokenizer(e.to_string()))?;

    Ok(Arc::new(bpe))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_vocabulary() {
        let err = encoder_for_vocabulary("gpt-17").err().unwrap();
        assert!(matches!(err, EvalError::InvalidInput(_)));
    }

    #[test]
    fn test_cl100k_counts_tokens() {
        let encoder = encoder_for_vocabulary("cl100k_base").unwrap();
        assert_eq!(encoder.count_tokens(""), 0);
        assert!(encoder.count_tokens("hello world") >= 2);
    }
}
