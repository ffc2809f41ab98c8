//! Vision oracle backends.
//!
//! The oracle is the only thing in the tool that looks at pixels: it scores a
//! single photo and judges whether two photos are near-duplicates. Everything
//! else works on its answers.

pub mod ollama;
pub mod openai;
mod prompts;

pub use ollama::OllamaOracle;
pub use openai::OpenAiOracle;

use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

use crate::encode::EncodedImage;

/// Score given when the oracle answered but the answer could not be read.
pub const FALLBACK_SCORE: u32 = 50;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("{0}")]
    Unreachable(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API Error: {status}")]
    Status { status: u16, body: String },

    #[error("Error: {0}")]
    Transport(String),

    #[error("Could not parse AI response: {0}")]
    Parse(String),

    #[error("Malformed AI response: {0}")]
    Malformed(String),
}

impl OracleError {
    /// Raw response body attached to the failure, if the service sent one.
    pub fn body(&self) -> Option<&str> {
        match self {
            OracleError::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration, unreachable: &str) -> Self {
        if err.is_timeout() {
            OracleError::Timeout(timeout)
        } else if err.is_connect() {
            OracleError::Unreachable(unreachable.to_string())
        } else {
            OracleError::Transport(err.to_string())
        }
    }
}

/// A successful scoring answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub score: u32,
    pub details: Map<String, Value>,
}

impl Assessment {
    /// Build from the JSON object a hosted model was asked to reply with.
    /// `score` may arrive as a number or a numeric string; it is capped at 100.
    pub fn from_json(value: Value) -> Result<Self, OracleError> {
        let Value::Object(mut details) = value else {
            return Err(OracleError::Malformed("reply is not a JSON object".into()));
        };
        let score = match details.remove("score") {
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
            Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
            _ => None,
        }
        .ok_or_else(|| OracleError::Malformed("reply has no usable score".into()))?;

        Ok(Self {
            score: score.min(100) as u32,
            details,
        })
    }

    /// The oracle replied, but not in a shape we understand.
    pub fn unparsed(raw: &str) -> Self {
        let mut details = Map::new();
        details.insert(
            "reasoning".into(),
            Value::String("Could not parse AI response".into()),
        );
        details.insert("error".into(), Value::String(raw.to_string()));
        Self {
            score: FALLBACK_SCORE,
            details,
        }
    }
}

/// Scoring and pairwise similarity judgments from a vision model.
///
/// Both calls may be slow and may fail; callers decide what a failure means.
pub trait Oracle {
    fn name(&self) -> &str;

    fn score(&self, image: &EncodedImage) -> Result<Assessment, OracleError>;

    fn similar(&self, a: &EncodedImage, b: &EncodedImage) -> Result<bool, OracleError>;
}
