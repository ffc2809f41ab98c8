use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::debug;

use super::{Assessment, FALLBACK_SCORE, Oracle, OracleError, prompts};
use crate::encode::EncodedImage;

pub const DEFAULT_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llava:latest";
const TIMEOUT: Duration = Duration::from_secs(60);
const NOT_RUNNING: &str = "Ollama not running. Start with: ollama serve";

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Local Ollama backend. Replies are free text, so parsing is lenient.
pub struct OllamaOracle {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaOracle {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(TIMEOUT)
            .no_proxy()
            .build()
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    fn generate(&self, prompt: &str, images: &[&EncodedImage]) -> Result<String, OracleError> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let images: Vec<&str> = images.iter().map(|image| image.as_base64()).collect();
        let payload = json!({
            "model": self.model,
            "prompt": prompt,
            "images": images,
            "stream": false,
        });

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .map_err(|e| OracleError::from_reqwest(e, TIMEOUT, NOT_RUNNING))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let generated: GenerateResponse = response
            .json()
            .map_err(|e| OracleError::Malformed(e.to_string()))?;
        Ok(generated.response)
    }
}

impl Oracle for OllamaOracle {
    fn name(&self) -> &str {
        "Ollama"
    }

    fn score(&self, image: &EncodedImage) -> Result<Assessment, OracleError> {
        let text = self.generate(prompts::LOCAL_SCORE, &[image])?;
        Ok(assessment_from_text(&text))
    }

    fn similar(&self, a: &EncodedImage, b: &EncodedImage) -> Result<bool, OracleError> {
        let text = self.generate(prompts::COMPARE, &[a, b])?;
        debug!("similarity verdict: {}", text.trim());
        Ok(is_similar_verdict(&text))
    }
}

/// First run of ASCII digits in `text`, saturating on overflow.
fn first_integer(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let value = text[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .fold(0u64, |acc, c| {
            acc.saturating_mul(10)
                .saturating_add(u64::from(c as u8 - b'0'))
        });
    Some(value)
}

fn assessment_from_text(text: &str) -> Assessment {
    let score = if text.to_lowercase().contains("score") {
        first_integer(text)
            .map(|n| n.clamp(1, 100) as u32)
            .unwrap_or(FALLBACK_SCORE)
    } else {
        FALLBACK_SCORE
    };

    let mut details = Map::new();
    details.insert("reasoning".into(), Value::String(text.to_string()));
    details.insert(
        "main_subject".into(),
        Value::String("Analysis via Ollama".into()),
    );
    details.insert("social_media_appeal".into(), Value::String(text.to_string()));
    Assessment { score, details }
}

/// Local models hedge, so any mention of DIFFERENT vetoes the match.
fn is_similar_verdict(text: &str) -> bool {
    let upper = text.trim().to_uppercase();
    upper.contains("SIMILAR") && !upper.contains("DIFFERENT")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_integer() {
        assert_eq!(first_integer("Score: 85/100, sharp"), Some(85));
        assert_eq!(first_integer("no digits"), None);
        assert_eq!(
            first_integer("99999999999999999999999999 points"),
            Some(u64::MAX)
        );
    }

    #[test]
    fn test_assessment_from_text_uses_first_number_when_score_mentioned() {
        let assessment = assessment_from_text("I'd give this a score of 78/100. Great light.");
        assert_eq!(assessment.score, 78);
        assert_eq!(
            assessment.details["main_subject"],
            json!("Analysis via Ollama")
        );
        assert_eq!(
            assessment.details["reasoning"],
            assessment.details["social_media_appeal"]
        );
    }

    #[test]
    fn test_assessment_from_text_clamps_and_defaults() {
        assert_eq!(assessment_from_text("Score: 0").score, 1);
        assert_eq!(assessment_from_text("Score: 1000").score, 100);
        assert_eq!(assessment_from_text("Score: excellent").score, FALLBACK_SCORE);
        assert_eq!(assessment_from_text("A lovely 911 in the sun").score, FALLBACK_SCORE);
    }

    #[test]
    fn test_similar_verdict_is_vetoed_by_different() {
        assert!(is_similar_verdict("SIMILAR"));
        assert!(is_similar_verdict("These are similar shots."));
        assert!(!is_similar_verdict("Not SIMILAR, they are DIFFERENT"));
        assert!(!is_similar_verdict("different"));
    }

    #[test]
    fn test_unreachable_server_reports_ollama_hint() {
        let oracle = OllamaOracle::new("http://127.0.0.1:1", DEFAULT_MODEL).unwrap();
        let image = EncodedImage::from_bytes(b"jpeg");

        let err = oracle.score(&image).unwrap_err();
        assert!(matches!(err, OracleError::Unreachable(_)));
        assert_eq!(err.to_string(), NOT_RUNNING);
    }
}
