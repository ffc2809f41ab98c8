use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{Assessment, Oracle, OracleError, prompts};
use crate::encode::EncodedImage;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";
const TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

/// Hosted chat-completions backend.
pub struct OpenAiOracle {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiOracle {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn chat(&self, prompt: &str, images: &[&EncodedImage], max_tokens: u32) -> Result<String, OracleError> {
        let mut content = vec![json!({"type": "text", "text": prompt})];
        content.extend(
            images
                .iter()
                .map(|image| json!({"type": "image_url", "image_url": {"url": image.data_url()}})),
        );
        let payload = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": content}],
            "max_tokens": max_tokens,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .map_err(|e| {
                OracleError::from_reqwest(e, TIMEOUT, &format!("Could not reach {}", self.endpoint))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response
            .json()
            .map_err(|e| OracleError::Malformed(e.to_string()))?;
        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| OracleError::Malformed("response has no choices".into()))
    }
}

impl Oracle for OpenAiOracle {
    fn name(&self) -> &str {
        "OpenAI"
    }

    fn score(&self, image: &EncodedImage) -> Result<Assessment, OracleError> {
        let content = self.chat(prompts::HOSTED_SCORE, &[image], 500)?;
        parse_score_reply(&content)
    }

    fn similar(&self, a: &EncodedImage, b: &EncodedImage) -> Result<bool, OracleError> {
        let content = self.chat(prompts::COMPARE, &[a, b], 50)?;
        debug!("similarity verdict: {}", content.trim());
        Ok(is_similar_verdict(&content))
    }
}

/// Slice from the first `{` to the last `}`, if the reply contains an object at all.
fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}

fn parse_score_reply(content: &str) -> Result<Assessment, OracleError> {
    match extract_json_object(content) {
        Some(object) => {
            let value = serde_json::from_str(object).map_err(|e| OracleError::Parse(e.to_string()))?;
            Assessment::from_json(value)
        }
        None => Ok(Assessment::unparsed(content)),
    }
}

/// Only an exact `SIMILAR` counts.
fn is_similar_verdict(content: &str) -> bool {
    content.trim().to_uppercase() == "SIMILAR"
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_json_object_from_fenced_reply() {
        let reply = "Sure!\n```json\n{\"score\": 77, \"reasoning\": \"nice {angle}\"}\n```";
        assert_eq!(
            extract_json_object(reply),
            Some("{\"score\": 77, \"reasoning\": \"nice {angle}\"}")
        );
        assert_eq!(extract_json_object("no braces here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn test_parse_score_reply_reads_embedded_object() {
        let assessment = parse_score_reply(
            "Here you go: {\"score\": 91, \"main_subject\": \"red coupe\", \"caption\": \"#redcar\"}",
        )
        .unwrap();
        assert_eq!(assessment.score, 91);
        assert_eq!(assessment.details["main_subject"], json!("red coupe"));
    }

    #[test]
    fn test_parse_score_reply_without_object_degrades_to_fallback() {
        let assessment = parse_score_reply("Looks great, maybe 80?").unwrap();
        assert_eq!(assessment.score, super::super::FALLBACK_SCORE);
        assert_eq!(assessment.details["error"], json!("Looks great, maybe 80?"));
    }

    #[test]
    fn test_parse_score_reply_with_broken_object_is_parse_error() {
        let err = parse_score_reply("{score: eighty}").unwrap_err();
        assert!(matches!(err, OracleError::Parse(_)));
    }

    #[test]
    fn test_similar_verdict_is_strict() {
        assert!(is_similar_verdict("SIMILAR"));
        assert!(is_similar_verdict("  similar\n"));
        assert!(!is_similar_verdict("SIMILAR, mostly"));
        assert!(!is_similar_verdict("DIFFERENT"));
    }
}
