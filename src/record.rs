use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::oracle::{Assessment, OracleError};

/// Keys the tool writes itself; an oracle reply may not supply them.
const OWN_FIELDS: [&str; 6] = [
    "score",
    "file",
    "path",
    "evaluated_at",
    "similar_shots",
    "alternatives",
];

/// One evaluated photo.
///
/// `details` carries whatever descriptive fields the oracle returned
/// (reasoning, caption, ...) and is flattened into the serialized object.
/// `similar_shots` and `alternatives` are only ever set by duplicate grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub score: u32,
    #[serde(flatten)]
    pub details: Map<String, Value>,
    pub file: String,
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similar_shots: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<String>>,
}

impl PhotoRecord {
    pub fn new(path: &Path, score: u32) -> Self {
        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            score,
            details: Map::new(),
            file,
            path: path.to_path_buf(),
            evaluated_at: None,
            similar_shots: None,
            alternatives: None,
        }
    }

    pub fn from_assessment(path: &Path, assessment: Assessment) -> Self {
        let mut record = Self::new(path, assessment.score);
        record.details = assessment.details;
        record
            .details
            .retain(|key, _| !OWN_FIELDS.contains(&key.as_str()));
        record
    }

    /// A failed evaluation: score 0, the failure as `reasoning`, and the
    /// response body (if any) as `error`.
    pub fn from_failure(path: &Path, err: &OracleError) -> Self {
        let mut record = Self::new(path, 0);
        record
            .details
            .insert("reasoning".into(), Value::String(err.to_string()));
        if let Some(body) = err.body() {
            record
                .details
                .insert("error".into(), Value::String(body.to_string()));
        }
        record
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    pub fn is_valid(&self) -> bool {
        self.score > 0
    }

    /// String-valued descriptive field, if the oracle supplied one.
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(Value::as_str)
    }

    pub fn caption(&self) -> Option<&str> {
        self.detail("caption")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_name_is_file_name() {
        let record = PhotoRecord::new(Path::new("/shoot/day1/IMG_0001.jpg"), 72);
        assert_eq!(record.file, "IMG_0001.jpg");
        assert_eq!(record.path, PathBuf::from("/shoot/day1/IMG_0001.jpg"));
        assert!(record.is_valid());
    }

    #[test]
    fn test_failure_record_has_zero_score_and_reason() {
        let err = OracleError::Status {
            status: 401,
            body: "invalid api key".into(),
        };
        let record = PhotoRecord::from_failure(Path::new("a.jpg"), &err);
        assert_eq!(record.score, 0);
        assert!(!record.is_valid());
        assert_eq!(record.detail("reasoning"), Some("API Error: 401"));
        assert_eq!(record.detail("error"), Some("invalid api key"));
    }

    #[test]
    fn test_serialization_flattens_details_and_skips_unset_grouping_fields() {
        let record = PhotoRecord::new(Path::new("dir/car.png"), 88)
            .with_detail("reasoning", "sharp, well lit")
            .with_detail("caption", "Sunday drive #cars");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(
            value,
            json!({
                "score": 88,
                "reasoning": "sharp, well lit",
                "caption": "Sunday drive #cars",
                "file": "car.png",
                "path": "dir/car.png",
            })
        );
    }

    #[test]
    fn test_oracle_cannot_override_own_fields() {
        let assessment = Assessment::from_json(json!({
            "score": 80,
            "file": "x",
            "path": "/elsewhere/x.jpg",
            "similar_shots": 7,
            "alternatives": ["y.jpg"],
            "reasoning": "fine",
        }))
        .unwrap();
        let record = PhotoRecord::from_assessment(Path::new("dir/real.jpg"), assessment);

        assert_eq!(record.file, "real.jpg");
        assert_eq!(record.similar_shots, None);
        assert_eq!(record.details.len(), 1);

        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(text.matches("\"file\"").count(), 1);
        assert!(!text.contains("similar_shots"));
        assert!(!text.contains("alternatives"));

        let reloaded: PhotoRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(reloaded, record);
    }

    #[test]
    fn test_grouping_fields_serialized_when_set() {
        let mut record = PhotoRecord::new(Path::new("a.jpg"), 90);
        record.similar_shots = Some(2);
        record.alternatives = Some(vec!["b.jpg".into()]);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["similar_shots"], json!(2));
        assert_eq!(value["alternatives"], json!(["b.jpg"]));
    }
}
