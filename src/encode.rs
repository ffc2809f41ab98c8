use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Files above this size are still sent, but local models tend to choke on them.
pub const LARGE_FILE_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Base64 payload of an image file, ready to embed in an oracle request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    data: String,
}

impl EncodedImage {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: STANDARD.encode(bytes),
        }
    }

    pub fn as_base64(&self) -> &str {
        &self.data
    }

    /// `data:` URL form used by chat-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:image/jpeg;base64,{}", self.data)
    }
}

pub fn encode_image(path: &Path) -> Result<EncodedImage, EncodeError> {
    let io_err = |source| EncodeError::Io {
        path: path.to_path_buf(),
        source,
    };

    let size = fs::metadata(path).map_err(io_err)?.len();
    if size > LARGE_FILE_BYTES {
        warn!(
            "{} is {:.1}MB (large file)",
            path.display(),
            size as f64 / (1024.0 * 1024.0)
        );
    }

    let bytes = fs::read(path).map_err(io_err)?;
    Ok(EncodedImage::from_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_encode_image_base64() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("tiny.jpg");
        fs::write(&file_path, b"Hello, World!").unwrap();

        let encoded = encode_image(&file_path).unwrap();
        assert_eq!(encoded.as_base64(), "SGVsbG8sIFdvcmxkIQ==");
        assert_eq!(
            encoded.data_url(),
            "data:image/jpeg;base64,SGVsbG8sIFdvcmxkIQ=="
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("gone.jpg");

        let err = encode_image(&missing).unwrap_err();
        assert!(err.to_string().contains("gone.jpg"));
    }
}
