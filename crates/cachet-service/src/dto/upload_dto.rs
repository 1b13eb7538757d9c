//! Upload-related DTOs.

use serde::{Deserialize, Serialize};

/// Body of every `POST /upload` and failed download response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl UploadResponse {
    /// Success body pointing at the stored file.
    #[must_use]
    pub fn uploaded(directory: &str, stored_name: &str) -> Self {
        Self {
            message: "File uploaded!".to_string(),
            file: Some(format!("{}/{}", directory.trim_end_matches('/'), stored_name)),
        }
    }

    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            file: None,
        }
    }
}
