use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Stage file information carried in the view's `FILE_NAME` column.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct FileMetadata {
    pub stage: Option<String>,
    pub relative_path: Option<String>,
    pub content_type: Option<String>,
    pub size: Option<u64>,
    pub last_modified: Option<String>,
    pub etag: Option<String>,
}

impl FileMetadata {
    /// Parses the column value, which is either a JSON object or a string
    /// holding one.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is neither, or the JSON is malformed.
    pub fn from_value(value: &Value) -> Result<Self> {
        let parsed = match value {
            Value::String(text) => serde_json::from_str(text),
            Value::Object(_) => serde_json::from_value(value.clone()),
            other => {
                return Err(Error::Misc(format!(
                    "expected file metadata object, found `{other}`"
                )))
            }
        };

        parsed.map_err(|original| Error::ServiceOutput {
            operation: "file metadata".to_string(),
            original,
        })
    }

    /// Stage and relative path, when both are present and non-empty.
    #[must_use]
    pub fn stage_and_path(&self) -> Option<(&str, &str)> {
        let stage = self.stage.as_deref().filter(|s| !s.is_empty())?;
        let relative_path = self.relative_path.as_deref().filter(|s| !s.is_empty())?;
        Some((stage, relative_path))
    }

    /// First 16 characters of the ETag, for display.
    #[must_use]
    pub fn short_etag(&self) -> Option<String> {
        self.etag
            .as_ref()
            .map(|etag| format!("{}...", etag.chars().take(16).collect::<String>()))
    }
}
