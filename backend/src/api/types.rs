//! Wire types shared with the widget.
//!
//! The widget only relies on `file_name`; the rest is informational.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::storage::StoredFile;

/// Response to a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Name the file was stored under
    pub file_name: String,

    /// Name the browser sent
    pub original_name: String,

    /// Size in bytes
    pub size: u64,

    /// Extra form fields sent with the file
    pub fields: BTreeMap<String, String>,

    pub uploaded_at: DateTime<Utc>,
}

impl UploadResponse {
    pub fn new(stored: StoredFile, original_name: String, fields: BTreeMap<String, String>) -> Self {
        Self {
            file_name: stored.file_name,
            original_name,
            size: stored.size,
            fields,
            uploaded_at: Utc::now(),
        }
    }
}

/// Body of every error response.
pub fn error_response(error: &str) -> Value {
    json!({ "error": error })
}
