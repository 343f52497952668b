//! Common types shared by the services and the components.
//!
//! # Categories
//!
//! - **File Types** - the candidate file picked or dropped by the user
//! - **Upload Events** - what an upload operation reports back
//! - **Error Types** - validation, transport and configuration errors

use serde_json::Value;
use std::fmt;
use web_sys::File;

use crate::config::I18n;

// =============================================================================
// File Types
// =============================================================================

/// A file the user dropped or selected, before validation.
#[derive(Clone, Debug)]
pub struct CandidateFile {
    /// File name as reported by the browser
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Browser handle, absent when built outside a browser
    pub blob: Option<File>,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            blob: None,
        }
    }

    pub fn from_file(file: File) -> Self {
        Self {
            name: file.name(),
            size: file.size() as u64,
            blob: Some(file),
        }
    }
}

// =============================================================================
// Upload Events
// =============================================================================

/// Everything an upload operation reports, in transport order.
///
/// An operation yields any number of `Progress` events followed by at most
/// one of `Success`, `Failure` or `Aborted`.
#[derive(Clone, Debug)]
pub enum UploadEvent {
    /// Percentage sent, 0 to 100
    Progress(u8),
    Success(UploadSuccess),
    Failure(UploadFailure),
    Aborted,
}

impl UploadEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UploadEvent::Progress(_))
    }
}

/// A completed upload.
#[derive(Clone, Debug)]
pub struct UploadSuccess {
    /// Parsed server response
    pub response: Value,
    /// `file_name` field of the response, when the server sent one
    pub file_name: Option<String>,
    /// The file that was sent
    pub file: CandidateFile,
}

impl UploadSuccess {
    pub fn new(response: Value, file: CandidateFile) -> Self {
        let file_name = response
            .get("file_name")
            .and_then(|name| name.as_str())
            .map(str::to_string);

        Self {
            response,
            file_name,
            file,
        }
    }
}

/// A failed upload.
#[derive(Clone, Debug)]
pub struct UploadFailure {
    /// Label shown in the status bar
    pub message: String,
    pub error: TransportError,
    /// Response body, when it was JSON
    pub body: Option<Value>,
}

impl UploadFailure {
    pub fn new(error: TransportError, body: Option<Value>, i18n: &I18n) -> Self {
        Self {
            message: format!("{}{}", i18n.error, error.description()),
            error,
            body,
        }
    }

    /// What the failure callback receives: the JSON body when there is one,
    /// otherwise the error itself.
    pub fn payload(&self) -> Value {
        self.body
            .clone()
            .unwrap_or_else(|| Value::String(self.error.to_string()))
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Reasons a candidate file is refused before any request is made.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationError {
    /// Extension not in the whitelist.
    WrongType { accepted: Vec<String> },
    /// Larger than the configured maximum (kilobytes).
    WrongSize { max_kb: f64 },
    /// The widget is configured not to upload.
    UploadDisabled,
}

impl ValidationError {
    /// Alert text for this rejection, HTML included.
    pub fn message(&self, i18n: &I18n) -> String {
        match self {
            ValidationError::WrongType { accepted } => {
                let list = accepted
                    .iter()
                    .map(|ext| format!("<b>{}</b>", ext))
                    .collect::<Vec<_>>()
                    .join(" or ");
                i18n.wrong_file_type.replacen("%s", &list, 1)
            }
            ValidationError::WrongSize { max_kb } => {
                let limit = format!("<b>{} {}</b>", max_kb, i18n.kb.trim());
                i18n.wrong_file_size.replacen("%s", &limit, 1)
            }
            ValidationError::UploadDisabled => i18n.unable_to_upload.clone(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::WrongType { accepted } => {
                write!(f, "Wrong file type, accepted: {}", accepted.join(", "))
            }
            ValidationError::WrongSize { max_kb } => {
                write!(f, "Wrong file size, max: {} KB", max_kb)
            }
            ValidationError::UploadDisabled => write!(f, "Upload disabled"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Failures of a submitted upload.
#[derive(Clone, Debug, PartialEq)]
pub enum TransportError {
    /// Server answered outside 2xx.
    Http { status: u16, status_text: String },
    /// The request never completed.
    Network(String),
    /// 2xx answer that is not JSON.
    Parse(String),
    /// The request could not be built or sent.
    Setup(String),
}

impl TransportError {
    /// Short description used in the status bar label.
    pub fn description(&self) -> String {
        match self {
            TransportError::Http { status, status_text } if status_text.is_empty() => {
                status.to_string()
            }
            TransportError::Http { status_text, .. } => status_text.clone(),
            TransportError::Network(msg)
            | TransportError::Parse(msg)
            | TransportError::Setup(msg) => msg.clone(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Http { status, status_text } => {
                write!(f, "Server error ({}): {}", status, status_text)
            }
            TransportError::Network(msg) => write!(f, "Network error: {}", msg),
            TransportError::Parse(msg) => write!(f, "Failed to parse response: {}", msg),
            TransportError::Setup(msg) => write!(f, "Failed to build request: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// Options that could not be read.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid options: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}
