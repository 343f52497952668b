//! Widget configuration.
//!
//! Every drop target is built from its own [`DropAreaOptions`]. Options are
//! plain data so they can come from Rust code or from a JavaScript object
//! (see [`crate::bindings`]). Field names are camelCase on the wire; the
//! snake_case names used by earlier releases are accepted as aliases.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::types::ConfigError;

/// Default server endpoint.
pub const DEFAULT_URL: &str = "path/to/server/script";

/// Default selector of the manual file picker.
pub const DEFAULT_FILE_HOLDER: &str = "#file";

/// Default selector of the image preview element.
pub const DEFAULT_FILE_PREVIEW: &str = "#file_preview";

/// Delay before a finished status bar or alert disappears (milliseconds).
pub const DEFAULT_NOTIFICATION_DELAY: u32 = 5000;

/// Default extension whitelist.
pub const DEFAULT_ACCEPTED: &str = ".jpg|.png|.gif";

/// Default maximum file size, in kilobytes.
pub const DEFAULT_FILE_MAX_SIZE_KB: f64 = 2048.0;

// =============================================================================
// HTTP method
// =============================================================================

/// Methods a widget may submit with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Post,
    Patch,
    Put,
}

impl HttpMethod {
    /// Parse a configured method, case-insensitively.
    ///
    /// Anything outside the allow-list falls back to POST.
    pub fn from_config(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "POST" => HttpMethod::Post,
            "PATCH" => HttpMethod::Patch,
            "PUT" => HttpMethod::Put,
            other => {
                log::warn!("Unsupported upload method '{}', using POST", other);
                HttpMethod::Post
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(HttpMethod::from_config).unwrap_or_default())
    }
}

// =============================================================================
// Accepted extensions
// =============================================================================

/// Extension filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Accepted {
    /// Every file type is accepted.
    All,
    /// Pipe-delimited whitelist, e.g. `.jpg|.png`.
    Extensions(String),
}

impl Accepted {
    /// Build a filter from a pipe-delimited list. A list without any
    /// non-blank entry accepts everything.
    pub fn from_list(list: &str) -> Self {
        if list.split('|').all(|entry| entry.trim().is_empty()) {
            Accepted::All
        } else {
            Accepted::Extensions(list.to_string())
        }
    }

    /// Whitelist entries as configured, trimmed.
    pub fn configured(&self) -> Vec<String> {
        match self {
            Accepted::All => Vec::new(),
            Accepted::Extensions(list) => list
                .split('|')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    /// Whitelist entries, trimmed and lowercased.
    pub fn entries(&self) -> Vec<String> {
        self.configured()
            .into_iter()
            .map(|entry| entry.to_lowercase())
            .collect()
    }

    /// Whether a lowercased extension (with its dot) is allowed.
    pub fn allows(&self, extension: &str) -> bool {
        let entries = self.entries();
        if entries.is_empty() {
            return true;
        }
        let extension = extension.to_lowercase();
        entries.iter().any(|entry| *entry == extension)
    }
}

impl Default for Accepted {
    fn default() -> Self {
        Accepted::Extensions(DEFAULT_ACCEPTED.to_string())
    }
}

impl Serialize for Accepted {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Accepted::All => serializer.serialize_none(),
            Accepted::Extensions(list) => serializer.serialize_str(list),
        }
    }
}

impl<'de> Deserialize<'de> for Accepted {
    /// `null`, booleans and lists without entries all mean "accept everything".
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            List(String),
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::List(list)) => Accepted::from_list(&list),
            Some(Raw::Flag(_)) | None => Accepted::All,
        })
    }
}

// =============================================================================
// Display strings
// =============================================================================

/// User-facing strings. Messages may contain HTML.
///
/// `%s` in `wrong_file_type` and `wrong_file_size` is replaced by the
/// whitelist and the size limit respectively.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct I18n {
    #[serde(alias = "unable_to_upload")]
    pub unable_to_upload: String,
    #[serde(alias = "wrong_file_type")]
    pub wrong_file_type: String,
    #[serde(alias = "wrong_file_size")]
    pub wrong_file_size: String,
    pub abort: String,
    pub mb: String,
    pub kb: String,
    pub percent: String,
    pub dismiss: String,
    pub error: String,
}

impl Default for I18n {
    fn default() -> Self {
        Self {
            unable_to_upload: "Unable to upload at this time.<br >Select a file.".to_string(),
            wrong_file_type: "Unacceptable file type!<br >Try: %s".to_string(),
            wrong_file_size: "Dropped file is too big!<br >Max file size allowed: %s".to_string(),
            abort: "Abort".to_string(),
            mb: " MB".to_string(),
            kb: " KB".to_string(),
            percent: "% ".to_string(),
            dismiss: "Dismiss".to_string(),
            error: "Err: ".to_string(),
        }
    }
}

// =============================================================================
// Options
// =============================================================================

/// Configuration of one drop target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DropAreaOptions {
    /// Upload endpoint.
    pub url: String,
    pub method: HttpMethod,
    /// When false, drops are redirected to the manual picker instead of
    /// being submitted, so a host form can carry the file.
    pub upload: bool,
    /// Selector (`#id`) of the manual picker; its id is also the multipart
    /// field name of the file.
    #[serde(alias = "file_holder")]
    pub file_holder: String,
    /// Selector of an `<img>` showing manually selected images.
    #[serde(alias = "file_preview")]
    pub file_preview: String,
    #[serde(alias = "notification_delay")]
    pub notification_delay: u32,
    pub accepted: Accepted,
    /// Kilobytes.
    #[serde(alias = "file_max_size")]
    pub file_max_size: f64,
    /// Ids of form elements whose values travel with the file.
    #[serde(alias = "extra_data")]
    pub extra: Vec<String>,
    pub i18n: I18n,
}

impl Default for DropAreaOptions {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            method: HttpMethod::default(),
            upload: true,
            file_holder: DEFAULT_FILE_HOLDER.to_string(),
            file_preview: DEFAULT_FILE_PREVIEW.to_string(),
            notification_delay: DEFAULT_NOTIFICATION_DELAY,
            accepted: Accepted::default(),
            file_max_size: DEFAULT_FILE_MAX_SIZE_KB,
            extra: Vec::new(),
            i18n: I18n::default(),
        }
    }
}

impl DropAreaOptions {
    /// Parse options from a JSON object. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError(e.to_string()))
    }

    /// Id of the manual picker element (selector without `#`).
    pub fn file_holder_id(&self) -> &str {
        element_id(&self.file_holder)
    }

    pub fn file_preview_id(&self) -> &str {
        element_id(&self.file_preview)
    }
}

/// Strip the leading `#` of an id selector.
pub fn element_id(selector: &str) -> &str {
    selector.trim().trim_start_matches('#')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let options = DropAreaOptions::from_json("{}").unwrap();
        assert_eq!(options, DropAreaOptions::default());
        assert_eq!(options.method, HttpMethod::Post);
        assert_eq!(options.file_holder_id(), "file");
        assert_eq!(options.i18n.error, "Err: ");
    }

    #[test]
    fn test_snake_case_aliases() {
        let snake = r##"{
            "url": "/upload.php",
            "file_holder": "#avatar",
            "file_max_size": 512,
            "notification_delay": 1000,
            "extra_data": ["#user_id", "token"]
        }"##;
        let camel = r##"{
            "url": "/upload.php",
            "fileHolder": "#avatar",
            "fileMaxSize": 512,
            "notificationDelay": 1000,
            "extra": ["#user_id", "token"]
        }"##;

        let a = DropAreaOptions::from_json(snake).unwrap();
        let b = DropAreaOptions::from_json(camel).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.file_holder_id(), "avatar");
        assert_eq!(a.file_max_size, 512.0);
    }

    #[test]
    fn test_accepted_null_and_false_accept_all() {
        for raw in [r#"{"accepted": null}"#, r#"{"accepted": false}"#, r#"{"accepted": true}"#] {
            let options = DropAreaOptions::from_json(raw).unwrap();
            assert_eq!(options.accepted, Accepted::All, "{}", raw);
        }
    }

    #[test]
    fn test_accepted_entries_case_insensitive() {
        let accepted = Accepted::Extensions(".JPG| .png |".to_string());
        assert_eq!(accepted.entries(), vec![".jpg", ".png"]);
        assert!(accepted.allows(".jpg"));
        assert!(accepted.allows(".PNG"));
        assert!(!accepted.allows(".gif"));
        assert!(!accepted.allows(""));
    }

    #[test]
    fn test_empty_whitelist_accepts_all() {
        for raw in [r#"{"accepted": ""}"#, r#"{"accepted": "|"}"#, r#"{"accepted": " | "}"#] {
            let options = DropAreaOptions::from_json(raw).unwrap();
            assert_eq!(options.accepted, Accepted::All, "{}", raw);
        }

        let built = Accepted::Extensions("||".to_string());
        assert!(built.allows(".exe"));
    }

    #[test]
    fn test_configured_entries_keep_their_case() {
        let accepted = Accepted::from_list(".JPG | .png");
        assert_eq!(accepted.configured(), vec![".JPG", ".png"]);
        assert_eq!(accepted.entries(), vec![".jpg", ".png"]);
    }

    #[test]
    fn test_method_fallback() {
        assert_eq!(HttpMethod::from_config("put"), HttpMethod::Put);
        assert_eq!(HttpMethod::from_config("PATCH"), HttpMethod::Patch);
        assert_eq!(HttpMethod::from_config("DELETE"), HttpMethod::Post);

        let options = DropAreaOptions::from_json(r#"{"method": "GET"}"#).unwrap();
        assert_eq!(options.method, HttpMethod::Post);
        let options = DropAreaOptions::from_json(r#"{"method": null}"#).unwrap();
        assert_eq!(options.method, HttpMethod::Post);
    }

    #[test]
    fn test_partial_i18n_merges_over_defaults() {
        let options = DropAreaOptions::from_json(r#"{"i18n": {"abort": "Annuler"}}"#).unwrap();
        assert_eq!(options.i18n.abort, "Annuler");
        assert_eq!(options.i18n.dismiss, "Dismiss");
    }

    #[test]
    fn test_malformed_options() {
        let err = DropAreaOptions::from_json(r#"{"fileMaxSize": "big"}"#).unwrap_err();
        assert!(err.to_string().contains("Invalid options"));
    }
}
