//! Server configuration.
//!
//! Values come from the environment (a `.env` file is loaded first by the
//! binary) and can be overridden on the command line.

use std::path::PathBuf;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default directory receiving uploads.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Default per-file limit, in kilobytes.
pub const DEFAULT_MAX_SIZE_KB: u64 = 10 * 1024;

/// Room left in the request body limit for multipart framing and extra fields.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Runtime configuration of the upload server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub upload_dir: PathBuf,
    /// Largest accepted file, in kilobytes
    pub max_size_kb: u64,
    /// Directory served at `/` (e.g. the built widget demo)
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_size_kb: DEFAULT_MAX_SIZE_KB,
            static_dir: None,
        }
    }
}

impl ServerConfig {
    /// Read `DROPAREA_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            port: parse_or("DROPAREA_PORT", lookup("DROPAREA_PORT"), defaults.port),
            upload_dir: lookup("DROPAREA_UPLOAD_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            max_size_kb: parse_or(
                "DROPAREA_MAX_SIZE_KB",
                lookup("DROPAREA_MAX_SIZE_KB"),
                defaults.max_size_kb,
            ),
            static_dir: lookup("DROPAREA_STATIC_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Largest accepted file, in bytes.
    pub fn max_file_bytes(&self) -> u64 {
        self.max_size_kb.saturating_mul(1024)
    }

    /// Request body limit handed to axum.
    pub fn max_body_bytes(&self) -> usize {
        usize::try_from(self.max_file_bytes())
            .unwrap_or(usize::MAX)
            .saturating_add(MULTIPART_OVERHEAD_BYTES)
    }
}

fn parse_or<T: std::str::FromStr + Copy>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            eprintln!("⚠️  Ignoring invalid {}={:?}", key, raw);
            default
        }),
    }
}
