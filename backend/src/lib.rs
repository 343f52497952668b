//! # Droparea server - reference upload endpoint
//!
//! Receives the multipart uploads sent by the droparea widget, stores the
//! file and answers with the JSON the widget expects (`file_name` plus
//! informational fields).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use droparea_server::{start_server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     start_server(ServerConfig::from_env()).await.unwrap();
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Environment / CLI configuration
//! - [`error`] - Error types and their HTTP mapping
//! - [`storage`] - Writing uploads to disk
//! - [`api`] - HTTP server and wire types

pub mod config;
pub mod error;
pub mod storage;
pub mod api;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult, StorageError, StorageResult};
pub use storage::{sanitize_file_name, StoredFile, UploadStore};
pub use api::types::{error_response, UploadResponse};
pub use api::server::{router, start_server};
