//! Droparea - drag & drop file upload widget
//!
//! A WebAssembly (Leptos) widget that uploads a file dropped on it, or
//! picked from a file selector, and reports progress and errors over the
//! drop target.
//!
//! # Upload flow
//!
//! ```text
//! ┌───────────────┐   ┌─────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ drop / picker │──▶│  admission  │──▶│  submission  │──▶│   outcome    │
//! │ (first file)  │   │ mode/type/  │   │  multipart + │   │ success/fail │
//! │               │   │ size        │   │  progress    │   │ /abort       │
//! └───────────────┘   └─────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`config`] - Per-widget options and display strings
//! - [`types`] - Candidate file, upload events, errors
//! - [`services`] - Validation, payload, submission, preview
//! - [`components`] - Leptos components (DropArea, StatusBar, AlertBlock)
//! - [`bindings`] - JavaScript entry point

// =============================================================================
// Module declarations
// =============================================================================

pub mod config;
pub mod types;
pub mod services;
pub mod components;
pub mod bindings;

// =============================================================================
// Re-exports
// =============================================================================

// Configuration
pub use config::{Accepted, DropAreaOptions, HttpMethod, I18n};

// Types
pub use types::{
    // Files
    CandidateFile,
    // Events
    UploadEvent, UploadSuccess, UploadFailure,
    // Errors
    ValidationError, TransportError, ConfigError,
};

// Components
pub use components::*;

// Services
pub use services::{admit, start_upload, Admission, UploadEvents, UploadHandle, UploadPayload};

// JS entry point
pub use bindings::droparea;
