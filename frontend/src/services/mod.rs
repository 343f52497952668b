//! Upload flow services.
//!
//! # Services
//!
//! - [`validator`] - admission rules (upload mode, extension, size)
//! - [`payload`] - multipart body assembly
//! - [`submitter`] - request, progress and outcome events
//! - [`preview`] - image preview of manually selected files
//! - [`instance`] - per-widget identity and status indicator ownership

pub mod validator;
pub mod payload;
pub mod submitter;
pub mod preview;
pub mod instance;

pub use validator::*;
pub use payload::*;
pub use submitter::*;
pub use preview::*;
pub use instance::*;
