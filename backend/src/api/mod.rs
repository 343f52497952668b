//! HTTP API module.
//!
//! The upload endpoint and its wire types.

pub mod server;
pub mod types;

pub use server::{router, start_server};
pub use types::*;
