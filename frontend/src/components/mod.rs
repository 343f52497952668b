//! UI components of the drop area.
//!
//! - [`DropArea`] - the drop target itself
//! - [`StatusBar`] - filename, size, progress and abort control
//! - [`AlertBlock`] - validation and mode notices

mod droparea;
mod status_bar;
mod alert_block;

pub use droparea::*;
pub use status_bar::*;
pub use alert_block::*;
