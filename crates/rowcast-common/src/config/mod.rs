//! Configuration for rowcast.
//!
//! This module provides configuration structures for sessions and exports.

mod session;

pub use session::{Dialect, ExportConfig, LineTerminator, SessionConfig};
