//! Error handling for rowcast.
//!
//! This module provides a unified error type and result alias used
//! across all rowcast components.

mod rowcast;

pub use rowcast::{ErrorCode, RowcastError};

/// Result type alias for rowcast operations.
pub type RowcastResult<T> = std::result::Result<T, RowcastError>;
