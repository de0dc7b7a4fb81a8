//! # rowcast-common
//!
//! Common types, errors, and configuration for rowcast.
//!
//! This crate provides the foundational types shared by every rowcast
//! component. It includes:
//!
//! - **Types**: the dynamically-typed [`ScalarValue`] a driver reports per cell
//! - **Errors**: unified error handling with [`RowcastError`]
//! - **Config**: session and export configuration structures
//! - **Constants**: placeholder markers and compatibility rules
//!
//! ## Example
//!
//! ```rust
//! use rowcast_common::types::ScalarValue;
//! use rowcast_common::error::RowcastResult;
//!
//! fn example() -> RowcastResult<()> {
//!     let id = ScalarValue::Int64(42);
//!     let name = ScalarValue::text("alice");
//!     assert!(!id.is_null());
//!     assert_eq!(name.kind_name(), "text");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items at the crate root
pub use config::{Dialect, ExportConfig, LineTerminator, SessionConfig};
pub use constants::*;
pub use error::{ErrorCode, RowcastError, RowcastResult};
pub use types::{Complex, ScalarValue, UnsupportedKind};
