//! # rowcast-test
//!
//! Integration tests for rowcast.
//!
//! This crate contains:
//! - Recorded result set fixtures
//! - Session helpers over the in-memory connection
//! - Cross-crate suites under `tests/`

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Result set fixtures and session helpers
pub mod fixtures;
