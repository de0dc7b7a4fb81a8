//! Materialization error types.
//!
//! Provides the error type returned by every query, decode, and export path.

use std::fmt;
use thiserror::Error;

/// Error codes for categorizing errors.
///
/// These codes can be used for programmatic error handling and
/// are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Invalid argument provided.
    InvalidArgument = 0x0003,
    /// Invalid configuration.
    InvalidConfig = 0x0006,

    // Statement errors (0x0100 - 0x01FF)
    /// No table or source name to assemble a statement for.
    TableNotFound = 0x0100,
    /// Primary-key id values do not match the primary keys.
    IdConditionMismatch = 0x0101,
    /// Condition compilation failed.
    ConditionCompile = 0x0102,
    /// SELECT assembly failed.
    StatementBuild = 0x0103,

    // Cursor errors (0x0200 - 0x02FF)
    /// Statement execution failed.
    ExecutionFailed = 0x0200,
    /// Scanning a row into slots failed.
    ScanFailed = 0x0201,
    /// Cursor enumeration, advance, or close failed.
    CursorFailed = 0x0202,
    /// The session has been closed.
    SessionClosed = 0x0203,

    // Materialization errors (0x0300 - 0x03FF)
    /// Column selection index outside the result width.
    SelectionIndexOutOfRange = 0x0300,
    /// A cell's scalar kind has no conversion rule.
    UnsupportedScalarKind = 0x0301,
    /// Writing to the tabular sink failed.
    SinkWrite = 0x0302,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "Statement",
            0x02 => "Cursor",
            0x03 => "Materialization",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The main error type for rowcast.
///
/// # Example
///
/// ```rust
/// use rowcast_common::error::{RowcastError, RowcastResult};
///
/// fn check(index: usize, width: usize) -> RowcastResult<()> {
///     if index >= width {
///         return Err(RowcastError::SelectionIndexOutOfRange { index, width });
///     }
///     Ok(())
/// }
///
/// assert!(check(5, 3).is_err());
/// ```
#[derive(Debug, Error)]
pub enum RowcastError {
    // ==========================================================================
    // General Errors
    // ==========================================================================
    /// Invalid argument provided.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Error message.
        message: String,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },

    // ==========================================================================
    // Statement Errors
    // ==========================================================================
    /// Structured assembly was attempted without a table name.
    #[error("table not found: no table or source name set for the query")]
    TableNotFound,

    /// Primary-key id values do not line up with the primary keys.
    #[error("id condition is invalid: expected {expected} primary key values, got {actual}")]
    IdConditionMismatch {
        /// Number of primary key columns.
        expected: usize,
        /// Number of id values supplied.
        actual: usize,
    },

    /// The condition compiler rejected the condition tree.
    #[error("condition compile failed: {reason}")]
    ConditionCompile {
        /// Reason for failure.
        reason: String,
    },

    /// The statement builder could not assemble the SELECT.
    #[error("statement build failed: {reason}")]
    StatementBuild {
        /// Reason for failure.
        reason: String,
    },

    // ==========================================================================
    // Cursor Errors
    // ==========================================================================
    /// The connection failed to execute the statement.
    #[error("query execution failed: {reason}")]
    ExecutionFailed {
        /// Reason for failure.
        reason: String,
    },

    /// Scanning the current row failed.
    #[error("scan failed: {reason}")]
    ScanFailed {
        /// Reason for failure.
        reason: String,
    },

    /// The cursor failed outside of a scan.
    #[error("cursor failed: {reason}")]
    CursorFailed {
        /// Reason for failure.
        reason: String,
    },

    /// The session was closed before the call.
    #[error("session is closed")]
    SessionClosed,

    // ==========================================================================
    // Materialization Errors
    // ==========================================================================
    /// A selection index does not address a column of the result set.
    #[error("column index {index} out of range: result set has {width} columns")]
    SelectionIndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Width of the result set; valid indices are `0..width`.
        width: usize,
    },

    /// A cell's representation has no text conversion.
    #[error("unsupported scalar kind: {kind}")]
    UnsupportedScalarKind {
        /// Name of the unsupported kind.
        kind: String,
    },

    /// Writing a record to the tabular sink failed.
    #[error("sink write failed: {source}")]
    SinkWrite {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

impl RowcastError {
    /// Returns the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            Self::TableNotFound => ErrorCode::TableNotFound,
            Self::IdConditionMismatch { .. } => ErrorCode::IdConditionMismatch,
            Self::ConditionCompile { .. } => ErrorCode::ConditionCompile,
            Self::StatementBuild { .. } => ErrorCode::StatementBuild,
            Self::ExecutionFailed { .. } => ErrorCode::ExecutionFailed,
            Self::ScanFailed { .. } => ErrorCode::ScanFailed,
            Self::CursorFailed { .. } => ErrorCode::CursorFailed,
            Self::SessionClosed => ErrorCode::SessionClosed,
            Self::SelectionIndexOutOfRange { .. } => ErrorCode::SelectionIndexOutOfRange,
            Self::UnsupportedScalarKind { .. } => ErrorCode::UnsupportedScalarKind,
            Self::SinkWrite { .. } => ErrorCode::SinkWrite,
        }
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a scan failure.
    #[must_use]
    pub fn scan(reason: impl Into<String>) -> Self {
        Self::ScanFailed {
            reason: reason.into(),
        }
    }

    /// Creates a cursor failure.
    #[must_use]
    pub fn cursor(reason: impl Into<String>) -> Self {
        Self::CursorFailed {
            reason: reason.into(),
        }
    }

    /// Creates a condition compile failure.
    #[must_use]
    pub fn condition(reason: impl Into<String>) -> Self {
        Self::ConditionCompile {
            reason: reason.into(),
        }
    }

    /// Creates a statement build failure.
    #[must_use]
    pub fn statement(reason: impl Into<String>) -> Self {
        Self::StatementBuild {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = RowcastError::SelectionIndexOutOfRange { index: 5, width: 3 };
        assert_eq!(err.code(), ErrorCode::SelectionIndexOutOfRange);
        assert_eq!(err.code().category(), "Materialization");
        assert_eq!(RowcastError::TableNotFound.code().category(), "Statement");
    }

    #[test]
    fn test_error_display() {
        let err = RowcastError::SelectionIndexOutOfRange { index: 5, width: 3 };
        assert_eq!(
            err.to_string(),
            "column index 5 out of range: result set has 3 columns"
        );

        let err = RowcastError::UnsupportedScalarKind {
            kind: "map".to_string(),
        };
        assert_eq!(err.to_string(), "unsupported scalar kind: map");
    }

    #[test]
    fn test_general_codes() {
        let err = RowcastError::invalid_argument("empty SQL");
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        assert_eq!(err.code().as_u16(), 0x0003);
        assert_eq!(err.code().category(), "General");
        assert_eq!(RowcastError::scan("short row").code().category(), "Cursor");
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: RowcastError = io_err.into();
        assert_eq!(err.code(), ErrorCode::SinkWrite);
        assert!(err.to_string().contains("pipe closed"));
    }
}
