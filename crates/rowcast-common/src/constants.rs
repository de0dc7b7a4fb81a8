//! System-wide constants.

/// Positional placeholder marker emitted by the statement builders.
pub const PLACEHOLDER: char = '?';

/// Projection used when no column list can be resolved.
pub const WILDCARD: &str = "*";

/// Text a single-NUL-byte blob is normalized to.
///
/// Some drivers report a `BIT(1)` zero as the one-byte blob `\0`.
pub const NUL_BLOB_TEXT: &str = "0";

/// Default field delimiter for tabular export.
pub const DEFAULT_DELIMITER: char = ',';

/// Default quote character for tabular export.
pub const DEFAULT_QUOTE: char = '"';

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(PLACEHOLDER, '?');
        assert_eq!(WILDCARD, "*");
        assert_eq!(NUL_BLOB_TEXT, "0");
        assert_ne!(DEFAULT_DELIMITER, DEFAULT_QUOTE);
    }
}
