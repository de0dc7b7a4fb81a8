//! Session and export configuration structures.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{DEFAULT_DELIMITER, DEFAULT_QUOTE};

/// SQL dialect the statement builder renders for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// MySQL / MariaDB.
    #[default]
    Mysql,
    /// PostgreSQL.
    Postgres,
    /// SQLite.
    Sqlite,
    /// Microsoft SQL Server.
    Mssql,
}

impl Dialect {
    /// Returns the opening and closing identifier quote characters.
    #[must_use]
    pub const fn quote_chars(self) -> (char, char) {
        match self {
            Dialect::Mysql => ('`', '`'),
            Dialect::Postgres | Dialect::Sqlite => ('"', '"'),
            Dialect::Mssql => ('[', ']'),
        }
    }

    /// Parses a dialect name, accepting common aliases.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Dialect::Mysql),
            "postgres" | "postgresql" | "pg" => Some(Dialect::Postgres),
            "sqlite" | "sqlite3" => Some(Dialect::Sqlite),
            "mssql" | "sqlserver" => Some(Dialect::Mssql),
            _ => None,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Mysql => write!(f, "mysql"),
            Dialect::Postgres => write!(f, "postgres"),
            Dialect::Sqlite => write!(f, "sqlite"),
            Dialect::Mssql => write!(f, "mssql"),
        }
    }
}

/// Record terminator for tabular export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineTerminator {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    Crlf,
}

impl LineTerminator {
    /// Returns the terminator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            LineTerminator::Lf => "\n",
            LineTerminator::Crlf => "\r\n",
        }
    }
}

/// Tabular export configuration.
///
/// # Example
///
/// ```rust
/// use rowcast_common::config::ExportConfig;
///
/// let config = ExportConfig::tsv();
/// assert_eq!(config.delimiter, '\t');
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Field delimiter.
    /// Default: `,`
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Quote character used around fields that need escaping.
    /// Default: `"`
    #[serde(default = "default_quote")]
    pub quote: char,

    /// Record terminator.
    #[serde(default)]
    pub line_terminator: LineTerminator,

    /// Quote every field, not only the ones that need it.
    #[serde(default)]
    pub quote_all: bool,
}

fn default_delimiter() -> char {
    DEFAULT_DELIMITER
}

fn default_quote() -> char {
    DEFAULT_QUOTE
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            quote: DEFAULT_QUOTE,
            line_terminator: LineTerminator::Lf,
            quote_all: false,
        }
    }
}

impl ExportConfig {
    /// Tab-separated export.
    #[must_use]
    pub fn tsv() -> Self {
        Self {
            delimiter: '\t',
            ..Default::default()
        }
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.delimiter == self.quote {
            return Err("delimiter and quote must differ".to_string());
        }
        if matches!(self.delimiter, '\r' | '\n') || matches!(self.quote, '\r' | '\n') {
            return Err("delimiter and quote cannot be line breaks".to_string());
        }
        Ok(())
    }
}

/// Session configuration.
///
/// # Example
///
/// ```rust
/// use rowcast_common::config::{Dialect, SessionConfig};
///
/// let config = SessionConfig::default();
/// assert_eq!(config.dialect, Dialect::Mysql);
/// assert!(!config.auto_close);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Dialect used to quote identifiers and render paging.
    #[serde(default)]
    pub dialect: Dialect,

    /// Close the session's connection after every query call.
    #[serde(default)]
    pub auto_close: bool,

    /// Log every generated statement at `info` instead of `debug`.
    #[serde(default)]
    pub show_sql: bool,

    /// Export settings.
    #[serde(default)]
    pub export: ExportConfig,
}

impl SessionConfig {
    /// Creates a configuration for the given dialect.
    #[must_use]
    pub fn with_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Default::default()
        }
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.export.validate().map_err(|e| format!("export: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.dialect, Dialect::Mysql);
        assert!(!config.auto_close);
        assert!(!config.show_sql);
        assert_eq!(config.export.delimiter, ',');
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_quote_chars() {
        assert_eq!(Dialect::Mysql.quote_chars(), ('`', '`'));
        assert_eq!(Dialect::Postgres.quote_chars(), ('"', '"'));
        assert_eq!(Dialect::Mssql.quote_chars(), ('[', ']'));
    }

    #[test]
    fn test_dialect_from_name() {
        assert_eq!(Dialect::from_name("PostgreSQL"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_name("sqlserver"), Some(Dialect::Mssql));
        assert_eq!(Dialect::from_name("oracle"), None);
    }

    #[test]
    fn test_invalid_export() {
        let config = ExportConfig {
            delimiter: '"',
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let session = SessionConfig {
            export: config,
            ..Default::default()
        };
        assert!(session.validate().unwrap_err().starts_with("export:"));
    }

    #[test]
    fn test_deserialize_partial() {
        let json = r#"{"dialect": "mssql", "export": {"delimiter": ";"}}"#;
        let config: SessionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.dialect, Dialect::Mssql);
        assert_eq!(config.export.delimiter, ';');
        assert_eq!(config.export.quote, '"');
        assert_eq!(config.export.line_terminator, LineTerminator::Lf);
    }
}
