//! Dialect identifier quoting.

use rowcast_common::config::Dialect;
use rowcast_common::constants::WILDCARD;

/// Quotes a possibly table-qualified identifier.
///
/// The wildcard, already-quoted names and expressions (anything with a
/// parenthesis or whitespace) are returned unchanged.
pub fn quote_identifier(dialect: Dialect, name: &str) -> String {
    let name = name.trim();
    let (open, close) = dialect.quote_chars();
    if name.is_empty()
        || name == WILDCARD
        || name.starts_with(open)
        || name.contains(['(', ')', ' ', '\t'])
    {
        return name.to_string();
    }
    name.split('.')
        .map(|part| {
            if part == WILDCARD || part.starts_with(open) {
                part.to_string()
            } else {
                format!("{open}{part}{close}")
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Quotes each entry of a comma-separated column list.
///
/// Entries are trimmed and rejoined with `", "`; empty entries are dropped.
pub fn quote_columns(dialect: Dialect, list: &str) -> String {
    list.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| quote_identifier(dialect, part))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier(Dialect::Mysql, "name"), "`name`");
        assert_eq!(quote_identifier(Dialect::Postgres, "u.name"), "\"u\".\"name\"");
        assert_eq!(quote_identifier(Dialect::Mssql, "id"), "[id]");
        assert_eq!(quote_identifier(Dialect::Mysql, "u.*"), "`u`.*");
    }

    #[test]
    fn test_leaves_expressions_alone() {
        assert_eq!(quote_identifier(Dialect::Mysql, "*"), "*");
        assert_eq!(quote_identifier(Dialect::Mysql, "`done`"), "`done`");
        assert_eq!(quote_identifier(Dialect::Mysql, "count(id)"), "count(id)");
        assert_eq!(quote_identifier(Dialect::Mysql, "user u"), "user u");
    }

    #[test]
    fn test_quote_columns() {
        assert_eq!(
            quote_columns(Dialect::Mysql, "dept ,  year,,lower(name)"),
            "`dept`, `year`, lower(name)"
        );
        assert_eq!(quote_columns(Dialect::Sqlite, ""), "");
    }
}
