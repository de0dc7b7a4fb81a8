//! SELECT statement assembly per dialect.

use std::fmt::Write;

use rowcast_common::config::Dialect;
use rowcast_common::error::{RowcastError, RowcastResult};

use super::quote::quote_identifier;

/// The resolved pieces of a SELECT.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectRequest {
    /// Table name, quoted by the builder.
    pub table: String,
    /// Projection, already resolved and quoted.
    pub columns: String,
    /// Join clauses, rendered verbatim after the table.
    pub join: String,
    /// Compiled condition fragment.
    pub condition: String,
    /// GROUP BY list.
    pub group_by: String,
    /// HAVING fragment.
    pub having: String,
    /// ORDER BY list.
    pub order_by: String,
    /// Row limit.
    pub limit: Option<u64>,
    /// Rows to skip.
    pub offset: u64,
    /// Lock selected rows.
    pub for_update: bool,
    /// Column used to page by exclusion where the dialect has no OFFSET.
    pub key_column: Option<String>,
}

/// Renders a [`SelectRequest`] as SQL.
pub trait StatementBuilder {
    /// Builds the SELECT statement.
    fn build_select(&self, request: &SelectRequest) -> RowcastResult<String>;
}

/// The default [`StatementBuilder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectBuilder {
    dialect: Dialect,
}

impl SelectBuilder {
    /// Creates a builder for `dialect`.
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Returns the dialect.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn from_clause(&self, request: &SelectRequest) -> String {
        let mut from = format!(" FROM {}", quote_identifier(self.dialect, &request.table));
        if !request.join.is_empty() {
            from.push(' ');
            from.push_str(&request.join);
        }
        from
    }

    fn where_clause(request: &SelectRequest) -> String {
        if request.condition.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", request.condition)
        }
    }

    fn order_clause(request: &SelectRequest) -> String {
        if request.order_by.is_empty() {
            String::new()
        } else {
            format!(" ORDER BY {}", request.order_by)
        }
    }

    fn tail_clauses(sql: &mut String, request: &SelectRequest) {
        if !request.group_by.is_empty() {
            let _ = write!(sql, " GROUP BY {}", request.group_by);
        }
        if !request.having.is_empty() {
            let _ = write!(sql, " HAVING {}", request.having);
        }
        sql.push_str(&Self::order_clause(request));
    }

    fn build_standard(&self, request: &SelectRequest) -> String {
        let mut sql = format!(
            "SELECT {}{}{}",
            request.columns,
            self.from_clause(request),
            Self::where_clause(request)
        );
        Self::tail_clauses(&mut sql, request);

        match (request.limit, request.offset) {
            (Some(limit), 0) => {
                let _ = write!(sql, " LIMIT {limit}");
            }
            (Some(limit), offset) => {
                let _ = write!(sql, " LIMIT {limit} OFFSET {offset}");
            }
            (None, 0) => {}
            (None, offset) => match self.dialect {
                Dialect::Mysql => {
                    let _ = write!(sql, " LIMIT {} OFFSET {offset}", u64::MAX);
                }
                Dialect::Sqlite => {
                    let _ = write!(sql, " LIMIT -1 OFFSET {offset}");
                }
                _ => {
                    let _ = write!(sql, " OFFSET {offset}");
                }
            },
        }

        if request.for_update && matches!(self.dialect, Dialect::Mysql | Dialect::Postgres) {
            sql.push_str(" FOR UPDATE");
        }
        sql
    }

    /// TOP paging; an offset excludes the first rows by key with a sub-select
    /// that repeats the condition.
    fn build_mssql(&self, request: &SelectRequest) -> RowcastResult<String> {
        let top = request
            .limit
            .map(|n| format!("TOP {n} "))
            .unwrap_or_default();
        let from = self.from_clause(request);
        let where_clause = Self::where_clause(request);
        let mut sql = format!("SELECT {top}{}{from}{where_clause}", request.columns);

        if request.offset > 0 {
            let key = request.key_column.as_deref().ok_or_else(|| {
                RowcastError::statement("offset paging on mssql requires a key column")
            })?;
            let key = if request.join.is_empty() {
                quote_identifier(self.dialect, key)
            } else {
                quote_identifier(self.dialect, &format!("{}.{key}", request.table))
            };
            let exclusion = format!(
                "({key} NOT IN (SELECT TOP {} {key}{from}{where_clause}{}))",
                request.offset,
                Self::order_clause(request)
            );
            if where_clause.is_empty() {
                let _ = write!(sql, " WHERE {exclusion}");
            } else {
                let _ = write!(sql, " AND {exclusion}");
            }
        }

        Self::tail_clauses(&mut sql, request);
        Ok(sql)
    }
}

impl StatementBuilder for SelectBuilder {
    fn build_select(&self, request: &SelectRequest) -> RowcastResult<String> {
        if request.table.is_empty() {
            return Err(RowcastError::TableNotFound);
        }
        if request.columns.is_empty() {
            return Err(RowcastError::statement("empty projection"));
        }
        match self.dialect {
            Dialect::Mssql => self.build_mssql(request),
            _ => Ok(self.build_standard(request)),
        }
    }
}
