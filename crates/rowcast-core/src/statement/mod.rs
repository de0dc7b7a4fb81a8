//! Statement generation.
//!
//! Resolves the SQL text and positional arguments for one query call. An
//! explicit request wins; otherwise raw SQL recorded on the [`QueryState`] is
//! used verbatim; otherwise the structured fragments are assembled into a
//! SELECT through a [`ConditionCompiler`] and a [`StatementBuilder`].

mod builder;
mod cond;
mod quote;

use std::fmt;

use rowcast_common::config::Dialect;
use rowcast_common::constants::{PLACEHOLDER, WILDCARD};
use rowcast_common::error::{RowcastError, RowcastResult};
use rowcast_common::types::ScalarValue;

pub use builder::{SelectBuilder, SelectRequest, StatementBuilder};
pub use cond::{Cond, ConditionCompiler, SqlCondCompiler};
pub use quote::{quote_columns, quote_identifier};

/// Anything that can render itself to SQL and arguments.
pub trait ToSql {
    /// Renders the statement.
    fn to_sql(&self) -> RowcastResult<(String, Vec<ScalarValue>)>;
}

/// What a query call should execute.
pub enum QueryRequest {
    /// Use the session's recorded query state.
    Session,
    /// A SQL string with positional arguments.
    Sql {
        /// Statement text.
        sql: String,
        /// Positional arguments.
        args: Vec<ScalarValue>,
    },
    /// A statement source rendered on demand.
    Built(Box<dyn ToSql>),
}

impl QueryRequest {
    /// Wraps a statement source.
    pub fn built(source: impl ToSql + 'static) -> Self {
        QueryRequest::Built(Box::new(source))
    }

    /// Appends a positional argument to a SQL request.
    ///
    /// Has no effect on other request kinds.
    #[must_use]
    pub fn arg(mut self, value: impl Into<ScalarValue>) -> Self {
        if let QueryRequest::Sql { args, .. } = &mut self {
            args.push(value.into());
        }
        self
    }
}

impl fmt::Debug for QueryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryRequest::Session => f.write_str("Session"),
            QueryRequest::Sql { sql, args } => f
                .debug_struct("Sql")
                .field("sql", sql)
                .field("args", args)
                .finish(),
            QueryRequest::Built(_) => f.write_str("Built(..)"),
        }
    }
}

impl From<()> for QueryRequest {
    fn from((): ()) -> Self {
        QueryRequest::Session
    }
}

impl From<&str> for QueryRequest {
    fn from(sql: &str) -> Self {
        QueryRequest::Sql {
            sql: sql.to_string(),
            args: Vec::new(),
        }
    }
}

impl From<String> for QueryRequest {
    fn from(sql: String) -> Self {
        QueryRequest::Sql {
            sql,
            args: Vec::new(),
        }
    }
}

impl<S: Into<String>> From<(S, Vec<ScalarValue>)> for QueryRequest {
    fn from((sql, args): (S, Vec<ScalarValue>)) -> Self {
        QueryRequest::Sql {
            sql: sql.into(),
            args,
        }
    }
}

impl From<Statement> for QueryRequest {
    fn from(statement: Statement) -> Self {
        QueryRequest::Sql {
            sql: statement.sql,
            args: statement.args,
        }
    }
}

/// Where a resolved statement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementOrigin {
    /// Passed to the query call.
    Explicit,
    /// Raw SQL recorded on the query state.
    Raw,
    /// Assembled from structured query state.
    Structured,
}

/// A resolved statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// SQL text.
    pub sql: String,
    /// Positional arguments.
    pub args: Vec<ScalarValue>,
    /// Resolution path.
    pub origin: StatementOrigin,
}

impl ToSql for Statement {
    fn to_sql(&self) -> RowcastResult<(String, Vec<ScalarValue>)> {
        Ok((self.sql.clone(), self.args.clone()))
    }
}

impl ToSql for Cond {
    /// Renders the condition alone, as used for sub-query fragments.
    fn to_sql(&self) -> RowcastResult<(String, Vec<ScalarValue>)> {
        SqlCondCompiler::new().compile(self)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
struct RawSql {
    sql: String,
    args: Vec<ScalarValue>,
}

/// Query fragments recorded by chained session calls.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryState {
    raw: Option<RawSql>,
    table: String,
    columns: Vec<String>,
    select: String,
    join: Vec<String>,
    join_args: Vec<ScalarValue>,
    group_by: String,
    having: String,
    condition: Cond,
    mapped_columns: Vec<String>,
    primary_keys: Vec<String>,
    id_values: Option<Vec<ScalarValue>>,
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: u64,
    for_update: bool,
}

impl QueryState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records raw SQL that overrides every structured fragment.
    pub fn sql(&mut self, sql: impl Into<String>, args: Vec<ScalarValue>) -> &mut Self {
        self.raw = Some(RawSql {
            sql: sql.into(),
            args,
        });
        self
    }

    /// Sets the table.
    pub fn table(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = table.into();
        self
    }

    /// Returns the table, empty if unset.
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Restricts the projection to the given columns.
    pub fn cols<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Sets a raw select expression that replaces the projection.
    pub fn select(&mut self, expr: impl Into<String>) -> &mut Self {
        self.select = expr.into();
        self
    }

    /// Adds a join clause, e.g. `join("INNER", "dept", "user.dept_id = dept.id", vec![])`.
    pub fn join(
        &mut self,
        operator: &str,
        table: impl Into<String>,
        on: &str,
        args: Vec<ScalarValue>,
    ) -> &mut Self {
        self.join
            .push(format!("{} JOIN {} ON {on}", operator.to_uppercase(), table.into()));
        self.join_args.extend(args);
        self
    }

    /// Sets the GROUP BY column list.
    pub fn group_by(&mut self, columns: impl Into<String>) -> &mut Self {
        self.group_by = columns.into();
        self
    }

    /// Sets the HAVING fragment.
    pub fn having(&mut self, fragment: impl Into<String>) -> &mut Self {
        self.having = fragment.into();
        self
    }

    /// ANDs a condition onto the WHERE clause.
    pub fn and_where(&mut self, cond: Cond) -> &mut Self {
        self.condition = std::mem::take(&mut self.condition).and(cond);
        self
    }

    /// ORs a condition onto the WHERE clause.
    pub fn or_where(&mut self, cond: Cond) -> &mut Self {
        self.condition = std::mem::take(&mut self.condition).or(cond);
        self
    }

    /// Describes the mapped record: its columns and primary keys.
    pub fn mapping<I, J, S, T>(&mut self, columns: I, primary_keys: J) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        self.mapped_columns = columns.into_iter().map(Into::into).collect();
        self.primary_keys = primary_keys.into_iter().map(Into::into).collect();
        self
    }

    /// Filters by primary key values, one per key column.
    pub fn id<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ScalarValue>,
    {
        self.id_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Appends an ORDER BY entry.
    pub fn order_by(&mut self, order: impl Into<String>) -> &mut Self {
        self.order_by.push(order.into());
        self
    }

    /// Sets the row limit and the number of rows to skip.
    pub fn limit(&mut self, limit: u64, offset: u64) -> &mut Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }

    /// Locks selected rows.
    pub fn for_update(&mut self) -> &mut Self {
        self.for_update = true;
        self
    }

    /// Clears every fragment.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Resolves statements for one dialect.
pub struct StatementGenerator<'a> {
    dialect: Dialect,
    compiler: &'a dyn ConditionCompiler,
    builder: &'a dyn StatementBuilder,
}

impl<'a> StatementGenerator<'a> {
    /// Creates a generator over the given collaborators.
    pub fn new(
        dialect: Dialect,
        compiler: &'a dyn ConditionCompiler,
        builder: &'a dyn StatementBuilder,
    ) -> Self {
        Self {
            dialect,
            compiler,
            builder,
        }
    }

    /// Resolves the statement for `request` against `state`.
    ///
    /// # Errors
    ///
    /// - [`RowcastError::InvalidArgument`] for empty explicit SQL
    /// - [`RowcastError::TableNotFound`] when structured state has no table
    /// - [`RowcastError::IdConditionMismatch`] when id values and primary
    ///   keys differ in count
    /// - compiler and builder failures
    pub fn resolve(&self, request: QueryRequest, state: &QueryState) -> RowcastResult<Statement> {
        match request {
            QueryRequest::Sql { sql, args } => explicit(sql, args),
            QueryRequest::Built(source) => {
                let (sql, args) = source.to_sql()?;
                explicit(sql, args)
            }
            QueryRequest::Session => match &state.raw {
                Some(raw) => Ok(Statement {
                    sql: raw.sql.clone(),
                    args: raw.args.clone(),
                    origin: StatementOrigin::Raw,
                }),
                None => self.structured(state),
            },
        }
    }

    fn structured(&self, state: &QueryState) -> RowcastResult<Statement> {
        if state.table.is_empty() {
            return Err(RowcastError::TableNotFound);
        }

        let columns = self.projection(state);
        let condition = self.id_condition(state)?;
        let (condition_sql, condition_args) = self.compiler.compile(&condition)?;

        let mut args = state.join_args.clone();
        args.extend(condition_args);

        let request = SelectRequest {
            table: state.table.clone(),
            columns,
            join: state.join.join(" "),
            condition: condition_sql,
            group_by: state.group_by.clone(),
            having: state.having.clone(),
            order_by: state.order_by.join(", "),
            limit: state.limit,
            offset: state.offset,
            for_update: state.for_update,
            key_column: state
                .primary_keys
                .first()
                .or_else(|| state.mapped_columns.first())
                .cloned(),
        };
        let sql = self.builder.build_select(&request)?;

        // Paged dialects may repeat the condition in a sub-select.
        let markers = sql.matches(PLACEHOLDER).count();
        if !args.is_empty() && markers == args.len() * 2 {
            args.extend_from_within(..);
        }

        Ok(Statement {
            sql,
            args,
            origin: StatementOrigin::Structured,
        })
    }

    fn projection(&self, state: &QueryState) -> String {
        if !state.select.is_empty() {
            return state.select.clone();
        }
        let mut columns = quote_columns(self.dialect, &state.columns.join(","));
        if columns.is_empty() {
            columns = if !state.group_by.is_empty() {
                quote_columns(self.dialect, &state.group_by)
            } else if !state.join.is_empty() {
                WILDCARD.to_string()
            } else {
                quote_columns(self.dialect, &state.mapped_columns.join(","))
            };
        }
        if columns.is_empty() {
            columns = WILDCARD.to_string();
        }
        columns
    }

    fn id_condition(&self, state: &QueryState) -> RowcastResult<Cond> {
        let Some(values) = &state.id_values else {
            return Ok(state.condition.clone());
        };
        if values.len() != state.primary_keys.len() {
            return Err(RowcastError::IdConditionMismatch {
                expected: state.primary_keys.len(),
                actual: values.len(),
            });
        }
        let mut condition = state.condition.clone();
        for (key, value) in state.primary_keys.iter().zip(values) {
            let column = if state.join.is_empty() {
                quote_identifier(self.dialect, key)
            } else {
                quote_identifier(self.dialect, &format!("{}.{key}", state.table))
            };
            condition = condition.and(Cond::Eq(column, value.clone()));
        }
        Ok(condition)
    }
}

fn explicit(sql: String, args: Vec<ScalarValue>) -> RowcastResult<Statement> {
    if sql.trim().is_empty() {
        return Err(RowcastError::invalid_argument("empty SQL statement"));
    }
    Ok(Statement {
        sql,
        args,
        origin: StatementOrigin::Explicit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(dialect: Dialect, request: QueryRequest, state: &QueryState) -> RowcastResult<Statement> {
        let compiler = SqlCondCompiler::new();
        let builder = SelectBuilder::new(dialect);
        StatementGenerator::new(dialect, &compiler, &builder).resolve(request, state)
    }

    fn mysql(state: &QueryState) -> Statement {
        resolve(Dialect::Mysql, QueryRequest::Session, state).unwrap()
    }

    #[test]
    fn test_explicit_wins() {
        let mut state = QueryState::new();
        state.sql("SELECT 2", Vec::new()).table("user");
        let stmt = resolve(
            Dialect::Mysql,
            QueryRequest::from("SELECT ? + ?").arg(1i32).arg(2i32),
            &state,
        )
        .unwrap();
        assert_eq!(stmt.origin, StatementOrigin::Explicit);
        assert_eq!(stmt.sql, "SELECT ? + ?");
        assert_eq!(stmt.args.len(), 2);
    }

    #[test]
    fn test_explicit_never_doubles() {
        let stmt = resolve(
            Dialect::Mysql,
            QueryRequest::from(("SELECT ?, ?", vec![ScalarValue::Int32(1)])),
            &QueryState::new(),
        )
        .unwrap();
        assert_eq!(stmt.args.len(), 1);
    }

    #[test]
    fn test_built_source() {
        let stmt = resolve(
            Dialect::Mysql,
            QueryRequest::built(Cond::eq("a", 1i32)),
            &QueryState::new(),
        )
        .unwrap();
        assert_eq!(stmt.sql, "a=?");
        assert_eq!(stmt.origin, StatementOrigin::Explicit);
    }

    #[test]
    fn test_empty_explicit_sql() {
        let err = resolve(Dialect::Mysql, QueryRequest::from("  "), &QueryState::new()).unwrap_err();
        assert!(matches!(err, RowcastError::InvalidArgument { .. }));
    }

    #[test]
    fn test_raw_state() {
        let mut state = QueryState::new();
        state.sql("SELECT * FROM t WHERE a = ?", vec![ScalarValue::Int32(1)]);
        let stmt = mysql(&state);
        assert_eq!(stmt.origin, StatementOrigin::Raw);
        assert_eq!(stmt.args, vec![ScalarValue::Int32(1)]);
    }

    #[test]
    fn test_structured_requires_table() {
        let err = resolve(Dialect::Mysql, QueryRequest::Session, &QueryState::new()).unwrap_err();
        assert!(matches!(err, RowcastError::TableNotFound));
    }

    #[test]
    fn test_projection_precedence() {
        let mut state = QueryState::new();
        state.table("user").mapping(["id", "name"], ["id"]);
        assert_eq!(mysql(&state).sql, "SELECT `id`, `name` FROM `user`");

        state.group_by("dept, year");
        assert_eq!(
            mysql(&state).sql,
            "SELECT `dept`, `year` FROM `user` GROUP BY dept, year"
        );

        state.cols(["name"]);
        assert!(mysql(&state).sql.starts_with("SELECT `name` FROM"));

        state.select("count(*) AS n");
        assert!(mysql(&state).sql.starts_with("SELECT count(*) AS n FROM"));
    }

    #[test]
    fn test_join_projects_wildcard() {
        let mut state = QueryState::new();
        state
            .table("user")
            .mapping(["id", "name"], ["id"])
            .join("inner", "dept", "user.dept_id = dept.id", Vec::new());
        assert_eq!(
            mysql(&state).sql,
            "SELECT * FROM `user` INNER JOIN dept ON user.dept_id = dept.id"
        );

        state.group_by("dept.name");
        assert!(mysql(&state).sql.starts_with("SELECT `dept`.`name` FROM"));
    }

    #[test]
    fn test_unmapped_table_projects_wildcard() {
        let mut state = QueryState::new();
        state.table("t");
        assert_eq!(mysql(&state).sql, "SELECT * FROM `t`");
    }

    #[test]
    fn test_join_args_precede_condition_args() {
        let mut state = QueryState::new();
        state
            .table("user")
            .join("LEFT", "dept", "dept.id = user.dept_id AND dept.active = ?", vec![true.into()])
            .and_where(Cond::eq("user.age", 30i32));
        let stmt = mysql(&state);
        assert_eq!(stmt.args, vec![ScalarValue::Bool(true), ScalarValue::Int32(30)]);
        assert!(stmt.sql.ends_with("WHERE user.age=?"));
    }

    #[test]
    fn test_id_folding() {
        let mut state = QueryState::new();
        state
            .table("order_item")
            .mapping(["order_id", "line", "qty"], ["order_id", "line"])
            .and_where(Cond::gt("qty", 0i32))
            .id([7i64, 2]);
        let stmt = mysql(&state);
        assert!(stmt.sql.ends_with("WHERE qty>? AND `order_id`=? AND `line`=?"));
        assert_eq!(
            stmt.args,
            vec![ScalarValue::Int32(0), ScalarValue::Int64(7), ScalarValue::Int64(2)]
        );
    }

    #[test]
    fn test_id_mismatch() {
        let mut state = QueryState::new();
        state.table("user").mapping(["id"], ["id"]).id([1i64, 2]);
        let err = resolve(Dialect::Mysql, QueryRequest::Session, &state).unwrap_err();
        assert!(matches!(
            err,
            RowcastError::IdConditionMismatch { expected: 1, actual: 2 }
        ));
    }

    #[test]
    fn test_mssql_paging_doubles_args() {
        let mut state = QueryState::new();
        state
            .table("user")
            .mapping(["id", "name"], ["id"])
            .and_where(Cond::eq("name", "bo"))
            .order_by("id")
            .limit(10, 20);
        let stmt = resolve(Dialect::Mssql, QueryRequest::Session, &state).unwrap();
        assert_eq!(stmt.sql.matches('?').count(), 2);
        assert_eq!(stmt.args, vec![ScalarValue::text("bo"), ScalarValue::text("bo")]);
    }

    #[test]
    fn test_standard_paging_keeps_args() {
        let mut state = QueryState::new();
        state
            .table("user")
            .and_where(Cond::eq("name", "bo"))
            .limit(10, 20);
        let stmt = mysql(&state);
        assert!(stmt.sql.ends_with("LIMIT 10 OFFSET 20"));
        assert_eq!(stmt.args.len(), 1);
    }

    #[test]
    fn test_reset() {
        let mut state = QueryState::new();
        state.table("user").limit(1, 0).for_update();
        state.reset();
        assert_eq!(state, QueryState::default());
        assert!(state.table_name().is_empty());
    }
}
