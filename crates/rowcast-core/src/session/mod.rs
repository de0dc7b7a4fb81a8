//! Query sessions.
//!
//! A [`Session`] owns a [`Connection`], the chained [`QueryState`], and the
//! statement collaborators. Every entry point resolves one statement, runs
//! it, materializes the cursor in one output shape, and then resets the
//! query state. With `auto_close` enabled the connection is closed after the
//! call on every exit path.

use std::ops::{Deref, DerefMut};

use tracing::{debug, info, warn};

use rowcast_common::config::SessionConfig;
use rowcast_common::error::{RowcastError, RowcastResult};
use rowcast_common::types::ScalarValue;

use crate::assemble::{
    rows_to_byte_maps, rows_to_ordered_maps, rows_to_string_maps, rows_to_string_slices,
    rows_to_value_maps, OrderedRows,
};
use crate::connection::Connection;
use crate::cursor::{Cursor, CursorGuard};
use crate::decode::{BytesMap, StringMap, ValueMap};
use crate::export::{rows_to_sink, TabularSink};
use crate::statement::{
    Cond, ConditionCompiler, QueryRequest, QueryState, SelectBuilder, SqlCondCompiler, Statement,
    StatementBuilder, StatementGenerator,
};

/// A query session over one connection.
pub struct Session<C: Connection> {
    connection: C,
    config: SessionConfig,
    state: QueryState,
    compiler: Box<dyn ConditionCompiler>,
    builder: Box<dyn StatementBuilder>,
    closed: bool,
}

impl<C: Connection> Session<C> {
    /// Creates a session with the default configuration.
    pub fn new(connection: C) -> Self {
        let config = SessionConfig::default();
        Self {
            connection,
            builder: Box::new(SelectBuilder::new(config.dialect)),
            compiler: Box::new(SqlCondCompiler::new()),
            config,
            state: QueryState::new(),
            closed: false,
        }
    }

    /// Creates a session with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RowcastError::InvalidConfig`] if the configuration does not
    /// validate.
    pub fn with_config(connection: C, config: SessionConfig) -> RowcastResult<Self> {
        config
            .validate()
            .map_err(|message| RowcastError::InvalidConfig { message })?;
        let mut session = Self::new(connection);
        session.builder = Box::new(SelectBuilder::new(config.dialect));
        session.config = config;
        Ok(session)
    }

    /// Replaces the condition compiler.
    #[must_use]
    pub fn with_compiler(mut self, compiler: impl ConditionCompiler + 'static) -> Self {
        self.compiler = Box::new(compiler);
        self
    }

    /// Replaces the statement builder.
    #[must_use]
    pub fn with_builder(mut self, builder: impl StatementBuilder + 'static) -> Self {
        self.builder = Box::new(builder);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the connection.
    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// Returns the connection mutably.
    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    /// Consumes the session and returns its connection.
    pub fn into_connection(self) -> C {
        self.connection
    }

    /// Returns the recorded query state.
    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// Returns true once the session has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Closes the session and its connection. Closing twice is a no-op.
    pub fn close(&mut self) -> RowcastResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.state.reset();
        self.connection.close()
    }

    // Chained query state.

    /// Records raw SQL for the next call.
    pub fn sql(&mut self, sql: impl Into<String>, args: Vec<ScalarValue>) -> &mut Self {
        self.state.sql(sql, args);
        self
    }

    /// Sets the table.
    pub fn table(&mut self, table: impl Into<String>) -> &mut Self {
        self.state.table(table);
        self
    }

    /// Restricts the projection to the given columns.
    pub fn cols<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.cols(columns);
        self
    }

    /// Sets a raw select expression.
    pub fn select(&mut self, expr: impl Into<String>) -> &mut Self {
        self.state.select(expr);
        self
    }

    /// Adds a join clause.
    pub fn join(
        &mut self,
        operator: &str,
        table: impl Into<String>,
        on: &str,
        args: Vec<ScalarValue>,
    ) -> &mut Self {
        self.state.join(operator, table, on, args);
        self
    }

    /// Sets the GROUP BY column list.
    pub fn group_by(&mut self, columns: impl Into<String>) -> &mut Self {
        self.state.group_by(columns);
        self
    }

    /// Sets the HAVING fragment.
    pub fn having(&mut self, fragment: impl Into<String>) -> &mut Self {
        self.state.having(fragment);
        self
    }

    /// ANDs a condition onto the WHERE clause.
    pub fn and_where(&mut self, cond: Cond) -> &mut Self {
        self.state.and_where(cond);
        self
    }

    /// ORs a condition onto the WHERE clause.
    pub fn or_where(&mut self, cond: Cond) -> &mut Self {
        self.state.or_where(cond);
        self
    }

    /// Describes the mapped record.
    pub fn mapping<I, J, S, T>(&mut self, columns: I, primary_keys: J) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        self.state.mapping(columns, primary_keys);
        self
    }

    /// Filters by primary key values.
    pub fn id<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ScalarValue>,
    {
        self.state.id(values);
        self
    }

    /// Appends an ORDER BY entry.
    pub fn order_by(&mut self, order: impl Into<String>) -> &mut Self {
        self.state.order_by(order);
        self
    }

    /// Sets the row limit and offset.
    pub fn limit(&mut self, limit: u64, offset: u64) -> &mut Self {
        self.state.limit(limit, offset);
        self
    }

    /// Locks selected rows.
    pub fn for_update(&mut self) -> &mut Self {
        self.state.for_update();
        self
    }

    // Entry points.

    /// Resolves the statement a call would run, without running it.
    ///
    /// The query state is left untouched.
    pub fn plan(&self, request: impl Into<QueryRequest>) -> RowcastResult<Statement> {
        self.generator().resolve(request.into(), &self.state)
    }

    /// Runs the query and returns rows as column name to bytes.
    pub fn query(&mut self, request: impl Into<QueryRequest>) -> RowcastResult<Vec<BytesMap>> {
        self.run(request.into(), |cursor| rows_to_byte_maps(cursor))
    }

    /// Runs the query and returns rows as column name to text.
    pub fn query_string(
        &mut self,
        request: impl Into<QueryRequest>,
    ) -> RowcastResult<Vec<StringMap>> {
        self.run(request.into(), |cursor| rows_to_string_maps(cursor))
    }

    /// Runs the query and returns rows as text values in column order.
    pub fn query_slice_string(
        &mut self,
        request: impl Into<QueryRequest>,
    ) -> RowcastResult<Vec<Vec<String>>> {
        self.run(request.into(), |cursor| rows_to_string_slices(cursor))
    }

    /// Runs the query and returns rows as column name to driver value.
    pub fn query_value(&mut self, request: impl Into<QueryRequest>) -> RowcastResult<Vec<ValueMap>> {
        self.run(request.into(), |cursor| rows_to_value_maps(cursor))
    }

    /// Runs the query and returns text rows restricted and reordered by
    /// `selection`, with the effective column list.
    pub fn query_ordered(
        &mut self,
        request: impl Into<QueryRequest>,
        selection: &[usize],
    ) -> RowcastResult<OrderedRows> {
        self.run(request.into(), |cursor| rows_to_ordered_maps(cursor, selection))
    }

    /// Streams the query result to `sink` and returns the number of data rows.
    pub fn export_query<S: TabularSink + ?Sized>(
        &mut self,
        request: impl Into<QueryRequest>,
        sink: &mut S,
        selection: &[usize],
    ) -> RowcastResult<usize> {
        self.run(request.into(), |cursor| rows_to_sink(cursor, sink, selection))
    }

    fn generator(&self) -> StatementGenerator<'_> {
        StatementGenerator::new(self.config.dialect, &*self.compiler, &*self.builder)
    }

    fn run<T, F>(&mut self, request: QueryRequest, materialize: F) -> RowcastResult<T>
    where
        F: FnOnce(&mut dyn Cursor) -> RowcastResult<T>,
    {
        if self.closed {
            return Err(RowcastError::SessionClosed);
        }
        let mut call = CallGuard::new(self);
        let result = call.execute(request, materialize);
        let finished = call.finish();
        match (result, finished) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close)) => {
                warn!("Failed to close session after query error: {}", close);
                Err(e)
            }
        }
    }

    fn execute<T, F>(&mut self, request: QueryRequest, materialize: F) -> RowcastResult<T>
    where
        F: FnOnce(&mut dyn Cursor) -> RowcastResult<T>,
    {
        let statement = self.generator().resolve(request, &self.state)?;
        if self.config.show_sql {
            info!("[SQL] {} {:?}", statement.sql, statement.args);
        } else {
            debug!(
                sql = %statement.sql,
                args = statement.args.len(),
                origin = ?statement.origin,
                "Executing query"
            );
        }

        let cursor = self.connection.query(&statement.sql, &statement.args)?;
        let mut cursor = CursorGuard::new(cursor);
        let value = materialize(&mut *cursor)?;
        cursor.finish()?;
        Ok(value)
    }

    /// Per-call cleanup: the state is reset, and the connection is closed
    /// when auto-close is on.
    fn after_call(&mut self) -> RowcastResult<()> {
        self.state.reset();
        if self.config.auto_close {
            self.close()
        } else {
            Ok(())
        }
    }
}

/// Runs [`Session::after_call`] when a call ends.
///
/// [`CallGuard::finish`] reports a cleanup failure; dropping the guard
/// without finishing still cleans up and logs the failure.
struct CallGuard<'s, C: Connection> {
    session: &'s mut Session<C>,
    armed: bool,
}

impl<'s, C: Connection> CallGuard<'s, C> {
    fn new(session: &'s mut Session<C>) -> Self {
        Self {
            session,
            armed: true,
        }
    }

    fn finish(mut self) -> RowcastResult<()> {
        self.armed = false;
        self.session.after_call()
    }
}

impl<C: Connection> Deref for CallGuard<'_, C> {
    type Target = Session<C>;

    fn deref(&self) -> &Session<C> {
        self.session
    }
}

impl<C: Connection> DerefMut for CallGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut Session<C> {
        self.session
    }
}

impl<C: Connection> Drop for CallGuard<'_, C> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = self.session.after_call() {
            warn!("Failed to close session: {}", e);
        }
    }
}
