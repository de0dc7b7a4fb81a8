//! In-memory cursor over a recorded result set.
//!
//! Used by the memory connection, the CLI fixtures, and tests. Failures can
//! be injected at each cursor operation to exercise error paths.

use rowcast_common::error::{RowcastError, RowcastResult};
use rowcast_common::types::ScalarValue;

use super::Cursor;

/// A recorded result set: column names plus rows of raw values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<ScalarValue>>,
    columns_error: Option<String>,
    advance_error_at: Option<usize>,
    scan_error_at: Option<usize>,
    close_error: Option<String>,
}

impl ResultSet {
    /// Creates an empty result set with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Appends a row.
    #[must_use]
    pub fn row<I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = ScalarValue>,
    {
        self.rows.push(values.into_iter().collect());
        self
    }

    /// Appends a row in place.
    pub fn push_row(&mut self, values: Vec<ScalarValue>) {
        self.rows.push(values);
    }

    /// Makes `columns()` fail with the given reason.
    #[must_use]
    pub fn fail_columns(mut self, reason: impl Into<String>) -> Self {
        self.columns_error = Some(reason.into());
        self
    }

    /// Makes advancing to the zero-based row `index` fail.
    #[must_use]
    pub fn fail_advance_at(mut self, index: usize) -> Self {
        self.advance_error_at = Some(index);
        self
    }

    /// Makes scanning the zero-based row `index` fail.
    #[must_use]
    pub fn fail_scan_at(mut self, index: usize) -> Self {
        self.scan_error_at = Some(index);
        self
    }

    /// Makes `close()` fail with the given reason.
    #[must_use]
    pub fn fail_close(mut self, reason: impl Into<String>) -> Self {
        self.close_error = Some(reason.into());
        self
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the recorded rows.
    pub fn rows(&self) -> &[Vec<ScalarValue>] {
        &self.rows
    }

    /// Returns the number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

/// A cursor that replays a [`ResultSet`].
pub struct MemoryCursor<'c> {
    columns: Vec<String>,
    rows: std::vec::IntoIter<Vec<ScalarValue>>,
    current: Option<Vec<ScalarValue>>,
    /// Zero-based index of the current row.
    position: Option<usize>,
    columns_error: Option<String>,
    advance_error_at: Option<usize>,
    scan_error_at: Option<usize>,
    close_error: Option<String>,
    error: Option<RowcastError>,
    closed: bool,
    close_counter: Option<&'c mut usize>,
}

impl<'c> MemoryCursor<'c> {
    /// Creates a cursor positioned before the first row.
    pub fn new(set: ResultSet) -> Self {
        Self {
            columns: set.columns,
            rows: set.rows.into_iter(),
            current: None,
            position: None,
            columns_error: set.columns_error,
            advance_error_at: set.advance_error_at,
            scan_error_at: set.scan_error_at,
            close_error: set.close_error,
            error: None,
            closed: false,
            close_counter: None,
        }
    }

    /// Increments `counter` each time the cursor is closed.
    #[must_use]
    pub fn track_closes(mut self, counter: &'c mut usize) -> Self {
        self.close_counter = Some(counter);
        self
    }

    /// Returns true once the cursor has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Cursor for MemoryCursor<'_> {
    fn columns(&mut self) -> RowcastResult<Vec<String>> {
        if self.closed {
            return Err(RowcastError::cursor("cursor is closed"));
        }
        if let Some(reason) = &self.columns_error {
            return Err(RowcastError::cursor(reason.clone()));
        }
        Ok(self.columns.clone())
    }

    fn advance(&mut self) -> bool {
        if self.closed || self.error.is_some() {
            return false;
        }
        let next = self.position.map_or(0, |p| p + 1);
        if self.advance_error_at == Some(next) {
            self.current = None;
            self.error = Some(RowcastError::cursor(format!(
                "advance failed at row {next}"
            )));
            return false;
        }
        match self.rows.next() {
            Some(row) => {
                self.current = Some(row);
                self.position = Some(next);
                true
            }
            None => {
                self.current = None;
                false
            }
        }
    }

    fn scan_into(&mut self, slots: &mut [ScalarValue]) -> RowcastResult<()> {
        if self.closed {
            return Err(RowcastError::cursor("cursor is closed"));
        }
        let Some(row) = &self.current else {
            return Err(RowcastError::scan("scan called without a current row"));
        };
        if slots.len() != self.columns.len() {
            return Err(RowcastError::scan(format!(
                "expected {} destination slots, got {}",
                self.columns.len(),
                slots.len()
            )));
        }
        if row.len() != self.columns.len() {
            return Err(RowcastError::scan(format!(
                "row has {} values for {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        if self.scan_error_at.is_some() && self.scan_error_at == self.position {
            return Err(RowcastError::scan(format!(
                "scan failed at row {}",
                self.position.unwrap_or_default()
            )));
        }
        slots.clone_from_slice(row);
        Ok(())
    }

    fn close(&mut self) -> RowcastResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.current = None;
        if let Some(counter) = self.close_counter.as_deref_mut() {
            *counter += 1;
        }
        match self.close_error.take() {
            Some(reason) => Err(RowcastError::cursor(reason)),
            None => Ok(()),
        }
    }

    fn take_error(&mut self) -> Option<RowcastError> {
        self.error.take()
    }
}
