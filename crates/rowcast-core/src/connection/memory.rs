//! A connection that replays queued result sets.

use std::collections::VecDeque;

use tracing::trace;

use rowcast_common::error::{RowcastError, RowcastResult};
use rowcast_common::types::ScalarValue;

use super::Connection;
use crate::cursor::{Cursor, MemoryCursor, ResultSet};

/// Replays queued [`ResultSet`]s, one per executed statement, and records
/// every statement it receives.
#[derive(Debug)]
pub struct MemoryConnection {
    pending: VecDeque<ResultSet>,
    executed: Vec<(String, Vec<ScalarValue>)>,
    fail_next: Option<String>,
    open: bool,
    closes: usize,
    cursor_closes: usize,
}

impl MemoryConnection {
    /// Creates an open connection with nothing queued.
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            executed: Vec::new(),
            fail_next: None,
            open: true,
            closes: 0,
            cursor_closes: 0,
        }
    }

    /// Queues the result of the next statement.
    #[must_use]
    pub fn with_result(mut self, set: ResultSet) -> Self {
        self.pending.push_back(set);
        self
    }

    /// Queues a result set in place.
    pub fn push_result(&mut self, set: ResultSet) {
        self.pending.push_back(set);
    }

    /// Makes the next execution fail.
    pub fn fail_next(&mut self, reason: impl Into<String>) {
        self.fail_next = Some(reason.into());
    }

    /// Returns every executed statement with its arguments.
    pub fn executed(&self) -> &[(String, Vec<ScalarValue>)] {
        &self.executed
    }

    /// Returns the last executed SQL text.
    pub fn last_sql(&self) -> Option<&str> {
        self.executed.last().map(|(sql, _)| sql.as_str())
    }

    /// Returns the number of result sets still queued.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Returns true until the connection is closed.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Returns how many times the connection was closed.
    pub fn close_count(&self) -> usize {
        self.closes
    }

    /// Returns how many cursors have been closed.
    pub fn cursor_close_count(&self) -> usize {
        self.cursor_closes
    }
}

impl Default for MemoryConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection for MemoryConnection {
    fn query(&mut self, sql: &str, args: &[ScalarValue]) -> RowcastResult<Box<dyn Cursor + '_>> {
        if !self.open {
            return Err(RowcastError::ExecutionFailed {
                reason: "connection is closed".to_string(),
            });
        }
        self.executed.push((sql.to_string(), args.to_vec()));
        if let Some(reason) = self.fail_next.take() {
            return Err(RowcastError::ExecutionFailed { reason });
        }
        let set = self.pending.pop_front().ok_or_else(|| RowcastError::ExecutionFailed {
            reason: "no result set queued".to_string(),
        })?;
        trace!(rows = set.num_rows(), "Replaying result set");
        Ok(Box::new(
            MemoryCursor::new(set).track_closes(&mut self.cursor_closes),
        ))
    }

    fn close(&mut self) -> RowcastResult<()> {
        if self.open {
            self.open = false;
            self.closes += 1;
        }
        Ok(())
    }
}
