//! Forward-only row cursors.
//!
//! A [`Cursor`] is the driver's view of one executed query: column names,
//! single-row advance, and a scan that writes every cell of the current row
//! into caller-provided slots. Cursors are single-pass and never shared; the
//! [`CursorGuard`] owns one for the duration of a traversal and releases it
//! on every exit path.

mod memory;

use std::ops::{Deref, DerefMut};

use tracing::warn;

use rowcast_common::error::{RowcastError, RowcastResult};
use rowcast_common::types::ScalarValue;

pub use memory::{MemoryCursor, ResultSet};

/// A forward-only cursor over the rows of one result set.
pub trait Cursor {
    /// Returns the column names of the result set, in natural order.
    fn columns(&mut self) -> RowcastResult<Vec<String>>;

    /// Moves to the next row.
    ///
    /// Returns `false` when the rows are exhausted or advancing failed; a
    /// failure is reported afterwards by [`Cursor::take_error`].
    fn advance(&mut self) -> bool;

    /// Writes every cell of the current row into `slots`.
    ///
    /// `slots` must hold exactly one entry per column.
    fn scan_into(&mut self, slots: &mut [ScalarValue]) -> RowcastResult<()>;

    /// Releases the cursor. Closing twice is a no-op.
    fn close(&mut self) -> RowcastResult<()>;

    /// Returns the error that ended iteration early, if any.
    fn take_error(&mut self) -> Option<RowcastError> {
        None
    }
}

impl<C: Cursor + ?Sized> Cursor for Box<C> {
    fn columns(&mut self) -> RowcastResult<Vec<String>> {
        (**self).columns()
    }

    fn advance(&mut self) -> bool {
        (**self).advance()
    }

    fn scan_into(&mut self, slots: &mut [ScalarValue]) -> RowcastResult<()> {
        (**self).scan_into(slots)
    }

    fn close(&mut self) -> RowcastResult<()> {
        (**self).close()
    }

    fn take_error(&mut self) -> Option<RowcastError> {
        (**self).take_error()
    }
}

/// Scoped owner of a cursor.
///
/// Call [`CursorGuard::finish`] on the success path so a close failure is
/// returned to the caller. If the guard is dropped without finishing (an
/// error path), the cursor is still closed and a close failure is logged,
/// leaving the original error to propagate.
pub struct CursorGuard<C: Cursor> {
    cursor: C,
    closed: bool,
}

impl<C: Cursor> CursorGuard<C> {
    /// Takes ownership of an open cursor.
    pub fn new(cursor: C) -> Self {
        Self {
            cursor,
            closed: false,
        }
    }

    /// Closes the cursor and reports the close result.
    pub fn finish(mut self) -> RowcastResult<()> {
        self.closed = true;
        self.cursor.close()
    }
}

impl<C: Cursor> Deref for CursorGuard<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.cursor
    }
}

impl<C: Cursor> DerefMut for CursorGuard<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.cursor
    }
}

impl<C: Cursor> Drop for CursorGuard<C> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.cursor.close() {
            warn!("Failed to close cursor on error path: {}", e);
        }
    }
}
