//! Connections that execute statements into cursors.

mod memory;

use rowcast_common::error::RowcastResult;
use rowcast_common::types::ScalarValue;

use crate::cursor::Cursor;

pub use memory::MemoryConnection;

/// A database connection.
pub trait Connection {
    /// Executes `sql` with positional `args` and returns an open cursor.
    ///
    /// The cursor borrows the connection until it is dropped.
    fn query(&mut self, sql: &str, args: &[ScalarValue]) -> RowcastResult<Box<dyn Cursor + '_>>;

    /// Closes the connection.
    fn close(&mut self) -> RowcastResult<()>;
}
