//! # rowcast-core
//!
//! Result materialization and statement generation.
//!
//! This crate turns an executed query's raw, dynamically-typed row stream
//! into typed output shapes, and resolves the SQL a query call runs:
//!
//! - **Convert**: one cell value to its canonical text or bytes
//! - **Cursor**: the forward-only row stream contract and its scoped guard
//! - **Decode**: one row into a string map, string list, value map or byte map
//! - **Assemble**: every row of a cursor into one output shape
//! - **Export**: streamed delimited-text output
//! - **Statement**: SQL and argument resolution from explicit or recorded state
//! - **Session**: the query entry points over a [`Connection`]
//!
//! ## Example
//!
//! ```rust
//! use rowcast_common::types::ScalarValue;
//! use rowcast_core::connection::MemoryConnection;
//! use rowcast_core::cursor::ResultSet;
//! use rowcast_core::session::Session;
//!
//! let users = ResultSet::new(["id", "name"])
//!     .row([ScalarValue::Int64(1), ScalarValue::text("ann")]);
//! let mut session = Session::new(MemoryConnection::new().with_result(users));
//!
//! let rows = session.query_string("SELECT id, name FROM user").unwrap();
//! assert_eq!(rows[0]["id"], "1");
//! assert_eq!(rows[0]["name"], "ann");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assemble;
pub mod connection;
pub mod convert;
pub mod cursor;
pub mod decode;
pub mod export;
pub mod session;
pub mod statement;

pub use assemble::OrderedRows;
pub use connection::{Connection, MemoryConnection};
pub use convert::{convert, convert_bytes};
pub use cursor::{Cursor, CursorGuard, MemoryCursor, ResultSet};
pub use decode::{BytesMap, RowDecoder, StringMap, ValueMap};
pub use export::{rows_to_sink, DelimitedWriter, TabularSink};
pub use session::Session;
pub use statement::{
    Cond, ConditionCompiler, QueryRequest, QueryState, SelectBuilder, SelectRequest,
    SqlCondCompiler, Statement, StatementBuilder, StatementGenerator, StatementOrigin, ToSql,
};
