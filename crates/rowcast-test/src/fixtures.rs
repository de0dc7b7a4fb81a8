use chrono::{FixedOffset, TimeZone, Utc};

use rowcast_common::config::{Dialect, SessionConfig};
use rowcast_common::types::{Complex, ScalarValue};
use rowcast_core::connection::MemoryConnection;
use rowcast_core::cursor::ResultSet;
use rowcast_core::session::Session;

/// Three employees; the second has a NULL name and the third a NULL salary.
pub fn employees() -> ResultSet {
    ResultSet::new(["id", "name", "salary"])
        .row([
            ScalarValue::Int64(1),
            ScalarValue::text("ann"),
            ScalarValue::Float64(5200.5),
        ])
        .row([
            ScalarValue::Int64(2),
            ScalarValue::Null,
            ScalarValue::Float64(4100.0),
        ])
        .row([
            ScalarValue::Int64(3),
            ScalarValue::text("cy"),
            ScalarValue::Null,
        ])
}

/// One row holding every supported scalar kind.
pub fn every_kind() -> ResultSet {
    let local = FixedOffset::east_opt(2 * 3600)
        .and_then(|offset| offset.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).single())
        .expect("valid local timestamp");
    let utc = Utc
        .with_ymd_and_hms(2024, 5, 6, 5, 8, 9)
        .single()
        .expect("valid UTC timestamp");

    ResultSet::new([
        "i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64", "f32", "f64", "flag", "c64",
        "c128", "text", "blob", "nul", "local", "utc", "none",
    ])
    .row([
        ScalarValue::Int8(-8),
        ScalarValue::Int16(-16),
        ScalarValue::Int32(-32),
        ScalarValue::Int64(-64),
        ScalarValue::UInt8(8),
        ScalarValue::UInt16(16),
        ScalarValue::UInt32(32),
        ScalarValue::UInt64(u64::MAX),
        ScalarValue::Float32(1.5),
        ScalarValue::Float64(0.1),
        ScalarValue::Bool(true),
        ScalarValue::Complex64(Complex::new(1.0, -1.0)),
        ScalarValue::Complex128(Complex::new(0.5, 2.0)),
        ScalarValue::text("plain"),
        ScalarValue::blob(b"bytes".to_vec()),
        ScalarValue::blob(vec![0u8]),
        ScalarValue::Timestamp(local),
        ScalarValue::utc(utc),
        ScalarValue::Null,
    ])
}

/// A session over a memory connection with `sets` queued in order.
pub fn session(sets: impl IntoIterator<Item = ResultSet>) -> Session<MemoryConnection> {
    session_with(SessionConfig::default(), sets)
}

/// A session for `dialect` with `sets` queued in order.
pub fn dialect_session(
    dialect: Dialect,
    sets: impl IntoIterator<Item = ResultSet>,
) -> Session<MemoryConnection> {
    session_with(SessionConfig::with_dialect(dialect), sets)
}

/// A session with the given configuration and `sets` queued in order.
///
/// # Panics
///
/// Panics if the configuration is invalid.
pub fn session_with(
    config: SessionConfig,
    sets: impl IntoIterator<Item = ResultSet>,
) -> Session<MemoryConnection> {
    let mut connection = MemoryConnection::new();
    for set in sets {
        connection.push_result(set);
    }
    Session::with_config(connection, config).expect("Failed to create session")
}
