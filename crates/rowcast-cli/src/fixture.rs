//! Recorded result set fixtures.
//!
//! A fixture is a JSON document with the column names and the rows of one
//! result set:
//!
//! ```json
//! {
//!   "columns": ["id", "name", "avatar", "seen"],
//!   "rows": [
//!     [1, "ann", {"blob": [0]}, {"timestamp": "2024-01-02T03:04:05Z"}],
//!     [2, null, {"hex": "cafe"}, null]
//!   ]
//! }
//! ```
//!
//! Plain JSON scalars map to the obvious kinds. Objects with a single key
//! select a kind explicitly: `int8` to `int64`, `uint8` to `uint64`,
//! `float32`, `float64`, `complex64`, `complex128` (`[re, im]`), `text`,
//! `blob` (byte array), `hex`, `timestamp` (RFC 3339) and `unsupported`.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use rowcast_common::types::{Complex, ScalarValue, UnsupportedKind};
use rowcast_core::cursor::ResultSet;

#[derive(Debug, Deserialize)]
struct Fixture {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<JsonValue>>,
}

/// Loads a fixture file.
pub fn load(path: &Path) -> Result<ResultSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read fixture {}", path.display()))?;
    parse(&content).with_context(|| format!("invalid fixture {}", path.display()))
}

/// Parses fixture JSON.
pub fn parse(content: &str) -> Result<ResultSet> {
    let fixture: Fixture = serde_json::from_str(content)?;
    let width = fixture.columns.len();
    let mut set = ResultSet::new(fixture.columns);
    for (i, row) in fixture.rows.into_iter().enumerate() {
        if row.len() != width {
            bail!("row {i} has {} cells, expected {width}", row.len());
        }
        let values = row
            .iter()
            .map(cell)
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("row {i}"))?;
        set.push_row(values);
    }
    Ok(set)
}

/// Parses a command-line literal into a value.
///
/// `null`, booleans, integers and floats are recognised; anything else is
/// text.
pub fn parse_literal(text: &str) -> ScalarValue {
    if text.eq_ignore_ascii_case("null") {
        return ScalarValue::Null;
    }
    if let Ok(b) = text.parse::<bool>() {
        return ScalarValue::Bool(b);
    }
    if let Ok(i) = text.parse::<i64>() {
        return ScalarValue::Int64(i);
    }
    if let Ok(f) = text.parse::<f64>() {
        if f.is_finite() {
            return ScalarValue::Float64(f);
        }
    }
    ScalarValue::text(text)
}

fn cell(value: &JsonValue) -> Result<ScalarValue> {
    Ok(match value {
        JsonValue::Null => ScalarValue::Null,
        JsonValue::Bool(b) => ScalarValue::Bool(*b),
        JsonValue::Number(n) => number(n)?,
        JsonValue::String(s) => ScalarValue::text(s.as_str()),
        JsonValue::Object(map) => {
            let mut entries = map.iter();
            let (Some((kind, inner)), None) = (entries.next(), entries.next()) else {
                bail!("typed cell must have exactly one key");
            };
            typed(kind, inner)?
        }
        JsonValue::Array(_) => bail!("bare arrays are not cells; use {{\"blob\": [..]}}"),
    })
}

fn number(n: &serde_json::Number) -> Result<ScalarValue> {
    if let Some(i) = n.as_i64() {
        Ok(ScalarValue::Int64(i))
    } else if let Some(u) = n.as_u64() {
        Ok(ScalarValue::UInt64(u))
    } else {
        n.as_f64()
            .map(ScalarValue::Float64)
            .ok_or_else(|| anyhow!("unrepresentable number {n}"))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn typed(kind: &str, inner: &JsonValue) -> Result<ScalarValue> {
    let int = || inner.as_i64().ok_or_else(|| anyhow!("{kind} expects an integer"));
    let uint = || inner.as_u64().ok_or_else(|| anyhow!("{kind} expects an unsigned integer"));
    let float = || inner.as_f64().ok_or_else(|| anyhow!("{kind} expects a number"));
    let text = || inner.as_str().ok_or_else(|| anyhow!("{kind} expects a string"));

    Ok(match kind {
        "int8" => ScalarValue::Int8(i8::try_from(int()?)?),
        "int16" => ScalarValue::Int16(i16::try_from(int()?)?),
        "int32" => ScalarValue::Int32(i32::try_from(int()?)?),
        "int64" => ScalarValue::Int64(int()?),
        "uint8" => ScalarValue::UInt8(u8::try_from(uint()?)?),
        "uint16" => ScalarValue::UInt16(u16::try_from(uint()?)?),
        "uint32" => ScalarValue::UInt32(u32::try_from(uint()?)?),
        "uint64" => ScalarValue::UInt64(uint()?),
        "float32" => ScalarValue::Float32(float()? as f32),
        "float64" => ScalarValue::Float64(float()?),
        "complex64" => {
            let [re, im] = pair(inner)?;
            ScalarValue::Complex64(Complex::new(re as f32, im as f32))
        }
        "complex128" => {
            let [re, im] = pair(inner)?;
            ScalarValue::Complex128(Complex::new(re, im))
        }
        "text" => ScalarValue::text(text()?),
        "blob" => {
            let bytes: Vec<u8> = serde_json::from_value(inner.clone())
                .map_err(|_| anyhow!("blob expects an array of bytes"))?;
            ScalarValue::Blob(bytes)
        }
        "hex" => ScalarValue::Blob(decode_hex(text()?)?),
        "timestamp" => ScalarValue::Timestamp(
            DateTime::parse_from_rfc3339(text()?)
                .with_context(|| format!("bad timestamp {inner}"))?,
        ),
        "unsupported" => ScalarValue::Unsupported(unsupported_kind(text()?)?),
        other => bail!("unknown cell kind `{other}`"),
    })
}

fn pair(inner: &JsonValue) -> Result<[f64; 2]> {
    serde_json::from_value(inner.clone()).map_err(|_| anyhow!("complex expects [re, im]"))
}

fn decode_hex(text: &str) -> Result<Vec<u8>> {
    if text.len() % 2 != 0 {
        bail!("hex string has odd length");
    }
    (0..text.len())
        .step_by(2)
        .map(|i| {
            text.get(i..i + 2)
                .and_then(|byte| u8::from_str_radix(byte, 16).ok())
                .ok_or_else(|| anyhow!("invalid hex at offset {i}"))
        })
        .collect()
}

fn unsupported_kind(name: &str) -> Result<UnsupportedKind> {
    let kinds = [
        UnsupportedKind::Map,
        UnsupportedKind::Pointer,
        UnsupportedKind::Uintptr,
        UnsupportedKind::UnsafePointer,
        UnsupportedKind::Channel,
        UnsupportedKind::Function,
        UnsupportedKind::Interface,
        UnsupportedKind::List,
        UnsupportedKind::Struct,
    ];
    kinds
        .into_iter()
        .find(|k| k.name() == name)
        .ok_or_else(|| anyhow!("unknown unsupported kind `{name}`"))
}
