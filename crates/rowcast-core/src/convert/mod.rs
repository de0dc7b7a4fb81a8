//! Scalar conversion.
//!
//! Turns one driver-reported [`ScalarValue`] into its canonical text form.
//! Every supported kind has exactly one rendering; unsupported kinds fail
//! with [`RowcastError::UnsupportedScalarKind`].

use chrono::{DateTime, FixedOffset, Timelike};

use rowcast_common::constants::NUL_BLOB_TEXT;
use rowcast_common::error::{RowcastError, RowcastResult};
use rowcast_common::types::{Complex, ScalarValue};

/// Converts a cell value to its canonical text.
///
/// NULL converts to the empty string. Callers that need to tell NULL apart
/// from an empty text value check [`ScalarValue::is_null`] first.
///
/// # Example
///
/// ```rust
/// use rowcast_common::types::ScalarValue;
/// use rowcast_core::convert::convert;
///
/// assert_eq!(convert(&ScalarValue::Int64(-7)).unwrap(), "-7");
/// assert_eq!(convert(&ScalarValue::Float64(0.1)).unwrap(), "0.1");
/// assert_eq!(convert(&ScalarValue::blob(vec![0u8])).unwrap(), "0");
/// ```
pub fn convert(value: &ScalarValue) -> RowcastResult<String> {
    let text = match value {
        ScalarValue::Null => String::new(),
        ScalarValue::Bool(b) => b.to_string(),
        ScalarValue::Int8(i) => i.to_string(),
        ScalarValue::Int16(i) => i.to_string(),
        ScalarValue::Int32(i) => i.to_string(),
        ScalarValue::Int64(i) => i.to_string(),
        ScalarValue::UInt8(i) => i.to_string(),
        ScalarValue::UInt16(i) => i.to_string(),
        ScalarValue::UInt32(i) => i.to_string(),
        ScalarValue::UInt64(i) => i.to_string(),
        ScalarValue::Float32(f) => format_float(f64::from(*f)),
        ScalarValue::Float64(f) => format_float(*f),
        ScalarValue::Complex64(c) => format_complex(c.widen()),
        ScalarValue::Complex128(c) => format_complex(*c),
        ScalarValue::Text(s) => s.clone(),
        ScalarValue::Blob(b) => blob_text(b),
        ScalarValue::Timestamp(ts) => format_timestamp(ts),
        ScalarValue::Unsupported(kind) => {
            return Err(RowcastError::UnsupportedScalarKind {
                kind: kind.name().to_string(),
            })
        }
    };
    Ok(text)
}

/// Converts a cell value to bytes for the byte-oriented row mode.
///
/// Blobs are passed through untouched apart from the single-NUL rule; every
/// other kind yields the UTF-8 bytes of [`convert`].
pub fn convert_bytes(value: &ScalarValue) -> RowcastResult<Vec<u8>> {
    match value {
        ScalarValue::Blob(b) if is_nul_blob(b) => Ok(NUL_BLOB_TEXT.as_bytes().to_vec()),
        ScalarValue::Blob(b) => Ok(b.clone()),
        other => convert(other).map(String::into_bytes),
    }
}

/// Formats a double as the shortest decimal that parses back to it.
///
/// Never uses exponent notation. Non-finite values render as `NaN`,
/// `+Inf` and `-Inf`.
#[must_use]
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "+Inf" } else { "-Inf" }.to_string()
    } else {
        f.to_string()
    }
}

/// Formats a complex pair as `(re+imi)`.
#[must_use]
pub fn format_complex(c: Complex<f64>) -> String {
    let re = format_float(c.re);
    let im = format_float(c.im);
    let sign = if im.starts_with('+') || im.starts_with('-') {
        ""
    } else {
        "+"
    };
    format!("({re}{sign}{im}i)")
}

/// Formats an instant as RFC 3339 with up to nine fractional digits.
///
/// Trailing fractional zeros are dropped, a zero offset renders as `Z`, and
/// any other offset is kept as `+hh:mm`.
#[must_use]
pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    let mut out = ts.format("%Y-%m-%dT%H:%M:%S").to_string();

    // Leap seconds carry nanos >= 1e9; the extra second is already in %S.
    let nanos = ts.nanosecond() % 1_000_000_000;
    if nanos > 0 {
        let frac = format!("{nanos:09}");
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }

    if ts.offset().local_minus_utc() == 0 {
        out.push('Z');
    } else {
        out.push_str(&ts.format("%:z").to_string());
    }
    out
}

fn is_nul_blob(b: &[u8]) -> bool {
    b == [0u8]
}

fn blob_text(b: &[u8]) -> String {
    if is_nul_blob(b) {
        return NUL_BLOB_TEXT.to_string();
    }
    String::from_utf8_lossy(b).into_owned()
}
