//! Driver-reported cell values.
//!
//! A [`ScalarValue`] is what a cursor writes into a scan slot: the raw,
//! dynamically-typed representation of one cell before any conversion.

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};

use super::Complex;

/// Representations a driver may report that have no conversion rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnsupportedKind {
    /// Key/value container.
    Map,
    /// Pointer to another value.
    Pointer,
    /// Integer holding a raw address.
    Uintptr,
    /// Raw memory handle.
    UnsafePointer,
    /// Channel.
    Channel,
    /// Function value.
    Function,
    /// Interface or trait-object wrapper.
    Interface,
    /// List whose elements are not bytes.
    List,
    /// Record type other than a temporal instant.
    Struct,
}

impl UnsupportedKind {
    /// Returns the kind name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            UnsupportedKind::Map => "map",
            UnsupportedKind::Pointer => "ptr",
            UnsupportedKind::Uintptr => "uintptr",
            UnsupportedKind::UnsafePointer => "unsafe pointer",
            UnsupportedKind::Channel => "chan",
            UnsupportedKind::Function => "func",
            UnsupportedKind::Interface => "interface",
            UnsupportedKind::List => "list",
            UnsupportedKind::Struct => "struct",
        }
    }
}

impl fmt::Display for UnsupportedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A raw cell value as reported by the driver.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScalarValue {
    /// NULL; the slot has no underlying type.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// 8-bit signed integer.
    Int8(i8),
    /// 16-bit signed integer.
    Int16(i16),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 8-bit unsigned integer.
    UInt8(u8),
    /// 16-bit unsigned integer.
    UInt16(u16),
    /// 32-bit unsigned integer.
    UInt32(u32),
    /// 64-bit unsigned integer.
    UInt64(u64),
    /// 32-bit floating point.
    Float32(f32),
    /// 64-bit floating point.
    Float64(f64),
    /// Complex pair of 32-bit floats.
    Complex64(Complex<f32>),
    /// Complex pair of 64-bit floats.
    Complex128(Complex<f64>),
    /// Text value.
    Text(String),
    /// Binary blob.
    Blob(Vec<u8>),
    /// Temporal instant with its original offset.
    Timestamp(DateTime<FixedOffset>),
    /// A representation with no conversion rule.
    Unsupported(UnsupportedKind),
}

impl ScalarValue {
    /// Creates a text value.
    pub fn text(v: impl Into<String>) -> Self {
        ScalarValue::Text(v.into())
    }

    /// Creates a blob value.
    pub fn blob(v: impl Into<Vec<u8>>) -> Self {
        ScalarValue::Blob(v.into())
    }

    /// Creates a UTC timestamp value.
    #[must_use]
    pub fn utc(v: DateTime<Utc>) -> Self {
        ScalarValue::Timestamp(v.fixed_offset())
    }

    /// Returns true if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// Returns the name of this value's kind.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            ScalarValue::Null => "null",
            ScalarValue::Bool(_) => "bool",
            ScalarValue::Int8(_) => "int8",
            ScalarValue::Int16(_) => "int16",
            ScalarValue::Int32(_) => "int32",
            ScalarValue::Int64(_) => "int64",
            ScalarValue::UInt8(_) => "uint8",
            ScalarValue::UInt16(_) => "uint16",
            ScalarValue::UInt32(_) => "uint32",
            ScalarValue::UInt64(_) => "uint64",
            ScalarValue::Float32(_) => "float32",
            ScalarValue::Float64(_) => "float64",
            ScalarValue::Complex64(_) => "complex64",
            ScalarValue::Complex128(_) => "complex128",
            ScalarValue::Text(_) => "text",
            ScalarValue::Blob(_) => "blob",
            ScalarValue::Timestamp(_) => "timestamp",
            ScalarValue::Unsupported(kind) => kind.name(),
        }
    }

    /// Tries to get as text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Tries to get as a signed 64-bit integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Int8(i) => Some(i64::from(*i)),
            ScalarValue::Int16(i) => Some(i64::from(*i)),
            ScalarValue::Int32(i) => Some(i64::from(*i)),
            ScalarValue::Int64(i) => Some(*i),
            ScalarValue::UInt8(i) => Some(i64::from(*i)),
            ScalarValue::UInt16(i) => Some(i64::from(*i)),
            ScalarValue::UInt32(i) => Some(i64::from(*i)),
            ScalarValue::UInt64(i) => i64::try_from(*i).ok(),
            _ => None,
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ScalarValue {
                fn from(v: $ty) -> Self {
                    ScalarValue::$variant(v)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    String => Text,
    Vec<u8> => Blob,
    DateTime<FixedOffset> => Timestamp,
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Text(v.to_string())
    }
}

impl From<&[u8]> for ScalarValue {
    fn from(v: &[u8]) -> Self {
        ScalarValue::Blob(v.to_vec())
    }
}

impl From<DateTime<Utc>> for ScalarValue {
    fn from(v: DateTime<Utc>) -> Self {
        ScalarValue::utc(v)
    }
}

impl<T: Into<ScalarValue>> From<Option<T>> for ScalarValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => ScalarValue::Null,
        }
    }
}
