use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use hashfuncs_error::{HashError, Result};
use serde::{Deserialize, Serialize};

use crate::ScalarType;

/// A dynamically-typed scalar value.
///
/// Used to build column batches row by row and to read rows back out.
/// Date and time carry their integer encodings, not calendar structs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Null,
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Int128(i128),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    UInt128(u128),
    Float32(f32),
    Float64(f64),
    /// Days since 1970-01-01.
    Date(i32),
    /// Microseconds since midnight.
    Time(i64),
    Text(String),
    Blob(Vec<u8>),
    Boolean(bool),
    /// Microseconds since the Unix epoch.
    Timestamp(i64),
    Interval(i128),
}

impl ScalarValue {
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The type tag of this value, `None` for NULL.
    pub const fn scalar_type(&self) -> Option<ScalarType> {
        let ty = match self {
            Self::Null => return None,
            Self::Int8(_) => ScalarType::Int8,
            Self::Int16(_) => ScalarType::Int16,
            Self::Int32(_) => ScalarType::Int32,
            Self::Int64(_) => ScalarType::Int64,
            Self::Int128(_) => ScalarType::Int128,
            Self::UInt8(_) => ScalarType::UInt8,
            Self::UInt16(_) => ScalarType::UInt16,
            Self::UInt32(_) => ScalarType::UInt32,
            Self::UInt64(_) => ScalarType::UInt64,
            Self::UInt128(_) => ScalarType::UInt128,
            Self::Float32(_) => ScalarType::Float32,
            Self::Float64(_) => ScalarType::Float64,
            Self::Date(_) => ScalarType::Date,
            Self::Time(_) => ScalarType::Time,
            Self::Text(_) => ScalarType::Text,
            Self::Blob(_) => ScalarType::Blob,
            Self::Boolean(_) => ScalarType::Boolean,
            Self::Timestamp(_) => ScalarType::Timestamp,
            Self::Interval(_) => ScalarType::Interval,
        };
        Some(ty)
    }

    /// Payload bytes of a text or blob value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Text(s) => Some(s.as_bytes()),
            Self::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// The bytes this value occupies in column storage: the native
    /// representation for fixed-width values, the payload for text and blob.
    #[must_use]
    pub fn native_bytes(&self) -> Option<Vec<u8>> {
        let bytes = match self {
            Self::Null => return None,
            Self::Int8(v) => v.to_ne_bytes().to_vec(),
            Self::Int16(v) => v.to_ne_bytes().to_vec(),
            Self::Int32(v) | Self::Date(v) => v.to_ne_bytes().to_vec(),
            Self::Int64(v) | Self::Time(v) | Self::Timestamp(v) => v.to_ne_bytes().to_vec(),
            Self::Int128(v) | Self::Interval(v) => v.to_ne_bytes().to_vec(),
            Self::UInt8(v) => vec![*v],
            Self::UInt16(v) => v.to_ne_bytes().to_vec(),
            Self::UInt32(v) => v.to_ne_bytes().to_vec(),
            Self::UInt64(v) => v.to_ne_bytes().to_vec(),
            Self::UInt128(v) => v.to_ne_bytes().to_vec(),
            Self::Float32(v) => v.to_ne_bytes().to_vec(),
            Self::Float64(v) => v.to_ne_bytes().to_vec(),
            Self::Text(s) => s.as_bytes().to_vec(),
            Self::Blob(b) => b.clone(),
            Self::Boolean(v) => vec![u8::from(*v)],
        };
        Some(bytes)
    }

    /// Parse a literal as a value of `scalar_type`.
    ///
    /// `NULL` (any case) parses to [`ScalarValue::Null`] for every type.
    /// Dates accept `YYYY-MM-DD` or a day count, times accept
    /// `HH:MM:SS[.ffffff]` or a microsecond count, blobs accept `0x`-prefixed
    /// hex or are taken as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Parse`] when the literal is not a valid value.
    pub fn parse(scalar_type: ScalarType, input: &str) -> Result<Self> {
        if input.eq_ignore_ascii_case("null") {
            return Ok(Self::Null);
        }
        let bad = |detail: &str| HashError::parse(input, format!("{detail} for {scalar_type}"));
        let value = match scalar_type {
            ScalarType::Int8 => Self::Int8(input.parse().map_err(|_| bad("invalid integer"))?),
            ScalarType::Int16 => Self::Int16(input.parse().map_err(|_| bad("invalid integer"))?),
            ScalarType::Int32 => Self::Int32(input.parse().map_err(|_| bad("invalid integer"))?),
            ScalarType::Int64 => Self::Int64(input.parse().map_err(|_| bad("invalid integer"))?),
            ScalarType::Int128 => Self::Int128(input.parse().map_err(|_| bad("invalid integer"))?),
            ScalarType::UInt8 => Self::UInt8(input.parse().map_err(|_| bad("invalid integer"))?),
            ScalarType::UInt16 => Self::UInt16(input.parse().map_err(|_| bad("invalid integer"))?),
            ScalarType::UInt32 => Self::UInt32(input.parse().map_err(|_| bad("invalid integer"))?),
            ScalarType::UInt64 => Self::UInt64(input.parse().map_err(|_| bad("invalid integer"))?),
            ScalarType::UInt128 => {
                Self::UInt128(input.parse().map_err(|_| bad("invalid integer"))?)
            }
            ScalarType::Float32 => Self::Float32(input.parse().map_err(|_| bad("invalid float"))?),
            ScalarType::Float64 => Self::Float64(input.parse().map_err(|_| bad("invalid float"))?),
            ScalarType::Date => Self::Date(parse_date(input).ok_or_else(|| bad("invalid date"))?),
            ScalarType::Time => Self::Time(parse_time(input).ok_or_else(|| bad("invalid time"))?),
            ScalarType::Text => Self::Text(input.to_owned()),
            ScalarType::Blob => Self::Blob(parse_blob(input).ok_or_else(|| bad("invalid hex"))?),
            ScalarType::Boolean => match input.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Self::Boolean(true),
                "false" | "f" | "0" => Self::Boolean(false),
                _ => return Err(bad("invalid boolean")),
            },
            ScalarType::Timestamp => {
                Self::Timestamp(input.parse().map_err(|_| bad("invalid integer"))?)
            }
            ScalarType::Interval => {
                Self::Interval(input.parse().map_err(|_| bad("invalid integer"))?)
            }
        };
        Ok(value)
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) | Self::Date(v) => write!(f, "{v}"),
            Self::Int64(v) | Self::Time(v) | Self::Timestamp(v) => write!(f, "{v}"),
            Self::Int128(v) | Self::Interval(v) => write!(f, "{v}"),
            Self::UInt8(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::UInt128(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Blob(bytes) => {
                f.write_str("0x")?;
                bytes.iter().try_for_each(|b| write!(f, "{b:02x}"))
            }
            Self::Boolean(v) => write!(f, "{v}"),
        }
    }
}

/// `YYYY-MM-DD` or a signed day count.
fn parse_date(input: &str) -> Option<i32> {
    if let Ok(days) = input.parse::<i32>() {
        return Some(days);
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()?;
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    i32::try_from((date - epoch).num_days()).ok()
}

/// `HH:MM:SS[.fraction]` or a microsecond count. Sub-microsecond digits are
/// truncated.
fn parse_time(input: &str) -> Option<i64> {
    if let Ok(micros) = input.parse::<i64>() {
        return Some(micros);
    }
    let time = NaiveTime::parse_from_str(input, "%H:%M:%S%.f").ok()?;
    let midnight = NaiveTime::from_hms_opt(0, 0, 0)?;
    (time - midnight).num_microseconds()
}

/// `0x`/`\x`-prefixed hex, otherwise the raw UTF-8 bytes.
fn parse_blob(input: &str) -> Option<Vec<u8>> {
    match input.strip_prefix("0x").or_else(|| input.strip_prefix("\\x")) {
        Some(digits) => hex::decode(digits).ok(),
        None => Some(input.as_bytes().to_vec()),
    }
}
