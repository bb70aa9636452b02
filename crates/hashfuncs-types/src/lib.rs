//! Core types for the hashfuncs engine.
//!
//! - [`ScalarType`]: the runtime type tag a column batch is declared with.
//! - [`ScalarValue`]: a dynamically-typed single value, used to build batches.
//! - [`ValidityMask`]: packed per-row validity bits.
//! - [`RowIndirection`]: logical-to-physical row mapping (sequential,
//!   constant, dictionary).
//! - [`ColumnBatch`]: a typed column of rows, the unit the dispatcher hashes.
//! - [`Hash128`]: a 128-bit digest as two 64-bit halves, low half first.

pub mod batch;
pub mod indirection;
pub mod validity;
pub mod value;

use std::fmt;
use std::str::FromStr;

use hashfuncs_error::HashError;
use serde::{Deserialize, Serialize};

pub use batch::{ColumnBatch, ColumnData, NativeType};
pub use indirection::{RowIndirection, RowSlot};
pub use validity::ValidityMask;
pub use value::ScalarValue;

/// Physical storage kind backing a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicalType {
    I8,
    I16,
    I32,
    I64,
    I128,
    U8,
    U16,
    U32,
    U64,
    U128,
    F32,
    F64,
    /// Variable-length bytes addressed through an offsets buffer.
    Bytes,
}

impl PhysicalType {
    /// Width in bytes for fixed-width storage, `None` for [`PhysicalType::Bytes`].
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            Self::I8 | Self::U8 => Some(1),
            Self::I16 | Self::U16 => Some(2),
            Self::I32 | Self::U32 | Self::F32 => Some(4),
            Self::I64 | Self::U64 | Self::F64 => Some(8),
            Self::I128 | Self::U128 => Some(16),
            Self::Bytes => None,
        }
    }
}

/// Logical scalar type of a column batch.
///
/// The first sixteen variants form the hashable set. The remaining variants
/// can be stored and described but are rejected by the hash dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    Int8,
    Int16,
    Int32,
    Int64,
    Int128,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    UInt128,
    Float32,
    Float64,
    /// Days since 1970-01-01, stored as a 4-byte signed integer.
    Date,
    /// Microseconds since midnight, stored as an 8-byte signed integer.
    Time,
    Text,
    Blob,
    Boolean,
    /// Microseconds since the Unix epoch.
    Timestamp,
    /// Packed months/days/micros, stored as 16 raw bytes.
    Interval,
}

impl ScalarType {
    /// Every type tag, hashable ones first.
    pub const ALL: [Self; 19] = [
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Int128,
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
        Self::UInt128,
        Self::Float32,
        Self::Float64,
        Self::Date,
        Self::Time,
        Self::Text,
        Self::Blob,
        Self::Boolean,
        Self::Timestamp,
        Self::Interval,
    ];

    /// Physical storage kind for this tag.
    pub const fn physical(self) -> PhysicalType {
        match self {
            Self::Int8 => PhysicalType::I8,
            Self::Int16 => PhysicalType::I16,
            Self::Int32 | Self::Date => PhysicalType::I32,
            Self::Int64 | Self::Time | Self::Timestamp => PhysicalType::I64,
            Self::Int128 | Self::Interval => PhysicalType::I128,
            Self::UInt8 | Self::Boolean => PhysicalType::U8,
            Self::UInt16 => PhysicalType::U16,
            Self::UInt32 => PhysicalType::U32,
            Self::UInt64 => PhysicalType::U64,
            Self::UInt128 => PhysicalType::U128,
            Self::Float32 => PhysicalType::F32,
            Self::Float64 => PhysicalType::F64,
            Self::Text | Self::Blob => PhysicalType::Bytes,
        }
    }

    /// Whether the hash dispatcher accepts this tag.
    pub const fn is_hashable(self) -> bool {
        !matches!(self, Self::Boolean | Self::Timestamp | Self::Interval)
    }

    /// Whether values are variable-length byte sequences.
    pub const fn is_variable_length(self) -> bool {
        matches!(self, Self::Text | Self::Blob)
    }

    /// SQL spelling of this type.
    pub const fn sql_name(self) -> &'static str {
        match self {
            Self::Int8 => "TINYINT",
            Self::Int16 => "SMALLINT",
            Self::Int32 => "INTEGER",
            Self::Int64 => "BIGINT",
            Self::Int128 => "HUGEINT",
            Self::UInt8 => "UTINYINT",
            Self::UInt16 => "USMALLINT",
            Self::UInt32 => "UINTEGER",
            Self::UInt64 => "UBIGINT",
            Self::UInt128 => "UHUGEINT",
            Self::Float32 => "FLOAT",
            Self::Float64 => "DOUBLE",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Text => "VARCHAR",
            Self::Blob => "BLOB",
            Self::Boolean => "BOOLEAN",
            Self::Timestamp => "TIMESTAMP",
            Self::Interval => "INTERVAL",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

impl FromStr for ScalarType {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s.to_ascii_lowercase().as_str() {
            "tinyint" | "int8" | "i8" => Self::Int8,
            "smallint" | "int16" | "i16" => Self::Int16,
            "integer" | "int" | "int32" | "i32" => Self::Int32,
            "bigint" | "int64" | "i64" => Self::Int64,
            "hugeint" | "int128" | "i128" => Self::Int128,
            "utinyint" | "uint8" | "u8" => Self::UInt8,
            "usmallint" | "uint16" | "u16" => Self::UInt16,
            "uinteger" | "uint32" | "u32" => Self::UInt32,
            "ubigint" | "uint64" | "u64" => Self::UInt64,
            "uhugeint" | "uint128" | "u128" => Self::UInt128,
            "float" | "real" | "float32" | "f32" => Self::Float32,
            "double" | "float64" | "f64" => Self::Float64,
            "date" => Self::Date,
            "time" => Self::Time,
            "varchar" | "text" | "string" => Self::Text,
            "blob" | "bytea" | "binary" => Self::Blob,
            "boolean" | "bool" => Self::Boolean,
            "timestamp" => Self::Timestamp,
            "interval" => Self::Interval,
            _ => return Err(HashError::parse(s, "unknown type name")),
        };
        Ok(ty)
    }
}

/// A 128-bit digest stored as two 64-bit halves, low half first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hash128 {
    pub low: u64,
    pub high: u64,
}

impl Hash128 {
    #[must_use]
    pub const fn new(low: u64, high: u64) -> Self {
        Self { low, high }
    }

    /// Recombine the halves into a single integer.
    #[must_use]
    pub const fn as_u128(self) -> u128 {
        ((self.high as u128) << 64) | self.low as u128
    }
}

impl From<u128> for Hash128 {
    #[allow(clippy::cast_possible_truncation)]
    fn from(value: u128) -> Self {
        Self {
            low: value as u64,
            high: (value >> 64) as u64,
        }
    }
}

impl From<Hash128> for u128 {
    fn from(value: Hash128) -> Self {
        value.as_u128()
    }
}

impl fmt::Display for Hash128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u128())
    }
}

impl fmt::LowerHex for Hash128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.as_u128(), f)
    }
}
