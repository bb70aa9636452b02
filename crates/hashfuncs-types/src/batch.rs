//! Typed column batches.
//!
//! A [`ColumnBatch`] is physical storage ([`ColumnData`] + [`ValidityMask`])
//! viewed through a [`RowIndirection`]. Storage buffers are reference counted,
//! so deriving constant, dictionary or filtered batches never copies values.

use std::sync::Arc;

use hashfuncs_error::{HashError, Result};

use crate::indirection::{RowIndirection, RowSlot};
use crate::validity::{ValidityBuilder, ValidityMask};
use crate::value::ScalarValue;
use crate::{PhysicalType, ScalarType};

/// Physical column payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    I8(Arc<[i8]>),
    I16(Arc<[i16]>),
    I32(Arc<[i32]>),
    I64(Arc<[i64]>),
    I128(Arc<[i128]>),
    U8(Arc<[u8]>),
    U16(Arc<[u16]>),
    U32(Arc<[u32]>),
    U64(Arc<[u64]>),
    U128(Arc<[u128]>),
    F32(Arc<[f32]>),
    F64(Arc<[f64]>),
    /// Value `i` is `data[offsets[i]..offsets[i + 1]]`.
    Bytes { offsets: Arc<[u32]>, data: Arc<[u8]> },
}

impl ColumnData {
    #[must_use]
    pub const fn physical_type(&self) -> PhysicalType {
        match self {
            Self::I8(_) => PhysicalType::I8,
            Self::I16(_) => PhysicalType::I16,
            Self::I32(_) => PhysicalType::I32,
            Self::I64(_) => PhysicalType::I64,
            Self::I128(_) => PhysicalType::I128,
            Self::U8(_) => PhysicalType::U8,
            Self::U16(_) => PhysicalType::U16,
            Self::U32(_) => PhysicalType::U32,
            Self::U64(_) => PhysicalType::U64,
            Self::U128(_) => PhysicalType::U128,
            Self::F32(_) => PhysicalType::F32,
            Self::F64(_) => PhysicalType::F64,
            Self::Bytes { .. } => PhysicalType::Bytes,
        }
    }

    /// Number of physical slots.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::I8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::I128(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::U64(v) => v.len(),
            Self::U128(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::Bytes { offsets, .. } => offsets.len().saturating_sub(1),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixed-width storage reinterpreted as its native bytes, with the width
    /// of one value. `None` for variable-length storage.
    #[must_use]
    pub fn fixed_bytes(&self) -> Option<(&[u8], usize)> {
        let bytes: &[u8] = match self {
            Self::I8(v) => bytemuck::cast_slice(v),
            Self::I16(v) => bytemuck::cast_slice(v),
            Self::I32(v) => bytemuck::cast_slice(v),
            Self::I64(v) => bytemuck::cast_slice(v),
            Self::I128(v) => bytemuck::cast_slice(v),
            Self::U8(v) => &v[..],
            Self::U16(v) => bytemuck::cast_slice(v),
            Self::U32(v) => bytemuck::cast_slice(v),
            Self::U64(v) => bytemuck::cast_slice(v),
            Self::U128(v) => bytemuck::cast_slice(v),
            Self::F32(v) => bytemuck::cast_slice(v),
            Self::F64(v) => bytemuck::cast_slice(v),
            Self::Bytes { .. } => return None,
        };
        let width = self.physical_type().fixed_width()?;
        Some((bytes, width))
    }

    /// Payload of physical slot `slot` for variable-length storage.
    #[must_use]
    pub fn bytes_at(&self, slot: usize) -> Option<&[u8]> {
        let Self::Bytes { offsets, data } = self else {
            return None;
        };
        let start = *offsets.get(slot)? as usize;
        let end = *offsets.get(slot + 1)? as usize;
        data.get(start..end)
    }

    fn value_at(&self, slot: usize, scalar_type: ScalarType) -> Option<ScalarValue> {
        let value = match (self, scalar_type) {
            (Self::I8(v), _) => ScalarValue::Int8(*v.get(slot)?),
            (Self::I16(v), _) => ScalarValue::Int16(*v.get(slot)?),
            (Self::I32(v), ScalarType::Date) => ScalarValue::Date(*v.get(slot)?),
            (Self::I32(v), _) => ScalarValue::Int32(*v.get(slot)?),
            (Self::I64(v), ScalarType::Time) => ScalarValue::Time(*v.get(slot)?),
            (Self::I64(v), ScalarType::Timestamp) => ScalarValue::Timestamp(*v.get(slot)?),
            (Self::I64(v), _) => ScalarValue::Int64(*v.get(slot)?),
            (Self::I128(v), ScalarType::Interval) => ScalarValue::Interval(*v.get(slot)?),
            (Self::I128(v), _) => ScalarValue::Int128(*v.get(slot)?),
            (Self::U8(v), ScalarType::Boolean) => ScalarValue::Boolean(*v.get(slot)? != 0),
            (Self::U8(v), _) => ScalarValue::UInt8(*v.get(slot)?),
            (Self::U16(v), _) => ScalarValue::UInt16(*v.get(slot)?),
            (Self::U32(v), _) => ScalarValue::UInt32(*v.get(slot)?),
            (Self::U64(v), _) => ScalarValue::UInt64(*v.get(slot)?),
            (Self::U128(v), _) => ScalarValue::UInt128(*v.get(slot)?),
            (Self::F32(v), _) => ScalarValue::Float32(*v.get(slot)?),
            (Self::F64(v), _) => ScalarValue::Float64(*v.get(slot)?),
            (Self::Bytes { .. }, ScalarType::Text) => {
                ScalarValue::Text(String::from_utf8_lossy(self.bytes_at(slot)?).into_owned())
            }
            (Self::Bytes { .. }, _) => ScalarValue::Blob(self.bytes_at(slot)?.to_vec()),
        };
        Some(value)
    }
}

/// A fixed-width native type that can back a column.
pub trait NativeType: bytemuck::Pod + Default + Send + Sync + std::fmt::Debug {
    const PHYSICAL: PhysicalType;

    /// Wrap a buffer of this type as column storage.
    fn into_data(values: Arc<[Self]>) -> ColumnData;

    /// Borrow column storage as a slice of this type, if it matches.
    fn slice(data: &ColumnData) -> Option<&[Self]>;
}

macro_rules! native_type {
    ($ty:ty, $variant:ident) => {
        impl NativeType for $ty {
            const PHYSICAL: PhysicalType = PhysicalType::$variant;

            fn into_data(values: Arc<[Self]>) -> ColumnData {
                ColumnData::$variant(values)
            }

            fn slice(data: &ColumnData) -> Option<&[Self]> {
                match data {
                    ColumnData::$variant(values) => Some(values),
                    _ => None,
                }
            }
        }
    };
}

native_type!(i8, I8);
native_type!(i16, I16);
native_type!(i32, I32);
native_type!(i64, I64);
native_type!(i128, I128);
native_type!(u8, U8);
native_type!(u16, U16);
native_type!(u32, U32);
native_type!(u64, U64);
native_type!(u128, U128);
native_type!(f32, F32);
native_type!(f64, F64);

/// A typed column of logical rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBatch {
    scalar_type: ScalarType,
    data: ColumnData,
    validity: ValidityMask,
    indirection: RowIndirection,
    len: usize,
}

impl ColumnBatch {
    /// Build a flat (sequential) batch from physical storage.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidBatch`] when the storage kind does not
    /// match `scalar_type`, when validity and data lengths differ, or when a
    /// variable-length offsets buffer is malformed.
    pub fn new(scalar_type: ScalarType, data: ColumnData, validity: ValidityMask) -> Result<Self> {
        if data.physical_type() != scalar_type.physical() {
            return Err(HashError::invalid_batch(format!(
                "{scalar_type} requires {:?} storage, got {:?}",
                scalar_type.physical(),
                data.physical_type()
            )));
        }
        if let ColumnData::Bytes { offsets, data: payload } = &data {
            validate_offsets(offsets, payload.len())?;
        }
        if data.len() != validity.len() {
            return Err(HashError::invalid_batch(format!(
                "data length {} does not match validity length {}",
                data.len(),
                validity.len()
            )));
        }
        let len = data.len();
        Ok(Self {
            scalar_type,
            data,
            validity,
            indirection: RowIndirection::Sequential,
            len,
        })
    }

    /// Build a flat batch from optional native values (`None` is NULL).
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidBatch`] if `T` is not the storage type of
    /// `scalar_type`.
    pub fn from_native<T: NativeType>(
        scalar_type: ScalarType,
        values: impl IntoIterator<Item = Option<T>>,
    ) -> Result<Self> {
        let values = values.into_iter();
        let mut validity = ValidityBuilder::with_capacity(values.size_hint().0);
        let data: Vec<T> = values
            .map(|value| {
                validity.push(value.is_some());
                value.unwrap_or_default()
            })
            .collect();
        Self::new(scalar_type, T::into_data(Arc::from(data)), validity.finish())
    }

    /// Build a flat text or blob batch from optional byte strings.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidBatch`] if `scalar_type` is not
    /// variable-length or the payload exceeds 4 GiB.
    pub fn from_bytes<'a>(
        scalar_type: ScalarType,
        values: impl IntoIterator<Item = Option<&'a [u8]>>,
    ) -> Result<Self> {
        let mut builder = BytesBuilder::default();
        for value in values {
            builder.push(value)?;
        }
        let (offsets, data, validity) = builder.finish();
        Self::new(scalar_type, ColumnData::Bytes { offsets, data }, validity)
    }

    /// Build a flat text batch from optional strings.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidBatch`] if the payload exceeds 4 GiB.
    pub fn from_strs<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Result<Self> {
        Self::from_bytes(
            ScalarType::Text,
            values.into_iter().map(|value| value.map(str::as_bytes)),
        )
    }

    /// Build a flat batch from dynamically-typed values.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidBatch`] when a non-NULL value's type does
    /// not match `scalar_type`.
    pub fn from_values(scalar_type: ScalarType, values: &[ScalarValue]) -> Result<Self> {
        let mut builder = TypedBuilder::new(scalar_type, values.len());
        for (row_idx, value) in values.iter().enumerate() {
            builder.push(value, row_idx)?;
        }
        builder.finish()
    }

    /// A batch of `row_count` rows that all read the same single value.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidBatch`] when `value`'s type does not match
    /// `scalar_type`.
    pub fn constant(scalar_type: ScalarType, value: &ScalarValue, row_count: usize) -> Result<Self> {
        let mut batch = Self::from_values(scalar_type, std::slice::from_ref(value))?;
        batch.indirection = RowIndirection::Constant;
        batch.len = row_count;
        Ok(batch)
    }

    /// A dictionary-coded batch: logical row `i` reads `dictionary` row
    /// `codes[i]`. The dictionary's storage is shared, not copied.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidBatch`] when a code is out of range.
    pub fn dictionary(dictionary: &Self, codes: &[u32]) -> Result<Self> {
        dictionary.select(codes)
    }

    /// A batch holding the given logical rows of `self`, in the given order.
    ///
    /// The result shares storage with `self`; only the indirection changes.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidBatch`] when an index is not a logical row
    /// of `self`.
    pub fn select(&self, logical_indices: &[u32]) -> Result<Self> {
        if let Some(&bad) = logical_indices.iter().find(|&&idx| idx as usize >= self.len) {
            return Err(HashError::invalid_batch(format!(
                "row index {bad} out of range for batch of {} rows",
                self.len
            )));
        }
        let indirection = match &self.indirection {
            RowIndirection::Constant => RowIndirection::Constant,
            other => RowIndirection::Dictionary(other.compose(logical_indices).ok_or_else(
                || HashError::invalid_batch("row index does not fit a 32-bit dictionary code"),
            )?),
        };
        Ok(Self {
            scalar_type: self.scalar_type,
            data: self.data.clone(),
            validity: self.validity.clone(),
            indirection,
            len: logical_indices.len(),
        })
    }

    /// Declared type tag.
    #[must_use]
    pub const fn scalar_type(&self) -> ScalarType {
        self.scalar_type
    }

    /// Physical storage.
    #[must_use]
    pub const fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Physical validity mask (indexed by physical slot).
    #[must_use]
    pub const fn validity(&self) -> &ValidityMask {
        &self.validity
    }

    #[must_use]
    pub const fn indirection(&self) -> &RowIndirection {
        &self.indirection
    }

    /// Number of logical rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Resolve a logical row to its physical slot and validity.
    ///
    /// This is the only place logical positions are translated; byte and
    /// seed extraction both go through it.
    #[must_use]
    #[inline]
    pub fn resolve(&self, logical: usize) -> RowSlot {
        if logical >= self.len {
            return RowSlot::INVALID;
        }
        match self.indirection.physical_index(logical) {
            Some(physical) => RowSlot {
                physical,
                valid: self.validity.is_valid(physical),
            },
            None => RowSlot::INVALID,
        }
    }

    /// Read a logical row back as a dynamically-typed value.
    #[must_use]
    pub fn value(&self, logical: usize) -> ScalarValue {
        let slot = self.resolve(logical);
        if !slot.valid {
            return ScalarValue::Null;
        }
        self.data
            .value_at(slot.physical, self.scalar_type)
            .unwrap_or(ScalarValue::Null)
    }

    /// Number of logical rows that are NULL.
    #[must_use]
    pub fn null_count(&self) -> usize {
        (0..self.len).filter(|&row| !self.resolve(row).valid).count()
    }
}

fn validate_offsets(offsets: &[u32], payload_len: usize) -> Result<()> {
    if offsets.is_empty() {
        return Err(HashError::invalid_batch(
            "offsets buffer must contain at least one entry",
        ));
    }
    if offsets.windows(2).any(|pair| pair[0] > pair[1]) {
        return Err(HashError::invalid_batch("offsets must be non-decreasing"));
    }
    let last = offsets.last().copied().unwrap_or(0) as usize;
    if last > payload_len {
        return Err(HashError::invalid_batch(format!(
            "final offset {last} exceeds payload length {payload_len}"
        )));
    }
    Ok(())
}

#[derive(Debug)]
struct BytesBuilder {
    offsets: Vec<u32>,
    data: Vec<u8>,
    validity: ValidityBuilder,
}

impl Default for BytesBuilder {
    fn default() -> Self {
        Self {
            offsets: vec![0],
            data: Vec::new(),
            validity: ValidityBuilder::with_capacity(0),
        }
    }
}

impl BytesBuilder {
    fn push(&mut self, value: Option<&[u8]>) -> Result<()> {
        if let Some(bytes) = value {
            self.data.extend_from_slice(bytes);
        }
        let next_offset = u32::try_from(self.data.len())
            .map_err(|_| HashError::invalid_batch("variable-length column exceeds 4 GiB payload"))?;
        self.offsets.push(next_offset);
        self.validity.push(value.is_some());
        Ok(())
    }

    fn finish(self) -> (Arc<[u32]>, Arc<[u8]>, ValidityMask) {
        (
            Arc::from(self.offsets),
            Arc::from(self.data),
            self.validity.finish(),
        )
    }
}

#[derive(Debug)]
enum ColumnBuilder {
    I8(Vec<i8>, ValidityBuilder),
    I16(Vec<i16>, ValidityBuilder),
    I32(Vec<i32>, ValidityBuilder),
    I64(Vec<i64>, ValidityBuilder),
    I128(Vec<i128>, ValidityBuilder),
    U8(Vec<u8>, ValidityBuilder),
    U16(Vec<u16>, ValidityBuilder),
    U32(Vec<u32>, ValidityBuilder),
    U64(Vec<u64>, ValidityBuilder),
    U128(Vec<u128>, ValidityBuilder),
    F32(Vec<f32>, ValidityBuilder),
    F64(Vec<f64>, ValidityBuilder),
    Bytes(BytesBuilder),
}

struct TypedBuilder {
    scalar_type: ScalarType,
    inner: ColumnBuilder,
}

impl TypedBuilder {
    fn new(scalar_type: ScalarType, rows: usize) -> Self {
        let v = ValidityBuilder::with_capacity(rows);
        let inner = match scalar_type.physical() {
            PhysicalType::I8 => ColumnBuilder::I8(Vec::with_capacity(rows), v),
            PhysicalType::I16 => ColumnBuilder::I16(Vec::with_capacity(rows), v),
            PhysicalType::I32 => ColumnBuilder::I32(Vec::with_capacity(rows), v),
            PhysicalType::I64 => ColumnBuilder::I64(Vec::with_capacity(rows), v),
            PhysicalType::I128 => ColumnBuilder::I128(Vec::with_capacity(rows), v),
            PhysicalType::U8 => ColumnBuilder::U8(Vec::with_capacity(rows), v),
            PhysicalType::U16 => ColumnBuilder::U16(Vec::with_capacity(rows), v),
            PhysicalType::U32 => ColumnBuilder::U32(Vec::with_capacity(rows), v),
            PhysicalType::U64 => ColumnBuilder::U64(Vec::with_capacity(rows), v),
            PhysicalType::U128 => ColumnBuilder::U128(Vec::with_capacity(rows), v),
            PhysicalType::F32 => ColumnBuilder::F32(Vec::with_capacity(rows), v),
            PhysicalType::F64 => ColumnBuilder::F64(Vec::with_capacity(rows), v),
            PhysicalType::Bytes => ColumnBuilder::Bytes(BytesBuilder::default()),
        };
        Self { scalar_type, inner }
    }

    #[allow(clippy::too_many_lines)]
    fn push(&mut self, value: &ScalarValue, row_idx: usize) -> Result<()> {
        if value.is_null() {
            self.push_null()?;
            return Ok(());
        }
        if value.scalar_type() != Some(self.scalar_type) {
            return Err(HashError::invalid_batch(format!(
                "type mismatch at row {row_idx} (expected {}, got {})",
                self.scalar_type,
                value
                    .scalar_type()
                    .map_or("NULL", crate::ScalarType::sql_name)
            )));
        }
        match (&mut self.inner, value) {
            (ColumnBuilder::I8(values, validity), ScalarValue::Int8(v)) => {
                values.push(*v);
                validity.push(true);
            }
            (ColumnBuilder::I16(values, validity), ScalarValue::Int16(v)) => {
                values.push(*v);
                validity.push(true);
            }
            (ColumnBuilder::I32(values, validity), ScalarValue::Int32(v) | ScalarValue::Date(v)) => {
                values.push(*v);
                validity.push(true);
            }
            (
                ColumnBuilder::I64(values, validity),
                ScalarValue::Int64(v) | ScalarValue::Time(v) | ScalarValue::Timestamp(v),
            ) => {
                values.push(*v);
                validity.push(true);
            }
            (
                ColumnBuilder::I128(values, validity),
                ScalarValue::Int128(v) | ScalarValue::Interval(v),
            ) => {
                values.push(*v);
                validity.push(true);
            }
            (ColumnBuilder::U8(values, validity), ScalarValue::UInt8(v)) => {
                values.push(*v);
                validity.push(true);
            }
            (ColumnBuilder::U8(values, validity), ScalarValue::Boolean(v)) => {
                values.push(u8::from(*v));
                validity.push(true);
            }
            (ColumnBuilder::U16(values, validity), ScalarValue::UInt16(v)) => {
                values.push(*v);
                validity.push(true);
            }
            (ColumnBuilder::U32(values, validity), ScalarValue::UInt32(v)) => {
                values.push(*v);
                validity.push(true);
            }
            (ColumnBuilder::U64(values, validity), ScalarValue::UInt64(v)) => {
                values.push(*v);
                validity.push(true);
            }
            (ColumnBuilder::U128(values, validity), ScalarValue::UInt128(v)) => {
                values.push(*v);
                validity.push(true);
            }
            (ColumnBuilder::F32(values, validity), ScalarValue::Float32(v)) => {
                values.push(*v);
                validity.push(true);
            }
            (ColumnBuilder::F64(values, validity), ScalarValue::Float64(v)) => {
                values.push(*v);
                validity.push(true);
            }
            (ColumnBuilder::Bytes(builder), ScalarValue::Text(_) | ScalarValue::Blob(_)) => {
                builder.push(value.as_bytes())?;
            }
            _ => {
                return Err(HashError::invalid_batch(format!(
                    "type mismatch at row {row_idx} for {}",
                    self.scalar_type
                )));
            }
        }
        Ok(())
    }

    fn push_null(&mut self) -> Result<()> {
        match &mut self.inner {
            ColumnBuilder::I8(values, validity) => {
                values.push(0);
                validity.push(false);
            }
            ColumnBuilder::I16(values, validity) => {
                values.push(0);
                validity.push(false);
            }
            ColumnBuilder::I32(values, validity) => {
                values.push(0);
                validity.push(false);
            }
            ColumnBuilder::I64(values, validity) => {
                values.push(0);
                validity.push(false);
            }
            ColumnBuilder::I128(values, validity) => {
                values.push(0);
                validity.push(false);
            }
            ColumnBuilder::U8(values, validity) => {
                values.push(0);
                validity.push(false);
            }
            ColumnBuilder::U16(values, validity) => {
                values.push(0);
                validity.push(false);
            }
            ColumnBuilder::U32(values, validity) => {
                values.push(0);
                validity.push(false);
            }
            ColumnBuilder::U64(values, validity) => {
                values.push(0);
                validity.push(false);
            }
            ColumnBuilder::U128(values, validity) => {
                values.push(0);
                validity.push(false);
            }
            ColumnBuilder::F32(values, validity) => {
                values.push(0.0);
                validity.push(false);
            }
            ColumnBuilder::F64(values, validity) => {
                values.push(0.0);
                validity.push(false);
            }
            ColumnBuilder::Bytes(builder) => builder.push(None)?,
        }
        Ok(())
    }

    fn finish(self) -> Result<ColumnBatch> {
        let (data, validity) = match self.inner {
            ColumnBuilder::I8(v, m) => (ColumnData::I8(Arc::from(v)), m.finish()),
            ColumnBuilder::I16(v, m) => (ColumnData::I16(Arc::from(v)), m.finish()),
            ColumnBuilder::I32(v, m) => (ColumnData::I32(Arc::from(v)), m.finish()),
            ColumnBuilder::I64(v, m) => (ColumnData::I64(Arc::from(v)), m.finish()),
            ColumnBuilder::I128(v, m) => (ColumnData::I128(Arc::from(v)), m.finish()),
            ColumnBuilder::U8(v, m) => (ColumnData::U8(Arc::from(v)), m.finish()),
            ColumnBuilder::U16(v, m) => (ColumnData::U16(Arc::from(v)), m.finish()),
            ColumnBuilder::U32(v, m) => (ColumnData::U32(Arc::from(v)), m.finish()),
            ColumnBuilder::U64(v, m) => (ColumnData::U64(Arc::from(v)), m.finish()),
            ColumnBuilder::U128(v, m) => (ColumnData::U128(Arc::from(v)), m.finish()),
            ColumnBuilder::F32(v, m) => (ColumnData::F32(Arc::from(v)), m.finish()),
            ColumnBuilder::F64(v, m) => (ColumnData::F64(Arc::from(v)), m.finish()),
            ColumnBuilder::Bytes(builder) => {
                let (offsets, data, validity) = builder.finish();
                (ColumnData::Bytes { offsets, data }, validity)
            }
        };
        ColumnBatch::new(self.scalar_type, data, validity)
    }
}
