//! Scalar byte views.
//!
//! The extraction strategy is chosen once per batch from its type tag. Each
//! row's bytes are then read through [`ColumnBatch::resolve`], so constant,
//! dictionary and filtered batches read the same bytes as their flat
//! equivalents.

use hashfuncs_error::{HashError, Result};
use hashfuncs_types::{ColumnBatch, ColumnData, ScalarType};

/// How a type tag's values are turned into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// The value's native in-memory representation, `width` bytes.
    Fixed { width: usize },
    /// The payload of a variable-length value.
    Variable,
}

/// Closed switch over the type tag.
///
/// # Errors
///
/// Returns [`HashError::UnsupportedType`] for tags outside the hashable set.
pub fn extraction_for(scalar_type: ScalarType) -> Result<Extraction> {
    let width = match scalar_type {
        ScalarType::Int8 | ScalarType::UInt8 => 1,
        ScalarType::Int16 | ScalarType::UInt16 => 2,
        ScalarType::Int32 | ScalarType::UInt32 | ScalarType::Float32 | ScalarType::Date => 4,
        ScalarType::Int64 | ScalarType::UInt64 | ScalarType::Float64 | ScalarType::Time => 8,
        ScalarType::Int128 | ScalarType::UInt128 => 16,
        ScalarType::Text | ScalarType::Blob => return Ok(Extraction::Variable),
        ScalarType::Boolean | ScalarType::Timestamp | ScalarType::Interval => {
            return Err(HashError::unsupported(scalar_type.sql_name()));
        }
    };
    Ok(Extraction::Fixed { width })
}

#[derive(Debug, Clone, Copy)]
enum Storage<'a> {
    Fixed { bytes: &'a [u8], width: usize },
    Variable { offsets: &'a [u32], data: &'a [u8] },
}

/// Per-row byte access into one column batch.
#[derive(Debug, Clone, Copy)]
pub struct ByteViewResolver<'a> {
    batch: &'a ColumnBatch,
    storage: Storage<'a>,
}

impl<'a> ByteViewResolver<'a> {
    /// Select the extraction strategy for `batch`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::UnsupportedType`] when the batch's tag is not
    /// hashable, or [`HashError::InvalidBatch`] if its storage does not match
    /// the strategy.
    pub fn new(batch: &'a ColumnBatch) -> Result<Self> {
        let scalar_type = batch.scalar_type();
        let extraction = extraction_for(scalar_type).inspect_err(|_| {
            tracing::warn!(scalar_type = %scalar_type, "rejecting unsupported type");
        })?;
        let storage = match (extraction, batch.data()) {
            (Extraction::Variable, ColumnData::Bytes { offsets, data }) => {
                Storage::Variable { offsets, data }
            }
            (Extraction::Fixed { width }, data) => match data.fixed_bytes() {
                Some((bytes, actual)) if actual == width => Storage::Fixed { bytes, width },
                _ => {
                    return Err(HashError::invalid_batch(format!(
                        "{scalar_type} column is not backed by {width}-byte storage"
                    )));
                }
            },
            (Extraction::Variable, _) => {
                return Err(HashError::invalid_batch(format!(
                    "{scalar_type} column is not backed by variable-length storage"
                )));
            }
        };
        Ok(Self { batch, storage })
    }

    /// Bytes of logical row `logical`, or `None` if the row is NULL.
    ///
    /// A zero-length text or blob value yields an empty slice, not `None`.
    #[must_use]
    #[inline]
    pub fn view(&self, logical: usize) -> Option<&'a [u8]> {
        let slot = self.batch.resolve(logical);
        if !slot.valid {
            return None;
        }
        self.physical_view(slot.physical)
    }

    #[inline]
    fn physical_view(&self, physical: usize) -> Option<&'a [u8]> {
        match self.storage {
            Storage::Fixed { bytes, width } => {
                let start = physical.checked_mul(width)?;
                bytes.get(start..start + width)
            }
            Storage::Variable { offsets, data } => {
                let start = *offsets.get(physical)? as usize;
                let end = *offsets.get(physical + 1)? as usize;
                data.get(start..end)
            }
        }
    }
}

/// Bytes of one logical row of `batch`.
///
/// # Errors
///
/// Same as [`ByteViewResolver::new`].
pub fn byte_view(batch: &ColumnBatch, logical: usize) -> Result<Option<&[u8]>> {
    Ok(ByteViewResolver::new(batch)?.view(logical))
}
