//! Output batch representation.
//!
//! A hash call produces one of three shapes: empty, a single repeated value,
//! or a dense array with a validity mask. Readers see the same rows either
//! way; the shape is only a representation choice.

use std::sync::Arc;

use hashfuncs_algo::{Digest, DigestInt, DigestWidth, HashAlgorithm};
use hashfuncs_types::{Hash128, ValidityMask};

/// Digests for one batch, in logical row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputBatch<D> {
    /// Zero rows.
    Empty,
    /// `row_count` rows that all hold `value` (`None` is NULL).
    Constant { value: Option<D>, row_count: usize },
    /// One slot per row.
    Dense {
        values: Arc<[D]>,
        validity: ValidityMask,
    },
}

/// Which representation an [`OutputBatch`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Empty,
    Constant,
    Dense,
}

impl Representation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Constant => "constant",
            Self::Dense => "dense",
        }
    }
}

impl<D: DigestInt> OutputBatch<D> {
    /// Finalize per-row results.
    ///
    /// Exactly one row collapses to [`OutputBatch::Constant`] when
    /// `collapse_single_row` is set; zero rows are always
    /// [`OutputBatch::Empty`].
    #[must_use]
    pub fn finish(values: Vec<D>, validity: ValidityMask, collapse_single_row: bool) -> Self {
        match values.len() {
            0 => Self::Empty,
            1 if collapse_single_row => Self::Constant {
                value: validity.is_valid(0).then_some(values[0]),
                row_count: 1,
            },
            _ => Self::Dense {
                values: Arc::from(values),
                validity,
            },
        }
    }

    #[must_use]
    pub const fn representation(&self) -> Representation {
        match self {
            Self::Empty => Representation::Empty,
            Self::Constant { .. } => Representation::Constant,
            Self::Dense { .. } => Representation::Dense,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Constant { row_count, .. } => *row_count,
            Self::Dense { values, .. } => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Digest of row `row`, `None` if the row is NULL or out of range.
    #[must_use]
    #[inline]
    pub fn get(&self, row: usize) -> Option<D> {
        match self {
            Self::Empty => None,
            Self::Constant { value, row_count } => value.filter(|_| row < *row_count),
            Self::Dense { values, validity } => {
                if validity.is_valid(row) {
                    values.get(row).copied()
                } else {
                    None
                }
            }
        }
    }

    #[must_use]
    pub fn is_valid(&self, row: usize) -> bool {
        self.get(row).is_some()
    }

    /// Number of NULL rows.
    #[must_use]
    pub fn null_count(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Constant { value, row_count } => {
                if value.is_some() {
                    0
                } else {
                    *row_count
                }
            }
            Self::Dense { validity, .. } => validity.null_count(),
        }
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Option<D>> + '_ {
        (0..self.len()).map(move |row| self.get(row))
    }

    /// Materialize every row.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Option<D>> {
        self.iter().collect()
    }
}

/// Output batch of whichever digest width the algorithm produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestColumn {
    U32(OutputBatch<u32>),
    U64(OutputBatch<u64>),
    U128(OutputBatch<Hash128>),
}

macro_rules! each_column {
    ($column:expr, $batch:ident => $body:expr) => {
        match $column {
            DigestColumn::U32($batch) => $body,
            DigestColumn::U64($batch) => $body,
            DigestColumn::U128($batch) => $body,
        }
    };
}

impl DigestColumn {
    #[must_use]
    pub const fn width(&self) -> DigestWidth {
        match self {
            Self::U32(_) => DigestWidth::Bits32,
            Self::U64(_) => DigestWidth::Bits64,
            Self::U128(_) => DigestWidth::Bits128,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        each_column!(self, batch => batch.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn get(&self, row: usize) -> Option<Digest> {
        each_column!(self, batch => batch.get(row).map(Into::into))
    }

    #[must_use]
    pub fn is_valid(&self, row: usize) -> bool {
        each_column!(self, batch => batch.is_valid(row))
    }

    #[must_use]
    pub fn null_count(&self) -> usize {
        each_column!(self, batch => batch.null_count())
    }

    #[must_use]
    pub fn representation(&self) -> Representation {
        each_column!(self, batch => batch.representation())
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Option<Digest>> {
        (0..self.len()).map(|row| self.get(row)).collect()
    }
}

impl From<OutputBatch<u32>> for DigestColumn {
    fn from(batch: OutputBatch<u32>) -> Self {
        Self::U32(batch)
    }
}

impl From<OutputBatch<u64>> for DigestColumn {
    fn from(batch: OutputBatch<u64>) -> Self {
        Self::U64(batch)
    }
}

impl From<OutputBatch<Hash128>> for DigestColumn {
    fn from(batch: OutputBatch<Hash128>) -> Self {
        Self::U128(batch)
    }
}

/// The result of hashing one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashOutput {
    pub algorithm: HashAlgorithm,
    pub digests: DigestColumn,
}

impl HashOutput {
    #[must_use]
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    #[must_use]
    pub fn get(&self, row: usize) -> Option<Digest> {
        self.digests.get(row)
    }

    #[must_use]
    pub fn is_valid(&self, row: usize) -> bool {
        self.digests.is_valid(row)
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Option<Digest>> {
        self.digests.to_vec()
    }

    /// The 32-bit digests, if the algorithm produces them.
    #[must_use]
    pub const fn as_u32(&self) -> Option<&OutputBatch<u32>> {
        match &self.digests {
            DigestColumn::U32(batch) => Some(batch),
            _ => None,
        }
    }

    /// The 64-bit digests, if the algorithm produces them.
    #[must_use]
    pub const fn as_u64(&self) -> Option<&OutputBatch<u64>> {
        match &self.digests {
            DigestColumn::U64(batch) => Some(batch),
            _ => None,
        }
    }

    /// The 128-bit digests, if the algorithm produces them.
    #[must_use]
    pub const fn as_u128(&self) -> Option<&OutputBatch<Hash128>> {
        match &self.digests {
            DigestColumn::U128(batch) => Some(batch),
            _ => None,
        }
    }
}
