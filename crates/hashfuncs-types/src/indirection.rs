//! Logical-to-physical row mapping.
//!
//! Constant, dictionary-coded and filtered batches share their physical
//! storage with the batch they were derived from; only the mapping differs.
//! Every read of a logical row goes through [`RowIndirection::physical_index`].

use std::sync::Arc;

/// How logical rows map onto physical storage slots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RowIndirection {
    /// Logical row `i` is physical slot `i`.
    #[default]
    Sequential,
    /// Every logical row reads physical slot 0.
    Constant,
    /// Logical row `i` reads physical slot `indices[i]`.
    Dictionary(Arc<[u32]>),
}

impl RowIndirection {
    /// Physical slot for a logical row, or `None` if the dictionary has no
    /// entry for it.
    #[must_use]
    #[inline]
    pub fn physical_index(&self, logical: usize) -> Option<usize> {
        match self {
            Self::Sequential => Some(logical),
            Self::Constant => Some(0),
            Self::Dictionary(indices) => indices.get(logical).map(|&slot| slot as usize),
        }
    }

    /// Map `logical_indices` through this indirection, producing the physical
    /// index list of a batch that selects those rows.
    #[must_use]
    pub fn compose(&self, logical_indices: &[u32]) -> Option<Arc<[u32]>> {
        let mut physical = Vec::with_capacity(logical_indices.len());
        for &logical in logical_indices {
            let slot = self.physical_index(logical as usize)?;
            physical.push(u32::try_from(slot).ok()?);
        }
        Some(Arc::from(physical))
    }
}

/// A resolved logical row: where its value lives and whether it is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSlot {
    pub physical: usize,
    pub valid: bool,
}

impl RowSlot {
    pub const INVALID: Self = Self {
        physical: 0,
        valid: false,
    };
}
