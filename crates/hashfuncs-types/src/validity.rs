//! Packed validity bitmap (1 bit per row, 1 means value present).

use std::sync::Arc;

use hashfuncs_error::{HashError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityMask {
    bytes: Arc<[u8]>,
    len: usize,
}

impl ValidityMask {
    /// Create an all-valid mask.
    #[must_use]
    pub fn all_valid(len: usize) -> Self {
        Self {
            bytes: Arc::from(vec![0xFF; len.div_ceil(8)]),
            len,
        }
    }

    /// Create from raw bitmap bytes.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidBatch`] if `bytes` is too short for `len` rows.
    pub fn from_bytes(bytes: Arc<[u8]>, len: usize) -> Result<Self> {
        let expected = len.div_ceil(8);
        if bytes.len() < expected {
            return Err(HashError::invalid_batch(format!(
                "validity bitmap too short: expected at least {expected} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self { bytes, len })
    }

    /// Build from one flag per row.
    #[must_use]
    pub fn from_flags(flags: &[bool]) -> Self {
        let mut builder = ValidityBuilder::with_capacity(flags.len());
        for &flag in flags {
            builder.push(flag);
        }
        builder.finish()
    }

    /// Number of rows represented.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Packed bytes backing the mask.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns true when row is valid (non-NULL). Out-of-range rows are invalid.
    #[must_use]
    pub fn is_valid(&self, row_idx: usize) -> bool {
        if row_idx >= self.len {
            return false;
        }
        self.bytes
            .get(row_idx / 8)
            .is_some_and(|byte| (byte >> (row_idx % 8)) & 1 == 1)
    }

    /// Number of invalid rows.
    #[must_use]
    pub fn null_count(&self) -> usize {
        (0..self.len).filter(|&row| !self.is_valid(row)).count()
    }
}

impl FromIterator<bool> for ValidityMask {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut builder = ValidityBuilder::with_capacity(iter.size_hint().0);
        for flag in iter {
            builder.push(flag);
        }
        builder.finish()
    }
}

/// Incremental mask construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValidityBuilder {
    bytes: Vec<u8>,
    len: usize,
}

impl ValidityBuilder {
    pub(crate) fn with_capacity(len: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(len.div_ceil(8)),
            len: 0,
        }
    }

    pub(crate) fn push(&mut self, is_valid: bool) {
        let row_idx = self.len;
        if row_idx % 8 == 0 {
            self.bytes.push(0);
        }
        if is_valid {
            if let Some(byte) = self.bytes.last_mut() {
                *byte |= 1_u8 << (row_idx % 8);
            }
        }
        self.len += 1;
    }

    pub(crate) fn finish(self) -> ValidityMask {
        ValidityMask {
            bytes: Arc::from(self.bytes),
            len: self.len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_valid_covers_partial_byte() {
        let mask = ValidityMask::all_valid(10);
        assert_eq!(mask.len(), 10);
        assert_eq!(mask.as_bytes().len(), 2);
        assert!((0..10).all(|row| mask.is_valid(row)));
        assert!(!mask.is_valid(10), "out-of-range rows are invalid");
        assert_eq!(mask.null_count(), 0);
    }

    #[test]
    fn from_flags_packs_lsb_first() {
        let mask = ValidityMask::from_flags(&[true, false, true, true, false, false, false, false, true]);
        assert_eq!(mask.as_bytes(), &[0b0000_1101, 0b0000_0001]);
        assert!(mask.is_valid(0));
        assert!(!mask.is_valid(1));
        assert!(mask.is_valid(8));
        assert_eq!(mask.null_count(), 5);
    }

    #[test]
    fn from_iterator_matches_from_flags() {
        let flags = [false, true, true, false, true];
        let collected: ValidityMask = flags.iter().copied().collect();
        assert_eq!(collected, ValidityMask::from_flags(&flags));
    }

    #[test]
    fn rejects_short_bitmap() {
        let err = ValidityMask::from_bytes(Arc::from(vec![0xFF_u8]), 9)
            .expect_err("9 rows need 2 bytes");
        assert!(err.to_string().contains("validity bitmap too short"));
    }

    #[test]
    fn empty_mask() {
        let mask = ValidityMask::from_flags(&[]);
        assert!(mask.is_empty());
        assert!(mask.as_bytes().is_empty());
    }
}
