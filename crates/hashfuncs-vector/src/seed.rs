//! Per-row seed resolution.

use hashfuncs_algo::{HashAlgorithm, SeedInt};
use hashfuncs_error::{HashError, Result};
use hashfuncs_types::{ColumnBatch, NativeType};

/// The seed for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSlot<S> {
    /// No seed column: use the algorithm default (same as zero).
    NoSeed,
    Seed(S),
    /// The seed row is NULL; the output row must be NULL too.
    Invalid,
}

impl<S: Copy> SeedSlot<S> {
    /// The seed to pass to a kernel, or `None` for an invalid seed row.
    #[must_use]
    #[inline]
    pub const fn kernel_seed(self) -> Option<Option<S>> {
        match self {
            Self::NoSeed => Some(None),
            Self::Seed(seed) => Some(Some(seed)),
            Self::Invalid => None,
        }
    }
}

/// Reads seeds of width `S` from an optional seed column.
#[derive(Debug, Clone, Copy)]
pub struct SeedResolver<'a, S: SeedInt> {
    column: Option<(&'a ColumnBatch, &'a [S])>,
}

impl<'a, S: SeedInt> SeedResolver<'a, S> {
    /// Resolver that always yields [`SeedSlot::NoSeed`].
    #[must_use]
    pub const fn unseeded() -> Self {
        Self { column: None }
    }

    /// Wrap a seed column whose width has already been checked.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidBatch`] if the column's storage is not `S`.
    pub fn new(seeds: Option<&'a ColumnBatch>) -> Result<Self> {
        let Some(batch) = seeds else {
            return Ok(Self::unseeded());
        };
        let values = S::slice(batch.data()).ok_or_else(|| {
            HashError::invalid_batch(format!(
                "seed column storage is {:?}, expected {:?}",
                batch.data().physical_type(),
                <S as NativeType>::PHYSICAL
            ))
        })?;
        Ok(Self {
            column: Some((batch, values)),
        })
    }

    #[must_use]
    pub const fn is_seeded(&self) -> bool {
        self.column.is_some()
    }

    /// Seed for logical row `logical`, read through the seed column's
    /// indirection.
    #[must_use]
    #[inline]
    pub fn resolve(&self, logical: usize) -> SeedSlot<S> {
        let Some((batch, values)) = self.column else {
            return SeedSlot::NoSeed;
        };
        let slot = batch.resolve(logical);
        if !slot.valid {
            return SeedSlot::Invalid;
        }
        values
            .get(slot.physical)
            .map_or(SeedSlot::Invalid, |&seed| SeedSlot::Seed(seed))
    }
}

/// Check a seed column against the algorithm before any row is hashed.
///
/// # Errors
///
/// Returns [`HashError::SeedWidthMismatch`] when the column is not the
/// unsigned type of the algorithm's seed width, or
/// [`HashError::RowCountMismatch`] when it has a different row count.
pub fn check_seed_column(
    algorithm: HashAlgorithm,
    input_rows: usize,
    seeds: Option<&ColumnBatch>,
) -> Result<()> {
    let Some(seeds) = seeds else {
        return Ok(());
    };
    let expected = algorithm.seed_width().scalar_type();
    if seeds.scalar_type() != expected {
        return Err(HashError::SeedWidthMismatch {
            function: algorithm.name().to_owned(),
            expected: expected.to_string(),
            actual: seeds.scalar_type().to_string(),
        });
    }
    if seeds.len() != input_rows {
        return Err(HashError::RowCountMismatch {
            input: input_rows,
            seed: seeds.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use hashfuncs_types::{ScalarType, ScalarValue};

    use super::*;

    fn u64_seeds(values: &[Option<u64>]) -> ColumnBatch {
        ColumnBatch::from_native(ScalarType::UInt64, values.iter().copied()).expect("seed batch")
    }

    #[test]
    fn no_column_means_no_seed() {
        let resolver = SeedResolver::<u64>::new(None).expect("unseeded");
        assert!(!resolver.is_seeded());
        assert_eq!(resolver.resolve(0), SeedSlot::NoSeed);
        assert_eq!(resolver.resolve(usize::MAX), SeedSlot::NoSeed);
        assert_eq!(resolver.resolve(3).kernel_seed(), Some(None));
    }

    #[test]
    fn null_seed_row_is_invalid() {
        let seeds = u64_seeds(&[Some(1), None, Some(0)]);
        let resolver = SeedResolver::<u64>::new(Some(&seeds)).expect("seeded");
        assert_eq!(resolver.resolve(0), SeedSlot::Seed(1));
        assert_eq!(resolver.resolve(1), SeedSlot::Invalid);
        assert_eq!(resolver.resolve(1).kernel_seed(), None);
        assert_eq!(resolver.resolve(2), SeedSlot::Seed(0));
    }

    #[test]
    fn seeds_resolve_through_indirection() {
        let dict = u64_seeds(&[Some(10), None, Some(30)]);
        let coded = ColumnBatch::dictionary(&dict, &[2, 1, 0, 2]).expect("codes");
        let resolver = SeedResolver::<u64>::new(Some(&coded)).expect("seeded");
        let resolved: Vec<_> = (0..4).map(|row| resolver.resolve(row)).collect();
        assert_eq!(
            resolved,
            vec![
                SeedSlot::Seed(30),
                SeedSlot::Invalid,
                SeedSlot::Seed(10),
                SeedSlot::Seed(30)
            ]
        );

        let constant = ColumnBatch::constant(ScalarType::UInt32, &ScalarValue::UInt32(5), 3)
            .expect("constant seed");
        let resolver = SeedResolver::<u32>::new(Some(&constant)).expect("seeded");
        assert!((0..3).all(|row| resolver.resolve(row) == SeedSlot::Seed(5)));
    }

    #[test]
    fn storage_width_must_match_resolver() {
        let seeds = u64_seeds(&[Some(1)]);
        assert!(SeedResolver::<u32>::new(Some(&seeds)).is_err());
    }

    #[test]
    fn boundary_checks_width_and_rows() {
        let seeds = u64_seeds(&[Some(1), Some(2)]);
        assert!(check_seed_column(HashAlgorithm::Xxh64, 2, Some(&seeds)).is_ok());
        assert!(check_seed_column(HashAlgorithm::Xxh64, 2, None).is_ok());

        let err = check_seed_column(HashAlgorithm::Xxh32, 2, Some(&seeds))
            .expect_err("64-bit seeds for a 32-bit algorithm");
        assert_eq!(
            err.to_string(),
            "seed for xxh32 must be UINTEGER, got UBIGINT"
        );

        let err = check_seed_column(HashAlgorithm::Xxh64, 3, Some(&seeds))
            .expect_err("row count mismatch");
        assert_eq!(err, HashError::RowCountMismatch { input: 3, seed: 2 });

        let signed = ColumnBatch::from_native(ScalarType::Int64, [Some(1_i64), Some(2)])
            .expect("signed seeds");
        assert!(matches!(
            check_seed_column(HashAlgorithm::RapidHash, 2, Some(&signed)),
            Err(HashError::SeedWidthMismatch { .. })
        ));
    }
}
