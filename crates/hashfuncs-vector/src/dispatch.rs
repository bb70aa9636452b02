//! Batch hashing dispatcher.
//!
//! One generic per-row loop serves every algorithm and every type:
//! - the type tag picks a byte extraction strategy once per batch,
//! - each row resolves its seed first, then its bytes, both through the
//!   batch's row indirection,
//! - a NULL seed or NULL input makes the output row NULL without hashing,
//! - the `hash_batch` tracing span carries `algorithm`, `scalar_type`,
//!   `batch_size` and `seeded` fields.
//!
//! Rows are independent, so large batches are split into disjoint output
//! chunks and hashed on the rayon pool.

use hashfuncs_algo::{
    HashAlgorithm, HashKernel, Murmur3_32, Murmur3X64_128, Murmur3X86_128, RapidHash64, Xxh3_128,
    Xxh3_64, Xxh32, Xxh64,
};
use hashfuncs_error::Result;
use hashfuncs_types::{ColumnBatch, ValidityMask};
use rayon::prelude::*;
use tracing::debug;

use crate::byte_view::ByteViewResolver;
use crate::config::DispatchConfig;
use crate::metrics::GLOBAL_HASH_METRICS;
use crate::output::{DigestColumn, HashOutput, OutputBatch};
use crate::seed::{SeedResolver, check_seed_column};

/// Hash every row of `input` with the default [`DispatchConfig`].
///
/// # Errors
///
/// See [`HashEngine::hash`].
pub fn hash_batch(
    algorithm: HashAlgorithm,
    input: &ColumnBatch,
    seeds: Option<&ColumnBatch>,
) -> Result<HashOutput> {
    HashEngine::default().hash(algorithm, input, seeds)
}

/// Dispatcher bound to one configuration. Holds no per-batch state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashEngine {
    config: DispatchConfig,
}

impl HashEngine {
    /// # Errors
    ///
    /// Returns [`hashfuncs_error::HashError::InvalidConfig`] if `config`
    /// fails validation.
    pub fn new(config: DispatchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Engine configured from `HASHFUNCS_*` environment variables.
    ///
    /// # Errors
    ///
    /// See [`DispatchConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::new(DispatchConfig::from_env()?)
    }

    #[must_use]
    pub const fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Hash every logical row of `input` with `algorithm`.
    ///
    /// `seeds`, when given, must be the unsigned column type of the
    /// algorithm's seed width and have `input.len()` rows.
    ///
    /// # Errors
    ///
    /// - [`hashfuncs_error::HashError::UnsupportedType`] if `input`'s type is
    ///   not hashable,
    /// - [`hashfuncs_error::HashError::SeedWidthMismatch`] or
    ///   [`hashfuncs_error::HashError::RowCountMismatch`] for a bad seed column.
    ///
    /// A zero-row `input` always yields an empty output, whatever its type
    /// and seeds. No rows are hashed when an error is returned.
    pub fn hash(
        &self,
        algorithm: HashAlgorithm,
        input: &ColumnBatch,
        seeds: Option<&ColumnBatch>,
    ) -> Result<HashOutput> {
        let digests: DigestColumn = match algorithm {
            HashAlgorithm::Xxh32 => self.hash_with::<Xxh32>(input, seeds)?.into(),
            HashAlgorithm::Xxh64 => self.hash_with::<Xxh64>(input, seeds)?.into(),
            HashAlgorithm::Xxh3_64 => self.hash_with::<Xxh3_64>(input, seeds)?.into(),
            HashAlgorithm::Xxh3_128 => self.hash_with::<Xxh3_128>(input, seeds)?.into(),
            HashAlgorithm::RapidHash => self.hash_with::<RapidHash64>(input, seeds)?.into(),
            HashAlgorithm::Murmur3_32 => self.hash_with::<Murmur3_32>(input, seeds)?.into(),
            HashAlgorithm::Murmur3X86_128 => self.hash_with::<Murmur3X86_128>(input, seeds)?.into(),
            HashAlgorithm::Murmur3X64_128 => self.hash_with::<Murmur3X64_128>(input, seeds)?.into(),
        };
        Ok(HashOutput {
            algorithm,
            digests,
        })
    }

    /// Statically-dispatched form of [`HashEngine::hash`].
    ///
    /// # Errors
    ///
    /// See [`HashEngine::hash`].
    pub fn hash_with<K: HashKernel>(
        &self,
        input: &ColumnBatch,
        seeds: Option<&ColumnBatch>,
    ) -> Result<OutputBatch<K::Output>> {
        let rows = input.len();
        let _span = tracing::debug_span!(
            "hash_batch",
            algorithm = %K::ALGORITHM,
            scalar_type = %input.scalar_type(),
            batch_size = rows,
            seeded = seeds.is_some(),
        )
        .entered();

        // Zero rows terminate before any type or seed check.
        if rows == 0 {
            GLOBAL_HASH_METRICS.record_batch(0, 0, false);
            return Ok(OutputBatch::Empty);
        }

        let (byte_views, seed_resolver) = match prepare::<K>(input, seeds) {
            Ok(resolvers) => resolvers,
            Err(err) => {
                GLOBAL_HASH_METRICS.record_rejected();
                debug!(error = %err, "hash_batch rejected");
                return Err(err);
            }
        };

        let parallel = self.config.use_parallel(rows);
        let mut values = vec![K::Output::default(); rows];
        let mut valid = vec![false; rows];
        if parallel {
            let chunk_rows = self.config.parallel_chunk_rows;
            values
                .par_chunks_mut(chunk_rows)
                .zip(valid.par_chunks_mut(chunk_rows))
                .enumerate()
                .for_each(|(chunk_idx, (values, valid))| {
                    hash_rows::<K>(
                        &byte_views,
                        &seed_resolver,
                        chunk_idx * chunk_rows,
                        values,
                        valid,
                    );
                });
        } else {
            hash_rows::<K>(&byte_views, &seed_resolver, 0, &mut values, &mut valid);
        }

        let null_rows = valid.iter().filter(|&&is_valid| !is_valid).count();
        let validity: ValidityMask = valid.into_iter().collect();
        let output = OutputBatch::finish(values, validity, self.config.collapse_single_row);

        GLOBAL_HASH_METRICS.record_batch(rows, null_rows, parallel);
        debug!(
            batch_size = rows,
            null_rows,
            parallel,
            representation = output.representation().as_str(),
            "hash_batch complete"
        );
        Ok(output)
    }
}

fn prepare<'a, K: HashKernel>(
    input: &'a ColumnBatch,
    seeds: Option<&'a ColumnBatch>,
) -> Result<(ByteViewResolver<'a>, SeedResolver<'a, K::Seed>)> {
    check_seed_column(K::ALGORITHM, input.len(), seeds)?;
    let byte_views = ByteViewResolver::new(input)?;
    let seed_resolver = SeedResolver::new(seeds)?;
    Ok((byte_views, seed_resolver))
}

/// Hash logical rows `first_row..first_row + values.len()` into `values`,
/// setting `valid` for rows that produced a digest.
#[inline]
fn hash_rows<K: HashKernel>(
    byte_views: &ByteViewResolver<'_>,
    seeds: &SeedResolver<'_, K::Seed>,
    first_row: usize,
    values: &mut [K::Output],
    valid: &mut [bool],
) {
    for (offset, (value, is_valid)) in values.iter_mut().zip(valid.iter_mut()).enumerate() {
        let row = first_row + offset;
        // Seed first: a NULL seed skips byte extraction entirely.
        let Some(seed) = seeds.resolve(row).kernel_seed() else {
            continue;
        };
        let Some(bytes) = byte_views.view(row) else {
            continue;
        };
        *value = K::hash_with_seed(bytes, seed);
        *is_valid = true;
    }
}
