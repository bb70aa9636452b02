//! One zero-sized kernel per algorithm (**NOT CRYPTO**).
//!
//! Kernels wrap the registry implementations and do no null handling. A
//! `None` seed hashes exactly like the zero seed.

use std::fmt::Debug;
use std::io;

use hashfuncs_types::{Hash128, NativeType};
use rapidhash::v3::{RapidSecrets, rapidhash_v3_seeded};
use xxhash_rust::{xxh3, xxh32, xxh64};

use crate::{Digest, DigestWidth, HashAlgorithm, SeedWidth};

/// An unsigned integer usable as a seed.
pub trait SeedInt: NativeType + Copy + Eq + Into<u64> {
    const WIDTH: SeedWidth;

    /// Narrow a 64-bit seed, `None` if it does not fit.
    fn try_from_u64(value: u64) -> Option<Self>;
}

impl SeedInt for u32 {
    const WIDTH: SeedWidth = SeedWidth::Bits32;

    fn try_from_u64(value: u64) -> Option<Self> {
        Self::try_from(value).ok()
    }
}

impl SeedInt for u64 {
    const WIDTH: SeedWidth = SeedWidth::Bits64;

    fn try_from_u64(value: u64) -> Option<Self> {
        Some(value)
    }
}

/// A fixed-width digest value.
pub trait DigestInt: Copy + Default + Eq + Send + Sync + Debug + Into<Digest> {
    const WIDTH: DigestWidth;
}

impl DigestInt for u32 {
    const WIDTH: DigestWidth = DigestWidth::Bits32;
}

impl DigestInt for u64 {
    const WIDTH: DigestWidth = DigestWidth::Bits64;
}

impl DigestInt for Hash128 {
    const WIDTH: DigestWidth = DigestWidth::Bits128;
}

/// Uniform `hash(bytes, optional seed) -> digest` contract.
pub trait HashKernel: Send + Sync + 'static {
    const ALGORITHM: HashAlgorithm;
    type Seed: SeedInt;
    type Output: DigestInt;

    fn hash_with_seed(data: &[u8], seed: Option<Self::Seed>) -> Self::Output;

    #[inline]
    fn hash(data: &[u8]) -> Self::Output {
        Self::hash_with_seed(data, None)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Xxh32;

#[derive(Debug, Clone, Copy, Default)]
pub struct Xxh64;

#[derive(Debug, Clone, Copy, Default)]
pub struct Xxh3_64;

#[derive(Debug, Clone, Copy, Default)]
pub struct Xxh3_128;

#[derive(Debug, Clone, Copy, Default)]
pub struct RapidHash64;

#[derive(Debug, Clone, Copy, Default)]
pub struct Murmur3_32;

#[derive(Debug, Clone, Copy, Default)]
pub struct Murmur3X86_128;

#[derive(Debug, Clone, Copy, Default)]
pub struct Murmur3X64_128;

impl HashKernel for Xxh32 {
    const ALGORITHM: HashAlgorithm = HashAlgorithm::Xxh32;
    type Seed = u32;
    type Output = u32;

    #[inline]
    fn hash_with_seed(data: &[u8], seed: Option<u32>) -> u32 {
        xxh32::xxh32(data, seed.unwrap_or(0))
    }
}

impl HashKernel for Xxh64 {
    const ALGORITHM: HashAlgorithm = HashAlgorithm::Xxh64;
    type Seed = u64;
    type Output = u64;

    #[inline]
    fn hash_with_seed(data: &[u8], seed: Option<u64>) -> u64 {
        xxh64::xxh64(data, seed.unwrap_or(0))
    }
}

impl HashKernel for Xxh3_64 {
    const ALGORITHM: HashAlgorithm = HashAlgorithm::Xxh3_64;
    type Seed = u64;
    type Output = u64;

    #[inline]
    fn hash_with_seed(data: &[u8], seed: Option<u64>) -> u64 {
        match seed {
            Some(seed) => xxh3::xxh3_64_with_seed(data, seed),
            None => xxh3::xxh3_64(data),
        }
    }
}

impl HashKernel for Xxh3_128 {
    const ALGORITHM: HashAlgorithm = HashAlgorithm::Xxh3_128;
    type Seed = u64;
    type Output = Hash128;

    #[inline]
    fn hash_with_seed(data: &[u8], seed: Option<u64>) -> Hash128 {
        let digest = match seed {
            Some(seed) => xxh3::xxh3_128_with_seed(data, seed),
            None => xxh3::xxh3_128(data),
        };
        Hash128::from(digest)
    }
}

impl HashKernel for RapidHash64 {
    const ALGORITHM: HashAlgorithm = HashAlgorithm::RapidHash;
    type Seed = u64;
    type Output = u64;

    #[inline]
    fn hash_with_seed(data: &[u8], seed: Option<u64>) -> u64 {
        let secrets = RapidSecrets::seed_cpp(seed.unwrap_or(0));
        rapidhash_v3_seeded(data, &secrets)
    }
}

impl HashKernel for Murmur3_32 {
    const ALGORITHM: HashAlgorithm = HashAlgorithm::Murmur3_32;
    type Seed = u32;
    type Output = u32;

    #[inline]
    fn hash_with_seed(mut data: &[u8], seed: Option<u32>) -> u32 {
        from_slice_read(murmur3::murmur3_32(&mut data, seed.unwrap_or(0)))
    }
}

impl HashKernel for Murmur3X86_128 {
    const ALGORITHM: HashAlgorithm = HashAlgorithm::Murmur3X86_128;
    type Seed = u32;
    type Output = Hash128;

    #[inline]
    fn hash_with_seed(mut data: &[u8], seed: Option<u32>) -> Hash128 {
        Hash128::from(from_slice_read(murmur3::murmur3_x86_128(
            &mut data,
            seed.unwrap_or(0),
        )))
    }
}

impl HashKernel for Murmur3X64_128 {
    const ALGORITHM: HashAlgorithm = HashAlgorithm::Murmur3X64_128;
    type Seed = u32;
    type Output = Hash128;

    #[inline]
    fn hash_with_seed(mut data: &[u8], seed: Option<u32>) -> Hash128 {
        Hash128::from(from_slice_read(murmur3::murmur3_x64_128(
            &mut data,
            seed.unwrap_or(0),
        )))
    }
}

// murmur3 consumes `io::Read`; reading an in-memory slice cannot fail.
#[inline]
fn from_slice_read<T>(result: io::Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => unreachable!("reading from a byte slice failed: {err}"),
    }
}
