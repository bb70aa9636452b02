//! Hash algorithm table for hashfuncs.
//!
//! Every algorithm is described by a `'static` [`AlgorithmDescriptor`] and
//! implemented by a zero-sized [`HashKernel`] in [`kernel`]. The dispatcher is
//! generic over the kernel, so the per-row loop is monomorphized once per
//! algorithm.

pub mod kernel;

use std::fmt;
use std::str::FromStr;

use hashfuncs_error::HashError;
use hashfuncs_types::{Hash128, ScalarType};
use serde::{Deserialize, Serialize};

pub use kernel::{
    DigestInt, HashKernel, Murmur3_32, Murmur3X64_128, Murmur3X86_128, RapidHash64, SeedInt,
    Xxh3_128, Xxh3_64, Xxh32, Xxh64,
};

/// Width of a digest in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestWidth {
    Bits32,
    Bits64,
    Bits128,
}

impl DigestWidth {
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits32 => 32,
            Self::Bits64 => 64,
            Self::Bits128 => 128,
        }
    }

    /// Column type a host declares for digests of this width.
    #[must_use]
    pub const fn return_type(self) -> ScalarType {
        match self {
            Self::Bits32 => ScalarType::UInt32,
            Self::Bits64 => ScalarType::UInt64,
            Self::Bits128 => ScalarType::UInt128,
        }
    }
}

/// Width of a seed in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeedWidth {
    Bits32,
    Bits64,
}

impl SeedWidth {
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits32 => 32,
            Self::Bits64 => 64,
        }
    }

    /// The only column type accepted as a seed column of this width.
    #[must_use]
    pub const fn scalar_type(self) -> ScalarType {
        match self {
            Self::Bits32 => ScalarType::UInt32,
            Self::Bits64 => ScalarType::UInt64,
        }
    }
}

/// Immutable description of one hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlgorithmDescriptor {
    pub algorithm: HashAlgorithm,
    /// SQL-facing function name.
    pub name: &'static str,
    pub digest_width: DigestWidth,
    pub seed_width: SeedWidth,
    pub description: &'static str,
}

/// The closed set of supported algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    Xxh32,
    Xxh64,
    Xxh3_64,
    Xxh3_128,
    RapidHash,
    Murmur3_32,
    Murmur3X86_128,
    Murmur3X64_128,
}

static DESCRIPTORS: [AlgorithmDescriptor; 8] = [
    AlgorithmDescriptor {
        algorithm: HashAlgorithm::Xxh32,
        name: "xxh32",
        digest_width: DigestWidth::Bits32,
        seed_width: SeedWidth::Bits32,
        description: "32-bit xxHash",
    },
    AlgorithmDescriptor {
        algorithm: HashAlgorithm::Xxh64,
        name: "xxh64",
        digest_width: DigestWidth::Bits64,
        seed_width: SeedWidth::Bits64,
        description: "64-bit xxHash",
    },
    AlgorithmDescriptor {
        algorithm: HashAlgorithm::Xxh3_64,
        name: "xxh3_64",
        digest_width: DigestWidth::Bits64,
        seed_width: SeedWidth::Bits64,
        description: "64-bit XXH3, fast on short inputs",
    },
    AlgorithmDescriptor {
        algorithm: HashAlgorithm::Xxh3_128,
        name: "xxh3_128",
        digest_width: DigestWidth::Bits128,
        seed_width: SeedWidth::Bits64,
        description: "128-bit XXH3",
    },
    AlgorithmDescriptor {
        algorithm: HashAlgorithm::RapidHash,
        name: "rapidhash",
        digest_width: DigestWidth::Bits64,
        seed_width: SeedWidth::Bits64,
        description: "64-bit rapidhash",
    },
    AlgorithmDescriptor {
        algorithm: HashAlgorithm::Murmur3_32,
        name: "murmurhash3_32",
        digest_width: DigestWidth::Bits32,
        seed_width: SeedWidth::Bits32,
        description: "32-bit MurmurHash3 (x86)",
    },
    AlgorithmDescriptor {
        algorithm: HashAlgorithm::Murmur3X86_128,
        name: "murmurhash3_128",
        digest_width: DigestWidth::Bits128,
        seed_width: SeedWidth::Bits32,
        description: "128-bit MurmurHash3 (x86)",
    },
    AlgorithmDescriptor {
        algorithm: HashAlgorithm::Murmur3X64_128,
        name: "murmurhash3_x64_128",
        digest_width: DigestWidth::Bits128,
        seed_width: SeedWidth::Bits32,
        description: "128-bit MurmurHash3 (x64)",
    },
];

/// All descriptors, in [`HashAlgorithm::ALL`] order.
#[must_use]
pub fn descriptors() -> &'static [AlgorithmDescriptor] {
    &DESCRIPTORS
}

impl HashAlgorithm {
    pub const ALL: [Self; 8] = [
        Self::Xxh32,
        Self::Xxh64,
        Self::Xxh3_64,
        Self::Xxh3_128,
        Self::RapidHash,
        Self::Murmur3_32,
        Self::Murmur3X86_128,
        Self::Murmur3X64_128,
    ];

    #[must_use]
    pub const fn descriptor(self) -> &'static AlgorithmDescriptor {
        &DESCRIPTORS[self as usize]
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        self.descriptor().name
    }

    #[must_use]
    pub const fn digest_width(self) -> DigestWidth {
        self.descriptor().digest_width
    }

    #[must_use]
    pub const fn seed_width(self) -> SeedWidth {
        self.descriptor().seed_width
    }

    /// Hash one byte string, widening the result to [`Digest`].
    ///
    /// A seed wider than the algorithm's seed width is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::SeedWidthMismatch`] if a 32-bit algorithm is
    /// given a seed above `u32::MAX`.
    pub fn hash_bytes(self, bytes: &[u8], seed: Option<u64>) -> Result<Digest, HashError> {
        fn narrow<K: HashKernel>(seed: Option<u64>) -> Result<Option<K::Seed>, HashError> {
            seed.map(|value| {
                K::Seed::try_from_u64(value).ok_or_else(|| HashError::SeedWidthMismatch {
                    function: K::ALGORITHM.name().to_owned(),
                    expected: K::ALGORITHM.seed_width().scalar_type().to_string(),
                    actual: format!("{value} (out of range)"),
                })
            })
            .transpose()
        }

        fn run<K: HashKernel>(bytes: &[u8], seed: Option<u64>) -> Result<Digest, HashError> {
            Ok(K::hash_with_seed(bytes, narrow::<K>(seed)?).into())
        }

        match self {
            Self::Xxh32 => run::<Xxh32>(bytes, seed),
            Self::Xxh64 => run::<Xxh64>(bytes, seed),
            Self::Xxh3_64 => run::<Xxh3_64>(bytes, seed),
            Self::Xxh3_128 => run::<Xxh3_128>(bytes, seed),
            Self::RapidHash => run::<RapidHash64>(bytes, seed),
            Self::Murmur3_32 => run::<Murmur3_32>(bytes, seed),
            Self::Murmur3X86_128 => run::<Murmur3X86_128>(bytes, seed),
            Self::Murmur3X64_128 => run::<Murmur3X64_128>(bytes, seed),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DESCRIPTORS
            .iter()
            .find(|descriptor| descriptor.name.eq_ignore_ascii_case(s))
            .map(|descriptor| descriptor.algorithm)
            .ok_or_else(|| HashError::UnknownFunction { name: s.to_owned() })
    }
}

/// A digest of any width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Digest {
    U32(u32),
    U64(u64),
    U128(Hash128),
}

impl Digest {
    #[must_use]
    pub const fn width(self) -> DigestWidth {
        match self {
            Self::U32(_) => DigestWidth::Bits32,
            Self::U64(_) => DigestWidth::Bits64,
            Self::U128(_) => DigestWidth::Bits128,
        }
    }

    /// Zero-extend to 128 bits.
    #[must_use]
    pub const fn as_u128(self) -> u128 {
        match self {
            Self::U32(v) => v as u128,
            Self::U64(v) => v as u128,
            Self::U128(v) => v.as_u128(),
        }
    }
}

impl From<u32> for Digest {
    fn from(value: u32) -> Self {
        Self::U32(value)
    }
}

impl From<u64> for Digest {
    fn from(value: u64) -> Self {
        Self::U64(value)
    }
}

impl From<Hash128> for Digest {
    fn from(value: Hash128) -> Self {
        Self::U128(value)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::U128(v) => write!(f, "{v}"),
        }
    }
}

impl fmt::LowerHex for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U32(v) => fmt::LowerHex::fmt(v, f),
            Self::U64(v) => fmt::LowerHex::fmt(v, f),
            Self::U128(v) => fmt::LowerHex::fmt(v, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_table_is_indexed_by_variant() {
        for algorithm in HashAlgorithm::ALL {
            assert_eq!(algorithm.descriptor().algorithm, algorithm);
        }
        assert_eq!(descriptors().len(), HashAlgorithm::ALL.len());
    }

    #[test]
    fn widths_match_algorithm_table() {
        use DigestWidth::{Bits128 as D128, Bits32 as D32, Bits64 as D64};
        use SeedWidth::{Bits32 as S32, Bits64 as S64};

        let expected = [
            (HashAlgorithm::Xxh32, D32, S32),
            (HashAlgorithm::Xxh64, D64, S64),
            (HashAlgorithm::Xxh3_64, D64, S64),
            (HashAlgorithm::Xxh3_128, D128, S64),
            (HashAlgorithm::RapidHash, D64, S64),
            (HashAlgorithm::Murmur3_32, D32, S32),
            (HashAlgorithm::Murmur3X86_128, D128, S32),
            (HashAlgorithm::Murmur3X64_128, D128, S32),
        ];
        for (algorithm, digest, seed) in expected {
            assert_eq!(algorithm.digest_width(), digest, "{algorithm}");
            assert_eq!(algorithm.seed_width(), seed, "{algorithm}");
        }
    }

    #[test]
    fn names_parse_case_insensitively() {
        for algorithm in HashAlgorithm::ALL {
            let upper = algorithm.name().to_ascii_uppercase();
            assert_eq!(upper.parse::<HashAlgorithm>().ok(), Some(algorithm));
        }
        let err = "md5".parse::<HashAlgorithm>().expect_err("md5 is not offered");
        assert_eq!(err.to_string(), "no such hash function: md5");
    }

    #[test]
    fn return_types_follow_digest_width() {
        assert_eq!(DigestWidth::Bits32.return_type(), ScalarType::UInt32);
        assert_eq!(DigestWidth::Bits64.return_type(), ScalarType::UInt64);
        assert_eq!(DigestWidth::Bits128.return_type(), ScalarType::UInt128);
        assert_eq!(SeedWidth::Bits32.scalar_type(), ScalarType::UInt32);
    }

    #[test]
    fn hash_bytes_rejects_oversized_seed() {
        let err = HashAlgorithm::Murmur3_32
            .hash_bytes(b"x", Some(u64::from(u32::MAX) + 1))
            .expect_err("seed does not fit 32 bits");
        assert!(matches!(err, HashError::SeedWidthMismatch { .. }));
        assert!(HashAlgorithm::Xxh64.hash_bytes(b"x", Some(u64::MAX)).is_ok());
    }

    #[test]
    fn hash_bytes_digest_width_matches_descriptor() {
        for algorithm in HashAlgorithm::ALL {
            let digest = algorithm.hash_bytes(b"hello", None).expect("no seed");
            assert_eq!(digest.width(), algorithm.digest_width(), "{algorithm}");
        }
    }

    #[test]
    fn descriptor_serializes_with_snake_case_algorithm() {
        let json = serde_json::to_string(HashAlgorithm::Xxh3_128.descriptor()).expect("serialize");
        assert!(json.contains("\"algorithm\":\"xxh3_128\""), "{json}");
        assert!(json.contains("\"digest_width\":\"Bits128\""), "{json}");
    }

    #[test]
    fn digest_hex_and_decimal() {
        let digest = Digest::U32(0x02cc_5d05);
        assert_eq!(format!("{digest:x}"), "2cc5d05");
        assert_eq!(digest.to_string(), "46947589");
        assert_eq!(Digest::U64(7).as_u128(), 7);
    }
}
