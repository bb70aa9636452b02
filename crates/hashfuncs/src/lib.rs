//! Public API facade for hashfuncs.
//!
//! Hashes typed column batches with xxHash, XXH3, rapidhash or MurmurHash3,
//! propagating NULL rows and honoring constant, dictionary-coded and
//! filtered row encodings.
//!
//! ```
//! use hashfuncs::{ColumnBatch, Digest, HashAlgorithm, hash_batch};
//!
//! let names = ColumnBatch::from_strs([Some("a"), None, Some("c")])?;
//! let out = hash_batch(HashAlgorithm::Xxh64, &names, None)?;
//! assert!(matches!(out.get(0), Some(Digest::U64(_))));
//! assert_eq!(out.get(1), None);
//! # Ok::<(), hashfuncs::HashError>(())
//! ```

pub mod catalog;

pub use catalog::{FunctionCatalog, FunctionSignature, HashFunction, ParameterType};
pub use hashfuncs_algo::{
    AlgorithmDescriptor, Digest, DigestWidth, HashAlgorithm, HashKernel, SeedWidth, descriptors,
    kernel,
};
pub use hashfuncs_error::{ErrorKind, HashError, Result};
pub use hashfuncs_types::{
    ColumnBatch, ColumnData, Hash128, PhysicalType, RowIndirection, ScalarType, ScalarValue,
    ValidityMask,
};
pub use hashfuncs_vector::{
    DigestColumn, DispatchConfig, HashEngine, HashMetricsSnapshot, HashOutput, OutputBatch,
    Representation, hash_batch, hash_metrics_snapshot, reset_hash_metrics,
};
