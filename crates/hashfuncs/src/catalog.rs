//! Function catalog: SQL-facing names, overloads and invocation.
//!
//! Every algorithm is offered as one function with two overloads,
//! `name(value)` and `name(value, seed)`. Lookups are case-insensitive.

use std::collections::HashMap;
use std::fmt;

use hashfuncs_algo::{AlgorithmDescriptor, HashAlgorithm, descriptors};
use hashfuncs_error::{HashError, Result};
use hashfuncs_types::{ColumnBatch, ScalarType};
use hashfuncs_vector::{HashEngine, HashOutput};
use serde::Serialize;
use tracing::debug;

// ── Signatures ──────────────────────────────────────────────────────────────

/// Declared type of one function parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParameterType {
    /// Any hashable scalar type.
    Any,
    /// Exactly this type.
    Exact(ScalarType),
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("ANY"),
            Self::Exact(ty) => fmt::Display::fmt(ty, f),
        }
    }
}

/// One overload of a hash function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSignature {
    pub name: &'static str,
    pub parameters: Vec<ParameterType>,
    pub return_type: ScalarType,
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (idx, param) in self.parameters.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}

// ── Functions ───────────────────────────────────────────────────────────────

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashFunction {
    descriptor: &'static AlgorithmDescriptor,
}

impl HashFunction {
    #[must_use]
    pub const fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            descriptor: algorithm.descriptor(),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.descriptor.name
    }

    #[must_use]
    pub const fn algorithm(&self) -> HashAlgorithm {
        self.descriptor.algorithm
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.descriptor.description
    }

    #[must_use]
    pub const fn return_type(&self) -> ScalarType {
        self.descriptor.digest_width.return_type()
    }

    #[must_use]
    pub const fn seed_type(&self) -> ScalarType {
        self.descriptor.seed_width.scalar_type()
    }

    /// The unseeded and seeded overloads, in that order.
    #[must_use]
    pub fn signatures(&self) -> [FunctionSignature; 2] {
        [
            FunctionSignature {
                name: self.name(),
                parameters: vec![ParameterType::Any],
                return_type: self.return_type(),
            },
            FunctionSignature {
                name: self.name(),
                parameters: vec![ParameterType::Any, ParameterType::Exact(self.seed_type())],
                return_type: self.return_type(),
            },
        ]
    }
}

// ── Catalog ─────────────────────────────────────────────────────────────────

/// Name-to-function lookup plus the engine used to run calls.
#[derive(Debug, Clone)]
pub struct FunctionCatalog {
    functions: HashMap<String, HashFunction>,
    engine: HashEngine,
}

impl Default for FunctionCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionCatalog {
    /// Catalog of every built-in algorithm on a default engine.
    #[must_use]
    pub fn new() -> Self {
        Self::with_engine(HashEngine::default())
    }

    #[must_use]
    pub fn with_engine(engine: HashEngine) -> Self {
        let functions = descriptors()
            .iter()
            .map(|descriptor| {
                (
                    descriptor.name.to_owned(),
                    HashFunction::new(descriptor.algorithm),
                )
            })
            .collect();
        Self { functions, engine }
    }

    #[must_use]
    pub const fn engine(&self) -> &HashEngine {
        &self.engine
    }

    /// Look up a function by name (case-insensitive).
    #[must_use]
    pub fn find(&self, name: &str) -> Option<HashFunction> {
        let canon = name.to_ascii_lowercase();
        let result = self.functions.get(&canon).copied();
        debug!(function = %canon, hit = result.is_some(), "hash function lookup");
        result
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_ascii_lowercase())
    }

    /// Every function, in algorithm table order.
    pub fn functions(&self) -> impl Iterator<Item = HashFunction> + '_ {
        HashAlgorithm::ALL
            .into_iter()
            .filter_map(|algorithm| self.functions.get(algorithm.name()).copied())
    }

    /// Function names, in algorithm table order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.functions().map(|function| function.name()).collect()
    }

    /// Every overload of every function.
    #[must_use]
    pub fn signatures(&self) -> Vec<FunctionSignature> {
        self.functions()
            .flat_map(|function| function.signatures())
            .collect()
    }

    /// Call `name` with one argument (the values) or two (values and seeds).
    ///
    /// # Errors
    ///
    /// Returns [`HashError::UnknownFunction`] for an unknown name,
    /// [`HashError::WrongArgumentCount`] unless one or two arguments are
    /// given, and any error of [`HashEngine::hash`].
    pub fn invoke(&self, name: &str, args: &[&ColumnBatch]) -> Result<HashOutput> {
        let function = self.find(name).ok_or_else(|| HashError::UnknownFunction {
            name: name.to_owned(),
        })?;
        match args {
            [input] => self.engine.hash(function.algorithm(), input, None),
            [input, seeds] => self.engine.hash(function.algorithm(), input, Some(*seeds)),
            _ => Err(HashError::WrongArgumentCount {
                function: function.name().to_owned(),
                count: args.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use hashfuncs_algo::Digest;

    use super::*;

    #[test]
    fn catalog_lists_all_functions_in_order() {
        let catalog = FunctionCatalog::new();
        assert_eq!(
            catalog.names(),
            vec![
                "xxh32",
                "xxh64",
                "xxh3_64",
                "xxh3_128",
                "rapidhash",
                "murmurhash3_32",
                "murmurhash3_128",
                "murmurhash3_x64_128",
            ]
        );
        assert_eq!(catalog.signatures().len(), 16);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let catalog = FunctionCatalog::new();
        let function = catalog.find("XXH3_128").expect("registered");
        assert_eq!(function.algorithm(), HashAlgorithm::Xxh3_128);
        assert!(catalog.contains("RapidHash"));
        assert!(catalog.find("sha256").is_none());
    }

    #[test]
    fn signatures_render_like_sql() {
        let function = HashFunction::new(HashAlgorithm::Murmur3X64_128);
        let [unseeded, seeded] = function.signatures();
        assert_eq!(unseeded.to_string(), "murmurhash3_x64_128(ANY) -> UHUGEINT");
        assert_eq!(
            seeded.to_string(),
            "murmurhash3_x64_128(ANY, UINTEGER) -> UHUGEINT"
        );
        let xxh64 = HashFunction::new(HashAlgorithm::Xxh64);
        assert_eq!(xxh64.signatures()[1].to_string(), "xxh64(ANY, UBIGINT) -> UBIGINT");
    }

    #[test]
    fn invoke_checks_arity_and_name() {
        let catalog = FunctionCatalog::new();
        let input = ColumnBatch::from_strs([Some("x")]).expect("text");

        let err = catalog.invoke("xxh64", &[]).expect_err("no arguments");
        assert_eq!(
            err.to_string(),
            "wrong number of arguments to function xxh64(): 0"
        );
        let err = catalog
            .invoke("xxh64", &[&input, &input, &input])
            .expect_err("three arguments");
        assert!(matches!(err, HashError::WrongArgumentCount { count: 3, .. }));
        let err = catalog.invoke("crc32", &[&input]).expect_err("unknown");
        assert!(matches!(err, HashError::UnknownFunction { .. }));
    }

    #[test]
    fn invoke_runs_engine() {
        let catalog = FunctionCatalog::new();
        let input = ColumnBatch::from_strs([Some("x"), None]).expect("text");
        let seeds =
            ColumnBatch::from_native(ScalarType::UInt32, [Some(1_u32), Some(2)]).expect("seeds");
        let out = catalog.invoke("Xxh32", &[&input, &seeds]).expect("call");
        assert_eq!(out.algorithm, HashAlgorithm::Xxh32);
        let expected = HashAlgorithm::Xxh32.hash_bytes(b"x", Some(1)).expect("x");
        assert_eq!(out.to_vec(), vec![Some(expected), None]);
        assert!(matches!(out.get(0), Some(Digest::U32(_))));
    }
}
