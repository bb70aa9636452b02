#![no_main]

//! Fuzz batch hashing across row encodings.
//!
//! The same logical rows are hashed flat, through a dictionary, filtered, and
//! on the parallel path. Every encoding must produce the same digests.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use hashfuncs::{
    ColumnBatch, DispatchConfig, HashAlgorithm, HashEngine, ScalarType, ScalarValue,
};

#[derive(Debug, Arbitrary)]
enum FuzzColumn {
    Int64(Vec<Option<i64>>),
    Float64(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
    Blob(Vec<Option<Vec<u8>>>),
}

impl FuzzColumn {
    fn into_values(self) -> (ScalarType, Vec<ScalarValue>) {
        fn lift<T>(rows: Vec<Option<T>>, wrap: fn(T) -> ScalarValue) -> Vec<ScalarValue> {
            rows.into_iter()
                .map(|row| row.map_or(ScalarValue::Null, wrap))
                .collect()
        }
        match self {
            Self::Int64(rows) => (ScalarType::Int64, lift(rows, ScalarValue::Int64)),
            Self::Float64(rows) => (ScalarType::Float64, lift(rows, ScalarValue::Float64)),
            Self::Text(rows) => (ScalarType::Text, lift(rows, ScalarValue::Text)),
            Self::Blob(rows) => (ScalarType::Blob, lift(rows, ScalarValue::Blob)),
        }
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    algorithm: u8,
    column: FuzzColumn,
    codes: Vec<u16>,
    seed: Option<u32>,
    chunk_rows: u8,
}

fuzz_target!(|input: FuzzInput| {
    let algorithm = HashAlgorithm::ALL[usize::from(input.algorithm) % HashAlgorithm::ALL.len()];
    let (scalar_type, dictionary_values) = input.column.into_values();
    if dictionary_values.is_empty() || dictionary_values.len() > 512 || input.codes.len() > 1024 {
        return;
    }

    let codes: Vec<u32> = input
        .codes
        .iter()
        .map(|&code| u32::from(code) % dictionary_values.len() as u32)
        .collect();
    let materialized: Vec<ScalarValue> = codes
        .iter()
        .map(|&code| dictionary_values[code as usize].clone())
        .collect();

    let dictionary = ColumnBatch::from_values(scalar_type, &dictionary_values).expect("dictionary");
    let coded = ColumnBatch::dictionary(&dictionary, &codes).expect("codes are in range");
    let flat = ColumnBatch::from_values(scalar_type, &materialized).expect("flat");

    let seeds = input.seed.map(|seed| {
        let value = match algorithm.seed_width().scalar_type() {
            ScalarType::UInt32 => ScalarValue::UInt32(seed),
            _ => ScalarValue::UInt64(u64::from(seed)),
        };
        ColumnBatch::constant(algorithm.seed_width().scalar_type(), &value, codes.len())
            .expect("constant seeds")
    });

    let sequential = HashEngine::new(DispatchConfig::sequential()).expect("sequential config");
    let parallel = HashEngine::new(DispatchConfig {
        parallel_row_threshold: 1,
        parallel_chunk_rows: usize::from(input.chunk_rows).max(1),
        collapse_single_row: true,
    })
    .expect("parallel config");

    let expected = sequential
        .hash(algorithm, &flat, seeds.as_ref())
        .expect("flat hash");
    let via_dictionary = sequential
        .hash(algorithm, &coded, seeds.as_ref())
        .expect("dictionary hash");
    let via_parallel = parallel
        .hash(algorithm, &coded, seeds.as_ref())
        .expect("parallel hash");

    assert_eq!(expected.to_vec(), via_dictionary.to_vec());
    assert_eq!(expected.to_vec(), via_parallel.to_vec());

    for (row, value) in materialized.iter().enumerate() {
        match value.native_bytes() {
            Some(bytes) => {
                let seed = input.seed.map(u64::from);
                let single = algorithm.hash_bytes(&bytes, seed).expect("seed fits");
                assert_eq!(expected.get(row), Some(single));
            }
            None => assert!(!expected.is_valid(row)),
        }
    }
});
