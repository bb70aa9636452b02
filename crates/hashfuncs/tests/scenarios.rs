//! End-to-end scenarios through the public facade.

use hashfuncs::{
    ColumnBatch, Digest, FunctionCatalog, Hash128, HashAlgorithm, HashError, OutputBatch,
    Representation, ScalarType, ScalarValue, hash_batch,
};
use proptest::prelude::*;

fn text(values: &[Option<&str>]) -> ColumnBatch {
    ColumnBatch::from_strs(values.iter().copied()).expect("text batch")
}

#[test]
fn xxh64_hello_matches_reference_and_seed_changes_it() {
    let input = text(&[Some("hello")]);
    let v1 = hash_batch(HashAlgorithm::Xxh64, &input, None).expect("hash");
    assert_eq!(
        v1.get(0),
        Some(Digest::U64(xxhash_rust::xxh64::xxh64(b"hello", 0)))
    );
    assert_eq!(
        v1.as_u64(),
        Some(&OutputBatch::Constant {
            value: Some(xxhash_rust::xxh64::xxh64(b"hello", 0)),
            row_count: 1,
        })
    );

    let seeds = ColumnBatch::from_native(ScalarType::UInt64, [Some(42_u64)]).expect("seeds");
    let v2 = hash_batch(HashAlgorithm::Xxh64, &input, Some(&seeds)).expect("hash");
    assert_eq!(
        v2.get(0),
        Some(Digest::U64(xxhash_rust::xxh64::xxh64(b"hello", 42)))
    );
    assert_ne!(v1.get(0), v2.get(0));
}

#[test]
fn null_in_the_middle_stays_null() {
    let input = text(&[Some("a"), None, Some("c")]);
    let out = hash_batch(HashAlgorithm::Xxh3_64, &input, None).expect("hash");
    assert_eq!(
        out.to_vec(),
        vec![
            Some(Digest::U64(xxhash_rust::xxh3::xxh3_64(b"a"))),
            None,
            Some(Digest::U64(xxhash_rust::xxh3::xxh3_64(b"c"))),
        ]
    );
    assert_eq!(out.digests.representation(), Representation::Dense);
}

#[test]
fn murmur_x64_128_of_empty_bytes_is_a_valid_value() {
    let input = ColumnBatch::from_bytes(ScalarType::Blob, [Some(&b""[..])]).expect("blob");
    let first = hash_batch(HashAlgorithm::Murmur3X64_128, &input, None).expect("hash");
    let second = hash_batch(HashAlgorithm::Murmur3X64_128, &input, None).expect("hash");
    assert!(first.is_valid(0));
    assert_eq!(first, second);
    assert_eq!(first.get(0), Some(Digest::U128(Hash128::new(0, 0))));
}

#[test]
fn xxh3_128_halves_are_low_then_high() {
    let input = text(&[Some("hello"), Some("world")]);
    let out = hash_batch(HashAlgorithm::Xxh3_128, &input, None).expect("hash");
    let wide = xxhash_rust::xxh3::xxh3_128(b"world");
    let batch = out.as_u128().expect("128-bit output");
    let digest = batch.get(1).expect("valid");
    assert_eq!(u128::from(digest.high) << 64 | u128::from(digest.low), wide);
}

#[test]
fn integer_alone_matches_integer_at_row_five() {
    let alone = ColumnBatch::from_values(ScalarType::Int32, &[ScalarValue::Int32(-77)])
        .expect("one row");
    let mut rows: Vec<ScalarValue> = (0..10).map(ScalarValue::Int32).collect();
    rows[5] = ScalarValue::Int32(-77);
    rows[2] = ScalarValue::Null;
    let ten = ColumnBatch::from_values(ScalarType::Int32, &rows).expect("ten rows");
    for algorithm in HashAlgorithm::ALL {
        let one = hash_batch(algorithm, &alone, None).expect("one");
        let many = hash_batch(algorithm, &ten, None).expect("ten");
        assert_eq!(one.get(0), many.get(5), "{algorithm}");
        assert_eq!(one.is_valid(0), many.is_valid(5), "{algorithm}");
        assert!(!many.is_valid(2), "{algorithm}");
    }
}

#[test]
fn catalog_invoke_matches_direct_dispatch() {
    let catalog = FunctionCatalog::new();
    let input = text(&[Some("k1"), Some("k2"), None]);
    let seeds = ColumnBatch::from_native(ScalarType::UInt32, [Some(5_u32), None, Some(5)])
        .expect("seeds");
    for function in catalog.functions() {
        let algorithm = function.algorithm();
        let unseeded = catalog.invoke(function.name(), &[&input]).expect("unseeded");
        assert_eq!(
            unseeded,
            hash_batch(algorithm, &input, None).expect("direct"),
            "{algorithm}"
        );
        let seeded = catalog.invoke(function.name(), &[&input, &seeds]);
        match function.seed_type() {
            ScalarType::UInt32 => {
                let out = seeded.expect("32-bit seeds fit");
                assert!(out.is_valid(0) && !out.is_valid(1) && !out.is_valid(2));
            }
            _ => assert!(matches!(seeded, Err(HashError::SeedWidthMismatch { .. }))),
        }
    }
}

#[test]
fn signatures_serialize_for_hosts() {
    let catalog = FunctionCatalog::new();
    let json = serde_json::to_value(catalog.signatures()).expect("serialize");
    let entries = json.as_array().expect("array");
    assert_eq!(entries.len(), 16);
    assert_eq!(entries[0]["name"], "xxh32");
    assert_eq!(entries[1]["parameters"][1]["Exact"], "UInt32");
    assert_eq!(entries[1]["return_type"], "UInt32");
}

#[test]
fn unsupported_type_error_is_actionable() {
    let input = ColumnBatch::from_values(ScalarType::Timestamp, &[ScalarValue::Timestamp(1)])
        .expect("timestamp batch");
    let err = hash_batch(HashAlgorithm::RapidHash, &input, None).expect_err("unsupported");
    assert_eq!(err.to_string(), "unsupported type for hashing: TIMESTAMP");
    assert!(err.is_user_recoverable());
    assert!(err.suggestion().is_some());
}

fn hashable_value() -> impl Strategy<Value = (ScalarType, ScalarValue)> {
    prop_oneof![
        any::<i8>().prop_map(|v| (ScalarType::Int8, ScalarValue::Int8(v))),
        any::<i16>().prop_map(|v| (ScalarType::Int16, ScalarValue::Int16(v))),
        any::<i32>().prop_map(|v| (ScalarType::Int32, ScalarValue::Int32(v))),
        any::<i64>().prop_map(|v| (ScalarType::Int64, ScalarValue::Int64(v))),
        any::<i128>().prop_map(|v| (ScalarType::Int128, ScalarValue::Int128(v))),
        any::<u8>().prop_map(|v| (ScalarType::UInt8, ScalarValue::UInt8(v))),
        any::<u16>().prop_map(|v| (ScalarType::UInt16, ScalarValue::UInt16(v))),
        any::<u32>().prop_map(|v| (ScalarType::UInt32, ScalarValue::UInt32(v))),
        any::<u64>().prop_map(|v| (ScalarType::UInt64, ScalarValue::UInt64(v))),
        any::<u128>().prop_map(|v| (ScalarType::UInt128, ScalarValue::UInt128(v))),
        any::<f32>().prop_map(|v| (ScalarType::Float32, ScalarValue::Float32(v))),
        any::<f64>().prop_map(|v| (ScalarType::Float64, ScalarValue::Float64(v))),
        any::<i32>().prop_map(|v| (ScalarType::Date, ScalarValue::Date(v))),
        any::<i64>().prop_map(|v| (ScalarType::Time, ScalarValue::Time(v))),
        ".{0,12}".prop_map(|v| (ScalarType::Text, ScalarValue::Text(v))),
        prop::collection::vec(any::<u8>(), 0..12)
            .prop_map(|v| (ScalarType::Blob, ScalarValue::Blob(v))),
    ]
}

proptest! {
    #[test]
    fn every_hashable_type_hashes_its_native_bytes(
        (scalar_type, value) in hashable_value(),
        algorithm in prop::sample::select(HashAlgorithm::ALL.to_vec()),
    ) {
        let batch = ColumnBatch::from_values(scalar_type, std::slice::from_ref(&value))
            .expect("single value batch");
        let bytes = value.native_bytes().expect("non-null value has bytes");
        let out = hash_batch(algorithm, &batch, None).expect("hashable");
        prop_assert_eq!(out.get(0), Some(algorithm.hash_bytes(&bytes, None).expect("unseeded")));
    }
}
