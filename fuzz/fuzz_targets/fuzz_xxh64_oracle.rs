#![no_main]

use hashfuncs::{ColumnBatch, Digest, HashAlgorithm, ScalarType, ScalarValue, hash_batch};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: &[u8]| {
    let (seed_bytes, data) = input.split_at(core::cmp::min(8, input.len()));
    let mut seed = 0u64;
    for (i, &b) in seed_bytes.iter().enumerate() {
        seed |= u64::from(b) << (i * 8);
    }

    let values = ColumnBatch::from_bytes(ScalarType::Blob, [Some(data)]).expect("blob batch");
    let seeds = ColumnBatch::from_values(ScalarType::UInt64, &[ScalarValue::UInt64(seed)])
        .expect("seed batch");
    let ours = hash_batch(HashAlgorithm::Xxh64, &values, Some(&seeds)).expect("hash");
    let expected = xxhash_rust::xxh64::xxh64(data, seed);
    assert_eq!(ours.get(0), Some(Digest::U64(expected)));
});
