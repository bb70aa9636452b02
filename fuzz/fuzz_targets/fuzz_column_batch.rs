#![no_main]

//! Fuzz variable-length batch construction from raw buffers.
//!
//! Arbitrary offsets, payload and validity bytes must either be rejected or
//! produce a batch that hashes without panicking.

use std::sync::Arc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use hashfuncs::{ColumnBatch, ColumnData, HashAlgorithm, ScalarType, ValidityMask, hash_batch};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    offsets: Vec<u32>,
    payload: Vec<u8>,
    validity: Vec<u8>,
    selection: Vec<u32>,
}

fuzz_target!(|input: FuzzInput| {
    if input.payload.len() > 65536 || input.offsets.len() > 4096 {
        return;
    }

    let rows = input.offsets.len().saturating_sub(1);
    let Ok(validity) = ValidityMask::from_bytes(Arc::from(input.validity), rows) else {
        return;
    };
    let data = ColumnData::Bytes {
        offsets: Arc::from(input.offsets),
        data: Arc::from(input.payload),
    };
    let Ok(batch) = ColumnBatch::new(ScalarType::Blob, data, validity) else {
        return;
    };

    for algorithm in HashAlgorithm::ALL {
        let out = hash_batch(algorithm, &batch, None).expect("valid batch hashes");
        assert_eq!(out.len(), batch.len());
        assert_eq!(out.digests.null_count(), batch.null_count());
    }

    if let Ok(filtered) = batch.select(&input.selection) {
        let out = hash_batch(HashAlgorithm::Xxh3_64, &filtered, None).expect("filtered hashes");
        assert_eq!(out.len(), input.selection.len());
    }
});
