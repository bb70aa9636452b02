//! Batches built over a non-identity row mapping must hash exactly like the
//! flat batch holding the same logical rows.

use hashfuncs_algo::{HashAlgorithm, SeedWidth};
use hashfuncs_types::{ColumnBatch, ScalarType, ScalarValue};
use hashfuncs_vector::{hash_batch, hash_metrics_snapshot};

fn flat_and_coded() -> (ColumnBatch, ColumnBatch) {
    let dictionary = ColumnBatch::from_values(
        ScalarType::Date,
        &[
            ScalarValue::Date(0),
            ScalarValue::Null,
            ScalarValue::Date(19_723),
            ScalarValue::Date(-1),
        ],
    )
    .expect("dictionary");
    let codes = [3_u32, 3, 2, 1, 0, 2, 1];
    let coded = ColumnBatch::dictionary(&dictionary, &codes).expect("coded");
    let flat_values: Vec<ScalarValue> = codes
        .iter()
        .map(|&code| dictionary.value(code as usize))
        .collect();
    let flat = ColumnBatch::from_values(ScalarType::Date, &flat_values).expect("flat");
    (flat, coded)
}

#[test]
fn dictionary_coded_input_matches_flat_input() {
    let (flat, coded) = flat_and_coded();
    for algorithm in HashAlgorithm::ALL {
        let expected = hash_batch(algorithm, &flat, None).expect("flat");
        let actual = hash_batch(algorithm, &coded, None).expect("coded");
        assert_eq!(actual.to_vec(), expected.to_vec(), "{algorithm}");
        assert!(!actual.is_valid(3), "{algorithm}: NULL dictionary entry");
    }
}

#[test]
fn filtered_dictionary_matches_flat_selection() {
    let (flat, coded) = flat_and_coded();
    let picks = [6_u32, 0, 4];
    let filtered_coded = coded.select(&picks).expect("filter coded");
    let filtered_flat = flat.select(&picks).expect("filter flat");
    for algorithm in HashAlgorithm::ALL {
        let a = hash_batch(algorithm, &filtered_coded, None).expect("coded");
        let b = hash_batch(algorithm, &filtered_flat, None).expect("flat");
        assert_eq!(a.to_vec(), b.to_vec(), "{algorithm}");
    }
}

#[test]
fn constant_input_matches_repeated_flat_input() {
    let constant = ColumnBatch::constant(ScalarType::Text, &ScalarValue::Text("k".to_owned()), 6)
        .expect("constant");
    let flat = ColumnBatch::from_strs([Some("k"); 6]).expect("flat");
    for algorithm in HashAlgorithm::ALL {
        let a = hash_batch(algorithm, &constant, None).expect("constant");
        let b = hash_batch(algorithm, &flat, None).expect("flat");
        assert_eq!(a.to_vec(), b.to_vec(), "{algorithm}");
    }
}

#[test]
fn dictionary_coded_seeds_match_flat_seeds() {
    let input = ColumnBatch::from_native(ScalarType::UInt16, (0..5_u16).map(Some)).expect("input");
    for algorithm in HashAlgorithm::ALL {
        let (dictionary, flat) = match algorithm.seed_width() {
            SeedWidth::Bits32 => (
                ColumnBatch::from_native(ScalarType::UInt32, [Some(7_u32), None]),
                ColumnBatch::from_native(
                    ScalarType::UInt32,
                    [None, Some(7_u32), Some(7), None, Some(7)],
                ),
            ),
            SeedWidth::Bits64 => (
                ColumnBatch::from_native(ScalarType::UInt64, [Some(7_u64), None]),
                ColumnBatch::from_native(
                    ScalarType::UInt64,
                    [None, Some(7_u64), Some(7), None, Some(7)],
                ),
            ),
        };
        let dictionary = dictionary.expect("seed dictionary");
        let flat = flat.expect("flat seeds");
        let coded = ColumnBatch::dictionary(&dictionary, &[1, 0, 0, 1, 0]).expect("coded seeds");

        let a = hash_batch(algorithm, &input, Some(&coded)).expect("coded seeds");
        let b = hash_batch(algorithm, &input, Some(&flat)).expect("flat seeds");
        assert_eq!(a.to_vec(), b.to_vec(), "{algorithm}");
        assert!(!a.is_valid(0) && !a.is_valid(3), "{algorithm}");
    }
}

#[test]
fn metrics_count_hashed_rows() {
    let before = hash_metrics_snapshot();
    let input = ColumnBatch::from_strs([Some("a"), None, Some("c")]).expect("text");
    hash_batch(HashAlgorithm::Xxh3_64, &input, None).expect("hash");
    let after = hash_metrics_snapshot();
    assert!(after.batches_total > before.batches_total);
    assert!(after.rows_total >= before.rows_total + 3);
    assert!(after.null_rows_total > before.null_rows_total);
}
