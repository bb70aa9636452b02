use hashfuncs_algo::{
    Digest, HashAlgorithm, HashKernel, Murmur3_32, Murmur3X64_128, Murmur3X86_128, RapidHash64,
    Xxh3_128, Xxh3_64, Xxh32, Xxh64,
};
use proptest::prelude::*;

fn via_kernel(algorithm: HashAlgorithm, data: &[u8], seed: u32) -> Digest {
    let wide = u64::from(seed);
    match algorithm {
        HashAlgorithm::Xxh32 => Xxh32::hash_with_seed(data, Some(seed)).into(),
        HashAlgorithm::Xxh64 => Xxh64::hash_with_seed(data, Some(wide)).into(),
        HashAlgorithm::Xxh3_64 => Xxh3_64::hash_with_seed(data, Some(wide)).into(),
        HashAlgorithm::Xxh3_128 => Xxh3_128::hash_with_seed(data, Some(wide)).into(),
        HashAlgorithm::RapidHash => RapidHash64::hash_with_seed(data, Some(wide)).into(),
        HashAlgorithm::Murmur3_32 => Murmur3_32::hash_with_seed(data, Some(seed)).into(),
        HashAlgorithm::Murmur3X86_128 => Murmur3X86_128::hash_with_seed(data, Some(seed)).into(),
        HashAlgorithm::Murmur3X64_128 => Murmur3X64_128::hash_with_seed(data, Some(seed)).into(),
    }
}

fn any_algorithm() -> impl Strategy<Value = HashAlgorithm> {
    prop::sample::select(HashAlgorithm::ALL.to_vec())
}

proptest! {
    #[test]
    fn hash_bytes_is_the_kernel(
        algorithm in any_algorithm(),
        data in prop::collection::vec(any::<u8>(), 0..300),
        seed in any::<u32>(),
    ) {
        let dynamic = algorithm
            .hash_bytes(&data, Some(u64::from(seed)))
            .expect("32-bit seed fits every algorithm");
        prop_assert_eq!(dynamic, via_kernel(algorithm, &data, seed));
    }

    #[test]
    fn digests_are_deterministic(
        algorithm in any_algorithm(),
        data in prop::collection::vec(any::<u8>(), 0..300),
    ) {
        let first = algorithm.hash_bytes(&data, None).expect("unseeded");
        let second = algorithm.hash_bytes(&data, None).expect("unseeded");
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, algorithm.hash_bytes(&data, Some(0)).expect("zero seed"));
    }
}
