//! Test utilities for downstream crates: mock DNAs, fixtures, and bit-flip
//! helpers for exercising the similarity oracle's threshold behavior.
//!
//! Gated behind the `test-utils` feature so production builds never pull in
//! `rand`.

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use crate::dna::{Dna, DNA_SIZE};

/// Builds synthetic [`Dna`] values for tests without going through the
/// image pipeline.
///
/// ```
/// use protrace_dna::test_utils::MockDnaBuilder;
///
/// let dna = MockDnaBuilder::new().with_seed(7).build();
/// assert_eq!(dna.as_bytes().len(), 32);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockDnaBuilder {
    seed: Option<u64>,
    pattern: Option<u8>,
    bytes: Option<[u8; DNA_SIZE]>,
}

impl MockDnaBuilder {
    /// Creates a builder with no configuration; defaults to an all-zero DNA.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a PRNG to fill the fingerprint deterministically. Two builders
    /// with the same seed always produce the same `Dna`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fills every byte with a repeated constant, e.g. `0xFF` for an
    /// all-ones fingerprint.
    pub fn with_pattern(mut self, byte: u8) -> Self {
        self.pattern = Some(byte);
        self
    }

    /// Sets the exact 32 bytes directly, overriding seed and pattern.
    pub fn with_bytes(mut self, bytes: [u8; DNA_SIZE]) -> Self {
        self.bytes = Some(bytes);
        self
    }

    /// Builds the configured [`Dna`].
    ///
    /// Precedence when more than one option was set: explicit bytes, then
    /// pattern, then seed, then all-zero.
    pub fn build(self) -> Dna {
        if let Some(bytes) = self.bytes {
            return Dna::from_bytes(bytes);
        }
        if let Some(byte) = self.pattern {
            return Dna::from_bytes([byte; DNA_SIZE]);
        }
        if let Some(seed) = self.seed {
            return Dna::from_bytes(seeded_bytes(seed));
        }
        Dna::from_bytes([0u8; DNA_SIZE])
    }
}

fn seeded_bytes(seed: u64) -> [u8; DNA_SIZE] {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bytes = [0u8; DNA_SIZE];
    rng.fill(&mut bytes);
    bytes
}

/// Flips `count` distinct bits of `dna` at positions chosen by a PRNG
/// seeded with `seed`, for exercising near-duplicate detection at specific
/// Hamming distances.
pub fn flip_bits(dna: Dna, count: u32, seed: u64) -> Dna {
    let mut bytes = *dna.as_bytes();
    let mut rng = StdRng::seed_from_u64(seed);
    let total_bits = (DNA_SIZE * 8) as u32;
    let count = count.min(total_bits);
    let mut seen = std::collections::HashSet::new();

    while seen.len() < count as usize {
        let bit = rng.gen_range(0..total_bits);
        if seen.insert(bit) {
            let byte_idx = (bit / 8) as usize;
            let bit_idx = 7 - (bit % 8) as u8;
            bytes[byte_idx] ^= 1 << bit_idx;
        }
    }
    Dna::from_bytes(bytes)
}

/// Commonly-used fixed fingerprints for scenario tests.
pub mod fixtures {
    use super::*;

    /// All bits zero.
    pub fn all_zero() -> Dna {
        Dna::from_bytes([0u8; DNA_SIZE])
    }

    /// All bits one, maximally distant from [`all_zero`].
    pub fn all_one() -> Dna {
        Dna::from_bytes([0xFF; DNA_SIZE])
    }

    /// A fixed, arbitrary fingerprint distinct from the all-zero/all-one
    /// extremes, useful as a stable "third" registry entry.
    pub fn reference() -> Dna {
        MockDnaBuilder::new().with_seed(0xC0FF_EE00_1234_5678).build()
    }
}

#[cfg(any(test, feature = "test-utils"))]
/// Proptest strategies for generating arbitrary fingerprints.
pub mod generators {
    use super::*;
    use proptest::prelude::*;

    /// A strategy producing uniformly random [`Dna`] values.
    pub fn any_dna() -> impl Strategy<Value = Dna> {
        proptest::collection::vec(any::<u8>(), DNA_SIZE).prop_map(|v| {
            let mut bytes = [0u8; DNA_SIZE];
            bytes.copy_from_slice(&v);
            Dna::from_bytes(bytes)
        })
    }

    /// A strategy producing a `(base, near_duplicate)` pair whose Hamming
    /// distance is at most `max_distance`.
    pub fn dna_pair_within(max_distance: u32) -> impl Strategy<Value = (Dna, Dna)> {
        (any_dna(), 0..=max_distance, any::<u64>())
            .prop_map(|(base, distance, seed)| (base, flip_bits(base, distance, seed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_zero() {
        assert_eq!(MockDnaBuilder::new().build(), fixtures::all_zero());
    }

    #[test]
    fn same_seed_is_deterministic() {
        let a = MockDnaBuilder::new().with_seed(42).build();
        let b = MockDnaBuilder::new().with_seed(42).build();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_usually_differ() {
        let a = MockDnaBuilder::new().with_seed(1).build();
        let b = MockDnaBuilder::new().with_seed(2).build();
        assert_ne!(a, b);
    }

    #[test]
    fn flip_bits_changes_exact_count() {
        let base = fixtures::all_zero();
        let flipped = flip_bits(base, 10, 99);
        assert_eq!(base.hamming_distance(&flipped), 10);
    }

    #[test]
    fn explicit_bytes_take_precedence() {
        let bytes = [7u8; DNA_SIZE];
        let dna = MockDnaBuilder::new().with_seed(1).with_pattern(9).with_bytes(bytes).build();
        assert_eq!(dna.as_bytes(), &bytes);
    }
}
