//! The similarity oracle (C2): given a candidate fingerprint and the
//! current leaf sequence, decide uniqueness.

use protrace_dna::Dna;
use protrace_tree::Leaf;

/// The result of comparing a leaf's recorded DNA against a registry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Match {
    /// Index of the matched leaf.
    pub index: usize,
    /// Hamming distance between the candidate and the matched leaf.
    pub distance: u32,
}

/// The outcome of a similarity query.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Verdict {
    /// No leaf was within the duplicate threshold. `best_match` is the
    /// closest leaf regardless of distance, if the registry is non-empty.
    Unique {
        /// The closest leaf, if any leaves exist.
        best_match: Option<Match>,
    },
    /// A leaf within the duplicate threshold was found.
    Duplicate(Match),
}

impl Verdict {
    /// The matched leaf regardless of verdict kind, if there was one.
    pub fn best_match(&self) -> Option<Match> {
        match self {
            Verdict::Unique { best_match } => *best_match,
            Verdict::Duplicate(m) => Some(*m),
        }
    }
}

/// A pluggable similarity index.
///
/// Any implementation must return results identical to [`LinearScanOracle`]
/// for every possible input; an implementation that can't guarantee this
/// for a particular query should report [`crate::RegistryError::IndexInconsistent`]
/// rather than silently return a disagreeing verdict.
pub trait SimilarityOracle {
    /// Given a candidate DNA and the registry's leaves, returns a verdict.
    ///
    /// `leaves[i].dna` is already a validated [`Dna`] value — no parsing or
    /// skipping of malformed entries happens here, since a [`Leaf`] can
    /// never be constructed with anything but a valid fingerprint.
    fn query(&self, dna: Dna, leaves: &[Leaf], threshold: u32) -> Verdict;
}

/// The reference oracle: an O(n) linear scan over every leaf.
///
/// Returns the first leaf at or below the threshold as `Duplicate`
/// (lowest index wins ties); otherwise reports the closest leaf as
/// `best_match`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinearScanOracle;

impl SimilarityOracle for LinearScanOracle {
    fn query(&self, dna: Dna, leaves: &[Leaf], threshold: u32) -> Verdict {
        let mut best: Option<Match> = None;

        for (index, leaf) in leaves.iter().enumerate() {
            let distance = dna.hamming_distance(&leaf.dna);

            if distance <= threshold {
                return Verdict::Duplicate(Match { index, distance });
            }

            if best.map_or(true, |b| distance < b.distance) {
                best = Some(Match { index, distance });
            }
        }

        Verdict::Unique { best_match: best }
    }
}

/// A toy accelerator bucketed by the top 16 bits of the gradient
/// component, used to differentially test that an index-backed oracle
/// agrees with [`LinearScanOracle`] on its documented equivalence class.
///
/// Only leaves sharing the candidate's bucket are scanned for the
/// duplicate check; since near-duplicates (by construction of the
/// gradient hash) tend to share high-order bits, this trims the scan for
/// the common case while still falling back to a full scan for
/// `best_match` when nothing in-bucket beats the threshold. This is not a
/// sound accelerator in general: a registry engineered so that an
/// out-of-bucket leaf is also within threshold at an earlier index than
/// the in-bucket match will make this disagree with [`LinearScanOracle`]
/// on *which* leaf is reported. A production index should detect that
/// case and report [`crate::RegistryError::IndexInconsistent`] instead of
/// returning a disagreeing verdict.
#[derive(Debug, Default, Clone)]
pub struct BucketIndex;

impl BucketIndex {
    fn bucket_key(dna: &Dna) -> u16 {
        let g = dna.gradient();
        u16::from_be_bytes([g[0], g[1]])
    }
}

impl SimilarityOracle for BucketIndex {
    fn query(&self, dna: Dna, leaves: &[Leaf], threshold: u32) -> Verdict {
        let target_bucket = Self::bucket_key(&dna);

        for (index, leaf) in leaves.iter().enumerate() {
            if Self::bucket_key(&leaf.dna) != target_bucket {
                continue;
            }
            let distance = dna.hamming_distance(&leaf.dna);
            if distance <= threshold {
                return Verdict::Duplicate(Match { index, distance });
            }
        }

        // No in-bucket duplicate: fall back to a full scan for best_match,
        // since the closest leaf overall may sit in a different bucket.
        LinearScanOracle.query(dna, leaves, threshold)
    }
}

/// A gradient/structural breakdown of the distance between two
/// fingerprints, for callers explaining *why* two images matched without
/// re-deriving the per-component distance themselves.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ComponentBreakdown {
    /// Hamming distance over the 64-bit gradient component (0..=64).
    pub gradient_distance: u32,
    /// Hamming distance over the 192-bit structural component (0..=192).
    pub structural_distance: u32,
    /// Hamming distance over the full 256-bit fingerprint (0..=256).
    pub overall_distance: u32,
}

impl ComponentBreakdown {
    /// Computes the breakdown between two fingerprints.
    pub fn compute(a: &Dna, b: &Dna) -> Self {
        let gradient_distance = hamming_bytes(&a.gradient(), &b.gradient());
        let structural_distance = hamming_bytes(&a.structural(), &b.structural());
        Self {
            gradient_distance,
            structural_distance,
            overall_distance: a.hamming_distance(b),
        }
    }
}

fn hamming_bytes(a: &[u8], b: &[u8]) -> u32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x ^ y).count_ones()).sum()
}

/// A coarse similarity band for dispute-resolution UIs, derived from
/// Hamming distance over the full 256-bit fingerprint.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FeasibilityBand {
    /// Similarity >= 95% (distance <= 12).
    VeryHigh,
    /// Similarity >= 90% (distance <= 25).
    High,
    /// Similarity >= 80% (distance <= 51).
    Medium,
    /// Similarity < 80%.
    Low,
}

/// Buckets a Hamming distance into a [`FeasibilityBand`].
pub fn feasibility_band(distance: u32) -> FeasibilityBand {
    match distance {
        0..=12 => FeasibilityBand::VeryHigh,
        13..=25 => FeasibilityBand::High,
        26..=51 => FeasibilityBand::Medium,
        _ => FeasibilityBand::Low,
    }
}

/// Finds every pair of fingerprints within `threshold` Hamming distance of
/// each other in an unordered batch, for offline auditing of an
/// already-built DNA set. Distinct from [`crate::Registry::batch_register`]'s
/// ordered accept/reject semantics: this does not consult or mutate any
/// registry state.
///
/// Returns `(i, j, distance)` triples with `i < j`, in ascending `(i, j)`
/// order.
pub fn find_all_duplicate_pairs(dnas: &[Dna], threshold: u32) -> Vec<(usize, usize, u32)> {
    let mut pairs = Vec::new();
    for i in 0..dnas.len() {
        for j in (i + 1)..dnas.len() {
            let distance = dnas[i].hamming_distance(&dnas[j]);
            if distance <= threshold {
                pairs.push((i, j, distance));
            }
        }
    }
    pairs
}
