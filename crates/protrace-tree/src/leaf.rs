//! Registry leaves and their canonical Merkle preimage.

use protrace_dna::Dna;

use crate::algorithm::{Digest, HashAlgorithm};

/// One entry in the commitment tree's ordered leaf sequence.
///
/// `pointer` is an opaque unique identifier the caller controls (a URI, a
/// UUID, a content CID); `platform_id` is a short caller-chosen tag.
/// Neither field may contain the byte `|` — it is the preimage delimiter.
///
/// `dna` is a validated [`Dna`] value, not a raw string: a leaf can never
/// hold malformed hex, so every downstream consumer (the similarity oracle,
/// manifest export) can compare fingerprints without re-validating them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// The registered fingerprint.
    pub dna: Dna,
    /// Caller-owned unique identifier for the registered asset.
    pub pointer: String,
    /// Caller-chosen platform tag.
    pub platform_id: String,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
}

impl Leaf {
    /// Builds a leaf from a fingerprint and its metadata.
    pub fn new(dna: Dna, pointer: impl Into<String>, platform_id: impl Into<String>, timestamp: u64) -> Self {
        Self { dna, pointer: pointer.into(), platform_id: platform_id.into(), timestamp }
    }

    /// The canonical UTF-8 Merkle leaf preimage:
    /// `"{dna_hex}|{pointer}|{platform_id}|{timestamp}"`.
    pub fn preimage(&self) -> String {
        format!("{}|{}|{}|{}", self.dna.to_hex(), self.pointer, self.platform_id, self.timestamp)
    }

    /// Hashes the preimage with the given algorithm.
    pub fn hash(&self, algorithm: HashAlgorithm) -> Digest {
        algorithm.hash(self.preimage().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dna_of(byte: u8) -> Dna {
        Dna::from_bytes([byte; 32])
    }

    #[test]
    fn preimage_uses_pipe_delimiters() {
        let leaf = Leaf::new(dna_of(0xab), "ptr-1", "base", 1_700_000_000);
        assert_eq!(leaf.preimage(), format!("{}|ptr-1|base|1700000000", "ab".repeat(32)));
    }

    #[test]
    fn distinct_pointers_hash_differently() {
        let a = Leaf::new(dna_of(0xff), "ptr-a", "base", 1000);
        let b = Leaf::new(dna_of(0xff), "ptr-b", "base", 1000);
        assert_ne!(a.hash(HashAlgorithm::Blake3), b.hash(HashAlgorithm::Blake3));
    }
}
