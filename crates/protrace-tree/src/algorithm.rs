//! The hash function backing a [`crate::CommitmentTree`].
//!
//! BLAKE3 is the production default. SHA-256 exists as a global fallback
//! for environments where BLAKE3 isn't available; the two are never mixed
//! within a single tree, and roots computed under one are not
//! interoperable with the other.

/// 32-byte digest produced by a [`HashAlgorithm`].
pub type Digest = [u8; 32];

/// The hash function a [`crate::CommitmentTree`] uses for leaf and
/// internal node hashing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    /// BLAKE3, unkeyed, no context string. The production default.
    #[default]
    Blake3,
    /// SHA-256, for deployments where BLAKE3 is unavailable.
    Sha256,
}

impl HashAlgorithm {
    /// Hashes a single byte string, e.g. a leaf preimage.
    pub fn hash(self, data: &[u8]) -> Digest {
        match self {
            HashAlgorithm::Blake3 => *blake3::hash(data).as_bytes(),
            HashAlgorithm::Sha256 => {
                use sha2::{Digest as _, Sha256};
                let mut hasher = Sha256::new();
                hasher.update(data);
                hasher.finalize().into()
            }
        }
    }

    /// Hashes an internal node: `H(left || right)`, concatenation in that
    /// order.
    pub fn hash_node(self, left: &Digest, right: &Digest) -> Digest {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(left);
        buf[32..].copy_from_slice(right);
        self.hash(&buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blake3_hash_matches_reference_vector() {
        let digest = HashAlgorithm::Blake3.hash(b"");
        assert_eq!(digest, *blake3::hash(b"").as_bytes());
    }

    #[test]
    fn algorithms_disagree() {
        let data = b"leaf preimage";
        assert_ne!(HashAlgorithm::Blake3.hash(data), HashAlgorithm::Sha256.hash(data));
    }

    #[test]
    fn node_hash_is_order_sensitive() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        assert_ne!(
            HashAlgorithm::Blake3.hash_node(&a, &b),
            HashAlgorithm::Blake3.hash_node(&b, &a)
        );
    }
}
