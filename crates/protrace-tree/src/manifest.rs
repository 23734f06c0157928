//! Externally-serializable snapshots of a [`crate::CommitmentTree`].
//!
//! The manifest is the canonical interchange format between the core tree
//! and any persistence or pinning collaborator (e.g. a database row, an
//! IPFS-pinned JSON blob). Its shape is fixed; parsing is a direct read of
//! named fields, not reflection over an arbitrary document.

use std::collections::HashSet;

use protrace_dna::Dna;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::algorithm::HashAlgorithm;
use crate::error::{Result, TreeError};
use crate::leaf::Leaf;
use crate::tree::{hex_encode, CommitmentTree, ProofStep, Side};

/// One leaf entry in a [`Manifest`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManifestLeaf {
    /// Position in the ordered leaf sequence.
    pub index: usize,
    /// 64-character hex DNA fingerprint.
    pub dna_hex: String,
    /// Caller-owned unique identifier.
    pub pointer: String,
    /// Caller-chosen platform tag.
    pub platform_id: String,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
}

/// Which side of the parent a [`ManifestProofStep`]'s sibling sits on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Position {
    /// Sibling is the left child.
    Left,
    /// Sibling is the right child.
    Right,
}

/// One step of a serialized Merkle proof.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManifestProofStep {
    /// Hex-encoded sibling hash.
    pub hash_hex: String,
    /// Which side of the parent the sibling occupies.
    pub position: Position,
}

/// A proof entry keyed by leaf index. Represented as a list rather than a
/// map so that a manifest with duplicate indices can be detected and
/// rejected on import instead of silently overwriting an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManifestProofEntry {
    /// The leaf index this proof is for.
    pub index: usize,
    /// The proof path, root-ward from the leaf.
    pub path: Vec<ManifestProofStep>,
}

/// The canonical externally-serializable snapshot of a [`CommitmentTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Manifest {
    /// Hex-encoded root hash.
    pub root: String,
    /// Number of leaves, redundant with `leaves.len()` but kept explicit
    /// for readers that don't want to count.
    pub total_leaves: usize,
    /// The ordered leaves.
    pub leaves: Vec<ManifestLeaf>,
    /// Proofs included in this snapshot, keyed by leaf index.
    pub proofs: Vec<ManifestProofEntry>,
}

impl CommitmentTree {
    /// Exports a manifest containing every leaf and an inclusion proof
    /// for each one.
    ///
    /// Returns `None` if the tree is empty (there is no root to anchor
    /// the manifest to).
    pub fn export_manifest(&self) -> Option<Manifest> {
        let root = self.root_hex()?;
        let leaves = self
            .leaves()
            .iter()
            .enumerate()
            .map(|(index, leaf)| ManifestLeaf {
                index,
                dna_hex: leaf.dna.to_hex(),
                pointer: leaf.pointer.clone(),
                platform_id: leaf.platform_id.clone(),
                timestamp: leaf.timestamp,
            })
            .collect();

        let proofs = (0..self.len())
            .map(|index| {
                let path = self
                    .proof(index)
                    .expect("index is within range by construction")
                    .iter()
                    .map(proof_step_to_manifest)
                    .collect();
                ManifestProofEntry { index, path }
            })
            .collect();

        Some(Manifest { root, total_leaves: self.len(), leaves, proofs })
    }

    /// Rebuilds a tree from a manifest, cross-checking that the
    /// recomputed root matches the manifest's declared root.
    ///
    /// Fails with [`TreeError::MalformedManifest`] if the leaf indices
    /// aren't a contiguous `0..n` run, if any proof index is duplicated
    /// or out of range, or if the recomputed root disagrees with the
    /// manifest.
    pub fn import_manifest(manifest: &Manifest, algorithm: HashAlgorithm) -> Result<Self> {
        let mut sorted_leaves = manifest.leaves.clone();
        sorted_leaves.sort_by_key(|l| l.index);

        if sorted_leaves.len() != manifest.total_leaves {
            return Err(TreeError::MalformedManifest(format!(
                "declared total_leaves {} does not match leaf count {}",
                manifest.total_leaves,
                sorted_leaves.len()
            )));
        }
        for (expected, leaf) in sorted_leaves.iter().enumerate() {
            if leaf.index != expected {
                return Err(TreeError::MalformedManifest(format!(
                    "leaf indices are not contiguous: expected {expected}, found {}",
                    leaf.index
                )));
            }
        }

        let mut seen_proof_indices = HashSet::new();
        for entry in &manifest.proofs {
            if !seen_proof_indices.insert(entry.index) {
                return Err(TreeError::MalformedManifest(format!(
                    "duplicate proof index {}",
                    entry.index
                )));
            }
            if entry.index >= sorted_leaves.len() {
                return Err(TreeError::MalformedManifest(format!(
                    "proof index {} out of range for {} leaves",
                    entry.index,
                    sorted_leaves.len()
                )));
            }
        }

        let mut tree = CommitmentTree::new(algorithm);
        for leaf in sorted_leaves {
            let dna = Dna::from_hex(&leaf.dna_hex).ok_or_else(|| {
                TreeError::MalformedManifest(format!(
                    "leaf {} has malformed dna_hex {:?}",
                    leaf.index, leaf.dna_hex
                ))
            })?;
            tree.append(Leaf::new(dna, leaf.pointer, leaf.platform_id, leaf.timestamp));
        }

        let recomputed_root = tree.root_hex();
        if recomputed_root.as_deref() != Some(manifest.root.as_str()) {
            return Err(TreeError::MalformedManifest(format!(
                "recomputed root {:?} does not match manifest root {}",
                recomputed_root, manifest.root
            )));
        }

        Ok(tree)
    }
}

fn proof_step_to_manifest(step: &ProofStep) -> ManifestProofStep {
    ManifestProofStep {
        hash_hex: hex_encode(step.sibling),
        position: match step.side {
            Side::Left => Position::Left,
            Side::Right => Position::Right,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> CommitmentTree {
        let mut tree = CommitmentTree::new(HashAlgorithm::Blake3);
        for i in 0..5 {
            tree.append(Leaf::new(Dna::from_bytes([0xaa; 32]), format!("p{i}"), "test", 1000 + i as u64));
        }
        tree
    }

    #[test]
    fn export_then_import_round_trips() {
        let tree = sample_tree();
        let manifest = tree.export_manifest().unwrap();
        let rebuilt = CommitmentTree::import_manifest(&manifest, HashAlgorithm::Blake3).unwrap();
        assert_eq!(rebuilt.root(), tree.root());
        assert_eq!(rebuilt.len(), tree.len());
    }

    #[test]
    fn import_rejects_tampered_root() {
        let tree = sample_tree();
        let mut manifest = tree.export_manifest().unwrap();
        manifest.root = "0".repeat(64);
        let err = CommitmentTree::import_manifest(&manifest, HashAlgorithm::Blake3).unwrap_err();
        assert!(matches!(err, TreeError::MalformedManifest(_)));
    }

    #[test]
    fn import_rejects_duplicate_proof_indices() {
        let tree = sample_tree();
        let mut manifest = tree.export_manifest().unwrap();
        let dup = manifest.proofs[0].clone();
        manifest.proofs.push(dup);
        let err = CommitmentTree::import_manifest(&manifest, HashAlgorithm::Blake3).unwrap_err();
        assert!(matches!(err, TreeError::MalformedManifest(_)));
    }

    #[test]
    fn import_rejects_noncontiguous_leaf_indices() {
        let tree = sample_tree();
        let mut manifest = tree.export_manifest().unwrap();
        manifest.leaves[2].index = 99;
        let err = CommitmentTree::import_manifest(&manifest, HashAlgorithm::Blake3).unwrap_err();
        assert!(matches!(err, TreeError::MalformedManifest(_)));
    }

    #[test]
    fn import_rejects_malformed_dna_hex() {
        let tree = sample_tree();
        let mut manifest = tree.export_manifest().unwrap();
        manifest.leaves[1].dna_hex = "not-hex".to_string();
        let err = CommitmentTree::import_manifest(&manifest, HashAlgorithm::Blake3).unwrap_err();
        assert!(matches!(err, TreeError::MalformedManifest(_)));
    }

    #[test]
    #[cfg(feature = "serde")]
    fn manifest_serializes_to_json() {
        let tree = sample_tree();
        let manifest = tree.export_manifest().unwrap();
        let json = serde_json::to_string(&manifest).unwrap();
        let parsed: Manifest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, manifest);
    }

    #[test]
    fn empty_tree_has_no_manifest() {
        let tree = CommitmentTree::new(HashAlgorithm::Blake3);
        assert!(tree.export_manifest().is_none());
    }
}
