//! An append-only BLAKE3 Merkle commitment tree with inclusion proofs and
//! manifest export/import.
//!
//! ```
//! use protrace_dna::Dna;
//! use protrace_tree::{CommitmentTree, HashAlgorithm, Leaf};
//!
//! let mut tree = CommitmentTree::new(HashAlgorithm::Blake3);
//! let leaf = Leaf::new(Dna::from_bytes([0xaa; 32]), "ptr-1", "demo", 1_700_000_000);
//! let index = tree.append(leaf.clone());
//!
//! let proof = tree.proof(index).unwrap();
//! let root = tree.root().unwrap();
//! assert!(protrace_tree::verify(&leaf, &proof, root, tree.algorithm()));
//! ```
//!
//! The tree's identity is its root hash: 32 bytes, BLAKE3 of the top of a
//! full balanced binary tree whose leaves are `BLAKE3(leaf_preimage)` and
//! whose internal nodes are `BLAKE3(left ∥ right)`. Levels of odd length
//! self-pair their last node rather than promoting it unpaired.
#![warn(missing_docs)]

mod algorithm;
mod error;
mod leaf;
mod manifest;
mod tree;

pub use algorithm::{Digest, HashAlgorithm};
pub use error::{Result, TreeError};
pub use leaf::Leaf;
pub use manifest::{Manifest, ManifestLeaf, ManifestProofEntry, ManifestProofStep, Position};
pub use tree::{verify, CommitmentTree, Proof, ProofStep, Side};
