//! The append-only Merkle commitment tree.

use crate::algorithm::{Digest, HashAlgorithm};
use crate::error::{Result, TreeError};
use crate::leaf::Leaf;

/// Which side of the parent node a proof's sibling hash sits on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    /// The sibling is the left child; the current hash is the right child.
    Left,
    /// The sibling is the right child; the current hash is the left child.
    Right,
}

/// One step of a Merkle proof: a sibling hash and which side it's on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ProofStep {
    /// The sibling's hash at this level.
    pub sibling: Digest,
    /// Which side of the parent the sibling occupies.
    pub side: Side,
}

/// An ordered path from a leaf to the root: re-hashing the leaf with each
/// [`ProofStep`] in order reproduces the root hash if and only if the leaf
/// is actually present at the index the proof was generated for.
pub type Proof = Vec<ProofStep>;

/// An append-only Merkle commitment tree over [`Leaf`] preimages.
///
/// The tree eagerly rebuilds every level on each [`CommitmentTree::append`]
/// call. This is a deliberate simplification suited to registries with up
/// to roughly `10^5` leaves; past that, an incremental "frontier"
/// structure that retains one hash per level should replace it without
/// changing the external root or proof shape.
#[derive(Debug, Clone)]
pub struct CommitmentTree {
    algorithm: HashAlgorithm,
    leaves: Vec<Leaf>,
    /// `levels[0]` is the leaf hashes; `levels.last()` is the single-element
    /// root level. Empty when the tree has no leaves.
    levels: Vec<Vec<Digest>>,
}

impl CommitmentTree {
    /// Creates an empty tree using the given hash algorithm.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm, leaves: Vec::new(), levels: Vec::new() }
    }

    /// The hash algorithm this tree was built with.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Number of leaves currently in the tree.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Whether the tree has no leaves.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// The leaves in insertion order.
    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    /// Appends a leaf, rebuilding the tree and returning its index.
    pub fn append(&mut self, leaf: Leaf) -> usize {
        self.leaves.push(leaf);
        self.rebuild();
        self.leaves.len() - 1
    }

    /// Removes the most recently appended leaf and rebuilds, for rolling
    /// back an append whose persistence hook failed. Returns the removed
    /// leaf, or `None` if the tree was already empty.
    pub fn remove_last(&mut self) -> Option<Leaf> {
        let removed = self.leaves.pop();
        if removed.is_some() {
            self.rebuild();
        }
        removed
    }

    /// The current root hash, or `None` if the tree is empty.
    pub fn root(&self) -> Option<Digest> {
        self.levels.last().map(|top| top[0])
    }

    /// The current root hash, hex encoded, or `None` if the tree is empty.
    pub fn root_hex(&self) -> Option<String> {
        self.root().map(hex_encode)
    }

    /// The current root hash, or [`TreeError::Empty`] if the tree has no
    /// leaves. A `Result`-returning counterpart to [`Self::root`] for
    /// callers that want a hard error rather than an `Option` at a point
    /// where an empty tree is a caller mistake, not a normal state.
    pub fn root_checked(&self) -> Result<Digest> {
        self.root().ok_or(TreeError::Empty)
    }

    /// Builds the inclusion proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Result<Proof> {
        if index >= self.leaves.len() {
            return Err(TreeError::OutOfRange { index, len: self.leaves.len() });
        }

        let mut path = Vec::new();
        let mut idx = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let len = level.len();
            if idx % 2 == 0 {
                let sibling_idx = if idx + 1 < len { idx + 1 } else { idx };
                path.push(ProofStep { sibling: level[sibling_idx], side: Side::Right });
            } else {
                path.push(ProofStep { sibling: level[idx - 1], side: Side::Left });
            }
            idx /= 2;
        }
        Ok(path)
    }

    fn rebuild(&mut self) {
        let leaf_hashes: Vec<Digest> = self.leaves.iter().map(|l| l.hash(self.algorithm)).collect();
        self.levels = build_levels(&leaf_hashes, self.algorithm);
    }
}

/// Builds every level of the tree from its leaf hashes, in row order
/// bottom to top. Odd-length levels self-pair the last node.
fn build_levels(leaf_hashes: &[Digest], algorithm: HashAlgorithm) -> Vec<Vec<Digest>> {
    if leaf_hashes.is_empty() {
        return Vec::new();
    }

    let mut levels = vec![leaf_hashes.to_vec()];
    while levels.last().unwrap().len() > 1 {
        let prev = levels.last().unwrap();
        let mut next = Vec::with_capacity(prev.len().div_ceil(2));
        let mut i = 0;
        while i < prev.len() {
            let left = prev[i];
            let right = if i + 1 < prev.len() { prev[i + 1] } else { prev[i] };
            next.push(algorithm.hash_node(&left, &right));
            i += 2;
        }
        levels.push(next);
    }
    levels
}

/// Verifies a Merkle inclusion proof against an expected root, without
/// needing access to the tree itself.
///
/// Starting from the leaf's own hash, each [`ProofStep`] folds in its
/// sibling on the indicated side; the result must equal `expected_root`.
pub fn verify(leaf: &Leaf, proof: &[ProofStep], expected_root: Digest, algorithm: HashAlgorithm) -> bool {
    let mut current = leaf.hash(algorithm);
    for step in proof {
        current = match step.side {
            Side::Left => algorithm.hash_node(&step.sibling, &current),
            Side::Right => algorithm.hash_node(&current, &step.sibling),
        };
    }
    current == expected_root
}

pub(crate) fn hex_encode(digest: Digest) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(64);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
