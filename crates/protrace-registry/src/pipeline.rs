//! The registration pipeline (C4): extract, query, and append-or-reject
//! as a single observably-atomic step.

use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use protrace_dna::Dna;
use protrace_tree::{CommitmentTree, Digest, HashAlgorithm, Leaf, Manifest, Proof};

use crate::error::{RegistryError, Result};
use crate::oracle::{LinearScanOracle, Match, SimilarityOracle, Verdict};
use crate::options::RegisterOptions;

/// A collaborator-provided hook invoked after a leaf has been durably
/// appended in memory, so it can be persisted to external storage (a
/// database row, an IPFS pin, etc).
///
/// Called outside any held lock, per the concurrency model: persistence
/// I/O must never convoy behind the registry's write lock. Returning an
/// error rolls back the in-memory append before `register` reports
/// [`Outcome::Failed`].
pub trait PersistHook: Send + Sync {
    /// Persists an appended leaf and the root it produced.
    fn persist_leaf(&self, leaf: &Leaf, new_root: Digest) -> std::result::Result<(), String>;
}

/// The default hook for callers with no external persistence
/// collaborator wired in: accepts every leaf unconditionally.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPersistHook;

impl PersistHook for NullPersistHook {
    fn persist_leaf(&self, _leaf: &Leaf, _new_root: Digest) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// The result of a single [`Registry::register`] call.
///
/// Serialization is one-way (`Serialize` only, no `Deserialize`): an
/// `Outcome` is a query result surfaced to a caller, such as an API
/// collaborator's response body, never a value reconstructed from one.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "outcome", rename_all = "snake_case"))]
pub enum Outcome {
    /// The image was unique (or allowed through as a self-duplicate) and
    /// was appended as a new leaf.
    Accepted {
        /// The extracted fingerprint.
        dna: Dna,
        /// Index of the newly appended leaf.
        leaf_index: usize,
        /// The commitment tree's root after the append.
        new_root: Digest,
        /// The closest neighbor in the registry, if any.
        best_match: Option<Match>,
    },
    /// The image matched an existing leaf within the duplicate threshold.
    /// The registry and tree are unchanged.
    Rejected {
        /// The extracted fingerprint.
        dna: Dna,
        /// Index of the matched leaf.
        matched_index: usize,
        /// Hamming distance to the matched leaf.
        distance: u32,
        /// The matched leaf's metadata.
        matched_leaf: Leaf,
    },
    /// The pipeline could not complete: decode failure or a persistence
    /// hook error. The registry is unchanged in both cases.
    Failed(RegistryError),
}

/// The NFT-provenance registry: a perceptual-duplicate oracle layered
/// over an append-only commitment tree.
///
/// Reads (`root`, `proof_for`, `len`) may proceed concurrently with each
/// other. Writes (`register`, `import_manifest`) are serialized behind a
/// single write lock covering exactly the query-then-append critical
/// section; the leaf vector and root cache flip together so no reader
/// ever observes a half-completed append.
pub struct Registry {
    state: RwLock<CommitmentTree>,
    oracle: Box<dyn SimilarityOracle + Send + Sync>,
}

impl Registry {
    /// Creates an empty registry using the reference [`LinearScanOracle`].
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self::with_oracle(algorithm, Box::new(LinearScanOracle))
    }

    /// Creates an empty registry using a custom similarity oracle.
    ///
    /// The oracle must be provably equivalent to [`LinearScanOracle`] for
    /// every possible input; see [`crate::oracle::BucketIndex`] for an
    /// example accelerator and its differential test.
    pub fn with_oracle(algorithm: HashAlgorithm, oracle: Box<dyn SimilarityOracle + Send + Sync>) -> Self {
        Self { state: RwLock::new(CommitmentTree::new(algorithm)), oracle }
    }

    /// The commitment tree's current root, or `None` if the registry is
    /// empty.
    pub fn root(&self) -> Option<Digest> {
        self.state.read().root()
    }

    /// The number of leaves currently registered.
    pub fn len(&self) -> usize {
        self.state.read().len()
    }

    /// Whether the registry has no leaves.
    pub fn is_empty(&self) -> bool {
        self.state.read().is_empty()
    }

    /// The inclusion proof for a previously-registered leaf. Thin
    /// pass-through to the commitment tree.
    pub fn proof_for(&self, leaf_index: usize) -> Result<Proof> {
        self.state.read().proof(leaf_index).map_err(RegistryError::from)
    }

    /// Exports a manifest snapshot of the current registry state.
    pub fn export_manifest(&self) -> Option<Manifest> {
        self.state.read().export_manifest()
    }

    /// Replaces the registry's state with one rebuilt from `manifest`,
    /// cross-checking the recomputed root against the manifest's
    /// declared root. Treated as a write: serialized against
    /// concurrent `register` calls.
    pub fn import_manifest(&self, manifest: &Manifest) -> Result<()> {
        let algorithm = self.state.read().algorithm();
        let rebuilt = CommitmentTree::import_manifest(manifest, algorithm)?;
        *self.state.write() = rebuilt;
        Ok(())
    }

    /// Registers one image: extract its DNA, query the oracle, and
    /// either append a new leaf or reject it as a duplicate.
    ///
    /// Observably atomic: either the registry grows by exactly one leaf
    /// and a new root is produced, or nothing changes. Image decoding and
    /// any persistence I/O happen outside the write lock.
    #[tracing::instrument(skip(self, image_bytes, persist_hook))]
    pub fn register(
        &self,
        image_bytes: &[u8],
        pointer: impl AsRef<str> + std::fmt::Debug,
        platform_id: impl AsRef<str> + std::fmt::Debug,
        options: RegisterOptions,
        persist_hook: Option<&dyn PersistHook>,
    ) -> Outcome {
        let dna = match protrace_dna::extract(image_bytes) {
            Ok(dna) => dna,
            Err(e) => {
                tracing::debug!(error = %e, "dna extraction failed");
                return Outcome::Failed(RegistryError::Dna(e));
            }
        };

        self.register_dna(dna, pointer, platform_id, options, persist_hook)
    }

    /// Registers an already-computed fingerprint directly, skipping DNA
    /// extraction. Useful for callers with an externally-computed
    /// fingerprint, and for exercising the oracle/tree layers at an exact
    /// Hamming distance in tests.
    #[tracing::instrument(skip(self, persist_hook))]
    pub fn register_dna(
        &self,
        dna: Dna,
        pointer: impl AsRef<str> + std::fmt::Debug,
        platform_id: impl AsRef<str> + std::fmt::Debug,
        options: RegisterOptions,
        persist_hook: Option<&dyn PersistHook>,
    ) -> Outcome {
        let timestamp = options.timestamp_override.unwrap_or_else(current_timestamp);

        let accepted = {
            let mut tree = self.state.write();
            let verdict = self.oracle.query(dna, tree.leaves(), options.threshold);

            if let Verdict::Duplicate(m) = verdict {
                let self_duplicate = options.allow_self_duplicate && tree.leaves()[m.index].pointer == pointer.as_ref();
                if !self_duplicate {
                    let matched_leaf = tree.leaves()[m.index].clone();
                    tracing::debug!(matched_index = m.index, distance = m.distance, "rejected as duplicate");
                    return Outcome::Rejected { dna, matched_index: m.index, distance: m.distance, matched_leaf };
                }
            }

            let best_match = verdict.best_match();
            let leaf = Leaf::new(dna, pointer.as_ref(), platform_id.as_ref(), timestamp);
            let leaf_index = tree.append(leaf.clone());
            let new_root = tree.root().expect("tree is non-empty immediately after append");
            (leaf_index, new_root, leaf, best_match)
        };
        let (leaf_index, new_root, leaf, best_match) = accepted;

        if let Some(hook) = persist_hook {
            if let Err(message) = hook.persist_leaf(&leaf, new_root) {
                tracing::debug!(error = %message, "persistence hook failed, rolling back append");
                self.state.write().remove_last();
                return Outcome::Failed(RegistryError::PersistenceFailed(message));
            }
        }

        tracing::debug!(leaf_index, "accepted");
        Outcome::Accepted { dna, leaf_index, new_root, best_match }
    }

    /// Registers a batch of images in input order, under the same
    /// semantics as individual [`Registry::register`] calls. Earlier
    /// acceptances within the batch are visible to later queries.
    pub fn batch_register(
        &self,
        items: impl IntoIterator<Item = BatchItem>,
        persist_hook: Option<&dyn PersistHook>,
    ) -> BatchResult {
        let outcomes = items
            .into_iter()
            .map(|item| self.register(&item.image_bytes, item.pointer, item.platform_id, item.options, persist_hook))
            .collect();

        BatchResult { outcomes, final_root: self.root() }
    }
}

/// One entry in a [`Registry::batch_register`] call.
#[derive(Debug, Clone)]
pub struct BatchItem {
    /// Raw encoded image bytes.
    pub image_bytes: Vec<u8>,
    /// Caller-owned unique identifier.
    pub pointer: String,
    /// Caller-chosen platform tag.
    pub platform_id: String,
    /// Per-item registration options.
    pub options: RegisterOptions,
}

impl BatchItem {
    /// Builds a batch item with default [`RegisterOptions`].
    pub fn new(image_bytes: Vec<u8>, pointer: impl Into<String>, platform_id: impl Into<String>) -> Self {
        Self { image_bytes, pointer: pointer.into(), platform_id: platform_id.into(), options: RegisterOptions::default() }
    }
}

/// The result of a [`Registry::batch_register`] call: one [`Outcome`] per
/// item, plus the registry's final root once at the end.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Per-item outcomes, in input order.
    pub outcomes: Vec<Outcome>,
    /// The registry's root after every item has been processed.
    pub final_root: Option<Digest>,
}

fn current_timestamp() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock is after the Unix epoch").as_secs()
}
