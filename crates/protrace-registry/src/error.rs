//! Error types for the registration pipeline.

use protrace_dna::DnaError;
use protrace_tree::TreeError;
use thiserror::Error;

/// Result type alias for [`crate::Registry`] operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Error type for [`crate::Registry::register`] and friends.
///
/// A rejected duplicate is *not* represented here: it's a structured
/// [`crate::Outcome::Rejected`] on the happy path, not an error.
#[derive(Error, Debug, Clone)]
pub enum RegistryError {
    /// DNA extraction failed (bad bytes, unsupported format, degenerate
    /// dimensions).
    #[error(transparent)]
    Dna(#[from] DnaError),

    /// A commitment-tree operation failed (out of range, empty, malformed
    /// manifest).
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// The caller-supplied [`crate::PersistHook`] returned an error while
    /// persisting an appended leaf. The in-memory append has already been
    /// rolled back by the time this is returned.
    #[error("persistence hook failed: {0}")]
    PersistenceFailed(String),

    /// A pluggable similarity accelerator reported a result inconsistent
    /// with its own bookkeeping (e.g. an index referencing a leaf the
    /// tree doesn't have). The caller should expect the oracle to have
    /// fallen back to a linear scan for this call.
    #[error("similarity index inconsistent: {0}")]
    IndexInconsistent(String),
}

/// Serializes as the error's `Display` message, not its variant structure:
/// API collaborators surfacing an [`crate::Outcome::Failed`] want a
/// message field, not a tagged union they'd need this crate's types to
/// deserialize.
#[cfg(feature = "serde")]
impl serde::Serialize for RegistryError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl RegistryError {
    /// `true` for the two variants that represent a transient failure in
    /// surrounding infrastructure (a persistence hook, a similarity
    /// accelerator) rather than bad input; delegates to the wrapped error
    /// otherwise.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Dna(e) => e.is_recoverable(),
            Self::Tree(e) => e.is_recoverable(),
            Self::PersistenceFailed(_) | Self::IndexInconsistent(_) => true,
        }
    }

    /// Delegates to the wrapped error for [`Self::Dna`] and [`Self::Tree`];
    /// `false` for the persistence and index-consistency variants, which
    /// originate from surrounding infrastructure, not the caller's bytes.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::Dna(e) => e.is_input_error(),
            Self::Tree(e) => e.is_input_error(),
            Self::PersistenceFailed(_) | Self::IndexInconsistent(_) => false,
        }
    }
}
