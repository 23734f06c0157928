//! Configuration accepted by [`crate::Registry::register`].

/// Per-call configuration for [`crate::Registry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegisterOptions {
    /// Hamming-distance cutoff for duplicate detection, `0..=256`.
    pub threshold: u32,
    /// If true, a DNA identical to one already registered at the same
    /// pointer is re-accepted rather than rejected. Default `false`.
    pub allow_self_duplicate: bool,
    /// Overrides the wall-clock timestamp, for deterministic testing.
    pub timestamp_override: Option<u64>,
}

impl Default for RegisterOptions {
    fn default() -> Self {
        Self {
            threshold: crate::DEFAULT_DUPLICATE_THRESHOLD,
            allow_self_duplicate: false,
            timestamp_override: None,
        }
    }
}

impl RegisterOptions {
    /// Options with the default threshold and no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Hamming-distance duplicate threshold.
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets whether an identical DNA at the same pointer is re-accepted.
    pub fn with_allow_self_duplicate(mut self, allow: bool) -> Self {
        self.allow_self_duplicate = allow;
        self
    }

    /// Overrides the wall-clock timestamp used for the leaf.
    pub fn with_timestamp_override(mut self, timestamp: u64) -> Self {
        self.timestamp_override = Some(timestamp);
        self
    }
}
