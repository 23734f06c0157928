//! Error types for perceptual DNA extraction.

use thiserror::Error;

/// Result type alias for DNA extraction operations.
pub type Result<T> = std::result::Result<T, DnaError>;

/// Error type for [`crate::extract`] operations.
///
/// Every failure mode of the extraction pipeline has a specific variant;
/// none of them are recoverable by retrying with the same bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnaError {
    /// The image bytes could not be decoded in any supported format.
    #[error("image could not be decoded: {0}")]
    InvalidImage(String),

    /// The bytes were decoded, but no decoder is registered for the
    /// detected format.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Either image dimension is smaller than 8 pixels, making the 9x8
    /// gradient resize degenerate.
    #[error("image too small: {width}x{height} (minimum 8x8)")]
    ImageTooSmall {
        /// Decoded width in pixels.
        width: u32,
        /// Decoded height in pixels.
        height: u32,
    },
}

impl DnaError {
    /// Returns `true` if retrying the same bytes might succeed.
    ///
    /// Extraction is a pure function of its input: every variant here is
    /// deterministic on the bytes given, so this is always `false`.
    pub fn is_recoverable(&self) -> bool {
        false
    }

    /// Returns `true` if the error stems from bytes the caller must fix,
    /// as opposed to surrounding infrastructure. True for every current
    /// variant.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidImage(_) | Self::UnsupportedFormat(_) | Self::ImageTooSmall { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_variant_is_recoverable() {
        assert!(!DnaError::InvalidImage("x".into()).is_recoverable());
        assert!(!DnaError::UnsupportedFormat("x".into()).is_recoverable());
        assert!(!DnaError::ImageTooSmall { width: 1, height: 1 }.is_recoverable());
    }

    #[test]
    fn every_variant_is_an_input_error() {
        assert!(DnaError::InvalidImage("x".into()).is_input_error());
        assert!(DnaError::UnsupportedFormat("x".into()).is_input_error());
        assert!(DnaError::ImageTooSmall { width: 1, height: 1 }.is_input_error());
    }
}
