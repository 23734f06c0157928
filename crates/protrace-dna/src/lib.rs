//! Deterministic 256-bit perceptual image fingerprinting.
//!
//! A [`Dna`] fingerprint is the concatenation of two independently computed
//! components extracted from the same decoded image:
//!
//! - a 64-bit horizontal-gradient hash (dHash-style), sensitive to edges
//!   and fine detail;
//! - a 192-bit multi-scale structural hash, sensitive to coarse layout at
//!   three block sizes.
//!
//! ```
//! use protrace_dna::extract;
//!
//! # fn make_png() -> Vec<u8> {
//! #     use image::{ImageBuffer, Rgb};
//! #     let img = ImageBuffer::from_pixel(64, 64, Rgb([40u8, 80, 120]));
//! #     let mut bytes = Vec::new();
//! #     img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png).unwrap();
//! #     bytes
//! # }
//! let bytes = make_png();
//! let dna = extract(&bytes).expect("decodable image");
//! println!("{}", dna.to_hex());
//! ```
//!
//! Two fingerprints are compared with [`Dna::hamming_distance`]; a distance
//! at or below 26 (out of 256 bits) is the reference threshold for
//! "probable duplicate" used by `protrace-registry`.
#![warn(missing_docs)]

mod dna;
mod error;
mod extract;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use dna::{Dna, DNA_SIZE, GRADIENT_BITS, GRADIENT_BYTES, STRUCTURAL_BITS, STRUCTURAL_BYTES};
pub use error::{DnaError, Result};
pub use extract::{extract, extract_from_rgb};

/// The reference duplicate-detection threshold: two fingerprints at or
/// below this Hamming distance are treated as the same underlying image.
pub const DEFAULT_DUPLICATE_THRESHOLD: u32 = 26;
