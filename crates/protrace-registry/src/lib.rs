//! An NFT-provenance registry: perceptual-duplicate rejection layered
//! over an append-only BLAKE3 commitment tree.
//!
//! ```
//! use protrace_registry::{Registry, RegisterOptions, Outcome};
//! use protrace_tree::HashAlgorithm;
//!
//! # fn solid_png() -> Vec<u8> {
//! #     use image::{ImageBuffer, Rgb};
//! #     let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(64, 64, Rgb([40, 80, 120]));
//! #     let mut bytes = Vec::new();
//! #     img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png).unwrap();
//! #     bytes
//! # }
//! let registry = Registry::new(HashAlgorithm::Blake3);
//! let bytes = solid_png();
//!
//! match registry.register(&bytes, "nft-001", "my-marketplace", RegisterOptions::default(), None) {
//!     Outcome::Accepted { leaf_index, new_root, .. } => {
//!         println!("registered at leaf {leaf_index}, root has {} bytes", new_root.len());
//!     }
//!     Outcome::Rejected { matched_index, distance, .. } => {
//!         println!("duplicate of leaf {matched_index} at distance {distance}");
//!     }
//!     Outcome::Failed(e) => eprintln!("registration failed: {e}"),
//! }
//! ```
//!
//! Three concerns compose here:
//!
//! - [`oracle`]: the similarity oracle (C2) that decides uniqueness.
//! - [`Registry`]: the registration pipeline (C4) tying extraction,
//!   querying, and tree append into one observably-atomic step.
//! - `protrace_tree`: re-exported where convenient, for the commitment
//!   tree (C3) this registry is built on.
#![warn(missing_docs)]

mod error;
mod options;
pub mod oracle;
mod pipeline;

pub use error::{RegistryError, Result};
pub use options::RegisterOptions;
pub use pipeline::{BatchItem, BatchResult, NullPersistHook, Outcome, PersistHook, Registry};

/// The reference duplicate-detection threshold, re-exported from
/// `protrace-dna` for convenience: two fingerprints at or below this
/// Hamming distance are treated as the same underlying image.
pub const DEFAULT_DUPLICATE_THRESHOLD: u32 = protrace_dna::DEFAULT_DUPLICATE_THRESHOLD;
