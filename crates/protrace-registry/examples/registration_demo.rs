//! Registers every image file given on the command line against a fresh
//! in-memory registry, printing the outcome of each.
//!
//! ```text
//! cargo run --example registration_demo -- photo1.jpg photo2.jpg
//! ```

use std::env;

use protrace_registry::{Outcome, RegisterOptions, Registry};
use protrace_tree::HashAlgorithm;

fn main() {
    let paths: Vec<String> = env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("usage: registration_demo <image-path> [image-path...]");
        std::process::exit(1);
    }

    let registry = Registry::new(HashAlgorithm::Blake3);

    for (i, path) in paths.iter().enumerate() {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                println!("{path}: could not read file ({e})");
                continue;
            }
        };

        let pointer = format!("cli-upload-{i}");
        let outcome = registry.register(&bytes, &pointer, "cli-demo", RegisterOptions::default(), None);

        match outcome {
            Outcome::Accepted { leaf_index, best_match, .. } => {
                print!("{path}: accepted as leaf {leaf_index}");
                match best_match {
                    Some(m) => println!(" (closest existing leaf {} at distance {})", m.index, m.distance),
                    None => println!(" (first leaf in the registry)"),
                }
            }
            Outcome::Rejected { matched_index, distance, matched_leaf } => {
                println!(
                    "{path}: rejected as a duplicate of leaf {matched_index} (pointer {}) at distance {distance}",
                    matched_leaf.pointer
                );
            }
            Outcome::Failed(e) => println!("{path}: failed ({e})"),
        }
    }

    if let Some(root) = registry.root() {
        println!("final root: {}", hex_string(&root));
    }
}

fn hex_string(bytes: &[u8; 32]) -> String {
    use std::fmt::Write;
    let mut s = String::with_capacity(64);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}
