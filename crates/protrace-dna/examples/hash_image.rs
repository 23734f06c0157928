//! Extracts and prints the DNA fingerprint for one or more image files.
//!
//! ```text
//! cargo run --example hash_image -- photo1.jpg photo2.png
//! ```

use std::env;
use std::process::ExitCode;

use protrace_dna::extract;

fn main() -> ExitCode {
    let paths: Vec<String> = env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("usage: hash_image <image-path> [image-path...]");
        return ExitCode::FAILURE;
    }

    let mut failed = false;
    for path in paths {
        match std::fs::read(&path).map_err(|e| e.to_string()).and_then(|bytes| {
            extract(&bytes).map_err(|e| e.to_string())
        }) {
            Ok(dna) => println!("{path}\t{}", dna.to_hex()),
            Err(e) => {
                eprintln!("{path}: {e}");
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
