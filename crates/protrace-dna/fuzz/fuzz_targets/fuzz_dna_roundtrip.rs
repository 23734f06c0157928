#![no_main]

use libfuzzer_sys::fuzz_target;
use protrace_dna::{Dna, DNA_SIZE};

fuzz_target!(|bytes: [u8; DNA_SIZE]| {
    let dna = Dna::from_bytes(bytes);
    let hex = dna.to_hex();
    let parsed = Dna::from_hex(&hex).expect("to_hex output must always parse back");
    assert_eq!(dna, parsed);
    assert_eq!(dna.hamming_distance(&dna), 0);
});
