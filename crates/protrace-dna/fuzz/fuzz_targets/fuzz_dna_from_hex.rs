#![no_main]

use libfuzzer_sys::fuzz_target;
use protrace_dna::Dna;

fuzz_target!(|data: &str| {
    if let Some(dna) = Dna::from_hex(data) {
        assert_eq!(dna.to_hex().len(), 64);
    }
});
