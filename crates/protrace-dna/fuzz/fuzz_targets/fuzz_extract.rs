#![no_main]

use libfuzzer_sys::fuzz_target;
use protrace_dna::extract;

// extract() must never panic on arbitrary bytes, decodable or not.
fuzz_target!(|data: &[u8]| {
    let _ = extract(data);
});
