#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing must never panic; a successful parse must tokenize identically twice.
    if let Ok(first) = html::parse_fragment(data) {
        let second = html::parse_fragment(data).expect("parsing is deterministic");
        assert_eq!(first, second);
    }
});
