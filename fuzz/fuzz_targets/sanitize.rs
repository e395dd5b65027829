#![no_main]

use std::sync::LazyLock;

use libfuzzer_sys::fuzz_target;
use sanitizer::{MemoryAssetStore, Mode, Sanitizer, SanitizerConfig};

fn build_sanitizer() -> Sanitizer {
    let config = SanitizerConfig::default()
        .with_internal_hostname("example.org")
        .with_external_links(true);
    Sanitizer::new(config)
        .expect("fuzz config is valid")
        .with_asset_store(MemoryAssetStore::new().with_image("/a.png", 1, 1))
}

static SANITIZER: LazyLock<Sanitizer> = LazyLock::new(build_sanitizer);

fuzz_target!(|data: &str| {
    for mode in [Mode::Html, Mode::Raw] {
        let Ok(once) = SANITIZER.sanitize_mode(data, mode) else {
            continue;
        };
        // Accepted output must re-parse and be a fixed point.
        html::parse_fragment(once.as_str()).expect("sanitized output re-parses");
        let twice = SANITIZER
            .sanitize(once.as_str())
            .expect("sanitized output is accepted again");
        assert_eq!(once, twice, "sanitizing is idempotent");
    }
});
