//! Fuzz target for percentage normalization.

#![no_main]

use cdx_core::normalize::{normalize_percentages, parse_probability};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|text: &str| {
    let normalized = normalize_percentages(text);
    // Each rewrite consumes one '%' and never introduces one.
    assert!(normalized.matches('%').count() <= text.matches('%').count());
    if let Some(p) = parse_probability(text) {
        assert!(!text.trim().ends_with('%') || p.is_finite());
    }
});
