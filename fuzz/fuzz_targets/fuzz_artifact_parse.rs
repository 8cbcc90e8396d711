#![deny(unsafe_code)]
#![no_main]

//! Fuzz testing for capability header parsing
//!
//! Arbitrary bytes must either load as a coherent capability set or be
//! rejected with an error. Anything that loads must serialize back to the
//! canonical layout and load again to the same set.

use libfuzzer_sys::fuzz_target;
use tlscaps_core::CapabilitySet;

fuzz_target!(|data: &[u8]| {
    let Ok(set) = CapabilitySet::deserialize(data) else {
        return;
    };

    assert!(set.validate().is_ok(), "Loaded set must satisfy all invariants");

    let canonical = set.serialize();
    let reloaded = CapabilitySet::deserialize(&canonical).expect("Canonical output must load");
    assert_eq!(set, reloaded, "Round trip must preserve every capability");
    assert_eq!(canonical, reloaded.serialize(), "Serialization must be deterministic");
});
