#![deny(unsafe_code)]
#![no_main]

//! Fuzz testing for override resolution
//!
//! Each input byte selects a capability (low nibble) and a value (high bit).
//! Construction must succeed exactly when the resulting selection is
//! coherent, and a successful set must honor the last override per key.

use libfuzzer_sys::fuzz_target;
use tlscaps_core::{CAPABILITY_COUNT, Capability, CapabilitySet, Selection};

fuzz_target!(|data: &[u8]| {
    let overrides: Vec<(&'static str, bool)> = data
        .iter()
        .filter_map(|b| {
            let capability = Capability::ALL.get(usize::from(b & 0x0F) % CAPABILITY_COUNT)?;
            Some((capability.identifier(), b & 0x80 != 0))
        })
        .collect();

    let mut expected = Selection::defaults();
    for (identifier, enabled) in &overrides {
        let capability = Capability::from_identifier(identifier).expect("Identifiers come from the table");
        expected.set(capability, *enabled);
    }

    match CapabilitySet::construct(&Selection::defaults(), overrides.iter().copied()) {
        Ok(set) => assert_eq!(set.selection(), &expected, "Last override must win"),
        Err(_) => assert!(expected.validate().is_err(), "Only incoherent selections may fail"),
    }
});
