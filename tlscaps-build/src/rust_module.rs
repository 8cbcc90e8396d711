#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Rust constants for `include!` from `OUT_DIR`.
//!
//! For code that branches at compile time with `if HAVE_TLS13 { .. }`
//! rather than `#[cfg]`. The dead branch is removed by the optimizer but
//! still type-checks, unlike the cfg route.

use std::fmt::Write as _;

use tlscaps_core::CapabilitySet;

/// Render `pub const <SYMBOL>: bool = ..;` lines in table order.
#[must_use]
pub fn render_rust_module(set: &CapabilitySet) -> String {
    let mut out = String::from("// Generated by tlscaps-build. Do not edit.\n\n");
    for (capability, enabled) in set.iter() {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "/// {}", capability.description());
        let _ = writeln!(out, "pub const {}: bool = {enabled};", capability.symbol());
    }
    out
}
