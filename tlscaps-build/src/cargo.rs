#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Cargo build-script directives.
//!
//! Rust consumers gate code on `#[cfg(tlscaps_have_server)]` and friends.
//! Every capability is declared through `rustc-check-cfg` so a disabled
//! one does not trip the `unexpected_cfgs` lint; only enabled ones are set.

use std::io::{self, Write};

use tlscaps_core::{Capability, CapabilitySet};

/// Prefix of every cfg name.
pub const CFG_PREFIX: &str = "tlscaps_";

/// cfg name for `capability`, e.g. `tlscaps_have_client` or `tlscaps_no_sgx`.
#[must_use]
pub fn cfg_name(capability: Capability) -> String {
    format!("{CFG_PREFIX}{}", capability.symbol().to_ascii_lowercase())
}

/// Write check-cfg declarations and cfg flags for `set` to `out`.
///
/// # Errors
///
/// Propagates write failures from `out`.
pub fn emit_cargo_directives<W: Write>(set: &CapabilitySet, out: &mut W) -> io::Result<()> {
    for capability in Capability::ALL {
        writeln!(out, "cargo::rustc-check-cfg=cfg({})", cfg_name(capability))?;
    }
    for capability in set.enabled_capabilities() {
        writeln!(out, "cargo::rustc-cfg={}", cfg_name(capability))?;
    }
    Ok(())
}

/// Rerun directives for the override sources a build script reads.
///
/// # Errors
///
/// Propagates write failures from `out`.
pub fn emit_rerun_directives<W: Write>(
    env_vars: &[String],
    files: &[&std::path::Path],
    out: &mut W,
) -> io::Result<()> {
    for var in env_vars {
        writeln!(out, "cargo::rerun-if-env-changed={var}")?;
    }
    for file in files {
        writeln!(out, "cargo::rerun-if-changed={}", file.display())?;
    }
    Ok(())
}
