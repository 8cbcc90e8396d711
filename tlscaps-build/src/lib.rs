#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # tlscaps-build
//!
//! Build-time generation of the TLS capability header.
//!
//! The header is produced once per build from the default capability table
//! plus overrides, and is then consumed read-only by C sources
//! (`#include "options.h"`) and by Rust code through cfg flags or a
//! generated constants module. A conflicting or unknown override fails the
//! build step before anything is written.
//!
//! ## Sources of overrides
//!
//! | Source | Constructor |
//! |--------|-------------|
//! | JSON file (`{"SERVER_ROLE": true}`) | [`Overrides::from_json_file`] |
//! | Environment (`TLSCAPS_SERVER_ROLE=1`) | [`Overrides::from_env`] |
//! | Code | [`Overrides::with`] |
//!
//! Layer them with [`Overrides::merge`]; later entries win.
//!
//! ## Example
//!
//! ```no_run
//! use tlscaps_build::{
//!     DEFAULT_ENV_PREFIX, Generator, Overrides, emit_cargo_directives, emit_rerun_directives,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let out_dir = std::path::PathBuf::from(std::env::var("OUT_DIR")?);
//!     let file = std::path::Path::new("tlscaps.json");
//!
//!     let overrides = Overrides::from_json_file(file)?
//!         .merge(Overrides::from_env(DEFAULT_ENV_PREFIX)?);
//!     let generated = Generator::new(out_dir.join("options.h")).overrides(overrides).generate()?;
//!
//!     let mut stdout = std::io::stdout();
//!     emit_cargo_directives(&generated.set, &mut stdout)?;
//!     emit_rerun_directives(&Overrides::env_var_names(DEFAULT_ENV_PREFIX), &[file], &mut stdout)?;
//!     Ok(())
//! }
//! ```

pub mod cargo;
pub mod error;
pub mod generator;
pub mod logging;
pub mod overrides;
pub mod rust_module;

pub use cargo::{cfg_name, emit_cargo_directives, emit_rerun_directives};
pub use error::{BuildError, Result};
pub use generator::{Generated, Generator, load_artifact};
pub use overrides::{DEFAULT_ENV_PREFIX, Overrides};
pub use rust_module::render_rust_module;

pub use tlscaps_core::{ArtifactFormat, Capability, CapabilitySet, ConfigError, Selection};
