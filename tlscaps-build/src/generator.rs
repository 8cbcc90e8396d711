#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # Artifact Generation
//!
//! Turns an override mapping into the persisted header, failing the build
//! step on any configuration error. Files are only rewritten when their
//! content changes, so an unchanged selection does not invalidate the
//! dependents' build caches. Changed outputs are staged beside their
//! targets and renamed into place only once all of them are written.
//!
//! A typical `build.rs`:
//!
//! ```no_run
//! use std::path::PathBuf;
//! use tlscaps_build::{Generator, Overrides, emit_cargo_directives};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
//!     let overrides = Overrides::from_env(tlscaps_build::DEFAULT_ENV_PREFIX)?;
//!
//!     let generated = Generator::new(out_dir.join("options.h"))
//!         .overrides(overrides)
//!         .rust_module(out_dir.join("capabilities.rs"))
//!         .generate()?;
//!
//!     emit_cargo_directives(&generated.set, &mut std::io::stdout())?;
//!     Ok(())
//! }
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tlscaps_core::{ArtifactFormat, CapabilitySet, Selection};

use crate::error::{BuildError, Result};
use crate::logging::StepSpan;
use crate::overrides::Overrides;
use crate::rust_module::render_rust_module;

/// Outcome of a successful [`Generator::generate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    /// The validated set that was written.
    pub set: CapabilitySet,
    /// Where the header lives.
    pub artifact_path: PathBuf,
    /// Whether the header file was (re)written.
    pub changed: bool,
}

/// Builder for one generation step
#[derive(Debug, Clone)]
pub struct Generator {
    artifact_path: PathBuf,
    defaults: Selection,
    overrides: Overrides,
    format: ArtifactFormat,
    rust_module_path: Option<PathBuf>,
}

impl Generator {
    /// Generate the header at `artifact_path` from the default table.
    #[must_use]
    pub fn new(artifact_path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: artifact_path.into(),
            defaults: Selection::defaults(),
            overrides: Overrides::new(),
            format: ArtifactFormat::default(),
            rust_module_path: None,
        }
    }

    /// Replace the base values overrides are layered on.
    #[must_use]
    pub fn defaults(mut self, defaults: Selection) -> Self {
        self.defaults = defaults;
        self
    }

    /// Set the overrides to apply.
    #[must_use]
    pub fn overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Set the header layout.
    #[must_use]
    pub fn format(mut self, format: ArtifactFormat) -> Self {
        self.format = format;
        self
    }

    /// Also write Rust constants to `path`.
    #[must_use]
    pub fn rust_module(mut self, path: impl Into<PathBuf>) -> Self {
        self.rust_module_path = Some(path.into());
        self
    }

    /// Resolve, validate and write.
    ///
    /// Nothing is written unless the whole selection is valid.
    ///
    /// # Errors
    ///
    /// - [`BuildError::Config`] for unknown override keys, conflicting
    ///   selections or an invalid header layout.
    /// - [`BuildError::Io`] if a file cannot be read or written.
    pub fn generate(&self) -> Result<Generated> {
        let span = StepSpan::generate(&self.artifact_path);
        match self.generate_inner() {
            Ok(generated) => {
                span.complete(&generated.set.summary());
                Ok(generated)
            }
            Err(e) => {
                span.error(&e);
                Err(e)
            }
        }
    }

    fn generate_inner(&self) -> Result<Generated> {
        self.format.validate()?;
        let set = CapabilitySet::construct(&self.defaults, self.overrides.iter())?;

        let mut outputs = vec![(self.artifact_path.as_path(), set.serialize_with(&self.format))];
        if let Some(path) = &self.rust_module_path {
            outputs.push((path.as_path(), render_rust_module(&set).into_bytes()));
        }

        let staged = stage_changed(&outputs)?;
        let changed = staged.iter().any(|s| s.target == self.artifact_path);
        commit(staged)?;

        tracing::debug!(changed, path = %self.artifact_path.display(), "capability header written");
        Ok(Generated { set, artifact_path: self.artifact_path.clone(), changed })
    }
}

/// Read and validate a previously generated header.
///
/// # Errors
///
/// - [`BuildError::Io`] if the file cannot be read.
/// - [`BuildError::Config`] if it is malformed, names an unknown
///   capability or holds an incoherent selection.
pub fn load_artifact(path: impl AsRef<Path>) -> Result<CapabilitySet> {
    let path = path.as_ref();
    let span = StepSpan::load(path);
    let result = std::fs::read(path)
        .map_err(|e| BuildError::io(path, e))
        .and_then(|bytes| CapabilitySet::deserialize(&bytes).map_err(BuildError::from));
    match &result {
        Ok(set) => span.complete(&set.summary()),
        Err(e) => span.error(e),
    }
    result
}

/// A changed output written next to its target, waiting to be renamed.
#[derive(Debug)]
struct Staged {
    target: PathBuf,
    temp: PathBuf,
}

fn temp_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(target.file_name().unwrap_or_default());
    name.push(".tmp");
    target.with_file_name(name)
}

/// Stage every output whose bytes differ from the file on disk.
///
/// On failure the outputs staged so far are removed, leaving every target
/// untouched.
fn stage_changed(outputs: &[(&Path, Vec<u8>)]) -> Result<Vec<Staged>> {
    let mut staged = Vec::new();
    for (target, contents) in outputs {
        match stage_one(target, contents) {
            Ok(Some(s)) => staged.push(s),
            Ok(None) => {}
            Err(e) => {
                discard(&staged);
                return Err(e);
            }
        }
    }
    Ok(staged)
}

fn stage_one(target: &Path, contents: &[u8]) -> Result<Option<Staged>> {
    match std::fs::read(target) {
        Ok(existing) if existing == contents => return Ok(None),
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(BuildError::io(target, e)),
    }
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }
    let temp = temp_path(target);
    std::fs::write(&temp, contents).map_err(|e| BuildError::io(&temp, e))?;
    Ok(Some(Staged { target: target.to_path_buf(), temp }))
}

fn commit(staged: Vec<Staged>) -> Result<()> {
    for (i, s) in staged.iter().enumerate() {
        if let Err(e) = std::fs::rename(&s.temp, &s.target) {
            discard(&staged[i..]);
            return Err(BuildError::io(&s.target, e));
        }
    }
    Ok(())
}

fn discard(staged: &[Staged]) {
    for s in staged {
        if let Err(e) = std::fs::remove_file(&s.temp) {
            tracing::warn!(path = %s.temp.display(), error = %e, "could not remove staged output");
        }
    }
}
