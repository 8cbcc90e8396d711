#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # Override Sources
//!
//! Collects the `(identifier, bool)` pairs that are layered on the default
//! capability table. Keys are kept as strings here; whether they name a real
//! capability is decided by [`CapabilitySet::construct`], so an unknown key
//! from any source fails the build with
//! [`ConfigError::UnknownCapability`](tlscaps_core::ConfigError::UnknownCapability).
//!
//! Later entries win. The usual layering is an override file checked into
//! the tree, then environment variables set by the person running the build:
//!
//! ```
//! use tlscaps_build::Overrides;
//!
//! let file = Overrides::from_json_str(r#"{"SERVER_ROLE": true}"#)?;
//! let env = Overrides::from_vars("TLSCAPS_", [("TLSCAPS_SERVER_ROLE", "off")])?;
//! let merged = file.merge(env);
//! assert_eq!(merged.get("SERVER_ROLE"), Some(false));
//! # Ok::<(), tlscaps_build::BuildError>(())
//! ```
//!
//! [`CapabilitySet::construct`]: tlscaps_core::CapabilitySet::construct

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;

use crate::error::{BuildError, Result};

/// Default prefix for override environment variables.
pub const DEFAULT_ENV_PREFIX: &str = "TLSCAPS_";

/// Ordered override entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    entries: Vec<(String, bool)>,
}

impl Overrides {
    /// No overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an override.
    #[must_use]
    pub fn with(mut self, identifier: impl Into<String>, enabled: bool) -> Self {
        self.entries.push((identifier.into(), enabled));
        self
    }

    /// Parse a JSON object mapping identifiers to booleans.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::OverrideFile`] when the text is not such an object.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::parse_json(json, Path::new("<inline>"))
    }

    /// Read a JSON override file.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Io`] if the file cannot be read and
    /// [`BuildError::OverrideFile`] if it does not parse.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        let overrides = Self::parse_json(&text, path)?;
        tracing::debug!(path = %path.display(), count = overrides.len(), "loaded override file");
        Ok(overrides)
    }

    fn parse_json(json: &str, path: &Path) -> Result<Self> {
        let map: BTreeMap<String, bool> = serde_json::from_str(json)
            .map_err(|source| BuildError::OverrideFile { path: path.to_path_buf(), source })?;
        Ok(Self { entries: map.into_iter().collect() })
    }

    /// Collect overrides from `(name, value)` variables carrying `prefix`.
    ///
    /// `TLSCAPS_SERVER_ROLE=1` becomes `("SERVER_ROLE", true)`. Variables
    /// without the prefix are ignored. Entries are sorted by name so the
    /// result does not depend on environment ordering.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidOverride`] for a value that is not a
    /// recognized boolean spelling.
    pub fn from_vars<I, K, V>(prefix: &str, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut entries = Vec::new();
        for (name, value) in vars {
            let name = name.as_ref();
            let Some(identifier) = name.strip_prefix(prefix) else {
                continue;
            };
            if identifier.is_empty() {
                continue;
            }
            let enabled = parse_bool(value.as_ref()).ok_or_else(|| BuildError::InvalidOverride {
                key: name.to_string(),
                value: value.as_ref().to_string(),
            })?;
            entries.push((identifier.to_string(), enabled));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(Self { entries })
    }

    /// Collect overrides from the process environment.
    ///
    /// Variables without the prefix are ignored whatever their encoding.
    ///
    /// # Errors
    ///
    /// See [`Overrides::from_vars`]. A prefixed variable whose name or
    /// value is not valid Unicode is also [`BuildError::InvalidOverride`].
    pub fn from_env(prefix: &str) -> Result<Self> {
        let overrides = Self::from_os_vars(prefix, std::env::vars_os())?;
        if !overrides.is_empty() {
            tracing::debug!(prefix, count = overrides.len(), "loaded environment overrides");
        }
        Ok(overrides)
    }

    fn from_os_vars<I>(prefix: &str, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut unicode = Vec::new();
        for (name, value) in vars {
            let raw = name.as_encoded_bytes();
            if !raw.starts_with(prefix.as_bytes()) || raw.len() == prefix.len() {
                continue;
            }
            match (name.to_str(), value.to_str()) {
                (Some(name), Some(value)) => unicode.push((name.to_string(), value.to_string())),
                _ => {
                    return Err(BuildError::InvalidOverride {
                        key: name.to_string_lossy().into_owned(),
                        value: value.to_string_lossy().into_owned(),
                    });
                }
            }
        }
        Self::from_vars(prefix, unicode)
    }

    /// Environment variable names a build script should watch for reruns.
    #[must_use]
    pub fn env_var_names(prefix: &str) -> Vec<String> {
        tlscaps_core::Capability::ALL
            .iter()
            .map(|c| format!("{prefix}{}", c.identifier()))
            .collect()
    }

    /// Append `later`'s entries after this one's, so they take precedence.
    #[must_use]
    pub fn merge(mut self, later: Overrides) -> Self {
        self.entries.extend(later.entries);
        self
    }

    /// Effective value for `identifier` after layering.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<bool> {
        self.entries.iter().rev().find(|(k, _)| k == identifier).map(|(_, v)| *v)
    }

    /// Number of entries, counting repeats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in application order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
