#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # Validated Capability Set
//!
//! [`CapabilitySet`] is the only form of the configuration that consumers
//! see. Every constructor validates, and no method hands out mutable
//! access, so holding a `CapabilitySet` means holding a coherent build
//! configuration.
//!
//! ```
//! use tlscaps_core::{Capability, CapabilitySet, Selection};
//!
//! let set = CapabilitySet::construct(&Selection::defaults(), [("SERVER_ROLE", true)])?;
//! assert!(set.enabled(Capability::ServerRole));
//! assert!(set.is_enabled("CLIENT_ROLE")?);
//!
//! let bytes = set.serialize();
//! assert_eq!(CapabilitySet::deserialize(&bytes)?, set);
//! # Ok::<(), tlscaps_core::ConfigError>(())
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::artifact::{self, ArtifactFormat};
use crate::capability::Capability;
use crate::error::{ConfigError, Result};
use crate::selection::Selection;

/// The full, validated mapping of capabilities for one build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilitySet {
    selection: Selection,
}

impl Default for CapabilitySet {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl CapabilitySet {
    /// The set obtained with no overrides at all.
    #[must_use]
    pub const fn with_defaults() -> Self {
        // The default table satisfies every invariant; `test_defaults_are_valid` pins this.
        Self { selection: Selection::defaults() }
    }

    /// Resolve `overrides` on top of `defaults` and validate the result.
    ///
    /// Override keys are capability identifiers such as `"SERVER_ROLE"`.
    /// When a key repeats, the last value wins.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnknownCapability`] if any key is not recognized.
    /// - [`ConfigError::ConflictingSelection`] if the resolved values
    ///   violate an invariant.
    pub fn construct<I, K>(defaults: &Selection, overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, bool)>,
        K: AsRef<str>,
    {
        let span = tracing::debug_span!("construct_capability_set");
        let _enter = span.enter();

        let mut selection = *defaults;
        selection.apply_overrides(overrides).inspect_err(|e| {
            tracing::warn!(error = %e, "rejected capability override");
        })?;
        Self::from_selection(selection)
    }

    /// Validate an already-resolved selection.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConflictingSelection`] naming the first
    /// violated invariant.
    pub fn from_selection(selection: Selection) -> Result<Self> {
        match selection.validate() {
            Ok(()) => {
                let set = Self { selection };
                tracing::debug!(capabilities = %set, "capability set validated");
                Ok(set)
            }
            Err(e) => {
                tracing::warn!(error = %e, "capability selection rejected");
                Err(e)
            }
        }
    }

    /// Re-check every invariant.
    ///
    /// Always succeeds for a set produced by this crate; kept as a
    /// standalone gate for callers that want an explicit check before
    /// compiling dependent code.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConflictingSelection`] on the first violation.
    pub fn validate(&self) -> Result<()> {
        self.selection.validate()
    }

    /// Query a capability by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCapability`] for an unrecognized identifier.
    pub fn is_enabled(&self, identifier: &str) -> Result<bool> {
        Capability::from_identifier(identifier).map(|c| self.enabled(c))
    }

    /// Query a capability by value.
    #[must_use]
    #[inline]
    pub const fn enabled(&self, capability: Capability) -> bool {
        self.selection.get(capability)
    }

    /// Raw values backing this set.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// `(capability, value)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (Capability, bool)> + '_ {
        self.selection.iter()
    }

    /// Enabled capabilities in table order.
    pub fn enabled_capabilities(&self) -> impl Iterator<Item = Capability> + '_ {
        self.iter().filter_map(|(c, on)| on.then_some(c))
    }

    /// Canonical header bytes using [`ArtifactFormat::default`].
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        self.serialize_with(&ArtifactFormat::default())
    }

    /// Header bytes using a custom layout.
    #[must_use]
    pub fn serialize_with(&self, format: &ArtifactFormat) -> Vec<u8> {
        format.render(&self.selection)
    }

    /// Load a set from header bytes and validate it.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MalformedArtifact`] for unparseable input.
    /// - [`ConfigError::UnknownCapability`] for an unrecognized directive.
    /// - [`ConfigError::ConflictingSelection`] if the stored values are incoherent.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let span = tracing::debug_span!("deserialize_capability_set", len = bytes.len());
        let _enter = span.enter();

        let selection = artifact::parse(bytes).inspect_err(|e| {
            tracing::warn!(error = %e, code = %e.code(), "capability artifact rejected");
        })?;
        Self::from_selection(selection)
    }

    /// Human-readable report of the enabled capabilities.
    #[must_use]
    pub fn summary(&self) -> String {
        let enabled: Vec<&str> = self.enabled_capabilities().map(Capability::identifier).collect();
        let disabled = self.iter().filter(|(_, on)| !on).count();
        format!(
            "TLS capabilities: {} enabled [{}], {} disabled",
            enabled.len(),
            enabled.join(", "),
            disabled
        )
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (capability, on) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{}={}", capability.identifier(), if on { "on" } else { "off" })?;
        }
        Ok(())
    }
}

impl Serialize for CapabilitySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Capability::ALL.len()))?;
        for (capability, on) in self.iter() {
            map.serialize_entry(capability.identifier(), &on)?;
        }
        map.end()
    }
}

/// Missing entries take their default; the result is validated like
/// [`CapabilitySet::construct`].
impl<'de> Deserialize<'de> for CapabilitySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let entries = BTreeMap::<String, bool>::deserialize(deserializer)?;
        CapabilitySet::construct(&Selection::defaults(), entries)
            .map_err(|e: ConfigError| serde::de::Error::custom(e))
    }
}
