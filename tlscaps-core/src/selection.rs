#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Unvalidated capability values.
//!
//! A [`Selection`] is the raw, editable mapping used while layering
//! overrides on defaults. It becomes a [`CapabilitySet`](crate::CapabilitySet)
//! only after validation.

use crate::capability::{CAPABILITY_COUNT, Capability};
use crate::error::{ConfigError, Result};
use crate::invariant::Invariant;

/// Raw capability values, one per table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    values: [bool; CAPABILITY_COUNT],
}

impl Default for Selection {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Selection {
    /// The default table values (everything but `SERVER_ROLE` enabled).
    #[must_use]
    pub const fn defaults() -> Self {
        let mut values = [false; CAPABILITY_COUNT];
        let mut i = 0;
        while i < CAPABILITY_COUNT {
            values[i] = Capability::ALL[i].default_enabled();
            i += 1;
        }
        Self { values }
    }

    /// Every capability disabled. Useful as a base for artifact parsing.
    #[must_use]
    pub const fn none() -> Self {
        Self { values: [false; CAPABILITY_COUNT] }
    }

    /// Current value of `capability`.
    #[must_use]
    pub const fn get(&self, capability: Capability) -> bool {
        self.values[capability.index()]
    }

    /// Set `capability` to `enabled`.
    pub fn set(&mut self, capability: Capability, enabled: bool) {
        self.values[capability.index()] = enabled;
    }

    /// Builder form of [`Selection::set`].
    #[must_use]
    pub fn with(mut self, capability: Capability, enabled: bool) -> Self {
        self.set(capability, enabled);
        self
    }

    /// Apply string-keyed overrides in iteration order; later entries win.
    ///
    /// All keys are resolved before any value is written, so an unknown
    /// key leaves the selection untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCapability`] for the first unrecognized key.
    pub fn apply_overrides<I, K>(&mut self, overrides: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, bool)>,
        K: AsRef<str>,
    {
        let resolved = overrides
            .into_iter()
            .map(|(key, enabled)| Capability::from_identifier(key.as_ref()).map(|c| (c, enabled)))
            .collect::<Result<Vec<_>>>()?;

        for (capability, enabled) in resolved {
            tracing::trace!(capability = %capability, enabled, "applying override");
            self.set(capability, enabled);
        }
        Ok(())
    }

    /// Check every invariant, failing on the first violation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConflictingSelection`] naming the violated invariant.
    pub fn validate(&self) -> Result<()> {
        match Invariant::first_violation(self) {
            Some(invariant) => Err(ConfigError::from(invariant)),
            None => Ok(()),
        }
    }

    /// `(capability, value)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (Capability, bool)> + '_ {
        Capability::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}
