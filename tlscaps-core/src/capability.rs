#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # Capability Table
//!
//! The fixed table of compile-time toggles. Declaration order is the
//! canonical order used for serialization, iteration and generated code,
//! and each variant's discriminant is its index into a [`Selection`](crate::Selection).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of recognized capabilities.
pub const CAPABILITY_COUNT: usize = 10;

/// A named boolean feature toggle controlling compiled-in functionality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Capability {
    /// Library may act as a TLS client.
    ClientRole = 0,
    /// Library may act as a TLS server.
    ServerRole = 1,
    /// Human-readable error descriptions are compiled in.
    ErrorStrings = 2,
    /// AES-GCM cipher suites are available.
    CipherAesGcm = 3,
    /// ChaCha20-Poly1305 cipher suites are available.
    CipherChaChaPoly = 4,
    /// TLS 1.3 handshake support is compiled in.
    ProtocolTls13 = 5,
    /// X25519 key exchange is available.
    KexX25519 = 6,
    /// Generic ECDH key exchange is available.
    KexEcdh = 7,
    /// ECDSA signing and verification are available.
    SigEcdsa = 8,
    /// SGX-specific code paths are excluded.
    ExcludeSgx = 9,
}

impl Capability {
    /// Every capability in canonical table order.
    pub const ALL: [Capability; CAPABILITY_COUNT] = [
        Capability::ClientRole,
        Capability::ServerRole,
        Capability::ErrorStrings,
        Capability::CipherAesGcm,
        Capability::CipherChaChaPoly,
        Capability::ProtocolTls13,
        Capability::KexX25519,
        Capability::KexEcdh,
        Capability::SigEcdsa,
        Capability::ExcludeSgx,
    ];

    /// Position in the canonical table.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Identifier used in overrides and queries, e.g. `CLIENT_ROLE`.
    #[must_use]
    pub const fn identifier(self) -> &'static str {
        match self {
            Capability::ClientRole => "CLIENT_ROLE",
            Capability::ServerRole => "SERVER_ROLE",
            Capability::ErrorStrings => "ERROR_STRINGS",
            Capability::CipherAesGcm => "CIPHER_AESGCM",
            Capability::CipherChaChaPoly => "CIPHER_CHACHAPOLY",
            Capability::ProtocolTls13 => "PROTOCOL_TLS13",
            Capability::KexX25519 => "KEX_X25519",
            Capability::KexEcdh => "KEX_ECDH",
            Capability::SigEcdsa => "SIG_ECDSA",
            Capability::ExcludeSgx => "EXCLUDE_SGX",
        }
    }

    /// Preprocessor symbol written to the artifact, e.g. `HAVE_CLIENT`.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Capability::ClientRole => "HAVE_CLIENT",
            Capability::ServerRole => "HAVE_SERVER",
            Capability::ErrorStrings => "HAVE_ERROR_STRINGS",
            Capability::CipherAesGcm => "HAVE_AESGCM",
            Capability::CipherChaChaPoly => "HAVE_CHACHAPOLY",
            Capability::ProtocolTls13 => "HAVE_TLS13",
            Capability::KexX25519 => "HAVE_X25519",
            Capability::KexEcdh => "HAVE_ECDH",
            Capability::SigEcdsa => "HAVE_ECDSA",
            Capability::ExcludeSgx => "NO_SGX",
        }
    }

    /// Value used when no override is supplied.
    #[must_use]
    pub const fn default_enabled(self) -> bool {
        !matches!(self, Capability::ServerRole)
    }

    /// One-line description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Capability::ClientRole => "library may act as TLS client",
            Capability::ServerRole => "library may act as TLS server",
            Capability::ErrorStrings => "human-readable error descriptions compiled in",
            Capability::CipherAesGcm => "AES-GCM cipher suite available",
            Capability::CipherChaChaPoly => "ChaCha20-Poly1305 cipher suite available",
            Capability::ProtocolTls13 => "TLS 1.3 handshake support compiled in",
            Capability::KexX25519 => "X25519 key exchange available",
            Capability::KexEcdh => "generic ECDH key exchange available",
            Capability::SigEcdsa => "ECDSA signature verification/signing available",
            Capability::ExcludeSgx => "SGX specific code paths excluded",
        }
    }

    /// Look up a capability by identifier (exact, case-sensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCapability`] for anything outside the table.
    pub fn from_identifier(identifier: &str) -> Result<Self, ConfigError> {
        let capability = match identifier {
            "CLIENT_ROLE" => Capability::ClientRole,
            "SERVER_ROLE" => Capability::ServerRole,
            "ERROR_STRINGS" => Capability::ErrorStrings,
            "CIPHER_AESGCM" => Capability::CipherAesGcm,
            "CIPHER_CHACHAPOLY" => Capability::CipherChaChaPoly,
            "PROTOCOL_TLS13" => Capability::ProtocolTls13,
            "KEX_X25519" => Capability::KexX25519,
            "KEX_ECDH" => Capability::KexEcdh,
            "SIG_ECDSA" => Capability::SigEcdsa,
            "EXCLUDE_SGX" => Capability::ExcludeSgx,
            other => return Err(ConfigError::unknown(other)),
        };
        Ok(capability)
    }

    /// Look up a capability by its artifact symbol.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCapability`] for an unrecognized symbol.
    pub fn from_symbol(symbol: &str) -> Result<Self, ConfigError> {
        Capability::ALL
            .into_iter()
            .find(|c| c.symbol() == symbol)
            .ok_or_else(|| ConfigError::unknown(symbol))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for Capability {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::from_identifier(s)
    }
}

impl From<Capability> for &'static str {
    fn from(capability: Capability) -> Self {
        capability.identifier()
    }
}

impl TryFrom<String> for Capability {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Capability::from_identifier(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_discriminants() {
        for (i, capability) in Capability::ALL.iter().enumerate() {
            assert_eq!(capability.index(), i);
        }
    }

    #[test]
    fn test_only_server_role_defaults_off() {
        let disabled: Vec<_> =
            Capability::ALL.into_iter().filter(|c| !c.default_enabled()).collect();
        assert_eq!(disabled, vec![Capability::ServerRole]);
    }

    #[test]
    fn test_identifier_round_trip() {
        for capability in Capability::ALL {
            assert_eq!(Capability::from_identifier(capability.identifier()), Ok(capability));
            assert_eq!(Capability::from_symbol(capability.symbol()), Ok(capability));
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(Capability::from_identifier("client_role").is_err());
        assert!("HAVE_CLIENT".parse::<Capability>().is_err());
        assert!(Capability::from_symbol("CLIENT_ROLE").is_err());
    }

    #[test]
    fn test_symbols_are_unique() {
        let mut symbols: Vec<_> = Capability::ALL.iter().map(|c| c.symbol()).collect();
        symbols.sort_unstable();
        symbols.dedup();
        assert_eq!(symbols.len(), CAPABILITY_COUNT);
    }
}
