#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Coherence rules a resolved selection must satisfy.
//!
//! Rules are checked in declaration order and the first violation wins.
//! Both roles enabled at once is allowed, and `EXCLUDE_SGX` has no
//! dependency on any other capability.

use std::fmt;

use crate::capability::Capability;
use crate::selection::Selection;

/// A named coherence invariant over the capability table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Invariant {
    /// At least one of `CLIENT_ROLE`, `SERVER_ROLE` must be enabled.
    RoleRequired,
    /// `PROTOCOL_TLS13` needs at least one of `KEX_X25519`, `KEX_ECDH`.
    Tls13RequiresKeyExchange,
}

impl Invariant {
    /// All invariants in evaluation order.
    pub const ALL: [Invariant; 2] = [Invariant::RoleRequired, Invariant::Tls13RequiresKeyExchange];

    /// Whether `selection` satisfies this rule.
    #[must_use]
    pub fn holds(self, selection: &Selection) -> bool {
        match self {
            Invariant::RoleRequired => {
                selection.get(Capability::ClientRole) || selection.get(Capability::ServerRole)
            }
            Invariant::Tls13RequiresKeyExchange => {
                !selection.get(Capability::ProtocolTls13)
                    || selection.get(Capability::KexX25519)
                    || selection.get(Capability::KexEcdh)
            }
        }
    }

    /// Capabilities the rule reads.
    #[must_use]
    pub fn involves(self) -> &'static [Capability] {
        match self {
            Invariant::RoleRequired => &[Capability::ClientRole, Capability::ServerRole],
            Invariant::Tls13RequiresKeyExchange => {
                &[Capability::ProtocolTls13, Capability::KexX25519, Capability::KexEcdh]
            }
        }
    }

    /// First violated invariant, if any.
    #[must_use]
    pub fn first_violation(selection: &Selection) -> Option<Invariant> {
        Invariant::ALL.into_iter().find(|inv| !inv.holds(selection))
    }
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invariant::RoleRequired => {
                write!(f, "at least one of CLIENT_ROLE or SERVER_ROLE must be enabled")
            }
            Invariant::Tls13RequiresKeyExchange => write!(
                f,
                "PROTOCOL_TLS13 requires at least one of KEX_X25519 or KEX_ECDH to be enabled"
            ),
        }
    }
}
