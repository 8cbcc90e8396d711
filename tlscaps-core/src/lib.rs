#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # tlscaps core
//!
//! Build-time capability configuration for a TLS library.
//!
//! A build selects which roles, cipher suites, key exchanges, signature
//! schemes and deployment options are compiled into the protocol and
//! crypto layers. This crate models that selection as an explicit value:
//!
//! - [`Capability`]: the fixed table of ten toggles, in canonical order
//! - [`Selection`]: raw values while overrides are being layered (unvalidated)
//! - [`CapabilitySet`]: the validated, immutable configuration for one build
//! - [`Invariant`]: the coherence rules a set must satisfy
//! - [`artifact`]: the persisted C header (`options.h`) codec
//!
//! ## Defaults
//!
//! | Identifier | Symbol | Default |
//! |---|---|---|
//! | `CLIENT_ROLE` | `HAVE_CLIENT` | on |
//! | `SERVER_ROLE` | `HAVE_SERVER` | off |
//! | `ERROR_STRINGS` | `HAVE_ERROR_STRINGS` | on |
//! | `CIPHER_AESGCM` | `HAVE_AESGCM` | on |
//! | `CIPHER_CHACHAPOLY` | `HAVE_CHACHAPOLY` | on |
//! | `PROTOCOL_TLS13` | `HAVE_TLS13` | on |
//! | `KEX_X25519` | `HAVE_X25519` | on |
//! | `KEX_ECDH` | `HAVE_ECDH` | on |
//! | `SIG_ECDSA` | `HAVE_ECDSA` | on |
//! | `EXCLUDE_SGX` | `NO_SGX` | on |
//!
//! ## Lifecycle
//!
//! ```text
//!  defaults + overrides ──► Selection ──validate──► CapabilitySet ──► options.h
//!                                                        ▲               │
//!                                                        └─ deserialize ◄┘
//! ```
//!
//! A changed selection produces a new set and a new artifact; a
//! `CapabilitySet` is never mutated.
//!
//! ## Example
//!
//! ```
//! use tlscaps_core::{CapabilitySet, ConfigError, Selection};
//!
//! let err = CapabilitySet::construct(
//!     &Selection::defaults(),
//!     [("CLIENT_ROLE", false), ("SERVER_ROLE", false)],
//! )
//! .unwrap_err();
//! assert!(matches!(err, ConfigError::ConflictingSelection { .. }));
//! ```

pub mod artifact;
pub mod capability;
pub mod error;
pub mod invariant;
pub mod selection;
pub mod set;

pub use artifact::ArtifactFormat;
pub use capability::{CAPABILITY_COUNT, Capability};
pub use error::{ConfigError, ErrorCode, Result};
pub use invariant::Invariant;
pub use selection::Selection;
pub use set::CapabilitySet;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
