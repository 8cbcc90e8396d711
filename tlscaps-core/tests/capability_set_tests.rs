#![deny(unsafe_code)]
// Test files use unwrap() and panic for assertions
#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

//! Construction, validation and query behavior of `CapabilitySet`.

use tlscaps_core::{Capability, CapabilitySet, ConfigError, ErrorCode, Invariant, Selection};

fn construct(overrides: &[(&str, bool)]) -> Result<CapabilitySet, ConfigError> {
    CapabilitySet::construct(&Selection::defaults(), overrides.iter().copied())
}

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn test_no_overrides_reproduces_defaults() {
    let set = construct(&[]).unwrap();
    for capability in Capability::ALL {
        assert_eq!(
            set.is_enabled(capability.identifier()).unwrap(),
            capability.default_enabled(),
            "{capability}"
        );
    }
}

#[test]
fn test_default_values_by_identifier() {
    let set = CapabilitySet::default();
    let expected = [
        ("CLIENT_ROLE", true),
        ("SERVER_ROLE", false),
        ("ERROR_STRINGS", true),
        ("CIPHER_AESGCM", true),
        ("CIPHER_CHACHAPOLY", true),
        ("PROTOCOL_TLS13", true),
        ("KEX_X25519", true),
        ("KEX_ECDH", true),
        ("SIG_ECDSA", true),
        ("EXCLUDE_SGX", true),
    ];
    for (identifier, value) in expected {
        assert_eq!(set.is_enabled(identifier), Ok(value), "{identifier}");
    }
}

// ============================================================================
// Overrides
// ============================================================================

#[test]
fn test_override_applies() {
    let set = construct(&[("SERVER_ROLE", true), ("ERROR_STRINGS", false)]).unwrap();
    assert!(set.enabled(Capability::ServerRole));
    assert!(!set.enabled(Capability::ErrorStrings));
    assert!(set.enabled(Capability::ClientRole));
}

#[test]
fn test_override_with_owned_keys() {
    let overrides = vec![("SIG_ECDSA".to_string(), false)];
    let set = CapabilitySet::construct(&Selection::defaults(), overrides).unwrap();
    assert!(!set.enabled(Capability::SigEcdsa));
}

#[test]
fn test_custom_defaults_are_respected() {
    let defaults = Selection::defaults().with(Capability::ServerRole, true);
    let set = CapabilitySet::construct(&defaults, [("CLIENT_ROLE", false)]).unwrap();
    assert!(set.enabled(Capability::ServerRole));
    assert!(!set.enabled(Capability::ClientRole));
}

#[test]
fn test_unknown_override_key() {
    let err = construct(&[("NOT_A_REAL_FLAG", true)]).unwrap_err();
    assert_eq!(err, ConfigError::UnknownCapability { identifier: "NOT_A_REAL_FLAG".into() });
    assert_eq!(err.code(), ErrorCode::UnknownCapability);
}

#[test]
fn test_unknown_key_reported_before_conflict() {
    let err = construct(&[("CLIENT_ROLE", false), ("NOT_A_REAL_FLAG", true)]).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownCapability { .. }));
}

#[test]
fn test_artifact_symbol_is_not_an_identifier() {
    let err = construct(&[("HAVE_SERVER", true)]).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownCapability { .. }));
}

// ============================================================================
// Invariants
// ============================================================================

#[test]
fn test_no_role_is_conflicting() {
    let err = construct(&[("CLIENT_ROLE", false), ("SERVER_ROLE", false)]).unwrap_err();
    assert_eq!(err, ConfigError::ConflictingSelection { invariant: Invariant::RoleRequired });
}

#[test]
fn test_tls13_without_key_exchange_is_conflicting() {
    let err = construct(&[("PROTOCOL_TLS13", true), ("KEX_X25519", false), ("KEX_ECDH", false)])
        .unwrap_err();
    assert_eq!(
        err,
        ConfigError::ConflictingSelection { invariant: Invariant::Tls13RequiresKeyExchange }
    );
}

#[test]
fn test_no_key_exchange_without_tls13_is_allowed() {
    let set = construct(&[("PROTOCOL_TLS13", false), ("KEX_X25519", false), ("KEX_ECDH", false)])
        .unwrap();
    assert!(!set.enabled(Capability::ProtocolTls13));
}

#[test]
fn test_dual_role_is_allowed() {
    let set = construct(&[("CLIENT_ROLE", true), ("SERVER_ROLE", true)]).unwrap();
    assert!(set.enabled(Capability::ClientRole) && set.enabled(Capability::ServerRole));
}

#[test]
fn test_server_only_is_allowed() {
    let set = construct(&[("CLIENT_ROLE", false), ("SERVER_ROLE", true)]).unwrap();
    assert_eq!(set.enabled_capabilities().next(), Some(Capability::ServerRole));
}

#[test]
fn test_exclude_sgx_is_independent() {
    for value in [true, false] {
        let set = construct(&[("EXCLUDE_SGX", value)]).unwrap();
        assert_eq!(set.enabled(Capability::ExcludeSgx), value);
    }
}

#[test]
fn test_first_violation_wins() {
    let err = construct(&[
        ("CLIENT_ROLE", false),
        ("SERVER_ROLE", false),
        ("KEX_X25519", false),
        ("KEX_ECDH", false),
    ])
    .unwrap_err();
    assert_eq!(err, ConfigError::ConflictingSelection { invariant: Invariant::RoleRequired });
}

#[test]
fn test_validate_on_constructed_set() {
    let set = construct(&[("SERVER_ROLE", true)]).unwrap();
    assert!(set.validate().is_ok());
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_is_enabled_total_over_table() {
    let set = construct(&[("SERVER_ROLE", true), ("KEX_ECDH", false)]).unwrap();
    for capability in Capability::ALL {
        assert!(set.is_enabled(capability.identifier()).is_ok());
    }
}

#[test]
fn test_is_enabled_unknown() {
    let set = CapabilitySet::default();
    assert!(matches!(set.is_enabled(""), Err(ConfigError::UnknownCapability { .. })));
    assert!(matches!(set.is_enabled("kex_ecdh"), Err(ConfigError::UnknownCapability { .. })));
}

#[test]
fn test_enabled_capabilities_in_table_order() {
    let set = construct(&[("SERVER_ROLE", true), ("CIPHER_AESGCM", false)]).unwrap();
    let enabled: Vec<_> = set.enabled_capabilities().collect();
    assert_eq!(enabled.first(), Some(&Capability::ClientRole));
    assert_eq!(enabled.get(1), Some(&Capability::ServerRole));
    assert!(!enabled.contains(&Capability::CipherAesGcm));
    assert_eq!(enabled.len(), 9);
}

// ============================================================================
// serde
// ============================================================================

#[test]
fn test_json_is_ordered_identifier_map() {
    let json = serde_json::to_string(&CapabilitySet::default()).unwrap();
    assert!(json.starts_with(r#"{"CLIENT_ROLE":true,"SERVER_ROLE":false,"#));
    assert!(json.ends_with(r#""EXCLUDE_SGX":true}"#));
}

#[test]
fn test_json_partial_map_uses_defaults() {
    let set: CapabilitySet = serde_json::from_str(r#"{"SERVER_ROLE": true}"#).unwrap();
    assert!(set.enabled(Capability::ServerRole));
    assert!(set.enabled(Capability::ClientRole));
}

#[test]
fn test_json_rejects_unknown_and_conflicting() {
    let unknown = serde_json::from_str::<CapabilitySet>(r#"{"BOGUS": true}"#).unwrap_err();
    assert!(unknown.to_string().contains("unknown capability `BOGUS`"));

    let conflict = serde_json::from_str::<CapabilitySet>(
        r#"{"CLIENT_ROLE": false, "SERVER_ROLE": false}"#,
    )
    .unwrap_err();
    assert!(conflict.to_string().contains("conflicting capability selection"));
}

#[test]
fn test_capability_serde_uses_identifier() {
    assert_eq!(serde_json::to_string(&Capability::KexX25519).unwrap(), r#""KEX_X25519""#);
    let parsed: Capability = serde_json::from_str(r#""SIG_ECDSA""#).unwrap();
    assert_eq!(parsed, Capability::SigEcdsa);
    assert!(serde_json::from_str::<Capability>(r#""HAVE_ECDSA""#).is_err());
}
