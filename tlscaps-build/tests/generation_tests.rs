#![deny(unsafe_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

//! Generation and loading against a real filesystem.

use std::fs;

use tempfile::TempDir;
use tlscaps_build::{
    ArtifactFormat, BuildError, Capability, Generator, Overrides, load_artifact,
};
use tlscaps_core::{ConfigError, Invariant};

const REFERENCE: &[u8] = include_bytes!("../../tlscaps-core/tests/data/default_options.h");

// ============================================================================
// Generation
// ============================================================================

#[test]
fn test_generate_defaults_matches_reference() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("options.h");

    let generated = Generator::new(&path).generate().unwrap();

    assert!(generated.changed);
    assert_eq!(generated.artifact_path, path);
    assert_eq!(fs::read(&path).unwrap(), REFERENCE);
    assert!(!generated.set.enabled(Capability::ServerRole));
}

#[test]
fn test_generate_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("include/mesalink/options.h");

    Generator::new(&path).generate().unwrap();
    assert!(path.exists());
}

#[test]
fn test_unchanged_artifact_is_not_rewritten() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("options.h");
    let generator = Generator::new(&path).overrides(Overrides::new().with("SERVER_ROLE", true));

    assert!(generator.generate().unwrap().changed);
    assert!(!generator.generate().unwrap().changed);

    let flipped = Generator::new(&path).generate().unwrap();
    assert!(flipped.changed);
    assert_eq!(fs::read(&path).unwrap(), REFERENCE);
}

#[test]
fn test_generate_with_overrides() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("options.h");

    let overrides = Overrides::new().with("SERVER_ROLE", true).with("CIPHER_AESGCM", false);
    Generator::new(&path).overrides(overrides).generate().unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("#undef  HAVE_SERVER\n#define HAVE_SERVER\n"));
    assert!(text.contains("#undef  HAVE_AESGCM\n// #define HAVE_AESGCM\n"));
}

#[test]
fn test_generate_custom_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("caps.h");

    let format = ArtifactFormat::new().with_guard("TLSCAPS_H").with_cxx_linkage(false);
    Generator::new(&path).format(format).generate().unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("#ifndef TLSCAPS_H\n"));
    assert!(!text.contains("__cplusplus"));
    assert!(load_artifact(&path).unwrap().enabled(Capability::ClientRole));
}

// ============================================================================
// Failures write nothing
// ============================================================================

#[test]
fn test_conflicting_overrides_write_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("options.h");

    let overrides = Overrides::new().with("CLIENT_ROLE", false);
    let err = Generator::new(&path).overrides(overrides).generate().unwrap_err();

    assert!(matches!(
        err.config_error(),
        Some(ConfigError::ConflictingSelection { invariant: Invariant::RoleRequired })
    ));
    assert!(!path.exists());
}

#[test]
fn test_tls13_without_key_exchange_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("options.h");

    let overrides = Overrides::new().with("KEX_X25519", false).with("KEX_ECDH", false);
    let err = Generator::new(&path).overrides(overrides).generate().unwrap_err();

    assert!(matches!(
        err.config_error(),
        Some(ConfigError::ConflictingSelection { invariant: Invariant::Tls13RequiresKeyExchange })
    ));
    assert!(!path.exists());
}

#[test]
fn test_unknown_override_keeps_existing_artifact() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("options.h");
    Generator::new(&path).generate().unwrap();

    let overrides = Overrides::new().with("HAVE_SERVER", true);
    let err = Generator::new(&path).overrides(overrides).generate().unwrap_err();

    assert!(matches!(
        err.config_error(),
        Some(ConfigError::UnknownCapability { identifier }) if identifier == "HAVE_SERVER"
    ));
    assert_eq!(fs::read(&path).unwrap(), REFERENCE);
}

#[test]
fn test_invalid_format_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("options.h");

    let format = ArtifactFormat::new().with_guard("not a guard");
    assert!(matches!(
        Generator::new(&path).format(format).generate(),
        Err(BuildError::Config(_))
    ));
    assert!(!path.exists());
}

// ============================================================================
// Override layering
// ============================================================================

#[test]
fn test_json_file_then_env_layering() {
    let dir = TempDir::new().unwrap();
    let json = dir.path().join("tlscaps.json");
    fs::write(&json, r#"{"SERVER_ROLE": true, "SIG_ECDSA": false}"#).unwrap();

    let env = Overrides::from_vars("TLSCAPS_", [("TLSCAPS_SIG_ECDSA", "on")]).unwrap();
    let overrides = Overrides::from_json_file(&json).unwrap().merge(env);

    let generated =
        Generator::new(dir.path().join("options.h")).overrides(overrides).generate().unwrap();
    assert!(generated.set.enabled(Capability::ServerRole));
    assert!(generated.set.enabled(Capability::SigEcdsa));
}

#[test]
fn test_missing_override_file() {
    let dir = TempDir::new().unwrap();
    let err = Overrides::from_json_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, BuildError::Io { .. }));
}

#[test]
fn test_malformed_override_file() {
    let dir = TempDir::new().unwrap();
    let json = dir.path().join("tlscaps.json");
    fs::write(&json, "{ SERVER_ROLE = true }").unwrap();

    match Overrides::from_json_file(&json).unwrap_err() {
        BuildError::OverrideFile { path, .. } => assert_eq!(path, json),
        other => panic!("unexpected {other:?}"),
    }
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("options.h");

    let overrides = Overrides::new().with("SERVER_ROLE", true).with("KEX_ECDH", false);
    let generated = Generator::new(&path).overrides(overrides).generate().unwrap();

    assert_eq!(load_artifact(&path).unwrap(), generated.set);
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(load_artifact(dir.path().join("options.h")), Err(BuildError::Io { .. })));
}

#[test]
fn test_load_truncated_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("options.h");
    fs::write(&path, &REFERENCE[..REFERENCE.len() / 2]).unwrap();

    assert!(matches!(
        load_artifact(&path).unwrap_err().config_error(),
        Some(ConfigError::MalformedArtifact { .. })
    ));
}

// ============================================================================
// Rust module
// ============================================================================

#[test]
fn test_rust_module_written_alongside() {
    let dir = TempDir::new().unwrap();
    let header = dir.path().join("options.h");
    let module = dir.path().join("capabilities.rs");

    Generator::new(&header)
        .overrides(Overrides::new().with("SERVER_ROLE", true))
        .rust_module(&module)
        .generate()
        .unwrap();

    let text = fs::read_to_string(&module).unwrap();
    assert!(text.contains("pub const HAVE_SERVER: bool = true;"));
    assert!(text.contains("pub const NO_SGX: bool = true;"));
}

#[test]
fn test_failed_rust_module_leaves_header_untouched() {
    let dir = TempDir::new().unwrap();
    let header = dir.path().join("options.h");
    let module = dir.path().join("capabilities.rs");
    Generator::new(&header).generate().unwrap();
    fs::create_dir(&module).unwrap();

    let err = Generator::new(&header)
        .overrides(Overrides::new().with("SERVER_ROLE", true))
        .rust_module(&module)
        .generate()
        .unwrap_err();

    assert!(matches!(err, BuildError::Io { .. }));
    assert_eq!(fs::read(&header).unwrap(), REFERENCE);
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .filter(|n| n.to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "staged files left behind: {leftovers:?}");
}
