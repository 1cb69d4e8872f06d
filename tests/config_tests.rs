// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! ORB configuration loading and its effect on created streams.

use std::path::PathBuf;

use orbcodec::{CharCodeSet, ErrorCategory, GiopVersion, Orb, OrbConfig, OrbError, TypeKind};

fn temp_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("orbcodec-{}-{name}.toml", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_from_file() {
    let path = temp_config(
        "load",
        r#"
        giop_version = "1.1"
        little_endian = true
        char_codeset = "utf-8"
        typecode_caching = true
        max_sequence_length = 1024
        "#,
    );
    let config = OrbConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.giop_version, GiopVersion::V1_1);
    assert!(config.little_endian);
    assert_eq!(config.char_codeset, CharCodeSet::Utf8);
    assert!(config.typecode_caching);
    assert!(config.recursive_typecodes);
    assert_eq!(config.max_sequence_length, 1024);
}

#[test]
fn test_missing_file() {
    let err = OrbConfig::from_file("/nonexistent/orbcodec.toml").unwrap_err();
    assert!(matches!(err, OrbError::Config { .. }));
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

#[test]
fn test_invalid_contents() {
    for text in [
        "little_endian = \"yes\"",
        "char_codeset = \"ebcdic\"",
        "max_sequence_length = 0",
    ] {
        let err = OrbConfig::from_toml_str(text).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration, "{text}");
    }
    assert!(Orb::new(OrbConfig {
        max_sequence_length: 0,
        ..OrbConfig::default()
    })
    .is_err());
}

#[test]
fn test_serialized_config_reloads() {
    let config = OrbConfig {
        giop_version: GiopVersion::V1_0,
        little_endian: true,
        char_codeset: CharCodeSet::Utf8,
        typecode_caching: true,
        recursive_typecodes: false,
        max_sequence_length: 64,
    };
    let path = temp_config("round-trip", &config.to_toml_string().unwrap());
    let reloaded = OrbConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_streams_follow_configuration() {
    let config = OrbConfig::from_toml_str("little_endian = true\ngiop_version = \"1.1\"").unwrap();
    let orb = Orb::new(config).unwrap();
    let out = orb.create_output_stream();
    assert!(out.is_little_endian());
    assert_eq!(out.giop_version(), GiopVersion::V1_1);

    let mut any = orb.create_any();
    any.insert_ulong(1);
    let mut cursor = any.create_input_stream().unwrap();
    assert!(cursor.is_little_endian());
    assert_eq!(cursor.read_octet().unwrap(), 1);
}

#[test]
fn test_caching_applies_to_new_type_codes() {
    let caching = Orb::new(OrbConfig {
        typecode_caching: true,
        ..OrbConfig::default()
    })
    .unwrap();
    let plain = Orb::default();
    let long = caching.primitive_tc(TypeKind::Long).unwrap();
    assert!(caching.create_sequence_tc(0, long.clone()).is_caching());
    assert!(!plain.create_sequence_tc(0, long).is_caching());
}
