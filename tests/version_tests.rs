//! §6.2 versioning: the `ftml_version` compatibility gate as seen from
//! the public `parse` entry point.

use ftml::{Config, Error};

#[test]
fn absent_version_is_always_compatible() {
    let parsed = ftml::parse("a = 1\n", &Config::default()).unwrap();
    assert_eq!(parsed.value.as_object().unwrap().items.len(), 1);
}

#[test]
fn compatible_version_parses_normally() {
    let parsed = ftml::parse("ftml_version = \"1.0\"\na = 1\n", &Config::default()).unwrap();
    assert_eq!(parsed.value.as_object().unwrap().items.get("a"), Some(&ftml::Value::Int(1)));
}

#[test]
fn newer_major_version_is_rejected_before_structural_parsing() {
    let err = ftml::parse("ftml_version = \"2.0\"\na = 1\na = 1\n", &Config::default()).unwrap_err();
    assert!(matches!(err, Error::Version(_)));
}

#[test]
fn check_version_false_skips_the_gate_entirely() {
    let config = Config { check_version: false, ..Config::default() };
    let parsed = ftml::parse("ftml_version = \"99.0\"\na = 1\n", &config).unwrap();
    assert_eq!(parsed.value.as_object().unwrap().items.get("a"), Some(&ftml::Value::Int(1)));
}

#[test]
fn rc_stage_is_compatible_with_the_matching_release() {
    assert!(ftml::PARSER_VERSION.is_compatible_with(&ftml::Version::parse("1.0rc1", ftml::Position::start()).unwrap()));
}
