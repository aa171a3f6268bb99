//! C8 serializer, exercised end to end through `parse`/`dump` with no
//! mutation -- a pure format/dump should be idempotent and (absent
//! reformatting-worthy input) byte-identical to the source.

use ftml::Config;
use rstest::rstest;

fn config() -> Config {
    Config { check_version: false, ..Config::default() }
}

#[rstest]
#[case("a = 1\n")]
#[case("a = \"hi\"\n")]
#[case("a = true\nb = false\nc = null\n")]
#[case("a = 1.5\n")]
#[case("a = { b = 1, c = 2 }\n")]
#[case("a = [1, 2, 3]\n")]
#[case("a = 1  // trailing\n")]
#[case("// leading\na = 1\n")]
#[case("a = 1\n\nb = 2\n")]
fn canonical_input_dumps_back_unchanged(#[case] src: &str) {
    let parsed = ftml::parse(src, &config()).unwrap();
    let out = ftml::dump(&parsed.value, Some(&parsed.doc), &config()).unwrap();
    assert_eq!(out, src);
}

#[test]
fn dump_is_idempotent_for_every_fixture() {
    for src in [
        "user = { name = \"A\", tags = [1, 2, 3] }\n",
        "a = {\n    // note\n    b = 1,\n}\n",
        "a = [\n    1,\n    2,  // two\n]\n",
    ] {
        let first = ftml::parse(src, &config()).unwrap();
        let once = ftml::dump(&first.value, Some(&first.doc), &config()).unwrap();
        let second = ftml::parse(&once, &config()).unwrap();
        let twice = ftml::dump(&second.value, Some(&second.doc), &config()).unwrap();
        assert_eq!(once, twice);
    }
}

#[test]
fn reserved_keys_are_emitted_first_at_root() {
    let parsed = ftml::parse("other = 1\nftml_encoding = \"utf-8\"\nftml_version = \"1.0\"\n", &config()).unwrap();
    let out = ftml::dump(&parsed.value, Some(&parsed.doc), &config()).unwrap();
    let version_pos = out.find("ftml_version").unwrap();
    let encoding_pos = out.find("ftml_encoding").unwrap();
    let other_pos = out.find("other").unwrap();
    assert!(version_pos < encoding_pos);
    assert!(encoding_pos < other_pos);
}

#[test]
fn inline_threshold_forces_multiline_past_the_configured_count() {
    let src = "a = { a1 = 1, a2 = 2, a3 = 3, a4 = 4, a5 = 5 }\n";
    let parsed = ftml::parse(src, &config()).unwrap();
    let tight = Config { inline_threshold: 2, ..config() };
    let out = ftml::dump(&parsed.value, Some(&parsed.doc), &tight).unwrap();
    assert!(out.contains("{\n"));
}

#[test]
fn string_escapes_round_trip() {
    let src = "a = \"line1\\nline2\\ttabbed\\\"quoted\\\"\"\n";
    let parsed = ftml::parse(src, &config()).unwrap();
    let out = ftml::dump(&parsed.value, Some(&parsed.doc), &config()).unwrap();
    assert_eq!(out, src);
}
