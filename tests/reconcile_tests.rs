//! C7 reconciler, exercised through the public `parse`/`dump` pipeline.

use ftml::{Config, Value};

fn config() -> Config {
    Config { check_version: false, ..Config::default() }
}

#[test]
fn basic_load_mutate_dump_preserves_comments_and_blank_line() {
    let src = "name = \"App\"  // inline\nversion = \"1.0\"\n";
    let parsed = ftml::parse(src, &config()).unwrap();
    let mut value = parsed.value.clone();
    if let Value::Object(o) = &mut value {
        o.items.insert("version", Value::String("1.1".into()));
    }
    let out = ftml::dump(&value, Some(&parsed.doc), &config()).unwrap();
    assert_eq!(out, "name = \"App\"  // inline\n\nversion = \"1.1\"\n");
}

#[test]
fn a_replaced_container_loses_its_old_comments() {
    let src = "user = {\n    // old note\n    name = \"A\",\n}\n";
    let parsed = ftml::parse(src, &config()).unwrap();
    let mut value = Value::object();
    if let Value::Object(o) = &mut value {
        let mut user = Value::object();
        if let Value::Object(u) = &mut user {
            u.items.insert("name", Value::String("B".into()));
        }
        o.items.insert("user", user);
    }
    let out = ftml::dump(&value, Some(&parsed.doc), &config()).unwrap();
    assert!(!out.contains("old note"));
}

#[test]
fn dropping_a_key_removes_it_from_the_dump() {
    let parsed = ftml::parse("a = 1\nb = 2\n", &config()).unwrap();
    let mut value = parsed.value.clone();
    if let Value::Object(o) = &mut value {
        o.items.remove("b");
    }
    let out = ftml::dump(&value, Some(&parsed.doc), &config()).unwrap();
    assert!(!out.contains('b'));
}

#[test]
fn dump_without_an_original_document_builds_plain_ast() {
    let mut value = Value::object();
    if let Value::Object(o) = &mut value {
        o.items.insert("a", Value::Int(1));
    }
    let out = ftml::dump(&value, None, &config()).unwrap();
    assert_eq!(out, "a = 1\n");
}

#[test]
fn disabling_preserve_comments_drops_all_comments_on_dump() {
    let src = "a = 1  // keep me?\n";
    let parsed = ftml::parse(src, &config()).unwrap();
    let cfg = Config { preserve_comments: false, ..config() };
    let out = ftml::dump(&parsed.value, Some(&parsed.doc), &cfg).unwrap();
    assert_eq!(out, "a = 1\n");
}
