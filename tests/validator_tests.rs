//! C6 validator, exercised end to end through [`Schema`].

use ftml::{Schema, ValidateOptions, Value, ValidationErrorKind};

#[test]
fn strict_mode_rejects_unknown_field() {
    let schema = Schema::parse("user: { name: str }\n").unwrap();
    let mut value = Value::object();
    if let Value::Object(o) = &mut value {
        let mut user = Value::object();
        if let Value::Object(u) = &mut user {
            u.items.insert("name", Value::String("A".into()));
            u.items.insert("role", Value::String("admin".into()));
        }
        o.items.insert("user", user);
    }
    let errors = schema.validate(&mut value.clone(), &ValidateOptions { strict: true, apply_defaults: false });
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0].kind, ValidationErrorKind::UnknownField));

    let errors = schema.validate(&mut value, &ValidateOptions { strict: false, apply_defaults: false });
    assert!(errors.is_empty());
}

#[test]
fn ext_true_overrides_strict_mode_for_that_object_only() {
    let schema = Schema::parse("user: { name: str }<ext=true>\n").unwrap();
    let mut value = Value::object();
    if let Value::Object(o) = &mut value {
        let mut user = Value::object();
        if let Value::Object(u) = &mut user {
            u.items.insert("name", Value::String("A".into()));
            u.items.insert("role", Value::String("admin".into()));
        }
        o.items.insert("user", user);
    }
    let errors = schema.validate(&mut value, &ValidateOptions { strict: true, apply_defaults: false });
    assert!(errors.is_empty());
}

#[test]
fn list_uniqueness_violation_is_reported_at_the_list_path() {
    let schema = Schema::parse("ids: [int]<unique=true>\n").unwrap();
    let mut value = Value::object();
    if let Value::Object(o) = &mut value {
        o.items.insert("ids", Value::List(ftml::ValueList {
            items: vec![Value::Int(1), Value::Int(2), Value::Int(1)],
            ast_ref: None,
        }));
    }
    let errors = schema.validate(&mut value, &ValidateOptions::default());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, "ids");
}

#[test]
fn union_falls_through_to_second_alternative() {
    let schema = Schema::parse("id: str<enum=[\"unknown\"]> | int<min=1>\n").unwrap();
    let mut value = Value::object();
    if let Value::Object(o) = &mut value {
        o.items.insert("id", Value::Int(42));
    }
    let errors = schema.validate(&mut value, &ValidateOptions::default());
    assert!(errors.is_empty());
}

#[test]
fn union_reports_last_alternative_errors_when_nothing_matches() {
    let schema = Schema::parse("id: str<enum=[\"unknown\"]> | int<min=1>\n").unwrap();
    let mut value = Value::object();
    if let Value::Object(o) = &mut value {
        o.items.insert("id", Value::Bool(true));
    }
    let errors = schema.validate(&mut value, &ValidateOptions::default());
    assert!(errors.iter().any(|e| matches!(e.kind, ValidationErrorKind::UnionNoMatch)));
}

#[test]
fn defaults_are_applied_when_missing() {
    let schema = Schema::parse("port: int<min=1024, max=65535> = 8080\n").unwrap();
    let mut value = Value::object();
    let errors = schema.validate(&mut value, &ValidateOptions::default());
    assert!(errors.is_empty());
    assert_eq!(value.as_object().unwrap().items.get("port"), Some(&Value::Int(8080)));
}

#[test]
fn timestamp_precision_band_is_enforced() {
    let schema = Schema::parse("ts: timestamp<precision=\"seconds\">\n").unwrap();
    let mut value = Value::object();
    if let Value::Object(o) = &mut value {
        // 13 digits: a milliseconds-band timestamp, rejected under the
        // "seconds" (10-digit) band.
        o.items.insert("ts", Value::Int(1_234_567_890_123));
    }
    let errors = schema.validate(&mut value, &ValidateOptions::default());
    assert_eq!(errors.len(), 1);
}

#[test]
fn timestamp_accepts_a_conforming_integer() {
    let schema = Schema::parse("ts: timestamp<precision=\"seconds\">\n").unwrap();
    let mut value = Value::object();
    if let Value::Object(o) = &mut value {
        o.items.insert("ts", Value::Int(1_700_000_000));
    }
    let errors = schema.validate(&mut value, &ValidateOptions::default());
    assert!(errors.is_empty());
}
