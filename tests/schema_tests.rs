//! C4/C5 schema parser and type model.

use ftml::{Schema, TypeDescriptor};

#[test]
fn scalar_field_with_constraint_and_default() {
    let schema = Schema::parse("port: int<min=1024, max=65535> = 8080\n").unwrap();
    match schema.root() {
        TypeDescriptor::Object(ftml::ObjectT::Enumerated { fields, .. }) => {
            let port = fields.get("port").unwrap();
            assert!(port.has_default());
        }
        _ => panic!("expected an enumerated root"),
    }
}

#[test]
fn union_alternatives_parse_in_source_order() {
    let schema = Schema::parse("id: str<enum=[\"unknown\"]> | int<min=1>\n").unwrap();
    match schema.root() {
        TypeDescriptor::Object(ftml::ObjectT::Enumerated { fields, .. }) => {
            match fields.get("id").unwrap() {
                TypeDescriptor::Union(u) => assert_eq!(u.alts.len(), 2),
                _ => panic!("expected a union"),
            }
        }
        _ => panic!("expected an enumerated root"),
    }
}

#[test]
fn empty_braces_parse_as_an_unconstrained_pattern_object() {
    let schema = Schema::parse("meta: {}\n").unwrap();
    match schema.root() {
        TypeDescriptor::Object(ftml::ObjectT::Enumerated { fields, .. }) => {
            assert!(matches!(fields.get("meta").unwrap(), TypeDescriptor::Object(ftml::ObjectT::Pattern { .. })));
        }
        _ => panic!("expected an enumerated root"),
    }
}

#[test]
fn pattern_object_rejects_nested_pattern_collision() {
    let err = Schema::parse("tags: { {} }\n").unwrap_err();
    assert!(matches!(err, ftml::Error::Schema(ftml::SchemaError::PatternEnumCollision { .. })));
}

#[test]
fn unknown_type_name_errors() {
    let err = Schema::parse("x: bogus\n").unwrap_err();
    assert!(matches!(err, ftml::Error::Schema(ftml::SchemaError::UnknownType { .. })));
}

#[test]
fn default_failing_its_own_type_is_rejected_at_parse_time() {
    let err = Schema::parse("port: int<min=1024> = 80\n").unwrap_err();
    assert!(matches!(err, ftml::Error::Schema(ftml::SchemaError::InvalidDefault { .. })));
}

#[test]
fn duplicate_field_names_are_rejected() {
    let err = Schema::parse("a: str\na: int\n").unwrap_err();
    assert!(matches!(err, ftml::Error::Schema(ftml::SchemaError::MalformedConstraint { .. })));
}

#[test]
fn custom_registered_scalar_is_accepted() {
    let mut registry = ftml::TypeRegistry::with_builtins();
    registry.register_scalar("ipv4", |v| v.as_str().is_some());
    let schema = Schema::parse_with_registry("addr: ipv4\n", registry).unwrap();
    assert!(matches!(schema.root(), TypeDescriptor::Object(_)));
}
