//! C6: depth-first validation of a value tree against a type tree
//! (spec §4.5). Accumulates every error rather than stopping at the
//! first, except where recursing further would be meaningless (a
//! top-level type mismatch).

use regex::Regex;

use crate::error::{ConstraintViolationKind, ValidationError, ValidationErrorKind};
use crate::schema::registry::TypeRegistry;
use crate::schema::temporal;
use crate::schema::types::{ConstraintValue, ObjectT, ScalarKind, TypeDescriptor};
use crate::value::{Path, Value, ValueList, ValueObject};

#[derive(Debug, Clone, Copy)]
pub struct ValidateOptions {
    pub strict: bool,
    pub apply_defaults: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self { strict: true, apply_defaults: true }
    }
}

/// Validates `value` against `ty`, optionally injecting defaults in
/// place when `opts.apply_defaults` is set. Returns every accumulated
/// error; an empty vector means `value` satisfies `ty`.
pub fn validate(
    value: &mut Value,
    ty: &TypeDescriptor,
    registry: &TypeRegistry,
    opts: &ValidateOptions,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    validate_at(value, ty, registry, opts, &Path::root(), &mut errors);
    errors
}

fn validate_at(
    value: &mut Value,
    ty: &TypeDescriptor,
    registry: &TypeRegistry,
    opts: &ValidateOptions,
    path: &Path,
    errors: &mut Vec<ValidationError>,
) {
    match ty {
        TypeDescriptor::Scalar(t) => validate_scalar(value, t, registry, path, errors),
        TypeDescriptor::Union(t) => validate_union(value, t, registry, opts, path, errors),
        TypeDescriptor::List(t) => validate_list(value, t, registry, opts, path, errors),
        TypeDescriptor::Object(ObjectT::Enumerated { fields, constraints, ext, .. }) => {
            validate_enumerated(value, fields, constraints, *ext, registry, opts, path, errors)
        }
        TypeDescriptor::Object(ObjectT::Pattern { value_type, constraints, .. }) => {
            validate_pattern(value, value_type, constraints, registry, opts, path, errors)
        }
    }
}

fn validate_scalar(
    value: &Value,
    t: &crate::schema::types::ScalarT,
    registry: &TypeRegistry,
    path: &Path,
    errors: &mut Vec<ValidationError>,
) {
    let name = t.custom_name.as_deref().unwrap_or_else(|| t.kind.builtin_name().unwrap_or("any"));
    let shape_ok = registry.matches(name, value).unwrap_or(false);
    if !shape_ok {
        errors.push(ValidationError {
            path: path.to_string(),
            kind: ValidationErrorKind::TypeMismatch {
                expected: name.to_string(),
                found: value.type_name().to_string(),
            },
        });
        return;
    }

    if matches!(t.kind, ScalarKind::Date | ScalarKind::Time | ScalarKind::DateTime) {
        let text = value.as_str().unwrap_or_default();
        let format = t.constraints.get("format").and_then(ConstraintValue::as_str);
        if !temporal::validate(t.kind, text, format) {
            errors.push(ValidationError {
                path: path.to_string(),
                kind: ValidationErrorKind::ConstraintViolation(ConstraintViolationKind::Format {
                    format: format.unwrap_or("default").to_string(),
                }),
            });
            return;
        }
    }
    if t.kind == ScalarKind::Timestamp {
        if let (Value::Int(n), Some(band)) =
            (value, t.constraints.get("precision").and_then(ConstraintValue::as_str))
        {
            let expected_digits = match band {
                "seconds" => 10,
                "milliseconds" => 13,
                "microseconds" => 16,
                "nanoseconds" => 19,
                _ => 0,
            };
            let digits = n.unsigned_abs().to_string().len();
            if expected_digits > 0 && digits != expected_digits {
                errors.push(ValidationError {
                    path: path.to_string(),
                    kind: ValidationErrorKind::ConstraintViolation(ConstraintViolationKind::Precision {
                        max_digits: expected_digits,
                    }),
                });
                return;
            }
        }
    }

    for kind in scalar_constraint_violations(value, t) {
        errors.push(ValidationError { path: path.to_string(), kind: ValidationErrorKind::ConstraintViolation(kind) });
    }
}

fn scalar_constraint_violations(
    value: &Value,
    t: &crate::schema::types::ScalarT,
) -> Vec<ConstraintViolationKind> {
    let mut out = Vec::new();
    for (name, cv) in t.constraints.iter() {
        match name {
            "min_length" => {
                if let (Value::String(s), Some(min)) = (value, cv.as_usize()) {
                    if s.chars().count() < min {
                        out.push(ConstraintViolationKind::MinLength { min, actual: s.chars().count() });
                    }
                }
            }
            "max_length" => {
                if let (Value::String(s), Some(max)) = (value, cv.as_usize()) {
                    if s.chars().count() > max {
                        out.push(ConstraintViolationKind::MaxLength { max, actual: s.chars().count() });
                    }
                }
            }
            "pattern" => {
                if let (Value::String(s), Some(pat)) = (value, cv.as_str()) {
                    match Regex::new(pat) {
                        Ok(re) if !re.is_match(s) => {
                            out.push(ConstraintViolationKind::Pattern { pattern: pat.to_string() })
                        }
                        _ => {}
                    }
                }
            }
            "enum" => {
                if let Some(allowed) = cv.as_list() {
                    if !allowed.iter().any(|a| constraint_value_eq_value(a, value)) {
                        out.push(ConstraintViolationKind::Enum);
                    }
                }
            }
            "min" => {
                if let Some(min) = cv.as_f64() {
                    if let Some(actual) = value_as_f64(value) {
                        if actual < min {
                            out.push(ConstraintViolationKind::Min { min: cv_display(cv), actual: value_display(value) });
                        }
                    }
                }
            }
            "max" => {
                if let Some(max) = cv.as_f64() {
                    if let Some(actual) = value_as_f64(value) {
                        if actual > max {
                            out.push(ConstraintViolationKind::Max { max: cv_display(cv), actual: value_display(value) });
                        }
                    }
                }
            }
            "precision" => {
                if let (Value::Float(f), Some(max_digits)) = (value, cv.as_usize()) {
                    if fractional_digits(*f) > max_digits {
                        out.push(ConstraintViolationKind::Precision { max_digits });
                    }
                }
            }
            _ => {}
        }
    }
    out
}

fn fractional_digits(f: f64) -> usize {
    let text = format!("{f}");
    match text.split_once('.') {
        Some((_, frac)) => frac.trim_end_matches('0').len(),
        None => 0,
    }
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int(n) => Some(*n as f64),
        Value::Float(n) => Some(*n),
        _ => None,
    }
}

fn cv_display(cv: &ConstraintValue) -> String {
    match cv {
        ConstraintValue::Int(n) => n.to_string(),
        ConstraintValue::Float(n) => n.to_string(),
        other => format!("{other:?}"),
    }
}

fn value_display(value: &Value) -> String {
    match value {
        Value::Int(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        other => format!("{other:?}"),
    }
}

fn constraint_value_eq_value(cv: &ConstraintValue, value: &Value) -> bool {
    match (cv, value) {
        (ConstraintValue::String(a), Value::String(b)) => a == b,
        (ConstraintValue::Int(a), Value::Int(b)) => a == b,
        (ConstraintValue::Float(a), Value::Float(b)) => a == b,
        (ConstraintValue::Bool(a), Value::Bool(b)) => a == b,
        (ConstraintValue::Null, Value::Null) => true,
        _ => false,
    }
}

fn validate_union(
    value: &mut Value,
    t: &crate::schema::types::UnionT,
    registry: &TypeRegistry,
    opts: &ValidateOptions,
    path: &Path,
    errors: &mut Vec<ValidationError>,
) {
    let mut last_sub_errors = Vec::new();
    for alt in &t.alts {
        let mut candidate = value.clone();
        let mut sub_errors = Vec::new();
        validate_at(&mut candidate, alt, registry, opts, path, &mut sub_errors);
        if sub_errors.is_empty() {
            *value = candidate;
            return;
        }
        last_sub_errors = sub_errors;
    }
    errors.push(ValidationError { path: path.to_string(), kind: ValidationErrorKind::UnionNoMatch });
    errors.extend(last_sub_errors);
}

fn validate_list(
    value: &mut Value,
    t: &crate::schema::types::ListT,
    registry: &TypeRegistry,
    opts: &ValidateOptions,
    path: &Path,
    errors: &mut Vec<ValidationError>,
) {
    let Value::List(ValueList { items, .. }) = value else {
        errors.push(ValidationError {
            path: path.to_string(),
            kind: ValidationErrorKind::TypeMismatch { expected: "list".to_string(), found: value.type_name().to_string() },
        });
        return;
    };

    for (i, item) in items.iter_mut().enumerate() {
        validate_at(item, &t.item, registry, opts, &path.child_index(i), errors);
    }

    if let Some(min) = t.constraints.get("min_items").and_then(ConstraintValue::as_usize) {
        if items.len() < min {
            errors.push(ValidationError {
                path: path.to_string(),
                kind: ValidationErrorKind::ConstraintViolation(ConstraintViolationKind::MinItems { min, actual: items.len() }),
            });
        }
    }
    if let Some(max) = t.constraints.get("max_items").and_then(ConstraintValue::as_usize) {
        if items.len() > max {
            errors.push(ValidationError {
                path: path.to_string(),
                kind: ValidationErrorKind::ConstraintViolation(ConstraintViolationKind::MaxItems { max, actual: items.len() }),
            });
        }
    }
    if let Some(true) = t.constraints.get("unique").and_then(ConstraintValue::as_bool) {
        let mut seen: Vec<&Value> = Vec::new();
        let mut dup = false;
        for item in items.iter() {
            if seen.iter().any(|s| *s == item) {
                dup = true;
                break;
            }
            seen.push(item);
        }
        if dup {
            errors.push(ValidationError {
                path: path.to_string(),
                kind: ValidationErrorKind::ConstraintViolation(ConstraintViolationKind::Unique),
            });
        }
    }
}

fn validate_enumerated(
    value: &mut Value,
    fields: &crate::value::OrderedMap<TypeDescriptor>,
    constraints: &crate::schema::types::Constraints,
    ext: bool,
    registry: &TypeRegistry,
    opts: &ValidateOptions,
    path: &Path,
    errors: &mut Vec<ValidationError>,
) {
    let Value::Object(ValueObject { items, .. }) = value else {
        errors.push(ValidationError {
            path: path.to_string(),
            kind: ValidationErrorKind::TypeMismatch { expected: "object".to_string(), found: value.type_name().to_string() },
        });
        return;
    };

    for (name, field_ty) in fields.iter() {
        let field_path = path.child_key(name);
        if items.contains_key(name) {
            let v = items.get_mut(name).expect("checked above");
            validate_at(v, field_ty, registry, opts, &field_path, errors);
        } else if field_ty.has_default() {
            if opts.apply_defaults {
                let default = field_ty.default().expect("has_default implies default").clone();
                items.insert(name.to_string(), default);
            }
        } else if field_ty.optional() {
            // nothing to do
        } else {
            errors.push(ValidationError { path: field_path.to_string(), kind: ValidationErrorKind::MissingRequiredField });
        }
    }

    if opts.strict && !ext {
        for (key, _) in items.iter() {
            if !fields.contains_key(key) {
                errors.push(ValidationError { path: path.child_key(key).to_string(), kind: ValidationErrorKind::UnknownField });
            }
        }
    }

    if let Some(min) = constraints.get("min_properties").and_then(ConstraintValue::as_usize) {
        if items.len() < min {
            errors.push(ValidationError {
                path: path.to_string(),
                kind: ValidationErrorKind::ConstraintViolation(ConstraintViolationKind::MinProperties { min, actual: items.len() }),
            });
        }
    }
    if let Some(max) = constraints.get("max_properties").and_then(ConstraintValue::as_usize) {
        if items.len() > max {
            errors.push(ValidationError {
                path: path.to_string(),
                kind: ValidationErrorKind::ConstraintViolation(ConstraintViolationKind::MaxProperties { max, actual: items.len() }),
            });
        }
    }
    if let Some(required) = constraints.get("required_keys").and_then(ConstraintValue::as_list) {
        for key in required {
            if let Some(key) = key.as_str() {
                if !items.contains_key(key) {
                    errors.push(ValidationError {
                        path: path.to_string(),
                        kind: ValidationErrorKind::ConstraintViolation(ConstraintViolationKind::RequiredKey { key: key.to_string() }),
                    });
                }
            }
        }
    }
}

fn validate_pattern(
    value: &mut Value,
    value_type: &TypeDescriptor,
    constraints: &crate::schema::types::Constraints,
    registry: &TypeRegistry,
    opts: &ValidateOptions,
    path: &Path,
    errors: &mut Vec<ValidationError>,
) {
    let Value::Object(ValueObject { items, .. }) = value else {
        errors.push(ValidationError {
            path: path.to_string(),
            kind: ValidationErrorKind::TypeMismatch { expected: "object".to_string(), found: value.type_name().to_string() },
        });
        return;
    };

    for (key, v) in items.iter_mut() {
        validate_at(v, value_type, registry, opts, &path.child_key(key), errors);
    }

    if let Some(min) = constraints.get("min_properties").and_then(ConstraintValue::as_usize) {
        if items.len() < min {
            errors.push(ValidationError {
                path: path.to_string(),
                kind: ValidationErrorKind::ConstraintViolation(ConstraintViolationKind::MinProperties { min, actual: items.len() }),
            });
        }
    }
    if let Some(max) = constraints.get("max_properties").and_then(ConstraintValue::as_usize) {
        if items.len() > max {
            errors.push(ValidationError {
                path: path.to_string(),
                kind: ValidationErrorKind::ConstraintViolation(ConstraintViolationKind::MaxProperties { max, actual: items.len() }),
            });
        }
    }
    if let Some(required) = constraints.get("required_keys").and_then(ConstraintValue::as_list) {
        for key in required {
            if let Some(key) = key.as_str() {
                if !items.contains_key(key) {
                    errors.push(ValidationError {
                        path: path.to_string(),
                        kind: ValidationErrorKind::ConstraintViolation(ConstraintViolationKind::RequiredKey { key: key.to_string() }),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{ListT, ScalarT, UnionT};
    use crate::position::Position;

    fn int_type(min: Option<i64>) -> TypeDescriptor {
        let mut constraints = crate::value::OrderedMap::new();
        if let Some(m) = min {
            constraints.insert("min", ConstraintValue::Int(m));
        }
        TypeDescriptor::Scalar(ScalarT {
            kind: ScalarKind::Int,
            custom_name: None,
            constraints,
            has_default: false,
            default: None,
            optional: false,
            pos: Position::start(),
        })
    }

    #[test]
    fn missing_required_field_reported() {
        let registry = TypeRegistry::with_builtins();
        let mut fields = crate::value::OrderedMap::new();
        fields.insert("port", int_type(None));
        let ty = TypeDescriptor::Object(ObjectT::Enumerated {
            fields,
            constraints: crate::value::OrderedMap::new(),
            has_default: false,
            default: None,
            optional: false,
            ext: false,
            pos: Position::start(),
        });
        let mut value = Value::object();
        let errors = validate(&mut value, &ty, &registry, &ValidateOptions::default());
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0].kind, ValidationErrorKind::MissingRequiredField));
    }

    #[test]
    fn union_first_match_wins() {
        let registry = TypeRegistry::with_builtins();
        let ty = TypeDescriptor::Union(UnionT {
            alts: vec![int_type(Some(1)), TypeDescriptor::Scalar(ScalarT {
                kind: ScalarKind::Str,
                custom_name: None,
                constraints: crate::value::OrderedMap::new(),
                has_default: false,
                default: None,
                optional: false,
                pos: Position::start(),
            })],
            has_default: false,
            default: None,
            optional: false,
            pos: Position::start(),
        });
        let mut value = Value::Int(5);
        let errors = validate(&mut value, &ty, &registry, &ValidateOptions::default());
        assert!(errors.is_empty());
    }

    #[test]
    fn list_unique_violation() {
        let registry = TypeRegistry::with_builtins();
        let mut constraints = crate::value::OrderedMap::new();
        constraints.insert("unique", ConstraintValue::Bool(true));
        let ty = TypeDescriptor::List(ListT {
            item: Box::new(int_type(None)),
            constraints,
            has_default: false,
            default: None,
            optional: false,
            pos: Position::start(),
        });
        let mut value = Value::List(ValueList {
            items: vec![Value::Int(1), Value::Int(2), Value::Int(1)],
            ast_ref: None,
        });
        let errors = validate(&mut value, &ty, &registry, &ValidateOptions::default());
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0].kind,
            ValidationErrorKind::ConstraintViolation(ConstraintViolationKind::Unique)
        ));
    }
}
