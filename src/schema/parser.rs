//! C4: schema tokenizer + parser. Reuses the document tokenizer (C1)
//! but discards comment tokens, and the document parser's token cursor
//! and data-value grammar for default expressions.

use crate::error::{ParseError, SchemaError};
use crate::parser::{parse_data_value, TokenStream};
use crate::position::Position;
use crate::schema::registry::TypeRegistry;
use crate::schema::types::{Constraints, ListT, ObjectT, ScalarKind, ScalarT, TypeDescriptor, UnionT};
use crate::token::{Token, TokenKind};
use crate::validator::{validate, ValidateOptions};
use crate::value::OrderedMap;

const STR_ALIASES: &[(&str, &str)] =
    &[("min_length", "min_length"), ("min", "min_length"), ("max_length", "max_length"), ("max", "max_length"),
      ("pattern", "pattern"), ("enum", "enum"), ("format", "format")];
const NUM_ALIASES: &[(&str, &str)] = &[("min", "min"), ("max", "max"), ("enum", "enum"), ("precision", "precision")];
const BOOL_ALIASES: &[(&str, &str)] = &[("enum", "enum")];
const DATE_ALIASES: &[(&str, &str)] = &[("min", "min"), ("max", "max"), ("format", "format")];
const TIMESTAMP_ALIASES: &[(&str, &str)] = &[("min", "min"), ("max", "max"), ("precision", "precision")];
const LIST_ALIASES: &[(&str, &str)] =
    &[("min", "min_items"), ("min_items", "min_items"), ("max", "max_items"), ("max_items", "max_items"), ("unique", "unique")];
const OBJECT_ALIASES: &[(&str, &str)] = &[
    ("min", "min_properties"),
    ("min_properties", "min_properties"),
    ("max", "max_properties"),
    ("max_properties", "max_properties"),
    ("required_keys", "required_keys"),
    ("ext", "ext"),
];

/// Parses schema text's tokens into the root type tree: the field list
/// behaves exactly like an enumerated object at the document root.
pub fn parse_schema(tokens: &[Token], registry: &TypeRegistry) -> Result<TypeDescriptor, SchemaError> {
    let filtered: Vec<Token> = tokens.iter().filter(|t| !t.kind.is_comment_like()).cloned().collect();
    let mut ts = TokenStream::new(&filtered);
    let mut fields = OrderedMap::new();

    skip_ws_nl(&mut ts);
    while !matches!(ts.peek(), TokenKind::Eof) {
        let (key, ty, pos) = parse_field(&mut ts, registry)?;
        if fields.contains_key(&key) {
            return Err(SchemaError::MalformedConstraint { pos, detail: format!("duplicate field {key:?}") });
        }
        fields.insert(key, ty);

        ts.skip_whitespace();
        if matches!(ts.peek(), TokenKind::Eof) {
            break;
        }
        if !matches!(ts.peek(), TokenKind::Newline) {
            return Err(SchemaError::Parse(ParseError::UnexpectedToken {
                pos: ts.peek_pos(),
                expected: "newline between schema fields".into(),
                got: ts.peek().describe(),
            }));
        }
        skip_ws_nl(&mut ts);
    }

    Ok(TypeDescriptor::Object(ObjectT::Enumerated {
        fields,
        constraints: Constraints::new(),
        has_default: false,
        default: None,
        optional: false,
        ext: false,
        pos: Position::start(),
    }))
}

fn skip_ws_nl(ts: &mut TokenStream) {
    loop {
        match ts.peek() {
            TokenKind::Whitespace | TokenKind::Newline => {
                ts.bump();
            }
            _ => break,
        }
    }
}

fn expect_schema(ts: &mut TokenStream, expected: &TokenKind, label: &str) -> Result<(), SchemaError> {
    ts.skip_whitespace();
    if ts.peek() == expected {
        ts.bump();
        Ok(())
    } else {
        Err(SchemaError::Parse(ParseError::UnexpectedToken {
            pos: ts.peek_pos(),
            expected: label.into(),
            got: ts.peek().describe(),
        }))
    }
}

fn parse_schema_key(ts: &mut TokenStream) -> Result<String, ParseError> {
    let pos = ts.peek_pos();
    match ts.peek().clone() {
        TokenKind::Ident(name) => {
            ts.bump();
            Ok(name)
        }
        TokenKind::String(s) | TokenKind::SingleString(s) => {
            ts.bump();
            Ok(s)
        }
        other => Err(ParseError::UnexpectedToken { pos, expected: "a field name".into(), got: other.describe() }),
    }
}

/// Field := Key Optional? ':' TypeExpr Default?
fn parse_field(ts: &mut TokenStream, registry: &TypeRegistry) -> Result<(String, TypeDescriptor, Position), SchemaError> {
    ts.skip_whitespace();
    let pos = ts.peek_pos();
    let key = parse_schema_key(ts).map_err(SchemaError::Parse)?;
    ts.skip_whitespace();
    let optional = if matches!(ts.peek(), TokenKind::Question) {
        ts.bump();
        true
    } else {
        false
    };
    expect_schema(ts, &TokenKind::Colon, "':'")?;
    let mut ty = parse_type_expr(ts, registry)?;

    ts.skip_whitespace();
    if matches!(ts.peek(), TokenKind::Equal) {
        ts.bump();
        ts.skip_whitespace();
        let default_pos = ts.peek_pos();
        let default_value = parse_data_value(ts).map_err(SchemaError::Parse)?;

        let mut probe = default_value.clone();
        let errs = validate(&mut probe, &ty, registry, &ValidateOptions { strict: true, apply_defaults: false });
        if !errs.is_empty() {
            let detail = errs.iter().map(|e| e.kind.to_string()).collect::<Vec<_>>().join("; ");
            return Err(SchemaError::InvalidDefault { pos: default_pos, field: key, detail });
        }
        ty.set_default(default_value);
    }
    ty.set_optional(optional);
    Ok((key, ty, pos))
}

fn parse_type_expr(ts: &mut TokenStream, registry: &TypeRegistry) -> Result<TypeDescriptor, SchemaError> {
    parse_union(ts, registry)
}

/// Union := Atom ('|' Atom)*
fn parse_union(ts: &mut TokenStream, registry: &TypeRegistry) -> Result<TypeDescriptor, SchemaError> {
    let first = parse_atom(ts, registry)?;
    ts.skip_whitespace();
    if !matches!(ts.peek(), TokenKind::Pipe) {
        return Ok(first);
    }
    let pos = first.pos();
    let mut alts = vec![first];
    while matches!(ts.peek(), TokenKind::Pipe) {
        ts.bump();
        ts.skip_whitespace();
        alts.push(parse_atom(ts, registry)?);
        ts.skip_whitespace();
    }
    Ok(TypeDescriptor::Union(UnionT { alts, has_default: false, default: None, optional: false, pos }))
}

fn any_scalar(pos: Position) -> TypeDescriptor {
    TypeDescriptor::Scalar(ScalarT {
        kind: ScalarKind::Any,
        custom_name: None,
        constraints: Constraints::new(),
        has_default: false,
        default: None,
        optional: false,
        pos,
    })
}

/// Atom := ScalarName Constraints? | '[' TypeExpr? ']' Constraints? | '{' ObjectBody '}' Constraints?
fn parse_atom(ts: &mut TokenStream, registry: &TypeRegistry) -> Result<TypeDescriptor, SchemaError> {
    skip_ws_nl(ts);
    let pos = ts.peek_pos();
    match ts.peek().clone() {
        TokenKind::LBracket => {
            ts.bump();
            skip_ws_nl(ts);
            let item = if matches!(ts.peek(), TokenKind::RBracket) {
                any_scalar(pos)
            } else {
                parse_type_expr(ts, registry)?
            };
            skip_ws_nl(ts);
            expect_schema(ts, &TokenKind::RBracket, "']'")?;
            let constraints = parse_constraints_opt(ts, Some(LIST_ALIASES))?;
            Ok(TypeDescriptor::List(ListT {
                item: Box::new(item),
                constraints,
                has_default: false,
                default: None,
                optional: false,
                pos,
            }))
        }
        TokenKind::LBrace => {
            ts.bump();
            let mut obj = parse_object_body(ts, registry, pos)?;
            let constraints = parse_constraints_opt(ts, Some(OBJECT_ALIASES))?;
            apply_object_constraints(&mut obj, constraints)?;
            Ok(TypeDescriptor::Object(obj))
        }
        TokenKind::Ident(name) => {
            ts.bump();
            build_scalar(&name, ts, registry, pos)
        }
        other => Err(SchemaError::Parse(ParseError::UnexpectedToken { pos, expected: "a type".into(), got: other.describe() })),
    }
}

fn build_scalar(name: &str, ts: &mut TokenStream, registry: &TypeRegistry, pos: Position) -> Result<TypeDescriptor, SchemaError> {
    let (kind, custom_name, aliases): (ScalarKind, Option<String>, Option<&[(&str, &str)]>) =
        match ScalarKind::from_builtin_name(name) {
            Some(ScalarKind::Str) => (ScalarKind::Str, None, Some(STR_ALIASES)),
            Some(ScalarKind::Int) => (ScalarKind::Int, None, Some(NUM_ALIASES)),
            Some(ScalarKind::Float) => (ScalarKind::Float, None, Some(NUM_ALIASES)),
            Some(ScalarKind::Bool) => (ScalarKind::Bool, None, Some(BOOL_ALIASES)),
            Some(ScalarKind::Null) => (ScalarKind::Null, None, Some(&[])),
            Some(ScalarKind::Any) => (ScalarKind::Any, None, Some(&[])),
            Some(k @ (ScalarKind::Date | ScalarKind::Time | ScalarKind::DateTime)) => (k, None, Some(DATE_ALIASES)),
            Some(ScalarKind::Timestamp) => (ScalarKind::Timestamp, None, Some(TIMESTAMP_ALIASES)),
            Some(ScalarKind::Custom) | None => {
                if registry.contains(name) {
                    (ScalarKind::Custom, Some(name.to_string()), None)
                } else {
                    return Err(SchemaError::UnknownType { pos, name: name.to_string() });
                }
            }
        };

    let constraints = parse_constraints_opt(ts, aliases)?;
    if kind == ScalarKind::Int && constraints.contains_key("precision") {
        return Err(SchemaError::MalformedConstraint { pos, detail: "precision is only valid for float".into() });
    }
    Ok(TypeDescriptor::Scalar(ScalarT { kind, custom_name, constraints, has_default: false, default: None, optional: false, pos }))
}

/// Peeks (without consuming) whether the upcoming object body reads as
/// `name:` (enumerated) rather than a bare type expression (pattern).
fn peek_is_enumerated(ts: &mut TokenStream) -> bool {
    let save = ts.mark();
    let looks_enumerated = (|| {
        skip_ws_nl(ts);
        if parse_schema_key(ts).is_err() {
            return false;
        }
        skip_ws_nl(ts);
        if matches!(ts.peek(), TokenKind::Question) {
            ts.bump();
            skip_ws_nl(ts);
        }
        matches!(ts.peek(), TokenKind::Colon)
    })();
    ts.reset(save);
    looks_enumerated
}

/// ObjectBody := TypeExpr | (Field (',' Field)* ','?)?
fn parse_object_body(ts: &mut TokenStream, registry: &TypeRegistry, pos: Position) -> Result<ObjectT, SchemaError> {
    skip_ws_nl(ts);
    if matches!(ts.peek(), TokenKind::RBrace) {
        ts.bump();
        return Ok(ObjectT::Pattern {
            value_type: Box::new(any_scalar(pos)),
            constraints: Constraints::new(),
            has_default: false,
            default: None,
            optional: false,
            pos,
        });
    }

    if peek_is_enumerated(ts) {
        let mut fields = OrderedMap::new();
        loop {
            skip_ws_nl(ts);
            if matches!(ts.peek(), TokenKind::RBrace) {
                ts.bump();
                break;
            }
            let (key, ty, field_pos) = parse_field(ts, registry)?;
            if fields.contains_key(&key) {
                return Err(SchemaError::MalformedConstraint { pos: field_pos, detail: format!("duplicate field {key:?}") });
            }
            fields.insert(key, ty);
            skip_ws_nl(ts);
            match ts.peek() {
                TokenKind::Comma => {
                    ts.bump();
                    skip_ws_nl(ts);
                    if matches!(ts.peek(), TokenKind::RBrace) {
                        ts.bump();
                        break;
                    }
                }
                TokenKind::RBrace => {
                    ts.bump();
                    break;
                }
                other => {
                    return Err(SchemaError::Parse(ParseError::UnexpectedToken {
                        pos: ts.peek_pos(),
                        expected: "',' or '}'".into(),
                        got: other.describe(),
                    }))
                }
            }
        }
        Ok(ObjectT::Enumerated {
            fields,
            constraints: Constraints::new(),
            has_default: false,
            default: None,
            optional: false,
            ext: false,
            pos,
        })
    } else {
        let inner = parse_type_expr(ts, registry)?;
        skip_ws_nl(ts);
        if let TypeDescriptor::Object(ObjectT::Pattern { .. }) = &inner {
            return Err(SchemaError::PatternEnumCollision { pos });
        }
        expect_schema(ts, &TokenKind::RBrace, "'}'")?;
        Ok(ObjectT::Pattern {
            value_type: Box::new(inner),
            constraints: Constraints::new(),
            has_default: false,
            default: None,
            optional: false,
            pos,
        })
    }
}

fn apply_object_constraints(obj: &mut ObjectT, mut constraints: Constraints) -> Result<(), SchemaError> {
    let ext_value = constraints.remove("ext");
    match obj {
        ObjectT::Enumerated { ext, pos, .. } => {
            if let Some(v) = ext_value {
                *ext = v
                    .as_bool()
                    .ok_or_else(|| SchemaError::MalformedConstraint { pos: *pos, detail: "ext must be a bool".into() })?;
            }
        }
        ObjectT::Pattern { pos, .. } => {
            if ext_value.is_some() {
                return Err(SchemaError::MalformedConstraint {
                    pos: *pos,
                    detail: "ext is only valid on enumerated objects".into(),
                });
            }
        }
    }
    match obj {
        ObjectT::Enumerated { constraints: c, .. } | ObjectT::Pattern { constraints: c, .. } => {
            *c = constraints;
        }
    }
    Ok(())
}

/// Constraints := '<' Constraint (',' Constraint)* '>'. `aliases = None`
/// means "accept any constraint name" (used for host-registered scalar
/// kinds, whose validators the registry owns); `Some(&[])` means "no
/// constraints are valid here at all".
fn parse_constraints_opt(ts: &mut TokenStream, aliases: Option<&[(&str, &str)]>) -> Result<Constraints, SchemaError> {
    ts.skip_whitespace();
    if !matches!(ts.peek(), TokenKind::LAngle) {
        return Ok(Constraints::new());
    }
    ts.bump();
    let mut constraints = Constraints::new();
    loop {
        ts.skip_whitespace();
        if matches!(ts.peek(), TokenKind::RAngle) {
            ts.bump();
            break;
        }
        let name_pos = ts.peek_pos();
        let name = match ts.peek().clone() {
            TokenKind::Ident(n) => {
                ts.bump();
                n
            }
            other => {
                return Err(SchemaError::MalformedConstraint {
                    pos: name_pos,
                    detail: format!("expected a constraint name, found {}", other.describe()),
                })
            }
        };
        let canonical = match aliases {
            None => name.clone(),
            Some(table) => match table.iter().find(|(from, _)| *from == name) {
                Some((_, to)) => to.to_string(),
                None => {
                    return Err(SchemaError::MalformedConstraint {
                        pos: name_pos,
                        detail: format!("constraint {name:?} is not valid here"),
                    })
                }
            },
        };
        ts.skip_whitespace();
        expect_schema(ts, &TokenKind::Equal, "'='")?;
        ts.skip_whitespace();
        let value = parse_constraint_value(ts)?;
        constraints.insert(canonical, value);
        ts.skip_whitespace();
        match ts.peek() {
            TokenKind::Comma => {
                ts.bump();
            }
            TokenKind::RAngle => {
                ts.bump();
                break;
            }
            _ => return Err(SchemaError::MissingClosingAngle { pos: ts.peek_pos() }),
        }
    }
    Ok(constraints)
}

fn parse_constraint_value(ts: &mut TokenStream) -> Result<crate::schema::types::ConstraintValue, SchemaError> {
    use crate::schema::types::ConstraintValue;
    let pos = ts.peek_pos();
    match ts.peek().clone() {
        TokenKind::String(s) | TokenKind::SingleString(s) => {
            ts.bump();
            Ok(ConstraintValue::String(s))
        }
        TokenKind::Int(n) => {
            ts.bump();
            Ok(ConstraintValue::Int(n))
        }
        TokenKind::Float(n) => {
            ts.bump();
            Ok(ConstraintValue::Float(n))
        }
        TokenKind::Bool(b) => {
            ts.bump();
            Ok(ConstraintValue::Bool(b))
        }
        TokenKind::Null => {
            ts.bump();
            Ok(ConstraintValue::Null)
        }
        TokenKind::LBracket => {
            ts.bump();
            let mut items = Vec::new();
            loop {
                ts.skip_whitespace();
                if matches!(ts.peek(), TokenKind::RBracket) {
                    ts.bump();
                    break;
                }
                items.push(parse_constraint_value(ts)?);
                ts.skip_whitespace();
                match ts.peek() {
                    TokenKind::Comma => {
                        ts.bump();
                    }
                    TokenKind::RBracket => {
                        ts.bump();
                        break;
                    }
                    other => {
                        return Err(SchemaError::MalformedConstraint {
                            pos: ts.peek_pos(),
                            detail: format!("expected ',' or ']', found {}", other.describe()),
                        })
                    }
                }
            }
            Ok(ConstraintValue::List(items))
        }
        other => Err(SchemaError::MalformedConstraint { pos, detail: format!("unexpected {} in constraint value", other.describe()) }),
    }
}
