//! FlexTag Markup Language (FTML): a comment-preserving configuration
//! format with an optional schema layer.
//!
//! The pipeline is a straight line from source text to a host-facing
//! value tree and back:
//!
//! ```text
//! text -> tokenize (C1) -> parse_document (C2/C3) -> extract (value tree)
//!      -> [schema validate] -> host mutates the value tree
//!      -> reconcile (C7) -> serialize (C8) -> text
//! ```
//!
//! [`parse`] and [`dump`] are the two convenience entry points most
//! callers need; the stage functions (`extract`, `reconcile`,
//! `serializer::serialize`) are exposed directly for callers that want
//! to drive the pipeline by hand, e.g. to validate against a schema
//! between load and dump.

mod ast;
mod comments;
mod diagnostics;
mod error;
mod extract;
mod lexer;
mod parser;
mod position;
mod reconcile;
pub mod schema;
mod serializer;
mod token;
mod validator;
mod value;
mod version;

pub use ast::{CommentLine, Document, KeyValue, ListNode, ObjectNode, Scalar, ScalarNode, ValueNode};
pub use diagnostics::{Diagnostic, DiagnosticSink, NullSink, Severity};
pub use error::{
    ConstraintViolationKind, Error, LexError, ParseError, ReconcileError, Result, SchemaError,
    ValidationError, ValidationErrorKind, VersionError,
};
pub use extract::extract;
pub use position::Position;
pub use reconcile::reconcile;
pub use schema::registry::{ScalarDef, ScalarPredicate, TypeRegistry};
pub use schema::types::{ListT, ObjectT, ScalarKind, ScalarT, TypeDescriptor, UnionT};
pub use schema::Schema;
pub use serializer::serialize;
pub use validator::{validate, ValidateOptions};
pub use value::{AstRef, OrderedMap, Path, PathSegment, Value, ValueList, ValueObject};
pub use version::{check_compatibility, Version, PARSER_VERSION};

/// Caller-tunable behavior for [`parse`] and [`dump`] (spec §6.4).
///
/// The same struct drives both directions, so `apply_defaults` in
/// particular means different things to a caller loading vs. dumping:
/// most callers want it `true` on load (fill in schema defaults) and
/// don't touch it on dump (the serializer ignores it entirely; only
/// [`Schema::validate`] reads it).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Reject documents with unknown object fields or values that miss
    /// their schema type (spec §4.5).
    pub strict: bool,
    /// Preserve existing comments across a load/mutate/dump cycle
    /// (spec §4.6). Turning this off still parses comments (C3 always
    /// runs); it only affects whether [`reconcile`] is given the
    /// original document to diff against.
    pub preserve_comments: bool,
    /// Fill in schema defaults for missing fields during validation.
    pub apply_defaults: bool,
    /// Run the `ftml_version` compatibility gate before parsing the
    /// rest of the document (spec §6.2).
    pub check_version: bool,
    /// Indent width used by the serializer for multiline containers.
    pub indent_spaces: usize,
    /// Object/list child count above which the serializer switches
    /// from inline to multiline formatting, absent any comments that
    /// would force multiline regardless.
    pub inline_threshold: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict: true,
            preserve_comments: true,
            apply_defaults: true,
            check_version: true,
            indent_spaces: 4,
            inline_threshold: 4,
        }
    }
}

/// A document plus the raw value tree extracted from it, returned by
/// [`parse`]. Keeping both lets a caller validate/mutate the value
/// tree and later [`reconcile`] it against `doc` to preserve comments.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub doc: Document,
    pub value: Value,
}

/// Parses FTML source text into a [`Parsed`] document/value pair.
///
/// Runs the version gate first when `config.check_version` is set
/// (spec §6.2: "a gate before the core parser runs"), then tokenizes,
/// builds the structural+commented AST (C2/C3), and extracts the
/// host-facing value tree (spec §2's "host obtains a value tree").
///
/// Only the first lexer or parser error is surfaced; see
/// [`parse_collecting_errors`] to recover every parse error the
/// document contains.
pub fn parse(text: &str, config: &Config) -> Result<Parsed> {
    let (doc, mut errors) = parse_collecting_errors(text, config)?;
    if let Some(first) = errors.drain(..).next() {
        return Err(Error::Parse(first));
    }
    let value = extract::extract(&doc);
    Ok(Parsed { doc, value })
}

/// Like [`parse`], but returns every accumulated [`ParseError`] instead
/// of stopping at the first one (the document parser recovers past
/// most structural errors; spec §4.2's failure-mode table).
pub fn parse_collecting_errors(text: &str, config: &Config) -> Result<(Document, Vec<ParseError>)> {
    let tokens = lexer::tokenize(text)?;
    if config.check_version {
        let declared = version_declaration(&tokens);
        version::check_compatibility(declared)?;
    }
    Ok(parser::parse_document(&tokens))
}

fn version_declaration(tokens: &[token::Token]) -> Option<(&str, Position)> {
    use token::TokenKind;
    let mut i = 0;
    while i < tokens.len() {
        match &tokens[i].kind {
            TokenKind::Ident(name) if name == "ftml_version" => {
                let mut j = i + 1;
                while j < tokens.len() && matches!(tokens[j].kind, TokenKind::Whitespace) {
                    j += 1;
                }
                if matches!(tokens.get(j).map(|t| &t.kind), Some(TokenKind::Equal)) {
                    j += 1;
                    while j < tokens.len() && matches!(tokens[j].kind, TokenKind::Whitespace) {
                        j += 1;
                    }
                    if let Some(tok) = tokens.get(j) {
                        if let TokenKind::String(s) | TokenKind::SingleString(s) = &tok.kind {
                            return Some((s.as_str(), tokens[i].pos));
                        }
                    }
                }
                return None;
            }
            TokenKind::Newline | TokenKind::Whitespace | TokenKind::Comment(_) | TokenKind::OuterDoc(_) | TokenKind::InnerDoc(_) => {}
            _ => return None,
        }
        i += 1;
    }
    None
}

/// Serializes `value` to FTML source text, reconciling it against
/// `original` first when present so unchanged structure keeps its
/// comments (spec §4.6/§4.7). Pass `None` for a value tree built from
/// scratch by the host.
pub fn dump(value: &Value, original: Option<&Document>, config: &Config) -> Result<String> {
    let doc = reconcile::reconcile(value, if config.preserve_comments { original } else { None })?;
    Ok(serializer::serialize(&doc, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_then_dump_preserves_untouched_comments() {
        let src = "name = \"App\"  // inline\nversion = \"1.0\"\n";
        let config = Config::default();
        let parsed = parse(src, &config).unwrap();
        let mut value = parsed.value.clone();
        if let Value::Object(o) = &mut value {
            o.items.insert("version", Value::String("1.1".into()));
        }
        let out = dump(&value, Some(&parsed.doc), &config).unwrap();
        assert!(out.contains("// inline"));
        assert!(out.contains("1.1"));
    }

    #[test]
    fn version_gate_runs_before_structural_parse() {
        let config = Config::default();
        let err = parse("ftml_version = \"2.0\"\nname = \"x\"\n", &config).unwrap_err();
        assert!(matches!(err, Error::Version(_)));
    }

    #[test]
    fn version_gate_can_be_disabled() {
        let config = Config { check_version: false, ..Config::default() };
        assert!(parse("ftml_version = \"2.0\"\nname = \"x\"\n", &config).is_ok());
    }
}
