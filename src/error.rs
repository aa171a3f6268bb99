//! Error taxonomy (spec §7). Every variant carries the position and/or
//! path a caller needs to show a user-facing message without further
//! lookups.

use crate::position::Position;
use thiserror::Error;

/// Errors produced while turning source text into a token stream (C1).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("{pos}: unterminated string starting here")]
    UnterminatedString { pos: Position },

    #[error("{pos}: unexpected character {ch:?}")]
    UnexpectedChar { pos: Position, ch: char },

    #[error("{pos}: malformed number literal {text:?}")]
    MalformedNumber { pos: Position, text: String },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            Self::UnterminatedString { pos }
            | Self::UnexpectedChar { pos, .. }
            | Self::MalformedNumber { pos, .. } => *pos,
        }
    }
}

/// Errors produced while building the structural AST (C2) or attaching
/// comments (C3).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("{pos}: unexpected token, expected {expected}, found {got}")]
    UnexpectedToken {
        pos: Position,
        expected: String,
        got: String,
    },

    #[error("{pos}: duplicate key {name:?}")]
    DuplicateKey { pos: Position, name: String },

    #[error("{open_pos}: unterminated {kind}")]
    Unterminated { open_pos: Position, kind: String },

    #[error("{pos}: missing comma between container elements")]
    MissingComma { pos: Position },

    #[error("{pos}: multiple inline comments on the same element")]
    MultipleInlineComments { pos: Position },

    #[error("{pos}: reserved word {name:?} may not be used as an unquoted key")]
    ReservedKey { pos: Position, name: String },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            Self::UnexpectedToken { pos, .. }
            | Self::DuplicateKey { pos, .. }
            | Self::Unterminated { open_pos: pos, .. }
            | Self::MissingComma { pos }
            | Self::MultipleInlineComments { pos }
            | Self::ReservedKey { pos, .. } => *pos,
        }
    }
}

/// Errors produced while parsing a schema (C4).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("{pos}: unknown type name {name:?}")]
    UnknownType { pos: Position, name: String },

    #[error("{pos}: malformed constraint {detail}")]
    MalformedConstraint { pos: Position, detail: String },

    #[error("{pos}: default value for field {field:?} does not satisfy its own type: {detail}")]
    InvalidDefault {
        pos: Position,
        field: String,
        detail: String,
    },

    #[error("{pos}: pattern-typed object cannot be nested with a key colliding with enumerated form")]
    PatternEnumCollision { pos: Position },

    #[error("{pos}: missing closing angle bracket for constraint list")]
    MissingClosingAngle { pos: Position },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Lex(#[from] LexError),
}

/// A single kind of constraint/type-match failure, nested under
/// [`ValidationErrorKind`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstraintViolationKind {
    #[error("length {actual} is below minimum {min}")]
    MinLength { min: usize, actual: usize },
    #[error("length {actual} exceeds maximum {max}")]
    MaxLength { max: usize, actual: usize },
    #[error("value does not match pattern {pattern:?}")]
    Pattern { pattern: String },
    #[error("value is not one of the allowed enum values")]
    Enum,
    #[error("value does not satisfy format {format:?}")]
    Format { format: String },
    #[error("value {actual} is below minimum {min}")]
    Min { min: String, actual: String },
    #[error("value {actual} exceeds maximum {max}")]
    Max { max: String, actual: String },
    #[error("fractional precision exceeds {max_digits} digits")]
    Precision { max_digits: usize },
    #[error("list has {actual} items, fewer than minimum {min}")]
    MinItems { min: usize, actual: usize },
    #[error("list has {actual} items, more than maximum {max}")]
    MaxItems { max: usize, actual: usize },
    #[error("list contains duplicate items")]
    Unique,
    #[error("object has {actual} properties, fewer than minimum {min}")]
    MinProperties { min: usize, actual: usize },
    #[error("object has {actual} properties, more than maximum {max}")]
    MaxProperties { max: usize, actual: usize },
    #[error("object is missing required key {key:?}")]
    RequiredKey { key: String },
}

/// A single validation failure (C6), always path-qualified.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationErrorKind {
    #[error("missing required field")]
    MissingRequiredField,
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("unknown field not declared by the schema")]
    UnknownField,
    #[error("constraint violation: {0}")]
    ConstraintViolation(ConstraintViolationKind),
    #[error("no alternative of the union matched")]
    UnionNoMatch,
}

/// A validation error with the path of the offending value (spec §4.5, §7).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{path}: {kind}")]
pub struct ValidationError {
    pub path: String,
    pub kind: ValidationErrorKind,
}

/// Errors produced by the version-compatibility gate (§6.2).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VersionError {
    #[error("{pos}: malformed version string {text:?}")]
    InvalidFormat { pos: Position, text: String },
    #[error("document requires ftml {doc}, parser supports up to {parser}")]
    Incompatible { doc: String, parser: String },
    #[error("{pos}: ftml_version must be a string")]
    NonString { pos: Position },
}

/// Errors produced while reconciling a mutated value tree back into an
/// AST (C7) or serializing an AST to text (C8).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconcileError {
    #[error("cycle detected in value tree at {path}")]
    Cycle { path: String },
    #[error("non-string key encountered while reconciling object at {path}")]
    NonStringKey { path: String },
    #[error("comment contains a newline: {comment:?}")]
    CommentContainsNewline { comment: String },
}

/// Top-level crate error, composing every taxonomy bucket.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("{0:?}")]
    Validation(Vec<ValidationError>),
    #[error(transparent)]
    Version(#[from] VersionError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

pub type Result<T> = std::result::Result<T, Error>;
