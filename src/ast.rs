//! AST node variants (spec §3), filled by C2 (structure) then C3
//! (comments). Mirrors the teacher's `ast/elements` split between node
//! identity and attached metadata, but flattened into one module since
//! FTML has a small, closed set of node kinds (no element registry).

use crate::position::Position;
use crate::value::OrderedMap;

/// A single comment/doc-comment line of source text, verbatim (including
/// its `//`, `///` or `//!` prefix).
pub type CommentLine = String;

/// The root node of a parsed document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub items: OrderedMap<KeyValue>,
    pub leading_comments: Vec<CommentLine>,
    pub inline_comment: Option<CommentLine>,
    pub inner_doc_comments: Vec<CommentLine>,
    pub trailing_leading_comments: Vec<CommentLine>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A `key = value` entry, either at document root or inside an object.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub key_is_quoted: bool,
    pub value: ValueNode,
    pub leading_comments: Vec<CommentLine>,
    pub inline_comment: Option<CommentLine>,
    pub outer_doc_comments: Vec<CommentLine>,
    pub pos: Position,
}

impl KeyValue {
    pub fn new(key: String, key_is_quoted: bool, value: ValueNode, pos: Position) -> Self {
        Self {
            key,
            key_is_quoted,
            value,
            leading_comments: Vec::new(),
            inline_comment: None,
            outer_doc_comments: Vec::new(),
            pos,
        }
    }
}

/// A scalar value as written in source (before any type coercion).
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarNode {
    pub value: Scalar,
    pub leading_comments: Vec<CommentLine>,
    pub inline_comment: Option<CommentLine>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectNode {
    pub items: OrderedMap<KeyValue>,
    pub inner_doc_comments: Vec<CommentLine>,
    pub inline_comment: Option<CommentLine>,
    pub inline_comment_end: Option<CommentLine>,
    pub leading_comments: Vec<CommentLine>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListNode {
    pub items: Vec<ValueNode>,
    pub inner_doc_comments: Vec<CommentLine>,
    pub inline_comment: Option<CommentLine>,
    pub inline_comment_end: Option<CommentLine>,
    pub leading_comments: Vec<CommentLine>,
    pub pos: Position,
}

/// A value as it appears in the AST: scalar, object or list, each with
/// its own comment slots (spec §3 `ValueNode`).
#[derive(Debug, Clone, PartialEq)]
pub enum ValueNode {
    Scalar(ScalarNode),
    Object(ObjectNode),
    List(ListNode),
}

impl ValueNode {
    pub fn pos(&self) -> Position {
        match self {
            Self::Scalar(s) => s.pos,
            Self::Object(o) => o.pos,
            Self::List(l) => l.pos,
        }
    }

    pub fn leading_comments(&self) -> &[CommentLine] {
        match self {
            Self::Scalar(s) => &s.leading_comments,
            Self::Object(o) => &o.leading_comments,
            Self::List(l) => &l.leading_comments,
        }
    }

    pub fn leading_comments_mut(&mut self) -> &mut Vec<CommentLine> {
        match self {
            Self::Scalar(s) => &mut s.leading_comments,
            Self::Object(o) => &mut o.leading_comments,
            Self::List(l) => &mut l.leading_comments,
        }
    }

    pub fn inline_comment(&self) -> Option<&CommentLine> {
        match self {
            Self::Scalar(s) => s.inline_comment.as_ref(),
            Self::Object(o) => o.inline_comment.as_ref(),
            Self::List(l) => l.inline_comment.as_ref(),
        }
    }

    pub fn set_inline_comment(&mut self, comment: CommentLine) {
        match self {
            Self::Scalar(s) => s.inline_comment = Some(comment),
            Self::Object(o) => o.inline_comment = Some(comment),
            Self::List(l) => l.inline_comment = Some(comment),
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Object(_) | Self::List(_))
    }
}
