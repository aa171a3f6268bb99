//! C2 (document structure) driving the grammar of spec §4.2, attaching
//! comments per the rules of §4.3 (see `comments.rs`) as it walks the
//! token stream exactly once.

use crate::ast::{Document, KeyValue, ListNode, ObjectNode, Scalar, ScalarNode, ValueNode};
use crate::comments::{
    classify_orphans, collect_until_structural, split_leading_inner_docs,
    split_trailing_outer_docs, take_inline,
};
use crate::error::ParseError;
use crate::position::Position;
use crate::token::{is_reserved_word, Token, TokenKind};

pub(crate) struct TokenStream<'a> {
    tokens: &'a [Token],
    idx: usize,
}

impl<'a> TokenStream<'a> {
    pub(crate) fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, idx: 0 }
    }

    pub(crate) fn peek(&self) -> &TokenKind {
        &self.tokens[self.idx.min(self.tokens.len() - 1)].kind
    }

    pub(crate) fn peek_pos(&self) -> Position {
        self.tokens[self.idx.min(self.tokens.len() - 1)].pos
    }

    pub(crate) fn bump(&mut self) -> &Token {
        let i = self.idx.min(self.tokens.len() - 1);
        self.idx = i + 1;
        &self.tokens[i]
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while matches!(self.peek(), TokenKind::Whitespace) {
            self.bump();
        }
    }

    pub(crate) fn mark(&self) -> usize {
        self.idx
    }

    pub(crate) fn reset(&mut self, mark: usize) {
        self.idx = mark;
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }
}

/// Parses a full document, returning the best-effort AST plus any
/// errors recovered from along the way (spec §4.2 error recovery).
pub fn parse_document(tokens: &[Token]) -> (Document, Vec<ParseError>) {
    let mut ts = TokenStream::new(tokens);
    let mut errors = Vec::new();
    let mut doc = Document::new();

    let (pending, _) = collect_until_structural(&mut ts);
    let (inner_docs, rest) = split_leading_inner_docs(&pending);
    doc.inner_doc_comments = inner_docs;
    let mut carry: Vec<crate::comments::Pending> = rest.to_vec();

    loop {
        ts.skip_whitespace();
        if ts.at_eof() {
            // rule 5 (document scope): orphan trailing comments.
            doc.trailing_leading_comments
                .extend(carry.into_iter().map(|p| p.text));
            break;
        }
        let (leading, outer_docs) = split_trailing_outer_docs(&carry);
        match parse_key_value(&mut ts, &mut errors) {
            Ok(mut kv) => {
                kv.leading_comments = leading;
                kv.outer_doc_comments = outer_docs;
                match take_inline(&mut ts) {
                    Ok(comment) => kv.inline_comment = comment,
                    Err(e) => errors.push(e),
                }
                if doc.items.contains_key(&kv.key) {
                    errors.push(ParseError::DuplicateKey { pos: kv.pos, name: kv.key.clone() });
                } else {
                    doc.items.insert(kv.key.clone(), kv);
                }
            }
            Err(e) => {
                errors.push(e);
                recover_root(&mut ts);
            }
        }
        let (pending, _) = collect_until_structural(&mut ts);
        carry = pending;
        if ts.at_eof() {
            doc.trailing_leading_comments
                .extend(carry.into_iter().map(|p| p.text));
            break;
        }
    }

    if doc.items.is_empty() {
        // rule 7: empty document - every comment collapses into
        // leading_comments, inner-doc and trailing distinctions included.
        let mut all = doc.inner_doc_comments.drain(..).collect::<Vec<_>>();
        all.extend(doc.trailing_leading_comments.drain(..));
        doc.leading_comments = all;
    }

    (doc, errors)
}

/// Skip to the next `Newline` (or EOF) so the next root entry can be
/// attempted, per spec §4.2 root-level recovery.
fn recover_root(ts: &mut TokenStream) {
    loop {
        match ts.peek() {
            TokenKind::Newline | TokenKind::Eof => break,
            _ => {
                ts.bump();
            }
        }
    }
}

/// Skip to the next `Comma` or matching closing delimiter, tracking
/// nested openers so we don't pop past our own scope (§4.2).
fn recover_container(ts: &mut TokenStream, open: &TokenKind, close: &TokenKind) {
    let mut depth = 0usize;
    loop {
        match ts.peek() {
            TokenKind::Eof => break,
            TokenKind::Comma if depth == 0 => break,
            k if k == close && depth == 0 => break,
            k if k == open => {
                depth += 1;
                ts.bump();
            }
            k if k == close => {
                depth -= 1;
                ts.bump();
            }
            _ => {
                ts.bump();
            }
        }
    }
}

fn parse_key(ts: &mut TokenStream) -> Result<(String, bool, Position), ParseError> {
    let pos = ts.peek_pos();
    match ts.peek().clone() {
        TokenKind::Ident(name) => {
            if is_reserved_word(&name) {
                return Err(ParseError::ReservedKey { pos, name });
            }
            ts.bump();
            Ok((name, false, pos))
        }
        TokenKind::String(s) | TokenKind::SingleString(s) => {
            ts.bump();
            Ok((s, true, pos))
        }
        other => Err(ParseError::UnexpectedToken {
            pos,
            expected: "a key".into(),
            got: other.describe(),
        }),
    }
}

fn expect(ts: &mut TokenStream, expected: &TokenKind, label: &str) -> Result<(), ParseError> {
    ts.skip_whitespace();
    if ts.peek() == expected {
        ts.bump();
        Ok(())
    } else {
        Err(ParseError::UnexpectedToken {
            pos: ts.peek_pos(),
            expected: label.into(),
            got: ts.peek().describe(),
        })
    }
}

fn parse_key_value(ts: &mut TokenStream, errors: &mut Vec<ParseError>) -> Result<KeyValue, ParseError> {
    ts.skip_whitespace();
    let (key, key_is_quoted, pos) = parse_key(ts)?;
    expect(ts, &TokenKind::Equal, "'='")?;
    ts.skip_whitespace();
    let value = parse_value(ts, errors)?;
    Ok(KeyValue {
        key,
        key_is_quoted,
        value,
        leading_comments: Vec::new(),
        inline_comment: None,
        outer_doc_comments: Vec::new(),
        pos,
    })
}

fn parse_value(ts: &mut TokenStream, errors: &mut Vec<ParseError>) -> Result<ValueNode, ParseError> {
    ts.skip_whitespace();
    let pos = ts.peek_pos();
    match ts.peek().clone() {
        TokenKind::String(s) => {
            ts.bump();
            Ok(ValueNode::Scalar(ScalarNode {
                value: Scalar::String(s),
                leading_comments: Vec::new(),
                inline_comment: None,
                pos,
            }))
        }
        TokenKind::SingleString(s) => {
            ts.bump();
            Ok(ValueNode::Scalar(ScalarNode {
                value: Scalar::String(s),
                leading_comments: Vec::new(),
                inline_comment: None,
                pos,
            }))
        }
        TokenKind::Int(n) => {
            ts.bump();
            Ok(ValueNode::Scalar(ScalarNode {
                value: Scalar::Int(n),
                leading_comments: Vec::new(),
                inline_comment: None,
                pos,
            }))
        }
        TokenKind::Float(n) => {
            ts.bump();
            Ok(ValueNode::Scalar(ScalarNode {
                value: Scalar::Float(n),
                leading_comments: Vec::new(),
                inline_comment: None,
                pos,
            }))
        }
        TokenKind::Bool(b) => {
            ts.bump();
            Ok(ValueNode::Scalar(ScalarNode {
                value: Scalar::Bool(b),
                leading_comments: Vec::new(),
                inline_comment: None,
                pos,
            }))
        }
        TokenKind::Null => {
            ts.bump();
            Ok(ValueNode::Scalar(ScalarNode {
                value: Scalar::Null,
                leading_comments: Vec::new(),
                inline_comment: None,
                pos,
            }))
        }
        TokenKind::LBrace => Ok(ValueNode::Object(parse_object(ts, errors, pos)?)),
        TokenKind::LBracket => Ok(ValueNode::List(parse_list(ts, errors, pos)?)),
        other => Err(ParseError::UnexpectedToken {
            pos,
            expected: "a value".into(),
            got: other.describe(),
        }),
    }
}

fn parse_object(
    ts: &mut TokenStream,
    errors: &mut Vec<ParseError>,
    pos: Position,
) -> Result<ObjectNode, ParseError> {
    ts.bump(); // '{'
    let mut node = ObjectNode { pos, ..Default::default() };
    if let Some(c) = take_inline(ts)? {
        node.inline_comment = Some(c);
    }

    let (pending, mut carry_gap) = collect_until_structural(ts);
    let (inner_docs, rest) = split_leading_inner_docs(&pending);
    node.inner_doc_comments = inner_docs;
    let mut carry = rest.to_vec();

    loop {
        ts.skip_whitespace();
        if matches!(ts.peek(), TokenKind::RBrace) {
            let orphans = classify_orphans(carry, carry_gap);
            node.leading_comments = orphans.leading_comments;
            node.inline_comment_end = orphans.inline_comment_end;
            ts.bump();
            break;
        }
        if matches!(ts.peek(), TokenKind::Eof) {
            errors.push(ParseError::Unterminated { open_pos: pos, kind: "object".into() });
            break;
        }
        let (leading, outer_docs) = split_trailing_outer_docs(&carry);
        match parse_key_value(ts, errors) {
            Ok(mut kv) => {
                kv.leading_comments = leading;
                kv.outer_doc_comments = outer_docs;
                match take_inline(ts) {
                    Ok(c) => kv.inline_comment = c,
                    Err(e) => errors.push(e),
                }
                if node.items.contains_key(&kv.key) {
                    errors.push(ParseError::DuplicateKey { pos: kv.pos, name: kv.key.clone() });
                } else {
                    node.items.insert(kv.key.clone(), kv);
                }
            }
            Err(e) => {
                errors.push(e);
                recover_container(ts, &TokenKind::LBrace, &TokenKind::RBrace);
            }
        }
        ts.skip_whitespace();
        if matches!(ts.peek(), TokenKind::Comma) {
            ts.bump();
        } else if !matches!(ts.peek(), TokenKind::RBrace | TokenKind::Eof) {
            errors.push(ParseError::MissingComma { pos: ts.peek_pos() });
        }
        let (pending, gap) = collect_until_structural(ts);
        carry = pending;
        carry_gap = gap;
    }
    Ok(node)
}

fn parse_list(
    ts: &mut TokenStream,
    errors: &mut Vec<ParseError>,
    pos: Position,
) -> Result<ListNode, ParseError> {
    ts.bump(); // '['
    let mut node = ListNode { pos, ..Default::default() };
    if let Some(c) = take_inline(ts)? {
        node.inline_comment = Some(c);
    }

    let (pending, mut carry_gap) = collect_until_structural(ts);
    let (inner_docs, rest) = split_leading_inner_docs(&pending);
    node.inner_doc_comments = inner_docs;
    let mut carry = rest.to_vec();

    loop {
        ts.skip_whitespace();
        if matches!(ts.peek(), TokenKind::RBracket) {
            let orphans = classify_orphans(carry, carry_gap);
            node.leading_comments = orphans.leading_comments;
            node.inline_comment_end = orphans.inline_comment_end;
            ts.bump();
            break;
        }
        if matches!(ts.peek(), TokenKind::Eof) {
            errors.push(ParseError::Unterminated { open_pos: pos, kind: "list".into() });
            break;
        }
        // list items have no KeyValue wrapper, so any pending comments
        // (outer-doc runs included) simply become the item's leading
        // comments (I2: outer docs attach only to KeyValue).
        let leading: Vec<String> = carry.iter().map(|p| p.text.clone()).collect();
        match parse_value(ts, errors) {
            Ok(mut value) => {
                value.leading_comments_mut().extend(leading);
                match take_inline(ts) {
                    Ok(Some(c)) => value.set_inline_comment(c),
                    Ok(None) => {}
                    Err(e) => errors.push(e),
                }
                node.items.push(value);
            }
            Err(e) => {
                errors.push(e);
                recover_container(ts, &TokenKind::LBracket, &TokenKind::RBracket);
            }
        }
        ts.skip_whitespace();
        if matches!(ts.peek(), TokenKind::Comma) {
            ts.bump();
        } else if !matches!(ts.peek(), TokenKind::RBracket | TokenKind::Eof) {
            errors.push(ParseError::MissingComma { pos: ts.peek_pos() });
        }
        let (pending, gap) = collect_until_structural(ts);
        carry = pending;
        carry_gap = gap;
    }
    Ok(node)
}

/// Parses a bare data expression (the `Value` production of §4.2) into
/// the host-facing [`crate::value::Value`] rather than an AST
/// `ValueNode` — used by the schema parser (C4) for default-value
/// expressions, which never need comment slots of their own.
pub(crate) fn parse_data_value(ts: &mut TokenStream) -> Result<crate::value::Value, ParseError> {
    use crate::value::Value;

    ts.skip_whitespace();
    let pos = ts.peek_pos();
    match ts.peek().clone() {
        TokenKind::String(s) | TokenKind::SingleString(s) => {
            ts.bump();
            Ok(Value::String(s))
        }
        TokenKind::Int(n) => {
            ts.bump();
            Ok(Value::Int(n))
        }
        TokenKind::Float(n) => {
            ts.bump();
            Ok(Value::Float(n))
        }
        TokenKind::Bool(b) => {
            ts.bump();
            Ok(Value::Bool(b))
        }
        TokenKind::Null => {
            ts.bump();
            Ok(Value::Null)
        }
        TokenKind::LBrace => {
            ts.bump();
            let mut obj = Value::object();
            loop {
                skip_trivia(ts);
                if matches!(ts.peek(), TokenKind::RBrace) {
                    ts.bump();
                    break;
                }
                let (key, _, _) = parse_key(ts)?;
                expect(ts, &TokenKind::Equal, "'='")?;
                let value = parse_data_value(ts)?;
                if let Value::Object(o) = &mut obj {
                    o.items.insert(key, value);
                }
                skip_trivia(ts);
                if matches!(ts.peek(), TokenKind::Comma) {
                    ts.bump();
                } else if !matches!(ts.peek(), TokenKind::RBrace) {
                    return Err(ParseError::MissingComma { pos: ts.peek_pos() });
                }
            }
            Ok(obj)
        }
        TokenKind::LBracket => {
            ts.bump();
            let mut list = Value::list();
            loop {
                skip_trivia(ts);
                if matches!(ts.peek(), TokenKind::RBracket) {
                    ts.bump();
                    break;
                }
                let value = parse_data_value(ts)?;
                if let Value::List(l) = &mut list {
                    l.items.push(value);
                }
                skip_trivia(ts);
                if matches!(ts.peek(), TokenKind::Comma) {
                    ts.bump();
                } else if !matches!(ts.peek(), TokenKind::RBracket) {
                    return Err(ParseError::MissingComma { pos: ts.peek_pos() });
                }
            }
            Ok(list)
        }
        other => Err(ParseError::UnexpectedToken { pos, expected: "a value".into(), got: other.describe() }),
    }
}

fn skip_trivia(ts: &mut TokenStream) {
    loop {
        match ts.peek() {
            TokenKind::Whitespace | TokenKind::Newline => {
                ts.bump();
            }
            _ => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_ok(src: &str) -> Document {
        let tokens = tokenize(src).unwrap();
        let (doc, errors) = parse_document(&tokens);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        doc
    }

    #[test]
    fn basic_key_values() {
        let doc = parse_ok("name = \"App\"\nversion = \"1.0\"\n");
        assert_eq!(doc.items.len(), 2);
        assert!(doc.items.contains_key("name"));
        assert!(doc.items.contains_key("version"));
    }

    #[test]
    fn duplicate_key_errors() {
        let tokens = tokenize("a = 1\na = 2\n").unwrap();
        let (_, errors) = parse_document(&tokens);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ParseError::DuplicateKey { .. }));
    }

    #[test]
    fn nested_object_and_list() {
        let doc = parse_ok("user = { name = \"A\", tags = [1, 2, 3] }\n");
        let kv = doc.items.get("user").unwrap();
        match &kv.value {
            ValueNode::Object(o) => {
                assert!(o.items.contains_key("name"));
                assert!(o.items.contains_key("tags"));
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn reserved_word_key_rejected() {
        let tokens = tokenize("int = 1\n").unwrap();
        let (_, errors) = parse_document(&tokens);
        assert!(matches!(errors[0], ParseError::ReservedKey { .. }));
    }

    #[test]
    fn quoted_key_allows_reserved_word() {
        let doc = parse_ok("\"int\" = 1\n");
        assert!(doc.items.contains_key("int"));
    }
}
