//! C8: deterministic AST → text, designed for round-trip stability
//! rather than minimality (spec §4.7).

use crate::ast::{Document, KeyValue, ListNode, ObjectNode, Scalar, ValueNode};
use crate::error::ReconcileError;
use crate::token::is_reserved_word;
use crate::Config;

const RESERVED_ROOT_ORDER: [&str; 2] = ["ftml_version", "ftml_encoding"];

/// Serializes `doc` to FTML source text under `config`.
pub fn serialize(doc: &Document, config: &Config) -> Result<String, ReconcileError> {
    let mut out = String::new();

    for c in &doc.inner_doc_comments {
        push_indented_comment(&mut out, c, 0, config)?;
    }

    let mut order: Vec<&str> = Vec::new();
    for reserved in RESERVED_ROOT_ORDER {
        if doc.items.contains_key(reserved) {
            order.push(reserved);
        }
    }
    for (k, _) in doc.items.iter() {
        if !order.contains(&k) {
            order.push(k);
        }
    }

    let mut first = true;
    for key in &order {
        let kv = doc.items.get(key).expect("key came from doc.items");
        if !first {
            out.push('\n');
        }
        first = false;
        emit_key_value(&mut out, kv, 0, config, "")?;
    }

    if !doc.trailing_leading_comments.is_empty() {
        if !first {
            out.push('\n');
        }
        for c in &doc.trailing_leading_comments {
            push_indented_comment(&mut out, c, 0, config)?;
        }
    }

    Ok(out)
}

fn check_comment(text: &str) -> Result<(), ReconcileError> {
    if text.contains('\n') {
        Err(ReconcileError::CommentContainsNewline { comment: text.to_string() })
    } else {
        Ok(())
    }
}

fn push_indent(out: &mut String, indent: usize, config: &Config) {
    for _ in 0..(indent * config.indent_spaces) {
        out.push(' ');
    }
}

fn push_indented_comment(out: &mut String, text: &str, indent: usize, config: &Config) -> Result<(), ReconcileError> {
    check_comment(text)?;
    push_indent(out, indent, config);
    out.push_str(text);
    out.push('\n');
    Ok(())
}

fn emit_key_value(
    out: &mut String,
    kv: &KeyValue,
    indent: usize,
    config: &Config,
    terminator: &str,
) -> Result<(), ReconcileError> {
    for c in &kv.outer_doc_comments {
        push_indented_comment(out, c, indent, config)?;
    }
    for c in &kv.leading_comments {
        push_indented_comment(out, c, indent, config)?;
    }
    push_indent(out, indent, config);
    push_key(out, &kv.key, kv.key_is_quoted);
    out.push_str(" = ");
    emit_container_or_scalar(out, &kv.value, indent, config)?;
    out.push_str(terminator);
    if let Some(c) = &kv.inline_comment {
        check_comment(c)?;
        out.push_str("  ");
        out.push_str(c);
    }
    out.push('\n');
    Ok(())
}

fn emit_list_item(
    out: &mut String,
    item: &ValueNode,
    indent: usize,
    config: &Config,
    terminator: &str,
) -> Result<(), ReconcileError> {
    for c in item.leading_comments() {
        push_indented_comment(out, c, indent, config)?;
    }
    push_indent(out, indent, config);
    emit_container_or_scalar(out, item, indent, config)?;
    out.push_str(terminator);
    if let Some(c) = item.inline_comment() {
        check_comment(c)?;
        out.push_str("  ");
        out.push_str(c);
    }
    out.push('\n');
    Ok(())
}

fn emit_container_or_scalar(
    out: &mut String,
    value: &ValueNode,
    indent: usize,
    config: &Config,
) -> Result<(), ReconcileError> {
    match value {
        ValueNode::Scalar(s) => {
            emit_scalar(out, &s.value);
            Ok(())
        }
        ValueNode::Object(o) => emit_object(out, o, indent, config),
        ValueNode::List(l) => emit_list(out, l, indent, config),
    }
}

fn emit_object(out: &mut String, o: &ObjectNode, indent: usize, config: &Config) -> Result<(), ReconcileError> {
    if object_needs_multiline(o, config.inline_threshold) {
        out.push('{');
        if let Some(c) = &o.inline_comment {
            check_comment(c)?;
            out.push_str("  ");
            out.push_str(c);
        }
        out.push('\n');
        for c in &o.inner_doc_comments {
            push_indented_comment(out, c, indent + 1, config)?;
        }
        for (_, kv) in o.items.iter() {
            emit_key_value(out, kv, indent + 1, config, ",")?;
        }
        for c in &o.leading_comments {
            push_indented_comment(out, c, indent + 1, config)?;
        }
        if let Some(c) = &o.inline_comment_end {
            check_comment(c)?;
            push_indent(out, indent + 1, config);
            out.push_str(c);
            out.push('\n');
        }
        push_indent(out, indent, config);
        out.push('}');
    } else if o.items.is_empty() {
        out.push_str("{}");
    } else {
        out.push_str("{ ");
        let mut first = true;
        for (_, kv) in o.items.iter() {
            if !first {
                out.push_str(", ");
            }
            first = false;
            push_key(out, &kv.key, kv.key_is_quoted);
            out.push_str(" = ");
            emit_container_or_scalar(out, &kv.value, indent, config)?;
        }
        out.push_str(" }");
    }
    Ok(())
}

fn emit_list(out: &mut String, l: &ListNode, indent: usize, config: &Config) -> Result<(), ReconcileError> {
    if list_needs_multiline(l, config.inline_threshold) {
        out.push('[');
        if let Some(c) = &l.inline_comment {
            check_comment(c)?;
            out.push_str("  ");
            out.push_str(c);
        }
        out.push('\n');
        for c in &l.inner_doc_comments {
            push_indented_comment(out, c, indent + 1, config)?;
        }
        for item in &l.items {
            emit_list_item(out, item, indent + 1, config, ",")?;
        }
        for c in &l.leading_comments {
            push_indented_comment(out, c, indent + 1, config)?;
        }
        if let Some(c) = &l.inline_comment_end {
            check_comment(c)?;
            push_indent(out, indent + 1, config);
            out.push_str(c);
            out.push('\n');
        }
        push_indent(out, indent, config);
        out.push(']');
    } else if l.items.is_empty() {
        out.push_str("[]");
    } else {
        out.push_str("[ ");
        let mut first = true;
        for item in &l.items {
            if !first {
                out.push_str(", ");
            }
            first = false;
            emit_container_or_scalar(out, item, indent, config)?;
        }
        out.push_str(" ]");
    }
    Ok(())
}

fn object_needs_multiline(o: &ObjectNode, threshold: usize) -> bool {
    if !o.inner_doc_comments.is_empty()
        || o.inline_comment.is_some()
        || o.inline_comment_end.is_some()
        || !o.leading_comments.is_empty()
    {
        return true;
    }
    if o.items.len() > threshold {
        return true;
    }
    o.items.iter().any(|(_, kv)| kv_has_comments(kv) || value_node_needs_multiline(&kv.value, threshold))
}

fn list_needs_multiline(l: &ListNode, threshold: usize) -> bool {
    if !l.inner_doc_comments.is_empty()
        || l.inline_comment.is_some()
        || l.inline_comment_end.is_some()
        || !l.leading_comments.is_empty()
    {
        return true;
    }
    if l.items.len() > threshold {
        return true;
    }
    l.items
        .iter()
        .any(|v| !v.leading_comments().is_empty() || v.inline_comment().is_some() || value_node_needs_multiline(v, threshold))
}

fn kv_has_comments(kv: &KeyValue) -> bool {
    !kv.leading_comments.is_empty() || kv.inline_comment.is_some() || !kv.outer_doc_comments.is_empty()
}

fn value_node_needs_multiline(v: &ValueNode, threshold: usize) -> bool {
    match v {
        ValueNode::Scalar(_) => false,
        ValueNode::Object(o) => object_needs_multiline(o, threshold),
        ValueNode::List(l) => list_needs_multiline(l, threshold),
    }
}

fn emit_scalar(out: &mut String, s: &Scalar) {
    match s {
        Scalar::String(text) => emit_quoted_string(out, text),
        Scalar::Int(n) => out.push_str(&n.to_string()),
        Scalar::Float(n) => emit_float(out, *n),
        Scalar::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Scalar::Null => out.push_str("null"),
    }
}

fn emit_float(out: &mut String, n: f64) {
    let text = format!("{n}");
    if text.contains('.') || text.contains('e') || text.contains("inf") || text.contains("NaN") {
        out.push_str(&text);
    } else {
        out.push_str(&text);
        out.push_str(".0");
    }
}

fn emit_quoted_string(out: &mut String, text: &str) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

fn push_key(out: &mut String, key: &str, quoted: bool) {
    if quoted || !is_plain_ident(key) {
        emit_quoted_string(out, key);
    } else {
        out.push_str(key);
    }
}

fn is_plain_ident(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !is_reserved_word(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse_document;

    fn roundtrip(src: &str) -> String {
        let tokens = tokenize(src).unwrap();
        let (doc, errors) = parse_document(&tokens);
        assert!(errors.is_empty(), "{errors:?}");
        serialize(&doc, &Config::default()).unwrap()
    }

    #[test]
    fn basic_roundtrip_is_stable() {
        let src = "name = \"App\"  // inline\n\nversion = \"1.0\"\n";
        let out = roundtrip(src);
        assert_eq!(out, src);
    }

    #[test]
    fn reserved_keys_sort_first() {
        let src = "other = 1\nftml_version = \"1.0\"\n";
        let out = roundtrip(src);
        assert!(out.find("ftml_version").unwrap() < out.find("other").unwrap());
    }

    #[test]
    fn idempotent_dump() {
        let src = "user = { name = \"A\", tags = [1, 2, 3] }\n";
        let once = roundtrip(src);
        let tokens = tokenize(&once).unwrap();
        let (doc, errors) = parse_document(&tokens);
        assert!(errors.is_empty());
        let twice = serialize(&doc, &Config::default()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn comments_force_multiline() {
        let src = "user = {\n    // note\n    name = \"A\",\n}\n";
        let tokens = tokenize(src).unwrap();
        let (doc, errors) = parse_document(&tokens);
        assert!(errors.is_empty());
        let out = serialize(&doc, &Config::default()).unwrap();
        assert!(out.contains("{\n"));
    }
}
