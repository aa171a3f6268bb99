//! C7: merges a (possibly mutated) value tree back into the AST it was
//! extracted from, preserving comments on everything the host left
//! alone (spec §4.6).

use crate::ast::{Document, KeyValue, ListNode, ObjectNode, Scalar, ScalarNode, ValueNode};
use crate::error::ReconcileError;
use crate::position::Position;
use crate::value::{Path, Value};

/// Reconciles `value` (assumed to be the root object) against
/// `original`, the `Document` it was extracted from (or `None` for a
/// value tree built from scratch by the host).
pub fn reconcile(value: &Value, original: Option<&Document>) -> Result<Document, ReconcileError> {
    let mut doc = Document::new();
    if let Some(orig) = original {
        doc.leading_comments = orig.leading_comments.clone();
        doc.inline_comment = orig.inline_comment.clone();
        doc.inner_doc_comments = orig.inner_doc_comments.clone();
        doc.trailing_leading_comments = orig.trailing_leading_comments.clone();
    }

    let root = value
        .as_object()
        .ok_or_else(|| ReconcileError::NonStringKey { path: Path::root().to_string() })?;

    for (key, v) in root.items.iter() {
        let existing = original.and_then(|o| o.items.get(key));
        let kv = reconcile_key_value(key, v, existing, &Path::root().child_key(key))?;
        doc.items.insert(key.to_string(), kv);
    }
    Ok(doc)
}

fn reconcile_key_value(
    key: &str,
    value: &Value,
    existing: Option<&KeyValue>,
    path: &Path,
) -> Result<KeyValue, ReconcileError> {
    let value_node = reconcile_value_node(value, existing.map(|e| &e.value), path)?;
    let mut kv = KeyValue::new(
        key.to_string(),
        existing.map(|e| e.key_is_quoted).unwrap_or(false),
        value_node,
        existing.map(|e| e.pos).unwrap_or_default(),
    );
    if let Some(e) = existing {
        kv.leading_comments = e.leading_comments.clone();
        kv.inline_comment = e.inline_comment.clone();
        kv.outer_doc_comments = e.outer_doc_comments.clone();
    }
    Ok(kv)
}

fn reconcile_value_node(
    value: &Value,
    existing: Option<&ValueNode>,
    path: &Path,
) -> Result<ValueNode, ReconcileError> {
    match value {
        Value::String(s) => Ok(reconcile_scalar(Scalar::String(s.clone()), existing)),
        Value::Int(n) => Ok(reconcile_scalar(Scalar::Int(*n), existing)),
        Value::Float(n) => Ok(reconcile_scalar(Scalar::Float(*n), existing)),
        Value::Bool(b) => Ok(reconcile_scalar(Scalar::Bool(*b), existing)),
        Value::Null => Ok(reconcile_scalar(Scalar::Null, existing)),
        Value::Object(obj) => {
            let existing_obj = existing.and_then(|e| match e {
                ValueNode::Object(o) => Some(o),
                _ => None,
            });
            let carries_here = obj.ast_ref.as_ref().is_some_and(|r| &r.path == path);
            let source = if carries_here { existing_obj } else { None };

            let mut node = ObjectNode { pos: source.map(|o| o.pos).unwrap_or_default(), ..Default::default() };
            if let Some(o) = source {
                node.inner_doc_comments = o.inner_doc_comments.clone();
                node.inline_comment = o.inline_comment.clone();
                node.inline_comment_end = o.inline_comment_end.clone();
                node.leading_comments = o.leading_comments.clone();
            }
            for (k, v) in obj.items.iter() {
                let existing_kv = source.and_then(|o| o.items.get(k));
                let kv = reconcile_key_value(k, v, existing_kv, &path.child_key(k))?;
                node.items.insert(k.to_string(), kv);
            }
            Ok(ValueNode::Object(node))
        }
        Value::List(list) => {
            let existing_list = existing.and_then(|e| match e {
                ValueNode::List(l) => Some(l),
                _ => None,
            });
            let carries_here = list.ast_ref.as_ref().is_some_and(|r| &r.path == path);
            let source = if carries_here { existing_list } else { None };

            let mut node = ListNode { pos: source.map(|l| l.pos).unwrap_or_default(), ..Default::default() };
            if let Some(l) = source {
                node.inner_doc_comments = l.inner_doc_comments.clone();
                node.inline_comment = l.inline_comment.clone();
                node.inline_comment_end = l.inline_comment_end.clone();
                node.leading_comments = l.leading_comments.clone();
            }
            for (i, v) in list.items.iter().enumerate() {
                let existing_item = source.and_then(|l| l.items.get(i));
                let value_node = reconcile_value_node(v, existing_item, &path.child_index(i))?;
                node.items.push(value_node);
            }
            Ok(ValueNode::List(node))
        }
    }
}

/// Scalars carry comments only when list items (no owning `KeyValue`);
/// a type/value change never carries a comment meant for the old shape
/// forward (spec §4.6).
fn reconcile_scalar(new_value: Scalar, existing: Option<&ValueNode>) -> ValueNode {
    let reuse = existing.and_then(|e| match e {
        ValueNode::Scalar(s) if s.value == new_value => Some(s),
        _ => None,
    });
    ValueNode::Scalar(ScalarNode {
        value: new_value,
        leading_comments: reuse.map(|s| s.leading_comments.clone()).unwrap_or_default(),
        inline_comment: reuse.and_then(|s| s.inline_comment.clone()),
        pos: reuse.map(|s| s.pos).unwrap_or_else(Position::default),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use crate::lexer::tokenize;
    use crate::parser::parse_document;

    fn roundtrip(src: &str, mutate: impl FnOnce(&mut Value)) -> Document {
        let tokens = tokenize(src).unwrap();
        let (doc, errors) = parse_document(&tokens);
        assert!(errors.is_empty());
        let mut value = extract(&doc);
        mutate(&mut value);
        reconcile(&value, Some(&doc)).unwrap()
    }

    #[test]
    fn unchanged_sibling_keeps_inline_comment() {
        let reconciled = roundtrip(
            "name = \"App\"  // inline\nversion = \"1.0\"\n",
            |v| {
                if let Value::Object(o) = v {
                    o.items.insert("version", Value::String("1.1".into()));
                }
            },
        );
        let name = reconciled.items.get("name").unwrap();
        assert_eq!(name.inline_comment.as_deref(), Some("// inline"));
        let version = reconciled.items.get("version").unwrap();
        match &version.value {
            ValueNode::Scalar(s) => assert_eq!(s.value, Scalar::String("1.1".into())),
            _ => panic!("expected scalar"),
        }
    }

    #[test]
    fn new_key_has_no_comments() {
        let reconciled = roundtrip("a = 1\n", |v| {
            if let Value::Object(o) = v {
                o.items.insert("b", Value::Int(2));
            }
        });
        let b = reconciled.items.get("b").unwrap();
        assert!(b.leading_comments.is_empty());
        assert!(b.inline_comment.is_none());
    }

    #[test]
    fn dropped_key_is_removed() {
        let reconciled = roundtrip("a = 1\nb = 2\n", |v| {
            if let Value::Object(o) = v {
                o.items.remove("b");
            }
        });
        assert!(!reconciled.items.contains_key("b"));
    }
}
