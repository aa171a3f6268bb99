//! Builds the host-facing value tree from a fully-commented AST (the
//! step between C3 and the host in the data-flow of spec §2). Every
//! object/list gets an [`AstRef`] back-reference so [`crate::reconcile`]
//! can later tell a mutated container from a freshly-built one.

use crate::ast::{Document, Scalar, ValueNode};
use crate::value::{AstRef, Path, Value, ValueList, ValueObject};

/// Extracts the value tree rooted at `doc`, stamping every container
/// with its path from the document root.
pub fn extract(doc: &Document) -> Value {
    extract_at(doc, &Path::root())
}

fn extract_at(doc: &Document, path: &Path) -> Value {
    let mut items = crate::value::OrderedMap::new();
    for (key, kv) in doc.items.iter() {
        items.insert(key.to_string(), extract_value(&kv.value, &path.child_key(key)));
    }
    Value::Object(ValueObject { items, ast_ref: Some(AstRef { path: path.clone() }) })
}

fn extract_value(node: &ValueNode, path: &Path) -> Value {
    match node {
        ValueNode::Scalar(s) => extract_scalar(&s.value),
        ValueNode::Object(o) => {
            let mut items = crate::value::OrderedMap::new();
            for (key, kv) in o.items.iter() {
                items.insert(key.to_string(), extract_value(&kv.value, &path.child_key(key)));
            }
            Value::Object(ValueObject { items, ast_ref: Some(AstRef { path: path.clone() }) })
        }
        ValueNode::List(l) => {
            let items = l
                .items
                .iter()
                .enumerate()
                .map(|(i, v)| extract_value(v, &path.child_index(i)))
                .collect();
            Value::List(ValueList { items, ast_ref: Some(AstRef { path: path.clone() }) })
        }
    }
}

fn extract_scalar(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::String(s) => Value::String(s.clone()),
        Scalar::Int(n) => Value::Int(*n),
        Scalar::Float(n) => Value::Float(*n),
        Scalar::Bool(b) => Value::Bool(*b),
        Scalar::Null => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse_document;

    fn extracted(src: &str) -> (Document, Value) {
        let tokens = tokenize(src).unwrap();
        let (doc, errors) = parse_document(&tokens);
        assert!(errors.is_empty());
        let value = extract(&doc);
        (doc, value)
    }

    #[test]
    fn root_object_carries_root_path() {
        let (_, value) = extracted("name = \"App\"\n");
        let obj = value.as_object().unwrap();
        assert_eq!(obj.ast_ref.as_ref().unwrap().path, Path::root());
        assert_eq!(obj.items.get("name"), Some(&Value::String("App".into())));
    }

    #[test]
    fn nested_object_carries_key_path() {
        let (_, value) = extracted("user = { name = \"A\" }\n");
        let user = value.as_object().unwrap().items.get("user").unwrap();
        let user_obj = user.as_object().unwrap();
        assert_eq!(user_obj.ast_ref.as_ref().unwrap().path, Path::root().child_key("user"));
    }

    #[test]
    fn list_items_get_indexed_paths() {
        let (_, value) = extracted("tags = [1, 2]\n");
        let tags = value.as_object().unwrap().items.get("tags").unwrap();
        assert_eq!(tags.as_list().unwrap().ast_ref.as_ref().unwrap().path, Path::root().child_key("tags"));
    }
}
