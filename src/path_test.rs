use super::*;
use crate::value::{Document, Value};

fn doc_from(pairs: &[(&str, Value)]) -> Document {
    pairs.iter().cloned().map(|(k, v)| (k.to_string(), v)).collect()
}

#[test]
fn traverses_nested_documents_and_arrays() {
    let mut inner = Document::new();
    inner.insert("c".to_string(), Value::Int(5));
    let doc = doc_from(&[(
        "a",
        Value::Document({
            let mut d = Document::new();
            d.insert(
                "b".to_string(),
                Value::Array(vec![Value::Document(inner)]),
            );
            d
        }),
    )]);

    assert_eq!(get(&doc, "a.b.0.c"), Some(&Value::Int(5)));
}

#[test]
fn missing_step_is_none() {
    let doc = doc_from(&[("a", Value::Int(1))]);
    assert_eq!(get(&doc, "a.b"), None);
    assert_eq!(get(&doc, "missing"), None);
}

#[test]
fn get_or_create_mut_builds_intermediate_documents() {
    let mut doc = Document::new();
    let slot = get_or_create_mut(&mut doc, "a.b").unwrap();
    *slot = Value::Int(5);
    assert_eq!(get(&doc, "a.b"), Some(&Value::Int(5)));
}

#[test]
fn get_or_create_mut_fails_through_non_container() {
    let mut doc = doc_from(&[("a", Value::Int(7))]);
    assert!(get_or_create_mut(&mut doc, "a.b").is_none());
}
