use super::*;
use crate::value::{Document, Value};

fn doc(pairs: &[(&str, Value)]) -> Document {
    pairs.iter().cloned().map(|(k, v)| (k.to_string(), v)).collect()
}

#[test]
fn scalar_is_implicit_eq() {
    let d = doc(&[("x", Value::Int(1))]);
    let f = doc(&[("x", Value::Int(1))]);
    assert!(matches(&f, &d).unwrap());

    let f2 = doc(&[("x", Value::Int(2))]);
    assert!(!matches(&f2, &d).unwrap());
}

#[test]
fn in_list_equality_on_array_field() {
    let d = doc(&[(
        "tags",
        Value::Array(vec![Value::String("a".into()), Value::String("b".into())]),
    )]);
    let f = doc(&[("tags", Value::String("a".into()))]);
    assert!(matches(&f, &d).unwrap());
}

#[test]
fn gt_gte_lt_lte_use_total_order() {
    let d = doc(&[("n", Value::Int(5))]);
    let gt = doc(&[("n", op("$gt", Value::Int(3)))]);
    assert!(matches(&gt, &d).unwrap());
    let lt = doc(&[("n", op("$lt", Value::Int(3)))]);
    assert!(!matches(&lt, &d).unwrap());
}

#[test]
fn range_operators_never_match_missing_path() {
    let d = doc(&[]);
    let gt = doc(&[("n", op("$gt", Value::Int(3)))]);
    assert!(!matches(&gt, &d).unwrap());
}

#[test]
fn eq_null_matches_missing_path() {
    let d = doc(&[]);
    let f = doc(&[("x", Value::Null)]);
    assert!(matches(&f, &d).unwrap());
}

#[test]
fn ne_of_non_null_matches_missing_path() {
    let d = doc(&[]);
    let f = doc(&[("x", op("$ne", Value::Int(1)))]);
    assert!(matches(&f, &d).unwrap());
}

#[test]
fn in_and_nin() {
    let d = doc(&[("n", Value::Int(2))]);
    let in_f = doc(&[(
        "n",
        op("$in", Value::Array(vec![Value::Int(1), Value::Int(2)])),
    )]);
    assert!(matches(&in_f, &d).unwrap());

    let nin_f = doc(&[(
        "n",
        op("$nin", Value::Array(vec![Value::Int(1), Value::Int(2)])),
    )]);
    assert!(!matches(&nin_f, &d).unwrap());
}

#[test]
fn type_mismatch_resolves_by_total_order_not_error() {
    let d = doc(&[("x", Value::String("3".into()))]);
    let f = doc(&[("x", op("$gt", Value::Int(2)))]);
    assert!(matches(&f, &d).unwrap());
}

#[test]
fn unknown_operator_is_invalid_argument() {
    let d = doc(&[("x", Value::Int(1))]);
    let f = doc(&[("x", op("$wat", Value::Int(1)))]);
    assert!(matches(&f, &d).is_err());
}

#[test]
fn multiple_top_level_keys_combine_with_and() {
    let d = doc(&[("x", Value::Int(1)), ("y", Value::Int(2))]);
    let f = doc(&[("x", Value::Int(1)), ("y", Value::Int(3))]);
    assert!(!matches(&f, &d).unwrap());
}

fn op(tag: &str, operand: Value) -> Value {
    let mut m = Document::new();
    m.insert(tag.to_string(), operand);
    Value::Document(m)
}
