use super::*;

#[test]
fn total_order_across_types() {
    let null = Value::Null;
    let boolean = Value::Boolean(true);
    let int = Value::Int(3);
    let float = Value::Float(2.5);
    let string = Value::String("3".to_string());
    let binary = Value::Binary(vec![1, 2, 3]);
    let array = Value::Array(vec![Value::Int(1)]);
    let doc = {
        let mut d = Document::new();
        d.insert("a".to_string(), Value::Int(1));
        Value::Document(d)
    };

    assert!(null < boolean);
    assert!(boolean < float);
    assert!(float < int); // 2.5 < 3 numerically
    assert!(int < string); // "3" $gt 2 -- strings sort after numbers
    assert!(string < binary);
    assert!(binary < array);
    assert!(array < doc);
}

#[test]
fn numbers_compare_by_value_regardless_of_repr() {
    assert!(Value::Int(2) < Value::Float(2.5));
    assert!(Value::Float(2.0) == Value::Int(2));
}

#[test]
fn missing_sorts_as_null() {
    // modeled by callers passing Value::Null for a missing path.
    assert_eq!(Value::Null, Value::Null);
    assert!(Value::Null < Value::Boolean(false));
}

#[test]
fn array_in_list_equality() {
    let tags = Value::Array(vec![
        Value::String("a".to_string()),
        Value::String("b".to_string()),
    ]);
    assert!(tags.contains(&Value::String("a".to_string())));
    assert!(!tags.contains(&Value::String("c".to_string())));
}

#[test]
fn document_ordering_is_lexicographic_over_sorted_pairs() {
    let mut a = Document::new();
    a.insert("x".to_string(), Value::Int(1));
    let mut b = Document::new();
    b.insert("x".to_string(), Value::Int(2));
    assert!(Value::Document(a) < Value::Document(b));
}
