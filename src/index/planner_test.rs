use super::*;
use crate::value::{Document, Value};

fn filter(pairs: &[(&str, Value)]) -> Document {
    pairs.iter().cloned().map(|(k, v)| (k.to_string(), v)).collect()
}

fn op(pairs: &[(&str, Value)]) -> Value {
    Value::Document(pairs.iter().cloned().map(|(k, v)| (k.to_string(), v)).collect())
}

#[test]
fn no_matching_index_falls_back_to_full_scan() {
    let store = IndexStore::new();
    let descriptor = IndexDescriptor::new("age_1", "age", Direction::Ascending);
    let f = filter(&[("name", Value::String("a".into()))]);

    let result = plan(&f, &[(descriptor, &store)]);
    assert_eq!(result, Plan::FullScan);
}

#[test]
fn eq_clause_on_indexed_path_drives_the_scan() {
    let mut store = IndexStore::new();
    store.insert(Value::Int(30), "1".to_string());
    store.insert(Value::Int(40), "2".to_string());
    let descriptor = IndexDescriptor::new("age_1", "age", Direction::Ascending);
    let f = filter(&[("age", Value::Int(30))]);

    let result = plan(&f, &[(descriptor, &store)]);
    match result {
        Plan::Indexed { index_name, candidate_ids } => {
            assert_eq!(index_name, "age_1");
            assert_eq!(candidate_ids, ["1".to_string()].into_iter().collect());
        }
        Plan::FullScan => panic!("expected an indexed plan"),
    }
}

#[test]
fn in_clause_unions_candidate_ids() {
    let mut store = IndexStore::new();
    store.insert(Value::Int(1), "a".to_string());
    store.insert(Value::Int(2), "b".to_string());
    store.insert(Value::Int(3), "c".to_string());
    let descriptor = IndexDescriptor::new("n_1", "n", Direction::Ascending);
    let f = filter(&[("n", op(&[("$in", Value::Array(vec![Value::Int(1), Value::Int(3)]))]))]);

    let result = plan(&f, &[(descriptor, &store)]);
    match result {
        Plan::Indexed { candidate_ids, .. } => {
            assert_eq!(candidate_ids, ["a".to_string(), "c".to_string()].into_iter().collect());
        }
        Plan::FullScan => panic!("expected an indexed plan"),
    }
}

#[test]
fn range_clause_drives_scan_when_no_eq_available() {
    let mut store = IndexStore::new();
    for i in 0..5 {
        store.insert(Value::Int(i), i.to_string());
    }
    let descriptor = IndexDescriptor::new("age_1", "age", Direction::Ascending);
    let f = filter(&[("age", op(&[("$gte", Value::Int(2))]))]);

    let result = plan(&f, &[(descriptor, &store)]);
    match result {
        Plan::Indexed { candidate_ids, .. } => {
            assert_eq!(
                candidate_ids,
                ["2".to_string(), "3".to_string(), "4".to_string()].into_iter().collect()
            );
        }
        Plan::FullScan => panic!("expected an indexed plan"),
    }
}

#[test]
fn eq_beats_range_when_both_apply_to_different_indexes() {
    let mut age_store = IndexStore::new();
    age_store.insert(Value::Int(1), "a".to_string());
    age_store.insert(Value::Int(2), "b".to_string());
    let age_descriptor = IndexDescriptor::new("age_1", "age", Direction::Ascending);

    let mut score_store = IndexStore::new();
    for i in 0..10 {
        score_store.insert(Value::Int(i), i.to_string());
    }
    let score_descriptor = IndexDescriptor::new("score_1", "score", Direction::Ascending);

    let f = filter(&[
        ("age", Value::Int(1)),
        ("score", op(&[("$gte", Value::Int(0))])),
    ]);

    let result = plan(
        &f,
        &[(age_descriptor, &age_store), (score_descriptor, &score_store)],
    );
    match result {
        Plan::Indexed { index_name, candidate_ids } => {
            assert_eq!(index_name, "age_1");
            assert_eq!(candidate_ids, ["a".to_string()].into_iter().collect());
        }
        Plan::FullScan => panic!("expected an indexed plan"),
    }
}

#[test]
fn smaller_candidate_set_wins_among_multiple_eq_indexes() {
    let mut a_store = IndexStore::new();
    for i in 0..5 {
        a_store.insert(Value::Int(0), i.to_string());
    }
    let a_descriptor = IndexDescriptor::new("a_1", "a", Direction::Ascending);

    let mut b_store = IndexStore::new();
    b_store.insert(Value::Int(0), "only".to_string());
    let b_descriptor = IndexDescriptor::new("b_1", "b", Direction::Ascending);

    let f = filter(&[("a", Value::Int(0)), ("b", Value::Int(0))]);

    let result = plan(&f, &[(a_descriptor, &a_store), (b_descriptor, &b_store)]);
    match result {
        Plan::Indexed { index_name, candidate_ids } => {
            assert_eq!(index_name, "b_1");
            assert_eq!(candidate_ids, ["only".to_string()].into_iter().collect());
        }
        Plan::FullScan => panic!("expected an indexed plan"),
    }
}

#[test]
fn unknown_operator_on_indexed_path_is_unusable() {
    let store = IndexStore::new();
    let descriptor = IndexDescriptor::new("age_1", "age", Direction::Ascending);
    let f = filter(&[("age", op(&[("$mod", Value::Int(2))]))]);

    let result = plan(&f, &[(descriptor, &store)]);
    assert_eq!(result, Plan::FullScan);
}
