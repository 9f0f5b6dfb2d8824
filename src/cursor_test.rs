use super::*;
use crate::{client::Client, codec::Codec};

fn seed(client: &Client, id: &str, x: i64) {
    let path = StoragePath::new(["db".to_string(), "coll".to_string(), id.to_string()]);
    let mut doc = Document::new();
    doc.insert("x".to_string(), Value::Int(x));
    let bytes = client.inner.codec.encode(&doc);
    client.inner.storage.put(&path, bytes).unwrap();
}

fn cursor_over(client: &Client, ids: &[&str]) -> Cursor {
    Cursor::new(
        client.inner.clone(),
        "db".to_string(),
        "coll".to_string(),
        ids.iter().map(|s| s.to_string()).collect(),
    )
}

#[test]
fn streams_in_given_order_without_sort() {
    let client = Client::with_memory();
    seed(&client, "a", 1);
    seed(&client, "b", 2);
    seed(&client, "c", 3);

    let mut cursor = cursor_over(&client, &["a", "b", "c"]);
    let mut xs = Vec::new();
    while let Some(doc) = cursor.next().unwrap() {
        xs.push(doc.get("x").cloned().unwrap());
    }
    assert_eq!(xs, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn skip_and_limit_compose_with_streaming() {
    let client = Client::with_memory();
    for (id, x) in [("a", 1), ("b", 2), ("c", 3), ("d", 4)] {
        seed(&client, id, x);
    }

    let mut cursor = cursor_over(&client, &["a", "b", "c", "d"]).skip(1).limit(2);
    let mut xs = Vec::new();
    while let Some(doc) = cursor.next().unwrap() {
        xs.push(doc.get("x").cloned().unwrap());
    }
    assert_eq!(xs, vec![Value::Int(2), Value::Int(3)]);
}

#[test]
fn sort_materializes_and_orders_by_key() {
    let client = Client::with_memory();
    seed(&client, "a", 3);
    seed(&client, "b", 1);
    seed(&client, "c", 2);

    let mut cursor = cursor_over(&client, &["a", "b", "c"]).sort("x", 1);
    let mut xs = Vec::new();
    while let Some(doc) = cursor.next().unwrap() {
        xs.push(doc.get("x").cloned().unwrap());
    }
    assert_eq!(xs, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn descending_sort_combined_with_limit() {
    let client = Client::with_memory();
    seed(&client, "a", 1);
    seed(&client, "b", 2);
    seed(&client, "c", 3);

    let mut cursor = cursor_over(&client, &["a", "b", "c"]).sort("x", -1).limit(1);
    let first = cursor.next().unwrap().unwrap();
    assert_eq!(first.get("x"), Some(&Value::Int(3)));
    assert_eq!(cursor.next().unwrap(), None);
}

#[test]
fn close_is_idempotent_and_blocks_further_next_calls() {
    let client = Client::with_memory();
    seed(&client, "a", 1);

    let mut cursor = cursor_over(&client, &["a"]);
    cursor.close();
    cursor.close();
    assert!(cursor.next().is_err());
}

#[test]
fn clone_is_independent_and_restarts_at_the_beginning() {
    let client = Client::with_memory();
    seed(&client, "a", 1);
    seed(&client, "b", 2);

    let mut cursor = cursor_over(&client, &["a", "b"]);
    assert!(cursor.next().unwrap().is_some());

    let mut cloned = cursor.clone();
    let first = cloned.next().unwrap().unwrap();
    assert_eq!(first.get("x"), Some(&Value::Int(1)));

    // the original cursor's own position was unaffected by the clone.
    let second = cursor.next().unwrap().unwrap();
    assert_eq!(second.get("x"), Some(&Value::Int(2)));
}
