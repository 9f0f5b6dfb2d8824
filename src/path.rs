//! Dotted-path traversal over [Value]/[Document] trees.
//!
//! A dotted path like `"a.b.0.c"` descends documents by key and sequences
//! by integer index. Traversal never errors on a missing step — it simply
//! yields `None`, which callers treat as the *missing* value (sorts as
//! `Value::Null`, matches only `$eq: null` per the matcher's rules).

use crate::value::{Document, Value};

/// Split a dotted path into its segments. `""` yields no segments.
pub fn segments(path: &str) -> Vec<&str> {
    if path.is_empty() {
        vec![]
    } else {
        path.split('.').collect()
    }
}

/// Resolve `path` against `doc`, descending through nested documents and
/// arrays. Returns `None` when any segment fails to resolve (missing key,
/// out-of-range/non-numeric index, or stepping into a scalar).
pub fn get<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let segs = segments(path);
    let (first, rest) = segs.split_first()?;
    let mut current = doc.get(*first)?;
    for seg in rest {
        current = step(current, seg)?;
    }
    Some(current)
}

fn step<'a>(value: &'a Value, seg: &str) -> Option<&'a Value> {
    match value {
        Value::Document(doc) => doc.get(seg),
        Value::Array(items) => seg.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Mutably resolve `path` against `doc`, creating intermediate documents
/// (never arrays) for missing segments. Fails with `None` if an
/// intermediate segment already holds a non-document, non-array value —
/// callers map that to `INVALID_UPDATE`.
pub fn get_or_create_mut<'a>(doc: &'a mut Document, path: &str) -> Option<&'a mut Value> {
    let segs = segments(path);
    let (last, init) = segs.split_last()?;

    let mut current_doc = doc;
    for seg in init {
        let entry = current_doc
            .entry(seg.to_string())
            .or_insert_with(|| Value::Document(Document::new()));
        match entry {
            Value::Document(inner) => current_doc = inner,
            Value::Array(items) => {
                let idx: usize = seg.parse().ok()?;
                let item = items.get_mut(idx)?;
                match item {
                    Value::Document(inner) => current_doc = inner,
                    _ => return None,
                }
            }
            _ => return None,
        }
    }
    Some(current_doc.entry(last.to_string()).or_insert(Value::Null))
}

/// Remove the value at `path`, if any. Used when an index's `key_path` is
/// touched by `$set` overwriting a sibling and the old indexed value must
/// be looked up before removal — callers typically call [get] first and
/// only use this when an actual deletion of the field is required.
pub fn remove(doc: &mut Document, path: &str) -> Option<Value> {
    let segs = segments(path);
    let (last, init) = segs.split_last()?;
    let mut current = doc;
    for seg in init {
        current = match current.get_mut(*seg)? {
            Value::Document(inner) => inner,
            _ => return None,
        };
    }
    current.remove(*last)
}

#[cfg(test)]
#[path = "path_test.rs"]
mod path_test;
