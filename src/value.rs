//! The document value domain and its total order.
//!
//! A [Value] is a tagged sum over the recursive value domain described by
//! the data model: null, boolean, integer, float, string, binary bytes, an
//! ordered sequence, and a nested document. There is no distinct "id" type
//! — the id is just whichever `Value` the caller (or the default
//! [crate::IdMinter]) put under `_id`; the storage and index layers treat
//! it opaquely, never interpreting its structure.
//!
//! Comparisons never fail: mismatched types resolve by the total order
//! below rather than raising an error, matching the filter matcher's
//! "type mismatches are not errors" rule.

use std::{
    cmp::Ordering,
    collections::BTreeMap,
};

/// A document is a sorted mapping from field name to [Value]. `BTreeMap`
/// gives us the "lexicographic over sorted key/value pairs" document
/// ordering rule for free.
pub type Document = BTreeMap<String, Value>;

/// The recursive value domain stored in documents.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    Binary(Vec<u8>),
    Array(Vec<Value>),
    Document(Document),
}

impl Value {
    /// Rank used as the primary sort key across variants: null < boolean <
    /// numbers < string < binary < array < document.
    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::String(_) => 3,
            Value::Binary(_) => 4,
            Value::Array(_) => 5,
            Value::Document(_) => 6,
        }
    }

    /// Widen an integer or float to `f64` for cross-numeric comparison.
    /// Values beyond `f64`'s 53-bit mantissa lose precision; acceptable for
    /// ordering purposes, matches spec's "compared by numeric value" rule.
    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True when `self` is a sequence containing an element equal to
    /// `needle` under this total order — the "in-list equality" rule.
    pub fn contains(&self, needle: &Value) -> bool {
        match self {
            Value::Array(items) => items.iter().any(|item| item == needle),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Value) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Value) -> Ordering {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => return a.total_cmp(&b),
            _ => {}
        }

        match self.rank().cmp(&other.rank()) {
            Ordering::Equal => {}
            ord => return ord,
        }

        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Binary(a), Value::Binary(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => a.cmp(b),
            (Value::Document(a), Value::Document(b)) => {
                // lexicographic over sorted (key, value) pairs.
                a.iter().cmp(b.iter())
            }
            _ => unreachable!("rank() partitions the variants exhaustively"),
        }
    }
}

#[cfg(test)]
#[path = "value_test.rs"]
mod value_test;
