//! The secondary index subsystem: a sorted multimap from value to the set
//! of document ids carrying that value at an indexed path, plus the
//! planner that decides whether a filter can use one.

mod planner;

pub use planner::{plan, Plan};

use std::collections::{BTreeMap, BTreeSet};

use crate::value::{Document, Value};

/// `+1` (ascending) or `-1` (descending), per §3's descriptor shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_i8(&self) -> i8 {
        match self {
            Direction::Ascending => 1,
            Direction::Descending => -1,
        }
    }
}

/// `{name, key_path, direction}` plus a `dirty` flag: set when index
/// maintenance couldn't complete (e.g. a crash mid-update) and cleared the
/// next time the index is rebuilt from a full scan.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexDescriptor {
    pub name: String,
    pub key_path: String,
    pub direction: Direction,
    pub dirty: bool,
}

impl IndexDescriptor {
    pub fn new(name: impl Into<String>, key_path: impl Into<String>, direction: Direction) -> IndexDescriptor {
        IndexDescriptor {
            name: name.into(),
            key_path: key_path.into(),
            direction,
            dirty: false,
        }
    }

    /// Default name: `{key_path}_{1|-1}`, mirroring PyMongo's convention.
    pub fn default_name(key_path: &str, direction: Direction) -> String {
        format!("{}_{}", key_path, direction.as_i8())
    }

    pub(crate) fn to_value(&self) -> Value {
        let mut doc = Document::new();
        doc.insert("name".to_string(), Value::String(self.name.clone()));
        doc.insert("key_path".to_string(), Value::String(self.key_path.clone()));
        doc.insert(
            "direction".to_string(),
            Value::Int(self.direction.as_i8() as i64),
        );
        doc.insert("dirty".to_string(), Value::Boolean(self.dirty));
        Value::Document(doc)
    }

    pub(crate) fn from_value(value: &Value) -> Option<IndexDescriptor> {
        let doc = match value {
            Value::Document(doc) => doc,
            _ => return None,
        };
        let name = match doc.get("name")? {
            Value::String(s) => s.clone(),
            _ => return None,
        };
        let key_path = match doc.get("key_path")? {
            Value::String(s) => s.clone(),
            _ => return None,
        };
        let direction = match doc.get("direction")? {
            Value::Int(-1) => Direction::Descending,
            Value::Int(_) => Direction::Ascending,
            _ => return None,
        };
        let dirty = matches!(doc.get("dirty"), Some(Value::Boolean(true)));
        Some(IndexDescriptor {
            name,
            key_path,
            direction,
            dirty,
        })
    }
}

/// The sorted multimap itself: value-key to the set of document ids
/// carrying that value at the descriptor's `key_path`. Entries for a
/// missing path are stored under `Value::Null`, per §4.7.
#[derive(Default)]
pub struct IndexStore {
    entries: BTreeMap<Value, BTreeSet<String>>,
}

impl IndexStore {
    pub fn new() -> IndexStore {
        IndexStore::default()
    }

    /// Rebuild from scratch by scanning every `(id, document)` pair.
    pub fn build<'a>(key_path: &str, docs: impl Iterator<Item = (&'a str, &'a Document)>) -> IndexStore {
        let mut store = IndexStore::new();
        for (id, doc) in docs {
            let value = crate::path::get(doc, key_path).cloned().unwrap_or(Value::Null);
            store.insert(value, id.to_string());
        }
        store
    }

    pub fn insert(&mut self, value: Value, id: String) {
        self.entries.entry(value).or_default().insert(id);
    }

    pub fn remove(&mut self, value: &Value, id: &str) {
        if let Some(ids) = self.entries.get_mut(value) {
            ids.remove(id);
            if ids.is_empty() {
                self.entries.remove(value);
            }
        }
    }

    /// ids carrying exactly `value`.
    pub fn eq_ids(&self, value: &Value) -> BTreeSet<String> {
        self.entries.get(value).cloned().unwrap_or_default()
    }

    /// ids carrying any of `values` — used for `$in` and for `$eq`'s
    /// driving-index lookup.
    pub fn in_ids(&self, values: &[Value]) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for value in values {
            out.extend(self.eq_ids(value));
        }
        out
    }

    /// ids whose indexed value falls in `(lo, hi)`, each bound optional and
    /// independently inclusive/exclusive.
    pub fn range_ids(&self, lo: Bound, hi: Bound) -> BTreeSet<String> {
        use std::ops::Bound as StdBound;

        let lo_bound = match &lo {
            Bound::Unbounded => StdBound::Unbounded,
            Bound::Inclusive(v) => StdBound::Included(v.clone()),
            Bound::Exclusive(v) => StdBound::Excluded(v.clone()),
        };
        let hi_bound = match &hi {
            Bound::Unbounded => StdBound::Unbounded,
            Bound::Inclusive(v) => StdBound::Included(v.clone()),
            Bound::Exclusive(v) => StdBound::Excluded(v.clone()),
        };
        let mut out = BTreeSet::new();
        for (_, ids) in self.entries.range((lo_bound, hi_bound)) {
            out.extend(ids.iter().cloned());
        }
        out
    }

    /// Approximate cardinality for a single value-key, used by the planner
    /// to pick a driving index among several eligible ones.
    pub fn cardinality(&self, value: &Value) -> usize {
        self.entries.get(value).map(BTreeSet::len).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }
}

/// A range bound used by [IndexStore::range_ids].
#[derive(Clone)]
pub enum Bound {
    Unbounded,
    Inclusive(Value),
    Exclusive(Value),
}
