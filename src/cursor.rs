//! The cursor: a lazy, restartable sequence over matched ids with
//! independent sort/skip/limit, materializing only when a sort is set
//! (§4.8 — "order of application: filter -> sort (full materialization)
//! -> skip -> limit; without sort, documents may stream").

use std::sync::Arc;

use crate::{
    client::ClientInner,
    err_at, path,
    storage::StoragePath,
    value::{Document, Value},
    Result,
};

/// Constructed by [crate::Collection::find]; captures the filter's
/// already-matched candidate ids in manifest order. `sort`/`limit`/`skip`
/// are builder calls made before the first [Cursor::next].
pub struct Cursor {
    inner: Arc<ClientInner>,
    database: String,
    collection: String,
    ids: Vec<String>,
    sort: Option<Vec<(String, i8)>>,
    skip: usize,
    limit: Option<usize>,
    position: usize,
    materialized: Option<Vec<Document>>,
    closed: bool,
}

impl Cursor {
    pub(crate) fn new(
        inner: Arc<ClientInner>,
        database: String,
        collection: String,
        ids: Vec<String>,
    ) -> Cursor {
        Cursor {
            inner,
            database,
            collection,
            ids,
            sort: None,
            skip: 0,
            limit: None,
            position: 0,
            materialized: None,
            closed: false,
        }
    }

    /// Sort by a single `(key, direction)` pair; `direction` is `1` or
    /// `-1`, matching [crate::index::IndexDescriptor]'s convention.
    /// Repeated calls add tie-breaking keys, most-significant first.
    pub fn sort(mut self, key: impl Into<String>, direction: i8) -> Cursor {
        self.sort.get_or_insert_with(Vec::new).push((key.into(), direction));
        self.materialized = None;
        self
    }

    /// Sort by several `(key, direction)` pairs at once, most-significant
    /// first.
    pub fn sort_keys(mut self, keys: Vec<(String, i8)>) -> Cursor {
        self.sort = Some(keys);
        self.materialized = None;
        self
    }

    pub fn limit(mut self, n: usize) -> Cursor {
        self.limit = Some(n);
        self
    }

    pub fn skip(mut self, n: usize) -> Cursor {
        self.skip = n;
        self
    }

    /// Advance by one, returning a deep copy of the next document or
    /// `None` on exhaustion. Fails with `INVALID_OPERATION` if called
    /// after [Cursor::close].
    pub fn next(&mut self) -> Result<Option<Document>> {
        if self.closed {
            return err_at!(InvalidOperation, msg: "cursor used after close");
        }
        let cap = self.limit.map(|limit| self.skip + limit);
        self.ensure_materialized()?;

        if self.materialized.is_some() {
            loop {
                if cap.map(|cap| self.position >= cap).unwrap_or(false) {
                    return Ok(None);
                }
                let docs = self.materialized.as_ref().unwrap();
                if self.position >= docs.len() {
                    return Ok(None);
                }
                let idx = self.position;
                self.position += 1;
                if idx < self.skip {
                    continue;
                }
                return Ok(Some(docs[idx].clone()));
            }
        }

        loop {
            if cap.map(|cap| self.position >= cap).unwrap_or(false) {
                return Ok(None);
            }
            if self.position >= self.ids.len() {
                return Ok(None);
            }
            let idx = self.position;
            self.position += 1;
            if idx < self.skip {
                continue;
            }
            let id = self.ids[idx].clone();
            if let Some(doc) = self.load(&id)? {
                return Ok(Some(doc));
            }
            // Deleted concurrently between planning and consumption: skip it.
        }
    }

    /// Independent cursor at the initial position, same configuration.
    pub fn clone(&self) -> Cursor {
        Cursor {
            inner: self.inner.clone(),
            database: self.database.clone(),
            collection: self.collection.clone(),
            ids: self.ids.clone(),
            sort: self.sort.clone(),
            skip: self.skip,
            limit: self.limit,
            position: 0,
            materialized: None,
            closed: false,
        }
    }

    /// Idempotent; releases the materialized buffer and marks further
    /// `next()` calls as an error.
    pub fn close(&mut self) {
        self.closed = true;
        self.materialized = None;
    }

    fn ensure_materialized(&mut self) -> Result<()> {
        if self.materialized.is_some() {
            return Ok(());
        }
        let sort = match &self.sort {
            Some(sort) => sort.clone(),
            None => return Ok(()),
        };

        let mut docs = Vec::with_capacity(self.ids.len());
        for id in self.ids.clone() {
            if let Some(doc) = self.load(&id)? {
                docs.push(doc);
            }
        }
        docs.sort_by(|a, b| {
            for (key, direction) in &sort {
                let a_value = path::get(a, key).cloned().unwrap_or(Value::Null);
                let b_value = path::get(b, key).cloned().unwrap_or(Value::Null);
                let ord = a_value.cmp(&b_value);
                let ord = if *direction < 0 { ord.reverse() } else { ord };
                if ord != std::cmp::Ordering::Equal {
                    return ord;
                }
            }
            std::cmp::Ordering::Equal
        });
        self.materialized = Some(docs);
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<Document>> {
        let path = StoragePath::new([self.database.clone(), self.collection.clone(), id.to_string()]);
        self.inner.cache.get(
            &*self.inner.storage,
            &*self.inner.codec,
            &path,
            &self.collection,
            &Value::String(id.to_string()),
        )
    }
}

#[cfg(test)]
#[path = "cursor_test.rs"]
mod cursor_test;
