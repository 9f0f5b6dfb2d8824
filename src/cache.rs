//! The document cache: `(collection, id) -> {document, version_token}`,
//! kept fresh by comparing against the storage backend's touch token
//! rather than by any time-based expiry.
//!
//! The baseline is unbounded (§9 leaves eviction policy open and the
//! testable properties don't require it) — every entry lives until
//! explicitly invalidated or the process exits.

use std::{collections::BTreeMap, sync::Mutex};

use log::trace;

use crate::{
    codec::Codec,
    storage::{Storage, StoragePath, VersionToken},
    value::{Document, Value},
    Result,
};

struct Entry {
    document: Document,
    version: VersionToken,
}

#[derive(Default)]
pub struct Cache {
    entries: Mutex<BTreeMap<(String, Value), Entry>>,
}

impl Cache {
    pub fn new() -> Cache {
        Cache::default()
    }

    /// Read-through: compare the live storage token against the cached
    /// one; reload and decode on mismatch or first access, otherwise
    /// return a deep copy of the cached document without touching
    /// storage's `get`.
    pub fn get(
        &self,
        storage: &dyn Storage,
        codec: &dyn Codec,
        path: &StoragePath,
        collection: &str,
        id: &Value,
    ) -> Result<Option<Document>> {
        let key = (collection.to_string(), id.clone());
        let live_token = storage.touch(path)?;

        let live_token = match live_token {
            Some(token) => token,
            None => {
                self.entries.lock().unwrap().remove(&key);
                return Ok(None);
            }
        };

        {
            let entries = self.entries.lock().unwrap();
            if let Some(entry) = entries.get(&key) {
                if entry.version == live_token {
                    trace!("docudb: cache hit {}/{:?}", collection, id);
                    return Ok(Some(entry.document.clone()));
                }
            }
        }

        trace!("docudb: cache miss {}/{:?}", collection, id);
        let bytes = match storage.get(path)? {
            Some(bytes) => bytes,
            None => {
                self.entries.lock().unwrap().remove(&key);
                return Ok(None);
            }
        };
        let document = codec.decode(&bytes)?;
        self.entries.lock().unwrap().insert(
            key,
            Entry {
                document: document.clone(),
                version: live_token,
            },
        );
        Ok(Some(document))
    }

    /// Encode and store `document`, then cache it under the storage
    /// token produced by the write.
    pub fn put(
        &self,
        storage: &dyn Storage,
        codec: &dyn Codec,
        path: &StoragePath,
        collection: &str,
        id: &Value,
        document: Document,
    ) -> Result<()> {
        let bytes = codec.encode(&document);
        storage.put(path, bytes)?;
        let version = storage
            .touch(path)?
            .unwrap_or_else(|| VersionToken(String::new()));
        self.entries.lock().unwrap().insert(
            (collection.to_string(), id.clone()),
            Entry { document, version },
        );
        Ok(())
    }

    pub fn invalidate(&self, collection: &str, id: &Value) {
        self.entries
            .lock()
            .unwrap()
            .remove(&(collection.to_string(), id.clone()));
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;
