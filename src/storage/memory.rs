//! Process-local, in-memory [Storage] backend.

use std::{collections::HashMap, sync::Mutex};

use super::{Storage, StoragePath, VersionToken};
use crate::Result;

#[derive(Default)]
struct Entry {
    bytes: Vec<u8>,
    version: u64,
}

/// A map from path to bytes; `touch` returns a counter incremented on
/// every `put`.
#[derive(Default)]
pub struct MemoryStorage {
    blobs: Mutex<HashMap<StoragePath, Entry>>,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, path: &StoragePath) -> Result<Option<Vec<u8>>> {
        let blobs = self.blobs.lock().unwrap();
        Ok(blobs.get(path).map(|e| e.bytes.clone()))
    }

    fn put(&self, path: &StoragePath, bytes: Vec<u8>) -> Result<()> {
        let mut blobs = self.blobs.lock().unwrap();
        let version = blobs.get(path).map(|e| e.version + 1).unwrap_or(1);
        blobs.insert(path.clone(), Entry { bytes, version });
        Ok(())
    }

    fn delete(&self, path: &StoragePath) -> Result<bool> {
        let mut blobs = self.blobs.lock().unwrap();
        Ok(blobs.remove(path).is_some())
    }

    fn list(&self, prefix: &StoragePath) -> Result<Vec<StoragePath>> {
        let blobs = self.blobs.lock().unwrap();
        Ok(blobs
            .keys()
            .filter(|p| p.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn touch(&self, path: &StoragePath) -> Result<Option<VersionToken>> {
        let blobs = self.blobs.lock().unwrap();
        Ok(blobs.get(path).map(|e| VersionToken(e.version.to_string())))
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;
