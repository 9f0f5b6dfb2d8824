//! The top-level entry points: [Client] opens a storage root and hands
//! out [Database]/[Collection] handles; [Database] is purely a named
//! grouping, same as the storage layer's `[database, collection, blob]`
//! path segments.

use std::{
    collections::BTreeSet,
    fs::{self, File},
    sync::{Arc, Mutex},
};

use fs2::FileExt;
use log::info;

use crate::{
    cache::Cache,
    codec::{Codec, DefaultCodec},
    collection::Collection,
    config::Config,
    err_at,
    id::{IdMinter, RandomHexMinter},
    index::IndexStore,
    lock::{self, Scope},
    storage::{fs::FsStorage, memory::MemoryStorage, Storage, StoragePath},
    Result,
};

const LOCK_FILE_NAME: &str = "$.lock";

/// Shared state behind every [Client]/[Database]/[Collection] handle.
/// Cheaply cloneable via `Arc`, matching the teacher's "clone to share, one
/// instance per thread" convention for its own index handles.
pub(crate) struct ClientInner {
    pub(crate) storage: Box<dyn Storage>,
    pub(crate) codec: Box<dyn Codec>,
    pub(crate) minter: Box<dyn IdMinter>,
    pub(crate) cache: Cache,
    pub(crate) indexes: Mutex<std::collections::HashMap<(String, String), std::collections::HashMap<String, IndexStore>>>,
    _root_lock: Option<File>,
}

/// An opened database root. Construct with [Client::new] (filesystem) or
/// [Client::with_memory] (process-local, non-durable).
pub struct Client {
    pub(crate) inner: Arc<ClientInner>,
}

impl Client {
    /// Open (creating if necessary) a filesystem-backed client rooted at
    /// `config.root`. Takes an advisory exclusive lock on the root for the
    /// client's lifetime — §5 assumes exclusive process access and this
    /// makes a violation loud instead of silently corrupting state.
    pub fn new(config: Config) -> Result<Client> {
        err_at!(StorageIo, fs::create_dir_all(&config.root))?;
        let lock_path = config.root.join(LOCK_FILE_NAME);
        let lock_file = err_at!(
            StorageIo,
            fs::OpenOptions::new().create(true).write(true).open(&lock_path)
        )?;
        err_at!(StorageIo, lock_file.try_lock_exclusive())?;

        let storage = FsStorage::new(&config.root)?;
        info!("docudb: opened filesystem client at {:?}", config.root);
        Ok(Client {
            inner: Arc::new(ClientInner {
                storage: Box::new(storage),
                codec: Box::new(DefaultCodec),
                minter: Box::new(RandomHexMinter),
                cache: Cache::new(),
                indexes: Mutex::new(std::collections::HashMap::new()),
                _root_lock: Some(lock_file),
            }),
        })
    }

    /// A process-local, non-durable client backed by [MemoryStorage].
    pub fn with_memory() -> Client {
        Client {
            inner: Arc::new(ClientInner {
                storage: Box::new(MemoryStorage::new()),
                codec: Box::new(DefaultCodec),
                minter: Box::new(RandomHexMinter),
                cache: Cache::new(),
                indexes: Mutex::new(std::collections::HashMap::new()),
                _root_lock: None,
            }),
        }
    }

    pub fn database(&self, name: impl Into<String>) -> Database {
        Database {
            inner: self.inner.clone(),
            name: name.into(),
        }
    }

    pub fn list_database_names(&self) -> Result<Vec<String>> {
        let paths = self.inner.storage.list(&StoragePath::new(Vec::<String>::new()))?;
        let names: BTreeSet<String> = paths
            .iter()
            .filter_map(|p| p.segments().first().cloned())
            .collect();
        Ok(names.into_iter().collect())
    }

    pub fn list_databases(&self) -> Result<Vec<Database>> {
        Ok(self
            .list_database_names()?
            .into_iter()
            .map(|name| self.database(name))
            .collect())
    }

    /// Guarded at `Scope::Database`, so a concurrent `find`/`insert` racing
    /// a drop on the same name blocks instead of reading a half-deleted
    /// collection.
    pub fn drop_database(&self, name: &str) -> Result<()> {
        lock::with_write(Scope::Database, name, || {
            let prefix = StoragePath::new([name.to_string()]);
            for path in self.inner.storage.list(&prefix)? {
                self.inner.storage.delete(&path)?;
            }
            self.inner.indexes.lock().unwrap().retain(|(db, _), _| db != name);
            Ok(())
        })
    }

    /// Idempotent; the advisory root lock is released when the last
    /// `Client` handle referencing it is dropped.
    pub fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A named grouping of collections; purely a handle, nothing is persisted
/// for a database that has no collections.
pub struct Database {
    pub(crate) inner: Arc<ClientInner>,
    name: String,
}

impl Database {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn collection(&self, name: impl Into<String>) -> Collection {
        Collection::new(self.inner.clone(), self.name.clone(), name.into())
    }

    pub fn list_collection_names(&self) -> Result<Vec<String>> {
        let prefix = StoragePath::new([self.name.clone()]);
        let paths = self.inner.storage.list(&prefix)?;
        let names: BTreeSet<String> = paths
            .iter()
            .filter_map(|p| p.segments().get(1).cloned())
            .collect();
        Ok(names.into_iter().collect())
    }

    pub fn list_collections(&self) -> Result<Vec<Collection>> {
        Ok(self
            .list_collection_names()?
            .into_iter()
            .map(|name| self.collection(name))
            .collect())
    }

    /// Guarded at `Scope::Collection` under the same `{database}.{name}`
    /// lock name [crate::collection::Collection] uses for every CRUD/index
    /// operation, so a drop can't race a concurrent `find`/`insert`.
    pub fn drop_collection(&self, name: &str) -> Result<()> {
        let lock_name = format!("{}.{}", self.name, name);
        lock::with_write(Scope::Collection, &lock_name, || {
            let prefix = StoragePath::new([self.name.clone(), name.to_string()]);
            for path in self.inner.storage.list(&prefix)? {
                self.inner.storage.delete(&path)?;
            }
            self.inner
                .indexes
                .lock()
                .unwrap()
                .remove(&(self.name.clone(), name.to_string()));
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;
