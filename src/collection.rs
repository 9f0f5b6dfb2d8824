//! The public collection surface: insert/find/update/replace/delete,
//! index management, all guarded by the [crate::lock] registry at
//! collection scope.

use std::{collections::HashMap, sync::Arc};

use log::warn;

use crate::{
    catalog::{Catalog, Manifest},
    client::ClientInner,
    cursor::Cursor,
    err_at, filter,
    id::{self, IdMinter},
    index::{self, Direction, IndexDescriptor, IndexStore, Plan},
    lock::{self, Scope},
    path,
    storage::StoragePath,
    update,
    value::{Document, Value},
    Error, Result,
};

/// `{inserted_id}`, returned by [Collection::insert_one].
#[derive(Clone, Debug, PartialEq)]
pub struct InsertOneResult {
    pub inserted_id: Value,
}

/// `{inserted_ids}`, returned by [Collection::insert_many].
#[derive(Clone, Debug, PartialEq, Default)]
pub struct InsertManyResult {
    pub inserted_ids: Vec<Value>,
}

/// `{matched_count, modified_count, upserted_id?}`, returned by
/// [Collection::update_one], [Collection::update_many], and
/// [Collection::replace_one].
#[derive(Clone, Debug, PartialEq, Default)]
pub struct UpdateResult {
    pub matched_count: usize,
    pub modified_count: usize,
    pub upserted_id: Option<Value>,
}

/// `{deleted_count}`, returned by [Collection::delete_one] and
/// [Collection::delete_many].
#[derive(Clone, Debug, PartialEq, Default)]
pub struct DeleteResult {
    pub deleted_count: usize,
}

/// Either a single `(path, direction)` pair or a compound key list. Compound
/// indexes are reserved shape only — [Collection::create_index] rejects any
/// list longer than one pair with `Error::NotImplemented`.
pub enum IndexKeys {
    Single(String, Direction),
    Compound(Vec<(String, Direction)>),
}

impl From<&str> for IndexKeys {
    fn from(path: &str) -> IndexKeys {
        IndexKeys::Single(path.to_string(), Direction::Ascending)
    }
}

impl From<(String, Direction)> for IndexKeys {
    fn from((path, direction): (String, Direction)) -> IndexKeys {
        IndexKeys::Single(path, direction)
    }
}

impl From<Vec<(String, Direction)>> for IndexKeys {
    fn from(keys: Vec<(String, Direction)>) -> IndexKeys {
        IndexKeys::Compound(keys)
    }
}

/// A named set of documents within a database. Cheaply `Clone`-able —
/// every clone shares the same underlying storage, cache, and index
/// state through the client's `Arc`.
#[derive(Clone)]
pub struct Collection {
    inner: Arc<ClientInner>,
    database: String,
    name: String,
}

impl Collection {
    pub(crate) fn new(inner: Arc<ClientInner>, database: String, name: String) -> Collection {
        Collection { inner, database, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn database_name(&self) -> &str {
        &self.database
    }

    fn lock_name(&self) -> String {
        format!("{}.{}", self.database, self.name)
    }

    fn catalog(&self) -> Catalog {
        Catalog::new(&*self.inner.storage, &*self.inner.codec, self.database.clone(), self.name.clone())
    }

    fn document_path(&self, blob: &str) -> StoragePath {
        StoragePath::new([self.database.clone(), self.name.clone(), blob.to_string()])
    }

    fn load_document(&self, blob: &str) -> Result<Option<Document>> {
        self.inner.cache.get(
            &*self.inner.storage,
            &*self.inner.codec,
            &self.document_path(blob),
            &self.name,
            &Value::String(blob.to_string()),
        )
    }

    fn store_document(&self, blob: &str, doc: Document) -> Result<()> {
        self.inner.cache.put(
            &*self.inner.storage,
            &*self.inner.codec,
            &self.document_path(blob),
            &self.name,
            &Value::String(blob.to_string()),
            doc,
        )
    }

    fn delete_document_blob(&self, blob: &str) -> Result<()> {
        self.inner.storage.delete(&self.document_path(blob))?;
        self.inner.cache.invalidate(&self.name, &Value::String(blob.to_string()));
        Ok(())
    }

    /// Run `f` against this collection's in-memory index stores, building
    /// them (by scanning every document once) on first access. Lazily
    /// rebuilding from documents on demand is also how a descriptor's
    /// `dirty` flag — set when maintenance couldn't complete — gets
    /// cleared: the next full-collection scan re-derives a consistent
    /// store from scratch.
    fn with_index_stores<R>(
        &self,
        manifest: &Manifest,
        f: impl FnOnce(&mut HashMap<String, IndexStore>) -> R,
    ) -> Result<R> {
        let key = (self.database.clone(), self.name.clone());
        let needs_build = !self.inner.indexes.lock().unwrap().contains_key(&key);
        if needs_build {
            let built = self.build_index_stores(manifest)?;
            self.inner.indexes.lock().unwrap().entry(key.clone()).or_insert(built);
        }
        let mut all = self.inner.indexes.lock().unwrap();
        let entry = all.get_mut(&key).unwrap();
        Ok(f(entry))
    }

    fn build_index_stores(&self, manifest: &Manifest) -> Result<HashMap<String, IndexStore>> {
        let mut docs = Vec::with_capacity(manifest.document_ids.len());
        for id in &manifest.document_ids {
            if let Some(doc) = self.load_document(id)? {
                docs.push((id.clone(), doc));
            }
        }
        let mut map = HashMap::new();
        for descriptor in &manifest.indexes {
            let store = IndexStore::build(&descriptor.key_path, docs.iter().map(|(id, d)| (id.as_str(), d)));
            map.insert(descriptor.name.clone(), store);
        }
        if manifest.indexes.iter().any(|d| d.dirty) {
            let mut cleared = manifest.clone();
            for descriptor in &mut cleared.indexes {
                descriptor.dirty = false;
            }
            if let Err(e) = self.catalog().save(&cleared) {
                warn!("docudb: failed to clear dirty index flags after full rebuild: {}", e);
            }
        }
        Ok(map)
    }

    /// Marks every index descriptor dirty and persists the manifest,
    /// best-effort, after a maintenance step failed partway through —
    /// the in-memory store and the documents it's supposed to cover may
    /// now disagree until the next full rebuild clears the flag.
    fn mark_indexes_dirty(&self, manifest: &mut Manifest) {
        if manifest.indexes.iter().any(|d| !d.dirty) {
            for descriptor in &mut manifest.indexes {
                descriptor.dirty = true;
            }
            if let Err(e) = self.catalog().save(manifest) {
                warn!("docudb: failed to persist dirty index flags: {}", e);
            }
        }
    }

    fn update_indexes_on_insert(&self, manifest: &mut Manifest, blob: &str, doc: &Document) -> Result<()> {
        let descriptors = manifest.indexes.clone();
        let result = self.with_index_stores(manifest, |stores| {
            for descriptor in &descriptors {
                if let Some(store) = stores.get_mut(&descriptor.name) {
                    let value = path::get(doc, &descriptor.key_path).cloned().unwrap_or(Value::Null);
                    store.insert(value, blob.to_string());
                }
            }
        });
        if result.is_err() {
            self.mark_indexes_dirty(manifest);
        }
        result
    }

    fn remove_from_indexes(&self, manifest: &mut Manifest, blob: &str, doc: &Document) -> Result<()> {
        let descriptors = manifest.indexes.clone();
        let result = self.with_index_stores(manifest, |stores| {
            for descriptor in &descriptors {
                if let Some(store) = stores.get_mut(&descriptor.name) {
                    let value = path::get(doc, &descriptor.key_path).cloned().unwrap_or(Value::Null);
                    store.remove(&value, blob);
                }
            }
        });
        if result.is_err() {
            self.mark_indexes_dirty(manifest);
        }
        result
    }

    fn reconcile_indexes(
        &self,
        manifest: &mut Manifest,
        blob: &str,
        old_doc: &Document,
        new_doc: &Document,
    ) -> Result<()> {
        let descriptors = manifest.indexes.clone();
        let result = self.with_index_stores(manifest, |stores| {
            for descriptor in &descriptors {
                if let Some(store) = stores.get_mut(&descriptor.name) {
                    let old_value = path::get(old_doc, &descriptor.key_path).cloned().unwrap_or(Value::Null);
                    let new_value = path::get(new_doc, &descriptor.key_path).cloned().unwrap_or(Value::Null);
                    if old_value != new_value {
                        store.remove(&old_value, blob);
                        store.insert(new_value, blob.to_string());
                    }
                }
            }
        });
        if result.is_err() {
            self.mark_indexes_dirty(manifest);
        }
        result
    }

    /// The planner's driving-index candidates, narrowed to `manifest`'s
    /// id list and re-checked in full against each candidate document.
    fn matched_ids(&self, manifest: &Manifest, filter: &Document) -> Result<Vec<String>> {
        let plan = self.with_index_stores(manifest, |stores| {
            let pairs: Vec<(IndexDescriptor, &IndexStore)> = manifest
                .indexes
                .iter()
                .filter_map(|d| stores.get(&d.name).map(|s| (d.clone(), s)))
                .collect();
            index::plan(filter, &pairs)
        })?;

        let candidates = match plan {
            Plan::FullScan => None,
            Plan::Indexed { candidate_ids, .. } => Some(candidate_ids),
        };

        let mut matched = Vec::new();
        for blob in &manifest.document_ids {
            if let Some(candidates) = &candidates {
                if !candidates.contains(blob) {
                    continue;
                }
            }
            if let Some(doc) = self.load_document(blob)? {
                if filter::matches(filter, &doc)? {
                    matched.push(blob.clone());
                }
            }
        }
        Ok(matched)
    }

    fn insert_one_locked(&self, mut doc: Document) -> Result<InsertOneResult> {
        let mut manifest = self.catalog().load()?;

        let id_value = match doc.get("_id") {
            Some(v) => v.clone(),
            None => {
                let minted = self.inner.minter.mint();
                doc.insert("_id".to_string(), minted.clone());
                minted
            }
        };
        let blob = id::blob_name(&id_value);
        if manifest.document_ids.contains(&blob) {
            return err_at!(DuplicateKey, msg: "duplicate _id {:?}", id_value);
        }

        self.store_document(&blob, doc.clone())?;
        self.catalog().add_document_id(&mut manifest, blob.clone())?;
        self.update_indexes_on_insert(&mut manifest, &blob, &doc)?;

        Ok(InsertOneResult { inserted_id: id_value })
    }

    pub fn insert_one(&self, doc: Document) -> Result<InsertOneResult> {
        lock::with_write(Scope::Collection, &self.lock_name(), || self.insert_one_locked(doc))
    }

    /// With `ordered`, stops at the first failure — documents inserted
    /// before it remain committed. Without, every document is attempted;
    /// if any failed, their messages are joined into one returned error
    /// so no failure is swallowed silently, alongside the partial
    /// `inserted_ids` already committed.
    pub fn insert_many(&self, docs: Vec<Document>, ordered: bool) -> Result<InsertManyResult> {
        lock::with_write(Scope::Collection, &self.lock_name(), || {
            let mut inserted_ids = Vec::new();
            let mut failures = Vec::new();
            for doc in docs {
                match self.insert_one_locked(doc) {
                    Ok(result) => inserted_ids.push(result.inserted_id),
                    Err(e) if ordered => return Err(e),
                    Err(e) => failures.push(e.to_string()),
                }
            }
            if failures.is_empty() {
                Ok(InsertManyResult { inserted_ids })
            } else {
                err_at!(
                    InvalidOperation,
                    msg: "{} insert(s) failed: {}",
                    failures.len(),
                    failures.join("; ")
                )
            }
        })
    }

    pub fn find(&self, filter: Document) -> Result<Cursor> {
        lock::with_read(Scope::Collection, &self.lock_name(), || {
            let manifest = self.catalog().load()?;
            let ids = self.matched_ids(&manifest, &filter)?;
            Ok(Cursor::new(self.inner.clone(), self.database.clone(), self.name.clone(), ids))
        })
    }

    pub fn find_one(&self, filter: Document, sort: Option<Vec<(String, i8)>>) -> Result<Option<Document>> {
        let mut cursor = self.find(filter)?;
        if let Some(sort) = sort {
            cursor = cursor.sort_keys(sort);
        }
        let result = cursor.next();
        cursor.close();
        result
    }

    pub fn count_documents(&self, filter: Document) -> Result<usize> {
        lock::with_read(Scope::Collection, &self.lock_name(), || {
            let manifest = self.catalog().load()?;
            Ok(self.matched_ids(&manifest, &filter)?.len())
        })
    }

    pub fn distinct(&self, key: &str, filter: Option<Document>) -> Result<Vec<Value>> {
        lock::with_read(Scope::Collection, &self.lock_name(), || {
            let manifest = self.catalog().load()?;
            let filter = filter.unwrap_or_default();
            let ids = self.matched_ids(&manifest, &filter)?;
            let mut values = std::collections::BTreeSet::new();
            for id in ids {
                if let Some(doc) = self.load_document(&id)? {
                    values.insert(path::get(&doc, key).cloned().unwrap_or(Value::Null));
                }
            }
            Ok(values.into_iter().collect())
        })
    }

    pub fn replace_one(&self, filter: Document, mut replacement: Document, upsert: bool) -> Result<UpdateResult> {
        lock::with_write(Scope::Collection, &self.lock_name(), || {
            let mut manifest = self.catalog().load()?;
            let ids = self.matched_ids(&manifest, &filter)?;

            match ids.into_iter().next() {
                Some(blob) => {
                    let old_doc = self.require_document(&blob)?;
                    let preserved_id = old_doc.get("_id").cloned().unwrap_or(Value::Null);
                    replacement.insert("_id".to_string(), preserved_id);
                    self.store_document(&blob, replacement.clone())?;
                    self.reconcile_indexes(&mut manifest, &blob, &old_doc, &replacement)?;
                    Ok(UpdateResult { matched_count: 1, modified_count: 1, upserted_id: None })
                }
                None if upsert => {
                    let id_value = replacement.get("_id").cloned().unwrap_or_else(|| self.inner.minter.mint());
                    replacement.insert("_id".to_string(), id_value.clone());
                    let blob = id::blob_name(&id_value);
                    if manifest.document_ids.contains(&blob) {
                        return err_at!(DuplicateKey, msg: "duplicate _id {:?}", id_value);
                    }
                    self.store_document(&blob, replacement.clone())?;
                    self.catalog().add_document_id(&mut manifest, blob.clone())?;
                    self.update_indexes_on_insert(&mut manifest, &blob, &replacement)?;
                    Ok(UpdateResult { matched_count: 0, modified_count: 0, upserted_id: Some(id_value) })
                }
                None => Ok(UpdateResult::default()),
            }
        })
    }

    pub fn update_one(&self, filter: Document, update: Document) -> Result<UpdateResult> {
        lock::with_write(Scope::Collection, &self.lock_name(), || {
            let mut manifest = self.catalog().load()?;
            let ids = self.matched_ids(&manifest, &filter)?;
            let blob = match ids.into_iter().next() {
                Some(blob) => blob,
                None => return Ok(UpdateResult::default()),
            };

            let old_doc = self.require_document(&blob)?;
            let mut new_doc = old_doc.clone();
            update::apply(&mut new_doc, &update)?;
            let modified = new_doc != old_doc;
            if modified {
                self.store_document(&blob, new_doc.clone())?;
                self.reconcile_indexes(&mut manifest, &blob, &old_doc, &new_doc)?;
            }
            Ok(UpdateResult { matched_count: 1, modified_count: usize::from(modified), upserted_id: None })
        })
    }

    pub fn update_many(&self, filter: Document, update: Document) -> Result<UpdateResult> {
        lock::with_write(Scope::Collection, &self.lock_name(), || {
            let mut manifest = self.catalog().load()?;
            let ids = self.matched_ids(&manifest, &filter)?;
            let mut modified_count = 0;
            for blob in &ids {
                let old_doc = self.require_document(blob)?;
                let mut new_doc = old_doc.clone();
                update::apply(&mut new_doc, &update)?;
                if new_doc != old_doc {
                    modified_count += 1;
                    self.store_document(blob, new_doc.clone())?;
                    self.reconcile_indexes(&mut manifest, blob, &old_doc, &new_doc)?;
                }
            }
            Ok(UpdateResult { matched_count: ids.len(), modified_count, upserted_id: None })
        })
    }

    pub fn delete_one(&self, filter: Document) -> Result<DeleteResult> {
        lock::with_write(Scope::Collection, &self.lock_name(), || {
            let mut manifest = self.catalog().load()?;
            let ids = self.matched_ids(&manifest, &filter)?;
            let blob = match ids.into_iter().next() {
                Some(blob) => blob,
                None => return Ok(DeleteResult::default()),
            };
            let doc = self.require_document(&blob)?;
            self.remove_from_indexes(&mut manifest, &blob, &doc)?;
            self.delete_document_blob(&blob)?;
            self.catalog().remove_document_id(&mut manifest, &blob)?;
            Ok(DeleteResult { deleted_count: 1 })
        })
    }

    pub fn delete_many(&self, filter: Document) -> Result<DeleteResult> {
        lock::with_write(Scope::Collection, &self.lock_name(), || {
            let mut manifest = self.catalog().load()?;
            let ids = self.matched_ids(&manifest, &filter)?;
            for blob in &ids {
                let doc = self.require_document(blob)?;
                self.remove_from_indexes(&mut manifest, blob, &doc)?;
                self.delete_document_blob(blob)?;
                self.catalog().remove_document_id(&mut manifest, blob)?;
            }
            Ok(DeleteResult { deleted_count: ids.len() })
        })
    }

    pub fn create_index(&self, keys: impl Into<IndexKeys>) -> Result<String> {
        let (key_path, direction) = match keys.into() {
            IndexKeys::Single(path, direction) => (path, direction),
            IndexKeys::Compound(mut pairs) => {
                if pairs.is_empty() {
                    return err_at!(InvalidArgument, msg: "create_index requires at least one key");
                }
                if pairs.len() > 1 {
                    return err_at!(
                        NotImplemented,
                        msg: "compound indexes are not supported, got {} keys",
                        pairs.len()
                    );
                }
                pairs.remove(0)
            }
        };

        lock::with_write(Scope::Collection, &self.lock_name(), || {
            let mut manifest = self.catalog().load()?;
            let name = IndexDescriptor::default_name(&key_path, direction);
            if manifest.indexes.iter().any(|d| d.name == name) {
                return Ok(name);
            }

            let mut docs = Vec::with_capacity(manifest.document_ids.len());
            for id in &manifest.document_ids {
                if let Some(doc) = self.load_document(id)? {
                    docs.push((id.clone(), doc));
                }
            }
            let store = IndexStore::build(&key_path, docs.iter().map(|(id, d)| (id.as_str(), d)));

            let descriptor = IndexDescriptor::new(name.clone(), key_path.clone(), direction);
            self.catalog().add_index_descriptor(&mut manifest, descriptor)?;

            let key = (self.database.clone(), self.name.clone());
            self.inner
                .indexes
                .lock()
                .unwrap()
                .entry(key)
                .or_insert_with(HashMap::new)
                .insert(name.clone(), store);

            Ok(name)
        })
    }

    pub fn drop_index(&self, name: &str) -> Result<()> {
        lock::with_write(Scope::Collection, &self.lock_name(), || {
            let mut manifest = self.catalog().load()?;
            if !manifest.indexes.iter().any(|d| d.name == name) {
                return err_at!(InvalidOperation, msg: "no such index {}", name);
            }
            self.catalog().remove_index_descriptor(&mut manifest, name)?;
            let key = (self.database.clone(), self.name.clone());
            if let Some(stores) = self.inner.indexes.lock().unwrap().get_mut(&key) {
                stores.remove(name);
            }
            Ok(())
        })
    }

    pub fn index_information(&self) -> Result<HashMap<String, IndexDescriptor>> {
        lock::with_read(Scope::Collection, &self.lock_name(), || {
            let manifest = self.catalog().load()?;
            Ok(manifest.indexes.into_iter().map(|d| (d.name.clone(), d)).collect())
        })
    }

    fn require_document(&self, blob: &str) -> Result<Document> {
        self.load_document(blob)?.ok_or_else(|| {
            Error::Fatal(format!("manifest lists document {} but its blob is missing", blob))
        })
    }
}

#[cfg(test)]
#[path = "collection_test.rs"]
mod collection_test;
