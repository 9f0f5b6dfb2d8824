//! The metadata catalog: loads and persists the per-collection manifest,
//! the single source of truth for which documents and indexes exist.
//!
//! Every mutation writes a complete new manifest blob (copy-on-write), as
//! §4.3 requires — there is no incremental manifest patch format.

use crate::{
    codec::Codec,
    index::IndexDescriptor,
    storage::{Storage, StoragePath},
    Result,
};

const MANIFEST_BLOB: &str = "$.metadata";
const SCHEMA_VERSION: u32 = 1;

/// Per-collection persisted metadata. `document_ids` is kept in insertion
/// order — it doubles as the cursor's default (unsorted) result order.
#[derive(Clone, Debug, PartialEq)]
pub struct Manifest {
    pub collection_id: String,
    pub document_ids: Vec<String>,
    pub indexes: Vec<IndexDescriptor>,
    pub schema_version: u32,
}

impl Manifest {
    pub fn new(collection_id: impl Into<String>) -> Manifest {
        Manifest {
            collection_id: collection_id.into(),
            document_ids: Vec::new(),
            indexes: Vec::new(),
            schema_version: SCHEMA_VERSION,
        }
    }
}

/// Loads/saves [Manifest] blobs through a [Storage] backend and a
/// document [Codec] (the manifest is encoded the same way documents are —
/// a flat document with `document_ids`/`indexes`/`schema_version` keys —
/// rather than a second bespoke wire format).
pub struct Catalog<'a> {
    storage: &'a dyn Storage,
    codec: &'a dyn Codec,
    database: String,
    collection: String,
}

impl<'a> Catalog<'a> {
    pub fn new(
        storage: &'a dyn Storage,
        codec: &'a dyn Codec,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Catalog<'a> {
        Catalog {
            storage,
            codec,
            database: database.into(),
            collection: collection.into(),
        }
    }

    fn manifest_path(&self) -> StoragePath {
        StoragePath::new([self.database.clone(), self.collection.clone(), MANIFEST_BLOB.to_string()])
    }

    /// Load the manifest, creating an empty one (not yet persisted) if the
    /// collection has never been written to — "created on first access".
    pub fn load(&self) -> Result<Manifest> {
        match self.storage.get(&self.manifest_path())? {
            Some(bytes) => decode_manifest(self.codec, &bytes),
            None => Ok(Manifest::new(self.collection.clone())),
        }
    }

    pub fn save(&self, manifest: &Manifest) -> Result<()> {
        let bytes = encode_manifest(self.codec, manifest);
        self.storage.put(&self.manifest_path(), bytes)
    }

    /// Appends `id`, preserving insertion order; a no-op if already present
    /// (callers enforce the `DUPLICATE_KEY` check before reaching here).
    pub fn add_document_id(&self, manifest: &mut Manifest, id: String) -> Result<()> {
        if !manifest.document_ids.contains(&id) {
            manifest.document_ids.push(id);
        }
        self.save(manifest)
    }

    pub fn remove_document_id(&self, manifest: &mut Manifest, id: &str) -> Result<()> {
        manifest.document_ids.retain(|existing| existing != id);
        self.save(manifest)
    }

    pub fn add_index_descriptor(
        &self,
        manifest: &mut Manifest,
        descriptor: IndexDescriptor,
    ) -> Result<()> {
        manifest.indexes.retain(|d| d.name != descriptor.name);
        manifest.indexes.push(descriptor);
        self.save(manifest)
    }

    pub fn remove_index_descriptor(&self, manifest: &mut Manifest, name: &str) -> Result<()> {
        manifest.indexes.retain(|d| d.name != name);
        self.save(manifest)
    }
}

fn encode_manifest(codec: &dyn Codec, manifest: &Manifest) -> Vec<u8> {
    use crate::value::{Document, Value};

    let mut doc = Document::new();
    doc.insert(
        "collection_id".to_string(),
        Value::String(manifest.collection_id.clone()),
    );
    doc.insert(
        "document_ids".to_string(),
        Value::Array(
            manifest
                .document_ids
                .iter()
                .map(|id| Value::String(id.clone()))
                .collect(),
        ),
    );
    doc.insert(
        "indexes".to_string(),
        Value::Array(manifest.indexes.iter().map(IndexDescriptor::to_value).collect()),
    );
    doc.insert(
        "schema_version".to_string(),
        Value::Int(manifest.schema_version as i64),
    );
    codec.encode(&doc)
}

fn decode_manifest(codec: &dyn Codec, bytes: &[u8]) -> Result<Manifest> {
    use crate::value::Value;

    let doc = codec.decode(bytes)?;
    let collection_id = match doc.get("collection_id") {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };
    let document_ids = match doc.get("document_ids") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    let indexes = match doc.get("indexes") {
        Some(Value::Array(items)) => {
            items.iter().filter_map(IndexDescriptor::from_value).collect()
        }
        _ => Vec::new(),
    };
    let schema_version = match doc.get("schema_version") {
        Some(Value::Int(i)) => *i as u32,
        _ => SCHEMA_VERSION,
    };
    Ok(Manifest {
        collection_id,
        document_ids,
        indexes,
        schema_version,
    })
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;
