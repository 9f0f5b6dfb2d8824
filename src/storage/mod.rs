//! Object-addressed blob storage, pluggable between [memory] and [fs]
//! backends behind one [Storage] contract.

pub mod fs;
pub mod memory;

use crate::Result;

/// A path into the storage hierarchy: `[database, collection, blob_name]`.
/// Segments are opaque strings; the filesystem backend URL-safe-encodes
/// each one into a directory/file component.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoragePath(Vec<String>);

impl StoragePath {
    pub fn new(segments: impl IntoIterator<Item = impl Into<String>>) -> StoragePath {
        StoragePath(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// True when `self` starts with every segment of `prefix`, used by
    /// [Storage::list].
    pub fn starts_with(&self, prefix: &StoragePath) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }
}

/// A monotonically changing token, returned by [Storage::touch], used by
/// the document cache to detect staleness without decoding the blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionToken(pub String);

/// The uniform contract every storage backend implements.
pub trait Storage: Send + Sync {
    /// Read the blob at `path`, or `Ok(None)` if it doesn't exist.
    fn get(&self, path: &StoragePath) -> Result<Option<Vec<u8>>>;

    /// Atomically replace the blob at `path`. Fails with `STORAGE_IO` on
    /// I/O error.
    fn put(&self, path: &StoragePath, bytes: Vec<u8>) -> Result<()>;

    /// Remove the blob at `path`. Idempotent: returns `Ok(false)` if it
    /// was already absent.
    fn delete(&self, path: &StoragePath) -> Result<bool>;

    /// List every stored path starting with `prefix`.
    fn list(&self, prefix: &StoragePath) -> Result<Vec<StoragePath>>;

    /// Return a token that changes iff `path` has been written since the
    /// last call. `None` when the path doesn't exist.
    fn touch(&self, path: &StoragePath) -> Result<Option<VersionToken>>;
}
