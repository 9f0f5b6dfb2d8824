use super::*;
use crate::{codec::DefaultCodec, storage::memory::MemoryStorage};

fn doc(x: i64) -> Document {
    let mut d = Document::new();
    d.insert("x".to_string(), Value::Int(x));
    d
}

#[test]
fn miss_then_hit_without_touching_storage_get() {
    let storage = MemoryStorage::new();
    let codec = DefaultCodec;
    let cache = Cache::new();
    let path = StoragePath::new(["db", "coll", "1"]);
    let id = Value::String("1".to_string());

    cache.put(&storage, &codec, &path, "coll", &id, doc(1)).unwrap();

    let first = cache.get(&storage, &codec, &path, "coll", &id).unwrap();
    assert_eq!(first, Some(doc(1)));

    // Overwrite storage directly, bypassing the cache's own put, so a
    // cache hit would return stale data if the token check were broken.
    storage.put(&path, codec.encode(&doc(2))).unwrap();
    let second = cache.get(&storage, &codec, &path, "coll", &id).unwrap();
    assert_eq!(second, Some(doc(2)));
}

#[test]
fn missing_blob_yields_none_and_clears_any_stale_entry() {
    let storage = MemoryStorage::new();
    let codec = DefaultCodec;
    let cache = Cache::new();
    let path = StoragePath::new(["db", "coll", "1"]);
    let id = Value::String("1".to_string());

    cache.put(&storage, &codec, &path, "coll", &id, doc(1)).unwrap();
    storage.delete(&path).unwrap();

    let result = cache.get(&storage, &codec, &path, "coll", &id).unwrap();
    assert_eq!(result, None);
}

#[test]
fn invalidate_forces_a_reload() {
    let storage = MemoryStorage::new();
    let codec = DefaultCodec;
    let cache = Cache::new();
    let path = StoragePath::new(["db", "coll", "1"]);
    let id = Value::String("1".to_string());

    cache.put(&storage, &codec, &path, "coll", &id, doc(1)).unwrap();
    cache.invalidate("coll", &id);

    let result = cache.get(&storage, &codec, &path, "coll", &id).unwrap();
    assert_eq!(result, Some(doc(1)));
}
