use super::*;

#[test]
fn put_get_roundtrip() {
    let s = MemoryStorage::new();
    let p = StoragePath::new(["db", "coll", "id1"]);
    assert_eq!(s.get(&p).unwrap(), None);
    s.put(&p, b"hello".to_vec()).unwrap();
    assert_eq!(s.get(&p).unwrap(), Some(b"hello".to_vec()));
}

#[test]
fn delete_is_idempotent() {
    let s = MemoryStorage::new();
    let p = StoragePath::new(["db", "coll", "id1"]);
    s.put(&p, b"x".to_vec()).unwrap();
    assert!(s.delete(&p).unwrap());
    assert!(!s.delete(&p).unwrap());
}

#[test]
fn touch_changes_on_every_put() {
    let s = MemoryStorage::new();
    let p = StoragePath::new(["db", "coll", "id1"]);
    assert_eq!(s.touch(&p).unwrap(), None);
    s.put(&p, b"a".to_vec()).unwrap();
    let t1 = s.touch(&p).unwrap();
    s.put(&p, b"b".to_vec()).unwrap();
    let t2 = s.touch(&p).unwrap();
    assert_ne!(t1, t2);
}

#[test]
fn list_filters_by_prefix() {
    let s = MemoryStorage::new();
    s.put(&StoragePath::new(["db", "a", "1"]), vec![]).unwrap();
    s.put(&StoragePath::new(["db", "b", "1"]), vec![]).unwrap();
    let results = s.list(&StoragePath::new(["db", "a"])).unwrap();
    assert_eq!(results.len(), 1);
}
