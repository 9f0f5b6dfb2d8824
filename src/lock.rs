//! The process-global lock registry.
//!
//! This plays the role of the teacher's `gate.rs` latch-and-spin
//! mechanism — same metaphor ("a reader may enter only when the door is
//! unlocked and unlatched; a writer needs the room to itself") — but the
//! mechanism underneath is a plain `std::sync::RwLock` rather than a
//! lock-free atomic CAS loop. This system's invariants (§8) depend on
//! strict mutual exclusion, not on lock-free latency, so correctness of a
//! well-tested standard primitive wins over reimplementing one.
//!
//! Scopes: `Database`, `Collection`, `Index`. Lock ordering — `Database`
//! before `Collection` before `Index`, lexicographic by name within a
//! scope — is the caller's responsibility; this registry only hands out
//! locks, it does not enforce the order. Locks are released on every exit
//! path, including panics: `with_read`/`with_write` hold the guard only
//! for the duration of the supplied closure.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, RwLock},
};

use lazy_static::lazy_static;
use log::trace;

/// The three scopes a lock name can live in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    Database,
    Collection,
    Index,
}

type RegistryKey = (Scope, String);

#[derive(Default)]
struct Registry {
    locks: Mutex<HashMap<RegistryKey, Arc<RwLock<()>>>>,
}

impl Registry {
    fn entry(&self, scope: Scope, name: &str) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks
            .entry((scope, name.to_string()))
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }
}

lazy_static! {
    static ref REGISTRY: Registry = Registry::default();
}

/// Run `f` while holding the reader lock for `(scope, name)`. Blocks while
/// a writer holds the lock; any number of readers may run concurrently.
pub fn with_read<T>(scope: Scope, name: &str, f: impl FnOnce() -> T) -> T {
    trace!("docudb: acquire_read {:?}/{}", scope, name);
    let lock = REGISTRY.entry(scope, name);
    let _guard = lock.read().unwrap();
    f()
}

/// Run `f` while holding the writer lock for `(scope, name)`. Blocks while
/// any reader or writer holds the lock.
pub fn with_write<T>(scope: Scope, name: &str, f: impl FnOnce() -> T) -> T {
    trace!("docudb: acquire_write {:?}/{}", scope, name);
    let lock = REGISTRY.entry(scope, name);
    let _guard = lock.write().unwrap();
    f()
}

#[cfg(test)]
#[path = "lock_test.rs"]
mod lock_test;
