use super::*;
use std::{
    sync::atomic::{AtomicBool, Ordering as AtomicOrdering},
    sync::Arc,
    thread,
    time::Duration,
};

#[test]
fn write_excludes_concurrent_read() {
    let entered_read = Arc::new(AtomicBool::new(false));
    let entered_read2 = entered_read.clone();

    let writer = thread::spawn(move || {
        with_write(Scope::Collection, "lock_test_excl", || {
            thread::sleep(Duration::from_millis(50));
            assert!(!entered_read2.load(AtomicOrdering::SeqCst));
        });
    });

    thread::sleep(Duration::from_millis(10));
    with_read(Scope::Collection, "lock_test_excl", || {
        entered_read.store(true, AtomicOrdering::SeqCst);
    });

    writer.join().unwrap();
}

#[test]
fn distinct_names_do_not_contend() {
    with_write(Scope::Collection, "a", || {
        with_write(Scope::Collection, "b", || {
            // both writers held concurrently: no deadlock.
        });
    });
}
