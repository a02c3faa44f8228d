use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;

use mipsim_core::bus::pool::{TaskCounter, WorkerPool};

#[test]
fn zero_workers_run_on_the_caller() {
    let pool = WorkerPool::new(0, 4);
    let caller = thread::current().id();
    let ran_on = Arc::new(std::sync::Mutex::new(None));

    let slot = Arc::clone(&ran_on);
    pool.submit(Box::new(move || {
        *slot.lock().unwrap() = Some(thread::current().id());
    }));

    assert_eq!(pool.workers(), 0);
    assert_eq!(pool.pending(), 0);
    assert_eq!(*ran_on.lock().unwrap(), Some(caller));
}

#[test]
fn workers_pick_up_queued_tasks() {
    let pool = WorkerPool::new(3, 8);
    let done = Arc::new(AtomicUsize::new(0));

    for _ in 0..20 {
        let done = Arc::clone(&done);
        pool.submit(Box::new(move || {
            let _ = done.fetch_add(1, Ordering::SeqCst);
        }));
    }

    assert!(pool.wait_idle(Duration::from_secs(5)));
    assert_eq!(done.load(Ordering::SeqCst), 20);
    assert_eq!(pool.workers(), 3);
    let report = pool.shutdown(Duration::from_secs(1));
    assert!(report.drained);
    assert_eq!(pool.workers(), 0);
}

#[test]
fn panicking_task_is_contained() {
    let pool = WorkerPool::new(1, 2);
    let done = Arc::new(AtomicUsize::new(0));

    pool.submit(Box::new(|| panic!("task failure")));
    let counter = Arc::clone(&done);
    pool.submit(Box::new(move || {
        let _ = counter.fetch_add(1, Ordering::SeqCst);
    }));

    assert!(pool.wait_idle(Duration::from_secs(5)));
    assert_eq!(done.load(Ordering::SeqCst), 1);
    assert_eq!(pool.pending(), 0);
    let _ = pool.shutdown(Duration::from_secs(1));
}

#[test]
fn counter_guards_release_on_drop() {
    let counter = Arc::new(TaskCounter::default());

    let a = counter.track();
    let b = counter.track();
    assert_eq!(counter.get(), 2);
    assert!(!counter.wait_zero(Duration::from_millis(10)));

    drop(a);
    drop(b);
    assert_eq!(counter.get(), 0);
    assert!(counter.wait_zero(Duration::from_millis(10)));
}
