//! Admission tracker under concurrent acquire/release traffic.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use pingstream_core::AdmissionTracker;

const LIMIT: usize = 10;
const CALLERS: usize = 50;

fn addr() -> IpAddr {
    "203.0.113.9".parse().unwrap()
}

#[test]
fn concurrent_acquire_admits_exactly_limit() {
    let tracker = Arc::new(AdmissionTracker::new(LIMIT));
    let barrier = Arc::new(Barrier::new(CALLERS));
    let admitted = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            let barrier = Arc::clone(&barrier);
            let admitted = Arc::clone(&admitted);
            thread::spawn(move || {
                barrier.wait();
                if tracker.try_acquire(addr()) {
                    admitted.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(admitted.load(Ordering::SeqCst), LIMIT);
    assert_eq!(tracker.active(addr()), LIMIT);
    assert_eq!(tracker.remaining(addr()), 0);
    assert!(!tracker.try_acquire(addr()), "limit+1-th call must fail");
}

#[test]
fn acquire_release_storm_never_exceeds_limit() {
    let tracker = Arc::new(AdmissionTracker::new(LIMIT));
    let barrier = Arc::new(Barrier::new(CALLERS));
    let held = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            let barrier = Arc::clone(&barrier);
            let held = Arc::clone(&held);
            let peak = Arc::clone(&peak);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..200 {
                    if let Some(slot) = tracker.acquire_slot(addr()) {
                        let now = held.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        assert!(tracker.active(addr()) <= LIMIT);
                        thread::yield_now();
                        held.fetch_sub(1, Ordering::SeqCst);
                        drop(slot);
                    }
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert!(peak.load(Ordering::SeqCst) <= LIMIT);
    assert_eq!(tracker.active(addr()), 0);
    assert_eq!(tracker.remaining(addr()), LIMIT);
}

#[test]
fn released_slot_is_reusable_at_ceiling() {
    let tracker = AdmissionTracker::new(LIMIT);
    for _ in 0..LIMIT {
        assert!(tracker.try_acquire(addr()));
    }
    assert!(!tracker.try_acquire(addr()));

    tracker.release(addr());
    assert_eq!(tracker.remaining(addr()), 1);
    assert!(tracker.try_acquire(addr()));
    assert!(!tracker.try_acquire(addr()));
}
