//! Per-address admission control.
//!
//! Bounds how many streams a single client address may hold open at once.
//! Each open stream owns a background probe task and an outbound socket, so
//! the ceiling caps worst-case resource usage per caller.
//!
//! A single mutex guards the whole map. There is one acquire/release pair per
//! stream open/close, so contention is low, and check-and-increment must be
//! atomic per address.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

/// Active stream counts keyed by client address (port stripped).
///
/// Entries are created on first acquisition and kept at zero afterwards;
/// cardinality is bounded by the set of observed clients.
#[derive(Debug)]
pub struct AdmissionTracker {
    limit: usize,
    counts: Mutex<HashMap<IpAddr, usize>>,
}

impl AdmissionTracker {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            counts: Mutex::new(HashMap::new()),
        }
    }

    /// Fixed per-address ceiling.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Slots still free for `addr`.
    ///
    /// A poisoned lock reports zero remaining.
    pub fn remaining(&self, addr: IpAddr) -> usize {
        match self.counts.lock() {
            Ok(counts) => self.limit.saturating_sub(counts.get(&addr).copied().unwrap_or(0)),
            Err(_) => 0,
        }
    }

    /// Streams currently held by `addr`.
    pub fn active(&self, addr: IpAddr) -> usize {
        match self.counts.lock() {
            Ok(counts) => counts.get(&addr).copied().unwrap_or(0),
            Err(_) => self.limit,
        }
    }

    /// Take one slot for `addr` if one is free.
    ///
    /// Check and increment happen under one lock, so concurrent callers for
    /// the same address can never overrun the ceiling. Poisoned lock means a
    /// logic bug elsewhere; treat it as "deny" instead of panicking.
    pub fn try_acquire(&self, addr: IpAddr) -> bool {
        let Ok(mut counts) = self.counts.lock() else {
            return false;
        };
        let count = counts.entry(addr).or_insert(0);
        if *count >= self.limit {
            return false;
        }
        *count += 1;
        true
    }

    /// Give back one slot. Never goes below zero; releasing an idle address
    /// is a no-op.
    pub fn release(&self, addr: IpAddr) {
        if let Ok(mut counts) = self.counts.lock() {
            if let Some(count) = counts.get_mut(&addr) {
                *count = count.saturating_sub(1);
            }
        }
    }

    /// RAII form of [`try_acquire`](Self::try_acquire): the returned slot
    /// releases itself when dropped.
    pub fn acquire_slot(self: &Arc<Self>, addr: IpAddr) -> Option<AdmissionSlot> {
        if !self.try_acquire(addr) {
            return None;
        }
        Some(AdmissionSlot {
            tracker: Arc::clone(self),
            addr,
        })
    }
}

/// One held admission slot. Released exactly once, on drop.
#[derive(Debug)]
pub struct AdmissionSlot {
    tracker: Arc<AdmissionTracker>,
    addr: IpAddr,
}

impl AdmissionSlot {
    /// Free slots left for this slot's address (this slot counted as used).
    pub fn remaining(&self) -> usize {
        self.tracker.remaining(self.addr)
    }

    pub fn limit(&self) -> usize {
        self.tracker.limit()
    }
}

impl Drop for AdmissionSlot {
    fn drop(&mut self) {
        self.tracker.release(self.addr);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn unseen_address_has_full_budget() {
        let t = AdmissionTracker::new(10);
        assert_eq!(t.limit(), 10);
        assert_eq!(t.remaining(ip("10.0.0.1")), 10);
        assert_eq!(t.active(ip("10.0.0.1")), 0);
    }

    #[test]
    fn zero_limit_is_clamped() {
        let t = AdmissionTracker::new(0);
        assert_eq!(t.limit(), 1);
        assert!(t.try_acquire(ip("10.0.0.1")));
        assert!(!t.try_acquire(ip("10.0.0.1")));
    }

    #[test]
    fn remaining_tracks_acquisitions() {
        let t = AdmissionTracker::new(10);
        let a = ip("10.0.0.1");
        for k in 1..=4 {
            assert!(t.try_acquire(a));
            assert_eq!(t.remaining(a), 10 - k);
        }
    }

    #[test]
    fn release_on_idle_address_is_noop() {
        let t = AdmissionTracker::new(2);
        let a = ip("10.0.0.1");
        t.release(a);
        assert!(t.try_acquire(a));
        t.release(a);
        t.release(a);
        assert_eq!(t.active(a), 0);
        assert_eq!(t.remaining(a), 2);
    }

    #[test]
    fn addresses_are_independent() {
        let t = AdmissionTracker::new(1);
        assert!(t.try_acquire(ip("10.0.0.1")));
        assert!(!t.try_acquire(ip("10.0.0.1")));
        assert!(t.try_acquire(ip("10.0.0.2")));
        assert!(t.try_acquire(ip("::1")));
    }

    #[test]
    fn slot_releases_on_drop() {
        let t = Arc::new(AdmissionTracker::new(1));
        let a = ip("192.168.1.7");

        let slot = t.acquire_slot(a).unwrap();
        assert_eq!(slot.remaining(), 0);
        assert!(t.acquire_slot(a).is_none());

        drop(slot);
        assert_eq!(t.active(a), 0);
        assert!(t.acquire_slot(a).is_some());
    }
}
