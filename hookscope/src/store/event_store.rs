//! Bounded, newest-first log of webhook deliveries.
//!
//! The store is an explicitly owned handle: construct it once at startup
//! and clone it into whatever needs access. All clones share the same log.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::debug;

use super::types::DeliveryRecord;

/// Number of deliveries retained when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 100;

/// Thread-safe, capacity-bounded delivery log.
///
/// A single mutex serializes `append`, `snapshot` and `clear`, so readers
/// always observe a whole number of appends. The lock is never held across
/// an `.await`.
#[derive(Clone)]
pub struct EventStore {
    inner: Arc<EventStoreInner>,
}

struct EventStoreInner {
    capacity: usize,
    /// Front is newest.
    records: Mutex<VecDeque<DeliveryRecord>>,
}

impl EventStore {
    /// Create an empty store holding at most [`DEFAULT_CAPACITY`] records.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty store with a custom bound. A zero capacity is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(EventStoreInner {
                capacity,
                records: Mutex::new(VecDeque::with_capacity(capacity)),
            }),
        }
    }

    /// Stamp the record with the current time and insert it as the newest
    /// entry, dropping the oldest one if the log is full.
    pub fn append(&self, mut record: DeliveryRecord) -> DeliveryRecord {
        let mut records = self.inner.records.lock();

        record.stamp(Utc::now());
        records.push_front(record.clone());

        if records.len() > self.inner.capacity {
            if let Some(evicted) = records.pop_back() {
                debug!(
                    evicted_id = %evicted.envelope().id,
                    capacity = self.inner.capacity,
                    "event_store_evicted"
                );
            }
        }

        record
    }

    /// Independent copy of the log, newest first.
    pub fn snapshot(&self) -> Vec<DeliveryRecord> {
        self.inner.records.lock().iter().cloned().collect()
    }

    /// Remove every record.
    pub fn clear(&self) {
        let mut records = self.inner.records.lock();
        let cleared = records.len();
        records.clear();
        debug!(cleared = cleared, "event_store_cleared");
    }

    pub fn len(&self) -> usize {
        self.inner.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.records.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{DeliveryEnvelope, VerificationError};

    fn record(id: &str) -> DeliveryRecord {
        DeliveryRecord::verified(
            DeliveryEnvelope::new(id, "1700000000", "v1,abc"),
            b"{}".to_vec(),
            None,
        )
    }

    fn ids(records: &[DeliveryRecord]) -> Vec<String> {
        records.iter().map(|r| r.envelope().id.clone()).collect()
    }

    #[test]
    fn test_newest_first() {
        let store = EventStore::new();
        store.append(record("r1"));
        store.append(record("r2"));

        assert_eq!(ids(&store.snapshot()), vec!["r2", "r1"]);
    }

    #[test]
    fn test_bounded_retention() {
        let store = EventStore::new();
        for i in 0..=DEFAULT_CAPACITY {
            store.append(record(&format!("msg_{}", i)));
        }

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), DEFAULT_CAPACITY);
        assert_eq!(snapshot[0].envelope().id, "msg_100");
        assert_eq!(snapshot[DEFAULT_CAPACITY - 1].envelope().id, "msg_1");
        assert!(!ids(&snapshot).contains(&"msg_0".to_string()));
    }

    #[test]
    fn test_zero_capacity_raised() {
        let store = EventStore::with_capacity(0);
        assert_eq!(store.capacity(), 1);

        store.append(record("a"));
        store.append(record("b"));
        assert_eq!(ids(&store.snapshot()), vec!["b"]);
    }

    #[test]
    fn test_append_stamps_received_at() {
        let store = EventStore::new();
        let before = Utc::now();
        let stored = store.append(record("r1"));

        assert!(stored.received_at() >= before);
        assert_eq!(store.snapshot()[0], stored);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let store = EventStore::new();
        store.append(record("r1"));

        let snapshot = store.snapshot();
        store.append(record("r2"));
        store.clear();

        assert_eq!(ids(&snapshot), vec!["r1"]);
    }

    #[test]
    fn test_clear_idempotent() {
        let store = EventStore::new();
        store.clear();
        assert!(store.snapshot().is_empty());

        store.append(record("r1"));
        store.append(DeliveryRecord::rejected(
            DeliveryEnvelope::default(),
            Vec::new(),
            &VerificationError::SignatureMismatch,
        ));
        store.clear();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);

        store.append(record("r3"));
        assert_eq!(ids(&store.snapshot()), vec!["r3"]);
    }

    #[test]
    fn test_clones_share_log() {
        let store = EventStore::new();
        let handle = store.clone();
        handle.append(record("shared"));

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_concurrent_appends() {
        let store = EventStore::with_capacity(50);
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        store.append(record(&format!("t{}-{}", t, i)));
                        let snapshot = store.snapshot();
                        assert!(snapshot.len() <= 50);
                    }
                })
            })
            .collect();

        for thread in threads {
            thread.join().unwrap();
        }

        assert_eq!(store.len(), 50);
    }

    /// Ids are `t<thread>-<seq>`; within one writer, newer means larger `seq`.
    fn assert_consistent(snapshot: &[DeliveryRecord], capacity: usize) {
        assert!(snapshot.len() <= capacity);

        let mut last_seen: std::collections::HashMap<&str, usize> = Default::default();
        for record in snapshot {
            let (thread, seq) = record.envelope().id.split_once('-').unwrap();
            let seq: usize = seq.parse().unwrap();
            if let Some(&newer) = last_seen.get(thread) {
                assert!(seq < newer, "{} appears after an older entry", record.envelope().id);
            }
            last_seen.insert(thread, seq);
        }
    }

    #[test]
    fn test_concurrent_append_snapshot_clear() {
        const CAPACITY: usize = 20;
        let store = EventStore::with_capacity(CAPACITY);

        let writers: Vec<_> = (0..4)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        store.append(record(&format!("t{}-{}", t, i)));
                    }
                })
            })
            .collect();

        let clearer = {
            let store = store.clone();
            std::thread::spawn(move || {
                for _ in 0..50 {
                    store.clear();
                    std::thread::yield_now();
                }
            })
        };

        let readers: Vec<_> = (0..2)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        assert_consistent(&store.snapshot(), CAPACITY);
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers).chain(Some(clearer)) {
            handle.join().unwrap();
        }

        assert_consistent(&store.snapshot(), CAPACITY);
        assert!(store.len() <= CAPACITY);
    }
}
