//! Reassembly store for fragmented Photon payloads.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::limits::Limits;

/// One partially reassembled payload, keyed by its start sequence number.
#[derive(Debug)]
struct PendingFragment {
    /// Declared total length; fixed by the first fragment seen.
    total_length: usize,
    payload: Vec<u8>,
    bytes_written: usize,
    created_at: Instant,
}

/// Result of offering one fragment to the store.
#[derive(Debug, PartialEq, Eq)]
pub enum FragmentOutcome {
    /// Fragment stored; the payload is still incomplete.
    Stored,
    /// This fragment completed the payload; the entry has been removed.
    Completed(Vec<u8>),
    /// Fragment discarded (out of declared range); any entry is kept.
    Discarded,
    /// Fragment rejected by [`Limits`] before an entry was created.
    Rejected,
}

/// Thread-safe mapping from start sequence number to reassembly state.
///
/// Entries are created by the first fragment for a key and removed either
/// on completion or by [`sweep`](Self::sweep) once older than the TTL.
/// A later fragment declaring a different total length does not overwrite
/// the entry's total; the first declaration wins.
#[derive(Debug)]
pub struct FragmentStore {
    pending: Mutex<HashMap<i32, PendingFragment>>,
    limits: Limits,
}

impl FragmentStore {
    /// Creates an empty store with the given limits.
    #[must_use]
    pub fn new(limits: Limits) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            limits,
        }
    }

    /// Offers one fragment: `data` goes at `offset` within the payload
    /// whose declared total length is `total_length`.
    #[must_use]
    pub fn insert(
        &self,
        start_sequence: i32,
        total_length: i32,
        offset: usize,
        data: &[u8],
    ) -> FragmentOutcome {
        let Ok(mut pending) = self.pending.lock() else {
            return FragmentOutcome::Rejected;
        };

        if !pending.contains_key(&start_sequence) {
            if total_length < 0
                || total_length as usize > self.limits.max_fragment_total
                || pending.len() >= self.limits.max_pending_fragments
            {
                return FragmentOutcome::Rejected;
            }
        }

        // The closure only runs for a fresh key, which the guard above
        // has already validated; an existing entry keeps its first total.
        let total = total_length.max(0) as usize;
        let entry = pending.entry(start_sequence).or_insert_with(|| PendingFragment {
            total_length: total,
            payload: vec![0; total],
            bytes_written: 0,
            created_at: Instant::now(),
        });

        // A fragment past the declared end is dropped; the entry stays.
        let end = match offset.checked_add(data.len()) {
            Some(end) if end <= entry.total_length => end,
            _ => return FragmentOutcome::Discarded,
        };

        entry.payload[offset..end].copy_from_slice(data);
        entry.bytes_written += data.len();

        if entry.bytes_written >= entry.total_length {
            match pending.remove(&start_sequence) {
                Some(done) => FragmentOutcome::Completed(done.payload),
                None => FragmentOutcome::Stored,
            }
        } else {
            FragmentOutcome::Stored
        }
    }

    /// Removes entries older than `ttl`; returns how many were evicted.
    pub fn sweep(&self, ttl: Duration) -> usize {
        let Ok(mut pending) = self.pending.lock() else {
            return 0;
        };
        let before = pending.len();
        let now = Instant::now();
        pending.retain(|_, entry| now.duration_since(entry.created_at) <= ttl);
        before - pending.len()
    }

    /// Number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().map_or(0, |pending| pending.len())
    }

    /// Returns `true` if no reassembly is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> FragmentStore {
        FragmentStore::new(Limits::for_testing())
    }

    #[test]
    fn first_fragment_creates_entry() {
        let store = store();
        let outcome = store.insert(42, 10, 0, &[1, 2, 3]);
        assert_eq!(outcome, FragmentOutcome::Stored);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn completion_returns_payload_and_removes_entry() {
        let store = store();
        assert_eq!(store.insert(42, 6, 0, &[1, 2, 3]), FragmentOutcome::Stored);
        match store.insert(42, 6, 3, &[4, 5, 6]) {
            FragmentOutcome::Completed(payload) => {
                assert_eq!(payload, vec![1, 2, 3, 4, 5, 6]);
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert!(store.is_empty());
    }

    #[test]
    fn single_covering_fragment_completes_immediately() {
        let store = store();
        match store.insert(1, 3, 0, &[7, 8, 9]) {
            FragmentOutcome::Completed(payload) => assert_eq!(payload, vec![7, 8, 9]),
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_fragment_discarded_entry_kept() {
        let store = store();
        assert_eq!(store.insert(1, 4, 0, &[1]), FragmentOutcome::Stored);
        // offset 3 + 2 bytes > total 4
        assert_eq!(store.insert(1, 4, 3, &[2, 3]), FragmentOutcome::Discarded);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn out_of_range_first_fragment_still_creates_entry() {
        let store = store();
        assert_eq!(store.insert(1, 2, 5, &[1]), FragmentOutcome::Discarded);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn offset_overflow_discarded() {
        let store = store();
        assert_eq!(
            store.insert(1, 8, usize::MAX, &[1, 2]),
            FragmentOutcome::Discarded
        );
    }

    #[test]
    fn first_total_length_wins() {
        let store = store();
        assert_eq!(store.insert(7, 4, 0, &[1, 2]), FragmentOutcome::Stored);
        // A contradictory larger total does not resize the entry; writing
        // past the original total is discarded.
        assert_eq!(store.insert(7, 100, 4, &[9, 9]), FragmentOutcome::Discarded);
        // Completing against the original total still works.
        match store.insert(7, 100, 2, &[3, 4]) {
            FragmentOutcome::Completed(payload) => assert_eq!(payload, vec![1, 2, 3, 4]),
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn negative_total_rejected() {
        let store = store();
        assert_eq!(store.insert(1, -5, 0, &[1]), FragmentOutcome::Rejected);
        assert!(store.is_empty());
    }

    #[test]
    fn oversized_total_rejected() {
        let store = store();
        // for_testing caps totals at 4096
        assert_eq!(store.insert(1, 5000, 0, &[1]), FragmentOutcome::Rejected);
        assert!(store.is_empty());
    }

    #[test]
    fn pending_entry_cap_enforced() {
        let store = store();
        for seq in 0..8 {
            assert_eq!(store.insert(seq, 10, 0, &[1]), FragmentOutcome::Stored);
        }
        assert_eq!(store.insert(99, 10, 0, &[1]), FragmentOutcome::Rejected);
        assert_eq!(store.len(), 8);
    }

    #[test]
    fn sweep_removes_only_old_entries() {
        let store = store();
        assert_eq!(store.insert(1, 10, 0, &[1]), FragmentOutcome::Stored);
        // Everything is fresh; a sweep with a generous TTL removes nothing.
        assert_eq!(store.sweep(Duration::from_secs(30)), 0);
        assert_eq!(store.len(), 1);
        // A zero TTL expires everything.
        assert_eq!(store.sweep(Duration::ZERO), 1);
        assert!(store.is_empty());
    }
}
