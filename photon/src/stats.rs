//! Lock-free parser statistics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// Thread-safe counter bundle for the Photon parser.
///
/// Every counter is updated with an atomic add and read with an atomic
/// load; there is no shared lock on the hot path. The start timestamp is
/// only touched by [`new`](Self::new) and [`reset`](Self::reset).
#[derive(Debug)]
pub struct Stats {
    packets_received: AtomicU64,
    packets_processed: AtomicU64,
    packets_encrypted: AtomicU64,
    packets_with_crc: AtomicU64,
    packets_malformed: AtomicU64,

    fragments_received: AtomicU64,
    fragments_completed: AtomicU64,
    fragments_expired: AtomicU64,

    events_decoded: AtomicU64,
    requests_decoded: AtomicU64,
    responses_decoded: AtomicU64,
    events_dropped: AtomicU64,

    bytes_received: AtomicU64,

    /// Unix milliseconds of the last packet, 0 before the first packet.
    last_packet_unix_ms: AtomicU64,

    start: Mutex<Instant>,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    /// Creates a new `Stats` with the start time stamped now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            packets_received: AtomicU64::new(0),
            packets_processed: AtomicU64::new(0),
            packets_encrypted: AtomicU64::new(0),
            packets_with_crc: AtomicU64::new(0),
            packets_malformed: AtomicU64::new(0),
            fragments_received: AtomicU64::new(0),
            fragments_completed: AtomicU64::new(0),
            fragments_expired: AtomicU64::new(0),
            events_decoded: AtomicU64::new(0),
            requests_decoded: AtomicU64::new(0),
            responses_decoded: AtomicU64::new(0),
            events_dropped: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            last_packet_unix_ms: AtomicU64::new(0),
            start: Mutex::new(Instant::now()),
        }
    }

    /// Records one received packet of `bytes` bytes and stamps the
    /// last-packet time.
    pub fn record_packet(&self, bytes: usize) {
        self.packets_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes as u64, Ordering::Relaxed);
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);
        self.last_packet_unix_ms.store(now_ms, Ordering::Relaxed);
    }

    /// Increments the processed-packets counter.
    pub fn incr_packets_processed(&self) {
        self.packets_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the encrypted-packets counter.
    pub fn incr_packets_encrypted(&self) {
        self.packets_encrypted.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the CRC-enabled packets counter.
    pub fn incr_packets_with_crc(&self) {
        self.packets_with_crc.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the malformed-packets counter.
    pub fn incr_packets_malformed(&self) {
        self.packets_malformed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the fragments-received counter.
    pub fn incr_fragments_received(&self) {
        self.fragments_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the fragments-completed counter.
    pub fn incr_fragments_completed(&self) {
        self.fragments_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds `n` to the fragments-expired counter.
    pub fn add_fragments_expired(&self, n: u64) {
        self.fragments_expired.fetch_add(n, Ordering::Relaxed);
    }

    /// Increments the events-decoded counter.
    pub fn incr_events_decoded(&self) {
        self.events_decoded.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the requests-decoded counter.
    pub fn incr_requests_decoded(&self) {
        self.requests_decoded.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the responses-decoded counter.
    pub fn incr_responses_decoded(&self) {
        self.responses_decoded.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the events-dropped counter (sink backpressure).
    pub fn incr_events_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Packets received so far.
    #[must_use]
    pub fn packets_received(&self) -> u64 {
        self.packets_received.load(Ordering::Relaxed)
    }

    /// Packets fully processed so far.
    #[must_use]
    pub fn packets_processed(&self) -> u64 {
        self.packets_processed.load(Ordering::Relaxed)
    }

    /// Encrypted packets skipped so far.
    #[must_use]
    pub fn packets_encrypted(&self) -> u64 {
        self.packets_encrypted.load(Ordering::Relaxed)
    }

    /// CRC-enabled packets seen so far.
    #[must_use]
    pub fn packets_with_crc(&self) -> u64 {
        self.packets_with_crc.load(Ordering::Relaxed)
    }

    /// Malformed packets dropped so far.
    #[must_use]
    pub fn packets_malformed(&self) -> u64 {
        self.packets_malformed.load(Ordering::Relaxed)
    }

    /// Individual fragments received so far.
    #[must_use]
    pub fn fragments_received(&self) -> u64 {
        self.fragments_received.load(Ordering::Relaxed)
    }

    /// Fragmented payloads fully reassembled so far.
    #[must_use]
    pub fn fragments_completed(&self) -> u64 {
        self.fragments_completed.load(Ordering::Relaxed)
    }

    /// Fragment entries evicted by TTL so far.
    #[must_use]
    pub fn fragments_expired(&self) -> u64 {
        self.fragments_expired.load(Ordering::Relaxed)
    }

    /// Game events decoded so far.
    #[must_use]
    pub fn events_decoded(&self) -> u64 {
        self.events_decoded.load(Ordering::Relaxed)
    }

    /// Operation requests decoded so far.
    #[must_use]
    pub fn requests_decoded(&self) -> u64 {
        self.requests_decoded.load(Ordering::Relaxed)
    }

    /// Operation responses decoded so far.
    #[must_use]
    pub fn responses_decoded(&self) -> u64 {
        self.responses_decoded.load(Ordering::Relaxed)
    }

    /// Events dropped on sink backpressure so far.
    #[must_use]
    pub fn events_dropped(&self) -> u64 {
        self.events_dropped.load(Ordering::Relaxed)
    }

    /// Total payload bytes received so far.
    #[must_use]
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received.load(Ordering::Relaxed)
    }

    /// Elapsed time since the last packet, or `None` before the first one.
    #[must_use]
    pub fn since_last_packet(&self) -> Option<Duration> {
        let last_ms = self.last_packet_unix_ms.load(Ordering::Relaxed);
        if last_ms == 0 {
            return None;
        }
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);
        Some(Duration::from_millis(now_ms.saturating_sub(last_ms)))
    }

    /// How long this instance has been collecting.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.start.lock().map_or(Duration::ZERO, |s| s.elapsed())
    }

    /// Packet rate over the whole uptime, 0 when uptime is 0.
    #[must_use]
    pub fn packets_per_second(&self) -> f64 {
        let secs = self.uptime().as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.packets_received() as f64 / secs
        }
    }

    /// Event rate over the whole uptime, 0 when uptime is 0.
    #[must_use]
    pub fn events_per_second(&self) -> f64 {
        let secs = self.uptime().as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.events_decoded() as f64 / secs
        }
    }

    /// Uptime formatted as `HH:MM:SS`.
    #[must_use]
    pub fn format_uptime(&self) -> String {
        let total = self.uptime().as_secs();
        format!(
            "{:02}:{:02}:{:02}",
            total / 3600,
            (total / 60) % 60,
            total % 60
        )
    }

    /// One-line formatted summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Uptime: {} | Packets: {} ({:.1}/s) | Events: {} | Encrypted: {} | CRC: {}",
            self.format_uptime(),
            self.packets_received(),
            self.packets_per_second(),
            self.events_decoded(),
            self.packets_encrypted(),
            self.packets_with_crc(),
        )
    }

    /// Zeroes all counters and restamps the start time.
    pub fn reset(&self) {
        self.packets_received.store(0, Ordering::Relaxed);
        self.packets_processed.store(0, Ordering::Relaxed);
        self.packets_encrypted.store(0, Ordering::Relaxed);
        self.packets_with_crc.store(0, Ordering::Relaxed);
        self.packets_malformed.store(0, Ordering::Relaxed);
        self.fragments_received.store(0, Ordering::Relaxed);
        self.fragments_completed.store(0, Ordering::Relaxed);
        self.fragments_expired.store(0, Ordering::Relaxed);
        self.events_decoded.store(0, Ordering::Relaxed);
        self.requests_decoded.store(0, Ordering::Relaxed);
        self.responses_decoded.store(0, Ordering::Relaxed);
        self.events_dropped.store(0, Ordering::Relaxed);
        self.bytes_received.store(0, Ordering::Relaxed);
        self.last_packet_unix_ms.store(0, Ordering::Relaxed);
        if let Ok(mut start) = self.start.lock() {
            *start = Instant::now();
        }
    }

    /// Captures a consistent-enough copy for external consumers.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            packets_received: self.packets_received(),
            packets_processed: self.packets_processed(),
            packets_encrypted: self.packets_encrypted(),
            packets_with_crc: self.packets_with_crc(),
            packets_malformed: self.packets_malformed(),
            fragments_received: self.fragments_received(),
            fragments_completed: self.fragments_completed(),
            fragments_expired: self.fragments_expired(),
            events_decoded: self.events_decoded(),
            requests_decoded: self.requests_decoded(),
            responses_decoded: self.responses_decoded(),
            events_dropped: self.events_dropped(),
            bytes_received: self.bytes_received(),
            uptime_secs: self.uptime().as_secs(),
            packets_per_second: self.packets_per_second(),
        }
    }
}

/// A plain copy of the counters for read-only consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub packets_received: u64,
    pub packets_processed: u64,
    pub packets_encrypted: u64,
    pub packets_with_crc: u64,
    pub packets_malformed: u64,
    pub fragments_received: u64,
    pub fragments_completed: u64,
    pub fragments_expired: u64,
    pub events_decoded: u64,
    pub requests_decoded: u64,
    pub responses_decoded: u64,
    pub events_dropped: u64,
    pub bytes_received: u64,
    pub uptime_secs: u64,
    pub packets_per_second: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stats_all_zero() {
        let stats = Stats::new();
        assert_eq!(stats.packets_received(), 0);
        assert_eq!(stats.bytes_received(), 0);
        assert_eq!(stats.events_decoded(), 0);
        assert!(stats.since_last_packet().is_none());
    }

    #[test]
    fn record_packet_updates_counters() {
        let stats = Stats::new();
        stats.record_packet(100);
        stats.record_packet(50);
        assert_eq!(stats.packets_received(), 2);
        assert_eq!(stats.bytes_received(), 150);
        assert!(stats.since_last_packet().is_some());
    }

    #[test]
    fn incrementers_accumulate() {
        let stats = Stats::new();
        stats.incr_packets_processed();
        stats.incr_packets_encrypted();
        stats.incr_packets_with_crc();
        stats.incr_packets_malformed();
        stats.incr_fragments_received();
        stats.incr_fragments_completed();
        stats.add_fragments_expired(3);
        stats.incr_events_decoded();
        stats.incr_requests_decoded();
        stats.incr_responses_decoded();
        stats.incr_events_dropped();

        assert_eq!(stats.packets_processed(), 1);
        assert_eq!(stats.packets_encrypted(), 1);
        assert_eq!(stats.packets_with_crc(), 1);
        assert_eq!(stats.packets_malformed(), 1);
        assert_eq!(stats.fragments_received(), 1);
        assert_eq!(stats.fragments_completed(), 1);
        assert_eq!(stats.fragments_expired(), 3);
        assert_eq!(stats.events_decoded(), 1);
        assert_eq!(stats.requests_decoded(), 1);
        assert_eq!(stats.responses_decoded(), 1);
        assert_eq!(stats.events_dropped(), 1);
    }

    #[test]
    fn reset_zeroes_everything() {
        let stats = Stats::new();
        stats.record_packet(10);
        stats.incr_events_decoded();
        stats.reset();
        assert_eq!(stats.packets_received(), 0);
        assert_eq!(stats.bytes_received(), 0);
        assert_eq!(stats.events_decoded(), 0);
        assert!(stats.since_last_packet().is_none());
    }

    #[test]
    fn summary_shape() {
        let stats = Stats::new();
        stats.record_packet(10);
        let summary = stats.summary();
        assert!(summary.starts_with("Uptime: "));
        assert!(summary.contains("| Packets: 1 ("));
        assert!(summary.contains("| Events: 0 |"));
        assert!(summary.contains("Encrypted: 0"));
        assert!(summary.contains("CRC: 0"));
    }

    #[test]
    fn format_uptime_is_hh_mm_ss() {
        let stats = Stats::new();
        let formatted = stats.format_uptime();
        assert_eq!(formatted.len(), 8);
        assert_eq!(formatted.matches(':').count(), 2);
    }

    #[test]
    fn snapshot_copies_counters() {
        let stats = Stats::new();
        stats.record_packet(42);
        stats.incr_events_decoded();
        let snap = stats.snapshot();
        assert_eq!(snap.packets_received, 1);
        assert_eq!(snap.bytes_received, 42);
        assert_eq!(snap.events_decoded, 1);
        // Snapshot is detached from later updates.
        stats.record_packet(1);
        assert_eq!(snap.packets_received, 1);
    }

    #[test]
    fn concurrent_increments() {
        use std::sync::Arc;

        let stats = Arc::new(Stats::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let stats = Arc::clone(&stats);
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    stats.record_packet(1);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(stats.packets_received(), 4000);
        assert_eq!(stats.bytes_received(), 4000);
    }
}
