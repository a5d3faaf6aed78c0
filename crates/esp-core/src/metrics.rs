//! Engine metrics
//!
//! Lock-free counters shared across whatever threads drive the engine.
//! Cloning [`EspMetrics`] clones handles to the same counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for ESP engine activity
#[derive(Debug, Clone, Default)]
pub struct EspMetrics {
    packets_encapsulated: Arc<AtomicU64>,
    packets_decapsulated: Arc<AtomicU64>,
    bytes_encapsulated: Arc<AtomicU64>,
    bytes_decapsulated: Arc<AtomicU64>,
    authentication_failures: Arc<AtomicU64>,
    replays_detected: Arc<AtomicU64>,
    malformed_packets: Arc<AtomicU64>,
    corrupt_plaintexts: Arc<AtomicU64>,
    sas_provisioned: Arc<AtomicU64>,
    sas_revoked: Arc<AtomicU64>,
}

/// Point-in-time copy of all counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Packets successfully encapsulated
    pub packets_encapsulated: u64,
    /// Packets successfully decapsulated
    pub packets_decapsulated: u64,
    /// Plaintext bytes encapsulated
    pub bytes_encapsulated: u64,
    /// Plaintext bytes recovered by decapsulation
    pub bytes_decapsulated: u64,
    /// Packets dropped for ICV mismatch
    pub authentication_failures: u64,
    /// Packets dropped by the anti-replay window
    pub replays_detected: u64,
    /// Packets dropped for framing violations
    pub malformed_packets: u64,
    /// Authenticated packets whose plaintext failed to recover
    pub corrupt_plaintexts: u64,
    /// SAs provisioned over the engine's lifetime
    pub sas_provisioned: u64,
    /// SAs revoked over the engine's lifetime
    pub sas_revoked: u64,
}

impl EspMetrics {
    /// Create a fresh set of counters
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_encapsulated(&self, payload_len: usize) {
        self.packets_encapsulated.fetch_add(1, Ordering::Relaxed);
        self.bytes_encapsulated
            .fetch_add(payload_len as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_decapsulated(&self, payload_len: usize) {
        self.packets_decapsulated.fetch_add(1, Ordering::Relaxed);
        self.bytes_decapsulated
            .fetch_add(payload_len as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_authentication_failure(&self) {
        self.authentication_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_replay_detected(&self) {
        self.replays_detected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_malformed_packet(&self) {
        self.malformed_packets.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_corrupt_plaintext(&self) {
        self.corrupt_plaintexts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sa_provisioned(&self) {
        self.sas_provisioned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sa_revoked(&self) {
        self.sas_revoked.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy all counters at once
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            packets_encapsulated: self.packets_encapsulated.load(Ordering::Relaxed),
            packets_decapsulated: self.packets_decapsulated.load(Ordering::Relaxed),
            bytes_encapsulated: self.bytes_encapsulated.load(Ordering::Relaxed),
            bytes_decapsulated: self.bytes_decapsulated.load(Ordering::Relaxed),
            authentication_failures: self.authentication_failures.load(Ordering::Relaxed),
            replays_detected: self.replays_detected.load(Ordering::Relaxed),
            malformed_packets: self.malformed_packets.load(Ordering::Relaxed),
            corrupt_plaintexts: self.corrupt_plaintexts.load(Ordering::Relaxed),
            sas_provisioned: self.sas_provisioned.load(Ordering::Relaxed),
            sas_revoked: self.sas_revoked.load(Ordering::Relaxed),
        }
    }
}
