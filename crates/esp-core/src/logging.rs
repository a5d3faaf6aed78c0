//! Structured logging for ESP operations
//!
//! Provides structured, contextual logging using the `tracing` framework.
//! All log messages include relevant context fields for debugging and
//! monitoring. Key material is never logged; drops on the receive path
//! log the error class only, matching the detail-free errors returned to
//! callers.
//!
//! # Log Levels
//!
//! - **DEBUG**: per-packet processing, sequence numbers
//! - **INFO**: SA lifecycle events
//! - **WARN**: dropped packets (malformed, replayed)
//! - **ERROR**: authentication failures, anomalies
//!
//! # Example
//!
//! ```no_run
//! use esp_core::logging;
//!
//! // Initialize tracing subscriber (in tests or applications)
//! tracing_subscriber::fmt()
//!     .with_env_filter("esp_core=debug")
//!     .init();
//!
//! logging::log_sa_provisioned(0x1001, "transport", 64);
//! ```

use tracing::{debug, error, info, warn};

/// Log provisioning of a new SA
pub fn log_sa_provisioned(spi: u32, mode: &str, replay_window_size: u32) {
    info!(
        spi = spi,
        mode = mode,
        replay_window_size = replay_window_size,
        "SA provisioned"
    );
}

/// Log teardown of an SA
pub fn log_sa_revoked(spi: u32) {
    info!(spi = spi, "SA revoked");
}

/// Log a successfully processed packet
///
/// # Arguments
///
/// * `operation` - "encapsulate" or "decapsulate"
/// * `spi` - Security Parameters Index
/// * `seq` - Sequence number
/// * `payload_len` - Plaintext payload length in bytes
pub fn log_esp_packet(operation: &str, spi: u32, seq: u32, payload_len: usize) {
    debug!(
        operation = operation,
        spi = spi,
        seq_num = seq,
        payload_len = payload_len,
        "ESP packet processed"
    );
}

/// Log a packet dropped for a framing violation
pub fn log_malformed_packet(packet_len: usize) {
    warn!(packet_len = packet_len, "Malformed ESP packet rejected");
}

/// Log a packet dropped for ICV mismatch
pub fn log_authentication_failed(spi: u32) {
    error!(spi = spi, "ESP authentication failed - packet rejected");
}

/// Log a packet dropped by the anti-replay window
pub fn log_replay_detected(spi: u32, seq: u64) {
    warn!(
        spi = spi,
        seq_num = seq,
        "Replay attack detected - packet rejected"
    );
}

/// Log an authenticated packet whose plaintext failed to recover
///
/// This should never happen between well-behaved peers; it indicates a
/// key mismatch or an implementation bug, not an attacker (an attacker
/// cannot get past the ICV).
pub fn log_corrupt_plaintext(spi: u32, seq: u32) {
    error!(
        spi = spi,
        seq_num = seq,
        "Authenticated ESP packet failed plaintext recovery"
    );
}

/// Log outbound sequence-number exhaustion
pub fn log_sequence_exhausted(spi: u32) {
    error!(
        spi = spi,
        "Outbound sequence numbers exhausted - SA must be rekeyed"
    );
}
