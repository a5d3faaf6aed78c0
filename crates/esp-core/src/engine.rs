//! ESP engine
//!
//! Ties the SA store, the packet codec, and the anti-replay window into
//! the two operations callers actually use: [`EspEngine::encapsulate`]
//! and [`EspEngine::decapsulate`].
//!
//! Receive-path ordering is fixed and security-relevant:
//!
//! 1. SA lookup by the caller-named SPI
//! 2. structural parse (no keyed work)
//! 3. ICV verification (constant time)
//! 4. decryption
//! 5. anti-replay check
//!
//! The replay window is only updated by packets that authenticated, so
//! forged traffic can never advance or poison it.

use crate::config::EngineConfig;
use crate::esp::EspPacket;
use crate::logging;
use crate::metrics::EspMetrics;
use crate::sa::{SaMode, SecurityAssociation, AUTH_KEY_LEN, ENCRYPTION_KEY_LEN};
use crate::store::SaStore;
use crate::{Error, Result};

/// ESP encapsulation/decapsulation engine
///
/// Thread safe: all methods take `&self`. Operations on different SPIs
/// run in parallel; operations on the same SPI serialize on that SA's
/// record lock, which is what keeps sequence allocation and replay
/// tracking consistent.
#[derive(Debug, Default)]
pub struct EspEngine {
    store: SaStore,
    metrics: EspMetrics,
    config: EngineConfig,
}

impl EspEngine {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with an explicit configuration
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if the configuration fails validation
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(EspEngine {
            store: SaStore::new(),
            metrics: EspMetrics::new(),
            config,
        })
    }

    /// Provision a new SA
    ///
    /// Keys arrive fully formed; no derivation happens here.
    ///
    /// # Errors
    ///
    /// - `InvalidSpi` for SPI 0
    /// - `DuplicateSpi` if the SPI is already provisioned
    pub fn provision_sa(
        &self,
        spi: u32,
        mode: SaMode,
        encryption_key: [u8; ENCRYPTION_KEY_LEN],
        auth_key: [u8; AUTH_KEY_LEN],
    ) -> Result<()> {
        let sa = SecurityAssociation::new(
            spi,
            mode,
            encryption_key,
            auth_key,
            self.config.replay_window_size,
        );
        self.store.insert(sa)?;

        self.metrics.record_sa_provisioned();
        logging::log_sa_provisioned(spi, mode.as_str(), self.config.replay_window_size);
        Ok(())
    }

    /// Tear down an SA
    ///
    /// # Errors
    ///
    /// - `UnknownSpi` if no SA exists for this SPI
    pub fn revoke_sa(&self, spi: u32) -> Result<()> {
        self.store.remove(spi)?;

        self.metrics.record_sa_revoked();
        logging::log_sa_revoked(spi);
        Ok(())
    }

    /// Protect a plaintext payload under the SA for `spi`
    ///
    /// Allocates the next outbound sequence number and returns the full
    /// wire-format packet.
    ///
    /// # Errors
    ///
    /// - `UnknownSpi` if no SA exists for this SPI
    /// - `SequenceExhausted` once the outbound counter reaches its limit
    pub fn encapsulate(&self, spi: u32, plaintext: &[u8]) -> Result<Vec<u8>> {
        let record = self.store.lookup(spi)?;
        let mut sa = record
            .lock()
            .map_err(|_| Error::Internal("SA record lock poisoned".into()))?;

        let sequence = match sa.next_sequence_number() {
            Ok(sequence) => sequence,
            Err(e) => {
                logging::log_sequence_exhausted(spi);
                return Err(e);
            }
        };

        let packet = EspPacket::encode(&sa, sequence, plaintext)?;
        let bytes = packet.to_bytes();

        self.metrics.record_encapsulated(plaintext.len());
        logging::log_esp_packet("encapsulate", spi, sequence, plaintext.len());
        Ok(bytes)
    }

    /// Authenticate, decrypt, and replay-check a received packet
    ///
    /// The caller names the SA; a packet whose own SPI field disagrees
    /// with it fails authentication like any other tampered header byte.
    ///
    /// # Errors
    ///
    /// - `UnknownSpi` if no SA exists for this SPI
    /// - `MalformedPacket` for framing violations (checked before any
    ///   keyed work)
    /// - `AuthenticationFailed` on ICV mismatch
    /// - `CorruptPlaintext` if an authenticated packet fails decryption
    /// - `ReplayDetected` / `InvalidSequence` from the anti-replay window
    pub fn decapsulate(&self, spi: u32, data: &[u8]) -> Result<Vec<u8>> {
        let record = self.store.lookup(spi)?;
        let mut sa = record
            .lock()
            .map_err(|_| Error::Internal("SA record lock poisoned".into()))?;

        let packet = match EspPacket::from_bytes(data) {
            Ok(packet) => packet,
            Err(e) => {
                self.metrics.record_malformed_packet();
                logging::log_malformed_packet(data.len());
                return Err(e);
            }
        };

        let plaintext = match packet.open(&sa) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                match e {
                    Error::AuthenticationFailed => {
                        self.metrics.record_authentication_failure();
                        logging::log_authentication_failed(spi);
                    }
                    Error::CorruptPlaintext => {
                        self.metrics.record_corrupt_plaintext();
                        logging::log_corrupt_plaintext(spi, packet.sequence);
                    }
                    _ => {}
                }
                return Err(e);
            }
        };

        if let Err(e) = sa.replay.check_and_update(u64::from(packet.sequence)) {
            if matches!(e, Error::ReplayDetected(_)) {
                self.metrics.record_replay_detected();
                logging::log_replay_detected(spi, u64::from(packet.sequence));
            }
            return Err(e);
        }

        self.metrics.record_decapsulated(plaintext.len());
        logging::log_esp_packet("decapsulate", spi, packet.sequence, plaintext.len());
        Ok(plaintext)
    }

    /// Handle to the engine's metrics counters
    pub fn metrics(&self) -> &EspMetrics {
        &self.metrics
    }

    /// The engine's configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of currently provisioned SAs
    pub fn sa_count(&self) -> usize {
        self.store.len()
    }
}
