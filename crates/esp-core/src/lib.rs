//! ESP packet protection engine
//!
//! An encrypt-then-MAC implementation of the ESP (Encapsulating Security
//! Payload) data plane: AES-128-CBC for confidentiality, HMAC-SHA256 for
//! integrity, Security Associations keyed by SPI, and RFC 4303-style
//! sliding-window anti-replay protection.
//!
//! Wire format:
//!
//! ```text
//! +---------------+---------------+----------------+
//! |   SPI (4)     |   Seq (4)     |    IV (16)     |
//! +---------------+---------------+----------------+
//! |        Ciphertext (16 * n, n >= 1)             |
//! +------------------------------------------------+
//! |        ICV = HMAC-SHA256 (32)                  |
//! +------------------------------------------------+
//! ```
//!
//! Key exchange, key derivation, and rekeying are out of scope; keys are
//! provisioned fully formed and the engine refuses to send once an SA's
//! sequence numbers run out.
//!
//! # Example
//!
//! ```
//! use esp_core::{EspEngine, SaMode};
//!
//! let engine = EspEngine::new();
//! engine.provision_sa(1001, SaMode::Transport, [0u8; 16], [0u8; 32])?;
//!
//! let packet = engine.encapsulate(1001, b"HELLO")?;
//! assert_eq!(packet.len(), 72);
//!
//! let plaintext = engine.decapsulate(1001, &packet)?;
//! assert_eq!(plaintext, b"HELLO");
//! # Ok::<(), esp_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod config;
pub mod crypto;
pub mod engine;
pub mod error;
pub mod esp;
pub mod logging;
pub mod metrics;
pub mod replay;
pub mod sa;
pub mod store;

pub use config::EngineConfig;
pub use engine::EspEngine;
pub use error::{Error, Result};
pub use esp::EspPacket;
pub use metrics::{EspMetrics, MetricsSnapshot};
pub use replay::ReplayWindow;
pub use sa::{SaMode, SecurityAssociation};
pub use store::SaStore;
