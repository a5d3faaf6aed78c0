//! Error types for ESP operations
//!
//! This module defines a unified error type for all operations in this
//! crate: the SA store, the ESP codec, the anti-replay window, and the
//! engine.

use std::fmt;

/// Result type for ESP operations
pub type Result<T> = std::result::Result<T, Error>;

/// ESP processing errors
///
/// All failures are per-packet (or per-administrative-call); nothing here
/// is fatal to the process. Callers that forward packets should treat
/// [`Error::MalformedPacket`] and [`Error::AuthenticationFailed`]
/// identically (drop the packet) so that neither check becomes an oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No Security Association exists for this SPI
    UnknownSpi(u32),

    /// A Security Association with this SPI already exists
    DuplicateSpi(u32),

    /// SPI value is reserved and cannot be provisioned (SPI 0)
    InvalidSpi(u32),

    /// Packet violates ESP framing (size or alignment)
    MalformedPacket(String),

    /// ICV verification failed
    ///
    /// Deliberately carries no detail: nothing about *where* the
    /// verification failed may leak to the peer.
    AuthenticationFailed,

    /// Replay attack detected (duplicate or too-old sequence number)
    ReplayDetected(u64),

    /// Invalid sequence number (ESP reserves sequence 0)
    InvalidSequence(u64),

    /// The 32-bit sequence counter would wrap; the SA must be rekeyed
    SequenceExhausted(u32),

    /// Padding was invalid after the ICV verified
    ///
    /// This should never happen for an authentic packet. It is surfaced
    /// without detail and logged as an internal anomaly.
    CorruptPlaintext,

    /// PKCS#7 padding is inconsistent (pre-authentication decrypt path)
    InvalidPadding,

    /// Key length does not match the cipher suite
    InvalidKeyLength {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// IV length does not match the cipher suite
    InvalidIvLength {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Invalid configuration or argument
    InvalidParameter(String),

    /// Internal error (should not happen)
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownSpi(spi) => write!(f, "Unknown SPI: 0x{:08x}", spi),
            Error::DuplicateSpi(spi) => write!(f, "Duplicate SPI: 0x{:08x}", spi),
            Error::InvalidSpi(spi) => write!(f, "Invalid SPI: 0x{:08x}", spi),
            Error::MalformedPacket(msg) => write!(f, "Malformed ESP packet: {}", msg),
            Error::AuthenticationFailed => write!(f, "Authentication failed"),
            Error::ReplayDetected(seq) => {
                write!(f, "Replay detected (sequence: {})", seq)
            }
            Error::InvalidSequence(seq) => write!(f, "Invalid sequence number: {}", seq),
            Error::SequenceExhausted(spi) => {
                write!(f, "Sequence counter exhausted for SPI 0x{:08x}", spi)
            }
            Error::CorruptPlaintext => write!(f, "Packet processing failed"),
            Error::InvalidPadding => write!(f, "Invalid padding"),
            Error::InvalidKeyLength { expected, actual } => {
                write!(f, "Invalid key length: expected {}, got {}", expected, actual)
            }
            Error::InvalidIvLength { expected, actual } => {
                write!(f, "Invalid IV length: expected {}, got {}", expected, actual)
            }
            Error::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
