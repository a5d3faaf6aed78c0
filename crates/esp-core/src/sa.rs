//! Security Association state
//!
//! A [`SecurityAssociation`] holds everything one protected direction of
//! traffic needs: the SPI that identifies it on the wire, the fixed
//! cipher-suite keys, the sender-side sequence counter, and the
//! receive-side anti-replay window. Key derivation is out of scope; keys
//! arrive fully formed at provisioning time and are zeroized on drop.

use crate::replay::ReplayWindow;
use crate::{Error, Result};
use zeroize::Zeroize;

/// Encryption key length in bytes (AES-128)
pub const ENCRYPTION_KEY_LEN: usize = 16;

/// Authentication key length in bytes (HMAC-SHA256)
pub const AUTH_KEY_LEN: usize = 32;

/// ESP processing mode
///
/// The codec itself is payload-agnostic; the mode records what the
/// protected bytes conceptually are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaMode {
    /// The entire inner IP datagram is protected
    Tunnel,
    /// Only the upper-layer payload is protected
    Transport,
}

impl SaMode {
    /// Short name for log fields
    pub fn as_str(self) -> &'static str {
        match self {
            SaMode::Tunnel => "tunnel",
            SaMode::Transport => "transport",
        }
    }
}

/// Security Association
///
/// Owned exclusively by the [`crate::SaStore`]; the engine borrows a
/// record under its per-SPI lock for the duration of one operation.
///
/// The outbound sequence counter and the inbound replay window are
/// independent sequence spaces: `seq_out` counts what *we* send, the
/// window tracks what the peer sent us.
#[derive(Debug, Clone)]
pub struct SecurityAssociation {
    /// Security Parameters Index; unique key in the store, never 0
    pub spi: u32,

    /// Tunnel or transport mode
    pub mode: SaMode,

    /// AES-128-CBC encryption key
    pub encryption_key: [u8; ENCRYPTION_KEY_LEN],

    /// HMAC-SHA256 authentication key
    pub auth_key: [u8; AUTH_KEY_LEN],

    /// Outbound sequence counter (last allocated; 0 = nothing sent)
    ///
    /// Held as u64 so the wraparound check is a plain comparison.
    pub seq_out: u64,

    /// Inbound anti-replay window
    pub replay: ReplayWindow,
}

impl SecurityAssociation {
    /// Create a new SA with a replay window of the given width
    pub fn new(
        spi: u32,
        mode: SaMode,
        encryption_key: [u8; ENCRYPTION_KEY_LEN],
        auth_key: [u8; AUTH_KEY_LEN],
        replay_window_size: u32,
    ) -> Self {
        SecurityAssociation {
            spi,
            mode,
            encryption_key,
            auth_key,
            seq_out: 0,
            replay: ReplayWindow::new(replay_window_size),
        }
    }

    /// Allocate the next outbound sequence number
    ///
    /// Sequence numbers are 32 bits on the wire and start at 1 (0 is
    /// reserved). Once the counter would wrap, the SA is unusable for
    /// sending and must be rekeyed by the outer system.
    pub fn next_sequence_number(&mut self) -> Result<u32> {
        if self.seq_out >= u64::from(u32::MAX) {
            return Err(Error::SequenceExhausted(self.spi));
        }

        self.seq_out += 1;
        Ok(self.seq_out as u32)
    }
}

impl Drop for SecurityAssociation {
    fn drop(&mut self) {
        self.encryption_key.zeroize();
        self.auth_key.zeroize();
    }
}
