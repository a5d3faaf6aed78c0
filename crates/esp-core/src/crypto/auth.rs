//! Integrity protection for ESP packets
//!
//! Implements the HMAC-SHA256 ICV (Integrity Check Value) and the
//! constant-time comparison used to verify it.

use crate::{Error, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// ICV length in bytes (full HMAC-SHA256 output, not truncated)
pub const ICV_LEN: usize = 32;

/// Integrity algorithm for the ESP ICV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityAlgorithm {
    /// HMAC with SHA-256, full 32-byte tag
    HmacSha256,
}

impl IntegrityAlgorithm {
    /// Get ICV output length in bytes
    pub fn icv_len(self) -> usize {
        match self {
            IntegrityAlgorithm::HmacSha256 => ICV_LEN,
        }
    }

    /// Compute the ICV over `data`
    pub fn compute(self, key: &[u8], data: &[u8]) -> [u8; ICV_LEN] {
        match self {
            IntegrityAlgorithm::HmacSha256 => {
                let mut mac =
                    Hmac::<Sha256>::new_from_slice(key).expect("HMAC can take key of any size");
                mac.update(data);
                mac.finalize().into_bytes().into()
            }
        }
    }

    /// Verify a received ICV against `data` in constant time
    pub fn verify(self, key: &[u8], data: &[u8], icv: &[u8]) -> Result<()> {
        let computed = self.compute(key, data);
        if constant_time_eq(&computed, icv) {
            Ok(())
        } else {
            Err(Error::AuthenticationFailed)
        }
    }
}

/// Compare two byte slices in time independent of where they first differ
///
/// Slices of unequal length compare unequal; the length itself is not
/// secret (ICV lengths are fixed by the suite).
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
