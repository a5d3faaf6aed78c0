//! Block cipher for the ESP payload
//!
//! Implements AES-128-CBC with PKCS#7 padding. Padding is always added,
//! even for block-aligned input, so ciphertext length is the plaintext
//! length rounded up to the next block boundary (a full extra block when
//! already aligned).

use crate::{Error, Result};
use aes::Aes128;
use cbc::{Decryptor, Encryptor};
use cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

type Aes128CbcEnc = Encryptor<Aes128>;
type Aes128CbcDec = Decryptor<Aes128>;

/// Cipher algorithm for ESP payload encryption
///
/// Only AES-128-CBC is supported; the suite is fixed per SA rather than
/// negotiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherAlgorithm {
    /// AES with 128-bit key in CBC mode, PKCS#7 padding
    Aes128Cbc,
}

impl CipherAlgorithm {
    /// Get key length in bytes
    pub fn key_len(self) -> usize {
        match self {
            CipherAlgorithm::Aes128Cbc => 16,
        }
    }

    /// Get IV length in bytes
    pub fn iv_len(self) -> usize {
        match self {
            CipherAlgorithm::Aes128Cbc => 16,
        }
    }

    /// Get cipher block length in bytes
    pub fn block_len(self) -> usize {
        match self {
            CipherAlgorithm::Aes128Cbc => 16,
        }
    }

    /// Encrypt plaintext
    ///
    /// Applies PKCS#7 padding (pad length in `1..=16`, every pad byte
    /// equal to the pad length), then encrypts in CBC mode.
    ///
    /// # Arguments
    ///
    /// * `key` - Encryption key (16 bytes)
    /// * `iv` - Initialization vector (16 bytes)
    /// * `plaintext` - Data to encrypt (may be empty)
    ///
    /// # Errors
    ///
    /// - `InvalidKeyLength` / `InvalidIvLength` on wrong-sized inputs
    pub fn encrypt(self, key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        self.check_lengths(key, iv)?;

        let enc = Aes128CbcEnc::new_from_slices(key, iv)
            .map_err(|_| Error::Internal("AES-CBC encryptor construction failed".into()))?;

        Ok(enc.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
    }

    /// Decrypt ciphertext
    ///
    /// Decrypts in CBC mode, then strips PKCS#7 padding.
    ///
    /// # Arguments
    ///
    /// * `key` - Encryption key (16 bytes)
    /// * `iv` - Initialization vector (16 bytes)
    /// * `ciphertext` - Data to decrypt (positive multiple of 16 bytes)
    ///
    /// # Errors
    ///
    /// - `InvalidKeyLength` / `InvalidIvLength` on wrong-sized inputs
    /// - `MalformedPacket` if the ciphertext is empty or not block-aligned
    /// - `InvalidPadding` if the final byte is not in `1..=16` or the
    ///   padding bytes disagree with it
    ///
    /// In the ESP path this runs only after the ICV has verified, so a
    /// padding failure is not observable by an attacker as a distinct
    /// signal; callers on that path remap it to an opaque error.
    pub fn decrypt(self, key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.check_lengths(key, iv)?;

        if ciphertext.is_empty() || ciphertext.len() % self.block_len() != 0 {
            return Err(Error::MalformedPacket(format!(
                "ciphertext length {} is not a positive multiple of {}",
                ciphertext.len(),
                self.block_len()
            )));
        }

        let dec = Aes128CbcDec::new_from_slices(key, iv)
            .map_err(|_| Error::Internal("AES-CBC decryptor construction failed".into()))?;

        dec.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| Error::InvalidPadding)
    }

    fn check_lengths(self, key: &[u8], iv: &[u8]) -> Result<()> {
        if key.len() != self.key_len() {
            return Err(Error::InvalidKeyLength {
                expected: self.key_len(),
                actual: key.len(),
            });
        }
        if iv.len() != self.iv_len() {
            return Err(Error::InvalidIvLength {
                expected: self.iv_len(),
                actual: iv.len(),
            });
        }
        Ok(())
    }
}
