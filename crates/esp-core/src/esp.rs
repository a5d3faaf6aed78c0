//! ESP packet codec
//!
//! Serializes and deserializes the ESP wire format used by this engine,
//! an encrypt-then-MAC framing in the shape of RFC 4303:
//!
//! ```text
//! offset  size  field
//! 0       4     SPI (u32, big-endian)
//! 4       4     Sequence Number (u32, big-endian)
//! 8       16    IV
//! 24      N     Ciphertext (N % 16 == 0, N > 0)
//! 24+N    32    ICV = HMAC-SHA256(auth_key, SPI ‖ Seq ‖ IV ‖ Ciphertext)
//! ```
//!
//! The minimum valid packet is 72 bytes: header (8) + IV (16) + one
//! cipher block (16) + ICV (32).
//!
//! Decoding verifies the ICV in constant time *before* any decryption is
//! attempted; a CBC padding failure can therefore only occur after the
//! packet has already authenticated, and is surfaced as the opaque
//! [`Error::CorruptPlaintext`] rather than a padding oracle.
//!
//! The codec never allocates sequence numbers. The caller supplies them
//! so that all sequence bookkeeping (allocation and replay tracking)
//! lives in one place, the engine.

use crate::crypto::{CipherAlgorithm, IntegrityAlgorithm};
use crate::sa::SecurityAssociation;
use crate::{Error, Result};
use rand::RngCore;

/// ESP header length in bytes (SPI + sequence number)
pub const ESP_HEADER_LEN: usize = 8;

/// IV length in bytes (AES-CBC block size)
pub const ESP_IV_LEN: usize = 16;

/// ICV length in bytes (full HMAC-SHA256 output)
pub const ESP_ICV_LEN: usize = 32;

/// Cipher block length in bytes
pub const ESP_BLOCK_LEN: usize = 16;

/// Minimum total packet length in bytes
pub const ESP_MIN_PACKET_LEN: usize = ESP_HEADER_LEN + ESP_IV_LEN + ESP_BLOCK_LEN + ESP_ICV_LEN;

/// A parsed ESP packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EspPacket {
    /// Security Parameters Index
    pub spi: u32,

    /// Sequence number (caller-allocated, never 0 for real traffic)
    pub sequence: u32,

    /// Initialization vector
    pub iv: [u8; ESP_IV_LEN],

    /// Encrypted payload; always a positive multiple of the block size
    pub ciphertext: Vec<u8>,

    /// Integrity Check Value over header ‖ IV ‖ ciphertext
    pub icv: [u8; ESP_ICV_LEN],
}

impl EspPacket {
    /// Build a packet from plaintext under the given SA
    ///
    /// Generates a fresh random IV, encrypts, and computes the ICV with
    /// the SA's authentication key. `sequence` is supplied by the caller.
    pub fn encode(
        sa: &SecurityAssociation,
        sequence: u32,
        plaintext: &[u8],
    ) -> Result<Self> {
        let mut iv = [0u8; ESP_IV_LEN];
        rand::thread_rng().fill_bytes(&mut iv);
        Self::encode_with_iv(sa, sequence, iv, plaintext)
    }

    /// Build a packet with an explicit IV (tests and known-answer checks)
    pub fn encode_with_iv(
        sa: &SecurityAssociation,
        sequence: u32,
        iv: [u8; ESP_IV_LEN],
        plaintext: &[u8],
    ) -> Result<Self> {
        let ciphertext =
            CipherAlgorithm::Aes128Cbc.encrypt(&sa.encryption_key, &iv, plaintext)?;

        let auth_data = authenticated_bytes(sa.spi, sequence, &iv, &ciphertext);
        let icv = IntegrityAlgorithm::HmacSha256.compute(&sa.auth_key, &auth_data);

        Ok(EspPacket {
            spi: sa.spi,
            sequence,
            iv,
            ciphertext,
            icv,
        })
    }

    /// Serialize to wire format
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.extend_from_slice(&self.spi.to_be_bytes());
        bytes.extend_from_slice(&self.sequence.to_be_bytes());
        bytes.extend_from_slice(&self.iv);
        bytes.extend_from_slice(&self.ciphertext);
        bytes.extend_from_slice(&self.icv);
        bytes
    }

    /// Parse wire format, enforcing framing invariants
    ///
    /// Performs only structural checks; no keyed work happens here, so a
    /// short or unaligned packet is rejected without touching the HMAC.
    ///
    /// # Errors
    ///
    /// - `MalformedPacket` if the input is shorter than
    ///   [`ESP_MIN_PACKET_LEN`] or the ciphertext region is not a
    ///   positive multiple of the block size
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < ESP_MIN_PACKET_LEN {
            return Err(Error::MalformedPacket(format!(
                "{} bytes, minimum is {}",
                data.len(),
                ESP_MIN_PACKET_LEN
            )));
        }

        let ciphertext_len = data.len() - ESP_HEADER_LEN - ESP_IV_LEN - ESP_ICV_LEN;
        if ciphertext_len == 0 || ciphertext_len % ESP_BLOCK_LEN != 0 {
            return Err(Error::MalformedPacket(format!(
                "ciphertext length {} is not a positive multiple of {}",
                ciphertext_len, ESP_BLOCK_LEN
            )));
        }

        let spi = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let sequence = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);

        let mut iv = [0u8; ESP_IV_LEN];
        iv.copy_from_slice(&data[ESP_HEADER_LEN..ESP_HEADER_LEN + ESP_IV_LEN]);

        let ciphertext_start = ESP_HEADER_LEN + ESP_IV_LEN;
        let ciphertext = data[ciphertext_start..ciphertext_start + ciphertext_len].to_vec();

        let mut icv = [0u8; ESP_ICV_LEN];
        icv.copy_from_slice(&data[ciphertext_start + ciphertext_len..]);

        Ok(EspPacket {
            spi,
            sequence,
            iv,
            ciphertext,
            icv,
        })
    }

    /// Authenticate and decrypt this packet under the given SA
    ///
    /// The ICV is verified (constant time) before any decryption runs.
    /// An SPI that does not match the SA fails authentication like any
    /// other tampered header byte, since the SPI is covered by the ICV.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailed` on ICV mismatch or SPI mismatch
    /// - `CorruptPlaintext` if padding is invalid *after* the ICV
    ///   verified; this never happens for packets our own `encode`
    ///   produced and is logged upstream as anomalous
    pub fn open(&self, sa: &SecurityAssociation) -> Result<Vec<u8>> {
        let auth_data = authenticated_bytes(self.spi, self.sequence, &self.iv, &self.ciphertext);
        IntegrityAlgorithm::HmacSha256.verify(&sa.auth_key, &auth_data, &self.icv)?;

        if self.spi != sa.spi {
            return Err(Error::AuthenticationFailed);
        }

        match CipherAlgorithm::Aes128Cbc.decrypt(&sa.encryption_key, &self.iv, &self.ciphertext) {
            Ok(plaintext) => Ok(plaintext),
            Err(Error::InvalidPadding) => Err(Error::CorruptPlaintext),
            Err(e) => Err(e),
        }
    }

    /// Parse, authenticate, and decrypt in one step
    ///
    /// Returns the packet's sequence number alongside the plaintext so
    /// the caller can run its anti-replay check.
    pub fn decode(sa: &SecurityAssociation, data: &[u8]) -> Result<(u32, Vec<u8>)> {
        let packet = Self::from_bytes(data)?;
        let plaintext = packet.open(sa)?;
        Ok((packet.sequence, plaintext))
    }

    /// Total serialized length in bytes
    pub fn len(&self) -> usize {
        ESP_HEADER_LEN + ESP_IV_LEN + self.ciphertext.len() + ESP_ICV_LEN
    }

    /// A structurally valid ESP packet is never empty
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Concatenate the ICV coverage: SPI ‖ sequence ‖ IV ‖ ciphertext
fn authenticated_bytes(spi: u32, sequence: u32, iv: &[u8], ciphertext: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(ESP_HEADER_LEN + iv.len() + ciphertext.len());
    data.extend_from_slice(&spi.to_be_bytes());
    data.extend_from_slice(&sequence.to_be_bytes());
    data.extend_from_slice(iv);
    data.extend_from_slice(ciphertext);
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sa::SaMode;

    fn test_sa() -> SecurityAssociation {
        SecurityAssociation::new(0x1001, SaMode::Transport, [0u8; 16], [0u8; 32], 64)
    }

    fn keyed_sa(spi: u32) -> SecurityAssociation {
        SecurityAssociation::new(spi, SaMode::Tunnel, [0xAA; 16], [0xBB; 32], 64)
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let sa = keyed_sa(0x12345678);
        let payload = b"Hello, ESP encryption!";

        let packet = EspPacket::encode(&sa, 42, payload).unwrap();
        assert_eq!(packet.spi, 0x12345678);
        assert_eq!(packet.sequence, 42);

        let bytes = packet.to_bytes();
        let (sequence, plaintext) = EspPacket::decode(&sa, &bytes).unwrap();

        assert_eq!(sequence, 42);
        assert_eq!(plaintext, payload);
    }

    #[test]
    fn test_wire_layout() {
        let sa = keyed_sa(0x11223344);
        let packet = EspPacket::encode(&sa, 1, b"x").unwrap();
        let bytes = packet.to_bytes();

        assert_eq!(&bytes[0..4], &[0x11, 0x22, 0x33, 0x44]);
        assert_eq!(&bytes[4..8], &[0x00, 0x00, 0x00, 0x01]);
        assert_eq!(&bytes[8..24], &packet.iv);
        assert_eq!(&bytes[24..40], &packet.ciphertext[..]);
        assert_eq!(&bytes[40..72], &packet.icv);
        assert_eq!(bytes.len(), 72);
    }

    #[test]
    fn test_hello_packet_is_exactly_72_bytes() {
        // 5-byte payload pads to one block: 8 + 16 + 16 + 32 = 72.
        let sa = test_sa();
        let packet = EspPacket::encode(&sa, 1, b"HELLO").unwrap();
        let bytes = packet.to_bytes();

        assert_eq!(bytes.len(), 72);
        let (_, plaintext) = EspPacket::decode(&sa, &bytes).unwrap();
        assert_eq!(plaintext, b"HELLO");
    }

    #[test]
    fn test_from_bytes_rejects_short_input() {
        for len in [0usize, 1, 8, 24, 56, 71] {
            let data = vec![0u8; len];
            let result = EspPacket::from_bytes(&data);
            assert!(
                matches!(result, Err(Error::MalformedPacket(_))),
                "length {} accepted",
                len
            );
        }
    }

    #[test]
    fn test_from_bytes_rejects_unaligned_ciphertext() {
        // 73 bytes leaves a 17-byte ciphertext region.
        let data = vec![0u8; 73];
        assert!(matches!(
            EspPacket::from_bytes(&data),
            Err(Error::MalformedPacket(_))
        ));
    }

    #[test]
    fn test_from_bytes_accepts_minimum_length() {
        let data = vec![0u8; ESP_MIN_PACKET_LEN];
        let packet = EspPacket::from_bytes(&data).unwrap();
        assert_eq!(packet.ciphertext.len(), ESP_BLOCK_LEN);
    }

    #[test]
    fn test_parse_roundtrip() {
        let sa = keyed_sa(0x22222222);
        let original = EspPacket::encode(&sa, 777, &[0xCD; 48]).unwrap();

        let parsed = EspPacket::from_bytes(&original.to_bytes()).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_tampered_ciphertext_fails_authentication() {
        let sa = keyed_sa(0x1111);
        let mut bytes = EspPacket::encode(&sa, 5, b"payload").unwrap().to_bytes();

        bytes[30] ^= 0x01; // inside the ciphertext
        assert_eq!(
            EspPacket::decode(&sa, &bytes),
            Err(Error::AuthenticationFailed)
        );
    }

    #[test]
    fn test_tampered_header_fails_authentication() {
        let sa = keyed_sa(0x1111);
        let mut bytes = EspPacket::encode(&sa, 5, b"payload").unwrap().to_bytes();

        bytes[6] ^= 0x80; // inside the sequence number
        assert_eq!(
            EspPacket::decode(&sa, &bytes),
            Err(Error::AuthenticationFailed)
        );
    }

    #[test]
    fn test_tampered_icv_fails_authentication() {
        let sa = keyed_sa(0x1111);
        let mut bytes = EspPacket::encode(&sa, 5, b"payload").unwrap().to_bytes();

        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        assert_eq!(
            EspPacket::decode(&sa, &bytes),
            Err(Error::AuthenticationFailed)
        );
    }

    #[test]
    fn test_wrong_sa_fails_authentication() {
        let sa_a = keyed_sa(0x0A);
        let sa_b = SecurityAssociation::new(0x0A, SaMode::Tunnel, [0xAA; 16], [0xCC; 32], 64);

        let bytes = EspPacket::encode(&sa_a, 1, b"secret").unwrap().to_bytes();
        assert_eq!(
            EspPacket::decode(&sa_b, &bytes),
            Err(Error::AuthenticationFailed)
        );
    }

    #[test]
    fn test_spi_mismatch_fails_authentication() {
        // Same keys, different SPI in the SA record: the packet's own SPI
        // is covered by the ICV, and open() also cross-checks the record.
        let sa_a = keyed_sa(0x0A);
        let sa_b = keyed_sa(0x0B);

        let bytes = EspPacket::encode(&sa_a, 1, b"secret").unwrap().to_bytes();
        assert_eq!(
            EspPacket::decode(&sa_b, &bytes),
            Err(Error::AuthenticationFailed)
        );
    }

    #[test]
    fn test_authentication_checked_before_decryption() {
        // Garbage ciphertext with a *valid* ICV over it: authentication
        // passes, decryption then fails with the opaque post-auth error.
        // This demonstrates verify-before-decrypt: the same garbage with
        // a bad ICV reports AuthenticationFailed, never a padding error.
        let sa = keyed_sa(0x0A);
        let garbage = vec![0x5A; 16];

        let auth_data = super::authenticated_bytes(sa.spi, 9, &[0u8; 16], &garbage);
        let icv = IntegrityAlgorithm::HmacSha256.compute(&sa.auth_key, &auth_data);

        let packet = EspPacket {
            spi: sa.spi,
            sequence: 9,
            iv: [0u8; 16],
            ciphertext: garbage.clone(),
            icv,
        };

        let result = packet.open(&sa);
        // Either the garbage happens to unpad (1/256) or we get the
        // opaque corrupt-plaintext error; never InvalidPadding.
        assert!(matches!(result, Ok(_) | Err(Error::CorruptPlaintext)));

        let bad_icv_packet = EspPacket {
            icv: [0u8; 32],
            ..packet
        };
        assert_eq!(bad_icv_packet.open(&sa), Err(Error::AuthenticationFailed));
    }

    #[test]
    fn test_fresh_iv_per_encode() {
        let sa = keyed_sa(0x0A);
        let p1 = EspPacket::encode(&sa, 1, b"same").unwrap();
        let p2 = EspPacket::encode(&sa, 2, b"same").unwrap();
        assert_ne!(p1.iv, p2.iv);
        assert_ne!(p1.ciphertext, p2.ciphertext);
    }

    #[test]
    fn test_empty_payload_roundtrip() {
        let sa = keyed_sa(0x0A);
        let bytes = EspPacket::encode(&sa, 1, b"").unwrap().to_bytes();
        assert_eq!(bytes.len(), ESP_MIN_PACKET_LEN);

        let (_, plaintext) = EspPacket::decode(&sa, &bytes).unwrap();
        assert!(plaintext.is_empty());
    }

    #[test]
    fn test_packet_len() {
        let sa = keyed_sa(0x0A);
        let packet = EspPacket::encode(&sa, 1, &[0u8; 100]).unwrap();

        // 100 bytes pads to 112.
        assert_eq!(packet.ciphertext.len(), 112);
        assert_eq!(packet.len(), 8 + 16 + 112 + 32);
        assert_eq!(packet.to_bytes().len(), packet.len());
        assert!(!packet.is_empty());
    }
}
