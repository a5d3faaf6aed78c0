//! Cryptographic primitives for ESP processing
//!
//! The suite is fixed per the classic encrypt-then-MAC construction:
//! AES-128-CBC with PKCS#7 padding for confidentiality and HMAC-SHA256
//! for integrity. Tag comparison is constant time.

pub mod auth;
pub mod cipher;

pub use auth::{constant_time_eq, IntegrityAlgorithm};
pub use cipher::CipherAlgorithm;
