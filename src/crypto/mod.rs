//! Cryptographic composition for the standard PBE envelopes.
//!
//! Provides key derivation for both generations and the CBC cipher layer.

pub mod cipher;
pub mod kdf;

pub use cipher::{CipherKind, decrypt, encrypt, random_bytes};
pub use kdf::{derive_legacy_key, derive_modern_key};

/// Length of the modern salt (16 bytes).
pub const MODERN_SALT_LEN: usize = 16;
/// Length of the modern IV, one AES block (16 bytes).
pub const MODERN_IV_LEN: usize = 16;
/// Length of the modern key (32 bytes / 256 bits).
pub const MODERN_KEY_LEN: usize = 32;
/// Length of the legacy salt (8 bytes).
pub const LEGACY_SALT_LEN: usize = 8;
/// AES block length.
pub const AES_BLOCK_LEN: usize = 16;
/// DES and TripleDES block length.
pub const DES_BLOCK_LEN: usize = 8;
