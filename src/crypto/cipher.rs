use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use getrandom::fill;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{AES_BLOCK_LEN, DES_BLOCK_LEN, MODERN_IV_LEN, MODERN_KEY_LEN};
use crate::error::PbeError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type DesCbcEnc = cbc::Encryptor<des::Des>;
type DesCbcDec = cbc::Decryptor<des::Des>;
type TdesCbcEnc = cbc::Encryptor<des::TdesEde3>;
type TdesCbcDec = cbc::Decryptor<des::TdesEde3>;

/// Block cipher behind an algorithm id. Always used in CBC mode with PKCS#7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CipherKind {
    Aes256,
    Des,
    TripleDes,
}

impl CipherKind {
    pub fn key_len(self) -> usize {
        match self {
            CipherKind::Aes256 => MODERN_KEY_LEN,
            CipherKind::Des => 8,
            CipherKind::TripleDes => 24,
        }
    }

    pub fn iv_len(self) -> usize {
        match self {
            CipherKind::Aes256 => MODERN_IV_LEN,
            CipherKind::Des | CipherKind::TripleDes => DES_BLOCK_LEN,
        }
    }

    pub fn block_len(self) -> usize {
        match self {
            CipherKind::Aes256 => AES_BLOCK_LEN,
            CipherKind::Des | CipherKind::TripleDes => DES_BLOCK_LEN,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CipherKind::Aes256 => "AES-256-CBC",
            CipherKind::Des => "DES-CBC",
            CipherKind::TripleDes => "TripleDES-CBC",
        }
    }
}

/// Fill an array with bytes from the OS random generator.
pub fn random_bytes<const N: usize>() -> Result<[u8; N], PbeError> {
    let mut buf = [0u8; N];
    fill(&mut buf).map_err(|_| PbeError::EncryptionFailed("OS random generator unavailable"))?;
    Ok(buf)
}

/// Encrypt with PKCS#7 padding; output length is the next whole block.
pub fn encrypt(
    kind: CipherKind,
    key: &[u8],
    iv: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, PbeError> {
    let rejected = |_| PbeError::EncryptionFailed("cipher rejected derived key material");

    let ciphertext = match kind {
        CipherKind::Aes256 => Aes256CbcEnc::new_from_slices(key, iv)
            .map_err(rejected)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        CipherKind::Des => DesCbcEnc::new_from_slices(key, iv)
            .map_err(rejected)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        CipherKind::TripleDes => TdesCbcEnc::new_from_slices(key, iv)
            .map_err(rejected)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
    };

    Ok(ciphertext)
}

/// Decrypt and strip PKCS#7 padding.
///
/// Every failure, including ciphertext that is not a whole number of blocks,
/// collapses into [`PbeError::DecryptionFailed`].
pub fn decrypt(
    kind: CipherKind,
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, PbeError> {
    let plaintext = match kind {
        CipherKind::Aes256 => Aes256CbcDec::new_from_slices(key, iv)
            .map_err(|_| PbeError::DecryptionFailed)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        CipherKind::Des => DesCbcDec::new_from_slices(key, iv)
            .map_err(|_| PbeError::DecryptionFailed)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        CipherKind::TripleDes => TdesCbcDec::new_from_slices(key, iv)
            .map_err(|_| PbeError::DecryptionFailed)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
    }
    .map_err(|_| PbeError::DecryptionFailed)?;

    Ok(Zeroizing::new(plaintext))
}
