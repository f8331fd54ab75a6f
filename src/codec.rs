//! Encrypt and decrypt pipelines for both envelope generations.

use zeroize::Zeroizing;

use crate::crypto::{
    self, CipherKind, LEGACY_SALT_LEN, MODERN_IV_LEN, MODERN_SALT_LEN, derive_legacy_key,
    derive_modern_key, random_bytes,
};
use crate::envelope::Envelope;
use crate::error::PbeError;
use crate::registry::Family;

/// Encrypts `plaintext` under a fresh random salt (and IV for the modern family).
pub(crate) fn seal(
    family: Family,
    password: &str,
    iterations: u32,
    plaintext: &[u8],
) -> Result<Envelope, PbeError> {
    match family {
        Family::Modern => {
            let salt = random_bytes::<MODERN_SALT_LEN>()?;
            let iv = random_bytes::<MODERN_IV_LEN>()?;
            seal_modern(password, iterations, plaintext, salt, iv)
        }
        Family::Legacy {
            cipher,
            key_len,
            iv_len,
        } => {
            let salt = random_bytes::<LEGACY_SALT_LEN>()?;
            seal_legacy(cipher, key_len, iv_len, password, iterations, plaintext, salt)
        }
    }
}

/// Decrypts an envelope; the layout must belong to `family`.
pub(crate) fn open(
    family: Family,
    envelope: &Envelope,
    password: &str,
    iterations: u32,
) -> Result<Zeroizing<Vec<u8>>, PbeError> {
    match (family, envelope) {
        (
            Family::Modern,
            Envelope::Modern {
                salt,
                iv,
                ciphertext,
            },
        ) => {
            let key = derive_modern_key(password, salt, iterations)?;
            crypto::decrypt(CipherKind::Aes256, &*key, iv, ciphertext)
        }
        (
            Family::Legacy {
                cipher,
                key_len,
                iv_len,
            },
            Envelope::Legacy { salt, ciphertext },
        ) => {
            let material = derive_legacy_key(password, salt, iterations, key_len, iv_len)?;
            crypto::decrypt(cipher, material.key(), material.iv(), ciphertext)
        }
        _ => Err(PbeError::MalformedEnvelope),
    }
}

pub(crate) fn seal_modern(
    password: &str,
    iterations: u32,
    plaintext: &[u8],
    salt: [u8; MODERN_SALT_LEN],
    iv: [u8; MODERN_IV_LEN],
) -> Result<Envelope, PbeError> {
    let key = derive_modern_key(password, &salt, iterations)?;
    let ciphertext = crypto::encrypt(CipherKind::Aes256, &*key, &iv, plaintext)?;

    Ok(Envelope::Modern {
        salt,
        iv,
        ciphertext,
    })
}

pub(crate) fn seal_legacy(
    cipher: CipherKind,
    key_len: usize,
    iv_len: usize,
    password: &str,
    iterations: u32,
    plaintext: &[u8],
    salt: [u8; LEGACY_SALT_LEN],
) -> Result<Envelope, PbeError> {
    let material = derive_legacy_key(password, &salt, iterations, key_len, iv_len)?;
    let ciphertext = crypto::encrypt(cipher, material.key(), material.iv(), plaintext)?;

    Ok(Envelope::Legacy { salt, ciphertext })
}
