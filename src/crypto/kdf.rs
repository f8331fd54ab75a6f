use md5::{Digest, Md5};
use sha2::Sha512;
use zeroize::Zeroizing;

use super::MODERN_KEY_LEN;
use crate::error::PbeError;

/// Length of one MD5 digest.
const MD5_LEN: usize = 16;

/// Key and IV derived by the legacy MD5 construction.
///
/// Both halves live in one zeroized buffer: `key_len` key bytes followed by
/// `iv_len` IV bytes.
pub struct LegacyKeyMaterial {
    material: Zeroizing<Vec<u8>>,
    key_len: usize,
    iv_len: usize,
}

impl LegacyKeyMaterial {
    pub fn key(&self) -> &[u8] {
        &self.material[..self.key_len]
    }

    pub fn iv(&self) -> &[u8] {
        &self.material[self.key_len..self.key_len + self.iv_len]
    }
}

/// Derive the 256-bit AES key with PBKDF2-HMAC-SHA512 over the UTF-8 password.
pub fn derive_modern_key(
    password: &str,
    salt: &[u8],
    iterations: u32,
) -> Result<Zeroizing<[u8; MODERN_KEY_LEN]>, PbeError> {
    if iterations == 0 {
        return Err(PbeError::InvalidRequest("iteration count must be >= 1"));
    }

    let mut key = Zeroizing::new([0u8; MODERN_KEY_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha512>(password.as_bytes(), salt, iterations, &mut *key);

    Ok(key)
}

/// Derive legacy key and IV from iterated MD5.
///
/// Material that fits one digest (single DES) is `MD5(password | salt)` hashed
/// again `iterations - 1` times. Longer material (TripleDES) splits the salt
/// into two halves and runs `h = MD5(h | password)` `iterations` times on each,
/// starting from the half itself; the two digests are concatenated. Equal
/// halves would give equal digests, so the first half is reversed first.
pub fn derive_legacy_key(
    password: &str,
    salt: &[u8],
    iterations: u32,
    key_len: usize,
    iv_len: usize,
) -> Result<LegacyKeyMaterial, PbeError> {
    if iterations == 0 {
        return Err(PbeError::InvalidRequest("iteration count must be >= 1"));
    }

    let password = latin1_bytes(password)?;
    let wanted = key_len + iv_len;

    let material = if wanted <= MD5_LEN {
        single_chain(&password, salt, iterations)
    } else if wanted <= 2 * MD5_LEN && salt.len() % 2 == 0 {
        split_salt_chain(&password, salt, iterations)
    } else {
        return Err(PbeError::InvalidRequest("unsupported legacy key length"));
    };

    Ok(LegacyKeyMaterial {
        material,
        key_len,
        iv_len,
    })
}

fn single_chain(password: &[u8], salt: &[u8], iterations: u32) -> Zeroizing<Vec<u8>> {
    let mut hasher = Md5::new();
    hasher.update(password);
    hasher.update(salt);

    let mut digest = Zeroizing::new([0u8; MD5_LEN]);
    digest.copy_from_slice(&hasher.finalize());
    for _ in 1..iterations {
        let next = Md5::digest(digest.as_slice());
        digest.copy_from_slice(&next);
    }

    Zeroizing::new(digest.to_vec())
}

fn split_salt_chain(password: &[u8], salt: &[u8], iterations: u32) -> Zeroizing<Vec<u8>> {
    let half = salt.len() / 2;
    let mut first = salt[..half].to_vec();
    let second = &salt[half..];
    if first == second {
        first.reverse();
    }

    let mut material = Zeroizing::new(Vec::with_capacity(2 * MD5_LEN));
    for start in [first.as_slice(), second] {
        let mut digest = Zeroizing::new(Vec::with_capacity(MD5_LEN));
        digest.extend_from_slice(start);
        for _ in 0..iterations {
            let mut hasher = Md5::new();
            hasher.update(digest.as_slice());
            hasher.update(password);
            digest.clear();
            digest.extend_from_slice(&hasher.finalize());
        }
        material.extend_from_slice(&digest);
    }

    material
}

/// Encode one byte per character; anything above U+00FF has no single-byte form.
fn latin1_bytes(password: &str) -> Result<Zeroizing<Vec<u8>>, PbeError> {
    let mut bytes = Zeroizing::new(Vec::with_capacity(password.len()));
    for c in password.chars() {
        let byte = u8::try_from(u32::from(c)).map_err(|_| {
            PbeError::InvalidRequest("legacy algorithms accept only ISO-8859-1 passwords")
        })?;
        bytes.push(byte);
    }
    Ok(bytes)
}
