//! Legacy envelope layout.
//!
//! ```text
//! SALT (8) | CIPHERTEXT (n * 8, n >= 1)
//! ```
//!
//! The IV is not transmitted; it comes out of the same MD5 chain as the key.

use tracing::debug;

use super::Envelope;
use crate::crypto::LEGACY_SALT_LEN;
use crate::error::PbeError;

pub const HEADER_LEN: usize = LEGACY_SALT_LEN;

pub(super) fn parse(data: &[u8], block_len: usize) -> Result<Envelope, PbeError> {
    let min = HEADER_LEN + block_len;
    if data.len() < min {
        debug!(len = data.len(), min, "legacy envelope too short");
        return Err(PbeError::MalformedEnvelope);
    }

    let salt: [u8; LEGACY_SALT_LEN] = data[..HEADER_LEN]
        .try_into()
        .map_err(|_| PbeError::MalformedEnvelope)?;
    let ciphertext = data[HEADER_LEN..].to_vec();

    Ok(Envelope::Legacy { salt, ciphertext })
}

pub(super) fn serialize(envelope: &Envelope) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + envelope.ciphertext().len());

    if let Envelope::Legacy { salt, ciphertext } = envelope {
        buf.extend_from_slice(salt);
        buf.extend_from_slice(ciphertext);
    }

    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_salt_ciphertext() {
        let data = [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 9, 9, 9, 9, 9, 9, 9];
        let env = parse(&data, 8).unwrap();
        assert_eq!(
            env,
            Envelope::Legacy {
                salt: [1, 2, 3, 4, 5, 6, 7, 8],
                ciphertext: vec![9; 8],
            }
        );
        assert_eq!(serialize(&env), data.to_vec());
    }

    #[test]
    fn shorter_than_one_block_is_malformed() {
        assert_eq!(parse(&[0u8; 15], 8).unwrap_err(), PbeError::MalformedEnvelope);
        assert_eq!(parse(&[0u8; 8], 8).unwrap_err(), PbeError::MalformedEnvelope);
        assert!(parse(&[0u8; 16], 8).is_ok());
    }
}
