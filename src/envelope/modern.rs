//! Modern envelope layout.
//!
//! ```text
//! SALT (16) | IV (16) | CIPHERTEXT (n * 16, n >= 1)
//! ```

use tracing::debug;

use super::Envelope;
use crate::crypto::{MODERN_IV_LEN, MODERN_SALT_LEN};
use crate::error::PbeError;

pub const HEADER_LEN: usize = MODERN_SALT_LEN + MODERN_IV_LEN;
pub const MIN_LEN: usize = HEADER_LEN + 1;

pub(super) fn parse(data: &[u8]) -> Result<Envelope, PbeError> {
    if data.len() < MIN_LEN {
        debug!(len = data.len(), min = MIN_LEN, "modern envelope too short");
        return Err(PbeError::MalformedEnvelope);
    }

    let mut offset = 0;

    let salt: [u8; MODERN_SALT_LEN] = data[offset..offset + MODERN_SALT_LEN]
        .try_into()
        .map_err(|_| PbeError::MalformedEnvelope)?;
    offset += MODERN_SALT_LEN;

    let iv: [u8; MODERN_IV_LEN] = data[offset..offset + MODERN_IV_LEN]
        .try_into()
        .map_err(|_| PbeError::MalformedEnvelope)?;
    offset += MODERN_IV_LEN;

    let ciphertext = data[offset..].to_vec();

    Ok(Envelope::Modern {
        salt,
        iv,
        ciphertext,
    })
}

pub(super) fn serialize(envelope: &Envelope) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + envelope.ciphertext().len());

    if let Envelope::Modern {
        salt,
        iv,
        ciphertext,
    } = envelope
    {
        buf.extend_from_slice(salt);
        buf.extend_from_slice(iv);
        buf.extend_from_slice(ciphertext);
    }

    buf
}
