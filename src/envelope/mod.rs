//! Envelope layouts and their Base64 text form.
//!
//! Dispatches to the layout of the algorithm's family; see [`modern`] and
//! [`legacy`] for the byte order of each generation.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use tracing::debug;

use crate::crypto::{LEGACY_SALT_LEN, MODERN_IV_LEN, MODERN_SALT_LEN};
use crate::error::PbeError;
use crate::registry::Family;

mod legacy;
mod modern;

/// Standard alphabet; emits padding but accepts input with or without it.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const PROPERTY_PREFIX: &str = "ENC(";
const PROPERTY_SUFFIX: &str = ")";

/// Envelope parts, owned by the single call that builds or parses them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Envelope {
    Modern {
        salt: [u8; MODERN_SALT_LEN],
        iv: [u8; MODERN_IV_LEN],
        ciphertext: Vec<u8>,
    },
    Legacy {
        salt: [u8; LEGACY_SALT_LEN],
        ciphertext: Vec<u8>,
    },
}

impl Envelope {
    pub fn ciphertext(&self) -> &[u8] {
        match self {
            Envelope::Modern { ciphertext, .. } | Envelope::Legacy { ciphertext, .. } => ciphertext,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Envelope::Modern { .. } => modern::serialize(self),
            Envelope::Legacy { .. } => legacy::serialize(self),
        }
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(self.to_bytes())
    }
}

/// Parses raw envelope bytes using the layout of `family`.
///
/// # Errors
///
/// Returns [`PbeError::MalformedEnvelope`] when the data is shorter than the
/// layout header plus one cipher block.
pub(crate) fn parse(data: &[u8], family: Family) -> Result<Envelope, PbeError> {
    match family {
        Family::Modern => modern::parse(data),
        Family::Legacy { cipher, .. } => legacy::parse(data, cipher.block_len()),
    }
}

/// Decodes envelope text (optionally wrapped in `ENC(...)`) and parses it.
pub(crate) fn parse_text(text: &str, family: Family) -> Result<Envelope, PbeError> {
    let encoded = unwrap_property(text);
    let data = BASE64.decode(encoded).map_err(|_| {
        debug!(reason = "invalid base64", "rejecting envelope");
        PbeError::MalformedEnvelope
    })?;
    parse(&data, family)
}

/// Wraps envelope text in the `ENC(...)` marker used by property files.
pub fn wrap_property(envelope: &str) -> String {
    format!("{PROPERTY_PREFIX}{envelope}{PROPERTY_SUFFIX}")
}

/// Trims surrounding whitespace and strips one `ENC(...)` marker if present.
pub fn unwrap_property(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix(PROPERTY_PREFIX)
        .and_then(|inner| inner.strip_suffix(PROPERTY_SUFFIX))
        .map(str::trim)
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::CipherKind;

    fn legacy_des() -> Family {
        Family::Legacy {
            cipher: CipherKind::Des,
            key_len: 8,
            iv_len: 8,
        }
    }

    #[test]
    fn property_marker_is_stripped() {
        assert_eq!(unwrap_property("  ENC(abc=)\n"), "abc=");
        assert_eq!(unwrap_property("ENC( abc )"), "abc");
        assert_eq!(unwrap_property("abc="), "abc=");
        assert_eq!(unwrap_property("ENC(abc"), "ENC(abc");
        assert_eq!(wrap_property("abc="), "ENC(abc=)");
    }

    #[test]
    fn invalid_base64_is_malformed() {
        assert_eq!(
            parse_text("not*base64!", Family::Modern).unwrap_err(),
            PbeError::MalformedEnvelope
        );
    }

    #[test]
    fn missing_padding_is_accepted() {
        // 16 bytes of zeroes: "AAAAAAAAAAAAAAAAAAAAAA==" without the padding.
        let env = parse_text("AAAAAAAAAAAAAAAAAAAAAA", legacy_des()).unwrap();
        assert_eq!(env.ciphertext(), &[0u8; 8]);
    }

    #[test]
    fn text_roundtrip_keeps_layout() {
        let env = Envelope::Legacy {
            salt: [1, 2, 3, 4, 5, 6, 7, 8],
            ciphertext: vec![0xAB; 16],
        };
        let text = env.to_base64();
        assert_eq!(parse_text(&wrap_property(&text), legacy_des()).unwrap(), env);
    }
}
