//! Jasypt-compatible "standard PBE" string encryption.
//!
//! Produces and consumes the Base64 envelopes of both generations of the
//! format: the modern PBKDF2-HMAC-SHA512 / AES-256-CBC scheme and the legacy
//! iterated-MD5 / DES or TripleDES-CBC scheme.
//!
//! ```no_run
//! use jasypt_pbe::{Jasypt, Registry};
//!
//! let jasypt = Jasypt::new(Registry::builtin()?);
//! let envelope = jasypt.encrypt("PBEWITHHMACSHA512ANDAES_256", "secret", 1000, "hello")?;
//! let plain = jasypt.decrypt("PBEWITHHMACSHA512ANDAES_256", "secret", 1000, &envelope)?;
//! assert_eq!(plain, "hello");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod codec;
mod config;
mod crypto;
mod envelope;
mod error;
mod registry;

pub use crate::config::{CatalogSource, Config, default_catalog_path};
pub use crate::crypto::CipherKind;
pub use crate::envelope::{unwrap_property, wrap_property};
pub use crate::error::{CatalogError, PbeError};
pub use crate::registry::{AlgorithmSpec, CatalogEntry, Family, Registry};

use tracing::debug;

/// Algorithm used when the caller does not pick one.
pub const DEFAULT_ALGORITHM: &str = "PBEWITHHMACSHA512ANDAES_256";

/// Direction of a [`Jasypt::process`] request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encrypt,
    Decrypt,
}

/// Dispatcher over an injected, read-only [`Registry`].
///
/// Holds no per-call state, so one instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct Jasypt {
    registry: Registry,
    max_iterations: Option<u32>,
}

impl Jasypt {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            max_iterations: None,
        }
    }

    /// Rejects requests whose iteration count exceeds `limit`.
    pub fn with_max_iterations(mut self, limit: u32) -> Self {
        self.max_iterations = Some(limit);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn lookup_algorithm(&self, id: &str) -> Result<&AlgorithmSpec, PbeError> {
        self.registry.lookup(id)
    }

    pub fn process(
        &self,
        mode: Mode,
        algorithm_id: &str,
        password: &str,
        iterations: u32,
        text: &str,
    ) -> Result<String, PbeError> {
        match mode {
            Mode::Encrypt => self.encrypt(algorithm_id, password, iterations, text),
            Mode::Decrypt => self.decrypt(algorithm_id, password, iterations, text),
        }
    }

    /// Encrypts `plaintext` and returns the Base64 envelope.
    pub fn encrypt(
        &self,
        algorithm_id: &str,
        password: &str,
        iterations: u32,
        plaintext: &str,
    ) -> Result<String, PbeError> {
        let spec = self.validate(algorithm_id, password, iterations, plaintext)?;
        debug!(
            algorithm = spec.id(),
            family = spec.family().name(),
            iterations,
            "encrypting"
        );

        let envelope = codec::seal(spec.family(), password, iterations, plaintext.as_bytes())?;
        Ok(envelope.to_base64())
    }

    /// Decrypts a Base64 envelope, optionally wrapped in `ENC(...)`.
    ///
    /// # Errors
    ///
    /// [`PbeError::MalformedEnvelope`] for undecodable or truncated input and
    /// [`PbeError::DecryptionFailed`] for everything that only shows up after
    /// the cipher ran: bad padding, non-UTF-8 or empty plaintext.
    pub fn decrypt(
        &self,
        algorithm_id: &str,
        password: &str,
        iterations: u32,
        envelope: &str,
    ) -> Result<String, PbeError> {
        let spec = self.validate(algorithm_id, password, iterations, envelope)?;
        debug!(
            algorithm = spec.id(),
            family = spec.family().name(),
            iterations,
            "decrypting"
        );

        let parsed = envelope::parse_text(envelope, spec.family())?;
        let plaintext = codec::open(spec.family(), &parsed, password, iterations)?;

        let text = std::str::from_utf8(&plaintext).map_err(|_| {
            debug!("plaintext is not valid UTF-8");
            PbeError::DecryptionFailed
        })?;
        if text.is_empty() {
            return Err(PbeError::DecryptionFailed);
        }

        Ok(text.to_owned())
    }

    /// Cheap request checks, done before any key derivation.
    fn validate(
        &self,
        algorithm_id: &str,
        password: &str,
        iterations: u32,
        text: &str,
    ) -> Result<&AlgorithmSpec, PbeError> {
        let spec = self.registry.lookup(algorithm_id)?;

        if password.is_empty() {
            return Err(PbeError::InvalidRequest("password must not be empty"));
        }
        if text.trim().is_empty() {
            return Err(PbeError::InvalidRequest("text must not be empty"));
        }
        if iterations == 0 {
            return Err(PbeError::InvalidRequest("iteration count must be >= 1"));
        }
        if let Some(limit) = self.max_iterations {
            if iterations > limit {
                return Err(PbeError::InvalidRequest(
                    "iteration count exceeds the configured maximum",
                ));
            }
        }

        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    use super::*;

    const AES: &str = "PBEWITHHMACSHA512ANDAES_256";
    const DES: &str = "PBEWITHMD5ANDDES";
    const TDES: &str = "PBEWITHMD5ANDTRIPLEDES";

    fn jasypt() -> Jasypt {
        Jasypt::new(Registry::builtin().unwrap())
    }

    fn decoded_len(text: &str) -> usize {
        STANDARD.decode(text).unwrap().len()
    }

    #[test]
    fn modern_roundtrip_and_length() {
        let j = jasypt();
        let env = j.encrypt(AES, "test123", 1000, "hello world").unwrap();
        assert_eq!(decoded_len(&env), 48);
        assert_eq!(j.decrypt(AES, "test123", 1000, &env).unwrap(), "hello world");
    }

    #[test]
    fn legacy_des_single_round_length() {
        let j = jasypt();
        let env = j.encrypt(DES, "test123", 1, "hi").unwrap();
        assert_eq!(decoded_len(&env), 16);
        assert_eq!(j.decrypt(DES, "test123", 1, &env).unwrap(), "hi");
    }

    #[test]
    fn legacy_roundtrips() {
        let j = jasypt();
        for id in [DES, TDES] {
            for text in ["x", "exactly8", "a somewhat longer secret value \u{e9}\u{263a}"] {
                let env = j.encrypt(id, "pw", 17, text).unwrap();
                assert_eq!(j.decrypt(id, "pw", 17, &env).unwrap(), text);
            }
        }
    }

    #[test]
    fn known_vectors_decrypt() {
        let j = jasypt();
        assert_eq!(
            j.decrypt(
                AES,
                "test123",
                1000,
                "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8zdvL04tSm3In30TVKJLHM"
            )
            .unwrap(),
            "hello world"
        );
        assert_eq!(
            j.decrypt(DES, "test123", 1000, "ENC(AQIDBAUGBwjAYVR/feMQ8ftyJxPBi9Qm)")
                .unwrap(),
            "hello world"
        );
        assert_eq!(
            j.decrypt(TDES, "test123", 1000, "AQIDBAUGBwjy2e2CVTni9i/0GDSWUo/l")
                .unwrap(),
            "hello world"
        );
    }

    #[test]
    fn wrong_password_fails() {
        let j = jasypt();
        for id in [AES, DES, TDES] {
            let env = j.encrypt(id, "correct", 10, "secret data").unwrap();
            assert_eq!(
                j.decrypt(id, "wrong", 10, &env).unwrap_err(),
                PbeError::DecryptionFailed
            );
        }
    }

    #[test]
    fn wrong_iterations_fail() {
        let j = jasypt();
        let env = j.encrypt(AES, "pw", 1000, "secret data").unwrap();
        assert_eq!(
            j.decrypt(AES, "pw", 999, &env).unwrap_err(),
            PbeError::DecryptionFailed
        );
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        match jasypt().encrypt("PBEWITHSHA1ANDRC4_128", "pw", 1, "x") {
            Err(PbeError::UnknownAlgorithm(id)) => assert_eq!(id, "PBEWITHSHA1ANDRC4_128"),
            other => panic!("expected UnknownAlgorithm, got: {other:?}"),
        }
    }

    #[test]
    fn empty_inputs_are_invalid_requests() {
        let j = jasypt();
        assert!(matches!(
            j.encrypt(AES, "", 1, "x"),
            Err(PbeError::InvalidRequest(_))
        ));
        assert!(matches!(
            j.encrypt(AES, "pw", 1, ""),
            Err(PbeError::InvalidRequest(_))
        ));
        assert!(matches!(
            j.decrypt(DES, "pw", 1, "   "),
            Err(PbeError::InvalidRequest(_))
        ));
        assert!(matches!(
            j.encrypt(DES, "pw", 0, "x"),
            Err(PbeError::InvalidRequest(_))
        ));
    }

    #[test]
    fn iteration_limit_is_enforced() {
        let j = jasypt().with_max_iterations(100);
        assert!(j.encrypt(AES, "pw", 100, "x").is_ok());
        assert!(matches!(
            j.encrypt(AES, "pw", 101, "x"),
            Err(PbeError::InvalidRequest(_))
        ));
    }

    #[test]
    fn short_envelopes_are_malformed() {
        let j = jasypt();
        let header_only = STANDARD.encode([0u8; 32]);
        assert_eq!(
            j.decrypt(AES, "pw", 1, &header_only).unwrap_err(),
            PbeError::MalformedEnvelope
        );

        let salt_only = STANDARD.encode([0u8; 8]);
        assert_eq!(
            j.decrypt(DES, "pw", 1, &salt_only).unwrap_err(),
            PbeError::MalformedEnvelope
        );
        assert_eq!(
            j.decrypt(DES, "pw", 1, "%%%").unwrap_err(),
            PbeError::MalformedEnvelope
        );
    }

    #[test]
    fn legacy_envelope_under_modern_id_fails() {
        let j = jasypt();
        let env = j.encrypt(DES, "pw", 5, "hello").unwrap();
        assert!(j.decrypt(AES, "pw", 5, &env).is_err());
    }

    #[test]
    fn non_utf8_plaintext_fails_decryption() {
        let j = jasypt();
        let invalid = [0xff, 0xfe];

        let modern = codec::seal_modern("pw", 3, &invalid, [1; 16], [2; 16]).unwrap();
        assert_eq!(
            j.decrypt(AES, "pw", 3, &modern.to_base64()),
            Err(PbeError::DecryptionFailed)
        );

        let legacy = codec::seal_legacy(CipherKind::Des, 8, 8, "pw", 3, &invalid, [3; 8]).unwrap();
        assert_eq!(
            j.decrypt(DES, "pw", 3, &legacy.to_base64()),
            Err(PbeError::DecryptionFailed)
        );
    }

    #[test]
    fn empty_plaintext_fails_decryption() {
        let j = jasypt();

        let modern = codec::seal_modern("pw", 3, b"", [1; 16], [2; 16]).unwrap();
        assert_eq!(decoded_len(&modern.to_base64()), 48);
        assert_eq!(
            j.decrypt(AES, "pw", 3, &modern.to_base64()),
            Err(PbeError::DecryptionFailed)
        );

        let legacy =
            codec::seal_legacy(CipherKind::TripleDes, 24, 8, "pw", 3, b"", [3; 8]).unwrap();
        assert_eq!(
            j.decrypt(TDES, "pw", 3, &legacy.to_base64()),
            Err(PbeError::DecryptionFailed)
        );
    }

    #[test]
    fn process_dispatches_by_mode() {
        let j = jasypt();
        let env = j.process(Mode::Encrypt, TDES, "pw", 3, "abc").unwrap();
        assert_eq!(j.process(Mode::Decrypt, TDES, "pw", 3, &env).unwrap(), "abc");
    }

    #[test]
    fn concurrent_calls_share_the_registry() {
        let j = jasypt();
        std::thread::scope(|s| {
            for (n, id) in [AES, DES, TDES, AES].into_iter().enumerate() {
                let j = &j;
                s.spawn(move || {
                    let text = format!("value {n}");
                    let env = j.encrypt(id, "pw", 50, &text).unwrap();
                    assert_eq!(j.decrypt(id, "pw", 50, &env).unwrap(), text);
                });
            }
        });
    }
}
