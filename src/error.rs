use thiserror::Error;

/// Failure of a single encrypt or decrypt request.
///
/// Display strings are safe to show to an end user: they never carry key
/// material, plaintext, or errors from the underlying primitive crates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PbeError {
    #[error("unknown algorithm '{0}'")]
    UnknownAlgorithm(String),

    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),

    #[error("malformed envelope: input is corrupted or truncated")]
    MalformedEnvelope,

    #[error("decryption failed: wrong password or incompatible algorithm")]
    DecryptionFailed,

    #[error("encryption failed: {0}")]
    EncryptionFailed(&'static str),
}

/// Failure while loading the algorithm catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read algorithm catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse algorithm catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("algorithm '{0}' is not supported by this codec")]
    UnsupportedAlgorithm(String),

    #[error("algorithm '{0}' must declare at least one default iteration")]
    ZeroIterations(String),

    #[error("algorithm catalog is empty")]
    Empty,
}
