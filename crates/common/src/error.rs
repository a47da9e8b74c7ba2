//! Common error types shared across crates.

use thiserror::Error;

/// Boxed error returned by provider implementations that wrap foreign errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors reported by a data encryption key provider.
///
/// The encryptor passes these through to its caller unchanged, except
/// [`KeyProviderError::Cancelled`], which surfaces as
/// [`EncryptorError::Cancelled`].
#[derive(Debug, Error)]
pub enum KeyProviderError {
    /// No key exists for the requested identifier.
    #[error("data encryption key not found: {0}")]
    NotFound(String),

    /// The caller is not permitted to use or unwrap the key.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The backing key store could not be reached.
    #[error("key provider unavailable: {0}")]
    Unavailable(String),

    /// The provider observed cancellation and abandoned the fetch.
    #[error("key fetch cancelled")]
    Cancelled,

    /// Any other provider-specific failure.
    #[error("key provider failure: {0}")]
    Other(#[source] BoxError),
}

/// Errors produced by a data encryption key's encrypt/decrypt primitives.
#[derive(Debug, Error)]
pub enum DataKeyError {
    /// The key does not support the requested algorithm.
    #[error("unsupported encryption algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Encryption failed inside the key's primitive.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption or authentication failed (wrong key or tampered data).
    #[error("decryption failed: {0}")]
    Decryption(String),
}

/// Top-level encryptor error type.
///
/// None of these are retried by the encryptor itself; see
/// [`EncryptorError::is_retryable`] for the classification callers may use.
#[derive(Debug, Error)]
pub enum EncryptorError {
    /// The encryptor was used after it was disposed.
    #[error("encryptor has been disposed")]
    InvalidState,

    /// The provider returned no key for the requested id and algorithm.
    #[error(
        "no data encryption key returned for id `{dek_id}` and algorithm `{algorithm}`"
    )]
    KeyResolution { dek_id: String, algorithm: String },

    /// Cancellation was requested before the key was resolved.
    #[error("operation cancelled")]
    Cancelled,

    /// The key provider failed.
    #[error(transparent)]
    Provider(KeyProviderError),

    /// The resolved key failed to encrypt or decrypt.
    #[error(transparent)]
    Crypto(#[from] DataKeyError),
}

impl EncryptorError {
    /// Returns `true` if repeating the same call might succeed.
    ///
    /// Only a temporarily unavailable provider qualifies. A missing key is a
    /// configuration fault and is never retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EncryptorError::Provider(KeyProviderError::Unavailable(_))
        )
    }
}

impl From<KeyProviderError> for EncryptorError {
    fn from(err: KeyProviderError) -> Self {
        match err {
            KeyProviderError::Cancelled => EncryptorError::Cancelled,
            other => EncryptorError::Provider(other),
        }
    }
}
