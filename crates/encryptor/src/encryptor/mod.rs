//! The [`Encryptor`] trait and its provider-backed implementation.
//!
//! An encryptor turns `(bytes, key id, algorithm)` into bytes. It is the seam
//! between callers that know *what* to protect and providers that know *which
//! key* protects it.

pub mod facade;

pub use facade::ProviderEncryptor;

use async_trait::async_trait;
use common::EncryptorError;
use tokio_util::sync::CancellationToken;

/// Encrypts and decrypts opaque byte payloads under a named key and algorithm.
///
/// Implementations must be safe for concurrent use; callers may issue many
/// operations at once against a shared encryptor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Encryptor: Send + Sync {
    /// Encrypt `plaintext` with the key identified by `dek_id` and `algorithm`.
    ///
    /// Callers without a cancellation source pass a fresh
    /// [`CancellationToken::new`].
    ///
    /// # Errors
    ///
    /// See [`EncryptorError`] for the taxonomy.
    async fn encrypt(
        &self,
        plaintext: &[u8],
        dek_id: &str,
        algorithm: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, EncryptorError>;

    /// Decrypt `ciphertext` with the key identified by `dek_id` and `algorithm`.
    ///
    /// # Errors
    ///
    /// See [`EncryptorError`] for the taxonomy.
    async fn decrypt(
        &self,
        ciphertext: &[u8],
        dek_id: &str,
        algorithm: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, EncryptorError>;
}
