//! [`DataEncryptionKey`]: the primitives a resolved key exposes.

use common::DataKeyError;

/// A resolved data encryption key.
///
/// Implementations bind key material to a single algorithm. They must be safe to
/// share across concurrent encrypt/decrypt calls.
#[cfg_attr(test, mockall::automock)]
pub trait DataEncryptionKey: Send + Sync {
    /// Encrypt `plaintext`, returning the ciphertext bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DataKeyError`] if the underlying primitive fails.
    fn encrypt_data(&self, plaintext: &[u8]) -> Result<Vec<u8>, DataKeyError>;

    /// Decrypt `ciphertext`, returning the plaintext bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DataKeyError::Decryption`] if authentication fails or the input
    /// is malformed.
    fn decrypt_data(&self, ciphertext: &[u8]) -> Result<Vec<u8>, DataKeyError>;
}
