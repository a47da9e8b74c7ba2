//! [`ProviderEncryptor`]: resolves a DEK through a provider on every call.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use common::EncryptorError;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::Encryptor;
use crate::dek::{DataEncryptionKey, DataEncryptionKeyProvider};

/// Encryptor that owns a [`DataEncryptionKeyProvider`] and delegates every
/// operation to the key it resolves.
///
/// The provider handle lives in an [`ArcSwapOption`] so that:
/// - Concurrent operations load it without locking.
/// - [`dispose`](Self::dispose) atomically takes it out, which makes disposal
///   idempotent and guarantees the provider's own `dispose` runs once.
///
/// Operations already in flight keep their own handle and finish against it;
/// disposal does not wait for them.
///
/// Dropping the encryptor disposes it.
pub struct ProviderEncryptor<P: DataEncryptionKeyProvider> {
    provider: ArcSwapOption<P>,
}

impl<P: DataEncryptionKeyProvider> ProviderEncryptor<P> {
    /// Create an encryptor that takes ownership of `provider`.
    pub fn new(provider: P) -> Self {
        Self {
            provider: ArcSwapOption::from_pointee(provider),
        }
    }

    /// The owned provider, or `None` once disposed.
    pub fn data_encryption_key_provider(&self) -> Option<Arc<P>> {
        self.provider.load_full()
    }

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.provider.load().is_none()
    }

    /// Release the provider and mark this encryptor permanently inactive.
    ///
    /// The first call invokes the provider's `dispose` hook and drops this
    /// encryptor's handle; later calls are no-ops.
    pub fn dispose(&self) {
        if let Some(provider) = self.provider.swap(None) {
            provider.dispose();
            debug!("encryptor disposed");
        }
    }

    async fn resolve_key(
        &self,
        dek_id: &str,
        algorithm: &str,
        cancel: &CancellationToken,
    ) -> Result<Arc<dyn DataEncryptionKey>, EncryptorError> {
        let provider = self
            .provider
            .load_full()
            .ok_or(EncryptorError::InvalidState)?;

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(EncryptorError::Cancelled),
            result = provider.fetch_data_encryption_key(dek_id, algorithm, cancel) => result?,
        };

        let key = fetched.ok_or_else(|| EncryptorError::KeyResolution {
            dek_id: dek_id.to_owned(),
            algorithm: algorithm.to_owned(),
        })?;
        debug!(dek_id, algorithm, "data encryption key resolved");
        Ok(key)
    }
}

#[async_trait]
impl<P: DataEncryptionKeyProvider> Encryptor for ProviderEncryptor<P> {
    async fn encrypt(
        &self,
        plaintext: &[u8],
        dek_id: &str,
        algorithm: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, EncryptorError> {
        let key = self.resolve_key(dek_id, algorithm, cancel).await?;
        Ok(key.encrypt_data(plaintext)?)
    }

    async fn decrypt(
        &self,
        ciphertext: &[u8],
        dek_id: &str,
        algorithm: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, EncryptorError> {
        let key = self.resolve_key(dek_id, algorithm, cancel).await?;
        Ok(key.decrypt_data(ciphertext)?)
    }
}

impl<P: DataEncryptionKeyProvider> Drop for ProviderEncryptor<P> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<P: DataEncryptionKeyProvider> std::fmt::Debug for ProviderEncryptor<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEncryptor")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
