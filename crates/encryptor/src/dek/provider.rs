//! [`DataEncryptionKeyProvider`]: resolves keys for the encryptor.

use std::sync::Arc;

use async_trait::async_trait;
use common::KeyProviderError;
use tokio_util::sync::CancellationToken;

use super::DataEncryptionKey;

/// Resolves data encryption keys by identifier and algorithm.
///
/// A provider is where caching, unwrapping of wrapped keys, rotation, and
/// revocation live. It must tolerate concurrent fetches: the encryptor calls
/// [`fetch_data_encryption_key`](Self::fetch_data_encryption_key) once per
/// encrypt/decrypt and never serialises those calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataEncryptionKeyProvider: Send + Sync {
    /// Fetch the key for `dek_id` under `algorithm`.
    ///
    /// `cancel` is the caller's token, passed through unchanged. Timeouts are
    /// the provider's own concern.
    ///
    /// Returning `Ok(None)` means the provider has no usable key. The encryptor
    /// treats that as a fatal contract violation, not a retryable condition.
    ///
    /// # Errors
    ///
    /// Returns [`KeyProviderError`] for lookup, access, or transport failures.
    async fn fetch_data_encryption_key(
        &self,
        dek_id: &str,
        algorithm: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Arc<dyn DataEncryptionKey>>, KeyProviderError>;

    /// Release any resources held by the provider.
    ///
    /// Called exactly once by the owning encryptor when it is disposed.
    fn dispose(&self) {}
}

#[async_trait]
impl<P> DataEncryptionKeyProvider for Box<P>
where
    P: DataEncryptionKeyProvider + ?Sized,
{
    async fn fetch_data_encryption_key(
        &self,
        dek_id: &str,
        algorithm: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Arc<dyn DataEncryptionKey>>, KeyProviderError> {
        (**self)
            .fetch_data_encryption_key(dek_id, algorithm, cancel)
            .await
    }

    fn dispose(&self) {
        (**self).dispose()
    }
}
