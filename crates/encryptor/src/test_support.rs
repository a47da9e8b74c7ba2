//! Test doubles shared by unit tests across modules.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use common::{DataKeyError, KeyProviderError};
use tokio_util::sync::CancellationToken;

use crate::dek::{DataEncryptionKey, DataEncryptionKeyProvider};

/// Route `tracing` output through the test harness's captured stdout.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Repeating-key XOR. Symmetric, so encrypt and decrypt are the same operation.
#[derive(Debug, Clone)]
pub struct XorKey {
    pad: Vec<u8>,
}

impl XorKey {
    pub fn new(pad: Vec<u8>) -> Self {
        assert!(!pad.is_empty(), "xor pad must not be empty");
        Self { pad }
    }

    fn apply(&self, input: &[u8]) -> Vec<u8> {
        input
            .iter()
            .zip(self.pad.iter().cycle())
            .map(|(b, k)| b ^ k)
            .collect()
    }
}

impl DataEncryptionKey for XorKey {
    fn encrypt_data(&self, plaintext: &[u8]) -> Result<Vec<u8>, DataKeyError> {
        Ok(self.apply(plaintext))
    }

    fn decrypt_data(&self, ciphertext: &[u8]) -> Result<Vec<u8>, DataKeyError> {
        Ok(self.apply(ciphertext))
    }
}

/// Provider backed by a fixed `(dek_id, algorithm)` map. Counts fetches and disposals.
#[derive(Default)]
pub struct StaticKeyProvider {
    keys: HashMap<(String, String), Arc<dyn DataEncryptionKey>>,
    pub fetches: Arc<AtomicUsize>,
    pub disposals: Arc<AtomicUsize>,
}

impl StaticKeyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(
        mut self,
        dek_id: &str,
        algorithm: &str,
        key: impl DataEncryptionKey + 'static,
    ) -> Self {
        self.keys
            .insert((dek_id.to_owned(), algorithm.to_owned()), Arc::new(key));
        self
    }
}

#[async_trait]
impl DataEncryptionKeyProvider for StaticKeyProvider {
    async fn fetch_data_encryption_key(
        &self,
        dek_id: &str,
        algorithm: &str,
        _cancel: &CancellationToken,
    ) -> Result<Option<Arc<dyn DataEncryptionKey>>, KeyProviderError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .keys
            .get(&(dek_id.to_owned(), algorithm.to_owned()))
            .cloned())
    }

    fn dispose(&self) {
        self.disposals.fetch_add(1, Ordering::SeqCst);
    }
}

/// Provider whose fetch never completes, ignoring its token.
pub struct PendingProvider;

#[async_trait]
impl DataEncryptionKeyProvider for PendingProvider {
    async fn fetch_data_encryption_key(
        &self,
        _dek_id: &str,
        _algorithm: &str,
        _cancel: &CancellationToken,
    ) -> Result<Option<Arc<dyn DataEncryptionKey>>, KeyProviderError> {
        std::future::pending().await
    }
}
