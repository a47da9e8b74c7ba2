//! Client-side field encryption for a database client.
//!
//! # Layers
//!
//! 1. [`dek`] defines the collaborator contract: a [`DataEncryptionKeyProvider`]
//!    resolves a [`DataEncryptionKey`] from a key id and algorithm name.
//! 2. [`encryptor`] exposes the [`Encryptor`] trait and [`ProviderEncryptor`],
//!    a thin facade that resolves the key on every call and delegates to its
//!    primitives. It performs no cryptography and caches nothing.
//! 3. [`processor`] encrypts and decrypts selected properties of JSON documents
//!    through any [`Encryptor`], configured by [`EncryptionOptions`].
//!
//! # Security invariants
//!
//! - Plaintext, ciphertext, and key material are never logged or traced.
//! - Key caching, unwrapping, and rotation belong to the provider.

pub mod config;
pub mod dek;
pub mod encryptor;
pub mod processor;

#[cfg(test)]
pub(crate) mod test_support;

pub use common::{algorithm, DataKeyError, EncryptorError, KeyProviderError};
pub use crate::config::EncryptionOptions;
pub use crate::dek::{DataEncryptionKey, DataEncryptionKeyProvider};
pub use crate::encryptor::{Encryptor, ProviderEncryptor};
pub use crate::processor::{decrypt_document, encrypt_document, ProcessorError};
pub use tokio_util::sync::CancellationToken;
