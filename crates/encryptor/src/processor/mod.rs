//! Field-level encryption of JSON documents.
//!
//! [`encrypt_document`] replaces the values at the configured paths with
//! base64url ciphertext and records an [`EncryptionProperties`] envelope under
//! the reserved `_encryption` property. [`decrypt_document`] reads that
//! envelope back, so readers need only an [`Encryptor`], not the original
//! options.
//!
//! Each value is serialised to JSON before encryption, so numbers, booleans,
//! objects, and arrays come back with their original type. `null` values are
//! left in place.
//!
//! Both operations work on a copy and only write the document back on success:
//! a failed call leaves the caller's document untouched.

mod path;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use common::protocol::{EncryptionProperties, ENVELOPE_PROPERTY, FORMAT_VERSION};
use common::EncryptorError;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use self::path::{parse_path, resolve_pointers};
use crate::config::EncryptionOptions;
use crate::encryptor::Encryptor;

/// Errors produced while encrypting or decrypting a document.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The supplied [`EncryptionOptions`] failed validation.
    #[error("invalid encryption options: {0:#}")]
    InvalidOptions(anyhow::Error),

    /// Only JSON objects can carry an envelope.
    #[error("document must be a JSON object")]
    NotAnObject,

    /// The document already has an `_encryption` envelope.
    #[error("document is already encrypted")]
    AlreadyEncrypted,

    /// The `_encryption` property could not be parsed.
    #[error("malformed encryption envelope: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    /// The envelope was written by an unknown format version.
    #[error("unsupported envelope format version {0}")]
    UnsupportedFormatVersion(u32),

    /// A value recorded as encrypted is not a base64url string.
    #[error("value at `{path}` is not valid ciphertext")]
    InvalidEncryptedValue { path: String },

    /// The encryptor failed.
    #[error(transparent)]
    Encryptor(#[from] EncryptorError),

    /// A value could not be serialised, or decrypted bytes were not valid JSON.
    #[error("JSON serialisation failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Encrypt the values at `options.paths_to_encrypt` in `document`.
///
/// Paths that are missing from the document, or resolve only to `null`, are
/// skipped and left out of the envelope. If nothing was encrypted, no envelope
/// is written.
///
/// # Errors
///
/// Returns [`ProcessorError::InvalidOptions`] if `options` fail validation,
/// [`ProcessorError::NotAnObject`] or [`ProcessorError::AlreadyEncrypted`] for
/// unsuitable documents, and [`ProcessorError::Encryptor`] if any field fails
/// to encrypt.
pub async fn encrypt_document<E>(
    encryptor: &E,
    document: &mut Value,
    options: &EncryptionOptions,
    cancel: &CancellationToken,
) -> Result<(), ProcessorError>
where
    E: Encryptor + ?Sized,
{
    options.validate().map_err(ProcessorError::InvalidOptions)?;
    let root = document.as_object().ok_or(ProcessorError::NotAnObject)?;
    if root.contains_key(ENVELOPE_PROPERTY) {
        return Err(ProcessorError::AlreadyEncrypted);
    }

    let mut working = document.clone();
    let mut encrypted_paths = Vec::new();
    let mut fields = 0usize;

    for path in &options.paths_to_encrypt {
        let pointers = resolve_pointers(&working, &parse_path(path));
        if pointers.is_empty() {
            continue;
        }
        for pointer in &pointers {
            let Some(slot) = working.pointer_mut(pointer) else {
                continue;
            };
            let plaintext = serde_json::to_vec(&*slot)?;
            let ciphertext = encryptor
                .encrypt(
                    &plaintext,
                    &options.data_encryption_key_id,
                    &options.encryption_algorithm,
                    cancel,
                )
                .await?;
            *slot = Value::String(URL_SAFE_NO_PAD.encode(ciphertext));
            fields += 1;
        }
        encrypted_paths.push(path.clone());
    }

    if !encrypted_paths.is_empty() {
        let envelope = EncryptionProperties::new(
            options.encryption_algorithm.clone(),
            options.data_encryption_key_id.clone(),
            encrypted_paths,
        );
        if let Value::Object(map) = &mut working {
            map.insert(ENVELOPE_PROPERTY.to_owned(), serde_json::to_value(&envelope)?);
        }
    }

    debug!(fields, "document encrypted");
    *document = working;
    Ok(())
}

/// Decrypt a document previously produced by [`encrypt_document`].
///
/// Returns the removed envelope, or `None` if the document carried no envelope
/// (in which case it is left unchanged).
///
/// # Errors
///
/// Returns [`ProcessorError::MalformedEnvelope`] or
/// [`ProcessorError::UnsupportedFormatVersion`] for unreadable envelopes,
/// [`ProcessorError::InvalidEncryptedValue`] if a recorded path holds something
/// other than ciphertext, and [`ProcessorError::Encryptor`] if decryption fails.
pub async fn decrypt_document<E>(
    encryptor: &E,
    document: &mut Value,
    cancel: &CancellationToken,
) -> Result<Option<EncryptionProperties>, ProcessorError>
where
    E: Encryptor + ?Sized,
{
    let root = document.as_object().ok_or(ProcessorError::NotAnObject)?;
    let Some(raw_envelope) = root.get(ENVELOPE_PROPERTY) else {
        return Ok(None);
    };
    let envelope: EncryptionProperties = serde_json::from_value(raw_envelope.clone())
        .map_err(ProcessorError::MalformedEnvelope)?;
    if envelope.format_version != FORMAT_VERSION {
        return Err(ProcessorError::UnsupportedFormatVersion(
            envelope.format_version,
        ));
    }

    let mut working = document.clone();
    if let Value::Object(map) = &mut working {
        map.remove(ENVELOPE_PROPERTY);
    }

    let mut fields = 0usize;
    for path in &envelope.paths {
        for pointer in resolve_pointers(&working, &parse_path(path)) {
            let Some(slot) = working.pointer_mut(&pointer) else {
                continue;
            };
            let ciphertext = slot
                .as_str()
                .and_then(|encoded| URL_SAFE_NO_PAD.decode(encoded).ok())
                .ok_or_else(|| ProcessorError::InvalidEncryptedValue { path: path.clone() })?;
            let plaintext = encryptor
                .decrypt(&ciphertext, &envelope.dek_id, &envelope.algorithm, cancel)
                .await?;
            *slot = serde_json::from_slice(&plaintext)?;
            fields += 1;
        }
    }

    debug!(fields, "document decrypted");
    *document = working;
    Ok(Some(envelope))
}
