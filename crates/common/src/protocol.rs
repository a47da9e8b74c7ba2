//! Envelope stored inside documents whose fields have been encrypted.
//!
//! The envelope lives under the reserved top-level property
//! [`ENVELOPE_PROPERTY`] and records everything needed to decrypt the
//! document again, so readers need no out-of-band options.

use serde::{Deserialize, Serialize};

/// Reserved top-level document property holding the [`EncryptionProperties`].
pub const ENVELOPE_PROPERTY: &str = "_encryption";

/// Envelope format written by this version of the library.
pub const FORMAT_VERSION: u32 = 1;

/// Describes how a document's fields were encrypted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionProperties {
    /// Envelope format version; see [`FORMAT_VERSION`].
    pub format_version: u32,
    /// Algorithm identifier handed to the key provider.
    pub algorithm: String,
    /// Data encryption key identifier handed to the key provider.
    pub dek_id: String,
    /// Dot-notation paths whose values were replaced by ciphertext.
    pub paths: Vec<String>,
}

impl EncryptionProperties {
    /// Construct an envelope at the current [`FORMAT_VERSION`].
    pub fn new(
        algorithm: impl Into<String>,
        dek_id: impl Into<String>,
        paths: Vec<String>,
    ) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            algorithm: algorithm.into(),
            dek_id: dek_id.into(),
            paths,
        }
    }
}
