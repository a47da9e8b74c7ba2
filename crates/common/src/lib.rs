//! Common types, envelope definitions, and errors shared across `field-encryption` crates.

pub mod algorithm;
pub mod error;
pub mod protocol;

pub use error::{DataKeyError, EncryptorError, KeyProviderError};
