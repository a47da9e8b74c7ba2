//! DEK (Data Encryption Key) collaborator contract.
//!
//! # Responsibilities
//!
//! - [`DataEncryptionKey`]: the encrypt/decrypt primitives bound to one
//!   `(key id, algorithm)` pair.
//! - [`DataEncryptionKeyProvider`]: resolves a key for a `(key id, algorithm)`
//!   pair, and is disposed exactly once by its owning encryptor.
//!
//! # Module invariants
//!
//! - **Interfaces only.** Nothing here implements a cipher, a key store, or key
//!   wrapping. Those are supplied by the embedding system.
//! - Providers own key lifetime. Encryptors receive a shared handle per call and
//!   never cache it.

pub mod key;
pub mod provider;

pub use key::DataEncryptionKey;
pub use provider::DataEncryptionKeyProvider;

#[cfg(test)]
pub use key::MockDataEncryptionKey;
#[cfg(test)]
pub use provider::MockDataEncryptionKeyProvider;
