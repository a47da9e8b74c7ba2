//! Well-known encryption algorithm identifiers.
//!
//! The encryptor treats algorithm names as opaque strings and hands them to the
//! key provider unchanged. These constants exist so callers and providers agree
//! on spelling.

/// AEAD using AES-256-CBC with HMAC-SHA256, randomised.
pub const AEAD_AES_256_CBC_HMAC_SHA256: &str = "AEAD_AES_256_CBC_HMAC_SHA256";

/// AEAD using AES-256-CBC with HMAC-SHA256, randomised, with the newer key format.
pub const MDE_AEAD_AES_256_CBC_HMAC_256_RANDOMIZED: &str = "MdeAeadAes256CbcHmac256Randomized";

/// All identifiers above, in declaration order.
pub const KNOWN: &[&str] = &[
    AEAD_AES_256_CBC_HMAC_SHA256,
    MDE_AEAD_AES_256_CBC_HMAC_256_RANDOMIZED,
];

/// Returns `true` if `name` is one of the [`KNOWN`] identifiers.
pub fn is_known(name: &str) -> bool {
    KNOWN.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_identifiers() {
        assert!(is_known("AEAD_AES_256_CBC_HMAC_SHA256"));
        assert!(is_known(MDE_AEAD_AES_256_CBC_HMAC_256_RANDOMIZED));
        assert!(!is_known("aead_aes_256_cbc_hmac_sha256"));
    }
}
