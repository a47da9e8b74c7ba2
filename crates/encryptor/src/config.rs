//! Document encryption options and their loading from the environment.
//!
//! Variables are read with the `FIELD_ENCRYPTION_` prefix:
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `FIELD_ENCRYPTION_DATA_ENCRYPTION_KEY_ID` | `data_encryption_key_id` | required |
//! | `FIELD_ENCRYPTION_ENCRYPTION_ALGORITHM` | `encryption_algorithm` | `AEAD_AES_256_CBC_HMAC_SHA256` |
//! | `FIELD_ENCRYPTION_PATHS_TO_ENCRYPT` | `paths_to_encrypt` (comma-separated) | required |

use std::collections::HashSet;

use anyhow::{Context, Result};
use common::{algorithm, protocol::ENVELOPE_PROPERTY};
use serde::Deserialize;
use tracing::warn;

/// Prefix shared by all environment variables read by [`EncryptionOptions::from_env`].
pub const ENV_PREFIX: &str = "FIELD_ENCRYPTION";

/// Top-level property that identifies a document and therefore stays readable.
const ID_PROPERTY: &str = "id";

/// Which key, algorithm, and document paths to use when encrypting.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EncryptionOptions {
    /// Identifier handed to the key provider. **Required.**
    pub data_encryption_key_id: String,

    /// Algorithm identifier handed to the key provider.
    #[serde(default = "default_encryption_algorithm")]
    pub encryption_algorithm: String,

    /// Dot-notation paths to encrypt, e.g. `"ssn"`, `"user.address.zip"`,
    /// `"orders[].card_number"`. **Required.**
    pub paths_to_encrypt: Vec<String>,
}

fn default_encryption_algorithm() -> String {
    algorithm::AEAD_AES_256_CBC_HMAC_SHA256.into()
}

impl EncryptionOptions {
    /// Build options directly, using the default algorithm.
    pub fn new<I, S>(data_encryption_key_id: impl Into<String>, paths_to_encrypt: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            data_encryption_key_id: data_encryption_key_id.into(),
            encryption_algorithm: default_encryption_algorithm(),
            paths_to_encrypt: paths_to_encrypt.into_iter().map(Into::into).collect(),
        }
    }

    /// Replace the algorithm identifier.
    pub fn with_algorithm(mut self, encryption_algorithm: impl Into<String>) -> Self {
        self.encryption_algorithm = encryption_algorithm.into();
        self
    }

    /// Load and validate options from `FIELD_ENCRYPTION_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or the options are invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_env_prefixed(ENV_PREFIX)
    }

    fn from_env_prefixed(prefix: &str) -> Result<Self> {
        let cfg = ::config::Config::builder()
            .add_source(
                ::config::Environment::with_prefix(prefix)
                    .list_separator(",")
                    .with_list_parse_key("paths_to_encrypt"),
            )
            .build()
            .context("failed to build encryption options from environment")?;

        let opts: EncryptionOptions = cfg
            .try_deserialize()
            .context("failed to deserialise encryption options")?;

        opts.validate()?;
        if !algorithm::is_known(&opts.encryption_algorithm) {
            warn!(
                algorithm = %opts.encryption_algorithm,
                "encryption algorithm is not a well-known identifier; passing through to provider"
            );
        }
        Ok(opts)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the key id or algorithm is empty, if no paths are
    /// given, or if any path is empty, targets a reserved property, repeats, or
    /// lies inside another listed path.
    pub fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.data_encryption_key_id, "DATA_ENCRYPTION_KEY_ID")?;
        ensure_non_empty(&self.encryption_algorithm, "ENCRYPTION_ALGORITHM")?;

        if self.paths_to_encrypt.is_empty() {
            anyhow::bail!("PATHS_TO_ENCRYPT must list at least one path");
        }

        let mut seen = HashSet::new();
        for path in &self.paths_to_encrypt {
            validate_path(path)?;
            if !seen.insert(path.as_str()) {
                anyhow::bail!("path `{path}` is listed more than once");
            }
        }

        for outer in &self.paths_to_encrypt {
            for inner in &self.paths_to_encrypt {
                if is_nested_within(inner, outer) {
                    anyhow::bail!("path `{inner}` lies inside path `{outer}`");
                }
            }
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<()> {
    if path.trim().is_empty() {
        anyhow::bail!("paths must not be empty");
    }
    for segment in path.split('.') {
        let name = segment.trim_end_matches("[]");
        if name.is_empty() {
            anyhow::bail!("path `{path}` contains an empty segment");
        }
    }
    let root = path
        .split('.')
        .next()
        .map(|s| s.trim_end_matches("[]"))
        .unwrap_or_default();
    if root == ID_PROPERTY || root == ENVELOPE_PROPERTY {
        anyhow::bail!("path `{path}` targets reserved property `{root}`");
    }
    Ok(())
}

/// `true` if `inner` addresses a value strictly below `outer`.
fn is_nested_within(inner: &str, outer: &str) -> bool {
    inner
        .strip_prefix(outer)
        .is_some_and(|rest| rest.starts_with('.') || rest.starts_with("[]"))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Log sink shared between a test and the subscriber it installs.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn valid() -> EncryptionOptions {
        EncryptionOptions::new("dek1", ["ssn", "orders[].card_number"])
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_encryption_algorithm(), "AEAD_AES_256_CBC_HMAC_SHA256");
        assert_eq!(valid().encryption_algorithm, default_encryption_algorithm());
    }

    #[test]
    fn valid_options_pass() {
        assert!(valid().validate().is_ok());
        assert!(valid().with_algorithm("custom-alg").validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_key_id() {
        let opts = EncryptionOptions::new(" ", ["ssn"]);
        assert!(opts.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_algorithm() {
        assert!(valid().with_algorithm("").validate().is_err());
    }

    #[test]
    fn validate_rejects_no_paths() {
        let opts = EncryptionOptions::new("dek1", Vec::<String>::new());
        assert!(opts.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_segments() {
        for bad in ["", "user..zip", ".ssn", "orders[]."] {
            let opts = EncryptionOptions::new("dek1", [bad]);
            assert!(opts.validate().is_err(), "expected `{bad}` to be rejected");
        }
    }

    #[test]
    fn validate_rejects_reserved_roots() {
        for bad in ["id", "_encryption", "_encryption.paths"] {
            let opts = EncryptionOptions::new("dek1", [bad]);
            assert!(opts.validate().is_err(), "expected `{bad}` to be rejected");
        }
        // Nested `id` properties are ordinary data.
        assert!(EncryptionOptions::new("dek1", ["user.id"]).validate().is_ok());
    }

    #[test]
    fn validate_checks_roots_behind_repeated_array_suffixes() {
        assert!(EncryptionOptions::new("dek1", ["id[][]"]).validate().is_err());
        assert!(EncryptionOptions::new("dek1", ["[][].ssn"]).validate().is_err());
        assert!(EncryptionOptions::new("dek1", ["matrix[][]"]).validate().is_ok());
    }

    #[test]
    fn validate_rejects_duplicates() {
        let opts = EncryptionOptions::new("dek1", ["ssn", "ssn"]);
        assert!(opts.validate().is_err());
    }

    #[test]
    fn validate_rejects_nested_paths() {
        let opts = EncryptionOptions::new("dek1", ["user", "user.address.zip"]);
        assert!(opts.validate().is_err());
        let opts = EncryptionOptions::new("dek1", ["orders", "orders[].card_number"]);
        assert!(opts.validate().is_err());
        // Shared prefixes that are not path boundaries are fine.
        let opts = EncryptionOptions::new("dek1", ["user", "username"]);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn from_env_loads_lists_and_defaults() {
        let prefix = "FIELD_ENCRYPTION_TEST_LOAD";
        std::env::set_var(format!("{prefix}_DATA_ENCRYPTION_KEY_ID"), "customer-dek");
        std::env::set_var(
            format!("{prefix}_PATHS_TO_ENCRYPT"),
            "ssn,orders[].card_number",
        );

        let opts = EncryptionOptions::from_env_prefixed(prefix).unwrap();
        assert_eq!(opts.data_encryption_key_id, "customer-dek");
        assert_eq!(opts.encryption_algorithm, default_encryption_algorithm());
        assert_eq!(opts.paths_to_encrypt, vec!["ssn", "orders[].card_number"]);
    }

    #[test]
    fn from_env_keeps_numeric_looking_values_verbatim() {
        let prefix = "FIELD_ENCRYPTION_TEST_VERBATIM";
        std::env::set_var(format!("{prefix}_DATA_ENCRYPTION_KEY_ID"), "007");
        std::env::set_var(format!("{prefix}_ENCRYPTION_ALGORITHM"), "1.50");
        std::env::set_var(format!("{prefix}_PATHS_TO_ENCRYPT"), "ssn");

        let opts = EncryptionOptions::from_env_prefixed(prefix).unwrap();
        assert_eq!(opts.data_encryption_key_id, "007");
        assert_eq!(opts.encryption_algorithm, "1.50");
        assert_eq!(opts.paths_to_encrypt, vec!["ssn"]);
    }

    #[test]
    fn from_env_overrides_algorithm() {
        let prefix = "FIELD_ENCRYPTION_TEST_ALGORITHM";
        std::env::set_var(format!("{prefix}_DATA_ENCRYPTION_KEY_ID"), "customer-dek");
        std::env::set_var(
            format!("{prefix}_ENCRYPTION_ALGORITHM"),
            algorithm::MDE_AEAD_AES_256_CBC_HMAC_256_RANDOMIZED,
        );
        std::env::set_var(format!("{prefix}_PATHS_TO_ENCRYPT"), "ssn");

        let opts = EncryptionOptions::from_env_prefixed(prefix).unwrap();
        assert_eq!(
            opts.encryption_algorithm,
            algorithm::MDE_AEAD_AES_256_CBC_HMAC_256_RANDOMIZED
        );
    }

    #[test]
    fn from_env_warns_on_unknown_algorithm() {
        let prefix = "FIELD_ENCRYPTION_TEST_UNKNOWN_ALG";
        std::env::set_var(format!("{prefix}_DATA_ENCRYPTION_KEY_ID"), "customer-dek");
        std::env::set_var(format!("{prefix}_ENCRYPTION_ALGORITHM"), "vendor-alg");
        std::env::set_var(format!("{prefix}_PATHS_TO_ENCRYPT"), "ssn");

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(logs.clone())
            .finish();
        let opts = tracing::subscriber::with_default(subscriber, || {
            EncryptionOptions::from_env_prefixed(prefix)
        })
        .unwrap();

        assert_eq!(opts.encryption_algorithm, "vendor-alg");
        let output = logs.contents();
        assert!(output.contains("WARN"), "missing warning in: {output}");
        assert!(output.contains("vendor-alg"), "missing algorithm in: {output}");
    }

    #[test]
    fn from_env_requires_key_id() {
        let prefix = "FIELD_ENCRYPTION_TEST_MISSING";
        std::env::set_var(format!("{prefix}_PATHS_TO_ENCRYPT"), "ssn");
        assert!(EncryptionOptions::from_env_prefixed(prefix).is_err());
    }
}
