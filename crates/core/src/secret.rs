//! Redacted holder for access tokens and registry passwords.

use secrecy::{ExposeSecret, SecretString};

/// A secret string that never shows up in `Debug` or `Display` output.
#[derive(Clone)]
pub struct SecureToken {
    inner: SecretString,
}

impl SecureToken {
    /// Wrap a secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: SecretString::from(value.into()),
        }
    }

    /// Expose the secret value.
    ///
    /// Only hand the result straight to the execution backend; never log it.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.inner.expose_secret()
    }

    /// Check if the secret value is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.expose_secret().is_empty()
    }
}

impl std::fmt::Debug for SecureToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl std::fmt::Display for SecureToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecureToken {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
