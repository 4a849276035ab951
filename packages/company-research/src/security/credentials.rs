//! Credential handling with secure memory.
//!
//! Uses the `secrecy` crate to keep API keys out of logs and debug output.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    /// Create a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the secret value. Only call this when building a request.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Language-model credentials. A missing key is a normal state: the
/// selector degrades and the research loop reports "no research".
#[derive(Clone)]
pub struct LlmCredentials {
    /// API key (secret), `None` when not configured
    pub api_key: Option<SecretString>,

    /// Default model identifier
    pub model: String,

    /// API base URL override
    pub base_url: Option<String>,
}

impl LlmCredentials {
    /// Credentials with a key.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecretString::new(api_key)),
            model: model.into(),
            base_url: None,
        }
    }

    /// Credentials without a key.
    pub fn unconfigured(model: impl Into<String>) -> Self {
        Self {
            api_key: None,
            model: model.into(),
            base_url: None,
        }
    }

    /// Build from an optional key, treating blank keys as absent.
    pub fn from_optional(api_key: Option<String>, model: impl Into<String>) -> Self {
        match api_key.filter(|k| !k.trim().is_empty()) {
            Some(key) => Self::new(key, model),
            None => Self::unconfigured(model),
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Whether an API key is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl fmt::Debug for LlmCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmCredentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}
