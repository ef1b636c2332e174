//! Credential value type

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Credential for a remote server.
///
/// Either a username/password pair or an identity (refresh) token, optionally
/// with a registry access token. [`Credential::EMPTY`] means "no credential".
/// Secret fields are zeroed when dropped and never shown by `Debug`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    password: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    refresh_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    access_token: String,
}

impl Credential {
    /// The empty credential, returned when nothing is stored for an address
    pub const EMPTY: Credential = Credential {
        username: String::new(),
        password: String::new(),
        refresh_token: String::new(),
        access_token: String::new(),
    };

    /// Create a username/password credential
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        let mut cred = Self::default();
        cred.username = username.into();
        cred.password = password.into();
        cred
    }

    /// Create an identity token credential
    pub fn identity_token(token: impl Into<String>) -> Self {
        Self::default().with_refresh_token(token)
    }

    /// Attach an identity (refresh) token
    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = token.into();
        self
    }

    /// Attach a registry access token
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = token.into();
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Get the password (use carefully)
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Get the identity token (use carefully)
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// Get the registry access token (use carefully)
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Check whether this is the empty credential
    pub fn is_empty(&self) -> bool {
        self.username.is_empty()
            && self.password.is_empty()
            && self.refresh_token.is_empty()
            && self.access_token.is_empty()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn redact(value: &str) -> &'static str {
            if value.is_empty() {
                ""
            } else {
                "[REDACTED]"
            }
        }

        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("access_token", &redact(&self.access_token))
            .finish()
    }
}
