//! Session handle for authenticated cart calls.
//!
//! The surrounding application owns the session lifecycle: it creates a
//! [`Session`] after login and drops it on logout. Catalog reads never need
//! one; every cart read or write takes an `Option<&Session>`, and `None`
//! means nobody is logged in.

use secrecy::{ExposeSecret, SecretString};

use crate::config::SessionConfig;

/// An authenticated storefront session.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct Session {
    token: SecretString,
    username: Option<String>,
}

impl Session {
    /// Create a session from the bearer token returned on login.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            username: None,
        }
    }

    /// Attach the display name of the logged-in user.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Display name of the logged-in user, if known.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Value for the `Authorization` header.
    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }
}

impl From<&SessionConfig> for Session {
    fn from(config: &SessionConfig) -> Self {
        Self {
            token: config.token.clone(),
            username: config.username.clone(),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("username", &self.username)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header_value() {
        let session = Session::new("abc.def.ghi");
        assert_eq!(session.bearer(), "Bearer abc.def.ghi");
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new("abc.def.ghi").with_username("crio.do");
        let debug_output = format!("{session:?}");
        assert!(debug_output.contains("crio.do"));
        assert!(!debug_output.contains("abc.def.ghi"));
    }
}
