// Rust guideline compliant 2026-03-01

//! Static-table adapter for the `Auth` port.
//!
//! Resolves bearer tokens against a fixed in-process table seeded at
//! startup. The registry only consumes "is this credential currently
//! valid"; swapping in a real identity provider means implementing `Auth`
//! against it and changing nothing else.

use domain::{Auth, AuthError, Principal};
use std::collections::HashMap;

/// `Auth` adapter backed by a fixed token table.
#[derive(Debug, Default)]
pub struct StaticTokenAuth {
    tokens: HashMap<String, Principal>,
}

impl StaticTokenAuth {
    /// Create an empty table; every credential is refused until tokens are
    /// registered via [`with_token`](Self::with_token).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `token` as a valid credential for the account `email`.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, email: impl Into<String>) -> Self {
        self.tokens
            .insert(token.into(), Principal { email: email.into() });
        self
    }
}

impl Auth for StaticTokenAuth {
    /// Look `credential` up in the table.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingCredential`] for an empty string and
    /// [`AuthError::InvalidCredential`] for an unknown token.
    async fn validate(&self, credential: &str) -> Result<Principal, AuthError> {
        if credential.is_empty() {
            return Err(AuthError::MissingCredential);
        }
        self.tokens
            .get(credential)
            .cloned()
            .ok_or(AuthError::InvalidCredential)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
