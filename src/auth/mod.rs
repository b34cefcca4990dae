//! Authentication module for the PluralKit client.
//!
//! PluralKit authenticates with a system token sent verbatim in the
//! `Authorization` header (no scheme prefix). Public data can be read
//! without one.

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;

use crate::errors::PluralKitError;

/// Authentication provider trait.
pub trait AuthProvider: Send + Sync {
    /// Apply authentication to request headers.
    fn apply_auth(&self, headers: &mut HashMap<String, String>);

    /// Validate the credentials.
    fn validate(&self) -> Result<(), PluralKitError>;
}

/// System token authentication.
pub struct TokenAuth {
    token: SecretString,
}

impl TokenAuth {
    /// Creates a new token provider.
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }

    /// Creates from a string token.
    pub fn from_string(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::new(token.into()),
        }
    }

    /// Gets a hint of the token for debugging (last 4 characters).
    pub fn token_hint(&self) -> String {
        let token = self.token.expose_secret();
        match token.char_indices().rev().nth(3) {
            Some((idx, _)) if token.len() > 4 => format!("...{}", &token[idx..]),
            _ => "****".to_string(),
        }
    }
}

impl AuthProvider for TokenAuth {
    fn apply_auth(&self, headers: &mut HashMap<String, String>) {
        headers.insert(
            "Authorization".to_string(),
            self.token.expose_secret().clone(),
        );
    }

    fn validate(&self) -> Result<(), PluralKitError> {
        if self.token.expose_secret().trim().is_empty() {
            return Err(PluralKitError::Authentication {
                message: "Token cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for TokenAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuth")
            .field("token", &"[REDACTED]")
            .field("token_hint", &self.token_hint())
            .finish()
    }
}

/// Provider used when no token is configured; sends no credentials.
#[derive(Debug, Default)]
pub struct NoAuth;

impl AuthProvider for NoAuth {
    fn apply_auth(&self, _headers: &mut HashMap<String, String>) {}

    fn validate(&self) -> Result<(), PluralKitError> {
        Ok(())
    }
}
