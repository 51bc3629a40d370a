//! Session validation port for bearer token validation.
//!
//! Provider-agnostic: the HTTP middleware only needs an `AuthenticatedUser`
//! back, whatever issued the token.
//!
//! All implementations must validate signature, issuer, audience and expiry.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Validates access tokens and extracts user identity.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw token (without the `Bearer ` prefix).
    ///
    /// * `Err(AuthError::InvalidToken)` - malformed or bad signature
    /// * `Err(AuthError::TokenExpired)` - signature valid but expired
    /// * `Err(AuthError::MissingClaim)` - valid token without `sub` or `email`
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
