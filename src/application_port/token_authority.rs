use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token invalid")]
    Invalid,
    #[error("signing error: {0}")]
    Signing(String),
}

/// Signs and verifies access/refresh tokens.
///
/// A successful parse only proves the token was issued here; whether it is
/// still current is decided against the revocation store.
pub trait TokenAuthority: Send + Sync {
    /// Issues a pair for `user` with expiries counted from `now`.
    fn issue(&self, user: &User, now: DateTime<Utc>) -> Result<TokenPair, TokenError>;

    /// Fails with `Invalid` on a bad signature, malformed structure, wrong
    /// token kind or past expiry.
    fn parse_access(&self, token: &str) -> Result<AccessTokenClaims, TokenError>;

    fn parse_refresh(&self, token: &str) -> Result<RefreshTokenClaims, TokenError>;

    fn key_for(&self, user_id: UserId) -> String;
}
