use crate::domain_model::*;

/// Request-level failures. Downstream faults are always folded into one of
/// the `Internal*` kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid access token")]
    InvalidAccessToken,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("not found")]
    NotFound,
    #[error("internal storage error")]
    InternalStorage,
    #[error("internal security error")]
    InternalSecurity,
}

#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    async fn check_health(&self) -> Health;

    async fn login(&self, credentials: Credentials) -> Result<TokenPair, SessionError>;

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, SessionError>;

    async fn validate_access(&self, access_token: &str)
    -> Result<AccessTokenClaims, SessionError>;

    async fn get_user(&self, user_id: UserId) -> Result<User, SessionError>;

    async fn logout(&self, user_id: UserId) -> Result<(), SessionError>;
}
