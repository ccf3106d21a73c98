use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("user not found")]
    NotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    async fn resolve_by_id(&self, user_id: UserId) -> Result<User, DirectoryError>;

    /// Unknown usernames and wrong passwords both yield `InvalidCredentials`.
    async fn resolve_by_credentials(&self, credentials: &Credentials)
    -> Result<User, DirectoryError>;
}
