use crate::domain_model::*;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record for the user: never stored, deleted or expired.
    #[error("auth data not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// One auth-data record per user, expiring after `ttl`.
///
/// The stored pair is the authority on which tokens are current: overwriting
/// or deleting it revokes every token issued before.
#[async_trait::async_trait]
pub trait RevocationStore: Send + Sync {
    /// Unconditionally replaces any record held for `user_id`.
    async fn put(&self, user_id: UserId, pair: &TokenPair, ttl: Duration)
    -> Result<(), StoreError>;

    /// A record that fails to deserialize is reported as `Unavailable`.
    async fn get(&self, user_id: UserId) -> Result<TokenPair, StoreError>;

    /// Idempotent; deleting an absent record succeeds.
    async fn delete(&self, user_id: UserId) -> Result<(), StoreError>;
}
