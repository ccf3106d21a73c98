use super::UserId;
use serde::{Deserialize, Serialize};

/// An access/refresh token pair. This is also the record persisted per user
/// in the revocation store, so its JSON shape is a storage format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    /// Unix seconds; mirrors the access token's expiry.
    pub expires_at: i64,
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenClaims {
    #[serde(rename = "userID")]
    pub user_id: UserId,
    pub role: String,
    pub expires_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenClaims {
    #[serde(rename = "userID")]
    pub user_id: UserId,
    pub expires_at: i64,
}

/// Per-deployment prefix of revocation store keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPrefix(String);

impl KeyPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        KeyPrefix(prefix.into())
    }

    pub fn key_for(&self, user_id: UserId) -> String {
        format!("{}{}", self.0, user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Health {
    pub version: String,
    pub storage: bool,
    pub security: bool,
}
