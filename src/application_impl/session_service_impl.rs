use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

pub struct RealSessionService {
    user_directory: Arc<dyn UserDirectory>,
    token_authority: Arc<dyn TokenAuthority>,
    revocation_store: Arc<dyn RevocationStore>,
    storage_probe: Arc<dyn Liveness>,
    security_probe: Arc<dyn Liveness>,
    /// TTL of stored auth data; equals the refresh token lifetime.
    session_ttl: Duration,
}

impl RealSessionService {
    pub fn new(
        user_directory: Arc<dyn UserDirectory>,
        token_authority: Arc<dyn TokenAuthority>,
        revocation_store: Arc<dyn RevocationStore>,
        storage_probe: Arc<dyn Liveness>,
        security_probe: Arc<dyn Liveness>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            user_directory,
            token_authority,
            revocation_store,
            storage_probe,
            security_probe,
            session_ttl,
        }
    }

    /// Issues a fresh pair and makes it the only current one for the user.
    async fn start_session(&self, user: &User) -> Result<TokenPair, SessionError> {
        let pair = self
            .token_authority
            .issue(user, Utc::now())
            .map_err(|e| {
                error!(user_id = %user.id, error = %e, "issuing token pair");
                SessionError::InternalSecurity
            })?;

        self.revocation_store
            .put(user.id, &pair, self.session_ttl)
            .await
            .map_err(|e| {
                error!(
                    user_id = %user.id,
                    key = %self.token_authority.key_for(user.id),
                    error = %e,
                    "saving auth data"
                );
                SessionError::InternalSecurity
            })?;

        Ok(pair)
    }

    /// Reads the current pair, mapping a missing record to `stale`.
    async fn current_pair(
        &self,
        user_id: UserId,
        stale: SessionError,
    ) -> Result<TokenPair, SessionError> {
        match self.revocation_store.get(user_id).await {
            Ok(pair) => Ok(pair),
            Err(StoreError::NotFound) => {
                debug!(%user_id, "no current auth data");
                Err(stale)
            }
            Err(e) => {
                error!(
                    %user_id,
                    key = %self.token_authority.key_for(user_id),
                    error = %e,
                    "reading auth data"
                );
                Err(SessionError::InternalSecurity)
            }
        }
    }
}

#[async_trait::async_trait]
impl SessionService for RealSessionService {
    async fn check_health(&self) -> Health {
        let (storage, security) =
            tokio::join!(self.storage_probe.is_alive(), self.security_probe.is_alive());
        Health {
            version: env!("CARGO_PKG_VERSION").to_string(),
            storage,
            security,
        }
    }

    async fn login(&self, credentials: Credentials) -> Result<TokenPair, SessionError> {
        let user = self
            .user_directory
            .resolve_by_credentials(&credentials)
            .await
            .map_err(|e| match e {
                DirectoryError::InvalidCredentials | DirectoryError::NotFound => {
                    warn!(username = %credentials.username, "login rejected");
                    SessionError::InvalidCredentials
                }
                DirectoryError::Unavailable(e) => {
                    error!(username = %credentials.username, error = %e, "resolving credentials");
                    SessionError::InternalStorage
                }
            })?;

        let pair = self.start_session(&user).await?;
        info!(user_id = %user.id, "logged in");
        Ok(pair)
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, SessionError> {
        let claims = self
            .token_authority
            .parse_refresh(refresh_token)
            .map_err(|e| {
                warn!(error = %e, "parsing refresh token");
                SessionError::InvalidRefreshToken
            })?;

        if Utc::now().timestamp() > claims.expires_at {
            warn!(user_id = %claims.user_id, "refresh token expired");
            return Err(SessionError::InvalidRefreshToken);
        }

        let current = self
            .current_pair(claims.user_id, SessionError::InvalidRefreshToken)
            .await?;
        if current.refresh_token != refresh_token {
            warn!(user_id = %claims.user_id, "refresh token superseded");
            return Err(SessionError::InvalidRefreshToken);
        }

        let user = self
            .user_directory
            .resolve_by_id(claims.user_id)
            .await
            .map_err(|e| match e {
                DirectoryError::NotFound | DirectoryError::InvalidCredentials => {
                    warn!(user_id = %claims.user_id, "refresh token for unknown user");
                    SessionError::InvalidRefreshToken
                }
                DirectoryError::Unavailable(e) => {
                    error!(user_id = %claims.user_id, error = %e, "resolving user");
                    SessionError::InternalStorage
                }
            })?;

        let pair = self.start_session(&user).await?;
        info!(user_id = %user.id, "token pair rotated");
        Ok(pair)
    }

    async fn validate_access(
        &self,
        access_token: &str,
    ) -> Result<AccessTokenClaims, SessionError> {
        let claims = self
            .token_authority
            .parse_access(access_token)
            .map_err(|e| {
                debug!(error = %e, "parsing access token");
                SessionError::InvalidAccessToken
            })?;

        let current = self
            .current_pair(claims.user_id, SessionError::InvalidAccessToken)
            .await?;
        if current.access_token != access_token {
            warn!(user_id = %claims.user_id, "access token does not match stored");
            return Err(SessionError::InvalidAccessToken);
        }

        Ok(claims)
    }

    async fn get_user(&self, user_id: UserId) -> Result<User, SessionError> {
        self.user_directory
            .resolve_by_id(user_id)
            .await
            .map_err(|e| match e {
                DirectoryError::NotFound | DirectoryError::InvalidCredentials => {
                    warn!(%user_id, "user not found");
                    SessionError::NotFound
                }
                DirectoryError::Unavailable(e) => {
                    error!(%user_id, error = %e, "resolving user");
                    SessionError::InternalStorage
                }
            })
    }

    async fn logout(&self, user_id: UserId) -> Result<(), SessionError> {
        self.revocation_store.delete(user_id).await.map_err(|e| {
            error!(
                %user_id,
                key = %self.token_authority.key_for(user_id),
                error = %e,
                "deleting auth data"
            );
            SessionError::InternalSecurity
        })?;
        info!(%user_id, "logged out");
        Ok(())
    }
}
