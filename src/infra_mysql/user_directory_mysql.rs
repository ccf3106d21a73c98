use crate::domain_model::*;
use crate::domain_port::*;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

// Verified against when the username is unknown, so both rejections cost one argon2 run.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| {
    let salt = SaltString::from_b64("d2FyZGVuLWR1bW15LXNhbHQ").ok()?;
    Argon2::default()
        .hash_password(b"warden-dummy-password", &salt)
        .ok()
        .map(|hash| hash.to_string())
});

async fn bounded<T>(
    timeout: Duration,
    op: impl Future<Output = Result<T, sqlx::Error>>,
) -> Result<T, DirectoryError> {
    match tokio::time::timeout(timeout, op).await {
        Ok(result) => result.map_err(|e| DirectoryError::Unavailable(e.to_string())),
        Err(_) => Err(DirectoryError::Unavailable(format!(
            "timed out after {:?}",
            timeout
        ))),
    }
}

pub struct MySqlUserDirectory {
    pool: MySqlPool,
    timeout: Duration,
}

impl MySqlUserDirectory {
    pub fn new(pool: MySqlPool, timeout: Duration) -> Self {
        MySqlUserDirectory { pool, timeout }
    }

    fn row_to_user(row: &MySqlRow) -> Result<User, DirectoryError> {
        let id: i64 = row
            .try_get("id")
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;
        let username: String = row
            .try_get("username")
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;
        let role: String = row
            .try_get("role")
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        Ok(User {
            id: UserId(id),
            username,
            role,
        })
    }

    fn verify_password(password: &str, password_hash: &str) -> Result<bool, DirectoryError> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| DirectoryError::Unavailable(format!("invalid PHC hash: {}", e)))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(DirectoryError::Unavailable(format!("verify error: {}", e))),
        }
    }

    /// Checks `password` against the stored hash, or against a dummy hash when
    /// no user matched.
    fn check_password(password: &str, password_hash: Option<&str>) -> Result<(), DirectoryError> {
        match password_hash {
            Some(hash) if Self::verify_password(password, hash)? => Ok(()),
            Some(_) => Err(DirectoryError::InvalidCredentials),
            None => {
                if let Some(dummy) = DUMMY_HASH.as_deref() {
                    let _ = Self::verify_password(password, dummy);
                }
                Err(DirectoryError::InvalidCredentials)
            }
        }
    }
}

#[async_trait::async_trait]
impl UserDirectory for MySqlUserDirectory {
    async fn resolve_by_id(&self, user_id: UserId) -> Result<User, DirectoryError> {
        let row_opt: Option<MySqlRow> = bounded(
            self.timeout,
            sqlx::query(
                r#"
SELECT id, username, role
FROM user
WHERE id = ? AND is_active = 1
"#,
            )
            .bind(user_id)
            .fetch_optional(&self.pool),
        )
        .await?;

        match row_opt {
            Some(row) => Self::row_to_user(&row),
            None => Err(DirectoryError::NotFound),
        }
    }

    async fn resolve_by_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<User, DirectoryError> {
        let row_opt: Option<MySqlRow> = bounded(
            self.timeout,
            sqlx::query(
                r#"
SELECT id, username, role, password_hash
FROM user
WHERE username = ? AND is_active = 1
"#,
            )
            .bind(&credentials.username)
            .fetch_optional(&self.pool),
        )
        .await?;

        let Some(row) = row_opt else {
            Self::check_password(&credentials.password, None)?;
            return Err(DirectoryError::InvalidCredentials);
        };
        let password_hash: String = row
            .try_get("password_hash")
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        Self::check_password(&credentials.password, Some(&password_hash))?;
        Self::row_to_user(&row)
    }
}

#[async_trait::async_trait]
impl Liveness for MySqlUserDirectory {
    async fn is_alive(&self) -> bool {
        bounded(self.timeout, sqlx::query("SELECT 1").execute(&self.pool))
            .await
            .is_ok()
    }
}
