use crate::domain_model::*;
use crate::domain_port::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Deserialize)]
pub struct SeedUser {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub role: String,
}

impl fmt::Debug for SeedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedUser")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Read-only directory over a fixed user list. Passwords are compared as
/// given, so this backend is for development only.
pub struct MemoryUserDirectory {
    by_id: HashMap<UserId, (User, String)>,
    by_username: HashMap<String, UserId>,
}

impl MemoryUserDirectory {
    pub fn new(seed: Vec<SeedUser>) -> Self {
        let mut by_id = HashMap::with_capacity(seed.len());
        let mut by_username = HashMap::with_capacity(seed.len());
        for s in seed {
            let user = User {
                id: UserId(s.id),
                username: s.username.clone(),
                role: s.role,
            };
            by_username.insert(s.username, user.id);
            by_id.insert(user.id, (user, s.password));
        }
        MemoryUserDirectory { by_id, by_username }
    }
}

#[async_trait::async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn resolve_by_id(&self, user_id: UserId) -> Result<User, DirectoryError> {
        self.by_id
            .get(&user_id)
            .map(|(user, _)| user.clone())
            .ok_or(DirectoryError::NotFound)
    }

    async fn resolve_by_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<User, DirectoryError> {
        let (user, password) = self
            .by_username
            .get(&credentials.username)
            .and_then(|id| self.by_id.get(id))
            .ok_or(DirectoryError::InvalidCredentials)?;
        if *password != credentials.password {
            return Err(DirectoryError::InvalidCredentials);
        }
        Ok(user.clone())
    }
}

#[async_trait::async_trait]
impl Liveness for MemoryUserDirectory {
    async fn is_alive(&self) -> bool {
        true
    }
}
