use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;
use std::time::{Duration, Instant};

struct Entry {
    pair: TokenPair,
    expire_at: Instant,
}

/// Revocation store whose expired entries are dropped on read and on every write.
#[derive(Default)]
pub struct MemoryRevocationStore {
    entries: DashMap<UserId, Entry>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn put(
        &self,
        user_id: UserId,
        pair: &TokenPair,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let now = Instant::now();
        // Drop records of users who never came back.
        self.entries.retain(|_, entry| now < entry.expire_at);

        let expire_at = now
            .checked_add(ttl)
            .ok_or_else(|| StoreError::Unavailable(format!("ttl out of range: {:?}", ttl)))?;
        self.entries.insert(
            user_id,
            Entry {
                pair: pair.clone(),
                expire_at,
            },
        );
        Ok(())
    }

    async fn get(&self, user_id: UserId) -> Result<TokenPair, StoreError> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(&user_id) {
            if now < entry.expire_at {
                return Ok(entry.pair.clone());
            }
        }
        self.entries.remove_if(&user_id, |_, entry| now >= entry.expire_at);
        Err(StoreError::NotFound)
    }

    async fn delete(&self, user_id: UserId) -> Result<(), StoreError> {
        self.entries.remove(&user_id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl Liveness for MemoryRevocationStore {
    async fn is_alive(&self) -> bool {
        true
    }
}
