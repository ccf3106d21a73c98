use crate::domain_model::*;
use crate::domain_port::*;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::future::Future;
use std::time::Duration;

/// Bounds a redis round trip by `timeout`.
async fn bounded<T>(
    timeout: Duration,
    op: impl Future<Output = redis::RedisResult<T>>,
) -> Result<T, StoreError> {
    match tokio::time::timeout(timeout, op).await {
        Ok(result) => result.map_err(|e| StoreError::Unavailable(e.to_string())),
        Err(_) => Err(StoreError::Unavailable(format!(
            "timed out after {:?}",
            timeout
        ))),
    }
}

pub struct RedisRevocationStore {
    conn: ConnectionManager,
    prefix: KeyPrefix,
    timeout: Duration,
}

impl RedisRevocationStore {
    pub fn new(conn: ConnectionManager, prefix: KeyPrefix, timeout: Duration) -> Self {
        RedisRevocationStore {
            conn,
            prefix,
            timeout,
        }
    }

    fn key(&self, user_id: UserId) -> String {
        self.prefix.key_for(user_id)
    }
}

#[async_trait::async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn put(
        &self,
        user_id: UserId,
        pair: &TokenPair,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let key = self.key(user_id);
        let value =
            serde_json::to_string(pair).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        // SET EX rejects a zero expiry
        let ttl_secs = ttl.as_secs().max(1);
        let mut conn = self.conn.clone();
        let _: () = bounded(self.timeout, conn.set_ex(&key, value, ttl_secs)).await?;
        Ok(())
    }

    async fn get(&self, user_id: UserId) -> Result<TokenPair, StoreError> {
        let key = self.key(user_id);
        let mut conn = self.conn.clone();
        let data: Option<String> = bounded(self.timeout, conn.get(&key)).await?;
        let data = data.ok_or(StoreError::NotFound)?;
        serde_json::from_str(&data)
            .map_err(|e| StoreError::Unavailable(format!("corrupt auth data at {}: {}", key, e)))
    }

    async fn delete(&self, user_id: UserId) -> Result<(), StoreError> {
        let key = self.key(user_id);
        let mut conn = self.conn.clone();
        let _: () = bounded(self.timeout, conn.del(&key)).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Liveness for RedisRevocationStore {
    async fn is_alive(&self) -> bool {
        let mut conn = self.conn.clone();
        let ping = redis::cmd("PING");
        let pong: Result<String, StoreError> =
            bounded(self.timeout, ping.query_async(&mut conn)).await;
        pong.is_ok()
    }
}
