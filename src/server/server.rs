use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use anyhow::anyhow;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub struct Server {
    pub session_service: Arc<dyn SessionService>,
    pool: Option<MySqlPool>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let key_prefix = KeyPrefix::new(settings.auth.key_prefix.clone());

        let store_timeout = Duration::from_millis(settings.store.timeout_ms);
        let (revocation_store, security_probe): (Arc<dyn RevocationStore>, Arc<dyn Liveness>) =
            match settings.store.backend.as_str() {
                "memory" => {
                    let store = Arc::new(MemoryRevocationStore::new());
                    (store.clone() as Arc<dyn RevocationStore>, store as Arc<dyn Liveness>)
                }
                "redis" => {
                    let redis_client = redis::Client::open(settings.store.redis_url.as_str())?;
                    let redis_manager =
                        tokio::time::timeout(store_timeout, redis_client.get_connection_manager())
                            .await
                            .map_err(|_| anyhow!("connecting to redis timed out"))??;
                    let store = Arc::new(RedisRevocationStore::new(
                        redis_manager,
                        key_prefix.clone(),
                        store_timeout,
                    ));
                    (store.clone() as Arc<dyn RevocationStore>, store as Arc<dyn Liveness>)
                }
                other => return Err(anyhow!("Unknown store backend: {}", other)),
            };

        let directory_timeout = Duration::from_millis(settings.directory.timeout_ms);
        let mut pool = None;
        let (user_directory, storage_probe): (Arc<dyn UserDirectory>, Arc<dyn Liveness>) =
            match settings.directory.backend.as_str() {
                "memory" => {
                    let directory =
                        Arc::new(MemoryUserDirectory::new(settings.directory.users.clone()));
                    (directory.clone() as Arc<dyn UserDirectory>, directory as Arc<dyn Liveness>)
                }
                "mysql" => {
                    let mysql_pool = MySqlPoolOptions::new()
                        .max_connections(settings.directory.max_connections)
                        .acquire_timeout(directory_timeout)
                        .connect(&settings.directory.mysql_url)
                        .await?;
                    pool = Some(mysql_pool.clone());
                    let directory =
                        Arc::new(MySqlUserDirectory::new(mysql_pool, directory_timeout));
                    (directory.clone() as Arc<dyn UserDirectory>, directory as Arc<dyn Liveness>)
                }
                other => return Err(anyhow!("Unknown directory backend: {}", other)),
            };

        let token_authority: Arc<dyn TokenAuthority> =
            Arc::new(JwtTokenAuthority::new(JwtConfig {
                signing_key: settings.auth.secret.clone().into_bytes(),
                access_ttl: settings.auth.access_ttl(),
                refresh_ttl: settings.auth.refresh_ttl(),
                key_prefix,
            }));

        let session_service: Arc<dyn SessionService> = Arc::new(RealSessionService::new(
            user_directory,
            token_authority,
            revocation_store,
            storage_probe,
            security_probe,
            settings.auth.refresh_ttl(),
        ));

        info!(
            store = %settings.store.backend,
            directory = %settings.directory.backend,
            "server started"
        );

        Ok(Self {
            session_service,
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

/// Registers the process signal handlers and resolves on SIGINT or SIGTERM.
pub fn shutdown_signal() -> std::io::Result<impl Future<Output = ()> + Send + 'static> {
    #[cfg(unix)]
    let mut terminate =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    Ok(async move {
        #[cfg(unix)]
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("got SIGINT"),
            _ = terminate.recv() => info!("got SIGTERM"),
        }
        #[cfg(not(unix))]
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("got SIGINT");
        }
    })
}
