use crate::config::Config;
use crate::db::schema::POSTGRES_INIT;
use crate::error::ServiceError;
use backon::{ConstantBuilder, Retryable};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgPool, PgPoolOptions, PgSslMode};
use sqlx::Connection;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// Everything needed to reach the store. Used once at startup, never persisted.
#[derive(Clone)]
pub struct ConnectionDescriptor {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectionDescriptor {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            host: cfg.postgres_host.clone(),
            port: cfg.postgres_port,
            user: cfg.postgres_user.clone(),
            password: cfg.postgres_password.clone(),
            database: cfg.postgres_db.clone(),
        }
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(PgSslMode::Disable)
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "postgres://{}@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

/// How hard startup tries before giving up on the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Fixed pause between attempts.
    pub delay: Duration,
    /// Upper bound on a single connect + ping.
    pub attempt_timeout: Duration,
}

impl Default for ConnectPolicy {
    fn default() -> Self {
        Self {
            attempts: 30,
            delay: Duration::from_secs(2),
            attempt_timeout: Duration::from_secs(5),
        }
    }
}

impl ConnectPolicy {
    fn backoff(&self) -> ConstantBuilder {
        ConstantBuilder::default()
            .with_delay(self.delay)
            .with_max_times(self.attempts.saturating_sub(1) as usize)
    }
}

/// Shape of the shared pool opened after the store answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    /// How long a request waits for a connection before failing.
    pub acquire_timeout: Duration,
}

impl PoolSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            max_connections: cfg.postgres_max_connections,
            acquire_timeout: cfg.acquire_timeout(),
        }
    }

    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections.max(1))
            .acquire_timeout(self.acquire_timeout)
    }
}

/// Opens the shared pool once the store answers a ping.
///
/// Every failed attempt is logged with its number. When all attempts fail the
/// last driver error is returned inside [`ServiceError::StoreUnavailable`].
pub async fn connect(
    descriptor: &ConnectionDescriptor,
    policy: ConnectPolicy,
    pool: PoolSettings,
) -> Result<PgPool, ServiceError> {
    let opts = descriptor.connect_options();
    let attempt = AtomicU32::new(0);

    let (opts_ref, attempt_ref) = (&opts, &attempt);
    (move || async move {
        let n = attempt_ref.fetch_add(1, Ordering::Relaxed) + 1;
        ping_once(opts_ref, policy.attempt_timeout)
            .await
            .inspect_err(|e| {
                warn!(
                    attempt = n,
                    max_attempts = policy.attempts,
                    store = %descriptor,
                    error = %e,
                    "DB connect attempt {n} failed"
                );
            })
    })
    .retry(policy.backoff())
    .await
    .map_err(|source| ServiceError::StoreUnavailable {
        attempts: attempt.load(Ordering::Relaxed),
        source,
    })?;

    let pool = pool
        .pool_options()
        .connect_with(opts)
        .await
        .map_err(|source| ServiceError::StoreUnavailable {
            attempts: attempt.load(Ordering::Relaxed),
            source,
        })?;

    info!(
        store = %descriptor,
        attempts = attempt.load(Ordering::Relaxed),
        "Store connection established"
    );
    Ok(pool)
}

/// Single connect + ping on a throwaway connection.
pub(crate) async fn ping_once(opts: &PgConnectOptions, deadline: Duration) -> Result<(), sqlx::Error> {
    let attempt = async {
        let mut conn = PgConnection::connect_with(opts).await?;
        conn.ping().await?;
        conn.close().await
    };
    match tokio::time::timeout(deadline, attempt).await {
        Ok(res) => res,
        Err(_) => Err(sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!("connect + ping did not finish within {deadline:?}"),
        ))),
    }
}

/// Creates the item table when it is missing. Safe to call repeatedly.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), ServiceError> {
    sqlx::raw_sql(POSTGRES_INIT)
        .execute(pool)
        .await
        .map_err(ServiceError::Schema)?;
    info!("Schema ready");
    Ok(())
}
