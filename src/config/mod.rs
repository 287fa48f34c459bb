use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    env, fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

/// Environment variables recognized by [`Config::figment`].
///
/// Each maps to the field of the same name in lower snake case.
pub const RECOGNIZED_ENV: &[&str] = &[
    "APP_NAME",
    "REDIS_SERVICE_URL",
    "MONGO_SERVICE_URL",
    "POSTGRES_HOST",
    "POSTGRES_PORT",
    "POSTGRES_USER",
    "POSTGRES_PASSWORD",
    "POSTGRES_DB",
    "POSTGRES_MAX_CONNECTIONS",
    "PORT",
    "LISTEN_ADDR",
    "LOGLEVEL",
    "PEER_TIMEOUT_SECS",
    "POSTGRES_ACQUIRE_TIMEOUT_SECS",
];

/// Variables taken verbatim. `Env` would parse `007` into the number 7.
const TEXT_ENV: &[&str] = &[
    "APP_NAME",
    "REDIS_SERVICE_URL",
    "MONGO_SERVICE_URL",
    "POSTGRES_HOST",
    "POSTGRES_USER",
    "POSTGRES_PASSWORD",
    "POSTGRES_DB",
    "LISTEN_ADDR",
    "LOGLEVEL",
];

/// Runtime settings, resolved once at startup.
#[derive(Clone, Deserialize, Serialize)]
pub struct Config {
    /// Name reported by `/health` and `/demo`.
    /// Env: `APP_NAME`. Default: `go-postgres-service`.
    pub app_name: String,

    /// Base URL of the cache-backed peer service.
    /// Env: `REDIS_SERVICE_URL`. Default: `http://python-redis-service:8080`.
    pub redis_service_url: String,

    /// Base URL of the document-store-backed peer service.
    /// Env: `MONGO_SERVICE_URL`. Default: `http://java-mongo-service:8080`.
    pub mongo_service_url: String,

    /// Env: `POSTGRES_HOST`. Default: `postgres`.
    pub postgres_host: String,

    /// Env: `POSTGRES_PORT`. Default: `5432`.
    pub postgres_port: u16,

    /// Env: `POSTGRES_USER`. Default: `appuser`.
    pub postgres_user: String,

    /// Env: `POSTGRES_PASSWORD`. Default: `apppass`.
    pub postgres_password: String,

    /// Env: `POSTGRES_DB`. Default: `appdb`.
    pub postgres_db: String,

    /// Upper bound on pooled store connections.
    /// Env: `POSTGRES_MAX_CONNECTIONS`. Default: `10`.
    pub postgres_max_connections: u32,

    /// How long a request waits for a pooled store connection, in seconds.
    /// Env: `POSTGRES_ACQUIRE_TIMEOUT_SECS`. Default: `3`.
    pub postgres_acquire_timeout_secs: u64,

    /// HTTP server listen port.
    /// Env: `PORT`. Default: `8080`.
    pub port: u16,

    /// HTTP server listen address.
    /// Env: `LISTEN_ADDR`. Default: `0.0.0.0`.
    pub listen_addr: IpAddr,

    /// Fallback filter for the tracing subscriber when `RUST_LOG` is unset.
    /// Env: `LOGLEVEL`. Default: `info`.
    pub loglevel: String,

    /// Overall deadline for a single peer health call, in seconds.
    /// Env: `PEER_TIMEOUT_SECS`. Default: `30`.
    pub peer_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "go-postgres-service".to_string(),
            redis_service_url: "http://python-redis-service:8080".to_string(),
            mongo_service_url: "http://java-mongo-service:8080".to_string(),
            postgres_host: "postgres".to_string(),
            postgres_port: 5432,
            postgres_user: "appuser".to_string(),
            postgres_password: "apppass".to_string(),
            postgres_db: "appdb".to_string(),
            postgres_max_connections: 10,
            postgres_acquire_timeout_secs: 3,
            port: 8080,
            listen_addr: Ipv4Addr::UNSPECIFIED.into(),
            loglevel: "info".to_string(),
            peer_timeout_secs: 30,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("app_name", &self.app_name)
            .field("redis_service_url", &self.redis_service_url)
            .field("mongo_service_url", &self.mongo_service_url)
            .field("postgres_host", &self.postgres_host)
            .field("postgres_port", &self.postgres_port)
            .field("postgres_user", &self.postgres_user)
            .field("postgres_password", &"<redacted>")
            .field("postgres_db", &self.postgres_db)
            .field("postgres_max_connections", &self.postgres_max_connections)
            .field(
                "postgres_acquire_timeout_secs",
                &self.postgres_acquire_timeout_secs,
            )
            .field("port", &self.port)
            .field("listen_addr", &self.listen_addr)
            .field("loglevel", &self.loglevel)
            .field("peer_timeout_secs", &self.peer_timeout_secs)
            .finish()
    }
}

impl Config {
    /// Builds a Figment that merges defaults with the recognized environment variables.
    ///
    /// Variables that are unset or blank are skipped so the default applies.
    pub fn figment() -> Figment {
        let numeric = Env::raw().filter(|key| {
            RECOGNIZED_ENV
                .iter()
                .filter(|known| !TEXT_ENV.contains(known))
                .any(|known| key.as_str().eq_ignore_ascii_case(known))
                && env_value(&key.as_str().to_ascii_uppercase()).is_some()
        });

        let text: BTreeMap<String, String> = TEXT_ENV
            .iter()
            .filter_map(|key| env_value(key).map(|value| (key.to_ascii_lowercase(), value)))
            .collect();

        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(numeric)
            .merge(Serialized::defaults(text))
    }

    /// Loads configuration from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn listen_socket(&self) -> SocketAddr {
        SocketAddr::new(self.listen_addr, self.port)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.postgres_acquire_timeout_secs)
    }

    pub fn peer_timeout(&self) -> Duration {
        Duration::from_secs(self.peer_timeout_secs)
    }
}

/// The variable's value, unless it is unset or blank.
fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
