//! Best-effort health calls to the sibling services shown by `/demo`.

use crate::config::Config;
use crate::error::ServiceError;
use std::time::Duration;
use tracing::{debug, warn};

const PEER_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const PEER_HEALTH_PATH: &str = "/health";

/// Outcome of the two peer health calls. Failures are carried as `error: ...` text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerReport {
    pub redis_service: String,
    pub mongo_service: String,
}

#[derive(Debug, Clone)]
pub struct PeerChecker {
    client: reqwest::Client,
    redis_service_url: String,
    mongo_service_url: String,
}

impl PeerChecker {
    pub fn new(
        client: reqwest::Client,
        redis_service_url: impl Into<String>,
        mongo_service_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            redis_service_url: redis_service_url.into(),
            mongo_service_url: mongo_service_url.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ServiceError> {
        let client = build_client(&cfg.app_name, cfg.peer_timeout())?;
        Ok(Self::new(
            client,
            cfg.redis_service_url.as_str(),
            cfg.mongo_service_url.as_str(),
        ))
    }

    /// Checks both peers concurrently. Never fails.
    pub async fn check_all(&self) -> PeerReport {
        let (redis_service, mongo_service) = tokio::join!(
            self.check("redis_service", &self.redis_service_url),
            self.check("mongo_service", &self.mongo_service_url),
        );
        PeerReport {
            redis_service,
            mongo_service,
        }
    }

    /// GETs `<base_url>/health` and returns the raw body whatever the status code.
    pub async fn check(&self, peer: &'static str, base_url: &str) -> String {
        let url = health_url(base_url);
        let result = async {
            let resp = self.client.get(url.as_str()).send().await?;
            let status = resp.status();
            let body = resp.text().await?;
            debug!(peer, %url, %status, "Peer health call returned");
            Ok::<_, reqwest::Error>(body)
        }
        .await;

        result.unwrap_or_else(|e| {
            warn!(peer, %url, error = %e, "Peer health call failed");
            format!("error: {e}")
        })
    }
}

fn health_url(base_url: &str) -> String {
    format!("{}{PEER_HEALTH_PATH}", base_url.trim_end_matches('/'))
}

fn build_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client, ServiceError> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .connect_timeout(PEER_CONNECT_TIMEOUT)
        .timeout(timeout)
        .build()?;
    Ok(client)
}
