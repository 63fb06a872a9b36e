//! Periodic self-ping against `/health`.
//!
//! Auto-sleeping hosts suspend the process after a stretch without inbound
//! traffic; pinging our own public URL keeps it awake.

use crate::config::Config;
use crate::errors::AppError;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Timeout for one self-ping.
const PING_TIMEOUT_SECS: u64 = 10;

#[derive(Clone)]
pub struct KeepAlive {
    client: Client,
    ping_url: String,
    interval: Duration,
}

impl KeepAlive {
    pub fn new(external_url: &str, interval: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(PING_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to create keep-alive client: {}", e))
            })?;

        Ok(Self {
            client,
            ping_url: format!("{}/health", external_url.trim_end_matches('/')),
            interval,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(&config.external_url, config.keep_alive_interval())
    }

    pub fn ping_url(&self) -> &str {
        &self.ping_url
    }

    /// Spawns the ping loop. The first ping fires one interval after start.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(&self) {
        let mut timer = interval_at(Instant::now() + self.interval, self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "Keep-alive started: pinging {} every {}s",
            self.ping_url,
            self.interval.as_secs()
        );

        loop {
            timer.tick().await;
            // Failures are only logged; the next tick tries again.
            let _ = self.ping_once().await;
        }
    }

    /// Sends one ping. Any outcome other than 200 is logged at warn level.
    pub async fn ping_once(&self) -> Result<StatusCode, AppError> {
        tracing::info!("Keep-alive ping to {}", self.ping_url);

        match self.client.get(&self.ping_url).send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                tracing::debug!("Keep-alive ping succeeded");
                Ok(response.status())
            }
            Ok(response) => {
                let status = response.status();
                tracing::warn!("Keep-alive ping returned unexpected status {}", status);
                Err(AppError::UpstreamUnavailable(format!(
                    "keep-alive ping returned status {}",
                    status
                )))
            }
            Err(e) => {
                tracing::warn!("Keep-alive ping failed: {}", e);
                Err(AppError::from(e))
            }
        }
    }
}
