use serde::Deserialize;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "https://hammerhead-app-4vfrt.ondigitalocean.app";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;
/// 13 minutes, just under the idle window of auto-sleeping hosts.
const DEFAULT_KEEP_ALIVE_INTERVAL_SECS: u64 = 13 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL shared by the segmentation, customer and detail upstreams.
    pub api_base_url: String,
    /// Externally reachable URL of this service, used for the self-ping.
    pub external_url: String,
    pub port: u16,
    pub upstream_timeout_secs: u64,
    pub keep_alive_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_source<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            None => DEFAULT_PORT,
        };

        let api_base_url = validate_url(
            "API_BASE_URL",
            var("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        )?;

        let external_url = validate_url(
            "RENDER_EXTERNAL_URL",
            var("RENDER_EXTERNAL_URL").unwrap_or_else(|| format!("http://localhost:{}", port)),
        )?;

        let upstream_timeout_secs = parse_secs(
            "UPSTREAM_TIMEOUT_SECS",
            var("UPSTREAM_TIMEOUT_SECS"),
            DEFAULT_UPSTREAM_TIMEOUT_SECS,
        )?;

        let keep_alive_interval_secs = parse_secs(
            "KEEP_ALIVE_INTERVAL_SECS",
            var("KEEP_ALIVE_INTERVAL_SECS"),
            DEFAULT_KEEP_ALIVE_INTERVAL_SECS,
        )?;

        let config = Self {
            api_base_url,
            external_url,
            port,
            upstream_timeout_secs,
            keep_alive_interval_secs,
        };

        tracing::debug!("API Base URL: {}", config.api_base_url);
        tracing::debug!("External URL: {}", config.external_url);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_secs(self.keep_alive_interval_secs)
    }
}

fn validate_url(name: &str, raw: String) -> anyhow::Result<String> {
    let trimmed = raw.trim().trim_end_matches('/').to_string();
    let parsed = url::Url::parse(&trimmed)
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL ({}): {}", name, trimmed, e))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("{} must start with http:// or https://", name);
    }

    Ok(trimmed)
}

fn parse_secs(name: &str, raw: Option<String>, default: u64) -> anyhow::Result<u64> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => anyhow::bail!("{} must be a positive number of seconds", name),
        Ok(secs) => Ok(secs),
    }
}
