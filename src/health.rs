//! Process-wide health counters shared by `/health` and `/`.

use crate::models::{HealthInfo, HealthResponse};
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[derive(Debug)]
pub struct HealthState {
    uptime_start: DateTime<Utc>,
    checks_count: AtomicU64,
    last_health_check: RwLock<Option<DateTime<Utc>>>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            uptime_start: Utc::now(),
            checks_count: AtomicU64::new(0),
            last_health_check: RwLock::new(None),
        }
    }

    /// Records one health check and returns the `/health` body.
    pub async fn record_check(&self) -> HealthResponse {
        let now = Utc::now();
        {
            let mut last = self.last_health_check.write().await;
            // never move backwards if two checks race
            if last.map_or(true, |previous| previous <= now) {
                *last = Some(now);
            }
        }
        let checks_count = self.checks_count.fetch_add(1, Ordering::Relaxed) + 1;

        HealthResponse {
            status: "ok".to_string(),
            current_time: format_timestamp(now),
            uptime_since: format_timestamp(self.uptime_start),
            checks_count,
        }
    }

    /// Read-only view of the counters.
    pub async fn snapshot(&self) -> HealthInfo {
        let last = *self.last_health_check.read().await;

        HealthInfo {
            last_health_check: last.map(format_timestamp),
            uptime_start: format_timestamp(self.uptime_start),
            health_checks_count: self.checks_count.load(Ordering::Relaxed),
        }
    }
}
