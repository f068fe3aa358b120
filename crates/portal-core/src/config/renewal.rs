//! Renewal coordinator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing of the proactive token renewal loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewalConfig {
    /// Period of the renewal check timer in seconds.
    #[serde(default = "default_interval")]
    pub check_interval_seconds: u64,
    /// An access token expiring within this many minutes is renewed.
    #[serde(default = "default_buffer")]
    pub expiring_soon_buffer_minutes: u64,
    /// Run one check immediately when the timer loop starts.
    #[serde(default = "default_true")]
    pub check_on_start: bool,
    /// Access token lifetime assumed when the server omits `expires_in`.
    #[serde(default = "default_access_ttl")]
    pub default_access_ttl_seconds: u64,
    /// Refresh token lifetime assumed when the server omits `refresh_expires_in`.
    #[serde(default = "default_refresh_ttl")]
    pub default_refresh_ttl_seconds: u64,
}

impl RenewalConfig {
    /// The timer period as a `Duration`.
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_seconds.max(1))
    }
}

impl Default for RenewalConfig {
    fn default() -> Self {
        Self {
            check_interval_seconds: default_interval(),
            expiring_soon_buffer_minutes: default_buffer(),
            check_on_start: true,
            default_access_ttl_seconds: default_access_ttl(),
            default_refresh_ttl_seconds: default_refresh_ttl(),
        }
    }
}

fn default_interval() -> u64 {
    300
}

fn default_buffer() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

// 14 days
fn default_access_ttl() -> u64 {
    1_209_600
}

// 30 days
fn default_refresh_ttl() -> u64 {
    2_592_000
}
