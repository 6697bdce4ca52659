use std::{env, time::Duration};

use tracing::warn;

/// Reads a number of seconds from `name`, falling back to `default` when the
/// variable is unset or not a number.
pub fn env_secs(name: &str, default: u64) -> u64 {
    match env::var(name) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            warn!("Ignoring {}={:?}, using {}", name, value, default);
            default
        }),
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupConfig {
    pub interval: Duration,
    pub inactive_timeout_secs: u64,
    pub active_timeout_secs: u64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            inactive_timeout_secs: 600,
            active_timeout_secs: 86_400,
        }
    }
}

impl CleanupConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            interval: Duration::from_secs(
                env_secs("CLEANUP_INTERVAL_SECONDS", defaults.interval.as_secs()).max(1),
            ),
            inactive_timeout_secs: env_secs(
                "INACTIVE_GAME_TIMEOUT_SECONDS",
                defaults.inactive_timeout_secs,
            ),
            active_timeout_secs: env_secs("ACTIVE_GAME_TIMEOUT_SECONDS", defaults.active_timeout_secs),
        }
    }
}
