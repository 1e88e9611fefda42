//! Configuration management for the ride board.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Window used when demo mode is off
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Window used in demo mode
pub const DEMO_WINDOW: Duration = Duration::from_secs(5);

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Use the short demo window instead of the default one (`RIDEBOARD_DEMO_MODE`)
    pub demo_mode: bool,
    /// Seconds between periodic notice recomputes (`RIDEBOARD_NOTICE_INTERVAL_SECS`)
    pub notice_interval_secs: u64,
    /// Seconds to wait for effects on shutdown (`RIDEBOARD_SHUTDOWN_TIMEOUT_SECS`)
    pub shutdown_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Falls back to defaults for missing or unparsable values.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            demo_mode: lookup("RIDEBOARD_DEMO_MODE")
                .and_then(|s| parse_flag(&s))
                .unwrap_or(defaults.demo_mode),
            notice_interval_secs: lookup("RIDEBOARD_NOTICE_INTERVAL_SECS")
                .and_then(|s| s.trim().parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.notice_interval_secs),
            shutdown_timeout_secs: lookup("RIDEBOARD_SHUTDOWN_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.shutdown_timeout_secs),
        }
    }

    /// How long a new request stays `Open`
    #[must_use]
    pub const fn window(&self) -> Duration {
        if self.demo_mode {
            DEMO_WINDOW
        } else {
            DEFAULT_WINDOW
        }
    }

    /// Interval of the periodic notice recompute
    #[must_use]
    pub const fn notice_interval(&self) -> Duration {
        Duration::from_secs(self.notice_interval_secs)
    }

    /// Shutdown grace period
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            demo_mode: false,
            notice_interval_secs: 60,
            shutdown_timeout_secs: 5,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
