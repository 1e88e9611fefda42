//! Injected dependencies of the ride board reducer.

use crate::config::{Config, DEFAULT_WINDOW};
use crate::credentials::CredentialVerifier;
use crate::roster::Roster;
use crate::views::RenderSink;
use rideboard_core::environment::Clock;
use std::sync::Arc;
use std::time::Duration;

/// Shortest interval accepted for the periodic notice recompute
pub const MIN_NOTICE_INTERVAL: Duration = Duration::from_secs(1);

/// Environment dependencies for the ride board reducer
#[derive(Clone)]
pub struct RideEnvironment {
    /// Clock for timestamps and the trailing-hour notice
    pub clock: Arc<dyn Clock>,
    /// Passcode verification
    pub credentials: Arc<dyn CredentialVerifier>,
    /// Ride sharers
    pub roster: Arc<Roster>,
    /// Receives render triggers
    pub renderer: Arc<dyn RenderSink>,
    /// How long new requests stay `Open`
    pub window: Duration,
    /// Interval of the periodic notice recompute
    pub notice_interval: Duration,
}

impl RideEnvironment {
    /// Creates an environment with the default window and a 60 second notice interval
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        credentials: Arc<dyn CredentialVerifier>,
        roster: Arc<Roster>,
        renderer: Arc<dyn RenderSink>,
    ) -> Self {
        Self {
            clock,
            credentials,
            roster,
            renderer,
            window: DEFAULT_WINDOW,
            notice_interval: Duration::from_secs(60),
        }
    }

    /// Applies the timing settings from `config`
    #[must_use]
    pub fn with_config(mut self, config: &Config) -> Self {
        self.window = config.window();
        self.with_notice_interval(config.notice_interval())
    }

    /// Overrides the request window
    #[must_use]
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Overrides the notice interval
    ///
    /// Values below [`MIN_NOTICE_INTERVAL`] are raised to it; the ticker
    /// reschedules itself and must not fire back to back.
    #[must_use]
    pub fn with_notice_interval(mut self, interval: Duration) -> Self {
        self.notice_interval = interval.max(MIN_NOTICE_INTERVAL);
        self
    }
}

impl std::fmt::Debug for RideEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RideEnvironment")
            .field("roster", &self.roster)
            .field("window", &self.window)
            .field("notice_interval", &self.notice_interval)
            .finish_non_exhaustive()
    }
}
