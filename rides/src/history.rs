//! Cancellation history read views.
//!
//! The history itself is an append-only `Vec<HistoryEvent>` on
//! [`RideBoardState`]. This module derives everything shown from it: the
//! trailing-hour notice, the rider's feed, and the global feed.

use crate::roster::Roster;
use crate::types::{normalize_name, HistoryEvent, HistoryKind, RequestId, RideBoardState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Maximum number of entries in any history feed
pub const FEED_LIMIT: usize = 20;

/// Line shown to a rider whose ride sharer backed out
pub const RIDER_CANCELLED_LINE: &str =
    "Your request has been cancelled. Wait until a new RideSharer accepts your request.";

/// Count of user cancellations in the trailing hour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationNotice {
    /// Number of cancellations (always > 0)
    pub count: usize,
}

impl CancellationNotice {
    /// Display text for the notice bar
    #[must_use]
    pub fn text(&self) -> String {
        let plural = if self.count > 1 { "s" } else { "" };
        format!(
            "Notice: {} user cancellation{plural} in the last hour.",
            self.count
        )
    }
}

impl std::fmt::Display for CancellationNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text())
    }
}

/// Number of `CancelledByUser` events at or after `now - 1h`
#[must_use]
pub fn user_cancellations_in_last_hour(history: &[HistoryEvent], now: DateTime<Utc>) -> usize {
    let cutoff = now - chrono::Duration::hours(1);
    history
        .iter()
        .filter(|event| event.kind == HistoryKind::CancelledByUser && event.at >= cutoff)
        .count()
}

/// The notice bar content, present only when there were cancellations
#[must_use]
pub fn cancellation_notice(
    history: &[HistoryEvent],
    now: DateTime<Utc>,
) -> Option<CancellationNotice> {
    match user_cancellations_in_last_hour(history, now) {
        0 => None,
        count => Some(CancellationNotice { count }),
    }
}

/// An entry of the rider's cancellation feed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiderFeedItem {
    /// When the ride sharer backed out
    pub at: DateTime<Utc>,
    /// Affected request
    pub request_id: RequestId,
    /// Text to display
    pub line: &'static str,
}

/// Ride sharer cancellations affecting riders that still have a request on the board
///
/// Matched by normalized rider name against the current requests. Newest
/// first, at most [`FEED_LIMIT`].
#[must_use]
pub fn rider_feed(state: &RideBoardState) -> Vec<RiderFeedItem> {
    let names: HashSet<String> = state
        .requests
        .iter()
        .map(crate::types::RideRequest::normalized_user_name)
        .collect();

    state
        .history
        .iter()
        .rev()
        .filter(|event| {
            event.kind == HistoryKind::CancelledByRideSharer
                && names.contains(&normalize_name(&event.user_name))
        })
        .take(FEED_LIMIT)
        .map(|event| RiderFeedItem {
            at: event.at,
            request_id: event.request_id,
            line: RIDER_CANCELLED_LINE,
        })
        .collect()
}

/// An entry of the global history feed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLine {
    /// When it happened
    pub at: DateTime<Utc>,
    /// What happened
    pub kind: HistoryKind,
    /// Text to display
    pub text: String,
}

/// Display text for one history event
#[must_use]
pub fn describe(event: &HistoryEvent, roster: &Roster) -> String {
    match event.kind {
        HistoryKind::CancelledByUser => format!("{} canceled their request.", event.user_name),
        HistoryKind::CancelledByRideSharer => {
            let who = event
                .driver_id
                .as_ref()
                .and_then(|id| roster.name_of(id))
                .unwrap_or("Ride sharer");
            let mut text = format!("{who} canceled an accepted ride for {}.", event.user_name);
            if event.help {
                text.push_str(&format!(
                    " Can someone please help {} whose request has been cancelled?",
                    event.user_name
                ));
            }
            text
        },
    }
}

/// All cancellations, newest first, at most [`FEED_LIMIT`]
#[must_use]
pub fn history_feed(history: &[HistoryEvent], roster: &Roster) -> Vec<HistoryLine> {
    history
        .iter()
        .rev()
        .take(FEED_LIMIT)
        .map(|event| HistoryLine {
            at: event.at,
            kind: event.kind,
            text: describe(event, roster),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::demo_roster;
    use crate::types::DriverId;
    use chrono::Duration;
    use rideboard_testing::epoch;

    fn event(kind: HistoryKind, at: DateTime<Utc>, user_name: &str) -> HistoryEvent {
        HistoryEvent {
            kind,
            at,
            user_name: user_name.to_string(),
            request_id: RequestId::new(),
            driver_id: None,
            help: false,
        }
    }

    #[test]
    fn test_notice_counts_only_user_cancellations_in_the_last_hour() {
        let now = epoch() + Duration::hours(3);
        let history = vec![
            event(HistoryKind::CancelledByUser, now - Duration::minutes(61), "old"),
            event(HistoryKind::CancelledByUser, now - Duration::minutes(59), "recent"),
            event(HistoryKind::CancelledByRideSharer, now - Duration::minutes(5), "driver"),
            event(HistoryKind::CancelledByUser, now, "just now"),
        ];

        assert_eq!(user_cancellations_in_last_hour(&history, now), 2);
        assert_eq!(
            cancellation_notice(&history, now).map(|n| n.text()),
            Some("Notice: 2 user cancellations in the last hour.".to_string())
        );
    }

    #[test]
    fn test_notice_boundary_is_inclusive() {
        let now = epoch() + Duration::hours(1);
        let history = vec![event(HistoryKind::CancelledByUser, epoch(), "edge")];

        assert_eq!(user_cancellations_in_last_hour(&history, now), 1);
        assert_eq!(
            cancellation_notice(&history, now).map(|n| n.to_string()),
            Some("Notice: 1 user cancellation in the last hour.".to_string())
        );
    }

    #[test]
    fn test_notice_absent_without_recent_cancellations() {
        let now = epoch() + Duration::hours(2);
        let history = vec![event(HistoryKind::CancelledByUser, epoch(), "old")];
        assert_eq!(cancellation_notice(&history, now), None);
    }

    #[test]
    fn test_describe_ride_sharer_cancellation_with_help() {
        let mut cancelled = event(HistoryKind::CancelledByRideSharer, epoch(), "Sam");
        cancelled.driver_id = Some(DriverId::new("d1"));
        cancelled.help = true;

        assert_eq!(
            describe(&cancelled, &demo_roster()),
            "Alice Kim canceled an accepted ride for Sam. \
             Can someone please help Sam whose request has been cancelled?"
        );
    }

    #[test]
    fn test_describe_falls_back_for_unknown_driver() {
        let mut cancelled = event(HistoryKind::CancelledByRideSharer, epoch(), "Sam");
        cancelled.driver_id = Some(DriverId::new("d9"));

        assert_eq!(
            describe(&cancelled, &demo_roster()),
            "Ride sharer canceled an accepted ride for Sam."
        );
    }

    #[test]
    fn test_history_feed_is_newest_first_and_capped() {
        let history: Vec<_> = (0..25)
            .map(|i| {
                event(
                    HistoryKind::CancelledByUser,
                    epoch() + Duration::minutes(i),
                    &format!("rider {i}"),
                )
            })
            .collect();

        let feed = history_feed(&history, &demo_roster());
        assert_eq!(feed.len(), FEED_LIMIT);
        assert_eq!(feed[0].text, "rider 24 canceled their request.");
        assert_eq!(feed[19].text, "rider 5 canceled their request.");
    }
}
