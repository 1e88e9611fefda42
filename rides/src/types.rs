//! Domain types for the ride board.
//!
//! A ride request moves through a small lifecycle:
//!
//! ```text
//! Open ──(window elapses)──▶ Pending ──(driver accepts)──▶ Accepted
//!   │                          ▲   │                         │
//!   │                          │   └──────────┐              │
//!   │                          └──(driver cancels)───────────┤
//!   └──────────(user cancels)──▶ CancelledByUser ◀───────────┘
//! ```
//!
//! Only user cancellation is terminal. A ride sharer backing out puts the
//! request back in the pool as `Pending`.

use crate::error::Notice;
use crate::history::CancellationNotice;
use chrono::{DateTime, Utc};
use rideboard_core::effect::EffectId;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier for a ride request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new random `RequestId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `RequestId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a ride sharer on the roster (`d1`, `d2`, ...)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriverId(String);

impl DriverId {
    /// Creates a `DriverId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DriverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cancellation id of the Open→Pending timer for a request
#[must_use]
pub fn window_timer_id(request_id: &RequestId) -> EffectId {
    EffectId::new(format!("request-window:{request_id}"))
}

/// Normalizes a rider name for duplicate detection (trimmed, lowercased)
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Lifecycle status of a ride request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Waiting for a ride sharer; the window timer is running
    Open,
    /// Window elapsed (or a ride sharer backed out); still in the pool
    Pending,
    /// A ride sharer has taken the request
    Accepted,
    /// The rider cancelled (terminal)
    CancelledByUser,
    /// Kept for completeness; no transition produces it
    CancelledByRideSharer,
}

impl RequestStatus {
    /// Whether the request blocks its rider from submitting another one
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Open | Self::Pending | Self::Accepted)
    }

    /// Whether the request is in either cancelled status
    #[must_use]
    pub const fn is_cancelled(self) -> bool {
        matches!(self, Self::CancelledByUser | Self::CancelledByRideSharer)
    }

    /// Whether ride sharers see the request in their queue
    #[must_use]
    pub const fn is_waiting(self) -> bool {
        matches!(self, Self::Open | Self::Pending)
    }

    /// Human-readable status label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::CancelledByUser => "Cancelled",
            Self::CancelledByRideSharer => "Cancelled by ride sharer",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Field values a rider submits
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestForm {
    /// Rider name
    pub user_name: String,
    /// Free-form contact (shown to ride sharers only when it looks like a phone number)
    pub contact: String,
    /// Pickup description
    pub pickup: String,
    /// Optional notes
    pub notes: String,
}

impl RequestForm {
    /// Creates a form with the two required fields
    #[must_use]
    pub fn new(user_name: impl Into<String>, pickup: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            pickup: pickup.into(),
            ..Self::default()
        }
    }

    /// Sets the contact field
    #[must_use]
    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = contact.into();
        self
    }

    /// Sets the notes field
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Returns the form with every field trimmed
    #[must_use]
    pub fn trimmed(self) -> Self {
        Self {
            user_name: self.user_name.trim().to_string(),
            contact: self.contact.trim().to_string(),
            pickup: self.pickup.trim().to_string(),
            notes: self.notes.trim().to_string(),
        }
    }
}

/// Who wrote a message on a request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageSender {
    /// The accepting ride sharer
    RideSharer,
}

/// A message attached to a request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Sender
    pub from: MessageSender,
    /// Message body
    pub text: String,
    /// When it was sent
    pub at: DateTime<Utc>,
}

/// A ride request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideRequest {
    /// Unique identifier
    pub id: RequestId,
    /// Rider name as entered
    pub user_name: String,
    /// Contact as entered
    pub contact: String,
    /// Pickup description
    pub pickup: String,
    /// Notes (possibly empty)
    pub notes: String,
    /// Current status
    pub status: RequestStatus,
    /// When the request was submitted
    pub created_at: DateTime<Utc>,
    /// How long the request stays `Open`
    pub window: Duration,
    /// Accepting ride sharer; set iff `status == Accepted`
    pub accepted_by: Option<DriverId>,
    /// When it was accepted; set iff `accepted_by` is set
    pub accepted_at: Option<DateTime<Utc>>,
    /// Name of the ride sharer who last backed out
    pub last_cancelled_by: Option<String>,
    /// Messages from the ride sharer, oldest first
    pub messages: Vec<Message>,
    /// Handle of the pending Open→Pending timer
    pub window_timer: Option<EffectId>,
}

impl RideRequest {
    /// Creates an `Open` request from an already validated form
    #[must_use]
    pub fn new(id: RequestId, form: RequestForm, created_at: DateTime<Utc>, window: Duration) -> Self {
        Self {
            id,
            user_name: form.user_name,
            contact: form.contact,
            pickup: form.pickup,
            notes: form.notes,
            status: RequestStatus::Open,
            created_at,
            window,
            accepted_by: None,
            accepted_at: None,
            last_cancelled_by: None,
            messages: Vec::new(),
            window_timer: None,
        }
    }

    /// Normalized rider name
    #[must_use]
    pub fn normalized_user_name(&self) -> String {
        normalize_name(&self.user_name)
    }

    /// Whether `driver_id` is the current acceptor
    #[must_use]
    pub fn is_accepted_by(&self, driver_id: &DriverId) -> bool {
        self.status == RequestStatus::Accepted && self.accepted_by.as_ref() == Some(driver_id)
    }

    /// Latest message, if any
    #[must_use]
    pub fn latest_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Moves an `Open` request to `Pending` when its window elapses
    ///
    /// Returns `false` (and changes nothing) for any other status.
    pub fn expire_window(&mut self) -> bool {
        if self.status != RequestStatus::Open {
            return false;
        }
        self.status = RequestStatus::Pending;
        self.window_timer = None;
        true
    }

    /// Marks the request accepted by `driver_id`
    ///
    /// Returns the id of the window timer to cancel.
    pub fn accept(&mut self, driver_id: DriverId, at: DateTime<Utc>) -> EffectId {
        self.status = RequestStatus::Accepted;
        self.accepted_by = Some(driver_id);
        self.accepted_at = Some(at);
        self.last_cancelled_by = None;
        self.take_window_timer()
    }

    /// Marks the request cancelled by its rider
    ///
    /// Returns the id of the window timer to cancel.
    pub fn cancel_by_user(&mut self) -> EffectId {
        self.status = RequestStatus::CancelledByUser;
        self.accepted_by = None;
        self.accepted_at = None;
        self.last_cancelled_by = None;
        self.take_window_timer()
    }

    /// Puts an accepted request back in the pool after its ride sharer backs out
    pub fn revert_to_pending(&mut self, driver_name: impl Into<String>) {
        self.status = RequestStatus::Pending;
        self.accepted_by = None;
        self.accepted_at = None;
        self.last_cancelled_by = Some(driver_name.into());
    }

    /// Appends a ride sharer message
    pub fn push_message(&mut self, text: String, at: DateTime<Utc>) {
        self.messages.push(Message {
            from: MessageSender::RideSharer,
            text,
            at,
        });
    }

    // Cancelling is always attempted, even when the timer already fired.
    fn take_window_timer(&mut self) -> EffectId {
        self.window_timer
            .take()
            .unwrap_or_else(|| window_timer_id(&self.id))
    }
}

/// Kind of a cancellation recorded in history
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryKind {
    /// The rider cancelled their request
    CancelledByUser,
    /// The accepting ride sharer backed out
    CancelledByRideSharer,
}

/// An append-only cancellation record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEvent {
    /// What happened
    pub kind: HistoryKind,
    /// When it happened
    pub at: DateTime<Utc>,
    /// Rider name of the affected request
    pub user_name: String,
    /// Affected request
    pub request_id: RequestId,
    /// Ride sharer who backed out (ride sharer cancellations only)
    pub driver_id: Option<DriverId>,
    /// Whether the ride sharer asked others to help
    pub help: bool,
}

/// Which side of the board the session is using
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Rider submitting and cancelling requests
    #[default]
    User,
    /// Ride sharer working the queue
    RideSharer,
}

/// The interactive session: chosen role, selected driver, authentication
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Current role
    pub role: Role,
    /// Driver picked from the roster
    pub selected_driver: Option<DriverId>,
    /// Driver that signed in with a passcode
    pub authenticated_driver: Option<DriverId>,
}

impl Session {
    /// The signed-in driver, if the sign-in still matches the selected driver
    #[must_use]
    pub fn authenticated(&self) -> Option<&DriverId> {
        match (&self.authenticated_driver, &self.selected_driver) {
            (Some(authenticated), Some(selected)) if authenticated == selected => {
                Some(authenticated)
            },
            _ => None,
        }
    }

    /// Whether the session is signed in as exactly `driver_id`
    #[must_use]
    pub fn is_authenticated_as(&self, driver_id: &DriverId) -> bool {
        self.authenticated() == Some(driver_id)
    }

    /// Drops any authentication
    pub fn sign_out(&mut self) {
        self.authenticated_driver = None;
    }
}

/// State of the whole ride board
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RideBoardState {
    /// All requests, in submission order
    pub requests: Vec<RideRequest>,
    /// Cancellation history, in order of occurrence
    pub history: Vec<HistoryEvent>,
    /// The interactive session
    pub session: Session,
    /// Last transient message for the user (success or rejection)
    pub last_notice: Option<Notice>,
    /// Recent user cancellations, present only when there are any
    pub cancellation_notice: Option<CancellationNotice>,
    /// Whether the periodic notice recompute is running
    pub notice_ticker_active: bool,
}

impl RideBoardState {
    /// Creates an empty board
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty board with `driver_id` preselected
    #[must_use]
    pub fn with_selected_driver(driver_id: DriverId) -> Self {
        Self {
            session: Session {
                selected_driver: Some(driver_id),
                ..Session::default()
            },
            ..Self::default()
        }
    }

    /// Returns the number of requests
    #[must_use]
    pub fn count(&self) -> usize {
        self.requests.len()
    }

    /// Returns a request by ID
    #[must_use]
    pub fn get(&self, id: &RequestId) -> Option<&RideRequest> {
        self.requests.iter().find(|r| r.id == *id)
    }

    /// Returns a mutable request by ID
    pub fn get_mut(&mut self, id: &RequestId) -> Option<&mut RideRequest> {
        self.requests.iter_mut().find(|r| r.id == *id)
    }

    /// Whether a non-cancelled request exists for `user_name` (normalized)
    #[must_use]
    pub fn has_active_request_for(&self, user_name: &str) -> bool {
        let name = normalize_name(user_name);
        self.requests
            .iter()
            .any(|r| r.status.is_active() && r.normalized_user_name() == name)
    }

    /// Number of requests with the given status
    #[must_use]
    pub fn count_with_status(&self, status: RequestStatus) -> usize {
        self.requests.iter().filter(|r| r.status == status).count()
    }
}
