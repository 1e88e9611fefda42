//! Presentation boundary: render triggers and read-only view models.
//!
//! The reducer never renders anything itself. After a successful mutation it
//! emits an effect that asks a [`RenderSink`] to refresh views in dependency
//! order (the notice bar last, since it depends on history). The view models
//! below are what a front end would read when it refreshes.

use crate::roster::Roster;
use crate::types::{
    DriverId, Message, RequestId, RequestStatus, RideBoardState, RideRequest, Role,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// A region of the board that can be re-rendered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    /// Rider's request cards (plus KPIs)
    Requests,
    /// Ride sharer's queue and accepted list
    DriverQueue,
    /// Global and per-rider history feeds
    History,
    /// Trailing-hour cancellation notice
    NoticeBar,
}

/// Views refreshed after every successful mutation, in order
pub const FULL_REFRESH: [View; 4] = [
    View::Requests,
    View::DriverQueue,
    View::History,
    View::NoticeBar,
];

/// Views refreshed by the periodic notice recompute
pub const NOTICE_REFRESH: [View; 1] = [View::NoticeBar];

/// Receives render triggers
pub trait RenderSink: Send + Sync {
    /// Re-render `view` from the current state
    fn render(&self, view: View);
}

/// Render sink that only logs
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingRenderer;

impl RenderSink for TracingRenderer {
    fn render(&self, view: View) {
        tracing::debug!(?view, "Render requested");
    }
}

/// Render sink that records every trigger, in order
#[derive(Clone, Debug, Default)]
pub struct RecordingRenderer {
    rendered: Arc<Mutex<Vec<View>>>,
}

impl RecordingRenderer {
    /// Creates an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Views rendered so far
    #[must_use]
    pub fn rendered(&self) -> Vec<View> {
        self.rendered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forgets everything recorded so far
    pub fn clear(&self) {
        self.rendered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl RenderSink for RecordingRenderer {
    fn render(&self, view: View) {
        self.rendered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(view);
    }
}

/// Whether a contact looks like a phone number (at least 7 digits)
#[must_use]
pub fn is_phone_like(contact: &str) -> bool {
    contact.chars().filter(char::is_ascii_digit).count() >= 7
}

/// Short label for a window duration (`"5 sec"`, `"5 min"`)
#[must_use]
pub fn window_label(window: Duration) -> String {
    let secs = window.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        format!("{} min", secs / 60)
    } else {
        format!("{secs} sec")
    }
}

/// The ride sharer assigned to an accepted request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Driver name
    pub driver_name: String,
    /// Car model
    pub car: String,
    /// License plate
    pub plate: String,
    /// When the request was accepted
    pub accepted_at: Option<DateTime<Utc>>,
}

/// A rider-facing request card
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCard {
    /// Request
    pub request_id: RequestId,
    /// `<user>`, `<user> Pending`, `<user> Accepted` or `<user> Cancelled`
    pub header: String,
    /// Current status
    pub status: RequestStatus,
    /// Submission time
    pub created_at: DateTime<Utc>,
    /// Pickup description
    pub pickup: String,
    /// Notes, if any
    pub notes: Option<String>,
    /// Assigned ride sharer (accepted requests only)
    pub assignment: Option<Assignment>,
    /// Latest ride sharer message
    pub latest_message: Option<Message>,
    /// Shown while waiting for a new ride sharer after one backed out
    pub rerouted_notice: Option<&'static str>,
    /// Whether the rider can still cancel
    pub can_cancel: bool,
}

fn header(request: &RideRequest) -> String {
    match request.status {
        RequestStatus::Open => request.user_name.clone(),
        RequestStatus::Pending => format!("{} Pending", request.user_name),
        RequestStatus::Accepted => format!("{} Accepted", request.user_name),
        RequestStatus::CancelledByUser | RequestStatus::CancelledByRideSharer => {
            format!("{} Cancelled", request.user_name)
        },
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

/// Request cards, newest first
#[must_use]
pub fn request_cards(state: &RideBoardState, roster: &Roster) -> Vec<RequestCard> {
    state
        .requests
        .iter()
        .rev()
        .map(|request| RequestCard {
            request_id: request.id,
            header: header(request),
            status: request.status,
            created_at: request.created_at,
            pickup: request.pickup.clone(),
            notes: non_empty(&request.notes),
            assignment: (request.status == RequestStatus::Accepted)
                .then(|| request.accepted_by.as_ref().and_then(|id| roster.get(id)))
                .flatten()
                .map(|driver| Assignment {
                    driver_name: driver.name.clone(),
                    car: driver.car.clone(),
                    plate: driver.plate.clone(),
                    accepted_at: request.accepted_at,
                }),
            latest_message: request.latest_message().cloned(),
            rerouted_notice: (request.status == RequestStatus::Pending
                && request.last_cancelled_by.is_some())
            .then_some(crate::history::RIDER_CANCELLED_LINE),
            can_cancel: !request.status.is_cancelled(),
        })
        .collect()
}

/// A request as a ride sharer sees it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Request
    pub request_id: RequestId,
    /// Current status
    pub status: RequestStatus,
    /// Rider name
    pub user_name: String,
    /// Pickup description
    pub pickup: String,
    /// Notes, if any
    pub notes: Option<String>,
    /// Contact, only when it looks like a phone number
    pub phone: Option<String>,
    /// Submission time
    pub created_at: DateTime<Utc>,
    /// Acceptance time (accepted list only)
    pub accepted_at: Option<DateTime<Utc>>,
}

impl QueueItem {
    fn from_request(request: &RideRequest) -> Self {
        Self {
            request_id: request.id,
            status: request.status,
            user_name: request.user_name.clone(),
            pickup: request.pickup.clone(),
            notes: non_empty(&request.notes),
            phone: is_phone_like(&request.contact).then(|| request.contact.clone()),
            created_at: request.created_at,
            accepted_at: request.accepted_at,
        }
    }
}

fn signed_in_ride_sharer(state: &RideBoardState) -> Option<&DriverId> {
    if state.session.role != Role::RideSharer {
        return None;
    }
    state.session.authenticated()
}

/// Open and pending requests, newest first
///
/// Empty unless a ride sharer is signed in.
#[must_use]
pub fn driver_queue(state: &RideBoardState) -> Vec<QueueItem> {
    if signed_in_ride_sharer(state).is_none() {
        return Vec::new();
    }
    state
        .requests
        .iter()
        .rev()
        .filter(|r| r.status.is_waiting())
        .map(QueueItem::from_request)
        .collect()
}

/// Requests the signed-in ride sharer has accepted, newest first
#[must_use]
pub fn accepted_list(state: &RideBoardState) -> Vec<QueueItem> {
    let Some(driver_id) = signed_in_ride_sharer(state) else {
        return Vec::new();
    };
    state
        .requests
        .iter()
        .rev()
        .filter(|r| r.is_accepted_by(driver_id))
        .map(QueueItem::from_request)
        .collect()
}

/// Board counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kpis {
    /// All requests
    pub total: usize,
    /// Accepted requests
    pub accepted: usize,
    /// Pending requests
    pub pending: usize,
    /// Cancelled requests (either status)
    pub cancelled: usize,
}

/// Computes the board counters
#[must_use]
pub fn kpis(state: &RideBoardState) -> Kpis {
    Kpis {
        total: state.count(),
        accepted: state.count_with_status(RequestStatus::Accepted),
        pending: state.count_with_status(RequestStatus::Pending),
        cancelled: state
            .requests
            .iter()
            .filter(|r| r.status.is_cancelled())
            .count(),
    }
}

/// Who the session is acting as, for a ride sharer
///
/// `Signed in as <name> (<car>, <plate>)` once authenticated, otherwise
/// `Selected: <name> (locked)`.
#[must_use]
pub fn ride_sharer_label(state: &RideBoardState, roster: &Roster) -> Option<String> {
    if state.session.role != Role::RideSharer {
        return None;
    }
    let driver = roster.get(state.session.selected_driver.as_ref()?)?;
    Some(if state.session.authenticated().is_some() {
        format!("Signed in as {} ({}, {})", driver.name, driver.car, driver.plate)
    } else {
        format!("Selected: {} (locked)", driver.name)
    })
}
