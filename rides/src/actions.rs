//! Everything that can happen on the ride board.

use crate::types::{DriverId, RequestForm, RequestId, Role};
use serde::{Deserialize, Serialize};

/// Ride board actions
///
/// Commands come from riders and ride sharers. `ExpireWindow` and
/// `NoticeTick` are produced by timers the reducer scheduled itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RideAction {
    // Rider commands
    /// Submit a new request
    SubmitRequest {
        /// Id for the new request
        request_id: RequestId,
        /// Submitted fields (trimmed by the reducer)
        form: RequestForm,
    },
    /// Rider cancels a request (terminal)
    CancelByUser {
        /// Request to cancel
        request_id: RequestId,
    },

    // Ride sharer commands
    /// Take an open or pending request
    AcceptRequest {
        /// Request to accept
        request_id: RequestId,
        /// Accepting driver
        driver_id: DriverId,
    },
    /// Back out of an accepted request, returning it to the pool
    CancelByRideSharer {
        /// Request to release
        request_id: RequestId,
        /// Driver backing out
        driver_id: DriverId,
        /// Ask other ride sharers to help
        help: bool,
    },
    /// Message the rider of an accepted request
    SendRideSharerMessage {
        /// Accepted request
        request_id: RequestId,
        /// Message body (trimmed by the reducer)
        text: String,
    },

    // Session
    /// Switch between rider and ride sharer
    SelectRole {
        /// New role
        role: Role,
    },
    /// Pick a driver from the roster (signs out)
    SelectDriver {
        /// Driver to select
        driver_id: DriverId,
    },
    /// Sign in as the selected driver
    SignIn {
        /// Entered passcode
        passcode: String,
    },
    /// Drop authentication
    SignOut,

    // Timers
    /// A request's window elapsed
    ExpireWindow {
        /// Request whose window elapsed
        request_id: RequestId,
    },
    /// Start recomputing the cancellation notice periodically
    StartNoticeTicker,
    /// Periodic cancellation notice recompute
    NoticeTick,
    /// Stop the periodic recompute
    StopNoticeTicker,

    // Maintenance
    /// Empty the board and its history
    ClearAll,
}

impl RideAction {
    /// Short name of the action for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SubmitRequest { .. } => "submit_request",
            Self::CancelByUser { .. } => "cancel_by_user",
            Self::AcceptRequest { .. } => "accept_request",
            Self::CancelByRideSharer { .. } => "cancel_by_ride_sharer",
            Self::SendRideSharerMessage { .. } => "send_ride_sharer_message",
            Self::SelectRole { .. } => "select_role",
            Self::SelectDriver { .. } => "select_driver",
            Self::SignIn { .. } => "sign_in",
            Self::SignOut => "sign_out",
            Self::ExpireWindow { .. } => "expire_window",
            Self::StartNoticeTicker => "start_notice_ticker",
            Self::NoticeTick => "notice_tick",
            Self::StopNoticeTicker => "stop_notice_ticker",
            Self::ClearAll => "clear_all",
        }
    }
}
