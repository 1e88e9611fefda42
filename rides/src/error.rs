//! Rejections and user-facing notices.
//!
//! Invalid operations are never propagated to the caller. The reducer turns a
//! [`RideError`] into a [`Notice`] stored on state and leaves everything else
//! untouched.

use crate::types::{DriverId, RequestId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an operation on the board was rejected
///
/// The `Display` text is what the user sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RideError {
    /// Name or pickup left empty.
    #[error("Please enter your name and pickup description.")]
    MissingRequiredFields,

    /// The rider already has a non-cancelled request.
    #[error("You already have an active request. Cancel it before requesting again.")]
    DuplicateActiveRequest,

    /// A request with this id is already on the board.
    #[error("Ride request {0} already exists.")]
    RequestAlreadyExists(RequestId),

    /// No request with this id.
    #[error("Ride request {0} not found.")]
    RequestNotFound(RequestId),

    /// No driver with this id on the roster.
    #[error("Ride sharer {0} not found.")]
    DriverNotFound(DriverId),

    /// Accepting without being signed in as that driver.
    #[error("Sign in with your password to accept requests.")]
    SignInToAccept,

    /// Accepting a request someone already took.
    #[error("This request is already accepted.")]
    AlreadyAccepted,

    /// Operating on a cancelled request.
    #[error("This request was canceled.")]
    AlreadyCancelled,

    /// Backing out without being signed in as that driver.
    #[error("Sign in with your password to cancel.")]
    SignInToCancel,

    /// Backing out of a request held by someone else (or nobody).
    #[error("Only the accepting ride sharer can cancel this request.")]
    NotAcceptor,

    /// Messaging a request that is not accepted.
    #[error("Message can be sent only for accepted requests.")]
    MessageRequiresAcceptance,

    /// Messaging without being signed in as the acceptor.
    #[error("Sign in first.")]
    SignInFirst,

    /// Empty message body.
    #[error("Enter a message first.")]
    EmptyMessage,

    /// Signing in before picking a driver.
    #[error("Choose a ride sharer first.")]
    NoDriverSelected,

    /// Empty passcode.
    #[error("Please enter password.")]
    EmptyPasscode,

    /// Passcode did not verify.
    #[error("Wrong password")]
    WrongPasscode,
}

impl RideError {
    /// Category of the rejection
    #[must_use]
    pub const fn kind(&self) -> NoticeKind {
        match self {
            Self::MissingRequiredFields
            | Self::DuplicateActiveRequest
            | Self::EmptyMessage
            | Self::NoDriverSelected
            | Self::EmptyPasscode => NoticeKind::Validation,
            Self::SignInToAccept
            | Self::SignInToCancel
            | Self::NotAcceptor
            | Self::SignInFirst
            | Self::WrongPasscode => NoticeKind::Unauthorized,
            Self::RequestAlreadyExists(_)
            | Self::AlreadyAccepted
            | Self::AlreadyCancelled
            | Self::MessageRequiresAcceptance => NoticeKind::Conflict,
            Self::RequestNotFound(_) | Self::DriverNotFound(_) => NoticeKind::NotFound,
        }
    }
}

/// Category of a transient notice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoticeKind {
    /// The operation went through
    Success,
    /// Missing or malformed input, or a duplicate active request
    Validation,
    /// Not signed in, or signed in as the wrong driver
    Unauthorized,
    /// The request is in a state that does not allow the operation
    Conflict,
    /// Unknown request or driver
    NotFound,
}

/// Last transient message shown to the user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Category
    pub kind: NoticeKind,
    /// Text to display
    pub message: String,
}

impl Notice {
    /// A success notice
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    /// Whether this notice reports a rejection
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        self.kind != NoticeKind::Success
    }
}

impl From<&RideError> for Notice {
    fn from(error: &RideError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}
