//! In-memory ride request board.
//!
//! Riders submit ride requests; ride sharers from a fixed roster sign in,
//! accept requests, message riders, and may back out. Each request starts
//! `Open` and drops to `Pending` once its window elapses without anyone
//! accepting it. Cancellations are kept in an append-only history that feeds a
//! trailing-hour notice.
//!
//! All logic lives in [`RideReducer`]; timers and render triggers are effects
//! run by a [`rideboard_runtime::Store`].
//!
//! # Quick Start
//!
//! ```no_run
//! use rideboard::{
//!     demo_credentials, demo_roster, RequestForm, RequestId, RideAction, RideBoardState,
//!     RideEnvironment, RideReducer, TracingRenderer,
//! };
//! use rideboard_core::environment::SystemClock;
//! use rideboard_runtime::Store;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = RideEnvironment::new(
//!     Arc::new(SystemClock),
//!     Arc::new(demo_credentials()),
//!     Arc::new(demo_roster()),
//!     Arc::new(TracingRenderer),
//! );
//! let store = Store::new(RideBoardState::new(), RideReducer::new(), env);
//!
//! let request_id = RequestId::new();
//! store
//!     .send(RideAction::SubmitRequest {
//!         request_id,
//!         form: RequestForm::new("Sam", "Main St"),
//!     })
//!     .await?;
//!
//! let status = store.state(|s| s.get(&request_id).map(|r| r.status)).await;
//! println!("{status:?}");
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod config;
pub mod credentials;
pub mod environment;
pub mod error;
pub mod history;
pub mod reducer;
pub mod roster;
pub mod types;
pub mod views;

// Re-export commonly used types
pub use actions::RideAction;
pub use config::Config;
pub use credentials::{CredentialVerifier, HashedPasscodes};
pub use environment::RideEnvironment;
pub use error::{Notice, NoticeKind, RideError};
pub use reducer::{RideReducer, NOTICE_TICKER};
pub use roster::{demo_credentials, demo_roster, Driver, Roster};
pub use types::{
    window_timer_id, DriverId, HistoryEvent, HistoryKind, RequestForm, RequestId, RequestStatus,
    RideBoardState, RideRequest, Role, Session,
};
pub use views::{RecordingRenderer, RenderSink, TracingRenderer, View};
