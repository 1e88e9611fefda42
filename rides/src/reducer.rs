//! Reducer logic for the ride board.
//!
//! Every command is validated first. A rejection only records a [`Notice`]
//! and returns no effects; a success mutates state and returns the effects
//! the runtime should run: window timers, timer cancellations, and one render
//! trigger.

use crate::actions::RideAction;
use crate::environment::RideEnvironment;
use crate::error::{Notice, RideError};
use crate::history;
use crate::types::{
    window_timer_id, DriverId, HistoryEvent, HistoryKind, RequestForm, RequestId, RequestStatus,
    RideBoardState, RideRequest, Role,
};
use crate::views::{View, FULL_REFRESH, NOTICE_REFRESH};
use rideboard_core::{
    async_effect, cancellable_delay,
    effect::{Effect, EffectId},
    reducer::Reducer,
    smallvec, SmallVec,
};
use std::sync::Arc;

/// Cancellation id of the periodic notice recompute
pub const NOTICE_TICKER: EffectId = EffectId::from_static("notice-ticker");

type Effects = SmallVec<[Effect<RideAction>; 4]>;

/// Reducer for the ride board
#[derive(Clone, Debug, Default)]
pub struct RideReducer;

impl RideReducer {
    /// Creates a new `RideReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a `SubmitRequest` command (form already trimmed)
    fn validate_submit(
        state: &RideBoardState,
        request_id: &RequestId,
        form: &RequestForm,
    ) -> Result<(), RideError> {
        if state.get(request_id).is_some() {
            return Err(RideError::RequestAlreadyExists(*request_id));
        }

        if form.user_name.is_empty() || form.pickup.is_empty() {
            return Err(RideError::MissingRequiredFields);
        }

        if state.has_active_request_for(&form.user_name) {
            return Err(RideError::DuplicateActiveRequest);
        }

        Ok(())
    }

    /// Validates an `AcceptRequest` command
    fn validate_accept(
        state: &RideBoardState,
        env: &RideEnvironment,
        request_id: &RequestId,
        driver_id: &DriverId,
    ) -> Result<(), RideError> {
        let request = state
            .get(request_id)
            .ok_or(RideError::RequestNotFound(*request_id))?;

        if !env.roster.contains(driver_id) {
            return Err(RideError::DriverNotFound(driver_id.clone()));
        }

        if !state.session.is_authenticated_as(driver_id) {
            return Err(RideError::SignInToAccept);
        }

        match request.status {
            RequestStatus::Accepted => Err(RideError::AlreadyAccepted),
            status if status.is_cancelled() => Err(RideError::AlreadyCancelled),
            _ => Ok(()),
        }
    }

    /// Validates a `CancelByUser` command
    fn validate_cancel_by_user(
        state: &RideBoardState,
        request_id: &RequestId,
    ) -> Result<(), RideError> {
        let request = state
            .get(request_id)
            .ok_or(RideError::RequestNotFound(*request_id))?;

        if request.status.is_cancelled() {
            return Err(RideError::AlreadyCancelled);
        }

        Ok(())
    }

    /// Validates a `CancelByRideSharer` command
    fn validate_cancel_by_ride_sharer(
        state: &RideBoardState,
        env: &RideEnvironment,
        request_id: &RequestId,
        driver_id: &DriverId,
    ) -> Result<(), RideError> {
        let request = state
            .get(request_id)
            .ok_or(RideError::RequestNotFound(*request_id))?;

        if !env.roster.contains(driver_id) {
            return Err(RideError::DriverNotFound(driver_id.clone()));
        }

        if !state.session.is_authenticated_as(driver_id) {
            return Err(RideError::SignInToCancel);
        }

        if !request.is_accepted_by(driver_id) {
            return Err(RideError::NotAcceptor);
        }

        Ok(())
    }

    /// Validates a `SendRideSharerMessage` command (text already trimmed)
    fn validate_message(
        state: &RideBoardState,
        request_id: &RequestId,
        text: &str,
    ) -> Result<(), RideError> {
        let request = state
            .get(request_id)
            .ok_or(RideError::RequestNotFound(*request_id))?;

        let Some(acceptor) = request.accepted_by.as_ref() else {
            return Err(RideError::MessageRequiresAcceptance);
        };

        if !state.session.is_authenticated_as(acceptor) {
            return Err(RideError::SignInFirst);
        }

        if text.is_empty() {
            return Err(RideError::EmptyMessage);
        }

        Ok(())
    }

    /// Validates a `SignIn` command, returning the driver to sign in as
    fn validate_sign_in(
        state: &RideBoardState,
        env: &RideEnvironment,
        passcode: &str,
    ) -> Result<DriverId, RideError> {
        let driver_id = state
            .session
            .selected_driver
            .clone()
            .ok_or(RideError::NoDriverSelected)?;

        if passcode.is_empty() {
            return Err(RideError::EmptyPasscode);
        }

        if !env.credentials.verify(&driver_id, passcode) {
            return Err(RideError::WrongPasscode);
        }

        Ok(driver_id)
    }

    /// Records a rejection; rejected commands have no effects
    fn reject(state: &mut RideBoardState, action: &'static str, error: &RideError) -> Effects {
        tracing::warn!(action, kind = ?error.kind(), %error, "Rejected ride board command");
        state.last_notice = Some(Notice::from(error));
        SmallVec::new()
    }

    /// Render trigger for `views`, in order
    fn render(env: &RideEnvironment, views: &'static [View]) -> Effect<RideAction> {
        let renderer = Arc::clone(&env.renderer);
        async_effect! {
            for view in views {
                renderer.render(*view);
            }
            None
        }
    }

    fn schedule_notice_tick(env: &RideEnvironment) -> Effect<RideAction> {
        cancellable_delay! {
            id: NOTICE_TICKER,
            duration: env.notice_interval,
            action: RideAction::NoticeTick
        }
    }

    fn recompute_notice(state: &mut RideBoardState, env: &RideEnvironment) {
        state.cancellation_notice = history::cancellation_notice(&state.history, env.clock.now());
    }

    fn driver_name(env: &RideEnvironment, driver_id: &DriverId) -> String {
        env.roster
            .name_of(driver_id)
            .map_or_else(|| driver_id.to_string(), str::to_string)
    }
}

impl Reducer for RideReducer {
    type State = RideBoardState;
    type Action = RideAction;
    type Environment = RideEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let name = action.name();

        match action {
            // ========== Rider ==========
            RideAction::SubmitRequest { request_id, form } => {
                let form = form.trimmed();
                if let Err(error) = Self::validate_submit(state, &request_id, &form) {
                    return Self::reject(state, name, &error);
                }

                let timer = window_timer_id(&request_id);
                let mut request = RideRequest::new(request_id, form, env.clock.now(), env.window);
                request.window_timer = Some(timer.clone());

                tracing::info!(
                    %request_id,
                    user = %request.user_name,
                    window_secs = env.window.as_secs(),
                    "Ride request created"
                );
                state.requests.push(request);
                state.last_notice = Some(Notice::success("Ride request created."));

                smallvec![
                    cancellable_delay! {
                        id: timer,
                        duration: env.window,
                        action: RideAction::ExpireWindow { request_id }
                    },
                    Self::render(env, &FULL_REFRESH),
                ]
            },

            RideAction::CancelByUser { request_id } => {
                if let Err(error) = Self::validate_cancel_by_user(state, &request_id) {
                    return Self::reject(state, name, &error);
                }
                let Some(request) = state.get_mut(&request_id) else {
                    return SmallVec::new();
                };

                let now = env.clock.now();
                let timer = request.cancel_by_user();
                let user_name = request.user_name.clone();

                tracing::info!(%request_id, user = %user_name, "Ride request cancelled by rider");
                state.history.push(HistoryEvent {
                    kind: HistoryKind::CancelledByUser,
                    at: now,
                    user_name,
                    request_id,
                    driver_id: None,
                    help: false,
                });
                Self::recompute_notice(state, env);
                state.last_notice = Some(Notice::success("You canceled your request."));

                smallvec![Effect::Cancel { id: timer }, Self::render(env, &FULL_REFRESH)]
            },

            // ========== Ride sharer ==========
            RideAction::AcceptRequest {
                request_id,
                driver_id,
            } => {
                if let Err(error) = Self::validate_accept(state, env, &request_id, &driver_id) {
                    return Self::reject(state, name, &error);
                }
                let Some(request) = state.get_mut(&request_id) else {
                    return SmallVec::new();
                };

                let driver_name = Self::driver_name(env, &driver_id);
                tracing::info!(%request_id, %driver_id, "Ride request accepted");
                let timer = request.accept(driver_id, env.clock.now());
                state.last_notice = Some(Notice::success(format!(
                    "Ride sharer {driver_name} accepted the request."
                )));

                smallvec![Effect::Cancel { id: timer }, Self::render(env, &FULL_REFRESH)]
            },

            RideAction::CancelByRideSharer {
                request_id,
                driver_id,
                help,
            } => {
                if let Err(error) =
                    Self::validate_cancel_by_ride_sharer(state, env, &request_id, &driver_id)
                {
                    return Self::reject(state, name, &error);
                }
                let Some(request) = state.get_mut(&request_id) else {
                    return SmallVec::new();
                };

                let driver_name = Self::driver_name(env, &driver_id);
                request.revert_to_pending(driver_name.clone());
                let user_name = request.user_name.clone();

                tracing::info!(%request_id, %driver_id, help, "Ride sharer backed out, request back to pending");
                state.history.push(HistoryEvent {
                    kind: HistoryKind::CancelledByRideSharer,
                    at: env.clock.now(),
                    user_name,
                    request_id,
                    driver_id: Some(driver_id),
                    help,
                });
                Self::recompute_notice(state, env);
                state.last_notice = Some(Notice::success(format!(
                    "Ride sharer {driver_name} canceled. Your request is available again."
                )));

                smallvec![Self::render(env, &FULL_REFRESH)]
            },

            RideAction::SendRideSharerMessage { request_id, text } => {
                let text = text.trim().to_string();
                if let Err(error) = Self::validate_message(state, &request_id, &text) {
                    return Self::reject(state, name, &error);
                }
                let Some(request) = state.get_mut(&request_id) else {
                    return SmallVec::new();
                };

                tracing::debug!(%request_id, "Ride sharer message sent");
                let notice = Notice::success(format!("Ride sharer message: {text}"));
                request.push_message(text, env.clock.now());
                state.last_notice = Some(notice);

                smallvec![Self::render(env, &FULL_REFRESH)]
            },

            // ========== Session ==========
            RideAction::SelectRole { role } => {
                state.session.role = role;
                if role == Role::RideSharer {
                    state.session.sign_out();
                }
                smallvec![Self::render(env, &FULL_REFRESH)]
            },

            RideAction::SelectDriver { driver_id } => {
                if !env.roster.contains(&driver_id) {
                    return Self::reject(state, name, &RideError::DriverNotFound(driver_id));
                }
                state.session.selected_driver = Some(driver_id);
                state.session.sign_out();
                smallvec![Self::render(env, &FULL_REFRESH)]
            },

            RideAction::SignIn { passcode } => match Self::validate_sign_in(state, env, passcode.trim()) {
                Ok(driver_id) => {
                    let driver_name = Self::driver_name(env, &driver_id);
                    tracing::info!(%driver_id, "Ride sharer signed in");
                    state.session.authenticated_driver = Some(driver_id);
                    state.last_notice = Some(Notice::success(format!(
                        "{driver_name} signed in successfully."
                    )));
                    smallvec![Self::render(env, &FULL_REFRESH)]
                },
                Err(error) => {
                    // A wrong passcode also drops an existing sign-in.
                    let signed_out = error == RideError::WrongPasscode
                        && state.session.authenticated_driver.take().is_some();
                    let mut effects = Self::reject(state, name, &error);
                    if signed_out {
                        effects.push(Self::render(env, &FULL_REFRESH));
                    }
                    effects
                },
            },

            RideAction::SignOut => {
                state.session.sign_out();
                state.last_notice = Some(Notice::success("Logged out."));
                smallvec![Self::render(env, &FULL_REFRESH)]
            },

            // ========== Timers ==========
            RideAction::ExpireWindow { request_id } => {
                let expired = state
                    .get_mut(&request_id)
                    .is_some_and(RideRequest::expire_window);

                if !expired {
                    tracing::debug!(%request_id, "Window elapsed for a request that is no longer open");
                    return SmallVec::new();
                }

                tracing::info!(%request_id, "Request window elapsed, now pending");
                smallvec![Self::render(env, &FULL_REFRESH)]
            },

            RideAction::StartNoticeTicker => {
                state.notice_ticker_active = true;
                Self::recompute_notice(state, env);
                smallvec![
                    Self::schedule_notice_tick(env),
                    Self::render(env, &NOTICE_REFRESH),
                ]
            },

            RideAction::NoticeTick => {
                if !state.notice_ticker_active {
                    tracing::debug!("Notice tick after the ticker stopped");
                    return SmallVec::new();
                }
                Self::recompute_notice(state, env);
                smallvec![
                    Self::schedule_notice_tick(env),
                    Self::render(env, &NOTICE_REFRESH),
                ]
            },

            RideAction::StopNoticeTicker => {
                state.notice_ticker_active = false;
                smallvec![Effect::Cancel { id: NOTICE_TICKER }]
            },

            // ========== Maintenance ==========
            RideAction::ClearAll => {
                let cancels: Vec<_> = state
                    .requests
                    .iter()
                    .filter_map(|r| r.window_timer.clone())
                    .map(|id| Effect::Cancel { id })
                    .collect();

                tracing::info!(
                    requests = state.requests.len(),
                    history = state.history.len(),
                    "Clearing the board"
                );
                state.requests.clear();
                state.history.clear();
                Self::recompute_notice(state, env);
                state.last_notice = Some(Notice::success("Cleared."));

                smallvec![Effect::merge(cancels), Self::render(env, &FULL_REFRESH)]
            },
        }
    }
}
