//! Property-based tests for the request lifecycle.
//!
//! Random command sequences (submissions, window expiries, accepts,
//! cancellations, messages, sign-ins, clock jumps) are reduced one by one and
//! the board invariants are checked after every step.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can unwrap

use proptest::prelude::*;
use rideboard::{
    demo_credentials, demo_roster, history, DriverId, HistoryKind, RecordingRenderer, RequestForm,
    RequestId, RequestStatus, RideAction, RideBoardState, RideEnvironment, RideReducer, Role,
};
use rideboard_core::reducer::Reducer;
use rideboard_testing::{manual_clock, ManualClock};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const NAMES: [&str; 4] = ["Sam", " sam ", "Ana", "Kim"];
const DRIVERS: [(&str, &str); 3] = [("d1", "alice123"), ("d2", "ben123"), ("d9", "nobody")];

#[derive(Debug, Clone)]
enum Op {
    Submit { name: usize },
    Resubmit { request: usize, name: usize },
    Expire { request: usize },
    Accept { request: usize, driver: usize },
    UserCancel { request: usize },
    DriverCancel { request: usize, driver: usize, help: bool },
    Message { request: usize },
    SignIn { driver: usize, correct: bool },
    SignOut,
    Tick,
    AdvanceMinutes { minutes: i64 },
}

fn any_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..NAMES.len()).prop_map(|name| Op::Submit { name }),
        1 => (0..8usize, 0..NAMES.len()).prop_map(|(request, name)| Op::Resubmit { request, name }),
        2 => (0..8usize).prop_map(|request| Op::Expire { request }),
        3 => (0..8usize, 0..DRIVERS.len()).prop_map(|(request, driver)| Op::Accept { request, driver }),
        2 => (0..8usize).prop_map(|request| Op::UserCancel { request }),
        2 => (0..8usize, 0..DRIVERS.len(), any::<bool>())
            .prop_map(|(request, driver, help)| Op::DriverCancel { request, driver, help }),
        1 => (0..8usize).prop_map(|request| Op::Message { request }),
        2 => (0..DRIVERS.len(), any::<bool>()).prop_map(|(driver, correct)| Op::SignIn { driver, correct }),
        1 => Just(Op::SignOut),
        1 => Just(Op::Tick),
        1 => (1i64..90).prop_map(|minutes| Op::AdvanceMinutes { minutes }),
    ]
}

struct Harness {
    reducer: RideReducer,
    env: RideEnvironment,
    clock: ManualClock,
    state: RideBoardState,
    ids: Vec<RequestId>,
}

impl Harness {
    fn new() -> Self {
        let clock = manual_clock();
        let env = RideEnvironment::new(
            Arc::new(clock.clone()),
            Arc::new(demo_credentials()),
            Arc::new(demo_roster()),
            Arc::new(RecordingRenderer::new()),
        );
        let mut state = RideBoardState::new();
        state.session.role = Role::RideSharer;
        state.notice_ticker_active = true;
        Self {
            reducer: RideReducer::new(),
            env,
            clock,
            state,
            ids: Vec::new(),
        }
    }

    fn request(&self, index: usize) -> RequestId {
        if self.ids.is_empty() {
            RequestId::new()
        } else {
            self.ids[index % self.ids.len()]
        }
    }

    fn send(&mut self, action: RideAction) {
        let _ = self.reducer.reduce(&mut self.state, action, &self.env);
    }

    fn apply(&mut self, op: &Op) {
        match *op {
            Op::Submit { name } => {
                let request_id = RequestId::new();
                self.ids.push(request_id);
                self.send(RideAction::SubmitRequest {
                    request_id,
                    form: RequestForm::new(NAMES[name], "Main St"),
                });
            },
            Op::Resubmit { request, name } => {
                let request_id = self.request(request);
                self.send(RideAction::SubmitRequest {
                    request_id,
                    form: RequestForm::new(NAMES[name], "Elm St"),
                });
            },
            Op::Expire { request } => {
                let request_id = self.request(request);
                self.send(RideAction::ExpireWindow { request_id });
            },
            Op::Accept { request, driver } => {
                let request_id = self.request(request);
                self.send(RideAction::AcceptRequest {
                    request_id,
                    driver_id: DriverId::new(DRIVERS[driver].0),
                });
            },
            Op::UserCancel { request } => {
                let request_id = self.request(request);
                self.send(RideAction::CancelByUser { request_id });
            },
            Op::DriverCancel {
                request,
                driver,
                help,
            } => {
                let request_id = self.request(request);
                self.send(RideAction::CancelByRideSharer {
                    request_id,
                    driver_id: DriverId::new(DRIVERS[driver].0),
                    help,
                });
            },
            Op::Message { request } => {
                let request_id = self.request(request);
                self.send(RideAction::SendRideSharerMessage {
                    request_id,
                    text: "On my way".to_string(),
                });
            },
            Op::SignIn { driver, correct } => {
                let (id, passcode) = DRIVERS[driver];
                self.send(RideAction::SelectDriver {
                    driver_id: DriverId::new(id),
                });
                self.send(RideAction::SignIn {
                    passcode: if correct { passcode } else { "wrong" }.to_string(),
                });
            },
            Op::SignOut => self.send(RideAction::SignOut),
            Op::Tick => self.send(RideAction::NoticeTick),
            Op::AdvanceMinutes { minutes } => {
                self.clock.advance(chrono::Duration::minutes(minutes));
            },
        }
    }
}

fn check_invariants(state: &RideBoardState) -> Result<(), TestCaseError> {
    let mut active_names = HashSet::new();
    let mut ids = HashSet::new();

    for request in &state.requests {
        prop_assert!(ids.insert(request.id), "request id {} used twice", request.id);
        prop_assert_eq!(
            request.status == RequestStatus::Accepted,
            request.accepted_by.is_some(),
            "accepted_by must be set iff Accepted: {:?}",
            request
        );
        prop_assert_eq!(request.accepted_by.is_some(), request.accepted_at.is_some());
        prop_assert_ne!(request.status, RequestStatus::CancelledByRideSharer);
        if request.window_timer.is_some() {
            prop_assert_eq!(request.status, RequestStatus::Open);
        }
        if request.last_cancelled_by.is_some() {
            prop_assert_eq!(request.status, RequestStatus::Pending);
        }
        if request.status.is_active() {
            prop_assert!(
                active_names.insert(request.normalized_user_name()),
                "two active requests for {}",
                request.user_name
            );
        }
    }

    let user_cancellations = state
        .history
        .iter()
        .filter(|e| e.kind == HistoryKind::CancelledByUser)
        .count();
    let cancelled_requests = state
        .requests
        .iter()
        .filter(|r| r.status == RequestStatus::CancelledByUser)
        .count();
    prop_assert_eq!(user_cancellations, cancelled_requests);

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_lifecycle_invariants_hold(ops in prop::collection::vec(any_op(), 1..80)) {
        let mut harness = Harness::new();
        let mut terminal: HashMap<RequestId, usize> = HashMap::new();

        for op in &ops {
            let history_before = harness.state.history.len();
            harness.apply(op);

            check_invariants(&harness.state)?;

            // History is append-only and grows by at most one event per command
            let history_after = harness.state.history.len();
            prop_assert!(history_after >= history_before);
            prop_assert!(history_after - history_before <= 1);

            // User cancellation is terminal
            for request in &harness.state.requests {
                if request.status == RequestStatus::CancelledByUser {
                    terminal.entry(request.id).or_insert(request.messages.len());
                }
            }
            for (id, messages) in &terminal {
                let request = harness.state.get(id).unwrap();
                prop_assert_eq!(request.status, RequestStatus::CancelledByUser);
                prop_assert_eq!(request.messages.len(), *messages);
            }
        }
    }

    #[test]
    fn prop_notice_counts_recent_user_cancellations(ops in prop::collection::vec(any_op(), 1..80)) {
        let mut harness = Harness::new();
        for op in &ops {
            harness.apply(op);
        }
        harness.send(RideAction::NoticeTick);

        let now = rideboard_core::environment::Clock::now(&harness.clock);
        let cutoff = now - chrono::Duration::hours(1);
        let expected = harness
            .state
            .history
            .iter()
            .filter(|e| e.kind == HistoryKind::CancelledByUser && e.at >= cutoff)
            .count();

        prop_assert_eq!(
            harness.state.cancellation_notice.map_or(0, |n| n.count),
            expected
        );
        prop_assert_eq!(
            history::user_cancellations_in_last_hour(&harness.state.history, now),
            expected
        );
    }
}
