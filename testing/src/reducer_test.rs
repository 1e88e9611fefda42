//! Ergonomic testing utilities for reducers
//!
//! This module provides a fluent API for testing reducers with readable Given-When-Then syntax.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use rideboard_core::{effect::Effect, reducer::Reducer};

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for effect assertion functions
type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// Several actions may be given; they are reduced in order and the effect
/// assertions see the effects of the last one.
///
/// # Example
///
/// ```ignore
/// use rideboard_testing::ReducerTest;
///
/// ReducerTest::new(RideReducer::new())
///     .with_env(test_environment())
///     .given_state(RideBoardState::default())
///     .when_action(RideAction::SubmitRequest { request_id, form })
///     .then_state(|state| {
///         assert_eq!(state.requests.len(), 1);
///     })
///     .then_effects(|effects| {
///         assert_eq!(effects.len(), 2);
///     })
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    actions: Vec<A>,
    state_assertions: Vec<StateAssertion<S>>,
    effect_assertions: Vec<EffectAssertion<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            actions: Vec::new(),
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Set the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Add an action to reduce (When)
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.actions.push(action);
        self
    }

    /// Add several actions to reduce in order (When)
    #[must_use]
    pub fn when_actions(mut self, actions: impl IntoIterator<Item = A>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the effects of the last action (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state, actions, or environment are not set,
    /// or if any assertions fail.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        assert!(
            !self.actions.is_empty(),
            "At least one action must be set with when_action()"
        );

        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        let mut effects = Vec::new();
        for action in self.actions {
            effects = self.reducer.reduce(&mut state, action, &env).into_vec();
        }

        for assertion in self.state_assertions {
            assertion(&state);
        }

        for assertion in self.effect_assertions {
            assertion(&effects);
        }
    }
}

/// Helper assertions for effects
pub mod assertions {
    use rideboard_core::effect::{Effect, EffectId};
    use std::time::Duration;

    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if effects is not empty.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.is_empty() || matches!(effects, [Effect::None]),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert the number of effects
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {} effects, but found {}",
            expected,
            effects.len()
        );
    }

    /// Assert that effects contain at least one Future effect
    ///
    /// # Panics
    ///
    /// Panics if no Future effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Future(_))),
            "Expected at least one Future effect, but none found"
        );
    }

    /// Find a delay scheduled under `id`, returning its duration and action
    #[must_use]
    pub fn find_scheduled<'a, A>(
        effects: &'a [Effect<A>],
        id: &EffectId,
    ) -> Option<(Duration, &'a A)> {
        effects.iter().find_map(|effect| match effect {
            Effect::Cancellable {
                id: scheduled,
                effect,
            } if scheduled == id => match effect.as_ref() {
                Effect::Delay { duration, action } => Some((*duration, action.as_ref())),
                _ => None,
            },
            Effect::Parallel(children) | Effect::Sequential(children) => {
                find_scheduled(children, id)
            },
            _ => None,
        })
    }

    /// Assert that a cancellable delay was scheduled under `id`
    ///
    /// Returns the scheduled duration and action for further checks.
    ///
    /// # Panics
    ///
    /// Panics if no such effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_schedules<'a, A: std::fmt::Debug>(
        effects: &'a [Effect<A>],
        id: &EffectId,
    ) -> (Duration, &'a A) {
        find_scheduled(effects, id).unwrap_or_else(|| {
            panic!("Expected a cancellable delay under {id}, found {effects:?}")
        })
    }

    /// Whether the effects cancel `id`
    #[must_use]
    pub fn cancels<A>(effects: &[Effect<A>], id: &EffectId) -> bool {
        effects.iter().any(|effect| match effect {
            Effect::Cancel { id: cancelled } => cancelled == id,
            Effect::Parallel(children) | Effect::Sequential(children) => cancels(children, id),
            _ => false,
        })
    }

    /// Assert that the effects cancel `id`
    ///
    /// # Panics
    ///
    /// Panics if no matching `Cancel` effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_cancels<A: std::fmt::Debug>(effects: &[Effect<A>], id: &EffectId) {
        assert!(
            cancels(effects, id),
            "Expected a cancel of {id}, found {effects:?}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rideboard_core::effect::{Effect, EffectId};
    use rideboard_core::reducer::Reducer;
    use smallvec::{smallvec, SmallVec};
    use std::time::Duration;

    #[derive(Clone, Debug)]
    struct TestState {
        count: i32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Increment,
        Arm,
        Disarm,
    }

    struct TestReducer;

    struct TestEnv;

    const ALARM: EffectId = EffectId::from_static("alarm");

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Increment => {
                    state.count += 1;
                    smallvec![Effect::None]
                },
                TestAction::Arm => smallvec![
                    Effect::Delay {
                        duration: Duration::from_secs(3),
                        action: Box::new(TestAction::Increment),
                    }
                    .cancellable(ALARM)
                ],
                TestAction::Disarm => smallvec![Effect::Parallel(vec![Effect::Cancel { id: ALARM }])],
            }
        }
    }

    #[test]
    fn test_reducer_test_runs_actions_in_order() {
        ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState { count: 0 })
            .when_actions([TestAction::Increment, TestAction::Increment])
            .then_state(|state| {
                assert_eq!(state.count, 2);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_assert_schedules_finds_cancellable_delay() {
        ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState { count: 0 })
            .when_action(TestAction::Arm)
            .then_effects(|effects| {
                let (duration, action) = assertions::assert_schedules(effects, &ALARM);
                assert_eq!(duration, Duration::from_secs(3));
                assert_eq!(action, &TestAction::Increment);
                assert!(!assertions::cancels(effects, &ALARM));
            })
            .run();
    }

    #[test]
    fn test_assert_cancels_looks_inside_groups() {
        ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState { count: 0 })
            .when_action(TestAction::Disarm)
            .then_effects(|effects| assertions::assert_cancels(effects, &ALARM))
            .run();
    }

    #[test]
    fn test_assertions_effects_count() {
        assertions::assert_effects_count(&[Effect::<TestAction>::None], 1);
        assertions::assert_effects_count::<TestAction>(&[], 0);
    }
}
