//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when creating `Effect` variants, particularly
//! for timers that must be cancellable later.

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use rideboard_core::async_effect;
///
/// async_effect! {
///     renderer.refresh(View::NoticeBar);
///     None
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use rideboard_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(300),
///     action: RideAction::ExpireWindow { request_id }
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}

/// Create a cancellable `Effect::Delay` registered under an [`EffectId`](crate::effect::EffectId)
///
/// # Example
///
/// ```rust,ignore
/// use rideboard_core::cancellable_delay;
///
/// cancellable_delay! {
///     id: request.window_timer_id(),
///     duration: request.window,
///     action: RideAction::ExpireWindow { request_id }
/// }
/// ```
#[macro_export]
macro_rules! cancellable_delay {
    (
        id: $id:expr,
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Cancellable {
            id: $id,
            effect: ::std::boxed::Box::new($crate::delay! {
                duration: $duration,
                action: $action
            }),
        }
    };
}
