//! Core-only integration tests — no tokio dependency

use resock_core::{CoreError, RetryConfig, RetryState, SocketState};
use std::time::Duration;

fn short_config(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        base_interval: Duration::from_millis(100),
    }
}

#[test]
fn test_backoff_sequence_with_defaults() {
    let mut state = RetryState::new(RetryConfig::default());

    // Attempt k (0-indexed) waits base * 2^k: 5000, 10000, 20000 ms
    assert_eq!(state.schedule(), Some(Duration::from_millis(5000)));
    state.fire().unwrap();
    assert_eq!(state.schedule(), Some(Duration::from_millis(10000)));
    state.fire().unwrap();
    assert_eq!(state.schedule(), Some(Duration::from_millis(20000)));
}

#[test]
fn test_schedule_is_idempotent_while_waiting() {
    let mut state = RetryState::new(short_config(10));

    assert!(state.schedule().is_some());
    assert_eq!(state.attempts(), 1);

    // Second trigger while the timer is pending: no-op
    assert!(state.schedule().is_none());
    assert!(state.schedule().is_none());
    assert_eq!(state.attempts(), 1);
    assert!(state.is_waiting());
}

#[test]
fn test_fire_clears_waiting() {
    let mut state = RetryState::new(short_config(10));

    state.schedule().unwrap();
    assert!(state.is_waiting());

    state.fire().unwrap();
    assert!(!state.is_waiting());

    // A new attempt may now be scheduled, with a doubled delay
    assert_eq!(state.schedule(), Some(Duration::from_millis(200)));
}

#[test]
fn test_exhaustion_after_max_attempts() {
    let mut state = RetryState::new(short_config(3));

    for _ in 0..2 {
        assert!(state.schedule().is_some());
        state.fire().unwrap();
    }

    // Third schedule brings the counter to the maximum; its firing fails
    assert!(state.schedule().is_some());
    let err = state.fire().unwrap_err();
    assert_eq!(err, CoreError::RetryExhausted { attempts: 3 });
    assert!(err.is_fatal());
    assert_eq!(
        err.to_string(),
        "Did not reconnect after maximum retries: 3",
    );
}

#[test]
fn test_cancel_releases_the_timer_slot() {
    let mut state = RetryState::new(short_config(5));

    state.schedule().unwrap();
    assert!(state.is_waiting());

    // An explicit connect abandons the pending timer; the attempt count
    // is kept so the next backoff still doubles
    state.cancel();
    assert!(!state.is_waiting());
    assert_eq!(state.attempts(), 1);
    assert_eq!(state.schedule(), Some(Duration::from_millis(200)));
}

#[test]
fn test_reset_restarts_the_cycle() {
    let mut state = RetryState::new(short_config(5));

    state.schedule().unwrap();
    state.fire().unwrap();
    state.schedule().unwrap();
    assert_eq!(state.attempts(), 2);

    // Successful connect: counter back to zero, first-attempt delay again
    state.reset();
    assert_eq!(state.attempts(), 0);
    assert!(!state.is_waiting());
    assert_eq!(state.schedule(), Some(Duration::from_millis(100)));
}

#[test]
fn test_happy_path_transitions() {
    let mut state = SocketState::default();
    assert_eq!(state, SocketState::Idle);

    state.transition(SocketState::Connecting).unwrap();
    state.transition(SocketState::Connected).unwrap();
    state.transition(SocketState::Closed).unwrap();
    state.transition(SocketState::ReconnectScheduled).unwrap();
    state.transition(SocketState::Connecting).unwrap();
    state.transition(SocketState::Connected).unwrap();
}

#[test]
fn test_illegal_transitions_rejected() {
    let mut state = SocketState::Idle;
    let err = state.transition(SocketState::Connected).unwrap_err();
    assert_eq!(
        err,
        CoreError::InvalidTransition {
            from: SocketState::Idle,
            to: SocketState::Connected,
        },
    );
    // The failed transition must not move the state
    assert_eq!(state, SocketState::Idle);

    let mut state = SocketState::Failed;
    assert!(state.transition(SocketState::ReconnectScheduled).is_err());
    // An explicit dial after exhaustion starts a fresh cycle
    state.transition(SocketState::Connecting).unwrap();
}

#[test]
fn test_destroy_reachable_from_every_state() {
    for from in [
        SocketState::Idle,
        SocketState::Connecting,
        SocketState::Connected,
        SocketState::Closed,
        SocketState::Errored,
        SocketState::ReconnectScheduled,
        SocketState::Failed,
        SocketState::Destroyed,
    ] {
        let mut state = from;
        state.transition(SocketState::Destroyed).unwrap();
        assert!(state.is_destroyed());
    }

    // And nothing leaves Destroyed except another destroy
    let mut state = SocketState::Destroyed;
    assert!(state.transition(SocketState::Connecting).is_err());
    assert!(state.transition(SocketState::ReconnectScheduled).is_err());
}
