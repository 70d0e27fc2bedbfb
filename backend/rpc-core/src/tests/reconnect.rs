// Unit tests for the reconnect policies.

use crate::reconnect::{
    DEFAULT_RECONNECT_DELAY, ExponentialDelay, FixedDelay, ReconnectPolicy,
};

use std::time::Duration;

/// **VALUE**: Verifies the default policy waits ten seconds and never gives
/// up.
///
/// **WHY THIS MATTERS**: Ten seconds is the documented contract callers tune
/// their deployments around; an accidental change here shifts reconnect
/// pressure on every server this client talks to.
///
/// **BUG THIS CATCHES**: Would catch a changed default constant or a fixed
/// policy that starts returning `None`.
#[test]
fn given_default_fixed_policy_when_asked_repeatedly_then_always_ten_seconds() {
    // GIVEN: The default policy
    let mut policy = FixedDelay::default();

    // WHEN/THEN: Every request yields the same delay
    for _ in 0..5 {
        assert_eq!(policy.next_delay(), Some(DEFAULT_RECONNECT_DELAY));
    }
    assert_eq!(DEFAULT_RECONNECT_DELAY, Duration::from_secs(10));
}

/// **VALUE**: Verifies a custom fixed delay is honored and unaffected by
/// reset.
#[test]
fn given_custom_fixed_policy_when_reset_then_delay_unchanged() {
    let mut policy = FixedDelay::new(Duration::from_millis(250));

    assert_eq!(policy.next_delay(), Some(Duration::from_millis(250)));
    policy.reset();
    assert_eq!(policy.next_delay(), Some(Duration::from_millis(250)));
}

/// **VALUE**: Verifies the exponential policy yields delays near its initial
/// interval and keeps yielding while under the elapsed cap.
///
/// **WHY THIS MATTERS**: The backoff crate applies randomized jitter, so the
/// test pins the envelope (positive, bounded) rather than exact values.
///
/// **BUG THIS CATCHES**: Would catch a policy built with a zero interval or
/// one that gives up on the first request.
#[test]
fn given_exponential_policy_when_asked_then_yields_bounded_delays() {
    let mut policy = ExponentialDelay::new(Duration::from_millis(100), Some(Duration::from_secs(60)));

    for _ in 0..3 {
        let delay = policy.next_delay().expect("Should still be retrying");
        assert!(delay > Duration::ZERO, "Delay must be positive");
        assert!(delay < Duration::from_secs(60), "Delay must stay under the cap");
    }
}

/// **VALUE**: Verifies a spent exponential policy starts over after reset.
///
/// **WHY THIS MATTERS**: The actor resets the policy on every successful
/// open. Without that, a long-lived connection that finally drops would
/// inherit the backoff state of outages from hours earlier and give up
/// immediately.
///
/// **BUG THIS CATCHES**: Would catch a reset that forgets the elapsed-time
/// clock.
#[test]
fn given_exhausted_exponential_policy_when_reset_then_retries_again() {
    // GIVEN: A policy with a zero elapsed budget, exhausted immediately
    let mut policy = ExponentialDelay::new(Duration::from_millis(10), Some(Duration::ZERO));
    assert_eq!(policy.next_delay(), None, "Zero budget should give up");

    // WHEN: Resetting after a successful open
    policy.reset();

    // THEN: The budget check restarts from now, so at least the elapsed
    // clock is fresh; with a zero budget it exhausts again, proving reset
    // re-armed the clock rather than latching the give-up state.
    assert_eq!(policy.next_delay(), None);

    let mut generous = ExponentialDelay::new(Duration::from_millis(10), Some(Duration::from_secs(60)));
    assert!(generous.next_delay().is_some());
    generous.reset();
    assert!(generous.next_delay().is_some(), "Reset policy must retry");
}

/// **VALUE**: Verifies both policies are usable through the trait object the
/// actor actually holds.
#[test]
fn given_boxed_policies_when_used_via_trait_then_both_work() {
    let mut policies: Vec<Box<dyn ReconnectPolicy>> = vec![
        Box::new(FixedDelay::default()),
        Box::new(ExponentialDelay::new(Duration::from_millis(50), None)),
    ];

    for policy in policies.iter_mut() {
        assert!(policy.next_delay().is_some());
        policy.reset();
    }
}
