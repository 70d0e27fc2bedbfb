//! Reconnection policies.
//!
//! The connection actor asks its policy for a delay after every unexpected
//! close. [`FixedDelay`] is the default: one attempt per constant interval,
//! no backoff, no jitter, no attempt cap. [`ExponentialDelay`] is the
//! stricter substitute for deployments that want growing, capped retries.

use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};

/// Delay used by the default policy between an unexpected close and the next
/// connection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(10);

/// Decides whether and when to attempt the next reconnect.
pub trait ReconnectPolicy: Send {
    /// Delay before the next attempt, or `None` to give up for good.
    fn next_delay(&mut self) -> Option<Duration>;

    /// Called after a successful open so stateful policies can start over.
    fn reset(&mut self);
}

/// Constant-interval policy. Never gives up.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(DEFAULT_RECONNECT_DELAY)
    }
}

impl ReconnectPolicy for FixedDelay {
    fn next_delay(&mut self) -> Option<Duration> {
        Some(self.delay)
    }

    fn reset(&mut self) {}
}

/// Exponential backoff policy with jitter and an elapsed-time cap.
pub struct ExponentialDelay {
    inner: ExponentialBackoff,
}

impl ExponentialDelay {
    /// Start retrying around `initial`, giving up once `max_elapsed` of retry
    /// time has accumulated (`None` retries forever).
    pub fn new(initial: Duration, max_elapsed: Option<Duration>) -> Self {
        Self {
            inner: ExponentialBackoff {
                initial_interval: initial,
                max_elapsed_time: max_elapsed,
                ..Default::default()
            },
        }
    }
}

impl Default for ExponentialDelay {
    fn default() -> Self {
        Self {
            inner: ExponentialBackoff::default(),
        }
    }
}

impl ReconnectPolicy for ExponentialDelay {
    fn next_delay(&mut self) -> Option<Duration> {
        self.inner.next_backoff()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}
