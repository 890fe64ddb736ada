//! Minimum spacing between provider calls.
//!
//! Spacing is a `governor` quota of one cell per `spacing` with a burst of
//! one, so consecutive call starts are at least `spacing` apart. The limiter
//! reads time from [`TokioClock`], which follows `tokio::time` and therefore
//! a paused test clock.

use std::time::Duration;

use governor::clock::Clock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use rand::Rng;
use tokio::time::sleep;

/// `governor` clock backed by `tokio::time::Instant`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        tokio::time::Instant::now().into_std()
    }
}

type DirectLimiter =
    RateLimiter<NotKeyed, InMemoryState, TokioClock, NoOpMiddleware<std::time::Instant>>;

/// Enforces a minimum interval between the start of consecutive calls.
pub struct Pacer {
    spacing: Duration,
    jitter_max: Duration,
    clock: TokioClock,
    /// `None` when spacing is zero.
    limiter: Option<DirectLimiter>,
}

impl std::fmt::Debug for Pacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacer")
            .field("spacing", &self.spacing)
            .field("jitter_max", &self.jitter_max)
            .finish_non_exhaustive()
    }
}

impl Pacer {
    #[must_use]
    pub fn new(spacing: Duration, jitter_max: Duration) -> Self {
        let clock = TokioClock;
        let limiter = Quota::with_period(spacing).map(|quota| {
            RateLimiter::direct_with_clock(quota.allow_burst(nonzero!(1u32)), &clock)
        });
        Self {
            spacing,
            jitter_max,
            clock,
            limiter,
        }
    }

    #[must_use]
    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    /// Waits until a call may start.
    ///
    /// Jitter is added only when the caller actually has to wait.
    pub async fn acquire(&self) {
        let Some(limiter) = &self.limiter else {
            return;
        };
        while let Err(not_until) = limiter.check() {
            let wait = not_until.wait_time_from(self.clock.now()) + jitter(self.jitter_max);
            tracing::debug!("Pacing provider call, waiting {:?}", wait);
            sleep(wait).await;
        }
    }
}

/// Uniform random duration in `[0, max]`.
pub(crate) fn jitter(max: Duration) -> Duration {
    if max.is_zero() {
        return Duration::ZERO;
    }
    rand::thread_rng().gen_range(Duration::ZERO..=max)
}
