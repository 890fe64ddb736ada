//! Bounded exponential backoff for provider calls.

use std::time::Duration;

use top_movers_core::PacingConfig;

use crate::error::ErrorKind;
use crate::pacer::jitter;

/// Retry schedule for one logical provider call.
///
/// The delay before attempt `n + 1` is
/// `min(max_backoff, base * 2^(n - 1)) + jitter`, where `base` depends on
/// whether attempt `n` was rate limited or hit a server/network failure.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_429_backoff: Duration,
    pub base_5xx_backoff: Duration,
    pub max_backoff: Duration,
    pub jitter_max: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &PacingConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_429_backoff: config.base_429_backoff(),
            base_5xx_backoff: config.base_5xx_backoff(),
            max_backoff: config.max_backoff(),
            jitter_max: config.jitter_max(),
        }
    }

    /// Deterministic part of the delay after a failed `attempt` (1-based).
    ///
    /// Returns `None` for error kinds that are never retried.
    #[must_use]
    pub fn backoff(&self, kind: ErrorKind, attempt: u32) -> Option<Duration> {
        let base = match kind {
            ErrorKind::RateLimited => self.base_429_backoff,
            ErrorKind::Server | ErrorKind::Network => self.base_5xx_backoff,
            ErrorKind::Client | ErrorKind::Malformed => return None,
        };
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        Some(base.saturating_mul(factor).min(self.max_backoff))
    }

    /// Full delay before the next attempt, or `None` once the call should
    /// give up.
    #[must_use]
    pub fn next_delay(&self, state: &RetryState) -> Option<Duration> {
        if state.attempt >= self.max_attempts {
            return None;
        }
        let kind = state.last_error_kind?;
        self.backoff(kind, state.attempt)
            .map(|delay| delay + jitter(self.jitter_max))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&PacingConfig::default())
    }
}

/// Progress of one logical call through the retry schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    /// Attempts made so far.
    pub attempt: u32,
    pub last_error_kind: Option<ErrorKind>,
}

impl RetryState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.attempt
    }

    pub fn record_failure(&mut self, kind: ErrorKind) {
        self.last_error_kind = Some(kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 4,
            base_429_backoff: Duration::from_secs(2),
            base_5xx_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            jitter_max: Duration::ZERO,
        }
    }

    #[test]
    fn test_rate_limit_backoff_doubles_and_caps() {
        let policy = policy();
        let delays: Vec<Duration> = (1..=5)
            .map(|n| policy.backoff(ErrorKind::RateLimited, n).unwrap())
            .collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
                Duration::from_secs(10),
                Duration::from_secs(10),
            ]
        );
    }

    #[test]
    fn test_server_and_network_share_base() {
        let policy = policy();
        assert_eq!(
            policy.backoff(ErrorKind::Server, 1),
            Some(Duration::from_millis(500))
        );
        assert_eq!(
            policy.backoff(ErrorKind::Network, 3),
            Some(Duration::from_secs(2))
        );
    }

    #[test]
    fn test_client_and_malformed_are_not_retried() {
        let policy = policy();
        assert_eq!(policy.backoff(ErrorKind::Client, 1), None);
        assert_eq!(policy.backoff(ErrorKind::Malformed, 1), None);
    }

    #[test]
    fn test_next_delay_stops_at_max_attempts() {
        let policy = policy();
        let mut state = RetryState::new();
        for _ in 0..3 {
            state.begin_attempt();
            state.record_failure(ErrorKind::RateLimited);
            assert!(policy.next_delay(&state).is_some());
        }
        state.begin_attempt();
        state.record_failure(ErrorKind::RateLimited);
        assert_eq!(state.attempt, 4);
        assert_eq!(policy.next_delay(&state), None);
    }

    #[test]
    fn test_next_delay_includes_bounded_jitter() {
        let policy = RetryPolicy {
            jitter_max: Duration::from_millis(250),
            ..policy()
        };
        let state = RetryState {
            attempt: 1,
            last_error_kind: Some(ErrorKind::RateLimited),
        };
        for _ in 0..50 {
            let delay = policy.next_delay(&state).unwrap();
            assert!(delay >= Duration::from_secs(2));
            assert!(delay <= Duration::from_millis(2250));
        }
    }

    #[test]
    fn test_huge_attempt_does_not_overflow() {
        assert_eq!(
            policy().backoff(ErrorKind::RateLimited, 200),
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn test_default_matches_config_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.base_429_backoff, Duration::from_secs(2));
        assert_eq!(policy.max_backoff, Duration::from_secs(10));
    }
}
