//! Backoff policy
//!
//! Each failure class has its own multiplier and ceiling. Throttling
//! responses (429/503) back off hard; generic failures back off gently but
//! consume the failure budget.

use std::time::Duration;

/// Delays and limits applied by the poller
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    /// Delay between polls while the job is healthy, and after any success
    pub base_delay: Duration,

    /// Consecutive counted failures before the job is given up on
    pub max_failures: u32,

    /// 429 without `Retry-After`: delay = max(current * multiplier, floor)
    pub rate_limit_multiplier: u32,
    pub rate_limit_floor: Duration,
    pub rate_limit_ceiling: Duration,

    /// 503: delay = current * multiplier
    pub overload_multiplier: u32,
    pub overload_ceiling: Duration,

    /// Other non-2xx statuses
    pub server_error_multiplier: f64,
    pub server_error_ceiling: Duration,

    /// Timeouts and transport failures
    pub network_multiplier: u32,
    pub network_ceiling: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(2_000),
            max_failures: 3,
            rate_limit_multiplier: 3,
            rate_limit_floor: Duration::from_millis(30_000),
            rate_limit_ceiling: Duration::from_millis(120_000),
            overload_multiplier: 4,
            overload_ceiling: Duration::from_millis(180_000),
            server_error_multiplier: 1.5,
            server_error_ceiling: Duration::from_millis(10_000),
            network_multiplier: 2,
            network_ceiling: Duration::from_millis(15_000),
        }
    }
}

impl BackoffPolicy {
    /// Creates the default policy with a different base delay and failure budget
    pub fn with_limits(base_delay: Duration, max_failures: u32) -> Self {
        Self {
            base_delay,
            max_failures,
            ..Self::default()
        }
    }

    /// Delay after a 429, honouring `Retry-After` when the server sent one
    pub fn after_rate_limit(&self, current: Duration, retry_after: Option<Duration>) -> Duration {
        let delay = match retry_after {
            Some(wait) => wait,
            None => current
                .saturating_mul(self.rate_limit_multiplier)
                .max(self.rate_limit_floor),
        };
        delay.min(self.rate_limit_ceiling)
    }

    /// Delay after a 503
    pub fn after_overload(&self, current: Duration) -> Duration {
        current
            .saturating_mul(self.overload_multiplier)
            .min(self.overload_ceiling)
    }

    /// Delay after any other non-2xx status
    pub fn after_server_error(&self, current: Duration) -> Duration {
        let millis = (current.as_millis() as f64 * self.server_error_multiplier).round();
        Duration::from_millis(millis as u64).min(self.server_error_ceiling)
    }

    /// Delay after a timeout or transport failure
    pub fn after_network_failure(&self, current: Duration) -> Duration {
        current
            .saturating_mul(self.network_multiplier)
            .min(self.network_ceiling)
    }
}
