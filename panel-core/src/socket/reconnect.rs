use std::time::Duration;

/// Backoff policy for re-opening the panel socket.
///
/// `attempt` counts consecutive failures since the last successful open,
/// starting at 1 for the retry that follows a disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the first retry. No retry is ever scheduled sooner.
    pub initial_delay: Duration,
    /// Upper bound for the grown delay.
    pub max_delay: Duration,
    /// Growth factor per consecutive failure.
    pub multiplier: u32,
    /// Consecutive failures tolerated before giving up. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(5000),
            max_delay: Duration::from_secs(60),
            multiplier: 2,
            max_attempts: Some(30),
        }
    }
}

impl ReconnectPolicy {
    /// Fixed delay, unbounded retries.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            max_delay: delay,
            multiplier: 1,
            max_attempts: None,
        }
    }

    /// Delay before retry number `attempt`, or `None` once the budget is spent.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 {
            return Some(self.initial_delay);
        }
        if self.max_attempts.is_some_and(|max| attempt > max) {
            return None;
        }
        let factor = self
            .multiplier
            .max(1)
            .checked_pow(attempt - 1)
            .unwrap_or(u32::MAX);
        let grown = self
            .initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay);
        Some(grown.min(self.max_delay).max(self.initial_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_retry_waits_the_initial_delay() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(1), Some(Duration::from_secs(5)));
    }

    #[test]
    fn delay_grows_then_caps() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(2), Some(Duration::from_secs(10)));
        assert_eq!(policy.delay_for(3), Some(Duration::from_secs(20)));
        assert_eq!(policy.delay_for(5), Some(Duration::from_secs(60)));
        assert_eq!(policy.delay_for(30), Some(Duration::from_secs(60)));
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let policy = ReconnectPolicy { max_attempts: Some(3), ..Default::default() };
        assert!(policy.delay_for(3).is_some());
        assert_eq!(policy.delay_for(4), None);
    }

    #[test]
    fn fixed_policy_never_gives_up_or_grows() {
        let policy = ReconnectPolicy::fixed(Duration::from_millis(5000));
        assert_eq!(policy.delay_for(1), Some(Duration::from_millis(5000)));
        assert_eq!(policy.delay_for(1000), Some(Duration::from_millis(5000)));
    }

    #[test]
    fn huge_attempt_counts_do_not_overflow() {
        let policy = ReconnectPolicy { max_attempts: None, ..Default::default() };
        assert_eq!(policy.delay_for(u32::MAX), Some(Duration::from_secs(60)));
    }
}
