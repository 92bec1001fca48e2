//! Retry schedules for lock acquisition.

use std::time::Duration;

use booking_core::config::lock::SessionLockConfig;
use booking_core::error::AppError;

/// How the delay between attempts grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffStrategy {
    /// `min(initial * 2^n, max)` after the n-th failed attempt (0-based).
    Exponential,
    /// The initial delay after every failed attempt.
    Fixed,
}

/// Bounded retry schedule for [`DistributedLock::try_acquire_with_backoff`].
///
/// [`DistributedLock::try_acquire_with_backoff`]: crate::DistributedLock::try_acquire_with_backoff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Total acquisition attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub initial_delay: Duration,
    /// Cap for any single delay.
    pub max_delay: Duration,
    /// Growth strategy.
    pub strategy: BackoffStrategy,
}

impl BackoffPolicy {
    /// Exponential backoff capped at `max_delay`.
    pub fn exponential(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay,
            strategy: BackoffStrategy::Exponential,
        }
    }

    /// Constant delay between attempts.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay: delay,
            max_delay: delay,
            strategy: BackoffStrategy::Fixed,
        }
    }

    /// Look up a preset by name: `default`, `aggressive`, or `conservative`.
    pub fn named(name: &str) -> Result<Self, AppError> {
        match name.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::fixed(4, Duration::from_millis(200))),
            "aggressive" => Ok(Self::fixed(11, Duration::from_millis(100))),
            "conservative" => Ok(Self::exponential(
                6,
                Duration::from_millis(200),
                Duration::from_secs(3),
            )),
            other => Err(AppError::validation(format!(
                "Unknown backoff policy: '{other}'. Supported: default, aggressive, conservative"
            ))),
        }
    }

    /// Policy for the per-session lock, from configuration.
    pub fn from_config(config: &SessionLockConfig) -> Self {
        Self::exponential(
            config.max_attempts,
            config.initial_backoff(),
            config.max_backoff(),
        )
    }

    /// Delay to wait after failed attempt number `attempt` (0-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self.strategy {
            BackoffStrategy::Fixed => self.initial_delay,
            BackoffStrategy::Exponential => {
                let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
                self.initial_delay.saturating_mul(factor).min(self.max_delay)
            }
        }
    }

    /// Sum of every delay the schedule can insert.
    pub fn total_delay(&self) -> Duration {
        (0..self.max_attempts.saturating_sub(1))
            .map(|attempt| self.delay_for_attempt(attempt))
            .sum()
    }
}
