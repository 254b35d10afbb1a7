/*!
 * Synchronization Configuration
 *
 * Wait policy and violation handling for the reader-writer lock
 */

use crate::core::errors::ViolationPolicy;
use crate::core::limits::*;
use std::time::Duration;
use tracing::warn;

/// What a waiter does once its spin budget is used up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YieldStrategy {
    /// Give the rest of the time slice back to the scheduler
    Yield,
    /// Keep issuing CPU pause hints (lowest latency, burns the core)
    SpinHint,
    /// Sleep for a fixed interval
    Sleep(Duration),
}

/// Bounded spin-then-yield policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinPolicy {
    /// Failed attempts before yielding
    pub max_spins: u32,
    /// Action taken after `max_spins` failed attempts
    pub yield_strategy: YieldStrategy,
    /// Total wall-clock budget for one acquire, measured from its first attempt
    pub deadline: Duration,
}

impl Default for SpinPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl SpinPolicy {
    pub const DEFAULT: Self = Self {
        max_spins: DEFAULT_MAX_SPINS,
        yield_strategy: YieldStrategy::Yield,
        deadline: DEFAULT_LOCK_DEADLINE,
    };

    /// Policy for locks guarding very short critical sections
    pub const fn low_latency() -> Self {
        Self {
            max_spins: LOW_LATENCY_MAX_SPINS,
            yield_strategy: YieldStrategy::Yield,
            deadline: LOW_LATENCY_LOCK_DEADLINE,
        }
    }

    /// Policy for locks held across slow work
    pub const fn long_wait() -> Self {
        Self {
            max_spins: LONG_WAIT_MAX_SPINS,
            yield_strategy: YieldStrategy::Sleep(DEFAULT_BACKOFF_SLEEP),
            deadline: LONG_WAIT_LOCK_DEADLINE,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_max_spins(mut self, max_spins: u32) -> Self {
        self.max_spins = max_spins;
        self
    }

    pub fn with_yield_strategy(mut self, yield_strategy: YieldStrategy) -> Self {
        self.yield_strategy = yield_strategy;
        self
    }
}

/// Full configuration of one lock instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockConfig {
    pub spin: SpinPolicy,
    pub on_violation: ViolationPolicy,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl LockConfig {
    /// Default spin policy, abort on violation
    pub const DEFAULT: Self = Self::new(SpinPolicy::DEFAULT, ViolationPolicy::Abort);

    pub const fn new(spin: SpinPolicy, on_violation: ViolationPolicy) -> Self {
        Self { spin, on_violation }
    }

    /// Short deadline, few spins, and panics instead of aborting
    ///
    /// Lets tests drive the timeout and violation paths in milliseconds and
    /// observe them with `catch_unwind` or `#[should_panic]`.
    pub const fn for_testing(deadline: Duration) -> Self {
        Self {
            spin: SpinPolicy {
                max_spins: LONG_WAIT_MAX_SPINS,
                yield_strategy: YieldStrategy::Yield,
                deadline,
            },
            on_violation: ViolationPolicy::Panic,
        }
    }

    /// Defaults overlaid with `RWLOCK_*` environment variables
    ///
    /// Environment variables:
    /// - RWLOCK_MAX_SPINS: spin attempts before yielding
    /// - RWLOCK_DEADLINE_MS: acquire deadline in milliseconds
    /// - RWLOCK_ON_VIOLATION: `abort` or `panic`
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_MAX_SPINS) {
            match raw.trim().parse::<u32>() {
                Ok(spins) => config.spin.max_spins = spins,
                Err(e) => warn!(key = ENV_MAX_SPINS, value = %raw, error = %e, "ignoring invalid lock setting"),
            }
        }

        if let Some(raw) = lookup(ENV_DEADLINE_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.spin.deadline = Duration::from_millis(ms),
                Err(e) => warn!(key = ENV_DEADLINE_MS, value = %raw, error = %e, "ignoring invalid lock setting"),
            }
        }

        if let Some(raw) = lookup(ENV_ON_VIOLATION) {
            match raw.parse::<ViolationPolicy>() {
                Ok(policy) => config.on_violation = policy,
                Err(e) => warn!(key = ENV_ON_VIOLATION, value = %raw, error = %e, "ignoring invalid lock setting"),
            }
        }

        config
    }
}
