/*!
 * Spin-Then-Yield Backoff
 *
 * Bounded busy-wait used by the lock acquire loops. Spins with CPU pause
 * hints up to the policy's spin budget, then yields per the policy's
 * strategy and starts a new batch. The wall-clock deadline is checked at
 * every batch boundary.
 */

use super::config::{SpinPolicy, YieldStrategy};
use std::hint;
use std::thread;
use std::time::{Duration, Instant};
use tracing::trace;

/// The wait ran past its policy's deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineExceeded {
    pub waited: Duration,
}

/// Backoff state for one acquire call
///
/// Create it right after the first failed attempt; the deadline is measured
/// from that moment.
pub struct SpinWait {
    policy: SpinPolicy,
    start: Instant,
    spins: u32,
    yields: u32,
}

impl SpinWait {
    pub fn new(policy: SpinPolicy) -> Self {
        Self {
            policy,
            start: Instant::now(),
            spins: 0,
            yields: 0,
        }
    }

    /// Back off once before the caller retries
    ///
    /// Returns `Err` once the deadline has passed; the caller must not retry.
    pub fn snooze(&mut self) -> Result<(), DeadlineExceeded> {
        if self.spins < self.policy.max_spins {
            self.spins += 1;
            hint::spin_loop();
            return Ok(());
        }

        self.spins = 0;

        let waited = self.start.elapsed();
        if waited >= self.policy.deadline {
            return Err(DeadlineExceeded { waited });
        }

        if self.yields == 0 {
            trace!(
                max_spins = self.policy.max_spins,
                strategy = ?self.policy.yield_strategy,
                "spin budget exhausted, backing off"
            );
        }
        self.yields += 1;

        match self.policy.yield_strategy {
            YieldStrategy::Yield => thread::yield_now(),
            YieldStrategy::SpinHint => hint::spin_loop(),
            YieldStrategy::Sleep(interval) => thread::sleep(interval),
        }

        Ok(())
    }

    /// Time since the wait started
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Number of times the spin budget ran out
    pub fn yields(&self) -> u32 {
        self.yields
    }
}
