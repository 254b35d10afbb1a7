/*!
 * Lock Limits and Constants
 *
 * Default bounds for the spin-then-yield wait loop and the packed lock word.
 *
 * - Performance-critical constants are marked with [PERF]
 * - Constants whose expiry terminates the process are marked with [FATAL]
 */

use std::time::Duration;

// =============================================================================
// WAIT POLICY
// =============================================================================

/// Spin iterations before yielding the time slice (100)
/// [PERF] Short critical sections usually clear within this many pause hints
pub const DEFAULT_MAX_SPINS: u32 = 100;

/// Spin iterations for latency-sensitive locks (1000)
pub const LOW_LATENCY_MAX_SPINS: u32 = 1000;

/// Spin iterations for locks expected to be held across slow work (10)
pub const LONG_WAIT_MAX_SPINS: u32 = 10;

/// Wall-clock ceiling for a single acquire (10 seconds)
/// [FATAL] Exceeding it raises a contention-timeout violation
pub const DEFAULT_LOCK_DEADLINE: Duration = Duration::from_secs(10);

/// Wall-clock ceiling for latency-sensitive locks (1 second)
/// [FATAL]
pub const LOW_LATENCY_LOCK_DEADLINE: Duration = Duration::from_secs(1);

/// Wall-clock ceiling for locks held across slow work (60 seconds)
/// [FATAL]
pub const LONG_WAIT_LOCK_DEADLINE: Duration = Duration::from_secs(60);

/// Sleep used by `YieldStrategy::Sleep` presets (50µs)
pub const DEFAULT_BACKOFF_SLEEP: Duration = Duration::from_micros(50);

// =============================================================================
// LOCK WORD LAYOUT
// =============================================================================

/// Bit offset of the owner tag inside the lock word
pub const OWNER_SHIFT: u32 = 32;

/// Mask selecting the reader count inside the lock word
pub const READER_MASK: u64 = (1 << OWNER_SHIFT) - 1;

/// Largest reader count the lock word can hold
pub const MAX_READERS: u32 = u32::MAX;

// =============================================================================
// ENVIRONMENT OVERRIDES
// =============================================================================

/// Overrides `SpinPolicy::max_spins`
pub const ENV_MAX_SPINS: &str = "RWLOCK_MAX_SPINS";

/// Overrides `SpinPolicy::deadline`, in milliseconds
pub const ENV_DEADLINE_MS: &str = "RWLOCK_DEADLINE_MS";

/// Overrides `LockConfig::on_violation` (`abort` or `panic`)
pub const ENV_ON_VIOLATION: &str = "RWLOCK_ON_VIOLATION";

/// Enables JSON trace output when set to `1` or `true`
pub const ENV_TRACE_JSON: &str = "RWLOCK_TRACE_JSON";
