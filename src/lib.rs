/*!
 * Recursive RW Lock
 *
 * A reader-writer lock packed into one atomic word, with reentrant write
 * acquisition, writer-held reads, and a fail-fast deadline on every wait.
 *
 * - `core::sync`: the lock, its packed state, and its wait policy
 * - `core::guard`: scoped read and write guards
 * - `core::id`: per-thread owner tags
 * - `core::errors`: lock invariant violations and how they are raised
 * - `monitoring`: tracing subscriber setup for host binaries
 */

pub mod core;
pub mod monitoring;

// Re-exports
pub use crate::core::errors::{LockMode, LockResult, LockViolation, ViolationPolicy};
pub use crate::core::guard::{scoped_read_guard, scoped_write_guard, Guard, ReadGuard, WriteGuard};
pub use crate::core::id::ThreadTag;
pub use crate::core::sync::{
    LockConfig, LockPhase, LockSnapshot, ReentrantRwLock, SpinPolicy, YieldStrategy,
};
pub use monitoring::init_tracing;
