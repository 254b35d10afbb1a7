/*!
 * Synchronization Primitives
 *
 * A reentrant reader-writer lock whose whole state is one atomic word,
 * plus the wait policy it runs under:
 * - Packed owner/reader word with named field accessors
 * - Bounded spin-then-yield backoff
 * - Wall-clock deadline whose expiry is a lock violation
 *
 * # Memory ordering
 *
 * Every access to a lock word is `SeqCst`. Threads observe a single total
 * order of lock transitions.
 */

mod config;
mod locks;
mod spinwait;

pub use config::{LockConfig, SpinPolicy, YieldStrategy};
pub use locks::{LockPhase, LockSnapshot, LockState, LockWord, ReentrantRwLock};
pub use spinwait::{DeadlineExceeded, SpinWait};
