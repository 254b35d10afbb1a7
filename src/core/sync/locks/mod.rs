/*!
 * Lock-Based Synchronization Primitives
 *
 * - Packed lock word (owner tag + reader count in one atomic)
 * - Reentrant reader-writer lock built on it
 */

mod rwlock;
mod state;

// Re-export public API
pub use rwlock::{LockSnapshot, ReentrantRwLock};
pub use state::{LockPhase, LockState, LockWord};
