/*!
 * RAII Lock Guards
 *
 * Scoped acquisition of a [`ReentrantRwLock`](crate::core::sync::ReentrantRwLock)
 * with guaranteed release on every exit path, including unwinding.
 *
 * ## Design Principles
 *
 * 1. **Construct to acquire**: building a guard blocks under the lock's own
 *    spin and deadline policy
 * 2. **Drop to release**: exactly what was acquired is released, innermost
 *    guard first
 * 3. **Thread-bound**: guards are `!Send` and not `Clone`
 *
 * ## Example
 *
 * ```rust
 * use recursive_rwlock::{scoped_read_guard, scoped_write_guard, ReentrantRwLock};
 *
 * let lock = ReentrantRwLock::new();
 * {
 *     let _w = scoped_write_guard(&lock);
 *     let _r = scoped_read_guard(&lock); // writer-held read
 * } // read released, then write
 * ```
 */

mod lock;
mod traits;

pub use lock::{scoped_read_guard, scoped_write_guard, ReadGuard, WriteGuard};
pub use traits::Guard;
