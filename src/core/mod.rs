/*!
 * Core Module
 * Lock primitive, thread identity, guards, and error handling
 */

pub mod errors;
pub mod guard;
pub mod id;
pub mod limits;
pub mod sync;

// Re-export for convenience
pub use errors::*;
pub use guard::{scoped_read_guard, scoped_write_guard, Guard, ReadGuard, WriteGuard};
pub use id::{TagAllocator, ThreadTag};
