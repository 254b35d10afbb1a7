/*!
 * Guard Traits
 *
 * Common surface of the scoped lock guards
 */

use crate::core::errors::LockMode;
use crate::core::sync::ReentrantRwLock;

/// A scoped acquisition that releases on drop
///
/// Guards are neither `Clone` nor `Send`: exactly one release happens, on
/// the thread that acquired.
pub trait Guard {
    /// Mode this guard holds
    fn mode(&self) -> LockMode;

    /// Lock this guard releases on drop
    fn lock(&self) -> &ReentrantRwLock;

    /// Whether the guard's thread currently owns the write side
    fn holds_write_side(&self) -> bool {
        self.lock().is_write_held_by_current_thread()
    }
}
