/*!
 * Lock Guards
 *
 * Scoped read and write access to a [`ReentrantRwLock`]
 */

use super::traits::Guard;
use crate::core::errors::LockMode;
use crate::core::sync::ReentrantRwLock;
use std::fmt;
use std::marker::PhantomData;

/// `!Send` marker: the lock word records the acquiring thread, so the release
/// must happen on that thread too.
type NotSend = PhantomData<*const ()>;

/// Shared access held until drop
///
/// # Example
///
/// ```
/// use recursive_rwlock::{scoped_read_guard, ReentrantRwLock};
///
/// let lock = ReentrantRwLock::new();
/// let a = scoped_read_guard(&lock);
/// let b = scoped_read_guard(&lock);
/// assert_eq!(lock.snapshot().readers, 2);
/// drop(b);
/// drop(a);
/// ```
#[must_use = "the read lock is released as soon as the guard is dropped"]
pub struct ReadGuard<'a> {
    lock: &'a ReentrantRwLock,
    _not_send: NotSend,
}

impl<'a> ReadGuard<'a> {
    /// Wrap a read acquisition the caller has already made
    pub(crate) fn adopt(lock: &'a ReentrantRwLock) -> Self {
        Self {
            lock,
            _not_send: PhantomData,
        }
    }
}

impl Guard for ReadGuard<'_> {
    fn mode(&self) -> LockMode {
        LockMode::Read
    }

    fn lock(&self) -> &ReentrantRwLock {
        self.lock
    }
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_read();
    }
}

impl fmt::Debug for ReadGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadGuard").field("lock", self.lock).finish()
    }
}

/// Exclusive access held until drop
///
/// Nested write guards on one thread stack up; the lock is free again once
/// the outermost one drops.
#[must_use = "the write lock is released as soon as the guard is dropped"]
pub struct WriteGuard<'a> {
    lock: &'a ReentrantRwLock,
    _not_send: NotSend,
}

impl<'a> WriteGuard<'a> {
    /// Wrap a write acquisition the caller has already made
    pub(crate) fn adopt(lock: &'a ReentrantRwLock) -> Self {
        Self {
            lock,
            _not_send: PhantomData,
        }
    }

    /// Write nesting depth at this point
    pub fn depth(&self) -> u32 {
        self.lock.write_depth()
    }
}

impl Guard for WriteGuard<'_> {
    fn mode(&self) -> LockMode {
        LockMode::Write
    }

    fn lock(&self) -> &ReentrantRwLock {
        self.lock
    }
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_write();
    }
}

impl fmt::Debug for WriteGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteGuard")
            .field("depth", &self.depth())
            .field("lock", self.lock)
            .finish()
    }
}

/// Block until shared access is granted and hold it for the guard's scope
pub fn scoped_read_guard(lock: &ReentrantRwLock) -> ReadGuard<'_> {
    lock.read()
}

/// Block until exclusive access is granted and hold it for the guard's scope
pub fn scoped_write_guard(lock: &ReentrantRwLock) -> WriteGuard<'_> {
    lock.write()
}
