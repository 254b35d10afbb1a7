/*!
 * Reentrant Reader-Writer Lock
 *
 * Writer ownership and reader count live in one packed atomic word (see
 * [`LockState`]). The write side is reentrant and its holder may also take
 * read access. Waiters spin, then yield, and give up with a
 * [`LockViolation::ContentionTimeout`] once the configured deadline passes.
 *
 * Writers and readers get no fairness guarantee. A held write lock blocks
 * new readers, and a steady stream of readers can starve a writer.
 */

use super::state::{LockPhase, LockState, LockWord};
use crate::core::errors::{LockMode, LockResult, LockViolation};
use crate::core::guard::{ReadGuard, WriteGuard};
use crate::core::id::ThreadTag;
use crate::core::sync::config::LockConfig;
use crate::core::sync::spinwait::SpinWait;
use serde::{Deserialize, Serialize};
use std::cell::UnsafeCell;
use std::fmt;
use tracing::{debug, instrument};

/// Point-in-time view of a lock word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSnapshot {
    pub owner: Option<ThreadTag>,
    pub readers: u32,
    pub phase: LockPhase,
}

impl From<LockWord> for LockSnapshot {
    fn from(word: LockWord) -> Self {
        Self {
            owner: word.owner(),
            readers: word.readers(),
            phase: word.phase(),
        }
    }
}

/// Reader-writer lock with recursive write acquisition
///
/// # Example
///
/// ```
/// use recursive_rwlock::ReentrantRwLock;
///
/// let lock = ReentrantRwLock::new();
/// {
///     let _outer = lock.write();
///     let _inner = lock.write(); // same thread, no deadlock
///     let _read = lock.read(); // writer-held read
/// }
/// assert!(lock.snapshot().owner.is_none());
/// ```
pub struct ReentrantRwLock {
    state: LockState,
    /// Nesting depth of the current write owner
    write_depth: UnsafeCell<u32>,
    config: LockConfig,
}

// SAFETY: `write_depth` is only read or written by the thread whose tag sits
// in the owner field of `state`. That field is set and cleared with SeqCst
// atomics by that same thread, so the owner's accesses are ordered before the
// next owner's CAS succeeds.
unsafe impl Sync for ReentrantRwLock {}

impl ReentrantRwLock {
    /// Lock with the default policy (10 s deadline, abort on violation)
    pub const fn new() -> Self {
        Self::with_config(LockConfig::DEFAULT)
    }

    pub const fn with_config(config: LockConfig) -> Self {
        Self {
            state: LockState::new(),
            write_depth: UnsafeCell::new(0),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Write side
    // ------------------------------------------------------------------

    /// Acquire exclusive access, blocking until it is granted
    ///
    /// Reentrant: a thread that already holds the write lock only bumps its
    /// nesting depth. A wait past the deadline is handed to the lock's
    /// violation policy and does not return.
    pub fn acquire_write(&self) {
        if let Err(violation) = self.acquire_write_checked() {
            self.config.on_violation.raise(violation);
        }
    }

    /// Like [`acquire_write`](Self::acquire_write) but returns the timeout
    pub fn acquire_write_checked(&self) -> LockResult<()> {
        let me = ThreadTag::current();
        if self.bump_depth_if_owner(me) || self.claim_write(me) {
            return Ok(());
        }
        self.acquire_write_contended(me)
    }

    /// Single non-blocking attempt at exclusive access
    pub fn try_acquire_write(&self) -> bool {
        let me = ThreadTag::current();
        self.bump_depth_if_owner(me) || self.claim_write(me)
    }

    /// Release one level of exclusive access
    ///
    /// The lock becomes free only when the outermost level is released.
    /// Releasing while writer-held reads are outstanding, or from a thread
    /// that does not own the lock, is handed to the violation policy.
    pub fn release_write(&self) {
        if let Err(violation) = self.release_write_checked() {
            self.config.on_violation.raise(violation);
        }
    }

    pub fn release_write_checked(&self) -> LockResult<()> {
        let me = ThreadTag::current();
        let word = self.state.load();

        if !word.is_owned_by(me) {
            return Err(LockViolation::NotOwner {
                thread: me,
                owner: word.owner_bits(),
            });
        }
        if word.readers() != 0 {
            return Err(LockViolation::LockOrderViolation {
                owner: me,
                outstanding_reads: word.readers(),
            });
        }

        // SAFETY: the owner field holds our tag.
        let depth = unsafe { &mut *self.write_depth.get() };
        *depth -= 1;
        if *depth == 0 {
            self.state.fetch_sub_owner(me);
        }
        Ok(())
    }

    #[inline]
    fn bump_depth_if_owner(&self, me: ThreadTag) -> bool {
        if !self.state.load().is_owned_by(me) {
            return false;
        }
        // SAFETY: the owner field holds our tag.
        unsafe { *self.write_depth.get() += 1 };
        true
    }

    #[inline]
    fn claim_write(&self, me: ThreadTag) -> bool {
        if !self
            .state
            .compare_and_swap(LockWord::EMPTY, LockWord::owned_by(me))
        {
            return false;
        }
        // SAFETY: the CAS just installed our tag as owner.
        unsafe { *self.write_depth.get() = 1 };
        true
    }

    #[cold]
    #[instrument(level = "trace", skip(self), fields(thread = %me))]
    fn acquire_write_contended(&self, me: ThreadTag) -> LockResult<()> {
        let mut backoff = SpinWait::new(self.config.spin);
        loop {
            if let Err(exceeded) = backoff.snooze() {
                return Err(LockViolation::ContentionTimeout {
                    mode: LockMode::Write,
                    thread: me,
                    waited: exceeded.waited,
                    deadline: self.config.spin.deadline,
                });
            }
            if self.claim_write(me) {
                debug!(
                    mode = %LockMode::Write,
                    waited_us = backoff.elapsed().as_micros() as u64,
                    yields = backoff.yields(),
                    "contended acquire"
                );
                return Ok(());
            }
        }
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    /// Acquire shared access, blocking while another thread holds the write lock
    ///
    /// The write owner itself gets read access immediately; those
    /// writer-held reads must be released before its write lock.
    pub fn acquire_read(&self) {
        if let Err(violation) = self.acquire_read_checked() {
            self.config.on_violation.raise(violation);
        }
    }

    pub fn acquire_read_checked(&self) -> LockResult<()> {
        let me = ThreadTag::current();
        if let Some(result) = self.add_writer_held_read(me) {
            return result;
        }
        if self.claim_read()? {
            return Ok(());
        }
        self.acquire_read_contended(me)
    }

    /// Single non-blocking attempt at shared access
    pub fn try_acquire_read(&self) -> LockResult<bool> {
        let me = ThreadTag::current();
        match self.add_writer_held_read(me) {
            Some(result) => result.map(|()| true),
            None => self.claim_read(),
        }
    }

    /// Release one shared access; never blocks
    ///
    /// Releasing with no reads outstanding is handed to the violation policy.
    pub fn release_read(&self) {
        if let Err(violation) = self.release_read_checked() {
            self.config.on_violation.raise(violation);
        }
    }

    pub fn release_read_checked(&self) -> LockResult<()> {
        // Decrement by CAS so an unbalanced release is caught before it can
        // borrow from the owner field.
        loop {
            let word = self.state.load();
            let Some(fewer) = word.remove_reader() else {
                return Err(LockViolation::UnbalancedRelease {
                    thread: ThreadTag::current(),
                });
            };
            if self.state.compare_and_swap(word, fewer) {
                return Ok(());
            }
        }
    }

    /// `Some` when `me` owns the write lock and the read was handled here
    #[inline]
    fn add_writer_held_read(&self, me: ThreadTag) -> Option<LockResult<()>> {
        let word = self.state.load();
        if !word.is_owned_by(me) {
            return None;
        }
        // Only the owner changes the count while the owner field is set.
        if word.add_reader().is_none() {
            return Some(Err(LockViolation::ReaderOverflow {
                readers: word.readers(),
            }));
        }
        self.state.fetch_add_reader();
        Some(Ok(()))
    }

    /// One CAS attempt from "no owner, n readers" to "no owner, n + 1 readers"
    ///
    /// The comparand carries only the freshly loaded count, so the swap fails
    /// whenever any writer holds the lock.
    #[inline]
    fn claim_read(&self) -> LockResult<bool> {
        let expected = LockWord::with_readers(self.state.load().readers());
        let desired = expected
            .add_reader()
            .ok_or(LockViolation::ReaderOverflow {
                readers: expected.readers(),
            })?;
        Ok(self.state.compare_and_swap(expected, desired))
    }

    #[cold]
    #[instrument(level = "trace", skip(self), fields(thread = %me))]
    fn acquire_read_contended(&self, me: ThreadTag) -> LockResult<()> {
        let mut backoff = SpinWait::new(self.config.spin);
        loop {
            if let Err(exceeded) = backoff.snooze() {
                return Err(LockViolation::ContentionTimeout {
                    mode: LockMode::Read,
                    thread: me,
                    waited: exceeded.waited,
                    deadline: self.config.spin.deadline,
                });
            }
            if self.claim_read()? {
                debug!(
                    mode = %LockMode::Read,
                    waited_us = backoff.elapsed().as_micros() as u64,
                    yields = backoff.yields(),
                    "contended acquire"
                );
                return Ok(());
            }
        }
    }

    // ------------------------------------------------------------------
    // Scoped guards
    // ------------------------------------------------------------------

    /// Acquire exclusive access for the lifetime of the returned guard
    pub fn write(&self) -> WriteGuard<'_> {
        self.acquire_write();
        WriteGuard::adopt(self)
    }

    /// Acquire shared access for the lifetime of the returned guard
    pub fn read(&self) -> ReadGuard<'_> {
        self.acquire_read();
        ReadGuard::adopt(self)
    }

    pub fn write_checked(&self) -> LockResult<WriteGuard<'_>> {
        self.acquire_write_checked()?;
        Ok(WriteGuard::adopt(self))
    }

    pub fn read_checked(&self) -> LockResult<ReadGuard<'_>> {
        self.acquire_read_checked()?;
        Ok(ReadGuard::adopt(self))
    }

    pub fn try_write(&self) -> Option<WriteGuard<'_>> {
        self.try_acquire_write().then(|| WriteGuard::adopt(self))
    }

    /// `None` if another thread holds the write lock or the reader count is full
    pub fn try_read(&self) -> Option<ReadGuard<'_>> {
        matches!(self.try_acquire_read(), Ok(true)).then(|| ReadGuard::adopt(self))
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> LockSnapshot {
        self.state.load().into()
    }

    pub fn is_write_held_by_current_thread(&self) -> bool {
        self.state.load().is_owned_by(ThreadTag::current())
    }

    /// Write nesting depth of the calling thread, 0 if it is not the owner
    pub fn write_depth(&self) -> u32 {
        if self.is_write_held_by_current_thread() {
            // SAFETY: the owner field holds our tag.
            unsafe { *self.write_depth.get() }
        } else {
            0
        }
    }
}

impl Default for ReentrantRwLock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReentrantRwLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReentrantRwLock")
            .field("state", &self.state)
            .field("config", &self.config)
            .finish()
    }
}
