/*!
 * Packed Lock State
 *
 * Owner tag and reader count share one 64-bit word so every transition is a
 * single atomic instruction:
 *
 * ```text
 *  63                32 31                 0
 * +--------------------+--------------------+
 * |     owner tag      |    reader count    |
 * +--------------------+--------------------+
 * ```
 *
 * An owner of 0 means no writer. A nonzero owner with a nonzero count is only
 * valid when every counted read belongs to the owner itself.
 */

use crate::core::id::ThreadTag;
use crate::core::limits::{MAX_READERS, OWNER_SHIFT, READER_MASK};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering::SeqCst};

/// Plain value of the lock word
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LockWord(u64);

impl LockWord {
    pub const EMPTY: Self = Self(0);

    /// Word with `tag` as owner and no readers
    #[inline]
    pub const fn owned_by(tag: ThreadTag) -> Self {
        Self((tag.get() as u64) << OWNER_SHIFT)
    }

    /// Word with no owner and `readers` readers
    #[inline]
    pub const fn with_readers(readers: u32) -> Self {
        Self(readers as u64)
    }

    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Raw owner field, 0 when no writer
    #[inline]
    pub const fn owner_bits(self) -> u32 {
        (self.0 >> OWNER_SHIFT) as u32
    }

    #[inline]
    pub const fn owner(self) -> Option<ThreadTag> {
        ThreadTag::from_raw(self.owner_bits())
    }

    #[inline]
    pub const fn readers(self) -> u32 {
        (self.0 & READER_MASK) as u32
    }

    #[inline]
    pub fn is_owned_by(self, tag: ThreadTag) -> bool {
        self.owner_bits() == tag.get()
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn phase(self) -> LockPhase {
        match (self.owner_bits() != 0, self.readers() != 0) {
            (false, false) => LockPhase::Empty,
            (true, false) => LockPhase::WriteHeld,
            (false, true) => LockPhase::ReadHeld,
            (true, true) => LockPhase::WriteHeldWithReads,
        }
    }

    /// Same owner, one more reader; `None` if the count is saturated
    #[inline]
    pub const fn add_reader(self) -> Option<Self> {
        if self.readers() == MAX_READERS {
            None
        } else {
            Some(Self(self.0 + 1))
        }
    }

    /// Same owner, one reader fewer; `None` if there are no readers
    #[inline]
    pub const fn remove_reader(self) -> Option<Self> {
        if self.readers() == 0 {
            None
        } else {
            Some(Self(self.0 - 1))
        }
    }
}

impl fmt::Debug for LockWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockWord")
            .field("owner", &self.owner_bits())
            .field("readers", &self.readers())
            .finish()
    }
}

/// Coarse state of a lock, derived from its word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockPhase {
    Empty,
    WriteHeld,
    ReadHeld,
    WriteHeldWithReads,
}

/// The shared atomic word
///
/// Every access is `SeqCst`, so all threads agree on one total order of lock
/// transitions. The only mutations are compare-and-swap, fetch-add and
/// fetch-sub.
#[repr(align(64))]
pub struct LockState {
    word: AtomicU64,
}

impl LockState {
    pub const fn new() -> Self {
        Self {
            word: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn load(&self) -> LockWord {
        LockWord(self.word.load(SeqCst))
    }

    /// Replace `current` with `new` if the word still equals `current`
    ///
    /// Returns whether the swap happened. The observed value on failure is
    /// deliberately not returned: callers reload and recompute before
    /// retrying.
    #[inline]
    pub fn compare_and_swap(&self, current: LockWord, new: LockWord) -> bool {
        self.word
            .compare_exchange(current.0, new.0, SeqCst, SeqCst)
            .is_ok()
    }

    /// Add one reader, returning the word before the add
    ///
    /// Only the owning writer may use this; any other thread must go through
    /// `compare_and_swap` so it cannot slip past a writer.
    #[inline]
    pub fn fetch_add_reader(&self) -> LockWord {
        LockWord(self.word.fetch_add(1, SeqCst))
    }

    /// Clear the owner field, returning the word before the subtraction
    #[inline]
    pub fn fetch_sub_owner(&self, tag: ThreadTag) -> LockWord {
        LockWord(self.word.fetch_sub(LockWord::owned_by(tag).0, SeqCst))
    }
}

impl Default for LockState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LockState").field(&self.load()).finish()
    }
}
