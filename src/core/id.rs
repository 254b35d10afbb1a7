/*!
 * Thread Identity
 * Stable nonzero per-thread tags used as the owner field of the lock word
 */

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};

use super::errors::{LockViolation, ViolationPolicy};

// ============================================================================
// Type-Safe Tag Wrapper
// ============================================================================

/// Identity of a thread as stored in a lock word
///
/// Zero is reserved for "no owner" and cannot be represented. Tags are only
/// compared for equality; the numeric order carries no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadTag(NonZeroU32);

impl ThreadTag {
    /// Tag of the calling thread, assigned on first use
    #[inline]
    pub fn current() -> Self {
        CURRENT_TAG.with(|slot| match slot.get() {
            Some(tag) => tag,
            None => {
                let tag = TAGS.next().unwrap_or_else(|violation| {
                    // The lock word cannot express a tag past u32::MAX.
                    ViolationPolicy::Abort.raise(violation)
                });
                slot.set(Some(tag));
                tag
            }
        })
    }

    /// Rebuild a tag from the owner field of a lock word
    #[inline]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for ThreadTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "thread#{}", self.0)
    }
}

// ============================================================================
// Tag Allocator
// ============================================================================

/// Monotonic allocator handing out thread tags
///
/// Tags are never recycled: a dead thread's tag is simply retired, which
/// keeps a stale owner field from ever matching a new thread.
pub struct TagAllocator {
    counter: AtomicU32,
}

impl TagAllocator {
    /// Create an allocator whose first tag is 1
    pub const fn new() -> Self {
        Self {
            counter: AtomicU32::new(1),
        }
    }

    /// Draw the next unused tag
    pub fn next(&self) -> Result<ThreadTag, LockViolation> {
        self.counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .ok()
            .and_then(ThreadTag::from_raw)
            .ok_or(LockViolation::TagSpaceExhausted)
    }

    /// Value the next call to `next` would return (for debugging)
    pub fn peek(&self) -> u32 {
        self.counter.load(Ordering::SeqCst)
    }
}

impl Default for TagAllocator {
    fn default() -> Self {
        Self::new()
    }
}

static TAGS: TagAllocator = TagAllocator::new();

thread_local! {
    static CURRENT_TAG: Cell<Option<ThreadTag>> = const { Cell::new(None) };
}
