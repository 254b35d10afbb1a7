/*!
 * Error Types
 * Lock invariant violations with thiserror, miette, and serde support
 */

use super::id::ThreadTag;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

/// Result type for checked lock operations
pub type LockResult<T> = Result<T, LockViolation>;

/// Access mode being acquired or released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    Read,
    Write,
}

impl fmt::Display for LockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// A broken lock invariant
///
/// None of these are retryable. The plain lock operations hand them to the
/// lock's [`ViolationPolicy`]; the `_checked` operations return them so a host
/// can turn them into a structured failure. In both cases the lock word is
/// left exactly as it was before the offending call.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum LockViolation {
    #[error("{mode} lock not acquired by {thread} within {deadline:?} (waited {waited:?})")]
    #[diagnostic(
        code(rwlock::contention_timeout),
        help("Another thread held the lock past the deadline. This usually means a deadlock or a leaked guard.")
    )]
    ContentionTimeout {
        mode: LockMode,
        thread: ThreadTag,
        waited: Duration,
        deadline: Duration,
    },

    #[error("{owner} released its write lock with {outstanding_reads} writer-held read(s) outstanding")]
    #[diagnostic(
        code(rwlock::lock_order),
        help("Release every read taken while holding the write lock before releasing the write lock.")
    )]
    LockOrderViolation { owner: ThreadTag, outstanding_reads: u32 },

    #[error("{thread} released a read lock that was never acquired")]
    #[diagnostic(
        code(rwlock::unbalanced_release),
        help("Each release_read must match exactly one earlier acquire_read.")
    )]
    UnbalancedRelease { thread: ThreadTag },

    #[error("{thread} released a write lock owned by tag {owner}")]
    #[diagnostic(
        code(rwlock::not_owner),
        help("Only the thread that acquired the write lock may release it. Tag 0 means the lock was not write-held.")
    )]
    NotOwner { thread: ThreadTag, owner: u32 },

    #[error("reader count {readers} cannot be incremented")]
    #[diagnostic(code(rwlock::reader_overflow))]
    ReaderOverflow { readers: u32 },

    #[error("thread tag space exhausted")]
    #[diagnostic(
        code(rwlock::tag_space_exhausted),
        help("More than u32::MAX - 1 threads have touched a lock during this process.")
    )]
    TagSpaceExhausted,
}

impl LockViolation {
    /// Short name of the violated invariant, stable for log parsing
    pub fn invariant(&self) -> &'static str {
        match self {
            Self::ContentionTimeout { .. } => "contention_timeout",
            Self::LockOrderViolation { .. } => "lock_order",
            Self::UnbalancedRelease { .. } => "unbalanced_release",
            Self::NotOwner { .. } => "not_owner",
            Self::ReaderOverflow { .. } => "reader_overflow",
            Self::TagSpaceExhausted => "tag_space_exhausted",
        }
    }
}

/// What to do when a plain (unchecked) operation hits a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationPolicy {
    /// Log, print one diagnostic line to stderr, abort the process
    #[default]
    Abort,
    /// Panic with the diagnostic so a host can `catch_unwind` it
    Panic,
}

impl ViolationPolicy {
    /// Report the violation and never return
    #[cold]
    #[inline(never)]
    pub fn raise(self, violation: LockViolation) -> ! {
        error!(
            invariant = violation.invariant(),
            policy = ?self,
            %violation,
            "lock invariant violated"
        );

        match self {
            Self::Abort => {
                eprintln!(
                    "fatal: lock invariant violated [{}]: {}",
                    violation.invariant(),
                    violation
                );
                std::process::abort()
            }
            Self::Panic => panic!(
                "lock invariant violated [{}]: {}",
                violation.invariant(),
                violation
            ),
        }
    }
}

impl FromStr for ViolationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "panic" => Ok(Self::Panic),
            other => Err(format!("unknown violation policy: {other}")),
        }
    }
}
