/*!
 * Lock Violation Tests
 *
 * Structured (checked) reporting, panic interception, and payload formats
 */

use miette::Diagnostic;
use pretty_assertions::assert_eq;
use recursive_rwlock::{
    LockConfig, LockMode, LockPhase, LockViolation, ReentrantRwLock, ThreadTag,
};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn test_lock(deadline: Duration) -> ReentrantRwLock {
    ReentrantRwLock::with_config(LockConfig::for_testing(deadline))
}

#[test]
fn test_timeout_respects_configured_deadline() {
    let deadline = Duration::from_millis(40);
    let lock = Arc::new(test_lock(deadline));
    lock.acquire_write();

    let other = Arc::clone(&lock);
    let (result, elapsed) = thread::spawn(move || {
        let start = Instant::now();
        let result = other.acquire_read_checked();
        (result, start.elapsed())
    })
    .join()
    .unwrap();

    match result {
        Err(LockViolation::ContentionTimeout {
            mode,
            waited,
            deadline: reported,
            ..
        }) => {
            assert_eq!(mode, LockMode::Read);
            assert_eq!(reported, deadline);
            assert!(waited >= deadline);
        }
        other => panic!("expected contention timeout, got {other:?}"),
    }
    assert!(elapsed >= deadline);
    assert!(elapsed < Duration::from_secs(2), "deadline overshot: {elapsed:?}");

    lock.release_write();
}

#[test]
fn test_panic_policy_can_be_intercepted() {
    let lock = Arc::new(test_lock(Duration::from_millis(20)));
    lock.acquire_write();

    let other = Arc::clone(&lock);
    let caught = thread::spawn(move || {
        panic::catch_unwind(AssertUnwindSafe(|| other.acquire_write())).is_err()
    })
    .join()
    .unwrap();

    assert!(caught);
    // The waiter never touched the word, so the owner is undisturbed
    assert_eq!(lock.snapshot().owner, Some(ThreadTag::current()));
    lock.release_write();
    assert_eq!(lock.snapshot().phase, LockPhase::Empty);
}

#[test]
fn test_not_owner_release_from_other_thread() {
    let lock = Arc::new(test_lock(Duration::from_millis(20)));
    lock.acquire_write();
    let owner = ThreadTag::current();

    let other = Arc::clone(&lock);
    let err = thread::spawn(move || other.release_write_checked())
        .join()
        .unwrap()
        .unwrap_err();

    match err {
        LockViolation::NotOwner { thread, owner: reported } => {
            assert_ne!(thread, owner);
            assert_eq!(reported, owner.get());
        }
        other => panic!("expected NotOwner, got {other:?}"),
    }
    assert_eq!(lock.write_depth(), 1);
    lock.release_write();
}

#[test]
fn test_violation_serializes_with_tag() {
    let tag = ThreadTag::from_raw(42).unwrap();
    let json = serde_json::to_value(LockViolation::UnbalancedRelease { thread: tag }).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "violation": "unbalanced_release", "thread": 42 })
    );

    let back: LockViolation = serde_json::from_value(json).unwrap();
    assert_eq!(back, LockViolation::UnbalancedRelease { thread: tag });
}

#[test]
fn test_violation_diagnostic_codes() {
    let tag = ThreadTag::from_raw(1).unwrap();
    let cases = [
        (
            LockViolation::LockOrderViolation {
                owner: tag,
                outstanding_reads: 1,
            },
            "rwlock::lock_order",
        ),
        (
            LockViolation::UnbalancedRelease { thread: tag },
            "rwlock::unbalanced_release",
        ),
        (
            LockViolation::ContentionTimeout {
                mode: LockMode::Write,
                thread: tag,
                waited: Duration::from_millis(11),
                deadline: Duration::from_millis(10),
            },
            "rwlock::contention_timeout",
        ),
    ];

    for (violation, code) in cases {
        assert_eq!(violation.code().map(|c| c.to_string()), Some(code.to_string()));
    }
}
