/*!
 * Reader-Writer Lock Tests
 *
 * Mutual exclusion, reader concurrency, and reentrancy under real threads
 */

use pretty_assertions::assert_eq;
use recursive_rwlock::{LockConfig, LockPhase, ReentrantRwLock, ThreadTag, YieldStrategy};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn stress_lock() -> ReentrantRwLock {
    ReentrantRwLock::with_config(LockConfig::for_testing(Duration::from_secs(10)))
}

#[test]
fn test_mutual_exclusion_under_contention() {
    let lock = stress_lock();
    let writers_inside = AtomicU32::new(0);
    let readers_inside = AtomicU32::new(0);

    thread::scope(|s| {
        for i in 0..8 {
            let (lock, writers_inside, readers_inside) = (&lock, &writers_inside, &readers_inside);
            s.spawn(move || {
                for _ in 0..500 {
                    if i % 2 == 0 {
                        lock.acquire_write();
                        assert_eq!(writers_inside.fetch_add(1, Ordering::SeqCst), 0);
                        assert_eq!(readers_inside.load(Ordering::SeqCst), 0);
                        writers_inside.fetch_sub(1, Ordering::SeqCst);
                        lock.release_write();
                    } else {
                        lock.acquire_read();
                        readers_inside.fetch_add(1, Ordering::SeqCst);
                        assert_eq!(writers_inside.load(Ordering::SeqCst), 0);
                        readers_inside.fetch_sub(1, Ordering::SeqCst);
                        lock.release_read();
                    }
                }
            });
        }
    });

    assert_eq!(lock.snapshot().phase, LockPhase::Empty);
}

#[test]
fn test_n_readers_hold_concurrently() {
    const READERS: usize = 12;
    let lock = stress_lock();
    let all_in = Barrier::new(READERS + 1);
    let may_leave = Barrier::new(READERS + 1);

    thread::scope(|s| {
        for _ in 0..READERS {
            s.spawn(|| {
                lock.acquire_read();
                all_in.wait();
                may_leave.wait();
                lock.release_read();
            });
        }

        all_in.wait();
        let snap = lock.snapshot();
        assert_eq!(snap.readers, READERS as u32);
        assert_eq!(snap.owner, None);
        may_leave.wait();
    });

    assert_eq!(lock.snapshot().readers, 0);
}

#[test]
fn test_nested_writes_block_others_until_fully_released() {
    let lock = Arc::new(stress_lock());
    for _ in 0..3 {
        lock.acquire_write();
    }

    let probe = |lock: &Arc<ReentrantRwLock>| {
        let other = Arc::clone(lock);
        thread::spawn(move || {
            let wrote = other.try_acquire_write();
            if wrote {
                other.release_write();
            }
            let read = other.try_acquire_read().unwrap();
            if read {
                other.release_read();
            }
            (wrote, read)
        })
        .join()
        .unwrap()
    };

    for remaining in (1..=3).rev() {
        assert_eq!(lock.write_depth(), remaining);
        assert_eq!(probe(&lock), (false, false));
        lock.release_write();
    }

    assert_eq!(probe(&lock), (true, true));
}

#[test]
fn test_writer_handoff_records_new_owner() {
    let lock = Arc::new(stress_lock());
    let other = Arc::clone(&lock);

    let tag = thread::spawn(move || {
        other.acquire_write();
        let snap = other.snapshot();
        other.release_write();
        (ThreadTag::current(), snap.owner)
    })
    .join()
    .unwrap();

    assert_eq!(Some(tag.0), tag.1);
    assert_ne!(tag.0, ThreadTag::current());
    assert!(lock.snapshot().owner.is_none());
}

#[test]
fn test_yield_strategies_all_make_progress() {
    for strategy in [
        YieldStrategy::Yield,
        YieldStrategy::SpinHint,
        YieldStrategy::Sleep(Duration::from_micros(10)),
    ] {
        let mut config = LockConfig::for_testing(Duration::from_secs(10));
        config.spin.yield_strategy = strategy;
        let lock = ReentrantRwLock::with_config(config);
        let counter = AtomicU32::new(0);

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..200 {
                        let _w = lock.write();
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(counter.load(Ordering::SeqCst), 800, "strategy {strategy:?}");
    }
}
