//! Shared pool behavior.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ldap_pool::{PoolError, PoolType};
use ldap_protocol::CompareRequest;

use common::{SwitchValidator, factory, pool, provider, sizes};

#[test]
fn test_shared_pool_oversubscribes_without_blocking() {
    let provider = provider();
    let pool = pool(
        factory(&provider),
        PoolType::Shared,
        sizes(1, 2).build().unwrap(),
        Duration::from_secs(60),
    );
    pool.initialize().unwrap();
    assert_eq!(pool.available_count(), 1);

    let start = Instant::now();
    let held: Vec<_> = (0..6).map(|_| pool.check_out().unwrap()).collect();
    assert!(start.elapsed() < Duration::from_secs(5));

    assert_eq!(pool.active_count(), 6);
    assert_eq!(pool.available_count(), 2);
    assert_eq!(pool.status().total, 2);
    assert_eq!(provider.connects(), 2);

    // handed out in rotation
    let ids: Vec<u64> = held.iter().map(|c| c.id()).collect();
    assert_ne!(ids[0], ids[1]);
    assert_eq!(ids[2], ids[0]);
    assert_eq!(ids[3], ids[1]);

    drop(held);
    assert_eq!(pool.active_count(), 0);
    assert_eq!(pool.available_count(), 2);
    assert_eq!(provider.open_sessions(), 2);
}

#[test]
fn test_shared_connection_used_concurrently() {
    let provider = provider();
    let pool = pool(
        factory(&provider),
        PoolType::Shared,
        sizes(1, 1).build().unwrap(),
        Duration::ZERO,
    );
    pool.initialize().unwrap();

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let conn = pool.check_out().unwrap();
                let response = conn
                    .compare(CompareRequest::new("", "objectClass", "top"))
                    .unwrap();
                assert!(*response.result());
            });
        }
    });

    assert_eq!(provider.connects(), 1);
    assert_eq!(pool.active_count(), 0);
    assert_eq!(pool.available_count(), 1);
}

#[test]
fn test_shared_checkin_validation_failure_removes_for_all_sharers() {
    let provider = provider();
    let validator = SwitchValidator::default();
    let pool = pool(
        factory(&provider).validator(Arc::new(validator.clone())),
        PoolType::Shared,
        sizes(1, 1).validate_on_check_in(true).build().unwrap(),
        Duration::ZERO,
    );
    pool.initialize().unwrap();

    let first = pool.check_out().unwrap();
    let second = pool.check_out().unwrap();
    assert_eq!(first.id(), second.id());

    validator.fail(true);
    drop(first);
    assert_eq!(pool.available_count(), 0);
    assert_eq!(pool.active_count(), 1);

    drop(second);
    assert_eq!(pool.active_count(), 0);
    assert_eq!(pool.metrics().connections_destroyed, 1);

    validator.fail(false);
    let replacement = pool.check_out().unwrap();
    assert!(replacement.is_open());
    assert_eq!(provider.connects(), 2);
}

#[test]
fn test_shared_pool_close_destroys_each_connection_once() {
    let provider = provider();
    let pool = pool(
        factory(&provider),
        PoolType::Shared,
        sizes(2, 2).build().unwrap(),
        Duration::ZERO,
    );
    pool.initialize().unwrap();

    let held: Vec<_> = (0..5).map(|_| pool.check_out().unwrap()).collect();
    pool.close();

    assert_eq!(pool.metrics().connections_destroyed, 2);
    assert_eq!(provider.open_sessions(), 0);
    assert!(matches!(pool.check_out(), Err(PoolError::PoolClosed)));

    drop(held);
    assert_eq!(pool.metrics().connections_destroyed, 2);
}

#[test]
fn test_shared_pool_exhausted_when_nothing_can_be_created() {
    let provider = provider();
    provider.fail_connects(u32::MAX);
    let pool = pool(
        factory(&provider),
        PoolType::Shared,
        sizes(1, 2).build().unwrap(),
        Duration::ZERO,
    );
    pool.initialize().unwrap();
    assert_eq!(pool.available_count(), 0);

    assert!(matches!(pool.check_out(), Err(PoolError::Exhausted)));
    assert_eq!(pool.metrics().checkouts_failed, 1);
}
