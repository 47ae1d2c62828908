//! Pool initialization, pruning, validation and shutdown.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ldap_pool::{PoolError, PoolType, PooledConnectionFactory};

use common::{SwitchValidator, factory, pool, provider, sizes};

#[test]
fn test_check_out_requires_initialize() {
    let provider = provider();
    let pool = pool(
        factory(&provider),
        PoolType::Blocking,
        sizes(2, 4).build().unwrap(),
        Duration::ZERO,
    );
    assert!(matches!(pool.check_out(), Err(PoolError::NotInitialized)));
    assert_eq!(provider.connects(), 0);

    pool.initialize().unwrap();
    pool.initialize().unwrap();
    assert_eq!(pool.available_count(), 2);

    pool.close();
    assert!(pool.is_closed());
    assert!(matches!(pool.check_out(), Err(PoolError::PoolClosed)));
    assert!(matches!(pool.initialize(), Err(PoolError::PoolClosed)));
}

#[test]
fn test_initialize_caps_create_attempts() {
    let provider = provider();
    provider.fail_connects(u32::MAX);
    let pool = pool(
        factory(&provider),
        PoolType::Blocking,
        sizes(3, 5).build().unwrap(),
        Duration::ZERO,
    );
    pool.initialize().unwrap();

    assert_eq!(pool.available_count(), 0);
    assert_eq!(provider.failed_connects(), 6);
}

#[test]
fn test_initialize_destroys_connections_failing_validation() {
    let provider = provider();
    let validator = SwitchValidator::default();
    validator.fail(true);
    let pool = pool(
        factory(&provider).validator(Arc::new(validator)),
        PoolType::Blocking,
        sizes(2, 4).validate_on_check_in(true).build().unwrap(),
        Duration::ZERO,
    );
    pool.initialize().unwrap();

    assert_eq!(pool.available_count(), 0);
    assert_eq!(provider.connects(), 4);
    assert_eq!(provider.open_sessions(), 0);
}

#[test]
fn test_prune_skipped_under_load() {
    let provider = provider();
    let pool = pool(
        factory(&provider),
        PoolType::Blocking,
        sizes(1, 5).expiration_time(Duration::ZERO).build().unwrap(),
        Duration::ZERO,
    );
    pool.initialize().unwrap();

    let mut held: Vec<_> = (0..3).map(|_| pool.check_out().unwrap()).collect();
    let busy = held.pop().unwrap();
    drop(held);
    assert_eq!(pool.available_count(), 2);
    assert_eq!(pool.active_count(), 1);

    thread::sleep(Duration::from_millis(5));
    pool.prune();
    assert_eq!(pool.available_count(), 2);
    assert_eq!(pool.metrics().prunes_performed, 0);

    drop(busy);
    pool.prune();
    assert_eq!(pool.available_count(), 1);
    assert_eq!(pool.metrics().prunes_performed, 1);
}

#[test]
fn test_prune_removes_oldest_first_down_to_min() {
    let provider = provider();
    let pool = pool(
        factory(&provider),
        PoolType::Blocking,
        sizes(2, 5).expiration_time(Duration::ZERO).build().unwrap(),
        Duration::ZERO,
    );
    pool.initialize().unwrap();

    // drain in creation order, then check back in in the same order
    let held: Vec<_> = (0..5).map(|_| pool.check_out().unwrap()).collect();
    let ids: Vec<u64> = held.iter().map(|c| c.id()).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    for conn in held {
        drop(conn);
    }

    thread::sleep(Duration::from_millis(5));
    pool.prune();
    assert_eq!(pool.available_count(), 2);
    pool.prune();
    assert_eq!(pool.available_count(), 2);

    let survivors: Vec<_> = (0..2).map(|_| pool.check_out().unwrap()).collect();
    let survivor_ids: Vec<u64> = survivors.iter().map(|c| c.id()).collect();
    assert_eq!(survivor_ids, ids[3..].to_vec());
    assert_eq!(pool.metrics().connections_destroyed, 3);
}

#[test]
fn test_prune_keeps_unexpired_connections() {
    let provider = provider();
    let pool = pool(
        factory(&provider),
        PoolType::Blocking,
        sizes(1, 4)
            .expiration_time(Duration::from_secs(3600))
            .build()
            .unwrap(),
        Duration::ZERO,
    );
    pool.initialize().unwrap();

    let held: Vec<_> = (0..4).map(|_| pool.check_out().unwrap()).collect();
    drop(held);
    pool.prune();
    assert_eq!(pool.available_count(), 4);
}

#[test]
fn test_validate_replaces_failed_connections() {
    let provider = provider();
    let validator = SwitchValidator::default();
    let pool = pool(
        factory(&provider).validator(Arc::new(validator.clone())),
        PoolType::Blocking,
        sizes(3, 5).validate_periodically(true).build().unwrap(),
        Duration::ZERO,
    );
    pool.initialize().unwrap();
    assert_eq!(pool.available_count(), 3);

    validator.fail(true);
    pool.validate();

    let metrics = pool.metrics();
    assert_eq!(pool.available_count(), 3);
    assert_eq!(metrics.validations_failed, 3);
    assert_eq!(metrics.connections_created, 6);
    assert_eq!(metrics.connections_destroyed, 3);
    assert_eq!(provider.open_sessions(), 3);
}

#[test]
fn test_validate_skipped_under_load() {
    let provider = provider();
    let validator = SwitchValidator::default();
    let pool = pool(
        factory(&provider).validator(Arc::new(validator.clone())),
        PoolType::Blocking,
        sizes(2, 4).validate_periodically(true).build().unwrap(),
        Duration::ZERO,
    );
    pool.initialize().unwrap();

    let busy = pool.check_out().unwrap();
    validator.fail(true);
    pool.validate();
    assert_eq!(pool.available_count(), 1);
    assert_eq!(pool.metrics().validations_performed, 0);
    drop(busy);
}

#[test]
fn test_validate_refills_to_min() {
    let provider = provider();
    provider.fail_connects(u32::MAX);
    let pool = pool(
        factory(&provider),
        PoolType::Blocking,
        sizes(2, 4).build().unwrap(),
        Duration::ZERO,
    );
    pool.initialize().unwrap();
    assert_eq!(pool.available_count(), 0);

    provider.fail_connects(0);
    pool.validate();
    assert_eq!(pool.available_count(), 2);
}

#[test]
fn test_background_prune_runs_on_schedule() {
    let provider = provider();
    let pool = pool(
        factory(&provider),
        PoolType::SoftLimit,
        sizes(1, 2)
            .prune_period(Duration::from_millis(20))
            .expiration_time(Duration::ZERO)
            .build()
            .unwrap(),
        Duration::ZERO,
    );
    pool.initialize().unwrap();

    let held: Vec<_> = (0..4).map(|_| pool.check_out().unwrap()).collect();
    assert_eq!(pool.metrics().connections_created, 4);
    drop(held);

    thread::sleep(Duration::from_millis(300));
    assert_eq!(pool.available_count(), 1);
    assert!(pool.metrics().prunes_performed >= 1);
}

#[test]
fn test_close_interrupts_blocked_checkout() {
    let provider = provider();
    let pool = pool(
        factory(&provider),
        PoolType::Blocking,
        sizes(1, 1).build().unwrap(),
        Duration::ZERO,
    );
    pool.initialize().unwrap();
    let held = pool.check_out().unwrap();

    thread::scope(|s| {
        let waiter = s.spawn(|| pool.check_out().map(|c| c.id()));
        thread::sleep(Duration::from_millis(50));
        pool.close();
        assert!(matches!(waiter.join().unwrap(), Err(PoolError::Interrupted)));
    });

    assert!(!held.is_open());
    drop(held);
    assert_eq!(pool.active_count(), 0);
    assert_eq!(provider.open_sessions(), 0);
}

#[test]
fn test_close_destroys_each_connection_once() {
    let provider = provider();
    let pool = pool(
        factory(&provider),
        PoolType::Blocking,
        sizes(2, 3).build().unwrap(),
        Duration::ZERO,
    );
    pool.initialize().unwrap();
    let held: Vec<_> = (0..3).map(|_| pool.check_out().unwrap()).collect();

    pool.close();
    pool.close();
    let metrics = pool.metrics();
    assert_eq!(metrics.connections_created, 3);
    assert_eq!(metrics.connections_destroyed, 3);
    assert_eq!(provider.open_sessions(), 0);

    drop(held);
    assert_eq!(pool.metrics().connections_destroyed, 3);
    assert_eq!(pool.available_count(), 0);
}

#[test]
fn test_drop_closes_pool() {
    let provider = provider();
    {
        let pool = pool(
            factory(&provider),
            PoolType::SoftLimit,
            sizes(3, 3).build().unwrap(),
            Duration::ZERO,
        );
        pool.initialize().unwrap();
        assert_eq!(provider.open_sessions(), 3);
    }
    assert_eq!(provider.open_sessions(), 0);
}

#[test]
fn test_detach_removes_connection_from_pool() {
    let provider = provider();
    let pool = pool(
        factory(&provider),
        PoolType::Blocking,
        sizes(1, 1).build().unwrap(),
        Duration::from_millis(20),
    );
    pool.initialize().unwrap();

    let conn = pool.check_out().unwrap().detach();
    assert_eq!(pool.active_count(), 0);
    assert_eq!(pool.available_count(), 0);
    assert!(conn.is_open());

    // the detached connection no longer counts against the pool
    let replacement = pool.check_out().unwrap();
    assert_ne!(replacement.id(), conn.id());

    drop(pool);
    assert!(conn.is_open());
    conn.close();
    drop(replacement);
    assert_eq!(provider.open_sessions(), 0);
}

#[test]
fn test_pooled_connection_factory() {
    let provider = provider();
    let factory = PooledConnectionFactory::from_config(
        PoolType::Blocking,
        ldap_testing::connection_config(),
        Arc::new(provider.clone()),
        sizes(1, 2).build().unwrap(),
    )
    .unwrap();
    assert!(matches!(factory.get_connection(), Err(PoolError::NotInitialized)));

    factory.initialize().unwrap();
    {
        let conn = factory.get_connection().unwrap();
        assert!(conn.is_open());
        assert_eq!(factory.pool().active_count(), 1);
    }
    assert_eq!(factory.pool().available_count(), 1);

    factory.close();
    assert_eq!(provider.open_sessions(), 0);
}
