//! Operation and retry behavior against the mock directory.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ldap_client::{Connection, LruSearchCache, Operation, RetryLimit, RetryPolicy};
use ldap_protocol::{
    AddRequest, AttributeModification, BindRequest, CompareRequest, DeleteRequest, LdapAttribute,
    ModificationKind, ModifyRequest, PagedSearchRequest, RenameRequest, RequestDefaults,
    ResultCode, SearchRequest, SearchScope, SortBehavior,
};
use ldap_testing::{MockDirectory, MockProvider, PEOPLE_DN, connection_factory, init_tracing};

fn open(provider: &MockProvider) -> Connection {
    init_tracing();
    connection_factory(provider).open_connection().unwrap()
}

#[test]
fn test_retry_exhaustion_invokes_three_times() {
    let provider = MockProvider::new(MockDirectory::people(1));
    let conn = open(&provider);
    provider.fail_operations(u32::MAX);

    let err = Operation::new(&conn)
        .with_retry(RetryPolicy::attempts(2))
        .execute(DeleteRequest::new(format!("uid=0,{PEOPLE_DN}")))
        .unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(err.result_code(), Some(ResultCode::Busy));
    assert_eq!(provider.invocations(), 3);
    assert_eq!(provider.directory().len(), 2);
}

#[test]
fn test_backoff_delays_accumulate() {
    let provider = MockProvider::new(MockDirectory::people(1));
    let conn = open(&provider);
    provider.fail_operations(3);

    let start = Instant::now();
    let response = Operation::new(&conn)
        .with_retry(
            RetryPolicy::attempts(3)
                .wait(Duration::from_millis(20))
                .backoff(2),
        )
        .execute(CompareRequest::new(format!("uid=0,{PEOPLE_DN}"), "uid", "0"))
        .unwrap();

    // 20ms flat, then 20*2*1 and 20*2*2
    assert!(start.elapsed() >= Duration::from_millis(140));
    assert!(*response.result());
    assert_eq!(provider.invocations(), 4);
}

#[test]
fn test_unlimited_retry_outlasts_failures() {
    let provider = MockProvider::new(MockDirectory::people(3));
    let conn = open(&provider);
    provider.fail_operations(10);

    let policy = RetryPolicy {
        limit: RetryLimit::Unlimited,
        ..RetryPolicy::default()
    };
    let response = Operation::new(&conn)
        .with_retry(policy)
        .execute(SearchRequest::new(PEOPLE_DN, "(uid=*)"))
        .unwrap();

    assert_eq!(response.result().len(), 3);
    assert_eq!(provider.invocations(), 11);
    assert_eq!(provider.connects(), 11);
}

#[test]
fn test_non_retryable_error_propagates_immediately() {
    let provider = MockProvider::new(MockDirectory::people(1));
    let conn = open(&provider);

    let err = conn
        .delete(DeleteRequest::new(format!("uid=missing,{PEOPLE_DN}")))
        .unwrap_err();
    assert_eq!(err.result_code(), Some(ResultCode::NoSuchObject));
    assert_eq!(provider.invocations(), 1);
    assert_eq!(provider.connects(), 1);
}

#[test]
fn test_retry_reconnect_failure_propagates() {
    let provider = MockProvider::new(MockDirectory::people(1));
    let conn = open(&provider);
    provider.fail_operations(1);
    provider.fail_connects(1);

    let err = Operation::new(&conn)
        .with_retry(RetryPolicy::attempts(3))
        .execute(CompareRequest::new("", "objectClass", "top"))
        .unwrap_err();

    assert_eq!(err.result_code(), Some(ResultCode::ConnectError));
    assert!(!conn.is_open());
}

#[test]
fn test_reconnect_uses_last_bind() {
    let provider = MockProvider::new(MockDirectory::people(1));
    let conn = open(&provider);
    conn.bind(BindRequest::simple("uid=dfisher,ou=people,dc=vt,dc=edu", "pw"))
        .unwrap();

    provider.fail_operations(1);
    conn.compare(CompareRequest::new("", "objectClass", "top"))
        .unwrap();

    assert_eq!(provider.connects(), 2);
    assert_eq!(
        provider.last_bind_dn().as_deref(),
        Some("uid=dfisher,ou=people,dc=vt,dc=edu")
    );
}

#[test]
fn test_write_operations() {
    let provider = MockProvider::new(MockDirectory::people(0));
    let conn = open(&provider);
    let dn = format!("uid=ada,{PEOPLE_DN}");

    conn.add(AddRequest::new(
        dn.clone(),
        vec![
            LdapAttribute::new("objectClass", ["top", "person"]),
            LdapAttribute::new("mail", ["ada@vt.edu"]),
        ],
    ))
    .unwrap();
    conn.modify(ModifyRequest::new(
        dn.clone(),
        vec![AttributeModification::new(
            ModificationKind::Add,
            LdapAttribute::new("mail", ["lovelace@vt.edu"]),
        )],
    ))
    .unwrap();
    let matched = conn
        .compare(CompareRequest::new(dn.clone(), "mail", "lovelace@vt.edu"))
        .unwrap();
    assert_eq!(matched.result_code(), ResultCode::CompareTrue);

    let renamed = format!("uid=lovelace,{PEOPLE_DN}");
    conn.rename(RenameRequest::new(dn.clone(), renamed.clone()))
        .unwrap();
    assert!(provider.directory().get(&dn).is_none());

    conn.delete(DeleteRequest::new(renamed)).unwrap();
    assert_eq!(provider.directory().len(), 1);
}

#[test]
fn test_paged_search_merges_pages() {
    let provider = MockProvider::new(MockDirectory::people(25));
    let conn = open(&provider);

    let response = conn
        .paged_search(PagedSearchRequest::new(
            SearchRequest::new(PEOPLE_DN, "(uid=*)"),
            10,
        ))
        .unwrap();

    assert_eq!(response.result().len(), 25);
    assert_eq!(provider.searches(), 3);
    assert!(response.paged_results().is_some_and(|c| !c.has_more()));
}

#[test]
fn test_paged_search_restarts_on_retry() {
    let provider = MockProvider::new(MockDirectory::people(25));
    let conn = open(&provider);
    provider.fail_operations(1);

    let response = conn
        .paged_search(PagedSearchRequest::new(
            SearchRequest::new(PEOPLE_DN, "(uid=*)"),
            10,
        ))
        .unwrap();

    assert_eq!(response.result().len(), 25);
    assert_eq!(provider.searches(), 3);
    assert_eq!(provider.invocations(), 4);
}

#[test]
fn test_size_limit_is_reported() {
    let provider = MockProvider::new(MockDirectory::people(5));
    let conn = open(&provider);

    let response = conn
        .search(SearchRequest::new(PEOPLE_DN, "(uid=*)").size_limit(2))
        .unwrap();
    assert_eq!(response.result().len(), 2);
    assert_eq!(response.result_code(), ResultCode::SizeLimitExceeded);
}

#[test]
fn test_connection_defaults_fill_request() {
    init_tracing();
    let provider = MockProvider::new(MockDirectory::people(4));
    let config = ldap_testing::connection_config().request_defaults(
        RequestDefaults::new()
            .base_dn(PEOPLE_DN)
            .scope(SearchScope::OneLevel)
            .sort_behavior(SortBehavior::Sorted),
    );
    let factory =
        ldap_client::DefaultConnectionFactory::new(config, Arc::new(provider.clone())).unwrap();
    let conn = factory.open_connection().unwrap();

    let response = conn.search(SearchRequest::with_filter("(objectClass=*)")).unwrap();
    let dns: Vec<_> = response
        .result()
        .entries()
        .iter()
        .map(|e| e.dn.clone())
        .collect();
    assert_eq!(dns.len(), 4);
    assert_eq!(dns[0], format!("uid=0,{PEOPLE_DN}"));
}

#[test]
fn test_cache_serves_repeated_search() {
    let provider = MockProvider::new(MockDirectory::people(5));
    let conn = open(&provider);
    let cache = Arc::new(LruSearchCache::new(
        NonZeroUsize::new(16).unwrap(),
        Duration::from_secs(60),
    ));

    for _ in 0..4 {
        let response = Operation::new(&conn)
            .with_cache(cache.clone())
            .execute(SearchRequest::new(PEOPLE_DN, "(uid=*)"))
            .unwrap();
        assert_eq!(response.result().len(), 5);
    }
    assert_eq!(provider.searches(), 1);
}

#[test]
fn test_operation_on_closed_connection_fails() {
    let provider = MockProvider::new(MockDirectory::people(1));
    let conn = open(&provider);
    conn.close();

    let err = conn
        .compare(CompareRequest::new("", "objectClass", "top"))
        .unwrap_err();
    assert!(err.is_illegal_state());
    assert_eq!(provider.invocations(), 0);
    assert_eq!(provider.open_sessions(), 0);
}
