//! # ldap-testing
//!
//! Test infrastructure for the LDAP client and pool crates.
//!
//! ## Features
//!
//! - [`MockDirectory`]: an in-memory entry tree supporting add, delete,
//!   modify, rename, compare and simple-filter search
//! - [`MockProvider`]: a [`Provider`](ldap_client::Provider) over a mock
//!   directory with fault injection (failed connects, transient and
//!   permanent operation failures), session counters and paged results
//!
//! ## Example
//!
//! ```rust,ignore
//! use ldap_testing::{MockDirectory, MockProvider};
//!
//! let provider = MockProvider::new(MockDirectory::people(25));
//! let factory = ldap_testing::connection_factory(&provider);
//! let conn = factory.open_connection()?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod directory;
pub mod provider;

use std::sync::Arc;

use ldap_client::{ConnectionConfig, DefaultConnectionFactory};

pub use directory::{MockDirectory, PEOPLE_DN};
pub use provider::MockProvider;

/// Configuration pointing at the mock server, bound as a service account.
#[must_use]
pub fn connection_config() -> ConnectionConfig {
    ConnectionConfig::new("ldap://mock.vt.edu:389")
        .bind_dn("uid=service,ou=services,dc=vt,dc=edu")
        .bind_credential("service-secret")
}

/// Connection factory over `provider` using [`connection_config`].
///
/// # Panics
///
/// Never in practice: the mock configuration is always valid.
#[must_use]
#[allow(clippy::expect_used)]
pub fn connection_factory(provider: &MockProvider) -> DefaultConnectionFactory {
    DefaultConnectionFactory::new(connection_config(), Arc::new(provider.clone()))
        .expect("mock connection config is valid")
}

/// Install a test-writer `tracing` subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
