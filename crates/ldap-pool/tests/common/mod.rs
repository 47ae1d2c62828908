//! Shared pool fixtures over the mock provider.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ldap_client::Connection;
use ldap_pool::{LdapConnectionFactory, Pool, PoolConfig, PoolType, Validator};
use ldap_testing::{MockDirectory, MockProvider, connection_factory, init_tracing};

pub fn provider() -> MockProvider {
    init_tracing();
    MockProvider::new(MockDirectory::people(5))
}

pub fn sizes(min: usize, max: usize) -> ldap_pool::PoolConfigBuilder {
    PoolConfig::builder().min_pool_size(min).max_pool_size(max)
}

pub fn factory(provider: &MockProvider) -> LdapConnectionFactory {
    LdapConnectionFactory::new(connection_factory(provider))
}

pub fn pool(
    factory: LdapConnectionFactory,
    pool_type: PoolType,
    config: PoolConfig,
    block_wait_time: Duration,
) -> Pool {
    Pool::builder(Arc::new(factory))
        .pool_type(pool_type)
        .pool_config(config)
        .block_wait_time(block_wait_time)
        .build()
}

/// Validator whose verdict the test flips.
#[derive(Debug, Clone, Default)]
pub struct SwitchValidator {
    failing: Arc<AtomicBool>,
}

impl SwitchValidator {
    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Validator for SwitchValidator {
    fn validate(&self, _connection: &Connection) -> bool {
        !self.failing.load(Ordering::SeqCst)
    }
}
