//! Connection factory backed by a pool.

use std::sync::Arc;
use std::time::Duration;

use ldap_client::{ConnectionConfig, Provider};
use parking_lot::RwLock;

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::lifecycle::{ConnectActivator, ConnectionFactory, LdapConnectionFactory};
use crate::pool::{ConnectionPool, Pool, PooledConnection};
use crate::strategy::PoolType;

/// Hands out connections from a pool instead of opening new ones.
///
/// # Example
///
/// ```rust,ignore
/// let factory = PooledConnectionFactory::from_config(
///     PoolType::SoftLimit,
///     ConnectionConfig::new("ldap://directory.vt.edu"),
///     provider,
///     PoolConfig::default(),
/// )?;
/// factory.initialize()?;
///
/// let conn = factory.get_connection()?;
/// conn.compare(CompareRequest::new("uid=dfisher,ou=people,dc=vt,dc=edu", "uid", "dfisher"))?;
/// drop(conn);
///
/// factory.close();
/// ```
#[derive(Debug)]
pub struct PooledConnectionFactory {
    pool: Box<dyn ConnectionPool>,
    initialized: RwLock<bool>,
}

impl PooledConnectionFactory {
    /// Factory over an existing, uninitialized pool.
    #[must_use]
    pub fn new(pool: Box<dyn ConnectionPool>) -> Self {
        Self {
            pool,
            initialized: RwLock::new(false),
        }
    }

    /// Factory over a new `pool_type` pool of connections to `config`.
    ///
    /// Pooled connections are opened when created and reopened on checkout
    /// if a passivator closed them.
    pub fn from_config(
        pool_type: PoolType,
        config: ConnectionConfig,
        provider: Arc<dyn Provider>,
        pool_config: PoolConfig,
    ) -> Result<Self, PoolError> {
        let connections: Arc<dyn ConnectionFactory> = Arc::new(
            LdapConnectionFactory::from_config(config, provider)?
                .activator(Arc::new(ConnectActivator)),
        );
        let pool = Pool::builder(connections)
            .pool_type(pool_type)
            .pool_config(pool_config)
            .block_wait_time(Duration::ZERO)
            .build();
        Ok(Self::new(Box::new(pool)))
    }

    /// Initialize the underlying pool.
    pub fn initialize(&self) -> Result<(), PoolError> {
        let mut initialized = self.initialized.write();
        self.pool.initialize()?;
        *initialized = true;
        Ok(())
    }

    /// Check out a connection; it is returned to the pool on drop.
    pub fn get_connection(&self) -> Result<PooledConnection, PoolError> {
        if !*self.initialized.read() {
            return Err(PoolError::NotInitialized);
        }
        self.pool.check_out()
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &dyn ConnectionPool {
        self.pool.as_ref()
    }

    /// Close the underlying pool.
    pub fn close(&self) {
        self.pool.close();
    }
}
