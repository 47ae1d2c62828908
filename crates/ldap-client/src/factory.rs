//! Connection factory.

use std::sync::Arc;

use crate::config::ConnectionConfig;
use crate::connection::Connection;
use crate::error::Result;
use crate::provider::Provider;

/// Creates connections sharing one configuration and provider.
#[derive(Debug, Clone)]
pub struct DefaultConnectionFactory {
    config: Arc<ConnectionConfig>,
    provider: Arc<dyn Provider>,
}

impl DefaultConnectionFactory {
    /// Create a factory, validating `config`.
    pub fn new(config: ConnectionConfig, provider: Arc<dyn Provider>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            provider,
        })
    }

    /// Shared connection configuration.
    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// The provider connections are opened through.
    #[must_use]
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// A new, closed connection.
    #[must_use]
    pub fn connection(&self) -> Connection {
        Connection::new(self.config.clone(), self.provider.clone())
    }

    /// A new connection, opened with the configured bind.
    pub fn open_connection(&self) -> Result<Connection> {
        let connection = self.connection();
        connection.open()?;
        Ok(connection)
    }
}
