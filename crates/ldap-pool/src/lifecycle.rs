//! Connection lifecycle management.
//!
//! A pool drives each connection through four hooks supplied by its
//! [`ConnectionFactory`]:
//!
//! - **create** / **destroy** bracket the connection's membership in the pool
//! - **activate** prepares a connection before it is handed to a caller
//! - **passivate** cleans it up when it is checked back in
//! - **validate** is the liveness check run on check-in, check-out or in
//!   the background, depending on [`PoolConfig`](crate::PoolConfig)
//!
//! [`LdapConnectionFactory`] assembles those hooks from pluggable
//! [`Activator`], [`Passivator`] and [`Validator`] strategies.

use std::fmt;
use std::sync::Arc;

use ldap_client::{
    Connection, ConnectionConfig, DefaultConnectionFactory, Operation, Provider, RetryPolicy,
};
use ldap_protocol::{BindRequest, CompareRequest, SearchRequest, SearchScope};

use crate::error::PoolError;

/// Prepares a connection for use.
pub trait Activator: Send + Sync + fmt::Debug {
    /// Returns whether the connection is ready for use.
    fn activate(&self, connection: &Connection) -> bool;
}

/// Cleans up a connection on its way back into the pool.
pub trait Passivator: Send + Sync + fmt::Debug {
    /// Returns whether the connection may be reused.
    fn passivate(&self, connection: &Connection) -> bool;
}

/// Checks that a connection is alive.
pub trait Validator: Send + Sync + fmt::Debug {
    /// Returns whether the connection is healthy.
    fn validate(&self, connection: &Connection) -> bool;
}

/// Opens the connection if it is closed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectActivator;

impl Activator for ConnectActivator {
    fn activate(&self, connection: &Connection) -> bool {
        if connection.is_open() {
            return true;
        }
        match connection.open() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    connection_id = connection.id(),
                    error = %e,
                    "unable to open connection during activation"
                );
                false
            }
        }
    }
}

/// Closes the connection; the pool keeps the closed connection as a
/// placeholder until it is activated again.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosePassivator;

impl Passivator for ClosePassivator {
    fn passivate(&self, connection: &Connection) -> bool {
        connection.close();
        true
    }
}

/// Rebinds the connection to a fixed identity.
#[derive(Debug, Clone)]
pub struct BindPassivator {
    bind: BindRequest,
}

impl BindPassivator {
    /// Rebind with `bind` on every check-in.
    #[must_use]
    pub fn new(bind: BindRequest) -> Self {
        Self { bind }
    }
}

impl Default for BindPassivator {
    fn default() -> Self {
        Self::new(BindRequest::anonymous())
    }
}

impl Passivator for BindPassivator {
    fn passivate(&self, connection: &Connection) -> bool {
        let result = Operation::new(connection)
            .with_retry(RetryPolicy::none())
            .execute(self.bind.clone());
        match result {
            Ok(response) => response.result_code().is_success(),
            Err(e) => {
                tracing::warn!(
                    connection_id = connection.id(),
                    error = %e,
                    "rebind failed during passivation"
                );
                false
            }
        }
    }
}

/// Validates by comparing an attribute value; valid iff the compare
/// matches.
#[derive(Debug, Clone)]
pub struct CompareValidator {
    request: CompareRequest,
}

impl CompareValidator {
    /// Validate with `request`.
    #[must_use]
    pub fn new(request: CompareRequest) -> Self {
        Self { request }
    }
}

impl Default for CompareValidator {
    /// Compares `objectClass=top` on the root DSE.
    fn default() -> Self {
        Self::new(CompareRequest::new("", "objectClass", "top"))
    }
}

impl Validator for CompareValidator {
    fn validate(&self, connection: &Connection) -> bool {
        let result = Operation::new(connection)
            .with_retry(RetryPolicy::none())
            .execute(self.request.clone());
        match result {
            Ok(response) => *response.result(),
            Err(e) => {
                tracing::debug!(connection_id = connection.id(), error = %e, "compare validation failed");
                false
            }
        }
    }
}

/// Validates with a search; valid iff at least one entry is returned.
#[derive(Debug, Clone)]
pub struct SearchValidator {
    request: SearchRequest,
}

impl SearchValidator {
    /// Validate with `request`.
    #[must_use]
    pub fn new(request: SearchRequest) -> Self {
        Self { request }
    }
}

impl Default for SearchValidator {
    /// Base-scope search of the root DSE returning no attributes.
    fn default() -> Self {
        Self::new(
            SearchRequest::new("", "(objectClass=*)")
                .scope(SearchScope::Object)
                .size_limit(1)
                .return_attributes(["1.1"]),
        )
    }
}

impl Validator for SearchValidator {
    fn validate(&self, connection: &Connection) -> bool {
        let result = Operation::new(connection)
            .with_retry(RetryPolicy::none())
            .execute(self.request.clone());
        match result {
            Ok(response) => !response.result().is_empty(),
            Err(e) => {
                tracing::debug!(connection_id = connection.id(), error = %e, "search validation failed");
                false
            }
        }
    }
}

/// Creates, destroys, activates, passivates and validates the connections
/// of a pool.
pub trait ConnectionFactory: Send + Sync + fmt::Debug {
    /// Create a connection, or `None` if it could not be established.
    fn create(&self) -> Option<Connection>;

    /// Release a connection. Never fails.
    fn destroy(&self, connection: &Connection);

    /// Prepare a connection for checkout.
    fn activate(&self, connection: &Connection) -> bool;

    /// Clean up a connection on checkin.
    fn passivate(&self, connection: &Connection) -> bool;

    /// Check a connection's health.
    fn validate(&self, connection: &Connection) -> bool;
}

/// [`ConnectionFactory`] over a [`DefaultConnectionFactory`] with pluggable
/// lifecycle strategies.
///
/// Connections are opened on creation by default. Without an activator,
/// passivator or validator the corresponding hook succeeds trivially.
#[derive(Debug, Clone)]
pub struct LdapConnectionFactory {
    connections: DefaultConnectionFactory,
    connect_on_create: bool,
    activator: Option<Arc<dyn Activator>>,
    passivator: Option<Arc<dyn Passivator>>,
    validator: Option<Arc<dyn Validator>>,
}

impl LdapConnectionFactory {
    /// Factory creating connections from `connections`.
    #[must_use]
    pub fn new(connections: DefaultConnectionFactory) -> Self {
        Self {
            connections,
            connect_on_create: true,
            activator: None,
            passivator: None,
            validator: None,
        }
    }

    /// Factory for `config` over `provider`, validating the configuration.
    pub fn from_config(
        config: ConnectionConfig,
        provider: Arc<dyn Provider>,
    ) -> Result<Self, PoolError> {
        Ok(Self::new(DefaultConnectionFactory::new(config, provider)?))
    }

    /// Whether connections are opened when created.
    #[must_use]
    pub fn connect_on_create(mut self, enabled: bool) -> Self {
        self.connect_on_create = enabled;
        self
    }

    /// Set the activator.
    #[must_use]
    pub fn activator(mut self, activator: Arc<dyn Activator>) -> Self {
        self.activator = Some(activator);
        self
    }

    /// Set the passivator.
    #[must_use]
    pub fn passivator(mut self, passivator: Arc<dyn Passivator>) -> Self {
        self.passivator = Some(passivator);
        self
    }

    /// Set the validator.
    #[must_use]
    pub fn validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// The underlying connection factory.
    #[must_use]
    pub fn connections(&self) -> &DefaultConnectionFactory {
        &self.connections
    }
}

impl ConnectionFactory for LdapConnectionFactory {
    fn create(&self) -> Option<Connection> {
        let connection = self.connections.connection();
        if self.connect_on_create {
            if let Err(e) = connection.open() {
                tracing::error!(
                    url = %self.connections.config().ldap_url,
                    error = %e,
                    "unable to connect to ldap"
                );
                return None;
            }
        }
        tracing::trace!(connection_id = connection.id(), "created connection");
        Some(connection)
    }

    fn destroy(&self, connection: &Connection) {
        connection.close();
        tracing::trace!(connection_id = connection.id(), "destroyed connection");
    }

    fn activate(&self, connection: &Connection) -> bool {
        self.activator
            .as_ref()
            .is_none_or(|activator| activator.activate(connection))
    }

    fn passivate(&self, connection: &Connection) -> bool {
        self.passivator
            .as_ref()
            .is_none_or(|passivator| passivator.passivate(connection))
    }

    fn validate(&self, connection: &Connection) -> bool {
        match &self.validator {
            Some(validator) => validator.validate(connection),
            None => {
                tracing::warn!(
                    connection_id = connection.id(),
                    "validate called, but no validator configured"
                );
                true
            }
        }
    }
}
