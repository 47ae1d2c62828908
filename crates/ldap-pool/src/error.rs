//! Pool error types.

use std::time::Duration;

use ldap_protocol::LdapError;
use thiserror::Error;

/// Errors that can occur during pool operations.
#[derive(Debug, Error)]
pub enum PoolError {
    /// No connection could be obtained and none could be created.
    #[error("pool is exhausted")]
    Exhausted,

    /// Waiting for an available connection exceeded the block wait time.
    #[error("timed out after {waited:?} waiting for an available connection")]
    BlockingTimeout {
        /// How long the caller waited.
        waited: Duration,
    },

    /// The pool was closed while the caller was waiting for a connection.
    #[error("interrupted while waiting for an available connection")]
    Interrupted,

    /// The connection could not be activated for use.
    #[error("connection failed activation")]
    Activation,

    /// The connection failed validation on checkout.
    #[error("connection failed validation")]
    Validation,

    /// The pool has been closed.
    #[error("pool is closed")]
    PoolClosed,

    /// The pool has not been initialized.
    #[error("pool has not been initialized")]
    NotInitialized,

    /// Invalid pool configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Underlying connection error.
    #[error("connection error: {0}")]
    Ldap(#[from] LdapError),
}

impl PoolError {
    /// Whether the error reflects pool capacity or timing rather than a
    /// broken connection.
    #[must_use]
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            Self::Exhausted | Self::BlockingTimeout { .. } | Self::Interrupted
        )
    }
}
