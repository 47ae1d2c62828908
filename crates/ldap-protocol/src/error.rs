//! LDAP error types.

use thiserror::Error;

use crate::control::Control;
use crate::result_code::ResultCode;

/// Errors surfaced by connections, providers and operations.
///
/// [`LdapError::Operation`] is the only retryable variant: the provider
/// reports it when an operation may succeed if reattempted on a fresh
/// connection. Everything else propagates out of an operation immediately.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LdapError {
    /// A transient failure that the operation layer may retry.
    #[error("operation failed: {message}")]
    Operation {
        /// Provider supplied description.
        message: String,
        /// Result code, if the server produced one.
        result_code: Option<ResultCode>,
        /// Response controls attached to the failure.
        controls: Vec<Control>,
    },

    /// A non-retryable failure reported by the provider or the server.
    #[error("ldap error: {message}")]
    Ldap {
        /// Provider supplied description.
        message: String,
        /// Result code, if the server produced one.
        result_code: Option<ResultCode>,
        /// Response controls attached to the failure.
        controls: Vec<Control>,
    },

    /// `open` was called on a connection that is already open.
    #[error("connection is already open")]
    AlreadyOpen,

    /// Provider access was required but the connection is not open.
    #[error("connection is not open")]
    NotOpen,

    /// I/O error from the transport.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A search entry handler failed.
    #[error("entry handler failed: {0}")]
    Handler(String),
}

impl LdapError {
    /// Create a retryable operation error.
    pub fn operation(message: impl Into<String>, result_code: Option<ResultCode>) -> Self {
        Self::Operation {
            message: message.into(),
            result_code,
            controls: Vec::new(),
        }
    }

    /// Create a non-retryable error.
    pub fn ldap(message: impl Into<String>, result_code: Option<ResultCode>) -> Self {
        Self::Ldap {
            message: message.into(),
            result_code,
            controls: Vec::new(),
        }
    }

    /// Classify a server result code into a retryable or fatal error.
    pub fn from_result_code(result_code: ResultCode, message: impl Into<String>) -> Self {
        if result_code.is_transient() {
            Self::operation(message, Some(result_code))
        } else {
            Self::ldap(message, Some(result_code))
        }
    }

    /// Attach response controls to this error.
    #[must_use]
    pub fn with_controls(mut self, new_controls: Vec<Control>) -> Self {
        match &mut self {
            Self::Operation { controls, .. } | Self::Ldap { controls, .. } => {
                *controls = new_controls;
            }
            _ => {}
        }
        self
    }

    /// Whether the operation retry layer may reattempt after this error.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Operation { .. })
    }

    /// Result code carried by this error, if any.
    #[must_use]
    pub fn result_code(&self) -> Option<ResultCode> {
        match self {
            Self::Operation { result_code, .. } | Self::Ldap { result_code, .. } => *result_code,
            _ => None,
        }
    }

    /// Response controls carried by this error.
    #[must_use]
    pub fn controls(&self) -> &[Control] {
        match self {
            Self::Operation { controls, .. } | Self::Ldap { controls, .. } => controls,
            _ => &[],
        }
    }

    /// Whether this error reports a connection state violation.
    #[must_use]
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, Self::AlreadyOpen | Self::NotOpen)
    }
}
