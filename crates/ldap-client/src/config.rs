//! Connection configuration.

use std::time::Duration;

use ldap_protocol::{BindRequest, Credential, RequestDefaults, SaslConfig};

use crate::error::{Error, Result};

/// How many times a failed operation is reattempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryLimit {
    /// Retry at most this many times after the initial attempt.
    Attempts(u32),
    /// Retry until the operation succeeds or fails non-transiently.
    Unlimited,
}

/// Retry policy applied by the operation layer on transient failure.
///
/// Between attempts the connection is closed, the policy's delay elapses,
/// and the connection is reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retry budget.
    pub limit: RetryLimit,
    /// Base wait between attempts.
    pub wait: Duration,
    /// Backoff multiplier; zero disables backoff.
    pub backoff: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            limit: RetryLimit::Attempts(1),
            wait: Duration::ZERO,
            backoff: 0,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            limit: RetryLimit::Attempts(0),
            ..Self::default()
        }
    }

    /// Policy retrying `retries` times with no wait.
    #[must_use]
    pub fn attempts(retries: u32) -> Self {
        Self {
            limit: RetryLimit::Attempts(retries),
            ..Self::default()
        }
    }

    /// Set the base wait.
    #[must_use]
    pub fn wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    /// Set the backoff multiplier.
    #[must_use]
    pub fn backoff(mut self, backoff: u32) -> Self {
        self.backoff = backoff;
        self
    }

    /// Whether a retry may follow the failure of attempt `count` (0-indexed).
    #[must_use]
    pub fn allows(&self, count: u32) -> bool {
        match self.limit {
            RetryLimit::Attempts(max) => count < max,
            RetryLimit::Unlimited => true,
        }
    }

    /// Delay before the retry that follows the failure of attempt `count`.
    ///
    /// The first retry always waits the flat `wait`; later retries wait
    /// `wait * backoff * count` when backoff is configured.
    #[must_use]
    pub fn delay_for_attempt(&self, count: u32) -> Duration {
        if self.backoff > 0 && count > 0 {
            self.wait.saturating_mul(self.backoff.saturating_mul(count))
        } else {
            self.wait
        }
    }
}

/// Configuration for connecting to a directory.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Directory URL, `ldap://` or `ldaps://`.
    pub ldap_url: String,

    /// Connection establishment timeout; `None` leaves it to the provider.
    pub connect_timeout: Option<Duration>,

    /// Per-operation response timeout; `None` waits indefinitely.
    pub response_timeout: Option<Duration>,

    /// DN to bind as when opening.
    pub bind_dn: Option<String>,

    /// Credential for `bind_dn`.
    pub bind_credential: Option<Credential>,

    /// SASL bind parameters; takes precedence over `bind_dn`.
    pub sasl: Option<SaslConfig>,

    /// Whether to use LDAPS.
    pub use_ssl: bool,

    /// Whether to negotiate StartTLS after connecting.
    pub use_start_tls: bool,

    /// Operation retry policy.
    pub retry: RetryPolicy,

    /// Defaults applied to unset request fields.
    pub request_defaults: RequestDefaults,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            ldap_url: "ldap://localhost:389".to_string(),
            connect_timeout: None,
            response_timeout: None,
            bind_dn: None,
            bind_credential: None,
            sasl: None,
            use_ssl: false,
            use_start_tls: false,
            retry: RetryPolicy::default(),
            request_defaults: RequestDefaults::default(),
        }
    }
}

impl ConnectionConfig {
    /// Create a configuration for `ldap_url`.
    ///
    /// An `ldaps://` URL enables SSL.
    pub fn new(ldap_url: impl Into<String>) -> Self {
        let ldap_url = ldap_url.into();
        let use_ssl = ldap_url
            .get(..8)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("ldaps://"));
        Self {
            ldap_url,
            use_ssl,
            ..Self::default()
        }
    }

    /// Check the configuration for consistency.
    pub fn validate(&self) -> Result<()> {
        let url = self.ldap_url.trim();
        if url.is_empty() {
            return Err(Error::Config("ldap url cannot be empty".into()));
        }

        for part in url.split_whitespace() {
            let lower = part.to_lowercase();
            let known = ["ldap://", "ldaps://", "ldapi://"];
            if !known.iter().any(|scheme| lower.starts_with(scheme)) {
                return Err(Error::Config(format!(
                    "invalid ldap url '{part}': scheme must be ldap, ldaps or ldapi"
                )));
            }
        }

        if self.use_ssl && self.use_start_tls {
            return Err(Error::Config(
                "ssl and start tls cannot both be enabled".into(),
            ));
        }

        if self.bind_credential.is_some() && self.bind_dn.is_none() && self.sasl.is_none() {
            return Err(Error::Config(
                "bind credential supplied without a bind dn".into(),
            ));
        }

        Ok(())
    }

    /// Bind request used when a connection is opened without one.
    #[must_use]
    pub fn bind_request(&self) -> BindRequest {
        if let Some(sasl) = &self.sasl {
            let mut request = BindRequest::sasl(sasl.clone());
            request.dn.clone_from(&self.bind_dn);
            request.credential.clone_from(&self.bind_credential);
            return request;
        }
        match &self.bind_dn {
            Some(dn) => BindRequest {
                dn: Some(dn.clone()),
                credential: self.bind_credential.clone(),
                ..BindRequest::default()
            },
            None => BindRequest::anonymous(),
        }
    }

    /// Set the bind DN.
    #[must_use]
    pub fn bind_dn(mut self, dn: impl Into<String>) -> Self {
        self.bind_dn = Some(dn.into());
        self
    }

    /// Set the bind credential.
    #[must_use]
    pub fn bind_credential(mut self, credential: impl Into<Credential>) -> Self {
        self.bind_credential = Some(credential.into());
        self
    }

    /// Set SASL bind parameters.
    #[must_use]
    pub fn sasl(mut self, sasl: SaslConfig) -> Self {
        self.sasl = Some(sasl);
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the response timeout.
    #[must_use]
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = Some(timeout);
        self
    }

    /// Enable or disable StartTLS.
    #[must_use]
    pub fn use_start_tls(mut self, enabled: bool) -> Self {
        self.use_start_tls = enabled;
        self
    }

    /// Set the operation retry policy.
    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the request defaults.
    #[must_use]
    pub fn request_defaults(mut self, defaults: RequestDefaults) -> Self {
        self.request_defaults = defaults;
        self
    }
}
