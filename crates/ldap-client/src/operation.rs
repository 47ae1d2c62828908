//! Operation execution and the retry layer.
//!
//! Every protocol call runs through [`Operation::execute`]:
//!
//! 1. unset request fields are filled from connection defaults,
//! 2. the request is invoked against the connection's provider session,
//! 3. on a retryable failure the connection is closed, the retry delay
//!    elapses, the connection is reopened and the request is invoked again,
//!    until the retry budget is spent.
//!
//! Request kinds differ only in their [`Request`] implementation: which
//! provider call `invoke` makes and which defaults `initialize` applies.

use std::fmt;
use std::sync::Arc;
use std::thread;

use ldap_protocol::{
    AddRequest, BindRequest, CompareRequest, DeleteRequest, ModifyRequest, RenameRequest,
    Response,
};

use crate::cache::SearchCache;
use crate::config::{ConnectionConfig, RetryPolicy};
use crate::connection::Connection;
use crate::error::{Error, Result};

/// The kind of protocol operation a request performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Bind.
    Bind,
    /// Add.
    Add,
    /// Compare.
    Compare,
    /// Delete.
    Delete,
    /// Modify.
    Modify,
    /// Rename (modify DN).
    Rename,
    /// Search.
    Search,
    /// Paged search.
    PagedSearch,
}

impl OperationKind {
    /// Lower-case operation name, as used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bind => "bind",
            Self::Add => "add",
            Self::Compare => "compare",
            Self::Delete => "delete",
            Self::Modify => "modify",
            Self::Rename => "rename",
            Self::Search => "search",
            Self::PagedSearch => "paged_search",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State shared with a request while it is invoked.
#[derive(Default)]
pub struct InvokeContext<'a> {
    /// Search result cache, if the operation has one.
    pub cache: Option<&'a dyn SearchCache>,
}

/// A request the operation layer knows how to execute.
pub trait Request: fmt::Debug {
    /// Typed result carried by the response.
    type Output;

    /// The operation this request performs.
    const KIND: OperationKind;

    /// Fill unset fields from connection-level defaults.
    ///
    /// Fields the caller already set must not be overwritten.
    fn initialize(&mut self, _config: &ConnectionConfig) {}

    /// Perform the provider call.
    fn invoke(&self, connection: &Connection, context: &InvokeContext<'_>)
    -> Result<Response<Self::Output>>;
}

/// Executes requests against a connection under a retry policy.
///
/// # Example
///
/// ```rust,ignore
/// let response = Operation::new(&conn)
///     .with_retry(RetryPolicy::attempts(3).wait(Duration::from_millis(200)).backoff(2))
///     .execute(DeleteRequest::new("uid=gone,ou=people,dc=vt,dc=edu"))?;
/// ```
pub struct Operation<'c> {
    connection: &'c Connection,
    retry: RetryPolicy,
    cache: Option<Arc<dyn SearchCache>>,
}

impl<'c> Operation<'c> {
    /// Operation bound to `connection`, using its configured retry policy.
    #[must_use]
    pub fn new(connection: &'c Connection) -> Self {
        Self {
            connection,
            retry: connection.config().retry,
            cache: None,
        }
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Serve searches from `cache` when possible.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn SearchCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The connection this operation runs on.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        self.connection
    }

    /// The retry policy in effect.
    #[must_use]
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Execute `request`, retrying on transient failure.
    ///
    /// Returns the first successful response. A non-retryable error is
    /// returned immediately; a retryable one is returned only once the retry
    /// budget is exhausted.
    pub fn execute<R: Request>(&self, mut request: R) -> Result<Response<R::Output>> {
        request.initialize(self.connection.config());
        tracing::debug!(
            operation = %R::KIND,
            connection_id = self.connection.id(),
            request = ?request,
            "execute request"
        );

        let context = InvokeContext {
            cache: self.cache.as_deref(),
        };
        let mut attempt = 0u32;
        loop {
            match request.invoke(self.connection, &context) {
                Ok(response) => {
                    tracing::debug!(
                        operation = %R::KIND,
                        connection_id = self.connection.id(),
                        result_code = %response.result_code(),
                        "execute response"
                    );
                    return Ok(response);
                }
                Err(e) if e.is_retryable() => {
                    self.handle_retry(R::KIND, e, attempt)?;
                    attempt = attempt.saturating_add(1);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn handle_retry(&self, kind: OperationKind, error: Error, count: u32) -> Result<()> {
        if !self.retry.allows(count) {
            return Err(error);
        }

        tracing::warn!(
            operation = %kind,
            connection_id = self.connection.id(),
            attempt = count,
            error = %error,
            "error performing ldap operation, retrying"
        );
        self.connection.close();

        let delay = self.retry.delay_for_attempt(count);
        if !delay.is_zero() {
            thread::sleep(delay);
        }

        self.connection.reopen()
    }
}

impl fmt::Debug for Operation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("connection", self.connection)
            .field("retry", &self.retry)
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

impl Request for BindRequest {
    type Output = ();
    const KIND: OperationKind = OperationKind::Bind;

    fn invoke(&self, connection: &Connection, _context: &InvokeContext<'_>) -> Result<Response<()>> {
        let response = connection.with_provider(|p| p.bind(self))?;
        connection.remember_bind(self.clone());
        Ok(response)
    }
}

impl Request for AddRequest {
    type Output = ();
    const KIND: OperationKind = OperationKind::Add;

    fn invoke(&self, connection: &Connection, _context: &InvokeContext<'_>) -> Result<Response<()>> {
        connection.with_provider(|p| p.add(self))
    }
}

impl Request for CompareRequest {
    type Output = bool;
    const KIND: OperationKind = OperationKind::Compare;

    fn invoke(
        &self,
        connection: &Connection,
        _context: &InvokeContext<'_>,
    ) -> Result<Response<bool>> {
        connection.with_provider(|p| p.compare(self))
    }
}

impl Request for DeleteRequest {
    type Output = ();
    const KIND: OperationKind = OperationKind::Delete;

    fn invoke(&self, connection: &Connection, _context: &InvokeContext<'_>) -> Result<Response<()>> {
        connection.with_provider(|p| p.delete(self))
    }
}

impl Request for ModifyRequest {
    type Output = ();
    const KIND: OperationKind = OperationKind::Modify;

    fn invoke(&self, connection: &Connection, _context: &InvokeContext<'_>) -> Result<Response<()>> {
        connection.with_provider(|p| p.modify(self))
    }
}

impl Request for RenameRequest {
    type Output = ();
    const KIND: OperationKind = OperationKind::Rename;

    fn invoke(&self, connection: &Connection, _context: &InvokeContext<'_>) -> Result<Response<()>> {
        connection.with_provider(|p| p.rename(self))
    }
}
