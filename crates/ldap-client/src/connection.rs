//! A single logical session to the directory.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use ldap_protocol::{
    AddRequest, BindRequest, CompareRequest, DeleteRequest, ModifyRequest, PagedSearchRequest,
    RenameRequest, Response, SearchRequest, SearchResult,
};
use parking_lot::Mutex;

use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::operation::Operation;
use crate::provider::{Provider, ProviderConnection};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// A connection to the directory.
///
/// The provider handle is present exactly while the connection is open.
/// All methods take `&self`: the handle sits behind a mutex, so a connection
/// may be shared between threads and each provider call is serialized.
///
/// Retry is not handled here; see [`Operation`].
pub struct Connection {
    id: u64,
    config: Arc<ConnectionConfig>,
    provider: Arc<dyn Provider>,
    session: Mutex<Option<Session>>,
    /// Bind used by the last successful open or bind operation.
    last_bind: Mutex<Option<BindRequest>>,
}

struct Session {
    handle: Box<dyn ProviderConnection>,
    opened_at: Instant,
}

impl Connection {
    /// Create a closed connection.
    pub fn new(config: Arc<ConnectionConfig>, provider: Arc<dyn Provider>) -> Self {
        Self {
            id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            config,
            provider,
            session: Mutex::new(None),
            last_bind: Mutex::new(None),
        }
    }

    /// Process-unique identifier of this connection.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Configuration this connection was created with.
    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Whether a provider session is established.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.session.lock().is_some()
    }

    /// When the current session was established.
    #[must_use]
    pub fn opened_at(&self) -> Option<Instant> {
        self.session.lock().as_ref().map(|s| s.opened_at)
    }

    /// Open the connection, binding with the configured credentials.
    ///
    /// Fails with [`Error::AlreadyOpen`] if the connection is open.
    pub fn open(&self) -> Result<()> {
        self.open_with(self.config.bind_request())
    }

    /// Open the connection, binding with `bind`.
    ///
    /// Fails with [`Error::AlreadyOpen`] if the connection is open.
    pub fn open_with(&self, bind: BindRequest) -> Result<()> {
        let mut session = self.session.lock();
        if session.is_some() {
            return Err(Error::AlreadyOpen);
        }

        tracing::debug!(
            connection_id = self.id,
            url = %self.config.ldap_url,
            bind_dn = ?bind.dn,
            "opening connection"
        );

        let handle = self.provider.connect(&self.config, &bind)?;
        *session = Some(Session {
            handle,
            opened_at: Instant::now(),
        });
        *self.last_bind.lock() = Some(bind);
        Ok(())
    }

    /// Open the connection with the bind used by the last successful open
    /// or bind operation, falling back to the configured credentials.
    pub fn reopen(&self) -> Result<()> {
        let bind = self
            .last_bind
            .lock()
            .clone()
            .unwrap_or_else(|| self.config.bind_request());
        self.open_with(bind)
    }

    /// Close the connection.
    ///
    /// Idempotent. Provider close errors are logged, never returned.
    pub fn close(&self) {
        let session = self.session.lock().take();
        if let Some(mut session) = session {
            if let Err(e) = session.handle.close() {
                tracing::warn!(
                    connection_id = self.id,
                    error = %e,
                    "error closing provider connection"
                );
            }
            tracing::debug!(connection_id = self.id, "connection closed");
        }
    }

    /// Run `f` against the open provider session.
    ///
    /// Fails with [`Error::NotOpen`] if the connection is closed.
    pub fn with_provider<T>(
        &self,
        f: impl FnOnce(&mut dyn ProviderConnection) -> Result<T>,
    ) -> Result<T> {
        let mut session = self.session.lock();
        match session.as_mut() {
            Some(session) => f(session.handle.as_mut()),
            None => Err(Error::NotOpen),
        }
    }

    pub(crate) fn remember_bind(&self, bind: BindRequest) {
        *self.last_bind.lock() = Some(bind);
    }

    /// Execute a bind.
    pub fn bind(&self, request: BindRequest) -> Result<Response<()>> {
        Operation::new(self).execute(request)
    }

    /// Execute an add.
    pub fn add(&self, request: AddRequest) -> Result<Response<()>> {
        Operation::new(self).execute(request)
    }

    /// Execute a compare.
    pub fn compare(&self, request: CompareRequest) -> Result<Response<bool>> {
        Operation::new(self).execute(request)
    }

    /// Execute a delete.
    pub fn delete(&self, request: DeleteRequest) -> Result<Response<()>> {
        Operation::new(self).execute(request)
    }

    /// Execute a modify.
    pub fn modify(&self, request: ModifyRequest) -> Result<Response<()>> {
        Operation::new(self).execute(request)
    }

    /// Execute a rename.
    pub fn rename(&self, request: RenameRequest) -> Result<Response<()>> {
        Operation::new(self).execute(request)
    }

    /// Execute a search.
    pub fn search(&self, request: SearchRequest) -> Result<Response<SearchResult>> {
        Operation::new(self).execute(request)
    }

    /// Execute a paged search, merging all pages.
    pub fn paged_search(&self, request: PagedSearchRequest) -> Result<Response<SearchResult>> {
        Operation::new(self).execute(request)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Connection {}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("url", &self.config.ldap_url)
            .field("open", &self.is_open())
            .finish()
    }
}
