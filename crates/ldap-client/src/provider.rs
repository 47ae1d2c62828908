//! Provider interfaces.
//!
//! A provider implements the wire protocol. The client consumes it only
//! through these traits: a [`Provider`] opens authenticated sessions, a
//! [`ProviderConnection`] performs operations on one session, and a
//! [`SearchIterator`] streams search entries without buffering the whole
//! result set.
//!
//! Providers classify their failures: an error that may succeed on a fresh
//! connection must be reported as [`Error::Operation`](crate::Error::Operation)
//! so the operation layer retries it.

use std::fmt;

use ldap_protocol::{
    AddRequest, BindRequest, CompareRequest, DeleteRequest, LdapEntry, ModifyRequest,
    RenameRequest, Response, SearchRequest,
};

use crate::config::ConnectionConfig;
use crate::error::Result;

/// Opens provider-level sessions.
pub trait Provider: Send + Sync + fmt::Debug {
    /// Connect to the directory described by `config` and bind with `bind`.
    fn connect(
        &self,
        config: &ConnectionConfig,
        bind: &BindRequest,
    ) -> Result<Box<dyn ProviderConnection>>;
}

/// One provider-level session.
pub trait ProviderConnection: Send {
    /// Bind (or rebind) the session.
    fn bind(&mut self, request: &BindRequest) -> Result<Response<()>>;

    /// Create an entry.
    fn add(&mut self, request: &AddRequest) -> Result<Response<()>>;

    /// Compare an attribute value; the result is whether it matched.
    fn compare(&mut self, request: &CompareRequest) -> Result<Response<bool>>;

    /// Remove an entry.
    fn delete(&mut self, request: &DeleteRequest) -> Result<Response<()>>;

    /// Change an entry's attributes.
    fn modify(&mut self, request: &ModifyRequest) -> Result<Response<()>>;

    /// Change an entry's DN.
    fn rename(&mut self, request: &RenameRequest) -> Result<Response<()>>;

    /// Start a search.
    fn search<'a>(&'a mut self, request: &SearchRequest) -> Result<Box<dyn SearchIterator + 'a>>;

    /// Release the session.
    fn close(&mut self) -> Result<()>;
}

/// Streams the entries of one search.
pub trait SearchIterator {
    /// Read the next entry, or `None` once the search is done.
    fn next_entry(&mut self) -> Result<Option<LdapEntry>>;

    /// Terminal response carrying the result code and response controls.
    ///
    /// Only meaningful after [`next_entry`](Self::next_entry) returned `None`.
    fn response(&mut self) -> Result<Response<()>>;

    /// Abandon the search and release its resources.
    fn close(&mut self);
}
