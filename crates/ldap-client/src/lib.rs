//! # ldap-client
//!
//! LDAP connections and operations over a pluggable provider.
//!
//! The wire protocol is supplied by a [`Provider`]; this crate owns the
//! session lifecycle around it and the uniform retry policy every operation
//! runs under.
//!
//! ## Features
//!
//! - [`Connection`] with explicit open/close and last-bind reconnection
//! - [`Operation`] executing any request kind with retry, backoff and
//!   reconnect on transient failure
//! - Search entry handlers, result sorting and paged search
//! - Optional LRU search result cache
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ldap_client::{ConnectionConfig, DefaultConnectionFactory, Operation};
//! use ldap_protocol::SearchRequest;
//!
//! let config = ConnectionConfig::new("ldap://directory.vt.edu")
//!     .bind_dn("uid=app,ou=services,dc=vt,dc=edu")
//!     .bind_credential("secret");
//! let factory = DefaultConnectionFactory::new(config, Arc::new(my_provider))?;
//!
//! let conn = factory.open_connection()?;
//! let response = Operation::new(&conn)
//!     .execute(SearchRequest::new("ou=people,dc=vt,dc=edu", "(uid=dfisher)"))?;
//! for entry in response.result().entries() {
//!     println!("{}", entry.dn);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cache;
pub mod config;
pub mod connection;
pub mod error;
pub mod factory;
pub mod operation;
pub mod provider;
pub mod search;

#[cfg(test)]
mod test_support;

pub use cache::{LruSearchCache, SearchCache};
pub use config::{ConnectionConfig, RetryLimit, RetryPolicy};
pub use connection::Connection;
pub use error::{Error, Result};
pub use factory::DefaultConnectionFactory;
pub use operation::{InvokeContext, Operation, OperationKind, Request};
pub use provider::{Provider, ProviderConnection, SearchIterator};
