//! # ldap-pool
//!
//! Connection pools for LDAP connections with lifecycle management.
//!
//! Establishing an authenticated directory session is expensive; a pool
//! keeps a set of open connections and hands them out to callers, checking
//! them back in when the caller is done.
//!
//! ## Features
//!
//! - Three checkout strategies ([`PoolType`]): blocking, soft-limit and
//!   shared
//! - Activation, passivation and validation hooks around checkout and
//!   checkin ([`Activator`], [`Passivator`], [`Validator`])
//! - Compare- and search-based liveness checks
//! - Background pruning of expired idle connections and periodic
//!   validation, on a dedicated thread per pool
//! - Checkout guard that returns the connection on drop
//! - Pool status and metrics
//!
//! ## Example
//!
//! ```rust,ignore
//! use ldap_pool::{CompareValidator, LdapConnectionFactory, Pool, PoolConfig, PoolType};
//! use std::time::Duration;
//!
//! let factory = LdapConnectionFactory::from_config(config, provider)?
//!     .validator(Arc::new(CompareValidator::default()));
//!
//! let pool = Pool::builder(Arc::new(factory))
//!     .pool_type(PoolType::Blocking)
//!     .pool_config(
//!         PoolConfig::builder()
//!             .min_pool_size(2)
//!             .max_pool_size(8)
//!             .validate_on_check_out(true)
//!             .build()?,
//!     )
//!     .block_wait_time(Duration::from_secs(5))
//!     .build();
//! pool.initialize()?;
//!
//! let conn = pool.check_out()?;
//! let response = conn.search(SearchRequest::new("ou=people,dc=vt,dc=edu", "(uid=dfisher)"))?;
//! // connection returned to the pool on drop
//!
//! let status = pool.status();
//! println!("Pool utilization: {:.1}%", status.utilization());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod factory;
pub mod lifecycle;
mod maintenance;
pub mod pool;
pub mod strategy;

// Configuration
pub use config::{PoolConfig, PoolConfigBuilder};

// Error types
pub use error::PoolError;

// Pool types
pub use factory::PooledConnectionFactory;
pub use pool::{ConnectionPool, Pool, PoolBuilder, PoolMetrics, PoolStatus, PooledConnection};
pub use strategy::PoolType;

// Lifecycle management
pub use lifecycle::{
    Activator, BindPassivator, ClosePassivator, CompareValidator, ConnectActivator,
    ConnectionFactory, LdapConnectionFactory, Passivator, SearchValidator, Validator,
};
