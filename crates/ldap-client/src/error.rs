//! Client error types.

/// Errors returned by connections and operations.
pub use ldap_protocol::LdapError as Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
