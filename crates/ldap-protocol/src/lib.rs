//! # ldap-protocol
//!
//! Protocol-level model for the LDAP client and pool crates.
//!
//! This crate carries no I/O. It defines the typed requests handed to a
//! provider, the responses and controls it hands back, the result codes the
//! server reports, and the error taxonomy that the operation retry layer
//! classifies.
//!
//! ## Features
//!
//! - Per-operation request types (bind, add, compare, delete, modify,
//!   rename, search, paged search)
//! - Generic [`Response`] wrapping a typed result, result code and controls
//! - [`RequestDefaults`] that fill only unset request fields
//! - [`LdapError`] distinguishing retryable operation failures from fatal ones
//! - Search entry handlers that can transform, drop or abort

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod control;
pub mod entry;
pub mod error;
pub mod handler;
pub mod request;
pub mod response;
pub mod result_code;

pub use control::{Control, PagedResultsControl, SortKey};
pub use entry::{LdapAttribute, LdapEntry, SearchResult};
pub use error::LdapError;
pub use handler::{CaseChange, CaseChangeEntryHandler, EntryHandler, HandlerResult};
pub use request::{
    AddRequest, AttributeModification, BindRequest, CompareRequest, Credential, DeleteRequest,
    DerefAliases, ModificationKind, ModifyRequest, PagedSearchRequest, ReferralBehavior,
    RenameRequest, RequestDefaults, SaslConfig, SaslMechanism, SearchFilter, SearchKey,
    SearchRequest, SearchScope, SortBehavior,
};
pub use response::Response;
pub use result_code::ResultCode;
