//! Typed request envelopes.
//!
//! Requests are created fresh per call. Optional fields left as `None` are
//! considered unset and may be filled from connection-level defaults before
//! the request is invoked; fields the caller set are never overwritten.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use crate::control::Control;
use crate::entry::LdapAttribute;
use crate::handler::EntryHandler;

/// A bind password or other secret.
///
/// The `Debug` representation never reveals the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The secret value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the secret is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<suppressed>)")
    }
}

impl From<&str> for Credential {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// SASL mechanism used for a bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaslMechanism {
    /// Identity established by the transport (e.g. a client certificate).
    External,
    /// DIGEST-MD5.
    DigestMd5,
    /// CRAM-MD5.
    CramMd5,
    /// Kerberos via GSSAPI.
    GssApi,
}

/// SASL bind parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaslConfig {
    /// Mechanism to negotiate.
    pub mechanism: SaslMechanism,
    /// Identity to act as, if different from the authenticated one.
    pub authorization_id: Option<String>,
    /// Realm, for mechanisms that use one.
    pub realm: Option<String>,
}

impl SaslConfig {
    /// Parameters for `mechanism` with no authorization ID or realm.
    #[must_use]
    pub fn new(mechanism: SaslMechanism) -> Self {
        Self {
            mechanism,
            authorization_id: None,
            realm: None,
        }
    }
}

/// Bind request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindRequest {
    /// DN to bind as; `None` for anonymous or SASL binds.
    pub dn: Option<String>,
    /// Credential for a simple bind.
    pub credential: Option<Credential>,
    /// SASL parameters; takes precedence over a simple bind.
    pub sasl: Option<SaslConfig>,
    /// Request controls.
    pub controls: Vec<Control>,
}

impl BindRequest {
    /// Anonymous bind.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Simple bind as `dn`.
    pub fn simple(dn: impl Into<String>, credential: impl Into<Credential>) -> Self {
        Self {
            dn: Some(dn.into()),
            credential: Some(credential.into()),
            ..Self::default()
        }
    }

    /// SASL bind.
    #[must_use]
    pub fn sasl(config: SaslConfig) -> Self {
        Self {
            sasl: Some(config),
            ..Self::default()
        }
    }

    /// Whether this bind carries no identity at all.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.dn.is_none() && self.credential.is_none() && self.sasl.is_none()
    }
}

/// Add request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRequest {
    /// DN of the entry to create.
    pub dn: String,
    /// Attributes of the new entry.
    pub attributes: Vec<LdapAttribute>,
    /// Request controls.
    pub controls: Vec<Control>,
}

impl AddRequest {
    /// Create an add request.
    pub fn new(dn: impl Into<String>, attributes: Vec<LdapAttribute>) -> Self {
        Self {
            dn: dn.into(),
            attributes,
            controls: Vec::new(),
        }
    }
}

/// Compare request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareRequest {
    /// DN of the entry to compare against.
    pub dn: String,
    /// Attribute name.
    pub attribute: String,
    /// Value asserted for the attribute.
    pub value: String,
    /// Request controls.
    pub controls: Vec<Control>,
}

impl CompareRequest {
    /// Create a compare request.
    pub fn new(
        dn: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            dn: dn.into(),
            attribute: attribute.into(),
            value: value.into(),
            controls: Vec::new(),
        }
    }
}

/// Delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    /// DN of the entry to remove.
    pub dn: String,
    /// Request controls.
    pub controls: Vec<Control>,
}

impl DeleteRequest {
    /// Create a delete request.
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            controls: Vec::new(),
        }
    }
}

/// Kind of change in a modify request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModificationKind {
    /// Add values.
    Add,
    /// Remove values, or the whole attribute if no values are given.
    Remove,
    /// Replace all values.
    Replace,
}

/// One change within a modify request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeModification {
    /// Kind of change.
    pub kind: ModificationKind,
    /// Attribute and values the change applies to.
    pub attribute: LdapAttribute,
}

impl AttributeModification {
    /// Create a modification.
    #[must_use]
    pub fn new(kind: ModificationKind, attribute: LdapAttribute) -> Self {
        Self { kind, attribute }
    }
}

/// Modify request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyRequest {
    /// DN of the entry to change.
    pub dn: String,
    /// Changes, applied in order.
    pub modifications: Vec<AttributeModification>,
    /// Request controls.
    pub controls: Vec<Control>,
}

impl ModifyRequest {
    /// Create a modify request.
    pub fn new(dn: impl Into<String>, modifications: Vec<AttributeModification>) -> Self {
        Self {
            dn: dn.into(),
            modifications,
            controls: Vec::new(),
        }
    }
}

/// Rename (modify DN) request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRequest {
    /// Current DN.
    pub dn: String,
    /// New DN.
    pub new_dn: String,
    /// Whether to delete the old RDN values.
    pub delete_old_rdn: bool,
    /// Request controls.
    pub controls: Vec<Control>,
}

impl RenameRequest {
    /// Create a rename request that deletes the old RDN.
    pub fn new(dn: impl Into<String>, new_dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            new_dn: new_dn.into(),
            delete_old_rdn: true,
            controls: Vec::new(),
        }
    }
}

/// Search scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchScope {
    /// Only the base entry.
    Object,
    /// Immediate children of the base entry.
    OneLevel,
    /// The base entry and all descendants.
    #[default]
    Subtree,
}

/// Alias dereferencing behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DerefAliases {
    /// Never dereference.
    #[default]
    Never,
    /// Dereference while searching below the base.
    Searching,
    /// Dereference when locating the base.
    Finding,
    /// Always dereference.
    Always,
}

/// How referrals returned by the server are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReferralBehavior {
    /// Ignore referrals.
    #[default]
    Ignore,
    /// Follow referrals.
    Follow,
    /// Report referrals as errors.
    Throw,
}

/// Ordering applied to search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortBehavior {
    /// No ordering guarantee.
    Unordered,
    /// Provider order is preserved.
    #[default]
    Ordered,
    /// Entries sorted by DN, attributes by name, values lexically.
    Sorted,
}

/// A search filter string.
///
/// Filter escaping is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchFilter(String);

impl SearchFilter {
    /// Wrap a filter string.
    pub fn new(filter: impl Into<String>) -> Self {
        Self(filter.into())
    }

    /// The filter string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self::new("(objectClass=*)")
    }
}

impl From<&str> for SearchFilter {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Search request.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    /// Base DN; `None` means use the connection default.
    pub base_dn: Option<String>,
    /// Filter.
    pub filter: SearchFilter,
    /// Attributes to return; empty means all user attributes.
    pub return_attributes: Vec<String>,
    /// Scope.
    pub scope: Option<SearchScope>,
    /// Server side time limit.
    pub time_limit: Option<Duration>,
    /// Maximum number of entries to return.
    pub size_limit: Option<u32>,
    /// Alias dereferencing.
    pub deref_aliases: Option<DerefAliases>,
    /// Referral handling.
    pub referral: Option<ReferralBehavior>,
    /// Attributes whose values are binary.
    pub binary_attributes: Option<Vec<String>>,
    /// Result ordering.
    pub sort_behavior: Option<SortBehavior>,
    /// Return attribute names only.
    pub types_only: bool,
    /// Handlers run over each returned entry.
    pub entry_handlers: Option<Vec<Arc<dyn EntryHandler>>>,
    /// Request controls.
    pub controls: Vec<Control>,
}

impl SearchRequest {
    /// Search below `base_dn` with `filter`.
    pub fn new(base_dn: impl Into<String>, filter: impl Into<SearchFilter>) -> Self {
        Self {
            base_dn: Some(base_dn.into()),
            filter: filter.into(),
            ..Self::default()
        }
    }

    /// Search with `filter` below the connection's default base DN.
    pub fn with_filter(filter: impl Into<SearchFilter>) -> Self {
        Self {
            filter: filter.into(),
            ..Self::default()
        }
    }

    /// Set the attributes to return.
    #[must_use]
    pub fn return_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.return_attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the scope.
    #[must_use]
    pub fn scope(mut self, scope: SearchScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Set the size limit.
    #[must_use]
    pub fn size_limit(mut self, limit: u32) -> Self {
        self.size_limit = Some(limit);
        self
    }

    /// Set the sort behavior.
    #[must_use]
    pub fn sort_behavior(mut self, behavior: SortBehavior) -> Self {
        self.sort_behavior = Some(behavior);
        self
    }

    /// Append an entry handler.
    #[must_use]
    pub fn entry_handler(mut self, handler: Arc<dyn EntryHandler>) -> Self {
        self.entry_handlers.get_or_insert_with(Vec::new).push(handler);
        self
    }

    /// Base DN, or the empty (root DSE) DN when unset.
    #[must_use]
    pub fn effective_base_dn(&self) -> &str {
        self.base_dn.as_deref().unwrap_or("")
    }

    /// Scope, or subtree when unset.
    #[must_use]
    pub fn effective_scope(&self) -> SearchScope {
        self.scope.unwrap_or_default()
    }

    /// Sort behavior, or ordered when unset.
    #[must_use]
    pub fn effective_sort_behavior(&self) -> SortBehavior {
        self.sort_behavior.unwrap_or_default()
    }

    /// Entry handlers, empty when unset.
    #[must_use]
    pub fn handlers(&self) -> &[Arc<dyn EntryHandler>] {
        self.entry_handlers.as_deref().unwrap_or(&[])
    }

    /// Add `control`, replacing any existing control with the same OID.
    pub fn set_control(&mut self, control: Control) {
        self.controls.retain(|c| c.oid() != control.oid());
        self.controls.push(control);
    }

    /// Fill every unset field from `defaults`.
    pub fn apply_defaults(&mut self, defaults: &RequestDefaults) {
        fill(&mut self.base_dn, &defaults.base_dn);
        fill(&mut self.scope, &defaults.scope);
        fill(&mut self.time_limit, &defaults.time_limit);
        fill(&mut self.size_limit, &defaults.size_limit);
        fill(&mut self.deref_aliases, &defaults.deref_aliases);
        fill(&mut self.referral, &defaults.referral);
        fill(&mut self.binary_attributes, &defaults.binary_attributes);
        fill(&mut self.sort_behavior, &defaults.sort_behavior);
        fill(&mut self.entry_handlers, &defaults.entry_handlers);
    }

    /// Key identifying the result set this request selects.
    #[must_use]
    pub fn cache_key(&self) -> SearchKey {
        SearchKey {
            base_dn: self.effective_base_dn().to_lowercase(),
            filter: self.filter.clone(),
            return_attributes: self.return_attributes.clone(),
            scope: self.effective_scope(),
            time_limit: self.time_limit,
            size_limit: self.size_limit,
            deref_aliases: self.deref_aliases.unwrap_or_default(),
            referral: self.referral.unwrap_or_default(),
            binary_attributes: self.binary_attributes.clone().unwrap_or_default(),
            sort_behavior: self.effective_sort_behavior(),
            types_only: self.types_only,
            entry_handlers: self.handlers().iter().cloned().map(HandlerId).collect(),
            controls: self.controls.clone(),
        }
    }
}

fn fill<T: Clone>(field: &mut Option<T>, default: &Option<T>) {
    if field.is_none() {
        field.clone_from(default);
    }
}

/// Identity of a search, used to key cached results.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchKey {
    base_dn: String,
    filter: SearchFilter,
    return_attributes: Vec<String>,
    scope: SearchScope,
    time_limit: Option<Duration>,
    size_limit: Option<u32>,
    deref_aliases: DerefAliases,
    referral: ReferralBehavior,
    binary_attributes: Vec<String>,
    sort_behavior: SortBehavior,
    types_only: bool,
    entry_handlers: Vec<HandlerId>,
    controls: Vec<Control>,
}

/// Entry handler compared by the allocation it points to.
#[derive(Debug, Clone)]
struct HandlerId(Arc<dyn EntryHandler>);

impl PartialEq for HandlerId {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for HandlerId {}

impl Hash for HandlerId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).cast::<()>().hash(state);
    }
}

/// Paged search request.
///
/// The search is issued repeatedly with a paged results control until the
/// server returns an empty cookie.
#[derive(Debug, Clone)]
pub struct PagedSearchRequest {
    /// The underlying search.
    pub search: SearchRequest,
    /// Entries per page.
    pub page_size: u32,
}

impl PagedSearchRequest {
    /// Page `search` in pages of `page_size` entries.
    #[must_use]
    pub fn new(search: SearchRequest, page_size: u32) -> Self {
        Self { search, page_size }
    }
}

/// Connection-level defaults applied to unset search request fields.
#[derive(Debug, Clone, Default)]
pub struct RequestDefaults {
    /// Default base DN.
    pub base_dn: Option<String>,
    /// Default scope.
    pub scope: Option<SearchScope>,
    /// Default time limit.
    pub time_limit: Option<Duration>,
    /// Default size limit.
    pub size_limit: Option<u32>,
    /// Default alias dereferencing.
    pub deref_aliases: Option<DerefAliases>,
    /// Default referral handling.
    pub referral: Option<ReferralBehavior>,
    /// Default binary attributes.
    pub binary_attributes: Option<Vec<String>>,
    /// Default result ordering.
    pub sort_behavior: Option<SortBehavior>,
    /// Default entry handlers.
    pub entry_handlers: Option<Vec<Arc<dyn EntryHandler>>>,
}

impl RequestDefaults {
    /// Create empty defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default base DN.
    #[must_use]
    pub fn base_dn(mut self, dn: impl Into<String>) -> Self {
        self.base_dn = Some(dn.into());
        self
    }

    /// Set the default scope.
    #[must_use]
    pub fn scope(mut self, scope: SearchScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Set the default time limit.
    #[must_use]
    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Set the default size limit.
    #[must_use]
    pub fn size_limit(mut self, limit: u32) -> Self {
        self.size_limit = Some(limit);
        self
    }

    /// Set the default alias dereferencing.
    #[must_use]
    pub fn deref_aliases(mut self, deref: DerefAliases) -> Self {
        self.deref_aliases = Some(deref);
        self
    }

    /// Set the default referral handling.
    #[must_use]
    pub fn referral(mut self, referral: ReferralBehavior) -> Self {
        self.referral = Some(referral);
        self
    }

    /// Set the default binary attributes.
    #[must_use]
    pub fn binary_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.binary_attributes = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    /// Set the default sort behavior.
    #[must_use]
    pub fn sort_behavior(mut self, behavior: SortBehavior) -> Self {
        self.sort_behavior = Some(behavior);
        self
    }

    /// Append a default entry handler.
    #[must_use]
    pub fn entry_handler(mut self, handler: Arc<dyn EntryHandler>) -> Self {
        self.entry_handlers.get_or_insert_with(Vec::new).push(handler);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::CaseChangeEntryHandler;

    #[test]
    fn test_defaults_fill_only_unset_fields() {
        let defaults = RequestDefaults::new()
            .base_dn("dc=vt,dc=edu")
            .scope(SearchScope::OneLevel)
            .size_limit(50)
            .time_limit(Duration::from_secs(5))
            .sort_behavior(SortBehavior::Sorted)
            .binary_attributes(["jpegPhoto"]);

        let mut request = SearchRequest::new("ou=people,dc=vt,dc=edu", "(uid=*)").size_limit(10);
        request.apply_defaults(&defaults);

        assert_eq!(request.base_dn.as_deref(), Some("ou=people,dc=vt,dc=edu"));
        assert_eq!(request.size_limit, Some(10));
        assert_eq!(request.scope, Some(SearchScope::OneLevel));
        assert_eq!(request.time_limit, Some(Duration::from_secs(5)));
        assert_eq!(request.effective_sort_behavior(), SortBehavior::Sorted);
        assert_eq!(request.binary_attributes, Some(vec!["jpegPhoto".to_string()]));
        assert_eq!(request.deref_aliases, None);
    }

    #[test]
    fn test_default_base_dn_used_when_unset() {
        let defaults = RequestDefaults::new().base_dn("dc=vt,dc=edu");
        let mut request = SearchRequest::with_filter("(uid=1)");
        assert_eq!(request.effective_base_dn(), "");
        request.apply_defaults(&defaults);
        assert_eq!(request.effective_base_dn(), "dc=vt,dc=edu");
    }

    #[test]
    fn test_default_handlers_do_not_replace_request_handlers() {
        let defaults = RequestDefaults::new()
            .entry_handler(Arc::new(CaseChangeEntryHandler::default()))
            .entry_handler(Arc::new(CaseChangeEntryHandler::default()));
        let mut request = SearchRequest::with_filter("(uid=1)")
            .entry_handler(Arc::new(CaseChangeEntryHandler::default()));
        request.apply_defaults(&defaults);
        assert_eq!(request.handlers().len(), 1);
    }

    #[test]
    fn test_set_control_replaces_same_oid() {
        use crate::control::PagedResultsControl;

        let mut request = SearchRequest::with_filter("(uid=1)");
        request.set_control(Control::PagedResults(PagedResultsControl::first_page(10)));
        request.set_control(Control::PagedResults(PagedResultsControl::first_page(20)));
        assert_eq!(request.controls.len(), 1);
        assert_eq!(request.controls[0].as_paged_results().map(|c| c.size), Some(20));
    }

    #[test]
    fn test_cache_key_ignores_base_dn_case() {
        let a = SearchRequest::new("DC=VT,DC=EDU", "(uid=1)");
        let b = SearchRequest::new("dc=vt,dc=edu", "(uid=1)");
        assert_eq!(a.cache_key(), b.cache_key());

        let c = SearchRequest::new("dc=vt,dc=edu", "(uid=2)");
        assert_ne!(a.cache_key(), c.cache_key());
    }

    #[test]
    fn test_cache_key_covers_result_shaping_fields() {
        let plain = SearchRequest::new("dc=vt,dc=edu", "(uid=1)");
        let handler: Arc<dyn EntryHandler> = Arc::new(CaseChangeEntryHandler::default());
        let handled = plain.clone().entry_handler(handler.clone());

        assert_ne!(plain.cache_key(), handled.cache_key());
        assert_eq!(
            handled.cache_key(),
            plain.clone().entry_handler(handler).cache_key()
        );
        assert_ne!(
            handled.cache_key(),
            plain
                .clone()
                .entry_handler(Arc::new(CaseChangeEntryHandler::default()))
                .cache_key()
        );
        assert_ne!(
            plain.cache_key(),
            plain.clone().sort_behavior(SortBehavior::Sorted).cache_key()
        );

        let mut timed = plain.clone();
        timed.time_limit = Some(Duration::from_secs(1));
        assert_ne!(plain.cache_key(), timed.cache_key());

        let mut binary = plain.clone();
        binary.binary_attributes = Some(vec!["jpegPhoto".into()]);
        assert_ne!(plain.cache_key(), binary.cache_key());

        let mut deref = plain.clone();
        deref.deref_aliases = Some(DerefAliases::Always);
        assert_ne!(plain.cache_key(), deref.cache_key());
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let request = BindRequest::simple("uid=admin", "hunter2");
        let debug = format!("{request:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<suppressed>"));
    }
}
