//! Search entry handlers.
//!
//! Handlers run over every entry a search returns, in configuration order.
//! Each handler sees the output of the previous one and may rewrite the
//! entry, drop it from the result, or abort the remainder of the search.

use std::fmt;

use crate::entry::LdapEntry;
use crate::error::LdapError;
use crate::request::SearchRequest;

/// Outcome of running one handler over one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResult {
    /// The entry to keep, or `None` to drop it from the result.
    pub entry: Option<LdapEntry>,
    /// Whether to stop reading further entries.
    pub abort: bool,
}

impl HandlerResult {
    /// Keep the entry and continue.
    #[must_use]
    pub fn keep(entry: LdapEntry) -> Self {
        Self {
            entry: Some(entry),
            abort: false,
        }
    }

    /// Drop the entry and continue.
    #[must_use]
    pub fn skip() -> Self {
        Self {
            entry: None,
            abort: false,
        }
    }

    /// Keep the entry, then stop the search.
    #[must_use]
    pub fn abort(entry: Option<LdapEntry>) -> Self {
        Self { entry, abort: true }
    }
}

/// Processes search entries as they are read from the provider.
pub trait EntryHandler: Send + Sync + fmt::Debug {
    /// Process a single entry.
    fn process(&self, request: &SearchRequest, entry: LdapEntry)
    -> Result<HandlerResult, LdapError>;
}

/// Case conversion applied by [`CaseChangeEntryHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseChange {
    /// Leave as returned.
    #[default]
    None,
    /// Convert to lower case.
    Lower,
    /// Convert to upper case.
    Upper,
}

impl CaseChange {
    fn apply(self, s: &mut String) {
        match self {
            Self::None => {}
            Self::Lower => *s = s.to_lowercase(),
            Self::Upper => *s = s.to_uppercase(),
        }
    }
}

/// Changes the case of DNs, attribute names and attribute values.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseChangeEntryHandler {
    /// Conversion applied to the entry DN.
    pub dn: CaseChange,
    /// Conversion applied to attribute names.
    pub attribute_names: CaseChange,
    /// Conversion applied to attribute values.
    pub attribute_values: CaseChange,
}

impl CaseChangeEntryHandler {
    /// Handler applying the same conversion everywhere.
    #[must_use]
    pub fn all(change: CaseChange) -> Self {
        Self {
            dn: change,
            attribute_names: change,
            attribute_values: change,
        }
    }
}

impl EntryHandler for CaseChangeEntryHandler {
    fn process(
        &self,
        _request: &SearchRequest,
        mut entry: LdapEntry,
    ) -> Result<HandlerResult, LdapError> {
        self.dn.apply(&mut entry.dn);
        for attribute in &mut entry.attributes {
            self.attribute_names.apply(&mut attribute.name);
            for value in &mut attribute.values {
                self.attribute_values.apply(value);
            }
        }
        Ok(HandlerResult::keep(entry))
    }
}
