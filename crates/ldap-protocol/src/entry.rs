//! Minimal entry model returned by searches.

use std::collections::BTreeMap;

/// A named, multi-valued attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LdapAttribute {
    /// Attribute description.
    pub name: String,
    /// Attribute values.
    pub values: Vec<String>,
}

impl LdapAttribute {
    /// Create an attribute with the given values.
    pub fn new<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// First value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// A directory entry: a DN plus its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LdapEntry {
    /// Distinguished name.
    pub dn: String,
    /// Attributes in the order the provider returned them.
    pub attributes: Vec<LdapAttribute>,
}

impl LdapEntry {
    /// Create an entry with no attributes.
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: Vec::new(),
        }
    }

    /// Add an attribute, returning the entry.
    #[must_use]
    pub fn with_attribute(mut self, attribute: LdapAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Look up an attribute by name, case-insensitively.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&LdapAttribute> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }
}

/// The merged entries of one logical search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    entries: Vec<LdapEntry>,
}

impl SearchResult {
    /// Create an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, entry: LdapEntry) {
        self.entries.push(entry);
    }

    /// Append all entries of another result, keeping their order.
    pub fn merge(&mut self, other: SearchResult) {
        self.entries.extend(other.entries);
    }

    /// Entries in this result.
    #[must_use]
    pub fn entries(&self) -> &[LdapEntry] {
        &self.entries
    }

    /// Consume the result, returning its entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<LdapEntry> {
        self.entries
    }

    /// Look up an entry by DN, case-insensitively.
    #[must_use]
    pub fn entry(&self, dn: &str) -> Option<&LdapEntry> {
        self.entries.iter().find(|e| e.dn.eq_ignore_ascii_case(dn))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the result holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sort entries by DN, and each entry's attributes by name and values.
    pub fn sort(&mut self) {
        for entry in &mut self.entries {
            entry
                .attributes
                .sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            for attribute in &mut entry.attributes {
                attribute.values.sort();
            }
        }
        self.entries
            .sort_by(|a, b| a.dn.to_lowercase().cmp(&b.dn.to_lowercase()));
    }

    /// Entries keyed by lower-cased DN.
    #[must_use]
    pub fn by_dn(&self) -> BTreeMap<String, &LdapEntry> {
        self.entries
            .iter()
            .map(|e| (e.dn.to_lowercase(), e))
            .collect()
    }
}

impl FromIterator<LdapEntry> for SearchResult {
    fn from_iter<T: IntoIterator<Item = LdapEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<LdapEntry> for SearchResult {
    fn extend<T: IntoIterator<Item = LdapEntry>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}
