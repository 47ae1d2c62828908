//! In-memory directory tree.

use std::collections::BTreeMap;
use std::sync::Arc;

use ldap_protocol::{
    AddRequest, AttributeModification, LdapAttribute, LdapEntry, LdapError, ModificationKind,
    RenameRequest, ResultCode, SearchRequest, SearchScope,
};
use parking_lot::RwLock;

/// A shared, in-memory set of entries.
///
/// Clones share the same entries. DNs are matched case-insensitively. The
/// root DSE (empty DN, `objectClass: top`) always exists and is only
/// returned by base-scope searches.
#[derive(Debug, Clone, Default)]
pub struct MockDirectory {
    entries: Arc<RwLock<BTreeMap<String, LdapEntry>>>,
}

/// Base DN of the entries created by [`MockDirectory::people`].
pub const PEOPLE_DN: &str = "ou=people,dc=vt,dc=edu";

fn key(dn: &str) -> String {
    dn.trim().to_lowercase()
}

fn parent(dn: &str) -> &str {
    dn.split_once(',').map_or("", |(_, parent)| parent)
}

impl MockDirectory {
    /// An empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory holding `entries`.
    #[must_use]
    pub fn with_entries(entries: impl IntoIterator<Item = LdapEntry>) -> Self {
        let directory = Self::new();
        {
            let mut map = directory.entries.write();
            for entry in entries {
                map.insert(key(&entry.dn), entry);
            }
        }
        directory
    }

    /// The `ou=people,dc=vt,dc=edu` container holding `count` people with
    /// `uid` values `0..count`.
    #[must_use]
    pub fn people(count: usize) -> Self {
        let container = LdapEntry::new(PEOPLE_DN)
            .with_attribute(LdapAttribute::new("objectClass", ["top", "organizationalUnit"]))
            .with_attribute(LdapAttribute::new("ou", ["people"]));
        Self::with_entries(std::iter::once(container).chain((0..count).map(|i| {
            LdapEntry::new(format!("uid={i},{PEOPLE_DN}"))
                .with_attribute(LdapAttribute::new("objectClass", ["top", "person"]))
                .with_attribute(LdapAttribute::new("uid", [i.to_string()]))
                .with_attribute(LdapAttribute::new("cn", [format!("Person {i}")]))
        })))
    }

    /// Number of entries, excluding the root DSE.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the directory has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// The entry at `dn`.
    #[must_use]
    pub fn get(&self, dn: &str) -> Option<LdapEntry> {
        if dn.trim().is_empty() {
            return Some(root_dse());
        }
        self.entries.read().get(&key(dn)).cloned()
    }

    pub(crate) fn add(&self, request: &AddRequest) -> Result<(), LdapError> {
        let mut entries = self.entries.write();
        let k = key(&request.dn);
        if entries.contains_key(&k) {
            return Err(LdapError::from_result_code(
                ResultCode::EntryAlreadyExists,
                format!("entry already exists: {}", request.dn),
            ));
        }
        let mut entry = LdapEntry::new(request.dn.clone());
        entry.attributes = request.attributes.clone();
        entries.insert(k, entry);
        Ok(())
    }

    pub(crate) fn delete(&self, dn: &str) -> Result<(), LdapError> {
        self.entries
            .write()
            .remove(&key(dn))
            .map(|_| ())
            .ok_or_else(|| no_such_object(dn))
    }

    pub(crate) fn modify(
        &self,
        dn: &str,
        modifications: &[AttributeModification],
    ) -> Result<(), LdapError> {
        let mut entries = self.entries.write();
        let entry = entries.get_mut(&key(dn)).ok_or_else(|| no_such_object(dn))?;
        for modification in modifications {
            let name = &modification.attribute.name;
            let position = entry
                .attributes
                .iter()
                .position(|a| a.name.eq_ignore_ascii_case(name));
            match modification.kind {
                ModificationKind::Add => match position {
                    Some(i) => entry.attributes[i]
                        .values
                        .extend(modification.attribute.values.iter().cloned()),
                    None => entry.attributes.push(modification.attribute.clone()),
                },
                ModificationKind::Replace => {
                    if let Some(i) = position {
                        entry.attributes.remove(i);
                    }
                    if !modification.attribute.values.is_empty() {
                        entry.attributes.push(modification.attribute.clone());
                    }
                }
                ModificationKind::Remove => {
                    let Some(i) = position else {
                        return Err(LdapError::from_result_code(
                            ResultCode::NoSuchAttribute,
                            format!("no such attribute: {name}"),
                        ));
                    };
                    let removed = &modification.attribute.values;
                    if removed.is_empty() {
                        entry.attributes.remove(i);
                    } else {
                        entry.attributes[i].values.retain(|v| !removed.contains(v));
                        if entry.attributes[i].values.is_empty() {
                            entry.attributes.remove(i);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub(crate) fn rename(&self, request: &RenameRequest) -> Result<(), LdapError> {
        let mut entries = self.entries.write();
        let new_key = key(&request.new_dn);
        if entries.contains_key(&new_key) {
            return Err(LdapError::from_result_code(
                ResultCode::EntryAlreadyExists,
                format!("entry already exists: {}", request.new_dn),
            ));
        }
        let mut entry = entries
            .remove(&key(&request.dn))
            .ok_or_else(|| no_such_object(&request.dn))?;
        entry.dn.clone_from(&request.new_dn);
        entries.insert(new_key, entry);
        Ok(())
    }

    pub(crate) fn compare(&self, dn: &str, attribute: &str, value: &str) -> Result<bool, LdapError> {
        let entry = self.get(dn).ok_or_else(|| no_such_object(dn))?;
        let attribute = entry.attribute(attribute).ok_or_else(|| {
            LdapError::from_result_code(
                ResultCode::NoSuchAttribute,
                format!("no such attribute: {attribute}"),
            )
        })?;
        Ok(attribute.values.iter().any(|v| v.eq_ignore_ascii_case(value)))
    }

    /// Entries selected by `request`'s base, scope and filter, in DN order.
    pub(crate) fn search(&self, request: &SearchRequest) -> Result<Vec<LdapEntry>, LdapError> {
        let filter = Filter::parse(request.filter.as_str())?;
        let base = key(request.effective_base_dn());
        let scope = request.effective_scope();

        if scope == SearchScope::Object {
            return Ok(self
                .get(&base)
                .filter(|entry| filter.matches(entry))
                .into_iter()
                .collect());
        }

        let entries = self.entries.read();
        if !base.is_empty() && !entries.contains_key(&base) {
            return Err(no_such_object(&base));
        }
        Ok(entries
            .iter()
            .filter(|(dn, _)| match scope {
                SearchScope::OneLevel => parent(dn) == base,
                _ => {
                    base.is_empty() || *dn == &base || dn.ends_with(&format!(",{base}"))
                }
            })
            .map(|(_, entry)| entry)
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect())
    }
}

fn root_dse() -> LdapEntry {
    LdapEntry::new("").with_attribute(LdapAttribute::new("objectClass", ["top"]))
}

fn no_such_object(dn: &str) -> LdapError {
    LdapError::from_result_code(ResultCode::NoSuchObject, format!("no such object: {dn}"))
}

/// The single-component filters the mock understands: presence
/// `(attr=*)` and equality `(attr=value)`.
enum Filter {
    Present(String),
    Equal(String, String),
}

impl Filter {
    fn parse(filter: &str) -> Result<Self, LdapError> {
        let inner = filter
            .trim()
            .strip_prefix('(')
            .and_then(|f| f.strip_suffix(')'))
            .filter(|f| !f.starts_with(['&', '|', '!']))
            .and_then(|f| f.split_once('='))
            .ok_or_else(|| {
                LdapError::from_result_code(
                    ResultCode::UnwillingToPerform,
                    format!("unsupported filter: {filter}"),
                )
            })?;
        Ok(match inner {
            (attribute, "*") => Self::Present(attribute.to_string()),
            (attribute, value) => Self::Equal(attribute.to_string(), value.to_string()),
        })
    }

    fn matches(&self, entry: &LdapEntry) -> bool {
        match self {
            Self::Present(attribute) => {
                attribute.eq_ignore_ascii_case("objectClass") || entry.attribute(attribute).is_some()
            }
            Self::Equal(attribute, value) => entry
                .attribute(attribute)
                .is_some_and(|a| a.values.iter().any(|v| v.eq_ignore_ascii_case(value))),
        }
    }
}
