//! Request and response controls.

use bytes::Bytes;

/// A protocol control attached to a request or response.
///
/// Controls the client understands are decoded into typed variants; all
/// others are carried through as opaque values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Control {
    /// Simple paged results (RFC 2696).
    PagedResults(PagedResultsControl),
    /// Server side sort request (RFC 2891).
    SortRequest {
        /// Sort keys in priority order.
        keys: Vec<SortKey>,
        /// Whether the server must honor the control.
        critical: bool,
    },
    /// Any control not modelled above.
    Opaque {
        /// Control OID.
        oid: String,
        /// Whether the server must honor the control.
        critical: bool,
        /// Encoded control value.
        value: Option<Bytes>,
    },
}

impl Control {
    /// OID of the simple paged results control.
    pub const PAGED_RESULTS_OID: &'static str = "1.2.840.113556.1.4.319";
    /// OID of the server side sort request control.
    pub const SORT_REQUEST_OID: &'static str = "1.2.840.113556.1.4.473";

    /// Create an opaque control with no value.
    pub fn new(oid: impl Into<String>, critical: bool) -> Self {
        Self::Opaque {
            oid: oid.into(),
            critical,
            value: None,
        }
    }

    /// OID identifying this control.
    #[must_use]
    pub fn oid(&self) -> &str {
        match self {
            Self::PagedResults(_) => Self::PAGED_RESULTS_OID,
            Self::SortRequest { .. } => Self::SORT_REQUEST_OID,
            Self::Opaque { oid, .. } => oid,
        }
    }

    /// Whether the server must honor this control.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        match self {
            Self::PagedResults(c) => c.critical,
            Self::SortRequest { critical, .. } | Self::Opaque { critical, .. } => *critical,
        }
    }

    /// Paged results payload, if this is a paged results control.
    #[must_use]
    pub fn as_paged_results(&self) -> Option<&PagedResultsControl> {
        match self {
            Self::PagedResults(c) => Some(c),
            _ => None,
        }
    }
}

/// Paged results control payload.
///
/// On a request, `size` is the page size and `cookie` is the value returned
/// by the previous page (empty for the first page). On a response, an empty
/// cookie means there are no further pages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PagedResultsControl {
    /// Page size requested, or the server's estimate of the total on response.
    pub size: u32,
    /// Opaque server cookie.
    pub cookie: Bytes,
    /// Whether the server must honor the control.
    pub critical: bool,
}

impl PagedResultsControl {
    /// Control requesting the first page of the given size.
    #[must_use]
    pub fn first_page(size: u32) -> Self {
        Self {
            size,
            cookie: Bytes::new(),
            critical: false,
        }
    }

    /// Control requesting the page identified by `cookie`.
    #[must_use]
    pub fn next_page(size: u32, cookie: Bytes) -> Self {
        Self {
            size,
            cookie,
            critical: false,
        }
    }

    /// Whether the server indicated that more pages follow.
    #[must_use]
    pub fn has_more(&self) -> bool {
        !self.cookie.is_empty()
    }
}

/// A single server side sort key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortKey {
    /// Attribute to sort on.
    pub attribute: String,
    /// Optional ordering rule OID.
    pub matching_rule: Option<String>,
    /// Whether to sort in descending order.
    pub reverse: bool,
}

impl SortKey {
    /// Ascending sort on `attribute`.
    pub fn ascending(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            matching_rule: None,
            reverse: false,
        }
    }
}
