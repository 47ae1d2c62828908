//! Provider backed by a [`MockDirectory`], with fault injection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use bytes::Bytes;
use ldap_client::{ConnectionConfig, Provider, ProviderConnection, SearchIterator};
use ldap_protocol::{
    AddRequest, BindRequest, CompareRequest, Control, DeleteRequest, LdapEntry, LdapError,
    ModifyRequest, PagedResultsControl, RenameRequest, Response, ResultCode, SearchRequest,
};
use parking_lot::Mutex;

use crate::directory::MockDirectory;

type Result<T> = std::result::Result<T, LdapError>;

#[derive(Debug, Default)]
struct MockState {
    connects: AtomicU32,
    failed_connects: AtomicU32,
    closes: AtomicU32,
    invocations: AtomicU32,
    searches: AtomicU32,

    connect_failures: AtomicU32,
    operation_failures: AtomicU32,
    permanent_failure: AtomicBool,
    last_bind_dn: Mutex<Option<String>>,
}

/// Take one unit from a failure budget; `u32::MAX` never runs out.
fn take(budget: &AtomicU32) -> bool {
    budget
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| match n {
            0 => None,
            u32::MAX => Some(u32::MAX),
            n => Some(n - 1),
        })
        .is_ok()
}

/// A [`Provider`] serving a [`MockDirectory`].
///
/// Clones share the directory, counters and fault settings, so a test can
/// keep one handle while a factory or pool owns another.
///
/// # Example
///
/// ```rust,ignore
/// let provider = MockProvider::new(MockDirectory::people(10));
/// provider.fail_operations(2);
/// let factory = DefaultConnectionFactory::new(config, Arc::new(provider.clone()))?;
/// // ... the next two operations fail with a retryable error
/// assert_eq!(provider.invocations(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    directory: MockDirectory,
    state: Arc<MockState>,
}

impl MockProvider {
    /// A provider serving `directory`.
    #[must_use]
    pub fn new(directory: MockDirectory) -> Self {
        Self {
            directory,
            state: Arc::default(),
        }
    }

    /// The directory served.
    #[must_use]
    pub fn directory(&self) -> &MockDirectory {
        &self.directory
    }

    /// Fail the next `n` connects; `u32::MAX` fails every connect.
    pub fn fail_connects(&self, n: u32) {
        self.state.connect_failures.store(n, Ordering::SeqCst);
    }

    /// Fail the next `n` operations with a retryable error; `u32::MAX`
    /// fails every operation.
    pub fn fail_operations(&self, n: u32) {
        self.state.operation_failures.store(n, Ordering::SeqCst);
    }

    /// Fail every operation with a non-retryable error.
    pub fn set_permanent_failure(&self, enabled: bool) {
        self.state.permanent_failure.store(enabled, Ordering::SeqCst);
    }

    /// Successful connects.
    #[must_use]
    pub fn connects(&self) -> u32 {
        self.state.connects.load(Ordering::SeqCst)
    }

    /// Rejected connects.
    #[must_use]
    pub fn failed_connects(&self) -> u32 {
        self.state.failed_connects.load(Ordering::SeqCst)
    }

    /// Provider sessions closed.
    #[must_use]
    pub fn closes(&self) -> u32 {
        self.state.closes.load(Ordering::SeqCst)
    }

    /// Sessions currently open.
    #[must_use]
    pub fn open_sessions(&self) -> u32 {
        self.connects().saturating_sub(self.closes())
    }

    /// Operations invoked on any session, including failed ones.
    #[must_use]
    pub fn invocations(&self) -> u32 {
        self.state.invocations.load(Ordering::SeqCst)
    }

    /// Search requests issued, one per page for paged searches.
    #[must_use]
    pub fn searches(&self) -> u32 {
        self.state.searches.load(Ordering::SeqCst)
    }

    /// DN of the most recent bind, `None` for anonymous.
    #[must_use]
    pub fn last_bind_dn(&self) -> Option<String> {
        self.state.last_bind_dn.lock().clone()
    }
}

impl Provider for MockProvider {
    fn connect(
        &self,
        config: &ConnectionConfig,
        bind: &BindRequest,
    ) -> Result<Box<dyn ProviderConnection>> {
        if take(&self.state.connect_failures) {
            self.state.failed_connects.fetch_add(1, Ordering::SeqCst);
            return Err(LdapError::operation(
                format!("connection refused: {}", config.ldap_url),
                Some(ResultCode::ConnectError),
            ));
        }
        let connection_id = self.state.connects.fetch_add(1, Ordering::SeqCst) + 1;
        *self.state.last_bind_dn.lock() = bind.dn.clone();
        tracing::trace!(connection_id, bind_dn = ?bind.dn, "mock session opened");
        Ok(Box::new(MockConnection {
            directory: self.directory.clone(),
            state: Arc::clone(&self.state),
            closed: false,
        }))
    }
}

struct MockConnection {
    directory: MockDirectory,
    state: Arc<MockState>,
    closed: bool,
}

impl MockConnection {
    fn invoke(&self) -> Result<()> {
        self.state.invocations.fetch_add(1, Ordering::SeqCst);
        if self.closed {
            return Err(LdapError::operation(
                "session closed",
                Some(ResultCode::ServerDown),
            ));
        }
        if self.state.permanent_failure.load(Ordering::SeqCst) {
            return Err(LdapError::from_result_code(
                ResultCode::UnwillingToPerform,
                "server is unwilling to perform",
            ));
        }
        if take(&self.state.operation_failures) {
            return Err(LdapError::from_result_code(ResultCode::Busy, "server busy"));
        }
        Ok(())
    }
}

impl ProviderConnection for MockConnection {
    fn bind(&mut self, request: &BindRequest) -> Result<Response<()>> {
        self.invoke()?;
        *self.state.last_bind_dn.lock() = request.dn.clone();
        Ok(Response::success(()))
    }

    fn add(&mut self, request: &AddRequest) -> Result<Response<()>> {
        self.invoke()?;
        self.directory.add(request).map(Response::success)
    }

    fn compare(&mut self, request: &CompareRequest) -> Result<Response<bool>> {
        self.invoke()?;
        let matched = self
            .directory
            .compare(&request.dn, &request.attribute, &request.value)?;
        let code = if matched {
            ResultCode::CompareTrue
        } else {
            ResultCode::CompareFalse
        };
        Ok(Response::new(matched, code))
    }

    fn delete(&mut self, request: &DeleteRequest) -> Result<Response<()>> {
        self.invoke()?;
        self.directory.delete(&request.dn).map(Response::success)
    }

    fn modify(&mut self, request: &ModifyRequest) -> Result<Response<()>> {
        self.invoke()?;
        self.directory
            .modify(&request.dn, &request.modifications)
            .map(Response::success)
    }

    fn rename(&mut self, request: &RenameRequest) -> Result<Response<()>> {
        self.invoke()?;
        self.directory.rename(request).map(Response::success)
    }

    fn search<'a>(&'a mut self, request: &SearchRequest) -> Result<Box<dyn SearchIterator + 'a>> {
        self.invoke()?;
        self.state.searches.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.directory.search(request)?;

        let mut result_code = ResultCode::Success;
        let limit = request.size_limit.filter(|&n| n > 0).map(|n| n as usize);
        let paging = request
            .controls
            .iter()
            .find_map(Control::as_paged_results)
            .cloned();

        let mut controls = Vec::new();
        if let Some(page) = paging {
            let start = if page.cookie.is_empty() {
                0
            } else {
                std::str::from_utf8(&page.cookie)
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .ok_or_else(|| {
                        LdapError::from_result_code(ResultCode::ProtocolError, "invalid cookie")
                    })?
            };
            let size = (page.size as usize).max(1);
            let end = (start + size).min(entries.len());
            let cookie = if end < entries.len() {
                Bytes::from(end.to_string())
            } else {
                Bytes::new()
            };
            entries = entries.get(start..end).map(<[_]>::to_vec).unwrap_or_default();
            controls.push(Control::PagedResults(PagedResultsControl::next_page(0, cookie)));
        }
        if let Some(limit) = limit {
            if entries.len() > limit {
                entries.truncate(limit);
                result_code = ResultCode::SizeLimitExceeded;
            }
        }

        Ok(Box::new(MockSearch {
            entries: entries.into_iter(),
            response: Some(Response::new((), result_code).with_controls(controls)),
        }))
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.state.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

struct MockSearch {
    entries: std::vec::IntoIter<LdapEntry>,
    response: Option<Response<()>>,
}

impl SearchIterator for MockSearch {
    fn next_entry(&mut self) -> Result<Option<LdapEntry>> {
        Ok(self.entries.next())
    }

    fn response(&mut self) -> Result<Response<()>> {
        self.response
            .take()
            .ok_or_else(|| LdapError::ldap("search response already taken", None))
    }

    fn close(&mut self) {
        self.entries = Vec::new().into_iter();
    }
}
