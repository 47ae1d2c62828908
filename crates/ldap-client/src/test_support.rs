//! In-crate stub provider for unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use bytes::Bytes;
use ldap_protocol::{
    AddRequest, BindRequest, CompareRequest, Control, DeleteRequest, LdapEntry, LdapError,
    ModifyRequest, PagedResultsControl, RenameRequest, Response, ResultCode, SearchRequest,
};
use parking_lot::Mutex;

use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::provider::{Provider, ProviderConnection, SearchIterator};

#[derive(Debug, Default)]
struct Counters {
    connects: AtomicU32,
    closes: AtomicU32,
    invocations: AtomicU32,
    iterator_closes: AtomicU32,
    transient_failures: AtomicU32,
    last_bind_dn: Mutex<Option<String>>,
}

#[derive(Debug, Default)]
pub(crate) struct StubProvider {
    counters: Arc<Counters>,
    fail_connect: AtomicBool,
    fail_close: bool,
    fatal: bool,
    entries: Vec<LdapEntry>,
}

impl StubProvider {
    pub(crate) fn failing_connect(self) -> Self {
        self.fail_connect.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Fail the next `n` operations with a transient error.
    pub(crate) fn transient_failures(self, n: u32) -> Self {
        self.counters.transient_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Fail every operation with a non-retryable error.
    pub(crate) fn fatal(mut self) -> Self {
        self.fatal = true;
        self
    }

    pub(crate) fn with_entries(mut self, entries: Vec<LdapEntry>) -> Self {
        self.entries = entries;
        self
    }

    pub(crate) fn connects(&self) -> u32 {
        self.counters.connects.load(Ordering::SeqCst)
    }

    pub(crate) fn closes(&self) -> u32 {
        self.counters.closes.load(Ordering::SeqCst)
    }

    pub(crate) fn invocations(&self) -> u32 {
        self.counters.invocations.load(Ordering::SeqCst)
    }

    pub(crate) fn iterator_closes(&self) -> u32 {
        self.counters.iterator_closes.load(Ordering::SeqCst)
    }

    pub(crate) fn last_bind_dn(&self) -> Option<String> {
        self.counters.last_bind_dn.lock().clone()
    }
}

impl Provider for StubProvider {
    fn connect(
        &self,
        _config: &ConnectionConfig,
        bind: &BindRequest,
    ) -> Result<Box<dyn ProviderConnection>> {
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(LdapError::operation(
                "connection refused",
                Some(ResultCode::ConnectError),
            ));
        }
        self.counters.connects.fetch_add(1, Ordering::SeqCst);
        *self.counters.last_bind_dn.lock() = bind.dn.clone();
        Ok(Box::new(StubConnection {
            counters: self.counters.clone(),
            fail_close: self.fail_close,
            fatal: self.fatal,
            entries: self.entries.clone(),
        }))
    }
}

struct StubConnection {
    counters: Arc<Counters>,
    fail_close: bool,
    fatal: bool,
    entries: Vec<LdapEntry>,
}

impl StubConnection {
    fn invoke(&self) -> Result<()> {
        self.counters.invocations.fetch_add(1, Ordering::SeqCst);
        if self.fatal {
            return Err(LdapError::ldap("no such object", Some(ResultCode::NoSuchObject)));
        }
        let remaining = self.counters.transient_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.counters
                .transient_failures
                .store(remaining - 1, Ordering::SeqCst);
            return Err(LdapError::operation("server busy", Some(ResultCode::Busy)));
        }
        Ok(())
    }
}

impl ProviderConnection for StubConnection {
    fn bind(&mut self, request: &BindRequest) -> Result<Response<()>> {
        self.invoke()?;
        *self.counters.last_bind_dn.lock() = request.dn.clone();
        Ok(Response::success(()))
    }

    fn add(&mut self, _request: &AddRequest) -> Result<Response<()>> {
        self.invoke().map(Response::success)
    }

    fn compare(&mut self, request: &CompareRequest) -> Result<Response<bool>> {
        self.invoke()?;
        let matched = request.value == "top";
        let code = if matched {
            ResultCode::CompareTrue
        } else {
            ResultCode::CompareFalse
        };
        Ok(Response::new(matched, code))
    }

    fn delete(&mut self, _request: &DeleteRequest) -> Result<Response<()>> {
        self.invoke().map(Response::success)
    }

    fn modify(&mut self, _request: &ModifyRequest) -> Result<Response<()>> {
        self.invoke().map(Response::success)
    }

    fn rename(&mut self, _request: &RenameRequest) -> Result<Response<()>> {
        self.invoke().map(Response::success)
    }

    fn search<'a>(&'a mut self, request: &SearchRequest) -> Result<Box<dyn SearchIterator + 'a>> {
        self.invoke()?;
        let paging = request
            .controls
            .iter()
            .find_map(Control::as_paged_results)
            .cloned();
        let (start, end, cookie) = match &paging {
            Some(page) => {
                let start = if page.cookie.is_empty() {
                    0
                } else {
                    String::from_utf8_lossy(&page.cookie)
                        .parse::<usize>()
                        .unwrap_or(0)
                };
                let end = (start + page.size as usize).min(self.entries.len());
                let cookie = if end < self.entries.len() {
                    Bytes::from(end.to_string())
                } else {
                    Bytes::new()
                };
                (start, end, Some(cookie))
            }
            None => (0, self.entries.len(), None),
        };
        Ok(Box::new(StubIterator {
            counters: self.counters.clone(),
            entries: self.entries[start..end].to_vec().into_iter(),
            cookie,
        }))
    }

    fn close(&mut self) -> Result<()> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(LdapError::ldap("socket already closed", None));
        }
        Ok(())
    }
}

struct StubIterator {
    counters: Arc<Counters>,
    entries: std::vec::IntoIter<LdapEntry>,
    cookie: Option<Bytes>,
}

impl SearchIterator for StubIterator {
    fn next_entry(&mut self) -> Result<Option<LdapEntry>> {
        Ok(self.entries.next())
    }

    fn response(&mut self) -> Result<Response<()>> {
        let controls = self
            .cookie
            .clone()
            .map(|cookie| vec![Control::PagedResults(PagedResultsControl::next_page(0, cookie))])
            .unwrap_or_default();
        Ok(Response::success(()).with_controls(controls))
    }

    fn close(&mut self) {
        self.counters.iterator_closes.fetch_add(1, Ordering::SeqCst);
    }
}
