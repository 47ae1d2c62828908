//! Search execution.
//!
//! Entries stream from the provider through the request's entry handlers
//! into a [`SearchResult`]. A handler may transform an entry, drop it, or
//! abort the search; an aborted search returns what was collected so far.

use ldap_protocol::{
    Control, PagedResultsControl, PagedSearchRequest, Response, SearchRequest, SearchResult,
    SortBehavior,
};

use crate::config::ConnectionConfig;
use crate::connection::Connection;
use crate::error::Result;
use crate::operation::{InvokeContext, OperationKind, Request};
use crate::provider::SearchIterator;

impl Request for SearchRequest {
    type Output = SearchResult;
    const KIND: OperationKind = OperationKind::Search;

    fn initialize(&mut self, config: &ConnectionConfig) {
        self.apply_defaults(&config.request_defaults);
    }

    fn invoke(
        &self,
        connection: &Connection,
        context: &InvokeContext<'_>,
    ) -> Result<Response<SearchResult>> {
        let Some(cache) = context.cache else {
            return execute_search(connection, self);
        };

        let key = self.cache_key();
        if let Some(result) = cache.get(&key) {
            tracing::trace!(base_dn = self.effective_base_dn(), "search served from cache");
            return Ok(Response::success(result));
        }
        let response = execute_search(connection, self)?;
        cache.put(key, response.result().clone());
        Ok(response)
    }
}

impl Request for PagedSearchRequest {
    type Output = SearchResult;
    const KIND: OperationKind = OperationKind::PagedSearch;

    fn initialize(&mut self, config: &ConnectionConfig) {
        self.search.apply_defaults(&config.request_defaults);
    }

    /// Issue the search page by page until the server returns an empty
    /// cookie. A retry restarts from the first page.
    fn invoke(
        &self,
        connection: &Connection,
        context: &InvokeContext<'_>,
    ) -> Result<Response<SearchResult>> {
        let key = context.cache.map(|_| self.search.cache_key());
        if let (Some(cache), Some(key)) = (context.cache, &key) {
            if let Some(result) = cache.get(key) {
                return Ok(Response::success(result));
            }
        }

        let mut search = self.search.clone();
        let mut merged = SearchResult::new();
        let mut page = PagedResultsControl::first_page(self.page_size);
        let mut pages = 0u32;
        let last = loop {
            search.set_control(Control::PagedResults(page));
            let response = execute_search(connection, &search)?;
            pages += 1;
            let cookie = response
                .paged_results()
                .filter(|c| c.has_more())
                .map(|c| c.cookie.clone());
            let last = response.map(|result| merged.merge(result));
            match cookie {
                Some(cookie) => page = PagedResultsControl::next_page(self.page_size, cookie),
                None => break last,
            }
        };

        if self.search.effective_sort_behavior() == SortBehavior::Sorted {
            merged.sort();
        }
        tracing::debug!(pages, entries = merged.len(), "paged search complete");

        if let (Some(cache), Some(key)) = (context.cache, key) {
            cache.put(key, merged.clone());
        }
        Ok(last.map(|()| merged))
    }
}

/// Run one search request to completion on `connection`.
pub(crate) fn execute_search(
    connection: &Connection,
    request: &SearchRequest,
) -> Result<Response<SearchResult>> {
    let mut result = SearchResult::new();
    let mut aborted = false;

    let response = connection.with_provider(|provider| {
        let mut iter = provider.search(request)?;
        let response = match collect_entries(&mut *iter, request, &mut result) {
            // an aborted search has no terminal response
            Ok(true) => {
                aborted = true;
                Ok(Response::success(()))
            }
            Ok(false) => iter.response(),
            Err(e) => Err(e),
        };
        iter.close();
        response
    })?;

    if aborted {
        tracing::debug!(
            base_dn = request.effective_base_dn(),
            entries = result.len(),
            "search aborted by entry handler"
        );
    }
    if request.effective_sort_behavior() == SortBehavior::Sorted {
        result.sort();
    }
    Ok(response.map(|()| result))
}

/// Drain `iter` through the request's handlers into `result`.
///
/// Returns `true` when a handler aborted the search.
fn collect_entries(
    iter: &mut (impl SearchIterator + ?Sized),
    request: &SearchRequest,
    result: &mut SearchResult,
) -> Result<bool> {
    let handlers = request.handlers();
    while let Some(entry) = iter.next_entry()? {
        let mut current = Some(entry);
        for handler in handlers {
            let Some(entry) = current.take() else {
                break;
            };
            let outcome = handler.process(request, entry)?;
            current = outcome.entry;
            if outcome.abort {
                result.extend(current.take());
                return Ok(true);
            }
        }
        result.extend(current);
    }
    Ok(false)
}
