//! Generic operation response.

use crate::control::{Control, PagedResultsControl};
use crate::result_code::ResultCode;

/// Response to an operation: a typed result plus result code and controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response<T> {
    result: T,
    result_code: ResultCode,
    message: Option<String>,
    controls: Vec<Control>,
}

impl<T> Response<T> {
    /// Create a response with no diagnostic message and no controls.
    pub fn new(result: T, result_code: ResultCode) -> Self {
        Self {
            result,
            result_code,
            message: None,
            controls: Vec::new(),
        }
    }

    /// Successful response wrapping `result`.
    pub fn success(result: T) -> Self {
        Self::new(result, ResultCode::Success)
    }

    /// Attach a diagnostic message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach response controls.
    #[must_use]
    pub fn with_controls(mut self, controls: Vec<Control>) -> Self {
        self.controls = controls;
        self
    }

    /// The typed result.
    #[must_use]
    pub fn result(&self) -> &T {
        &self.result
    }

    /// Consume the response, returning the typed result.
    #[must_use]
    pub fn into_result(self) -> T {
        self.result
    }

    /// Result code reported by the server.
    #[must_use]
    pub fn result_code(&self) -> ResultCode {
        self.result_code
    }

    /// Diagnostic message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Response controls.
    #[must_use]
    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// Paged results control in this response, if present.
    #[must_use]
    pub fn paged_results(&self) -> Option<&PagedResultsControl> {
        self.controls.iter().find_map(Control::as_paged_results)
    }

    /// Replace the result, keeping code, message and controls.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            result: f(self.result),
            result_code: self.result_code,
            message: self.message,
            controls: self.controls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_map_keeps_metadata() {
        let response = Response::new(3u32, ResultCode::SizeLimitExceeded)
            .with_message("limit")
            .with_controls(vec![Control::new("1.2.3", false)]);
        let mapped = response.map(|n| n * 2);
        assert_eq!(*mapped.result(), 6);
        assert_eq!(mapped.result_code(), ResultCode::SizeLimitExceeded);
        assert_eq!(mapped.message(), Some("limit"));
        assert_eq!(mapped.controls().len(), 1);
    }

    #[test]
    fn test_paged_results_lookup() {
        let response = Response::success(()).with_controls(vec![
            Control::new("1.2.3", false),
            Control::PagedResults(PagedResultsControl::next_page(0, Bytes::from_static(b"c"))),
        ]);
        assert!(response.paged_results().is_some_and(|c| c.has_more()));
    }
}
