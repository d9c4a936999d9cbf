//! Page decorator.
//!
//! [`RecordedPage`] is a transparent stand-in for any
//! [`PageApi`](crate::driver::PageApi) implementation: every call is
//! forwarded to the original with unmodified arguments, and the original
//! outcome, value or failure, is delivered unchanged. Around the
//! forwarding, the decorator emits an `action_start`/`action_end` pair
//! correlated by action id.
//!
//! Start emission happens in the synchronous prologue, before the wrapped
//! operation is polled, so action ids reflect call-initiation order even
//! when calls from the same page interleave.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future::Future;

use serde_json::Value;

use crate::driver::PageApi;
use crate::error::Result;
use crate::record::{best_effort_value, CallSite};

use super::core::{ActionSpan, Recorder};

// ============================================================================
// Constants
// ============================================================================

/// Canonical label for page handles in logged function names.
pub(crate) const PAGE_LABEL: &str = "Page";

// ============================================================================
// RecordedPage
// ============================================================================

/// A page handle whose calls are recorded.
///
/// Created by [`RecordedContext::new_page`](super::RecordedContext::new_page)
/// or directly via [`RecordedPage::new`] when wrapping an existing handle.
pub struct RecordedPage<P> {
    inner: P,
    recorder: Recorder,
    label: String,
}

impl<P> fmt::Debug for RecordedPage<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordedPage")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl<P: PageApi> RecordedPage<P> {
    /// Wraps a page handle under the canonical `Page` label.
    #[inline]
    #[must_use]
    pub fn new(inner: P, recorder: Recorder) -> Self {
        Self::with_label(inner, recorder, PAGE_LABEL)
    }

    /// Wraps a page handle under an explicit label.
    #[must_use]
    pub fn with_label(inner: P, recorder: Recorder, label: impl Into<String>) -> Self {
        Self {
            inner,
            recorder,
            label: label.into(),
        }
    }

    /// Returns the wrapped handle.
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Returns the label used in logged function names.
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Opens an action span for one member call.
    #[track_caller]
    fn begin(&self, member: &str, arguments: Vec<Value>) -> ActionSpan {
        self.recorder.begin(
            format!("{}.{member}", self.label),
            arguments,
            CallSite::caller(),
        )
    }
}

// ============================================================================
// RecordedPage - Instrumented Calls
// ============================================================================

impl<P: PageApi> RecordedPage<P> {
    /// Navigates to a URL.
    #[track_caller]
    pub fn goto<'a>(&'a self, url: &'a str) -> impl Future<Output = Result<()>> + Send + 'a {
        let span = self.begin("goto", vec![best_effort_value(&url)]);
        async move { span.finish(self.inner.goto(url).await) }
    }

    /// Clicks the first element matching the selector.
    #[track_caller]
    pub fn click<'a>(&'a self, selector: &'a str) -> impl Future<Output = Result<()>> + Send + 'a {
        let span = self.begin("click", vec![best_effort_value(&selector)]);
        async move { span.finish(self.inner.click(selector).await) }
    }

    /// Fills the first element matching the selector with a value.
    #[track_caller]
    pub fn fill<'a>(
        &'a self,
        selector: &'a str,
        value: &'a str,
    ) -> impl Future<Output = Result<()>> + Send + 'a {
        let span = self.begin(
            "fill",
            vec![best_effort_value(&selector), best_effort_value(&value)],
        );
        async move { span.finish(self.inner.fill(selector, value).await) }
    }

    /// Evaluates an expression in the page and returns its result.
    #[track_caller]
    pub fn evaluate<'a>(
        &'a self,
        expression: &'a str,
    ) -> impl Future<Output = Result<Value>> + Send + 'a {
        let span = self.begin("evaluate", vec![best_effort_value(&expression)]);
        async move { span.finish(self.inner.evaluate(expression).await) }
    }

    /// Waits until an element matching the selector is present.
    #[track_caller]
    pub fn wait_for_selector<'a>(
        &'a self,
        selector: &'a str,
    ) -> impl Future<Output = Result<()>> + Send + 'a {
        let span = self.begin("wait_for_selector", vec![best_effort_value(&selector)]);
        async move { span.finish(self.inner.wait_for_selector(selector).await) }
    }

    /// Returns the page title.
    #[track_caller]
    pub fn title(&self) -> impl Future<Output = Result<String>> + Send + '_ {
        let span = self.begin("title", vec![]);
        async move { span.finish(self.inner.title().await) }
    }

    /// Closes the page.
    #[track_caller]
    pub fn close(&self) -> impl Future<Output = Result<()>> + Send + '_ {
        let span = self.begin("close", vec![]);
        async move { span.finish(self.inner.close().await) }
    }
}

// ============================================================================
// Tests
// ============================================================================
