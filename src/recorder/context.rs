//! Context decorator.
//!
//! [`RecordedContext`] wraps a
//! [`ContextApi`](crate::driver::ContextApi) implementation and is where
//! recursive interception happens: handles returned by intercepted calls
//! are wrapped before being handed back. The further-wrappable set is
//! enumerated: page handles become [`RecordedPage`], protocol-session
//! handles become [`RecordedSession`]; plain values pass through as-is.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future::Future;

use serde_json::Value;

use crate::driver::ContextApi;
use crate::error::Result;
use crate::record::CallSite;

use super::core::{ActionSpan, Recorder};
use super::page::{RecordedPage, PAGE_LABEL};
use super::session::{RecordedSession, SESSION_LABEL};

// ============================================================================
// Constants
// ============================================================================

/// Canonical label for context handles in logged function names.
pub(crate) const CONTEXT_LABEL: &str = "Context";

// ============================================================================
// RecordedContext
// ============================================================================

/// A browsing context whose calls are recorded.
pub struct RecordedContext<C> {
    inner: C,
    recorder: Recorder,
    label: String,
}

impl<C> fmt::Debug for RecordedContext<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordedContext")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl<C: ContextApi> RecordedContext<C> {
    /// Wraps a context handle under the canonical `Context` label.
    #[inline]
    #[must_use]
    pub fn new(inner: C, recorder: Recorder) -> Self {
        Self::with_label(inner, recorder, CONTEXT_LABEL)
    }

    /// Wraps a context handle under an explicit label.
    #[must_use]
    pub fn with_label(inner: C, recorder: Recorder, label: impl Into<String>) -> Self {
        Self {
            inner,
            recorder,
            label: label.into(),
        }
    }

    /// Returns the wrapped handle.
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Returns the label used in logged function names.
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the recorder backing this decorator.
    #[inline]
    #[must_use]
    pub fn recorder(&self) -> &Recorder {
        &self.recorder
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
// RecordedContext - Instrumented Calls
// ============================================================================

impl<C: ContextApi> RecordedContext<C> {
    /// Creates a new page and wraps it for recording.
    ///
    /// The underlying handle is obtained first and the settlement logged;
    /// only then is the result wrapped and handed back.
    #[track_caller]
    pub fn new_page(
        &self,
    ) -> impl Future<Output = Result<RecordedPage<C::Page>>> + Send + '_ {
        let span = self.begin("new_page", vec![]);
        async move {
            let page = span.finish(self.inner.new_page().await)?;
            Ok(RecordedPage::with_label(
                page,
                self.recorder.clone(),
                PAGE_LABEL,
            ))
        }
    }

    /// Opens a low-level protocol session on a page and wraps it for
    /// recording.
    #[track_caller]
    pub fn new_protocol_session<'a>(
        &'a self,
        page: &'a RecordedPage<C::Page>,
    ) -> impl Future<Output = Result<RecordedSession<C::Session>>> + Send + 'a {
        let span = self.begin("new_protocol_session", vec![]);
        async move {
            let session = span.finish(self.inner.new_protocol_session(page.inner()).await)?;
            Ok(RecordedSession::with_label(
                session,
                self.recorder.clone(),
                SESSION_LABEL,
            ))
        }
    }

    /// Closes the context.
    #[track_caller]
    pub fn close(&self) -> impl Future<Output = Result<()>> + Send + '_ {
        let span = self.begin("close", vec![]);
        async move { span.finish(self.inner.close().await) }
    }
}

// ============================================================================
// Tests
// ============================================================================
