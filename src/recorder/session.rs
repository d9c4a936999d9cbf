//! Protocol-session decorator.
//!
//! [`RecordedSession`] wraps a
//! [`ProtocolSession`](crate::driver::ProtocolSession) and implements the
//! same trait, so the bootstrapper and any other session consumer can use a
//! recorded session wherever a raw one is accepted. Command sends are
//! logged as `Session.send` actions; notification registration is
//! forwarded untouched; event delivery is the remote end calling us, not
//! a driver call.
//!
//! Call-site attribution is unavailable through trait dispatch; session
//! actions carry an empty call site.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::driver::{EventHandler, ProtocolSession};
use crate::error::Result;
use crate::record::{best_effort_value, CallSite};

use super::core::Recorder;

// ============================================================================
// Constants
// ============================================================================

/// Canonical label for protocol-session handles in logged function names.
pub(crate) const SESSION_LABEL: &str = "Session";

// ============================================================================
// RecordedSession
// ============================================================================

/// A protocol session whose commands are recorded.
///
/// Created by
/// [`RecordedContext::new_protocol_session`](super::RecordedContext::new_protocol_session)
/// or directly via [`RecordedSession::new`].
pub struct RecordedSession<S> {
    inner: S,
    recorder: Recorder,
    label: String,
}

impl<S> fmt::Debug for RecordedSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordedSession")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl<S: ProtocolSession> RecordedSession<S> {
    /// Wraps a session handle under the canonical `Session` label.
    #[inline]
    #[must_use]
    pub fn new(inner: S, recorder: Recorder) -> Self {
        Self::with_label(inner, recorder, SESSION_LABEL)
    }

    /// Wraps a session handle under an explicit label.
    #[must_use]
    pub fn with_label(inner: S, recorder: Recorder, label: impl Into<String>) -> Self {
        Self {
            inner,
            recorder,
            label: label.into(),
        }
    }

    /// Returns the wrapped handle.
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns the label used in logged function names.
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

// ============================================================================
// ProtocolSession Implementation
// ============================================================================

#[async_trait]
impl<S: ProtocolSession> ProtocolSession for RecordedSession<S> {
    async fn send(&self, method: &str, params: Value) -> Result<Value> {
        let span = self.recorder.begin(
            format!("{}.send", self.label),
            vec![best_effort_value(&method), params.clone()],
            CallSite::empty(),
        );
        span.finish(self.inner.send(method, params).await)
    }

    fn on(&self, event: &str, handler: EventHandler) {
        self.inner.on(event, handler);
    }
}

// ============================================================================
// Tests
// ============================================================================
