//! Transparent transport tap.
//!
//! [`RecordingTransport`] wraps any [`Transport`] implementation and
//! behaves identically for all callers: arguments, return values, and call
//! order reach the original unchanged. Around the forwarding it emits raw
//! `send`/`receive` records into the session log, synchronously, so the
//! log order matches the order the underlying transport observed.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::driver::{MessageHandler, Transport};
use crate::error::Result;
use crate::record::Direction;
use crate::recorder::Recorder;

// ============================================================================
// RecordingTransport
// ============================================================================

/// A transport whose raw protocol frames are recorded.
///
/// One transport per recorder instance is wrapped: the one carrying the
/// traffic to the remote browser.
pub struct RecordingTransport<T> {
    inner: T,
    recorder: Recorder,
}

impl<T> fmt::Debug for RecordingTransport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingTransport").finish_non_exhaustive()
    }
}

impl<T: Transport> RecordingTransport<T> {
    /// Wraps a transport for recording.
    #[inline]
    #[must_use]
    pub fn new(inner: T, recorder: Recorder) -> Self {
        Self { inner, recorder }
    }

    /// Returns the wrapped transport.
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

// ============================================================================
// Transport Implementation
// ============================================================================

#[async_trait]
impl<T: Transport> Transport for RecordingTransport<T> {
    async fn send(&self, message: Value) -> Result<()> {
        self.recorder.emit(Direction::Send, message.clone());
        self.inner.send(message).await
    }

    fn set_message_handler(&self, handler: MessageHandler) {
        let recorder = self.recorder.clone();
        self.inner.set_message_handler(Box::new(move |message| {
            recorder.emit(Direction::Receive, message.clone());
            handler(message);
        }));
    }
}

// ============================================================================
// Tests
// ============================================================================
