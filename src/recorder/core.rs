//! Recorder handle and action-span machinery.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tracing::trace;

use crate::error::Result;
use crate::identifiers::ActionId;
use crate::record::{
    best_effort_value, CallDescriptor, CallOutcome, CallSite, Direction, EventRecord, LogWriter,
};

use super::builder::RecorderBuilder;

// ============================================================================
// Recorder
// ============================================================================

/// One recording instance: the action counter plus the session log.
///
/// Cheap to clone; every decorator holds a clone, so one recorder instance
/// backs one log. Action ids are unique per instance and strictly
/// increasing in call-initiation order.
///
/// # Example
///
/// ```ignore
/// let recorder = Recorder::builder().session_file("checkout-flow").build()?;
/// let page = RecordedPage::new(driver_page, recorder.clone());
/// page.goto("https://example.com").await?;
/// ```
#[derive(Clone)]
pub struct Recorder {
    inner: Arc<RecorderInner>,
}

struct RecorderInner {
    /// Append-only session log.
    writer: LogWriter,
    /// Last allocated action id; next allocation is `previous + 1`.
    last_action_id: AtomicU64,
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("log_path", &self.log_path())
            .field(
                "last_action_id",
                &self.inner.last_action_id.load(Ordering::Relaxed),
            )
            .finish_non_exhaustive()
    }
}

impl Recorder {
    /// Returns a builder for configuring a recorder.
    #[inline]
    #[must_use]
    pub fn builder() -> RecorderBuilder {
        RecorderBuilder::new()
    }

    /// Creates a recorder over an existing log writer.
    pub(crate) fn from_writer(writer: LogWriter) -> Self {
        Self {
            inner: Arc::new(RecorderInner {
                writer,
                last_action_id: AtomicU64::new(0),
            }),
        }
    }

    /// Returns the session log destination path.
    #[inline]
    #[must_use]
    pub fn log_path(&self) -> &Path {
        self.inner.writer.path()
    }

    /// Returns `true` once the log destination has refused a write.
    ///
    /// A failed recorder stops observing; the automation it observed keeps
    /// running.
    #[inline]
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.inner.writer.is_failed()
    }

    /// Allocates the next action id.
    fn next_action_id(&self) -> ActionId {
        ActionId::new(self.inner.last_action_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Opens an action span: allocates an id and emits `action_start`.
    ///
    /// Emission happens synchronously, before the wrapped operation is
    /// polled, so id allocation order is call-initiation order.
    #[must_use]
    pub fn begin(
        &self,
        function_name: impl Into<String>,
        arguments: Vec<Value>,
        callsite: CallSite,
    ) -> ActionSpan {
        let descriptor = CallDescriptor::new(
            function_name,
            arguments,
            callsite,
            self.next_action_id(),
        );

        trace!(
            function = %descriptor.function_name,
            action_id = %descriptor.action_id,
            "Action started"
        );
        self.emit(Direction::ActionStart, best_effort_value(&descriptor));

        ActionSpan {
            recorder: self.clone(),
            descriptor,
        }
    }

    /// Appends one record to the session log.
    ///
    /// Write failures latch the writer and are reported there; the caller's
    /// primary action is never aborted on their behalf.
    pub(crate) fn emit(&self, direction: Direction, value: Value) {
        let _ = self.inner.writer.append(&EventRecord::now(direction, value));
    }
}

// ============================================================================
// ActionSpan
// ============================================================================

/// An open `action_start`/`action_end` pair.
///
/// Created by [`Recorder::begin`]; closed by [`finish`](ActionSpan::finish)
/// when the wrapped operation settles. A span dropped without finishing
/// leaves the start record unmatched, which the log format defines as a
/// truncated trace, not corruption.
#[must_use = "an unfinished span leaves its action without an end record"]
pub struct ActionSpan {
    recorder: Recorder,
    descriptor: CallDescriptor,
}

impl ActionSpan {
    /// Returns the correlation id of this action.
    #[inline]
    #[must_use]
    pub fn action_id(&self) -> ActionId {
        self.descriptor.action_id
    }

    /// Stamps the settlement outcome, emits `action_end`, and delivers the
    /// original outcome unchanged.
    pub fn finish<T>(mut self, result: Result<T>) -> Result<T> {
        self.descriptor.outcome = Some(match &result {
            Ok(_) => CallOutcome::Ok,
            Err(e) => CallOutcome::failure(e.to_string()),
        });

        trace!(
            function = %self.descriptor.function_name,
            action_id = %self.descriptor.action_id,
            ok = self.descriptor.outcome.as_ref().is_some_and(CallOutcome::is_ok),
            "Action settled"
        );
        self.recorder
            .emit(Direction::ActionEnd, best_effort_value(&self.descriptor));

        result
    }
}

// ============================================================================
// Tests
// ============================================================================
