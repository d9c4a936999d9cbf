//! Session Recorder - Replayable event logs for remote browser automation.
//!
//! This library records every interaction between an automation driver and
//! a remotely controlled browser into a durable, ordered, line-delimited
//! event log, so a session can later be reconstructed or replayed in a
//! viewer.
//!
//! # Architecture
//!
//! Three interception layers feed one log stream:
//!
//! - **Transport tap**: [`RecordingTransport`] wraps the raw bidirectional
//!   channel; every protocol frame lands as a `send`/`receive` record.
//! - **Call decorators**: [`RecordedContext`], [`RecordedPage`], and
//!   [`RecordedSession`] wrap live driver handles; every call lands as a
//!   correlated `action_start`/`action_end` pair. Handles returned by
//!   intercepted calls are wrapped before being handed back.
//! - **Session bootstrapper**: [`SessionBootstrapper`] enables protocol
//!   domains on a low-level session and reacts to notifications with
//!   enrichment queries (node layout, response bodies) that ride the same
//!   recorded channels.
//!
//! Key design principles:
//!
//! - One [`Recorder`] instance backs one log; it owns the action counter
//!   and the append-only writer, injected into every decorator.
//! - Interception never perturbs the automation: identical arguments reach
//!   the original, identical outcomes reach the caller, and a failing
//!   observability path never fails the observed call.
//! - Start boundaries are emitted at call initiation, so action ids order
//!   by initiation even when asynchronous calls interleave.
//!
//! # Quick Start
//!
//! ```no_run
//! use serde_json::json;
//! use session_recorder::{Recorder, Result};
//! # use session_recorder::driver::BrowserApi;
//!
//! # async fn example<B>(browser: B) -> Result<()>
//! # where B: BrowserApi, <B::Context as session_recorder::driver::ContextApi>::Session: 'static {
//! // Recording lands in ./vuetify-session-events.ldjson
//! let recorder = Recorder::builder()
//!     .session_file("vuetify-session-events")
//!     .build()?;
//!
//! // Wrap a context and page over the open browser connection and
//! // bootstrap protocol-domain enrichment.
//! let handles = recorder.attach(&browser, json!({})).await?;
//!
//! // Drive the automation through the recorded handles.
//! handles.page.goto("https://vuetifyjs.com/en/").await?;
//! handles.page.click("a[href=\"/en/getting-started/quick-start/\"]").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`driver`] | Collaborator seams: transport, browser, page, session traits |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`record`] | Event records and the append-only log writer |
//! | [`recorder`] | The recorder and its call decorators |
//! | [`session`] | Protocol session bootstrapping and enrichment |
//! | [`transport`] | Raw-frame tap and WebSocket binding |
//!
//! # Log Format
//!
//! One JSON object per physical line (`.ldjson`), each with `direction`
//! (`send` | `receive` | `action_start` | `action_end`), `value`, and
//! `timestamp` (integer epoch milliseconds). Lines are never rewritten or
//! reordered; an `action_start` without a matching `action_end` marks a
//! trace truncated by process termination, not corruption.

// ============================================================================
// Modules
// ============================================================================

/// Driver collaborator seams.
///
/// The trait surfaces the recorder consumes: [`Transport`],
/// [`driver::BrowserApi`], [`driver::ContextApi`], [`driver::PageApi`],
/// [`driver::ProtocolSession`].
pub mod driver;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for recorded entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Event records and the append-only log writer.
pub mod record;

/// The recorder and its call decorators.
pub mod recorder;

/// Protocol session bootstrapping and reactive enrichment.
pub mod session;

/// Transport layer: raw-frame tap and WebSocket binding.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Driver seams
pub use driver::{EventHandler, MessageHandler, Transport};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ActionId, NetworkRequestId, NodeId};

// Record types
pub use record::{CallDescriptor, CallOutcome, CallSite, Direction, EventRecord, LogWriter};

// Recorder types
pub use recorder::{
    ActionSpan, Recorder, RecorderBuilder, RecordedContext, RecordedPage, RecordedSession,
    RecordingHandles,
};

// Session types
pub use session::{DomNode, SessionBootstrapper, SessionState};

// Transport types
pub use transport::{RecordingTransport, WebSocketTransport};
