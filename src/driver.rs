//! Driver collaborator seams.
//!
//! The recorder observes an automation driver; it never reimplements one.
//! These traits are the surfaces the recorder consumes:
//!
//! | Trait | Collaborator |
//! |-------|--------------|
//! | [`Transport`] | Low-level bidirectional channel carrying raw protocol frames |
//! | [`BrowserApi`] | Connected browser exposing "new context" |
//! | [`ContextApi`] | Browsing context exposing "new page" and protocol sessions |
//! | [`PageApi`] | Page handle with navigation and interaction calls |
//! | [`ProtocolSession`] | Low-level protocol session (`send` + event subscription) |
//!
//! A driver binding implements these against its own wire types; the
//! decorators in the `recorder` module wrap any implementation without
//! altering its observable behavior.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::error::Result;

// ============================================================================
// Handler Types
// ============================================================================

/// Inbound-frame hook for a [`Transport`].
///
/// Called synchronously for every message delivered by the remote end.
pub type MessageHandler = Box<dyn Fn(Value) + Send + Sync>;

/// Notification handler for a [`ProtocolSession`].
///
/// Returns a future so handlers can issue follow-up protocol queries; the
/// session implementation decides whether to await or spawn it.
pub type EventHandler = Box<dyn Fn(Value) -> BoxFuture<'static, ()> + Send + Sync>;

// ============================================================================
// Transport
// ============================================================================

/// Low-level bidirectional channel carrying raw protocol frames.
///
/// Exposes the two hook points the interceptor taps: the outbound `send`
/// path and the inbound delivery path registered via
/// [`set_message_handler`](Transport::set_message_handler).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one outbound protocol frame.
    async fn send(&self, message: Value) -> Result<()>;

    /// Registers the hook receiving every inbound protocol frame.
    ///
    /// Replaces any previously registered hook.
    fn set_message_handler(&self, handler: MessageHandler);
}

// ============================================================================
// BrowserApi
// ============================================================================

/// A connected browser.
#[async_trait]
pub trait BrowserApi: Send + Sync {
    /// Context handle type returned by [`new_context`](BrowserApi::new_context).
    type Context: ContextApi;

    /// Creates a new browsing context.
    ///
    /// `options` are driver-defined and passed through unmodified.
    async fn new_context(&self, options: Value) -> Result<Self::Context>;
}

// ============================================================================
// ContextApi
// ============================================================================

/// A browsing context.
///
/// Pages and protocol sessions created through a context are the
/// further-wrappable handles of the interception layer.
#[async_trait]
pub trait ContextApi: Send + Sync {
    /// Page handle type returned by [`new_page`](ContextApi::new_page).
    type Page: PageApi;

    /// Session handle type returned by
    /// [`new_protocol_session`](ContextApi::new_protocol_session).
    type Session: ProtocolSession;

    /// Creates a new page in this context.
    async fn new_page(&self) -> Result<Self::Page>;

    /// Opens a low-level protocol session targeting the given page.
    async fn new_protocol_session(&self, page: &Self::Page) -> Result<Self::Session>;

    /// Closes the context.
    async fn close(&self) -> Result<()>;
}

// ============================================================================
// PageApi
// ============================================================================

/// A page handle.
///
/// The call surface the recorder instruments; arguments and outcomes pass
/// through the decorator unmodified.
#[async_trait]
pub trait PageApi: Send + Sync {
    /// Navigates to a URL.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Clicks the first element matching the selector.
    async fn click(&self, selector: &str) -> Result<()>;

    /// Fills the first element matching the selector with a value.
    async fn fill(&self, selector: &str, value: &str) -> Result<()>;

    /// Evaluates an expression in the page and returns its result.
    async fn evaluate(&self, expression: &str) -> Result<Value>;

    /// Waits until an element matching the selector is present.
    async fn wait_for_selector(&self, selector: &str) -> Result<()>;

    /// Returns the page title.
    async fn title(&self) -> Result<String>;

    /// Closes the page.
    async fn close(&self) -> Result<()>;
}

// ============================================================================
// ProtocolSession
// ============================================================================

/// A low-level protocol session on a page.
///
/// `send` issues one command and resolves with its result; `on` registers a
/// notification handler. Node and response identifiers flowing through this
/// surface are protocol-defined values the recorder only echoes back.
#[async_trait]
pub trait ProtocolSession: Send + Sync {
    /// Sends a protocol command and awaits its result.
    async fn send(&self, method: &str, params: Value) -> Result<Value>;

    /// Registers a handler for a protocol notification.
    ///
    /// Multiple handlers per notification are allowed; registration order
    /// is preserved.
    fn on(&self, event: &str, handler: EventHandler);
}
