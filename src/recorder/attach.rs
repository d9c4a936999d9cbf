//! One-call recording setup over a connected browser.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::driver::{BrowserApi, ContextApi};
use crate::error::Result;
use crate::session::SessionBootstrapper;

use super::context::RecordedContext;
use super::core::Recorder;
use super::page::RecordedPage;
use super::session::RecordedSession;

// ============================================================================
// RecordingHandles
// ============================================================================

/// Recorded handles produced by [`Recorder::attach`].
///
/// Driving the automation through `page` (and `context`) keeps every call
/// in the session log; the bootstrapped session keeps enriching the trace
/// in the background for as long as the handles live.
pub struct RecordingHandles<B: BrowserApi> {
    /// The recorded browsing context.
    pub context: RecordedContext<B::Context>,

    /// The recorded page.
    pub page: RecordedPage<<B::Context as ContextApi>::Page>,

    /// The active bootstrapper over the recorded protocol session.
    pub bootstrapper:
        SessionBootstrapper<RecordedSession<<B::Context as ContextApi>::Session>>,
}

impl<B: BrowserApi> fmt::Debug for RecordingHandles<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingHandles")
            .field("state", &self.bootstrapper.state())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Recorder - Attach
// ============================================================================

impl Recorder {
    /// Bootstraps recording on top of an open browser connection.
    ///
    /// Creates a browsing context and a page, wraps both for call
    /// interception, opens a low-level protocol session on the page, and
    /// drives it through domain enabling and handler activation. The
    /// returned handles are ready to drive.
    ///
    /// `context_options` are driver-defined and forwarded unmodified to
    /// the context creation call.
    ///
    /// # Errors
    ///
    /// Propagates any failing driver call or enable command; a partially
    /// attached recording is not returned.
    pub async fn attach<B>(
        &self,
        browser: &B,
        context_options: Value,
    ) -> Result<RecordingHandles<B>>
    where
        B: BrowserApi,
        <B::Context as ContextApi>::Session: 'static,
    {
        let context = browser.new_context(context_options).await?;
        let context = RecordedContext::new(context, self.clone());

        let page = context.new_page().await?;
        let session = context.new_protocol_session(&page).await?;

        let bootstrapper = SessionBootstrapper::new(Arc::new(session));
        bootstrapper.initialize().await?;

        debug!(log = %self.log_path().display(), "Recording attached");

        Ok(RecordingHandles {
            context,
            page,
            bootstrapper,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    use crate::driver::{EventHandler, PageApi, ProtocolSession};
    use crate::record::LogWriter;
    use crate::session::SessionState;

    // ------------------------------------------------------------------------
    // Mocks
    // ------------------------------------------------------------------------

    struct MockPage;

    #[async_trait]
    impl PageApi for MockPage {
        async fn goto(&self, _url: &str) -> Result<()> {
            Ok(())
        }
        async fn click(&self, _selector: &str) -> Result<()> {
            Ok(())
        }
        async fn fill(&self, _selector: &str, _value: &str) -> Result<()> {
            Ok(())
        }
        async fn evaluate(&self, _expression: &str) -> Result<Value> {
            Ok(Value::Null)
        }
        async fn wait_for_selector(&self, _selector: &str) -> Result<()> {
            Ok(())
        }
        async fn title(&self) -> Result<String> {
            Ok(String::new())
        }
        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockProtocolSession {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ProtocolSession for MockProtocolSession {
        async fn send(&self, method: &str, _params: Value) -> Result<Value> {
            self.sent.lock().push(method.to_string());
            Ok(json!({}))
        }
        fn on(&self, _event: &str, _handler: EventHandler) {}
    }

    struct MockContext;

    #[async_trait]
    impl ContextApi for MockContext {
        type Page = MockPage;
        type Session = MockProtocolSession;

        async fn new_page(&self) -> Result<Self::Page> {
            Ok(MockPage)
        }
        async fn new_protocol_session(&self, _page: &Self::Page) -> Result<Self::Session> {
            Ok(MockProtocolSession::default())
        }
        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    struct MockBrowser {
        context_options_seen: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl BrowserApi for MockBrowser {
        type Context = MockContext;

        async fn new_context(&self, options: Value) -> Result<Self::Context> {
            self.context_options_seen.lock().push(options);
            Ok(MockContext)
        }
    }

    // ------------------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------------------

    fn test_recorder(dir: &Path) -> Recorder {
        let writer = LogWriter::create(dir.join("attach.ldjson")).expect("create writer");
        Recorder::from_writer(writer)
    }

    #[tokio::test]
    async fn test_attach_bootstraps_and_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let recorder = test_recorder(dir.path());
        let browser = MockBrowser {
            context_options_seen: Mutex::new(Vec::new()),
        };

        let handles = recorder
            .attach(&browser, json!({ "viewport": { "width": 1280, "height": 720 } }))
            .await
            .expect("attach");

        assert_eq!(handles.bootstrapper.state(), SessionState::Active);
        assert_eq!(
            browser.context_options_seen.lock().as_slice(),
            [json!({ "viewport": { "width": 1280, "height": 720 } })]
        );

        // The enable sequence went through the recorded session.
        let sent = handles.bootstrapper.session().inner().sent.lock();
        assert_eq!(sent.len(), 8);
        assert_eq!(sent[0], "Page.getResourceTree");

        // Driving the returned page lands in the same log.
        drop(sent);
        handles.page.goto("https://example.com").await.expect("goto");

        let log = std::fs::read_to_string(recorder.log_path()).expect("read log");
        assert!(log.contains("Context.new_page"));
        assert!(log.contains("Context.new_protocol_session"));
        assert!(log.contains("Session.send"));
        assert!(log.contains("Page.goto"));
    }

    #[tokio::test]
    async fn test_attach_records_enable_sequence_as_actions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let recorder = test_recorder(dir.path());
        let browser = MockBrowser {
            context_options_seen: Mutex::new(Vec::new()),
        };

        recorder.attach(&browser, Value::Null).await.expect("attach");

        let session_sends = std::fs::read_to_string(recorder.log_path())
            .expect("read log")
            .lines()
            .filter(|line| {
                let value: Value = serde_json::from_str(line).expect("parse");
                value["direction"] == "action_start"
                    && value["value"]["functionName"] == "Session.send"
            })
            .count();
        assert_eq!(session_sends, 8);
    }
}
