//! Protocol session bootstrapping and reactive enrichment.
//!
//! The bootstrapper drives a low-level protocol session through its state
//! machine and keeps the trace enriched with detail the driver-level calls
//! never surface: node layout after DOM churn, response bodies after
//! network activity.
//!
//! # State Machine
//!
//! ```text
//! Uninitialized ──enable_domains()──► DomainsEnabled ──activate()──► Active
//! ```
//!
//! Domain enables all settle before the session counts as ready, so early
//! notifications are not missed. Activation registers the reactive
//! handlers; from then on the session enriches itself until dropped.
//!
//! # Enrichment Failure Policy
//!
//! Enrichment queries race the page: a node may detach, a body may be
//! evicted between notification and query. Such failures are expected,
//! swallowed, and never retried. Bootstrap commands themselves (the enable
//! sequence) propagate failure: a session that cannot enable its domains
//! never becomes ready.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use futures_util::future::join_all;
use futures_util::FutureExt;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::{debug, trace};

use crate::driver::ProtocolSession;
use crate::error::{Error, Result};
use crate::identifiers::{NetworkRequestId, NodeId};

use super::dom::DomNode;
use super::protocol::{
    box_model_params, full_document_params, response_body_params, show_viewport_size_params,
    CONSOLE_ENABLE, CSS_ENABLE, DOM_ENABLE, DOM_GET_BOX_MODEL, DOM_GET_DOCUMENT,
    EVENT_DOCUMENT_UPDATED, EVENT_RESPONSE_RECEIVED, EVENT_SCREENCAST_FRAME,
    EVENT_SET_CHILD_NODES, NETWORK_ENABLE, NETWORK_GET_RESPONSE_BODY,
    OVERLAY_ENABLE, OVERLAY_SET_SHOW_VIEWPORT_SIZE, PAGE_GET_RESOURCE_TREE,
    PAGE_START_SCREENCAST,
};

// ============================================================================
// SessionState
// ============================================================================

/// Lifecycle state of a bootstrapped session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No protocol traffic issued yet.
    Uninitialized,
    /// Domain enables have settled; handlers not yet registered.
    DomainsEnabled,
    /// Reactive handlers registered; session enriches itself.
    Active,
}

impl SessionState {
    /// Returns the state name used in errors and logs.
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::DomainsEnabled => "domains-enabled",
            Self::Active => "active",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SessionBootstrapper
// ============================================================================

/// Drives a protocol session through domain enabling and reactive
/// enrichment.
///
/// Generic over any [`ProtocolSession`]; in a recording setup the session
/// is a [`RecordedSession`](crate::RecordedSession), so enrichment traffic
/// lands in the same log stream as everything else.
pub struct SessionBootstrapper<S> {
    session: Arc<S>,
    state: Mutex<SessionState>,
}

impl<S> fmt::Debug for SessionBootstrapper<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBootstrapper")
            .field("state", &self.state.lock().as_str())
            .finish_non_exhaustive()
    }
}

impl<S> SessionBootstrapper<S> {
    /// Creates an uninitialized bootstrapper over a session.
    #[must_use]
    pub fn new(session: Arc<S>) -> Self {
        Self {
            session,
            state: Mutex::new(SessionState::Uninitialized),
        }
    }

    /// Returns the current lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Returns the session this bootstrapper drives.
    #[inline]
    #[must_use]
    pub fn session(&self) -> &Arc<S> {
        &self.session
    }

    /// Checks the current state against a required one.
    fn expect_state(&self, expected: SessionState) -> Result<()> {
        let actual = *self.state.lock();
        if actual != expected {
            return Err(Error::session_state(expected.as_str(), actual.as_str()));
        }
        Ok(())
    }
}

impl<S: ProtocolSession + 'static> SessionBootstrapper<S> {
    /// Runs the full bootstrap: domain enabling, then activation.
    ///
    /// # Errors
    ///
    /// Propagates any failing enable command or invalid state transition.
    pub async fn initialize(&self) -> Result<()> {
        self.enable_domains().await?;
        self.activate()
    }

    /// Issues the resource-tree query and the domain-enable sequence.
    ///
    /// All commands settle before the transition to `domains-enabled`.
    ///
    /// # Errors
    ///
    /// - [`Error::SessionState`] unless the session is `uninitialized`
    /// - any command failure, unchanged
    pub async fn enable_domains(&self) -> Result<()> {
        self.expect_state(SessionState::Uninitialized)?;

        self.session.send(PAGE_GET_RESOURCE_TREE, json!({})).await?;
        self.session.send(DOM_ENABLE, json!({})).await?;
        self.session.send(CSS_ENABLE, json!({})).await?;
        self.session.send(CONSOLE_ENABLE, json!({})).await?;
        self.session.send(OVERLAY_ENABLE, json!({})).await?;
        self.session.send(NETWORK_ENABLE, json!({})).await?;
        self.session
            .send(OVERLAY_SET_SHOW_VIEWPORT_SIZE, show_viewport_size_params())
            .await?;
        self.session.send(PAGE_START_SCREENCAST, json!({})).await?;

        *self.state.lock() = SessionState::DomainsEnabled;
        debug!("Protocol domains enabled");
        Ok(())
    }

    /// Registers the reactive handlers and transitions to `active`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionState`] unless the session is
    /// `domains-enabled`.
    pub fn activate(&self) -> Result<()> {
        self.expect_state(SessionState::DomainsEnabled)?;

        self.register_screencast_handler();
        self.register_subtree_handler();
        self.register_document_handler();
        self.register_response_handler();

        *self.state.lock() = SessionState::Active;
        debug!("Session active; reactive enrichment registered");
        Ok(())
    }
}

// ============================================================================
// Reactive Handlers
// ============================================================================

impl<S: ProtocolSession + 'static> SessionBootstrapper<S> {
    /// Screen-capture frames are received and intentionally discarded;
    /// persisting them is reserved for a future consumer.
    fn register_screencast_handler(&self) {
        self.session
            .on(EVENT_SCREENCAST_FRAME, Box::new(|_params| async {}.boxed()));
    }

    /// "Children updated": sweep the updated subtree with box-model
    /// queries.
    fn register_subtree_handler(&self) {
        let session = Arc::clone(&self.session);
        self.session.on(
            EVENT_SET_CHILD_NODES,
            Box::new(move |params| {
                let session = Arc::clone(&session);
                async move {
                    let Some(subtree) = DomNode::from_children_updated(&params) else {
                        trace!("Subtree notification without parent id; skipped");
                        return;
                    };
                    query_box_models(&session, subtree.collect_node_ids()).await;
                }
                .boxed()
            }),
        );
    }

    /// "Document replaced": one full-tree request, then the box-model
    /// sweep over the new tree.
    fn register_document_handler(&self) {
        let session = Arc::clone(&self.session);
        self.session.on(
            EVENT_DOCUMENT_UPDATED,
            Box::new(move |_params| {
                let session = Arc::clone(&session);
                async move {
                    match session.send(DOM_GET_DOCUMENT, full_document_params()).await {
                        Ok(result) => {
                            let Some(root) = DomNode::from_document_result(&result) else {
                                trace!("Document result without root; skipped");
                                return;
                            };
                            query_box_models(&session, root.collect_node_ids()).await;
                        }
                        Err(e) => {
                            trace!(error = %e, "Document query failed; swallowed");
                        }
                    }
                }
                .boxed()
            }),
        );
    }

    /// "Response received": fetch the body while it is still available.
    fn register_response_handler(&self) {
        let session = Arc::clone(&self.session);
        self.session.on(
            EVENT_RESPONSE_RECEIVED,
            Box::new(move |params| {
                let session = Arc::clone(&session);
                async move {
                    let request_id = params
                        .get("requestId")
                        .and_then(Value::as_str)
                        .map(NetworkRequestId::from);
                    let Some(request_id) = request_id else {
                        trace!("Response notification without request id; skipped");
                        return;
                    };

                    let query = session
                        .send(NETWORK_GET_RESPONSE_BODY, response_body_params(&request_id))
                        .await;
                    if let Err(e) = query {
                        trace!(%request_id, error = %e, "Response body unavailable; swallowed");
                    }
                }
                .boxed()
            }),
        );
    }
}

// ============================================================================
// Enrichment Queries
// ============================================================================

/// Issues one box-model query per collected node id.
///
/// All queries for one notification are in flight at once; there is no
/// backpressure or cap. Failures are swallowed; the node may have
/// detached between notification and query.
async fn query_box_models<S: ProtocolSession>(session: &Arc<S>, node_ids: Vec<NodeId>) {
    let queries = node_ids.into_iter().map(|node_id| {
        let session = Arc::clone(session);
        async move {
            let query = session.send(DOM_GET_BOX_MODEL, box_model_params(node_id)).await;
            if let Err(e) = query {
                trace!(%node_id, error = %e, "Box-model query failed; node likely detached");
            }
        }
    });

    join_all(queries).await;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use rustc_hash::FxHashMap;

    use crate::driver::EventHandler;

    // ------------------------------------------------------------------------
    // Mock session
    // ------------------------------------------------------------------------

    #[derive(Default)]
    struct MockSession {
        sent: Mutex<Vec<(String, Value)>>,
        handlers: Mutex<FxHashMap<String, Vec<EventHandler>>>,
        document: Value,
        failing_nodes: Vec<i64>,
        fail_bodies: bool,
        fail_enable: Option<&'static str>,
    }

    impl MockSession {
        fn with_document(document: Value) -> Self {
            Self {
                document,
                ..Self::default()
            }
        }

        fn sent_methods(&self) -> Vec<String> {
            self.sent.lock().iter().map(|(m, _)| m.clone()).collect()
        }

        fn sent_params_for(&self, method: &str) -> Vec<Value> {
            self.sent
                .lock()
                .iter()
                .filter(|(m, _)| m == method)
                .map(|(_, p)| p.clone())
                .collect()
        }

        fn clear_sent(&self) {
            self.sent.lock().clear();
        }

        /// Delivers a notification to every registered handler and awaits
        /// the resulting enrichment to completion.
        async fn dispatch(&self, event: &str, params: Value) {
            let futures: Vec<_> = {
                let handlers = self.handlers.lock();
                handlers
                    .get(event)
                    .into_iter()
                    .flatten()
                    .map(|handler| handler(params.clone()))
                    .collect()
            };
            for future in futures {
                future.await;
            }
        }
    }

    #[async_trait]
    impl ProtocolSession for MockSession {
        async fn send(&self, method: &str, params: Value) -> Result<Value> {
            self.sent.lock().push((method.to_string(), params.clone()));

            if self.fail_enable == Some(method) {
                return Err(Error::protocol(format!("{method} rejected")));
            }

            match method {
                DOM_GET_DOCUMENT => Ok(self.document.clone()),
                DOM_GET_BOX_MODEL => {
                    let node = params["nodeId"].as_i64().unwrap_or_default();
                    if self.failing_nodes.contains(&node) {
                        Err(Error::protocol("Could not compute box model"))
                    } else {
                        Ok(json!({ "model": {} }))
                    }
                }
                NETWORK_GET_RESPONSE_BODY if self.fail_bodies => {
                    Err(Error::protocol("No data found for resource"))
                }
                _ => Ok(json!({})),
            }
        }

        fn on(&self, event: &str, handler: EventHandler) {
            self.handlers
                .lock()
                .entry(event.to_string())
                .or_default()
                .push(handler);
        }
    }

    fn four_node_document() -> Value {
        json!({
            "root": {
                "nodeId": 1,
                "children": [
                    { "nodeId": 2, "children": [{ "nodeId": 3 }] },
                    { "nodeId": 4 }
                ]
            }
        })
    }

    async fn active_bootstrapper(session: MockSession) -> SessionBootstrapper<MockSession> {
        let bootstrapper = SessionBootstrapper::new(Arc::new(session));
        bootstrapper.initialize().await.expect("initialize");
        bootstrapper.session().clear_sent();
        bootstrapper
    }

    // ------------------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_enable_sequence_order() {
        let bootstrapper = SessionBootstrapper::new(Arc::new(MockSession::default()));
        bootstrapper.initialize().await.expect("initialize");

        assert_eq!(
            bootstrapper.session().sent_methods(),
            vec![
                PAGE_GET_RESOURCE_TREE,
                DOM_ENABLE,
                CSS_ENABLE,
                CONSOLE_ENABLE,
                OVERLAY_ENABLE,
                NETWORK_ENABLE,
                OVERLAY_SET_SHOW_VIEWPORT_SIZE,
                PAGE_START_SCREENCAST,
            ]
        );
        assert_eq!(bootstrapper.state(), SessionState::Active);
    }

    #[tokio::test]
    async fn test_activate_requires_enabled_domains() {
        let bootstrapper = SessionBootstrapper::new(Arc::new(MockSession::default()));

        let err = bootstrapper.activate().expect_err("must fail");
        assert!(matches!(err, Error::SessionState { .. }));
        assert_eq!(bootstrapper.state(), SessionState::Uninitialized);
    }

    #[tokio::test]
    async fn test_enable_domains_is_not_repeatable() {
        let bootstrapper = SessionBootstrapper::new(Arc::new(MockSession::default()));
        bootstrapper.initialize().await.expect("initialize");

        let err = bootstrapper.enable_domains().await.expect_err("must fail");
        assert!(matches!(err, Error::SessionState { .. }));
    }

    #[tokio::test]
    async fn test_failing_enable_propagates_and_blocks_readiness() {
        let session = MockSession {
            fail_enable: Some(CSS_ENABLE),
            ..MockSession::default()
        };
        let bootstrapper = SessionBootstrapper::new(Arc::new(session));

        let err = bootstrapper.initialize().await.expect_err("must fail");
        assert!(err.to_string().contains("CSS.enable rejected"));
        assert_eq!(bootstrapper.state(), SessionState::Uninitialized);
    }

    #[tokio::test]
    async fn test_document_replaced_issues_one_tree_and_per_node_queries() {
        let bootstrapper =
            active_bootstrapper(MockSession::with_document(four_node_document())).await;
        let session = bootstrapper.session();

        session.dispatch(EVENT_DOCUMENT_UPDATED, json!({})).await;

        assert_eq!(session.sent_params_for(DOM_GET_DOCUMENT).len(), 1);

        let box_queries = session.sent_params_for(DOM_GET_BOX_MODEL);
        let queried: Vec<i64> = box_queries
            .iter()
            .map(|p| p["nodeId"].as_i64().expect("node id"))
            .collect();
        assert_eq!(queried, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_box_model_failures_are_swallowed() {
        let session = MockSession {
            document: four_node_document(),
            failing_nodes: vec![2, 3],
            ..MockSession::default()
        };
        let bootstrapper = active_bootstrapper(session).await;
        let session = bootstrapper.session();

        // Dispatch resolves without error even though two queries fail,
        // and the remaining nodes are still queried.
        session.dispatch(EVENT_DOCUMENT_UPDATED, json!({})).await;
        assert_eq!(session.sent_params_for(DOM_GET_BOX_MODEL).len(), 4);
    }

    #[tokio::test]
    async fn test_children_updated_sweeps_subtree_parent_first() {
        let bootstrapper = active_bootstrapper(MockSession::default()).await;
        let session = bootstrapper.session();

        session
            .dispatch(
                EVENT_SET_CHILD_NODES,
                json!({
                    "parentId": 10,
                    "nodes": [
                        { "nodeId": 11, "children": [{ "nodeId": 12 }] }
                    ]
                }),
            )
            .await;

        let queried: Vec<i64> = session
            .sent_params_for(DOM_GET_BOX_MODEL)
            .iter()
            .map(|p| p["nodeId"].as_i64().expect("node id"))
            .collect();
        assert_eq!(queried, vec![10, 11, 12]);
    }

    #[tokio::test]
    async fn test_response_received_fetches_body() {
        let bootstrapper = active_bootstrapper(MockSession::default()).await;
        let session = bootstrapper.session();

        session
            .dispatch(EVENT_RESPONSE_RECEIVED, json!({ "requestId": "1000.1" }))
            .await;

        assert_eq!(
            session.sent_params_for(NETWORK_GET_RESPONSE_BODY),
            vec![json!({ "requestId": "1000.1" })]
        );
    }

    #[tokio::test]
    async fn test_unavailable_body_is_swallowed() {
        let session = MockSession {
            fail_bodies: true,
            ..MockSession::default()
        };
        let bootstrapper = active_bootstrapper(session).await;
        let session = bootstrapper.session();

        session
            .dispatch(EVENT_RESPONSE_RECEIVED, json!({ "requestId": "1000.2" }))
            .await;
        assert_eq!(session.sent_params_for(NETWORK_GET_RESPONSE_BODY).len(), 1);
    }

    #[tokio::test]
    async fn test_screencast_frames_trigger_no_queries() {
        let bootstrapper = active_bootstrapper(MockSession::default()).await;
        let session = bootstrapper.session();

        session
            .dispatch(EVENT_SCREENCAST_FRAME, json!({ "data": "..." }))
            .await;
        assert!(session.sent_methods().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_notifications_are_skipped() {
        let bootstrapper = active_bootstrapper(MockSession::default()).await;
        let session = bootstrapper.session();

        session
            .dispatch(EVENT_SET_CHILD_NODES, json!({ "nodes": [] }))
            .await;
        session.dispatch(EVENT_RESPONSE_RECEIVED, json!({})).await;

        assert!(session.sent_methods().is_empty());
    }
}
