//! Protocol vocabulary used by the bootstrapper.
//!
//! Method and notification names in `Domain.name` format, plus parameter
//! builders for the commands that take any.
//!
//! # Commands
//!
//! | Command | Phase |
//! |---------|-------|
//! | `Page.getResourceTree` | domain enable |
//! | `DOM.enable`, `CSS.enable`, `Console.enable`, `Overlay.enable`, `Network.enable` | domain enable |
//! | `Overlay.setShowViewportSizeOnResize` | domain enable |
//! | `Page.startScreencast` | domain enable |
//! | `DOM.getDocument` | enrichment |
//! | `DOM.getBoxModel` | enrichment |
//! | `Network.getResponseBody` | enrichment |

// ============================================================================
// Imports
// ============================================================================

use serde_json::{json, Value};

use crate::identifiers::{NetworkRequestId, NodeId};

// ============================================================================
// Commands
// ============================================================================

/// Resource-tree query issued before any domain enable.
pub const PAGE_GET_RESOURCE_TREE: &str = "Page.getResourceTree";

/// Enables the document domain.
pub const DOM_ENABLE: &str = "DOM.enable";

/// Enables the style domain.
pub const CSS_ENABLE: &str = "CSS.enable";

/// Enables the console domain.
pub const CONSOLE_ENABLE: &str = "Console.enable";

/// Enables the overlay domain.
pub const OVERLAY_ENABLE: &str = "Overlay.enable";

/// Enables the network domain.
pub const NETWORK_ENABLE: &str = "Network.enable";

/// Enables the viewport-size overlay on resize.
pub const OVERLAY_SET_SHOW_VIEWPORT_SIZE: &str = "Overlay.setShowViewportSizeOnResize";

/// Starts periodic screen-capture frames.
pub const PAGE_START_SCREENCAST: &str = "Page.startScreencast";

/// Full document tree request.
pub const DOM_GET_DOCUMENT: &str = "DOM.getDocument";

/// Box-model query for one node.
pub const DOM_GET_BOX_MODEL: &str = "DOM.getBoxModel";

/// Response-body query for one network exchange.
pub const NETWORK_GET_RESPONSE_BODY: &str = "Network.getResponseBody";

// ============================================================================
// Notifications
// ============================================================================

/// Children updated for a node.
pub const EVENT_SET_CHILD_NODES: &str = "DOM.setChildNodes";

/// Document replaced.
pub const EVENT_DOCUMENT_UPDATED: &str = "DOM.documentUpdated";

/// Network response headers received.
pub const EVENT_RESPONSE_RECEIVED: &str = "Network.responseReceived";

/// Periodic screen-capture frame.
pub const EVENT_SCREENCAST_FRAME: &str = "Page.screencastFrame";

// ============================================================================
// Parameter Builders
// ============================================================================

/// Parameters enabling the viewport-size overlay.
#[must_use]
pub fn show_viewport_size_params() -> Value {
    json!({ "show": true })
}

/// Parameters requesting the full document tree: unbounded depth, piercing
/// shadow and embedded-document boundaries.
#[must_use]
pub fn full_document_params() -> Value {
    json!({ "depth": -1, "pierce": true })
}

/// Parameters for a box-model query.
#[must_use]
pub fn box_model_params(node_id: NodeId) -> Value {
    json!({ "nodeId": node_id })
}

/// Parameters for a response-body query.
#[must_use]
pub fn response_body_params(request_id: &NetworkRequestId) -> Value {
    json!({ "requestId": request_id })
}

// ============================================================================
// Tests
// ============================================================================
