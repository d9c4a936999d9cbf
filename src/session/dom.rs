//! Remote document tree fragments.
//!
//! Notification payloads carry (fragments of) the remote node tree; the
//! bootstrapper only needs node ids out of them, collected depth-first
//! with each parent ahead of its children.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::identifiers::NodeId;

// ============================================================================
// DomNode
// ============================================================================

/// One node of the remote document tree.
///
/// Unknown payload fields are ignored; missing fields default, so partial
/// tree fragments parse without error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DomNode {
    /// Protocol-assigned node id.
    pub node_id: NodeId,

    /// Child nodes, in document order.
    pub children: Vec<DomNode>,
}

impl DomNode {
    /// Extracts the document root from a full-tree query result.
    ///
    /// Returns `None` when the result carries no parseable `root`.
    #[must_use]
    pub fn from_document_result(result: &Value) -> Option<Self> {
        result
            .get("root")
            .cloned()
            .and_then(|root| serde_json::from_value(root).ok())
    }

    /// Synthesizes the updated subtree from a "children updated"
    /// notification (`{parentId, nodes}`).
    ///
    /// Returns `None` when the payload carries no parent id.
    #[must_use]
    pub fn from_children_updated(params: &Value) -> Option<Self> {
        let parent_id = params.get("parentId")?.as_i64()?;

        let children = params
            .get("nodes")
            .cloned()
            .and_then(|nodes| serde_json::from_value(nodes).ok())
            .unwrap_or_default();

        Some(Self {
            node_id: NodeId::new(parent_id),
            children,
        })
    }

    /// Collects every node id in this subtree, depth-first, each parent
    /// ahead of its children.
    #[must_use]
    pub fn collect_node_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        self.collect_into(&mut ids);
        ids
    }

    fn collect_into(&self, ids: &mut Vec<NodeId>) {
        ids.push(self.node_id);
        for child in &self.children {
            child.collect_into(ids);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
