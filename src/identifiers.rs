//! Type-safe identifiers for recorded entities.
//!
//! Newtype wrappers prevent mixing incompatible IDs at compile time.
//!
//! | Type | Source |
//! |------|--------|
//! | [`ActionId`] | Recorder-owned monotonic counter |
//! | [`NodeId`] | Remote protocol (document node identifier) |
//! | [`NetworkRequestId`] | Remote protocol (network exchange identifier) |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// ActionId
// ============================================================================

/// Identifier correlating an `action_start` record with its `action_end`.
///
/// Drawn from a single monotonically increasing counter owned by one
/// [`Recorder`](crate::Recorder) instance. Values are unique per recorder
/// and strictly increasing in call-initiation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(u64);

impl ActionId {
    /// Wraps a raw counter value.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw counter value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// NodeId
// ============================================================================

/// Protocol-assigned identifier for a remote document node.
///
/// Used to correlate box-model enrichment queries with the notification
/// that produced them. The value is opaque to the recorder; it is only ever
/// echoed back to the remote end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(i64);

impl NodeId {
    /// Wraps a protocol-assigned node id.
    #[inline]
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw protocol value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// NetworkRequestId
// ============================================================================

/// Protocol-assigned identifier for one network exchange.
///
/// Used to request the response body after a "response received"
/// notification. Remote ends issue these as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkRequestId(String);

impl NetworkRequestId {
    /// Wraps a protocol-assigned request id.
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw protocol value.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetworkRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NetworkRequestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
