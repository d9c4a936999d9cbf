//! Event record and call-descriptor types.
//!
//! One [`EventRecord`] is one logged occurrence: raw protocol traffic
//! tapped off the transport, or a high-level call boundary emitted by a
//! decorator. Records serialize to single JSON lines; the replay viewer
//! reads them back sequentially.

// ============================================================================
// Imports
// ============================================================================

use std::panic::Location;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::ActionId;

// ============================================================================
// Constants
// ============================================================================

/// Placeholder substituted for payload fragments that refuse to serialize.
pub(crate) const UNSERIALIZABLE: &str = "<non-serializable>";

// ============================================================================
// Direction
// ============================================================================

/// Directional tag of one logged occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Outbound protocol message, tapped before forwarding.
    Send,
    /// Inbound protocol message, tapped at delivery.
    Receive,
    /// High-level call initiated.
    ActionStart,
    /// High-level call settled (success or failure).
    ActionEnd,
}

// ============================================================================
// EventRecord
// ============================================================================

/// One logged occurrence.
///
/// # Format
///
/// ```json
/// {"direction": "send", "value": {...}, "timestamp": 1719412345678}
/// ```
///
/// `timestamp` is wall-clock milliseconds since the Unix epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Directional tag.
    pub direction: Direction,

    /// Payload: raw protocol message for send/receive, a serialized
    /// [`CallDescriptor`] for action boundaries.
    pub value: Value,

    /// Wall-clock milliseconds since epoch at emission time.
    pub timestamp: i64,
}

impl EventRecord {
    /// Creates a record stamped with the current wall-clock time.
    #[inline]
    #[must_use]
    pub fn now(direction: Direction, value: Value) -> Self {
        Self {
            direction,
            value,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

// ============================================================================
// CallSite
// ============================================================================

/// Best-effort source location of the immediate caller.
///
/// Captured from the decorator's synchronous prologue via
/// [`std::panic::Location`]. A diagnostic field only: it may be empty, it
/// may point at a delegation frame, and nothing downstream is allowed to
/// depend on it for correctness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    /// Source file of the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Line of the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// Column of the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl CallSite {
    /// Captures the caller's location.
    ///
    /// Must be invoked from a `#[track_caller]` chain to attribute the
    /// user's call site rather than recorder internals.
    #[track_caller]
    #[must_use]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self {
            url: Some(location.file().to_string()),
            line: Some(location.line()),
            column: Some(location.column()),
        }
    }

    /// An empty call site, for contexts where capture is unavailable.
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

// ============================================================================
// CallOutcome
// ============================================================================

/// Settlement outcome carried on an `action_end` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CallOutcome {
    /// The wrapped call returned a value.
    Ok,
    /// The wrapped call failed.
    Error {
        /// Stringified failure delivered to the caller.
        error: String,
    },
}

impl CallOutcome {
    /// Creates a failure outcome.
    #[inline]
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
        }
    }

    /// Returns `true` if the wrapped call succeeded.
    #[inline]
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

// ============================================================================
// CallDescriptor
// ============================================================================

/// Payload of an action boundary record.
///
/// # Format
///
/// ```json
/// {
///   "functionName": "Page.goto",
///   "arguments": ["https://example.com"],
///   "url": "src/flows/checkout.rs",
///   "line": 41,
///   "column": 9,
///   "actionId": 3
/// }
/// ```
///
/// The same descriptor is emitted on `action_start` and `action_end`; only
/// the end carries `outcome`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallDescriptor {
    /// Qualified name: decorator label + `.` + member name.
    pub function_name: String,

    /// Arguments as passed, serialized best-effort.
    pub arguments: Vec<Value>,

    /// Best-effort caller location.
    #[serde(flatten)]
    pub callsite: CallSite,

    /// Correlation id shared by the start/end pair.
    pub action_id: ActionId,

    /// Settlement outcome; present only on `action_end`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CallOutcome>,
}

impl CallDescriptor {
    /// Creates a start-side descriptor (no outcome yet).
    #[must_use]
    pub fn new(
        function_name: impl Into<String>,
        arguments: Vec<Value>,
        callsite: CallSite,
        action_id: ActionId,
    ) -> Self {
        Self {
            function_name: function_name.into(),
            arguments,
            callsite,
            action_id,
            outcome: None,
        }
    }
}

// ============================================================================
// Best-effort Serialization
// ============================================================================

/// Serializes a value, degrading to a placeholder instead of failing.
///
/// Arguments and payloads are logged on a best-effort basis: a value whose
/// `Serialize` implementation errors becomes the `<non-serializable>`
/// placeholder rather than aborting the caller's primary action.
#[must_use]
pub fn best_effort_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|_| Value::String(UNSERIALIZABLE.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde::ser::Error as SerError;
    use serde_json::json;

    #[test]
    fn test_direction_serde_names() {
        assert_eq!(
            serde_json::to_string(&Direction::ActionStart).expect("serialize"),
            r#""action_start""#
        );
        let back: Direction = serde_json::from_str(r#""receive""#).expect("deserialize");
        assert_eq!(back, Direction::Receive);
    }

    #[test]
    fn test_record_has_required_fields() {
        let record = EventRecord::now(Direction::Send, json!({"id": 1}));
        let value = serde_json::to_value(&record).expect("serialize");

        assert!(value.get("direction").is_some());
        assert!(value.get("value").is_some());
        assert!(value.get("timestamp").and_then(|t| t.as_i64()).is_some());
    }

    #[test]
    fn test_call_site_caller_points_here() {
        let site = CallSite::caller();
        assert!(site.url.as_deref().expect("file").ends_with("event.rs"));
        assert!(site.line.expect("line") > 0);
    }

    #[test]
    fn test_descriptor_start_omits_outcome() {
        let descriptor = CallDescriptor::new(
            "Page.goto",
            vec![json!("https://example.com")],
            CallSite::empty(),
            ActionId::new(1),
        );

        let value = serde_json::to_value(&descriptor).expect("serialize");
        assert_eq!(value["functionName"], "Page.goto");
        assert_eq!(value["actionId"], 1);
        assert!(value.get("outcome").is_none());
    }

    #[test]
    fn test_descriptor_end_carries_failure() {
        let mut descriptor = CallDescriptor::new(
            "Page.click",
            vec![json!("#submit")],
            CallSite::empty(),
            ActionId::new(2),
        );
        descriptor.outcome = Some(CallOutcome::failure("element not found"));

        let value = serde_json::to_value(&descriptor).expect("serialize");
        assert_eq!(value["outcome"]["status"], "error");
        assert_eq!(value["outcome"]["error"], "element not found");
    }

    #[test]
    fn test_outcome_ok_shape() {
        let value = serde_json::to_value(&CallOutcome::Ok).expect("serialize");
        assert_eq!(value, json!({"status": "ok"}));
        assert!(CallOutcome::Ok.is_ok());
        assert!(!CallOutcome::failure("x").is_ok());
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("refuses to serialize"))
        }
    }

    #[test]
    fn test_best_effort_value_degrades_to_placeholder() {
        let value = best_effort_value(&Unserializable);
        assert_eq!(value, Value::String(UNSERIALIZABLE.to_string()));
    }

    #[test]
    fn test_best_effort_value_passthrough() {
        let value = best_effort_value(&vec![1, 2, 3]);
        assert_eq!(value, json!([1, 2, 3]));
    }
}
