//! Error types for the session recorder.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use session_recorder::{Recorder, Result};
//!
//! fn example() -> Result<Recorder> {
//!     Recorder::builder().session_file("checkout-flow").build()
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Log destination | [`Error::LogDestination`], [`Error::LogWrite`] |
//! | Driver | [`Error::Driver`] |
//! | Protocol | [`Error::Protocol`], [`Error::SessionState`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`] |
//!
//! Enrichment-query failures are deliberately NOT a variant of their own:
//! they are swallowed at the call site and never surfaced (see the
//! `session` module).

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Recorder configuration error.
    ///
    /// Returned when builder options are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Log Destination Errors
    // ========================================================================
    /// Log destination could not be created.
    ///
    /// Returned when the session log file cannot be opened at recorder
    /// initialization.
    #[error("Cannot create session log at {path}: {source}")]
    LogDestination {
        /// Path where the log file was to be created.
        path: PathBuf,
        /// Underlying IO failure.
        source: IoError,
    },

    /// Log destination refused a write.
    ///
    /// Fatal for the recorder: the writer latches and drops subsequent
    /// records. Never propagated into the automation path.
    #[error("Session log write failed: {message}")]
    LogWrite {
        /// Description of the write failure.
        message: String,
    },

    // ========================================================================
    // Driver Errors
    // ========================================================================
    /// Failure surfaced by the wrapped driver object.
    ///
    /// The recorder forwards these unchanged; the variant exists so
    /// collaborator implementations have an error to return.
    #[error("Driver error: {message}")]
    Driver {
        /// Error message from the driver.
        message: String,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Protocol violation or command failure on the low-level session.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol failure.
        message: String,
    },

    /// Bootstrapper driven through an invalid state transition.
    #[error("Invalid session state: expected {expected}, was {actual}")]
    SessionState {
        /// State required for the attempted transition.
        expected: String,
        /// State the session was actually in.
        actual: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Transport connection failed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Transport connection closed unexpectedly.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a log destination error.
    #[inline]
    pub fn log_destination(path: impl Into<PathBuf>, source: IoError) -> Self {
        Self::LogDestination {
            path: path.into(),
            source,
        }
    }

    /// Creates a log write error.
    #[inline]
    pub fn log_write(message: impl Into<String>) -> Self {
        Self::LogWrite {
            message: message.into(),
        }
    }

    /// Creates a driver error.
    #[inline]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a session state error.
    #[inline]
    pub fn session_state(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::SessionState {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error is fatal for the recorder.
    ///
    /// Fatal errors stop the observability path; they never stop the
    /// automation being observed.
    #[inline]
    #[must_use]
    pub fn is_fatal_for_recorder(&self) -> bool {
        matches!(
            self,
            Self::LogDestination { .. } | Self::LogWrite { .. }
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionClosed | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this is a protocol-level error.
    #[inline]
    #[must_use]
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Self::Protocol { .. } | Self::SessionState { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::connection("refused");
        assert_eq!(err.to_string(), "Connection failed: refused");
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("empty session file name");
        assert_eq!(
            err.to_string(),
            "Configuration error: empty session file name"
        );
    }

    #[test]
    fn test_session_state_display() {
        let err = Error::session_state("uninitialized", "active");
        assert_eq!(
            err.to_string(),
            "Invalid session state: expected uninitialized, was active"
        );
    }

    #[test]
    fn test_is_fatal_for_recorder() {
        let write_err = Error::log_write("disk full");
        let dest_err = Error::log_destination(
            "/tmp/session.ldjson",
            IoError::new(ErrorKind::PermissionDenied, "denied"),
        );
        let driver_err = Error::driver("navigation failed");

        assert!(write_err.is_fatal_for_recorder());
        assert!(dest_err.is_fatal_for_recorder());
        assert!(!driver_err.is_fatal_for_recorder());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::connection("x").is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(!Error::config("x").is_connection_error());
    }

    #[test]
    fn test_is_protocol_error() {
        assert!(Error::protocol("bad frame").is_protocol_error());
        assert!(Error::session_state("a", "b").is_protocol_error());
        assert!(!Error::ConnectionClosed.is_protocol_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
