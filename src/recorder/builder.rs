//! Builder pattern for recorder configuration.
//!
//! Provides a fluent API for configuring and creating [`Recorder`]
//! instances.
//!
//! # Example
//!
//! ```no_run
//! use session_recorder::Recorder;
//!
//! # fn example() -> session_recorder::Result<()> {
//! let recorder = Recorder::builder()
//!     .session_file("vuetify-session-events")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::record::LogWriter;

use super::core::Recorder;

// ============================================================================
// RecorderBuilder
// ============================================================================

/// Builder for configuring a [`Recorder`] instance.
///
/// Use [`Recorder::builder()`] to create a new builder. With no
/// configuration, the session log lands in the current working directory
/// under a timestamped default name.
#[derive(Debug, Default, Clone)]
pub struct RecorderBuilder {
    /// Explicit base name for the session log (without suffix).
    session_file: Option<String>,
    /// Directory the session log is placed in.
    directory: Option<PathBuf>,
}

// ============================================================================
// RecorderBuilder Implementation
// ============================================================================

impl RecorderBuilder {
    /// Creates a new builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit base name for the session log.
    ///
    /// The destination becomes `<name>.ldjson`. Without this, a default
    /// name carrying the creation timestamp is used.
    ///
    /// # Arguments
    ///
    /// * `name` - Base file name, without suffix or directory components
    #[inline]
    #[must_use]
    pub fn session_file(mut self, name: impl Into<String>) -> Self {
        self.session_file = Some(name.into());
        self
    }

    /// Sets the directory the session log is placed in.
    ///
    /// Defaults to the current working directory.
    #[inline]
    #[must_use]
    pub fn directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.directory = Some(path.into());
        self
    }

    /// Creates the session log destination and builds the recorder.
    ///
    /// The destination lives for the recorder's entire lifetime; it is
    /// never rotated or truncated afterwards.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the base name is empty or carries path
    ///   separators
    /// - [`Error::LogDestination`] if the log file cannot be created
    pub fn build(self) -> Result<Recorder> {
        let file_name = self.validate_file_name()?;

        let path = match self.directory {
            Some(directory) => directory.join(file_name),
            None => file_name,
        };

        let writer = LogWriter::create(path)?;
        Ok(Recorder::from_writer(writer))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl RecorderBuilder {
    /// Validates the configured base name and resolves the file name.
    fn validate_file_name(&self) -> Result<PathBuf> {
        let Some(name) = &self.session_file else {
            return Ok(LogWriter::default_path());
        };

        if name.is_empty() {
            return Err(Error::config(
                "Session file name is empty. Use .session_file(\"my-session\") \
                 or omit it for a timestamped default.",
            ));
        }

        if name.contains(['/', '\\']) {
            return Err(Error::config(format!(
                "Session file name '{name}' contains path separators. \
                 Use .directory() to choose the destination directory.",
            )));
        }

        Ok(LogWriter::path_for_base(name))
    }
}

// ============================================================================
// Tests
// ============================================================================
