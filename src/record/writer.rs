//! Append-only session log sink.
//!
//! The writer owns the log destination for the recorder's entire lifetime:
//! created once at initialization, never rotated, truncated, or closed
//! except at process end. Lines are never rewritten or reordered after
//! being written; the file is the single source of truth for replay.
//!
//! # Failure Policy
//!
//! A write failure of the destination is fatal for the recorder but not for
//! the automation it observes: the writer latches a failed flag, reports
//! once through `tracing`, and drops every subsequent record. No retry, no
//! buffering.

// ============================================================================
// Imports
// ============================================================================

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::{debug, error, trace};

use crate::error::{Error, Result};

use super::event::EventRecord;

// ============================================================================
// Constants
// ============================================================================

/// File suffix identifying a line-delimited session log.
pub const LOG_SUFFIX: &str = "ldjson";

/// Base of the default destination name.
const DEFAULT_BASE: &str = "session-events";

/// Timestamp layout for the default destination name (filesystem-safe).
const FILE_STAMP: &str = "%Y-%m-%dT%H-%M-%S%.3fZ";

// ============================================================================
// LogWriter
// ============================================================================

/// Append-only sink for [`EventRecord`]s.
///
/// Cheap to clone; all clones share one destination. Physical writes are
/// funneled through a single mutex so records from concurrently settling
/// actions land as whole lines.
#[derive(Clone)]
pub struct LogWriter {
    inner: Arc<WriterInner>,
}

struct WriterInner {
    /// Destination path, fixed at creation.
    path: PathBuf,
    /// Buffered destination, flushed per record.
    file: Mutex<BufWriter<File>>,
    /// Latched on the first write failure.
    failed: AtomicBool,
}

impl std::fmt::Debug for LogWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogWriter")
            .field("path", &self.inner.path)
            .field("failed", &self.is_failed())
            .finish_non_exhaustive()
    }
}

impl LogWriter {
    /// Creates the destination file and returns a writer over it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LogDestination`] if the file cannot be created.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = File::create(&path).map_err(|e| Error::log_destination(&path, e))?;

        debug!(path = %path.display(), "Session log created");

        Ok(Self {
            inner: Arc::new(WriterInner {
                path,
                file: Mutex::new(BufWriter::new(file)),
                failed: AtomicBool::new(false),
            }),
        })
    }

    /// Builds the default destination path in the current working directory.
    ///
    /// The name carries a creation timestamp:
    /// `session-events-<stamp>.ldjson`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        let stamp = chrono::Utc::now().format(FILE_STAMP);
        PathBuf::from(format!("{DEFAULT_BASE}-{stamp}.{LOG_SUFFIX}"))
    }

    /// Builds a destination path from an explicit base name:
    /// `<name>.ldjson`.
    #[must_use]
    pub fn path_for_base(name: &str) -> PathBuf {
        PathBuf::from(format!("{name}.{LOG_SUFFIX}"))
    }

    /// Returns the destination path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Returns `true` once a write failure has latched the writer.
    #[inline]
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.inner.failed.load(Ordering::Acquire)
    }

    /// Serializes the record to one line and appends it.
    ///
    /// Records appended after the writer has latched are dropped silently.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LogWrite`] on the failing write itself; the caller
    /// is expected to treat this as the end of the observability path, not
    /// of the automation.
    pub fn append(&self, record: &EventRecord) -> Result<()> {
        if self.is_failed() {
            trace!("Record dropped: log writer latched");
            return Ok(());
        }

        // EventRecord payloads are already `Value`s; a serialization error
        // here means the destination contract is unmeetable, not a payload
        // problem.
        let line = serde_json::to_string(record)?;

        let mut file = self.inner.file.lock();
        let written = writeln!(file, "{line}").and_then(|()| file.flush());

        if let Err(e) = written {
            self.inner.failed.store(true, Ordering::Release);
            error!(
                error = %e,
                path = %self.inner.path.display(),
                "Session log write failed; recorder latched"
            );
            return Err(Error::log_write(e.to_string()));
        }

        trace!(direction = ?record.direction, "Record appended");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
