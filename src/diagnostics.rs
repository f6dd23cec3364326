//! Diagnostic reporting
//!
//! The stripper never prints. Everything a user might want to see (removed
//! lines, pages that could not be processed, why a file was passed through)
//! is handed to a [`DiagnosticSink`] supplied by the caller. The default sink
//! forwards to `tracing`; [`RecordingSink`] keeps diagnostics in memory.

use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{info, warn};

use crate::pdf::PassthroughReason;

/// A single user-facing diagnostic
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A watermark invocation line was dropped from a page
    WatermarkRemoved {
        /// 1-based page number
        page: usize,
        /// The dropped line, trimmed
        line: String,
    },
    /// A page's content stream could not be rewritten; the page was kept as is
    PageFailed {
        /// 1-based page number
        page: usize,
        /// Error message
        error: String,
    },
    /// The input was copied to the output unchanged
    PassedThrough { reason: PassthroughReason },
    /// The rewritten document was saved
    Cleaned {
        output: PathBuf,
        pages: usize,
        removed: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::WatermarkRemoved { page, line } => {
                write!(f, "Removed watermark reference on page {}: {}", page, line)
            }
            Diagnostic::PageFailed { page, error } => {
                write!(f, "Could not process content stream for page {}: {}", page, error)
            }
            Diagnostic::PassedThrough { reason } => {
                write!(f, "Skipping watermark removal: {}. Passing through original file.", reason)
            }
            Diagnostic::Cleaned { output, pages, removed } => {
                write!(
                    f,
                    "Created cleaned PDF: {} ({} pages, {} watermark references removed). \
                     Success depends on how the watermark is embedded.",
                    output.display(),
                    pages,
                    removed
                )
            }
        }
    }
}

/// Receiver for diagnostics emitted while processing a file
pub trait DiagnosticSink {
    fn emit(&self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::WatermarkRemoved { page, .. } => {
                info!(page = *page, "{}", diagnostic);
            }
            Diagnostic::PageFailed { page, .. } => {
                warn!(page = *page, "{}", diagnostic);
            }
            Diagnostic::PassedThrough { .. } => {
                warn!("{}", diagnostic);
            }
            Diagnostic::Cleaned { .. } => {
                info!("{}", diagnostic);
            }
        }
    }
}

/// Collects diagnostics in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far, in emission order
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self.diagnostics.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Lines removed from the given 1-based page
    pub fn removed_on_page(&self, page: usize) -> Vec<String> {
        self.diagnostics()
            .into_iter()
            .filter_map(|d| match d {
                Diagnostic::WatermarkRemoved { page: p, line } if p == page => Some(line),
                _ => None,
            })
            .collect()
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        let mut guard = match self.diagnostics.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(diagnostic.clone());
    }
}
