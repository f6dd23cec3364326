//! PDF Unwatermark Library
//!
//! Removes invocations of a watermark form XObject from PDF page content
//! streams. This library provides functionality to:
//! - Sniff whether a file is plausibly a complete PDF
//! - Rewrite each page's content stream without the watermark `Do` lines
//! - Fall back to copying the input unchanged when it cannot be processed
//!
//! Matching is textual: a line is dropped when it names the watermark
//! XObject and contains the draw operator. Whether the watermark disappears
//! depends on how it was embedded.
//!
//! # Example
//!
//! ```no_run
//! use pdf_unwatermark::pdf::{strip_watermark_with, StripOptions};
//! use pdf_unwatermark::diagnostics::RecordingSink;
//! use std::path::Path;
//!
//! let sink = RecordingSink::new();
//! let outcome = strip_watermark_with(
//!     Path::new("input.pdf"),
//!     Path::new("output.pdf"),
//!     &StripOptions::default(),
//!     &sink,
//! ).expect("Failed to write output");
//!
//! for diagnostic in sink.diagnostics() {
//!     println!("{}", diagnostic);
//! }
//! println!("{:?}", outcome);
//! ```

pub mod error;
pub mod diagnostics;
pub mod pdf;

// Re-export commonly used items
pub use error::{Error, Result};
pub use diagnostics::{Diagnostic, DiagnosticSink, RecordingSink, TracingSink};
