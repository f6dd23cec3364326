//! Watermark removal by rewriting page content streams
//!
//! Every page's content stream is decoded, lines invoking the watermark form
//! XObject are dropped, and the result replaces the page's `/Contents`. The
//! XObject definition itself is left in the file; only its invocation goes.
//!
//! Failures never escape as errors. A file that fails the precheck or cannot
//! be parsed is copied to the output unchanged, and a page that cannot be
//! rewritten keeps its original content while the rest of the document is
//! still processed. The one error returned is a failed fallback copy.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::Result;
use crate::pdf::content::{
    build_content_stream, filter_content, read_page_content, StreamEncoding, WatermarkPattern,
};
use crate::pdf::passthrough::pass_through;
use crate::pdf::precheck::{check_pdf, PrecheckOptions, Rejection};

/// Options for watermark removal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StripOptions {
    /// Thresholds for the structural precheck
    pub precheck: PrecheckOptions,
    /// Which lines count as watermark invocations
    pub pattern: WatermarkPattern,
    /// How rewritten content streams are stored
    pub encoding: StreamEncoding,
}

/// Why the input was copied to the output unchanged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassthroughReason {
    /// Failed the structural precheck
    Invalid(Rejection),
    /// The PDF parser rejected the file
    Unreadable(String),
    /// Anything else that went wrong while handling the whole document
    Unexpected(String),
}

impl fmt::Display for PassthroughReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassthroughReason::Invalid(rejection) => {
                write!(f, "input is not a valid/complete PDF ({})", rejection)
            }
            PassthroughReason::Unreadable(msg) => write!(f, "PDF could not be read ({})", msg),
            PassthroughReason::Unexpected(msg) => write!(f, "unexpected error: {}", msg),
        }
    }
}

/// What happened to a single page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Content was rewritten; `removed` may be empty
    Filtered { removed: Vec<String> },
    /// Page has no content stream and was kept as is
    NoContent,
    /// Content could not be rewritten; the original was kept
    Failed { error: String },
}

/// Summary of a successful rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanReport {
    pub output: PathBuf,
    /// One entry per page, in document order
    pub pages: Vec<PageOutcome>,
}

impl CleanReport {
    /// Total number of lines removed across all pages
    pub fn removed_count(&self) -> usize {
        self.pages
            .iter()
            .map(|p| match p {
                PageOutcome::Filtered { removed } => removed.len(),
                _ => 0,
            })
            .sum()
    }

    /// 1-based numbers of pages that kept their original content due to an error
    pub fn failed_pages(&self) -> Vec<usize> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, p)| matches!(p, PageOutcome::Failed { .. }))
            .map(|(i, _)| i + 1)
            .collect()
    }
}

/// Result of a watermark removal run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The rewritten document was written to the output path
    Cleaned(CleanReport),
    /// The input was copied to the output path unchanged
    PassedThrough(PassthroughReason),
}

impl Outcome {
    pub fn is_cleaned(&self) -> bool {
        matches!(self, Outcome::Cleaned(_))
    }

    pub fn is_passed_through(&self) -> bool {
        matches!(self, Outcome::PassedThrough(_))
    }
}

/// Document-level failure that triggers a whole-file passthrough
enum DocumentFailure {
    Unreadable(String),
    Unexpected(String),
}

/// Remove watermark invocations from `input_path`, writing to `output_path`
///
/// Uses default options and reports through `tracing`.
///
/// # Example
///
/// ```no_run
/// use pdf_unwatermark::pdf::{strip_watermark, Outcome};
/// use std::path::Path;
///
/// match strip_watermark(Path::new("input.pdf"), Path::new("output.pdf")) {
///     Ok(Outcome::Cleaned(report)) => println!("removed {} lines", report.removed_count()),
///     Ok(Outcome::PassedThrough(reason)) => println!("copied unchanged: {}", reason),
///     Err(e) => eprintln!("could not write output: {}", e),
/// }
/// ```
pub fn strip_watermark(input_path: &Path, output_path: &Path) -> Result<Outcome> {
    strip_watermark_with(input_path, output_path, &StripOptions::default(), &TracingSink)
}

/// Remove watermark invocations with explicit options and diagnostic sink
///
/// Returns `Err` only when the fallback copy fails. Input and output must
/// not be the same file.
///
/// A panic inside lopdf is contained and turned into a passthrough, but the
/// process panic hook still runs first, so the default hook prints the
/// panic message to stderr.
pub fn strip_watermark_with(
    input_path: &Path,
    output_path: &Path,
    options: &StripOptions,
    sink: &dyn DiagnosticSink,
) -> Result<Outcome> {
    if let Err(rejection) = check_pdf(input_path, &options.precheck) {
        let reason = pass_through(input_path, output_path, PassthroughReason::Invalid(rejection), sink)?;
        return Ok(Outcome::PassedThrough(reason));
    }

    // lopdf can panic on hostile input; treat that like any other document failure
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
        rewrite_document(input_path, output_path, options, sink)
    }));

    let reason = match attempt {
        Ok(Ok(report)) => {
            sink.emit(&Diagnostic::Cleaned {
                output: output_path.to_path_buf(),
                pages: report.pages.len(),
                removed: report.removed_count(),
            });
            return Ok(Outcome::Cleaned(report));
        }
        Ok(Err(DocumentFailure::Unreadable(msg))) => PassthroughReason::Unreadable(msg),
        Ok(Err(DocumentFailure::Unexpected(msg))) => PassthroughReason::Unexpected(msg),
        Err(payload) => PassthroughReason::Unexpected(panic_message(payload.as_ref())),
    };

    let reason = pass_through(input_path, output_path, reason, sink)?;
    Ok(Outcome::PassedThrough(reason))
}

fn rewrite_document(
    input_path: &Path,
    output_path: &Path,
    options: &StripOptions,
    sink: &dyn DiagnosticSink,
) -> std::result::Result<CleanReport, DocumentFailure> {
    let mut doc = Document::load(input_path).map_err(|e| DocumentFailure::Unreadable(e.to_string()))?;

    let pages: Vec<(u32, ObjectId)> = doc.get_pages().into_iter().collect();
    debug!(pages = pages.len(), path = %input_path.display(), "PDF loaded");

    let mut outcomes = Vec::with_capacity(pages.len());
    for (page_number, page_id) in pages {
        let page = page_number as usize;

        let outcome = match rewrite_page(&mut doc, page_id, options) {
            Ok(Some(removed)) => {
                for line in &removed {
                    sink.emit(&Diagnostic::WatermarkRemoved { page, line: line.clone() });
                }
                PageOutcome::Filtered { removed }
            }
            Ok(None) => PageOutcome::NoContent,
            Err(e) => {
                let error = e.to_string();
                sink.emit(&Diagnostic::PageFailed { page, error: error.clone() });
                PageOutcome::Failed { error }
            }
        };
        outcomes.push(outcome);
    }

    // Replaced content streams still hold the watermark invocation
    let pruned = doc.prune_objects();
    debug!(pruned = pruned.len(), "dropped unreferenced objects");
    doc.save(output_path)
        .map_err(|e| DocumentFailure::Unexpected(format!("failed to save {}: {}", output_path.display(), e)))?;

    Ok(CleanReport {
        output: output_path.to_path_buf(),
        pages: outcomes,
    })
}

/// Rewrite one page's content, returning the removed lines
///
/// The page dictionary is only touched once the new stream is built, so an
/// error leaves the page exactly as it was.
fn rewrite_page(doc: &mut Document, page_id: ObjectId, options: &StripOptions) -> Result<Option<Vec<String>>> {
    let content = match read_page_content(doc, page_id, false)? {
        Some(content) => content,
        None => return Ok(None),
    };

    let filtered = filter_content(&content, &options.pattern)?;
    let stream = build_content_stream(filtered.content, options.encoding)?;
    let stream_id = doc.add_object(stream);

    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)?
        .set("Contents", Object::Reference(stream_id));

    Ok(Some(filtered.removed))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("PDF parser panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("PDF parser panicked: {}", msg)
    } else {
        "PDF parser panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingSink;
    use lopdf::{Dictionary, Stream};
    use tempfile::TempDir;

    fn page_with_content(doc: &mut Document, content: &[u8]) -> ObjectId {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.to_vec()));
        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Contents", Object::Reference(content_id));
        doc.add_object(Object::Dictionary(page))
    }

    #[test]
    fn test_rewrite_page_replaces_contents() {
        let mut doc = Document::with_version("1.5");
        let page_id = page_with_content(&mut doc, b"q\n/Fm0 Do\nQ");
        let options = StripOptions {
            encoding: StreamEncoding::Raw,
            ..Default::default()
        };

        let removed = rewrite_page(&mut doc, page_id, &options).unwrap();
        assert_eq!(removed, Some(vec!["/Fm0 Do".to_string()]));

        let content = read_page_content(&doc, page_id, false).unwrap().unwrap();
        assert_eq!(content, b"q\nQ".to_vec());
    }

    #[test]
    fn test_rewrite_page_failure_leaves_page_untouched() {
        let mut doc = Document::with_version("1.5");
        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Contents", Object::Reference((999, 0)));
        let page_id = doc.add_object(Object::Dictionary(page));
        let objects_before = doc.objects.len();

        assert!(rewrite_page(&mut doc, page_id, &StripOptions::default()).is_err());
        let contents = doc.get_dictionary(page_id).unwrap().get(b"Contents").unwrap();
        assert_eq!(contents.as_reference().unwrap(), (999, 0));
        assert_eq!(doc.objects.len(), objects_before);
    }

    #[test]
    fn test_rewrite_page_without_contents() {
        let mut doc = Document::with_version("1.5");
        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        let page_id = doc.add_object(Object::Dictionary(page));

        assert_eq!(rewrite_page(&mut doc, page_id, &StripOptions::default()).unwrap(), None);
    }

    #[test]
    fn test_small_file_is_passed_through() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("small.pdf");
        let output = dir.path().join("out.pdf");
        std::fs::write(&input, vec![b'a'; 2048]).unwrap();

        let sink = RecordingSink::new();
        let outcome = strip_watermark_with(&input, &output, &StripOptions::default(), &sink).unwrap();

        assert!(outcome.is_passed_through());
        assert_eq!(std::fs::read(&output).unwrap(), std::fs::read(&input).unwrap());
        match &sink.diagnostics()[..] {
            [Diagnostic::PassedThrough { reason }] => {
                assert!(reason.to_string().contains("too small"));
            }
            other => panic!("unexpected diagnostics: {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_file_is_passed_through() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("garbage.pdf");
        let output = dir.path().join("out.pdf");
        let mut bytes = b"%PDF-1.4\n".to_vec();
        bytes.extend(std::iter::repeat(b'#').take(6000));
        bytes.extend_from_slice(b"\n%%EOF\n");
        std::fs::write(&input, &bytes).unwrap();

        let sink = RecordingSink::new();
        let outcome = strip_watermark_with(&input, &output, &StripOptions::default(), &sink).unwrap();

        match outcome {
            Outcome::PassedThrough(PassthroughReason::Unreadable(_))
            | Outcome::PassedThrough(PassthroughReason::Unexpected(_)) => {}
            other => panic!("expected document-level passthrough, got {:?}", other),
        }
        assert_eq!(std::fs::read(&output).unwrap(), bytes);
    }

    #[test]
    fn test_report_counts() {
        let report = CleanReport {
            output: PathBuf::from("out.pdf"),
            pages: vec![
                PageOutcome::Filtered { removed: vec!["/Fm0 Do".to_string(), "/Fm0 Do".to_string()] },
                PageOutcome::NoContent,
                PageOutcome::Failed { error: "bad".to_string() },
                PageOutcome::Filtered { removed: vec![] },
            ],
        };
        assert_eq!(report.removed_count(), 2);
        assert_eq!(report.failed_pages(), vec![3]);
    }

    #[test]
    fn test_passthrough_reason_messages() {
        let invalid = PassthroughReason::Invalid(Rejection::BadSignature);
        assert!(invalid.to_string().starts_with("input is not a valid/complete PDF"));
        let unreadable = PassthroughReason::Unreadable("xref".to_string());
        assert_eq!(unreadable.to_string(), "PDF could not be read (xref)");
        let unexpected = PassthroughReason::Unexpected("boom".to_string());
        assert_eq!(unexpected.to_string(), "unexpected error: boom");
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("index out of bounds");
        assert_eq!(panic_message(payload.as_ref()), "PDF parser panicked: index out of bounds");
        let payload: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "PDF parser panicked");
    }
}
