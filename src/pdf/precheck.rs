//! Cheap structural sniff of a file that claims to be a PDF
//!
//! Runs before lopdf ever sees the bytes, so truncated downloads and
//! non-PDF payloads are rejected without a full parse.

use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Signature every PDF header starts with
pub const PDF_SIGNATURE: &[u8] = b"%PDF";

/// Marker that must appear near the end of a complete PDF
pub const EOF_MARKER: &[u8] = b"%%EOF";

/// Thresholds used by the prechecker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecheckOptions {
    /// Files smaller than this many bytes are treated as incomplete
    pub min_size: u64,
    /// How many trailing bytes are searched for the EOF marker
    pub tail_window: u64,
}

impl Default for PrecheckOptions {
    fn default() -> Self {
        Self {
            min_size: 5 * 1024,
            tail_window: 4096,
        }
    }
}

/// Why a file failed the precheck
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Path does not exist
    Missing,
    /// File is below the minimum size
    TooSmall { size: u64, min_size: u64 },
    /// Header does not start with `%PDF`
    BadSignature,
    /// No `%%EOF` in the tail window
    MissingEof,
    /// The file could not be read
    Unreadable(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Missing => write!(f, "file does not exist"),
            Rejection::TooSmall { size, min_size } => write!(
                f,
                "file is {} bytes, too small to be a real PDF (minimum {} bytes)",
                size, min_size
            ),
            Rejection::BadSignature => write!(f, "missing %PDF header signature"),
            Rejection::MissingEof => write!(f, "no %%EOF marker near end of file"),
            Rejection::Unreadable(msg) => write!(f, "file could not be read: {}", msg),
        }
    }
}

/// Check whether `path` is plausibly a complete PDF using default thresholds
pub fn is_likely_valid_pdf(path: &Path) -> bool {
    check_pdf(path, &PrecheckOptions::default()).is_ok()
}

/// Run the structural checks in order, returning the first violation
///
/// I/O failures are reported as [`Rejection::Unreadable`]; nothing here
/// returns an error to the caller.
pub fn check_pdf(path: &Path, options: &PrecheckOptions) -> Result<(), Rejection> {
    if !path.exists() {
        return Err(Rejection::Missing);
    }

    sniff(path, options).unwrap_or_else(|e| Err(Rejection::Unreadable(e.to_string())))
}

fn sniff(path: &Path, options: &PrecheckOptions) -> std::io::Result<Result<(), Rejection>> {
    let mut file = File::open(path)?;
    let size = file.metadata()?.len();

    if size < options.min_size {
        return Ok(Err(Rejection::TooSmall {
            size,
            min_size: options.min_size,
        }));
    }

    let mut header = Vec::with_capacity(8);
    (&mut file).take(8).read_to_end(&mut header)?;
    if !header.starts_with(PDF_SIGNATURE) {
        return Ok(Err(Rejection::BadSignature));
    }

    let tail_start = size.saturating_sub(options.tail_window);
    file.seek(SeekFrom::Start(tail_start))?;
    let mut tail = Vec::new();
    file.read_to_end(&mut tail)?;

    if !contains(&tail, EOF_MARKER) {
        return Ok(Err(Rejection::MissingEof));
    }

    Ok(Ok(()))
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
