//! Error types for the watermark stripper

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the watermark stripper
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The fallback copy of the original file could not be written.
    ///
    /// This is the only error the stripper surfaces to its caller.
    #[error("Failed to pass through original PDF {} to {}", .input.display(), .output.display())]
    Passthrough {
        input: PathBuf,
        output: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A character outside the single-byte range reached the encoder
    #[error("Cannot encode {character:?} at offset {offset} as a single byte")]
    Unencodable { character: char, offset: usize },

    /// Page /Contents entry that is neither a stream reference nor an array of them
    #[error("Invalid page contents: {0}")]
    InvalidContents(String),

    /// Requested page does not exist
    #[error("Page {page} out of range (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },

    /// General error
    #[error("{0}")]
    General(String),
}
