//! PDF watermark removal module

pub mod precheck;
pub mod passthrough;
pub mod content;
pub mod strip;
pub mod inspect;

// Re-export commonly used items
pub use precheck::{check_pdf, is_likely_valid_pdf, PrecheckOptions, Rejection};
pub use passthrough::pass_through;
pub use content::{filter_content, FilteredContent, StreamEncoding, WatermarkPattern};
pub use strip::{
    strip_watermark, strip_watermark_with, CleanReport, Outcome, PageOutcome, PassthroughReason,
    StripOptions,
};
pub use inspect::{count_pages, page_content};
