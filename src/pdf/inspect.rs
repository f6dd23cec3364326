//! Read-only inspection of PDF files

use std::path::Path;
use lopdf::{Document, Object};
use crate::error::{Error, Result};
use crate::pdf::content::read_page_content;

/// Count pages by reading the Count field from the Pages dictionary
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    let catalog = doc.catalog()?;

    let pages_id = catalog.get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| Error::General("Pages is not a reference".to_string()))?;

    let count = doc.get_dictionary(pages_id)?
        .get(b"Count")
        .map_err(|_| Error::General("No Count in Pages".to_string()))?;

    match count {
        Object::Integer(n) if *n >= 0 => Ok(*n as usize),
        _ => Err(Error::General("Count is not a non-negative integer".to_string())),
    }
}

/// Count the number of pages in a PDF file
///
/// Reads the Count field of the page tree root rather than walking the tree.
pub fn count_pages(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    count_pages_from_catalog(&doc)
}

/// Decoded content of a 1-based page
///
/// A page without content yields an empty buffer. A stream whose declared
/// filter cannot be decoded contributes its raw bytes.
pub fn page_content(path: &Path, page: usize) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    let pages = doc.get_pages();
    let page_id = u32::try_from(page)
        .ok()
        .and_then(|n| pages.get(&n).copied())
        .ok_or(Error::PageOutOfRange { page, count: pages.len() })?;

    Ok(read_page_content(&doc, page_id, true)?.unwrap_or_default())
}
