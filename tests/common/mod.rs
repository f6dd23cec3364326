//! Shared helpers for generating test PDFs

#![allow(dead_code)]

use lopdf::{Dictionary, Document, Object, Stream, StringFormat};
use std::path::{Path, PathBuf};

/// Padding added to generated files so they clear the 5 KiB precheck minimum
pub const DEFAULT_PADDING: usize = 6000;

/// Twenty operator lines, the fifth of which paints the watermark
pub fn handout_content() -> Vec<u8> {
    let lines = [
        "q",
        "1 0 0 1 0 0 cm",
        "0.5 g",
        "BT",
        "/Fm0 Do",
        "/F1 12 Tf",
        "72 720 Td",
        "(Bridge Class Handout) Tj",
        "ET",
        "Q",
        "q",
        "0 0 1 RG",
        "72 700 m",
        "540 700 l",
        "S",
        "Q",
        "BT",
        "/F1 10 Tf",
        "(Page footer) Tj",
        "ET",
    ];
    lines.join("\n").into_bytes()
}

/// Build a PDF where each entry of `pages` is one page's raw content stream.
///
/// `None` produces a page without a /Contents entry.
pub fn build_pdf(path: &Path, pages: &[Option<Vec<u8>>], padding: usize) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for content in pages {
        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        );
        if let Some(content) = content {
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content.clone()));
            page.set("Contents", Object::Reference(content_id));
        }
        kids.push(Object::Reference(doc.add_object(Object::Dictionary(page))));
    }

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Count", Object::Integer(kids.len() as i64));
    pages_dict.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    if padding > 0 {
        let mut info = Dictionary::new();
        info.set("Title", Object::String(b"Watermarked handout".to_vec(), StringFormat::Literal));
        info.set("Padding", Object::String(vec![b'x'; padding], StringFormat::Literal));
        let info_id = doc.add_object(Object::Dictionary(info));
        doc.trailer.set("Info", Object::Reference(info_id));
    }

    doc.save(path).expect("Failed to save generated PDF");
}

/// Point the /Contents of 1-based page `page` at an object that does not exist
pub fn break_page_contents(path: &Path, page: u32) {
    let mut doc = Document::load(path).expect("Failed to load generated PDF");
    let page_id = doc.get_pages()[&page];
    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .expect("page dictionary")
        .set("Contents", Object::Reference((9999, 0)));
    doc.save(path).expect("Failed to save generated PDF");
}

/// Split content into lines the same way the stripper does
pub fn lines(content: &[u8]) -> Vec<String> {
    content
        .split(|&b| b == b'\n')
        .map(|line| line.iter().map(|&b| char::from(b)).collect())
        .collect()
}

pub fn path_in(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}
