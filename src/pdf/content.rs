//! Page content stream handling
//!
//! Content streams are treated as text only for line splitting. Bytes are
//! mapped through Latin-1 (every byte value is exactly one `char`), so any
//! stream survives decode, filter, and encode unchanged apart from the lines
//! that were dropped.

use std::io::Read;

use flate2::read::ZlibDecoder;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use crate::error::{Error, Result};

/// Decode bytes to text, one `char` per byte
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encode text back to bytes, failing on any `char` above U+00FF
pub fn encode_latin1(text: &str) -> Result<Vec<u8>> {
    text.char_indices()
        .map(|(offset, character)| {
            u8::try_from(character).map_err(|_| Error::Unencodable { character, offset })
        })
        .collect()
}

/// Tokens identifying a watermark invocation line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkPattern {
    /// Resource name of the watermark form XObject
    pub name_token: String,
    /// Operator that paints it
    pub operator_token: String,
}

impl Default for WatermarkPattern {
    fn default() -> Self {
        Self {
            name_token: "/Fm0".to_string(),
            operator_token: "Do".to_string(),
        }
    }
}

impl WatermarkPattern {
    /// A line matches when it contains both tokens anywhere
    pub fn matches(&self, line: &str) -> bool {
        line.contains(&self.name_token) && line.contains(&self.operator_token)
    }
}

/// Result of filtering one content stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredContent {
    /// Re-encoded stream bytes with matching lines removed
    pub content: Vec<u8>,
    /// Removed lines, trimmed, in stream order
    pub removed: Vec<String>,
}

/// Drop every line of `content` that matches `pattern`
pub fn filter_content(content: &[u8], pattern: &WatermarkPattern) -> Result<FilteredContent> {
    let text = decode_latin1(content);

    let mut kept = Vec::new();
    let mut removed = Vec::new();
    for line in text.split('\n') {
        if pattern.matches(line) {
            removed.push(line.trim().to_string());
        } else {
            kept.push(line);
        }
    }

    Ok(FilteredContent {
        content: encode_latin1(&kept.join("\n"))?,
        removed,
    })
}

/// How a rewritten content stream is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamEncoding {
    /// Compress through lopdf, which declares `/FlateDecode` only when
    /// compression makes the stream smaller
    #[default]
    Flate,
    /// Store the bytes without a filter
    Raw,
    /// Declare `/FlateDecode` but store the bytes uncompressed.
    ///
    /// Readers that honour the filter will fail to decode such a stream.
    /// Only useful for reproducing output of older tooling.
    TagOnly,
}

/// Build a content stream object holding `content`
pub fn build_content_stream(content: Vec<u8>, encoding: StreamEncoding) -> Result<Stream> {
    let stream = match encoding {
        StreamEncoding::Flate => {
            let mut stream = Stream::new(Dictionary::new(), content);
            stream.compress()?;
            stream
        }
        StreamEncoding::Raw => Stream::new(Dictionary::new(), content),
        StreamEncoding::TagOnly => {
            let mut dict = Dictionary::new();
            dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
            let mut stream = Stream::new(dict, content);
            stream.allows_compression = false;
            stream
        }
    };

    Ok(stream)
}

/// Read and concatenate the decoded content streams of a page
///
/// Returns `None` when the page has no `/Contents` entry or an empty array.
/// With `lenient` set, a stream whose declared filter cannot be decoded
/// contributes its raw bytes instead of failing.
pub fn read_page_content(doc: &Document, page_id: ObjectId, lenient: bool) -> Result<Option<Vec<u8>>> {
    let page = doc.get_dictionary(page_id)?;

    let contents = match page.get(b"Contents") {
        Ok(contents) => contents,
        Err(_) => return Ok(None),
    };

    let stream_ids = match contents {
        Object::Reference(id) => match doc.get_object(*id)? {
            Object::Array(refs) => collect_references(refs)?,
            _ => vec![*id],
        },
        Object::Array(refs) => collect_references(refs)?,
        _ => {
            return Err(Error::InvalidContents(
                "expected a stream reference or an array of stream references".to_string(),
            ))
        }
    };

    if stream_ids.is_empty() {
        return Ok(None);
    }

    let mut content: Vec<u8> = Vec::new();
    for id in stream_ids {
        let stream = doc.get_object(id)?.as_stream()?;
        let data = decode_stream(stream, lenient)?;

        if !content.is_empty() && !content.ends_with(b"\n") {
            content.push(b'\n');
        }
        content.extend_from_slice(&data);
    }

    debug!(?page_id, bytes = content.len(), "read page content");
    Ok(Some(content))
}

fn collect_references(refs: &[Object]) -> Result<Vec<ObjectId>> {
    refs.iter()
        .map(|obj| {
            obj.as_reference()
                .map_err(|_| Error::InvalidContents("non-reference entry in /Contents array".to_string()))
        })
        .collect()
}

fn decode_stream(stream: &Stream, lenient: bool) -> Result<Vec<u8>> {
    let decoded = match stream.dict.get(b"Filter") {
        Err(_) => return Ok(stream.content.clone()),
        // lopdf tolerates corrupt zlib data, so plain flate is inflated here
        // to surface the error
        Ok(Object::Name(name)) if name == b"FlateDecode" && !stream.dict.has(b"DecodeParms") => {
            inflate(&stream.content)
        }
        Ok(_) => stream.decompressed_content().map_err(Error::from),
    };

    match decoded {
        Ok(data) => Ok(data),
        Err(_) if lenient => Ok(stream.content.clone()),
        Err(e) => Err(e),
    }
}

fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(data.len() * 2);
    ZlibDecoder::new(data).read_to_end(&mut output)?;
    Ok(output)
}
