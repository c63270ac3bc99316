//! DOCX text extraction.
//!
//! A `.docx` file is a ZIP package; the body lives in `word/document.xml`. Output is one line
//! per top-level body paragraph (WordprocessingML `body/p`) in document order. Paragraphs
//! inside tables, text boxes or other containers are not top-level and are skipped.

use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, QName, ResolveResult};
use quick_xml::NsReader;
use zip::ZipArchive;

use super::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";
/// Upper bound on the uncompressed main part, checked before reading.
const MAX_DOCUMENT_XML_BYTES: u64 = 64 * 1024 * 1024;
/// Transitional and Strict WordprocessingML namespaces.
const WML_NAMESPACES: [&[u8]; 2] = [
    b"http://schemas.openxmlformats.org/wordprocessingml/2006/main",
    b"http://purl.oclc.org/ooxml/wordprocessingml/main",
];

pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let xml = read_document_xml(bytes)?;
    let paragraphs = body_paragraphs(&xml)?;
    Ok(paragraphs.join("\n"))
}

fn read_document_xml(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::ParseFailure(format!("not a valid DOCX package: {e}")))?;

    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::ParseFailure(format!("{DOCUMENT_PART} missing: {e}")))?;

    if part.size() > MAX_DOCUMENT_XML_BYTES {
        return Err(ExtractionError::ParseFailure(format!(
            "{DOCUMENT_PART} is too large ({} bytes)",
            part.size()
        )));
    }

    let mut xml = String::with_capacity(part.size() as usize);
    part.read_to_string(&mut xml)
        .map_err(|e| ExtractionError::ParseFailure(format!("failed to read {DOCUMENT_PART}: {e}")))?;
    Ok(xml)
}

/// Walks `document.xml` and returns the text of each top-level body paragraph.
///
/// Elements are matched by resolved namespace and local name, so any prefix (or a default
/// namespace) works. Within a paragraph, `t` contributes its text; run-level `tab` gives `\t`,
/// `cr` and text-wrapping `br` give `\n`, page and column breaks give nothing. Tab stops
/// declared in paragraph properties are ignored because their parent is not a run.
fn body_paragraphs(xml: &str) -> Result<Vec<String>, ExtractionError> {
    let mut reader = NsReader::from_str(xml);

    // Local names of open elements; `None` for anything outside WordprocessingML.
    let mut path: Vec<Option<Vec<u8>>> = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    // Depth of `p` elements opened inside the current top-level paragraph.
    let mut nested_paragraphs = 0usize;

    loop {
        let position = reader.buffer_position();
        let event = reader.read_event().map_err(|e| {
            ExtractionError::ParseFailure(format!(
                "malformed {DOCUMENT_PART} near byte {position}: {e}"
            ))
        })?;

        match event {
            Event::Start(e) => {
                let name = wml_name(&reader, e.name());
                if name.as_deref() == Some(b"p".as_slice()) {
                    if current.is_some() {
                        nested_paragraphs += 1;
                    } else if parent_is(&path, b"body") {
                        current = Some(String::new());
                    }
                }
                path.push(name);
            }
            Event::End(e) => {
                path.pop();
                if wml_name(&reader, e.name()).as_deref() == Some(b"p".as_slice()) {
                    if nested_paragraphs > 0 {
                        nested_paragraphs -= 1;
                    } else if let Some(text) = current.take() {
                        paragraphs.push(text);
                    }
                }
            }
            Event::Empty(e) => match wml_name(&reader, e.name()).as_deref() {
                Some(b"p") if current.is_none() && parent_is(&path, b"body") => {
                    paragraphs.push(String::new());
                }
                Some(local) if nested_paragraphs == 0 && parent_is(&path, b"r") => {
                    if let Some(text) = current.as_mut() {
                        text.push_str(run_child_text(local, &e));
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                if nested_paragraphs == 0 && parent_is(&path, b"t") {
                    if let Some(text) = current.as_mut() {
                        let unescaped = t.unescape().map_err(|e| {
                            ExtractionError::ParseFailure(format!(
                                "bad entity in {DOCUMENT_PART}: {e}"
                            ))
                        })?;
                        text.push_str(&unescaped);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// Local name of an element in a WordprocessingML namespace, `None` otherwise.
fn wml_name(reader: &NsReader<&[u8]>, name: QName<'_>) -> Option<Vec<u8>> {
    match reader.resolve_element(name) {
        (ResolveResult::Bound(Namespace(ns)), local)
            if WML_NAMESPACES.iter().any(|wml| *wml == ns) =>
        {
            Some(local.as_ref().to_vec())
        }
        _ => None,
    }
}

/// Text contributed by an empty element directly inside a run.
fn run_child_text(local: &[u8], element: &BytesStart<'_>) -> &'static str {
    match local {
        b"tab" => "\t",
        b"cr" => "\n",
        b"br" if !is_page_or_column_break(element) => "\n",
        _ => "",
    }
}

fn is_page_or_column_break(element: &BytesStart<'_>) -> bool {
    element.attributes().flatten().any(|attr| {
        attr.key.local_name().as_ref() == b"type"
            && matches!(attr.value.as_ref(), b"page" | b"column")
    })
}

fn parent_is(path: &[Option<Vec<u8>>], local: &[u8]) -> bool {
    path.last()
        .and_then(|p| p.as_deref())
        .map(|p| p == local)
        .unwrap_or(false)
}
