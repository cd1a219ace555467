//! Stage 2: text extraction. One plain-text blob per submitted file,
//! dispatched on the (case-insensitive) file extension. Every reader is
//! independently best-effort: a failure inside one file is recorded in place
//! of its content and never aborts the batch.

use std::io::{Cursor, Read};

use serde::Serialize;
use tracing::debug;

use crate::collect::files::UploadedFile;

/// One extracted document, one-to-one with an uploaded file. Unsupported
/// extensions yield empty content; a failed extraction yields an
/// error-message string in place of content.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub filename: String,
    pub content: String,
}

/// The closed set of formats the extractor understands. Anything else maps
/// to the empty-content default, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Pdf,
    Word,
    Spreadsheet,
    Slides,
    PlainText,
}

impl Format {
    fn from_filename(filename: &str) -> Option<Format> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Format::Pdf),
            "docx" => Some(Format::Word),
            "xlsx" => Some(Format::Spreadsheet),
            "pptx" => Some(Format::Slides),
            "txt" => Some(Format::PlainText),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum ExtractError {
    Pdf(lopdf::Error),
    Workbook(calamine::XlsxError),
    Archive(zip::result::ZipError),
    Markup(quick_xml::Error),
    Io(std::io::Error),
    Encoding(std::string::FromUtf8Error),
    MissingPart(&'static str),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::Pdf(e) => write!(f, "pdf: {e}"),
            ExtractError::Workbook(e) => write!(f, "workbook: {e}"),
            ExtractError::Archive(e) => write!(f, "archive: {e}"),
            ExtractError::Markup(e) => write!(f, "markup: {e}"),
            ExtractError::Io(e) => write!(f, "io: {e}"),
            ExtractError::Encoding(e) => write!(f, "encoding: {e}"),
            ExtractError::MissingPart(part) => write!(f, "missing archive part {part}"),
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<lopdf::Error> for ExtractError {
    fn from(e: lopdf::Error) -> Self {
        ExtractError::Pdf(e)
    }
}

impl From<calamine::XlsxError> for ExtractError {
    fn from(e: calamine::XlsxError) -> Self {
        ExtractError::Workbook(e)
    }
}

impl From<zip::result::ZipError> for ExtractError {
    fn from(e: zip::result::ZipError) -> Self {
        ExtractError::Archive(e)
    }
}

impl From<quick_xml::Error> for ExtractError {
    fn from(e: quick_xml::Error) -> Self {
        ExtractError::Markup(e)
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(e: std::io::Error) -> Self {
        ExtractError::Io(e)
    }
}

impl From<std::string::FromUtf8Error> for ExtractError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        ExtractError::Encoding(e)
    }
}

/// Extract text from every submitted file, in order. Never fails.
pub fn extract_documents(files: &[UploadedFile]) -> Vec<ExtractedDocument> {
    files
        .iter()
        .map(|file| ExtractedDocument {
            filename: file.filename.clone(),
            content: extract_text(&file.filename, &file.bytes),
        })
        .collect()
}

/// Dispatch on the file extension and extract. Unknown extensions yield the
/// empty string; reader errors become an error-message string.
pub fn extract_text(filename: &str, bytes: &[u8]) -> String {
    let format = match Format::from_filename(filename) {
        Some(format) => format,
        None => {
            debug!(filename, "Unsupported extension, yielding empty content");
            return String::new();
        }
    };
    match read_document(format, bytes) {
        Ok(text) => text,
        Err(e) => {
            debug!(filename, error = %e, "Extraction failed for file");
            format!("Error extracting text: {e}")
        }
    }
}

fn read_document(format: Format, bytes: &[u8]) -> Result<String, ExtractError> {
    match format {
        Format::Pdf => read_pdf(bytes),
        Format::Word => read_docx(bytes),
        Format::Spreadsheet => read_xlsx(bytes),
        Format::Slides => read_pptx(bytes),
        Format::PlainText => Ok(String::from_utf8(bytes.to_vec())?),
    }
}

/// Per-page text, skipping pages that yield none (scanned images etc.).
fn read_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let document = lopdf::Document::load_mem(bytes)?;
    let mut pages_text = Vec::new();
    for page_number in document.get_pages().keys() {
        if let Ok(text) = document.extract_text(&[*page_number]) {
            if !text.trim().is_empty() {
                pages_text.push(text);
            }
        }
    }
    Ok(pages_text.join("\n"))
}

/// Non-empty cell values per row, tab-separated; empty rows skipped.
fn read_xlsx(bytes: &[u8]) -> Result<String, ExtractError> {
    use calamine::{Data, Reader, Xlsx};

    let mut workbook = Xlsx::new(Cursor::new(bytes))?;
    let mut rows_text = Vec::new();
    for sheet in workbook.sheet_names().to_owned() {
        let range = workbook.worksheet_range(&sheet)?;
        for row in range.rows() {
            let cells: Vec<String> = row
                .iter()
                .filter(|cell| !matches!(cell, Data::Empty))
                .map(|cell| cell.to_string())
                .filter(|text| !text.is_empty())
                .collect();
            if !cells.is_empty() {
                rows_text.push(cells.join("\t"));
            }
        }
    }
    Ok(rows_text.join("\n"))
}

/// Paragraph text in document order. A DOCX is a zip archive; the body
/// lives in word/document.xml with runs inside w:t elements.
fn read_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let xml = read_archive_part(bytes, "word/document.xml")?;
    collect_xml_text(&xml, b"w:t", b"w:p")
}

/// Every text run across slides in slide order; shapes without text are
/// skipped. A PPTX keeps one XML part per slide under ppt/slides/.
fn read_pptx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut slide_names: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
        .map(str::to_string)
        .collect();
    slide_names.sort_by_key(|name| slide_index(name));

    let mut texts = Vec::new();
    for name in slide_names {
        let mut xml = String::new();
        archive.by_name(&name)?.read_to_string(&mut xml)?;
        let slide_text = collect_xml_text(&xml, b"a:t", b"a:p")?;
        if !slide_text.trim().is_empty() {
            texts.push(slide_text);
        }
    }
    Ok(texts.join("\n"))
}

fn slide_index(name: &str) -> u32 {
    name.trim_start_matches("ppt/slides/slide")
        .trim_end_matches(".xml")
        .parse()
        .unwrap_or(0)
}

fn read_archive_part(bytes: &[u8], part: &'static str) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive
        .by_name(part)
        .map_err(|_| ExtractError::MissingPart(part))?
        .read_to_string(&mut xml)?;
    Ok(xml)
}

/// Pull character data out of `text_tag` elements, breaking a line at the
/// end of each `break_tag` element.
fn collect_xml_text(xml: &str, text_tag: &[u8], break_tag: &[u8]) -> Result<String, ExtractError> {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_reader(xml.as_bytes());
    let mut output = String::new();
    let mut in_text = false;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) if e.name().as_ref() == text_tag => in_text = true,
            Event::End(ref e) if e.name().as_ref() == text_tag => in_text = false,
            Event::End(ref e) if e.name().as_ref() == break_tag => output.push('\n'),
            Event::Text(ref t) if in_text => output.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(output.trim_end_matches('\n').to_string())
}
