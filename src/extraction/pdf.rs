//! Per-page PDF text extraction with `lopdf`.

use super::cleaner::HeaderFilter;
use super::tables::detect_tables;
use crate::types::{AppError, PageRecord, Result};
use lopdf::Document;
use std::path::Path;
use tracing::{debug, warn};

/// Extract every page of the PDF at `path`.
///
/// Text is cleaned with `filter` and scanned for tables. A page whose text
/// cannot be decoded is kept with empty text.
pub fn extract_pdf(path: &Path, filter: &HeaderFilter) -> Result<Vec<PageRecord>> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::InvalidInput(format!("Not a file path: {}", path.display())))?;

    let doc = Document::load(path)
        .map_err(|e| AppError::Pdf(format!("Failed to open {}: {}", path.display(), e)))?;

    let pages = doc.get_pages();
    let mut records = Vec::with_capacity(pages.len());

    for page_number in pages.keys().copied() {
        let raw = match doc.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                warn!(file = %file_name, page = page_number, error = %e, "Could not decode page text");
                String::new()
            }
        };

        let text = filter.clean(&normalize(&raw));
        let tables = detect_tables(&text);
        debug!(file = %file_name, page = page_number, chars = text.len(), tables = tables.len(), "Extracted page");

        records.push(PageRecord {
            file_name: file_name.clone(),
            page_number,
            text,
            tables,
            images: Vec::new(),
        });
    }

    Ok(records)
}

/// Strip NULs and carriage returns left by some content streams.
fn normalize(raw: &str) -> String {
    raw.replace('\0', "").replace("\r\n", "\n").replace('\r', "\n")
}
