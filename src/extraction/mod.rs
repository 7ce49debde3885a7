//! PDF extraction stage.
//!
//! Turns a directory of PDFs into page records (text + detected tables) and
//! reads/writes the page-records JSON shared by the later stages.

pub mod cleaner;
pub mod pdf;
pub mod tables;

pub use cleaner::HeaderFilter;
pub use pdf::extract_pdf;
pub use tables::detect_tables;

use crate::types::{AppError, PageRecord, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// `*.pdf` files directly inside `dir`, sorted by file name.
pub fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AppError::NotFound(format!(
            "PDF directory not found: {}",
            dir.display()
        )));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(".pdf"))
        })
        .collect();
    files.sort();

    Ok(files)
}

/// Extract every PDF in `dir`. Files are processed in file-name order; a
/// file that fails to open aborts the run.
pub fn extract_directory(dir: &Path, filter: &HeaderFilter) -> Result<Vec<PageRecord>> {
    let mut pages = Vec::new();

    for path in list_pdfs(dir)? {
        info!(file = %path.display(), "Processing PDF");
        let records = extract_pdf(&path, filter)?;
        info!(file = %path.display(), pages = records.len(), "Extracted PDF");
        pages.extend(records);
    }

    Ok(pages)
}

/// [`extract_directory`] on the blocking thread pool.
pub async fn extract_directory_blocking(dir: PathBuf, filter: HeaderFilter) -> Result<Vec<PageRecord>> {
    tokio::task::spawn_blocking(move || extract_directory(&dir, &filter))
        .await
        .map_err(|e| AppError::Internal(format!("Extraction task failed: {}", e)))?
}

/// Write page records as pretty-printed JSON.
pub async fn write_pages(path: &Path, pages: &[PageRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(pages)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Read page records written by [`write_pages`].
pub async fn read_pages(path: &Path) -> Result<Vec<PageRecord>> {
    if !path.exists() {
        return Err(AppError::NotFound(format!(
            "Page records not found: {}",
            path.display()
        )));
    }
    let json = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&json)?)
}
