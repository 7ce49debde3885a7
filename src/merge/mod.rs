//! Caption merge stage.
//!
//! Attaches externally produced image captions to the page records whose
//! file and page number appear in the image name.

pub mod captions;

pub use captions::{parse_captions, CaptionCatalog, CaptionEntry};

use crate::types::{AppError, ImageEntry, PageRecord, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

/// Counts reported after a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Captions attached to a page
    pub added: usize,
    /// Matching captions dropped as logos
    pub skipped_logos: usize,
    /// Matching captions with an empty summary (still attached)
    pub empty_summaries: usize,
    /// Matching captions already present on the page
    pub duplicates: usize,
    /// Pages no caption matched
    pub pages_without_match: usize,
}

/// Read and parse the captions file at `path`.
pub async fn read_captions(path: &Path) -> Result<CaptionCatalog> {
    if !path.exists() {
        return Err(AppError::NotFound(format!(
            "Captions file not found: {}",
            path.display()
        )));
    }
    let content = tokio::fs::read_to_string(path).await?;
    Ok(parse_captions(&content))
}

/// Prefix an image name must contain to belong to `page`.
pub fn image_prefix(page: &PageRecord) -> String {
    let base = page.file_name.replace(".pdf", "");
    format!("{}_page_{}_", base.trim(), page.page_number)
}

fn is_logo(summary: &str, logo_keywords: &[String]) -> bool {
    let summary = summary.to_lowercase();
    logo_keywords
        .iter()
        .any(|kw| summary.contains(&kw.to_lowercase()))
}

/// Attach matching captions from `catalog` to `pages`.
///
/// For each page every caption whose name contains the page's
/// [`image_prefix`] is considered, in catalog order. Logo captions are
/// skipped and captions already attached are not added twice.
pub fn merge_captions(
    pages: &mut [PageRecord],
    catalog: &CaptionCatalog,
    logo_keywords: &[String],
) -> MergeReport {
    let mut report = MergeReport::default();

    for page in pages.iter_mut() {
        let prefix = image_prefix(page);
        let mut matched = false;

        for entry in catalog.iter() {
            let name = entry.image_name.trim();
            if !name.contains(&prefix) {
                continue;
            }
            matched = true;

            if is_logo(&entry.summary, logo_keywords) {
                debug!(image = name, "Skipping logo caption");
                report.skipped_logos += 1;
                continue;
            }

            if entry.summary.trim().is_empty() {
                warn!(image = name, "No summary found for image");
                report.empty_summaries += 1;
            }

            if page.images.iter().any(|img| img.image_name == name) {
                warn!(image = name, "Skipped duplicate image");
                report.duplicates += 1;
                continue;
            }

            page.images.push(ImageEntry {
                image_name: name.to_string(),
                title: entry.title.clone(),
                summary: entry.summary.clone(),
            });
            report.added += 1;
        }

        if !matched {
            debug!(file = %page.file_name, page = page.page_number, "No images matched");
            report.pages_without_match += 1;
        }
    }

    report
}
