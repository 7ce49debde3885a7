//! Flattening of page records into indexable text.

use crate::types::{ImageEntry, PageRecord, Table};

/// Render one table as tab-separated rows. `null` cells render empty.
pub fn render_table(table: &Table) -> String {
    table
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.as_deref().unwrap_or(""))
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render an image caption as a single line.
pub fn render_image(image: &ImageEntry) -> String {
    let title = image.title.trim();
    let summary = image.summary.trim();
    match (title.is_empty(), summary.is_empty()) {
        (false, false) => format!("{}: {}", title, summary),
        (false, true) => title.to_string(),
        (true, _) => summary.to_string(),
    }
}

/// Combine a page's text, tables and image captions into one block.
///
/// Returns `None` when the page has no content at all.
pub fn flatten_page(page: &PageRecord) -> Option<String> {
    let mut block = String::new();

    if !page.text.is_empty() {
        block.push_str(&page.text);
        block.push('\n');
    }

    for (i, table) in page.tables.iter().enumerate() {
        block.push_str(&format!(
            "\n[Table {}.{}]\n{}\n",
            page.page_number,
            i + 1,
            render_table(table)
        ));
    }

    if !page.images.is_empty() {
        let summaries = page
            .images
            .iter()
            .map(render_image)
            .collect::<Vec<_>>()
            .join("\n");
        block.push_str("\nImage Summary:\n");
        block.push_str(&summaries);
        block.push('\n');
    }

    let block = block.trim();
    (!block.is_empty()).then(|| block.to_string())
}

/// Flatten every page, dropping empty ones.
pub fn flatten_pages(pages: &[PageRecord]) -> Vec<String> {
    pages.iter().filter_map(flatten_page).collect()
}
