//! Parsing of the image captions file.
//!
//! The file is a sequence of blank-line separated entries:
//!
//! ```text
//! report_page_3_img_1.png:
//! Methane sources. Breakdown by segment
//! The chart shows that production accounts for ...
//! ```
//!
//! The first line after the name holds the title (cut at the first `.`);
//! the remaining lines form the summary.

use std::collections::HashMap;

/// One parsed caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionEntry {
    pub image_name: String,
    pub title: String,
    pub summary: String,
}

/// Captions keyed by image name, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct CaptionCatalog {
    entries: Vec<CaptionEntry>,
    positions: HashMap<String, usize>,
}

impl CaptionCatalog {
    /// Add an entry. A later entry with the same name replaces the earlier
    /// one in place.
    pub fn insert(&mut self, entry: CaptionEntry) {
        match self.positions.get(&entry.image_name) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.positions
                    .insert(entry.image_name.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CaptionEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse captions file content. Entries without a `name:` line are ignored.
pub fn parse_captions(content: &str) -> CaptionCatalog {
    let content = content.replace("\r\n", "\n");
    let mut catalog = CaptionCatalog::default();

    for entry in content.trim().split("\n\n") {
        let Some((name, rest)) = entry.split_once(":\n") else {
            continue;
        };

        let lines: Vec<&str> = rest.trim().split('\n').collect();
        let title = lines
            .first()
            .map(|line| line.trim().split('.').next().unwrap_or_default())
            .unwrap_or_default()
            .to_string();
        let summary = lines
            .get(1..)
            .map(|rest| rest.join("\n"))
            .unwrap_or_default()
            .trim()
            .to_string();

        catalog.insert(CaptionEntry {
            image_name: name.trim().to_string(),
            title,
            summary,
        });
    }

    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
report_page_1_img_1.png:
Emission sources. Segment breakdown
Production accounts for most emissions.
Processing follows.

report_page_2_img_1.png:
Logo

report_page_3_img_1.png:
Title only. With detail

no colon newline here
";

    fn entry<'a>(catalog: &'a CaptionCatalog, name: &str) -> &'a CaptionEntry {
        catalog.iter().find(|e| e.image_name == name).unwrap()
    }

    #[test]
    fn test_parse_entries() {
        let catalog = parse_captions(SAMPLE);
        assert_eq!(catalog.len(), 3);

        let first = entry(&catalog, "report_page_1_img_1.png");
        assert_eq!(first.title, "Emission sources");
        assert_eq!(
            first.summary,
            "Production accounts for most emissions.\nProcessing follows."
        );
    }

    #[test]
    fn test_title_only_entry_has_empty_summary() {
        let catalog = parse_captions(SAMPLE);
        let logo = entry(&catalog, "report_page_2_img_1.png");
        assert_eq!(logo.title, "Logo");
        assert_eq!(logo.summary, "");
    }

    #[test]
    fn test_entries_without_separator_are_ignored() {
        let catalog = parse_captions("just text\n\nmore text");
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_duplicate_name_replaces_in_place() {
        let content = "a.png:\nOld\nold summary\n\nb.png:\nB\nb\n\na.png:\nNew\nnew summary";
        let catalog = parse_captions(content);

        let names: Vec<&str> = catalog.iter().map(|e| e.image_name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
        assert_eq!(entry(&catalog, "a.png").summary, "new summary");
    }

    #[test]
    fn test_crlf_input() {
        let catalog = parse_captions("x.png:\r\nT. t\r\nsummary\r\n\r\ny.png:\r\nU\r\ns");
        assert_eq!(catalog.len(), 2);
        assert_eq!(entry(&catalog, "x.png").title, "T");
    }
}
