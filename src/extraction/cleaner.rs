//! Boilerplate line removal.

use crate::utils::toml_config::ExtractionConfig;

/// Drops running headers and footers from extracted page text.
#[derive(Debug, Clone)]
pub struct HeaderFilter {
    line_prefixes: Vec<String>,
    trimmed_prefixes: Vec<String>,
}

impl HeaderFilter {
    /// `line_prefixes` are matched against the raw line, `trimmed_prefixes`
    /// against the line with surrounding whitespace removed.
    pub fn new(line_prefixes: Vec<String>, trimmed_prefixes: Vec<String>) -> Self {
        Self {
            line_prefixes,
            trimmed_prefixes,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(
            config.skip_line_prefixes.clone(),
            config.skip_trimmed_prefixes.clone(),
        )
    }

    /// Whether `line` is a header/footer line.
    pub fn is_boilerplate(&self, line: &str) -> bool {
        let trimmed = line.trim();
        self.line_prefixes.iter().any(|p| line.starts_with(p.as_str()))
            || self
                .trimmed_prefixes
                .iter()
                .any(|p| trimmed.starts_with(p.as_str()))
    }

    /// Remove boilerplate lines. Remaining lines keep their order and are
    /// rejoined with `\n`.
    pub fn clean(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        text.split('\n')
            .filter(|line| !self.is_boilerplate(line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for HeaderFilter {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("CCAC O&G Methane Partnership Technical Guidance Document", true)]
    #[case("CLIMATE & CLEAN AIR COALITION", true)]
    #[case("   Modified: 2017-03-01", true)]
    #[case("Modified: 2017", true)]
    // Line prefixes are matched without trimming
    #[case("  CCAC O&G Methane Partnership", false)]
    #[case("Methane emissions from pneumatic devices", false)]
    #[case("", false)]
    fn test_is_boilerplate(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(HeaderFilter::default().is_boilerplate(line), expected);
    }

    #[test]
    fn test_clean_keeps_order() {
        let text = "CCAC O&G Methane Partnership\nFirst line\n Modified: today\nSecond line";
        assert_eq!(HeaderFilter::default().clean(text), "First line\nSecond line");
    }

    #[test]
    fn test_clean_keeps_blank_lines() {
        let text = "a\n\nb";
        assert_eq!(HeaderFilter::default().clean(text), "a\n\nb");
    }

    #[test]
    fn test_custom_prefixes() {
        let filter = HeaderFilter::new(vec!["Page ".to_string()], vec![]);
        assert_eq!(filter.clean("Page 3 of 9\nBody"), "Body");
    }
}
