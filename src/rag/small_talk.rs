//! Canned replies for greetings and thanks.

use crate::utils::toml_config::SmallTalkConfig;

/// Lower-case and trim a question.
pub fn normalize_question(question: &str) -> String {
    question.trim().to_lowercase()
}

/// Reply for an already normalized question, if it is small talk.
pub fn small_talk_reply<'a>(config: &'a SmallTalkConfig, normalized: &str) -> Option<&'a str> {
    config.responses.get(normalized).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("  Hello ", "hello")]
    #[case("THANK YOU", "thank you")]
    #[case("What is LDAR?\n", "what is ldar?")]
    fn test_normalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_question(input), expected);
    }

    #[test]
    fn test_exact_match_only() {
        let config = SmallTalkConfig::default();
        assert_eq!(
            small_talk_reply(&config, "hi"),
            Some("Hi there! How can I help you with the dataset?")
        );
        assert_eq!(small_talk_reply(&config, "hi there"), None);
        assert_eq!(small_talk_reply(&config, "thank you"), Some("You're welcome!"));
    }
}
