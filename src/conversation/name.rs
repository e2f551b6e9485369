//! Heuristic user-name extraction from free text.

use regex::Regex;
use tracing::debug;

/// Introductions recognised in a lowercased message, checked in order.
const NAME_PATTERNS: &[&str] = &[
    r"\bmy name is (\w+)",
    r"\bi am (\w+)",
    r"\bi'm (\w+)",
    r"\bcall me (\w+)",
    r"\bthis is (\w+)",
];

/// Pulls a first name out of introductions such as "my name is ada".
pub struct NameExtractor {
    patterns: Vec<Regex>,
}

impl NameExtractor {
    /// Compile the introduction patterns.
    ///
    /// # Errors
    /// Returns an error if any regex pattern is invalid.
    pub fn new() -> Result<Self, regex::Error> {
        let patterns = NAME_PATTERNS
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Return the capitalised name from the first matching pattern.
    #[must_use]
    pub fn extract(&self, message: &str) -> Option<String> {
        let lowered = message.to_lowercase();
        let name = self
            .patterns
            .iter()
            .find_map(|pattern| pattern.captures(&lowered))
            .and_then(|captures| captures.get(1))
            .map(|m| capitalize(m.as_str()))?;

        debug!(name = %name, "name extracted");
        Some(name)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_introductions() {
        let extractor = NameExtractor::new().unwrap();
        assert_eq!(extractor.extract("Hi, my name is ada"), Some("Ada".to_string()));
        assert_eq!(extractor.extract("I'm GRACE by the way"), Some("Grace".to_string()));
        assert_eq!(extractor.extract("please call me Bob"), Some("Bob".to_string()));
        assert_eq!(extractor.extract("this is linus"), Some("Linus".to_string()));
    }

    #[test]
    fn test_no_introduction() {
        let extractor = NameExtractor::new().unwrap();
        assert_eq!(extractor.extract("add buy milk to my list"), None);
        assert_eq!(extractor.extract("the ship is huge"), None);
    }

    #[test]
    fn test_pattern_order_wins() {
        let extractor = NameExtractor::new().unwrap();
        assert_eq!(
            extractor.extract("call me al, my name is alan"),
            Some("Alan".to_string())
        );
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("ada"), "Ada");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("élodie"), "Élodie");
    }
}
