// WHY: Centralized abbreviation handling for sentence boundary detection
// Email text is full of "Dr." salutations and "e.g." asides that must not split sentences

use std::collections::HashSet;

/// Title abbreviations that precede a name and never end a sentence
pub const TITLE_ABBREVIATIONS: &[&str] = &[
    "Dr.", "Mr.", "Mrs.", "Ms.", "Prof.", "Sr.", "Jr.", "St.",
];

/// Abbreviations that are almost always followed by more of the same sentence
pub const INLINE_ABBREVIATIONS: &[&str] = &[
    "e.g.", "i.e.", "vs.", "approx.", "Inc.", "Ltd.", "Co.", "No.", "Nr.", "Acct.", "Dept.",
];

/// Quote characters stripped before looking a word up
const QUOTES: &[char] = &['"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}', '(', '['];

/// Efficient abbreviation lookup using HashSet for O(1) performance
pub struct AbbreviationChecker {
    title_abbreviations: HashSet<&'static str>,
    inline_abbreviations: HashSet<String>,
}

impl AbbreviationChecker {
    pub fn new() -> Self {
        Self {
            title_abbreviations: TITLE_ABBREVIATIONS.iter().copied().collect(),
            // WHY: inline abbreviations are matched case-insensitively ("E.g.", "INC.")
            inline_abbreviations: INLINE_ABBREVIATIONS
                .iter()
                .map(|a| a.to_lowercase())
                .collect(),
        }
    }

    /// Check if a word is a title abbreviation (causes false positives with proper nouns)
    pub fn is_title_abbreviation(&self, word: &str) -> bool {
        self.title_abbreviations.contains(word)
    }

    /// Check if a word is an abbreviation that should not split sentences
    pub fn is_abbreviation(&self, word: &str) -> bool {
        self.is_title_abbreviation(word) || self.inline_abbreviations.contains(&word.to_lowercase())
    }

    /// Single capital initial such as the "J." in "J. Smith"
    /// WHY: the pronoun "I." ends far more sentences than it abbreviates names
    pub fn is_initial(&self, word: &str) -> bool {
        let mut chars = word.chars();
        matches!(
            (chars.next(), chars.next(), chars.next()),
            (Some(c), Some('.'), None) if c.is_uppercase() && c != 'I'
        )
    }

    /// Check if text ends with a word whose trailing period is not a sentence end
    /// WHY: examines the last word only, the punctuation run under test is part of it
    pub fn ends_with_abbreviation(&self, text: &str) -> bool {
        match text.split_whitespace().last() {
            Some(last_word) => {
                let clean_word = last_word.trim_start_matches(QUOTES);
                self.is_abbreviation(clean_word) || self.is_initial(clean_word)
            }
            None => false,
        }
    }
}

impl Default for AbbreviationChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    // WHY: Single shared checker instance reduces test overhead
    static SHARED_CHECKER: OnceLock<AbbreviationChecker> = OnceLock::new();

    fn get_checker() -> &'static AbbreviationChecker {
        SHARED_CHECKER.get_or_init(AbbreviationChecker::new)
    }

    #[test]
    fn test_abbreviation_detection() {
        let checker = get_checker();

        for abbr in ["Dr.", "Prof.", "e.g.", "E.G.", "Inc.", "vs."] {
            assert!(checker.is_abbreviation(abbr), "Should detect {abbr} as abbreviation");
        }
        assert!(!checker.is_abbreviation("Hello."));
        assert!(!checker.is_abbreviation("now."));

        assert!(checker.is_title_abbreviation("Mrs."));
        assert!(!checker.is_title_abbreviation("e.g."));
    }

    #[test]
    fn test_initials() {
        let checker = get_checker();
        assert!(checker.is_initial("J."));
        assert!(!checker.is_initial("j."));
        assert!(!checker.is_initial("Jo."));
        assert!(!checker.is_initial("."));
        assert!(!checker.is_initial("I."));
    }

    #[test]
    fn test_ends_with_abbreviation() {
        let checker = get_checker();
        let cases = [
            ("Please contact Dr.", true),
            ("Send documents (e.g.", true),
            ("Signed, J.", true),
            ("Click here now.", false),
            ("", false),
            ("Reply to \"Mr.", true),
        ];
        for (text, expected) in cases {
            assert_eq!(
                checker.ends_with_abbreviation(text),
                expected,
                "ends_with_abbreviation failed for: {text}"
            );
        }
    }
}
