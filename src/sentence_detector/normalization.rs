// WHY: standalone normalization logic shared by segmenters and span resolution
// Segmenters may hand back whitespace-normalized sentences; matching them needs the same normalization

use super::ByteSpan;

/// Normalize sentence by removing hard line breaks and collapsing whitespace
pub fn normalize_sentence(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    normalize_sentence_into(text, &mut result);
    result
}

/// Normalize sentence into supplied buffer to avoid allocation
/// WHY: enables buffer reuse when normalizing every sentence of a request
pub fn normalize_sentence_into(text: &str, buffer: &mut String) {
    buffer.clear();
    buffer.reserve(text.len());

    let mut prev_was_space = false;

    // WHY: \r\n, \n, tabs and any other whitespace all collapse to one space
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                buffer.push(' ');
                prev_was_space = true;
            }
        } else {
            buffer.push(ch);
            prev_was_space = false;
        }
    }

    let trimmed = buffer.trim();
    if trimmed.len() != buffer.len() {
        let trimmed_content = trimmed.to_string();
        buffer.clear();
        buffer.push_str(&trimmed_content);
    }
}

/// Whitespace-collapsed copy of a text that remembers where each byte came from
#[derive(Debug, Clone)]
pub struct NormalizedText {
    text: String,
    /// Source byte offset of the char each normalized byte belongs to
    origin: Vec<usize>,
}

impl NormalizedText {
    /// Collapse whitespace runs to a single space, keeping a byte-level offset map
    pub fn new(source: &str) -> Self {
        let mut text = String::with_capacity(source.len());
        let mut origin = Vec::with_capacity(source.len());
        let mut prev_was_space = false;

        for (offset, ch) in source.char_indices() {
            if ch.is_whitespace() {
                if prev_was_space {
                    continue;
                }
                text.push(' ');
                origin.push(offset);
                prev_was_space = true;
            } else {
                text.push(ch);
                origin.extend(std::iter::repeat(offset).take(ch.len_utf8()));
                prev_was_space = false;
            }
        }

        Self { text, origin }
    }

    /// Locate `needle` (normalized on the fly) and map the match back to source offsets
    /// WHY: the match is trimmed first so both ends land on verbatim-copied chars
    pub fn find(&self, needle: &str) -> Option<ByteSpan> {
        let needle = normalize_sentence(needle);
        if needle.is_empty() {
            return None;
        }

        let start = self.text.find(&needle)?;
        let end = start + needle.len();
        let last_char = self.text[start..end].chars().next_back()?;
        let last_start = end - last_char.len_utf8();

        Some(ByteSpan::new(
            self.origin[start],
            self.origin[last_start] + last_char.len_utf8(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sentence_basic() {
        let input = "This is a\nsentence with\r\nline breaks.";
        assert_eq!(normalize_sentence(input), "This is a sentence with line breaks.");
    }

    #[test]
    fn test_normalize_sentence_into_buffer_reuse() {
        let mut buffer = String::new();

        normalize_sentence_into("Line one.\nLine two.", &mut buffer);
        assert_eq!(buffer, "Line one. Line two.");

        normalize_sentence_into("Different\r\ncontent.", &mut buffer);
        assert_eq!(buffer, "Different content.");
    }

    #[test]
    fn test_normalize_sentence_whitespace_collapse() {
        let input = "Multiple\n\n\nspaces\r\n\r\n \there.";
        assert_eq!(normalize_sentence(input), "Multiple spaces here.");
    }

    #[test]
    fn test_normalize_sentence_empty() {
        assert_eq!(normalize_sentence(""), "");
        assert_eq!(normalize_sentence("   "), "");
    }

    #[test]
    fn test_normalized_text_maps_back_to_source() {
        let source = "Dear user,\n\n  Your   account\r\nis locked. Act now.";
        let normalized = NormalizedText::new(source);
        assert_eq!(normalized.text, "Dear user, Your account is locked. Act now.");

        let span = normalized.find("Your account is locked.").unwrap();
        assert_eq!(&source[span.start..span.end], "Your   account\r\nis locked.");
    }

    #[test]
    fn test_normalized_text_multibyte() {
        let source = "Prüfen   Sie\tIhr Konto ✅ sofort.";
        let normalized = NormalizedText::new(source);

        let span = normalized.find("Ihr Konto ✅").unwrap();
        assert_eq!(&source[span.start..span.end], "Ihr Konto ✅");

        let span = normalized.find("Prüfen Sie").unwrap();
        assert_eq!(span.start, 0);
        assert_eq!(&source[span.start..span.end], "Prüfen   Sie");
    }

    #[test]
    fn test_normalized_text_missing_or_blank_needle() {
        let normalized = NormalizedText::new("Nothing to see here.");
        assert!(normalized.find("Verify your account.").is_none());
        assert!(normalized.find("  \n").is_none());
    }
}
