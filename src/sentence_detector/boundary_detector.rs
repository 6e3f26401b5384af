// WHY: Regex-based sentence boundary detection that reports byte spans natively
// Sentences are exact slices of the input, so span resolution never has to re-search for them

use regex_automata::meta::Regex;
use tracing::debug;

use super::{AbbreviationChecker, ByteSpan, SegmentationError, Sentence, SentenceSegmenter};

/// Terminal punctuation run, optional closers, then whitespace
const SOFT_BOUNDARY: &str = r#"[.!?]+["'\u{201D}\u{2019})\]]*\s+"#;
/// Blank line, splits even without terminal punctuation (greetings, signatures)
const HARD_SEPARATOR: &str = r"\r?\n[ \t]*\r?\n\s*";

/// Borrowed sentence pointing into the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedSentence<'a> {
    pub index: usize,
    pub raw: &'a str,
    pub span: ByteSpan,
}

/// Sentence detector combining a boundary regex with an abbreviation guard
pub struct SentenceDetector {
    boundary: Regex,
    abbreviations: AbbreviationChecker,
}

impl SentenceDetector {
    pub fn new() -> Result<Self, SegmentationError> {
        let pattern = format!("(?:{SOFT_BOUNDARY})|(?:{HARD_SEPARATOR})");
        let boundary =
            Regex::new(&pattern).map_err(|e| SegmentationError::Pattern(e.to_string()))?;

        debug!("Compiled sentence boundary pattern: {}", pattern);

        Ok(Self {
            boundary,
            abbreviations: AbbreviationChecker::new(),
        })
    }

    /// Detect sentences without copying them out of `text`
    pub fn detect_sentences_borrowed<'a>(&self, text: &'a str) -> Vec<DetectedSentence<'a>> {
        let mut sentences = Vec::new();
        let mut sentence_start = 0;

        for boundary in self.boundary.find_iter(text) {
            let matched = &text[boundary.start()..boundary.end()];
            // Both alternatives end in whitespace; the sentence stops where it begins
            let terminator_len = matched
                .find(char::is_whitespace)
                .unwrap_or(matched.len());
            let sentence_end = boundary.start() + terminator_len;

            // A blank line swallowed by the soft alternative still splits unconditionally
            let is_hard_separator = terminator_len == 0
                || matched[terminator_len..].matches('\n').count() >= 2;
            if !is_hard_separator
                && self
                    .abbreviations
                    .ends_with_abbreviation(&text[sentence_start..sentence_end])
            {
                continue;
            }

            push_trimmed(text, sentence_start, sentence_end, &mut sentences);
            sentence_start = boundary.end();
        }

        push_trimmed(text, sentence_start, text.len(), &mut sentences);

        debug!("Detected {} sentences in {} bytes", sentences.len(), text.len());
        sentences
    }
}

/// Record `text[start..end]` minus surrounding whitespace, dropping blank slices
fn push_trimmed<'a>(
    text: &'a str,
    start: usize,
    end: usize,
    sentences: &mut Vec<DetectedSentence<'a>>,
) {
    if start >= end {
        return;
    }
    let slice = &text[start..end];
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return;
    }

    let leading = slice.len() - slice.trim_start().len();
    let span = ByteSpan::new(start + leading, start + leading + trimmed.len());

    sentences.push(DetectedSentence {
        index: sentences.len(),
        raw: trimmed,
        span,
    });
}

impl SentenceSegmenter for SentenceDetector {
    fn segment(&self, text: &str) -> Result<Vec<Sentence>, SegmentationError> {
        Ok(self
            .detect_sentences_borrowed(text)
            .into_iter()
            .map(|detected| Sentence {
                index: detected.index,
                text: detected.raw.to_string(),
                span: Some(detected.span),
            })
            .collect())
    }
}
