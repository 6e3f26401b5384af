// WHY: Locates positively classified sentences in the source text behind a forward-only cursor
// Each strategy is tried in order; a sentence that none of them can place is reported, never silently lost

use tracing::debug;

use crate::sentence_detector::{ByteSpan, NormalizedText, Sentence};

/// How a span was located
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Span reported by the segmenter, verified against the text
    Native,
    /// Verbatim search from the cursor
    Exact,
    /// Whitespace-insensitive search from the cursor
    Normalized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSpan {
    pub span: ByteSpan,
    pub resolution: Resolution,
}

/// Resolves sentence spans left to right, never revisiting consumed text
#[derive(Debug)]
pub struct SpanResolver<'a> {
    text: &'a str,
    cursor: usize,
}

impl<'a> SpanResolver<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, cursor: 0 }
    }

    /// Byte offset before which no further span may start
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Resolve `sentence` at or after the cursor, advancing the cursor past it on success
    pub fn resolve(&mut self, sentence: &Sentence) -> Option<ResolvedSpan> {
        let resolved = self
            .native(sentence)
            .or_else(|| self.exact(&sentence.text))
            .or_else(|| self.normalized(&sentence.text))?;

        debug!(
            index = sentence.index,
            start = resolved.span.start,
            end = resolved.span.end,
            resolution = ?resolved.resolution,
            "Resolved sentence span"
        );
        self.cursor = resolved.span.end;
        Some(resolved)
    }

    fn native(&self, sentence: &Sentence) -> Option<ResolvedSpan> {
        let span = sentence.span?;
        if span.start < self.cursor || span.slice(self.text)? != sentence.text {
            return None;
        }
        Some(ResolvedSpan {
            span,
            resolution: Resolution::Native,
        })
    }

    fn exact(&self, needle: &str) -> Option<ResolvedSpan> {
        if needle.is_empty() {
            return None;
        }
        let offset = self.text[self.cursor..].find(needle)?;
        let start = self.cursor + offset;
        Some(ResolvedSpan {
            span: ByteSpan::new(start, start + needle.len()),
            resolution: Resolution::Exact,
        })
    }

    fn normalized(&self, needle: &str) -> Option<ResolvedSpan> {
        let remainder = NormalizedText::new(&self.text[self.cursor..]);
        let relative = remainder.find(needle)?;
        Some(ResolvedSpan {
            span: ByteSpan::new(self.cursor + relative.start, self.cursor + relative.end),
            resolution: Resolution::Normalized,
        })
    }
}
