// WHY: Segmenter interface shared by the highlight engine and the bundled detector
// Any segmenter can be plugged in; the bundled one reports byte spans so no re-search is needed

use thiserror::Error;

pub mod abbreviations;
pub mod boundary_detector;
pub mod normalization;

pub use abbreviations::AbbreviationChecker;
pub use boundary_detector::{DetectedSentence, SentenceDetector};
pub use normalization::{normalize_sentence, normalize_sentence_into, NormalizedText};

/// Half-open `[start, end)` range of UTF-8 byte offsets into the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteSpan {
    pub start: usize,
    pub end: usize,
}

impl ByteSpan {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Slice `text` at this span, `None` when out of bounds or off a char boundary
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end)
    }
}

/// A sentence produced by segmentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    /// Position in segmentation order
    pub index: usize,
    pub text: String,
    /// Where the sentence came from, when the segmenter knows
    pub span: Option<ByteSpan>,
}

impl Sentence {
    /// Sentence that must be re-located in the source text
    pub fn unanchored(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            span: None,
        }
    }

    /// Length in Unicode scalar values, the unit sentence limits are expressed in
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Error)]
pub enum SegmentationError {
    #[error("failed to compile sentence boundary pattern: {0}")]
    Pattern(String),
    #[error("segmenter produced a span {start}..{end} outside the {len}-byte input")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },
    #[error("segmentation failed: {0}")]
    Other(String),
}

/// Splits text into an ordered sequence of non-overlapping sentences
pub trait SentenceSegmenter: Send + Sync {
    fn segment(&self, text: &str) -> Result<Vec<Sentence>, SegmentationError>;
}

impl<F> SentenceSegmenter for F
where
    F: Fn(&str) -> Result<Vec<Sentence>, SegmentationError> + Send + Sync,
{
    fn segment(&self, text: &str) -> Result<Vec<Sentence>, SegmentationError> {
        self(text)
    }
}
