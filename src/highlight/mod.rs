//! Highlight engine: finds the sentences behind a phishing verdict.
//!
//! The text is segmented, every sentence short enough is scored by the
//! injected [`Classifier`], positive sentences are located in the source text
//! behind a forward-only cursor, and `<mark>` elements are spliced around
//! them. Offsets handed back to callers are in chars (Unicode scalar values).

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::classifier::{Classifier, ClassifierError, Prediction};
use crate::config::{ConfigError, HighlightConfig};
use crate::position::{BytePos, PositionError, PositionTracker};
use crate::sentence_detector::{
    ByteSpan, SegmentationError, Sentence, SentenceDetector, SentenceSegmenter,
};

pub mod abort;
pub mod markup;
pub mod span_resolver;

pub use abort::AbortSignal;
pub use markup::{insert_markup, MarkupSpan};
pub use span_resolver::{Resolution, ResolvedSpan, SpanResolver};

/// Half-open `[start, end)` range of char offsets into the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// The chars of `text` covered by this span
    pub fn extract(&self, text: &str) -> String {
        text.chars()
            .skip(self.start)
            .take(self.end.saturating_sub(self.start))
            .collect()
    }
}

/// A sentence paired with its prediction
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSentence {
    pub sentence: Sentence,
    pub prediction: Prediction,
}

/// A positively classified sentence located in the source text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    /// Exact source text at `span`
    pub phrase: String,
    pub confidence: f64,
    #[serde(flatten)]
    pub span: Span,
    #[serde(skip)]
    pub byte_span: ByteSpan,
}

/// Per-request counters describing what the engine skipped or repaired
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HighlightDiagnostics {
    /// Sentences produced by segmentation
    pub sentences: usize,
    /// Sentences skipped for exceeding the length limit
    pub over_length: usize,
    /// Sentences the classifier failed on, treated as non-positive
    pub classification_failures: usize,
    /// Positive sentences that could not be located in the text
    pub unresolved_spans: usize,
    /// Positive sentences located only by whitespace-insensitive matching
    pub fuzzy_resolved: usize,
    /// Classification stopped early on an abort signal
    pub aborted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightResult {
    pub highlighted_text: String,
    /// Ascending by `span.start`
    pub highlights: Vec<Highlight>,
    pub diagnostics: HighlightDiagnostics,
}

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error(transparent)]
    Segmentation(#[from] SegmentationError),
    #[error("invalid highlight configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to convert highlight offsets: {0}")]
    Position(#[from] PositionError),
}

/// Classifier outcome for one sentence; `None` when it never ran
type Outcome = Option<Result<Prediction, ClassifierError>>;

/// Orchestrates segmentation, scoring, span resolution and markup
pub struct HighlightEngine<C, S = SentenceDetector> {
    classifier: C,
    segmenter: S,
    config: HighlightConfig,
}

impl<C: Classifier> HighlightEngine<C, SentenceDetector> {
    /// Engine using the bundled sentence detector
    pub fn new(classifier: C, config: HighlightConfig) -> Result<Self, HighlightError> {
        Self::with_segmenter(classifier, SentenceDetector::new()?, config)
    }
}

impl<C: Classifier, S: SentenceSegmenter> HighlightEngine<C, S> {
    pub fn with_segmenter(
        classifier: C,
        segmenter: S,
        config: HighlightConfig,
    ) -> Result<Self, HighlightError> {
        config.validate()?;
        Ok(Self {
            classifier,
            segmenter,
            config,
        })
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn highlight(&self, text: &str) -> Result<HighlightResult, HighlightError> {
        self.highlight_with_abort(text, &AbortSignal::new())
    }

    /// Highlight `text`, stopping classification once `abort` fires
    ///
    /// An aborted run still returns the highlights found so far, with
    /// `diagnostics.aborted` set.
    pub fn highlight_with_abort(
        &self,
        text: &str,
        abort: &AbortSignal,
    ) -> Result<HighlightResult, HighlightError> {
        let sentences = self.segmenter.segment(text)?;
        let mut diagnostics = HighlightDiagnostics {
            sentences: sentences.len(),
            ..HighlightDiagnostics::default()
        };

        let scored = self.score_sentences(sentences, abort, &mut diagnostics);
        let resolved = self.resolve_spans(text, &scored, &mut diagnostics);
        let highlights = self.build_highlights(text, resolved)?;

        let marks: Vec<MarkupSpan> = highlights
            .iter()
            .map(|h| MarkupSpan {
                span: h.byte_span,
                confidence: h.confidence,
            })
            .collect();
        let highlighted_text = insert_markup(text, &marks, self.config.markup_decimals);

        debug!(
            sentences = diagnostics.sentences,
            highlights = highlights.len(),
            over_length = diagnostics.over_length,
            classification_failures = diagnostics.classification_failures,
            unresolved_spans = diagnostics.unresolved_spans,
            aborted = diagnostics.aborted,
            "Highlighting complete"
        );

        Ok(HighlightResult {
            highlighted_text,
            highlights,
            diagnostics,
        })
    }

    /// Classify every sentence within the length limit, in segmentation order
    fn score_sentences(
        &self,
        sentences: Vec<Sentence>,
        abort: &AbortSignal,
        diagnostics: &mut HighlightDiagnostics,
    ) -> Vec<ScoredSentence> {
        let max_len = self.config.max_sentence_length;
        let (eligible, over_length): (Vec<Sentence>, Vec<Sentence>) = sentences
            .into_iter()
            .partition(|sentence| sentence.char_len() <= max_len);

        for sentence in &over_length {
            debug!(index = sentence.index, max_len, "Skipping over-length sentence");
        }
        diagnostics.over_length = over_length.len();

        let outcomes = if self.config.classify_workers > 1 && eligible.len() > 1 {
            self.classify_parallel(&eligible, abort)
        } else {
            self.classify_sequential(&eligible, abort)
        };

        let mut scored = Vec::with_capacity(eligible.len());
        for (sentence, outcome) in eligible.into_iter().zip(outcomes) {
            match outcome {
                Some(Ok(prediction)) => scored.push(ScoredSentence {
                    sentence,
                    prediction,
                }),
                Some(Err(error)) => {
                    warn!(index = sentence.index, %error, "Classification failed, treating sentence as non-positive");
                    diagnostics.classification_failures += 1;
                }
                None if abort.is_aborted() => {
                    // WHY: later results are dropped so the cursor only ever sees a complete prefix
                    warn!(index = sentence.index, "Highlighting aborted before all sentences were classified");
                    diagnostics.aborted = true;
                    break;
                }
                None => {
                    warn!(index = sentence.index, "Classifier worker exited without a result");
                    diagnostics.classification_failures += 1;
                }
            }
        }
        scored
    }

    fn classify_sequential(&self, sentences: &[Sentence], abort: &AbortSignal) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(sentences.len());
        for sentence in sentences {
            if abort.is_aborted() {
                break;
            }
            outcomes.push(Some(self.classify_one(sentence)));
        }
        outcomes.resize_with(sentences.len(), || None);
        outcomes
    }

    /// A panicking classifier costs only the sentence it was scoring
    fn classify_one(&self, sentence: &Sentence) -> Result<Prediction, ClassifierError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.classifier.classify(&sentence.text)))
            .unwrap_or_else(|payload| {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic payload".to_string());
                Err(ClassifierError::Other(format!("classifier panicked: {reason}")))
            })
    }

    /// Bounded pool of scoped workers pulling sentence indices from a shared counter
    fn classify_parallel(&self, sentences: &[Sentence], abort: &AbortSignal) -> Vec<Outcome> {
        let workers = self.config.classify_workers.min(sentences.len());
        let next = &AtomicUsize::new(0);
        let mut outcomes: Vec<Outcome> = (0..sentences.len()).map(|_| None).collect();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(move || {
                        let mut local = Vec::new();
                        while !abort.is_aborted() {
                            let index = next.fetch_add(1, Ordering::Relaxed);
                            let Some(sentence) = sentences.get(index) else {
                                break;
                            };
                            local.push((index, self.classify_one(sentence)));
                        }
                        local
                    })
                })
                .collect();

            for handle in handles {
                match handle.join() {
                    Ok(local) => {
                        for (index, outcome) in local {
                            outcomes[index] = Some(outcome);
                        }
                    }
                    Err(_) => warn!("Classifier worker panicked"),
                }
            }
        });

        outcomes
    }

    /// Locate positive sentences left to right
    fn resolve_spans(
        &self,
        text: &str,
        scored: &[ScoredSentence],
        diagnostics: &mut HighlightDiagnostics,
    ) -> Vec<(ResolvedSpan, f64)> {
        let mut resolver = SpanResolver::new(text);
        let mut resolved = Vec::new();

        for candidate in scored {
            if !candidate.prediction.has_label(&self.config.positive_label) {
                continue;
            }
            match resolver.resolve(&candidate.sentence) {
                Some(span) => {
                    if span.resolution == Resolution::Normalized {
                        diagnostics.fuzzy_resolved += 1;
                    }
                    resolved.push((span, candidate.prediction.score));
                }
                None => {
                    warn!(
                        index = candidate.sentence.index,
                        cursor = resolver.cursor(),
                        "Positive sentence not found in text, highlight dropped"
                    );
                    diagnostics.unresolved_spans += 1;
                }
            }
        }
        resolved
    }

    fn build_highlights(
        &self,
        text: &str,
        mut resolved: Vec<(ResolvedSpan, f64)>,
    ) -> Result<Vec<Highlight>, HighlightError> {
        resolved.sort_by_key(|(span, _)| span.span.start);

        let mut tracker = PositionTracker::new(text);
        let mut highlights = Vec::with_capacity(resolved.len());
        for (resolved_span, score) in resolved {
            let byte_span = resolved_span.span;
            let start = tracker.advance_to_byte(BytePos(byte_span.start))?;
            let end = tracker.advance_to_byte(BytePos(byte_span.end))?;
            highlights.push(Highlight {
                phrase: text[byte_span.start..byte_span.end].to_string(),
                confidence: round_to(score, self.config.confidence_decimals),
                span: Span {
                    start: start.into(),
                    end: end.into(),
                },
                byte_span,
            });
        }
        Ok(highlights)
    }
}

/// Highlight `text` with default options and the bundled sentence detector
pub fn highlight<C: Classifier>(text: &str, classifier: C) -> Result<HighlightResult, HighlightError> {
    HighlightEngine::new(classifier, HighlightConfig::default())?.highlight(text)
}

/// Round to `decimals` places, ties away from zero on the scaled binary value
///
/// `0.125` is exact in binary and rounds to `0.13`; `2.675` is stored just
/// below the tie and rounds to `2.67`.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
