pub mod classifier;
pub mod config;
pub mod highlight;
pub mod position;
pub mod sentence_detector;
pub mod server;

// Re-export main types for convenient access
pub use classifier::{Classifier, ClassifierError, Prediction};
pub use config::{HighlightConfig, ServiceConfig};
pub use highlight::{
    highlight, AbortSignal, Highlight, HighlightDiagnostics, HighlightEngine, HighlightError,
    HighlightResult, Span,
};
pub use sentence_detector::{Sentence, SentenceDetector, SentenceSegmenter};
