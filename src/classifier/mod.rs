//! Classifier oracle: maps one piece of text to a label and a confidence.
//!
//! The engine never reaches for a global model; a [`Classifier`] is handed to
//! it at construction. Raw oracle output is validated once, here, into a
//! [`Prediction`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod http;

pub use http::{HttpClassifier, HttpClassifierConfig};

/// Validated oracle output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    /// Confidence in `[0, 1]`
    pub score: f64,
}

impl Prediction {
    /// Build a prediction, rejecting scores that are not finite or fall outside `[0, 1]`
    pub fn new(label: impl Into<String>, score: f64) -> Result<Self, ClassifierError> {
        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(ClassifierError::ScoreOutOfRange(score));
        }
        Ok(Self {
            label: label.into(),
            score,
        })
    }

    /// Case-insensitive label comparison
    pub fn has_label(&self, label: &str) -> bool {
        self.label.to_lowercase() == label.to_lowercase()
    }
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("classifier returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("classifier returned malformed output: {0}")]
    Malformed(String),
    #[error("classifier returned no predictions")]
    Empty,
    #[error("classifier score {0} is outside [0, 1]")]
    ScoreOutOfRange(f64),
    #[error("classifier failed: {0}")]
    Other(String),
}

/// Text classification oracle, deterministic for a given input and model
pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Prediction, ClassifierError>;
}

/// Adapter turning a closure into a [`Classifier`]
pub struct FnClassifier<F>(F);

/// Wrap a closure as a classifier
pub fn from_fn<F>(f: F) -> FnClassifier<F>
where
    F: Fn(&str) -> Result<Prediction, ClassifierError> + Send + Sync,
{
    FnClassifier(f)
}

impl<F> Classifier for FnClassifier<F>
where
    F: Fn(&str) -> Result<Prediction, ClassifierError> + Send + Sync,
{
    fn classify(&self, text: &str) -> Result<Prediction, ClassifierError> {
        (self.0)(text)
    }
}

impl<C: Classifier + ?Sized> Classifier for Arc<C> {
    fn classify(&self, text: &str) -> Result<Prediction, ClassifierError> {
        (**self).classify(text)
    }
}
