// Integration test utilities and common code
// WHY: Centralized stub classifiers avoid duplication across integration tests
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use threatlens::classifier::{Classifier, ClassifierError, Prediction};

pub const POSITIVE: &str = "LABEL_1";
pub const NEGATIVE: &str = "LABEL_0";

/// Classifier answering from a script and recording every call
///
/// Unscripted inputs classify negative with confidence 0.9.
#[derive(Default)]
pub struct ScriptedClassifier {
    positives: HashMap<String, f64>,
    failures: HashSet<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `text` as phishing with `confidence`
    pub fn positive(mut self, text: &str, confidence: f64) -> Self {
        self.positives.insert(text.to_string(), confidence);
        self
    }

    /// Fail whenever `text` is classified
    pub fn failing(mut self, text: &str) -> Self {
        self.failures.insert(text.to_string());
        self
    }

    /// Sleep before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Inputs seen so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }
}

impl Classifier for ScriptedClassifier {
    fn classify(&self, text: &str) -> Result<Prediction, ClassifierError> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(text.to_string());
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.failures.contains(text) {
            return Err(ClassifierError::Other(format!("scripted failure for {text:?}")));
        }
        match self.positives.get(text) {
            Some(confidence) => Prediction::new(POSITIVE, *confidence),
            None => Prediction::new(NEGATIVE, 0.9),
        }
    }
}
