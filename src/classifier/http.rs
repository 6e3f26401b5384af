// WHY: The model is served by a text-classification inference endpoint, not loaded in-process
// Blocking client because the engine runs synchronously on the blocking thread pool

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Classifier, ClassifierError, Prediction};

/// Connection settings for the inference endpoint
#[derive(Debug, Clone)]
pub struct HttpClassifierConfig {
    /// Full URL the `{"inputs": ...}` payload is POSTed to
    pub endpoint: String,
    /// Per-call timeout, covering connect and read
    pub timeout: Duration,
    /// Optional bearer token for hosted endpoints
    pub bearer_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct RawPrediction {
    label: String,
    score: f64,
}

/// The shapes text-classification servers answer with
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawResponse {
    Single(RawPrediction),
    Flat(Vec<RawPrediction>),
    Nested(Vec<Vec<RawPrediction>>),
}

impl RawResponse {
    /// Reduce any response shape to the top-scoring, validated prediction
    fn into_prediction(self) -> Result<Prediction, ClassifierError> {
        let candidates = match self {
            RawResponse::Single(prediction) => vec![prediction],
            RawResponse::Flat(predictions) => predictions,
            RawResponse::Nested(batches) => batches.into_iter().next().unwrap_or_default(),
        };

        let mut best: Option<RawPrediction> = None;
        for candidate in candidates {
            if candidate.score.is_nan() {
                return Err(ClassifierError::ScoreOutOfRange(candidate.score));
            }
            match &best {
                Some(current) if current.score >= candidate.score => {}
                _ => best = Some(candidate),
            }
        }

        let best = best.ok_or(ClassifierError::Empty)?;
        Prediction::new(best.label, best.score)
    }
}

/// Classifier backed by an HTTP inference endpoint
pub struct HttpClassifier {
    client: reqwest::blocking::Client,
    config: HttpClassifierConfig,
}

impl HttpClassifier {
    pub fn new(config: HttpClassifierConfig) -> Result<Self, ClassifierError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

impl Classifier for HttpClassifier {
    fn classify(&self, text: &str) -> Result<Prediction, ClassifierError> {
        let mut request = self
            .client
            .post(&self.config.endpoint)
            .json(&ClassifyRequest { inputs: text });
        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let bytes = response.bytes()?;
        let prediction = parse_response(&bytes)?;
        debug!(label = %prediction.label, score = prediction.score, "Classifier responded");
        Ok(prediction)
    }
}

/// Decode and validate a raw endpoint response body
pub fn parse_response(body: &[u8]) -> Result<Prediction, ClassifierError> {
    let raw: RawResponse =
        serde_json::from_slice(body).map_err(|e| ClassifierError::Malformed(e.to_string()))?;
    raw.into_prediction()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_object() {
        let prediction = parse_response(br#"{"label": "LABEL_1", "score": 0.93}"#).unwrap();
        assert_eq!(prediction.label, "LABEL_1");
        assert_eq!(prediction.score, 0.93);
    }

    #[test]
    fn test_parse_flat_list_keeps_top_score() {
        let body = br#"[{"label": "LABEL_0", "score": 0.2}, {"label": "LABEL_1", "score": 0.8}]"#;
        assert_eq!(parse_response(body).unwrap().label, "LABEL_1");
    }

    #[test]
    fn test_parse_nested_list() {
        let body = br#"[[{"label": "LABEL_0", "score": 0.7}, {"label": "LABEL_1", "score": 0.3}]]"#;
        let prediction = parse_response(body).unwrap();
        assert_eq!(prediction.label, "LABEL_0");
        assert_eq!(prediction.score, 0.7);
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert!(matches!(parse_response(b"[]"), Err(ClassifierError::Empty)));
        assert!(matches!(parse_response(b"[[]]"), Err(ClassifierError::Empty)));
        assert!(matches!(
            parse_response(br#"{"label": "LABEL_1"}"#),
            Err(ClassifierError::Malformed(_))
        ));
        assert!(matches!(
            parse_response(br#"{"label": "LABEL_1", "score": 3.5}"#),
            Err(ClassifierError::ScoreOutOfRange(_))
        ));
        assert!(matches!(
            parse_response(b"not json"),
            Err(ClassifierError::Malformed(_))
        ));
    }

    #[test]
    fn test_client_builds_without_network() {
        let classifier = HttpClassifier::new(HttpClassifierConfig {
            endpoint: "http://127.0.0.1:9/predict".to_string(),
            timeout: Duration::from_millis(50),
            bearer_token: None,
        })
        .unwrap();
        assert_eq!(classifier.endpoint(), "http://127.0.0.1:9/predict");
    }
}
