//! HTTP boundary: request validation, overall verdict and error mapping.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::classifier::{Classifier, ClassifierError};
use crate::config::HighlightConfig;
use crate::highlight::{
    round_to, AbortSignal, Highlight, HighlightDiagnostics, HighlightEngine, HighlightError,
};

const PREDICT_PATH: &str = "/predict";
const HEALTHZ_PATH: &str = "/healthz";
const GENERIC_FAILURE: &str = "Failed to process the request.";
const TIMEOUT_FAILURE: &str = "Request timed out.";
/// Decimal places of the overall confidence
const VERDICT_DECIMALS: u32 = 4;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to determine local address: {source}")]
    LocalAddr {
        #[source]
        source: std::io::Error,
    },
    #[error("axum server error: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

/// Failures of one prediction, before they are mapped to a response
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("overall classification failed: {0}")]
    Classification(#[from] ClassifierError),
    #[error(transparent)]
    Highlight(#[from] HighlightError),
    #[error("request deadline passed before highlighting finished")]
    Aborted,
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Phishing,
    Legitimate,
}

impl Verdict {
    /// Phishing when the oracle label names the phishing class
    pub fn from_label(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("phishing") || label.contains("label_1") {
            Verdict::Phishing
        } else {
            Verdict::Legitimate
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub label: Verdict,
    pub confidence: f64,
    pub explanation: Vec<Highlight>,
    pub highlighted_text: String,
    pub diagnostics: HighlightDiagnostics,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Debug, Serialize)]
struct HealthzResponse {
    status: &'static str,
}

/// Errors as the client sees them; internal causes are logged, never returned
#[derive(Debug)]
pub enum ApiError {
    Invalid { status: StatusCode, detail: String },
    Timeout,
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Invalid { status, detail } => (status, detail),
            ApiError::Timeout => (StatusCode::GATEWAY_TIMEOUT, TIMEOUT_FAILURE.to_string()),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_FAILURE.to_string(),
            ),
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

/// Shared per-process state: the engine and the limits enforced at the boundary
pub struct AppState {
    engine: HighlightEngine<Arc<dyn Classifier>>,
    max_text_length: usize,
    request_timeout: Duration,
}

impl AppState {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        highlight: HighlightConfig,
        max_text_length: usize,
        request_timeout: Duration,
    ) -> Result<Self, HighlightError> {
        Ok(Self {
            engine: HighlightEngine::new(classifier, highlight)?,
            max_text_length,
            request_timeout,
        })
    }

    /// Trim the text and enforce the length bounds
    fn validate<'a>(&self, text: &'a str) -> Result<&'a str, ApiError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ApiError::Invalid {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                detail: "text may not be empty".to_string(),
            });
        }
        if trimmed.chars().count() > self.max_text_length {
            return Err(ApiError::Invalid {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                detail: format!("text may not exceed {} characters", self.max_text_length),
            });
        }
        Ok(trimmed)
    }

    /// Classify the whole text, then highlight its sentences
    pub fn predict(
        &self,
        text: &str,
        abort: &AbortSignal,
    ) -> Result<PredictionResponse, PredictError> {
        let overall = self.engine.classifier().classify(text)?;
        let result = self.engine.highlight_with_abort(text, abort)?;
        if result.diagnostics.aborted {
            return Err(PredictError::Aborted);
        }

        Ok(PredictionResponse {
            label: Verdict::from_label(&overall.label),
            confidence: round_to(overall.score, VERDICT_DECIMALS),
            explanation: result.highlights,
            highlighted_text: result.highlighted_text,
            diagnostics: result.diagnostics,
        })
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(PREDICT_PATH, post(predict))
        .route(HEALTHZ_PATH, get(healthz))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    Json(HealthzResponse { status: "ok" })
}

async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::Invalid {
        status: rejection.status(),
        detail: rejection.body_text(),
    })?;
    let text = state.validate(&request.text)?.to_string();

    let abort = AbortSignal::with_deadline(Instant::now() + state.request_timeout);
    let started = Instant::now();
    let chars = text.chars().count();

    // WHY: classifier calls block, keep them off the async workers
    let worker_state = Arc::clone(&state);
    let outcome =
        tokio::task::spawn_blocking(move || worker_state.predict(&text, &abort)).await;

    match outcome {
        Ok(Ok(response)) => {
            info!(
                chars,
                verdict = ?response.label,
                highlights = response.explanation.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Prediction served"
            );
            Ok(Json(response))
        }
        Ok(Err(PredictError::Aborted)) => {
            warn!(chars, elapsed_ms = started.elapsed().as_millis() as u64, "Prediction timed out");
            Err(ApiError::Timeout)
        }
        Ok(Err(e)) => {
            error!(error = %e, "Prediction error");
            Err(ApiError::Internal)
        }
        Err(e) => {
            error!(error = %e, "Prediction task failed");
            Err(ApiError::Internal)
        }
    }
}

/// Serve until Ctrl-C or SIGTERM, then drain in-flight requests
pub async fn serve(listen_addr: SocketAddr, state: Arc<AppState>) -> Result<(), ServerError> {
    let listener = TcpListener::bind(listen_addr)
        .await
        .map_err(|source| ServerError::Bind {
            address: listen_addr,
            source,
        })?;
    let local_addr = listener
        .local_addr()
        .map_err(|source| ServerError::LocalAddr { source })?;
    info!(%local_addr, "threatlens listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| ServerError::Serve { source })?;

    info!("Server shutdown complete");
    Ok(())
}

fn shutdown_signal() -> impl Future<Output = ()> + Send + 'static {
    async {
        let ctrl_c = async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                warn!(%error, "failed to capture Ctrl+C signal");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let sigterm = async {
            use tokio::signal::unix::{signal, SignalKind};

            match signal(SignalKind::terminate()) {
                Ok(mut term) => {
                    term.recv().await;
                }
                Err(error) => {
                    warn!(%error, "failed to capture SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let sigterm = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
            _ = sigterm => info!("Received SIGTERM, shutting down"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_from_label() {
        assert_eq!(Verdict::from_label("LABEL_1"), Verdict::Phishing);
        assert_eq!(Verdict::from_label("phishing"), Verdict::Phishing);
        assert_eq!(Verdict::from_label("Phishing Email"), Verdict::Phishing);
        assert_eq!(Verdict::from_label("LABEL_0"), Verdict::Legitimate);
        assert_eq!(Verdict::from_label("safe"), Verdict::Legitimate);
    }

    #[test]
    fn test_verdict_serializes_as_name() {
        assert_eq!(
            serde_json::to_value(Verdict::Legitimate).unwrap(),
            serde_json::json!("Legitimate")
        );
    }
}
