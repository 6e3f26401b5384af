use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use threatlens::classifier::{Classifier, HttpClassifier, HttpClassifierConfig};
use threatlens::config::{
    HighlightConfig, ServiceConfig, DEFAULT_CONFIDENCE_DECIMALS, DEFAULT_MARKUP_DECIMALS,
    DEFAULT_MAX_SENTENCE_LENGTH, DEFAULT_MAX_TEXT_LENGTH, DEFAULT_POSITIVE_LABEL,
};
use threatlens::server::{self, AppState};

#[derive(Parser, Debug)]
#[command(name = "threatlens")]
#[command(about = "Phishing detection service that highlights the sentences behind the verdict")]
#[command(version)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "THREATLENS_LISTEN_ADDR", default_value = "127.0.0.1:8000")]
    listen_addr: SocketAddr,

    /// Text-classification inference endpoint receiving {"inputs": text}
    #[arg(long, env = "THREATLENS_CLASSIFIER_URL")]
    classifier_url: String,

    /// Bearer token sent to the inference endpoint
    #[arg(long, env = "THREATLENS_CLASSIFIER_TOKEN", hide_env_values = true)]
    classifier_token: Option<String>,

    /// Timeout of a single classifier call, in milliseconds
    #[arg(long, env = "THREATLENS_CLASSIFIER_TIMEOUT_MS", default_value_t = 10_000)]
    classifier_timeout_ms: u64,

    /// Deadline of a whole /predict request, in milliseconds
    #[arg(long, env = "THREATLENS_REQUEST_TIMEOUT_MS", default_value_t = 30_000)]
    request_timeout_ms: u64,

    /// Longest accepted request text, in characters
    #[arg(long, env = "THREATLENS_MAX_TEXT_LENGTH", default_value_t = DEFAULT_MAX_TEXT_LENGTH)]
    max_text_length: usize,

    /// Classifier label marking the phishing class
    #[arg(long, env = "THREATLENS_POSITIVE_LABEL", default_value = DEFAULT_POSITIVE_LABEL)]
    positive_label: String,

    /// Sentences longer than this many characters are not classified
    #[arg(long, env = "THREATLENS_MAX_SENTENCE_LENGTH", default_value_t = DEFAULT_MAX_SENTENCE_LENGTH)]
    max_sentence_length: usize,

    /// Decimal places of highlight confidences
    #[arg(long, env = "THREATLENS_CONFIDENCE_DECIMALS", default_value_t = DEFAULT_CONFIDENCE_DECIMALS)]
    confidence_decimals: u32,

    /// Decimal places of confidences shown in markup
    #[arg(long, env = "THREATLENS_MARKUP_DECIMALS", default_value_t = DEFAULT_MARKUP_DECIMALS)]
    markup_decimals: u32,

    /// Concurrent classifier calls per request (0 = one per CPU)
    #[arg(long, env = "THREATLENS_CLASSIFY_WORKERS", default_value_t = 1)]
    classify_workers: usize,
}

impl Args {
    fn into_config(self) -> ServiceConfig {
        let classify_workers = match self.classify_workers {
            0 => num_cpus::get(),
            n => n,
        };
        ServiceConfig {
            listen_addr: self.listen_addr,
            classifier_url: self.classifier_url,
            classifier_token: self.classifier_token,
            classifier_timeout: Duration::from_millis(self.classifier_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            max_text_length: self.max_text_length,
            highlight: HighlightConfig {
                positive_label: self.positive_label,
                max_sentence_length: self.max_sentence_length,
                confidence_decimals: self.confidence_decimals,
                markup_decimals: self.markup_decimals,
                classify_workers,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // WHY: a missing .env is normal outside development
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_target(false)
        .json()
        .init();

    let args = Args::parse();
    info!(
        listen_addr = %args.listen_addr,
        classifier_url = %args.classifier_url,
        max_text_length = args.max_text_length,
        max_sentence_length = args.max_sentence_length,
        classify_workers = args.classify_workers,
        "Parsed CLI arguments"
    );

    let config = args.into_config();
    config.validate().context("invalid configuration")?;

    let classifier_config = HttpClassifierConfig {
        endpoint: config.classifier_url.clone(),
        timeout: config.classifier_timeout,
        bearer_token: config.classifier_token.clone(),
    };
    // WHY: the blocking client owns an internal runtime and must be built off the async workers
    let classifier = tokio::task::spawn_blocking(move || HttpClassifier::new(classifier_config))
        .await
        .context("classifier setup task failed")?
        .context("failed to build classifier client")?;
    info!(endpoint = classifier.endpoint(), "Classifier client ready");

    let classifier: Arc<dyn Classifier> = Arc::new(classifier);
    let state = AppState::new(
        classifier,
        config.highlight.clone(),
        config.max_text_length,
        config.request_timeout,
    )
    .context("failed to build highlight engine")?;

    server::serve(config.listen_addr, Arc::new(state)).await?;
    Ok(())
}
