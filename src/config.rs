// WHY: All tunables live in plain structs so the library never reads the environment itself
// The binary fills them from clap (flags or THREATLENS_* variables)

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Default label the classifier uses for the phishing class
pub const DEFAULT_POSITIVE_LABEL: &str = "LABEL_1";
/// Sentences longer than this (in chars) are never classified
pub const DEFAULT_MAX_SENTENCE_LENGTH: usize = 500;
/// Upper bound on request text length (in chars)
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 50_000;
/// Decimal places of confidences in structured output
pub const DEFAULT_CONFIDENCE_DECIMALS: u32 = 4;
/// Decimal places of confidences embedded in markup
pub const DEFAULT_MARKUP_DECIMALS: u32 = 2;

/// Confidence values beyond this many decimals carry no information
const MAX_DECIMALS: u32 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("positive label may not be empty")]
    EmptyPositiveLabel,
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
    #[error("{name} may not exceed {max} decimal places")]
    TooManyDecimals { name: &'static str, max: u32 },
    #[error("classifier URL `{0}` must start with http:// or https://")]
    InvalidClassifierUrl(String),
}

/// Highlight engine options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightConfig {
    /// Label (compared case-insensitively) marking a sentence as phishing
    pub positive_label: String,
    /// Sentences longer than this many chars are skipped
    pub max_sentence_length: usize,
    /// Rounding of `Highlight::confidence`
    pub confidence_decimals: u32,
    /// Rounding of the confidence shown in markup titles
    pub markup_decimals: u32,
    /// Classifier calls in flight per request; 1 classifies strictly in order
    pub classify_workers: usize,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            positive_label: DEFAULT_POSITIVE_LABEL.to_string(),
            max_sentence_length: DEFAULT_MAX_SENTENCE_LENGTH,
            confidence_decimals: DEFAULT_CONFIDENCE_DECIMALS,
            markup_decimals: DEFAULT_MARKUP_DECIMALS,
            classify_workers: 1,
        }
    }
}

impl HighlightConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.positive_label.trim().is_empty() {
            return Err(ConfigError::EmptyPositiveLabel);
        }
        if self.max_sentence_length == 0 {
            return Err(ConfigError::Zero {
                name: "max_sentence_length",
            });
        }
        if self.classify_workers == 0 {
            return Err(ConfigError::Zero {
                name: "classify_workers",
            });
        }
        for (name, decimals) in [
            ("confidence_decimals", self.confidence_decimals),
            ("markup_decimals", self.markup_decimals),
        ] {
            if decimals > MAX_DECIMALS {
                return Err(ConfigError::TooManyDecimals {
                    name,
                    max: MAX_DECIMALS,
                });
            }
        }
        Ok(())
    }
}

/// HTTP service options
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub listen_addr: SocketAddr,
    pub classifier_url: String,
    pub classifier_token: Option<String>,
    pub classifier_timeout: Duration,
    /// Deadline for one `/predict` request; the engine aborts between sentences past it
    pub request_timeout: Duration,
    /// Longest accepted request text, in chars, after trimming
    pub max_text_length: usize,
    pub highlight: HighlightConfig,
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.classifier_url.starts_with("http://")
            || self.classifier_url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidClassifierUrl(
                self.classifier_url.clone(),
            ));
        }
        if self.max_text_length == 0 {
            return Err(ConfigError::Zero {
                name: "max_text_length",
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::Zero {
                name: "request_timeout",
            });
        }
        if self.classifier_timeout.is_zero() {
            return Err(ConfigError::Zero {
                name: "classifier_timeout",
            });
        }
        self.highlight.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_config() -> ServiceConfig {
        ServiceConfig {
            listen_addr: "127.0.0.1:8000".parse().unwrap(),
            classifier_url: "http://127.0.0.1:8080/predict".to_string(),
            classifier_token: None,
            classifier_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            highlight: HighlightConfig::default(),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = HighlightConfig::default();
        assert_eq!(config.positive_label, "LABEL_1");
        assert_eq!(config.max_sentence_length, 500);
        assert_eq!(config.confidence_decimals, 4);
        assert_eq!(config.markup_decimals, 2);
        assert!(config.validate().is_ok());
        assert!(service_config().validate().is_ok());
    }

    #[test]
    fn test_highlight_config_rejects_bad_values() {
        let mut config = HighlightConfig {
            positive_label: "  ".to_string(),
            ..HighlightConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyPositiveLabel));

        config.positive_label = "phishing".to_string();
        config.classify_workers = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::Zero {
                name: "classify_workers"
            })
        );

        config.classify_workers = 4;
        config.markup_decimals = 12;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooManyDecimals { name: "markup_decimals", .. })
        ));
    }

    #[test]
    fn test_service_config_rejects_bad_values() {
        let mut config = service_config();
        config.classifier_url = "ftp://model".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidClassifierUrl(_))
        ));

        let mut config = service_config();
        config.request_timeout = Duration::ZERO;
        assert_eq!(
            config.validate(),
            Err(ConfigError::Zero {
                name: "request_timeout"
            })
        );

        let mut config = service_config();
        config.highlight.max_sentence_length = 0;
        assert!(config.validate().is_err());
    }
}
