//! Optional sentiment tagging appended to translated text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SentimentConfig;
use crate::error::{Result, VaaniError};

pub const POSITIVE_EMOJI: &str = "😊";
pub const NEGATIVE_EMOJI: &str = "😞";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentLabel {
    Positive,
    Negative,
}

#[derive(Debug, Clone)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub confidence: f64,
}

/// External binary sentiment classification capability.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Sentiment>;
}

#[derive(Debug, Clone, Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct ClassifyResponse {
    label: String,
    #[serde(default)]
    confidence: f64,
}

/// HTTP classifier returning {label: "POSITIVE"|"NEGATIVE", confidence}.
pub struct HttpSentimentClassifier {
    client: Client,
    config: SentimentConfig,
}

impl HttpSentimentClassifier {
    pub fn new(config: SentimentConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VaaniError::Sentiment(format!("HTTP client creation failed: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl SentimentClassifier for HttpSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<Sentiment> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&ClassifyRequest { text })
            .send()
            .await
            .map_err(|e| VaaniError::Sentiment(format!("Classification request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(VaaniError::Sentiment(format!(
                "Classifier error: {}",
                response.status()
            )));
        }

        let body: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| VaaniError::Sentiment(format!("Failed to parse classifier response: {}", e)))?;

        let label = match body.label.to_uppercase().as_str() {
            "POSITIVE" => SentimentLabel::Positive,
            "NEGATIVE" => SentimentLabel::Negative,
            other => {
                return Err(VaaniError::Sentiment(format!(
                    "Unexpected sentiment label: {}",
                    other
                )))
            }
        };

        debug!("Sentiment: {:?} ({:.2})", label, body.confidence);
        Ok(Sentiment {
            label,
            confidence: body.confidence,
        })
    }
}

/// Append the sentiment emoji to `text`. A classifier failure never blocks
/// the pipeline: the text passes through unchanged.
pub async fn annotate(classifier: &dyn SentimentClassifier, text: &str) -> String {
    match classifier.classify(text).await {
        Ok(sentiment) => {
            let emoji = match sentiment.label {
                SentimentLabel::Positive => POSITIVE_EMOJI,
                SentimentLabel::Negative => NEGATIVE_EMOJI,
            };
            format!("{} {}", text, emoji)
        }
        Err(e) => {
            warn!("Sentiment annotation skipped: {}", e);
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClassifier(Option<SentimentLabel>);

    #[async_trait]
    impl SentimentClassifier for FixedClassifier {
        async fn classify(&self, _text: &str) -> Result<Sentiment> {
            match self.0 {
                Some(label) => Ok(Sentiment {
                    label,
                    confidence: 0.99,
                }),
                None => Err(VaaniError::Sentiment("classifier down".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_positive_annotation() {
        let classifier = FixedClassifier(Some(SentimentLabel::Positive));
        assert_eq!(annotate(&classifier, "great news").await, "great news 😊");
    }

    #[tokio::test]
    async fn test_negative_annotation() {
        let classifier = FixedClassifier(Some(SentimentLabel::Negative));
        assert_eq!(annotate(&classifier, "bad news").await, "bad news 😞");
    }

    #[tokio::test]
    async fn test_failure_passes_text_through() {
        let classifier = FixedClassifier(None);
        assert_eq!(annotate(&classifier, "whatever").await, "whatever");
    }
}
