//! Language identification via an external detection service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DetectConfig;
use crate::error::{Result, VaaniError};
use crate::languages;

/// Shown when identification itself fails.
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// External language identification capability: free text to an
/// ISO-639-1-like code.
#[async_trait]
pub trait LanguageIdentifier: Send + Sync {
    async fn identify(&self, text: &str) -> Result<String>;
}

#[derive(Debug, Clone, Serialize)]
struct DetectRequest<'a> {
    q: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct DetectCandidate {
    language: String,
    #[serde(default)]
    confidence: f64,
}

/// HTTP detector posting to a LibreTranslate-shaped `/detect` endpoint.
pub struct HttpLanguageIdentifier {
    client: Client,
    config: DetectConfig,
}

impl HttpLanguageIdentifier {
    pub fn new(config: DetectConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VaaniError::Detection(format!("HTTP client creation failed: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl LanguageIdentifier for HttpLanguageIdentifier {
    async fn identify(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&DetectRequest { q: text })
            .send()
            .await
            .map_err(|e| VaaniError::Detection(format!("Detection request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(VaaniError::Detection(format!(
                "Detection service error: {}",
                response.status()
            )));
        }

        let candidates: Vec<DetectCandidate> = response
            .json()
            .await
            .map_err(|e| VaaniError::Detection(format!("Failed to parse detection response: {}", e)))?;

        let best = candidates
            .into_iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .ok_or_else(|| VaaniError::Detection("Empty detection response".to_string()))?;

        debug!(
            "Detected language '{}' (confidence {:.2})",
            best.language, best.confidence
        );
        Ok(best.language)
    }
}

/// Identify the language of `text` and map the code back to a registry
/// display name. No registry match falls back to the raw code; a failed
/// identification falls back to "Unknown". Advisory only: callers decide
/// whether the detected code also drives translation.
pub async fn detect_language_name(identifier: &dyn LanguageIdentifier, text: &str) -> String {
    match identifier.identify(text).await {
        Ok(code) => languages::name_for_code(&code)
            .map(|name| name.to_string())
            .unwrap_or(code),
        Err(e) => {
            warn!("Language detection failed: {}", e);
            UNKNOWN_LANGUAGE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedIdentifier(Result<String>);

    #[async_trait]
    impl LanguageIdentifier for FixedIdentifier {
        async fn identify(&self, _text: &str) -> Result<String> {
            match &self.0 {
                Ok(code) => Ok(code.clone()),
                Err(_) => Err(VaaniError::Detection("service down".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_known_code_maps_to_registry_name() {
        let identifier = FixedIdentifier(Ok("es".to_string()));
        assert_eq!(detect_language_name(&identifier, "hola").await, "Spanish");
    }

    #[tokio::test]
    async fn test_unregistered_code_returned_raw() {
        let identifier = FixedIdentifier(Ok("eo".to_string()));
        assert_eq!(detect_language_name(&identifier, "saluton").await, "eo");
    }

    #[tokio::test]
    async fn test_detection_failure_returns_unknown() {
        let identifier = FixedIdentifier(Err(VaaniError::Detection("down".to_string())));
        assert_eq!(detect_language_name(&identifier, "hmm").await, UNKNOWN_LANGUAGE);
    }
}
