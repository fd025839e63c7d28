use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TranslateConfig;
use crate::error::{Result, VaaniError};
use super::TranslationEngine;

#[derive(Debug, Clone, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Cloud translation client. One endpoint serves every language pair and
/// accepts "auto" as source, so the caller's detected language is advisory.
pub struct RemoteTranslationEngine {
    client: Client,
    config: TranslateConfig,
}

impl RemoteTranslationEngine {
    pub fn new(config: TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VaaniError::Translation(format!("HTTP client creation failed: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl TranslationEngine for RemoteTranslationEngine {
    async fn translate(&self, text: &str, source_code: &str, target_code: &str) -> Result<String> {
        let request = TranslateRequest {
            q: text,
            source: source_code,
            target: target_code,
            format: "text",
            api_key: self.config.api_key.as_deref(),
        };

        debug!(
            "Sending translation request to {} ({} -> {})",
            self.config.cloud_endpoint, source_code, target_code
        );

        let response = self
            .client
            .post(&self.config.cloud_endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| VaaniError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(VaaniError::Translation(format!(
                "Translation API error {}: {}",
                status, error_text
            )));
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| VaaniError::Translation(format!("Failed to parse response: {}", e)))?;

        let translated = body.translated_text.trim().to_string();
        if translated.is_empty() {
            return Err(VaaniError::Translation(
                "Empty translation received".to_string(),
            ));
        }

        Ok(translated)
    }
}
