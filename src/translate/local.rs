use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::TranslateConfig;
use crate::error::{Result, VaaniError};
use super::TranslationEngine;

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    format: String,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResult {
    text: String,
}

/// Local inference client bound to one pretrained model per language pair.
/// The detected source language is authoritative here: it picks the model.
pub struct LocalModelEngine {
    client: Client,
    config: TranslateConfig,
    model: String,
}

impl LocalModelEngine {
    /// Bind an engine to the model serving this (source, target) pair,
    /// e.g. prefix "opus-mt" and en->es resolves to "opus-mt-en-es".
    pub fn for_pair(config: TranslateConfig, source_code: &str, target_code: &str) -> Result<Self> {
        let model = pair_model_name(&config.model_prefix, source_code, target_code);
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VaaniError::Translation(format!("HTTP client creation failed: {}", e)))?;

        info!("Prepared local translation model: {}", model);
        Ok(Self {
            client,
            config,
            model,
        })
    }

    fn build_prompt(&self, text: &str, source_code: &str, target_code: &str) -> String {
        format!(
            "You are a translation model for {} to {}.\n\
             Translate the text and return ONLY JSON as {{\"text\":\"translation\"}}.\n\
             \n\
             Text to translate: \"{}\"\n",
            source_code, target_code, text
        )
    }
}

#[async_trait]
impl TranslationEngine for LocalModelEngine {
    async fn translate(&self, text: &str, source_code: &str, target_code: &str) -> Result<String> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: self.build_prompt(text, source_code, target_code),
            stream: false,
            format: "json".to_string(),
        };

        let url = format!("{}/api/generate", self.config.local_endpoint);
        debug!("Sending translation request to: {} (model {})", url, self.model);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| VaaniError::Translation(format!("HTTP request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(VaaniError::TranslationUnavailable {
                source_lang: source_code.to_string(),
                target: target_code.to_string(),
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(VaaniError::Translation(format!(
                "Inference server error {}: {}",
                status, error_text
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| VaaniError::Translation(format!("Failed to parse response: {}", e)))?;

        let raw = body.response.trim().to_string();
        if raw.is_empty() {
            return Err(VaaniError::Translation(
                "Empty translation received".to_string(),
            ));
        }

        if let Ok(result) = serde_json::from_str::<GenerateResult>(&raw) {
            return Ok(result.text.trim().to_string());
        }

        Ok(raw)
    }
}

/// Model name for one ordered language pair. Regional suffixes are dropped,
/// matching how pair models are published ("zh-CN" -> "zh").
pub fn pair_model_name(prefix: &str, source_code: &str, target_code: &str) -> String {
    let base = |code: &str| {
        code.split('-')
            .next()
            .unwrap_or(code)
            .to_lowercase()
    };
    format!("{}-{}-{}", prefix, base(source_code), base(target_code))
}
