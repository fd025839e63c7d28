//! Speech-to-text and text-to-speech collaborators.
//!
//! Recognition posts captured audio to an external service. Synthesis goes
//! through one of two backends: a local engine binary that plays audio
//! directly, or a cloud service whose response bytes are kept as a temporary
//! audio file for playback.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::{SpeechConfig, TtsProvider, VoiceConfig};
use crate::error::{Result, VaaniError};

/// Captured audio, written exactly once by a recording task.
#[derive(Debug, Clone, Default)]
pub struct AudioBuffer {
    pub data: Vec<u8>,
}

impl AudioBuffer {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// External speech-to-text capability.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(&self, audio: &AudioBuffer, language_hint: Option<&str>) -> Result<String>;
}

#[derive(Debug, Clone, Deserialize)]
struct RecognizeResponse {
    text: String,
}

/// HTTP recognizer posting raw audio bytes with an optional language hint.
pub struct HttpSpeechRecognizer {
    client: Client,
    endpoint: String,
}

impl HttpSpeechRecognizer {
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| VaaniError::Recognition(format!("HTTP client creation failed: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.stt_endpoint.clone(),
        })
    }
}

#[async_trait]
impl SpeechRecognizer for HttpSpeechRecognizer {
    async fn recognize(&self, audio: &AudioBuffer, language_hint: Option<&str>) -> Result<String> {
        if audio.is_empty() {
            return Err(VaaniError::Recognition("No audio captured".to_string()));
        }

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "audio/wav")
            .body(audio.data.clone());

        if let Some(hint) = language_hint {
            request = request.query(&[("language", hint)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| VaaniError::Recognition(format!("Recognition request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(VaaniError::Recognition(format!(
                "Recognition service error: {}",
                response.status()
            )));
        }

        let body: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| VaaniError::Recognition(format!("Failed to parse recognition response: {}", e)))?;

        let text = body.text.trim().to_string();
        if text.is_empty() {
            return Err(VaaniError::Recognition(
                "Could not understand audio".to_string(),
            ));
        }

        Ok(text)
    }
}

/// Result of one synthesis request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechOutput {
    /// Audio was played directly by a local engine; no artifact remains.
    Played,
    /// A temporary audio file was produced for playback.
    AudioFile(PathBuf),
}

/// A resolved voice: language code plus optional regional accent hint.
#[derive(Debug, Clone)]
pub struct Voice {
    pub language: String,
    pub region: Option<String>,
}

/// Pick a voice by configured name, falling back to the plain language code
/// when the selector is absent or unknown.
pub fn resolve_voice(voices: &[VoiceConfig], selector: Option<&str>, fallback_lang: &str) -> Voice {
    if let Some(name) = selector {
        if let Some(voice) = voices.iter().find(|v| v.name.eq_ignore_ascii_case(name)) {
            return Voice {
                language: voice.language.clone(),
                region: voice.region.clone(),
            };
        }
        debug!("Unknown voice '{}', falling back to target language", name);
    }

    Voice {
        language: fallback_lang.to_string(),
        region: None,
    }
}

/// External text-to-speech capability.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn speak(&self, text: &str, voice: &Voice) -> Result<SpeechOutput>;
}

/// Local engine: shells out to a synthesis binary which plays the audio
/// synchronously. Produces no artifact.
pub struct LocalSynthesizer {
    binary: String,
}

impl LocalSynthesizer {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            binary: config.tts_binary.clone(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for LocalSynthesizer {
    async fn speak(&self, text: &str, voice: &Voice) -> Result<SpeechOutput> {
        info!("Speaking via local engine '{}'", self.binary);

        let output = Command::new(&self.binary)
            .arg("-v")
            .arg(&voice.language)
            .arg(text)
            .output()
            .await
            .map_err(|e| VaaniError::Synthesis(format!("Failed to run {}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VaaniError::Synthesis(format!(
                "{} exited with {}: {}",
                self.binary, output.status, stderr
            )));
        }

        Ok(SpeechOutput::Played)
    }
}

#[derive(Debug, Clone, Serialize)]
struct SynthesizeRequest<'a> {
    text: &'a str,
    language: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<&'a str>,
}

/// Cloud synthesis: response bytes are kept as a temporary .mp3 whose path is
/// returned for playback.
pub struct CloudSynthesizer {
    client: Client,
    endpoint: String,
}

impl CloudSynthesizer {
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| VaaniError::Synthesis(format!("HTTP client creation failed: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.tts_endpoint.clone(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for CloudSynthesizer {
    async fn speak(&self, text: &str, voice: &Voice) -> Result<SpeechOutput> {
        let request = SynthesizeRequest {
            text,
            language: &voice.language,
            region: voice.region.as_deref(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| VaaniError::Synthesis(format!("Synthesis request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(VaaniError::Synthesis(format!(
                "Synthesis service error: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| VaaniError::Synthesis(format!("Failed to read audio bytes: {}", e)))?;

        let mut temp = tempfile::Builder::new()
            .prefix("vaani_tts_")
            .suffix(".mp3")
            .tempfile()
            .map_err(|e| VaaniError::Synthesis(format!("Failed to create temp file: {}", e)))?;

        temp.write_all(&bytes)
            .map_err(|e| VaaniError::Synthesis(format!("Failed to write audio file: {}", e)))?;

        // Keep the file past this call so the caller can play it
        let (_file, path) = temp
            .keep()
            .map_err(|e| VaaniError::Synthesis(format!("Failed to keep audio file: {}", e)))?;

        info!("Saved synthesized audio: {}", path.display());
        Ok(SpeechOutput::AudioFile(path))
    }
}

/// Factory for the configured synthesis backend.
pub fn create_synthesizer(config: &SpeechConfig) -> Result<Box<dyn SpeechSynthesizer>> {
    match config.tts_provider {
        TtsProvider::Local => Ok(Box::new(LocalSynthesizer::new(config))),
        TtsProvider::Cloud => Ok(Box::new(CloudSynthesizer::new(config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voices() -> Vec<VoiceConfig> {
        vec![VoiceConfig {
            name: "Indian English".to_string(),
            language: "en".to_string(),
            region: Some("co.in".to_string()),
        }]
    }

    #[test]
    fn test_resolve_voice_by_name() {
        let voice = resolve_voice(&voices(), Some("indian english"), "es");
        assert_eq!(voice.language, "en");
        assert_eq!(voice.region.as_deref(), Some("co.in"));
    }

    #[test]
    fn test_resolve_voice_falls_back_to_language() {
        let voice = resolve_voice(&voices(), None, "es");
        assert_eq!(voice.language, "es");
        assert!(voice.region.is_none());

        let voice = resolve_voice(&voices(), Some("martian"), "fr");
        assert_eq!(voice.language, "fr");
    }
}
