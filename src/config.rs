use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, VaaniError};

fn default_capture_timeout_secs() -> u64 {
    5
}

fn default_max_phrase_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub detect: DetectConfig,
    pub translate: TranslateConfig,
    pub speech: SpeechConfig,
    pub sentiment: SentimentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectConfig {
    /// Language identification endpoint URL
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Which translation backend to use
    pub provider: TranslationProvider,
    /// Cloud translation API endpoint
    pub cloud_endpoint: String,
    /// Optional API key for the cloud endpoint
    pub api_key: Option<String>,
    /// Local inference server endpoint (per-pair models)
    pub local_endpoint: String,
    /// Model name prefix for per-pair local models, e.g. "opus-mt" resolves
    /// the en->es pair to "opus-mt-en-es"
    pub model_prefix: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TranslationProvider {
    /// Cloud: single remote API, accepts "auto" as source language.
    /// Detected language is advisory (shown, not used for routing).
    Cloud,
    /// Local: one pretrained model per language pair served locally.
    /// Detected language is authoritative for model selection.
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Speech-to-text endpoint URL
    pub stt_endpoint: String,
    /// Which synthesis backend to use
    pub tts_provider: TtsProvider,
    /// Cloud text-to-speech endpoint URL
    pub tts_endpoint: String,
    /// Local synthesis engine binary (spoken directly, no artifact)
    pub tts_binary: String,
    /// Audio capture binary for recording sessions
    pub capture_binary: String,
    /// Seconds to wait for speech before a capture gives up
    #[serde(default = "default_capture_timeout_secs")]
    pub capture_timeout_secs: u64,
    /// Maximum length of one captured phrase
    #[serde(default = "default_max_phrase_secs")]
    pub max_phrase_secs: u64,
    /// Named cloud voices
    pub voices: Vec<VoiceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TtsProvider {
    /// Local engine: plays audio directly, produces no artifact
    Local,
    /// Cloud service: saves a temporary audio file and returns its path
    Cloud,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Selector name shown to the user, e.g. "Indian English"
    pub name: String,
    /// Language code sent to the synthesis service
    pub language: String,
    /// Regional accent hint, e.g. "co.in"
    pub region: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    /// Append a sentiment emoji to translations by default
    pub enabled: bool,
    /// Sentiment classification endpoint URL
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            detect: DetectConfig {
                endpoint: "http://localhost:5000/detect".to_string(),
                timeout_secs: 10,
            },
            translate: TranslateConfig {
                provider: TranslationProvider::Cloud,
                cloud_endpoint: "http://localhost:5000/translate".to_string(),
                api_key: None,
                local_endpoint: "http://localhost:11434".to_string(),
                model_prefix: "opus-mt".to_string(),
                timeout_secs: 60,
            },
            speech: SpeechConfig {
                stt_endpoint: "http://localhost:5001/recognize".to_string(),
                tts_provider: TtsProvider::Local,
                tts_endpoint: "http://localhost:5002/synthesize".to_string(),
                tts_binary: "espeak-ng".to_string(),
                capture_binary: "arecord".to_string(),
                capture_timeout_secs: 5,
                max_phrase_secs: 10,
                voices: vec![
                    VoiceConfig {
                        name: "US English".to_string(),
                        language: "en".to_string(),
                        region: Some("com".to_string()),
                    },
                    VoiceConfig {
                        name: "British English".to_string(),
                        language: "en".to_string(),
                        region: Some("co.uk".to_string()),
                    },
                    VoiceConfig {
                        name: "Indian English".to_string(),
                        language: "en".to_string(),
                        region: Some("co.in".to_string()),
                    },
                ],
            },
            sentiment: SentimentConfig {
                enabled: false,
                endpoint: "http://localhost:5003/classify".to_string(),
                timeout_secs: 10,
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| VaaniError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| VaaniError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| VaaniError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| VaaniError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
