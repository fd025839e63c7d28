use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaaniError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Please provide input.")]
    InputMissing,

    #[error("Speech recognition error: {0}")]
    Recognition(String),

    #[error("Language detection error: {0}")]
    Detection(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("No translation model available for {source_lang} to {target}")]
    TranslationUnavailable { source_lang: String, target: String },

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("Sentiment classification error: {0}")]
    Sentiment(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),
}

pub type Result<T> = std::result::Result<T, VaaniError>;
