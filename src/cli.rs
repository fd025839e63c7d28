use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate typed text or an audio file
    Translate {
        /// Text to translate
        #[arg(short, long)]
        text: Option<String>,

        /// Audio file to recognize and translate instead of typed text
        #[arg(short, long)]
        audio: Option<PathBuf>,

        /// Target language name or code
        #[arg(short = 'T', long, default_value = "Hindi")]
        target: String,

        /// Explicit source language name or code (overrides detection)
        #[arg(short, long)]
        source: Option<String>,

        /// How the source language is chosen when --source is absent
        #[arg(long, default_value = "auto")]
        source_mode: String,

        /// Dialect/style applied to the result
        #[arg(short, long, default_value = "standard")]
        dialect: String,

        /// Append a sentiment emoji
        #[arg(long)]
        sentiment: bool,

        /// Speak the translated text
        #[arg(long)]
        speak: bool,

        /// Voice name for synthesis
        #[arg(long)]
        voice: Option<String>,
    },

    /// Detect the language of a piece of text
    Detect {
        /// Text to inspect
        text: String,
    },

    /// Synthesize speech for text
    Speak {
        /// Text to speak
        text: String,

        /// Language name or code for the voice
        #[arg(short, long, default_value = "English")]
        language: String,

        /// Named voice from the configuration
        #[arg(long)]
        voice: Option<String>,
    },

    /// Record from the microphone, then print the recognized text
    Record {
        /// Seconds to record before stopping
        #[arg(short, long, default_value = "5")]
        seconds: u64,

        /// Language hint for recognition
        #[arg(short, long)]
        language: Option<String>,
    },

    /// List supported languages
    Languages,

    /// Interactive session: translate, record, play, history, custom slang
    Session {
        /// Initial target language
        #[arg(short = 'T', long, default_value = "Hindi")]
        target: String,
    },
}
