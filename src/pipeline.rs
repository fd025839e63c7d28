//! The translation pipeline: input resolution, language detection,
//! translation, dialect rewriting, sentiment tagging, history, speech.
//!
//! All mutable state (engine cache, slang overrides, history, recording
//! session) lives on the `Pipeline` instance, so tests can run independent
//! instances with injected fakes.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::{Config, VoiceConfig};
use crate::detect::{detect_language_name, HttpLanguageIdentifier, LanguageIdentifier, UNKNOWN_LANGUAGE};
use crate::dialect::{DialectStyle, SlangBook};
use crate::error::{Result, VaaniError};
use crate::history::{HistoryLog, TranslationRecord};
use crate::languages;
use crate::recorder::{CaptureLimits, CliAudioCapture, Recorder};
use crate::sentiment::{self, HttpSentimentClassifier, SentimentClassifier};
use crate::speech::{
    create_synthesizer, resolve_voice, AudioBuffer, HttpSpeechRecognizer, SpeechOutput,
    SpeechRecognizer, SpeechSynthesizer,
};
use crate::translate::{engine_factory, EngineFactory, PairCache, AUTO_SOURCE};

pub const STATUS_COMPLETED: &str = "Translation completed!";
pub const RECOGNITION_PLACEHOLDER: &str = "Speech recognition failed. Try again.";
pub const STATUS_NOTHING_TO_PLAY: &str = "Nothing to play.";

/// How the translation source language is chosen. The two original variants
/// differed here, so both behaviors are preserved as distinct modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceMode {
    /// The translation service detects the source itself; local detection is
    /// advisory, shown in the output only.
    ServiceAuto,
    /// The locally detected language is authoritative and routes the pair.
    Detected,
    /// Explicit user selection.
    Declared(String),
}

#[derive(Debug, Clone)]
pub struct TranslateRequest {
    pub audio: Option<AudioBuffer>,
    pub text: Option<String>,
    pub source: SourceMode,
    /// Target language display name or code
    pub target: String,
    pub dialect: DialectStyle,
    pub sentiment: bool,
}

#[derive(Debug, Clone)]
pub struct TranslationOutcome {
    pub text: String,
    pub detected_language: String,
    /// "SourceLang to TargetLang"
    pub mode_description: String,
    pub status: String,
}

/// Result of a speak request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakOutcome {
    NothingToPlay,
    Played,
    Saved(std::path::PathBuf),
}

pub struct Pipeline {
    identifier: Box<dyn LanguageIdentifier>,
    recognizer: Arc<dyn SpeechRecognizer>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    classifier: Box<dyn SentimentClassifier>,
    engines: PairCache,
    slang: SlangBook,
    history: HistoryLog,
    recorder: Recorder,
    voices: Vec<VoiceConfig>,
}

impl Pipeline {
    pub fn from_config(config: &Config) -> Result<Self> {
        let identifier = Box::new(HttpLanguageIdentifier::new(config.detect.clone())?);
        let recognizer: Arc<dyn SpeechRecognizer> =
            Arc::new(HttpSpeechRecognizer::new(&config.speech)?);
        let synthesizer = create_synthesizer(&config.speech)?;
        let classifier = Box::new(HttpSentimentClassifier::new(config.sentiment.clone())?);
        let capture = Arc::new(CliAudioCapture::new(&config.speech));
        let factory = engine_factory(&config.translate)?;
        let limits = CaptureLimits::from_config(&config.speech);

        Ok(Self::with_components(
            identifier,
            recognizer,
            synthesizer,
            classifier,
            capture,
            factory,
            limits,
            config.speech.voices.clone(),
        ))
    }

    /// Assemble a pipeline from explicit collaborators.
    #[allow(clippy::too_many_arguments)]
    pub fn with_components(
        identifier: Box<dyn LanguageIdentifier>,
        recognizer: Arc<dyn SpeechRecognizer>,
        synthesizer: Box<dyn SpeechSynthesizer>,
        classifier: Box<dyn SentimentClassifier>,
        capture: Arc<dyn crate::recorder::AudioCapture>,
        factory: EngineFactory,
        limits: CaptureLimits,
        voices: Vec<VoiceConfig>,
    ) -> Self {
        let recorder = Recorder::new(capture, recognizer.clone(), limits);
        Self {
            identifier,
            recognizer,
            synthesizer,
            classifier,
            engines: PairCache::new(factory),
            slang: SlangBook::new(),
            history: HistoryLog::new(),
            recorder,
            voices,
        }
    }

    /// Decide the input string: captured audio first, typed text second. A
    /// recognition failure yields an explanatory placeholder instead of
    /// failing the pipeline; no input at all is an error.
    async fn resolve_input(
        &self,
        audio: Option<&AudioBuffer>,
        typed: Option<&str>,
    ) -> Result<String> {
        if let Some(audio) = audio {
            return match self.recognizer.recognize(audio, None).await {
                Ok(text) => Ok(text),
                Err(e) => {
                    warn!("Speech recognition failed: {}", e);
                    Ok(RECOGNITION_PLACEHOLDER.to_string())
                }
            };
        }

        match typed {
            Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            _ => Err(VaaniError::InputMissing),
        }
    }

    /// Run the full pipeline for one request and record the result.
    pub async fn translate(&mut self, request: TranslateRequest) -> Result<TranslationOutcome> {
        let input = self
            .resolve_input(request.audio.as_ref(), request.text.as_deref())
            .await?;

        // Detection runs on every request; whether it routes translation
        // depends on the source mode.
        let (detected_code, detected_name) = match self.identifier.identify(&input).await {
            Ok(code) => {
                let name = languages::name_for_code(&code)
                    .map(str::to_string)
                    .unwrap_or_else(|| code.clone());
                (Some(code), name)
            }
            Err(e) => {
                warn!("Language detection failed: {}", e);
                (None, UNKNOWN_LANGUAGE.to_string())
            }
        };

        let target_code = languages::resolve_to_code(&request.target)
            .ok_or_else(|| VaaniError::UnknownLanguage(request.target.clone()))?;
        let target_name = languages::name_for_code(target_code).unwrap_or(target_code);

        // Special modes rewrite the input directly and never translate.
        if request.dialect.is_special_mode() {
            let style_lang = detected_code.as_deref().unwrap_or("en");
            let styled = self.slang.transform(&input, request.dialect, style_lang);
            let styled = self.maybe_annotate(styled, request.sentiment).await;

            let mode_description = format!("{} to {}", detected_name, detected_name);
            self.record_history(&input, &styled, &mode_description, request.dialect);

            return Ok(TranslationOutcome {
                text: styled,
                detected_language: detected_name,
                mode_description,
                status: STATUS_COMPLETED.to_string(),
            });
        }

        let (source_code, source_name) = match &request.source {
            SourceMode::ServiceAuto => (AUTO_SOURCE.to_string(), detected_name.clone()),
            SourceMode::Detected => {
                // Authoritative detection, with a home-language fallback when
                // the detector is unavailable
                let code = detected_code.clone().unwrap_or_else(|| "en".to_string());
                let name = languages::name_for_code(&code)
                    .map(str::to_string)
                    .unwrap_or_else(|| code.clone());
                (code, name)
            }
            SourceMode::Declared(selector) => {
                let code = languages::resolve_to_code(selector)
                    .ok_or_else(|| VaaniError::UnknownLanguage(selector.clone()))?;
                let name = languages::name_for_code(code).unwrap_or(code);
                (code.to_string(), name.to_string())
            }
        };

        // Identity short-circuit: a same-language request never reaches the
        // external translator.
        let translated = if source_code.eq_ignore_ascii_case(target_code) {
            input.clone()
        } else {
            let engine = self.engines.engine_for(&source_code, target_code)?;
            engine.translate(&input, &source_code, target_code).await?
        };

        let styled = self.slang.transform(&translated, request.dialect, target_code);
        let styled = self.maybe_annotate(styled, request.sentiment).await;

        let mode_description = format!("{} to {}", source_name, target_name);
        info!("Translated ({}): {} chars in, {} chars out", mode_description, input.len(), styled.len());
        self.record_history(&input, &styled, &mode_description, request.dialect);

        Ok(TranslationOutcome {
            text: styled,
            detected_language: detected_name,
            mode_description,
            status: STATUS_COMPLETED.to_string(),
        })
    }

    async fn maybe_annotate(&self, text: String, enabled: bool) -> String {
        if enabled {
            sentiment::annotate(self.classifier.as_ref(), &text).await
        } else {
            text
        }
    }

    fn record_history(&mut self, input: &str, output: &str, mode: &str, dialect: DialectStyle) {
        self.history.record(TranslationRecord {
            input_text: input.to_string(),
            output_text: output.to_string(),
            mode_description: mode.to_string(),
            dialect_label: dialect.label().to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Detected language display name for free text.
    pub async fn detect(&self, text: &str) -> String {
        detect_language_name(self.identifier.as_ref(), text).await
    }

    /// Add a session-scoped custom slang entry; returns a confirmation.
    pub fn add_slang(&mut self, formal: &str, styled: &str, language: &str) -> Result<String> {
        let code = languages::resolve_to_code(language)
            .ok_or_else(|| VaaniError::UnknownLanguage(language.to_string()))?;
        Ok(self.slang.add_custom(formal, styled, code))
    }

    pub fn render_history(&self) -> String {
        self.history.render()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Synthesize speech for `text` with an optional named voice. Empty text
    /// never reaches the engine.
    pub async fn speak(
        &self,
        text: &str,
        voice: Option<&str>,
        language: &str,
    ) -> Result<SpeakOutcome> {
        if text.trim().is_empty() {
            return Ok(SpeakOutcome::NothingToPlay);
        }

        let fallback = languages::resolve_to_code(language).unwrap_or("en");
        let voice = resolve_voice(&self.voices, voice, fallback);

        match self.synthesizer.speak(text, &voice).await? {
            SpeechOutput::Played => Ok(SpeakOutcome::Played),
            SpeechOutput::AudioFile(path) => Ok(SpeakOutcome::Saved(path)),
        }
    }

    pub fn start_recording(&mut self) -> String {
        self.recorder.start()
    }

    pub async fn stop_recording(&mut self, language_hint: Option<&str>) -> (String, String) {
        self.recorder.stop(language_hint).await
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::AudioCapture;
    use crate::sentiment::{Sentiment, SentimentLabel};
    use crate::translate::TranslationEngine;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::oneshot;

    struct FixedIdentifier(Option<String>);

    #[async_trait]
    impl LanguageIdentifier for FixedIdentifier {
        async fn identify(&self, _text: &str) -> Result<String> {
            match &self.0 {
                Some(code) => Ok(code.clone()),
                None => Err(VaaniError::Detection("down".to_string())),
            }
        }
    }

    struct FixedRecognizer(Option<String>);

    #[async_trait]
    impl SpeechRecognizer for FixedRecognizer {
        async fn recognize(&self, _a: &AudioBuffer, _l: Option<&str>) -> Result<String> {
            match &self.0 {
                Some(text) => Ok(text.clone()),
                None => Err(VaaniError::Recognition("unintelligible".to_string())),
            }
        }
    }

    struct NullSynthesizer;

    #[async_trait]
    impl SpeechSynthesizer for NullSynthesizer {
        async fn speak(&self, _t: &str, _v: &crate::speech::Voice) -> Result<SpeechOutput> {
            Ok(SpeechOutput::Played)
        }
    }

    struct FixedClassifier(Option<SentimentLabel>);

    #[async_trait]
    impl SentimentClassifier for FixedClassifier {
        async fn classify(&self, _text: &str) -> Result<Sentiment> {
            match self.0 {
                Some(label) => Ok(Sentiment { label, confidence: 1.0 }),
                None => Err(VaaniError::Sentiment("down".to_string())),
            }
        }
    }

    struct NullCapture;

    #[async_trait]
    impl AudioCapture for NullCapture {
        async fn record(&self, _l: CaptureLimits, _s: oneshot::Receiver<()>) -> Result<AudioBuffer> {
            Ok(AudioBuffer::default())
        }
    }

    struct CountingEngine {
        reply: String,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TranslationEngine for CountingEngine {
        async fn translate(&self, _t: &str, _s: &str, _tc: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    struct PipelineBuilder {
        detected: Option<String>,
        recognized: Option<String>,
        sentiment: Option<SentimentLabel>,
        engine_reply: String,
        engine_unavailable: bool,
    }

    impl Default for PipelineBuilder {
        fn default() -> Self {
            Self {
                detected: Some("en".to_string()),
                recognized: Some("hello".to_string()),
                sentiment: None,
                engine_reply: "translated".to_string(),
                engine_unavailable: false,
            }
        }
    }

    impl PipelineBuilder {
        fn build(self) -> (Pipeline, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let engine_calls = calls.clone();
            let reply = self.engine_reply.clone();
            let unavailable = self.engine_unavailable;

            let factory: EngineFactory = Box::new(move |source, target| {
                if unavailable {
                    return Err(VaaniError::TranslationUnavailable {
                        source_lang: source.to_string(),
                        target: target.to_string(),
                    });
                }
                Ok(Arc::new(CountingEngine {
                    reply: reply.clone(),
                    calls: engine_calls.clone(),
                }) as Arc<dyn TranslationEngine>)
            });

            let pipeline = Pipeline::with_components(
                Box::new(FixedIdentifier(self.detected)),
                Arc::new(FixedRecognizer(self.recognized)),
                Box::new(NullSynthesizer),
                Box::new(FixedClassifier(self.sentiment)),
                Arc::new(NullCapture),
                factory,
                CaptureLimits {
                    timeout: Duration::from_secs(1),
                    max_phrase: Duration::from_secs(1),
                },
                vec![],
            );
            (pipeline, calls)
        }
    }

    fn request(text: &str, target: &str, dialect: DialectStyle) -> TranslateRequest {
        TranslateRequest {
            audio: None,
            text: Some(text.to_string()),
            source: SourceMode::Declared("English".to_string()),
            target: target.to_string(),
            dialect,
            sentiment: false,
        }
    }

    #[tokio::test]
    async fn test_identity_short_circuit_skips_engine() {
        let (mut pipeline, calls) = PipelineBuilder::default().build();
        let outcome = pipeline
            .translate(request("Nothing changes", "English", DialectStyle::Standard))
            .await
            .unwrap();

        assert_eq!(outcome.text, "Nothing changes");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(outcome.status, STATUS_COMPLETED);
    }

    #[tokio::test]
    async fn test_end_to_end_casual_spanish() {
        let (mut pipeline, calls) = PipelineBuilder {
            engine_reply: "Hola mi amigo".to_string(),
            ..Default::default()
        }
        .build();

        let outcome = pipeline
            .translate(request("Hello my friend", "Spanish", DialectStyle::CasualSlang))
            .await
            .unwrap();

        assert_eq!(outcome.text, "qué onda mi compa");
        assert_eq!(outcome.detected_language, "English");
        assert_eq!(outcome.mode_description, "English to Spanish");
        assert_eq!(outcome.status, STATUS_COMPLETED);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(pipeline.history_len(), 1);
    }

    #[tokio::test]
    async fn test_special_modes_bypass_translation() {
        let (mut pipeline, calls) = PipelineBuilder::default().build();

        let outcome = pipeline
            .translate(request("hello friend", "Spanish", DialectStyle::FormalToCasual))
            .await
            .unwrap();
        assert_eq!(outcome.text, "hey buddy");

        let outcome = pipeline
            .translate(request("A. B. C.", "Spanish", DialectStyle::ProseToPoetry))
            .await
            .unwrap();
        assert_eq!(outcome.text, "A,\nB,\n\nC");

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(pipeline.history_len(), 2);
    }

    #[tokio::test]
    async fn test_missing_input_is_an_error() {
        let (mut pipeline, _) = PipelineBuilder::default().build();
        let mut req = request("", "Spanish", DialectStyle::Standard);
        req.text = Some("   ".to_string());
        let err = pipeline.translate(req).await.unwrap_err();
        assert!(matches!(err, VaaniError::InputMissing));
        assert_eq!(pipeline.history_len(), 0);
    }

    #[tokio::test]
    async fn test_recognition_failure_yields_placeholder_input() {
        let (mut pipeline, _) = PipelineBuilder {
            recognized: None,
            ..Default::default()
        }
        .build();

        let mut req = request("", "English", DialectStyle::Standard);
        req.text = None;
        req.audio = Some(AudioBuffer::new(vec![1, 2, 3]));

        let outcome = pipeline.translate(req).await.unwrap();
        // Identity target keeps the placeholder visible
        assert_eq!(outcome.text, RECOGNITION_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_unavailable_pair_surfaces_as_message() {
        let (mut pipeline, _) = PipelineBuilder {
            engine_unavailable: true,
            ..Default::default()
        }
        .build();

        let err = pipeline
            .translate(request("Hello", "Spanish", DialectStyle::Standard))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No translation model available"));
    }

    #[tokio::test]
    async fn test_sentiment_failure_passes_text_through() {
        let (mut pipeline, _) = PipelineBuilder {
            engine_reply: "Hola".to_string(),
            sentiment: None,
            ..Default::default()
        }
        .build();

        let mut req = request("Hello", "Spanish", DialectStyle::Standard);
        req.sentiment = true;
        let outcome = pipeline.translate(req).await.unwrap();
        assert_eq!(outcome.text, "Hola");
        assert_eq!(outcome.status, STATUS_COMPLETED);
    }

    #[tokio::test]
    async fn test_sentiment_annotation_appends_emoji() {
        let (mut pipeline, _) = PipelineBuilder {
            engine_reply: "Hola".to_string(),
            sentiment: Some(SentimentLabel::Positive),
            ..Default::default()
        }
        .build();

        let mut req = request("Hello", "Spanish", DialectStyle::Standard);
        req.sentiment = true;
        let outcome = pipeline.translate(req).await.unwrap();
        assert_eq!(outcome.text, "Hola 😊");
    }

    #[tokio::test]
    async fn test_history_accumulates_in_order() {
        let (mut pipeline, _) = PipelineBuilder {
            engine_reply: "Hola".to_string(),
            ..Default::default()
        }
        .build();

        assert_eq!(pipeline.render_history(), crate::history::EMPTY_HISTORY_MESSAGE);

        pipeline
            .translate(request("First", "Spanish", DialectStyle::Standard))
            .await
            .unwrap();
        pipeline
            .translate(request("Second", "Spanish", DialectStyle::Standard))
            .await
            .unwrap();

        assert_eq!(pipeline.history_len(), 2);
        let rendered = pipeline.render_history();
        assert!(rendered.find("First").unwrap() < rendered.find("Second").unwrap());
    }

    #[tokio::test]
    async fn test_custom_slang_applies_to_future_translations_only() {
        let (mut pipeline, _) = PipelineBuilder {
            engine_reply: "Hola amigo".to_string(),
            ..Default::default()
        }
        .build();

        pipeline
            .translate(request("Hi friend", "Spanish", DialectStyle::CasualSlang))
            .await
            .unwrap();

        pipeline.add_slang("amigo", "parcero", "Spanish").unwrap();

        let outcome = pipeline
            .translate(request("Hi friend", "Spanish", DialectStyle::CasualSlang))
            .await
            .unwrap();
        assert_eq!(outcome.text, "qué onda parcero");

        // The earlier history entry is untouched
        let rendered = pipeline.render_history();
        assert!(rendered.contains("qué onda compa"));
    }

    #[tokio::test]
    async fn test_speak_rejects_empty_text() {
        let (pipeline, _) = PipelineBuilder::default().build();
        let outcome = pipeline.speak("   ", None, "English").await.unwrap();
        assert_eq!(outcome, SpeakOutcome::NothingToPlay);
    }

    #[tokio::test]
    async fn test_unknown_target_language_is_rejected() {
        let (mut pipeline, _) = PipelineBuilder::default().build();
        let err = pipeline
            .translate(request("Hello", "Klingon", DialectStyle::Standard))
            .await
            .unwrap_err();
        assert!(matches!(err, VaaniError::UnknownLanguage(_)));
    }
}
