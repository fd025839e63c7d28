//! Recording session lifecycle: Idle -> Recording -> Idle.
//!
//! One background task captures audio, bounded by a timeout and a maximum
//! phrase duration, and writes the buffer exactly once before terminating.
//! `stop` fires the stop signal, awaits the join handle, and only then runs
//! speech-to-text, so recognized text is never returned before the capture
//! task has fully terminated. At most one capture is in flight.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SpeechConfig;
use crate::error::{Result, VaaniError};
use crate::speech::{AudioBuffer, SpeechRecognizer};

pub const STATUS_STARTED: &str = "Recording... speak now.";
pub const STATUS_ALREADY_RECORDING: &str = "Already recording.";
pub const STATUS_NOT_RECORDING: &str = "Not recording.";
pub const STATUS_CAPTURED: &str = "Recording captured.";
pub const STATUS_NO_SPEECH: &str = "No speech captured before the timeout.";
pub const STATUS_RECOGNITION_FAILED: &str = "Speech recognition failed. Try again.";

#[derive(Debug, Clone, Copy)]
pub struct CaptureLimits {
    /// How long to wait for speech to begin
    pub timeout: Duration,
    /// Maximum length of one captured phrase
    pub max_phrase: Duration,
}

impl CaptureLimits {
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.capture_timeout_secs),
            max_phrase: Duration::from_secs(config.max_phrase_secs),
        }
    }

    fn total(&self) -> Duration {
        self.timeout + self.max_phrase
    }
}

/// One bounded audio capture. Implementations finish early when `stop`
/// fires, returning whatever was captured by then; past the limits they
/// self-terminate.
#[async_trait]
pub trait AudioCapture: Send + Sync {
    async fn record(&self, limits: CaptureLimits, stop: oneshot::Receiver<()>) -> Result<AudioBuffer>;
}

/// Captures by shelling out to a recorder binary writing a WAV file, killed
/// early on the stop signal.
pub struct CliAudioCapture {
    binary: String,
}

impl CliAudioCapture {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            binary: config.capture_binary.clone(),
        }
    }
}

#[async_trait]
impl AudioCapture for CliAudioCapture {
    async fn record(&self, limits: CaptureLimits, stop: oneshot::Receiver<()>) -> Result<AudioBuffer> {
        let wav_path = tempfile::Builder::new()
            .prefix("vaani_capture_")
            .suffix(".wav")
            .tempfile()
            .map_err(|e| VaaniError::Recognition(format!("Failed to create capture file: {}", e)))?
            .into_temp_path();

        let total_secs = limits.total().as_secs().max(1);
        debug!(
            "Starting capture via '{}' for up to {}s",
            self.binary, total_secs
        );

        let mut child = Command::new(&self.binary)
            .arg("-f")
            .arg("cd")
            .arg("-d")
            .arg(total_secs.to_string())
            .arg(wav_path.as_os_str())
            .spawn()
            .map_err(|e| VaaniError::Recognition(format!("Failed to run {}: {}", self.binary, e)))?;

        tokio::select! {
            status = child.wait() => {
                let status = status
                    .map_err(|e| VaaniError::Recognition(format!("Capture process failed: {}", e)))?;
                if !status.success() {
                    return Err(VaaniError::Recognition(format!(
                        "{} exited with {}", self.binary, status
                    )));
                }
            }
            _ = stop => {
                debug!("Stop signal received, ending capture early");
                // Terminate the recorder and keep whatever it wrote so far
                let _ = child.start_kill();
                let _ = child.wait().await;
            }
        }

        let data = tokio::fs::read(&wav_path).await.unwrap_or_default();
        Ok(AudioBuffer::new(data))
    }
}

enum SessionState {
    Idle,
    Recording {
        stop_tx: oneshot::Sender<()>,
        handle: JoinHandle<Result<AudioBuffer>>,
    },
}

/// The recording session state machine. Owned by the pipeline; single writer.
pub struct Recorder {
    capture: Arc<dyn AudioCapture>,
    recognizer: Arc<dyn SpeechRecognizer>,
    limits: CaptureLimits,
    state: SessionState,
}

impl Recorder {
    pub fn new(
        capture: Arc<dyn AudioCapture>,
        recognizer: Arc<dyn SpeechRecognizer>,
        limits: CaptureLimits,
    ) -> Self {
        Self {
            capture,
            recognizer,
            limits,
            state: SessionState::Idle,
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, SessionState::Recording { .. })
    }

    /// Begin a capture in the background and return immediately. A start
    /// while already recording is a no-op.
    pub fn start(&mut self) -> String {
        if self.is_recording() {
            return STATUS_ALREADY_RECORDING.to_string();
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        let capture = self.capture.clone();
        let limits = self.limits;
        let handle = tokio::spawn(async move { capture.record(limits, stop_rx).await });

        self.state = SessionState::Recording { stop_tx, handle };
        info!("Recording session started");
        STATUS_STARTED.to_string()
    }

    /// End the capture, wait for the background task to terminate, and run
    /// speech-to-text on the buffer. Returns (recognized_text, status).
    pub async fn stop(&mut self, language_hint: Option<&str>) -> (String, String) {
        match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Idle => (String::new(), STATUS_NOT_RECORDING.to_string()),
            SessionState::Recording { stop_tx, handle } => {
                // The capture may already have finished on its own
                let _ = stop_tx.send(());

                let buffer = match handle.await {
                    Ok(Ok(buffer)) => buffer,
                    Ok(Err(e)) => {
                        warn!("Capture failed: {}", e);
                        return (String::new(), format!("Capture failed: {}", e));
                    }
                    Err(e) => {
                        warn!("Capture task panicked: {}", e);
                        return (String::new(), "Capture task failed.".to_string());
                    }
                };

                if buffer.is_empty() {
                    return (String::new(), STATUS_NO_SPEECH.to_string());
                }

                match self.recognizer.recognize(&buffer, language_hint).await {
                    Ok(text) => {
                        info!("Recording session finished: {} bytes captured", buffer.data.len());
                        (text, STATUS_CAPTURED.to_string())
                    }
                    Err(e) => {
                        warn!("Recognition failed: {}", e);
                        (String::new(), STATUS_RECOGNITION_FAILED.to_string())
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeCapture {
        data: Vec<u8>,
    }

    #[async_trait]
    impl AudioCapture for FakeCapture {
        async fn record(
            &self,
            _limits: CaptureLimits,
            _stop: oneshot::Receiver<()>,
        ) -> Result<AudioBuffer> {
            Ok(AudioBuffer::new(self.data.clone()))
        }
    }

    struct CountingRecognizer {
        calls: AtomicUsize,
        reply: Option<String>,
    }

    #[async_trait]
    impl SpeechRecognizer for CountingRecognizer {
        async fn recognize(
            &self,
            _audio: &AudioBuffer,
            _language_hint: Option<&str>,
        ) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Some(text) => Ok(text.clone()),
                None => Err(VaaniError::Recognition("unintelligible".to_string())),
            }
        }
    }

    fn limits() -> CaptureLimits {
        CaptureLimits {
            timeout: Duration::from_secs(1),
            max_phrase: Duration::from_secs(1),
        }
    }

    fn recorder(data: Vec<u8>, reply: Option<String>) -> (Recorder, Arc<CountingRecognizer>) {
        let recognizer = Arc::new(CountingRecognizer {
            calls: AtomicUsize::new(0),
            reply,
        });
        let recorder = Recorder::new(
            Arc::new(FakeCapture { data }),
            recognizer.clone(),
            limits(),
        );
        (recorder, recognizer)
    }

    #[tokio::test]
    async fn test_stop_while_idle_has_no_side_effects() {
        let (mut recorder, recognizer) = recorder(vec![1, 2, 3], Some("hi".to_string()));
        let (text, status) = recorder.stop(None).await;
        assert_eq!(text, "");
        assert_eq!(status, STATUS_NOT_RECORDING);
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 0);
        assert!(!recorder.is_recording());
    }

    #[tokio::test]
    async fn test_double_start_reports_already_recording() {
        let (mut recorder, _) = recorder(vec![1], Some("hi".to_string()));
        assert_eq!(recorder.start(), STATUS_STARTED);
        assert_eq!(recorder.start(), STATUS_ALREADY_RECORDING);
        assert!(recorder.is_recording());
        // Clean up the in-flight task
        recorder.stop(None).await;
    }

    #[tokio::test]
    async fn test_start_stop_returns_recognized_text() {
        let (mut recorder, recognizer) = recorder(vec![1, 2, 3], Some("hello there".to_string()));
        recorder.start();
        let (text, status) = recorder.stop(Some("en")).await;
        assert_eq!(text, "hello there");
        assert_eq!(status, STATUS_CAPTURED);
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 1);
        assert!(!recorder.is_recording());
    }

    #[tokio::test]
    async fn test_empty_capture_reports_timeout() {
        let (mut recorder, recognizer) = recorder(vec![], Some("ignored".to_string()));
        recorder.start();
        let (text, status) = recorder.stop(None).await;
        assert_eq!(text, "");
        assert_eq!(status, STATUS_NO_SPEECH);
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_recognition_failure_returns_placeholder_status() {
        let (mut recorder, _) = recorder(vec![1, 2, 3], None);
        recorder.start();
        let (text, status) = recorder.stop(None).await;
        assert_eq!(text, "");
        assert_eq!(status, STATUS_RECOGNITION_FAILED);
    }
}
