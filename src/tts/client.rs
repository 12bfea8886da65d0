//! HTTP client for a Chatterbox inference server.
//!
//! The server owns the model weights and device placement. Each call uploads
//! the reference clip together with the chunk text and receives a WAV stream.

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, multipart};
use serde::Deserialize;
use tracing::{debug, info};

use super::error::SpeechError;
use crate::audio::{Speech, decode_wav};
use crate::config::AppConfig;

/// Health check path.
const HEALTH_PATH: &str = "/health";

/// Speech generation path accepting a reference clip upload.
const SPEECH_PATH: &str = "/v1/audio/speech/upload";

/// Reference clip contents, read from disk once and reused for every chunk.
#[derive(Debug, Clone)]
pub struct VoicePrompt {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl VoicePrompt {
    /// Read the reference clip into memory.
    ///
    /// # Errors
    /// Returns [`SpeechError::Reference`] if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, SpeechError> {
        let bytes = std::fs::read(path).map_err(|source| SpeechError::Reference { path: path.to_path_buf(), source })?;
        let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "reference.wav".to_string());
        debug!("Loaded reference clip {} ({} bytes)", path.display(), bytes.len());
        Ok(Self { file_name, bytes })
    }
}

/// One synthesis call: text plus voice conditioning parameters.
#[derive(Debug, Clone, Copy)]
pub struct SpeechRequest<'a> {
    pub text: &'a str,
    pub voice: &'a VoicePrompt,
    pub exaggeration: f32,
    pub cfg_weight: f32,
}

/// A text-to-speech model taking a reference clip for voice conditioning.
pub trait SpeechModel {
    /// Generate the waveform for a single piece of text.
    fn generate(&self, request: &SpeechRequest<'_>) -> Result<Speech, SpeechError>;
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    #[serde(default)]
    model_loaded: Option<bool>,
    #[serde(default)]
    device: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Blocking client for the model server.
pub struct SpeechClient {
    client: Client,   // HTTP client with request timeout
    base_url: String, // Server URL without trailing slash
}

impl SpeechClient {
    /// Create a client and check that the server is ready.
    ///
    /// # Arguments
    /// * `config` - Application configuration
    ///
    /// # Errors
    /// Returns [`SpeechError::Unavailable`] if the server cannot be reached or
    /// reports that its model is not loaded.
    pub fn connect(config: &AppConfig) -> Result<Self, SpeechError> {
        let base_url = normalize_endpoint(&config.endpoint);
        info!("Connecting to Chatterbox server at {}", base_url);

        let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        let speech_client = Self { client, base_url };
        speech_client.check_health()?;
        Ok(speech_client)
    }

    fn check_health(&self) -> Result<(), SpeechError> {
        let unavailable = |reason: String| SpeechError::Unavailable { endpoint: self.base_url.clone(), reason };

        let response = self.client.get(self.url(HEALTH_PATH)).send().map_err(|e| unavailable(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("health check returned {}", status)));
        }

        let body = response.text().map_err(|e| unavailable(e.to_string()))?;
        let health = parse_health(&body).map_err(unavailable)?;

        info!("Model server ready (status: {}, device: {})", health.status, health.device.as_deref().unwrap_or("unknown"));
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn build_form(request: &SpeechRequest<'_>) -> Result<multipart::Form, SpeechError> {
        let voice = request.voice;
        let part = multipart::Part::bytes(voice.bytes.clone())
            .file_name(voice.file_name.clone())
            .mime_str(mime_for(Path::new(&voice.file_name)))?;

        Ok(multipart::Form::new()
            .text("input", request.text.to_string())
            .text("exaggeration", request.exaggeration.to_string())
            .text("cfg_weight", request.cfg_weight.to_string())
            .text("response_format", "wav")
            .part("voice_file", part))
    }
}

impl SpeechModel for SpeechClient {
    fn generate(&self, request: &SpeechRequest<'_>) -> Result<Speech, SpeechError> {
        debug!("Requesting speech for {} chars", request.text.chars().count());

        let form = Self::build_form(request)?;
        let response = self.client.post(self.url(SPEECH_PATH)).multipart(form).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SpeechError::Status { status: status.as_u16(), body: error_message(&body) });
        }

        let bytes = response.bytes()?;
        decode_wav(&bytes).map_err(|e| SpeechError::Decode(format!("{:#}", e)))
    }
}

/// Parse a health check body, rejecting servers whose model is not loaded.
fn parse_health(body: &str) -> Result<HealthResponse, String> {
    let health: HealthResponse = serde_json::from_str(body).map_err(|e| format!("unreadable health response: {}", e))?;
    if health.model_loaded == Some(false) {
        return Err(format!("model not loaded (status: {})", health.status));
    }
    Ok(health)
}

/// Strip trailing slashes so paths can be appended directly.
fn normalize_endpoint(endpoint: &str) -> String {
    endpoint.trim().trim_end_matches('/').to_string()
}

/// Pull the message out of a JSON error body, falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body).map(|e| e.error.message).unwrap_or_else(|_| body.trim().to_string())
}

/// MIME type for the reference clip upload, by extension.
fn mime_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    }
}
