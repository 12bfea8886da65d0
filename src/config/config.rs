//! Application configuration and CLI argument parsing.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::audio::ReferenceClip;
use crate::tts::DEFAULT_MAX_CHARS;

/// Voice-cloning TTS application configuration.
#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "voice-clone-tts")]
#[command(author, version, about = "Synthesize speech in a cloned voice from text", long_about = None)]
pub struct AppConfig {
    /// Text to synthesize ("-" reads from stdin)
    #[arg(conflicts_with = "text_file")]
    pub text: Option<String>,

    /// Read the text to synthesize from a file
    #[arg(long, short = 'f')]
    pub text_file: Option<PathBuf>,

    /// Reference audio clip of the target voice (5+ seconds recommended)
    #[arg(long, short = 'r', env = "TTS_REFERENCE_AUDIO", conflicts_with = "voice")]
    pub reference_audio: Option<PathBuf>,

    /// Named voice from the references directory (<references-dir>/<NAME>.wav)
    #[arg(long)]
    pub voice: Option<String>,

    /// Directory holding the named voice library
    #[arg(long, env = "TTS_REFERENCES_DIR", default_value = "references")]
    pub references_dir: PathBuf,

    /// List the voices in the references directory and exit
    #[arg(long)]
    pub list_voices: bool,

    /// Output WAV file path (".wav" is appended when missing)
    #[arg(long, short = 'o', default_value = "output.wav")]
    pub output: PathBuf,

    /// Emotion exaggeration (0.0-2.0, 0.5 is neutral)
    #[arg(long, default_value = "0.5", value_parser = parse_exaggeration)]
    pub exaggeration: f32,

    /// Classifier-free guidance weight (0.0-1.0). Lower values slow down fast speakers
    #[arg(long, default_value = "0.5", value_parser = parse_cfg_weight)]
    pub cfg_weight: f32,

    /// Split long text into chunks of at most --max-chars characters
    #[arg(long)]
    pub split: bool,

    /// Maximum characters per synthesized chunk (with --split)
    #[arg(long, default_value_t = DEFAULT_MAX_CHARS, value_parser = parse_max_chars)]
    pub max_chars: usize,

    /// Chatterbox model server URL
    #[arg(long, short = 'u', env = "CHATTERBOX_URL", default_value = "http://localhost:4123")]
    pub endpoint: String,

    /// Timeout for each model request in seconds
    #[arg(long, default_value = "300")]
    pub timeout_secs: u64,

    /// Resample the output to this rate (defaults to the model's native rate)
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Print the chunks the text would be split into and exit
    #[arg(long)]
    pub print_chunks: bool,

    /// Show details about the reference audio clip and exit
    #[arg(long)]
    pub reference_info: bool,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl AppConfig {
    /// Parse configuration from command line arguments.
    pub fn from_args() -> Self {
        let config = Self::parse();

        if config.list_voices {
            ReferenceClip::print_voices(&config.references_dir);
            std::process::exit(0);
        }

        config
    }

    /// Whether long text should be split into chunks.
    pub fn split(&self) -> bool {
        self.split
    }

    /// Output path, with a `.wav` extension appended when missing.
    pub fn output_path(&self) -> PathBuf {
        with_wav_extension(&self.output)
    }

    /// Resolve the input text from the positional argument, stdin or `--text-file`.
    ///
    /// # Errors
    /// Returns an error if no source was given or the source cannot be read.
    pub fn read_text(&self) -> Result<String> {
        match (&self.text, &self.text_file) {
            (Some(text), _) if text == "-" => {
                let mut buffer = String::new();
                std::io::stdin().read_to_string(&mut buffer).context("Failed to read text from stdin")?;
                Ok(buffer)
            }
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => std::fs::read_to_string(path).with_context(|| format!("Failed to read text file {}", path.display())),
            (None, None) => anyhow::bail!("No input text given; pass TEXT, '-' for stdin, or --text-file"),
        }
    }

    /// Get the reference audio path, which every synthesis needs.
    ///
    /// A named `--voice` is looked up in the references directory; otherwise
    /// `--reference-audio` is used as given.
    ///
    /// # Errors
    /// Returns an error if neither is set or the named voice does not exist.
    pub fn reference_path(&self) -> Result<PathBuf> {
        match &self.voice {
            Some(name) => ReferenceClip::resolve_voice(&self.references_dir, name),
            None => self.reference_audio.clone().context("Missing --reference-audio (or TTS_REFERENCE_AUDIO) or --voice"),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.print_chunks {
            return Ok(());
        }

        let reference = self.reference_path()?;
        if !reference.exists() {
            anyhow::bail!("Reference audio file not found: {}", reference.display());
        }

        if self.reference_info {
            return Ok(());
        }

        if self.text.is_none() && self.text_file.is_none() {
            anyhow::bail!("No input text given; pass TEXT, '-' for stdin, or --text-file");
        }

        if let Some(path) = &self.text_file
            && !path.exists()
        {
            anyhow::bail!("Text file not found: {}", path.display());
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            anyhow::bail!("Endpoint must be an http(s) URL: {}", self.endpoint);
        }

        if self.timeout_secs == 0 {
            anyhow::bail!("Timeout must be positive");
        }

        if self.sample_rate == Some(0) {
            anyhow::bail!("Output sample rate must be positive");
        }

        Ok(())
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        info!("Configuration:");
        info!("  Endpoint: {}", self.endpoint);
        if let Some(ref reference) = self.reference_audio {
            info!("  Reference audio: {}", reference.display());
        }
        if let Some(ref voice) = self.voice {
            info!("  Voice: {} (from {})", voice, self.references_dir.display());
        }
        info!("  Output: {}", self.output_path().display());
        info!("  Exaggeration: {}", self.exaggeration);
        info!("  CFG weight: {}", self.cfg_weight);
        if self.split() {
            info!("  Chunking: up to {} chars", self.max_chars);
        } else {
            info!("  Chunking: disabled");
        }
        info!("  Request timeout: {}s", self.timeout_secs);
        if let Some(rate) = self.sample_rate {
            info!("  Output sample rate: {} Hz", rate);
        }
    }
}

/// Append `.wav` unless the file name already ends with it (any case).
fn with_wav_extension(path: &Path) -> PathBuf {
    let has_wav = path.file_name().is_some_and(|name| name.to_string_lossy().to_ascii_lowercase().ends_with(".wav"));
    if has_wav {
        return path.to_path_buf();
    }

    let mut name = path.as_os_str().to_os_string();
    name.push(".wav");
    PathBuf::from(name)
}

/// Parse a float and check it lies in `[min, max]`.
fn parse_in_range(s: &str, name: &str, min: f32, max: f32) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|_| format!("'{}' is not a valid float", s))?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{} must be between {} and {}, got {}", name, min, max, value))
    }
}

/// Parse and validate exaggeration value (0.0-2.0).
fn parse_exaggeration(s: &str) -> Result<f32, String> {
    parse_in_range(s, "exaggeration", 0.0, 2.0)
}

/// Parse and validate CFG weight value (0.0-1.0).
fn parse_cfg_weight(s: &str) -> Result<f32, String> {
    parse_in_range(s, "cfg weight", 0.0, 1.0)
}

/// Parse and validate the chunk size limit (must be positive).
fn parse_max_chars(s: &str) -> Result<usize, String> {
    let value: usize = s.parse().map_err(|_| format!("'{}' is not a valid character count", s))?;
    if value == 0 { Err("max chars must be at least 1".to_string()) } else { Ok(value) }
}
