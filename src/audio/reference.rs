//! Reference clip inspection and the named voice library.
//!
//! The model conditions the cloned voice on a short recording of the target
//! speaker. Only WAV headers are inspected locally; other containers are sent to
//! the model as-is. Named voices are the `.wav` files of a references directory,
//! addressed by file stem.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hound::WavReader;
use tracing::{debug, error, warn};

/// Shortest reference clip that gives the model enough voice to work with.
pub const MIN_REFERENCE_SECONDS: f32 = 5.0;

/// Header details of a WAV reference clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavDetails {
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_secs: f32,
}

/// A reference clip on disk.
#[derive(Debug, Clone)]
pub struct ReferenceClip {
    pub path: PathBuf,
    pub size_bytes: u64,
    /// Present only for `.wav` files.
    pub wav: Option<WavDetails>,
}

impl ReferenceClip {
    /// Inspect a reference clip.
    ///
    /// # Errors
    /// Returns an error if the file does not exist or a `.wav` header cannot be parsed.
    pub fn inspect(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path).with_context(|| format!("Reference audio not found: {}", path.display()))?;
        if !metadata.is_file() {
            anyhow::bail!("Reference audio is not a file: {}", path.display());
        }

        let is_wav = path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("wav"));

        let wav = if is_wav {
            let reader = WavReader::open(path).with_context(|| format!("Failed to read WAV header of {}", path.display()))?;
            let spec = reader.spec();
            let frames = reader.duration();
            Some(WavDetails {
                sample_rate: spec.sample_rate,
                channels: spec.channels,
                duration_secs: if spec.sample_rate == 0 { 0.0 } else { frames as f32 / spec.sample_rate as f32 },
            })
        } else {
            debug!("Reference audio {} is not WAV, skipping header inspection", path.display());
            None
        };

        let clip = Self { path: path.to_path_buf(), size_bytes: metadata.len(), wav };
        if clip.is_short() {
            warn!(
                "Reference audio is only {:.1}s long; at least {:.0}s is recommended for voice cloning",
                clip.wav.map(|w| w.duration_secs).unwrap_or_default(),
                MIN_REFERENCE_SECONDS
            );
        }
        Ok(clip)
    }

    /// Names of the voices in `dir`, sorted.
    ///
    /// Every `<name>.wav` file is a voice. An unreadable directory yields no
    /// voices.
    pub fn available_voices(dir: &Path) -> Vec<String> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!("Error reading references directory {}: {}", dir.display(), e);
                return Vec::new();
            }
        };

        let mut voices: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|entry| entry.file_name().to_str()?.strip_suffix(".wav").map(str::to_string))
            .filter(|name| !name.is_empty())
            .collect();
        voices.sort();
        voices
    }

    /// Resolve a named voice to its clip in `dir`.
    ///
    /// # Errors
    /// Returns an error listing the available voices if `name` is not one of them.
    pub fn resolve_voice(dir: &Path, name: &str) -> Result<PathBuf> {
        let voices = Self::available_voices(dir);
        if !voices.iter().any(|v| v == name) {
            anyhow::bail!("Invalid voice '{}'. Available voices: {}", name, describe_voices(&voices, dir));
        }
        Ok(dir.join(format!("{}.wav", name)))
    }

    /// Print the voice library for `--list-voices`.
    pub fn print_voices(dir: &Path) {
        let voices = Self::available_voices(dir);
        println!();
        println!("Voices in {} ({})", dir.display(), voices.len());
        println!("{}", "─".repeat(40));
        if voices.is_empty() {
            println!("{}", describe_voices(&voices, dir));
        }
        for voice in &voices {
            println!("  {}", voice);
        }
        println!();
        println!("Usage:");
        println!("  ./voice-clone-tts --voice <NAME> \"Text to speak\"");
        println!();
    }

    /// Whether the clip is known to be shorter than [`MIN_REFERENCE_SECONDS`].
    pub fn is_short(&self) -> bool {
        self.wav.is_some_and(|w| w.duration_secs < MIN_REFERENCE_SECONDS)
    }

    /// Print clip details for `--reference-info`.
    pub fn print_info(&self) {
        println!();
        println!("Reference: {}", self.path.display());
        println!("{}", "─".repeat(40));
        println!("Size:          {} bytes", self.size_bytes);
        match self.wav {
            Some(wav) => {
                println!("Sample rate:   {} Hz", wav.sample_rate);
                println!("Channels:      {}", wav.channels);
                println!("Duration:      {:.2}s", wav.duration_secs);
                if self.is_short() {
                    println!("Note:          shorter than the recommended {:.0}s", MIN_REFERENCE_SECONDS);
                }
            }
            None => println!("Format:        not WAV, passed to the model unchanged"),
        }
        println!();
    }
}

/// Comma-separated voice list, or a hint when the library is empty.
fn describe_voices(voices: &[String], dir: &Path) -> String {
    if voices.is_empty() {
        format!("(none; add .wav files to {})", dir.display())
    } else {
        voices.join(", ")
    }
}
