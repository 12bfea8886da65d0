//! Voice Clone TTS - Synthesize speech in a cloned voice from text.
//!
//! Long text is split into sentence-aligned chunks that fit the model's input
//! limit. Each chunk is synthesized by a Chatterbox model server using a
//! reference clip of the target voice, and the waveforms are joined into a
//! single WAV file.

mod audio;
mod config;
mod tts;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;

use audio::{ReferenceClip, resampler, save_wav};
use config::AppConfig;
use tts::{SpeechClient, SpeechError, Synthesizer};

/// Print the chunk plan without contacting the model.
fn print_chunks(config: &AppConfig, text: &str) {
    let chunks = tts::plan_chunks(text, config.split(), config.max_chars);
    if config.split() {
        println!("{} chunk(s), max {} chars:", chunks.len(), config.max_chars);
    } else {
        println!("{} chunk(s), splitting disabled:", chunks.len());
    }
    for (i, chunk) in chunks.iter().enumerate() {
        println!("[{:>3}] ({:>3} chars) {}", i + 1, chunk.chars().count(), chunk);
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let config = AppConfig::from_args();

    // Respect RUST_LOG env var, fallback to verbose flag, default to info
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| if config.verbose { EnvFilter::try_new("debug") } else { EnvFilter::try_new("info") })
        .context("Invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(LocalTime::new(time::macros::format_description!("[hour]:[minute]:[second]")))
        .init();

    if let Err(e) = config.validate() {
        error!("❌ Configuration error: {:#}", e);
        std::process::exit(1);
    }

    if config.reference_info {
        ReferenceClip::inspect(&config.reference_path()?)?.print_info();
        return Ok(());
    }

    let text = config.read_text()?;

    if config.print_chunks {
        print_chunks(&config, &text);
        return Ok(());
    }

    info!("🗣️  Voice Clone TTS v{}", env!("CARGO_PKG_VERSION"));
    config.log_config();

    ReferenceClip::inspect(&config.reference_path()?)?;

    let client = match SpeechClient::connect(&config) {
        Ok(client) => client,
        Err(e @ SpeechError::Unavailable { .. }) => {
            error!("❌ {}", e);
            error!("Start a Chatterbox server or point --endpoint at a running one.");
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to connect to the model server"),
    };

    let synthesizer = Synthesizer::new(client, &config)?;
    let speech = synthesizer.synthesize(&text)?;

    let (samples, sample_rate) = match config.sample_rate {
        Some(rate) if rate != speech.sample_rate => {
            info!("Resampling {} Hz -> {} Hz", speech.sample_rate, rate);
            (resampler::resample(&speech.samples, speech.sample_rate, rate)?, rate)
        }
        _ => (speech.samples, speech.sample_rate),
    };

    if samples.is_empty() {
        warn!("Model returned no audio samples");
    }

    let output = config.output_path();
    save_wav(&samples, &output, sample_rate).context("Failed to save WAV")?;

    let duration_secs = samples.len() as f32 / sample_rate as f32;
    info!("✅ Saved {:.2}s of audio to {} ({} Hz)", duration_secs, output.display(), sample_rate);
    Ok(())
}
