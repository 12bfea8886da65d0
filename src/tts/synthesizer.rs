//! Chunked speech synthesis in a cloned voice.

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::client::{SpeechModel, SpeechRequest, VoicePrompt};
use super::segmenter::split_text;
use crate::audio::Speech;
use crate::audio::util::concatenate;
use crate::config::AppConfig;

/// Drives the model once per chunk and stitches the waveforms together.
pub struct Synthesizer<M> {
    model: M,                 // Speech model backend
    voice: VoicePrompt,       // Reference clip, loaded once
    exaggeration: f32,        // Emotion exaggeration
    cfg_weight: f32,          // Classifier-free guidance weight
    split: bool,              // Whether long text is chunked
    max_chars: usize,         // Character budget per chunk
}

impl<M: SpeechModel> Synthesizer<M> {
    /// Create a new synthesizer around a model backend.
    ///
    /// # Errors
    /// Returns an error if the configuration has no reference audio or the
    /// clip cannot be read.
    pub fn new(model: M, config: &AppConfig) -> Result<Self> {
        let reference = config.reference_path()?;
        let voice = VoicePrompt::load(&reference).context("Failed to load reference audio")?;
        Ok(Self {
            model,
            voice,
            exaggeration: config.exaggeration,
            cfg_weight: config.cfg_weight,
            split: config.split(),
            max_chars: config.max_chars,
        })
    }

    /// Work out which pieces of text will be sent to the model.
    ///
    /// Text is only chunked when splitting is enabled and the text is longer
    /// than the budget; otherwise the trimmed text is synthesized in one call.
    pub fn plan(&self, text: &str) -> Vec<String> {
        plan_chunks(text, self.split, self.max_chars)
    }

    /// Synthesize the text, one model call per planned chunk.
    ///
    /// # Errors
    /// Returns an error if there is nothing to synthesize, any model call
    /// fails, or chunks come back at different sample rates.
    pub fn synthesize(&self, text: &str) -> Result<Speech> {
        let chunks = self.plan(text);
        if chunks.is_empty() {
            anyhow::bail!("Nothing to synthesize: input text is empty");
        }

        let total = chunks.len();
        if self.split && text.chars().count() > self.max_chars {
            info!("Splitting into {} chunks (max {} chars)", total, self.max_chars);
        }

        let mut samples = Vec::new();
        let mut sample_rate = None;

        for (i, chunk) in chunks.iter().enumerate() {
            info!("Chunk {}/{}: {}...", i + 1, total, preview(chunk, PREVIEW_CHARS));
            debug!("Full chunk text: \"{}\"", chunk);

            let request = SpeechRequest {
                text: chunk,
                voice: &self.voice,
                exaggeration: self.exaggeration,
                cfg_weight: self.cfg_weight,
            };
            let speech = self.model.generate(&request).with_context(|| format!("Failed to synthesize chunk {}/{}", i + 1, total))?;

            match sample_rate {
                None => sample_rate = Some(speech.sample_rate),
                Some(rate) if rate != speech.sample_rate => {
                    anyhow::bail!("Chunk {}/{} came back at {} Hz, expected {} Hz", i + 1, total, speech.sample_rate, rate);
                }
                Some(_) => {}
            }

            info!("🎵 Generated chunk {}/{} ({:.2}s)", i + 1, total, speech.duration_secs());
            concatenate(&mut samples, &speech.samples);
        }

        let sample_rate = sample_rate.context("Model produced no audio")?;
        Ok(Speech { samples, sample_rate })
    }
}

/// Characters of each chunk shown in progress lines.
const PREVIEW_CHARS: usize = 60;

/// First `max_chars` characters of a chunk.
fn preview(chunk: &str, max_chars: usize) -> &str {
    match chunk.char_indices().nth(max_chars) {
        Some((end, _)) => &chunk[..end],
        None => chunk,
    }
}

/// Decide the chunk plan for `text`.
pub fn plan_chunks(text: &str, split: bool, max_chars: usize) -> Vec<String> {
    if split && text.chars().count() > max_chars {
        return split_text(text, max_chars);
    }

    let trimmed = text.trim();
    if trimmed.is_empty() { Vec::new() } else { vec![trimmed.to_string()] }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::tts::SpeechError;

    /// Records every request and returns one sample per character.
    struct FakeModel {
        calls: RefCell<Vec<String>>,
        sample_rate: u32,
        fail_on: Option<usize>,
    }

    impl FakeModel {
        fn new() -> Self {
            Self { calls: RefCell::new(Vec::new()), sample_rate: 24000, fail_on: None }
        }
    }

    impl SpeechModel for FakeModel {
        fn generate(&self, request: &SpeechRequest<'_>) -> Result<Speech, SpeechError> {
            assert_eq!(request.voice.file_name, "voice.wav");
            let index = self.calls.borrow().len();
            self.calls.borrow_mut().push(request.text.to_string());

            if self.fail_on == Some(index) {
                return Err(SpeechError::Status { status: 500, body: "boom".to_string() });
            }

            let samples = vec![index as f32; request.text.chars().count()];
            Ok(Speech { samples, sample_rate: self.sample_rate })
        }
    }

    /// Alternates sample rates between calls.
    struct DriftingModel {
        calls: RefCell<u32>,
    }

    impl SpeechModel for DriftingModel {
        fn generate(&self, _request: &SpeechRequest<'_>) -> Result<Speech, SpeechError> {
            let mut calls = self.calls.borrow_mut();
            *calls += 1;
            Ok(Speech { samples: vec![0.0; 4], sample_rate: 22050 + *calls })
        }
    }

    fn synthesizer<M: SpeechModel>(model: M, split: bool, max_chars: usize) -> Synthesizer<M> {
        Synthesizer { model, voice: VoicePrompt { file_name: "voice.wav".to_string(), bytes: Vec::new() }, exaggeration: 0.5, cfg_weight: 0.5, split, max_chars }
    }

    #[test]
    fn test_one_call_per_chunk_in_order() {
        let synth = synthesizer(FakeModel::new(), true, 15);
        let speech = synth.synthesize("Hello world. This is a test.").unwrap();

        assert_eq!(*synth.model.calls.borrow(), vec!["Hello world.", "This is a test."]);
        assert_eq!(speech.sample_rate, 24000);
        assert_eq!(speech.samples.len(), 12 + 15);
        assert!(speech.samples[..12].iter().all(|&s| s == 0.0));
        assert!(speech.samples[12..].iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_short_text_is_not_split() {
        let synth = synthesizer(FakeModel::new(), true, 400);
        synth.synthesize("  First. Second.  ").unwrap();
        assert_eq!(*synth.model.calls.borrow(), vec!["First. Second."]);
    }

    #[test]
    fn test_no_split_sends_whole_text() {
        let text = "A very long single sentence without any punctuation marks at all";
        let synth = synthesizer(FakeModel::new(), false, 20);
        synth.synthesize(text).unwrap();
        assert_eq!(*synth.model.calls.borrow(), vec![text]);
    }

    #[test]
    fn test_chunk_count_matches_call_count() {
        let text = format!("Tiny. {} end.", "z".repeat(40));
        let synth = synthesizer(FakeModel::new(), true, 10);
        let plan = synth.plan(&text);
        synth.synthesize(&text).unwrap();
        assert_eq!(plan.len(), synth.model.calls.borrow().len());
        assert_eq!(plan, vec!["Tiny.".to_string(), "z".repeat(40), "end.".to_string()]);
    }

    #[test]
    fn test_empty_text_is_an_error() {
        let synth = synthesizer(FakeModel::new(), true, 10);
        assert!(synth.synthesize("   ").is_err());
        assert!(synth.model.calls.borrow().is_empty());
    }

    #[test]
    fn test_model_error_aborts_run() {
        let mut model = FakeModel::new();
        model.fail_on = Some(1);
        let synth = synthesizer(model, true, 6);

        let err = synth.synthesize("One. Two. Three.").unwrap_err();
        assert!(format!("{:#}", err).contains("chunk 2/3"));
        assert_eq!(synth.model.calls.borrow().len(), 2);
    }

    #[test]
    fn test_sample_rate_mismatch_is_an_error() {
        let synth = synthesizer(DriftingModel { calls: RefCell::new(0) }, true, 6);
        assert!(synth.synthesize("One. Two.").is_err());
    }

    #[test]
    fn test_preview_truncates_by_chars() {
        let chunk = "é".repeat(70);
        assert_eq!(preview(&chunk, PREVIEW_CHARS).chars().count(), 60);
        assert_eq!(preview("short chunk", PREVIEW_CHARS), "short chunk");
        assert_eq!(preview(&"a".repeat(60), PREVIEW_CHARS).len(), 60);
    }

    #[test]
    fn test_plan_chunks_edges() {
        assert!(plan_chunks("", true, 10).is_empty());
        assert!(plan_chunks("   ", false, 10).is_empty());
        assert_eq!(plan_chunks("Exactly ten", true, 11), vec!["Exactly ten"]);
    }
}
