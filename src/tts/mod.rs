//! Text-to-speech module for voice-cloned synthesis.
//!
//! Splits long text into model-sized chunks and synthesizes them through a
//! Chatterbox model server.

mod client;
mod error;
mod segmenter;
mod synthesizer;

pub use client::SpeechClient;
pub use error::SpeechError;
pub use segmenter::DEFAULT_MAX_CHARS;
pub use synthesizer::{Synthesizer, plan_chunks};
