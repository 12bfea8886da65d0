//! Audio file handling for synthesized speech.
//!
//! WAV encoding/decoding via hound, reference clip inspection, and optional
//! output resampling via rubato.

mod reference;
pub mod resampler;
pub mod util;
mod wav;

pub use reference::ReferenceClip;
pub use wav::{Speech, decode_wav, save_wav};
