//! Errors raised while talking to the speech model.

use std::path::PathBuf;

use thiserror::Error;

/// Failures of a single model call or of the model connection.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The model server could not be reached or reported itself unhealthy.
    #[error("speech model unavailable at {endpoint}: {reason}")]
    Unavailable { endpoint: String, reason: String },

    /// The request could not be sent or the response could not be read.
    #[error("speech request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The model answered with a non-success status.
    #[error("speech model returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a readable WAV stream.
    #[error("invalid audio returned by speech model: {0}")]
    Decode(String),

    /// The reference clip could not be attached to the request.
    #[error("cannot read reference audio {path}: {source}")]
    Reference {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
