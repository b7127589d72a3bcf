use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while probing voices, reading documents and narrating.
#[derive(Debug, Error)]
pub enum NarrateurError {
    /// The input path does not carry a document extension we know how to read.
    #[error("unsupported document format: {0} (expected .docx or .txt)")]
    UnsupportedFormat(PathBuf),

    /// Neither or both of literal text and document path were supplied.
    #[error("invalid invocation: {0}")]
    InvalidInvocation(&'static str),

    /// A narration or probing parameter is out of range.
    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    /// The service rejected the voice/rate combination for this request.
    #[error("voice '{voice}' rejected the request: {message}")]
    VoiceRateUnsupported { voice: String, message: String },

    /// Any other non-success answer from the speech service.
    #[error("speech service failure (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("audio payload could not be decoded: {0}")]
    Decode(String),

    #[error("audio could not be encoded: {0}")]
    Encode(String),

    #[error("malformed document: {0}")]
    Document(String),

    #[error("playback failed: {0}")]
    Playback(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A pool voice is missing from the eligibility table.
    #[error("voice '{0}' is not in the eligibility table")]
    UnknownVoice(String),

    #[error("audio format mismatch: expected {expected}, found {found}")]
    AudioMismatch { expected: String, found: String },
}

impl NarrateurError {
    /// True for failures that only cost the current clause its audio.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, NarrateurError::VoiceRateUnsupported { .. })
    }
}

impl From<zip::result::ZipError> for NarrateurError {
    fn from(e: zip::result::ZipError) -> Self {
        NarrateurError::Document(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NarrateurError>;
