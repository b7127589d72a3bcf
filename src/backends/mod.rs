pub mod google;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SSML gender attached to a voice in the service catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "MALE")]
    Male,
    #[serde(rename = "FEMALE")]
    Female,
    #[serde(rename = "SSML_VOICE_GENDER_UNSPECIFIED")]
    Unspecified,
}

impl Gender {
    /// Maps the service's gender string; `NEUTRAL` and unknown values
    /// collapse to `Unspecified`.
    pub fn from_ssml(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "MALE" => Gender::Male,
            "FEMALE" => Gender::Female,
            _ => Gender::Unspecified,
        }
    }

    pub fn as_ssml(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Unspecified => "SSML_VOICE_GENDER_UNSPECIFIED",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_ssml())
    }
}

/// Represents a text-to-speech voice from the service catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    pub language_codes: Vec<String>,
    pub gender: Gender,
}

impl Voice {
    pub fn supports_language(&self, language_code: &str) -> bool {
        self.language_codes.iter().any(|code| code == language_code)
    }
}

/// One synthesis call: a clause of text plus the voice and pacing to speak it with.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub language_code: String,
    pub voice_name: String,
    pub gender: Gender,
    pub speaking_rate: f32,
    pub sample_rate_hertz: u32,
}

/// Trait that every speech synthesis service must implement.
pub trait SpeechBackend: Send + Sync {
    /// Returns the voices the service offers for a language code
    fn list_voices(&self, language_code: &str) -> Result<Vec<Voice>>;

    /// Returns the encoded audio (LINEAR16 in a WAV container) for the request.
    /// A voice that refuses the requested rate yields
    /// `NarrateurError::VoiceRateUnsupported`.
    fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>>;

    /// Returns the unique ID of the backend (e.g., "google-cloud-tts")
    fn id(&self) -> &'static str;
}
