//! Google Cloud Text-to-Speech over its v1 REST surface.
//!
//! Two calls are used: `GET /v1/voices` for the catalog and
//! `POST /v1/text:synthesize` for audio. Audio is requested as LINEAR16 so
//! the clips can be stitched together sample by sample.

use super::{Gender, SpeechBackend, SynthesisRequest, Voice};
use crate::error::{NarrateurError, Result};
use base64::Engine;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://texttospeech.googleapis.com";

/// How requests are authenticated. Scoped to the client that owns it.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Sent as the `key` query parameter
    ApiKey(String),
    /// Sent as `Authorization: Bearer <token>`
    Bearer(String),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::ApiKey(_) => f.write_str("ApiKey(***)"),
            Credentials::Bearer(_) => f.write_str("Bearer(***)"),
        }
    }
}

pub struct GoogleTtsBackend {
    client: Client,
    endpoint: String,
    credentials: Credentials,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoiceListResponse {
    #[serde(default)]
    voices: Vec<WireVoice>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireVoice {
    name: String,
    #[serde(default)]
    language_codes: Vec<String>,
    #[serde(default)]
    ssml_gender: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeBody<'a> {
    input: WireInput<'a>,
    voice: WireVoiceSelection<'a>,
    audio_config: WireAudioConfig,
}

#[derive(Serialize)]
struct WireInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireVoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
    ssml_gender: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireAudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f32,
    sample_rate_hertz: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GoogleTtsBackend {
    pub fn new(
        endpoint: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            endpoint,
            credentials,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Credentials::ApiKey(key) => request.query(&[("key", key.as_str())]),
            Credentials::Bearer(token) => request.bearer_auth(token),
        }
    }

    /// Turns a non-success response into an error. `voice` is set for
    /// synthesis calls, where an invalid argument means the voice refused
    /// the request parameters.
    fn failure(response: Response, voice: Option<&str>) -> NarrateurError {
        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();
        let parsed = serde_json::from_str::<ErrorEnvelope>(&body).ok();
        classify_failure(status, parsed.map(|e| e.error), &body, voice)
    }
}

fn classify_failure(
    status: u16,
    parsed: Option<ErrorBody>,
    raw_body: &str,
    voice: Option<&str>,
) -> NarrateurError {
    let invalid_argument = match &parsed {
        Some(err) => err.status.as_deref() == Some("INVALID_ARGUMENT"),
        None => status == 400,
    };
    let message = match parsed {
        Some(err) if !err.message.is_empty() => err.message,
        _ => raw_body.trim().to_string(),
    };

    match voice {
        Some(voice) if invalid_argument => NarrateurError::VoiceRateUnsupported {
            voice: voice.to_string(),
            message,
        },
        _ => NarrateurError::Service { status, message },
    }
}

impl SpeechBackend for GoogleTtsBackend {
    fn id(&self) -> &'static str {
        "google-cloud-tts"
    }

    fn list_voices(&self, language_code: &str) -> Result<Vec<Voice>> {
        let request = self
            .client
            .get(format!("{}/v1/voices", self.endpoint))
            .query(&[("languageCode", language_code)]);

        let response = self.authorize(request).send()?;
        log::debug!("GET /v1/voices -> {}", response.status());
        if !response.status().is_success() {
            return Err(Self::failure(response, None));
        }

        let list: VoiceListResponse = response.json()?;
        Ok(list
            .voices
            .into_iter()
            .map(|v| Voice {
                name: v.name,
                language_codes: v.language_codes,
                gender: v
                    .ssml_gender
                    .as_deref()
                    .map(Gender::from_ssml)
                    .unwrap_or(Gender::Unspecified),
            })
            .collect())
    }

    fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>> {
        let body = SynthesizeBody {
            input: WireInput {
                text: &request.text,
            },
            voice: WireVoiceSelection {
                language_code: &request.language_code,
                name: &request.voice_name,
                ssml_gender: request.gender.as_ssml(),
            },
            audio_config: WireAudioConfig {
                audio_encoding: "LINEAR16",
                speaking_rate: request.speaking_rate,
                sample_rate_hertz: request.sample_rate_hertz,
            },
        };

        log::debug!(
            "Synthesizing {} chars with '{}' at rate {}",
            request.text.chars().count(),
            request.voice_name,
            request.speaking_rate
        );

        let http = self
            .client
            .post(format!("{}/v1/text:synthesize", self.endpoint))
            .json(&body);
        let response = self.authorize(http).send()?;
        if !response.status().is_success() {
            return Err(Self::failure(response, Some(&request.voice_name)));
        }

        let payload: SynthesizeResponse = response.json()?;
        base64::engine::general_purpose::STANDARD
            .decode(payload.audio_content.as_bytes())
            .map_err(|e| NarrateurError::Decode(format!("audioContent is not base64: {}", e)))
    }
}
