//! Voice capability probing, the eligibility table it produces, and the
//! rotation pool the narrator cycles through.

use crate::backends::{Gender, SpeechBackend, SynthesisRequest, Voice};
use crate::error::{NarrateurError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Short text spoken once per voice while probing.
pub const PROBE_TEXT: &str = "Test text for compatibility check.";

/// Result of probing: each candidate voice lands in exactly one list.
#[derive(Debug, Default, Clone)]
pub struct ProbeOutcome {
    pub accepting: Vec<Voice>,
    pub rejecting: Vec<Voice>,
}

/// Asks every voice of `language_code` to speak [`PROBE_TEXT`] at `trial_rate`.
///
/// A voice that answers goes to `accepting`; one that reports an invalid
/// argument goes to `rejecting`. Any other failure aborts the probe.
/// One network call per candidate, no retries.
pub fn probe(
    backend: &dyn SpeechBackend,
    language_code: &str,
    trial_rate: f32,
    sample_rate_hertz: u32,
) -> Result<ProbeOutcome> {
    if trial_rate >= 1.0 {
        return Err(NarrateurError::InvalidSetting(format!(
            "probe speaking rate {} must be below 1.0",
            trial_rate
        )));
    }

    let candidates: Vec<Voice> = backend
        .list_voices(language_code)?
        .into_iter()
        .filter(|v| v.supports_language(language_code))
        .collect();
    log::info!(
        "Probing {} {} voices at speaking rate {}",
        candidates.len(),
        language_code,
        trial_rate
    );

    let mut outcome = ProbeOutcome::default();
    for voice in candidates {
        let request = SynthesisRequest {
            text: PROBE_TEXT.to_string(),
            language_code: language_code.to_string(),
            voice_name: voice.name.clone(),
            gender: voice.gender,
            speaking_rate: trial_rate,
            sample_rate_hertz,
        };
        match backend.synthesize(&request) {
            Ok(_) => outcome.accepting.push(voice),
            Err(NarrateurError::VoiceRateUnsupported { message, .. }) => {
                log::debug!("'{}' refuses slow rate: {}", voice.name, message);
                outcome.rejecting.push(voice);
            }
            Err(e) => return Err(e),
        }
    }

    log::info!(
        "{} voices accept a slow rate, {} do not",
        outcome.accepting.len(),
        outcome.rejecting.len()
    );
    Ok(outcome)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub supports_slow_rate: bool,
    pub gender: Gender,
}

/// Voice name -> slow-rate eligibility. Built once per run, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EligibilityTable {
    voices: BTreeMap<String, Eligibility>,
}

impl EligibilityTable {
    pub fn build(accepting: &[Voice], rejecting: &[Voice]) -> Self {
        let mut voices = BTreeMap::new();
        for (list, supports_slow_rate) in [(accepting, true), (rejecting, false)] {
            for voice in list {
                voices.insert(
                    voice.name.clone(),
                    Eligibility {
                        supports_slow_rate,
                        gender: voice.gender,
                    },
                );
            }
        }
        Self { voices }
    }

    pub fn from_probe(outcome: &ProbeOutcome) -> Self {
        Self::build(&outcome.accepting, &outcome.rejecting)
    }

    pub fn get(&self, voice_name: &str) -> Option<&Eligibility> {
        self.voices.get(voice_name)
    }

    pub fn supports_slow_rate(&self, voice_name: &str) -> Option<bool> {
        self.get(voice_name).map(|e| e.supports_slow_rate)
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Entries in voice-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Eligibility)> {
        self.voices.iter().map(|(name, e)| (name.as_str(), e))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// A voice the narrator may rotate to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolVoice {
    pub name: String,
    pub gender: Gender,
}

impl PoolVoice {
    pub fn new(name: impl Into<String>, gender: Gender) -> Self {
        Self {
            name: name.into(),
            gender,
        }
    }
}

/// Pool index for the 1-based `paragraph_index`:
/// `floor((paragraph_index - 1) / rotate_every) mod pool_size`.
pub fn rotation_index(paragraph_index: usize, rotate_every: usize, pool_size: usize) -> usize {
    debug_assert!(paragraph_index >= 1 && rotate_every > 0 && pool_size > 0);
    (paragraph_index.saturating_sub(1) / rotate_every.max(1)) % pool_size.max(1)
}

/// Fixed, ordered list of voices used for rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoicePool {
    voices: Vec<PoolVoice>,
}

impl VoicePool {
    pub fn new(voices: Vec<PoolVoice>) -> Self {
        Self { voices }
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn voices(&self) -> &[PoolVoice] {
        &self.voices
    }

    /// Voice narrating the 1-based `paragraph_index`.
    pub fn voice_for(&self, paragraph_index: usize, rotate_every: usize) -> Option<&PoolVoice> {
        if self.voices.is_empty() {
            return None;
        }
        self.voices
            .get(rotation_index(paragraph_index, rotate_every, self.voices.len()))
    }

    /// Every pool voice must have been classified before narration starts.
    pub fn check_against(&self, table: &EligibilityTable) -> Result<()> {
        match self.voices.iter().find(|v| table.get(&v.name).is_none()) {
            Some(missing) => Err(NarrateurError::UnknownVoice(missing.name.clone())),
            None => Ok(()),
        }
    }
}
