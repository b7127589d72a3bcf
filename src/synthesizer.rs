//! Paragraph narration: voice rotation, slow-rate gating, clause-by-clause
//! synthesis and pause insertion.

use crate::audio::AudioBuffer;
use crate::backends::{SpeechBackend, SynthesisRequest};
use crate::error::{NarrateurError, Result};
use crate::output::{OutputSink, ParagraphOutcome};
use crate::text::split_clauses;
use crate::voices::{EligibilityTable, PoolVoice, VoicePool};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Speaking rate sent to voices that have not proven they accept a slower one.
pub const NORMAL_SPEAKING_RATE: f32 = 1.0;

/// What to do when a paragraph hits an unrecoverable failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop the run and return the error.
    #[default]
    Abort,
    /// Record the paragraph as failed and go on with the next one.
    Continue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NarrationConfig {
    pub prefix: String,
    pub paragraph_pause: Duration,
    pub punctuation_pause: Duration,
    /// Rate used for slow-eligible voices
    pub speaking_rate: f32,
    /// Paragraphs per voice before rotating
    pub rotate_every: usize,
    pub language_code: String,
    pub sample_rate_hertz: u32,
    pub on_error: ErrorPolicy,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            prefix: "French_".to_string(),
            paragraph_pause: Duration::from_secs(3),
            punctuation_pause: Duration::from_secs(1),
            speaking_rate: 0.85,
            rotate_every: 10,
            language_code: "fr-FR".to_string(),
            sample_rate_hertz: 24_000,
            on_error: ErrorPolicy::Abort,
        }
    }
}

/// Per-clause result. Unrecoverable failures are returned as `Err` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClauseOutcome {
    Synthesized { text: String, frames: usize },
    /// The voice refused the request; the clause has no audio.
    Skipped { text: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphReport {
    /// 1-based position in the input
    pub index: usize,
    pub voice: String,
    pub speaking_rate: f32,
    pub clauses: Vec<ClauseOutcome>,
    pub outcome: ParagraphOutcome,
}

impl ParagraphReport {
    pub fn skipped_clauses(&self) -> usize {
        self.clauses
            .iter()
            .filter(|c| matches!(c, ClauseOutcome::Skipped { .. }))
            .count()
    }
}

fn empty_pool() -> NarrateurError {
    NarrateurError::InvalidSetting("the voice pool is empty".to_string())
}

/// One paragraph's audio before it is handed to a sink.
#[derive(Debug, Clone)]
pub struct AssembledParagraph {
    pub voice: String,
    pub speaking_rate: f32,
    pub audio: AudioBuffer,
    pub clauses: Vec<ClauseOutcome>,
}

pub struct SegmentSynthesizer<'a> {
    backend: &'a dyn SpeechBackend,
    table: &'a EligibilityTable,
    pool: &'a VoicePool,
    config: &'a NarrationConfig,
}

impl<'a> SegmentSynthesizer<'a> {
    /// Fails if the pool is empty, the rotation period is zero, or a pool
    /// voice was never classified.
    pub fn new(
        backend: &'a dyn SpeechBackend,
        table: &'a EligibilityTable,
        pool: &'a VoicePool,
        config: &'a NarrationConfig,
    ) -> Result<Self> {
        if pool.is_empty() {
            return Err(empty_pool());
        }
        if config.rotate_every == 0 {
            return Err(NarrateurError::InvalidSetting(
                "the rotation period must be at least one paragraph".to_string(),
            ));
        }
        pool.check_against(table)?;
        Ok(Self {
            backend,
            table,
            pool,
            config,
        })
    }

    /// Voice for the 1-based `index`.
    pub fn voice_for(&self, index: usize) -> Result<&'a PoolVoice> {
        self.pool
            .voice_for(index, self.config.rotate_every)
            .ok_or_else(empty_pool)
    }

    /// Configured slow rate for voices proven to accept it, normal speed otherwise.
    pub fn rate_for(&self, voice: &PoolVoice) -> Result<f32> {
        match self.table.supports_slow_rate(&voice.name) {
            Some(true) => Ok(self.config.speaking_rate),
            Some(false) => Ok(NORMAL_SPEAKING_RATE),
            None => Err(NarrateurError::UnknownVoice(voice.name.clone())),
        }
    }

    /// Builds the audio for one paragraph without emitting it.
    pub fn assemble(&self, index: usize, paragraph: &str) -> Result<AssembledParagraph> {
        let voice = self.voice_for(index)?;
        let speaking_rate = self.rate_for(voice)?;
        log::info!(
            "Paragraph {}: voice '{}' at rate {}",
            index,
            voice.name,
            speaking_rate
        );

        let mut audio = AudioBuffer::empty(self.config.sample_rate_hertz, 1);
        let mut clauses = Vec::new();

        for segment in split_clauses(paragraph) {
            if segment.is_spoken() {
                let request = SynthesisRequest {
                    text: segment.spoken_text(),
                    language_code: self.config.language_code.clone(),
                    voice_name: voice.name.clone(),
                    gender: voice.gender,
                    speaking_rate,
                    sample_rate_hertz: self.config.sample_rate_hertz,
                };
                match self.backend.synthesize(&request) {
                    Ok(bytes) => {
                        let clip = AudioBuffer::from_wav_bytes(&bytes)?;
                        audio.append(&clip)?;
                        clauses.push(ClauseOutcome::Synthesized {
                            text: request.text,
                            frames: clip.frames(),
                        });
                    }
                    Err(e) if e.is_recoverable() => {
                        log::warn!(
                            "Voice '{}' could not speak \"{}\": {}",
                            voice.name,
                            request.text,
                            e
                        );
                        clauses.push(ClauseOutcome::Skipped {
                            text: request.text,
                            reason: e.to_string(),
                        });
                    }
                    Err(e) => return Err(e),
                }
            }

            if segment.punctuation.is_some() {
                audio.append_silence(self.config.punctuation_pause);
            }
        }

        audio.append_silence(self.config.paragraph_pause);

        Ok(AssembledParagraph {
            voice: voice.name.clone(),
            speaking_rate,
            audio,
            clauses,
        })
    }

    /// Narrates `paragraphs` in order, handing each one to `sink` before
    /// starting the next.
    pub fn narrate(
        &self,
        paragraphs: &[String],
        sink: &mut dyn OutputSink,
    ) -> Result<Vec<ParagraphReport>> {
        let mut reports = Vec::with_capacity(paragraphs.len());

        for (offset, paragraph) in paragraphs.iter().enumerate() {
            let index = offset + 1;
            let result = self.assemble(index, paragraph).and_then(|assembled| {
                let outcome = sink.emit(index, &assembled.audio)?;
                Ok(ParagraphReport {
                    index,
                    voice: assembled.voice,
                    speaking_rate: assembled.speaking_rate,
                    clauses: assembled.clauses,
                    outcome,
                })
            });

            match result {
                Ok(report) => reports.push(report),
                Err(e) if self.config.on_error == ErrorPolicy::Continue => {
                    log::warn!("Paragraph {} failed, continuing: {}", index, e);
                    let voice = self.voice_for(index)?;
                    reports.push(ParagraphReport {
                        index,
                        voice: voice.name.clone(),
                        speaking_rate: self.rate_for(voice)?,
                        clauses: Vec::new(),
                        outcome: ParagraphOutcome::Failed(e.to_string()),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(reports)
    }
}
