//! # narrateur
//!
//! Turns French text, either a single string or the paragraphs of a `.docx`
//! document, into paced narration through Google Cloud Text-to-Speech.
//!
//! Each paragraph is split into clauses on `. ; : ! ? …`, every clause is
//! synthesized separately, and silences are stitched in after punctuation
//! and at the end of the paragraph. Voices rotate every N paragraphs, and
//! only voices that were probed and shown to accept it get a slowed rate.
//!
//! ```ignore
//! use narrateur::backends::google::{Credentials, GoogleTtsBackend, DEFAULT_ENDPOINT};
//! use narrateur::narrator::{self, Source};
//! use narrateur::synthesizer::NarrationConfig;
//! use narrateur::voices::{PoolVoice, VoicePool};
//! use narrateur::backends::Gender;
//!
//! let backend = GoogleTtsBackend::new(DEFAULT_ENDPOINT, Credentials::ApiKey(key), timeout)?;
//! let table = narrator::eligibility_table(&backend, "fr-FR", 0.5, 24_000, None)?;
//! let pool = VoicePool::new(vec![PoolVoice::new("fr-FR-Wavenet-C", Gender::Female)]);
//! let mut sink = narrator::open_sink(false, "AudioFromText".as_ref(), "French_")?;
//! let source = Source::Text("Bonjour! Ceci est un test.".into());
//! narrator::run(&source, &backend, &table, &pool, &NarrationConfig::default(), sink.as_mut())?;
//! ```

pub mod audio;
pub mod backends;
pub mod config_loader;
pub mod document;
pub mod error;
pub mod narrator;
pub mod output;
pub mod synthesizer;
pub mod text;
pub mod voices;

pub use error::{NarrateurError, Result};
