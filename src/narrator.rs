//! Entry point tying extraction, voice classification and synthesis together.

use crate::backends::SpeechBackend;
use crate::document;
use crate::error::{NarrateurError, Result};
use crate::output::{FileSink, OutputSink, SpeakerSink};
use crate::synthesizer::{NarrationConfig, ParagraphReport, SegmentSynthesizer};
use crate::voices::{self, EligibilityTable, VoicePool};
use std::path::{Path, PathBuf};

/// What to narrate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Ad-hoc text, narrated as a single paragraph
    Text(String),
    /// A `.docx` or `.txt` document
    Document(PathBuf),
}

impl Source {
    /// Exactly one of `text` and `path` must be given. Blank text counts as
    /// absent. A document with an unknown extension is refused here, before
    /// any work starts.
    pub fn from_options(text: Option<String>, path: Option<PathBuf>) -> Result<Self> {
        let text = text.filter(|t| !t.trim().is_empty());
        match (text, path) {
            (Some(text), None) => Ok(Source::Text(text)),
            (None, Some(path)) => {
                document::DocumentFormat::from_path(&path)?;
                Ok(Source::Document(path))
            }
            (Some(_), Some(_)) => Err(NarrateurError::InvalidInvocation(
                "give either text or a document path, not both",
            )),
            (None, None) => Err(NarrateurError::InvalidInvocation(
                "either text or a document path must be provided",
            )),
        }
    }

    pub fn paragraphs(&self) -> Result<Vec<String>> {
        match self {
            Source::Text(text) => Ok(vec![text.clone()]),
            Source::Document(path) => document::extract(path),
        }
    }
}

/// Loads a cached eligibility table when `cache` is given, probes otherwise.
pub fn eligibility_table(
    backend: &dyn SpeechBackend,
    language_code: &str,
    probe_rate: f32,
    sample_rate_hertz: u32,
    cache: Option<&Path>,
) -> Result<EligibilityTable> {
    if let Some(path) = cache {
        let table = EligibilityTable::load(path)?;
        log::info!(
            "Loaded {} classified voices from {}",
            table.len(),
            path.display()
        );
        return Ok(table);
    }
    let outcome = voices::probe(backend, language_code, probe_rate, sample_rate_hertz)?;
    Ok(EligibilityTable::from_probe(&outcome))
}

/// Speaker when `play` is set, otherwise files under `output_dir`.
pub fn open_sink(play: bool, output_dir: &Path, prefix: &str) -> Result<Box<dyn OutputSink>> {
    if play {
        Ok(Box::new(SpeakerSink::new()?))
    } else {
        Ok(Box::new(FileSink::new(output_dir, prefix)?))
    }
}

/// Narrates `source` paragraph by paragraph into `sink`.
pub fn run(
    source: &Source,
    backend: &dyn SpeechBackend,
    table: &EligibilityTable,
    pool: &VoicePool,
    config: &NarrationConfig,
    sink: &mut dyn OutputSink,
) -> Result<Vec<ParagraphReport>> {
    let synthesizer = SegmentSynthesizer::new(backend, table, pool, config)?;
    let paragraphs = source.paragraphs()?;
    log::info!(
        "Narrating {} paragraph(s) with {} via {}",
        paragraphs.len(),
        pool.len(),
        backend.id()
    );
    synthesizer.narrate(&paragraphs, sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_requires_exactly_one_input() {
        assert_eq!(
            Source::from_options(Some("Bonjour".into()), None).unwrap(),
            Source::Text("Bonjour".into())
        );
        assert_eq!(
            Source::from_options(None, Some("livre.docx".into())).unwrap(),
            Source::Document("livre.docx".into())
        );
        assert!(matches!(
            Source::from_options(Some("Bonjour".into()), Some("livre.docx".into())),
            Err(NarrateurError::InvalidInvocation(_))
        ));
        assert!(matches!(
            Source::from_options(None, None),
            Err(NarrateurError::InvalidInvocation(_))
        ));
        assert!(matches!(
            Source::from_options(Some("   ".into()), None),
            Err(NarrateurError::InvalidInvocation(_))
        ));
        assert!(matches!(
            Source::from_options(None, Some("livre.pdf".into())),
            Err(NarrateurError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_text_source_is_one_paragraph() {
        let source = Source::Text("Un. Deux.".into());
        assert_eq!(source.paragraphs().unwrap(), vec!["Un. Deux.".to_string()]);
    }
}
