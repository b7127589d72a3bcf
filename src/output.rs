use crate::audio::{AudioBuffer, AUDIO_EXTENSION};
use crate::error::{NarrateurError, Result};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};
use std::path::{Path, PathBuf};

/// What became of one paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParagraphOutcome {
    Saved(PathBuf),
    Played,
    /// Only produced under the `continue` error policy.
    Failed(String),
}

/// Destination for assembled paragraphs, called once per paragraph in order.
pub trait OutputSink {
    fn emit(&mut self, index: usize, audio: &AudioBuffer) -> Result<ParagraphOutcome>;
}

/// Writes `{dir}/{prefix}{index}.mp3`.
pub struct FileSink {
    dir: PathBuf,
    prefix: String,
}

impl FileSink {
    /// Creates the output directory if needed.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            prefix: prefix.into(),
        })
    }

    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir
            .join(format!("{}{}.{}", self.prefix, index, AUDIO_EXTENSION))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputSink for FileSink {
    fn emit(&mut self, index: usize, audio: &AudioBuffer) -> Result<ParagraphOutcome> {
        let path = self.path_for(index);
        audio.write_mp3(&path)?;
        log::info!("Saved paragraph {} as '{}'.", index, path.display());
        Ok(ParagraphOutcome::Saved(path))
    }
}

/// Plays each paragraph on the default output device, blocking until done.
pub struct SpeakerSink {
    // The stream must outlive every sink created from its handle
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl SpeakerSink {
    pub fn new() -> Result<Self> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| NarrateurError::Playback(format!("no audio output device: {}", e)))?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }
}

impl OutputSink for SpeakerSink {
    fn emit(&mut self, index: usize, audio: &AudioBuffer) -> Result<ParagraphOutcome> {
        let sink = Sink::try_new(&self.handle)
            .map_err(|e| NarrateurError::Playback(format!("failed to create sink: {}", e)))?;
        log::info!(
            "Playing paragraph {} ({:.1}s)",
            index,
            audio.duration().as_secs_f32()
        );
        sink.append(SamplesBuffer::new(
            audio.channels,
            audio.sample_rate,
            audio.samples.clone(),
        ));
        sink.sleep_until_end();
        Ok(ParagraphOutcome::Played)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_file_sink_names_by_prefix_and_index() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("AudioFromText");
        let mut sink = FileSink::new(&out, "French_").unwrap();
        assert!(out.is_dir());

        let mut audio = AudioBuffer::empty(24_000, 1);
        audio.append_silence(Duration::from_millis(100));
        let outcome = sink.emit(7, &audio).unwrap();

        let expected = out.join("French_7.mp3");
        assert_eq!(outcome, ParagraphOutcome::Saved(expected.clone()));
        assert!(expected.is_file());

        let file = std::io::BufReader::new(std::fs::File::open(&expected).unwrap());
        let decoded = rodio::Decoder::new(file).unwrap();
        assert!(decoded.count() > 0);
    }
}
