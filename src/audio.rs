use crate::error::{NarrateurError, Result};
use mp3lame_encoder::{Builder, FlushNoGap, InterleavedPcm, MonoPcm};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

/// File extension of saved paragraphs.
pub const AUDIO_EXTENSION: &str = "mp3";

// LAME needs this much room for the final frames on flush
const MP3_FLUSH_RESERVE: usize = 7200;

/// 16-bit PCM assembled clip by clip for one paragraph.
///
/// The format is the one requested from the service; a clip in any other
/// format is rejected rather than resampled.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Interleaved samples
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBuffer {
    pub fn empty(sample_rate: u32, channels: u16) -> Self {
        Self {
            samples: Vec::new(),
            sample_rate,
            channels,
        }
    }

    /// Decodes a LINEAR16 WAV payload as returned by the speech service.
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
            return Err(NarrateurError::Decode(format!(
                "expected 16-bit PCM, got {}-bit {:?}",
                spec.bits_per_sample, spec.sample_format
            )));
        }
        let samples = reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }

    /// Appends `clip`; both buffers must share rate and channel count.
    /// An empty buffer adopts the clip's format.
    pub fn append(&mut self, clip: &AudioBuffer) -> Result<()> {
        if self.samples.is_empty() {
            self.sample_rate = clip.sample_rate;
            self.channels = clip.channels;
        } else if self.format() != clip.format() {
            return Err(NarrateurError::AudioMismatch {
                expected: describe(self.format()),
                found: describe(clip.format()),
            });
        }
        self.samples.extend_from_slice(&clip.samples);
        Ok(())
    }

    /// Appends exactly `duration` of silence, rounded to the nearest frame.
    pub fn append_silence(&mut self, duration: Duration) {
        let frames = (duration.as_secs_f64() * self.sample_rate as f64).round() as usize;
        let len = self.samples.len() + frames * self.channels as usize;
        self.samples.resize(len, 0);
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Encodes the buffer as MP3 at the encoder's default bitrate.
    pub fn encode_mp3(&self) -> Result<Vec<u8>> {
        if !(1..=2).contains(&self.channels) {
            return Err(NarrateurError::Encode(format!(
                "MP3 holds one or two channels, got {}",
                self.channels
            )));
        }

        let mut builder = Builder::new()
            .ok_or_else(|| NarrateurError::Encode("could not allocate the MP3 encoder".into()))?;
        builder
            .set_num_channels(self.channels as u8)
            .map_err(encoder_error)?;
        builder
            .set_sample_rate(self.sample_rate)
            .map_err(encoder_error)?;
        let mut encoder = builder.build().map_err(encoder_error)?;

        let mut mp3 = Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(
            self.samples.len(),
        ));
        let encoded = if self.channels == 1 {
            encoder.encode_to_vec(MonoPcm(&self.samples), &mut mp3)
        } else {
            encoder.encode_to_vec(InterleavedPcm(&self.samples), &mut mp3)
        };
        encoded.map_err(encoder_error)?;

        mp3.reserve(MP3_FLUSH_RESERVE);
        encoder
            .flush_to_vec::<FlushNoGap>(&mut mp3)
            .map_err(encoder_error)?;
        Ok(mp3)
    }

    /// Writes the buffer to `path` as an MP3 file.
    pub fn write_mp3(&self, path: &Path) -> Result<()> {
        let mp3 = self.encode_mp3()?;
        std::fs::write(path, mp3)?;
        Ok(())
    }

    fn format(&self) -> (u32, u16) {
        (self.sample_rate, self.channels)
    }
}

fn encoder_error(e: impl std::fmt::Debug) -> NarrateurError {
    NarrateurError::Encode(format!("{:?}", e))
}

fn describe((rate, channels): (u32, u16)) -> String {
    format!("{} Hz x{}", rate, channels)
}

/// Encodes samples as an in-memory 16-bit WAV file.
pub fn wav_bytes(samples: &[i16], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}
