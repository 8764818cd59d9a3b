use std::path::Path;

use crate::foundation::error::{FacecastError, FacecastResult};

/// Sample rate the speech collaborator produces by default.
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

/// PCM layout of an [`AudioBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AudioFormat {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
    /// Bytes per sample (2 for PCM16).
    pub sample_width: u16,
}

impl AudioFormat {
    /// Mono 16-bit PCM at `sample_rate`.
    pub fn mono_pcm16(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: 1,
            sample_width: 2,
        }
    }

    pub fn bits_per_sample(self) -> u16 {
        self.sample_width * 8
    }

    fn validate(self) -> FacecastResult<()> {
        if self.sample_rate == 0 {
            return Err(FacecastError::audio("sample_rate must be non-zero"));
        }
        if self.channels == 0 {
            return Err(FacecastError::audio("channels must be non-zero"));
        }
        if self.sample_width != 2 {
            return Err(FacecastError::audio(format!(
                "only 16-bit PCM is supported (got {} bytes per sample)",
                self.sample_width
            )));
        }
        Ok(())
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::mono_pcm16(DEFAULT_SAMPLE_RATE)
    }
}

/// Immutable interleaved PCM16 audio owned by one pipeline invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    format: AudioFormat,
    samples: Vec<i16>,
}

impl AudioBuffer {
    /// Wrap interleaved samples.
    pub fn new(format: AudioFormat, samples: Vec<i16>) -> FacecastResult<Self> {
        format.validate()?;
        if !samples.len().is_multiple_of(format.channels as usize) {
            return Err(FacecastError::audio(
                "sample count is not a multiple of the channel count",
            ));
        }
        Ok(Self { format, samples })
    }

    /// Decode raw little-endian PCM16 bytes as returned by the speech service.
    pub fn from_pcm16_le(format: AudioFormat, bytes: &[u8]) -> FacecastResult<Self> {
        if !bytes.len().is_multiple_of(2) {
            return Err(FacecastError::audio(format!(
                "raw PCM16 payload has odd length {}",
                bytes.len()
            )));
        }
        let samples = bytes
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        Self::new(format, samples)
    }

    /// Silent buffer of (at least) `secs` seconds.
    pub fn silence(format: AudioFormat, secs: f64) -> FacecastResult<Self> {
        format.validate()?;
        let frames = (secs.max(0.0) * f64::from(format.sample_rate)).ceil() as usize;
        Self::new(format, vec![0; frames * format.channels as usize])
    }

    /// Load a PCM16 WAV file.
    pub fn read_wav(path: &Path) -> FacecastResult<Self> {
        let mut reader = hound::WavReader::open(path).map_err(|e| {
            FacecastError::audio(format!("open wav '{}': {e}", path.display()))
        })?;
        let spec = reader.spec();
        if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
            return Err(FacecastError::audio(format!(
                "'{}' must be 16-bit integer PCM (got {:?} {} bits)",
                path.display(),
                spec.sample_format,
                spec.bits_per_sample
            )));
        }
        let samples = reader
            .samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| FacecastError::audio(format!("read wav '{}': {e}", path.display())))?;
        Self::new(
            AudioFormat {
                sample_rate: spec.sample_rate,
                channels: spec.channels,
                sample_width: 2,
            },
            samples,
        )
    }

    /// Write the buffer as a PCM16 WAV file, creating parent directories.
    pub fn write_wav(&self, path: &Path) -> FacecastResult<()> {
        crate::encode::mux::ensure_parent_dir(path)?;
        let spec = hound::WavSpec {
            channels: self.format.channels,
            sample_rate: self.format.sample_rate,
            bits_per_sample: self.format.bits_per_sample(),
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).map_err(|e| {
            FacecastError::audio(format!("create wav '{}': {e}", path.display()))
        })?;
        for &s in &self.samples {
            writer
                .write_sample(s)
                .map_err(|e| FacecastError::audio(format!("write wav sample: {e}")))?;
        }
        writer
            .finalize()
            .map_err(|e| FacecastError::audio(format!("finalize wav '{}': {e}", path.display())))
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        let frames = self.samples.len() / self.format.channels as usize;
        frames as f64 / f64::from(self.format.sample_rate)
    }

    /// Split into little-endian byte chunks of at most `samples_per_chunk` interleaved frames.
    pub fn pcm16_chunks(&self, samples_per_chunk: usize) -> impl Iterator<Item = Vec<u8>> + '_ {
        let step = samples_per_chunk.max(1) * self.format.channels as usize;
        self.samples.chunks(step).map(|chunk| {
            let mut out = Vec::with_capacity(chunk.len() * 2);
            for s in chunk {
                out.extend_from_slice(&s.to_le_bytes());
            }
            out
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/buffer.rs"]
mod tests;
