use std::collections::BTreeMap;
use std::path::Path;

use base64::Engine as _;

use crate::audio::buffer::AudioFormat;
use crate::foundation::error::{FacecastError, FacecastResult};

/// Inference model parameters forwarded verbatim in the stream header.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Face model tuning (e.g. `lowerFaceSmoothing`, `skinStrength`).
    pub face_parameters: BTreeMap<String, f64>,
    /// Per-blendshape output multipliers.
    pub blendshape_multipliers: BTreeMap<String, f64>,
    /// Per-blendshape output offsets.
    pub blendshape_offsets: BTreeMap<String, f64>,
    /// Preferred emotion weights.
    pub emotions: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion_strength: Option<f64>,
}

impl ModelConfig {
    pub fn from_path(path: &Path) -> FacecastResult<Self> {
        let f = std::fs::File::open(path).map_err(|e| {
            FacecastError::configuration(format!("open model config '{}': {e}", path.display()))
        })?;
        serde_json::from_reader(std::io::BufReader::new(f)).map_err(|e| {
            FacecastError::configuration(format!("parse model config '{}': {e}", path.display()))
        })
    }
}

/// Upload-direction messages.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// First message: audio layout and model parameters.
    Header {
        sample_rate: u32,
        channels: u16,
        bits_per_sample: u16,
        model: ModelConfig,
    },
    /// One audio chunk, base64 little-endian PCM16.
    Audio { seq: u64, data: String },
    /// No more audio will follow; results may still be pending.
    EndOfAudio,
}

impl ClientMessage {
    pub fn header(format: AudioFormat, model: &ModelConfig) -> Self {
        Self::Header {
            sample_rate: format.sample_rate,
            channels: format.channels,
            bits_per_sample: format.bits_per_sample(),
            model: model.clone(),
        }
    }

    pub fn audio(seq: u64, pcm: &[u8]) -> Self {
        Self::Audio {
            seq,
            data: base64::engine::general_purpose::STANDARD.encode(pcm),
        }
    }

    pub fn to_json(&self) -> FacecastResult<String> {
        serde_json::to_string(self)
            .map_err(|e| FacecastError::stream(format!("encode upload message: {e}")))
    }
}

/// Download-direction messages.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Channel names for every following `AnimationData`; sent once, before any data.
    BlendshapeNames { names: Vec<String> },
    /// Weights at one time code, aligned with the names header.
    AnimationData { time_code: f64, values: Vec<f64> },
    /// Service status; a non-zero code ends the stream with an error.
    Status {
        code: i32,
        #[serde(default)]
        message: String,
    },
    /// The service produced its last frame.
    EndOfStream,
}

impl ServerMessage {
    /// Decode one inbound text frame. Anything that does not decode is a malformed frame.
    pub fn from_json(text: &str) -> FacecastResult<Self> {
        serde_json::from_str(text).map_err(|e| {
            let preview: String = text.chars().take(80).collect();
            FacecastError::malformed(format!("undecodable message ({e}): {preview}"))
        })
    }

    pub fn to_json(&self) -> FacecastResult<String> {
        serde_json::to_string(self)
            .map_err(|e| FacecastError::stream(format!("encode download message: {e}")))
    }
}

/// Decode the PCM payload of an [`ClientMessage::Audio`] message.
pub fn decode_audio_payload(data: &str) -> FacecastResult<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| FacecastError::malformed(format!("audio payload is not base64: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/inference/protocol.rs"]
mod tests;
