//! Explicit pipeline configuration.
//!
//! Every component receives the slice of [`PipelineConfig`] it needs at construction time. The
//! file form is JSON with every field optional; credentials and service endpoints can be
//! overridden from the environment so they never need to live in the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::curve::model::DEFAULT_CHANNEL_PREFIX;
use crate::foundation::core::Fps;
use crate::foundation::error::{FacecastError, FacecastResult};

/// Environment variable overriding [`InferenceConfig::url`].
pub const ENV_INFERENCE_URL: &str = "FACECAST_INFERENCE_URL";
/// Environment variable overriding [`InferenceConfig::api_key`].
pub const ENV_INFERENCE_API_KEY: &str = "FACECAST_INFERENCE_API_KEY";
/// Environment variable overriding [`InferenceConfig::function_id`].
pub const ENV_INFERENCE_FUNCTION_ID: &str = "FACECAST_INFERENCE_FUNCTION_ID";
/// Environment variable overriding [`SpeechConfig::base_url`].
pub const ENV_TTS_URL: &str = "FACECAST_TTS_URL";
/// Environment variable overriding [`SpeechConfig::api_key`].
pub const ENV_TTS_API_KEY: &str = "FACECAST_TTS_API_KEY";
/// Environment variable overriding [`RenderConfig::host_executable`].
pub const ENV_RENDER_HOST: &str = "FACECAST_RENDER_HOST";

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub inference: InferenceConfig,
    pub speech: SpeechConfig,
    pub render: RenderConfig,
    pub encoder: EncoderConfig,
    /// Voice preset name → character rig. Empty means [`default_presets`].
    pub presets: BTreeMap<String, CharacterPreset>,
}

/// Streaming inference service settings.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// `ws://` or `wss://` endpoint of the animation inference service.
    pub url: String,
    /// Bearer credential sent as channel metadata.
    pub api_key: Option<String>,
    /// Function/route identifier sent as channel metadata.
    pub function_id: Option<String>,
    /// Samples per uploaded audio chunk; `None` means 100 ms of audio.
    pub chunk_samples: Option<usize>,
    pub connect_timeout_secs: u64,
    /// Model configuration JSON forwarded in the stream header.
    pub model_config: Option<PathBuf>,
    /// Namespace prefix put in front of bare channel names.
    pub channel_prefix: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:52000/a2f".to_string(),
            api_key: None,
            function_id: None,
            chunk_samples: None,
            connect_timeout_secs: 30,
            model_config: None,
            channel_prefix: DEFAULT_CHANNEL_PREFIX.to_string(),
        }
    }
}

/// Speech synthesis collaborator settings.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Base URL of an OpenAI-compatible API (`.../v1`).
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    /// Sample rate of the returned mono PCM16.
    pub sample_rate: u32,
    pub timeout_secs: u64,
    /// Length of the silent track used when synthesis fails.
    pub silence_fallback_secs: f64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/v1".to_string(),
            api_key: None,
            model: "higgs-audio-generation".to_string(),
            sample_rate: crate::audio::buffer::DEFAULT_SAMPLE_RATE,
            timeout_secs: 120,
            silence_fallback_secs: 2.0,
        }
    }
}

/// Render host and frame output settings.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Explicit host executable; must exist when set.
    pub host_executable: Option<PathBuf>,
    /// Names tried on `PATH` when no explicit executable is set.
    pub host_candidates: Vec<String>,
    /// Script the host runs (passed as `--script`); unset for hosts with a built-in rig.
    pub script: Option<PathBuf>,
    /// Shared frame output directory; one active render per directory.
    pub frames_dir: PathBuf,
    pub frames_prefix: String,
    pub fps: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            host_executable: None,
            host_candidates: vec!["facecast-host".to_string(), "facecast-host.exe".to_string()],
            script: None,
            frames_dir: std::env::temp_dir().join("facecast_frames"),
            frames_prefix: "render_frames_".to_string(),
            fps: 30,
        }
    }
}

impl RenderConfig {
    pub fn fps(&self) -> FacecastResult<Fps> {
        Fps::whole(self.fps)
    }
}

/// External encoder settings.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub executable: Option<PathBuf>,
    pub candidates: Vec<String>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            executable: None,
            candidates: vec!["ffmpeg".to_string(), "ffmpeg.exe".to_string()],
        }
    }
}

/// Character rig driven for one voice preset.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CharacterPreset {
    /// Scene file handed to the render host.
    pub scene: PathBuf,
    /// Voice name passed to the speech service; defaults to the preset name.
    #[serde(default)]
    pub voice: Option<String>,
    /// Selector arguments forwarded to the embedded script after `<fps>`.
    #[serde(default)]
    pub selector: Vec<String>,
}

/// Built-in presets: female voices drive the named-object rig, male voices the collection rig.
pub fn default_presets() -> BTreeMap<String, CharacterPreset> {
    let named = |voice: &str| CharacterPreset {
        scene: PathBuf::from("scenes/belinda.json"),
        voice: Some(voice.to_string()),
        selector: Vec::new(),
    };
    let grouped = |voice: &str| CharacterPreset {
        scene: PathBuf::from("scenes/broomsman.json"),
        voice: Some(voice.to_string()),
        selector: vec!["collection".to_string(), "grp_blendShapes_01".to_string()],
    };

    let mut out = BTreeMap::new();
    for voice in ["belinda", "en_woman", "mabel"] {
        out.insert(voice.to_string(), named(voice));
    }
    for voice in ["broom_salesman", "chadwick", "en_man", "vex", "zh_man_sichuan"] {
        out.insert(voice.to_string(), grouped(voice));
    }
    out
}

impl PipelineConfig {
    /// Parse configuration JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> FacecastResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| FacecastError::configuration(format!("parse config JSON: {e}")))
    }

    /// Parse a configuration file.
    pub fn from_path(path: &Path) -> FacecastResult<Self> {
        let f = std::fs::File::open(path).map_err(|e| {
            FacecastError::configuration(format!("open config '{}': {e}", path.display()))
        })?;
        Self::from_reader(std::io::BufReader::new(f))
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay values from `lookup`, ignoring empty values.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get(ENV_INFERENCE_URL) {
            self.inference.url = v;
        }
        if let Some(v) = get(ENV_INFERENCE_API_KEY) {
            self.inference.api_key = Some(v);
        }
        if let Some(v) = get(ENV_INFERENCE_FUNCTION_ID) {
            self.inference.function_id = Some(v);
        }
        if let Some(v) = get(ENV_TTS_URL) {
            self.speech.base_url = v;
        }
        if let Some(v) = get(ENV_TTS_API_KEY) {
            self.speech.api_key = Some(v);
        }
        if let Some(v) = get(ENV_RENDER_HOST) {
            self.render.host_executable = Some(PathBuf::from(v));
        }
    }

    /// Look up a preset, falling back to the built-in table when none are configured.
    pub fn preset(&self, name: &str) -> FacecastResult<CharacterPreset> {
        let found = if self.presets.is_empty() {
            default_presets().remove(name)
        } else {
            self.presets.get(name).cloned()
        };
        found.ok_or_else(|| FacecastError::configuration(format!("unknown preset '{name}'")))
    }

    /// Check values no component can run with.
    pub fn validate(&self) -> FacecastResult<()> {
        self.render.fps()?;
        if self.render.frames_prefix.is_empty() {
            return Err(FacecastError::configuration(
                "render.frames_prefix must not be empty",
            ));
        }
        if self.render.frames_prefix.contains(['/', '\\']) {
            return Err(FacecastError::configuration(
                "render.frames_prefix must be a file name prefix, not a path",
            ));
        }
        if self.inference.chunk_samples == Some(0) {
            return Err(FacecastError::configuration(
                "inference.chunk_samples must be non-zero",
            ));
        }
        if self.speech.sample_rate == 0 {
            return Err(FacecastError::configuration(
                "speech.sample_rate must be non-zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
