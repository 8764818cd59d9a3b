//! One request end to end: speech, curve, render, mux.
//!
//! Stages run strictly in order and every failure is reported once, tagged with the stage it
//! ended. The curve is validated before the render host is launched, and the frames directory is
//! held exclusively from the first rendered frame until the video is written.

/// Frames directory single-flight lock.
pub mod lock;

use std::path::PathBuf;

use crate::audio::buffer::AudioBuffer;
use crate::audio::synth::{SpeechSynthesizer, synthesize_or_silence};
use crate::config::PipelineConfig;
use crate::curve::artifact::read_curve;
use crate::driver::host::frame_pattern;
use crate::encode::mux::Muxer;
use crate::foundation::cancel::CancelSignal;
use crate::foundation::error::{FacecastError, FacecastResult, Stage};
use crate::inference::channel::Connector;
use crate::inference::client::StreamingClient;
use crate::inference::protocol::ModelConfig;
use crate::launch::host::{HostInvocation, host_failure, launch};
use crate::mapping::selector::TargetSelector;
use crate::pipeline::lock::{FramesDirLock, clear_stale_frames, count_frames};
use crate::rig::ScriptArgs;

/// File names of the intermediate artifacts inside a request's work directory.
pub const SPEECH_FILE: &str = "speech.wav";
pub const CURVE_FILE: &str = "curve.csv";

/// Where a request's speech comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum SpeechSource {
    /// Synthesize `text` with the preset's voice.
    Text(String),
    /// A pre-recorded WAV file.
    Wav(PathBuf),
}

/// One end-user request.
#[derive(Clone, Debug, PartialEq)]
pub struct RunRequest {
    pub speech: SpeechSource,
    /// Voice preset selecting the voice and the character rig.
    pub preset: String,
    /// Directory for the speech and curve artifacts.
    pub work_dir: PathBuf,
    /// Final video path.
    pub output: PathBuf,
}

/// Terminal failure of a run.
#[derive(thiserror::Error, Debug)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineFailure {
    pub stage: Stage,
    #[source]
    pub source: FacecastError,
}

impl PipelineFailure {
    pub fn at(stage: Stage, source: FacecastError) -> Self {
        Self { stage, source }
    }
}

/// Result of a run.
pub type PipelineResult<T> = Result<T, PipelineFailure>;

trait StageExt<T> {
    fn stage(self, stage: Stage) -> PipelineResult<T>;
}

impl<T> StageExt<T> for FacecastResult<T> {
    fn stage(self, stage: Stage) -> PipelineResult<T> {
        self.map_err(|e| PipelineFailure::at(stage, e))
    }
}

async fn or_cancelled<T>(
    fut: impl std::future::Future<Output = FacecastResult<T>>,
    cancel: &CancelSignal,
    what: &str,
) -> FacecastResult<T> {
    let mut cancel = cancel.clone();
    tokio::select! {
        r = fut => r,
        _ = cancel.cancelled() => Err(FacecastError::cancelled(format!("{what} cancelled"))),
    }
}

/// The speech-to-video pipeline.
pub struct Pipeline<C> {
    config: PipelineConfig,
    synth: Box<dyn SpeechSynthesizer>,
    client: StreamingClient<C>,
    model: ModelConfig,
}

impl<C: Connector> Pipeline<C> {
    /// Validate `config` and load the inference model configuration it names.
    pub fn new(
        config: PipelineConfig,
        synth: Box<dyn SpeechSynthesizer>,
        connector: C,
    ) -> FacecastResult<Self> {
        config.validate()?;
        let model = match &config.inference.model_config {
            Some(path) => ModelConfig::from_path(path)?,
            None => ModelConfig::default(),
        };
        let client = StreamingClient::new(connector, &config.inference);
        Ok(Self {
            config,
            synth,
            client,
            model,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run one request and return the written video path.
    #[tracing::instrument(skip_all, fields(preset = %req.preset, output = %req.output.display()))]
    pub async fn run(&self, req: &RunRequest, cancel: &CancelSignal) -> PipelineResult<PathBuf> {
        let preset = self.config.preset(&req.preset).stage(Stage::Setup)?;
        let selector = TargetSelector::from_args(&preset.selector).stage(Stage::Setup)?;
        let fps = self.config.render.fps().stage(Stage::Setup)?;

        let audio_path = self.prepare_audio(req, preset.voice.as_deref(), cancel).await?;

        let audio = AudioBuffer::read_wav(&audio_path).stage(Stage::Audio)?;
        let curve_path = or_cancelled(
            self.client.infer(&audio, &self.model, &req.work_dir.join(CURVE_FILE)),
            cancel,
            "inference",
        )
        .await
        .stage(Stage::Inference)?;

        // An empty curve never reaches the render host.
        let curve = read_curve(&curve_path).stage(Stage::Mapping)?;
        curve.ensure_animatable().stage(Stage::Mapping)?;
        let range = curve.frame_range(fps).stage(Stage::Mapping)?;
        tracing::info!(
            rows = curve.len(),
            channels = curve.channels().len(),
            frames = range.len_frames(),
            "curve ready"
        );

        let render = &self.config.render;
        let _lock = FramesDirLock::acquire(&render.frames_dir).stage(Stage::Render)?;
        clear_stale_frames(&render.frames_dir, &render.frames_prefix).stage(Stage::Render)?;

        let args = ScriptArgs {
            curve: curve_path,
            audio: audio_path.clone(),
            output: req.output.clone(),
            fps,
            selector,
        };
        let inv = HostInvocation::from_config(
            render,
            &preset.scene,
            args,
            &self.config.inference.channel_prefix,
        )
        .stage(Stage::Render)?;
        let finished = launch(&inv, cancel, &mut |_| {}).await.stage(Stage::Render)?;
        if let Some(err) = host_failure(&finished) {
            // Failures the rig names are about the curve or targets, not the host.
            let stage = match err {
                FacecastError::RenderProcess(_) => Stage::Render,
                _ => Stage::Mapping,
            };
            return Err(PipelineFailure::at(stage, err));
        }
        let frames = count_frames(&render.frames_dir, &render.frames_prefix);
        if frames == 0 {
            return Err(PipelineFailure::at(
                Stage::Render,
                FacecastError::render_process("render host exited cleanly but wrote no frames"),
            ));
        }
        tracing::info!(frames, "frames rendered");

        let muxer = Muxer::from_config(&self.config.encoder).stage(Stage::Mux)?;
        let pattern = frame_pattern(&render.frames_dir, &render.frames_prefix);
        match muxer
            .mux(&pattern, &audio_path, &req.output, fps, cancel)
            .await
        {
            Ok(path) => Ok(path),
            Err(e) => {
                if req.output.exists() {
                    tracing::warn!(output = %req.output.display(), "mux failed, output file is from an earlier run");
                }
                Err(PipelineFailure::at(Stage::Mux, e))
            }
        }
    }

    async fn prepare_audio(
        &self,
        req: &RunRequest,
        voice: Option<&str>,
        cancel: &CancelSignal,
    ) -> PipelineResult<PathBuf> {
        match &req.speech {
            SpeechSource::Wav(path) => Ok(path.clone()),
            SpeechSource::Text(text) => {
                let voice = voice.unwrap_or(&req.preset);
                let audio = or_cancelled(
                    synthesize_or_silence(
                        self.synth.as_ref(),
                        text,
                        voice,
                        self.config.speech.silence_fallback_secs,
                    ),
                    cancel,
                    "speech synthesis",
                )
                .await
                .stage(Stage::Audio)?;
                let path = req.work_dir.join(SPEECH_FILE);
                audio.write_wav(&path).stage(Stage::Audio)?;
                Ok(path)
            }
        }
    }
}

/// Encoder input pattern of the frames a run writes.
pub fn frames_pattern_for(config: &PipelineConfig) -> PathBuf {
    frame_pattern(&config.render.frames_dir, &config.render.frames_prefix)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/run.rs"]
mod tests;
