//! Facecast turns a text script into a talking-avatar video.
//!
//! The pipeline synthesizes speech, streams it to an animation-inference service that returns a
//! time-coded blendshape curve, drives a character's facial controls with that curve inside an
//! external render host, and muxes the rendered frames with the audio:
//!
//! - [`inference`]: streaming client exchanging an [`AudioBuffer`] for a curve artifact
//! - [`mapping`]: target resolution and curve-channel to control matching
//! - [`driver`]: keyframing loop behind the [`RenderHost`] seam
//! - [`launch`]: render host process supervision
//! - [`encode`]: final encode
//! - [`pipeline`]: all of the above for one request
#![forbid(unsafe_code)]

mod foundation;

/// Audio buffers and the speech synthesis collaborator.
pub mod audio;
/// Explicit pipeline configuration.
pub mod config;
/// Animation curve model and CSV artifact.
pub mod curve;
/// Keyframe driver and render host seam.
pub mod driver;
/// Final encode.
pub mod encode;
/// Streaming inference client.
pub mod inference;
/// Render host launcher.
pub mod launch;
/// Curve-to-control mapping.
pub mod mapping;
/// End-to-end orchestration.
pub mod pipeline;
/// Render host side entry point.
pub mod rig;
/// Scene description.
pub mod scene;

pub use crate::foundation::cancel::{CancelHandle, CancelSignal};
pub use crate::foundation::core::{Fps, FrameIndex, FrameRange};
pub use crate::foundation::error::{FacecastError, FacecastResult, Stage};

pub use crate::audio::buffer::{AudioBuffer, AudioFormat};
pub use crate::audio::synth::{HttpSpeechClient, SpeechSynthesizer};
pub use crate::config::PipelineConfig;
pub use crate::curve::model::{AnimationCurve, AnimationFrame};
pub use crate::driver::drive::{DriveReport, RenderJob, drive};
pub use crate::driver::host::RenderHost;
pub use crate::driver::preview::PreviewHost;
pub use crate::encode::mux::Muxer;
pub use crate::inference::channel::WsConnector;
pub use crate::inference::client::StreamingClient;
pub use crate::inference::protocol::ModelConfig;
pub use crate::launch::host::{HostInvocation, launch};
pub use crate::mapping::selector::TargetSelector;
pub use crate::pipeline::{Pipeline, PipelineFailure, RunRequest, SpeechSource};
pub use crate::rig::{RigEnv, ScriptArgs, run_rig};
pub use crate::scene::graph::Scene;
