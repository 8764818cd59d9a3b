//! Render-host side entry point: parse the positional script arguments, resolve targets, load
//! the curve and drive the host.

use std::path::PathBuf;

use crate::curve::artifact::read_curve;
use crate::driver::drive::{DriveReport, RenderJob, drive};
use crate::driver::host::RenderHost;
use crate::foundation::core::Fps;
use crate::foundation::error::{FacecastError, FacecastResult};
use crate::mapping::selector::TargetSelector;
use crate::mapping::targets::resolve_targets;
use crate::scene::graph::Scene;

/// Environment variable carrying the frames directory into the host process.
pub const ENV_FRAMES_DIR: &str = "FACECAST_FRAMES_DIR";
/// Environment variable carrying the frames file name prefix into the host process.
pub const ENV_FRAMES_PREFIX: &str = "FACECAST_FRAMES_PREFIX";
/// Environment variable carrying the curve channel namespace prefix into the host process.
pub const ENV_CHANNEL_PREFIX: &str = "FACECAST_CHANNEL_PREFIX";

/// Prefix of the stderr line a failing host prints with the error text.
pub const ERROR_LINE_PREFIX: &str = "facecast-rig error: ";

/// Exit status for host failures without a dedicated code.
pub const EXIT_FAILURE: u8 = 1;

const USAGE: &str = "usage: -- <curve.csv> <audio> <output> <fps> [selector...]";

/// Positional arguments after `--` on the render-host command line.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptArgs {
    pub curve: PathBuf,
    pub audio: PathBuf,
    pub output: PathBuf,
    pub fps: Fps,
    pub selector: TargetSelector,
}

impl ScriptArgs {
    pub fn parse<S: AsRef<str>>(args: &[S]) -> FacecastResult<Self> {
        let [curve, audio, output, fps, rest @ ..] = args else {
            return Err(FacecastError::configuration(format!(
                "expected at least 4 script arguments, got {}; {USAGE}",
                args.len()
            )));
        };
        Ok(Self {
            curve: PathBuf::from(curve.as_ref()),
            audio: PathBuf::from(audio.as_ref()),
            output: PathBuf::from(output.as_ref()),
            fps: fps.as_ref().parse()?,
            selector: TargetSelector::from_args(rest)?,
        })
    }

    /// Argument vector in the order [`ScriptArgs::parse`] reads it.
    pub fn to_args(&self) -> Vec<String> {
        let mut out = vec![
            self.curve.display().to_string(),
            self.audio.display().to_string(),
            self.output.display().to_string(),
            self.fps.to_arg(),
        ];
        out.extend(self.selector.to_args());
        out
    }
}

/// Frame destination and channel naming handed to the host through its environment.
#[derive(Clone, Debug, PartialEq)]
pub struct RigEnv {
    pub frames_dir: PathBuf,
    pub frames_prefix: String,
    pub channel_prefix: String,
}

impl Default for RigEnv {
    fn default() -> Self {
        let render = crate::config::RenderConfig::default();
        Self {
            frames_dir: render.frames_dir,
            frames_prefix: render.frames_prefix,
            channel_prefix: crate::curve::model::DEFAULT_CHANNEL_PREFIX.to_string(),
        }
    }
}

impl RigEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with non-empty values from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut env = Self::default();
        if let Some(v) = get(ENV_FRAMES_DIR) {
            env.frames_dir = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_FRAMES_PREFIX) {
            env.frames_prefix = v;
        }
        if let Some(v) = get(ENV_CHANNEL_PREFIX) {
            env.channel_prefix = v;
        }
        env
    }

    /// `(name, value)` pairs for a child process environment.
    pub fn vars(&self) -> [(&'static str, String); 3] {
        [
            (ENV_FRAMES_DIR, self.frames_dir.display().to_string()),
            (ENV_FRAMES_PREFIX, self.frames_prefix.clone()),
            (ENV_CHANNEL_PREFIX, self.channel_prefix.clone()),
        ]
    }
}

/// Resolve targets, load the curve and drive `host` through one render.
#[tracing::instrument(skip_all, fields(curve = %args.curve.display(), selector = %args.selector))]
pub fn run_rig(
    scene: &Scene,
    args: &ScriptArgs,
    env: &RigEnv,
    host: &mut dyn RenderHost,
) -> FacecastResult<DriveReport> {
    tracing::info!(audio = %args.audio.display(), output = %args.output.display(), fps = %args.fps, "rig invoked");
    let targets = resolve_targets(scene, &args.selector)?;

    let curve = read_curve(&args.curve)?;
    if curve.is_empty() {
        return Err(FacecastError::empty_curve(format!(
            "curve '{}' is empty or unreadable",
            args.curve.display()
        )));
    }

    let job = RenderJob::new(
        curve,
        targets,
        args.fps,
        env.frames_dir.clone(),
        env.frames_prefix.clone(),
        env.channel_prefix.clone(),
    )?;
    drive(&job, host)
}

/// Exit status the host reports `err` with.
///
/// Curve, selector and mapping failures get their own codes so the launcher can re-raise them
/// as the same error kind.
pub fn exit_code(err: &FacecastError) -> u8 {
    match err {
        FacecastError::Configuration(_) => 64,
        FacecastError::MalformedFrame(_) => 65,
        FacecastError::EmptyCurve(_) => 66,
        FacecastError::NoTargets(_) => 67,
        FacecastError::NoAnimatableTargets(_) => 68,
        FacecastError::NoMappedChannels(_) => 69,
        _ => EXIT_FAILURE,
    }
}

/// Inverse of [`exit_code`]; `None` for codes without a dedicated error kind.
pub fn error_from_exit(code: i32, detail: impl Into<String>) -> Option<FacecastError> {
    let detail = detail.into();
    let err = match code {
        64 => FacecastError::configuration(detail),
        65 => FacecastError::malformed(detail),
        66 => FacecastError::empty_curve(detail),
        67 => FacecastError::no_targets(detail),
        68 => FacecastError::no_animatable_targets(detail),
        69 => FacecastError::no_mapped_channels(detail),
        _ => return None,
    };
    Some(err)
}

/// Line the host prints on stderr before exiting with [`exit_code`].
pub fn error_line(err: &FacecastError) -> String {
    format!("{ERROR_LINE_PREFIX}{}", err.message())
}

/// Error text of the last [`error_line`] in `lines`.
pub fn reported_error(lines: &[String]) -> Option<&str> {
    lines
        .iter()
        .rev()
        .find_map(|l| l.strip_prefix(ERROR_LINE_PREFIX))
}

#[cfg(test)]
#[path = "../tests/unit/rig.rs"]
mod tests;
