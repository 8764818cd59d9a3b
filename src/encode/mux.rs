use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::config::EncoderConfig;
use crate::foundation::cancel::CancelSignal;
use crate::foundation::core::Fps;
use crate::foundation::error::{FacecastError, FacecastResult};
use crate::launch::locate::find_executable;
use crate::launch::supervise::{ProcessRole, run_supervised};

/// Encoder arguments: `-y -framerate <fps> -i <pattern> -i <audio> -c:v libx264 -pix_fmt yuv420p
/// -c:a aac -shortest <output>`.
pub fn mux_args(pattern: &Path, audio: &Path, output: &Path, fps: Fps) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-framerate".into(), fps.to_arg().into()];
    args.extend(["-i".into(), pattern.as_os_str().to_owned()]);
    args.extend(["-i".into(), audio.as_os_str().to_owned()]);
    args.extend(
        ["-c:v", "libx264", "-pix_fmt", "yuv420p", "-c:a", "aac", "-shortest"]
            .into_iter()
            .map(OsString::from),
    );
    args.push(output.as_os_str().to_owned());
    args
}

/// Runs the external encoder.
#[derive(Clone, Debug)]
pub struct Muxer {
    executable: PathBuf,
}

impl Muxer {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Locate the encoder the way the render host is located.
    pub fn from_config(cfg: &EncoderConfig) -> FacecastResult<Self> {
        let executable = find_executable("encoder", cfg.executable.as_deref(), &cfg.candidates)?;
        Ok(Self::new(executable))
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Combine the `pattern` frame sequence and `audio` into `output`, overwriting it.
    ///
    /// A non-zero exit is [`FacecastError::Mux`] carrying the tail of the encoder's output.
    #[tracing::instrument(skip(self, cancel), fields(encoder = %self.executable.display()))]
    pub async fn mux(
        &self,
        pattern: &Path,
        audio: &Path,
        output: &Path,
        fps: Fps,
        cancel: &CancelSignal,
    ) -> FacecastResult<PathBuf> {
        ensure_parent_dir(output)?;
        let mut cmd = Command::new(&self.executable);
        cmd.args(mux_args(pattern, audio, output, fps));

        let mut sink = |line: &str| tracing::debug!(target: "facecast::encoder", "{line}");
        let finished = run_supervised(cmd, ProcessRole::Encoder, cancel, &mut sink).await?;
        if !finished.status.success() {
            return Err(FacecastError::mux(format!(
                "encoder exited with status {}: {}",
                finished.status,
                finished.tail_text()
            )));
        }
        tracing::info!(output = %output.display(), "video written");
        Ok(output.to_path_buf())
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> FacecastResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/mux.rs"]
mod tests;
