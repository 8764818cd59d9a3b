use std::ffi::OsString;
use std::path::PathBuf;

use tokio::process::Command;

use crate::config::RenderConfig;
use crate::foundation::cancel::CancelSignal;
use crate::foundation::error::{FacecastError, FacecastResult};
use crate::launch::locate::find_executable;
use crate::launch::supervise::{Finished, ProcessRole, run_supervised};
use crate::rig::{RigEnv, ScriptArgs, error_from_exit, reported_error};

/// Log target for forwarded host console lines.
pub const HOST_LOG_TARGET: &str = "facecast::host";

/// One render-host run.
#[derive(Clone, Debug, PartialEq)]
pub struct HostInvocation {
    pub executable: PathBuf,
    pub scene: PathBuf,
    /// Script the host runs headless; hosts with a built-in rig take none.
    pub script: Option<PathBuf>,
    pub args: ScriptArgs,
    pub env: RigEnv,
}

impl HostInvocation {
    /// Locate the host executable from `cfg` and assemble an invocation.
    pub fn from_config(
        cfg: &RenderConfig,
        scene: impl Into<PathBuf>,
        args: ScriptArgs,
        channel_prefix: &str,
    ) -> FacecastResult<Self> {
        let executable = find_executable(
            "render host",
            cfg.host_executable.as_deref(),
            &cfg.host_candidates,
        )?;
        Ok(Self {
            executable,
            scene: scene.into(),
            script: cfg.script.clone(),
            args,
            env: RigEnv {
                frames_dir: cfg.frames_dir.clone(),
                frames_prefix: cfg.frames_prefix.clone(),
                channel_prefix: channel_prefix.to_string(),
            },
        })
    }

    /// `--headless --scene <scene> [--script <script>] -- <curve> <audio> <output> <fps> [selector...]`
    pub fn argv(&self) -> Vec<OsString> {
        let mut argv: Vec<OsString> = vec![
            "--headless".into(),
            "--scene".into(),
            self.scene.clone().into(),
        ];
        if let Some(script) = &self.script {
            argv.extend(["--script".into(), script.clone().into()]);
        }
        argv.push("--".into());
        argv.extend(self.args.to_args().into_iter().map(OsString::from));
        argv
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(self.argv());
        cmd.envs(self.env.vars());
        cmd
    }
}

/// Run the render host to completion.
///
/// Every console line is logged on [`HOST_LOG_TARGET`] and passed to `sink` as it arrives. A
/// non-zero status is returned, not raised; [`host_failure`] turns it into an error.
#[tracing::instrument(skip_all, fields(host = %inv.executable.display(), scene = %inv.scene.display()))]
pub async fn launch(
    inv: &HostInvocation,
    cancel: &CancelSignal,
    sink: &mut (dyn FnMut(&str) + Send),
) -> FacecastResult<Finished> {
    tracing::info!(argv = ?inv.argv(), "launching render host");
    let mut forward = |line: &str| {
        tracing::info!(target: HOST_LOG_TARGET, "{line}");
        sink(line);
    };
    let finished = run_supervised(inv.command(), ProcessRole::RenderHost, cancel, &mut forward).await?;
    if !finished.status.success() {
        tracing::warn!(status = %finished.status, tail = %finished.tail_text(), "render host failed");
    }
    Ok(finished)
}

/// The error a finished host run stands for, `None` when it succeeded.
///
/// Exit codes the rig assigns to curve, selector and mapping failures come back as that error
/// kind with the host's reported message. Any other failure is
/// [`FacecastError::RenderProcess`] carrying the tail of the host output.
pub fn host_failure(finished: &Finished) -> Option<FacecastError> {
    if finished.status.success() {
        return None;
    }
    let tail = finished.tail_text();
    if let Some(code) = finished.status.code() {
        let detail = reported_error(&finished.tail).unwrap_or(&tail);
        if let Some(err) = error_from_exit(code, detail) {
            return Some(err);
        }
    }
    let msg = if tail.is_empty() {
        format!("render host exited with {}", finished.status)
    } else {
        format!("render host exited with {}: {tail}", finished.status)
    };
    Some(FacecastError::render_process(msg))
}

#[cfg(test)]
#[path = "../../tests/unit/launch/host.rs"]
mod tests;
