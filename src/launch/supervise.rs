use std::collections::VecDeque;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

use crate::foundation::cancel::CancelSignal;
use crate::foundation::error::{FacecastError, FacecastResult};

/// Output lines kept for error reports.
pub const TAIL_LINES: usize = 20;

/// How long output is still drained after the child exits while something else holds its pipes.
pub const OUTPUT_GRACE: Duration = Duration::from_secs(2);

/// Which external process is supervised; picks the error a failure is reported as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessRole {
    RenderHost,
    Encoder,
}

impl ProcessRole {
    pub fn label(self) -> &'static str {
        match self {
            Self::RenderHost => "render host",
            Self::Encoder => "encoder",
        }
    }

    pub fn error(self, msg: impl Into<String>) -> FacecastError {
        match self {
            Self::RenderHost => FacecastError::render_process(msg),
            Self::Encoder => FacecastError::mux(msg),
        }
    }
}

/// Outcome of a supervised run that was not cancelled.
#[derive(Debug)]
pub struct Finished {
    pub status: ExitStatus,
    /// Last [`TAIL_LINES`] lines of combined output.
    pub tail: Vec<String>,
}

impl Finished {
    pub fn tail_text(&self) -> String {
        self.tail.join("\n")
    }
}

/// Spawn `cmd` and stream its combined stdout/stderr to `sink` line by line until it exits.
///
/// Output keeps draining after the exit until both pipes close or stay quiet for
/// [`OUTPUT_GRACE`], so a grandchild holding them cannot stall the caller.
///
/// The child is killed when this future is dropped. On cancellation the child is killed and
/// waited for before [`FacecastError::Cancelled`] is returned.
pub async fn run_supervised(
    mut cmd: Command,
    role: ProcessRole,
    cancel: &CancelSignal,
    sink: &mut (dyn FnMut(&str) + Send),
) -> FacecastResult<Finished> {
    if cancel.is_cancelled() {
        return Err(FacecastError::cancelled(format!(
            "{} not started",
            role.label()
        )));
    }
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|e| role.error(format!("failed to spawn {}: {e}", role.label())))?;
    tracing::debug!(pid = child.id(), "{} started", role.label());

    let (tx, mut rx) = mpsc::channel::<String>(256);
    if let Some(out) = child.stdout.take() {
        tokio::spawn(forward_lines(out, tx.clone()));
    }
    if let Some(err) = child.stderr.take() {
        tokio::spawn(forward_lines(err, tx.clone()));
    }
    drop(tx);

    let mut cancel = cancel.clone();
    let mut tail = VecDeque::with_capacity(TAIL_LINES);
    let mut status = None;
    let mut output_open = true;
    while output_open || status.is_none() {
        let event = tokio::select! {
            line = rx.recv(), if output_open => Event::Line(line),
            waited = child.wait(), if status.is_none() => Event::Exited(waited),
            _ = tokio::time::sleep(OUTPUT_GRACE), if status.is_some() => Event::OutputStalled,
            _ = cancel.cancelled() => Event::Cancelled,
        };
        match event {
            Event::Line(Some(line)) => {
                sink(&line);
                if tail.len() == TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            Event::Line(None) => output_open = false,
            Event::Exited(waited) => {
                let exited = waited
                    .map_err(|e| role.error(format!("failed to wait for {}: {e}", role.label())))?;
                tracing::debug!(status = %exited, "{} exited", role.label());
                status = Some(exited);
            }
            Event::OutputStalled => {
                tracing::warn!(
                    "{} exited but its output is still held open, not waiting for it",
                    role.label()
                );
                break;
            }
            Event::Cancelled => return Err(terminate(&mut child, role).await),
        }
    }

    let Some(status) = status else {
        return Err(role.error(format!("{} exit status unavailable", role.label())));
    };
    Ok(Finished {
        status,
        tail: tail.into(),
    })
}

enum Event {
    Line(Option<String>),
    Exited(std::io::Result<ExitStatus>),
    OutputStalled,
    Cancelled,
}

async fn terminate(child: &mut Child, role: ProcessRole) -> FacecastError {
    tracing::warn!("cancelled, terminating {}", role.label());
    if let Err(e) = child.start_kill() {
        tracing::warn!(error = %e, "could not signal {}", role.label());
    }
    match child.wait().await {
        Ok(status) => tracing::debug!(%status, "{} terminated", role.label()),
        Err(e) => tracing::warn!(error = %e, "could not reap {}", role.label()),
    }
    FacecastError::cancelled(format!("{} terminated", role.label()))
}

async fn forward_lines<R: AsyncRead + Unpin>(r: R, tx: mpsc::Sender<String>) {
    let mut reader = BufReader::new(r);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => return,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf)
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                if tx.send(line).await.is_err() {
                    return;
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "child output closed");
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/launch/supervise.rs"]
mod tests;
