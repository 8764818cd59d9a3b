use std::path::{Path, PathBuf};

use crate::audio::buffer::AudioBuffer;
use crate::config::InferenceConfig;
use crate::curve::artifact::CurveWriter;
use crate::curve::model::{AnimationCurve, AnimationFrame};
use crate::foundation::error::{FacecastError, FacecastResult};
use crate::inference::channel::{Connector, FrameSource, UploadSink};
use crate::inference::protocol::{ClientMessage, ModelConfig, ServerMessage};

/// Exchanges one audio buffer for one curve artifact over a duplex inference channel.
///
/// Upload and download run concurrently on the two halves of the channel and are joined at a
/// single point: if either fails the other is dropped, and the partially written artifact with
/// it. Only the service's end-of-stream completes the download.
pub struct StreamingClient<C> {
    connector: C,
    chunk_samples: Option<usize>,
    channel_prefix: String,
}

impl<C: Connector> StreamingClient<C> {
    pub fn new(connector: C, cfg: &InferenceConfig) -> Self {
        Self {
            connector,
            chunk_samples: cfg.chunk_samples,
            channel_prefix: cfg.channel_prefix.clone(),
        }
    }

    /// Stream `audio` to the service and write the returned curve to `out`.
    ///
    /// Returns `out` once the artifact is complete. Dropping the returned future cancels both
    /// directions.
    #[tracing::instrument(skip(self, audio, model), fields(secs = audio.duration_secs()))]
    pub async fn infer(
        &self,
        audio: &AudioBuffer,
        model: &ModelConfig,
        out: &Path,
    ) -> FacecastResult<PathBuf> {
        let (mut sink, mut source) = self.connector.open().await?;

        let chunk = self
            .chunk_samples
            .unwrap_or_else(|| (audio.format().sample_rate as usize / 10).max(1));
        let upload = upload(sink.as_mut(), audio, model, chunk);
        let download = download(source.as_mut(), out, &self.channel_prefix);

        let (chunks, writer) = tokio::try_join!(upload, download)?;
        let rows = writer.rows();
        let path = writer.commit()?;
        tracing::info!(chunks, rows, path = %path.display(), "curve received");
        Ok(path)
    }
}

async fn upload(
    sink: &mut dyn UploadSink,
    audio: &AudioBuffer,
    model: &ModelConfig,
    chunk_samples: usize,
) -> FacecastResult<u64> {
    sink.send(ClientMessage::header(audio.format(), model)).await?;
    let mut seq = 0u64;
    for pcm in audio.pcm16_chunks(chunk_samples) {
        sink.send(ClientMessage::audio(seq, &pcm)).await?;
        seq += 1;
    }
    sink.send(ClientMessage::EndOfAudio).await?;
    tracing::debug!(chunks = seq, "upload finished");
    Ok(seq)
}

async fn download(
    source: &mut dyn FrameSource,
    out: &Path,
    prefix: &str,
) -> FacecastResult<CurveWriter> {
    let mut writer: Option<CurveWriter> = None;
    loop {
        let Some(msg) = source.recv().await? else {
            return Err(FacecastError::stream(
                "channel closed before end of stream",
            ));
        };
        match msg {
            ServerMessage::BlendshapeNames { names } => {
                if writer.is_some() {
                    return Err(FacecastError::malformed("blendshape names sent twice"));
                }
                let channels: Vec<String> = names
                    .into_iter()
                    .map(|n| {
                        if n.starts_with(prefix) {
                            n
                        } else {
                            format!("{prefix}{n}")
                        }
                    })
                    .collect();
                // Rejects duplicate or reserved names before anything is written.
                AnimationCurve::new(channels.clone())?;
                tracing::debug!(channels = channels.len(), "blendshape names received");
                writer = Some(CurveWriter::create(out, &channels)?);
            }
            ServerMessage::AnimationData { time_code, values } => {
                let Some(w) = writer.as_mut() else {
                    return Err(FacecastError::malformed(
                        "animation data before blendshape names",
                    ));
                };
                if !time_code.is_finite() {
                    return Err(FacecastError::malformed(format!(
                        "non-finite time code at row {}",
                        w.rows()
                    )));
                }
                w.append(&AnimationFrame {
                    time_code,
                    weights: values.into_iter().map(Some).collect(),
                })?;
            }
            ServerMessage::Status { code, message } => {
                if code != 0 {
                    return Err(FacecastError::stream(format!(
                        "service reported status {code}: {message}"
                    )));
                }
                tracing::debug!(%message, "service status");
            }
            ServerMessage::EndOfStream => {
                return writer.ok_or_else(|| {
                    FacecastError::empty_curve("stream ended without any animation data")
                });
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/inference/client.rs"]
mod tests;
