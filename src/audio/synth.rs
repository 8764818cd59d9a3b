use async_trait::async_trait;

use crate::audio::buffer::{AudioBuffer, AudioFormat};
use crate::config::SpeechConfig;
use crate::foundation::error::{FacecastError, FacecastResult};

/// Text-to-speech collaborator returning raw PCM16 in the format it reports.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// PCM layout of the bytes returned by [`SpeechSynthesizer::synthesize`].
    fn format(&self) -> AudioFormat;

    /// Synthesize `text` with `voice`, returning little-endian PCM16 bytes.
    async fn synthesize(&self, text: &str, voice: &str) -> FacecastResult<Vec<u8>>;
}

/// OpenAI-compatible `/audio/speech` client requesting `pcm` output.
#[derive(Clone, Debug)]
pub struct HttpSpeechClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    format: AudioFormat,
}

impl HttpSpeechClient {
    pub fn new(cfg: &SpeechConfig) -> FacecastResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| FacecastError::configuration(format!("build speech client: {e}")))?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            format: AudioFormat::mono_pcm16(cfg.sample_rate),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSpeechClient {
    fn format(&self) -> AudioFormat {
        self.format
    }

    #[tracing::instrument(skip(self, text), fields(chars = text.len()))]
    async fn synthesize(&self, text: &str, voice: &str) -> FacecastResult<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct SpeechRequest<'a> {
            model: &'a str,
            voice: &'a str,
            input: &'a str,
            response_format: &'a str,
        }

        let payload = SpeechRequest {
            model: &self.model,
            voice,
            input: text,
            response_format: "pcm",
        };

        let mut req = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .json(&payload);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let res = req
            .send()
            .await
            .map_err(|e| FacecastError::audio(format!("speech request failed: {e}")))?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(FacecastError::audio(format!(
                "speech service returned {status}: {}",
                body.trim()
            )));
        }
        let bytes = res
            .bytes()
            .await
            .map_err(|e| FacecastError::audio(format!("read speech response: {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// Synthesize speech, falling back to `fallback_secs` of silence when the service fails.
///
/// The fallback keeps the rest of the pipeline runnable; the failure is logged, not returned.
pub async fn synthesize_or_silence(
    synth: &dyn SpeechSynthesizer,
    text: &str,
    voice: &str,
    fallback_secs: f64,
) -> FacecastResult<AudioBuffer> {
    let format = synth.format();
    let decoded = match synth.synthesize(text, voice).await {
        Ok(bytes) if !bytes.is_empty() => AudioBuffer::from_pcm16_le(format, &bytes),
        Ok(_) => Err(FacecastError::audio("speech service returned no audio")),
        Err(e) => Err(e),
    };
    match decoded {
        Ok(buf) => {
            tracing::info!(secs = buf.duration_secs(), "speech synthesized");
            Ok(buf)
        }
        Err(e) => {
            tracing::warn!(error = %e, fallback_secs, "speech synthesis failed, using silence");
            AudioBuffer::silence(format, fallback_secs)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/synth.rs"]
mod tests;
