use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::config::InferenceConfig;
use crate::foundation::error::{FacecastError, FacecastResult};
use crate::inference::protocol::{ClientMessage, ServerMessage};

/// Upload half of a duplex inference channel.
#[async_trait]
pub trait UploadSink: Send {
    async fn send(&mut self, msg: ClientMessage) -> FacecastResult<()>;
}

/// Download half of a duplex inference channel.
#[async_trait]
pub trait FrameSource: Send {
    /// Next inbound message, or `None` once the transport is closed.
    async fn recv(&mut self) -> FacecastResult<Option<ServerMessage>>;
}

/// Opens one duplex channel per inference call, already split into its two halves.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(&self) -> FacecastResult<(Box<dyn UploadSink>, Box<dyn FrameSource>)>;
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket connector carrying credentials as handshake headers.
#[derive(Clone, Debug)]
pub struct WsConnector {
    url: String,
    api_key: Option<String>,
    function_id: Option<String>,
    connect_timeout: Duration,
}

impl WsConnector {
    pub fn new(cfg: &InferenceConfig) -> Self {
        Self {
            url: cfg.url.clone(),
            api_key: cfg.api_key.clone(),
            function_id: cfg.function_id.clone(),
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs.max(1)),
        }
    }

    fn request(
        &self,
    ) -> FacecastResult<tokio_tungstenite::tungstenite::handshake::client::Request> {
        let mut req = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| FacecastError::connection(format!("invalid url '{}': {e}", self.url)))?;
        let headers = req.headers_mut();
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| FacecastError::connection(format!("invalid api key: {e}")))?;
            headers.insert("authorization", value);
        }
        if let Some(id) = &self.function_id {
            let value = HeaderValue::from_str(id)
                .map_err(|e| FacecastError::connection(format!("invalid function id: {e}")))?;
            headers.insert("function-id", value);
        }
        Ok(req)
    }
}

#[async_trait]
impl Connector for WsConnector {
    #[tracing::instrument(skip(self), fields(url = %self.url))]
    async fn open(&self) -> FacecastResult<(Box<dyn UploadSink>, Box<dyn FrameSource>)> {
        let req = self.request()?;
        let (ws, _resp) = tokio::time::timeout(self.connect_timeout, connect_async(req))
            .await
            .map_err(|_| {
                FacecastError::connection(format!(
                    "timed out after {:?} connecting to '{}'",
                    self.connect_timeout, self.url
                ))
            })?
            .map_err(|e| FacecastError::connection(format!("connect '{}': {e}", self.url)))?;
        tracing::debug!("inference channel open");

        let (write, read) = ws.split();
        Ok((Box::new(WsUpload { write }), Box::new(WsFrames { read })))
    }
}

struct WsUpload {
    write: SplitSink<WsStream, Message>,
}

#[async_trait]
impl UploadSink for WsUpload {
    async fn send(&mut self, msg: ClientMessage) -> FacecastResult<()> {
        let text = msg.to_json()?;
        self.write
            .send(Message::Text(text))
            .await
            .map_err(|e| FacecastError::stream(format!("upload failed: {e}")))
    }
}

struct WsFrames {
    read: SplitStream<WsStream>,
}

#[async_trait]
impl FrameSource for WsFrames {
    async fn recv(&mut self) -> FacecastResult<Option<ServerMessage>> {
        loop {
            let Some(next) = self.read.next().await else {
                return Ok(None);
            };
            let msg = next.map_err(|e| FacecastError::stream(format!("download failed: {e}")))?;
            match msg {
                Message::Text(text) => return ServerMessage::from_json(&text).map(Some),
                Message::Binary(bytes) => {
                    return Err(FacecastError::malformed(format!(
                        "unexpected binary frame of {} bytes",
                        bytes.len()
                    )));
                }
                Message::Close(_) => return Ok(None),
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/inference/channel.rs"]
mod tests;
