//! Streaming inference client: audio up, time-coded blendshape weights down.

/// Duplex channel seam and its WebSocket implementation.
pub mod channel;
/// Uploader/downloader pair producing the curve artifact.
pub mod client;
/// Wire messages and model configuration.
pub mod protocol;
