use super::*;
use crate::audio::buffer::AudioFormat;
use crate::curve::artifact::read_curve;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;

struct ChanSink(mpsc::Sender<ClientMessage>);

#[async_trait]
impl UploadSink for ChanSink {
    async fn send(&mut self, msg: ClientMessage) -> FacecastResult<()> {
        self.0
            .send(msg)
            .await
            .map_err(|_| FacecastError::stream("service hung up"))
    }
}

struct ChanSource(mpsc::Receiver<FacecastResult<ServerMessage>>);

#[async_trait]
impl FrameSource for ChanSource {
    async fn recv(&mut self) -> FacecastResult<Option<ServerMessage>> {
        match self.0.recv().await {
            Some(r) => r.map(Some),
            None => Ok(None),
        }
    }
}

struct OnceConnector(Mutex<Option<(Box<dyn UploadSink>, Box<dyn FrameSource>)>>);

#[async_trait]
impl Connector for OnceConnector {
    async fn open(&self) -> FacecastResult<(Box<dyn UploadSink>, Box<dyn FrameSource>)> {
        self.0
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| FacecastError::connection("service unreachable"))
    }
}

struct Service {
    uploads: mpsc::Receiver<ClientMessage>,
    frames: mpsc::Sender<FacecastResult<ServerMessage>>,
}

fn client_with_service() -> (StreamingClient<OnceConnector>, Service) {
    let (up_tx, up_rx) = mpsc::channel(8);
    let (down_tx, down_rx) = mpsc::channel(64);
    let connector = OnceConnector(Mutex::new(Some((
        Box::new(ChanSink(up_tx)),
        Box::new(ChanSource(down_rx)),
    ))));
    let cfg = InferenceConfig {
        chunk_samples: Some(300),
        ..InferenceConfig::default()
    };
    (
        StreamingClient::new(connector, &cfg),
        Service {
            uploads: up_rx,
            frames: down_tx,
        },
    )
}

fn audio() -> AudioBuffer {
    AudioBuffer::new(AudioFormat::mono_pcm16(16_000), vec![7; 1000]).unwrap()
}

fn names(n: &[&str]) -> ServerMessage {
    ServerMessage::BlendshapeNames {
        names: n.iter().map(|s| s.to_string()).collect(),
    }
}

fn data(t: f64, v: &[f64]) -> ServerMessage {
    ServerMessage::AnimationData {
        time_code: t,
        values: v.to_vec(),
    }
}

async fn drain_uploads(uploads: &mut mpsc::Receiver<ClientMessage>) -> Vec<ClientMessage> {
    let mut got = Vec::new();
    while let Some(m) = uploads.recv().await {
        let end = m == ClientMessage::EndOfAudio;
        got.push(m);
        if end {
            break;
        }
    }
    got
}

#[tokio::test]
async fn frames_after_end_of_audio_complete_the_curve() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("curve.csv");
    let (client, mut svc) = client_with_service();

    let service = tokio::spawn(async move {
        let got = drain_uploads(&mut svc.uploads).await;
        // Results only start once the whole upload is in.
        svc.frames.send(Ok(names(&["JawOpen", "blendShapes.EyeBlinkLeft"]))).await.unwrap();
        svc.frames.send(Ok(ServerMessage::Status { code: 0, message: "ok".into() })).await.unwrap();
        svc.frames.send(Ok(data(0.0, &[0.1, 0.0]))).await.unwrap();
        svc.frames.send(Ok(data(0.033, &[0.8, 1.0]))).await.unwrap();
        svc.frames.send(Ok(ServerMessage::EndOfStream)).await.unwrap();
        got
    });

    let path = client
        .infer(&audio(), &ModelConfig::default(), &out)
        .await
        .unwrap();
    assert_eq!(path, out);

    let uploads = service.await.unwrap();
    assert!(matches!(uploads[0], ClientMessage::Header { sample_rate: 16_000, .. }));
    // 1000 samples in chunks of 300.
    let chunks = uploads
        .iter()
        .filter(|m| matches!(m, ClientMessage::Audio { .. }))
        .count();
    assert_eq!(chunks, 4);
    assert_eq!(uploads.last(), Some(&ClientMessage::EndOfAudio));

    let curve = read_curve(&out).unwrap();
    assert_eq!(
        curve.channels(),
        &["blendShapes.JawOpen", "blendShapes.EyeBlinkLeft"]
    );
    assert_eq!(curve.len(), 2);
    assert_eq!(curve.frames()[1].weights, vec![Some(0.8), Some(1.0)]);
}

#[tokio::test]
async fn data_before_names_is_malformed_and_leaves_no_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("curve.csv");
    let (client, mut svc) = client_with_service();

    tokio::spawn(async move {
        drain_uploads(&mut svc.uploads).await;
        let _ = svc.frames.send(Ok(data(0.0, &[0.1]))).await;
    });

    let err = client
        .infer(&audio(), &ModelConfig::default(), &out)
        .await
        .unwrap_err();
    assert!(matches!(err, FacecastError::MalformedFrame(_)));
    assert!(!out.exists());
}

#[tokio::test]
async fn mid_stream_failure_discards_partial_rows() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("curve.csv");
    let (client, mut svc) = client_with_service();

    tokio::spawn(async move {
        drain_uploads(&mut svc.uploads).await;
        let _ = svc.frames.send(Ok(names(&["A"]))).await;
        let _ = svc.frames.send(Ok(data(0.0, &[0.1]))).await;
        let _ = svc.frames.send(Err(FacecastError::stream("connection reset"))).await;
    });

    let err = client
        .infer(&audio(), &ModelConfig::default(), &out)
        .await
        .unwrap_err();
    assert!(matches!(err, FacecastError::Stream(_)));
    assert!(!out.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn close_without_end_of_stream_is_a_stream_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("curve.csv");
    let (client, mut svc) = client_with_service();

    tokio::spawn(async move {
        drain_uploads(&mut svc.uploads).await;
        let _ = svc.frames.send(Ok(names(&["A"]))).await;
        let _ = svc.frames.send(Ok(data(0.0, &[0.1]))).await;
        drop(svc.frames);
    });

    let err = client
        .infer(&audio(), &ModelConfig::default(), &out)
        .await
        .unwrap_err();
    assert!(matches!(err, FacecastError::Stream(_)));
    assert!(!out.exists());
}

#[tokio::test]
async fn error_status_ends_the_stream() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("curve.csv");
    let (client, mut svc) = client_with_service();

    tokio::spawn(async move {
        drain_uploads(&mut svc.uploads).await;
        let _ = svc
            .frames
            .send(Ok(ServerMessage::Status {
                code: 3,
                message: "model not loaded".into(),
            }))
            .await;
    });

    let err = client
        .infer(&audio(), &ModelConfig::default(), &out)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("model not loaded"));
}

#[tokio::test]
async fn upload_failure_cancels_the_download() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("curve.csv");
    let (client, svc) = client_with_service();

    // The service stops reading but keeps its sending half open, so the download alone would
    // wait forever.
    let Service { uploads, frames } = svc;
    drop(uploads);

    let res = tokio::time::timeout(
        Duration::from_secs(5),
        client.infer(&audio(), &ModelConfig::default(), &out),
    )
    .await
    .expect("infer must not hang when the upload fails");
    assert!(matches!(res, Err(FacecastError::Stream(_))));
    drop(frames);
}

#[tokio::test]
async fn end_of_stream_without_names_is_an_empty_curve() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("curve.csv");
    let (client, mut svc) = client_with_service();

    tokio::spawn(async move {
        drain_uploads(&mut svc.uploads).await;
        let _ = svc.frames.send(Ok(ServerMessage::EndOfStream)).await;
    });

    let err = client
        .infer(&audio(), &ModelConfig::default(), &out)
        .await
        .unwrap_err();
    assert!(matches!(err, FacecastError::EmptyCurve(_)));
}

#[tokio::test]
async fn unreachable_service_is_a_connection_error() {
    let connector = OnceConnector(Mutex::new(None));
    let client = StreamingClient::new(connector, &InferenceConfig::default());
    let err = client
        .infer(&audio(), &ModelConfig::default(), std::path::Path::new("unused.csv"))
        .await
        .unwrap_err();
    assert!(matches!(err, FacecastError::Connection(_)));
}
