use super::*;

struct FixedSynth(Option<Vec<u8>>);

#[async_trait]
impl SpeechSynthesizer for FixedSynth {
    fn format(&self) -> AudioFormat {
        AudioFormat::mono_pcm16(16_000)
    }

    async fn synthesize(&self, _text: &str, _voice: &str) -> FacecastResult<Vec<u8>> {
        self.0
            .clone()
            .ok_or_else(|| FacecastError::audio("service unavailable"))
    }
}

#[tokio::test]
async fn successful_synthesis_is_decoded() {
    let synth = FixedSynth(Some(vec![2, 0, 3, 0]));
    let buf = synthesize_or_silence(&synth, "hello", "belinda", 1.0)
        .await
        .unwrap();
    assert_eq!(buf.samples(), &[2, 3]);
}

#[tokio::test]
async fn failure_falls_back_to_silence() {
    let synth = FixedSynth(None);
    let buf = synthesize_or_silence(&synth, "hello", "belinda", 0.25)
        .await
        .unwrap();
    assert_eq!(buf.samples().len(), 4_000);
    assert!(buf.samples().iter().all(|&s| s == 0));
}

#[tokio::test]
async fn empty_or_odd_payloads_fall_back_to_silence() {
    for payload in [vec![], vec![1u8, 2, 3]] {
        let synth = FixedSynth(Some(payload));
        let buf = synthesize_or_silence(&synth, "hi", "vex", 0.5).await.unwrap();
        assert_eq!(buf.samples().len(), 8_000);
    }
}
