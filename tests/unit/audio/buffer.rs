use super::*;

#[test]
fn pcm16_bytes_decode_little_endian() {
    let buf = AudioBuffer::from_pcm16_le(AudioFormat::mono_pcm16(16_000), &[0x01, 0x00, 0xff, 0xff])
        .unwrap();
    assert_eq!(buf.samples(), &[1, -1]);
    assert!(AudioBuffer::from_pcm16_le(AudioFormat::mono_pcm16(16_000), &[0x01]).is_err());
}

#[test]
fn silence_has_requested_duration() {
    let buf = AudioBuffer::silence(AudioFormat::mono_pcm16(24_000), 0.5).unwrap();
    assert_eq!(buf.samples().len(), 12_000);
    assert!((buf.duration_secs() - 0.5).abs() < 1e-9);
    assert!(buf.samples().iter().all(|&s| s == 0));
}

#[test]
fn chunks_cover_every_sample_once() {
    let samples: Vec<i16> = (0..10).collect();
    let buf = AudioBuffer::new(AudioFormat::mono_pcm16(8_000), samples).unwrap();
    let chunks: Vec<Vec<u8>> = buf.pcm16_chunks(4).collect();
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].len(), 8);
    assert_eq!(chunks[2].len(), 4);
    assert_eq!(&chunks[2][..], &[8, 0, 9, 0]);
}

#[test]
fn rejects_unsupported_layouts() {
    let bad_rate = AudioFormat {
        sample_rate: 0,
        channels: 1,
        sample_width: 2,
    };
    assert!(AudioBuffer::new(bad_rate, vec![]).is_err());

    let stereo = AudioFormat {
        sample_rate: 8_000,
        channels: 2,
        sample_width: 2,
    };
    assert!(AudioBuffer::new(stereo, vec![1, 2, 3]).is_err());
}

#[test]
fn wav_file_preserves_samples_and_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("speech.wav");
    let buf = AudioBuffer::new(AudioFormat::mono_pcm16(24_000), vec![0, 100, -100, i16::MAX])
        .unwrap();
    buf.write_wav(&path).unwrap();

    let back = AudioBuffer::read_wav(&path).unwrap();
    assert_eq!(back, buf);
}
