use voxgate::audio::{
    encode_f32_le, AudioFrame, FrameClass, SpeechDetector, UtteranceSegmenter,
};
use voxgate::Error;

const SAMPLES_PER_FRAME: usize = 160; // 8 kHz, 20 ms

/// Classifies by amplitude: any sample above the floor counts as speech.
struct EnergyDetector;

impl SpeechDetector for EnergyDetector {
    fn classify(&mut self, frame: &AudioFrame) -> voxgate::Result<FrameClass> {
        if frame.samples().iter().any(|s| s.abs() > 0.001) {
            Ok(FrameClass::Speech)
        } else {
            Ok(FrameClass::Silence)
        }
    }
}

/// Fails on loud frames, so fail-open handling can be observed.
struct FlakyDetector;

impl SpeechDetector for FlakyDetector {
    fn classify(&mut self, frame: &AudioFrame) -> voxgate::Result<FrameClass> {
        if frame.samples().iter().any(|s| s.abs() > 0.9) {
            Err(Error::UnsupportedFrame("simulated vad failure".into()))
        } else if frame.samples().iter().any(|s| s.abs() > 0.001) {
            Ok(FrameClass::Speech)
        } else {
            Ok(FrameClass::Silence)
        }
    }
}

fn pcm_payload(value: i16, samples: usize) -> Vec<u8> {
    value
        .to_le_bytes()
        .iter()
        .copied()
        .cycle()
        .take(samples * 2)
        .collect()
}

fn speech_frame(value: i16) -> AudioFrame {
    AudioFrame::decode(&pcm_payload(value, SAMPLES_PER_FRAME)).unwrap()
}

fn silence_frame() -> AudioFrame {
    AudioFrame::decode(&pcm_payload(0, SAMPLES_PER_FRAME)).unwrap()
}

#[test]
fn decode_normalizes_pcm16() {
    let payload = pcm_payload(16384, 4);
    let frame = AudioFrame::decode(&payload).unwrap();
    assert_eq!(frame.sample_count(), 4);
    for &s in frame.samples() {
        assert!((s - 0.5).abs() < 1e-6);
    }
    assert_eq!(frame.class(), FrameClass::Unclassified);
}

#[test]
fn decode_rejects_odd_length() {
    let err = AudioFrame::decode(&[0u8; 321]).unwrap_err();
    assert!(matches!(err, Error::MalformedAudio(_)), "got {err:?}");
}

#[test]
fn f32_encoding_round_trips() {
    let payload = pcm_payload(-12345, SAMPLES_PER_FRAME);
    let frame = AudioFrame::decode(&payload).unwrap();
    let bytes = encode_f32_le(frame.samples());
    assert_eq!(bytes.len(), SAMPLES_PER_FRAME * 4);

    let recovered: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    for (a, b) in frame.samples().iter().zip(&recovered) {
        assert!((a - b).abs() < 1e-7);
    }
}

#[test]
fn speech_then_silence_emits_one_utterance() {
    let mut segmenter = UtteranceSegmenter::new(Box::new(EnergyDetector), 6);

    // 10 speech frames, each carrying a distinct value so order is checkable.
    for i in 0..10i16 {
        let emitted = segmenter.push(speech_frame((i + 1) * 100));
        assert!(emitted.is_none(), "no emission while speech continues");
    }

    let mut utterance = None;
    for _ in 0..10 {
        if let Some(u) = segmenter.push(silence_frame()) {
            assert!(utterance.is_none(), "only one utterance may be emitted");
            utterance = Some(u);
        }
    }

    let utterance = utterance.expect("trailing silence should close the utterance");
    assert_eq!(utterance.frame_count(), 10);
    assert_eq!(utterance.samples().len(), 10 * SAMPLES_PER_FRAME);
    // Frames appear in arrival order.
    for i in 0..10usize {
        let expected = ((i as i16 + 1) * 100) as f32 / 32768.0;
        let got = utterance.samples()[i * SAMPLES_PER_FRAME];
        assert!((got - expected).abs() < 1e-6, "frame {i} out of order");
    }
}

#[test]
fn silence_alone_never_emits() {
    let mut segmenter = UtteranceSegmenter::new(Box::new(EnergyDetector), 6);
    for _ in 0..100 {
        assert!(segmenter.push(silence_frame()).is_none());
    }
}

#[test]
fn short_pause_does_not_split_an_utterance() {
    let mut segmenter = UtteranceSegmenter::new(Box::new(EnergyDetector), 6);

    for _ in 0..5 {
        assert!(segmenter.push(speech_frame(1000)).is_none());
    }
    // A pause of exactly the threshold keeps the buffer open.
    for _ in 0..6 {
        assert!(segmenter.push(silence_frame()).is_none());
    }
    for _ in 0..3 {
        assert!(segmenter.push(speech_frame(2000)).is_none());
    }

    let mut utterance = None;
    for _ in 0..7 {
        if let Some(u) = segmenter.push(silence_frame()) {
            utterance = Some(u);
        }
    }
    let utterance = utterance.expect("second silence run should close the utterance");
    assert_eq!(utterance.frame_count(), 8, "both spans belong to one utterance");
}

#[test]
fn detector_failure_counts_as_silence() {
    let mut segmenter = UtteranceSegmenter::new(Box::new(FlakyDetector), 3);

    for _ in 0..4 {
        assert!(segmenter.push(speech_frame(1000)).is_none());
    }
    // This frame makes the detector fail; fail-open treats it as silence,
    // which is one silent frame, not enough to flush.
    assert!(segmenter.push(speech_frame(i16::MAX)).is_none());
    assert!(segmenter.push(speech_frame(1000)).is_none());

    let mut utterance = None;
    for _ in 0..4 {
        if let Some(u) = segmenter.push(silence_frame()) {
            utterance = Some(u);
        }
    }
    let utterance = utterance.expect("utterance should survive a detector failure");
    assert_eq!(utterance.frame_count(), 5, "failed frame is not buffered");
}
