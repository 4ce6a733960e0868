use tracing::{debug, warn};
use webrtc_vad::{SampleRate, Vad, VadMode};

use super::frame::{AudioFrame, FrameClass, Utterance};
use crate::error::{Error, Result};

/// Seam to the voice-activity detector so the segmenter can be driven by a
/// stub in tests. One detector instance per call; never shared.
pub trait SpeechDetector: Send {
    fn classify(&mut self, frame: &AudioFrame) -> Result<FrameClass>;
}

/// Production detector backed by webrtc-vad at a fixed rate and
/// aggressiveness. Frames must carry exactly one 20 ms window of samples.
pub struct WebRtcDetector {
    vad: Vad,
    expected_samples: usize,
    sample_rate: u32,
}

// `Vad` holds its filter state behind a raw pointer, which suppresses the
// auto trait even though the state is plain heap memory with no thread
// affinity. Each detector is owned by exactly one call task for its whole
// lifetime, which is all `Send` requires.
unsafe impl Send for WebRtcDetector {}

impl WebRtcDetector {
    pub fn new(sample_rate: u32, mode: u8) -> Result<Self> {
        let rate = match sample_rate {
            8000 => SampleRate::Rate8kHz,
            16000 => SampleRate::Rate16kHz,
            32000 => SampleRate::Rate32kHz,
            48000 => SampleRate::Rate48kHz,
            other => {
                return Err(Error::UnsupportedFrame(format!(
                    "vad does not support {other} Hz"
                )))
            }
        };
        let mode = match mode {
            0 => VadMode::Quality,
            1 => VadMode::LowBitrate,
            2 => VadMode::Aggressive,
            _ => VadMode::VeryAggressive,
        };
        Ok(Self {
            vad: Vad::new_with_rate_and_mode(rate, mode),
            expected_samples: (sample_rate as usize * crate::transport::FRAME_MS) / 1000,
            sample_rate,
        })
    }
}

impl SpeechDetector for WebRtcDetector {
    fn classify(&mut self, frame: &AudioFrame) -> Result<FrameClass> {
        if frame.sample_count() != self.expected_samples {
            return Err(Error::UnsupportedFrame(format!(
                "expected {} samples per frame at {} Hz, got {}",
                self.expected_samples,
                self.sample_rate,
                frame.sample_count()
            )));
        }
        let pcm = frame.to_i16();
        match self.vad.is_voice_segment(&pcm) {
            Ok(true) => Ok(FrameClass::Speech),
            Ok(false) => Ok(FrameClass::Silence),
            Err(()) => Err(Error::UnsupportedFrame(
                "vad rejected frame".into(),
            )),
        }
    }
}

/// Per-call utterance segmentation: contiguous speech accumulates in a
/// buffer; once the trailing silence run exceeds the threshold the buffer is
/// flushed as one utterance. Short pauses inside an utterance never split it.
pub struct UtteranceSegmenter {
    detector: Box<dyn SpeechDetector>,
    buffer: Vec<AudioFrame>,
    silence_run: u32,
    silence_threshold: u32,
}

impl UtteranceSegmenter {
    pub fn new(detector: Box<dyn SpeechDetector>, silence_threshold: u32) -> Self {
        Self {
            detector,
            buffer: Vec::new(),
            silence_run: 0,
            silence_threshold,
        }
    }

    /// Feeds one frame; returns a finished utterance when this frame closes
    /// one. A detector failure is logged and the frame counts as silence, so
    /// a transient classification error cannot wedge the call open.
    pub fn push(&mut self, frame: AudioFrame) -> Option<Utterance> {
        let class = match self.detector.classify(&frame) {
            Ok(class) => class,
            Err(e) => {
                warn!("vad classification failed, treating frame as silence: {e}");
                FrameClass::Silence
            }
        };

        match class {
            FrameClass::Speech => {
                self.buffer.push(frame.classified(FrameClass::Speech));
                self.silence_run = 0;
                None
            }
            _ => {
                self.silence_run += 1;
                if self.silence_run > self.silence_threshold && !self.buffer.is_empty() {
                    let frames = std::mem::take(&mut self.buffer);
                    self.silence_run = 0;
                    let utterance = Utterance::from_frames(frames);
                    debug!(
                        frames = utterance.frame_count(),
                        ms = utterance.duration_ms(),
                        "utterance closed by trailing silence"
                    );
                    Some(utterance)
                } else {
                    None
                }
            }
        }
    }

    /// True while a partial utterance is buffered. A call that ends in this
    /// state discards the buffer: an utterance is only actionable once it is
    /// bounded by trailing silence.
    pub fn is_accumulating(&self) -> bool {
        !self.buffer.is_empty()
    }
}
