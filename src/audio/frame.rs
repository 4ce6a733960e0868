use crate::error::{Error, Result};

/// Classification assigned to a frame by the speech detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameClass {
    Unclassified,
    Speech,
    Silence,
}

/// One decoded 20 ms unit of audio: normalized samples in [-1.0, 1.0] plus
/// the detector's verdict. Samples never change after decoding.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    samples: Vec<f32>,
    class: FrameClass,
}

impl AudioFrame {
    /// Decodes a little-endian signed 16-bit PCM payload into normalized
    /// samples (`raw / 32768`). Pure transform; odd-length payloads are
    /// rejected as malformed.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() % 2 != 0 {
            return Err(Error::MalformedAudio(format!(
                "pcm payload length must be even, got {}",
                payload.len()
            )));
        }
        let samples = payload
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
            .collect();
        Ok(Self {
            samples,
            class: FrameClass::Unclassified,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn class(&self) -> FrameClass {
        self.class
    }

    /// Consumes the unclassified frame, fixing its verdict.
    pub fn classified(mut self, class: FrameClass) -> Self {
        self.class = class;
        self
    }

    /// Samples rescaled to i16 for detectors that work on raw PCM.
    pub fn to_i16(&self) -> Vec<i16> {
        self.samples
            .iter()
            .map(|&s| (s * i16::MAX as f32) as i16)
            .collect()
    }
}

/// One contiguous speech span, bounded by silence on both sides by
/// construction. Consumed exactly once by the turn pipeline.
#[derive(Debug, Clone)]
pub struct Utterance {
    samples: Vec<f32>,
    frame_count: usize,
}

impl Utterance {
    pub(crate) fn from_frames(frames: Vec<AudioFrame>) -> Self {
        let frame_count = frames.len();
        let samples = frames
            .into_iter()
            .flat_map(|f| f.samples.into_iter())
            .collect();
        Self {
            samples,
            frame_count,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn duration_ms(&self) -> usize {
        self.frame_count * crate::transport::FRAME_MS
    }

    /// Serializes the samples as raw little-endian f32 bytes, the form the
    /// transcription service ingests. Full precision, no requantization.
    pub fn to_f32_le_bytes(&self) -> Vec<u8> {
        encode_f32_le(&self.samples)
    }
}

/// Inverse of `AudioFrame::decode` at full f32 precision.
pub fn encode_f32_le(samples: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 4);
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}
