pub mod frame;
pub mod segmenter;

pub use frame::{encode_f32_le, AudioFrame, FrameClass, Utterance};
pub use segmenter::{SpeechDetector, UtteranceSegmenter, WebRtcDetector};
