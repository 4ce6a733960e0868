//! AudioSocket wire protocol: one-byte kind, two-byte big-endian payload
//! length, payload. Audio payloads are 8 kHz 16-bit signed linear PCM.

mod codec;
mod message;

pub use codec::AudioSocketCodec;
pub use message::Message;

/// Duration of one slin frame on the wire.
pub const FRAME_MS: usize = 20;

/// Bytes per outbound audio message: 8000 Hz * 20 ms * 2 bytes. Larger reply
/// payloads are split into chunks of this size before writing.
pub const SLIN_CHUNK_SIZE: usize = 320;
