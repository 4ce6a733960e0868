use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use uuid::Uuid;

use super::Message;

const HEADER_LEN: usize = 3;

/// Framing codec for AudioSocket messages.
///
/// An unknown kind byte is unrecoverable: the framing may still be intact but
/// the peer is speaking a protocol revision we do not know, so the decoder
/// surfaces `InvalidData` and the session closes.
#[derive(Debug, Default)]
pub struct AudioSocketCodec;

impl Decoder for AudioSocketCodec {
    type Item = Message;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, Self::Error> {
        if src.len() < HEADER_LEN {
            return Ok(None);
        }
        let payload_len = u16::from_be_bytes([src[1], src[2]]) as usize;
        if src.len() < HEADER_LEN + payload_len {
            src.reserve(HEADER_LEN + payload_len - src.len());
            return Ok(None);
        }

        let kind = src[0];
        src.advance(HEADER_LEN);
        let payload = src.split_to(payload_len).freeze();

        let message = match kind {
            Message::KIND_HANGUP => Message::Hangup,
            Message::KIND_ID => {
                let id = Uuid::from_slice(&payload).map_err(|_| {
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("id payload must be 16 bytes, got {}", payload.len()),
                    )
                })?;
                Message::Id(id)
            }
            Message::KIND_SILENCE => Message::Silence,
            Message::KIND_AUDIO => Message::Audio(payload),
            Message::KIND_ERROR => Message::Error(payload.first().copied().unwrap_or(0)),
            other => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("unknown audiosocket kind 0x{other:02x}"),
                ))
            }
        };
        Ok(Some(message))
    }
}

impl Encoder<Message> for AudioSocketCodec {
    type Error = std::io::Error;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (kind, payload): (u8, Bytes) = match item {
            Message::Hangup => (Message::KIND_HANGUP, Bytes::new()),
            Message::Id(id) => (Message::KIND_ID, Bytes::copy_from_slice(id.as_bytes())),
            Message::Silence => (Message::KIND_SILENCE, Bytes::new()),
            Message::Audio(data) => (Message::KIND_AUDIO, data),
            Message::Error(code) => (Message::KIND_ERROR, Bytes::copy_from_slice(&[code])),
        };
        if payload.len() > u16::MAX as usize {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("payload too large for audiosocket frame: {}", payload.len()),
            ));
        }
        dst.reserve(HEADER_LEN + payload.len());
        dst.put_u8(kind);
        dst.put_u16(payload.len() as u16);
        dst.put_slice(&payload);
        Ok(())
    }
}
